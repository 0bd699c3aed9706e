use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::*;
use serde_json::{json, Map, Value};

use crate::error::{Result, WashError};
use crate::lang::ast::{Configuration, Literal, Script};

pub mod validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserType {
    Chrome,
    Firefox,
    Edge,
    Opera,
    Safari,
}

type CapabilityBuilder = fn(&SessionSettings) -> Map<String, Value>;

/** Supported browsers in priority order: type, display name, vendor capabilities. */
static BROWSERS: [(BrowserType, &str, CapabilityBuilder); 5] = [
    (BrowserType::Chrome, "Chrome", chrome_capabilities),
    (BrowserType::Firefox, "Firefox", firefox_capabilities),
    (BrowserType::Edge, "Edge", edge_capabilities),
    (BrowserType::Opera, "Opera", opera_capabilities),
    (BrowserType::Safari, "Safari", safari_capabilities),
];

impl BrowserType {
    pub fn all() -> impl Iterator<Item = BrowserType> {
        BROWSERS.iter().map(|(browser, _, _)| *browser)
    }

    fn entry(&self) -> &'static (BrowserType, &'static str, CapabilityBuilder) {
        // every variant has a row
        BROWSERS
            .iter()
            .find(|(browser, _, _)| browser == self)
            .unwrap_or(&BROWSERS[0])
    }

    pub fn name(&self) -> &'static str {
        self.entry().1
    }
}

impl fmt::Display for BrowserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BrowserType {
    type Err = WashError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        BROWSERS
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(browser, _, _)| *browser)
            .ok_or_else(|| WashError::language(format!("Unsupported browser type '{}'", s)))
    }
}

/// Browser session settings resolved from a script configuration block.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub browser: BrowserType,
    pub headless: bool,
    pub user_agent: Option<String>,
    pub mobile: bool,
    pub incognito: bool,
    pub window_size: Option<(u32, u32)>,
    /// Implicit wait applied to element lookups, in seconds.
    pub wait_timeout: u64,
    /// Page load timeout in seconds, the driver default when unset.
    pub page_load_timeout: Option<u64>,
}

impl SessionSettings {
    pub fn defaults(browser: BrowserType) -> Self {
        SessionSettings {
            browser,
            headless: true,
            user_agent: None,
            mobile: false,
            incognito: false,
            window_size: None,
            wait_timeout: 0,
            page_load_timeout: None,
        }
    }

    /// Settings of the configuration the script selects, or defaults when it declares none.
    pub fn resolve(script: &Script, default_browser: BrowserType) -> Result<Self> {
        let mut settings = SessionSettings::defaults(default_browser);
        let configuration = match selected_configuration(script)? {
            Some(configuration) => configuration,
            None => {
                debug!("No configuration declared, using {} defaults", default_browser);
                return Ok(settings);
            }
        };
        debug!("Using configuration '{}'", configuration.name);

        for entry in &configuration.entries {
            match entry.name.as_str() {
                "browser_type" => settings.browser = string_parameter(entry.parameter("browser_type"))?.parse()?,
                "user_agent" => settings.user_agent = Some(string_parameter(entry.parameter("user_agent"))?),
                "access_as_mobile_device" => settings.mobile = bool_parameter(entry.parameter("is_active"))?,
                "use_incognito_mode" => settings.incognito = bool_parameter(entry.parameter("is_active"))?,
                "headless" => settings.headless = bool_parameter(entry.parameter("is_active"))?,
                "window_size" => {
                    let width = dimension_parameter(entry.parameter("width"))?;
                    let height = dimension_parameter(entry.parameter("height"))?;
                    settings.window_size = Some((width, height));
                }
                "wait_timeout" => {
                    settings.wait_timeout = unsigned_parameter(entry.parameter("timeout"))?;
                    settings.page_load_timeout = match entry.parameter("page_load") {
                        Some(value) => Some(unsigned_parameter(Some(value))?),
                        None => None,
                    };
                }
                other => {
                    return Err(WashError::language(format!(
                        "Unknown configuration option '{}' in configuration '{}'",
                        other, configuration.name
                    )))
                }
            }
        }
        Ok(settings)
    }

    /// W3C capabilities for a new WebDriver session.
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut capabilities = (self.browser.entry().2)(self);
        let mut timeouts = Map::new();
        timeouts.insert("implicit".to_string(), json!(self.wait_timeout.saturating_mul(1000)));
        if let Some(page_load) = self.page_load_timeout {
            timeouts.insert("pageLoad".to_string(), json!(page_load.saturating_mul(1000)));
        }
        capabilities.insert("timeouts".to_string(), Value::Object(timeouts));
        capabilities
    }

    fn chromium_arguments(&self) -> Vec<String> {
        let mut arguments = Vec::new();
        if self.headless {
            arguments.push("--headless".to_string());
        }
        if let Some(user_agent) = &self.user_agent {
            arguments.push(format!("--user-agent={}", user_agent));
        }
        if self.mobile {
            arguments.push("--use-mobile-user-agent".to_string());
        }
        if self.incognito {
            arguments.push("--incognito".to_string());
        }
        if let Some((width, height)) = self.window_size {
            arguments.push(format!("--window-size={},{}", width, height));
        }
        arguments
    }
}

/// The block named by `use`, the only declared block, or none.
pub fn selected_configuration(script: &Script) -> Result<Option<&Configuration>> {
    match (&script.use_configuration, script.configurations.as_slice()) {
        (Some(name), configurations) => configurations
            .iter()
            .find(|configuration| &configuration.name == name)
            .map(Some)
            .ok_or_else(|| WashError::language(format!("Configuration '{}' is not declared", name))),
        (None, []) => Ok(None),
        (None, [configuration]) => Ok(Some(configuration)),
        (None, _) => Err(WashError::language(
            "Several configurations are declared; select one with 'use NAME'",
        )),
    }
}

fn string_parameter(value: Option<&Literal>) -> Result<String> {
    match value {
        Some(Literal::Str(text)) => Ok(text.to_string()),
        other => Err(parameter_mismatch("string", other)),
    }
}

fn bool_parameter(value: Option<&Literal>) -> Result<bool> {
    match value {
        Some(Literal::Bool(flag)) => Ok(*flag),
        other => Err(parameter_mismatch("boolean", other)),
    }
}

fn unsigned_parameter(value: Option<&Literal>) -> Result<u64> {
    match value {
        Some(Literal::Integer(number)) if *number >= 0 => Ok(*number as u64),
        other => Err(parameter_mismatch("non-negative integer", other)),
    }
}

fn dimension_parameter(value: Option<&Literal>) -> Result<u32> {
    let size = unsigned_parameter(value)?;
    u32::try_from(size).map_err(|_| WashError::language(format!("Window dimension {} is too large", size)))
}

fn parameter_mismatch(expected: &str, found: Option<&Literal>) -> WashError {
    match found {
        Some(literal) => WashError::language(format!(
            "Expected a {} parameter, found {}",
            expected,
            literal.type_name()
        )),
        None => WashError::language(format!("Missing {} parameter", expected)),
    }
}

fn chrome_capabilities(settings: &SessionSettings) -> Map<String, Value> {
    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("chrome"));
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": settings.chromium_arguments() }),
    );
    capabilities
}

fn edge_capabilities(settings: &SessionSettings) -> Map<String, Value> {
    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("MicrosoftEdge"));
    capabilities.insert(
        "ms:edgeOptions".to_string(),
        json!({ "args": settings.chromium_arguments() }),
    );
    capabilities
}

fn opera_capabilities(settings: &SessionSettings) -> Map<String, Value> {
    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("opera"));
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": settings.chromium_arguments() }),
    );
    capabilities
}

fn firefox_capabilities(settings: &SessionSettings) -> Map<String, Value> {
    let mut arguments = Vec::new();
    if settings.headless {
        arguments.push("-headless".to_string());
    }
    if settings.incognito {
        arguments.push("-private".to_string());
    }
    if let Some((width, height)) = settings.window_size {
        arguments.push(format!("--width={}", width));
        arguments.push(format!("--height={}", height));
    }
    if settings.mobile {
        warn!("Firefox has no mobile user agent switch, set user_agent instead");
    }

    let mut preferences = Map::new();
    if let Some(user_agent) = &settings.user_agent {
        preferences.insert("general.useragent.override".to_string(), json!(user_agent));
    }

    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("firefox"));
    capabilities.insert(
        "moz:firefoxOptions".to_string(),
        json!({ "args": arguments, "prefs": preferences }),
    );
    capabilities
}

fn safari_capabilities(settings: &SessionSettings) -> Map<String, Value> {
    if settings.headless {
        warn!("Safari does not support headless mode, a window will be opened");
    }
    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("safari"));
    capabilities
}

/// Runtime options: where the WebDriver executables live.
#[derive(Debug, Clone)]
pub struct WashOptions {
    driver_paths: HashMap<BrowserType, PathBuf>,
    /// Browser used when the script does not configure one.
    pub default_browser: BrowserType,
}

impl Default for WashOptions {
    fn default() -> Self {
        WashOptions {
            driver_paths: HashMap::new(),
            default_browser: BrowserType::Chrome,
        }
    }
}

impl WashOptions {
    pub fn set_driver_path(&mut self, browser: BrowserType, path: impl Into<PathBuf>) {
        self.driver_paths.insert(browser, path.into());
    }

    pub fn driver_path(&self, browser: BrowserType) -> Option<&Path> {
        self.driver_paths.get(&browser).map(PathBuf::as_path)
    }
}
