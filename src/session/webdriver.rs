use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use log::*;
use tokio::runtime::Runtime;

use crate::config::{BrowserType, SessionSettings, WashOptions};
use crate::error::{Result, WashError};
use crate::session::{BrowserSession, Scope, SelectorKind, SessionFactory};

const DRIVER_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Starts a WebDriver executable for the configured browser and opens sessions through it.
pub struct WebDriverLauncher {
    options: WashOptions,
    settings: SessionSettings,
}

impl WebDriverLauncher {
    pub fn new(options: WashOptions, settings: SessionSettings) -> Self {
        WebDriverLauncher { options, settings }
    }

    fn spawn_driver(&self, port: u16) -> Result<Child> {
        let browser = self.settings.browser;
        let path = self.options.driver_path(browser).ok_or_else(|| {
            WashError::session(format!(
                "Current WASH configuration uses {} WebDriver, but the path was not specified in options.",
                browser
            ))
        })?;
        if !path.exists() {
            return Err(WashError::session(format!(
                "Unable to find {} WebDriver on specified path: \"{}\"",
                browser,
                path.display()
            )));
        }

        let port_arguments = match browser {
            BrowserType::Firefox | BrowserType::Safari => vec!["--port".to_string(), port.to_string()],
            _ => vec![format!("--port={}", port)],
        };
        info!("Starting {} WebDriver {} on port {}", browser, path.display(), port);
        Ok(Command::new(path)
            .args(port_arguments)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?)
    }
}

impl SessionFactory for WebDriverLauncher {
    type Session = WebDriverSession;

    fn open(&self, location: &str) -> Result<WebDriverSession> {
        let port = free_port()?;
        let mut driver = self.spawn_driver(port)?;

        let connected = wait_for_driver(port).and_then(|_| {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            let mut builder = ClientBuilder::native();
            builder.capabilities(self.settings.capabilities());
            let client = runtime
                .block_on(builder.connect(&format!("http://{}:{}", Ipv4Addr::LOCALHOST, port)))
                .map_err(|err| WashError::session(format!("unable to start a {} session: {}", self.settings.browser, err)))?;
            Ok((runtime, client))
        });
        let (runtime, client) = match connected {
            Ok(connected) => connected,
            Err(err) => {
                let _ = driver.kill();
                let _ = driver.wait();
                return Err(err);
            }
        };

        let mut session = WebDriverSession {
            runtime,
            client,
            driver: Some(driver),
            closed: false,
        };
        if let Err(err) = session.navigate(location) {
            if let Err(quit_err) = session.quit() {
                warn!("Failed to release session after navigation error: {}", quit_err);
            }
            return Err(err);
        }
        Ok(session)
    }
}

/// Live browser session. Each call blocks on the WebDriver round-trip.
pub struct WebDriverSession {
    runtime: Runtime,
    client: Client,
    driver: Option<Child>,
    closed: bool,
}

impl WebDriverSession {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(WashError::session("session has already been closed"));
        }
        Ok(())
    }

    fn stop_driver(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            if let Err(err) = driver.kill() {
                debug!("WebDriver process already stopped: {}", err);
            }
            let _ = driver.wait();
        }
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        self.stop_driver();
    }
}

fn command_error(action: &str) -> impl FnOnce(fantoccini::error::CmdError) -> WashError + '_ {
    move |err| WashError::session(format!("{} failed: {}", action, err))
}

impl BrowserSession for WebDriverSession {
    type Node = Element;

    fn find(&mut self, scope: Scope<'_, Element>, kind: SelectorKind, value: &str) -> Result<Vec<Element>> {
        self.ensure_open()?;
        let css = kind.to_css(value);
        let locator = match (kind, css.as_deref()) {
            (SelectorKind::XPath, _) => Locator::XPath(value),
            (_, Some(css)) => Locator::Css(css),
            (_, None) => return Err(WashError::Unsupported(format!("{} selector", kind))),
        };

        let found = match scope {
            Scope::Document => self.runtime.block_on(self.client.find_all(locator)),
            Scope::Element(element) => self.runtime.block_on(element.find_all(locator)),
        }
        .map_err(command_error("find"))?;
        trace!("{} '{}' matched {} element(s)", kind, value, found.len());
        Ok(found)
    }

    fn text_of(&mut self, node: &Element) -> Result<String> {
        self.ensure_open()?;
        self.runtime.block_on(node.text()).map_err(command_error("text"))
    }

    fn outer_html_of(&mut self, node: &Element) -> Result<String> {
        self.ensure_open()?;
        self.runtime.block_on(node.html(false)).map_err(command_error("html"))
    }

    fn inner_html_of(&mut self, node: &Element) -> Result<String> {
        self.ensure_open()?;
        self.runtime.block_on(node.html(true)).map_err(command_error("inner_html"))
    }

    fn attribute_of(&mut self, node: &Element, name: &str) -> Result<Option<String>> {
        self.ensure_open()?;
        self.runtime.block_on(node.attr(name)).map_err(command_error("attribute"))
    }

    fn click(&mut self, node: &Element) -> Result<()> {
        self.ensure_open()?;
        self.runtime.block_on(node.click()).map_err(command_error("click"))
    }

    fn send_keys(&mut self, node: Option<&Element>, text: &str) -> Result<()> {
        self.ensure_open()?;
        match node {
            Some(element) => self.runtime.block_on(element.send_keys(text)),
            None => self.runtime.block_on(async {
                let focused = self.client.active_element().await?;
                focused.send_keys(text).await
            }),
        }
        .map_err(command_error("send keys"))
    }

    fn clear(&mut self, node: &Element) -> Result<()> {
        self.ensure_open()?;
        self.runtime.block_on(node.clear()).map_err(command_error("clear"))
    }

    fn navigate(&mut self, location: &str) -> Result<()> {
        self.ensure_open()?;
        debug!("Navigating to {}", location);
        self.runtime.block_on(self.client.goto(location)).map_err(command_error("navigate"))
    }

    fn eval_script(&mut self, code: &str) -> Result<()> {
        self.ensure_open()?;
        let returned = self
            .runtime
            .block_on(self.client.execute(code, Vec::new()))
            .map_err(command_error("script"))?;
        trace!("script returned {}", returned);
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        self.ensure_open()?;
        let url = self
            .runtime
            .block_on(self.client.current_url())
            .map_err(command_error("current url"))?;
        Ok(url.to_string())
    }

    fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        info!("Closing WebDriver session");
        let closed = self
            .runtime
            .block_on(self.client.clone().close())
            .map_err(command_error("close"));
        self.stop_driver();
        closed
    }
}

fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

fn wait_for_driver(port: u16) -> Result<()> {
    let deadline = Instant::now() + DRIVER_STARTUP_TIMEOUT;
    while TcpStream::connect((Ipv4Addr::LOCALHOST, port)).is_err() {
        if Instant::now() >= deadline {
            return Err(WashError::session(format!(
                "WebDriver did not accept connections on port {} within {:?}",
                port, DRIVER_STARTUP_TIMEOUT
            )));
        }
        thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}
