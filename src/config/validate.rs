use std::collections::HashSet;

use log::debug;

use crate::config::selected_configuration;
use crate::error::{Result, WashError};
use crate::lang::ast::{Configuration, ConfigurationEntry, Literal, Script};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Str,
    Integer,
    Boolean,
}

impl ParameterType {
    fn name(&self) -> &'static str {
        match self {
            ParameterType::Str => "string",
            ParameterType::Integer => "non-negative integer",
            ParameterType::Boolean => "boolean",
        }
    }

    fn accepts(&self, value: &Literal) -> bool {
        match (self, value) {
            (ParameterType::Str, Literal::Str(_)) | (ParameterType::Boolean, Literal::Bool(_)) => true,
            (ParameterType::Integer, Literal::Integer(number)) => *number >= 0,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterType,
    pub required: bool,
}

#[derive(Debug)]
pub struct OptionSpec {
    pub name: &'static str,
    pub parameters: &'static [ParameterSpec],
}

const fn required(name: &'static str, kind: ParameterType) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: ParameterType) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        required: false,
    }
}

/// Configuration options a script may use, with their typed parameters.
pub static CATALOGUE: &[OptionSpec] = &[
    OptionSpec {
        name: "browser_type",
        parameters: &[required("browser_type", ParameterType::Str)],
    },
    OptionSpec {
        name: "user_agent",
        parameters: &[required("user_agent", ParameterType::Str)],
    },
    OptionSpec {
        name: "access_as_mobile_device",
        parameters: &[required("is_active", ParameterType::Boolean)],
    },
    OptionSpec {
        name: "use_incognito_mode",
        parameters: &[required("is_active", ParameterType::Boolean)],
    },
    OptionSpec {
        name: "window_size",
        parameters: &[
            required("width", ParameterType::Integer),
            required("height", ParameterType::Integer),
        ],
    },
    OptionSpec {
        name: "wait_timeout",
        parameters: &[
            required("timeout", ParameterType::Integer),
            optional("page_load", ParameterType::Integer),
        ],
    },
    OptionSpec {
        name: "headless",
        parameters: &[required("is_active", ParameterType::Boolean)],
    },
];

/// Static checks run before any session is opened. Returns the first problem found.
pub fn validate(script: &Script) -> Result<()> {
    let mut names = HashSet::new();
    for configuration in &script.configurations {
        if !names.insert(configuration.name.as_str()) {
            return Err(WashError::language(format!(
                "Configuration with the name {} already exists. Names of configurations in a WASH script must be unique.",
                configuration.name
            )));
        }
        validate_configuration(configuration)?;
    }
    selected_configuration(script)?;

    for query in script.queries() {
        query.check()?;
    }

    debug!("Script is valid");
    Ok(())
}

fn validate_configuration(configuration: &Configuration) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in &configuration.entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(WashError::language(format!(
                "Configuration option {} is defined multiple times in the configuration \"{}\"",
                entry.name, configuration.name
            )));
        }
        validate_entry(configuration, entry)?;
    }
    Ok(())
}

fn validate_entry(configuration: &Configuration, entry: &ConfigurationEntry) -> Result<()> {
    let option = CATALOGUE
        .iter()
        .find(|option| option.name == entry.name)
        .ok_or_else(|| {
            WashError::language(format!(
                "Unknown configuration option {} in the configuration \"{}\"",
                entry.name, configuration.name
            ))
        })?;

    for parameter in option.parameters.iter().filter(|parameter| parameter.required) {
        if entry.parameter(parameter.name).is_none() {
            return Err(WashError::language(format!(
                "A required parameter \"{}\" is missing from {} configuration option in the configuration \"{}\"",
                parameter.name, entry.name, configuration.name
            )));
        }
    }

    let mut seen = HashSet::new();
    for parameter in &entry.parameters {
        let parameter_spec = option
            .parameters
            .iter()
            .find(|candidate| candidate.name == parameter.name)
            .ok_or_else(|| {
                WashError::language(format!(
                    "Unknown/Unsupported parameter \"{}\" of configuration option {} has been defined in the configuration \"{}\"",
                    parameter.name, entry.name, configuration.name
                ))
            })?;
        if !seen.insert(parameter.name.as_str()) {
            return Err(WashError::language(format!(
                "Parameter \"{}\" of configuration option {} has been defined multiple times in the configuration \"{}\"",
                parameter.name, entry.name, configuration.name
            )));
        }
        if !parameter_spec.kind.accepts(&parameter.value) {
            return Err(WashError::language(format!(
                "The type of the parameter \"{}\" of configuration option {} must be {}.",
                parameter.name,
                entry.name,
                parameter_spec.kind.name()
            )));
        }
    }

    if entry.name == "window_size" {
        for parameter in &entry.parameters {
            if let Literal::Integer(size) = parameter.value {
                if u32::try_from(size).is_err() {
                    return Err(WashError::language(format!(
                        "Window dimension \"{}\" of the configuration \"{}\" is too large",
                        parameter.name, configuration.name
                    )));
                }
            }
        }
    }

    if entry.name == "browser_type" {
        if let Some(Literal::Str(browser)) = entry.parameter("browser_type") {
            browser.parse::<crate::config::BrowserType>()?;
        }
    }
    Ok(())
}
