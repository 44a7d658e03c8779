use std::fmt::Display;
use std::str::FromStr;

use crate::config::errors::ConfigError;
use crate::config::EnvironmentProvider;

/// Where a loaded value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValueSource {
    Environment,
    Default,
    Unset,
}

/// One named setting: environment variable first, then the default
///
/// ```ignore
/// let port: u16 = ConfigSpec::new(env, "PORT").default_value("3000").load_parsed()?;
/// ```
pub struct ConfigSpec<'a> {
    env: &'a dyn EnvironmentProvider,
    name: &'static str,
    default: Option<String>,
    required: bool,
    min_length: Option<usize>,
    validator: Option<fn(&str) -> Result<(), String>>,
}

impl<'a> ConfigSpec<'a> {
    pub fn new(env: &'a dyn EnvironmentProvider, name: &'static str) -> Self {
        Self {
            env,
            name,
            default: None,
            required: false,
            min_length: None,
            validator: None,
        }
    }

    pub fn default_value(mut self, value: impl Display) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn validator(mut self, f: fn(&str) -> Result<(), String>) -> Self {
        self.validator = Some(f);
        self
    }

    /// Raw value and its source; either source must pass the validation rules
    pub fn load_with_source(&self) -> Result<(String, ConfigValueSource), ConfigError> {
        let (value, source) = match (self.env.get_var(self.name), &self.default) {
            (Some(value), _) => (value, ConfigValueSource::Environment),
            (None, Some(default)) => (default.clone(), ConfigValueSource::Default),
            (None, None) if self.required => {
                return Err(ConfigError::invalid(self.name, "required but not set"));
            }
            (None, None) => return Ok((String::new(), ConfigValueSource::Unset)),
        };

        self.validate(&value)?;
        tracing::debug!(setting = self.name, ?source, "Setting loaded");
        Ok((value, source))
    }

    pub fn load(&self) -> Result<String, ConfigError> {
        self.load_with_source().map(|(value, _)| value)
    }

    /// `None` when unset or blank
    pub fn load_optional(&self) -> Result<Option<String>, ConfigError> {
        let (value, source) = self.load_with_source()?;
        if source == ConfigValueSource::Unset || value.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(value))
    }

    pub fn load_parsed<T>(&self) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.load()?;
        value.trim().parse::<T>().map_err(|e| ConfigError::Parse {
            name: self.name.to_string(),
            message: format!("'{}': {}", value, e),
        })
    }

    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        if let Some(min) = self.min_length {
            if value.len() < min {
                return Err(ConfigError::invalid(
                    self.name,
                    format!("must be at least {} characters long", min),
                ));
            }
        }
        match self.validator {
            Some(check) => check(value).map_err(|reason| ConfigError::invalid(self.name, reason)),
            None => Ok(()),
        }
    }
}

/// Validators for `ConfigSpec::validator`
pub mod validators {
    use std::net::{Ipv4Addr, Ipv6Addr};

    pub fn port(value: &str) -> Result<(), String> {
        match value.trim().parse::<u16>() {
            Ok(0) | Err(_) => Err(format!("expected a port between 1 and 65535, got '{}'", value)),
            Ok(_) => Ok(()),
        }
    }

    /// IP literal or plain hostname
    pub fn host_address(value: &str) -> Result<(), String> {
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(format!("invalid host address '{}'", value));
        }

        let bare = value.trim_start_matches('[').trim_end_matches(']');
        if bare.contains(':') {
            return bare
                .parse::<Ipv6Addr>()
                .map(|_| ())
                .map_err(|_| format!("invalid IPv6 address '{}'", value));
        }

        let dotted_digits = value
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        if dotted_digits {
            return value
                .parse::<Ipv4Addr>()
                .map(|_| ())
                .map_err(|_| format!("invalid IPv4 address '{}'", value));
        }
        Ok(())
    }

    pub fn email_address(value: &str) -> Result<(), String> {
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !value.contains(' ') => {
                Ok(())
            }
            _ => Err(format!("expected an email address, got '{}'", value)),
        }
    }

    pub fn positive_integer(value: &str) -> Result<(), String> {
        match value.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(format!("expected a positive integer, got '{}'", value)),
        }
    }
}
