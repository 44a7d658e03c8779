use std::path::{Path, PathBuf};

use crate::config::config_spec::{validators, ConfigSpec};
use crate::config::errors::ConfigError;
use crate::config::{EnvironmentProvider, SystemEnvironment};

/// Where to listen, which database to open and where uploads live
///
/// Loaded before anything else; a bad value stops startup.
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    database_url: String,
    server_host: String,
    server_port: u16,
    attachment_root: PathBuf,
}

impl BootstrapSettings {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: ConfigSpec::new(env, "DATABASE_URL")
                .default_value("sqlite://helpdesk.db?mode=rwc")
                .min_length(1)
                .load()?,
            server_host: ConfigSpec::new(env, "HOST")
                .default_value("0.0.0.0")
                .validator(validators::host_address)
                .load()?,
            server_port: ConfigSpec::new(env, "PORT")
                .default_value(3000)
                .validator(validators::port)
                .load_parsed()?,
            attachment_root: ConfigSpec::new(env, "ATTACHMENT_ROOT")
                .default_value("./media")
                .min_length(1)
                .load()?
                .into(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn attachment_root(&self) -> &Path {
        &self.attachment_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    fn settings_from(vars: &[(&str, &str)]) -> Result<BootstrapSettings, ConfigError> {
        BootstrapSettings::from_env_provider(&MockEnvironment::from_pairs(vars))
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();

        assert_eq!(settings.database_url(), "sqlite://helpdesk.db?mode=rwc");
        assert_eq!(settings.server_address(), "0.0.0.0:3000");
        assert_eq!(settings.attachment_root(), Path::new("./media"));
    }

    #[test]
    fn test_values_from_env() {
        let settings = settings_from(&[
            ("DATABASE_URL", "sqlite://test.db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("ATTACHMENT_ROOT", "/var/lib/helpdesk"),
        ])
        .unwrap();

        assert_eq!(settings.database_url(), "sqlite://test.db");
        assert_eq!(settings.server_address(), "127.0.0.1:8080");
        assert_eq!(settings.attachment_root(), Path::new("/var/lib/helpdesk"));
    }

    #[test]
    fn test_empty_database_url_rejected() {
        match settings_from(&[("DATABASE_URL", "")]) {
            Err(ConfigError::Invalid { name, .. }) => assert_eq!(name, "DATABASE_URL"),
            other => panic!("Expected Invalid for DATABASE_URL, got: {:?}", other),
        }
    }

    #[test]
    fn test_bad_port_and_host_rejected() {
        for port in ["0", "65536", "not_a_number"] {
            match settings_from(&[("PORT", port)]) {
                Err(ConfigError::Invalid { name, .. }) => assert_eq!(name, "PORT"),
                other => panic!("Expected Invalid for PORT={}, got: {:?}", port, other),
            }
        }
        assert!(settings_from(&[("HOST", "256.1.1.1")]).is_err());
    }
}
