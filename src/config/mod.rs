// Configuration layer - settings, secrets, logging and database bootstrap

mod bootstrap_settings;
mod config_spec;
pub mod database;
mod env_provider;
mod errors;
mod helpdesk_settings;
mod logging;
mod secret_manager;

pub use bootstrap_settings::BootstrapSettings;
pub use config_spec::{validators, ConfigSpec, ConfigValueSource};
pub use database::{begin_transaction, commit_transaction, connect_database, migrate_database};
pub use env_provider::{EnvironmentProvider, SystemEnvironment};
#[cfg(test)]
pub use env_provider::MockEnvironment;
pub use errors::ConfigError;
pub use helpdesk_settings::{HelpdeskSettings, SmtpSettings};
pub use logging::{init_logging, LoggingError};
pub use secret_manager::{SecretError, SecretManager};
