use thiserror::Error;

/// Startup configuration failures; fatal, reported once and the process exits
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid setting '{name}': {reason}")]
    Invalid { name: String, reason: String },

    #[error("Failed to parse setting '{name}': {message}")]
    Parse { name: String, message: String },
}

impl ConfigError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
