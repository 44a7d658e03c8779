use std::fmt;

use thiserror::Error;

use crate::config::{EnvironmentProvider, SystemEnvironment};

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Required secret '{name}' is missing")]
    Missing { name: &'static str },

    #[error("Secret '{name}' must be at least {min} characters, got {actual}")]
    TooShort {
        name: &'static str,
        min: usize,
        actual: usize,
    },
}

/// Loading rule for one secret
struct SecretSpec {
    name: &'static str,
    required: bool,
    min_length: usize,
}

const PASSWORD_PEPPER: SecretSpec = SecretSpec {
    name: "PASSWORD_PEPPER",
    required: true,
    min_length: 16,
};

const SMTP_PASSWORD: SecretSpec = SecretSpec {
    name: "SMTP_PASSWORD",
    required: false,
    min_length: 0,
};

impl SecretSpec {
    fn load(&self, env: &dyn EnvironmentProvider) -> Result<Option<String>, SecretError> {
        match env.get_var(self.name) {
            None if self.required => Err(SecretError::Missing { name: self.name }),
            None => Ok(None),
            Some(value) if value.len() < self.min_length => Err(SecretError::TooShort {
                name: self.name,
                min: self.min_length,
                actual: value.len(),
            }),
            Some(value) => Ok(Some(value)),
        }
    }
}

/// Holds the password pepper and the optional SMTP password
///
/// Values never appear in `Debug` or `Display` output.
pub struct SecretManager {
    password_pepper: String,
    smtp_password: Option<String>,
}

impl SecretManager {
    /// # Errors
    /// `SecretError` when the pepper is missing or too short
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, SecretError> {
        Ok(Self {
            password_pepper: PASSWORD_PEPPER.load(env)?.unwrap_or_default(),
            smtp_password: SMTP_PASSWORD.load(env)?,
        })
    }

    pub fn init() -> Result<Self, SecretError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    /// Build directly from values, for tools and tests that bypass the environment
    pub fn from_values(password_pepper: &str, smtp_password: Option<&str>) -> Self {
        Self {
            password_pepper: password_pepper.to_string(),
            smtp_password: smtp_password.map(str::to_string),
        }
    }

    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.smtp_password.as_deref()
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("password_pepper", &"<redacted>")
            .field(
                "smtp_password",
                &self.smtp_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded = 1 + usize::from(self.smtp_password.is_some());
        write!(f, "SecretManager {{ secrets_loaded: {} }}", loaded)
    }
}
