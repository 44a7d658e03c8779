use argon2::{password_hash::SaltString, Algorithm, Argon2, Params, PasswordHasher, Version};

use crate::errors::InternalError;

/// Password hashing with Argon2id keyed by the configured pepper
pub struct CredentialProvider {
    password_pepper: String,
}

impl CredentialProvider {
    pub fn new(password_pepper: &str) -> Self {
        Self {
            password_pepper: password_pepper.to_string(),
        }
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| InternalError::crypto("password_hash", e.to_string()))?;

        Ok(hash.to_string())
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}
