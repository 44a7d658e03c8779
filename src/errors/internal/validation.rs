use thiserror::Error;

/// Bad caller input; the operation is aborted before any write
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    EmptyField { field: &'static str },

    #[error("'{value}' is not a valid {field}")]
    InvalidChoice { field: &'static str, value: String },

    #[error("File size {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File type not allowed: {filename}")]
    DisallowedExtension { filename: String },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Recipient does not exist: {0}")]
    UnknownRecipient(String),

    #[error("Cannot send a message to yourself")]
    SelfMessage,
}

impl ValidationError {
    pub fn empty(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    pub fn invalid_choice(field: &'static str, value: &str) -> Self {
        Self::InvalidChoice {
            field,
            value: value.to_string(),
        }
    }
}
