use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConflictError {
    #[error("User already exists: {0}")]
    DuplicateUsername(String),

    #[error("Could not allocate a unique ticket ID after {attempts} attempts")]
    TicketIdExhausted { attempts: u32 },
}
