use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotFoundError {
    #[error("Ticket not found: {0}")]
    Ticket(String),

    #[error("User not found: {0}")]
    User(String),

    #[error("Notification not found: {0}")]
    Notification(i64),
}
