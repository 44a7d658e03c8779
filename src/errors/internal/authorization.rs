use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthorizationError {
    #[error("IT staff capability required to {action}")]
    StaffRequired { action: &'static str },

    #[error("Not allowed to view ticket {ticket_id}")]
    TicketAccessDenied { ticket_id: String },
}

impl AuthorizationError {
    pub fn staff_required(action: &'static str) -> Self {
        Self::StaffRequired { action }
    }
}
