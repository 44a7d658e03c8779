// API-facing error types
pub mod helpdesk;

pub use helpdesk::HelpdeskApiError;
