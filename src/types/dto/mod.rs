// Request and response bodies of the HTTP API
pub mod analytics;
pub mod chat;
pub mod common;
pub mod tickets;
pub mod users;
