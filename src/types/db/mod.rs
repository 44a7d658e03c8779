// Database entities - SeaORM models
pub mod attachment;
pub mod chat_message;
pub mod comment;
pub mod profile;
pub mod ticket;
pub mod ticket_notification;
pub mod ticket_sequence;
pub mod user;
