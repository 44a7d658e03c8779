// Stores layer - data access; every method takes the connection or transaction to run on
pub mod attachment_store;
pub mod chat_store;
pub mod comment_store;
pub mod notification_store;
pub mod ticket_store;
pub mod user_store;

pub use attachment_store::{AttachmentInsert, AttachmentStore};
pub use chat_store::ChatStore;
pub use comment_store::CommentStore;
pub use notification_store::NotificationStore;
pub use ticket_store::{TicketInsert, TicketStore};
pub use user_store::{NewUser, UserStore};
