use poem_openapi::Object;

use crate::types::db::chat_message;

#[derive(Object, Debug)]
pub struct SendMessageRequest {
    pub receiver_id: String,
    pub message: String,
}

#[derive(Object, Debug)]
pub struct ChatMessageResponse {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub is_read: bool,
    pub sent_at: i64,
}

impl From<&chat_message::Model> for ChatMessageResponse {
    fn from(message: &chat_message::Model) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id.clone(),
            receiver_id: message.receiver_id.clone(),
            message: message.message.clone(),
            is_read: message.is_read,
            sent_at: message.sent_at,
        }
    }
}
