use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::errors::InternalError;
use crate::types::db::chat_message;

/// Data access for direct messages between users
pub struct ChatStore;

impl ChatStore {
    pub fn new() -> Self {
        Self
    }

    /// Store a new message; messages are always unread when created
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        sender_id: &str,
        receiver_id: &str,
        message: String,
        now: i64,
    ) -> Result<chat_message::Model, InternalError> {
        chat_message::ActiveModel {
            sender_id: Set(sender_id.to_string()),
            receiver_id: Set(receiver_id.to_string()),
            message: Set(message),
            is_read: Set(false),
            sent_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_chat_message", e))
    }

    /// Messages exchanged between two users, oldest first
    pub async fn conversation(
        &self,
        conn: &impl ConnectionTrait,
        user_a: &str,
        user_b: &str,
    ) -> Result<Vec<chat_message::Model>, InternalError> {
        chat_message::Entity::find()
            .filter(between(user_a, user_b))
            .order_by_asc(chat_message::Column::SentAt)
            .order_by_asc(chat_message::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("chat_conversation", e))
    }

    /// Mark everything `sender_id` sent to `receiver_id` as read
    ///
    /// Returns the number of messages that flipped from unread to read.
    pub async fn mark_read(
        &self,
        conn: &impl ConnectionTrait,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<u64, InternalError> {
        let result = chat_message::Entity::update_many()
            .col_expr(chat_message::Column::IsRead, Expr::value(true))
            .filter(chat_message::Column::SenderId.eq(sender_id))
            .filter(chat_message::Column::ReceiverId.eq(receiver_id))
            .filter(chat_message::Column::IsRead.eq(false))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("mark_chat_read", e))?;
        Ok(result.rows_affected)
    }

    /// Latest messages the user sent or received, newest first
    pub async fn recent_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        limit: u64,
    ) -> Result<Vec<chat_message::Model>, InternalError> {
        chat_message::Entity::find()
            .filter(
                Condition::any()
                    .add(chat_message::Column::SenderId.eq(user_id))
                    .add(chat_message::Column::ReceiverId.eq(user_id)),
            )
            .order_by_desc(chat_message::Column::SentAt)
            .order_by_desc(chat_message::Column::Id)
            .limit(limit)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("recent_chat_messages", e))
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

fn between(user_a: &str, user_b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(chat_message::Column::SenderId.eq(user_a))
                .add(chat_message::Column::ReceiverId.eq(user_b)),
        )
        .add(
            Condition::all()
                .add(chat_message::Column::SenderId.eq(user_b))
                .add(chat_message::Column::ReceiverId.eq(user_a)),
        )
}
