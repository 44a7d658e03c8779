use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::internal::NotFoundError;
use crate::errors::InternalError;
use crate::types::db::{ticket, ticket_notification};

/// Per-user record of ticket notifications that were delivered
pub struct NotificationStore;

impl NotificationStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        ticket_pk: i64,
        user_id: &str,
        notification_type: &str,
        now: i64,
    ) -> Result<ticket_notification::Model, InternalError> {
        ticket_notification::ActiveModel {
            ticket_id: Set(ticket_pk),
            user_id: Set(user_id.to_string()),
            notification_type: Set(notification_type.to_string()),
            sent_at: Set(now),
            is_read: Set(false),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_notification", e))
    }

    /// The user's notifications with their tickets, newest first
    pub async fn list_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<(ticket_notification::Model, Option<ticket::Model>)>, InternalError> {
        let mut select = ticket_notification::Entity::find()
            .find_also_related(ticket::Entity)
            .filter(ticket_notification::Column::UserId.eq(user_id));
        if unread_only {
            select = select.filter(ticket_notification::Column::IsRead.eq(false));
        }
        select
            .order_by_desc(ticket_notification::Column::SentAt)
            .order_by_desc(ticket_notification::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_notifications", e))
    }

    /// Mark one of the user's notifications read
    ///
    /// # Errors
    /// `NotFoundError::Notification` if it does not exist or targets someone else
    pub async fn mark_read(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        notification_id: i64,
    ) -> Result<ticket_notification::Model, InternalError> {
        let existing = ticket_notification::Entity::find_by_id(notification_id)
            .filter(ticket_notification::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_notification", e))?
            .ok_or(NotFoundError::Notification(notification_id))?;

        if existing.is_read {
            return Ok(existing);
        }

        let mut active: ticket_notification::ActiveModel = existing.into();
        active.is_read = Set(true);
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("mark_notification_read", e))
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
