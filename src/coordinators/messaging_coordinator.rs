use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::errors::internal::ValidationError;
use crate::errors::InternalError;
use crate::providers::{access_policy, ticket_rules};
use crate::stores::{ChatStore, UserStore};
use crate::types::db::{chat_message, user};
use crate::types::internal::context::RequestContext;
use crate::types::internal::Viewer;

/// Messages returned by `recent`
const RECENT_MESSAGES: u64 = 50;

/// Direct messages between users
pub struct MessagingCoordinator {
    db: DatabaseConnection,
    chat_store: Arc<ChatStore>,
    user_store: Arc<UserStore>,
}

impl MessagingCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            chat_store: app_data.chat_store.clone(),
            user_store: app_data.user_store.clone(),
        }
    }

    /// Send a message; it starts out unread
    ///
    /// # Errors
    /// `ValidationError` for an empty body, an unknown receiver or the sender itself
    pub async fn send(
        &self,
        ctx: &RequestContext,
        viewer: &Viewer,
        receiver_id: &str,
        body: &str,
    ) -> Result<chat_message::Model, InternalError> {
        let message = ticket_rules::require_text("message", body)?;
        if receiver_id == viewer.user_id {
            return Err(ValidationError::SelfMessage.into());
        }
        let receiver = self
            .user_store
            .find_by_id(&self.db, receiver_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownRecipient(receiver_id.to_string()))?;

        let sent = self
            .chat_store
            .insert(&self.db, &viewer.user_id, &receiver.id, message, Utc::now().timestamp())
            .await?;

        tracing::info!(
            request_id = %ctx.request_id,
            sender = %viewer.user_id,
            receiver = %receiver.id,
            "Chat message sent"
        );

        Ok(sent)
    }

    /// Conversation with `other_user_id`, oldest first
    ///
    /// Everything the other user sent to the viewer is marked read first, so
    /// the returned messages already carry the updated flag.
    pub async fn history(
        &self,
        viewer: &Viewer,
        other_user_id: &str,
    ) -> Result<Vec<chat_message::Model>, InternalError> {
        let txn = begin_transaction(&self.db).await?;
        let other = self.user_store.get_by_id(&txn, other_user_id).await?;

        let marked = self
            .chat_store
            .mark_read(&txn, &other.id, &viewer.user_id)
            .await?;
        let messages = self
            .chat_store
            .conversation(&txn, &viewer.user_id, &other.id)
            .await?;
        commit_transaction(txn).await?;

        if marked > 0 {
            tracing::debug!(reader = %viewer.user_id, sender = %other.id, marked, "Messages marked read");
        }

        Ok(messages)
    }

    /// Users the viewer may start a conversation with
    pub async fn contacts(&self, viewer: &Viewer) -> Result<Vec<user::Model>, InternalError> {
        let others = self
            .user_store
            .list_others_with_staff_flag(&self.db, &viewer.user_id)
            .await?;

        Ok(others
            .into_iter()
            .filter(|(_, is_staff)| access_policy::can_chat_with(viewer, *is_staff))
            .map(|(user, _)| user)
            .collect())
    }

    /// Latest messages the viewer sent or received, newest first
    pub async fn recent(&self, viewer: &Viewer) -> Result<Vec<chat_message::Model>, InternalError> {
        self.chat_store
            .recent_for_user(&self.db, &viewer.user_id, RECENT_MESSAGES)
            .await
    }
}
