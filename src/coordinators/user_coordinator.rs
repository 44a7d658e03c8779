use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::errors::internal::{ConflictError, NotFoundError, ValidationError};
use crate::errors::InternalError;
use crate::notifications::{EventSink, HelpdeskEvent};
use crate::providers::{access_policy, ticket_rules, CredentialProvider};
use crate::stores::{NewUser, NotificationStore, UserStore};
use crate::types::db::{profile, ticket, ticket_notification, user};
use crate::types::internal::context::RequestContext;
use crate::types::internal::user::{ProfileUpdate, Registration};
use crate::types::internal::Viewer;

/// Shortest accepted password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Account, profile and per-user notification workflows
pub struct UserCoordinator {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    notification_store: Arc<NotificationStore>,
    credential_provider: Arc<CredentialProvider>,
    event_sink: Arc<dyn EventSink>,
}

impl UserCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        let credential_provider = Arc::new(CredentialProvider::new(
            app_data.secret_manager.password_pepper(),
        ));

        Self {
            db: app_data.db.clone(),
            user_store: app_data.user_store.clone(),
            notification_store: app_data.notification_store.clone(),
            credential_provider,
            event_sink: app_data.event_sink.clone(),
        }
    }

    /// Orchestrate user registration
    ///
    /// Coordinates the sequence of operations:
    /// 1. Validate username, email and password
    /// 2. Hash the password
    /// 3. Insert user and profile in one transaction, loading the staff to notify
    /// 4. After commit, publish `UserRegistered` (welcome + staff notice)
    ///
    /// # Errors
    /// * `ValidationError` - missing fields, bad email, short password
    /// * `ConflictError::DuplicateUsername` - username taken
    pub async fn register(
        &self,
        ctx: &RequestContext,
        registration: Registration,
    ) -> Result<(user::Model, profile::Model), InternalError> {
        // Step 1: Validate
        let username = ticket_rules::require_text("username", &registration.username)?;
        let email = ticket_rules::require_text("email", &registration.email)?;
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail(email).into());
        }
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            }
            .into());
        }

        // Step 2: Hash
        let password_hash = self.credential_provider.hash_password(&registration.password)?;

        // Step 3: Persist user and profile together
        let now = Utc::now().timestamp();
        let txn = begin_transaction(&self.db).await?;
        if self.user_store.username_exists(&txn, &username).await? {
            return Err(ConflictError::DuplicateUsername(username).into());
        }
        let user = self
            .user_store
            .insert_user(
                &txn,
                NewUser {
                    id: Uuid::new_v4().to_string(),
                    username,
                    email,
                    first_name: registration.first_name.trim().to_string(),
                    last_name: registration.last_name.trim().to_string(),
                    password_hash,
                },
                now,
            )
            .await?;
        let profile = self
            .user_store
            .insert_profile(
                &txn,
                &user.id,
                non_empty(registration.department),
                non_empty(registration.phone_number),
                now,
            )
            .await?;
        let staff = self.user_store.list_staff(&txn).await?;
        commit_transaction(txn).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            user_id = %user.id,
            username = %user.username,
            "User registered"
        );

        // Step 4: Notify
        self.event_sink
            .publish(HelpdeskEvent::UserRegistered {
                user: user.clone(),
                staff,
            })
            .await;

        Ok((user, profile))
    }

    /// Identify the caller of a request
    ///
    /// # Errors
    /// `NotFoundError::User` for unknown or deactivated users
    pub async fn resolve_viewer(&self, user_id: &str) -> Result<Viewer, InternalError> {
        let (user, profile) = self.user_store.get_with_profile(&self.db, user_id).await?;
        if !user.is_active {
            return Err(NotFoundError::User(user_id.to_string()).into());
        }
        Ok(Viewer::from_models(&user, &profile))
    }

    pub async fn me(&self, viewer: &Viewer) -> Result<(user::Model, profile::Model), InternalError> {
        self.user_store.get_with_profile(&self.db, &viewer.user_id).await
    }

    /// Apply the fields present in `update`; an empty string clears an optional field
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        viewer: &Viewer,
        update: ProfileUpdate,
    ) -> Result<profile::Model, InternalError> {
        let (_, current) = self.user_store.get_with_profile(&self.db, &viewer.user_id).await?;

        let mut active: profile::ActiveModel = current.into();
        if let Some(department) = update.department {
            active.department = Set(non_empty(Some(department)));
        }
        if let Some(phone_number) = update.phone_number {
            active.phone_number = Set(non_empty(Some(phone_number)));
        }
        if let Some(dark_mode) = update.dark_mode {
            active.dark_mode = Set(dark_mode);
        }
        active.updated_at = Set(Utc::now().timestamp());

        let updated = self.user_store.update_profile(&self.db, active).await?;
        tracing::info!(request_id = %ctx.request_id, user_id = %viewer.user_id, "Profile updated");
        Ok(updated)
    }

    /// Flip the UI preference and return the new value
    pub async fn toggle_dark_mode(&self, viewer: &Viewer) -> Result<bool, InternalError> {
        let (_, current) = self.user_store.get_with_profile(&self.db, &viewer.user_id).await?;
        let enabled = !current.dark_mode;

        let mut active: profile::ActiveModel = current.into();
        active.dark_mode = Set(enabled);
        active.updated_at = Set(Utc::now().timestamp());
        self.user_store.update_profile(&self.db, active).await?;

        Ok(enabled)
    }

    /// Grant or revoke the staff flag (administrative, no viewer check)
    pub async fn set_staff(
        &self,
        ctx: &RequestContext,
        username: &str,
        is_staff: bool,
    ) -> Result<profile::Model, InternalError> {
        let user = self.user_store.get_by_username(&self.db, username).await?;
        let (_, current) = self.user_store.get_with_profile(&self.db, &user.id).await?;

        let mut active: profile::ActiveModel = current.into();
        active.is_it_staff = Set(is_staff);
        active.updated_at = Set(Utc::now().timestamp());
        let updated = self.user_store.update_profile(&self.db, active).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            actor = %ctx.actor_label(),
            username = %username,
            is_staff,
            "Staff flag changed"
        );
        Ok(updated)
    }

    pub async fn list_staff(&self) -> Result<Vec<user::Model>, InternalError> {
        self.user_store.list_staff(&self.db).await
    }

    /// Staff members a ticket can be escalated to, excluding the viewer
    pub async fn escalation_candidates(&self, viewer: &Viewer) -> Result<Vec<user::Model>, InternalError> {
        access_policy::require(access_policy::can_escalate(viewer), "escalate tickets")?;
        let staff = self.user_store.list_staff(&self.db).await?;
        Ok(staff.into_iter().filter(|u| u.id != viewer.user_id).collect())
    }

    pub async fn list_notifications(
        &self,
        viewer: &Viewer,
        unread_only: bool,
    ) -> Result<Vec<(ticket_notification::Model, Option<ticket::Model>)>, InternalError> {
        self.notification_store
            .list_for_user(&self.db, &viewer.user_id, unread_only)
            .await
    }

    /// # Errors
    /// `NotFoundError::Notification` unless the viewer is the notification's target
    pub async fn mark_notification_read(
        &self,
        viewer: &Viewer,
        notification_id: i64,
    ) -> Result<ticket_notification::Model, InternalError> {
        self.notification_store
            .mark_read(&self.db, &viewer.user_id, notification_id)
            .await
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
