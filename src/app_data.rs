use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{BootstrapSettings, HelpdeskSettings, SecretManager};
use crate::errors::InternalError;
use crate::notifications::{build_transport, EventSink, MailTransport, NotificationDispatcher};
use crate::storage::{BlobStore, LocalBlobStore};
use crate::stores::{
    AttachmentStore, ChatStore, CommentStore, NotificationStore, TicketStore, UserStore,
};

/// Centralized application data following the main-owned stores pattern
///
/// Everything is created once at startup and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ├─ db (DatabaseConnection)
///   ├─ settings / secret_manager
///   ├─ stores (user, ticket, comment, attachment, chat, notification)
///   ├─ blob_store (Arc<dyn BlobStore>)
///   ├─ mail_transport (Arc<dyn MailTransport>)
///   └─ event_sink (NotificationDispatcher)
///   ↓ wrapped in Arc<AppData>
///   ├─ TicketCoordinator::new(app_data)
///   └─ ...
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub settings: Arc<HelpdeskSettings>,
    pub secret_manager: Arc<SecretManager>,
    pub user_store: Arc<UserStore>,
    pub ticket_store: Arc<TicketStore>,
    pub comment_store: Arc<CommentStore>,
    pub attachment_store: Arc<AttachmentStore>,
    pub chat_store: Arc<ChatStore>,
    pub notification_store: Arc<NotificationStore>,
    pub blob_store: Arc<dyn BlobStore>,
    pub mail_transport: Arc<dyn MailTransport>,
    pub event_sink: Arc<dyn EventSink>,
}

impl AppData {
    /// Initialize all application data from the environment
    ///
    /// The database should be connected and migrated before calling this.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` when settings, secrets or the mail transport
    /// cannot be initialized
    pub async fn init(
        db: DatabaseConnection,
        bootstrap_settings: &BootstrapSettings,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        let settings = HelpdeskSettings::from_env().map_err(|e| {
            InternalError::parse("helpdesk_settings", format!("Settings load failed: {}", e))
        })?;

        tracing::debug!("Initializing secret manager...");
        let secret_manager = SecretManager::init().map_err(|e| {
            InternalError::parse("secret_manager", format!("Secret manager init failed: {}", e))
        })?;
        tracing::debug!("Secret manager initialized");

        let mail_transport = build_transport(settings.smtp(), &secret_manager).map_err(|e| {
            InternalError::parse("mail_transport", format!("Mail transport init failed: {}", e))
        })?;

        let blob_store: Arc<dyn BlobStore> =
            Arc::new(LocalBlobStore::new(bootstrap_settings.attachment_root()));

        let app_data = Self::from_parts(db, settings, secret_manager, blob_store, mail_transport);

        tracing::info!("AppData initialization complete");
        Ok(app_data)
    }

    /// Assemble AppData from already-built collaborators
    pub fn from_parts(
        db: DatabaseConnection,
        settings: HelpdeskSettings,
        secret_manager: SecretManager,
        blob_store: Arc<dyn BlobStore>,
        mail_transport: Arc<dyn MailTransport>,
    ) -> Self {
        let notification_store = Arc::new(NotificationStore::new());

        let event_sink: Arc<dyn EventSink> = Arc::new(NotificationDispatcher::new(
            db.clone(),
            mail_transport.clone(),
            notification_store.clone(),
            &settings,
        ));

        Self {
            db,
            settings: Arc::new(settings),
            secret_manager: Arc::new(secret_manager),
            user_store: Arc::new(UserStore::new()),
            ticket_store: Arc::new(TicketStore::new()),
            comment_store: Arc::new(CommentStore::new()),
            attachment_store: Arc::new(AttachmentStore::new()),
            chat_store: Arc::new(ChatStore::new()),
            notification_store,
            blob_store,
            mail_transport,
            event_sink,
        }
    }
}
