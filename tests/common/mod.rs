// Common test utilities for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};
use tempfile::TempDir;

use helpdesk_backend::config::{migrate_database, HelpdeskSettings, SecretManager};
use helpdesk_backend::coordinators::{
    AnalyticsCoordinator, CollaborationCoordinator, MessagingCoordinator, TicketCoordinator,
    UserCoordinator,
};
use helpdesk_backend::notifications::{DeliveryError, MailTransport, OutgoingMail};
use helpdesk_backend::storage::LocalBlobStore;
use helpdesk_backend::types::db::user;
use helpdesk_backend::types::internal::context::RequestContext;
use helpdesk_backend::types::internal::ticket::NewTicket;
use helpdesk_backend::types::internal::user::Registration;
use helpdesk_backend::types::internal::Viewer;
use helpdesk_backend::AppData;

pub const ESCALATION_CONTACT: &str = "primary@helpdesk.test";

/// Creates an in-memory database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    migrate_database(&db)
        .await
        .expect("Failed to run migrations");

    db
}

/// Mail transport that records outgoing messages
///
/// Messages to addresses in `failing` are rejected.
pub struct RecordingMailTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingMailTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().push(address.to_string());
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.subject).collect()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let failing = self.failing.lock().unwrap();
        if mail.to.iter().any(|to| failing.contains(to)) {
            return Err(DeliveryError::Transport {
                transport: "recording",
                message: "mailbox unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Fully wired application over an in-memory database
pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub mail: Arc<RecordingMailTransport>,
    pub users: UserCoordinator,
    pub tickets: TicketCoordinator,
    pub collaboration: CollaborationCoordinator,
    pub messaging: MessagingCoordinator,
    pub analytics: AnalyticsCoordinator,
    pub attachment_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = setup_test_db().await;
        let attachments = TempDir::new().expect("Failed to create attachment dir");
        let mail = Arc::new(RecordingMailTransport::new());

        let app_data = Arc::new(AppData::from_parts(
            db,
            HelpdeskSettings::default().with_escalation_contact(ESCALATION_CONTACT),
            SecretManager::from_values("test-pepper-for-integration-tests", None),
            Arc::new(LocalBlobStore::new(attachments.path())),
            mail.clone(),
        ));

        Self {
            users: UserCoordinator::new(app_data.clone()),
            tickets: TicketCoordinator::new(app_data.clone()),
            collaboration: CollaborationCoordinator::new(app_data.clone()),
            messaging: MessagingCoordinator::new(app_data.clone()),
            analytics: AnalyticsCoordinator::new(app_data.clone()),
            app_data,
            mail,
            attachment_dir: attachments,
        }
    }

    /// Regular files currently stored under the attachment root
    pub fn stored_files(&self) -> usize {
        fn count(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|entry| {
                            let path = entry.path();
                            if path.is_dir() {
                                count(&path)
                            } else {
                                1
                            }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        count(self.attachment_dir.path())
    }

    pub fn ctx(&self) -> RequestContext {
        RequestContext::for_cli("integration_test")
    }

    /// Register a user, optionally grant staff, and return it with its viewer
    pub async fn user(&self, username: &str, is_staff: bool) -> (user::Model, Viewer) {
        let ctx = self.ctx();
        let (user, _) = self
            .users
            .register(
                &ctx,
                Registration {
                    username: username.to_string(),
                    email: format!("{}@example.com", username),
                    first_name: username.to_string(),
                    last_name: "Tester".to_string(),
                    password: "correct-horse-battery".to_string(),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to register user");

        if is_staff {
            self.users
                .set_staff(&ctx, username, true)
                .await
                .expect("Failed to grant staff");
        }

        let viewer = self
            .users
            .resolve_viewer(&user.id)
            .await
            .expect("Failed to resolve viewer");
        (user, viewer)
    }

    pub fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: format!("{} - details", title),
            category: "hardware".to_string(),
            priority: "high".to_string(),
            deadline: None,
        }
    }
}
