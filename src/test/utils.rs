// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Mutex;

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, IntoActiveModel, Set};

use crate::notifications::{DeliveryError, MailTransport, OutgoingMail};
use crate::stores::{NewUser, TicketInsert, TicketStore, UserStore};
use crate::types::db::ticket::{TicketCategory, TicketPriority};
use crate::types::db::{ticket, user};

/// Fixed timestamp used for seeded rows
pub const SEED_TIME: i64 = 1_700_000_000;

/// In-memory SQLite database with all migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Insert a user with a profile; email is `<username>@example.com`
pub async fn seed_user(db: &DatabaseConnection, username: &str, is_staff: bool) -> user::Model {
    let store = UserStore::new();
    let user = store
        .insert_user(
            db,
            NewUser {
                id: uuid::Uuid::new_v4().to_string(),
                username: username.to_string(),
                email: format!("{}@example.com", username),
                first_name: username.to_string(),
                last_name: "Tester".to_string(),
                password_hash: "not-a-real-hash".to_string(),
            },
            SEED_TIME,
        )
        .await
        .expect("Failed to seed user");

    let profile = store
        .insert_profile(db, &user.id, None, None, SEED_TIME)
        .await
        .expect("Failed to seed profile");

    if is_staff {
        let mut active = profile.into_active_model();
        active.is_it_staff = Set(true);
        active.update(db).await.expect("Failed to flag staff");
    }

    user
}

/// Insert an open medium-priority hardware ticket
pub async fn seed_ticket(
    db: &DatabaseConnection,
    creator: &user::Model,
    ticket_id: &str,
) -> ticket::Model {
    TicketStore::new()
        .insert(
            db,
            TicketInsert {
                ticket_id: ticket_id.to_string(),
                title: "Laptop will not boot".to_string(),
                description: "Black screen after the update".to_string(),
                category: TicketCategory::Hardware,
                priority: TicketPriority::Medium,
                created_by: creator.id.clone(),
                deadline: None,
            },
            SEED_TIME,
        )
        .await
        .expect("Failed to seed ticket")
}

/// Mail transport that records messages instead of sending them
///
/// Recipients listed in `failing_for` get a transport error.
pub struct RecordingMailTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: Vec<String>,
}

impl RecordingMailTransport {
    pub fn new() -> Self {
        Self::failing_for(&[])
    }

    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    /// First recipient of every recorded message, in send order
    pub fn recipients(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| m.to.into_iter().next())
            .collect()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        if mail.to.iter().any(|to| self.failing.contains(to)) {
            return Err(DeliveryError::Transport {
                transport: self.name(),
                message: "connection refused".to_string(),
            });
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
