use std::ops::AddAssign;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::config::HelpdeskSettings;
use crate::stores::NotificationStore;
use crate::types::db::{ticket, user};

use super::events::{EventSink, HelpdeskEvent, NotificationKind};
use super::mailer::{MailTransport, OutgoingMail};
use super::templates::{self, NotificationContext};

/// One delivery target
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub email: String,
    /// Set for registered users; only they get a notification record
    pub user_id: Option<String>,
}

impl Recipient {
    pub fn user(user: &user::Model) -> Self {
        Self {
            email: user.email.clone(),
            user_id: Some(user.id.clone()),
        }
    }

    pub fn address(email: &str) -> Self {
        Self {
            email: email.to_string(),
            user_id: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl AddAssign for DispatchReport {
    fn add_assign(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Renders notifications and delivers them one recipient at a time
///
/// Delivery is best-effort: failures are logged at `warn` and never retried
/// or returned to the caller.
pub struct NotificationDispatcher {
    db: DatabaseConnection,
    transport: Arc<dyn MailTransport>,
    notification_store: Arc<NotificationStore>,
    from_email: String,
    site_url: String,
    escalation_contact: String,
}

impl NotificationDispatcher {
    pub fn new(
        db: DatabaseConnection,
        transport: Arc<dyn MailTransport>,
        notification_store: Arc<NotificationStore>,
        settings: &HelpdeskSettings,
    ) -> Self {
        Self {
            db,
            transport,
            notification_store,
            from_email: settings.default_from_email().to_string(),
            site_url: settings.site_url().to_string(),
            escalation_contact: settings.escalation_contact_email().to_string(),
        }
    }

    /// Render `context` once and deliver it to each recipient independently
    pub async fn notify(
        &self,
        recipients: &[Recipient],
        context: &NotificationContext<'_>,
    ) -> DispatchReport {
        let kind = context.kind();
        let rendered = templates::render(context, &self.site_url);
        let mut report = DispatchReport::default();

        for recipient in recipients {
            let mail = OutgoingMail {
                subject: rendered.subject.clone(),
                html_body: rendered.html_body.clone(),
                from: self.from_email.clone(),
                to: vec![recipient.email.clone()],
            };

            match self.transport.send(&mail).await {
                Ok(()) => {
                    report.delivered += 1;
                    tracing::info!(
                        kind = %kind,
                        to = %recipient.email,
                        transport = self.transport.name(),
                        "Notification sent"
                    );
                    self.record(kind, context.ticket(), recipient).await;
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        kind = %kind,
                        to = %recipient.email,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }

        report
    }

    /// Fan an event out to the notifications it implies
    pub async fn dispatch(&self, event: &HelpdeskEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        match event {
            HelpdeskEvent::TicketCreated {
                ticket,
                creator,
                staff,
            } => {
                report += self
                    .notify(
                        &[Recipient::user(creator)],
                        &NotificationContext::TicketCreated {
                            ticket,
                            creator,
                            for_staff: false,
                        },
                    )
                    .await;
                let staff: Vec<Recipient> = staff.iter().map(Recipient::user).collect();
                report += self
                    .notify(
                        &staff,
                        &NotificationContext::TicketCreated {
                            ticket,
                            creator,
                            for_staff: true,
                        },
                    )
                    .await;
            }
            HelpdeskEvent::TicketStatusChanged {
                ticket,
                creator,
                updated_by,
                assignee,
                previous_status,
            } => {
                report += self
                    .notify(
                        &[Recipient::user(creator)],
                        &NotificationContext::StatusChanged {
                            ticket,
                            creator,
                            updated_by,
                            assignee: assignee.as_ref(),
                            previous_status: *previous_status,
                        },
                    )
                    .await;
            }
            HelpdeskEvent::TicketEscalated {
                ticket,
                creator,
                target,
                reason,
            } => {
                for (recipient, copy) in [
                    (Recipient::user(target), false),
                    (Recipient::address(&self.escalation_contact), true),
                ] {
                    report += self
                        .notify(
                            &[recipient],
                            &NotificationContext::Escalated {
                                ticket,
                                creator,
                                target,
                                reason: reason.as_deref(),
                                copy,
                            },
                        )
                        .await;
                }
            }
            HelpdeskEvent::CommentAdded {
                ticket,
                creator,
                author,
                comment,
            } => {
                report += self
                    .notify(
                        &[Recipient::user(creator)],
                        &NotificationContext::CommentAdded {
                            ticket,
                            author,
                            content: &comment.content,
                        },
                    )
                    .await;
            }
            HelpdeskEvent::UserRegistered { user, staff } => {
                report += self
                    .notify(&[Recipient::user(user)], &NotificationContext::Welcome { user })
                    .await;
                let staff: Vec<Recipient> = staff.iter().map(Recipient::user).collect();
                report += self
                    .notify(&staff, &NotificationContext::NewUser { user })
                    .await;
            }
        }

        report
    }

    async fn record(
        &self,
        kind: NotificationKind,
        ticket: Option<&ticket::Model>,
        recipient: &Recipient,
    ) {
        let (Some(ticket), Some(user_id)) = (ticket, recipient.user_id.as_deref()) else {
            return;
        };

        if let Err(e) = self
            .notification_store
            .insert(&self.db, ticket.id, user_id, kind.as_str(), Utc::now().timestamp())
            .await
        {
            tracing::warn!(
                kind = %kind,
                ticket_id = %ticket.ticket_id,
                user_id = %user_id,
                error = %e,
                "Failed to record notification"
            );
        }
    }
}

#[async_trait]
impl EventSink for NotificationDispatcher {
    async fn publish(&self, event: HelpdeskEvent) {
        let report = self.dispatch(&event).await;
        tracing::debug!(
            event = event.name(),
            delivered = report.delivered,
            failed = report.failed,
            "Event dispatched"
        );
    }
}
