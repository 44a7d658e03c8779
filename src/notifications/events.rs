use async_trait::async_trait;
use strum::{Display, IntoStaticStr};

use crate::types::db::ticket::TicketStatus;
use crate::types::db::{comment, ticket, user};

/// Tag stored with each delivered ticket notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    Created,
    StatusChanged,
    Escalated,
    Welcome,
    NewUser,
    CommentAdded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// State changes that have been committed and may warrant a notification
///
/// Events carry every model the templates need, so consumers never touch
/// the database to render them.
#[derive(Debug, Clone)]
pub enum HelpdeskEvent {
    TicketCreated {
        ticket: ticket::Model,
        creator: user::Model,
        staff: Vec<user::Model>,
    },
    TicketStatusChanged {
        ticket: ticket::Model,
        creator: user::Model,
        updated_by: user::Model,
        assignee: Option<user::Model>,
        previous_status: TicketStatus,
    },
    TicketEscalated {
        ticket: ticket::Model,
        creator: user::Model,
        target: user::Model,
        reason: Option<String>,
    },
    CommentAdded {
        ticket: ticket::Model,
        creator: user::Model,
        author: user::Model,
        comment: comment::Model,
    },
    UserRegistered {
        user: user::Model,
        staff: Vec<user::Model>,
    },
}

impl HelpdeskEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HelpdeskEvent::TicketCreated { .. } => "ticket_created",
            HelpdeskEvent::TicketStatusChanged { .. } => "ticket_status_changed",
            HelpdeskEvent::TicketEscalated { .. } => "ticket_escalated",
            HelpdeskEvent::CommentAdded { .. } => "comment_added",
            HelpdeskEvent::UserRegistered { .. } => "user_registered",
        }
    }
}

/// Consumer of committed domain events
///
/// `publish` never fails: whatever goes wrong inside a sink is its own
/// business and must not reach the code that changed the state.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: HelpdeskEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings_are_snake_case() {
        assert_eq!(NotificationKind::Created.as_str(), "created");
        assert_eq!(NotificationKind::StatusChanged.as_str(), "status_changed");
        assert_eq!(NotificationKind::NewUser.to_string(), "new_user");
        assert_eq!(NotificationKind::CommentAdded.as_str(), "comment_added");
    }
}
