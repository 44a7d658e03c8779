//! Capability checks over a `Viewer`
//!
//! Every boundary that branches on the staff flag calls one of these
//! predicates; none of them touch storage.

use crate::errors::internal::AuthorizationError;
use crate::types::db::ticket;
use crate::types::internal::Viewer;

pub fn can_view_ticket(viewer: &Viewer, ticket: &ticket::Model) -> bool {
    viewer.is_staff || ticket.created_by == viewer.user_id
}

pub fn can_escalate(viewer: &Viewer) -> bool {
    viewer.is_staff
}

pub fn can_see_internal_comment(viewer: &Viewer) -> bool {
    viewer.is_staff
}

pub fn can_view_analytics(viewer: &Viewer) -> bool {
    viewer.is_staff
}

pub fn can_update_status(viewer: &Viewer) -> bool {
    viewer.is_staff
}

pub fn can_mark_internal(viewer: &Viewer) -> bool {
    viewer.is_staff
}

/// Staff may chat with anyone, everyone else only with staff
pub fn can_chat_with(viewer: &Viewer, other_is_staff: bool) -> bool {
    viewer.is_staff || other_is_staff
}

/// UI hint: offer escalation only on unfinished tickets
pub fn show_escalate_action(viewer: &Viewer, ticket: &ticket::Model) -> bool {
    can_escalate(viewer) && !ticket.status.is_finished()
}

/// Turn a predicate result into an error naming the attempted action
pub fn require(allowed: bool, action: &'static str) -> Result<(), AuthorizationError> {
    if allowed {
        Ok(())
    } else {
        Err(AuthorizationError::staff_required(action))
    }
}

pub fn require_ticket_access(viewer: &Viewer, ticket: &ticket::Model) -> Result<(), AuthorizationError> {
    if can_view_ticket(viewer, ticket) {
        Ok(())
    } else {
        Err(AuthorizationError::TicketAccessDenied {
            ticket_id: ticket.ticket_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::db::ticket::{TicketCategory, TicketPriority, TicketStatus};

    fn ticket_owned_by(user_id: &str, status: TicketStatus) -> ticket::Model {
        ticket::Model {
            id: 1,
            ticket_id: "JIAI-00001".to_string(),
            title: "Printer jammed".to_string(),
            description: "Paper stuck in tray 2".to_string(),
            category: TicketCategory::Hardware,
            priority: TicketPriority::Medium,
            status,
            created_by: user_id.to_string(),
            assigned_to: None,
            escalated_to: None,
            created_at: 0,
            updated_at: 0,
            deadline: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_owner_and_staff_can_view_ticket() {
        let ticket = ticket_owned_by("u-1", TicketStatus::Open);

        assert!(can_view_ticket(&Viewer::new("u-1", false), &ticket));
        assert!(can_view_ticket(&Viewer::new("s-1", true), &ticket));
        assert!(!can_view_ticket(&Viewer::new("u-2", false), &ticket));
    }

    #[test]
    fn test_staff_only_capabilities() {
        let staff = Viewer::new("s-1", true);
        let user = Viewer::new("u-1", false);

        for check in [can_escalate, can_see_internal_comment, can_view_analytics, can_update_status, can_mark_internal] {
            assert!(check(&staff));
            assert!(!check(&user));
        }
    }

    #[test]
    fn test_chat_policy() {
        let staff = Viewer::new("s-1", true);
        let user = Viewer::new("u-1", false);

        assert!(can_chat_with(&staff, false));
        assert!(can_chat_with(&user, true));
        assert!(!can_chat_with(&user, false));
    }

    #[test]
    fn test_escalate_action_hidden_on_finished_tickets() {
        let staff = Viewer::new("s-1", true);

        assert!(show_escalate_action(&staff, &ticket_owned_by("u-1", TicketStatus::InProgress)));
        assert!(show_escalate_action(&staff, &ticket_owned_by("u-1", TicketStatus::Escalated)));
        assert!(!show_escalate_action(&staff, &ticket_owned_by("u-1", TicketStatus::Resolved)));
        assert!(!show_escalate_action(&staff, &ticket_owned_by("u-1", TicketStatus::Closed)));
        assert!(!show_escalate_action(&Viewer::new("u-1", false), &ticket_owned_by("u-1", TicketStatus::Open)));
    }

    #[test]
    fn test_require_reports_action() {
        assert!(require(true, "escalate tickets").is_ok());
        match require(false, "escalate tickets") {
            Err(AuthorizationError::StaffRequired { action }) => assert_eq!(action, "escalate tickets"),
            other => panic!("Expected StaffRequired, got: {:?}", other),
        }
    }

    #[test]
    fn test_require_ticket_access_names_ticket() {
        let ticket = ticket_owned_by("u-1", TicketStatus::Open);
        match require_ticket_access(&Viewer::new("u-2", false), &ticket) {
            Err(AuthorizationError::TicketAccessDenied { ticket_id }) => assert_eq!(ticket_id, "JIAI-00001"),
            other => panic!("Expected TicketAccessDenied, got: {:?}", other),
        }
    }
}
