mod common;

use sea_orm::EntityTrait;

use common::TestApp;
use helpdesk_backend::errors::internal::{AuthorizationError, NotFoundError, ValidationError};
use helpdesk_backend::errors::InternalError;
use helpdesk_backend::stores::TicketInsert;
use helpdesk_backend::types::db::ticket::{self, TicketCategory, TicketPriority, TicketStatus};
use helpdesk_backend::types::internal::ticket::{StatusChange, TicketFilter};
use helpdesk_backend::types::internal::Viewer;

fn change(status: &str) -> StatusChange {
    StatusChange {
        status: status.to_string(),
        assignee_id: None,
    }
}

#[tokio::test]
async fn test_ticket_ids_are_sequential_and_prefixed() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let ctx = app.ctx();

    let first = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Printer")).await.unwrap();
    let second = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("VPN")).await.unwrap();

    assert_eq!(first.ticket_id, "JIAI-00001");
    assert_eq!(second.ticket_id, "JIAI-00002");
    assert_eq!(first.status, TicketStatus::Open);
    assert_eq!(first.resolved_at, None);
}

#[tokio::test]
async fn test_deleted_ticket_id_is_not_reused() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let ctx = app.ctx();

    app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("One")).await.unwrap();
    let second = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Two")).await.unwrap();

    ticket::Entity::delete_by_id(second.id)
        .exec(&app.app_data.db)
        .await
        .unwrap();

    let third = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Three")).await.unwrap();
    assert_eq!(third.ticket_id, "JIAI-00003");
}

#[tokio::test]
async fn test_create_skips_ids_taken_outside_the_sequence() {
    let app = TestApp::new().await;
    let (alice, alice_v) = app.user("alice", false).await;
    let ctx = app.ctx();

    // A row imported with the ID the sequence would hand out next
    app.app_data
        .ticket_store
        .insert(
            &app.app_data.db,
            TicketInsert {
                ticket_id: "JIAI-00001".to_string(),
                title: "Imported".to_string(),
                description: "Legacy ticket".to_string(),
                category: TicketCategory::Other,
                priority: TicketPriority::Low,
                created_by: alice.id.clone(),
                deadline: None,
            },
            1_700_000_000,
        )
        .await
        .unwrap();

    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("New")).await.unwrap();
    assert_eq!(created.ticket_id, "JIAI-00002");
}

#[tokio::test]
async fn test_create_rejects_unknown_priority() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;

    let mut new_ticket = TestApp::new_ticket("Mouse");
    new_ticket.priority = "critical".to_string();

    let result = app.tickets.create(&app.ctx(), &alice_v, new_ticket).await;
    match result {
        Err(InternalError::Validation(ValidationError::InvalidChoice { field, value })) => {
            assert_eq!(field, "priority");
            assert_eq!(value, "critical");
        }
        other => panic!("Expected InvalidChoice, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_lifecycle_sets_and_clears_resolved_at() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (sam, sam_v) = app.user("sam", true).await;
    let ctx = app.ctx();

    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Laptop")).await.unwrap();

    let in_progress = app
        .tickets
        .update_status(
            &ctx,
            &sam_v,
            &created.ticket_id,
            StatusChange {
                status: "in_progress".to_string(),
                assignee_id: Some(sam.id.clone()),
            },
        )
        .await
        .unwrap();
    assert_eq!(in_progress.status, TicketStatus::InProgress);
    assert_eq!(in_progress.assigned_to.as_deref(), Some(sam.id.as_str()));
    assert_eq!(in_progress.resolved_at, None);

    let resolved = app
        .tickets
        .update_status(&ctx, &sam_v, &created.ticket_id, change("resolved"))
        .await
        .unwrap();
    let resolved_at = resolved.resolved_at.expect("resolved_at should be set");

    // Resolving again keeps the original timestamp
    let again = app
        .tickets
        .update_status(&ctx, &sam_v, &created.ticket_id, change("resolved"))
        .await
        .unwrap();
    assert_eq!(again.resolved_at, Some(resolved_at));
    // Assignment survives a change that names no assignee
    assert_eq!(again.assigned_to.as_deref(), Some(sam.id.as_str()));

    let reopened = app
        .tickets
        .update_status(&ctx, &sam_v, &created.ticket_id, change("open"))
        .await
        .unwrap();
    assert_eq!(reopened.resolved_at, None);
}

#[tokio::test]
async fn test_status_update_requires_staff() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let ctx = app.ctx();
    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Laptop")).await.unwrap();

    let result = app
        .tickets
        .update_status(&ctx, &alice_v, &created.ticket_id, change("resolved"))
        .await;

    match result {
        Err(InternalError::Authorization(AuthorizationError::StaffRequired { .. })) => {}
        other => panic!("Expected StaffRequired, got {:?}", other),
    }

    let stored = app.tickets.detail(&alice_v, &created.ticket_id).await.unwrap();
    assert_eq!(stored.ticket.status, TicketStatus::Open);
}

#[tokio::test]
async fn test_status_update_unknown_ticket() {
    let app = TestApp::new().await;
    let (_sam, sam_v) = app.user("sam", true).await;

    let result = app
        .tickets
        .update_status(&app.ctx(), &sam_v, "JIAI-99999", change("resolved"))
        .await;

    match result {
        Err(InternalError::NotFound(NotFoundError::Ticket(id))) => assert_eq!(id, "JIAI-99999"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_escalation_sets_target_and_records_reason() {
    let app = TestApp::new().await;
    let (alice, alice_v) = app.user("alice", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;
    let (tess, _tess_v) = app.user("tess", true).await;
    let ctx = app.ctx();

    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Server down")).await.unwrap();
    app.tickets
        .update_status(&ctx, &sam_v, &created.ticket_id, change("resolved"))
        .await
        .unwrap();
    app.mail.clear();

    let escalated = app
        .tickets
        .escalate(
            &ctx,
            &sam_v,
            &created.ticket_id,
            &tess.id,
            Some("  Needs vendor support ".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(escalated.status, TicketStatus::Escalated);
    assert_eq!(escalated.assigned_to.as_deref(), Some(tess.id.as_str()));
    assert_eq!(escalated.escalated_to.as_deref(), Some(tess.id.as_str()));
    assert_eq!(escalated.resolved_at, None);

    let staff_comments = app
        .collaboration
        .list_comments(&sam_v, &created.ticket_id)
        .await
        .unwrap();
    assert_eq!(staff_comments.len(), 1);
    assert_eq!(staff_comments[0].content, "ESCALATION REASON: Needs vendor support");
    assert!(staff_comments[0].is_internal);

    // The creator never sees the internal reason
    let creator_comments = app
        .collaboration
        .list_comments(&alice_v, &created.ticket_id)
        .await
        .unwrap();
    assert!(creator_comments.is_empty());

    let recipients: Vec<String> = app.mail.sent().into_iter().flat_map(|m| m.to).collect();
    assert_eq!(
        recipients,
        vec![tess.email.clone(), common::ESCALATION_CONTACT.to_string()]
    );
    assert!(!recipients.contains(&alice.email));
}

#[tokio::test]
async fn test_escalation_without_reason_adds_no_comment() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;
    let (tess, _) = app.user("tess", true).await;
    let ctx = app.ctx();

    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Disk")).await.unwrap();
    app.tickets
        .escalate(&ctx, &sam_v, &created.ticket_id, &tess.id, Some("   ".to_string()))
        .await
        .unwrap();

    let comments = app.collaboration.list_comments(&sam_v, &created.ticket_id).await.unwrap();
    assert!(comments.is_empty());
}

#[tokio::test]
async fn test_escalation_requires_staff() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (tess, _) = app.user("tess", true).await;
    let ctx = app.ctx();
    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Disk")).await.unwrap();

    let result = app
        .tickets
        .escalate(&ctx, &alice_v, &created.ticket_id, &tess.id, None)
        .await;

    match result {
        Err(InternalError::Authorization(AuthorizationError::StaffRequired { .. })) => {}
        other => panic!("Expected StaffRequired, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_scopes_non_staff_to_own_tickets() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_bob, bob_v) = app.user("bob", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;
    let ctx = app.ctx();

    app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Alice printer")).await.unwrap();
    app.tickets.create(&ctx, &bob_v, TestApp::new_ticket("Bob monitor")).await.unwrap();

    let alice_list = app.tickets.list(&alice_v, TicketFilter::default()).await.unwrap();
    assert_eq!(alice_list.len(), 1);
    assert_eq!(alice_list[0].title, "Alice printer");

    let staff_list = app.tickets.list(&sam_v, TicketFilter::default()).await.unwrap();
    assert_eq!(staff_list.len(), 2);
    // Newest first
    assert_eq!(staff_list[0].title, "Bob monitor");

    let searched = app
        .tickets
        .list(
            &sam_v,
            TicketFilter {
                search: Some("MONITOR".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
}

#[tokio::test]
async fn test_detail_denies_other_users_ticket() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_bob, bob_v) = app.user("bob", false).await;
    let ctx = app.ctx();

    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Private")).await.unwrap();

    match app.tickets.detail(&bob_v, &created.ticket_id).await {
        Err(InternalError::Authorization(AuthorizationError::TicketAccessDenied { ticket_id })) => {
            assert_eq!(ticket_id, created.ticket_id);
        }
        other => panic!("Expected TicketAccessDenied, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dashboard_counts_only_visible_tickets() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_bob, bob_v) = app.user("bob", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;
    let ctx = app.ctx();

    let mine = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("A")).await.unwrap();
    app.tickets.create(&ctx, &bob_v, TestApp::new_ticket("B")).await.unwrap();
    app.tickets
        .update_status(&ctx, &sam_v, &mine.ticket_id, change("resolved"))
        .await
        .unwrap();

    let alice_dash = app.tickets.dashboard(&alice_v).await.unwrap();
    assert_eq!(alice_dash.counts.total, 1);
    assert_eq!(alice_dash.counts.resolved, 1);
    assert_eq!(alice_dash.counts.open, 0);

    let staff_dash = app.tickets.dashboard(&sam_v).await.unwrap();
    assert_eq!(staff_dash.counts.total, 2);
    assert_eq!(staff_dash.counts.high, 2);
}

#[tokio::test]
async fn test_calendar_groups_by_deadline() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let ctx = app.ctx();
    let day = chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

    for title in ["First", "Second"] {
        let mut new_ticket = TestApp::new_ticket(title);
        new_ticket.deadline = Some(day);
        app.tickets.create(&ctx, &alice_v, new_ticket).await.unwrap();
    }
    app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("No deadline")).await.unwrap();

    let calendar = app.tickets.calendar(&alice_v).await.unwrap();
    assert_eq!(calendar.len(), 1);
    assert_eq!(calendar[0].date, day);
    assert_eq!(calendar[0].tickets.len(), 2);
}

#[tokio::test]
async fn test_status_update_rejects_unknown_status() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;
    let ctx = app.ctx();
    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Laptop")).await.unwrap();

    let result = app
        .tickets
        .update_status(&ctx, &sam_v, &created.ticket_id, change("done"))
        .await;

    match result {
        Err(InternalError::Validation(ValidationError::InvalidChoice { field, value })) => {
            assert_eq!(field, "status");
            assert_eq!(value, "done");
        }
        other => panic!("Expected InvalidChoice, got {:?}", other),
    }

    let stored = app.tickets.detail(&sam_v, &created.ticket_id).await.unwrap();
    assert_eq!(stored.ticket.status, TicketStatus::Open);
}

#[tokio::test]
async fn test_status_update_with_unknown_assignee_changes_nothing() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;
    let ctx = app.ctx();
    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Laptop")).await.unwrap();

    let result = app
        .tickets
        .update_status(
            &ctx,
            &sam_v,
            &created.ticket_id,
            StatusChange {
                status: "resolved".to_string(),
                assignee_id: Some("no-such-user".to_string()),
            },
        )
        .await;

    match result {
        Err(InternalError::NotFound(NotFoundError::User(id))) => assert_eq!(id, "no-such-user"),
        other => panic!("Expected NotFound, got {:?}", other),
    }

    let stored = app.tickets.detail(&sam_v, &created.ticket_id).await.unwrap();
    assert_eq!(stored.ticket.status, TicketStatus::Open);
    assert_eq!(stored.ticket.assigned_to, None);
    assert_eq!(stored.ticket.resolved_at, None);
}

#[tokio::test]
async fn test_status_update_by_staff_without_user_record_still_succeeds() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let ctx = app.ctx();
    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Laptop")).await.unwrap();
    app.mail.clear();

    // Committed changes are reported as such even when the event cannot be built
    let ghost = Viewer::new("no-such-user", true);
    let updated = app
        .tickets
        .update_status(&ctx, &ghost, &created.ticket_id, change("resolved"))
        .await
        .expect("committed status change must be reported as success");

    assert_eq!(updated.status, TicketStatus::Resolved);
    assert!(updated.resolved_at.is_some());
    assert!(app.mail.sent().is_empty());

    let stored = app.tickets.detail(&ghost, &created.ticket_id).await.unwrap();
    assert_eq!(stored.ticket.status, TicketStatus::Resolved);
}

#[tokio::test]
async fn test_create_by_unknown_user_writes_nothing() {
    let app = TestApp::new().await;
    let (_sam, sam_v) = app.user("sam", true).await;

    let result = app
        .tickets
        .create(&app.ctx(), &Viewer::new("no-such-user", false), TestApp::new_ticket("Laptop"))
        .await;

    match result {
        Err(InternalError::NotFound(NotFoundError::User(id))) => assert_eq!(id, "no-such-user"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(app.tickets.list(&sam_v, TicketFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_escalation_survives_failed_deliveries() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;
    let (tess, _) = app.user("tess", true).await;
    let ctx = app.ctx();
    let created = app.tickets.create(&ctx, &alice_v, TestApp::new_ticket("Server down")).await.unwrap();

    app.mail.fail_for(&tess.email);
    app.mail.fail_for(common::ESCALATION_CONTACT);
    app.mail.clear();

    let escalated = app
        .tickets
        .escalate(&ctx, &sam_v, &created.ticket_id, &tess.id, Some("Vendor call".to_string()))
        .await
        .expect("escalation must succeed despite mail failures");

    assert!(app.mail.sent().is_empty());
    assert_eq!(escalated.status, TicketStatus::Escalated);

    let stored = app.tickets.detail(&sam_v, &created.ticket_id).await.unwrap();
    assert_eq!(stored.ticket.status, TicketStatus::Escalated);
    assert_eq!(stored.ticket.assigned_to.as_deref(), Some(tess.id.as_str()));
    assert_eq!(stored.ticket.escalated_to.as_deref(), Some(tess.id.as_str()));
    assert_eq!(stored.comments.len(), 1);
    assert_eq!(stored.comments[0].content, "ESCALATION REASON: Vendor call");
    assert!(stored.comments[0].is_internal);
}
