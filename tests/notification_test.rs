mod common;

use common::TestApp;
use helpdesk_backend::errors::internal::NotFoundError;
use helpdesk_backend::errors::InternalError;
use helpdesk_backend::types::db::ticket::TicketStatus;
use helpdesk_backend::types::internal::ticket::StatusChange;

#[tokio::test]
async fn test_registration_sends_welcome_and_staff_alerts() {
    let app = TestApp::new().await;
    let (sam, _) = app.user("sam", true).await;
    app.mail.clear();

    let (alice, _) = app.user("alice", false).await;

    let sent = app.mail.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, vec![alice.email.clone()]);
    assert_eq!(sent[0].subject, "Welcome to IT Support System!");
    assert_eq!(sent[1].to, vec![sam.email.clone()]);
    assert_eq!(sent[1].subject, "New User Registered: alice");
}

#[tokio::test]
async fn test_ticket_creation_notifies_creator_and_staff() {
    let app = TestApp::new().await;
    let (alice, alice_v) = app.user("alice", false).await;
    let (sam, sam_v) = app.user("sam", true).await;
    app.mail.clear();

    let ticket = app
        .tickets
        .create(&app.ctx(), &alice_v, TestApp::new_ticket("Keyboard"))
        .await
        .unwrap();

    let sent = app.mail.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, vec![alice.email.clone()]);
    assert_eq!(sent[0].subject, format!("Ticket Created: {} - Keyboard", ticket.ticket_id));
    assert_eq!(sent[1].to, vec![sam.email.clone()]);
    assert_eq!(sent[1].subject, format!("New Ticket Created: {} - Keyboard", ticket.ticket_id));

    let staff_notes = app.users.list_notifications(&sam_v, true).await.unwrap();
    assert_eq!(staff_notes.len(), 1);
    assert_eq!(staff_notes[0].0.notification_type, "created");
    assert_eq!(staff_notes[0].1.as_ref().map(|t| t.id), Some(ticket.id));
}

#[tokio::test]
async fn test_delivery_failure_does_not_fail_the_operation() {
    let app = TestApp::new().await;
    let (alice, alice_v) = app.user("alice", false).await;
    let (sam, sam_v) = app.user("sam", true).await;
    let (tess, _) = app.user("tess", true).await;
    app.mail.fail_for(&sam.email);
    app.mail.fail_for(&alice.email);
    app.mail.clear();

    let ticket = app
        .tickets
        .create(&app.ctx(), &alice_v, TestApp::new_ticket("Monitor"))
        .await
        .expect("create must succeed despite mail failures");

    // Only tess could be reached
    let recipients: Vec<String> = app.mail.sent().into_iter().flat_map(|m| m.to).collect();
    assert_eq!(recipients, vec![tess.email.clone()]);

    // Failed deliveries leave no notification record
    assert!(app.users.list_notifications(&sam_v, false).await.unwrap().is_empty());

    let updated = app
        .tickets
        .update_status(
            &app.ctx(),
            &sam_v,
            &ticket.ticket_id,
            StatusChange {
                status: "resolved".to_string(),
                assignee_id: None,
            },
        )
        .await
        .expect("status change must succeed despite mail failures");
    assert_eq!(updated.status, TicketStatus::Resolved);
}

#[tokio::test]
async fn test_mark_notification_read() {
    let app = TestApp::new().await;
    let (_alice, alice_v) = app.user("alice", false).await;
    let (_sam, sam_v) = app.user("sam", true).await;

    app.tickets
        .create(&app.ctx(), &alice_v, TestApp::new_ticket("Mouse"))
        .await
        .unwrap();

    let unread = app.users.list_notifications(&alice_v, true).await.unwrap();
    assert_eq!(unread.len(), 1);
    let id = unread[0].0.id;

    let marked = app.users.mark_notification_read(&alice_v, id).await.unwrap();
    assert!(marked.is_read);
    assert!(app.users.list_notifications(&alice_v, true).await.unwrap().is_empty());
    assert_eq!(app.users.list_notifications(&alice_v, false).await.unwrap().len(), 1);

    // Another user's notification is invisible
    match app.users.mark_notification_read(&sam_v, id).await {
        Err(InternalError::NotFound(NotFoundError::Notification(missing))) => assert_eq!(missing, id),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}
