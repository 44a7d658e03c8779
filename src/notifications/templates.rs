use chrono::DateTime;

use crate::types::db::ticket::{self, TicketStatus};
use crate::types::db::user;

use super::events::NotificationKind;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMail {
    pub subject: String,
    pub html_body: String,
}

/// Everything a template needs for one notification
#[derive(Debug, Clone)]
pub enum NotificationContext<'a> {
    TicketCreated {
        ticket: &'a ticket::Model,
        creator: &'a user::Model,
        for_staff: bool,
    },
    StatusChanged {
        ticket: &'a ticket::Model,
        creator: &'a user::Model,
        updated_by: &'a user::Model,
        assignee: Option<&'a user::Model>,
        previous_status: TicketStatus,
    },
    Escalated {
        ticket: &'a ticket::Model,
        creator: &'a user::Model,
        target: &'a user::Model,
        reason: Option<&'a str>,
        copy: bool,
    },
    Welcome {
        user: &'a user::Model,
    },
    NewUser {
        user: &'a user::Model,
    },
    CommentAdded {
        ticket: &'a ticket::Model,
        author: &'a user::Model,
        content: &'a str,
    },
}

impl<'a> NotificationContext<'a> {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationContext::TicketCreated { .. } => NotificationKind::Created,
            NotificationContext::StatusChanged { .. } => NotificationKind::StatusChanged,
            NotificationContext::Escalated { .. } => NotificationKind::Escalated,
            NotificationContext::Welcome { .. } => NotificationKind::Welcome,
            NotificationContext::NewUser { .. } => NotificationKind::NewUser,
            NotificationContext::CommentAdded { .. } => NotificationKind::CommentAdded,
        }
    }

    /// The ticket this notification is about, if any
    pub fn ticket(&self) -> Option<&'a ticket::Model> {
        match self {
            NotificationContext::TicketCreated { ticket, .. }
            | NotificationContext::StatusChanged { ticket, .. }
            | NotificationContext::Escalated { ticket, .. }
            | NotificationContext::CommentAdded { ticket, .. } => Some(*ticket),
            NotificationContext::Welcome { .. } | NotificationContext::NewUser { .. } => None,
        }
    }
}

/// Render subject and HTML body; all user-supplied text is escaped
pub fn render(context: &NotificationContext<'_>, site_url: &str) -> RenderedMail {
    match context {
        NotificationContext::TicketCreated {
            ticket,
            creator,
            for_staff,
        } => {
            let link = ticket_link(site_url, ticket);
            if *for_staff {
                RenderedMail {
                    subject: format!("New Ticket Created: {} - {}", ticket.ticket_id, ticket.title),
                    html_body: page(
                        "New Support Ticket Created",
                        &format!(
                            "<p>A new support ticket from <strong>{}</strong> requires attention.</p>{}{}{}",
                            escape_html(&creator.display_name()),
                            ticket_details(ticket, &[]),
                            description(ticket),
                            link
                        ),
                    ),
                }
            } else {
                RenderedMail {
                    subject: format!("Ticket Created: {} - {}", ticket.ticket_id, ticket.title),
                    html_body: page(
                        "Ticket Created Successfully",
                        &format!(
                            "{}<p>Your support ticket has been created. IT staff will review it and you will \
                             receive updates when the status changes.</p>{}{}{}",
                            greeting(creator),
                            ticket_details(ticket, &[]),
                            description(ticket),
                            link
                        ),
                    ),
                }
            }
        }
        NotificationContext::StatusChanged {
            ticket,
            creator,
            updated_by,
            assignee,
            previous_status,
        } => {
            let assigned = assignee
                .map(|u| u.display_name())
                .unwrap_or_else(|| "Not assigned".to_string());
            let extra = [
                ("Previous Status", status_label(*previous_status).to_string()),
                ("Assigned to", assigned),
                ("Updated by", updated_by.display_name()),
            ];
            RenderedMail {
                subject: format!("Ticket Status Updated: {} - {}", ticket.ticket_id, ticket.title),
                html_body: page(
                    "Ticket Status Update",
                    &format!(
                        "{}<p>Your support ticket status has been updated.</p>{}{}",
                        greeting(creator),
                        ticket_details(ticket, &extra),
                        ticket_link(site_url, ticket)
                    ),
                ),
            }
        }
        NotificationContext::Escalated {
            ticket,
            creator,
            target,
            reason,
            copy,
        } => {
            let subject = format!(
                "URGENT: Ticket {} Escalated - {}",
                ticket.ticket_id, ticket.title
            );
            let extra = [
                ("Created by", creator.display_name()),
                ("Assigned to", target.display_name()),
            ];
            let reason_block = reason
                .filter(|r| !r.trim().is_empty())
                .map(|r| format!("<h4>Escalation reason:</h4><p>{}</p>", escape_html(r)))
                .unwrap_or_default();
            RenderedMail {
                subject: if *copy { format!("COPY: {}", subject) } else { subject },
                html_body: page(
                    "Ticket Escalation Alert",
                    &format!(
                        "<p><strong>The following ticket has been escalated and requires immediate \
                         attention.</strong></p>{}{}{}{}",
                        ticket_details(ticket, &extra),
                        description(ticket),
                        reason_block,
                        ticket_link(site_url, ticket)
                    ),
                ),
            }
        }
        NotificationContext::Welcome { user } => RenderedMail {
            subject: "Welcome to IT Support System!".to_string(),
            html_body: page(
                "Welcome to IT Support System",
                &format!(
                    "{}<p>Your account <strong>{}</strong> has been created. You can submit support \
                     tickets, follow their progress and chat with IT staff.</p>\
                     <p><a href=\"{}/dashboard/\">Go to Dashboard</a></p>",
                    greeting(user),
                    escape_html(&user.username),
                    escape_html(site_url)
                ),
            ),
        },
        NotificationContext::NewUser { user } => RenderedMail {
            subject: format!("New User Registered: {}", user.username),
            html_body: page(
                "New User Registration",
                &format!(
                    "<ul><li><strong>Username:</strong> {}</li><li><strong>Name:</strong> {}</li>\
                     <li><strong>Email:</strong> {}</li><li><strong>Registered:</strong> {}</li></ul>",
                    escape_html(&user.username),
                    escape_html(&user.display_name()),
                    escape_html(&user.email),
                    format_timestamp(user.created_at)
                ),
            ),
        },
        NotificationContext::CommentAdded {
            ticket,
            author,
            content,
        } => RenderedMail {
            subject: format!("New Comment on Ticket {}", ticket.ticket_id),
            html_body: page(
                "New Comment",
                &format!(
                    "<p>A new comment has been added to your ticket \"{}\" by <strong>{}</strong>.</p>\
                     <blockquote>{}</blockquote>{}",
                    escape_html(&ticket.title),
                    escape_html(&author.display_name()),
                    escape_html(content),
                    ticket_link(site_url, ticket)
                ),
            ),
        },
    }
}

fn status_label(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "Open",
        TicketStatus::InProgress => "In Progress",
        TicketStatus::Resolved => "Resolved",
        TicketStatus::Closed => "Closed",
        TicketStatus::Escalated => "Escalated",
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(heading: &str, content: &str) -> String {
    format!(
        "<html><body><h2>{}</h2>{}<hr><p><small>This is an automated notification from the IT \
         Support System. Please do not reply to this email.</small></p></body></html>",
        heading, content
    )
}

fn greeting(user: &user::Model) -> String {
    format!("<p>Hello <strong>{}</strong>,</p>", escape_html(&user.display_name()))
}

fn ticket_details(ticket: &ticket::Model, extra: &[(&str, String)]) -> String {
    let mut items = vec![
        ("Ticket ID", ticket.ticket_id.clone()),
        ("Title", ticket.title.clone()),
        ("Status", status_label(ticket.status).to_string()),
        ("Priority", capitalize(ticket.priority.into())),
        ("Category", capitalize(ticket.category.into())),
        ("Created", format_timestamp(ticket.created_at)),
    ];
    if let Some(deadline) = ticket.deadline {
        items.push(("Deadline", deadline.format("%Y-%m-%d").to_string()));
    }
    items.extend(extra.iter().map(|(label, value)| (*label, value.clone())));

    let rows: String = items
        .iter()
        .map(|(label, value)| format!("<li><strong>{}:</strong> {}</li>", label, escape_html(value)))
        .collect();
    format!("<h3>Ticket Details:</h3><ul>{}</ul>", rows)
}

fn description(ticket: &ticket::Model) -> String {
    format!("<h4>Description:</h4><p>{}</p>", escape_html(&ticket.description))
}

fn ticket_link(site_url: &str, ticket: &ticket::Model) -> String {
    format!(
        "<p><a href=\"{}/tickets/{}/\">View Ticket Details</a></p>",
        escape_html(site_url),
        escape_html(&ticket.ticket_id)
    )
}

fn capitalize(value: &'static str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::db::ticket::{TicketCategory, TicketPriority};

    fn sample_user(username: &str) -> user::Model {
        user::Model {
            id: format!("{}-id", username),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn sample_ticket() -> ticket::Model {
        ticket::Model {
            id: 1,
            ticket_id: "JIAI-00001".to_string(),
            title: "Printer <b>jam</b>".to_string(),
            description: "Paper stuck & smoking".to_string(),
            category: TicketCategory::Hardware,
            priority: TicketPriority::High,
            status: TicketStatus::Escalated,
            created_by: "alice-id".to_string(),
            assigned_to: None,
            escalated_to: None,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
            deadline: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_escalation_copy_subject_is_prefixed() {
        let ticket = sample_ticket();
        let creator = sample_user("alice");
        let target = sample_user("sam");
        let context = NotificationContext::Escalated {
            ticket: &ticket,
            creator: &creator,
            target: &target,
            reason: Some("Needs vendor"),
            copy: true,
        };

        let mail = render(&context, "http://localhost:3000");
        assert_eq!(
            mail.subject,
            "COPY: URGENT: Ticket JIAI-00001 Escalated - Printer <b>jam</b>"
        );
        assert!(mail.html_body.contains("Needs vendor"));
        assert_eq!(context.kind(), NotificationKind::Escalated);
    }

    #[test]
    fn test_body_escapes_user_text() {
        let ticket = sample_ticket();
        let creator = sample_user("alice");
        let context = NotificationContext::TicketCreated {
            ticket: &ticket,
            creator: &creator,
            for_staff: false,
        };

        let mail = render(&context, "http://localhost:3000");
        assert!(mail.html_body.contains("Printer &lt;b&gt;jam&lt;/b&gt;"));
        assert!(mail.html_body.contains("Paper stuck &amp; smoking"));
        assert!(mail.html_body.contains("http://localhost:3000/tickets/JIAI-00001/"));
        assert!(!mail.html_body.contains("<b>jam</b>"));
    }

    #[test]
    fn test_user_notifications_have_no_ticket() {
        let user = sample_user("alice");
        let welcome = NotificationContext::Welcome { user: &user };
        let new_user = NotificationContext::NewUser { user: &user };

        assert!(welcome.ticket().is_none());
        assert_eq!(render(&welcome, "").subject, "Welcome to IT Support System!");
        assert_eq!(render(&new_user, "").subject, "New User Registered: alice");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#x27;");
    }
}
