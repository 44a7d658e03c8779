use chrono::NaiveDate;
use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, Object};

use crate::providers::attachment_policy;
use crate::types::db::{attachment, comment, ticket};
use crate::types::internal::ticket::{CalendarDay, Dashboard, TicketDetail};

/// Request model for ticket submission
#[derive(Object, Debug)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    /// One of hardware, software, network, access, other
    pub category: String,
    /// One of low, medium, high, urgent
    pub priority: String,
    pub deadline: Option<NaiveDate>,
}

#[derive(Object, Debug)]
pub struct UpdateStatusRequest {
    /// One of open, in_progress, resolved, closed, escalated
    pub status: String,
    /// User ID to assign the ticket to
    pub assignee_id: Option<String>,
}

#[derive(Object, Debug)]
pub struct EscalateRequest {
    pub target_user_id: String,
    /// Recorded as an internal comment when not empty
    pub reason: Option<String>,
}

#[derive(Object, Debug)]
pub struct AddCommentRequest {
    pub content: String,
    /// Only honoured for IT staff
    #[oai(default)]
    pub is_internal: bool,
}

#[derive(Multipart)]
pub struct UploadAttachmentRequest {
    pub file: Upload,
}

#[derive(Object, Debug, Clone)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub escalated_to: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deadline: Option<NaiveDate>,
    pub resolved_at: Option<i64>,
}

impl From<&ticket::Model> for TicketResponse {
    fn from(ticket: &ticket::Model) -> Self {
        Self {
            ticket_id: ticket.ticket_id.clone(),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            category: ticket.category.to_string(),
            priority: ticket.priority.to_string(),
            status: ticket.status.to_string(),
            created_by: ticket.created_by.clone(),
            assigned_to: ticket.assigned_to.clone(),
            escalated_to: ticket.escalated_to.clone(),
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
            deadline: ticket.deadline,
            resolved_at: ticket.resolved_at,
        }
    }
}

/// One page of a ticket listing
#[derive(Object, Debug)]
pub struct TicketPageResponse {
    pub tickets: Vec<TicketResponse>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Object, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub author_id: String,
    pub content: String,
    pub is_internal: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&comment::Model> for CommentResponse {
    fn from(comment: &comment::Model) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id.clone(),
            content: comment.content.clone(),
            is_internal: comment.is_internal,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct AttachmentResponse {
    pub id: i64,
    pub original_filename: String,
    pub file_size: i64,
    /// Human readable size, e.g. "1.5 MB"
    pub file_size_display: String,
    pub uploaded_by: String,
    pub uploaded_at: i64,
}

impl From<&attachment::Model> for AttachmentResponse {
    fn from(attachment: &attachment::Model) -> Self {
        Self {
            id: attachment.id,
            original_filename: attachment.original_filename.clone(),
            file_size: attachment.file_size,
            file_size_display: attachment_policy::file_size_display(attachment.file_size.max(0) as u64),
            uploaded_by: attachment.uploaded_by.clone(),
            uploaded_at: attachment.uploaded_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct TicketDetailResponse {
    pub ticket: TicketResponse,
    pub comments: Vec<CommentResponse>,
    pub attachments: Vec<AttachmentResponse>,
    /// Whether the escalate action should be offered
    pub can_escalate: bool,
}

impl From<&TicketDetail> for TicketDetailResponse {
    fn from(detail: &TicketDetail) -> Self {
        Self {
            ticket: TicketResponse::from(&detail.ticket),
            comments: detail.comments.iter().map(CommentResponse::from).collect(),
            attachments: detail.attachments.iter().map(AttachmentResponse::from).collect(),
            can_escalate: detail.can_escalate,
        }
    }
}

#[derive(Object, Debug)]
pub struct DashboardResponse {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub escalated: u64,
    pub high: u64,
    pub urgent: u64,
    pub recent_comments: Vec<CommentResponse>,
}

impl From<&Dashboard> for DashboardResponse {
    fn from(dashboard: &Dashboard) -> Self {
        let counts = &dashboard.counts;
        Self {
            total: counts.total,
            open: counts.open,
            in_progress: counts.in_progress,
            resolved: counts.resolved,
            escalated: counts.escalated,
            high: counts.high,
            urgent: counts.urgent,
            recent_comments: dashboard.recent_comments.iter().map(CommentResponse::from).collect(),
        }
    }
}

#[derive(Object, Debug)]
pub struct CalendarDayResponse {
    pub date: NaiveDate,
    pub tickets: Vec<TicketResponse>,
}

impl From<&CalendarDay> for CalendarDayResponse {
    fn from(day: &CalendarDay) -> Self {
        Self {
            date: day.date,
            tickets: day.tickets.iter().map(TicketResponse::from).collect(),
        }
    }
}
