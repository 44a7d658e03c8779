use chrono::NaiveDate;

use crate::types::db::{attachment, comment, ticket};
use crate::types::db::ticket::{TicketCategory, TicketPriority, TicketStatus};

/// Raw ticket submission; enum fields are validated by the coordinator
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: String,
    pub assignee_id: Option<String>,
}

/// Caller-supplied list filters, all optional
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Validated filter handed to the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
    pub search: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TicketDetail {
    pub ticket: ticket::Model,
    pub comments: Vec<comment::Model>,
    pub attachments: Vec<attachment::Model>,
    pub can_escalate: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardCounts {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub escalated: u64,
    pub high: u64,
    pub urgent: u64,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub counts: DashboardCounts,
    pub recent_comments: Vec<comment::Model>,
}

#[derive(Debug, Clone)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub tickets: Vec<ticket::Model>,
}

/// Uploaded file as received from the caller
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}
