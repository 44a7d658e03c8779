use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction, HelpdeskSettings};
use crate::errors::internal::ConflictError;
use crate::errors::InternalError;
use crate::notifications::{EventSink, HelpdeskEvent};
use crate::providers::{access_policy, ticket_rules};
use crate::stores::{AttachmentStore, CommentStore, TicketInsert, TicketStore, UserStore};
use crate::types::db::ticket::{self, TicketCategory, TicketPriority, TicketStatus};
use crate::types::internal::context::RequestContext;
use crate::types::internal::ticket::{
    CalendarDay, Dashboard, DashboardCounts, NewTicket, StatusChange, TicketDetail, TicketFilter,
    TicketQuery,
};
use crate::types::internal::Viewer;

/// Attempts at inserting a ticket before giving up on ID allocation
pub const MAX_TICKET_ID_ATTEMPTS: u32 = 3;

/// Comments shown on the dashboard
const DASHBOARD_RECENT_COMMENTS: u64 = 5;

/// Ticket lifecycle workflows
///
/// Owns the transaction for every mutation and publishes the matching
/// domain event only after the commit succeeded.
pub struct TicketCoordinator {
    db: DatabaseConnection,
    settings: Arc<HelpdeskSettings>,
    ticket_store: Arc<TicketStore>,
    comment_store: Arc<CommentStore>,
    attachment_store: Arc<AttachmentStore>,
    user_store: Arc<UserStore>,
    event_sink: Arc<dyn EventSink>,
}

impl TicketCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            settings: app_data.settings.clone(),
            ticket_store: app_data.ticket_store.clone(),
            comment_store: app_data.comment_store.clone(),
            attachment_store: app_data.attachment_store.clone(),
            user_store: app_data.user_store.clone(),
            event_sink: app_data.event_sink.clone(),
        }
    }

    /// Orchestrate ticket creation
    ///
    /// Coordinates the sequence of operations:
    /// 1. Validate title, description, category and priority
    /// 2. In one transaction, load the creator and staff, advance the ticket
    ///    counter and insert the ticket
    /// 3. Retry with a fresh transaction if the generated ID collides
    /// 4. After commit, publish `TicketCreated` for the creator and all staff
    ///
    /// Nothing after the commit can turn the result into an error.
    ///
    /// # Errors
    /// * `ValidationError` - empty text or unknown category/priority
    /// * `NotFoundError::User` - the viewer has no user record
    /// * `ConflictError::TicketIdExhausted` - no free ID after the retry budget
    pub async fn create(
        &self,
        ctx: &RequestContext,
        viewer: &Viewer,
        new_ticket: NewTicket,
    ) -> Result<ticket::Model, InternalError> {
        // Step 1: Validate input before touching the database
        let title = ticket_rules::require_text("title", &new_ticket.title)?;
        let description = ticket_rules::require_text("description", &new_ticket.description)?;
        let category: TicketCategory =
            ticket_rules::parse_choice("category", &new_ticket.category)?;
        let priority: TicketPriority =
            ticket_rules::parse_choice("priority", &new_ticket.priority)?;

        // Step 2-3: Allocate an ID and insert, retrying on collisions
        let mut created = None;
        for attempt in 1..=MAX_TICKET_ID_ATTEMPTS {
            let txn = begin_transaction(&self.db).await?;
            let creator = self.user_store.get_by_id(&txn, &viewer.user_id).await?;
            let staff = self.user_store.list_staff(&txn).await?;
            let ticket_id = self.allocate_ticket_id(&txn).await?;

            let insert = TicketInsert {
                ticket_id: ticket_id.clone(),
                title: title.clone(),
                description: description.clone(),
                category,
                priority,
                created_by: viewer.user_id.clone(),
                deadline: new_ticket.deadline,
            };

            match self.ticket_store.insert(&txn, insert, Utc::now().timestamp()).await {
                Ok(ticket) => {
                    commit_transaction(txn).await?;
                    created = Some((ticket, creator, staff));
                    break;
                }
                Err(InternalError::Database(e)) if e.is_unique_violation() => {
                    // Dropping the transaction rolls it back
                    tracing::warn!(
                        request_id = %ctx.request_id,
                        attempt,
                        ticket_id = %ticket_id,
                        "Ticket ID collision, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let (ticket, creator, staff) = created.ok_or(ConflictError::TicketIdExhausted {
            attempts: MAX_TICKET_ID_ATTEMPTS,
        })?;

        tracing::info!(
            request_id = %ctx.request_id,
            ticket_id = %ticket.ticket_id,
            created_by = %viewer.user_id,
            "Ticket created"
        );

        // Step 4: Notify after commit
        self.event_sink
            .publish(HelpdeskEvent::TicketCreated {
                ticket: ticket.clone(),
                creator,
                staff,
            })
            .await;

        Ok(ticket)
    }

    /// Next unused public ID, skipping numbers already taken by other writers
    async fn allocate_ticket_id(&self, conn: &impl ConnectionTrait) -> Result<String, InternalError> {
        for _ in 0..MAX_TICKET_ID_ATTEMPTS {
            let number = self.ticket_store.next_sequence_value(conn).await?;
            let ticket_id = ticket_rules::format_ticket_id(self.settings.ticket_id_prefix(), number);
            if !self.ticket_store.ticket_id_exists(conn, &ticket_id).await? {
                return Ok(ticket_id);
            }
        }

        Err(ConflictError::TicketIdExhausted {
            attempts: MAX_TICKET_ID_ATTEMPTS,
        }
        .into())
    }

    /// Orchestrate a status change by staff
    ///
    /// Coordinates the sequence of operations:
    /// 1. Check the staff capability and parse the new status
    /// 2. Load the ticket, its creator, the updater and, if given, the assignee
    /// 3. Apply status, assignee and the `resolved_at` rule, then commit
    /// 4. Publish `TicketStatusChanged` for the creator
    ///
    /// The assignee only has to exist; its staff flag is not checked.
    /// Concurrent updates to one ticket are last-write-wins.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        viewer: &Viewer,
        ticket_id: &str,
        change: StatusChange,
    ) -> Result<ticket::Model, InternalError> {
        // Step 1: Capability and input
        access_policy::require(access_policy::can_update_status(viewer), "update ticket status")?;
        let status: TicketStatus = ticket_rules::parse_choice("status", &change.status)?;

        // Step 2: Load what the change refers to
        let txn = begin_transaction(&self.db).await?;
        let current = self.ticket_store.get_by_ticket_id(&txn, ticket_id).await?;
        let new_assignee = match change.assignee_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(assignee_id) => Some(self.user_store.get_by_id(&txn, assignee_id).await?),
            None => None,
        };
        let assignee = match (&new_assignee, &current.assigned_to) {
            (Some(assignee), _) => Some(assignee.clone()),
            (None, Some(existing)) => self.user_store.find_by_id(&txn, existing).await?,
            (None, None) => None,
        };
        let creator = self.user_store.get_by_id(&txn, &current.created_by).await?;
        let updated_by = self.user_store.find_by_id(&txn, &viewer.user_id).await?;

        // Step 3: Apply and commit
        let now = Utc::now().timestamp();
        let previous_status = current.status;
        let resolved_at = ticket_rules::resolved_at_after(status, current.resolved_at, now);
        let mut active: ticket::ActiveModel = current.into();
        active.status = Set(status);
        active.resolved_at = Set(resolved_at);
        active.updated_at = Set(now);
        if let Some(assignee) = &new_assignee {
            active.assigned_to = Set(Some(assignee.id.clone()));
        }
        let updated = self.ticket_store.update(&txn, active).await?;
        commit_transaction(txn).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            ticket_id = %updated.ticket_id,
            from = %previous_status,
            to = %status,
            updated_by = %viewer.user_id,
            "Ticket status updated"
        );

        // Step 4: Notify the creator
        let Some(updated_by) = updated_by else {
            tracing::warn!(
                request_id = %ctx.request_id,
                ticket_id = %updated.ticket_id,
                updated_by = %viewer.user_id,
                "Updater has no user record, status notification skipped"
            );
            return Ok(updated);
        };
        self.event_sink
            .publish(HelpdeskEvent::TicketStatusChanged {
                ticket: updated.clone(),
                creator,
                updated_by,
                assignee,
                previous_status,
            })
            .await;

        Ok(updated)
    }

    /// Orchestrate escalation to another user
    ///
    /// Coordinates the sequence of operations:
    /// 1. Check the escalation capability
    /// 2. Set status, assignee and escalation target in one transaction
    /// 3. Record a non-empty reason as an internal comment in the same transaction
    /// 4. After commit, publish `TicketEscalated` (target and escalation contact)
    ///
    /// Delivery failures in step 4 cannot undo steps 2-3.
    pub async fn escalate(
        &self,
        ctx: &RequestContext,
        viewer: &Viewer,
        ticket_id: &str,
        target_user_id: &str,
        reason: Option<String>,
    ) -> Result<ticket::Model, InternalError> {
        // Step 1: Capability
        access_policy::require(access_policy::can_escalate(viewer), "escalate tickets")?;
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        // Step 2: Mutate ticket
        let txn = begin_transaction(&self.db).await?;
        let current = self.ticket_store.get_by_ticket_id(&txn, ticket_id).await?;
        let target = self.user_store.get_by_id(&txn, target_user_id).await?;
        let creator = self.user_store.get_by_id(&txn, &current.created_by).await?;

        let now = Utc::now().timestamp();
        let mut active: ticket::ActiveModel = current.into();
        active.status = Set(TicketStatus::Escalated);
        active.assigned_to = Set(Some(target.id.clone()));
        active.escalated_to = Set(Some(target.id.clone()));
        active.resolved_at = Set(None);
        active.updated_at = Set(now);
        let escalated = self.ticket_store.update(&txn, active).await?;

        // Step 3: Reason as internal comment
        if let Some(reason) = &reason {
            self.comment_store
                .insert(
                    &txn,
                    escalated.id,
                    &viewer.user_id,
                    format!("ESCALATION REASON: {}", reason),
                    true,
                    now,
                )
                .await?;
        }
        commit_transaction(txn).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            ticket_id = %escalated.ticket_id,
            target = %target.id,
            escalated_by = %viewer.user_id,
            "Ticket escalated"
        );

        // Step 4: Notify
        self.event_sink
            .publish(HelpdeskEvent::TicketEscalated {
                ticket: escalated.clone(),
                creator,
                target,
                reason,
            })
            .await;

        Ok(escalated)
    }

    /// Tickets visible to the viewer, newest first
    pub async fn list(
        &self,
        viewer: &Viewer,
        filter: TicketFilter,
    ) -> Result<Vec<ticket::Model>, InternalError> {
        let query = TicketQuery {
            status: parse_filter("status", filter.status.as_deref())?,
            priority: parse_filter("priority", filter.priority.as_deref())?,
            category: parse_filter("category", filter.category.as_deref())?,
            search: filter.search.filter(|s| !s.trim().is_empty()),
            created_by: visible_creator(viewer).map(str::to_string),
        };

        self.ticket_store.list(&self.db, &query).await
    }

    /// Ticket with the comments and attachments the viewer may see
    pub async fn detail(&self, viewer: &Viewer, ticket_id: &str) -> Result<TicketDetail, InternalError> {
        let ticket = self.ticket_store.get_by_ticket_id(&self.db, ticket_id).await?;
        access_policy::require_ticket_access(viewer, &ticket)?;

        let comments = self
            .comment_store
            .list_for_ticket(&self.db, ticket.id, access_policy::can_see_internal_comment(viewer))
            .await?;
        let attachments = self.attachment_store.list_for_ticket(&self.db, ticket.id).await?;
        let can_escalate = access_policy::show_escalate_action(viewer, &ticket);

        Ok(TicketDetail {
            ticket,
            comments,
            attachments,
            can_escalate,
        })
    }

    /// Counts over the viewer's visible tickets and the latest comments on them
    pub async fn dashboard(&self, viewer: &Viewer) -> Result<Dashboard, InternalError> {
        let scope = visible_creator(viewer);

        let total = self.ticket_store.count(&self.db, scope).await?;
        let by_status = self
            .ticket_store
            .count_grouped_by(&self.db, ticket::Column::Status, scope)
            .await?;
        let by_priority = self
            .ticket_store
            .count_grouped_by(&self.db, ticket::Column::Priority, scope)
            .await?;

        let counts = DashboardCounts {
            total,
            open: count_of(&by_status, TicketStatus::Open.into()),
            in_progress: count_of(&by_status, TicketStatus::InProgress.into()),
            resolved: count_of(&by_status, TicketStatus::Resolved.into()),
            escalated: count_of(&by_status, TicketStatus::Escalated.into()),
            high: count_of(&by_priority, TicketPriority::High.into()),
            urgent: count_of(&by_priority, TicketPriority::Urgent.into()),
        };

        let recent_comments = self
            .comment_store
            .list_recent(
                &self.db,
                scope,
                access_policy::can_see_internal_comment(viewer),
                DASHBOARD_RECENT_COMMENTS,
            )
            .await?;

        Ok(Dashboard {
            counts,
            recent_comments,
        })
    }

    /// Visible tickets with a deadline, grouped per day in date order
    pub async fn calendar(&self, viewer: &Viewer) -> Result<Vec<CalendarDay>, InternalError> {
        let tickets = self
            .ticket_store
            .list_with_deadline(&self.db, visible_creator(viewer))
            .await?;

        let mut days: Vec<CalendarDay> = Vec::new();
        for ticket in tickets {
            let Some(date) = ticket.deadline else {
                continue;
            };
            match days.last_mut() {
                Some(day) if day.date == date => day.tickets.push(ticket),
                _ => days.push(CalendarDay {
                    date,
                    tickets: vec![ticket],
                }),
            }
        }

        Ok(days)
    }
}

/// Staff see every ticket; everyone else only their own
fn visible_creator(viewer: &Viewer) -> Option<&str> {
    if viewer.is_staff {
        None
    } else {
        Some(viewer.user_id.as_str())
    }
}

fn count_of(groups: &[(String, i64)], value: &str) -> u64 {
    groups
        .iter()
        .find(|(key, _)| key == value)
        .map(|(_, count)| *count as u64)
        .unwrap_or(0)
}

fn parse_filter<T: std::str::FromStr>(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, InternalError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Ok(Some(ticket_rules::parse_choice(field, value)?)),
        None => Ok(None),
    }
}
