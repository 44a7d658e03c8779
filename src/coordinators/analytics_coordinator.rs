use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, Iterable};

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::providers::{access_policy, ticket_rules};
use crate::stores::TicketStore;
use crate::types::db::ticket::{self, TicketCategory, TicketPriority, TicketStatus};
use crate::types::internal::analytics::AnalyticsSummary;
use crate::types::internal::Viewer;

/// Window for the "recent" counters
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Read-only rollups over all tickets, staff only
pub struct AnalyticsCoordinator {
    db: DatabaseConnection,
    ticket_store: Arc<TicketStore>,
}

impl AnalyticsCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            ticket_store: app_data.ticket_store.clone(),
        }
    }

    pub async fn summary(&self, viewer: &Viewer) -> Result<AnalyticsSummary, InternalError> {
        self.summary_as_of(viewer, Utc::now().timestamp()).await
    }

    /// Summary with the recent window ending at `as_of` (Unix seconds)
    ///
    /// Tickets created or resolved after `as_of` are not counted as recent.
    pub async fn summary_as_of(
        &self,
        viewer: &Viewer,
        as_of: i64,
    ) -> Result<AnalyticsSummary, InternalError> {
        access_policy::require(access_policy::can_view_analytics(viewer), "view analytics")?;

        let since = as_of - Duration::days(RECENT_WINDOW_DAYS).num_seconds();

        let by_status = self
            .grouped(ticket::Column::Status, TicketStatus::iter().map(|s| s.to_string()))
            .await?;
        let by_priority = self
            .grouped(ticket::Column::Priority, TicketPriority::iter().map(|p| p.to_string()))
            .await?;
        let by_category = self
            .grouped(ticket::Column::Category, TicketCategory::iter().map(|c| c.to_string()))
            .await?;

        let spans = self.ticket_store.resolution_spans(&self.db).await?;

        Ok(AnalyticsSummary {
            total_tickets: self.ticket_store.count(&self.db, None).await?,
            by_status,
            by_priority,
            by_category,
            recent_created: self.ticket_store.count_created_between(&self.db, since, as_of).await?,
            recent_resolved: self.ticket_store.count_resolved_between(&self.db, since, as_of).await?,
            average_resolution_hours: ticket_rules::average_resolution_hours(&spans),
        })
    }

    /// Counts for every known value of `column`, zeros included, in declaration order
    async fn grouped(
        &self,
        column: ticket::Column,
        values: impl Iterator<Item = String>,
    ) -> Result<Vec<(String, u64)>, InternalError> {
        let counts = self
            .ticket_store
            .count_grouped_by(&self.db, column, None)
            .await?;

        Ok(values
            .map(|value| {
                let count = counts
                    .iter()
                    .find(|(key, _)| *key == value)
                    .map(|(_, count)| *count as u64)
                    .unwrap_or(0);
                (value, count)
            })
            .collect())
    }
}
