use poem_openapi::Object;

use crate::types::internal::analytics::AnalyticsSummary;

#[derive(Object, Debug)]
pub struct CountEntry {
    pub key: String,
    pub count: u64,
}

#[derive(Object, Debug)]
pub struct AnalyticsResponse {
    pub total_tickets: u64,
    pub by_status: Vec<CountEntry>,
    pub by_priority: Vec<CountEntry>,
    pub by_category: Vec<CountEntry>,
    /// Tickets created in the last 30 days
    pub recent_created: u64,
    /// Tickets resolved in the last 30 days
    pub recent_resolved: u64,
    pub average_resolution_hours: f64,
}

fn entries(counts: &[(String, u64)]) -> Vec<CountEntry> {
    counts
        .iter()
        .map(|(key, count)| CountEntry {
            key: key.clone(),
            count: *count,
        })
        .collect()
}

impl From<&AnalyticsSummary> for AnalyticsResponse {
    fn from(summary: &AnalyticsSummary) -> Self {
        Self {
            total_tickets: summary.total_tickets,
            by_status: entries(&summary.by_status),
            by_priority: entries(&summary.by_priority),
            by_category: entries(&summary.by_category),
            recent_created: summary.recent_created,
            recent_resolved: summary.recent_resolved,
            average_resolution_hours: summary.average_resolution_hours,
        }
    }
}
