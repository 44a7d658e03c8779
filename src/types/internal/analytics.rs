/// Read-only rollup over all tickets
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub total_tickets: u64,
    /// One entry per status, in declaration order, zero counts included
    pub by_status: Vec<(String, u64)>,
    pub by_priority: Vec<(String, u64)>,
    pub by_category: Vec<(String, u64)>,
    pub recent_created: u64,
    pub recent_resolved: u64,
    pub average_resolution_hours: f64,
}
