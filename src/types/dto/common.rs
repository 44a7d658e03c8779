use poem_openapi::Object;

/// Service liveness and database reachability
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// "healthy" or "database_unavailable"
    pub status: String,
    pub database_reachable: bool,
    /// RFC 3339 time the check ran
    pub checked_at: String,
}
