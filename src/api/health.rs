use chrono::Utc;
use poem_openapi::{payload::Json, ApiResponse, OpenApi, Tags};
use sea_orm::DatabaseConnection;

use crate::types::dto::common::HealthResponse;

/// Liveness plus a database round trip
pub struct HealthApi {
    db: DatabaseConnection,
}

impl HealthApi {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Tags)]
enum HealthTags {
    /// Health check endpoints
    Health,
}

#[derive(ApiResponse)]
enum HealthApiResponse {
    /// Service and database reachable
    #[oai(status = 200)]
    Healthy(Json<HealthResponse>),

    /// Database unreachable
    #[oai(status = 503)]
    Unavailable(Json<HealthResponse>),
}

#[OpenApi]
impl HealthApi {
    #[oai(path = "/health", method = "get", tag = "HealthTags::Health")]
    async fn health(&self) -> HealthApiResponse {
        let checked_at = Utc::now().to_rfc3339();
        match self.db.ping().await {
            Ok(()) => HealthApiResponse::Healthy(Json(HealthResponse {
                status: "healthy".to_string(),
                database_reachable: true,
                checked_at,
            })),
            Err(e) => {
                tracing::error!("Health check database ping failed: {}", e);
                HealthApiResponse::Unavailable(Json(HealthResponse {
                    status: "database_unavailable".to_string(),
                    database_reachable: false,
                    checked_at,
                }))
            }
        }
    }
}
