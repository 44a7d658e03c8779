use std::sync::Arc;

use poem::Request;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::auth::{CallerResolver, HelpdeskUserAuth};
use crate::coordinators::{AnalyticsCoordinator, UserCoordinator};
use crate::errors::HelpdeskApiError;
use crate::types::dto::analytics::AnalyticsResponse;

pub struct AnalyticsApi {
    analytics_coordinator: Arc<AnalyticsCoordinator>,
    caller: CallerResolver,
}

impl AnalyticsApi {
    pub fn new(
        analytics_coordinator: Arc<AnalyticsCoordinator>,
        user_coordinator: Arc<UserCoordinator>,
    ) -> Self {
        Self {
            analytics_coordinator,
            caller: CallerResolver::new(user_coordinator),
        }
    }
}

#[derive(Tags)]
enum AnalyticsTags {
    /// Ticket statistics for IT staff
    Analytics,
}

#[OpenApi(prefix_path = "/api/analytics")]
impl AnalyticsApi {
    /// Ticket counts and average resolution time (staff only)
    #[oai(path = "/summary", method = "get", tag = "AnalyticsTags::Analytics")]
    async fn summary(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<AnalyticsResponse>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let summary = self.analytics_coordinator.summary(&viewer).await?;
        Ok(Json(AnalyticsResponse::from(&summary)))
    }
}
