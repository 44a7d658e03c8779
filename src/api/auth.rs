use std::sync::Arc;

use poem::Request;
use poem_openapi::auth::ApiKey;
use poem_openapi::SecurityScheme;

use crate::coordinators::UserCoordinator;
use crate::errors::HelpdeskApiError;
use crate::types::internal::context::RequestContext;
use crate::types::internal::Viewer;

/// Caller identity forwarded by the authenticating front proxy
///
/// Carries the user id; requests without the header are rejected with 401
/// before any handler runs.
#[derive(SecurityScheme)]
#[oai(ty = "api_key", key_name = "X-Helpdesk-User", key_in = "header")]
pub struct HelpdeskUserAuth(pub ApiKey);

/// Turns the identity header into a `Viewer` and a request context
#[derive(Clone)]
pub struct CallerResolver {
    user_coordinator: Arc<UserCoordinator>,
}

impl CallerResolver {
    pub fn new(user_coordinator: Arc<UserCoordinator>) -> Self {
        Self { user_coordinator }
    }

    /// # Errors
    /// 401 when the header names no active user
    pub async fn resolve(
        &self,
        auth: &HelpdeskUserAuth,
        req: &Request,
    ) -> Result<(Viewer, RequestContext), HelpdeskApiError> {
        let viewer = self
            .user_coordinator
            .resolve_viewer(auth.0.key.trim())
            .await
            .map_err(HelpdeskApiError::from_identity_error)?;
        let ctx = RequestContext::for_api(req).with_actor(&viewer.user_id);
        Ok((viewer, ctx))
    }
}
