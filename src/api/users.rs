use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::auth::{CallerResolver, HelpdeskUserAuth};
use crate::coordinators::UserCoordinator;
use crate::errors::HelpdeskApiError;
use crate::types::dto::users::{
    AccountResponse, DarkModeResponse, NotificationResponse, ProfileResponse, RegisterRequest,
    UpdateProfileRequest, UserResponse,
};
use crate::types::internal::context::RequestContext;
use crate::types::internal::user::{ProfileUpdate, Registration};

/// Account, profile and notification endpoints
pub struct UsersApi {
    user_coordinator: Arc<UserCoordinator>,
    caller: CallerResolver,
}

impl UsersApi {
    pub fn new(user_coordinator: Arc<UserCoordinator>) -> Self {
        Self {
            caller: CallerResolver::new(user_coordinator.clone()),
            user_coordinator,
        }
    }
}

#[derive(Tags)]
enum UserTags {
    /// Accounts and profiles
    Users,
    /// Per-user ticket notifications
    Notifications,
}

#[OpenApi(prefix_path = "/api")]
impl UsersApi {
    /// Register a new account
    #[oai(path = "/users/register", method = "post", tag = "UserTags::Users")]
    async fn register(
        &self,
        req: &Request,
        body: Json<RegisterRequest>,
    ) -> Result<Json<AccountResponse>, HelpdeskApiError> {
        let ctx = RequestContext::for_api(req);
        let body = body.0;
        let (user, profile) = self
            .user_coordinator
            .register(
                &ctx,
                Registration {
                    username: body.username,
                    email: body.email,
                    first_name: body.first_name,
                    last_name: body.last_name,
                    password: body.password,
                    department: body.department,
                    phone_number: body.phone_number,
                },
            )
            .await?;

        Ok(Json(AccountResponse {
            user: UserResponse::from(&user),
            profile: ProfileResponse::from(&profile),
        }))
    }

    /// The calling user and their profile
    #[oai(path = "/users/me", method = "get", tag = "UserTags::Users")]
    async fn me(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<AccountResponse>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let (user, profile) = self.user_coordinator.me(&viewer).await?;
        Ok(Json(AccountResponse {
            user: UserResponse::from(&user),
            profile: ProfileResponse::from(&profile),
        }))
    }

    #[oai(path = "/users/me/profile", method = "patch", tag = "UserTags::Users")]
    async fn update_profile(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        body: Json<UpdateProfileRequest>,
    ) -> Result<Json<ProfileResponse>, HelpdeskApiError> {
        let (viewer, ctx) = self.caller.resolve(&auth, req).await?;
        let body = body.0;
        let profile = self
            .user_coordinator
            .update_profile(
                &ctx,
                &viewer,
                ProfileUpdate {
                    department: body.department,
                    phone_number: body.phone_number,
                    dark_mode: body.dark_mode,
                },
            )
            .await?;
        Ok(Json(ProfileResponse::from(&profile)))
    }

    /// Flip the dark mode preference
    #[oai(path = "/users/me/dark-mode", method = "post", tag = "UserTags::Users")]
    async fn toggle_dark_mode(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<DarkModeResponse>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let dark_mode = self.user_coordinator.toggle_dark_mode(&viewer).await?;
        Ok(Json(DarkModeResponse { dark_mode }))
    }

    /// IT staff members
    #[oai(path = "/users/staff", method = "get", tag = "UserTags::Users")]
    async fn list_staff(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<Vec<UserResponse>>, HelpdeskApiError> {
        self.caller.resolve(&auth, req).await?;
        let staff = self.user_coordinator.list_staff().await?;
        Ok(Json(staff.iter().map(UserResponse::from).collect()))
    }

    /// Staff the caller can escalate to (staff only)
    #[oai(path = "/users/escalation-candidates", method = "get", tag = "UserTags::Users")]
    async fn escalation_candidates(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<Vec<UserResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let candidates = self.user_coordinator.escalation_candidates(&viewer).await?;
        Ok(Json(candidates.iter().map(UserResponse::from).collect()))
    }

    #[oai(path = "/notifications", method = "get", tag = "UserTags::Notifications")]
    async fn list_notifications(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        #[oai(default)] unread_only: Query<bool>,
    ) -> Result<Json<Vec<NotificationResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let notifications = self
            .user_coordinator
            .list_notifications(&viewer, unread_only.0)
            .await?;
        Ok(Json(
            notifications
                .iter()
                .map(|(notification, ticket)| NotificationResponse::new(notification, ticket.as_ref()))
                .collect(),
        ))
    }

    #[oai(path = "/notifications/:id/read", method = "post", tag = "UserTags::Notifications")]
    async fn mark_notification_read(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        id: Path<i64>,
    ) -> Result<Json<NotificationResponse>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let notification = self
            .user_coordinator
            .mark_notification_read(&viewer, id.0)
            .await?;
        Ok(Json(NotificationResponse::new(&notification, None)))
    }
}
