use std::sync::Arc;

use poem::Request;
use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::auth::{CallerResolver, HelpdeskUserAuth};
use crate::coordinators::{MessagingCoordinator, UserCoordinator};
use crate::errors::HelpdeskApiError;
use crate::types::dto::chat::{ChatMessageResponse, SendMessageRequest};
use crate::types::dto::users::UserResponse;

/// Direct messaging endpoints
pub struct ChatApi {
    messaging_coordinator: Arc<MessagingCoordinator>,
    caller: CallerResolver,
}

impl ChatApi {
    pub fn new(
        messaging_coordinator: Arc<MessagingCoordinator>,
        user_coordinator: Arc<UserCoordinator>,
    ) -> Self {
        Self {
            messaging_coordinator,
            caller: CallerResolver::new(user_coordinator),
        }
    }
}

#[derive(Tags)]
enum ChatTags {
    /// Direct messages between users
    Chat,
}

#[OpenApi(prefix_path = "/api/chat")]
impl ChatApi {
    /// Users the caller may chat with
    #[oai(path = "/contacts", method = "get", tag = "ChatTags::Chat")]
    async fn contacts(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<Vec<UserResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let contacts = self.messaging_coordinator.contacts(&viewer).await?;
        Ok(Json(contacts.iter().map(UserResponse::from).collect()))
    }

    /// Latest 50 messages sent or received by the caller
    #[oai(path = "/recent", method = "get", tag = "ChatTags::Chat")]
    async fn recent(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<Vec<ChatMessageResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let messages = self.messaging_coordinator.recent(&viewer).await?;
        Ok(Json(messages.iter().map(ChatMessageResponse::from).collect()))
    }

    #[oai(path = "/messages", method = "post", tag = "ChatTags::Chat")]
    async fn send(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        body: Json<SendMessageRequest>,
    ) -> Result<Json<ChatMessageResponse>, HelpdeskApiError> {
        let (viewer, ctx) = self.caller.resolve(&auth, req).await?;
        let message = self
            .messaging_coordinator
            .send(&ctx, &viewer, &body.receiver_id, &body.message)
            .await?;
        Ok(Json(ChatMessageResponse::from(&message)))
    }

    /// Conversation with another user; marks their messages to the caller as read
    #[oai(path = "/messages/:user_id", method = "get", tag = "ChatTags::Chat")]
    async fn history(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        user_id: Path<String>,
    ) -> Result<Json<Vec<ChatMessageResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let messages = self.messaging_coordinator.history(&viewer, &user_id.0).await?;
        Ok(Json(messages.iter().map(ChatMessageResponse::from).collect()))
    }
}
