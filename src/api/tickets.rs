use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::auth::{CallerResolver, HelpdeskUserAuth};
use crate::coordinators::{CollaborationCoordinator, TicketCoordinator, UserCoordinator};
use crate::errors::HelpdeskApiError;
use crate::types::dto::tickets::{
    AddCommentRequest, AttachmentResponse, CalendarDayResponse, CommentResponse,
    CreateTicketRequest, DashboardResponse, EscalateRequest, TicketDetailResponse,
    TicketPageResponse, TicketResponse, UpdateStatusRequest, UploadAttachmentRequest,
};
use crate::types::internal::ticket::{NewAttachment, NewTicket, StatusChange, TicketFilter};

/// Tickets per page in listings
pub const PAGE_SIZE: u64 = 10;

/// Ticket lifecycle, comment and attachment endpoints
pub struct TicketsApi {
    ticket_coordinator: Arc<TicketCoordinator>,
    collaboration_coordinator: Arc<CollaborationCoordinator>,
    caller: CallerResolver,
}

impl TicketsApi {
    pub fn new(
        ticket_coordinator: Arc<TicketCoordinator>,
        collaboration_coordinator: Arc<CollaborationCoordinator>,
        user_coordinator: Arc<UserCoordinator>,
    ) -> Self {
        Self {
            ticket_coordinator,
            collaboration_coordinator,
            caller: CallerResolver::new(user_coordinator),
        }
    }
}

#[derive(Tags)]
enum TicketTags {
    /// Ticket lifecycle
    Tickets,
    /// Comments and attachments
    Collaboration,
}

#[OpenApi(prefix_path = "/api")]
impl TicketsApi {
    /// Submit a new ticket
    #[oai(path = "/tickets", method = "post", tag = "TicketTags::Tickets")]
    async fn create(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        body: Json<CreateTicketRequest>,
    ) -> Result<Json<TicketResponse>, HelpdeskApiError> {
        let (viewer, ctx) = self.caller.resolve(&auth, req).await?;
        let body = body.0;
        let ticket = self
            .ticket_coordinator
            .create(
                &ctx,
                &viewer,
                NewTicket {
                    title: body.title,
                    description: body.description,
                    category: body.category,
                    priority: body.priority,
                    deadline: body.deadline,
                },
            )
            .await?;
        Ok(Json(TicketResponse::from(&ticket)))
    }

    /// Tickets visible to the caller, newest first, 10 per page
    #[oai(path = "/tickets", method = "get", tag = "TicketTags::Tickets")]
    async fn list(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        status: Query<Option<String>>,
        priority: Query<Option<String>>,
        category: Query<Option<String>>,
        search: Query<Option<String>>,
        page: Query<Option<u64>>,
    ) -> Result<Json<TicketPageResponse>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let tickets = self
            .ticket_coordinator
            .list(
                &viewer,
                TicketFilter {
                    status: status.0,
                    priority: priority.0,
                    category: category.0,
                    search: search.0,
                },
            )
            .await?;

        let total = tickets.len() as u64;
        let total_pages = total.div_ceil(PAGE_SIZE).max(1);
        let page = page.0.unwrap_or(1).clamp(1, total_pages);
        let start = ((page - 1) * PAGE_SIZE) as usize;

        Ok(Json(TicketPageResponse {
            tickets: tickets
                .iter()
                .skip(start)
                .take(PAGE_SIZE as usize)
                .map(TicketResponse::from)
                .collect(),
            page,
            page_size: PAGE_SIZE,
            total,
            total_pages,
        }))
    }

    /// Counts and recent comments over the caller's visible tickets
    #[oai(path = "/tickets/dashboard", method = "get", tag = "TicketTags::Tickets")]
    async fn dashboard(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<DashboardResponse>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let dashboard = self.ticket_coordinator.dashboard(&viewer).await?;
        Ok(Json(DashboardResponse::from(&dashboard)))
    }

    /// Visible tickets with a deadline, grouped by day
    #[oai(path = "/tickets/calendar", method = "get", tag = "TicketTags::Tickets")]
    async fn calendar(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
    ) -> Result<Json<Vec<CalendarDayResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let days = self.ticket_coordinator.calendar(&viewer).await?;
        Ok(Json(days.iter().map(CalendarDayResponse::from).collect()))
    }

    #[oai(path = "/tickets/:ticket_id", method = "get", tag = "TicketTags::Tickets")]
    async fn detail(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        ticket_id: Path<String>,
    ) -> Result<Json<TicketDetailResponse>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let detail = self.ticket_coordinator.detail(&viewer, &ticket_id.0).await?;
        Ok(Json(TicketDetailResponse::from(&detail)))
    }

    /// Change status and optionally the assignee (staff only)
    #[oai(path = "/tickets/:ticket_id/status", method = "post", tag = "TicketTags::Tickets")]
    async fn update_status(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        ticket_id: Path<String>,
        body: Json<UpdateStatusRequest>,
    ) -> Result<Json<TicketResponse>, HelpdeskApiError> {
        let (viewer, ctx) = self.caller.resolve(&auth, req).await?;
        let body = body.0;
        let ticket = self
            .ticket_coordinator
            .update_status(
                &ctx,
                &viewer,
                &ticket_id.0,
                StatusChange {
                    status: body.status,
                    assignee_id: body.assignee_id,
                },
            )
            .await?;
        Ok(Json(TicketResponse::from(&ticket)))
    }

    /// Escalate to another user (staff only)
    #[oai(path = "/tickets/:ticket_id/escalate", method = "post", tag = "TicketTags::Tickets")]
    async fn escalate(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        ticket_id: Path<String>,
        body: Json<EscalateRequest>,
    ) -> Result<Json<TicketResponse>, HelpdeskApiError> {
        let (viewer, ctx) = self.caller.resolve(&auth, req).await?;
        let body = body.0;
        let ticket = self
            .ticket_coordinator
            .escalate(&ctx, &viewer, &ticket_id.0, &body.target_user_id, body.reason)
            .await?;
        Ok(Json(TicketResponse::from(&ticket)))
    }

    #[oai(path = "/tickets/:ticket_id/comments", method = "get", tag = "TicketTags::Collaboration")]
    async fn list_comments(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        ticket_id: Path<String>,
    ) -> Result<Json<Vec<CommentResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let comments = self
            .collaboration_coordinator
            .list_comments(&viewer, &ticket_id.0)
            .await?;
        Ok(Json(comments.iter().map(CommentResponse::from).collect()))
    }

    #[oai(path = "/tickets/:ticket_id/comments", method = "post", tag = "TicketTags::Collaboration")]
    async fn add_comment(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        ticket_id: Path<String>,
        body: Json<AddCommentRequest>,
    ) -> Result<Json<CommentResponse>, HelpdeskApiError> {
        let (viewer, ctx) = self.caller.resolve(&auth, req).await?;
        let comment = self
            .collaboration_coordinator
            .add_comment(&ctx, &viewer, &ticket_id.0, &body.content, body.is_internal)
            .await?;
        Ok(Json(CommentResponse::from(&comment)))
    }

    #[oai(path = "/tickets/:ticket_id/attachments", method = "get", tag = "TicketTags::Collaboration")]
    async fn list_attachments(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        ticket_id: Path<String>,
    ) -> Result<Json<Vec<AttachmentResponse>>, HelpdeskApiError> {
        let (viewer, _ctx) = self.caller.resolve(&auth, req).await?;
        let attachments = self
            .collaboration_coordinator
            .list_attachments(&viewer, &ticket_id.0)
            .await?;
        Ok(Json(attachments.iter().map(AttachmentResponse::from).collect()))
    }

    /// Upload a file (max 10 MiB; pdf, doc, docx, txt, jpg, jpeg, png, gif, zip, rar)
    #[oai(path = "/tickets/:ticket_id/attachments", method = "post", tag = "TicketTags::Collaboration")]
    async fn add_attachment(
        &self,
        req: &Request,
        auth: HelpdeskUserAuth,
        ticket_id: Path<String>,
        upload: UploadAttachmentRequest,
    ) -> Result<Json<AttachmentResponse>, HelpdeskApiError> {
        let (viewer, ctx) = self.caller.resolve(&auth, req).await?;
        let filename = upload.file.file_name().unwrap_or_default().to_string();
        let bytes = upload.file.into_vec().await.map_err(|e| {
            HelpdeskApiError::validation_failed(format!("Could not read upload: {}", e))
        })?;

        let attachment = self
            .collaboration_coordinator
            .add_attachment(&ctx, &viewer, &ticket_id.0, NewAttachment { filename, bytes })
            .await?;
        Ok(Json(AttachmentResponse::from(&attachment)))
    }
}
