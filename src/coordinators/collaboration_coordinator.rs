use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::config::HelpdeskSettings;
use crate::errors::InternalError;
use crate::notifications::{EventSink, HelpdeskEvent};
use crate::providers::{access_policy, attachment_policy, ticket_rules};
use crate::storage::BlobStore;
use crate::stores::{AttachmentInsert, AttachmentStore, CommentStore, TicketStore, UserStore};
use crate::types::db::{attachment, comment};
use crate::types::internal::context::RequestContext;
use crate::types::internal::ticket::NewAttachment;
use crate::types::internal::Viewer;

/// Comments and attachments on tickets
pub struct CollaborationCoordinator {
    db: DatabaseConnection,
    settings: Arc<HelpdeskSettings>,
    ticket_store: Arc<TicketStore>,
    comment_store: Arc<CommentStore>,
    attachment_store: Arc<AttachmentStore>,
    user_store: Arc<UserStore>,
    blob_store: Arc<dyn BlobStore>,
    event_sink: Arc<dyn EventSink>,
}

impl CollaborationCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            settings: app_data.settings.clone(),
            ticket_store: app_data.ticket_store.clone(),
            comment_store: app_data.comment_store.clone(),
            attachment_store: app_data.attachment_store.clone(),
            user_store: app_data.user_store.clone(),
            blob_store: app_data.blob_store.clone(),
            event_sink: app_data.event_sink.clone(),
        }
    }

    /// Add a comment to a ticket the viewer can see
    ///
    /// The internal flag is dropped for non-staff authors. A public comment
    /// by staff on someone else's ticket notifies the ticket's creator.
    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        viewer: &Viewer,
        ticket_id: &str,
        body: &str,
        is_internal: bool,
    ) -> Result<comment::Model, InternalError> {
        let content = ticket_rules::require_text("comment", body)?;
        let ticket = self.ticket_store.get_by_ticket_id(&self.db, ticket_id).await?;
        access_policy::require_ticket_access(viewer, &ticket)?;

        let is_internal = is_internal && access_policy::can_mark_internal(viewer);

        // Internal notes never leave the staff side
        let notify = viewer.is_staff && !is_internal && ticket.created_by != viewer.user_id;
        let participants = if notify {
            Some((
                self.user_store.get_by_id(&self.db, &ticket.created_by).await?,
                self.user_store.get_by_id(&self.db, &viewer.user_id).await?,
            ))
        } else {
            None
        };

        let comment = self
            .comment_store
            .insert(
                &self.db,
                ticket.id,
                &viewer.user_id,
                content,
                is_internal,
                Utc::now().timestamp(),
            )
            .await?;

        tracing::info!(
            request_id = %ctx.request_id,
            ticket_id = %ticket.ticket_id,
            author = %viewer.user_id,
            is_internal,
            "Comment added"
        );

        if let Some((creator, author)) = participants {
            self.event_sink
                .publish(HelpdeskEvent::CommentAdded {
                    ticket,
                    creator,
                    author,
                    comment: comment.clone(),
                })
                .await;
        }

        Ok(comment)
    }

    /// Comments in creation order; internal ones only for staff
    pub async fn list_comments(
        &self,
        viewer: &Viewer,
        ticket_id: &str,
    ) -> Result<Vec<comment::Model>, InternalError> {
        let ticket = self.ticket_store.get_by_ticket_id(&self.db, ticket_id).await?;
        access_policy::require_ticket_access(viewer, &ticket)?;

        self.comment_store
            .list_for_ticket(
                &self.db,
                ticket.id,
                access_policy::can_see_internal_comment(viewer),
            )
            .await
    }

    /// Store an uploaded file and attach it to a ticket
    ///
    /// Size and extension are checked before anything is written. The
    /// recorded size is read back from the stored blob, and the blob is
    /// removed again when the attachment row cannot be inserted.
    pub async fn add_attachment(
        &self,
        ctx: &RequestContext,
        viewer: &Viewer,
        ticket_id: &str,
        upload: NewAttachment,
    ) -> Result<attachment::Model, InternalError> {
        let filename = ticket_rules::require_text("filename", &upload.filename)?;
        attachment_policy::validate_upload(
            &filename,
            upload.bytes.len() as u64,
            self.settings.max_attachment_bytes(),
        )?;

        let ticket = self.ticket_store.get_by_ticket_id(&self.db, ticket_id).await?;
        access_policy::require_ticket_access(viewer, &ticket)?;

        let locator = self.blob_store.store(&upload.bytes, &filename).await?;
        let file_size = match self.blob_store.size(&locator).await {
            Ok(size) => size,
            Err(e) => {
                self.discard_blob(ctx, &locator).await;
                return Err(e.into());
            }
        };

        let inserted = self
            .attachment_store
            .insert(
                &self.db,
                AttachmentInsert {
                    ticket_pk: ticket.id,
                    file_locator: locator.clone(),
                    original_filename: filename,
                    file_size: file_size as i64,
                    uploaded_by: viewer.user_id.clone(),
                },
                Utc::now().timestamp(),
            )
            .await;
        let attachment = match inserted {
            Ok(attachment) => attachment,
            Err(e) => {
                self.discard_blob(ctx, &locator).await;
                return Err(e);
            }
        };

        tracing::info!(
            request_id = %ctx.request_id,
            ticket_id = %ticket.ticket_id,
            filename = %attachment.original_filename,
            size = attachment.file_size,
            "Attachment uploaded"
        );

        Ok(attachment)
    }

    /// Remove a stored file whose attachment row was never written
    async fn discard_blob(&self, ctx: &RequestContext, locator: &str) {
        if let Err(e) = self.blob_store.delete(locator).await {
            tracing::warn!(
                request_id = %ctx.request_id,
                locator = %locator,
                error = %e,
                "Failed to remove orphaned attachment file"
            );
        }
    }

    pub async fn list_attachments(
        &self,
        viewer: &Viewer,
        ticket_id: &str,
    ) -> Result<Vec<attachment::Model>, InternalError> {
        let ticket = self.ticket_store.get_by_ticket_id(&self.db, ticket_id).await?;
        access_policy::require_ticket_access(viewer, &ticket)?;
        self.attachment_store.list_for_ticket(&self.db, ticket.id).await
    }
}
