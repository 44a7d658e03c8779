use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::InternalError;
use crate::types::db::attachment;

/// Attachment metadata captured at upload time
pub struct AttachmentInsert {
    pub ticket_pk: i64,
    pub file_locator: String,
    pub original_filename: String,
    pub file_size: i64,
    pub uploaded_by: String,
}

pub struct AttachmentStore;

impl AttachmentStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new_attachment: AttachmentInsert,
        now: i64,
    ) -> Result<attachment::Model, InternalError> {
        attachment::ActiveModel {
            ticket_id: Set(new_attachment.ticket_pk),
            file_locator: Set(new_attachment.file_locator),
            original_filename: Set(new_attachment.original_filename),
            file_size: Set(new_attachment.file_size),
            uploaded_by: Set(new_attachment.uploaded_by),
            uploaded_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_attachment", e))
    }

    /// Attachments of one ticket, latest upload first
    pub async fn list_for_ticket(
        &self,
        conn: &impl ConnectionTrait,
        ticket_pk: i64,
    ) -> Result<Vec<attachment::Model>, InternalError> {
        attachment::Entity::find()
            .filter(attachment::Column::TicketId.eq(ticket_pk))
            .order_by_desc(attachment::Column::UploadedAt)
            .order_by_desc(attachment::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_attachments", e))
    }
}

impl Default for AttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}
