use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::errors::InternalError;
use crate::types::db::{comment, ticket};

/// Data access for ticket comments
pub struct CommentStore;

impl CommentStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        ticket_pk: i64,
        author_id: &str,
        content: String,
        is_internal: bool,
        now: i64,
    ) -> Result<comment::Model, InternalError> {
        comment::ActiveModel {
            ticket_id: Set(ticket_pk),
            author_id: Set(author_id.to_string()),
            content: Set(content),
            is_internal: Set(is_internal),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_comment", e))
    }

    /// Comments of one ticket in creation order
    pub async fn list_for_ticket(
        &self,
        conn: &impl ConnectionTrait,
        ticket_pk: i64,
        include_internal: bool,
    ) -> Result<Vec<comment::Model>, InternalError> {
        let mut select = comment::Entity::find().filter(comment::Column::TicketId.eq(ticket_pk));
        if !include_internal {
            select = select.filter(comment::Column::IsInternal.eq(false));
        }
        select
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_comments", e))
    }

    /// Most recent comments across tickets, optionally limited to one creator's tickets
    pub async fn list_recent(
        &self,
        conn: &impl ConnectionTrait,
        ticket_creator: Option<&str>,
        include_internal: bool,
        limit: u64,
    ) -> Result<Vec<comment::Model>, InternalError> {
        let mut select = comment::Entity::find();
        if let Some(creator) = ticket_creator {
            select = select
                .join(JoinType::InnerJoin, comment::Relation::Ticket.def())
                .filter(ticket::Column::CreatedBy.eq(creator));
        }
        if !include_internal {
            select = select.filter(comment::Column::IsInternal.eq(false));
        }
        select
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .limit(limit)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_recent_comments", e))
    }
}

impl Default for CommentStore {
    fn default() -> Self {
        Self::new()
    }
}
