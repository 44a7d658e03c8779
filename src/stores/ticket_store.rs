use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::errors::internal::NotFoundError;
use crate::errors::InternalError;
use crate::types::db::ticket::{self, TicketCategory, TicketPriority, TicketStatus};
use crate::types::db::ticket_sequence;
use crate::types::internal::ticket::TicketQuery;

/// Name of the counter row that numbers tickets
pub const TICKET_SEQUENCE: &str = "tickets";

/// Column values of a ticket about to be inserted
pub struct TicketInsert {
    pub ticket_id: String,
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub created_by: String,
    pub deadline: Option<NaiveDate>,
}

/// Data access for tickets and their numbering sequence
pub struct TicketStore;

impl TicketStore {
    pub fn new() -> Self {
        Self
    }

    /// Atomically advance the ticket counter and return the new value
    ///
    /// Must run inside the transaction that inserts the ticket so the
    /// increment and the insert commit or roll back together.
    pub async fn next_sequence_value(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<i64, InternalError> {
        let updated = ticket_sequence::Entity::update_many()
            .col_expr(
                ticket_sequence::Column::LastValue,
                Expr::col(ticket_sequence::Column::LastValue).add(1),
            )
            .filter(ticket_sequence::Column::Name.eq(TICKET_SEQUENCE))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("advance_ticket_sequence", e))?;

        if updated.rows_affected == 0 {
            // Counter row missing (schema created without seed data)
            ticket_sequence::ActiveModel {
                name: Set(TICKET_SEQUENCE.to_string()),
                last_value: Set(1),
            }
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("seed_ticket_sequence", e))?;
            return Ok(1);
        }

        let row = ticket_sequence::Entity::find_by_id(TICKET_SEQUENCE.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("read_ticket_sequence", e))?
            .ok_or_else(|| {
                InternalError::parse("ticket_sequence", "counter row vanished after update")
            })?;

        Ok(row.last_value)
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new_ticket: TicketInsert,
        now: i64,
    ) -> Result<ticket::Model, InternalError> {
        ticket::ActiveModel {
            ticket_id: Set(new_ticket.ticket_id),
            title: Set(new_ticket.title),
            description: Set(new_ticket.description),
            category: Set(new_ticket.category),
            priority: Set(new_ticket.priority),
            status: Set(TicketStatus::Open),
            created_by: Set(new_ticket.created_by),
            assigned_to: Set(None),
            escalated_to: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deadline: Set(new_ticket.deadline),
            resolved_at: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_ticket", e))
    }

    /// Look a ticket up by its public identifier
    ///
    /// # Errors
    /// `NotFoundError::Ticket` when no ticket carries that identifier
    pub async fn get_by_ticket_id(
        &self,
        conn: &impl ConnectionTrait,
        ticket_id: &str,
    ) -> Result<ticket::Model, InternalError> {
        ticket::Entity::find()
            .filter(ticket::Column::TicketId.eq(ticket_id))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_ticket", e))?
            .ok_or_else(|| NotFoundError::Ticket(ticket_id.to_string()).into())
    }

    pub async fn ticket_id_exists(
        &self,
        conn: &impl ConnectionTrait,
        ticket_id: &str,
    ) -> Result<bool, InternalError> {
        let count = ticket::Entity::find()
            .filter(ticket::Column::TicketId.eq(ticket_id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("ticket_id_exists", e))?;
        Ok(count > 0)
    }

    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        ticket: ticket::ActiveModel,
    ) -> Result<ticket::Model, InternalError> {
        ticket
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_ticket", e))
    }

    /// Tickets matching `query`, newest first
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        query: &TicketQuery,
    ) -> Result<Vec<ticket::Model>, InternalError> {
        let mut select = ticket::Entity::find();

        if let Some(created_by) = &query.created_by {
            select = select.filter(ticket::Column::CreatedBy.eq(created_by.as_str()));
        }
        if let Some(status) = query.status {
            select = select.filter(ticket::Column::Status.eq(status));
        }
        if let Some(priority) = query.priority {
            select = select.filter(ticket::Column::Priority.eq(priority));
        }
        if let Some(category) = query.category {
            select = select.filter(ticket::Column::Category.eq(category));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(search_condition(search));
        }

        select
            .order_by_desc(ticket::Column::CreatedAt)
            .order_by_desc(ticket::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_tickets", e))
    }

    /// Tickets with a deadline, earliest deadline first
    pub async fn list_with_deadline(
        &self,
        conn: &impl ConnectionTrait,
        created_by: Option<&str>,
    ) -> Result<Vec<ticket::Model>, InternalError> {
        let mut select = ticket::Entity::find().filter(ticket::Column::Deadline.is_not_null());
        if let Some(created_by) = created_by {
            select = select.filter(ticket::Column::CreatedBy.eq(created_by));
        }
        select
            .order_by_asc(ticket::Column::Deadline)
            .order_by_asc(ticket::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_tickets_with_deadline", e))
    }

    pub async fn count(
        &self,
        conn: &impl ConnectionTrait,
        created_by: Option<&str>,
    ) -> Result<u64, InternalError> {
        let mut select = ticket::Entity::find();
        if let Some(created_by) = created_by {
            select = select.filter(ticket::Column::CreatedBy.eq(created_by));
        }
        select
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_tickets", e))
    }

    /// Ticket counts grouped by the stored value of `column`
    ///
    /// Only values that occur are returned; callers fill in zeros.
    pub async fn count_grouped_by(
        &self,
        conn: &impl ConnectionTrait,
        column: ticket::Column,
        created_by: Option<&str>,
    ) -> Result<Vec<(String, i64)>, InternalError> {
        let mut select = ticket::Entity::find()
            .select_only()
            .column(column)
            .column_as(ticket::Column::Id.count(), "count");
        if let Some(created_by) = created_by {
            select = select.filter(ticket::Column::CreatedBy.eq(created_by));
        }
        select
            .group_by(column)
            .into_tuple::<(String, i64)>()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("count_tickets_grouped", e))
    }

    /// Tickets created within `[from, until]` (Unix seconds)
    pub async fn count_created_between(
        &self,
        conn: &impl ConnectionTrait,
        from: i64,
        until: i64,
    ) -> Result<u64, InternalError> {
        ticket::Entity::find()
            .filter(ticket::Column::CreatedAt.between(from, until))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_created_between", e))
    }

    /// Tickets whose resolution time falls within `[from, until]`
    pub async fn count_resolved_between(
        &self,
        conn: &impl ConnectionTrait,
        from: i64,
        until: i64,
    ) -> Result<u64, InternalError> {
        ticket::Entity::find()
            .filter(ticket::Column::ResolvedAt.between(from, until))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_resolved_between", e))
    }

    /// `(created_at, resolved_at)` of every ticket with a resolution time
    pub async fn resolution_spans(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<(i64, i64)>, InternalError> {
        ticket::Entity::find()
            .select_only()
            .column(ticket::Column::CreatedAt)
            .column(ticket::Column::ResolvedAt)
            .filter(ticket::Column::ResolvedAt.is_not_null())
            .into_tuple::<(i64, i64)>()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("resolution_spans", e))
    }
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive substring match on ticket id, title or description
fn search_condition(search: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
    [
        ticket::Column::TicketId,
        ticket::Column::Title,
        ticket::Column::Description,
    ]
    .into_iter()
    .fold(Condition::any(), |condition, column| {
        condition.add(
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{seed_user, setup_test_db};

    fn insert_for(ticket_id: &str, title: &str, created_by: &str) -> TicketInsert {
        TicketInsert {
            ticket_id: ticket_id.to_string(),
            title: title.to_string(),
            description: "Printer shows error 50".to_string(),
            category: TicketCategory::Hardware,
            priority: TicketPriority::High,
            created_by: created_by.to_string(),
            deadline: None,
        }
    }

    #[tokio::test]
    async fn test_sequence_advances_monotonically() {
        let db = setup_test_db().await;
        let store = TicketStore::new();

        assert_eq!(store.next_sequence_value(&db).await.unwrap(), 1);
        assert_eq!(store.next_sequence_value(&db).await.unwrap(), 2);
        assert_eq!(store.next_sequence_value(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sequence_reseeds_missing_row() {
        let db = setup_test_db().await;
        ticket_sequence::Entity::delete_many().exec(&db).await.unwrap();

        let store = TicketStore::new();
        assert_eq!(store.next_sequence_value(&db).await.unwrap(), 1);
        assert_eq!(store.next_sequence_value(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_defaults_to_open() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "alice", false).await;
        let store = TicketStore::new();

        let ticket = store
            .insert(&db, insert_for("JIAI-00001", "Printer jam", &user.id), 100)
            .await
            .unwrap();

        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.resolved_at.is_none());
        assert!(ticket.assigned_to.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_ticket_id_is_unique_violation() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "alice", false).await;
        let store = TicketStore::new();

        store
            .insert(&db, insert_for("JIAI-00001", "First", &user.id), 100)
            .await
            .unwrap();
        let result = store
            .insert(&db, insert_for("JIAI-00001", "Second", &user.id), 101)
            .await;

        match result {
            Err(InternalError::Database(db_err)) => assert!(db_err.is_unique_violation()),
            other => panic!("Expected unique violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_unknown_ticket_is_not_found() {
        let db = setup_test_db().await;
        let result = TicketStore::new().get_by_ticket_id(&db, "JIAI-99999").await;
        match result {
            Err(InternalError::NotFound(NotFoundError::Ticket(id))) => assert_eq!(id, "JIAI-99999"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive_and_newest_first() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "alice", false).await;
        let store = TicketStore::new();

        store.insert(&db, insert_for("JIAI-00001", "VPN drops", &user.id), 100).await.unwrap();
        store.insert(&db, insert_for("JIAI-00002", "Laptop fan", &user.id), 200).await.unwrap();
        store.insert(&db, insert_for("JIAI-00003", "vpn slow", &user.id), 300).await.unwrap();

        let query = TicketQuery {
            search: Some("VpN".to_string()),
            ..Default::default()
        };
        let found = store.list(&db, &query).await.unwrap();
        let ids: Vec<_> = found.iter().map(|t| t.ticket_id.as_str()).collect();
        assert_eq!(ids, vec!["JIAI-00003", "JIAI-00001"]);

        let by_id = TicketQuery {
            search: Some("jiai-00002".to_string()),
            ..Default::default()
        };
        assert_eq!(store.list(&db, &by_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_search_treats_wildcards_literally() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "alice", false).await;
        let store = TicketStore::new();
        store.insert(&db, insert_for("JIAI-00001", "Disk full", &user.id), 100).await.unwrap();

        let query = TicketQuery {
            search: Some("%".to_string()),
            ..Default::default()
        };
        assert!(store.list(&db, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_restricts_to_creator() {
        let db = setup_test_db().await;
        let alice = seed_user(&db, "alice", false).await;
        let bob = seed_user(&db, "bob", false).await;
        let store = TicketStore::new();

        store.insert(&db, insert_for("JIAI-00001", "Alice's", &alice.id), 100).await.unwrap();
        store.insert(&db, insert_for("JIAI-00002", "Bob's", &bob.id), 100).await.unwrap();

        let query = TicketQuery {
            created_by: Some(bob.id.clone()),
            ..Default::default()
        };
        let found = store.list(&db, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].created_by, bob.id);
    }

    #[tokio::test]
    async fn test_count_grouped_by_status() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "alice", false).await;
        let store = TicketStore::new();

        store.insert(&db, insert_for("JIAI-00001", "a", &user.id), 100).await.unwrap();
        let second = store.insert(&db, insert_for("JIAI-00002", "b", &user.id), 100).await.unwrap();
        let mut active: ticket::ActiveModel = second.into();
        active.status = Set(TicketStatus::Escalated);
        store.update(&db, active).await.unwrap();

        let mut counts = store
            .count_grouped_by(&db, ticket::Column::Status, None)
            .await
            .unwrap();
        counts.sort();
        assert_eq!(
            counts,
            vec![("escalated".to_string(), 1), ("open".to_string(), 1)]
        );
    }
}
