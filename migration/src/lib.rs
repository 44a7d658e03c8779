pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_identity_tables;
mod m20251001_000002_create_ticket_tables;
mod m20251001_000003_create_messaging_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_identity_tables::Migration),
            Box::new(m20251001_000002_create_ticket_tables::Migration),
            Box::new(m20251001_000003_create_messaging_tables::Migration),
        ]
    }
}
