use crate::config::{connect_database, migrate_database, BootstrapSettings};

/// Run database migrations
///
/// Connects to the configured database and applies pending migrations.
/// It does not initialize the full AppData structure.
pub async fn run_migrations(
    bootstrap_settings: &BootstrapSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let db = connect_database(bootstrap_settings).await?;
    migrate_database(&db).await?;

    tracing::info!("All migrations completed successfully");
    println!("✓ Database is up to date");

    Ok(())
}
