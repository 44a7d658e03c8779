use std::sync::Arc;

use clap::Parser;
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;

use helpdesk_backend::api::{AnalyticsApi, ChatApi, HealthApi, TicketsApi, UsersApi};
use helpdesk_backend::cli::{self, Cli, Commands};
use helpdesk_backend::config::{
    connect_database, init_logging, migrate_database, BootstrapSettings, SystemEnvironment,
};
use helpdesk_backend::coordinators::{
    AnalyticsCoordinator, CollaborationCoordinator, MessagingCoordinator, TicketCoordinator,
    UserCoordinator,
};
use helpdesk_backend::AppData;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging(&SystemEnvironment)?;

    let cli = Cli::parse();
    let bootstrap_settings = BootstrapSettings::from_env()?;

    let command = cli.command.unwrap_or(Commands::Serve);
    if let Commands::Migrate = command {
        return cli::migrate::run_migrations(&bootstrap_settings).await;
    }

    let db = connect_database(&bootstrap_settings).await?;
    migrate_database(&db).await?;
    tracing::info!("Database ready at {}", bootstrap_settings.database_url());

    let app_data = Arc::new(AppData::init(db, &bootstrap_settings).await?);

    match command {
        Commands::Serve => serve(app_data, &bootstrap_settings).await,
        other => cli::execute_command(other, app_data).await,
    }
}

async fn serve(
    app_data: Arc<AppData>,
    bootstrap_settings: &BootstrapSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let user_coordinator = Arc::new(UserCoordinator::new(app_data.clone()));
    let ticket_coordinator = Arc::new(TicketCoordinator::new(app_data.clone()));
    let collaboration_coordinator = Arc::new(CollaborationCoordinator::new(app_data.clone()));
    let messaging_coordinator = Arc::new(MessagingCoordinator::new(app_data.clone()));
    let analytics_coordinator = Arc::new(AnalyticsCoordinator::new(app_data.clone()));

    let apis = (
        HealthApi::new(app_data.db.clone()),
        UsersApi::new(user_coordinator.clone()),
        TicketsApi::new(
            ticket_coordinator,
            collaboration_coordinator,
            user_coordinator.clone(),
        ),
        ChatApi::new(messaging_coordinator, user_coordinator.clone()),
        AnalyticsApi::new(analytics_coordinator, user_coordinator),
    );

    let address = bootstrap_settings.server_address();
    let api_service = OpenApiService::new(apis, "Helpdesk API", "1.0.0")
        .server(format!("http://{}", address));
    let ui = api_service.swagger_ui();

    let app = Route::new().nest("/", api_service).nest("/swagger", ui);

    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at http://{}/swagger", address);

    Server::new(TcpListener::bind(address)).run(app).await?;
    Ok(())
}
