// API layer - HTTP endpoints
pub mod analytics;
pub mod auth;
pub mod chat;
pub mod health;
pub mod tickets;
pub mod users;

pub use analytics::AnalyticsApi;
pub use auth::{CallerResolver, HelpdeskUserAuth};
pub use chat::ChatApi;
pub use health::HealthApi;
pub use tickets::TicketsApi;
pub use users::UsersApi;
