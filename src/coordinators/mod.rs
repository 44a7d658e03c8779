// Coordinators layer - Workflow orchestration
//
// Coordinators compose store and provider operations for one use case each,
// own the database transaction, and publish domain events after commit.

pub mod analytics_coordinator;
pub mod collaboration_coordinator;
pub mod messaging_coordinator;
pub mod ticket_coordinator;
pub mod user_coordinator;

pub use analytics_coordinator::AnalyticsCoordinator;
pub use collaboration_coordinator::CollaborationCoordinator;
pub use messaging_coordinator::MessagingCoordinator;
pub use ticket_coordinator::TicketCoordinator;
pub use user_coordinator::UserCoordinator;
