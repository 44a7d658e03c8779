pub mod analytics;
pub mod context;
pub mod ticket;
pub mod user;
pub mod viewer;

pub use viewer::Viewer;
