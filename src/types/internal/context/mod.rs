pub mod request_context;
pub mod request_id;

pub use request_context::{RequestContext, RequestOrigin};
pub use request_id::RequestId;
