pub mod errors;
pub mod subscription;

pub use errors::{DomainError, DomainResult, HandlerError, HandlerResult};
pub use subscription::SubscriptionId;
