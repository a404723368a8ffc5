use thiserror::Error;

/// Error raised by a subscriber callback (voter, notifier or status
/// change handler). It aborts the remaining callbacks of the same event
/// and is handed back to whoever fired the event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result returned by subscriber callbacks
pub type HandlerResult<T> = Result<T, HandlerError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Subscriber failed: {0}")]
    Subscriber(#[from] HandlerError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this error was raised by a subscriber rather than by the
    /// caller's own usage of the API.
    pub fn is_subscriber_error(&self) -> bool {
        matches!(self, DomainError::Subscriber(_))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
