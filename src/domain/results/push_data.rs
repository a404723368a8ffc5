//! Outcome classification of data pushes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a create/update/delete call against a data sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushDataResultTypes {
    Success,
    NoOperation,
    Enqueued,
    ArgumentError,
    Error,
    AdminDown,
    LockTimeout,
    /// Batch whose items did not all share one outcome
    Partial,
}

impl PushDataResultTypes {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::NoOperation => "NoOperation",
            Self::Enqueued => "Enqueued",
            Self::ArgumentError => "ArgumentError",
            Self::Error => "Error",
            Self::AdminDown => "AdminDown",
            Self::LockTimeout => "LockTimeout",
            Self::Partial => "Partial",
        }
    }

    /// Outcomes that count as accepted by the sink
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::NoOperation | Self::Enqueued)
    }
}

impl fmt::Display for PushDataResultTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of pushing status updates upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushStatusResultTypes {
    Success,
    NoOperation,
    Enqueued,
    Error,
    AdminDown,
    LockTimeout,
    Partial,
}

impl PushStatusResultTypes {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::NoOperation => "NoOperation",
            Self::Enqueued => "Enqueued",
            Self::Error => "Error",
            Self::AdminDown => "AdminDown",
            Self::LockTimeout => "LockTimeout",
            Self::Partial => "Partial",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::NoOperation | Self::Enqueued)
    }
}

impl fmt::Display for PushStatusResultTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce several outcomes to one: the common outcome if all agree,
/// `partial` if they differ, `None` for no outcomes at all.
pub fn classify<T, I>(outcomes: I, partial: T) -> Option<T>
where
    T: Copy + PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut outcomes = outcomes.into_iter();
    let first = outcomes.next()?;
    if outcomes.all(|outcome| outcome == first) {
        Some(first)
    } else {
        Some(partial)
    }
}
