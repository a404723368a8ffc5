//! Subscription handles shared by every callback registry

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle returned when registering a callback. Passing it back to the
/// registry's `unsubscribe` removes exactly that callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Per-registry handle allocator
#[derive(Debug, Default)]
pub(crate) struct SubscriptionCounter(AtomicU64);

impl SubscriptionCounter {
    pub(crate) fn next(&self) -> SubscriptionId {
        SubscriptionId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
