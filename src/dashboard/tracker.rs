//! Last-request-wins bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

impl QueryTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Hands out increasing tickets; only the newest one is current.
#[derive(Debug, Default)]
pub struct QueryTracker {
    latest: AtomicU64,
}

impl QueryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new query, superseding every earlier ticket.
    pub fn begin(&self) -> QueryTicket {
        QueryTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Pass `value` through only if `ticket` is still the newest query.
    pub fn accept<T>(&self, ticket: QueryTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}
