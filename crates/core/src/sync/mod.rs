//! Sync services: per-kind reconciliation plus the webhook dispatcher.

pub mod customers;
pub mod dispatch;
pub mod orders;
pub mod ports;
pub mod products;

pub use customers::CustomerSyncService;
pub use orders::OrderSyncService;
pub use products::ProductSyncService;

/// Outcome of a single-entity sync operation.
///
/// `Skipped` is a policy decision (auto-create disabled, direction excluded),
/// not a failure: the caller acknowledges it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    Skipped(String),
}

impl SyncOutcome {
    /// Convenience for the skipped-by-policy case.
    pub fn skipped(reason: &str) -> Self {
        Self::Skipped(reason.to_string())
    }
}

/// Current unix timestamp in seconds.
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
