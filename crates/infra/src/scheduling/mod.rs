//! Scheduling infrastructure for the recurring sync sweeps.
//!
//! One cron-based scheduler drives the inventory push, the catalog
//! reconciliation, and the daily maintenance run. Lifecycle is explicit:
//! start/stop, tracked join handles, cancellation tokens, and timeouts on
//! every async operation.

pub mod bridge_scheduler;
pub mod error;

pub use bridge_scheduler::{BridgeScheduler, BridgeSchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
