//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Reconciliation thresholds
pub const PRICE_EPSILON: f64 = 0.01;
pub const MAX_ORDER_RETRIES: i64 = 3;

// Batch pagination
pub const SYNC_PAGE_SIZE: usize = 50;

// Retention
pub const ORDER_LOG_RETENTION_DAYS: i64 = 90;

// Gateway timing
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RATE_LIMIT_WAIT_SECS: u64 = 60;

// Inventory alerting
pub const DEFAULT_REORDER_LEVEL: f64 = 5.0;

// Synthetic line item used for shipping charges on ingested orders
pub const SHIPPING_ITEM_CODE: &str = "SHIPPING";

// Prefix for auto-created items that carry no SKU on the remote side
pub const GENERATED_ITEM_PREFIX: &str = "WIX-";
