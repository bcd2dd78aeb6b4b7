//! Order sync log: the idempotency record for remote order ingestion.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ORDER_RETRIES;
use crate::types::mapping::SyncStatus;

/// One record per remote order id, created on first sight of the order and
/// updated on every subsequent attempt or webhook. The unique remote id is
/// what makes order ingestion idempotent: webhook redelivery and polling
/// overlap both converge on this record instead of creating a second local
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSyncLog {
    pub remote_order_id: String,
    pub remote_order_number: Option<String>,
    pub remote_customer_id: Option<String>,
    pub local_order_id: Option<String>,
    pub customer_local_id: Option<String>,
    pub order_total: f64,
    pub order_items_count: i64,
    pub payment_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub tracking_number: Option<String>,
    /// Raw remote payload, kept for replay on retry.
    pub payload_json: String,
    pub sync_status: SyncStatus,
    pub retry_count: i64,
    pub error_log: Option<String>,
    pub created_at: i64,
    pub last_sync_time: Option<i64>,
    pub last_error_time: Option<i64>,
}

impl OrderSyncLog {
    /// Create a fresh `Pending` log for a newly seen remote order.
    pub fn new(remote_order_id: &str, payload_json: &str, now: i64) -> Self {
        Self {
            remote_order_id: remote_order_id.to_string(),
            remote_order_number: None,
            remote_customer_id: None,
            local_order_id: None,
            customer_local_id: None,
            order_total: 0.0,
            order_items_count: 0,
            payment_status: None,
            fulfillment_status: None,
            tracking_number: None,
            payload_json: payload_json.to_string(),
            sync_status: SyncStatus::Pending,
            retry_count: 0,
            error_log: None,
            created_at: now,
            last_sync_time: None,
            last_error_time: None,
        }
    }

    /// Whether local order creation may be attempted again.
    pub fn can_retry(&self) -> bool {
        self.local_order_id.is_none() && self.retry_count < MAX_ORDER_RETRIES
    }

    /// Record a successful local order creation.
    pub fn mark_synced(&mut self, local_order_id: &str, now: i64) {
        self.local_order_id = Some(local_order_id.to_string());
        self.sync_status = SyncStatus::Synced;
        self.last_sync_time = Some(now);
        self.error_log = None;
    }

    /// Record a failed creation attempt and consume one retry.
    pub fn mark_error(&mut self, message: &str, now: i64) {
        self.sync_status = SyncStatus::Error;
        self.retry_count += 1;
        self.error_log = Some(message.to_string());
        self.last_error_time = Some(now);
    }
}
