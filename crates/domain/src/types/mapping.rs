//! Mapping records linking local ERP entities to remote storefront entities.
//!
//! One record per (local id, remote id) pair per entity kind. The remote id
//! is never reassigned once set; re-linking requires deleting the record and
//! creating a new one.

use serde::{Deserialize, Serialize};

use crate::constants::PRICE_EPSILON;

/// Which way changes are allowed to flow for a mapped entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncDirection {
    Bidirectional,
    LocalToRemote,
    RemoteToLocal,
}

impl SyncDirection {
    /// Whether local changes may be pushed to the remote platform.
    pub const fn allows_push(self) -> bool {
        matches!(self, Self::Bidirectional | Self::LocalToRemote)
    }

    /// Whether remote changes may be applied locally.
    pub const fn allows_pull(self) -> bool {
        matches!(self, Self::Bidirectional | Self::RemoteToLocal)
    }

    /// Stable string form used for storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bidirectional => "bidirectional",
            Self::LocalToRemote => "local_to_remote",
            Self::RemoteToLocal => "remote_to_local",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bidirectional" => Some(Self::Bidirectional),
            "local_to_remote" => Some(Self::LocalToRemote),
            "remote_to_local" => Some(Self::RemoteToLocal),
            _ => None,
        }
    }
}

/// Reconciliation state of a mapped entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Pending,
    Synced,
    Error,
    Conflict,
    Processing,
}

impl SyncStatus {
    /// Stable string form used for storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Error => "error",
            Self::Conflict => "conflict",
            Self::Processing => "processing",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "synced" => Some(Self::Synced),
            "error" => Some(Self::Error),
            "conflict" => Some(Self::Conflict),
            "processing" => Some(Self::Processing),
            _ => None,
        }
    }
}

/// Mapping between a local item and a remote product (or product variant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMapping {
    pub item_code: String,
    pub remote_product_id: String,
    pub remote_variant_id: Option<String>,
    pub sync_direction: SyncDirection,
    pub sync_status: SyncStatus,
    pub local_price: f64,
    pub remote_price: f64,
    pub local_stock_qty: f64,
    pub remote_stock_qty: f64,
    pub price_difference: f64,
    pub stock_difference: f64,
    pub last_sync_time: Option<i64>,
    pub last_error_time: Option<i64>,
    pub error_log: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProductMapping {
    /// Create a fresh `Pending` bidirectional mapping.
    pub fn new(item_code: &str, remote_product_id: &str, now: i64) -> Self {
        Self {
            item_code: item_code.to_string(),
            remote_product_id: remote_product_id.to_string(),
            remote_variant_id: None,
            sync_direction: SyncDirection::Bidirectional,
            sync_status: SyncStatus::Pending,
            local_price: 0.0,
            remote_price: 0.0,
            local_stock_qty: 0.0,
            remote_stock_qty: 0.0,
            price_difference: 0.0,
            stock_difference: 0.0,
            last_sync_time: None,
            last_error_time: None,
            error_log: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute the derived difference fields from the stored snapshots.
    ///
    /// Differences are local minus remote, so a positive price difference
    /// means the local side is more expensive.
    pub fn refresh_differences(&mut self) {
        self.price_difference = self.local_price - self.remote_price;
        self.stock_difference = self.local_stock_qty - self.remote_stock_qty;
    }

    /// Apply conflict detection to a previously synced mapping.
    ///
    /// While `Synced`, a price divergence beyond the epsilon or any stock
    /// divergence flips the record to `Conflict`. Only a successful
    /// directional sync that equalizes both sides returns it to `Synced`.
    pub fn detect_conflict(&mut self) -> bool {
        if self.sync_status != SyncStatus::Synced {
            return false;
        }
        if self.price_difference.abs() > PRICE_EPSILON || self.stock_difference != 0.0 {
            self.sync_status = SyncStatus::Conflict;
            return true;
        }
        false
    }

    /// Record a successful sync: snapshots are expected to already be
    /// equalized by the caller.
    pub fn mark_synced(&mut self, now: i64) {
        self.sync_status = SyncStatus::Synced;
        self.last_sync_time = Some(now);
        self.error_log = None;
        self.updated_at = now;
        self.refresh_differences();
    }

    /// Record a failed sync attempt.
    pub fn mark_error(&mut self, message: &str, now: i64) {
        self.sync_status = SyncStatus::Error;
        self.last_error_time = Some(now);
        self.error_log = Some(message.to_string());
        self.updated_at = now;
    }
}

/// Mapping between a local customer and a remote contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerMapping {
    pub local_id: String,
    pub remote_customer_id: String,
    pub local_name: String,
    pub local_email: Option<String>,
    pub local_phone: Option<String>,
    pub remote_first_name: Option<String>,
    pub remote_last_name: Option<String>,
    pub remote_email: Option<String>,
    pub remote_phone: Option<String>,
    pub sync_direction: SyncDirection,
    pub sync_status: SyncStatus,
    pub last_sync_time: Option<i64>,
    pub last_error_time: Option<i64>,
    pub error_log: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CustomerMapping {
    /// Create a fresh `Pending` bidirectional mapping.
    pub fn new(local_id: &str, remote_customer_id: &str, local_name: &str, now: i64) -> Self {
        Self {
            local_id: local_id.to_string(),
            remote_customer_id: remote_customer_id.to_string(),
            local_name: local_name.to_string(),
            local_email: None,
            local_phone: None,
            remote_first_name: None,
            remote_last_name: None,
            remote_email: None,
            remote_phone: None,
            sync_direction: SyncDirection::Bidirectional,
            sync_status: SyncStatus::Pending,
            last_sync_time: None,
            last_error_time: None,
            error_log: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a successful sync.
    pub fn mark_synced(&mut self, now: i64) {
        self.sync_status = SyncStatus::Synced;
        self.last_sync_time = Some(now);
        self.error_log = None;
        self.updated_at = now;
    }

    /// Record a failed sync attempt.
    pub fn mark_error(&mut self, message: &str, now: i64) {
        self.sync_status = SyncStatus::Error;
        self.last_error_time = Some(now);
        self.error_log = Some(message.to_string());
        self.updated_at = now;
    }
}
