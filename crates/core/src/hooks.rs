//! Change hooks invoked by the host ERP's document events, and the write
//! origin that guards against sync feedback loops.

use std::sync::Arc;

use tracing::{debug, warn};

use storebridge_domain::SyncKind;

use crate::sync::ports::SettingsProvider;
use crate::sync::{CustomerSyncService, OrderSyncService, ProductSyncService};

/// Origin of a local write.
///
/// Threaded explicitly through every `LocalStore` mutation: a write applied
/// by the sync engine itself carries `RemoteSync`, and the change hooks
/// return immediately for such writes. The guard is scoped to the single
/// write it is passed with; there is no ambient "sync in progress" state to
/// leak or forget to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOrigin {
    /// A user or host-system edit; eligible for outbound sync.
    Local,
    /// A write applied while ingesting remote state; never re-synced.
    RemoteSync,
}

impl WriteOrigin {
    /// Whether a change with this origin may trigger outbound sync.
    pub const fn triggers_sync(self) -> bool {
        matches!(self, Self::Local)
    }
}

/// Dispatcher the host ERP calls from its document events.
///
/// Hooks never raise into the host: a failed sync is logged and the local
/// save proceeds. Each hook checks the write origin, then the settings
/// gates, then delegates to the matching service.
pub struct ChangeHooks {
    products: Arc<ProductSyncService>,
    customers: Arc<CustomerSyncService>,
    orders: Arc<OrderSyncService>,
    settings: Arc<dyn SettingsProvider>,
}

impl ChangeHooks {
    pub fn new(
        products: Arc<ProductSyncService>,
        customers: Arc<CustomerSyncService>,
        orders: Arc<OrderSyncService>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self { products, customers, orders, settings }
    }

    /// An item was saved locally.
    pub async fn item_saved(&self, item_code: &str, origin: WriteOrigin) {
        if !origin.triggers_sync() {
            debug!(item_code, "skipping item hook for sync-origin write");
            return;
        }
        if !self.kind_enabled(SyncKind::Products).await {
            return;
        }
        if let Err(err) = self.products.sync_to_remote(item_code).await {
            warn!(item_code, error = %err, "item sync to remote failed");
        }
    }

    /// An item's stock level changed locally.
    pub async fn stock_changed(&self, item_code: &str, origin: WriteOrigin) {
        if !origin.triggers_sync() {
            debug!(item_code, "skipping stock hook for sync-origin write");
            return;
        }
        if !self.kind_enabled(SyncKind::Inventory).await {
            return;
        }
        if let Err(err) = self.products.push_inventory_for_item(item_code).await {
            warn!(item_code, error = %err, "inventory push failed");
        }
    }

    /// A customer was saved locally.
    pub async fn customer_saved(&self, local_id: &str, origin: WriteOrigin) {
        if !origin.triggers_sync() {
            debug!(local_id, "skipping customer hook for sync-origin write");
            return;
        }
        if !self.kind_enabled(SyncKind::Customers).await {
            return;
        }
        if let Err(err) = self.customers.sync_to_remote(local_id).await {
            warn!(local_id, error = %err, "customer sync to remote failed");
        }
    }

    /// A sales order that originated from the platform was submitted.
    pub async fn order_submitted(&self, local_order_id: &str) {
        if !self.kind_enabled(SyncKind::Orders).await {
            return;
        }
        if let Err(err) = self.orders.push_fulfillment(local_order_id, "processing").await {
            warn!(local_order_id, error = %err, "fulfillment push failed");
        }
    }

    /// A sales order that originated from the platform was cancelled.
    pub async fn order_cancelled(&self, local_order_id: &str) {
        if !self.kind_enabled(SyncKind::Orders).await {
            return;
        }
        if let Err(err) = self.orders.cancel_remote(local_order_id).await {
            warn!(local_order_id, error = %err, "remote order cancel failed");
        }
    }

    async fn kind_enabled(&self, kind: SyncKind) -> bool {
        match self.settings.settings().await {
            Ok(settings) => settings.kind_enabled(kind),
            Err(err) => {
                warn!(error = %err, "failed to read settings; skipping hook");
                false
            }
        }
    }
}
