//! Order ingestion and fulfillment push.
//!
//! Every remote order flows through an `OrderSyncLog` keyed by the remote
//! order id: webhook redelivery and polling overlap both converge on the
//! same record, so at most one local order is ever created per remote order.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use storebridge_domain::constants::SHIPPING_ITEM_CODE;
use storebridge_domain::{
    BridgeError, BridgeSettings, LocalItem, LocalOrder, LocalOrderLine, LocalTaxLine,
    OrderSyncLog, ProductMapping, RemoteLineItem, RemoteOrder, Result, SyncStatus,
};

use crate::hooks::WriteOrigin;
use crate::sync::ports::{
    LocalStore, OrderSyncLogRepository, ProductMappingRepository, RemoteGateway,
    SettingsProvider,
};
use crate::sync::products::item_code_for;
use crate::sync::{unix_now, CustomerSyncService, SyncOutcome};

/// Result of a successful local order creation.
struct CreatedOrder {
    local_order_id: String,
    customer_local_id: String,
    total: f64,
}

/// Ingests remote orders into the ERP and pushes fulfillment state back.
pub struct OrderSyncService {
    logs: Arc<dyn OrderSyncLogRepository>,
    product_mappings: Arc<dyn ProductMappingRepository>,
    gateway: Arc<dyn RemoteGateway>,
    local: Arc<dyn LocalStore>,
    customers: Arc<CustomerSyncService>,
    settings: Arc<dyn SettingsProvider>,
}

impl OrderSyncService {
    pub fn new(
        logs: Arc<dyn OrderSyncLogRepository>,
        product_mappings: Arc<dyn ProductMappingRepository>,
        gateway: Arc<dyn RemoteGateway>,
        local: Arc<dyn LocalStore>,
        customers: Arc<CustomerSyncService>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self { logs, product_mappings, gateway, local, customers, settings }
    }

    /// Gateway handle, shared with the dispatcher for thin order payloads.
    pub(crate) fn gateway(&self) -> &Arc<dyn RemoteGateway> {
        &self.gateway
    }

    /// Ingest a remote order, idempotently.
    ///
    /// A log already holding a local order id is returned unchanged. A log
    /// still eligible for retry gets another creation attempt; a fresh order
    /// gets a new `Pending` log first. The returned log reflects the outcome
    /// of this attempt; callers inspect its status.
    pub async fn ingest(&self, order: &RemoteOrder, raw_payload: &Value) -> Result<OrderSyncLog> {
        if let Some(mut existing) = self.logs.get_by_remote_order_id(&order.id).await? {
            if existing.can_retry() {
                self.attempt_creation(&mut existing, order).await?;
            }
            return Ok(existing);
        }

        let mut log = OrderSyncLog::new(&order.id, &raw_payload.to_string(), unix_now());
        log.remote_order_number = order.number.clone();
        log.remote_customer_id = order.buyer.contact_id.clone();
        log.order_total = order.total;
        log.order_items_count = order.line_items.len() as i64;
        log.payment_status = order.payment_status.clone();
        log.fulfillment_status = order.fulfillment_status.clone();
        self.logs.insert(&log).await?;

        self.attempt_creation(&mut log, order).await?;
        Ok(log)
    }

    /// One local-order creation attempt against an existing log.
    ///
    /// Success marks the log `Synced`; any failure marks it `Error` and
    /// consumes one retry. The failure itself is recorded on the log, not
    /// propagated, so batch sweeps keep moving.
    pub async fn attempt_creation(
        &self,
        log: &mut OrderSyncLog,
        order: &RemoteOrder,
    ) -> Result<()> {
        log.sync_status = SyncStatus::Processing;
        self.logs.update(log).await?;

        match self.create_local_order(order).await {
            Ok(created) => {
                log.customer_local_id = Some(created.customer_local_id);
                log.order_total = created.total;
                log.mark_synced(&created.local_order_id, unix_now());
                info!(
                    remote_order_id = %order.id,
                    local_order_id = %created.local_order_id,
                    "order ingested"
                );
            }
            Err(err) => {
                warn!(remote_order_id = %order.id, error = %err, "order creation failed");
                log.mark_error(&err.to_string(), unix_now());
            }
        }
        self.logs.update(log).await
    }

    /// Re-attempt creation from the stored payload (retry sweep path).
    pub async fn retry_from_log(&self, log: &mut OrderSyncLog) -> Result<()> {
        let payload: Value = serde_json::from_str(&log.payload_json)
            .map_err(|e| BridgeError::Validation(format!("stored order payload invalid: {e}")))?;
        let order = RemoteOrder::from_payload(&payload)?;
        self.attempt_creation(log, &order).await
    }

    /// Refresh order number and payment/fulfillment status from an
    /// order-updated webhook. Returns `None` when the order was never
    /// ingested.
    pub async fn update_from_webhook(
        &self,
        order: &RemoteOrder,
    ) -> Result<Option<OrderSyncLog>> {
        let Some(mut log) = self.logs.get_by_remote_order_id(&order.id).await? else {
            return Ok(None);
        };
        if order.number.is_some() {
            log.remote_order_number = order.number.clone();
        }
        if order.payment_status.is_some() {
            log.payment_status = order.payment_status.clone();
        }
        if order.fulfillment_status.is_some() {
            log.fulfillment_status = order.fulfillment_status.clone();
        }
        log.last_sync_time = Some(unix_now());
        self.logs.update(&log).await?;
        Ok(Some(log))
    }

    /// Push a fulfillment status for a platform-originated local order.
    pub async fn push_fulfillment(
        &self,
        local_order_id: &str,
        local_status: &str,
    ) -> Result<SyncOutcome> {
        let Some(mut log) = self.logs.get_by_local_order_id(local_order_id).await? else {
            return Ok(SyncOutcome::skipped("order did not originate from the platform"));
        };
        let Some(remote_status) = map_fulfillment_status(local_status) else {
            return Ok(SyncOutcome::skipped("local status has no remote counterpart"));
        };

        self.gateway
            .create_fulfillment(&log.remote_order_id, remote_status, None, None)
            .await?;
        log.fulfillment_status = Some(remote_status.to_string());
        log.last_sync_time = Some(unix_now());
        self.logs.update(&log).await?;
        Ok(SyncOutcome::Synced)
    }

    /// Push tracking details, marking the remote order fulfilled.
    pub async fn push_tracking(
        &self,
        local_order_id: &str,
        tracking_number: &str,
        carrier: Option<&str>,
    ) -> Result<SyncOutcome> {
        let Some(mut log) = self.logs.get_by_local_order_id(local_order_id).await? else {
            return Ok(SyncOutcome::skipped("order did not originate from the platform"));
        };

        self.gateway
            .create_fulfillment(&log.remote_order_id, "fulfilled", Some(tracking_number), carrier)
            .await?;
        log.tracking_number = Some(tracking_number.to_string());
        log.fulfillment_status = Some("fulfilled".to_string());
        log.last_sync_time = Some(unix_now());
        self.logs.update(&log).await?;
        Ok(SyncOutcome::Synced)
    }

    /// Cancel the remote counterpart of a local order.
    pub async fn cancel_remote(&self, local_order_id: &str) -> Result<SyncOutcome> {
        let Some(mut log) = self.logs.get_by_local_order_id(local_order_id).await? else {
            return Ok(SyncOutcome::skipped("order did not originate from the platform"));
        };

        self.gateway.cancel_order(&log.remote_order_id).await?;
        log.fulfillment_status = Some("cancelled".to_string());
        log.last_sync_time = Some(unix_now());
        self.logs.update(&log).await?;
        Ok(SyncOutcome::Synced)
    }

    async fn create_local_order(&self, order: &RemoteOrder) -> Result<CreatedOrder> {
        let settings = self.settings.settings().await?;
        let customer_local_id = self.customers.resolve_buyer(&order.buyer).await?;

        let mut lines = Vec::new();
        for item in &order.line_items {
            match self.resolve_line(item, &settings).await? {
                Some(line) => lines.push(line),
                None => warn!(
                    remote_order_id = %order.id,
                    sku = item.sku.as_deref().unwrap_or(""),
                    "line item unresolvable; skipped"
                ),
            }
        }
        if lines.is_empty() {
            return Err(BridgeError::Validation(
                "order has no resolvable line items".to_string(),
            ));
        }

        if order.shipping_cost > 0.0 {
            self.ensure_shipping_item().await?;
            lines.push(LocalOrderLine {
                item_code: SHIPPING_ITEM_CODE.to_string(),
                quantity: 1.0,
                rate: order.shipping_cost,
                warehouse: None,
                description: Some("Shipping charges".to_string()),
            });
        }

        let mut taxes = Vec::new();
        if order.tax > 0.0 {
            taxes.push(LocalTaxLine { description: "Sales tax".to_string(), amount: order.tax });
        }

        let local_order = LocalOrder {
            customer_id: customer_local_id.clone(),
            currency: order.currency.clone().unwrap_or_else(|| settings.currency.clone()),
            price_list: settings.default_price_list.clone(),
            lines,
            taxes,
        };
        let total = local_order.total();
        let local_order_id =
            self.local.create_order(&local_order, WriteOrigin::RemoteSync).await?;
        Ok(CreatedOrder { local_order_id, customer_local_id, total })
    }

    /// Map a remote line item to a local order line, auto-creating the item
    /// and its mapping when policy allows. `Ok(None)` means the line is
    /// skipped item-level; the order is still created from the rest.
    async fn resolve_line(
        &self,
        item: &RemoteLineItem,
        settings: &BridgeSettings,
    ) -> Result<Option<LocalOrderLine>> {
        let item_code = match &item.product_id {
            Some(product_id) => {
                match self.product_mappings.get_by_remote_id(product_id).await? {
                    Some(mapping) => mapping.item_code,
                    None => {
                        if !settings.auto_create_items {
                            return Ok(None);
                        }
                        self.auto_create_item(item, product_id, settings).await?
                    }
                }
            }
            // No catalog reference at all: a custom line we can only place
            // by SKU.
            None => match &item.sku {
                Some(sku) if self.local.get_item(sku).await?.is_some() => sku.clone(),
                _ => return Ok(None),
            },
        };

        Ok(Some(LocalOrderLine {
            item_code,
            quantity: item.quantity,
            rate: item.price,
            warehouse: settings.default_warehouse.clone(),
            description: if item.name.is_empty() { None } else { Some(item.name.clone()) },
        }))
    }

    async fn auto_create_item(
        &self,
        item: &RemoteLineItem,
        product_id: &str,
        settings: &BridgeSettings,
    ) -> Result<String> {
        let placeholder = storebridge_domain::RemoteProduct {
            id: product_id.to_string(),
            name: item.name.clone(),
            description: None,
            sku: item.sku.clone(),
            price: item.price,
            currency: None,
            track_inventory: false,
            stock_quantity: 0.0,
            variants: Vec::new(),
        };
        let item_code = item_code_for(&placeholder);

        // Two remote products can share a SKU; the first one through owns
        // the mapping. Reuse its item for the line rather than inserting a
        // second mapping under the same item code.
        if self.product_mappings.get_by_item_code(&item_code).await?.is_some() {
            warn!(
                item_code = %item_code,
                remote_product_id = %product_id,
                "item already mapped to a different product; reusing it"
            );
            return Ok(item_code);
        }

        if self.local.get_item(&item_code).await?.is_none() {
            let local_item = LocalItem {
                item_code: item_code.clone(),
                name: if item.name.is_empty() { item_code.clone() } else { item.name.clone() },
                description: None,
                disabled: false,
                is_sales_item: true,
            };
            self.local.upsert_item(&local_item, WriteOrigin::RemoteSync).await?;
            self.local
                .set_price(
                    &item_code,
                    settings.default_price_list.as_deref(),
                    item.price,
                    WriteOrigin::RemoteSync,
                )
                .await?;
        }

        let mut mapping = ProductMapping::new(&item_code, product_id, unix_now());
        mapping.local_price = item.price;
        mapping.remote_price = item.price;
        mapping.mark_synced(unix_now());
        self.product_mappings.insert(&mapping).await?;
        Ok(item_code)
    }

    async fn ensure_shipping_item(&self) -> Result<()> {
        if self.local.get_item(SHIPPING_ITEM_CODE).await?.is_none() {
            let item = LocalItem {
                item_code: SHIPPING_ITEM_CODE.to_string(),
                name: "Shipping charges".to_string(),
                description: None,
                disabled: false,
                is_sales_item: true,
            };
            self.local.upsert_item(&item, WriteOrigin::RemoteSync).await?;
        }
        Ok(())
    }
}

/// Local fulfillment status → remote fulfillment status. Unknown statuses
/// are not pushed.
pub(crate) fn map_fulfillment_status(local_status: &str) -> Option<&'static str> {
    match local_status.to_ascii_lowercase().as_str() {
        "draft" => Some("pending"),
        "processing" => Some("processing"),
        "delivered" => Some("fulfilled"),
        "cancelled" => Some("cancelled"),
        _ => None,
    }
}
