//! Webhook event mapping and dispatch.
//!
//! Inbound events on a `Bidirectional` mapping always win over local state
//! (documented last-write-wins: the platform's copy is applied, never
//! merged). Divergence detected while a record is `Synced` surfaces as
//! `Conflict` through validation instead.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use storebridge_domain::constants::DEFAULT_REORDER_LEVEL;
use storebridge_domain::{
    BridgeError, RemoteCustomer, RemoteOrder, RemoteProduct, Result, SyncKind, SyncStatus,
};

use crate::hooks::WriteOrigin;
use crate::sync::ports::{
    LocalStore, Notifier, ProductMappingRepository, SettingsProvider,
};
use crate::sync::{unix_now, CustomerSyncService, OrderSyncService, ProductSyncService};

/// A recognized webhook event, with the entity payload it carried.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    OrderCreated(Value),
    OrderUpdated(Value),
    ProductCreated(Value),
    ProductUpdated(Value),
    ProductDeleted(Value),
    CustomerCreated(Value),
    CustomerUpdated(Value),
    InventoryUpdated(Value),
    Unknown(String),
}

impl WebhookEvent {
    /// Map an envelope `{eventType, data}` to an event. Unrecognized types
    /// become `Unknown` and are acknowledged without processing, so the
    /// platform does not redeliver them.
    pub fn from_envelope(envelope: &Value) -> Self {
        let event_type = envelope
            .get("eventType")
            .or_else(|| envelope.get("event_type"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let data = envelope.get("data").cloned().unwrap_or(Value::Null);

        match event_type {
            "orders/created" => Self::OrderCreated(data),
            "orders/updated" => Self::OrderUpdated(data),
            "products/created" => Self::ProductCreated(data),
            "products/updated" => Self::ProductUpdated(data),
            "products/deleted" => Self::ProductDeleted(data),
            "customers/created" => Self::CustomerCreated(data),
            "customers/updated" => Self::CustomerUpdated(data),
            "inventory/updated" => Self::InventoryUpdated(data),
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was processed.
    Handled,
    /// The event was acknowledged but intentionally not processed.
    Ignored(String),
}

/// Routes webhook events to the sync services, honoring settings gates and
/// per-mapping sync directions.
pub struct EventDispatcher {
    products: Arc<ProductSyncService>,
    customers: Arc<CustomerSyncService>,
    orders: Arc<OrderSyncService>,
    product_mappings: Arc<dyn ProductMappingRepository>,
    local: Arc<dyn LocalStore>,
    settings: Arc<dyn SettingsProvider>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl EventDispatcher {
    pub fn new(
        products: Arc<ProductSyncService>,
        customers: Arc<CustomerSyncService>,
        orders: Arc<OrderSyncService>,
        product_mappings: Arc<dyn ProductMappingRepository>,
        local: Arc<dyn LocalStore>,
        settings: Arc<dyn SettingsProvider>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self { products, customers, orders, product_mappings, local, settings, notifier }
    }

    /// Dispatch one event. Policy skips come back as `Ignored`; processing
    /// failures come back as `Err` so the ingest layer can signal the
    /// platform to redeliver.
    pub async fn dispatch(&self, event: WebhookEvent) -> Result<DispatchOutcome> {
        match event {
            WebhookEvent::Unknown(event_type) => {
                debug!(event_type, "unrecognized webhook event acknowledged");
                Ok(DispatchOutcome::Ignored(format!("unrecognized event {event_type}")))
            }
            WebhookEvent::ProductCreated(data) | WebhookEvent::ProductUpdated(data) => {
                if !self.kind_enabled(SyncKind::Products).await? {
                    return Ok(DispatchOutcome::Ignored("product sync disabled".into()));
                }
                let product = RemoteProduct::from_payload(&data)?;
                self.outcome(self.products.apply_remote(&product).await?)
            }
            WebhookEvent::ProductDeleted(data) => {
                if !self.kind_enabled(SyncKind::Products).await? {
                    return Ok(DispatchOutcome::Ignored("product sync disabled".into()));
                }
                let product_id = entity_id(&data, "product")?;
                self.outcome(self.products.handle_remote_delete(&product_id).await?)
            }
            WebhookEvent::CustomerCreated(data) | WebhookEvent::CustomerUpdated(data) => {
                if !self.kind_enabled(SyncKind::Customers).await? {
                    return Ok(DispatchOutcome::Ignored("customer sync disabled".into()));
                }
                let customer = RemoteCustomer::from_payload(&data)?;
                self.outcome(self.customers.apply_remote(&customer).await?)
            }
            WebhookEvent::OrderCreated(data) => {
                if !self.kind_enabled(SyncKind::Orders).await? {
                    return Ok(DispatchOutcome::Ignored("order sync disabled".into()));
                }
                let order = self.resolve_order(&data).await?;
                let log = self.orders.ingest(&order, &data).await?;
                if log.sync_status == SyncStatus::Error {
                    // Surface the failure so the platform redelivers; the
                    // log already holds the attempt.
                    return Err(BridgeError::Internal(
                        log.error_log.unwrap_or_else(|| "order ingestion failed".to_string()),
                    ));
                }
                Ok(DispatchOutcome::Handled)
            }
            WebhookEvent::OrderUpdated(data) => {
                if !self.kind_enabled(SyncKind::Orders).await? {
                    return Ok(DispatchOutcome::Ignored("order sync disabled".into()));
                }
                let order = self.resolve_order(&data).await?;
                match self.orders.update_from_webhook(&order).await? {
                    Some(_) => Ok(DispatchOutcome::Handled),
                    // An update for an order we never saw: treat as create.
                    None => {
                        let log = self.orders.ingest(&order, &data).await?;
                        if log.sync_status == SyncStatus::Error {
                            return Err(BridgeError::Internal(
                                log.error_log
                                    .unwrap_or_else(|| "order ingestion failed".to_string()),
                            ));
                        }
                        Ok(DispatchOutcome::Handled)
                    }
                }
            }
            WebhookEvent::InventoryUpdated(data) => {
                if !self.kind_enabled(SyncKind::Inventory).await? {
                    return Ok(DispatchOutcome::Ignored("inventory sync disabled".into()));
                }
                self.apply_inventory(&data).await
            }
        }
    }

    /// Order webhooks sometimes deliver only the entity id; fetch the full
    /// order in that case.
    async fn resolve_order(&self, data: &Value) -> Result<RemoteOrder> {
        if let Ok(order) = RemoteOrder::from_payload(data) {
            if !order.line_items.is_empty() || order.total > 0.0 {
                return Ok(order);
            }
            if let Some(full) = self.orders_gateway_fetch(&order.id).await? {
                return Ok(full);
            }
            return Ok(order);
        }
        let order_id = entity_id(data, "order")?;
        self.orders_gateway_fetch(&order_id)
            .await?
            .ok_or_else(|| BridgeError::NotFound(format!("order {order_id}")))
    }

    async fn orders_gateway_fetch(&self, order_id: &str) -> Result<Option<RemoteOrder>> {
        self.orders.gateway().get_order(order_id).await
    }

    async fn apply_inventory(&self, data: &Value) -> Result<DispatchOutcome> {
        let body = data.get("inventoryItem").unwrap_or(data);
        let product_id = body
            .get("productId")
            .or_else(|| body.get("externalId"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BridgeError::InvalidInput("inventory payload missing product id".to_string())
            })?;
        let quantity = body
            .get("quantity")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                BridgeError::InvalidInput("inventory payload missing quantity".to_string())
            })?;

        let Some(mut mapping) = self.product_mappings.get_by_remote_id(product_id).await? else {
            return Ok(DispatchOutcome::Ignored("product not mapped".into()));
        };
        if !mapping.sync_direction.allows_pull() {
            return Ok(DispatchOutcome::Ignored("direction excludes remote-to-local".into()));
        }

        let settings = self.settings.settings().await?;
        self.local
            .set_stock(
                &mapping.item_code,
                settings.default_warehouse.as_deref(),
                quantity,
                WriteOrigin::RemoteSync,
            )
            .await?;

        mapping.local_stock_qty = quantity;
        mapping.remote_stock_qty = quantity;
        mapping.last_sync_time = Some(unix_now());
        mapping.refresh_differences();
        mapping.updated_at = unix_now();
        self.product_mappings.update(&mapping).await?;
        info!(item_code = %mapping.item_code, quantity, "inventory applied from remote");

        if quantity <= DEFAULT_REORDER_LEVEL {
            self.send_low_stock_alert(&mapping.item_code, quantity, &settings).await;
        }
        Ok(DispatchOutcome::Handled)
    }

    async fn send_low_stock_alert(
        &self,
        item_code: &str,
        quantity: f64,
        settings: &storebridge_domain::BridgeSettings,
    ) {
        let Some(notifier) = &self.notifier else { return };
        if settings.alert_recipients.is_empty() {
            return;
        }
        let subject = format!("Low stock: {item_code}");
        let body = format!("Item {item_code} is down to {quantity} after a storefront sale.");
        if let Err(err) = notifier.send(&settings.alert_recipients, &subject, &body).await {
            warn!(item_code, error = %err, "low stock alert failed");
        }
    }

    fn outcome(&self, sync: crate::sync::SyncOutcome) -> Result<DispatchOutcome> {
        Ok(match sync {
            crate::sync::SyncOutcome::Synced => DispatchOutcome::Handled,
            crate::sync::SyncOutcome::Skipped(reason) => DispatchOutcome::Ignored(reason),
        })
    }

    async fn kind_enabled(&self, kind: SyncKind) -> Result<bool> {
        Ok(self.settings.settings().await?.kind_enabled(kind))
    }
}

/// Extract an entity id from a deleted/thin payload: top-level `entityId`,
/// or the entity's own `id` (nested or flat).
fn entity_id(data: &Value, entity: &str) -> Result<String> {
    data.get("entityId")
        .or_else(|| data.get(entity).and_then(|e| e.get("id")))
        .or_else(|| data.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BridgeError::InvalidInput(format!("{entity} event missing entity id")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storebridge_domain::SyncDirection;

    use super::*;
    use crate::testing::TestHarness;

    #[tokio::test]
    async fn unknown_event_is_acknowledged_not_processed() {
        let harness = TestHarness::new();
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "refunds/created",
            "data": {"id": "r1"}
        }));
        let outcome = dispatcher.dispatch(event).await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Ignored(_)));
        assert!(harness.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn product_event_applies_remote_state() {
        let harness = TestHarness::new();
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "products/updated",
            "data": {"product": {"id": "prod-1", "name": "Widget", "sku": "SKU1",
                     "priceData": {"price": 12.0},
                     "stock": {"trackInventory": true, "quantity": 3}}}
        }));
        let outcome = dispatcher.dispatch(event).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert!((harness.local.price("SKU1").await.unwrap() - 12.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn disabled_kind_ignores_event() {
        let harness = TestHarness::new();
        harness.settings.set_sync_products(false).await;
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "products/created",
            "data": {"product": {"id": "prod-1", "name": "Widget"}}
        }));
        let outcome = dispatcher.dispatch(event).await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Ignored(_)));
        assert!(harness.local.item("prod-1").await.is_none());
    }

    #[tokio::test]
    async fn push_only_direction_suppresses_inbound_inventory() {
        let harness = TestHarness::new();
        harness.seed_item("ITEM-1", 10.0, 5.0).await;
        harness.seed_mapping("ITEM-1", "prod-1", SyncDirection::LocalToRemote).await;
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "inventory/updated",
            "data": {"productId": "prod-1", "quantity": 99.0}
        }));
        let outcome = dispatcher.dispatch(event).await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Ignored(_)));
        assert!((harness.local.stock("ITEM-1").await - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn inventory_event_updates_local_stock_with_sync_origin() {
        let harness = TestHarness::new();
        harness.seed_item("ITEM-1", 10.0, 5.0).await;
        harness.seed_synced_mapping("ITEM-1", "prod-1", 10.0, 5.0).await;
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "inventory/updated",
            "data": {"inventoryItem": {"productId": "prod-1", "quantity": 2.0}}
        }));
        dispatcher.dispatch(event).await.unwrap();

        assert!((harness.local.stock("ITEM-1").await - 2.0).abs() < f64::EPSILON);
        assert!(
            harness.local.all_writes_sync_origin().await,
            "inbound apply must carry the sync origin"
        );
    }

    #[tokio::test]
    async fn low_stock_triggers_alert() {
        let harness = TestHarness::new();
        harness.settings.set_alert_recipients(vec!["ops@x.com".to_string()]).await;
        harness.seed_item("ITEM-1", 10.0, 50.0).await;
        harness.seed_synced_mapping("ITEM-1", "prod-1", 10.0, 50.0).await;
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "inventory/updated",
            "data": {"productId": "prod-1", "quantity": 1.0}
        }));
        dispatcher.dispatch(event).await.unwrap();

        let sent = harness.notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("ITEM-1"));
    }

    #[tokio::test]
    async fn order_created_event_ingests_order() {
        let harness = TestHarness::new();
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "orders/created",
            "data": {"order": {
                "id": "W1",
                "buyerInfo": {"contactId": "c1", "email": "a@x.com"},
                "lineItems": [{"productId": "prod-1", "sku": "SKU1", "name": "Widget",
                               "quantity": 2, "price": 10.0}],
                "totals": {"total": 20.0, "shipping": 0, "tax": 0}
            }}
        }));
        let outcome = dispatcher.dispatch(event).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(harness.local.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn order_processing_failure_propagates_for_redelivery() {
        let harness = TestHarness::new();
        harness.settings.set_auto_create_customers(false).await;
        let dispatcher = harness.dispatcher();

        let event = WebhookEvent::from_envelope(&json!({
            "eventType": "orders/created",
            "data": {"order": {
                "id": "W2",
                "buyerInfo": {"email": "nobody@x.com"},
                "lineItems": [{"productId": "prod-1", "sku": "SKU1", "name": "Widget",
                               "quantity": 1, "price": 10.0}],
                "totals": {"total": 10.0, "shipping": 0, "tax": 0}
            }}
        }));
        let err = dispatcher.dispatch(event).await.unwrap_err();
        assert!(matches!(err, BridgeError::Internal(_)));
    }

    #[test]
    fn envelope_parses_known_and_unknown_types() {
        let known = WebhookEvent::from_envelope(&json!({
            "eventType": "products/deleted", "data": {"entityId": "p1"}
        }));
        assert!(matches!(known, WebhookEvent::ProductDeleted(_)));

        let unknown = WebhookEvent::from_envelope(&json!({"eventType": "carts/abandoned"}));
        assert!(matches!(unknown, WebhookEvent::Unknown(t) if t == "carts/abandoned"));
    }
}
