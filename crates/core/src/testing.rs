//! Shared test fixtures: in-memory port implementations and a harness
//! wiring them into the services under test.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use storebridge_domain::{
    BridgeError, BridgeSettings, CustomerMapping, LocalCustomer, LocalItem, LocalOrder,
    OrderSyncLog, ProductMapping, RemoteCustomer, RemoteOrder, RemoteProduct, Result,
    SyncDirection, SyncStatus,
};

use crate::hooks::{ChangeHooks, WriteOrigin};
use crate::jobs::SyncJobs;
use crate::sync::ports::{
    CustomerMappingRepository, LocalStore, Notifier, OrderSyncLogRepository,
    ProductMappingRepository, RemoteGateway, SettingsProvider,
};
use crate::sync::dispatch::EventDispatcher;
use crate::sync::{CustomerSyncService, OrderSyncService, ProductSyncService};

const NOW: i64 = 1_700_000_000;

/// A canonical remote product for tests.
pub fn sample_remote_product(
    id: &str,
    sku: Option<&str>,
    price: f64,
    stock: f64,
) -> RemoteProduct {
    RemoteProduct {
        id: id.to_string(),
        name: "Widget".to_string(),
        description: None,
        sku: sku.map(str::to_string),
        price,
        currency: Some("USD".to_string()),
        track_inventory: true,
        stock_quantity: stock,
        variants: Vec::new(),
    }
}

#[derive(Clone, Copy)]
enum FailKind {
    Remote,
    Network,
}

impl FailKind {
    fn to_error(self) -> BridgeError {
        match self {
            Self::Remote => BridgeError::Remote { status: 400, body: "invalid product".to_string() },
            Self::Network => BridgeError::Network("connection reset".to_string()),
        }
    }
}

/// Scripted gateway double: records every call, serves seeded entities, and
/// fails on demand per remote id.
#[derive(Default)]
pub struct MockGateway {
    products: Mutex<BTreeMap<String, RemoteProduct>>,
    orders: Mutex<HashMap<String, RemoteOrder>>,
    customers: Mutex<HashMap<String, RemoteCustomer>>,
    inventory: Mutex<HashMap<String, f64>>,
    failures: Mutex<HashMap<String, FailKind>>,
    calls: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MockGateway {
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn seed_product(&self, product: RemoteProduct) {
        self.products.lock().await.insert(product.id.clone(), product);
    }

    pub async fn seed_order(&self, order: RemoteOrder) {
        self.orders.lock().await.insert(order.id.clone(), order);
    }

    pub async fn fail_with_remote_error(&self, id: &str) {
        self.failures.lock().await.insert(id.to_string(), FailKind::Remote);
    }

    pub async fn fail_with_network_error(&self, id: &str) {
        self.failures.lock().await.insert(id.to_string(), FailKind::Network);
    }

    pub async fn last_inventory_quantity(&self, product_id: &str) -> Option<f64> {
        self.inventory.lock().await.get(product_id).copied()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }

    async fn check_failure(&self, id: &str) -> Result<()> {
        match self.failures.lock().await.get(id) {
            Some(kind) => Err(kind.to_error()),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn query_products(&self, limit: usize, offset: usize) -> Result<Vec<RemoteProduct>> {
        self.record(format!("query_products:{limit}:{offset}")).await;
        let products = self.products.lock().await;
        Ok(products.values().skip(offset).take(limit).cloned().collect())
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<RemoteProduct>> {
        self.record(format!("get_product:{product_id}")).await;
        self.check_failure(product_id).await?;
        Ok(self.products.lock().await.get(product_id).cloned())
    }

    async fn create_product(&self, item: &LocalItem, price: f64) -> Result<RemoteProduct> {
        self.check_failure(&item.item_code).await?;
        let product = RemoteProduct {
            id: self.next_id("prod-gen"),
            name: item.name.clone(),
            description: item.description.clone(),
            sku: Some(item.item_code.clone()),
            price,
            currency: Some("USD".to_string()),
            track_inventory: true,
            stock_quantity: 0.0,
            variants: Vec::new(),
        };
        self.record(format!("create_product:{}", item.item_code)).await;
        self.products.lock().await.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, product_id: &str, item: &LocalItem, price: f64) -> Result<()> {
        self.record(format!("update_product:{product_id}")).await;
        self.check_failure(product_id).await?;
        if let Some(product) = self.products.lock().await.get_mut(product_id) {
            product.name = item.name.clone();
            product.price = price;
        }
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> Result<()> {
        self.record(format!("delete_product:{product_id}")).await;
        self.check_failure(product_id).await?;
        self.products.lock().await.remove(product_id);
        Ok(())
    }

    async fn update_inventory(
        &self,
        product_id: &str,
        _variant_id: Option<&str>,
        quantity: f64,
    ) -> Result<()> {
        self.record(format!("update_inventory:{product_id}")).await;
        self.check_failure(product_id).await?;
        self.inventory.lock().await.insert(product_id.to_string(), quantity);
        Ok(())
    }

    async fn query_orders(&self, limit: usize, offset: usize) -> Result<Vec<RemoteOrder>> {
        self.record(format!("query_orders:{limit}:{offset}")).await;
        let orders = self.orders.lock().await;
        let mut page: Vec<RemoteOrder> = orders.values().cloned().collect();
        page.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(page.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<RemoteOrder>> {
        self.record(format!("get_order:{order_id}")).await;
        self.check_failure(order_id).await?;
        Ok(self.orders.lock().await.get(order_id).cloned())
    }

    async fn create_fulfillment(
        &self,
        order_id: &str,
        status: &str,
        tracking_number: Option<&str>,
        _carrier: Option<&str>,
    ) -> Result<()> {
        self.record(format!(
            "create_fulfillment:{order_id}:{status}:{}",
            tracking_number.unwrap_or("")
        ))
        .await;
        self.check_failure(order_id).await
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        self.record(format!("cancel_order:{order_id}")).await;
        self.check_failure(order_id).await
    }

    async fn query_customers(&self, limit: usize, offset: usize) -> Result<Vec<RemoteCustomer>> {
        self.record(format!("query_customers:{limit}:{offset}")).await;
        let customers = self.customers.lock().await;
        let mut page: Vec<RemoteCustomer> = customers.values().cloned().collect();
        page.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(page.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<RemoteCustomer>> {
        self.record(format!("get_customer:{customer_id}")).await;
        self.check_failure(customer_id).await?;
        Ok(self.customers.lock().await.get(customer_id).cloned())
    }

    async fn create_customer(&self, customer: &LocalCustomer) -> Result<RemoteCustomer> {
        let created = RemoteCustomer {
            id: self.next_id("contact-gen"),
            first_name: None,
            last_name: None,
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        };
        self.record(format!("create_customer:{}", customer.name)).await;
        self.customers.lock().await.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_customer(&self, customer_id: &str, _customer: &LocalCustomer) -> Result<()> {
        self.record(format!("update_customer:{customer_id}")).await;
        self.check_failure(customer_id).await
    }
}

#[derive(Default)]
struct LocalState {
    items: HashMap<String, LocalItem>,
    prices: HashMap<String, f64>,
    stocks: HashMap<String, f64>,
    customers: HashMap<String, LocalCustomer>,
    orders: Vec<LocalOrder>,
    origins: Vec<WriteOrigin>,
    next_id: usize,
}

/// In-memory ERP double that records the origin of every write.
#[derive(Default)]
pub struct MockLocalStore {
    state: Mutex<LocalState>,
}

impl MockLocalStore {
    pub async fn item(&self, item_code: &str) -> Option<LocalItem> {
        self.state.lock().await.items.get(item_code).cloned()
    }

    pub async fn price(&self, item_code: &str) -> Option<f64> {
        self.state.lock().await.prices.get(item_code).copied()
    }

    pub async fn stock(&self, item_code: &str) -> f64 {
        self.state.lock().await.stocks.get(item_code).copied().unwrap_or(0.0)
    }

    pub async fn customer(&self, id: &str) -> Option<LocalCustomer> {
        self.state.lock().await.customers.get(id).cloned()
    }

    pub async fn customer_count(&self) -> usize {
        self.state.lock().await.customers.len()
    }

    pub async fn orders(&self) -> Vec<LocalOrder> {
        self.state.lock().await.orders.clone()
    }

    pub async fn all_writes_sync_origin(&self) -> bool {
        self.state.lock().await.origins.iter().all(|o| *o == WriteOrigin::RemoteSync)
    }

    async fn seed_item(&self, item_code: &str, price: f64, stock: f64) {
        let mut state = self.state.lock().await;
        state.items.insert(
            item_code.to_string(),
            LocalItem {
                item_code: item_code.to_string(),
                name: item_code.to_string(),
                description: None,
                disabled: false,
                is_sales_item: true,
            },
        );
        state.prices.insert(item_code.to_string(), price);
        state.stocks.insert(item_code.to_string(), stock);
    }

    async fn seed_customer(&self, name: &str, email: Option<&str>) -> String {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = format!("CUST-{}", state.next_id);
        state.customers.insert(
            id.clone(),
            LocalCustomer {
                id: id.clone(),
                name: name.to_string(),
                email: email.map(str::to_string),
                phone: None,
                customer_group: None,
                territory: None,
            },
        );
        id
    }
}

#[async_trait]
impl LocalStore for MockLocalStore {
    async fn get_item(&self, item_code: &str) -> Result<Option<LocalItem>> {
        Ok(self.state.lock().await.items.get(item_code).cloned())
    }

    async fn upsert_item(&self, item: &LocalItem, origin: WriteOrigin) -> Result<()> {
        let mut state = self.state.lock().await;
        state.origins.push(origin);
        state.items.insert(item.item_code.clone(), item.clone());
        Ok(())
    }

    async fn disable_item(&self, item_code: &str, origin: WriteOrigin) -> Result<()> {
        let mut state = self.state.lock().await;
        state.origins.push(origin);
        match state.items.get_mut(item_code) {
            Some(item) => {
                item.disabled = true;
                Ok(())
            }
            None => Err(BridgeError::NotFound(format!("item {item_code}"))),
        }
    }

    async fn get_price(&self, item_code: &str, _price_list: Option<&str>) -> Result<Option<f64>> {
        Ok(self.state.lock().await.prices.get(item_code).copied())
    }

    async fn set_price(
        &self,
        item_code: &str,
        _price_list: Option<&str>,
        price: f64,
        origin: WriteOrigin,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.origins.push(origin);
        state.prices.insert(item_code.to_string(), price);
        Ok(())
    }

    async fn get_stock(&self, item_code: &str, _warehouse: Option<&str>) -> Result<f64> {
        Ok(self.state.lock().await.stocks.get(item_code).copied().unwrap_or(0.0))
    }

    async fn set_stock(
        &self,
        item_code: &str,
        _warehouse: Option<&str>,
        quantity: f64,
        origin: WriteOrigin,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.origins.push(origin);
        state.stocks.insert(item_code.to_string(), quantity);
        Ok(())
    }

    async fn get_customer(&self, id: &str) -> Result<Option<LocalCustomer>> {
        Ok(self.state.lock().await.customers.get(id).cloned())
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<LocalCustomer>> {
        Ok(self
            .state
            .lock()
            .await
            .customers
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create_customer(
        &self,
        customer: &LocalCustomer,
        origin: WriteOrigin,
    ) -> Result<String> {
        let mut state = self.state.lock().await;
        state.origins.push(origin);
        state.next_id += 1;
        let id = format!("CUST-{}", state.next_id);
        let mut created = customer.clone();
        created.id = id.clone();
        state.customers.insert(id.clone(), created);
        Ok(id)
    }

    async fn update_customer(&self, customer: &LocalCustomer, origin: WriteOrigin) -> Result<()> {
        let mut state = self.state.lock().await;
        state.origins.push(origin);
        state.customers.insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn create_order(&self, order: &LocalOrder, origin: WriteOrigin) -> Result<String> {
        let mut state = self.state.lock().await;
        state.origins.push(origin);
        state.next_id += 1;
        let id = format!("SO-{}", state.next_id);
        state.orders.push(order.clone());
        Ok(id)
    }

    async fn list_sales_items(&self) -> Result<Vec<LocalItem>> {
        Ok(self
            .state
            .lock()
            .await
            .items
            .values()
            .filter(|i| i.is_sales_item && !i.disabled)
            .cloned()
            .collect())
    }
}

/// Mutable settings double.
pub struct MockSettings {
    inner: Mutex<BridgeSettings>,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self { inner: Mutex::new(BridgeSettings::default()) }
    }
}

impl MockSettings {
    pub async fn set_enabled(&self, enabled: bool) {
        self.inner.lock().await.enabled = enabled;
    }

    pub async fn set_sync_products(&self, on: bool) {
        self.inner.lock().await.sync_products = on;
    }

    pub async fn set_auto_create_items(&self, on: bool) {
        self.inner.lock().await.auto_create_items = on;
    }

    pub async fn set_auto_create_customers(&self, on: bool) {
        self.inner.lock().await.auto_create_customers = on;
    }

    pub async fn set_customer_defaults(&self, group: Option<&str>, territory: Option<&str>) {
        let mut settings = self.inner.lock().await;
        settings.default_customer_group = group.map(str::to_string);
        settings.default_territory = territory.map(str::to_string);
    }

    pub async fn set_alert_recipients(&self, recipients: Vec<String>) {
        self.inner.lock().await.alert_recipients = recipients;
    }
}

#[async_trait]
impl SettingsProvider for MockSettings {
    async fn settings(&self) -> Result<BridgeSettings> {
        Ok(self.inner.lock().await.clone())
    }
}

/// Captures outbound notifications as (recipients, subject, body).
#[derive(Default)]
pub struct MockNotifier {
    messages: Mutex<Vec<(Vec<String>, String, String)>>,
}

impl MockNotifier {
    pub async fn sent(&self) -> Vec<(Vec<String>, String, String)> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        self.messages.lock().await.push((
            recipients.to_vec(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

fn counts_by_status<'a, I>(statuses: I) -> Vec<(SyncStatus, i64)>
where
    I: Iterator<Item = &'a SyncStatus>,
{
    let mut counts: Vec<(SyncStatus, i64)> = Vec::new();
    for status in statuses {
        match counts.iter_mut().find(|(s, _)| s == status) {
            Some((_, n)) => *n += 1,
            None => counts.push((*status, 1)),
        }
    }
    counts
}

#[derive(Default)]
pub struct InMemoryProductMappings {
    rows: Mutex<HashMap<String, ProductMapping>>,
}

#[async_trait]
impl ProductMappingRepository for InMemoryProductMappings {
    async fn insert(&self, mapping: &ProductMapping) -> Result<()> {
        self.rows.lock().await.insert(mapping.item_code.clone(), mapping.clone());
        Ok(())
    }

    async fn update(&self, mapping: &ProductMapping) -> Result<()> {
        self.rows.lock().await.insert(mapping.item_code.clone(), mapping.clone());
        Ok(())
    }

    async fn delete(&self, item_code: &str) -> Result<()> {
        self.rows.lock().await.remove(item_code);
        Ok(())
    }

    async fn get_by_item_code(&self, item_code: &str) -> Result<Option<ProductMapping>> {
        Ok(self.rows.lock().await.get(item_code).cloned())
    }

    async fn get_by_remote_id(&self, remote_product_id: &str) -> Result<Option<ProductMapping>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|m| m.remote_product_id == remote_product_id)
            .cloned())
    }

    async fn list_by_status(&self, statuses: &[SyncStatus]) -> Result<Vec<ProductMapping>> {
        let mut rows: Vec<ProductMapping> = self
            .rows
            .lock()
            .await
            .values()
            .filter(|m| statuses.contains(&m.sync_status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.item_code.cmp(&b.item_code));
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<ProductMapping>> {
        let mut rows: Vec<ProductMapping> = self.rows.lock().await.values().cloned().collect();
        rows.sort_by(|a, b| a.item_code.cmp(&b.item_code));
        Ok(rows)
    }

    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        Ok(counts_by_status(self.rows.lock().await.values().map(|m| &m.sync_status)))
    }
}

#[derive(Default)]
pub struct InMemoryCustomerMappings {
    rows: Mutex<HashMap<String, CustomerMapping>>,
}

#[async_trait]
impl CustomerMappingRepository for InMemoryCustomerMappings {
    async fn insert(&self, mapping: &CustomerMapping) -> Result<()> {
        self.rows.lock().await.insert(mapping.local_id.clone(), mapping.clone());
        Ok(())
    }

    async fn update(&self, mapping: &CustomerMapping) -> Result<()> {
        self.rows.lock().await.insert(mapping.local_id.clone(), mapping.clone());
        Ok(())
    }

    async fn delete(&self, local_id: &str) -> Result<()> {
        self.rows.lock().await.remove(local_id);
        Ok(())
    }

    async fn get_by_local_id(&self, local_id: &str) -> Result<Option<CustomerMapping>> {
        Ok(self.rows.lock().await.get(local_id).cloned())
    }

    async fn get_by_remote_id(
        &self,
        remote_customer_id: &str,
    ) -> Result<Option<CustomerMapping>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|m| m.remote_customer_id == remote_customer_id)
            .cloned())
    }

    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        Ok(counts_by_status(self.rows.lock().await.values().map(|m| &m.sync_status)))
    }
}

#[derive(Default)]
pub struct InMemoryOrderLogs {
    rows: Mutex<HashMap<String, OrderSyncLog>>,
}

#[async_trait]
impl OrderSyncLogRepository for InMemoryOrderLogs {
    async fn insert(&self, log: &OrderSyncLog) -> Result<()> {
        self.rows.lock().await.insert(log.remote_order_id.clone(), log.clone());
        Ok(())
    }

    async fn update(&self, log: &OrderSyncLog) -> Result<()> {
        self.rows.lock().await.insert(log.remote_order_id.clone(), log.clone());
        Ok(())
    }

    async fn get_by_remote_order_id(&self, remote_order_id: &str) -> Result<Option<OrderSyncLog>> {
        Ok(self.rows.lock().await.get(remote_order_id).cloned())
    }

    async fn get_by_local_order_id(&self, local_order_id: &str) -> Result<Option<OrderSyncLog>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|l| l.local_order_id.as_deref() == Some(local_order_id))
            .cloned())
    }

    async fn list_retryable(&self, max_retries: i64) -> Result<Vec<OrderSyncLog>> {
        let mut rows: Vec<OrderSyncLog> = self
            .rows
            .lock()
            .await
            .values()
            .filter(|l| l.local_order_id.is_none() && l.retry_count < max_retries)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.remote_order_id.cmp(&b.remote_order_id));
        Ok(rows)
    }

    async fn delete_older_than(&self, cutoff: i64, statuses: &[SyncStatus]) -> Result<usize> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|_, l| l.created_at >= cutoff || !statuses.contains(&l.sync_status));
        Ok(before - rows.len())
    }

    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        Ok(counts_by_status(self.rows.lock().await.values().map(|l| &l.sync_status)))
    }
}

/// One fully wired engine over the in-memory doubles.
pub struct TestHarness {
    pub gateway: Arc<MockGateway>,
    pub local: Arc<MockLocalStore>,
    pub settings: Arc<MockSettings>,
    pub notifier: Arc<MockNotifier>,
    pub product_mappings: Arc<dyn ProductMappingRepository>,
    pub customer_mappings: Arc<dyn CustomerMappingRepository>,
    pub order_logs: Arc<dyn OrderSyncLogRepository>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            gateway: Arc::new(MockGateway::default()),
            local: Arc::new(MockLocalStore::default()),
            settings: Arc::new(MockSettings::default()),
            notifier: Arc::new(MockNotifier::default()),
            product_mappings: Arc::new(InMemoryProductMappings::default()),
            customer_mappings: Arc::new(InMemoryCustomerMappings::default()),
            order_logs: Arc::new(InMemoryOrderLogs::default()),
        }
    }

    pub async fn seed_item(&self, item_code: &str, price: f64, stock: f64) {
        self.local.seed_item(item_code, price, stock).await;
    }

    pub async fn seed_mapping(&self, item_code: &str, remote_id: &str, direction: SyncDirection) {
        let mut mapping = ProductMapping::new(item_code, remote_id, NOW);
        mapping.sync_direction = direction;
        self.product_mappings.insert(&mapping).await.unwrap();
    }

    pub async fn seed_synced_mapping(
        &self,
        item_code: &str,
        remote_id: &str,
        price: f64,
        stock: f64,
    ) {
        let mut mapping = ProductMapping::new(item_code, remote_id, NOW);
        mapping.local_price = price;
        mapping.remote_price = price;
        mapping.local_stock_qty = stock;
        mapping.remote_stock_qty = stock;
        mapping.mark_synced(NOW);
        self.product_mappings.insert(&mapping).await.unwrap();
    }

    pub async fn seed_customer(&self, name: &str, email: Option<&str>) -> String {
        self.local.seed_customer(name, email).await
    }

    pub async fn seed_customer_mapping(&self, local_id: &str, contact_id: &str) {
        let name = self
            .local
            .customer(local_id)
            .await
            .map(|c| c.name)
            .unwrap_or_else(|| local_id.to_string());
        let mut mapping = CustomerMapping::new(local_id, contact_id, &name, NOW);
        mapping.mark_synced(NOW);
        self.customer_mappings.insert(&mapping).await.unwrap();
    }

    pub fn products(&self) -> Arc<ProductSyncService> {
        Arc::new(ProductSyncService::new(
            self.product_mappings.clone(),
            self.gateway.clone(),
            self.local.clone(),
            self.settings.clone(),
        ))
    }

    pub fn customers(&self) -> Arc<CustomerSyncService> {
        Arc::new(CustomerSyncService::new(
            self.customer_mappings.clone(),
            self.gateway.clone(),
            self.local.clone(),
            self.settings.clone(),
        ))
    }

    pub fn orders(&self) -> Arc<OrderSyncService> {
        Arc::new(OrderSyncService::new(
            self.order_logs.clone(),
            self.product_mappings.clone(),
            self.gateway.clone(),
            self.local.clone(),
            self.customers(),
            self.settings.clone(),
        ))
    }

    pub fn change_hooks(&self) -> ChangeHooks {
        ChangeHooks::new(self.products(), self.customers(), self.orders(), self.settings.clone())
    }

    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher::new(
            self.products(),
            self.customers(),
            self.orders(),
            self.product_mappings.clone(),
            self.local.clone(),
            self.settings.clone(),
            Some(self.notifier.clone()),
        )
    }

    pub fn jobs(&self) -> SyncJobs {
        SyncJobs::new(
            self.products(),
            self.orders(),
            self.product_mappings.clone(),
            self.customer_mappings.clone(),
            self.order_logs.clone(),
            self.gateway.clone(),
            self.local.clone(),
            self.settings.clone(),
            Some(self.notifier.clone()),
        )
    }
}
