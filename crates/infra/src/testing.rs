//! Benign stub implementations of the core ports for infrastructure tests.
//!
//! Every method answers with an empty or successful default, so tests can
//! wire up real services and drive them over HTTP or the scheduler without a
//! database or remote platform behind them.

use std::sync::Arc;

use async_trait::async_trait;
use storebridge_core::{
    CustomerMappingRepository, CustomerSyncService, EventDispatcher, LocalStore, Notifier,
    OrderSyncLogRepository, OrderSyncService, ProductMappingRepository, ProductSyncService,
    RemoteGateway, SettingsProvider, SyncJobs, WriteOrigin,
};
use storebridge_domain::{
    BridgeSettings, CustomerMapping, LocalCustomer, LocalItem, LocalOrder, OrderSyncLog,
    ProductMapping, RemoteCustomer, RemoteOrder, RemoteProduct, Result, SyncStatus,
};

pub struct StubProductMappings;

#[async_trait]
impl ProductMappingRepository for StubProductMappings {
    async fn insert(&self, _mapping: &ProductMapping) -> Result<()> {
        Ok(())
    }
    async fn update(&self, _mapping: &ProductMapping) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _item_code: &str) -> Result<()> {
        Ok(())
    }
    async fn get_by_item_code(&self, _item_code: &str) -> Result<Option<ProductMapping>> {
        Ok(None)
    }
    async fn get_by_remote_id(&self, _remote_id: &str) -> Result<Option<ProductMapping>> {
        Ok(None)
    }
    async fn list_by_status(&self, _statuses: &[SyncStatus]) -> Result<Vec<ProductMapping>> {
        Ok(Vec::new())
    }
    async fn list_all(&self) -> Result<Vec<ProductMapping>> {
        Ok(Vec::new())
    }
    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        Ok(Vec::new())
    }
}

pub struct StubCustomerMappings;

#[async_trait]
impl CustomerMappingRepository for StubCustomerMappings {
    async fn insert(&self, _mapping: &CustomerMapping) -> Result<()> {
        Ok(())
    }
    async fn update(&self, _mapping: &CustomerMapping) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _local_id: &str) -> Result<()> {
        Ok(())
    }
    async fn get_by_local_id(&self, _local_id: &str) -> Result<Option<CustomerMapping>> {
        Ok(None)
    }
    async fn get_by_remote_id(&self, _remote_id: &str) -> Result<Option<CustomerMapping>> {
        Ok(None)
    }
    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        Ok(Vec::new())
    }
}

pub struct StubOrderLogs;

#[async_trait]
impl OrderSyncLogRepository for StubOrderLogs {
    async fn insert(&self, _log: &OrderSyncLog) -> Result<()> {
        Ok(())
    }
    async fn update(&self, _log: &OrderSyncLog) -> Result<()> {
        Ok(())
    }
    async fn get_by_remote_order_id(&self, _id: &str) -> Result<Option<OrderSyncLog>> {
        Ok(None)
    }
    async fn get_by_local_order_id(&self, _id: &str) -> Result<Option<OrderSyncLog>> {
        Ok(None)
    }
    async fn list_retryable(&self, _max_retries: i64) -> Result<Vec<OrderSyncLog>> {
        Ok(Vec::new())
    }
    async fn delete_older_than(&self, _cutoff: i64, _statuses: &[SyncStatus]) -> Result<usize> {
        Ok(0)
    }
    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        Ok(Vec::new())
    }
}

pub struct StubGateway;

#[async_trait]
impl RemoteGateway for StubGateway {
    async fn query_products(&self, _limit: usize, _offset: usize) -> Result<Vec<RemoteProduct>> {
        Ok(Vec::new())
    }
    async fn get_product(&self, _product_id: &str) -> Result<Option<RemoteProduct>> {
        Ok(None)
    }
    async fn create_product(&self, item: &LocalItem, price: f64) -> Result<RemoteProduct> {
        Ok(RemoteProduct {
            id: "prod-stub".to_string(),
            name: item.name.clone(),
            description: None,
            sku: Some(item.item_code.clone()),
            price,
            currency: None,
            track_inventory: false,
            stock_quantity: 0.0,
            variants: Vec::new(),
        })
    }
    async fn update_product(&self, _id: &str, _item: &LocalItem, _price: f64) -> Result<()> {
        Ok(())
    }
    async fn delete_product(&self, _id: &str) -> Result<()> {
        Ok(())
    }
    async fn update_inventory(&self, _id: &str, _vid: Option<&str>, _qty: f64) -> Result<()> {
        Ok(())
    }
    async fn query_orders(&self, _limit: usize, _offset: usize) -> Result<Vec<RemoteOrder>> {
        Ok(Vec::new())
    }
    async fn get_order(&self, _id: &str) -> Result<Option<RemoteOrder>> {
        Ok(None)
    }
    async fn create_fulfillment(
        &self,
        _id: &str,
        _status: &str,
        _tracking: Option<&str>,
        _carrier: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }
    async fn cancel_order(&self, _id: &str) -> Result<()> {
        Ok(())
    }
    async fn query_customers(&self, _limit: usize, _offset: usize) -> Result<Vec<RemoteCustomer>> {
        Ok(Vec::new())
    }
    async fn get_customer(&self, _id: &str) -> Result<Option<RemoteCustomer>> {
        Ok(None)
    }
    async fn create_customer(&self, customer: &LocalCustomer) -> Result<RemoteCustomer> {
        Ok(RemoteCustomer {
            id: "contact-stub".to_string(),
            first_name: None,
            last_name: None,
            email: customer.email.clone(),
            phone: None,
        })
    }
    async fn update_customer(&self, _id: &str, _customer: &LocalCustomer) -> Result<()> {
        Ok(())
    }
}

pub struct StubLocal;

#[async_trait]
impl LocalStore for StubLocal {
    async fn get_item(&self, _item_code: &str) -> Result<Option<LocalItem>> {
        Ok(None)
    }
    async fn upsert_item(&self, _item: &LocalItem, _origin: WriteOrigin) -> Result<()> {
        Ok(())
    }
    async fn disable_item(&self, _item_code: &str, _origin: WriteOrigin) -> Result<()> {
        Ok(())
    }
    async fn get_price(&self, _item: &str, _list: Option<&str>) -> Result<Option<f64>> {
        Ok(None)
    }
    async fn set_price(
        &self,
        _item: &str,
        _list: Option<&str>,
        _price: f64,
        _origin: WriteOrigin,
    ) -> Result<()> {
        Ok(())
    }
    async fn get_stock(&self, _item: &str, _warehouse: Option<&str>) -> Result<f64> {
        Ok(0.0)
    }
    async fn set_stock(
        &self,
        _item: &str,
        _warehouse: Option<&str>,
        _qty: f64,
        _origin: WriteOrigin,
    ) -> Result<()> {
        Ok(())
    }
    async fn get_customer(&self, _id: &str) -> Result<Option<LocalCustomer>> {
        Ok(None)
    }
    async fn find_customer_by_email(&self, _email: &str) -> Result<Option<LocalCustomer>> {
        Ok(None)
    }
    async fn create_customer(
        &self,
        _customer: &LocalCustomer,
        _origin: WriteOrigin,
    ) -> Result<String> {
        Ok("CUST-1".to_string())
    }
    async fn update_customer(&self, _customer: &LocalCustomer, _origin: WriteOrigin) -> Result<()> {
        Ok(())
    }
    async fn create_order(&self, _order: &LocalOrder, _origin: WriteOrigin) -> Result<String> {
        Ok("SO-1".to_string())
    }
    async fn list_sales_items(&self) -> Result<Vec<LocalItem>> {
        Ok(Vec::new())
    }
}

pub struct StubSettings(pub BridgeSettings);

#[async_trait]
impl SettingsProvider for StubSettings {
    async fn settings(&self) -> Result<BridgeSettings> {
        Ok(self.0.clone())
    }
}

pub struct StubNotifier;

#[async_trait]
impl Notifier for StubNotifier {
    async fn send(&self, _recipients: &[String], _subject: &str, _body: &str) -> Result<()> {
        Ok(())
    }
}

/// Fully wired services and ports over the stubs, ready to hand to the
/// dispatcher, the job driver, or the webhook router.
pub struct StubWiring {
    pub products: Arc<ProductSyncService>,
    pub customers: Arc<CustomerSyncService>,
    pub orders: Arc<OrderSyncService>,
    pub product_mappings: Arc<dyn ProductMappingRepository>,
    pub customer_mappings: Arc<dyn CustomerMappingRepository>,
    pub order_logs: Arc<dyn OrderSyncLogRepository>,
    pub gateway: Arc<dyn RemoteGateway>,
    pub local: Arc<dyn LocalStore>,
    pub settings: Arc<dyn SettingsProvider>,
}

pub fn stub_wiring(settings: BridgeSettings) -> StubWiring {
    let product_mappings: Arc<dyn ProductMappingRepository> = Arc::new(StubProductMappings);
    let customer_mappings: Arc<dyn CustomerMappingRepository> = Arc::new(StubCustomerMappings);
    let order_logs: Arc<dyn OrderSyncLogRepository> = Arc::new(StubOrderLogs);
    let gateway: Arc<dyn RemoteGateway> = Arc::new(StubGateway);
    let local: Arc<dyn LocalStore> = Arc::new(StubLocal);
    let settings: Arc<dyn SettingsProvider> = Arc::new(StubSettings(settings));

    let products = Arc::new(ProductSyncService::new(
        product_mappings.clone(),
        gateway.clone(),
        local.clone(),
        settings.clone(),
    ));
    let customers = Arc::new(CustomerSyncService::new(
        customer_mappings.clone(),
        gateway.clone(),
        local.clone(),
        settings.clone(),
    ));
    let orders = Arc::new(OrderSyncService::new(
        order_logs.clone(),
        product_mappings.clone(),
        gateway.clone(),
        local.clone(),
        customers.clone(),
        settings.clone(),
    ));

    StubWiring {
        products,
        customers,
        orders,
        product_mappings,
        customer_mappings,
        order_logs,
        gateway,
        local,
        settings,
    }
}

/// Wire an event dispatcher over stub ports with the given settings.
pub fn stub_dispatcher(settings: BridgeSettings) -> Arc<EventDispatcher> {
    let wiring = stub_wiring(settings);
    Arc::new(EventDispatcher::new(
        wiring.products,
        wiring.customers,
        wiring.orders,
        wiring.product_mappings,
        wiring.local,
        wiring.settings,
        None,
    ))
}

/// Wire the batch job driver over stub ports with the given settings.
pub fn stub_jobs(settings: BridgeSettings) -> Arc<SyncJobs> {
    let wiring = stub_wiring(settings);
    Arc::new(SyncJobs::new(
        wiring.products,
        wiring.orders,
        wiring.product_mappings,
        wiring.customer_mappings,
        wiring.order_logs,
        wiring.gateway,
        wiring.local,
        wiring.settings,
        None,
    ))
}
