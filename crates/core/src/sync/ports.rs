//! Port interfaces for sync operations
//!
//! Absence is modeled as `Ok(None)` on every lookup: a missing row or a 404
//! from the remote platform is an ordinary answer, not an error. Request
//! failures are `Err`.

use async_trait::async_trait;
use storebridge_domain::{
    BridgeSettings, CustomerMapping, LocalCustomer, LocalItem, LocalOrder, OrderSyncLog,
    ProductMapping, RemoteCustomer, RemoteOrder, RemoteProduct, Result, SyncStatus,
};

use crate::hooks::WriteOrigin;

/// Trait for managing product mapping records
#[async_trait]
pub trait ProductMappingRepository: Send + Sync {
    /// Insert a new mapping
    async fn insert(&self, mapping: &ProductMapping) -> Result<()>;

    /// Persist changes to an existing mapping (keyed by item code)
    async fn update(&self, mapping: &ProductMapping) -> Result<()>;

    /// Delete the mapping for an item
    async fn delete(&self, item_code: &str) -> Result<()>;

    /// Get mapping by local item code
    async fn get_by_item_code(&self, item_code: &str) -> Result<Option<ProductMapping>>;

    /// Get mapping by remote product id
    async fn get_by_remote_id(&self, remote_product_id: &str) -> Result<Option<ProductMapping>>;

    /// List mappings in any of the given statuses
    async fn list_by_status(&self, statuses: &[SyncStatus]) -> Result<Vec<ProductMapping>>;

    /// List every mapping
    async fn list_all(&self) -> Result<Vec<ProductMapping>>;

    /// Aggregate count per status
    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>>;
}

/// Trait for managing customer mapping records
#[async_trait]
pub trait CustomerMappingRepository: Send + Sync {
    /// Insert a new mapping
    async fn insert(&self, mapping: &CustomerMapping) -> Result<()>;

    /// Persist changes to an existing mapping (keyed by local id)
    async fn update(&self, mapping: &CustomerMapping) -> Result<()>;

    /// Delete the mapping for a local customer
    async fn delete(&self, local_id: &str) -> Result<()>;

    /// Get mapping by local customer id
    async fn get_by_local_id(&self, local_id: &str) -> Result<Option<CustomerMapping>>;

    /// Get mapping by remote contact id
    async fn get_by_remote_id(&self, remote_customer_id: &str)
        -> Result<Option<CustomerMapping>>;

    /// Aggregate count per status
    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>>;
}

/// Trait for managing order sync logs
#[async_trait]
pub trait OrderSyncLogRepository: Send + Sync {
    /// Insert a new log
    async fn insert(&self, log: &OrderSyncLog) -> Result<()>;

    /// Persist changes to an existing log (keyed by remote order id)
    async fn update(&self, log: &OrderSyncLog) -> Result<()>;

    /// Get log by remote order id
    async fn get_by_remote_order_id(&self, remote_order_id: &str)
        -> Result<Option<OrderSyncLog>>;

    /// Get log by local order id
    async fn get_by_local_order_id(&self, local_order_id: &str) -> Result<Option<OrderSyncLog>>;

    /// Logs still eligible for a creation retry (no local order yet,
    /// retry count below the cap)
    async fn list_retryable(&self, max_retries: i64) -> Result<Vec<OrderSyncLog>>;

    /// Delete logs older than the cutoff that sit in any of the given
    /// statuses; returns the number removed
    async fn delete_older_than(&self, cutoff: i64, statuses: &[SyncStatus]) -> Result<usize>;

    /// Aggregate count per status
    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>>;
}

/// Trait for the remote storefront platform.
///
/// One method per endpoint the engine uses; responses are normalized into
/// canonical domain structs before they cross this boundary.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Page through the remote catalog
    async fn query_products(&self, limit: usize, offset: usize) -> Result<Vec<RemoteProduct>>;

    /// Fetch one product; `Ok(None)` when the platform reports it missing
    async fn get_product(&self, product_id: &str) -> Result<Option<RemoteProduct>>;

    /// Create a product from local item data, returning the created product
    async fn create_product(&self, item: &LocalItem, price: f64) -> Result<RemoteProduct>;

    /// Update name/description/price of an existing product
    async fn update_product(&self, product_id: &str, item: &LocalItem, price: f64) -> Result<()>;

    /// Delete a product
    async fn delete_product(&self, product_id: &str) -> Result<()>;

    /// Set tracked inventory on a product or one of its variants
    async fn update_inventory(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: f64,
    ) -> Result<()>;

    /// Page through recent orders
    async fn query_orders(&self, limit: usize, offset: usize) -> Result<Vec<RemoteOrder>>;

    /// Fetch one order; `Ok(None)` when the platform reports it missing
    async fn get_order(&self, order_id: &str) -> Result<Option<RemoteOrder>>;

    /// Record a fulfillment against an order, optionally with tracking info
    async fn create_fulfillment(
        &self,
        order_id: &str,
        status: &str,
        tracking_number: Option<&str>,
        carrier: Option<&str>,
    ) -> Result<()>;

    /// Cancel an order on the platform
    async fn cancel_order(&self, order_id: &str) -> Result<()>;

    /// Page through the remote contact list
    async fn query_customers(&self, limit: usize, offset: usize) -> Result<Vec<RemoteCustomer>>;

    /// Fetch one contact; `Ok(None)` when the platform reports it missing
    async fn get_customer(&self, customer_id: &str) -> Result<Option<RemoteCustomer>>;

    /// Create a contact from local customer data, returning the created one
    async fn create_customer(&self, customer: &LocalCustomer) -> Result<RemoteCustomer>;

    /// Update an existing contact
    async fn update_customer(&self, customer_id: &str, customer: &LocalCustomer) -> Result<()>;
}

/// Trait for the local ERP document store.
///
/// Every mutating method carries the write origin so the change-hook layer
/// can tell sync-driven writes apart from user edits. Implementations must
/// thread the origin through to whatever change-notification mechanism the
/// host uses.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Get an item by code
    async fn get_item(&self, item_code: &str) -> Result<Option<LocalItem>>;

    /// Create or update an item
    async fn upsert_item(&self, item: &LocalItem, origin: WriteOrigin) -> Result<()>;

    /// Disable an item (soft delete)
    async fn disable_item(&self, item_code: &str, origin: WriteOrigin) -> Result<()>;

    /// Current selling price of an item on the given price list
    async fn get_price(&self, item_code: &str, price_list: Option<&str>) -> Result<Option<f64>>;

    /// Set the selling price of an item
    async fn set_price(
        &self,
        item_code: &str,
        price_list: Option<&str>,
        price: f64,
        origin: WriteOrigin,
    ) -> Result<()>;

    /// Current stock of an item in the given warehouse
    async fn get_stock(&self, item_code: &str, warehouse: Option<&str>) -> Result<f64>;

    /// Set the stock of an item
    async fn set_stock(
        &self,
        item_code: &str,
        warehouse: Option<&str>,
        quantity: f64,
        origin: WriteOrigin,
    ) -> Result<()>;

    /// Get a customer by id
    async fn get_customer(&self, id: &str) -> Result<Option<LocalCustomer>>;

    /// Find a customer by exact email match
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<LocalCustomer>>;

    /// Create a customer, returning its id
    async fn create_customer(&self, customer: &LocalCustomer, origin: WriteOrigin)
        -> Result<String>;

    /// Update an existing customer
    async fn update_customer(&self, customer: &LocalCustomer, origin: WriteOrigin) -> Result<()>;

    /// Create a sales order, returning its id
    async fn create_order(&self, order: &LocalOrder, origin: WriteOrigin) -> Result<String>;

    /// List every active sales item
    async fn list_sales_items(&self) -> Result<Vec<LocalItem>>;
}

/// Trait for reading the integration settings document.
///
/// Settings live in the host ERP and can change between invocations; batch
/// drivers read them once per run.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Current settings snapshot
    async fn settings(&self) -> Result<BridgeSettings>;
}

/// Trait for outbound notifications (batch failure summaries, low-stock
/// alerts)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message to the given recipients
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()>;
}
