//! Configuration structures
//!
//! Loaded by the infrastructure config loader from environment variables or
//! a TOML/JSON file; consumed by the gateway, mapping store, and sync
//! services.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub database: DatabaseConfig,
    pub gateway: GatewayCredentials,
    pub settings: BridgeSettings,
}

/// Mapping store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Credentials and endpoint for the storefront platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCredentials {
    pub app_id: String,
    pub app_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    pub webhook_secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://www.wixapis.com".to_string()
}

/// Integration settings document.
///
/// Every sync path checks `enabled` plus its own kind flag before doing any
/// work; a disabled path short-circuits as a successful no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub sync_products: bool,
    #[serde(default = "default_true")]
    pub sync_inventory: bool,
    #[serde(default = "default_true")]
    pub sync_orders: bool,
    #[serde(default = "default_true")]
    pub sync_customers: bool,
    #[serde(default = "default_true")]
    pub auto_create_items: bool,
    #[serde(default = "default_true")]
    pub auto_create_customers: bool,
    #[serde(default)]
    pub default_price_list: Option<String>,
    #[serde(default)]
    pub default_warehouse: Option<String>,
    #[serde(default)]
    pub default_customer_group: Option<String>,
    #[serde(default)]
    pub default_territory: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Recipients for batch failure summaries and low-stock alerts.
    #[serde(default)]
    pub alert_recipients: Vec<String>,
}

const fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_products: true,
            sync_inventory: true,
            sync_orders: true,
            sync_customers: true,
            auto_create_items: true,
            auto_create_customers: true,
            default_price_list: None,
            default_warehouse: None,
            default_customer_group: None,
            default_territory: None,
            currency: default_currency(),
            alert_recipients: Vec::new(),
        }
    }
}

impl BridgeSettings {
    /// Whether the given sync kind is active.
    pub const fn kind_enabled(&self, kind: SyncKind) -> bool {
        self.enabled
            && match kind {
                SyncKind::Products => self.sync_products,
                SyncKind::Inventory => self.sync_inventory,
                SyncKind::Orders => self.sync_orders,
                SyncKind::Customers => self.sync_customers,
            }
    }
}

/// The entity kinds the engine reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    Products,
    Inventory,
    Orders,
    Customers,
}
