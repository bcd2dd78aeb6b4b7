//! Local (ERP-side) value structs passed across the `LocalStore` port.

use serde::{Deserialize, Serialize};

/// An ERP item as the sync services see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalItem {
    pub item_code: String,
    pub name: String,
    pub description: Option<String>,
    pub disabled: bool,
    pub is_sales_item: bool,
}

/// An ERP customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalCustomer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub customer_group: Option<String>,
    pub territory: Option<String>,
}

/// A sales order to be created in the ERP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalOrder {
    pub customer_id: String,
    pub currency: String,
    pub price_list: Option<String>,
    pub lines: Vec<LocalOrderLine>,
    pub taxes: Vec<LocalTaxLine>,
}

/// One sales order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalOrderLine {
    pub item_code: String,
    pub quantity: f64,
    pub rate: f64,
    pub warehouse: Option<String>,
    pub description: Option<String>,
}

/// An actual-amount tax row on a sales order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTaxLine {
    pub description: String,
    pub amount: f64,
}

impl LocalOrder {
    /// Sum of line amounts plus tax rows.
    pub fn total(&self) -> f64 {
        let lines: f64 = self.lines.iter().map(|l| l.quantity * l.rate).sum();
        let taxes: f64 = self.taxes.iter().map(|t| t.amount).sum();
        lines + taxes
    }
}
