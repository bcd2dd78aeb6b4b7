//! Canonical remote (storefront) entity structs.
//!
//! The platform delivers entities in two shapes: nested under a named key
//! (`{"product": {...}}`, the webhook and single-get form) or flat (query
//! result rows). Every payload passes through the `from_payload`
//! constructors here before any business logic sees it, so the rest of the
//! engine only ever deals with these canonical structs.

use serde_json::Value;

use crate::errors::{BridgeError, Result};

/// A storefront product, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteProduct {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
    pub track_inventory: bool,
    pub stock_quantity: f64,
    pub variants: Vec<RemoteVariant>,
}

/// A product variant with its own SKU and stock level.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteVariant {
    pub id: String,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<f64>,
}

/// A storefront contact, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Buyer identity attached to an order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuyerInfo {
    pub contact_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// One order line, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteLineItem {
    pub product_id: Option<String>,
    pub sku: Option<String>,
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

/// A storefront order, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteOrder {
    pub id: String,
    pub number: Option<String>,
    pub buyer: BuyerInfo,
    pub line_items: Vec<RemoteLineItem>,
    pub total: f64,
    pub shipping_cost: f64,
    pub tax: f64,
    pub currency: Option<String>,
    pub payment_status: Option<String>,
    pub fulfillment_status: Option<String>,
}

impl RemoteProduct {
    /// Normalize a product payload, nested under `"product"` or flat.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let body = unwrap_entity(payload, "product");
        let id = require_str(body, "id", "product")?;

        let price = body
            .get("priceData")
            .or_else(|| body.get("price"))
            .map(|p| match p {
                Value::Object(_) => num_field(p, "price"),
                other => num_value(other),
            })
            .unwrap_or(0.0);

        let stock = body.get("stock").unwrap_or(&Value::Null);
        let variants = body
            .get("variants")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(RemoteVariant::from_payload).collect())
            .unwrap_or_default();

        Ok(Self {
            id,
            name: str_field(body, "name").unwrap_or_default(),
            description: str_field(body, "description"),
            sku: str_field(body, "sku"),
            price,
            currency: body
                .get("priceData")
                .and_then(|p| str_field(p, "currency"))
                .or_else(|| str_field(body, "currency")),
            track_inventory: stock.get("trackInventory").and_then(Value::as_bool).unwrap_or(false),
            stock_quantity: num_field(stock, "quantity"),
            variants,
        })
    }
}

impl RemoteVariant {
    fn from_payload(body: &Value) -> Option<Self> {
        let id = str_field(body, "id")?;
        let choices = body.get("variant").unwrap_or(body);
        Some(Self {
            id,
            sku: str_field(choices, "sku").or_else(|| str_field(body, "sku")),
            price: choices
                .get("priceData")
                .map(|p| num_field(p, "price"))
                .or_else(|| body.get("price").map(num_value)),
            stock_quantity: body
                .get("stock")
                .and_then(|s| s.get("quantity"))
                .map(num_value)
                .or_else(|| body.get("quantity").map(num_value)),
        })
    }
}

impl RemoteCustomer {
    /// Normalize a contact payload, nested under `"contact"` or flat.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let body = unwrap_entity(payload, "contact");
        let id = require_str(body, "id", "contact")?;

        // Contact APIs nest names/emails under "info"; webhook payloads are
        // often flat.
        let info = body.get("info").unwrap_or(body);
        let name = info.get("name").unwrap_or(&Value::Null);

        let email = str_field(info, "email")
            .or_else(|| first_list_entry(info, "emails", "email"))
            .or_else(|| str_field(body, "email"));
        let phone = str_field(info, "phone")
            .or_else(|| first_list_entry(info, "phones", "phone"))
            .or_else(|| str_field(body, "phone"));

        Ok(Self {
            id,
            first_name: str_field(name, "first").or_else(|| str_field(body, "firstName")),
            last_name: str_field(name, "last").or_else(|| str_field(body, "lastName")),
            email,
            phone,
        })
    }

    /// Display name used when creating the local customer: full name, then
    /// email, then a generated placeholder.
    pub fn display_name(&self) -> String {
        let full = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        };
        if !full.trim().is_empty() {
            return full.trim().to_string();
        }
        if let Some(email) = &self.email {
            return email.clone();
        }
        format!("Wix Customer {}", self.id)
    }
}

impl RemoteOrder {
    /// Normalize an order payload, nested under `"order"` or flat.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let body = unwrap_entity(payload, "order");
        let id = require_str(body, "id", "order")?;

        let buyer_body = body.get("buyerInfo").unwrap_or(&Value::Null);
        let buyer = BuyerInfo {
            contact_id: str_field(buyer_body, "contactId").or_else(|| str_field(buyer_body, "id")),
            email: str_field(buyer_body, "email"),
            first_name: str_field(buyer_body, "firstName"),
            last_name: str_field(buyer_body, "lastName"),
        };

        let line_items = body
            .get("lineItems")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(RemoteLineItem::from_payload).collect())
            .unwrap_or_default();

        let totals = body.get("totals").unwrap_or(&Value::Null);

        Ok(Self {
            id,
            number: body
                .get("number")
                .map(|n| match n {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .or_else(|| str_field(body, "orderNumber")),
            buyer,
            line_items,
            total: num_field(totals, "total"),
            shipping_cost: num_field(totals, "shipping"),
            tax: num_field(totals, "tax"),
            currency: str_field(body, "currency"),
            payment_status: str_field(body, "paymentStatus"),
            fulfillment_status: str_field(body, "fulfillmentStatus"),
        })
    }
}

impl RemoteLineItem {
    fn from_payload(body: &Value) -> Self {
        let catalog = body.get("catalogReference").unwrap_or(&Value::Null);
        Self {
            product_id: str_field(body, "productId")
                .or_else(|| str_field(catalog, "catalogItemId")),
            sku: str_field(body, "sku"),
            name: str_field(body, "name").unwrap_or_default(),
            quantity: num_field(body, "quantity"),
            price: body
                .get("price")
                .map(|p| match p {
                    Value::Object(_) => num_field(p, "amount"),
                    other => num_value(other),
                })
                .unwrap_or(0.0),
        }
    }
}

// Payloads arrive nested under a named key or flat depending on the source
// endpoint.
fn unwrap_entity<'a>(payload: &'a Value, key: &str) -> &'a Value {
    payload.get(key).filter(|v| v.is_object()).unwrap_or(payload)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string).filter(|s| !s.is_empty())
}

fn require_str(value: &Value, key: &str, entity: &str) -> Result<String> {
    str_field(value, key)
        .ok_or_else(|| BridgeError::InvalidInput(format!("{entity} payload missing '{key}'")))
}

// Monetary fields arrive as numbers or numeric strings depending on endpoint
// version.
fn num_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn num_field(value: &Value, key: &str) -> f64 {
    value.get(key).map(num_value).unwrap_or(0.0)
}

fn first_list_entry(value: &Value, list_key: &str, field: &str) -> Option<String> {
    let list = value.get(list_key)?;
    let items = list.get("items").and_then(Value::as_array).or_else(|| list.as_array())?;
    items.first().and_then(|entry| {
        str_field(entry, field).or_else(|| entry.as_str().map(str::to_string))
    })
}
