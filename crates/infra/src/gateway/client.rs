//! Wix Stores REST client.
//!
//! All calls funnel through [`WixGateway::request`], which owns the
//! cross-cutting response policy: one token refresh on 401, one backoff on
//! 429, everything else surfaced as-is. Retrying transient failures is the
//! caller's decision, not the transport's.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use storebridge_core::RemoteGateway;
use storebridge_domain::constants::{DEFAULT_RATE_LIMIT_WAIT_SECS, REQUEST_TIMEOUT_SECS};
use storebridge_domain::{
    BridgeError, GatewayCredentials, LocalCustomer, LocalItem, RemoteCustomer, RemoteOrder,
    RemoteProduct, Result,
};
use tracing::{debug, warn};

use super::auth::TokenManager;
use crate::errors::InfraError;

/// REST gateway to the Wix Stores API.
pub struct WixGateway {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenManager>,
}

impl WixGateway {
    pub fn new(credentials: &GatewayCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(InfraError::from)?;

        Ok(Self {
            http,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            tokens: Arc::new(TokenManager::new(credentials)),
        })
    }

    /// Issue one authorized request and apply the shared response policy.
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut refreshed = false;
        let mut waited = false;

        loop {
            let mut builder = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(self.tokens.access_token().await);
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(InfraError::from)?;
            let status = response.status();

            match status {
                StatusCode::UNAUTHORIZED if !refreshed => {
                    refreshed = true;
                    debug!(path, "401 from platform; refreshing token");
                    self.tokens.refresh(&self.http).await?;
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(BridgeError::Auth(
                        "access token rejected after refresh".to_string(),
                    ));
                }
                StatusCode::TOO_MANY_REQUESTS if !waited => {
                    waited = true;
                    let wait = retry_after_seconds(&response);
                    warn!(path, seconds = wait, "rate limited; backing off");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(BridgeError::RateLimited(
                        "rate limit persisted after backoff".to_string(),
                    ));
                }
                StatusCode::NOT_FOUND => {
                    return Err(BridgeError::NotFound(format!("{method} {path}")));
                }
                status if !status.is_success() => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(BridgeError::Remote { status: status.as_u16(), body });
                }
                _ => {
                    let bytes = response.bytes().await.map_err(InfraError::from)?;
                    if bytes.is_empty() {
                        return Ok(Value::Null);
                    }
                    return Ok(serde_json::from_slice(&bytes).map_err(InfraError::from)?);
                }
            }
        }
    }

    fn product_payload(item: &LocalItem, price: f64) -> Value {
        json!({
            "product": {
                "name": item.name,
                "description": item.description,
                "sku": item.item_code,
                "productType": "physical",
                "priceData": { "price": price },
            }
        })
    }
}

/// Map a 404 from a get endpoint to an ordinary absence.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(BridgeError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn retry_after_seconds(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECS)
}

/// Split a single display name into first/last for the contact payload.
fn split_name(name: &str) -> (&str, &str) {
    match name.split_once(' ') {
        Some((first, last)) => (first, last),
        None => (name, ""),
    }
}

#[async_trait]
impl RemoteGateway for WixGateway {
    async fn query_products(&self, limit: usize, offset: usize) -> Result<Vec<RemoteProduct>> {
        let body = json!({ "query": { "paging": { "limit": limit, "offset": offset } } });
        let value = self
            .request(Method::POST, "/stores/v1/products/query", Some(&body))
            .await?;

        value
            .get("products")
            .and_then(Value::as_array)
            .map(|products| products.iter().map(RemoteProduct::from_payload).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<RemoteProduct>> {
        let result = self
            .request(Method::GET, &format!("/stores/v1/products/{product_id}"), None)
            .await
            .and_then(|value| RemoteProduct::from_payload(&value));
        optional(result)
    }

    async fn create_product(&self, item: &LocalItem, price: f64) -> Result<RemoteProduct> {
        let body = Self::product_payload(item, price);
        let value = self.request(Method::POST, "/stores/v1/products", Some(&body)).await?;
        RemoteProduct::from_payload(&value)
    }

    async fn update_product(&self, product_id: &str, item: &LocalItem, price: f64) -> Result<()> {
        let body = Self::product_payload(item, price);
        self.request(Method::PATCH, &format!("/stores/v1/products/{product_id}"), Some(&body))
            .await?;
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("/stores/v1/products/{product_id}"), None)
            .await?;
        Ok(())
    }

    async fn update_inventory(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: f64,
    ) -> Result<()> {
        let path = match variant_id {
            Some(variant_id) => {
                format!("/stores/v1/products/{product_id}/variants/{variant_id}/inventory")
            }
            None => format!("/stores/v1/products/{product_id}/inventory"),
        };
        let body = json!({
            "inventoryItem": { "trackQuantity": true, "quantity": quantity }
        });
        self.request(Method::PATCH, &path, Some(&body)).await?;
        Ok(())
    }

    async fn query_orders(&self, limit: usize, offset: usize) -> Result<Vec<RemoteOrder>> {
        let body = json!({ "query": { "paging": { "limit": limit, "offset": offset } } });
        let value = self.request(Method::POST, "/stores/v1/orders/query", Some(&body)).await?;

        value
            .get("orders")
            .and_then(Value::as_array)
            .map(|orders| orders.iter().map(RemoteOrder::from_payload).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<RemoteOrder>> {
        let result = self
            .request(Method::GET, &format!("/stores/v1/orders/{order_id}"), None)
            .await
            .and_then(|value| RemoteOrder::from_payload(&value));
        optional(result)
    }

    async fn create_fulfillment(
        &self,
        order_id: &str,
        status: &str,
        tracking_number: Option<&str>,
        carrier: Option<&str>,
    ) -> Result<()> {
        let mut fulfillment = json!({ "status": status });
        if let Some(tracking_number) = tracking_number {
            fulfillment["trackingInfo"] = json!({
                "trackingNumber": tracking_number,
                "shippingProvider": carrier,
            });
        }
        let body = json!({ "fulfillment": fulfillment });
        self.request(
            Method::POST,
            &format!("/stores/v1/orders/{order_id}/fulfillments"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        self.request(
            Method::POST,
            &format!("/stores/v1/orders/{order_id}/cancel"),
            Some(&json!({})),
        )
        .await?;
        Ok(())
    }

    async fn query_customers(&self, limit: usize, offset: usize) -> Result<Vec<RemoteCustomer>> {
        let body = json!({ "query": { "paging": { "limit": limit, "offset": offset } } });
        let value = self.request(Method::POST, "/stores/v1/customers/query", Some(&body)).await?;

        value
            .get("customers")
            .and_then(Value::as_array)
            .map(|customers| customers.iter().map(RemoteCustomer::from_payload).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<RemoteCustomer>> {
        let result = self
            .request(Method::GET, &format!("/stores/v1/customers/{customer_id}"), None)
            .await
            .and_then(|value| RemoteCustomer::from_payload(&value));
        optional(result)
    }

    async fn create_customer(&self, customer: &LocalCustomer) -> Result<RemoteCustomer> {
        let (first_name, last_name) = split_name(&customer.name);
        let body = json!({
            "customer": {
                "firstName": first_name,
                "lastName": last_name,
                "email": customer.email,
                "phone": customer.phone,
            }
        });
        let value = self.request(Method::POST, "/stores/v1/customers", Some(&body)).await?;
        RemoteCustomer::from_payload(&value)
    }

    async fn update_customer(&self, customer_id: &str, customer: &LocalCustomer) -> Result<()> {
        let (first_name, last_name) = split_name(&customer.name);
        let body = json!({
            "customer": {
                "firstName": first_name,
                "lastName": last_name,
                "email": customer.email,
                "phone": customer.phone,
            }
        });
        self.request(Method::PATCH, &format!("/stores/v1/customers/{customer_id}"), Some(&body))
            .await?;
        Ok(())
    }
}
