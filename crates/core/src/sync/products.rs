//! Product reconciliation: catalog push/pull, inventory push, validation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use storebridge_domain::constants::GENERATED_ITEM_PREFIX;
use storebridge_domain::{
    BridgeError, LocalItem, ProductMapping, RemoteProduct, Result, SyncStatus,
};

use crate::hooks::WriteOrigin;
use crate::sync::ports::{
    LocalStore, ProductMappingRepository, RemoteGateway, SettingsProvider,
};
use crate::sync::{unix_now, SyncOutcome};

/// Reconciles products and their inventory between the ERP and the
/// storefront.
pub struct ProductSyncService {
    mappings: Arc<dyn ProductMappingRepository>,
    gateway: Arc<dyn RemoteGateway>,
    local: Arc<dyn LocalStore>,
    settings: Arc<dyn SettingsProvider>,
}

impl ProductSyncService {
    pub fn new(
        mappings: Arc<dyn ProductMappingRepository>,
        gateway: Arc<dyn RemoteGateway>,
        local: Arc<dyn LocalStore>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self { mappings, gateway, local, settings }
    }

    /// Push a local item to the remote platform, creating the remote product
    /// and the mapping on first sight.
    ///
    /// Transport failures leave the mapping in its prior status so the next
    /// pass retries; remote rejections mark it `Error`.
    pub async fn sync_to_remote(&self, item_code: &str) -> Result<SyncOutcome> {
        let settings = self.settings.settings().await?;
        let item = self
            .local
            .get_item(item_code)
            .await?
            .ok_or_else(|| BridgeError::NotFound(format!("item {item_code}")))?;

        let price = self
            .local
            .get_price(item_code, settings.default_price_list.as_deref())
            .await?
            .unwrap_or(0.0);
        let stock = self
            .local
            .get_stock(item_code, settings.default_warehouse.as_deref())
            .await?;

        match self.mappings.get_by_item_code(item_code).await? {
            Some(mut mapping) => {
                if !mapping.sync_direction.allows_push() {
                    return Ok(SyncOutcome::skipped("direction excludes local-to-remote"));
                }
                let pushed = self.push_existing(&mapping, &item, price, stock).await;
                match pushed {
                    Ok(()) => {
                        mapping.local_price = price;
                        mapping.remote_price = price;
                        mapping.local_stock_qty = stock;
                        mapping.remote_stock_qty = stock.max(0.0);
                        mapping.mark_synced(unix_now());
                        self.mappings.update(&mapping).await?;
                        info!(item_code, remote_id = %mapping.remote_product_id, "product pushed");
                        Ok(SyncOutcome::Synced)
                    }
                    Err(err) => {
                        self.record_push_failure(mapping, &err).await?;
                        Err(err)
                    }
                }
            }
            None => {
                let created = self.gateway.create_product(&item, price).await?;
                self.gateway
                    .update_inventory(&created.id, None, stock.max(0.0))
                    .await?;

                let mut mapping = ProductMapping::new(item_code, &created.id, unix_now());
                mapping.local_price = price;
                mapping.remote_price = price;
                mapping.local_stock_qty = stock;
                mapping.remote_stock_qty = stock.max(0.0);
                mapping.mark_synced(unix_now());
                self.mappings.insert(&mapping).await?;
                info!(item_code, remote_id = %created.id, "product created remotely");
                Ok(SyncOutcome::Synced)
            }
        }
    }

    /// Fetch a remote product and apply it locally.
    ///
    /// A platform-reported absence is not a request failure: with an
    /// existing mapping the record is marked `Error`, without one the call
    /// is a no-op.
    pub async fn sync_from_remote(&self, remote_id: &str) -> Result<SyncOutcome> {
        match self.gateway.get_product(remote_id).await? {
            Some(product) => self.apply_remote(&product).await,
            None => {
                if let Some(mut mapping) = self.mappings.get_by_remote_id(remote_id).await? {
                    mapping.mark_error("remote product not found", unix_now());
                    self.mappings.update(&mapping).await?;
                }
                Ok(SyncOutcome::skipped("remote product missing"))
            }
        }
    }

    /// Apply an already-normalized remote product to the local side.
    ///
    /// All local writes carry `WriteOrigin::RemoteSync` so the change hooks
    /// do not echo them back out.
    pub async fn apply_remote(&self, product: &RemoteProduct) -> Result<SyncOutcome> {
        let settings = self.settings.settings().await?;

        match self.mappings.get_by_remote_id(&product.id).await? {
            Some(mut mapping) => {
                if !mapping.sync_direction.allows_pull() {
                    return Ok(SyncOutcome::skipped("direction excludes remote-to-local"));
                }
                let applied = self
                    .write_local(&mapping.item_code, product, settings.default_price_list.as_deref(), settings.default_warehouse.as_deref())
                    .await;
                match applied {
                    Ok(()) => {
                        mapping.local_price = product.price;
                        mapping.remote_price = product.price;
                        if product.track_inventory {
                            mapping.local_stock_qty = product.stock_quantity;
                            mapping.remote_stock_qty = product.stock_quantity;
                        }
                        mapping.mark_synced(unix_now());
                        self.mappings.update(&mapping).await?;
                        Ok(SyncOutcome::Synced)
                    }
                    Err(err) => {
                        if !err.is_transient() {
                            mapping.mark_error(&err.to_string(), unix_now());
                            self.mappings.update(&mapping).await?;
                        }
                        Err(err)
                    }
                }
            }
            None => {
                if !settings.auto_create_items {
                    debug!(remote_id = %product.id, "auto-create disabled; skipping product");
                    return Ok(SyncOutcome::skipped("auto-create items disabled"));
                }
                let item_code = item_code_for(product);
                self.write_local(
                    &item_code,
                    product,
                    settings.default_price_list.as_deref(),
                    settings.default_warehouse.as_deref(),
                )
                .await?;

                let mut mapping = ProductMapping::new(&item_code, &product.id, unix_now());
                mapping.local_price = product.price;
                mapping.remote_price = product.price;
                if product.track_inventory {
                    mapping.local_stock_qty = product.stock_quantity;
                    mapping.remote_stock_qty = product.stock_quantity;
                }
                mapping.mark_synced(unix_now());
                self.mappings.insert(&mapping).await?;
                info!(item_code, remote_id = %product.id, "item auto-created from remote");
                Ok(SyncOutcome::Synced)
            }
        }
    }

    /// Push current local stock for one mapped item.
    pub async fn push_inventory_for_item(&self, item_code: &str) -> Result<SyncOutcome> {
        match self.mappings.get_by_item_code(item_code).await? {
            Some(mut mapping) => {
                if !mapping.sync_direction.allows_push() {
                    return Ok(SyncOutcome::skipped("direction excludes local-to-remote"));
                }
                self.push_inventory(&mut mapping).await?;
                Ok(SyncOutcome::Synced)
            }
            None => Ok(SyncOutcome::skipped("item not mapped")),
        }
    }

    /// Push current local stock for an already-loaded mapping and persist
    /// the refreshed snapshots. Negative local stock is clamped to zero on
    /// the remote side.
    pub async fn push_inventory(&self, mapping: &mut ProductMapping) -> Result<()> {
        let settings = self.settings.settings().await?;
        let stock = self
            .local
            .get_stock(&mapping.item_code, settings.default_warehouse.as_deref())
            .await?;
        let remote_qty = stock.max(0.0);

        let pushed = self
            .gateway
            .update_inventory(
                &mapping.remote_product_id,
                mapping.remote_variant_id.as_deref(),
                remote_qty,
            )
            .await;

        match pushed {
            Ok(()) => {
                mapping.local_stock_qty = stock;
                mapping.remote_stock_qty = remote_qty;
                mapping.last_sync_time = Some(unix_now());
                mapping.refresh_differences();
                // A push that equalizes both sides resolves a stock conflict.
                if mapping.sync_status == SyncStatus::Conflict
                    && mapping.price_difference.abs() <= storebridge_domain::constants::PRICE_EPSILON
                    && mapping.stock_difference == 0.0
                {
                    mapping.sync_status = SyncStatus::Synced;
                }
                mapping.updated_at = unix_now();
                self.mappings.update(mapping).await?;
                Ok(())
            }
            Err(err) => {
                if !err.is_transient() {
                    mapping.mark_error(&err.to_string(), unix_now());
                    self.mappings.update(mapping).await?;
                }
                Err(err)
            }
        }
    }

    /// Re-read both sides of a mapping, refresh the snapshots, and run
    /// conflict detection.
    pub async fn validate(&self, item_code: &str) -> Result<Option<ProductMapping>> {
        let Some(mut mapping) = self.mappings.get_by_item_code(item_code).await? else {
            return Ok(None);
        };
        let settings = self.settings.settings().await?;

        mapping.local_price = self
            .local
            .get_price(item_code, settings.default_price_list.as_deref())
            .await?
            .unwrap_or(0.0);
        mapping.local_stock_qty = self
            .local
            .get_stock(item_code, settings.default_warehouse.as_deref())
            .await?;

        if let Some(remote) = self.gateway.get_product(&mapping.remote_product_id).await? {
            mapping.remote_price = remote.price;
            if remote.track_inventory {
                mapping.remote_stock_qty = remote.stock_quantity;
            }
        }

        mapping.refresh_differences();
        if mapping.detect_conflict() {
            warn!(
                item_code,
                price_diff = mapping.price_difference,
                stock_diff = mapping.stock_difference,
                "mapping drifted into conflict"
            );
        }
        mapping.updated_at = unix_now();
        self.mappings.update(&mapping).await?;
        Ok(Some(mapping))
    }

    /// The platform deleted a product: disable the local item and drop the
    /// mapping.
    pub async fn handle_remote_delete(&self, remote_id: &str) -> Result<SyncOutcome> {
        match self.mappings.get_by_remote_id(remote_id).await? {
            Some(mapping) => {
                self.local.disable_item(&mapping.item_code, WriteOrigin::RemoteSync).await?;
                self.mappings.delete(&mapping.item_code).await?;
                info!(item_code = %mapping.item_code, remote_id, "item disabled after remote delete");
                Ok(SyncOutcome::Synced)
            }
            None => Ok(SyncOutcome::skipped("no mapping for deleted product")),
        }
    }

    /// Delete the remote counterpart of a local item and drop the mapping.
    pub async fn delete_remote(&self, item_code: &str) -> Result<SyncOutcome> {
        match self.mappings.get_by_item_code(item_code).await? {
            Some(mapping) => {
                self.gateway.delete_product(&mapping.remote_product_id).await?;
                self.mappings.delete(item_code).await?;
                Ok(SyncOutcome::Synced)
            }
            None => Ok(SyncOutcome::skipped("item not mapped")),
        }
    }

    async fn push_existing(
        &self,
        mapping: &ProductMapping,
        item: &LocalItem,
        price: f64,
        stock: f64,
    ) -> Result<()> {
        self.gateway.update_product(&mapping.remote_product_id, item, price).await?;
        self.gateway
            .update_inventory(
                &mapping.remote_product_id,
                mapping.remote_variant_id.as_deref(),
                stock.max(0.0),
            )
            .await?;
        Ok(())
    }

    async fn record_push_failure(
        &self,
        mut mapping: ProductMapping,
        err: &BridgeError,
    ) -> Result<()> {
        if err.is_transient() {
            // Leave the prior status; the next pass retries.
            debug!(item_code = %mapping.item_code, error = %err, "transient push failure");
            return Ok(());
        }
        mapping.mark_error(&err.to_string(), unix_now());
        self.mappings.update(&mapping).await
    }

    async fn write_local(
        &self,
        item_code: &str,
        product: &RemoteProduct,
        price_list: Option<&str>,
        warehouse: Option<&str>,
    ) -> Result<()> {
        let item = LocalItem {
            item_code: item_code.to_string(),
            name: if product.name.is_empty() {
                item_code.to_string()
            } else {
                product.name.clone()
            },
            description: product.description.clone(),
            disabled: false,
            is_sales_item: true,
        };
        self.local.upsert_item(&item, WriteOrigin::RemoteSync).await?;
        self.local
            .set_price(item_code, price_list, product.price, WriteOrigin::RemoteSync)
            .await?;
        if product.track_inventory {
            self.local
                .set_stock(item_code, warehouse, product.stock_quantity, WriteOrigin::RemoteSync)
                .await?;
        }
        Ok(())
    }
}

/// Local item code for an unmapped remote product: its SKU when present,
/// otherwise a generated code carrying the remote id.
pub(crate) fn item_code_for(product: &RemoteProduct) -> String {
    product
        .sku
        .clone()
        .filter(|sku| !sku.trim().is_empty())
        .unwrap_or_else(|| format!("{GENERATED_ITEM_PREFIX}{}", product.id))
}
