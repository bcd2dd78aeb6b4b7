//! Scheduled batch drivers.
//!
//! Every driver reads the settings gate once, walks its record set, and
//! returns a `BatchReport`. Per-record failures are logged against the
//! record and the loop continues; a single bad record never aborts a batch.

use std::sync::Arc;

use tracing::{info, warn};

use storebridge_domain::constants::{
    MAX_ORDER_RETRIES, ORDER_LOG_RETENTION_DAYS, SYNC_PAGE_SIZE,
};
use storebridge_domain::{Result, SyncKind, SyncStatus};

use crate::sync::ports::{
    CustomerMappingRepository, LocalStore, Notifier, OrderSyncLogRepository,
    ProductMappingRepository, RemoteGateway, SettingsProvider,
};
use crate::sync::{unix_now, OrderSyncService, ProductSyncService, SyncOutcome};

/// Aggregate outcome of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &Result<SyncOutcome>) {
        self.attempted += 1;
        match outcome {
            Ok(SyncOutcome::Synced) => self.succeeded += 1,
            Ok(SyncOutcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Pull and push halves of a full catalog sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSyncReport {
    pub pull: BatchReport,
    pub push: BatchReport,
}

/// Per-kind status counts for dashboard queries.
#[derive(Debug, Clone, Default)]
pub struct StatusSummary {
    pub products: Vec<(SyncStatus, i64)>,
    pub customers: Vec<(SyncStatus, i64)>,
    pub orders: Vec<(SyncStatus, i64)>,
}

/// The scheduled batch drivers.
pub struct SyncJobs {
    products: Arc<ProductSyncService>,
    orders: Arc<OrderSyncService>,
    product_mappings: Arc<dyn ProductMappingRepository>,
    customer_mappings: Arc<dyn CustomerMappingRepository>,
    order_logs: Arc<dyn OrderSyncLogRepository>,
    gateway: Arc<dyn RemoteGateway>,
    local: Arc<dyn LocalStore>,
    settings: Arc<dyn SettingsProvider>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl SyncJobs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        products: Arc<ProductSyncService>,
        orders: Arc<OrderSyncService>,
        product_mappings: Arc<dyn ProductMappingRepository>,
        customer_mappings: Arc<dyn CustomerMappingRepository>,
        order_logs: Arc<dyn OrderSyncLogRepository>,
        gateway: Arc<dyn RemoteGateway>,
        local: Arc<dyn LocalStore>,
        settings: Arc<dyn SettingsProvider>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            products,
            orders,
            product_mappings,
            customer_mappings,
            order_logs,
            gateway,
            local,
            settings,
            notifier,
        }
    }

    /// Push current stock for every mapped item whose direction allows it.
    /// Scheduled every five minutes.
    pub async fn push_inventory(&self) -> Result<BatchReport> {
        let settings = self.settings.settings().await?;
        if !settings.kind_enabled(SyncKind::Inventory) {
            return Ok(BatchReport::default());
        }

        let mut report = BatchReport::default();
        let mappings = self
            .product_mappings
            .list_by_status(&[SyncStatus::Synced, SyncStatus::Conflict])
            .await?;

        for mut mapping in mappings {
            if !mapping.sync_direction.allows_push() {
                report.attempted += 1;
                report.skipped += 1;
                continue;
            }
            let outcome =
                self.products.push_inventory(&mut mapping).await.map(|()| SyncOutcome::Synced);
            if let Err(err) = &outcome {
                warn!(item_code = %mapping.item_code, error = %err, "inventory push failed");
            }
            report.record(&outcome);
        }

        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            "inventory push finished"
        );
        Ok(report)
    }

    /// Full catalog reconciliation: pull every remote product page by page,
    /// then push every local sales item. Scheduled every two hours.
    pub async fn full_catalog_sync(&self) -> Result<CatalogSyncReport> {
        let settings = self.settings.settings().await?;
        if !settings.kind_enabled(SyncKind::Products) {
            return Ok(CatalogSyncReport::default());
        }

        let mut report = CatalogSyncReport::default();

        // Pull: advance the offset until a short page signals the end.
        let mut offset = 0;
        loop {
            let page = self.gateway.query_products(SYNC_PAGE_SIZE, offset).await?;
            let page_len = page.len();
            for product in &page {
                let outcome = self.products.apply_remote(product).await;
                if let Err(err) = &outcome {
                    warn!(remote_id = %product.id, error = %err, "catalog pull failed for product");
                }
                report.pull.record(&outcome);
            }
            if page_len < SYNC_PAGE_SIZE {
                break;
            }
            offset += page_len;
        }

        // Push: every active sales item.
        for item in self.local.list_sales_items().await? {
            let outcome = self.products.sync_to_remote(&item.item_code).await;
            if let Err(err) = &outcome {
                warn!(item_code = %item.item_code, error = %err, "catalog push failed for item");
            }
            report.push.record(&outcome);
        }

        info!(
            pulled = report.pull.succeeded,
            pushed = report.push.succeeded,
            pull_failed = report.pull.failed,
            push_failed = report.push.failed,
            "full catalog sync finished"
        );
        Ok(report)
    }

    /// Re-attempt local order creation for logs still under the retry cap.
    /// Scheduled daily; failures are summarized to the alert recipients.
    pub async fn retry_pending_orders(&self) -> Result<BatchReport> {
        let settings = self.settings.settings().await?;
        if !settings.kind_enabled(SyncKind::Orders) {
            return Ok(BatchReport::default());
        }

        let mut report = BatchReport::default();
        let mut failures = Vec::new();

        for mut log in self.order_logs.list_retryable(MAX_ORDER_RETRIES).await? {
            report.attempted += 1;
            match self.orders.retry_from_log(&mut log).await {
                Ok(()) if log.sync_status == SyncStatus::Synced => report.succeeded += 1,
                Ok(()) => {
                    report.failed += 1;
                    failures.push(format!(
                        "{}: {}",
                        log.remote_order_id,
                        log.error_log.as_deref().unwrap_or("unknown")
                    ));
                }
                Err(err) => {
                    warn!(remote_order_id = %log.remote_order_id, error = %err, "order retry failed");
                    report.failed += 1;
                    failures.push(format!("{}: {err}", log.remote_order_id));
                }
            }
        }

        if !failures.is_empty() {
            self.send_failure_summary(&settings, &failures).await;
        }
        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            "pending order sweep finished"
        );
        Ok(report)
    }

    /// Delete product mappings whose local item no longer exists.
    pub async fn cleanup_orphaned_mappings(&self) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for mapping in self.product_mappings.list_all().await? {
            report.attempted += 1;
            if self.local.get_item(&mapping.item_code).await?.is_some() {
                report.skipped += 1;
                continue;
            }
            match self.product_mappings.delete(&mapping.item_code).await {
                Ok(()) => {
                    info!(item_code = %mapping.item_code, "orphaned mapping removed");
                    report.succeeded += 1;
                }
                Err(err) => {
                    warn!(item_code = %mapping.item_code, error = %err, "orphan cleanup failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Age out synced order logs past the retention window. Returns the
    /// number removed.
    pub async fn cleanup_order_logs(&self) -> Result<usize> {
        let cutoff = unix_now() - ORDER_LOG_RETENTION_DAYS * 86_400;
        let removed =
            self.order_logs.delete_older_than(cutoff, &[SyncStatus::Synced]).await?;
        if removed > 0 {
            info!(removed, "expired order logs removed");
        }
        Ok(removed)
    }

    /// Aggregate status counts across all three record kinds.
    pub async fn status_summary(&self) -> Result<StatusSummary> {
        Ok(StatusSummary {
            products: self.product_mappings.status_counts().await?,
            customers: self.customer_mappings.status_counts().await?,
            orders: self.order_logs.status_counts().await?,
        })
    }

    async fn send_failure_summary(
        &self,
        settings: &storebridge_domain::BridgeSettings,
        failures: &[String],
    ) {
        let Some(notifier) = &self.notifier else { return };
        if settings.alert_recipients.is_empty() {
            return;
        }
        let subject = format!("{} order(s) failed to sync", failures.len());
        let body = failures.join("\n");
        if let Err(err) = notifier.send(&settings.alert_recipients, &subject, &body).await {
            warn!(error = %err, "failure summary notification failed");
        }
    }
}
