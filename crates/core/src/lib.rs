//! # StoreBridge Core
//!
//! Pure reconciliation logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the mapping store, remote gateway,
//!   local ERP store, and notifier
//! - The per-kind sync services and the webhook event dispatcher
//! - The change-hook layer with its explicit write-origin loop guard
//! - The batch job drivers
//!
//! ## Architecture Principles
//! - Only depends on `storebridge-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod hooks;
pub mod jobs;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

// Re-export specific items to avoid ambiguity
pub use hooks::{ChangeHooks, WriteOrigin};
pub use jobs::{BatchReport, CatalogSyncReport, StatusSummary, SyncJobs};
pub use sync::dispatch::{DispatchOutcome, EventDispatcher, WebhookEvent};
pub use sync::ports::{
    CustomerMappingRepository, LocalStore, Notifier, OrderSyncLogRepository,
    ProductMappingRepository, RemoteGateway, SettingsProvider,
};
pub use sync::{CustomerSyncService, OrderSyncService, ProductSyncService, SyncOutcome};
