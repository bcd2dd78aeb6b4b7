//! # StoreBridge Infrastructure
//!
//! Adapters behind the core port traits:
//! - SQLite-backed mapping and order-log repositories
//! - The Wix REST gateway with token refresh and rate-limit handling
//! - Webhook ingestion (signature verification + axum router)
//! - The cron-based batch scheduler
//! - Configuration loading

pub mod config;
pub mod database;
pub mod errors;
pub mod gateway;
pub mod scheduling;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

pub use database::DbManager;
pub use errors::InfraError;
pub use gateway::{TokenManager, WixGateway};
pub use scheduling::{BridgeScheduler, BridgeSchedulerConfig, SchedulerError, SchedulerResult};
pub use webhook::{webhook_router, WebhookState};
