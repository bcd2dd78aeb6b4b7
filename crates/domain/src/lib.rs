//! # StoreBridge Domain
//!
//! Business domain types and models for StoreBridge.
//!
//! This crate contains:
//! - Mapping records and order sync logs
//! - Canonical remote (storefront) and local (ERP) entity structs
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other StoreBridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
