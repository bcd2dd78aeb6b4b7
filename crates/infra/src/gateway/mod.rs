//! Wix REST gateway: token management, request plumbing, and webhook
//! signature verification.

pub mod auth;
pub mod client;
pub mod signature;

pub use auth::TokenManager;
pub use client::WixGateway;
pub use signature::{compute_signature, verify_signature};
