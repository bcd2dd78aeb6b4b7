//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STOREBRIDGE_DB_PATH`: Mapping database file path
//! - `STOREBRIDGE_DB_POOL_SIZE`: Connection pool size
//! - `STOREBRIDGE_APP_ID`: Platform app id
//! - `STOREBRIDGE_APP_SECRET`: Platform app secret
//! - `STOREBRIDGE_ACCESS_TOKEN`: Current OAuth access token
//! - `STOREBRIDGE_REFRESH_TOKEN`: OAuth refresh token
//! - `STOREBRIDGE_WEBHOOK_SECRET`: Webhook signing secret
//! - `STOREBRIDGE_BASE_URL`: API base URL (optional)
//! - `STOREBRIDGE_ENABLED`: Master sync switch (optional, default true)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./storebridge.json` or `./storebridge.toml`
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use storebridge_domain::{
    BridgeConfig, BridgeError, BridgeSettings, DatabaseConfig, GatewayCredentials, Result,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `BridgeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<BridgeConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `BridgeError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<BridgeConfig> {
    let db_path = env_var("STOREBRIDGE_DB_PATH")?;
    let db_pool_size = env_var("STOREBRIDGE_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| BridgeError::Config(format!("invalid pool size: {e}")))
    })?;

    let app_id = env_var("STOREBRIDGE_APP_ID")?;
    let app_secret = env_var("STOREBRIDGE_APP_SECRET")?;
    let access_token = env_var("STOREBRIDGE_ACCESS_TOKEN")?;
    let refresh_token = env_var("STOREBRIDGE_REFRESH_TOKEN")?;
    let webhook_secret = env_var("STOREBRIDGE_WEBHOOK_SECRET")?;
    let base_url = std::env::var("STOREBRIDGE_BASE_URL")
        .unwrap_or_else(|_| "https://www.wixapis.com".to_string());

    let settings = BridgeSettings {
        enabled: env_bool("STOREBRIDGE_ENABLED", true),
        sync_products: env_bool("STOREBRIDGE_SYNC_PRODUCTS", true),
        sync_inventory: env_bool("STOREBRIDGE_SYNC_INVENTORY", true),
        sync_orders: env_bool("STOREBRIDGE_SYNC_ORDERS", true),
        sync_customers: env_bool("STOREBRIDGE_SYNC_CUSTOMERS", true),
        ..BridgeSettings::default()
    };

    Ok(BridgeConfig {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        gateway: GatewayCredentials {
            app_id,
            app_secret,
            access_token,
            refresh_token,
            webhook_secret,
            base_url,
        },
        settings,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `BridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<BridgeConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BridgeError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BridgeError::Config("no config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BridgeError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<BridgeConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(BridgeError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory and up to two parent levels, then the
/// executable directory and its parents.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("storebridge.json"),
        dir.join("storebridge.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| BridgeError::Config(format!("missing required environment variable: {key}")))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
