//! SQLite-backed product mapping repository.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use storebridge_core::ProductMappingRepository;
use storebridge_domain::{BridgeError, ProductMapping, Result, SyncDirection, SyncStatus};
use tokio::task;

use super::manager::DbManager;
use super::{status_filter_clause, RowExt};
use crate::errors::InfraError;

/// SQLite product mapping repository.
pub struct SqliteProductMappingRepository {
    db: Arc<DbManager>,
}

impl SqliteProductMappingRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductMappingRepository for SqliteProductMappingRepository {
    async fn insert(&self, mapping: &ProductMapping) -> Result<()> {
        let db = Arc::clone(&self.db);
        let mapping = mapping.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            insert_mapping(&conn, &mapping)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn update(&self, mapping: &ProductMapping) -> Result<()> {
        let db = Arc::clone(&self.db);
        let mapping = mapping.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            update_mapping(&conn, &mapping)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn delete(&self, item_code: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let item_code = item_code.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute("DELETE FROM product_mapping WHERE item_code = ?1", params![item_code])
                .map_err(InfraError::from)?;
            Ok(())
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn get_by_item_code(&self, item_code: &str) -> Result<Option<ProductMapping>> {
        let db = Arc::clone(&self.db);
        let item_code = item_code.to_string();

        task::spawn_blocking(move || -> Result<Option<ProductMapping>> {
            let conn = db.get_connection()?;
            query_one(&conn, "item_code", &item_code)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn get_by_remote_id(&self, remote_product_id: &str) -> Result<Option<ProductMapping>> {
        let db = Arc::clone(&self.db);
        let remote_id = remote_product_id.to_string();

        task::spawn_blocking(move || -> Result<Option<ProductMapping>> {
            let conn = db.get_connection()?;
            query_one(&conn, "remote_product_id", &remote_id)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn list_by_status(&self, statuses: &[SyncStatus]) -> Result<Vec<ProductMapping>> {
        let db = Arc::clone(&self.db);
        let statuses = statuses.to_vec();

        task::spawn_blocking(move || -> Result<Vec<ProductMapping>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT * FROM product_mapping WHERE sync_status IN ({}) ORDER BY item_code",
                status_filter_clause(&statuses)
            );
            let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
            let rows = stmt
                .query_map([], map_row)
                .map_err(InfraError::from)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(InfraError::from)?;
            Ok(rows)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn list_all(&self) -> Result<Vec<ProductMapping>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<ProductMapping>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare("SELECT * FROM product_mapping ORDER BY item_code")
                .map_err(InfraError::from)?;
            let rows = stmt
                .query_map([], map_row)
                .map_err(InfraError::from)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(InfraError::from)?;
            Ok(rows)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<(SyncStatus, i64)>> {
            let conn = db.get_connection()?;
            super::query_status_counts(&conn, "product_mapping")
        })
        .await
        .map_err(InfraError::from)?
    }
}

fn insert_mapping(conn: &Connection, mapping: &ProductMapping) -> Result<()> {
    conn.execute(
        "INSERT INTO product_mapping (
            item_code, remote_product_id, remote_variant_id, sync_direction,
            sync_status, local_price, remote_price, local_stock_qty,
            remote_stock_qty, price_difference, stock_difference,
            last_sync_time, last_error_time, error_log, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            mapping.item_code,
            mapping.remote_product_id,
            mapping.remote_variant_id,
            mapping.sync_direction.as_str(),
            mapping.sync_status.as_str(),
            mapping.local_price,
            mapping.remote_price,
            mapping.local_stock_qty,
            mapping.remote_stock_qty,
            mapping.price_difference,
            mapping.stock_difference,
            mapping.last_sync_time,
            mapping.last_error_time,
            mapping.error_log,
            mapping.created_at,
            mapping.updated_at,
        ],
    )
    .map_err(InfraError::from)?;
    Ok(())
}

fn update_mapping(conn: &Connection, mapping: &ProductMapping) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE product_mapping SET
                remote_product_id = ?2, remote_variant_id = ?3, sync_direction = ?4,
                sync_status = ?5, local_price = ?6, remote_price = ?7,
                local_stock_qty = ?8, remote_stock_qty = ?9, price_difference = ?10,
                stock_difference = ?11, last_sync_time = ?12, last_error_time = ?13,
                error_log = ?14, updated_at = ?15
             WHERE item_code = ?1",
            params![
                mapping.item_code,
                mapping.remote_product_id,
                mapping.remote_variant_id,
                mapping.sync_direction.as_str(),
                mapping.sync_status.as_str(),
                mapping.local_price,
                mapping.remote_price,
                mapping.local_stock_qty,
                mapping.remote_stock_qty,
                mapping.price_difference,
                mapping.stock_difference,
                mapping.last_sync_time,
                mapping.last_error_time,
                mapping.error_log,
                mapping.updated_at,
            ],
        )
        .map_err(InfraError::from)?;
    if changed == 0 {
        return Err(BridgeError::NotFound(format!("product mapping {}", mapping.item_code)));
    }
    Ok(())
}

fn query_one(conn: &Connection, column: &str, value: &str) -> Result<Option<ProductMapping>> {
    let sql = format!("SELECT * FROM product_mapping WHERE {column} = ?1");
    match conn.query_row(&sql, params![value], map_row) {
        Ok(mapping) => Ok(Some(mapping)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(InfraError::from(err).into()),
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductMapping> {
    Ok(ProductMapping {
        item_code: row.get("item_code")?,
        remote_product_id: row.get("remote_product_id")?,
        remote_variant_id: row.get("remote_variant_id")?,
        sync_direction: row.get_direction("sync_direction")?,
        sync_status: row.get_status("sync_status")?,
        local_price: row.get("local_price")?,
        remote_price: row.get("remote_price")?,
        local_stock_qty: row.get("local_stock_qty")?,
        remote_stock_qty: row.get("remote_stock_qty")?,
        price_difference: row.get("price_difference")?,
        stock_difference: row.get("stock_difference")?,
        last_sync_time: row.get("last_sync_time")?,
        last_error_time: row.get("last_error_time")?,
        error_log: row.get("error_log")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
