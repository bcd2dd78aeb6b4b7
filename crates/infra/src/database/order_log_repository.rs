//! SQLite-backed order sync log repository.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use storebridge_core::OrderSyncLogRepository;
use storebridge_domain::{BridgeError, OrderSyncLog, Result, SyncStatus};
use tokio::task;

use super::manager::DbManager;
use super::{status_filter_clause, RowExt};
use crate::errors::InfraError;

/// SQLite order sync log repository.
pub struct SqliteOrderSyncLogRepository {
    db: Arc<DbManager>,
}

impl SqliteOrderSyncLogRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderSyncLogRepository for SqliteOrderSyncLogRepository {
    async fn insert(&self, log: &OrderSyncLog) -> Result<()> {
        let db = Arc::clone(&self.db);
        let log = log.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            insert_log(&conn, &log)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn update(&self, log: &OrderSyncLog) -> Result<()> {
        let db = Arc::clone(&self.db);
        let log = log.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            update_log(&conn, &log)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn get_by_remote_order_id(&self, remote_order_id: &str) -> Result<Option<OrderSyncLog>> {
        let db = Arc::clone(&self.db);
        let remote_id = remote_order_id.to_string();

        task::spawn_blocking(move || -> Result<Option<OrderSyncLog>> {
            let conn = db.get_connection()?;
            query_one(&conn, "remote_order_id", &remote_id)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn get_by_local_order_id(&self, local_order_id: &str) -> Result<Option<OrderSyncLog>> {
        let db = Arc::clone(&self.db);
        let local_id = local_order_id.to_string();

        task::spawn_blocking(move || -> Result<Option<OrderSyncLog>> {
            let conn = db.get_connection()?;
            query_one(&conn, "local_order_id", &local_id)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn list_retryable(&self, max_retries: i64) -> Result<Vec<OrderSyncLog>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<OrderSyncLog>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM order_sync_log
                     WHERE local_order_id IS NULL AND retry_count < ?1
                     ORDER BY created_at",
                )
                .map_err(InfraError::from)?;
            let rows = stmt
                .query_map(params![max_retries], map_row)
                .map_err(InfraError::from)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(InfraError::from)?;
            Ok(rows)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn delete_older_than(&self, cutoff: i64, statuses: &[SyncStatus]) -> Result<usize> {
        let db = Arc::clone(&self.db);
        let statuses = statuses.to_vec();

        task::spawn_blocking(move || -> Result<usize> {
            let conn = db.get_connection()?;
            let sql = format!(
                "DELETE FROM order_sync_log
                 WHERE created_at < ?1 AND sync_status IN ({})",
                status_filter_clause(&statuses)
            );
            let removed = conn.execute(&sql, params![cutoff]).map_err(InfraError::from)?;
            Ok(removed)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<(SyncStatus, i64)>> {
            let conn = db.get_connection()?;
            super::query_status_counts(&conn, "order_sync_log")
        })
        .await
        .map_err(InfraError::from)?
    }
}

fn insert_log(conn: &Connection, log: &OrderSyncLog) -> Result<()> {
    conn.execute(
        "INSERT INTO order_sync_log (
            remote_order_id, remote_order_number, remote_customer_id,
            local_order_id, customer_local_id, order_total, order_items_count,
            payment_status, fulfillment_status, tracking_number, payload_json,
            sync_status, retry_count, error_log, created_at, last_sync_time,
            last_error_time
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            log.remote_order_id,
            log.remote_order_number,
            log.remote_customer_id,
            log.local_order_id,
            log.customer_local_id,
            log.order_total,
            log.order_items_count,
            log.payment_status,
            log.fulfillment_status,
            log.tracking_number,
            log.payload_json,
            log.sync_status.as_str(),
            log.retry_count,
            log.error_log,
            log.created_at,
            log.last_sync_time,
            log.last_error_time,
        ],
    )
    .map_err(InfraError::from)?;
    Ok(())
}

fn update_log(conn: &Connection, log: &OrderSyncLog) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE order_sync_log SET
                remote_order_number = ?2, remote_customer_id = ?3,
                local_order_id = ?4, customer_local_id = ?5, order_total = ?6,
                order_items_count = ?7, payment_status = ?8,
                fulfillment_status = ?9, tracking_number = ?10,
                payload_json = ?11, sync_status = ?12, retry_count = ?13,
                error_log = ?14, last_sync_time = ?15, last_error_time = ?16
             WHERE remote_order_id = ?1",
            params![
                log.remote_order_id,
                log.remote_order_number,
                log.remote_customer_id,
                log.local_order_id,
                log.customer_local_id,
                log.order_total,
                log.order_items_count,
                log.payment_status,
                log.fulfillment_status,
                log.tracking_number,
                log.payload_json,
                log.sync_status.as_str(),
                log.retry_count,
                log.error_log,
                log.last_sync_time,
                log.last_error_time,
            ],
        )
        .map_err(InfraError::from)?;
    if changed == 0 {
        return Err(BridgeError::NotFound(format!("order log {}", log.remote_order_id)));
    }
    Ok(())
}

fn query_one(conn: &Connection, column: &str, value: &str) -> Result<Option<OrderSyncLog>> {
    let sql = format!("SELECT * FROM order_sync_log WHERE {column} = ?1");
    match conn.query_row(&sql, params![value], map_row) {
        Ok(log) => Ok(Some(log)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(InfraError::from(err).into()),
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<OrderSyncLog> {
    Ok(OrderSyncLog {
        remote_order_id: row.get("remote_order_id")?,
        remote_order_number: row.get("remote_order_number")?,
        remote_customer_id: row.get("remote_customer_id")?,
        local_order_id: row.get("local_order_id")?,
        customer_local_id: row.get("customer_local_id")?,
        order_total: row.get("order_total")?,
        order_items_count: row.get("order_items_count")?,
        payment_status: row.get("payment_status")?,
        fulfillment_status: row.get("fulfillment_status")?,
        tracking_number: row.get("tracking_number")?,
        payload_json: row.get("payload_json")?,
        sync_status: row.get_status("sync_status")?,
        retry_count: row.get("retry_count")?,
        error_log: row.get("error_log")?,
        created_at: row.get("created_at")?,
        last_sync_time: row.get("last_sync_time")?,
        last_error_time: row.get("last_error_time")?,
    })
}
