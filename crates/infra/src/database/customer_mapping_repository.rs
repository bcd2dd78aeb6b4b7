//! SQLite-backed customer mapping repository.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use storebridge_core::CustomerMappingRepository;
use storebridge_domain::{BridgeError, CustomerMapping, Result, SyncStatus};
use tokio::task;

use super::manager::DbManager;
use super::RowExt;
use crate::errors::InfraError;

/// SQLite customer mapping repository.
pub struct SqliteCustomerMappingRepository {
    db: Arc<DbManager>,
}

impl SqliteCustomerMappingRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerMappingRepository for SqliteCustomerMappingRepository {
    async fn insert(&self, mapping: &CustomerMapping) -> Result<()> {
        let db = Arc::clone(&self.db);
        let mapping = mapping.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            insert_mapping(&conn, &mapping)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn update(&self, mapping: &CustomerMapping) -> Result<()> {
        let db = Arc::clone(&self.db);
        let mapping = mapping.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            update_mapping(&conn, &mapping)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn delete(&self, local_id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let local_id = local_id.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute("DELETE FROM customer_mapping WHERE local_id = ?1", params![local_id])
                .map_err(InfraError::from)?;
            Ok(())
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn get_by_local_id(&self, local_id: &str) -> Result<Option<CustomerMapping>> {
        let db = Arc::clone(&self.db);
        let local_id = local_id.to_string();

        task::spawn_blocking(move || -> Result<Option<CustomerMapping>> {
            let conn = db.get_connection()?;
            query_one(&conn, "local_id", &local_id)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn get_by_remote_id(
        &self,
        remote_customer_id: &str,
    ) -> Result<Option<CustomerMapping>> {
        let db = Arc::clone(&self.db);
        let remote_id = remote_customer_id.to_string();

        task::spawn_blocking(move || -> Result<Option<CustomerMapping>> {
            let conn = db.get_connection()?;
            query_one(&conn, "remote_customer_id", &remote_id)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn status_counts(&self) -> Result<Vec<(SyncStatus, i64)>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<(SyncStatus, i64)>> {
            let conn = db.get_connection()?;
            super::query_status_counts(&conn, "customer_mapping")
        })
        .await
        .map_err(InfraError::from)?
    }
}

fn insert_mapping(conn: &Connection, mapping: &CustomerMapping) -> Result<()> {
    conn.execute(
        "INSERT INTO customer_mapping (
            local_id, remote_customer_id, local_name, local_email, local_phone,
            remote_first_name, remote_last_name, remote_email, remote_phone,
            sync_direction, sync_status, last_sync_time, last_error_time,
            error_log, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            mapping.local_id,
            mapping.remote_customer_id,
            mapping.local_name,
            mapping.local_email,
            mapping.local_phone,
            mapping.remote_first_name,
            mapping.remote_last_name,
            mapping.remote_email,
            mapping.remote_phone,
            mapping.sync_direction.as_str(),
            mapping.sync_status.as_str(),
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

fn update_mapping(conn: &Connection, mapping: &CustomerMapping) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE customer_mapping SET
                remote_customer_id = ?2, local_name = ?3, local_email = ?4,
                local_phone = ?5, remote_first_name = ?6, remote_last_name = ?7,
                remote_email = ?8, remote_phone = ?9, sync_direction = ?10,
                sync_status = ?11, last_sync_time = ?12, last_error_time = ?13,
                error_log = ?14, updated_at = ?15
             WHERE local_id = ?1",
            params![
                mapping.local_id,
                mapping.remote_customer_id,
                mapping.local_name,
                mapping.local_email,
                mapping.local_phone,
                mapping.remote_first_name,
                mapping.remote_last_name,
                mapping.remote_email,
                mapping.remote_phone,
                mapping.sync_direction.as_str(),
                mapping.sync_status.as_str(),
                mapping.last_sync_time,
                mapping.last_error_time,
                mapping.error_log,
                mapping.updated_at,
            ],
        )
        .map_err(InfraError::from)?;
    if changed == 0 {
        return Err(BridgeError::NotFound(format!("customer mapping {}", mapping.local_id)));
    }
    Ok(())
}

fn query_one(conn: &Connection, column: &str, value: &str) -> Result<Option<CustomerMapping>> {
    let sql = format!("SELECT * FROM customer_mapping WHERE {column} = ?1");
    match conn.query_row(&sql, params![value], map_row) {
        Ok(mapping) => Ok(Some(mapping)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(InfraError::from(err).into()),
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<CustomerMapping> {
    Ok(CustomerMapping {
        local_id: row.get("local_id")?,
        remote_customer_id: row.get("remote_customer_id")?,
        local_name: row.get("local_name")?,
        local_email: row.get("local_email")?,
        local_phone: row.get("local_phone")?,
        remote_first_name: row.get("remote_first_name")?,
        remote_last_name: row.get("remote_last_name")?,
        remote_email: row.get("remote_email")?,
        remote_phone: row.get("remote_phone")?,
        sync_direction: row.get_direction("sync_direction")?,
        sync_status: row.get_status("sync_status")?,
        last_sync_time: row.get("last_sync_time")?,
        last_error_time: row.get("last_error_time")?,
        error_log: row.get("error_log")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
