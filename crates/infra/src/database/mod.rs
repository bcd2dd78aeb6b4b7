//! SQLite persistence: connection manager plus the mapping and order-log
//! repositories.
//!
//! Repositories run their SQL on the blocking pool; connections come from
//! the shared r2d2 pool owned by [`DbManager`].

mod customer_mapping_repository;
mod manager;
mod order_log_repository;
mod product_mapping_repository;

pub use customer_mapping_repository::SqliteCustomerMappingRepository;
pub use manager::DbManager;
pub use order_log_repository::SqliteOrderSyncLogRepository;
pub use product_mapping_repository::SqliteProductMappingRepository;

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use storebridge_domain::{Result, SyncDirection, SyncStatus};

use crate::errors::InfraError;

/// Build a quoted `IN (...)` list for a status filter. Status strings come
/// from `SyncStatus::as_str` and contain no quoting hazards.
pub(crate) fn status_filter_clause(statuses: &[SyncStatus]) -> String {
    statuses.iter().map(|s| format!("'{}'", s.as_str())).collect::<Vec<_>>().join(", ")
}

/// Aggregate per-status row counts for a table with a `sync_status` column.
pub(crate) fn query_status_counts(
    conn: &Connection,
    table: &str,
) -> Result<Vec<(SyncStatus, i64)>> {
    let sql = format!(
        "SELECT sync_status, COUNT(*) FROM {table} GROUP BY sync_status ORDER BY sync_status"
    );
    let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
    let rows = stmt
        .query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })
        .map_err(InfraError::from)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(InfraError::from)?;

    Ok(rows
        .into_iter()
        .filter_map(|(status, count)| SyncStatus::parse(&status).map(|s| (s, count)))
        .collect())
}

/// Typed accessors for the stored enum columns.
pub(crate) trait RowExt {
    fn get_direction(&self, column: &str) -> rusqlite::Result<SyncDirection>;
    fn get_status(&self, column: &str) -> rusqlite::Result<SyncStatus>;
}

impl RowExt for Row<'_> {
    fn get_direction(&self, column: &str) -> rusqlite::Result<SyncDirection> {
        let raw: String = self.get(column)?;
        SyncDirection::parse(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                Type::Text,
                format!("unknown sync direction: {raw}").into(),
            )
        })
    }

    fn get_status(&self, column: &str) -> rusqlite::Result<SyncStatus> {
        let raw: String = self.get(column)?;
        SyncStatus::parse(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                Type::Text,
                format!("unknown sync status: {raw}").into(),
            )
        })
    }
}
