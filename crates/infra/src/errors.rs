//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use storebridge_domain::BridgeError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BridgeError);

impl From<InfraError> for BridgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BridgeError> for InfraError {
    fn from(value: BridgeError) -> Self {
        Self(value)
    }
}

impl From<SqlError> for InfraError {
    fn from(err: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let mapped = match err {
            RE::SqliteFailure(code, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (code.code, code.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        BridgeError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        BridgeError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        BridgeError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        BridgeError::Database("foreign key constraint violation".into())
                    }
                    _ => BridgeError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        code.code, code.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => BridgeError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                BridgeError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                BridgeError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidQuery => BridgeError::Database("invalid SQL query".into()),
            other => BridgeError::Database(other.to_string()),
        };
        Self(mapped)
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(err: r2d2::Error) -> Self {
        Self(BridgeError::Database(format!("connection pool error: {err}")))
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let mapped = if err.is_timeout() {
            BridgeError::Network("request timed out".into())
        } else if err.is_connect() {
            BridgeError::Network(format!("connection failed: {err}"))
        } else if err.is_builder() {
            BridgeError::Internal(format!("http client misconfigured: {err}"))
        } else {
            BridgeError::Network(err.to_string())
        };
        Self(mapped)
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(err: serde_json::Error) -> Self {
        Self(BridgeError::InvalidInput(format!("malformed JSON: {err}")))
    }
}

impl From<tokio::task::JoinError> for InfraError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self(BridgeError::Internal(format!("blocking task failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_maps_to_not_found() {
        let err: BridgeError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }

    #[test]
    fn json_error_maps_to_invalid_input() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BridgeError = InfraError::from(json_err).into();
        assert!(matches!(err, BridgeError::InvalidInput(_)));
    }
}
