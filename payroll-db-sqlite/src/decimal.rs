//! Decimal column helpers for SQLite rows.
//!
//! SQLite has no decimal storage class; monetary columns arrive as INTEGER
//! or REAL depending on how the value was written. These helpers normalise
//! either class into `rust_decimal::Decimal` and reject anything else.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

use payroll_core::RepositoryError;

/// Reads a nullable decimal column; NULL becomes `None`.
pub(crate) fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let raw = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("column '{column}' not found: {e}")))?;

    if raw.is_null() {
        return Ok(None);
    }

    let type_info = raw.type_info();
    match type_info.name() {
        "INTEGER" => {
            let value: i64 = row
                .try_get(column)
                .map_err(|e| RepositoryError::Database(format!("column '{column}': {e}")))?;
            Ok(Some(Decimal::from(value)))
        }
        "REAL" => {
            let value: f64 = row
                .try_get(column)
                .map_err(|e| RepositoryError::Database(format!("column '{column}': {e}")))?;
            Decimal::try_from(value).map(Some).map_err(|e| {
                RepositoryError::Database(format!(
                    "column '{column}': cannot represent {value} as decimal: {e}"
                ))
            })
        }
        other => Err(RepositoryError::Database(format!(
            "column '{column}' has unexpected type '{other}'"
        ))),
    }
}

/// Reads a decimal column, treating NULL as zero.
pub(crate) fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    Ok(get_optional_decimal(row, column)?.unwrap_or(Decimal::ZERO))
}

/// Converts a decimal to f64 for SQLite storage.
pub(crate) fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
