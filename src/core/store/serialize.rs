//! SQLite serialization for typed job columns

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::entities::job::JobType;

impl ToSql for JobType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for JobType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(|e: String| {
            FromSqlError::Other(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            )))
        })
    }
}

/// Split a value at an ERP column width; the remainder is returned separately
pub fn split_at_width(value: &str, width: usize) -> (String, Option<String>) {
    match value.char_indices().nth(width) {
        Some((idx, _)) => (value[..idx].to_string(), Some(value[idx..].to_string())),
        None => (value.to_string(), None),
    }
}

/// Truncate a value to an ERP column width
pub fn fit(value: &str, width: usize) -> String {
    split_at_width(value, width).0
}
