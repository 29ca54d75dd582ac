use std::fmt;

use rusqlite::ErrorCode;

#[derive(Debug)]
pub enum StoreError {
    /// A UNIQUE, CHECK, NOT NULL or foreign key constraint rejected the write
    Constraint(String),
    InvalidChoice { field: &'static str, value: String },
    InvalidValue { field: &'static str, value: String },
    NotFound(String),
    BadReport(String),
    OpenDatabase(String),
    Sqlite(rusqlite::Error),
}

impl std::error::Error for StoreError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Constraint(msg) => write!(f, "Constraint violation: {msg}"),
            StoreError::InvalidChoice { field, value } => {
                write!(f, "Invalid value '{value}' for choice field {field}")
            }
            StoreError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field {field}")
            }
            StoreError::NotFound(what) => write!(f, "Not found: {what}"),
            StoreError::BadReport(msg) => write!(f, "Bad asset report: {msg}"),
            StoreError::OpenDatabase(path) => write!(f, "Could not open database {path}"),
            StoreError::Sqlite(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) if code.code == ErrorCode::ConstraintViolation => {
                StoreError::Constraint(msg.unwrap_or_else(|| code.to_string()))
            }
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound("no matching row".to_string()),
            // Choice columns report their own error through FromSql
            rusqlite::Error::FromSqlConversionFailure(index, kind, inner) => {
                match inner.downcast::<StoreError>() {
                    Ok(store_err) => *store_err,
                    Err(inner) => {
                        StoreError::Sqlite(rusqlite::Error::FromSqlConversionFailure(index, kind, inner))
                    }
                }
            }
            other => StoreError::Sqlite(other),
        }
    }
}
