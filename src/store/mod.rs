// Server-side asset store backed by SQLite
pub mod error;
pub mod models;
mod schema;
mod reference;
mod assets;
mod components;
mod events;
mod approval;
mod ingest;

use std::fs::create_dir_all;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use log::{debug, error};
use rusqlite::Connection;

pub use error::StoreError;
pub use ingest::IngestOutcome;

/// One SQLite connection with every table created and foreign keys enforced.
pub struct AssetStore {
    conn: Connection,
}

impl AssetStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<AssetStore, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent).map_err(|err| {
                    error!("[store] Could not create database directory {parent:?}: {err:?}");
                    StoreError::OpenDatabase(path.display().to_string())
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|err| {
            error!("[store] Could not open {path:?}: {err:?}");
            StoreError::OpenDatabase(path.display().to_string())
        })?;
        debug!("[store] Opened database {path:?}");
        AssetStore::setup(conn)
    }

    pub fn open_in_memory() -> Result<AssetStore, StoreError> {
        let conn = Connection::open_in_memory()?;
        AssetStore::setup(conn)
    }

    fn setup(conn: Connection) -> Result<AssetStore, StoreError> {
        schema::setup_tables(&conn)?;
        Ok(AssetStore { conn })
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
