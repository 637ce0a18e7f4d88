//! Record store adapters.
//!
//! The store is an append-only table whose first row is [`HEADER`]. Two
//! backends implement [`RecordStore`]: a Google Sheets worksheet and a local
//! SQLite file.

mod auth;
mod records;
mod schema;
mod sheets;

pub use auth::*;
pub use schema::*;
pub use sheets::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::models::{OpdRecord, RecordRow, HEADER, SCHEMA_VERSION};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid service-account key: {0}")]
    Credentials(#[from] jsonwebtoken::errors::Error),

    #[error("Token endpoint returned {status}: {body}")]
    TokenRequest { status: u16, body: String },

    #[error("No service-account key configured for the Sheets store")]
    MissingCredentials,

    #[error("Access token cache is poisoned")]
    TokenCachePoisoned,

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected header row: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Unsupported schema version {found} (expected {expected})")]
    SchemaVersion { expected: i64, found: i64 },
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::TokenCachePoisoned
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Append-only tabular store of OPD records.
pub trait RecordStore {
    /// Write one record as the last row, fields in [`HEADER`] order.
    fn append(&self, record: &OpdRecord) -> StoreResult<()>;

    /// Every data row (header excluded), oldest first.
    fn fetch_all(&self) -> StoreResult<Vec<RecordRow>>;

    /// Write the header row into an empty store. Returns whether anything was written.
    fn ensure_header(&self) -> StoreResult<bool> {
        Ok(false)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn append(&self, record: &OpdRecord) -> StoreResult<()> {
        (**self).append(record)
    }

    fn fetch_all(&self) -> StoreResult<Vec<RecordRow>> {
        (**self).fetch_all()
    }

    fn ensure_header(&self) -> StoreResult<bool> {
        (**self).ensure_header()
    }
}

/// Open the backend named by the configuration.
pub fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn RecordStore>> {
    match config {
        StoreConfig::Sheets(settings) => Ok(Box::new(SheetsStore::new(settings)?)),
        StoreConfig::Sqlite { path } => Ok(Box::new(Database::open(path)?)),
    }
}

/// Convert a raw cell grid (header row first) into data rows.
///
/// An empty grid or a header-only grid yields no rows. Fully blank rows are
/// skipped. The header must match [`HEADER`] exactly, ignoring trailing empty
/// cells.
pub fn records_from_grid(grid: &[Vec<String>]) -> StoreResult<Vec<RecordRow>> {
    let Some((header, data)) = grid.split_first() else {
        return Ok(Vec::new());
    };
    check_header(header)?;

    let mut rows = Vec::with_capacity(data.len());
    for (index, values) in data.iter().enumerate() {
        let row = RecordRow::from_cells(&HEADER, values.as_slice());
        if row.is_blank() {
            tracing::debug!(row = index + 2, "Skipping blank store row");
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Verify a header row against [`HEADER`].
pub fn check_header(header: &[String]) -> StoreResult<()> {
    let trimmed: Vec<&str> = {
        let mut cells: Vec<&str> = header.iter().map(String::as_str).collect();
        while cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        cells
    };

    if trimmed != HEADER {
        return Err(StoreError::HeaderMismatch {
            expected: HEADER.iter().map(|s| s.to_string()).collect(),
            found: header.to_vec(),
        });
    }
    Ok(())
}

/// SQLite-backed record store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create the schema on a fresh file, or verify the version of an existing one.
    fn initialize(&self) -> StoreResult<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        match version {
            0 => {
                self.conn.execute_batch(SCHEMA)?;
                self.conn
                    .pragma_update(None, "user_version", SCHEMA_VERSION)?;
            }
            v if v == SCHEMA_VERSION => self.conn.execute_batch(SCHEMA)?,
            found => {
                return Err(StoreError::SchemaVersion {
                    expected: SCHEMA_VERSION,
                    found,
                })
            }
        }
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
