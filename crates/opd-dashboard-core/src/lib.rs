//! OPD Dashboard Core Library
//!
//! Outpatient-department visit records for an Ayurvedic clinic: entry-form
//! validation, an append-only record store and the overview statistics.
//!
//! # Architecture
//!
//! ```text
//!   Entry form ──validate──▶ OpdRecord ──append──▶ ┌──────────────────────┐
//!                                                  │     RecordStore      │
//!                                                  │  Sheets  │  SQLite   │
//!                                                  └──────────┬───────────┘
//!                                                             │ fetch_all
//!                                                             ▼
//!                                                      Vec<RecordRow>
//!                                                             │
//!                                   ┌─────────────────────────┼──────────────┐
//!                                   ▼                         ▼              ▼
//!                           OverviewSnapshot             CSV / JSON     Prompt builder
//!                        (date filter, counts)            export       (llm crate)
//! ```
//!
//! # Core Principle
//!
//! **Records are append-only.** There is no update or delete; every overview
//! is recomputed from a fresh `fetch_all`.
//!
//! # Modules
//!
//! - [`models`]: OPD record, enumerations, entry form and store rows
//! - [`store`]: Record store trait with Google Sheets and SQLite backends
//! - [`overview`]: Date filtering and frequency aggregation
//! - [`session`]: View selection and form submission
//! - [`export`]: CSV and JSON export
//! - [`config`]: Configuration file and secrets

pub mod config;
pub mod export;
pub mod models;
pub mod overview;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::{
    AppConfig, ConfigError, InferenceConfig, ServiceAccountKey, SheetsSettings, StoreConfig,
};
pub use models::{
    EntryForm, FollowUp, Gender, OpdRecord, Prakriti, RecordError, RecordRow, HEADER,
    SCHEMA_VERSION,
};
pub use overview::{FrequencyTable, OverviewSnapshot};
pub use session::{OverviewPage, Session, View};
pub use store::{
    open_store, Database, RecordStore, ServiceAccountAuth, SheetsStore, StoreError, StoreResult,
};

use thiserror::Error;

/// Errors from dashboard actions that span validation and storage.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid entry: {0}")]
    Validation(#[from] RecordError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
