//! # Rowset - keyed rows from column/row query results
//!
//! Rowset turns a query result serialized as a column-name list plus
//! positional row arrays into an array of keyed row objects, rewriting the
//! rows in place and notifying observers when a load completes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Dataset   │────▶│   Columns   │────▶│ RowBuilder  │────▶│ Materialize │──▶ observers
//! │ COLUMNS/DATA│     │ (derive)    │     │ (compile)   │     │ (in place)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rowset::{Dataset, OptionsPatch, RowSet};
//!
//! let dataset = Dataset::from_json(r#"{"COLUMNS":["ID","UserName"],"DATA":[[1,"ann"]]}"#)?;
//! let mut rs = RowSet::with_options(OptionsPatch::new().columns("userId,name"))?;
//! rs.load(dataset)?;
//! assert_eq!(rs.rows()[0]["name"], "ann");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error type and result aliases
//! - [`models`] - Dataset, column metadata and column info
//! - [`parser`] - Delimited name lists
//! - [`columns`] - Column derivation
//! - [`transform`] - Row builder compilation and materialization
//! - [`config`] - Options and option patches
//! - [`observers`] - Observer registry
//! - [`rowset`] - The container tying it together
//!
//! A [`RowSet`] is single-owner and does no internal locking; wrap it in a
//! lock to share it between threads.

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Column derivation
pub mod columns;

// Row construction
pub mod transform;

// Configuration
pub mod config;

// Notification
pub mod observers;

// Container
pub mod rowset;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ColumnSourceKind,
    ObserverError,
    ObserverResult,
    RowSetError,
    RowSetResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ColumnInfo,
    ColumnMap,
    ColumnMeta,
    Dataset,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::parse_name_list;

// =============================================================================
// Re-exports - Columns
// =============================================================================

pub use columns::{
    derive_columns,
    ActiveColumns,
    ColumnSource,
    DerivedColumns,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    materialize,
    RowBuilder,
    RowDecorator,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{OptionsPatch, RowSetOptions};

// =============================================================================
// Re-exports - Observers
// =============================================================================

pub use observers::{
    HandlerTable,
    NotifyPolicy,
    Observer,
    ObserverRegistry,
    LOAD_EVENT,
};

// =============================================================================
// Re-exports - RowSet
// =============================================================================

pub use rowset::{RowSet, RowSetState};
