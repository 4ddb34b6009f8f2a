//! The rowset container.
//!
//! A [`RowSet`] owns a loaded dataset together with the column definition
//! used to materialize it. Column definitions are derived on the first
//! `load` (or an explicit `define_columns`) and reused by later loads until
//! the column options change or columns are defined again.
//!
//! ```text
//! Unconfigured ──load──▶ Loaded ──load──▶ Loaded
//!      │                   │
//!      └──define_columns──▶ ColumnsDefined ──load──▶ Loaded
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rowset::{Dataset, OptionsPatch, RowSet};
//!
//! let mut rs = RowSet::with_options(OptionsPatch::new().active_columns("id"))?;
//! rs.load(Dataset::from_json(r#"{"COLUMNS":["ID","NAME"],"DATA":[[1,"a"]]}"#)?)?;
//! assert_eq!(rs.rows()[0]["id"], 1);
//! ```

use log::debug;
use serde_json::{Map, Value};

use crate::columns::{derive_columns, DerivedColumns};
use crate::config::{OptionsPatch, RowSetOptions};
use crate::error::RowSetResult;
use crate::models::{ColumnInfo, ColumnMap, Dataset};
use crate::observers::{Observer, ObserverRegistry, LOAD_EVENT};
use crate::transform::{materialize, RowBuilder};

/// Lifecycle stage of a [`RowSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSetState {
    /// No column definition.
    Unconfigured,
    /// Columns defined, no rows materialized with them yet.
    ColumnsDefined,
    /// Rows materialized with the current definition.
    Loaded,
}

#[derive(Debug, Clone)]
struct ColumnDefinition {
    columns: DerivedColumns,
    builder: RowBuilder,
}

/// Column definitions, materialized rows and observers for one dataset shape.
#[derive(Debug, Default)]
pub struct RowSet {
    column_names: Vec<String>,
    rows: Vec<Value>,
    definition: Option<ColumnDefinition>,
    options: RowSetOptions,
    observers: ObserverRegistry,
    generation: u64,
    loaded: bool,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rowset and apply `patch` to its fresh options.
    pub fn with_options(patch: OptionsPatch) -> RowSetResult<Self> {
        let mut rowset = Self::new();
        rowset.configure(patch)?;
        Ok(rowset)
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Merge `patch` into the current options.
    ///
    /// Changing the column list, metadata, active columns or decorator drops
    /// the current column definition; the next `load` derives a new one.
    pub fn configure(&mut self, mut patch: OptionsPatch) -> RowSetResult<&mut Self> {
        let observers = patch.observers.take();
        let reshaped = self.options.apply(patch)?;

        if let Some(observers) = observers {
            self.observers.replace(observers);
        }

        if reshaped && self.definition.is_some() {
            debug!("Column options changed, dropping column definition #{}", self.generation);
            self.definition = None;
            self.loaded = false;
        }

        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Definition & loading
    // -------------------------------------------------------------------------

    /// Derive columns from `dataset` and compile a new row builder.
    ///
    /// Always replaces the current definition and empties the row list. On
    /// error the previous definition and rows are kept.
    pub fn define_columns(&mut self, dataset: &Dataset) -> RowSetResult<&mut Self> {
        self.define(dataset.columns.clone())?;
        Ok(self)
    }

    /// Materialize `dataset` into keyed rows and notify observers of `load`.
    ///
    /// Columns are only derived when no definition exists. Otherwise the
    /// existing definition is reused and `dataset` must have the same column
    /// layout, since rows are read by position.
    ///
    /// If a row is malformed, rows before it stay materialized.
    pub fn load(&mut self, dataset: Dataset) -> RowSetResult<&mut Self> {
        let Dataset { columns, data } = dataset;

        if self.definition.is_none() {
            self.define(columns)?;
        }

        self.rows = data;
        self.loaded = false;

        if let Some(definition) = &self.definition {
            materialize(&mut self.rows, &definition.builder, self.options.decorator.as_ref())?;
        }
        self.loaded = true;

        self.notify_observers(LOAD_EVENT)?;
        Ok(self)
    }

    fn define(&mut self, mut columns: Vec<String>) -> RowSetResult<()> {
        let derived = derive_columns(
            &mut columns,
            self.options.column_source(),
            self.options.active_columns.as_ref(),
        )?;
        let builder = RowBuilder::compile(
            &derived.active_column_info,
            columns.len(),
            self.options.decorator.is_some(),
        );

        self.column_names = columns;
        self.definition = Some(ColumnDefinition {
            columns: derived,
            builder,
        });
        self.rows.clear();
        self.loaded = false;
        self.generation += 1;

        debug!(
            "Column definition #{} compiled ({} fields)",
            self.generation,
            self.row_builder().map_or(0, RowBuilder::len)
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    /// Register `observer`. Returns `false` if it was already registered.
    pub fn add_observer(&mut self, observer: Observer) -> bool {
        self.observers.add(observer)
    }

    /// Unregister `observer`. Returns `false` if it was not registered.
    pub fn remove_observer(&mut self, observer: &Observer) -> bool {
        self.observers.remove(observer)
    }

    /// Notify observers of `event` using the configured notify policy.
    pub fn notify_observers(&self, event: &str) -> RowSetResult<()> {
        self.observers.notify(event, self, self.options.notify_policy)
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    // -------------------------------------------------------------------------
    // Read surface
    // -------------------------------------------------------------------------

    /// Derived column names, one per dataset column.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Materialized rows.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Keyed row at `index`, if it has been materialized.
    pub fn row(&self, index: usize) -> Option<&Map<String, Value>> {
        self.rows.get(index).and_then(Value::as_object)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    /// Info for every column, keyed by field name.
    pub fn column_info(&self) -> Option<&ColumnMap> {
        self.definition.as_ref().map(|d| &d.columns.column_info)
    }

    /// Info for the columns present in materialized rows.
    pub fn active_column_info(&self) -> Option<&ColumnMap> {
        self.definition.as_ref().map(|d| &d.columns.active_column_info)
    }

    /// Look up a column by field name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.column_info().and_then(|info| info.get(name))
    }

    pub fn row_builder(&self) -> Option<&RowBuilder> {
        self.definition.as_ref().map(|d| &d.builder)
    }

    pub fn options(&self) -> &RowSetOptions {
        &self.options
    }

    pub fn state(&self) -> RowSetState {
        match (&self.definition, self.loaded) {
            (None, _) => RowSetState::Unconfigured,
            (Some(_), false) => RowSetState::ColumnsDefined,
            (Some(_), true) => RowSetState::Loaded,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.definition.is_some()
    }

    /// Number of column definitions derived so far.
    pub fn definition_generation(&self) -> u64 {
        self.generation
    }

    /// Take ownership of the materialized rows.
    pub fn into_rows(self) -> Vec<Value> {
        self.rows
    }

    /// Serialize the materialized rows as a JSON array.
    pub fn to_json(&self) -> RowSetResult<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }
}
