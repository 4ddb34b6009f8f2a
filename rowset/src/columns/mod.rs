//! Column derivation.
//!
//! Assigns every dataset column a field name, its source position and an
//! optional type label, then narrows the result to the active columns.
//!
//! ```text
//! ┌───────────────┐     ┌──────────────┐     ┌─────────────────────┐
//! │ dataset names │────▶│ ColumnSource │────▶│ column_info         │
//! │ ["ID","Name"] │     │ meta > list  │     │ active_column_info  │
//! └───────────────┘     │ > lowercase  │     └─────────────────────┘
//!                       └──────────────┘
//! ```

use indexmap::IndexSet;
use log::{debug, warn};

use crate::error::{ColumnSourceKind, RowSetError, RowSetResult};
use crate::models::{ColumnInfo, ColumnMap, ColumnMeta};
use crate::parser::parse_name_list;

// =============================================================================
// Column Source
// =============================================================================

/// Where field names come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource<'a> {
    /// Names and type labels from metadata, used verbatim.
    Metadata(&'a [ColumnMeta]),
    /// Names from an explicit list, used verbatim.
    NameList(&'a [String]),
    /// The dataset's own column names, lower-cased.
    Default,
}

impl<'a> ColumnSource<'a> {
    /// Pick the source: metadata wins over a name list, which wins over the default.
    pub fn select(metadata: Option<&'a [ColumnMeta]>, names: Option<&'a [String]>) -> Self {
        match (metadata, names) {
            (Some(meta), _) => ColumnSource::Metadata(meta),
            (None, Some(names)) => ColumnSource::NameList(names),
            (None, None) => ColumnSource::Default,
        }
    }

    pub fn kind(&self) -> Option<ColumnSourceKind> {
        match self {
            ColumnSource::Metadata(_) => Some(ColumnSourceKind::Metadata),
            ColumnSource::NameList(_) => Some(ColumnSourceKind::NameList),
            ColumnSource::Default => None,
        }
    }

    /// Number of names the source supplies, if it supplies its own.
    fn len(&self) -> Option<usize> {
        match self {
            ColumnSource::Metadata(meta) => Some(meta.len()),
            ColumnSource::NameList(names) => Some(names.len()),
            ColumnSource::Default => None,
        }
    }

    /// Field name and type label for position `index`.
    fn resolve(&self, index: usize, original: &str) -> (String, Option<String>) {
        match self {
            ColumnSource::Metadata(meta) => {
                let meta = &meta[index];
                (meta.name.clone(), meta.type_name.clone())
            }
            ColumnSource::NameList(names) => (names[index].clone(), None),
            ColumnSource::Default => (original.to_lowercase(), None),
        }
    }
}

// =============================================================================
// Active Columns
// =============================================================================

/// Field names retained in materialized rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveColumns {
    names: IndexSet<String>,
}

impl ActiveColumns {
    /// Parse a comma-delimited filter such as `"a,c"`.
    pub fn parse(list: &str) -> RowSetResult<Self> {
        Ok(parse_name_list(list)?.into_iter().collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveColumns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Derivation
// =============================================================================

/// Output of one derivation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedColumns {
    /// Every column, keyed by field name.
    pub column_info: ColumnMap,
    /// Columns passing the active filter (all of them without a filter).
    pub active_column_info: ColumnMap,
}

/// Derive field names and column info for a dataset's columns.
///
/// `column_names` is rewritten in place with the derived names. The length
/// of an explicit source is checked before anything is written, so a
/// mismatch leaves `column_names` untouched.
///
/// Two positions deriving the same field name are not rejected: the later
/// position replaces the earlier entry, keeping the earlier slot in the map.
pub fn derive_columns(
    column_names: &mut [String],
    source: ColumnSource<'_>,
    active: Option<&ActiveColumns>,
) -> RowSetResult<DerivedColumns> {
    let expected = column_names.len();

    if let (Some(kind), Some(provided)) = (source.kind(), source.len()) {
        if provided != expected {
            return Err(RowSetError::ColumnCountMismatch {
                source_kind: kind,
                provided,
                expected,
            });
        }
    }

    let mut derived = DerivedColumns::default();

    for (index, slot) in column_names.iter_mut().enumerate() {
        let (name, type_name) = source.resolve(index, slot);
        *slot = name.clone();

        let info = ColumnInfo {
            index,
            name: name.clone(),
            type_name,
        };

        if active.map_or(true, |filter| filter.contains(&name)) {
            derived.active_column_info.insert(name.clone(), info.clone());
        }
        if let Some(previous) = derived.column_info.insert(name, info) {
            warn!(
                "Column {} derives field '{}' already used by column {}; keeping the later column",
                index, previous.name, previous.index
            );
        }
    }

    debug!(
        "Derived {} columns ({} active) from {}",
        derived.column_info.len(),
        derived.active_column_info.len(),
        source.kind().map_or_else(|| "dataset names".to_string(), |k| k.to_string()),
    );

    Ok(derived)
}
