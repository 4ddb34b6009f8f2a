//! RowSet configuration.
//!
//! [`RowSetOptions`] is the effective configuration owned by one
//! [`RowSet`](crate::RowSet). [`OptionsPatch`] is what callers pass to
//! `configure`: only the fields it sets are merged, everything else is kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use rowset::OptionsPatch;
//!
//! let patch = OptionsPatch::from_json(r#"{ "columns": "userId,name", "activeColumns": "name" }"#)?;
//! let patch = patch.decorator(|row, i| { row.insert("n".into(), i.into()); });
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::columns::{ActiveColumns, ColumnSource};
use crate::error::RowSetResult;
use crate::models::ColumnMeta;
use crate::observers::{NotifyPolicy, Observer};
use crate::parser::parse_name_list;
use crate::transform::RowDecorator;

// =============================================================================
// Effective Options
// =============================================================================

/// Configuration of one rowset. Never shared between instances.
#[derive(Debug, Clone, Default)]
pub struct RowSetOptions {
    /// Explicit field names, one per dataset column.
    pub column_list: Option<Vec<String>>,
    /// Field names and type labels, one per dataset column. Wins over `column_list`.
    pub metadata: Option<Vec<ColumnMeta>>,
    /// Field names kept in materialized rows.
    pub active_columns: Option<ActiveColumns>,
    /// Hook run on every materialized row.
    pub decorator: Option<RowDecorator>,
    /// Observer failure handling.
    pub notify_policy: NotifyPolicy,
}

impl RowSetOptions {
    /// Naming source selected by the current options.
    pub fn column_source(&self) -> ColumnSource<'_> {
        ColumnSource::select(self.metadata.as_deref(), self.column_list.as_deref())
    }

    /// Merge `patch` into these options.
    ///
    /// Returns `true` when a column-shaping option (names, metadata, active
    /// columns or decorator) changed, meaning existing column definitions are
    /// stale. Observers in the patch are not handled here. Nothing is changed
    /// if a name list fails to parse.
    pub fn apply(&mut self, patch: OptionsPatch) -> RowSetResult<bool> {
        let column_list = patch
            .columns
            .as_deref()
            .map(parse_name_list)
            .transpose()?
            .map(|names| Some(names).filter(|n| !n.is_empty()));
        let active_columns = patch
            .active_columns
            .as_deref()
            .map(ActiveColumns::parse)
            .transpose()?
            .map(|filter| Some(filter).filter(|f| !f.is_empty()));
        let metadata = patch.metadata.map(|meta| Some(meta).filter(|m| !m.is_empty()));

        let mut reshaped = false;

        if let Some(column_list) = column_list {
            reshaped |= self.column_list != column_list;
            self.column_list = column_list;
        }
        if let Some(metadata) = metadata {
            reshaped |= self.metadata != metadata;
            self.metadata = metadata;
        }
        if let Some(active_columns) = active_columns {
            reshaped |= self.active_columns != active_columns;
            self.active_columns = active_columns;
        }
        if let Some(decorator) = patch.decorator {
            reshaped |= !self
                .decorator
                .as_ref()
                .is_some_and(|current| current.same_as(&decorator));
            self.decorator = Some(decorator);
        }
        if let Some(policy) = patch.notify_policy {
            self.notify_policy = policy;
        }

        Ok(reshaped)
    }
}

// =============================================================================
// Options Patch
// =============================================================================

/// Partial options merged by `configure`.
///
/// From JSON, the recognized keys are `columns`, `metadata`, `activeColumns`
/// and `notifyPolicy`; anything else is ignored. A blank `columns` or
/// `activeColumns` string, or an empty `metadata` list, clears that option.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsPatch {
    /// Comma-delimited field names.
    pub columns: Option<String>,
    pub metadata: Option<Vec<ColumnMeta>>,
    /// Comma-delimited names of the columns to keep.
    pub active_columns: Option<String>,
    pub notify_policy: Option<NotifyPolicy>,
    #[serde(skip)]
    pub decorator: Option<RowDecorator>,
    /// Replaces the registered observers.
    #[serde(skip)]
    pub observers: Option<Vec<Observer>>,
}

impl OptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch from a JSON options object.
    pub fn from_json(json: &str) -> RowSetResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a patch from an already-parsed JSON value.
    pub fn from_value(value: Value) -> RowSetResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn metadata(mut self, metadata: Vec<ColumnMeta>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn active_columns(mut self, active: impl Into<String>) -> Self {
        self.active_columns = Some(active.into());
        self
    }

    pub fn decorator<F>(mut self, decorate: F) -> Self
    where
        F: Fn(&mut Map<String, Value>, usize) + Send + Sync + 'static,
    {
        self.decorator = Some(RowDecorator::new(decorate));
        self
    }

    /// Use an existing decorator handle.
    pub fn with_decorator(mut self, decorator: RowDecorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn observers(mut self, observers: Vec<Observer>) -> Self {
        self.observers = Some(observers);
        self
    }

    pub fn notify_policy(mut self, policy: NotifyPolicy) -> Self {
        self.notify_policy = Some(policy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_options() {
        let opts = RowSetOptions::default();
        assert!(opts.column_list.is_none());
        assert!(opts.metadata.is_none());
        assert!(opts.active_columns.is_none());
        assert!(opts.decorator.is_none());
        assert_eq!(opts.notify_policy, NotifyPolicy::Halt);
        assert_eq!(opts.column_source(), ColumnSource::Default);
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let patch = OptionsPatch::from_value(json!({
            "columns": "userId,name",
            "activeColumns": "name",
            "notifyPolicy": "continue",
            "somethingElse": 42
        }))
        .unwrap();

        assert_eq!(patch.columns.as_deref(), Some("userId,name"));
        assert_eq!(patch.active_columns.as_deref(), Some("name"));
        assert_eq!(patch.notify_policy, Some(NotifyPolicy::Continue));
    }

    #[test]
    fn test_apply_parses_lists() {
        let mut opts = RowSetOptions::default();
        let reshaped = opts
            .apply(OptionsPatch::new().columns("userId, name").active_columns("name"))
            .unwrap();

        assert!(reshaped);
        assert_eq!(opts.column_list, Some(vec!["userId".to_string(), "name".to_string()]));
        assert!(opts.active_columns.as_ref().unwrap().contains("name"));
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut opts = RowSetOptions::default();
        opts.apply(OptionsPatch::new().columns("a,b")).unwrap();
        opts.apply(OptionsPatch::new().notify_policy(NotifyPolicy::Continue)).unwrap();

        assert_eq!(opts.column_list.as_ref().map(Vec::len), Some(2));
        assert_eq!(opts.notify_policy, NotifyPolicy::Continue);
    }

    #[test]
    fn test_apply_same_values_not_reshaped() {
        let mut opts = RowSetOptions::default();
        assert!(opts.apply(OptionsPatch::new().columns("a,b")).unwrap());
        assert!(!opts.apply(OptionsPatch::new().columns("a, b")).unwrap());
        assert!(!opts.apply(OptionsPatch::new().notify_policy(NotifyPolicy::Continue)).unwrap());
    }

    #[test]
    fn test_blank_string_clears() {
        let mut opts = RowSetOptions::default();
        opts.apply(OptionsPatch::new().columns("a").active_columns("a")).unwrap();
        assert!(opts.apply(OptionsPatch::new().columns("").active_columns(" ")).unwrap());
        assert!(opts.column_list.is_none());
        assert!(opts.active_columns.is_none());
    }

    #[test]
    fn test_metadata_wins_in_column_source() {
        let mut opts = RowSetOptions::default();
        opts.apply(
            OptionsPatch::new()
                .columns("x")
                .metadata(vec![ColumnMeta::typed("id", "integer")]),
        )
        .unwrap();
        assert!(matches!(opts.column_source(), ColumnSource::Metadata(_)));
    }

    #[test]
    fn test_decorator_identity_controls_reshape() {
        let decorator = RowDecorator::new(|_, _| {});
        let mut opts = RowSetOptions::default();

        assert!(opts.apply(OptionsPatch::new().with_decorator(decorator.clone())).unwrap());
        assert!(!opts.apply(OptionsPatch::new().with_decorator(decorator)).unwrap());
        assert!(opts.apply(OptionsPatch::new().decorator(|_, _| {})).unwrap());
    }

    #[test]
    fn test_invalid_list_leaves_options_untouched() {
        let mut opts = RowSetOptions::default();
        opts.apply(OptionsPatch::new().columns("a")).unwrap();

        let result = opts.apply(OptionsPatch::new().columns("b").active_columns("x\ny"));
        assert!(result.is_err());
        assert_eq!(opts.column_list, Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_fresh_options_per_instance() {
        let mut first = RowSetOptions::default();
        first.apply(OptionsPatch::new().columns("a")).unwrap();
        let second = RowSetOptions::default();
        assert!(second.column_list.is_none());
    }
}
