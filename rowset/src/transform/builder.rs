//! Row builder compilation.
//!
//! A [`RowBuilder`] is compiled once per column definition from the active
//! column map. It holds the ordered `(field name, source index)` slots and
//! whether a decorator call is part of its shape, so building a row is a
//! single pass over the slots with no name lookups or filter checks.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::models::ColumnMap;

// =============================================================================
// Row Decorator
// =============================================================================

type DecoratorFn = dyn Fn(&mut Map<String, Value>, usize) + Send + Sync;

/// Caller hook run on each built row with its row index.
#[derive(Clone)]
pub struct RowDecorator(Arc<DecoratorFn>);

impl RowDecorator {
    pub fn new<F>(decorate: F) -> Self
    where
        F: Fn(&mut Map<String, Value>, usize) + Send + Sync + 'static,
    {
        Self(Arc::new(decorate))
    }

    pub fn apply(&self, row: &mut Map<String, Value>, row_index: usize) {
        (self.0)(row, row_index);
    }

    /// Whether both handles point at the same closure.
    pub fn same_as(&self, other: &RowDecorator) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RowDecorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RowDecorator(..)")
    }
}

// =============================================================================
// Row Builder
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldSlot {
    name: String,
    index: usize,
}

/// Builds keyed rows for one column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBuilder {
    slots: Vec<FieldSlot>,
    width: usize,
    decorated: bool,
}

impl RowBuilder {
    /// Compile a builder for the given active columns.
    ///
    /// `width` is the dataset's total column count; `decorated` embeds the
    /// decorator call in every built row.
    pub fn compile(active: &ColumnMap, width: usize, decorated: bool) -> Self {
        let slots = active
            .iter()
            .map(|(name, info)| FieldSlot {
                name: name.clone(),
                index: info.index,
            })
            .collect();

        Self {
            slots,
            width,
            decorated,
        }
    }

    /// Build a keyed row from one raw value array.
    ///
    /// Values are moved out of `values`; a slot beyond its end yields `null`.
    pub fn build(
        &self,
        mut values: Vec<Value>,
        row_index: usize,
        decorator: Option<&RowDecorator>,
    ) -> Map<String, Value> {
        let mut row = Map::with_capacity(self.slots.len());

        for slot in &self.slots {
            let value = values.get_mut(slot.index).map(Value::take).unwrap_or(Value::Null);
            row.insert(slot.name.clone(), value);
        }

        if self.decorated {
            if let Some(decorator) = decorator {
                decorator.apply(&mut row, row_index);
            }
        }

        row
    }

    /// Ordered `(field name, source index)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots.iter().map(|slot| (slot.name.as_str(), slot.index))
    }

    /// Column count of the rows this builder expects.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_decorated(&self) -> bool {
        self.decorated
    }

    /// Number of fields in each built row.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
