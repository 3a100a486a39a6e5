//! Rows of the flat store and the data they carry.

use std::collections::BTreeMap;

use super::value::CellValue;

/// Whether a row starts a hierarchy or hangs below another row.
///
/// Computed once when the row is created from its raw `parent` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Top-level row.
    Root,
    /// Child of the row at the given store index.
    Child(usize),
}

impl RowKind {
    /// Interprets a raw parent field: absent or negative (`-1`) means root.
    pub fn from_parent_field(parent: Option<i64>) -> Self {
        match parent.and_then(|p| usize::try_from(p).ok()) {
            Some(index) => RowKind::Child(index),
            None => RowKind::Root,
        }
    }

    /// The referenced parent index, if any.
    pub fn parent(self) -> Option<usize> {
        match self {
            RowKind::Root => None,
            RowKind::Child(parent) => Some(parent),
        }
    }
}

/// Column access for row payloads.
///
/// Filters read cells by column name. The [`Record`] map implements this
/// out of the box; application types implement it directly or are paired
/// with a value getter on the grid.
pub trait RowData {
    /// Value of `column`, or [`CellValue::None`] when the row has no such column.
    fn cell(&self, column: &str) -> CellValue;

    /// Columns a text filter scans when it is not restricted to a set.
    fn columns(&self) -> Vec<String> {
        Vec::new()
    }

    /// Short text identifying the row in debug output.
    fn label(&self) -> String {
        String::new()
    }
}

/// A schemaless row payload keyed by column name.
pub type Record = BTreeMap<String, CellValue>;

impl RowData for Record {
    fn cell(&self, column: &str) -> CellValue {
        self.get(column).cloned().unwrap_or_default()
    }

    fn columns(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn label(&self) -> String {
        self.get("name")
            .or_else(|| self.values().next())
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// One row of the flat store.
///
/// Only the expansion flag changes after ingestion; everything hierarchical
/// is derived into an [`Annotations`](super::Annotations) side table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    index: usize,
    kind: RowKind,
    data: T,
    expanded: Option<bool>,
}

impl<T> Row<T> {
    /// Creates a top-level row.
    pub fn root(data: T) -> Self {
        Self::new(RowKind::Root, data)
    }

    /// Creates a row below the row at store index `parent`.
    pub fn child(parent: usize, data: T) -> Self {
        Self::new(RowKind::Child(parent), data)
    }

    /// Creates a row with an explicit kind.
    pub fn new(kind: RowKind, data: T) -> Self {
        Self {
            index: 0,
            kind,
            data,
            expanded: None,
        }
    }

    /// Creates a row from a data source's raw parent field.
    ///
    /// ```
    /// use horizon_treegrid::model::{Row, RowKind};
    ///
    /// assert_eq!(Row::from_parent_field(Some(-1), ()).kind(), RowKind::Root);
    /// assert_eq!(Row::from_parent_field(Some(4), ()).kind(), RowKind::Child(4));
    /// ```
    pub fn from_parent_field(parent: Option<i64>, data: T) -> Self {
        Self::new(RowKind::from_parent_field(parent), data)
    }

    /// Sets the expansion flag supplied by the data source.
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Position in the store. Stable until the next full reload.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Root or child, as ingested.
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    /// Parent index referenced by the raw data. It may dangle; the resolved
    /// parent lives in the annotation.
    pub fn parent(&self) -> Option<usize> {
        self.kind.parent()
    }

    /// The payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consumes the row, returning the payload.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Expansion flag: `None` for rows without a toggle.
    pub fn expanded(&self) -> Option<bool> {
        self.expanded
    }

    /// Whether the row is a parent that is currently open.
    pub fn is_expanded(&self) -> bool {
        self.expanded == Some(true)
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_expanded(&mut self, expanded: Option<bool>) {
        self.expanded = expanded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_parent_field() {
        assert_eq!(RowKind::from_parent_field(None), RowKind::Root);
        assert_eq!(RowKind::from_parent_field(Some(-1)), RowKind::Root);
        assert_eq!(RowKind::from_parent_field(Some(0)), RowKind::Child(0));
        assert_eq!(RowKind::Child(3).parent(), Some(3));
    }

    #[test]
    fn test_row_defaults() {
        let row = Row::child(2, "payload");
        assert_eq!(row.parent(), Some(2));
        assert_eq!(row.expanded(), None);
        assert!(!row.is_expanded());
        assert!(Row::root(()).with_expanded(true).is_expanded());
    }

    #[test]
    fn test_record_data() {
        let mut record = Record::new();
        record.insert("name".into(), "nightly backup".into());
        record.insert("status".into(), "Failed".into());

        assert_eq!(record.cell("status"), CellValue::from("Failed"));
        assert!(record.cell("missing").is_none());
        assert_eq!(record.columns(), vec!["name".to_string(), "status".to_string()]);
        assert_eq!(record.label(), "nightly backup");
    }
}
