//! Visibility filtering.
//!
//! [`VisibilityFilter`] maps the full row store onto the ordered sequence of
//! rows the view should draw. A row is visible when it passes every active
//! predicate and every one of its ancestors is expanded; its own flag only
//! matters to its descendants.
//!
//! Ancestor openness is propagated down the annotator's pre-order, so a pass
//! is linear in the number of rows. The output preserves store order.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid::model::{ColumnFilter, TextFilter, VisibilityFilter, Record};
//!
//! let mut filter = VisibilityFilter::<Record>::new();
//! filter.add_column_filter(ColumnFilter::one_of("status", ["Failed", "Canceled"]));
//! filter.set_text_filter(Some(TextFilter::substring("backup")));
//! assert!(filter.has_predicates());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use horizon_treegrid_core::PerfSpan;
use horizon_treegrid_core::logging::{span_names, targets};

use super::annotate::Annotations;
use super::row::{Row, RowData};
use super::value::CellValue;
use crate::error::{Result, TreeGridError};

/// Type alias for a cell predicate.
pub type CellMatcher = Arc<dyn Fn(&CellValue) -> bool + Send + Sync>;

/// Type alias for a value getter.
///
/// Reads the value of a named column from a row payload, replacing
/// [`RowData::cell`] for payloads that need custom extraction.
pub type ValueGetter<T> = Arc<dyn Fn(&T, &str) -> CellValue + Send + Sync>;

/// Which row's values column predicates are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildFilterMode {
    /// Every row is matched on its own values.
    #[default]
    OwnValues,
    /// Child rows are matched on their parent's values, so detail rows
    /// follow the row they belong to.
    ParentValues,
}

/// A predicate over one column.
#[derive(Clone)]
pub struct ColumnFilter {
    column: String,
    matcher: CellMatcher,
    active: bool,
}

impl fmt::Debug for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnFilter")
            .field("column", &self.column)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl ColumnFilter {
    /// Creates a filter from an arbitrary cell predicate.
    pub fn new<F>(column: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&CellValue) -> bool + Send + Sync + 'static,
    {
        Self {
            column: column.into(),
            matcher: Arc::new(matcher),
            active: true,
        }
    }

    /// Creates a value-set filter.
    ///
    /// Matches cells equal to any listed value; a list cell matches when any
    /// of its elements is listed. An empty set filters nothing.
    pub fn one_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let values: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        let active = !values.is_empty();
        let mut filter = Self::new(column, move |cell: &CellValue| cell.matches_any(&values));
        filter.active = active;
        filter
    }

    /// The column this filter reads.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Whether the filter takes part in matching.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Evaluates the predicate. Inactive filters accept everything.
    pub fn matches(&self, cell: &CellValue) -> bool {
        !self.active || (self.matcher)(cell)
    }
}

#[derive(Debug, Clone)]
enum TextPattern {
    Substring {
        needle: String,
        folded: String,
        case_sensitive: bool,
    },
    Regex(Regex),
}

/// Free-text search over row cells.
#[derive(Debug, Clone)]
pub struct TextFilter {
    pattern: TextPattern,
    columns: Vec<String>,
}

impl TextFilter {
    /// Case-insensitive substring search.
    pub fn substring(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        Self {
            pattern: TextPattern::Substring {
                folded: needle.to_lowercase(),
                needle,
                case_sensitive: false,
            },
            columns: Vec::new(),
        }
    }

    /// Regular-expression search.
    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| TreeGridError::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self::from_regex(regex))
    }

    /// Search with a compiled regular expression.
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            pattern: TextPattern::Regex(regex),
            columns: Vec::new(),
        }
    }

    /// Sets case sensitivity of a substring search. No effect on regexes.
    pub fn case_sensitive(mut self, sensitive: bool) -> Self {
        if let TextPattern::Substring { case_sensitive, .. } = &mut self.pattern {
            *case_sensitive = sensitive;
        }
        self
    }

    /// Restricts the search to the given columns.
    pub fn in_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Columns searched; empty means every column the row reports.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.pattern {
            TextPattern::Substring {
                needle,
                case_sensitive: true,
                ..
            } => text.contains(needle.as_str()),
            TextPattern::Substring {
                folded,
                case_sensitive: false,
                ..
            } => text.to_lowercase().contains(folded.as_str()),
            TextPattern::Regex(regex) => regex.is_match(text),
        }
    }
}

/// The ordered visible subsequence of a store.
///
/// Keeps both directions of the mapping, like a proxy model does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleRows {
    /// Visible position to store index.
    to_source: Vec<usize>,
    /// Store index to visible position (None if hidden).
    from_source: Vec<Option<usize>>,
}

impl VisibleRows {
    /// No visible rows.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_capacity(store_len: usize) -> Self {
        Self {
            to_source: Vec::with_capacity(store_len),
            from_source: vec![None; store_len],
        }
    }

    fn push(&mut self, index: usize) {
        self.from_source[index] = Some(self.to_source.len());
        self.to_source.push(index);
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.to_source.len()
    }

    /// Returns true if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.to_source.is_empty()
    }

    /// Store index drawn at `visible_row`.
    pub fn map_to_source(&self, visible_row: usize) -> Option<usize> {
        self.to_source.get(visible_row).copied()
    }

    /// Visible position of the row at store `index`, if it is visible.
    pub fn map_from_source(&self, index: usize) -> Option<usize> {
        self.from_source.get(index).and_then(|&x| x)
    }

    /// Whether the row at store `index` is visible.
    pub fn contains(&self, index: usize) -> bool {
        self.map_from_source(index).is_some()
    }

    /// Store indices in display order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.to_source.iter().copied()
    }

    /// Store indices in display order.
    pub fn as_slice(&self) -> &[usize] {
        &self.to_source
    }
}

/// Computes [`VisibleRows`] from a store, its annotations and a set of
/// predicates.
pub struct VisibilityFilter<T> {
    column_filters: Vec<ColumnFilter>,
    text_filter: Option<TextFilter>,
    value_getter: Option<ValueGetter<T>>,
    child_mode: ChildFilterMode,
}

impl<T> fmt::Debug for VisibilityFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityFilter")
            .field("column_filters", &self.column_filters)
            .field("text_filter", &self.text_filter)
            .field("value_getter", &self.value_getter.is_some())
            .field("child_mode", &self.child_mode)
            .finish()
    }
}

impl<T> Default for VisibilityFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VisibilityFilter<T> {
    /// A filter with no predicates.
    pub fn new() -> Self {
        Self {
            column_filters: Vec::new(),
            text_filter: None,
            value_getter: None,
            child_mode: ChildFilterMode::default(),
        }
    }

    /// Sets which row child rows are matched on.
    pub fn set_child_filter_mode(&mut self, mode: ChildFilterMode) {
        self.child_mode = mode;
    }

    /// Which row child rows are matched on.
    pub fn child_filter_mode(&self) -> ChildFilterMode {
        self.child_mode
    }

    /// Replaces all column filters.
    pub fn set_column_filters(&mut self, filters: Vec<ColumnFilter>) {
        self.column_filters = filters;
    }

    /// Adds a column filter, replacing any existing filter on the same column.
    pub fn add_column_filter(&mut self, filter: ColumnFilter) {
        self.column_filters.retain(|f| f.column != filter.column);
        self.column_filters.push(filter);
    }

    /// Removes the filter on `column`. Returns `true` if one was removed.
    pub fn remove_column_filter(&mut self, column: &str) -> bool {
        let before = self.column_filters.len();
        self.column_filters.retain(|f| f.column != column);
        before != self.column_filters.len()
    }

    /// Removes all column filters.
    pub fn clear_column_filters(&mut self) {
        self.column_filters.clear();
    }

    /// Active and inactive column filters.
    pub fn column_filters(&self) -> &[ColumnFilter] {
        &self.column_filters
    }

    /// Sets or clears the text filter.
    pub fn set_text_filter(&mut self, filter: Option<TextFilter>) {
        self.text_filter = filter;
    }

    /// The text filter, if any.
    pub fn text_filter(&self) -> Option<&TextFilter> {
        self.text_filter.as_ref()
    }

    /// Reads cells through `getter` instead of [`RowData::cell`].
    pub fn set_value_getter<F>(&mut self, getter: F)
    where
        F: Fn(&T, &str) -> CellValue + Send + Sync + 'static,
    {
        self.value_getter = Some(Arc::new(getter));
    }

    /// Goes back to reading cells through [`RowData::cell`].
    pub fn clear_value_getter(&mut self) {
        self.value_getter = None;
    }

    /// Whether any predicate can hide a row.
    pub fn has_predicates(&self) -> bool {
        self.text_filter.is_some() || self.column_filters.iter().any(ColumnFilter::is_active)
    }
}

impl<T: RowData> VisibilityFilter<T> {
    fn cell(&self, data: &T, column: &str) -> CellValue {
        match &self.value_getter {
            Some(getter) => getter(data, column),
            None => data.cell(column),
        }
    }

    /// Whether the row at `index` satisfies every predicate, ignoring the
    /// expansion state of its ancestors.
    pub fn passes_predicates(&self, rows: &[Row<T>], annotations: &Annotations, index: usize) -> bool {
        let Some(row) = rows.get(index) else {
            return false;
        };

        let subject = match (self.child_mode, annotations.parent(index)) {
            (ChildFilterMode::ParentValues, Some(parent)) => rows.get(parent).unwrap_or(row),
            _ => row,
        };
        let columns_pass = self
            .column_filters
            .iter()
            .filter(|f| f.is_active())
            .all(|f| f.matches(&self.cell(subject.data(), &f.column)));
        if !columns_pass {
            return false;
        }

        match &self.text_filter {
            None => true,
            Some(text) => {
                let data = row.data();
                let columns = if text.columns.is_empty() {
                    data.columns()
                } else {
                    text.columns.clone()
                };
                columns
                    .iter()
                    .any(|column| text.is_match(&self.cell(data, column).to_string()))
            }
        }
    }

    /// Computes the visible sequence.
    ///
    /// `annotations` must describe `rows`; rows without an annotation are
    /// treated as hidden.
    pub fn compute(&self, rows: &[Row<T>], annotations: &Annotations) -> VisibleRows {
        let _perf = PerfSpan::new(span_names::FILTER);
        let len = rows.len();

        // open[i]: every ancestor of i is expanded.
        let mut open = vec![false; len];
        for &index in annotations.preorder() {
            if index >= len {
                continue;
            }
            open[index] = match annotations.parent(index) {
                None => true,
                Some(parent) => open[parent] && rows[parent].is_expanded(),
            };
        }

        let filtering = self.has_predicates();
        let mut visible = VisibleRows::with_capacity(len);
        for index in 0..len {
            if open[index] && (!filtering || self.passes_predicates(rows, annotations, index)) {
                visible.push(index);
            }
        }

        tracing::debug!(
            target: targets::FILTER,
            rows = len,
            visible = visible.len(),
            column_filters = self.column_filters.len(),
            text_filter = self.text_filter.is_some(),
            "computed visible rows"
        );
        visible
    }
}
