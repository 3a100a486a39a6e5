//! The flat row store.
//!
//! `FlatRowStore` owns the ordered row array. Rows are only ever added in
//! whole batches (a full replacement or an append); afterwards the only
//! in-place mutation is the expansion flag, so indices handed out to the
//! view stay valid until the next full reload.

use std::ops::Range;

use horizon_treegrid_core::Signal;
use horizon_treegrid_core::logging::targets;

use super::row::Row;
use crate::error::{Result, TreeGridError};

/// Change notifications of a [`FlatRowStore`].
pub struct StoreSignals {
    /// Emitted just before the backing array is replaced.
    pub model_about_to_reset: Signal<()>,

    /// Emitted after the backing array has been replaced.
    pub model_reset: Signal<()>,

    /// Emitted just before rows are appended.
    /// Args: (first row, last row)
    pub rows_about_to_be_inserted: Signal<(usize, usize)>,

    /// Emitted after rows have been appended.
    /// Args: (first row, last row)
    pub rows_inserted: Signal<(usize, usize)>,

    /// Emitted when a row is expanded or collapsed.
    /// Args: (row, expanded)
    pub expanded_changed: Signal<(usize, bool)>,
}

impl Default for StoreSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StoreSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSignals").finish_non_exhaustive()
    }
}

impl StoreSignals {
    /// Creates a new set of store signals.
    pub fn new() -> Self {
        Self {
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
            rows_about_to_be_inserted: Signal::new(),
            rows_inserted: Signal::new(),
            expanded_changed: Signal::new(),
        }
    }

    /// Emits signals for a reset.
    ///
    /// Calls the provided function between the about_to_reset and reset signals.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        self.model_about_to_reset.emit(());
        reset_fn();
        self.model_reset.emit(());
    }

    /// Emits signals for row insertion.
    ///
    /// Calls the provided function between the about_to_be_inserted and inserted signals.
    pub fn emit_rows_inserted<F>(&self, first: usize, last: usize, insert_fn: F)
    where
        F: FnOnce(),
    {
        self.rows_about_to_be_inserted.emit((first, last));
        insert_fn();
        self.rows_inserted.emit((first, last));
    }
}

/// Ordered row array with O(1) index lookup.
#[derive(Debug)]
pub struct FlatRowStore<T> {
    rows: Vec<Row<T>>,
    signals: StoreSignals,
}

impl<T> Default for FlatRowStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FlatRowStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            signals: StoreSignals::new(),
        }
    }

    /// Creates a store holding `rows`.
    pub fn from_rows(rows: Vec<Row<T>>) -> Self {
        let mut store = Self::new();
        store.rows = reindexed(rows, 0);
        store
    }

    /// The row at `index`.
    pub fn get(&self, index: usize) -> Result<&Row<T>> {
        self.rows
            .get(index)
            .ok_or_else(|| TreeGridError::out_of_range(index, self.rows.len()))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows in store order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row<T>> {
        self.rows.iter()
    }

    /// All rows as a slice.
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    /// The store's signals.
    pub fn signals(&self) -> &StoreSignals {
        &self.signals
    }

    /// Swaps in a new backing array.
    ///
    /// Every index handed out before the call is invalidated.
    pub fn replace_all(&mut self, rows: Vec<Row<T>>) {
        let rows = reindexed(rows, 0);
        tracing::debug!(
            target: targets::STORE,
            old_len = self.rows.len(),
            new_len = rows.len(),
            "replacing row store"
        );
        self.signals.emit_reset(|| self.rows = rows);
    }

    /// Appends a batch and returns the index range it occupies.
    ///
    /// Child rows in the batch may reference rows of earlier batches.
    pub fn append(&mut self, rows: Vec<Row<T>>) -> Range<usize> {
        let first = self.rows.len();
        let range = first..first + rows.len();
        if rows.is_empty() {
            return range;
        }

        let rows = reindexed(rows, first);
        tracing::debug!(
            target: targets::STORE,
            first,
            count = rows.len(),
            "appending rows"
        );
        self.signals
            .emit_rows_inserted(range.start, range.end - 1, || self.rows.extend(rows));
        range
    }

    /// Sets the expansion flag of one row and returns the previous flag.
    ///
    /// Emits `expanded_changed` when a toggle ends up in a new state.
    pub(crate) fn set_expanded(&mut self, index: usize, expanded: Option<bool>) -> Result<Option<bool>> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or_else(|| TreeGridError::out_of_range(index, len))?;

        let previous = row.expanded();
        row.set_expanded(expanded);
        if let Some(now) = expanded
            && previous != expanded
        {
            self.signals.expanded_changed.emit((index, now));
        }
        Ok(previous)
    }

    /// Gives every listed row without a flag the `expanded` default.
    ///
    /// Runs after annotation; no signals are emitted since the rows are new
    /// parents the view has not seen in that role yet.
    pub(crate) fn apply_default_expanded(&mut self, parents: impl IntoIterator<Item = usize>, expanded: bool) {
        for index in parents {
            if let Some(row) = self.rows.get_mut(index)
                && row.expanded().is_none()
            {
                row.set_expanded(Some(expanded));
            }
        }
    }
}

fn reindexed<T>(mut rows: Vec<Row<T>>, first: usize) -> Vec<Row<T>> {
    for (offset, row) in rows.iter_mut().enumerate() {
        row.set_index(first + offset);
    }
    rows
}
