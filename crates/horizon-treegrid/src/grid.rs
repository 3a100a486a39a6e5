//! The tree-grid facade.
//!
//! [`TreeGrid`] owns the row store, its annotations, the visibility filter,
//! the cached visible rows and the expand/collapse controller, and keeps
//! them consistent: every load, append, filter change or transition ends
//! with an up-to-date visible sequence and a render request.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid::{TreeGrid, TreeGridConfig};
//! use horizon_treegrid::model::{Record, Row};
//!
//! let mut grid = TreeGrid::<Record>::new(TreeGridConfig::default());
//! grid.load(vec![
//!     Row::root(Record::new()),
//!     Row::child(0, Record::new()),
//! ])?;
//!
//! // Parents start collapsed.
//! assert_eq!(grid.visible_len(), 1);
//!
//! grid.toggle(0)?;
//! assert_eq!(grid.visible_len(), 2);
//! # Ok::<(), horizon_treegrid::TreeGridError>(())
//! ```
//!
//! # Threading
//!
//! A grid belongs to the thread that created it. Mutating methods check
//! this with [`ThreadAffinity`] whenever thread checks are enabled.

use std::ops::Range;
use std::sync::Arc;

use horizon_treegrid_core::{
    HierarchyDebug, HierarchySource, IdGenerator, SequentialIdGenerator, ThreadAffinity,
    TreeFormatOptions, treegrid_debug, treegrid_trace, treegrid_warn,
};

use crate::accessibility::AriaAttributes;
use crate::config::TreeGridConfig;
use crate::error::{Result, TreeGridError};
use crate::model::{
    Annotation, Annotations, CellValue, ColumnFilter, ExpandCollapseController, ExpansionHost,
    ExpansionState, FlatRowStore, HierarchyAnnotator, RenderReason, Row, RowData, RowKind,
    StoreSignals, TextFilter, Transition, TreeGridInput, TreeGridSignals, VisibilityFilter,
    VisibleRows,
};

/// Everything the controller drives.
struct GridState<T> {
    store: FlatRowStore<T>,
    annotations: Annotations,
    filter: VisibilityFilter<T>,
    visible: VisibleRows,
}

impl<T: RowData> ExpansionHost for GridState<T> {
    fn expansion_state(&self, row: usize) -> Result<ExpansionState> {
        let expanded = self.store.get(row)?.expanded();
        let is_parent = self.annotations.get(row).is_some_and(|a| a.is_parent);
        Ok(ExpansionState::from_flag(is_parent, expanded))
    }

    fn apply_expanded(&mut self, row: usize, expanded: bool) -> Result<()> {
        self.store.set_expanded(row, Some(expanded)).map(|_| ())
    }

    fn refresh_visible(&mut self) -> usize {
        self.visible = self.filter.compute(self.store.rows(), &self.annotations);
        self.visible.len()
    }

    fn visible_len(&self) -> usize {
        self.visible.len()
    }

    fn parent_rows(&self) -> Vec<usize> {
        self.annotations.parents().collect()
    }

    fn ancestors_of(&self, row: usize) -> Vec<usize> {
        self.annotations.ancestors(row).collect()
    }
}

/// A hierarchical data view over a flat row array.
pub struct TreeGrid<T> {
    state: GridState<T>,
    controller: ExpandCollapseController,
    annotator: HierarchyAnnotator,
    config: TreeGridConfig,
    affinity: ThreadAffinity,
}

static_assertions::assert_impl_all!(TreeGrid<crate::model::Record>: Send);

impl<T> std::fmt::Debug for TreeGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeGrid")
            .field("rows", &self.state.store.len())
            .field("visible", &self.state.visible.len())
            .field("filter", &self.state.filter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: RowData> TreeGrid<T> {
    /// Creates an empty grid with a sequential group id generator.
    pub fn new(config: TreeGridConfig) -> Self {
        Self::with_id_generator(config, Arc::new(SequentialIdGenerator::new()))
    }

    /// Creates an empty grid minting group ids from `ids`.
    pub fn with_id_generator(config: TreeGridConfig, ids: Arc<dyn IdGenerator>) -> Self {
        let mut filter = VisibilityFilter::new();
        filter.set_child_filter_mode(config.child_filter_mode);

        let mut controller = ExpandCollapseController::new();
        controller.set_render_on_noop(config.render_on_noop);
        controller.set_restore_focus(config.restore_focus);

        Self {
            state: GridState {
                store: FlatRowStore::new(),
                annotations: Annotations::new(),
                filter,
                visible: VisibleRows::new(),
            },
            controller,
            annotator: HierarchyAnnotator::new(ids).with_policy(config.dangling_parents),
            config,
            affinity: ThreadAffinity::current(),
        }
    }

    /// The configuration the grid was created with.
    pub fn config(&self) -> &TreeGridConfig {
        &self.config
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replaces all rows.
    ///
    /// With [`DanglingParentPolicy::Reject`](crate::model::DanglingParentPolicy::Reject),
    /// a bad hierarchy fails the call and leaves the grid unchanged.
    pub fn load(&mut self, rows: Vec<Row<T>>) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        let annotations = self.annotator.annotate(&rows, None)?;

        treegrid_debug!(rows = rows.len(), "loading rows");
        self.state.store.replace_all(rows);
        self.install(annotations, RenderReason::Reset);
        Ok(())
    }

    /// Appends a batch of rows and re-annotates the whole store.
    ///
    /// Group ids of existing parents are kept. Returns the index range of
    /// the new rows.
    pub fn append(&mut self, rows: Vec<Row<T>>) -> Result<Range<usize>> {
        self.affinity.debug_assert_same_thread();
        let kinds: Vec<RowKind> = self
            .state
            .store
            .iter()
            .chain(rows.iter())
            .map(Row::kind)
            .collect();
        let annotations = self
            .annotator
            .annotate_kinds(&kinds, Some(&self.state.annotations))?;

        let range = self.state.store.append(rows);
        self.install(annotations, RenderReason::RowsInserted);
        Ok(range)
    }

    fn install(&mut self, annotations: Annotations, reason: RenderReason) {
        if !annotations.demoted().is_empty() {
            treegrid_warn!(rows = ?annotations.demoted(), "rows shown at top level");
        }
        self.state.annotations = annotations;
        self.state
            .store
            .apply_default_expanded(self.state.annotations.parents(), self.config.default_expanded);
        self.controller.refresh(&mut self.state, reason);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of rows in the store.
    pub fn len(&self) -> usize {
        self.state.store.len()
    }

    /// Returns true if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.state.store.is_empty()
    }

    /// The row at store `index`.
    pub fn row(&self, index: usize) -> Result<&Row<T>> {
        self.state.store.get(index)
    }

    /// All rows in store order.
    pub fn rows(&self) -> &[Row<T>] {
        self.state.store.rows()
    }

    /// Derived hierarchy attributes of the row at `index`.
    pub fn annotation(&self, index: usize) -> Result<&Annotation> {
        self.state
            .annotations
            .get(index)
            .ok_or_else(|| TreeGridError::out_of_range(index, self.len()))
    }

    /// The whole annotation table.
    pub fn annotations(&self) -> &Annotations {
        &self.state.annotations
    }

    /// Accessibility attributes of the row at `index`.
    pub fn aria(&self, index: usize) -> Result<AriaAttributes> {
        let row = self.row(index)?;
        Ok(AriaAttributes::new(self.annotation(index)?, row.expanded()))
    }

    /// Expansion state of the row at `index`.
    pub fn expansion_state(&self, index: usize) -> Result<ExpansionState> {
        self.state.expansion_state(index)
    }

    /// The current visible sequence.
    pub fn visible(&self) -> &VisibleRows {
        &self.state.visible
    }

    /// Number of visible rows.
    pub fn visible_len(&self) -> usize {
        self.state.visible.len()
    }

    /// Whether the row at store `index` is visible.
    pub fn is_visible(&self, index: usize) -> bool {
        self.state.visible.contains(index)
    }

    /// Visible rows in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row<T>> + '_ {
        self.state
            .visible
            .iter()
            .filter_map(|index| self.state.store.rows().get(index))
    }

    /// Notifications for the presentation layer.
    pub fn signals(&self) -> &TreeGridSignals {
        self.controller.signals()
    }

    /// Notifications of the underlying row store.
    pub fn store_signals(&self) -> &StoreSignals {
        self.state.store.signals()
    }

    /// Renders the hierarchy as a text tree.
    pub fn debug_tree(&self, options: TreeFormatOptions) -> String {
        HierarchyDebug::with_options(options).format_all(self)
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Replaces all column filters.
    pub fn set_column_filters(&mut self, filters: Vec<ColumnFilter>) {
        self.affinity.debug_assert_same_thread();
        self.state.filter.set_column_filters(filters);
        self.refilter();
    }

    /// Adds a column filter, replacing any filter on the same column.
    pub fn add_column_filter(&mut self, filter: ColumnFilter) {
        self.affinity.debug_assert_same_thread();
        self.state.filter.add_column_filter(filter);
        self.refilter();
    }

    /// Removes the filter on `column`.
    pub fn remove_column_filter(&mut self, column: &str) {
        self.affinity.debug_assert_same_thread();
        if self.state.filter.remove_column_filter(column) {
            self.refilter();
        }
    }

    /// Removes all column filters.
    pub fn clear_column_filters(&mut self) {
        self.affinity.debug_assert_same_thread();
        self.state.filter.clear_column_filters();
        self.refilter();
    }

    /// Sets the text filter.
    pub fn set_text_filter(&mut self, filter: TextFilter) {
        self.affinity.debug_assert_same_thread();
        self.state.filter.set_text_filter(Some(filter));
        self.refilter();
    }

    /// Substring search honouring the configured case sensitivity. An empty
    /// string clears the search.
    pub fn set_search_text(&mut self, text: &str) {
        if text.is_empty() {
            self.clear_text_filter();
        } else {
            let filter =
                TextFilter::substring(text).case_sensitive(self.config.text_filter_case_sensitive);
            self.set_text_filter(filter);
        }
    }

    /// Clears the text filter.
    pub fn clear_text_filter(&mut self) {
        self.affinity.debug_assert_same_thread();
        self.state.filter.set_text_filter(None);
        self.refilter();
    }

    /// Reads cells through `getter` instead of [`RowData::cell`].
    pub fn set_value_getter<F>(&mut self, getter: F)
    where
        F: Fn(&T, &str) -> CellValue + Send + Sync + 'static,
    {
        self.affinity.debug_assert_same_thread();
        self.state.filter.set_value_getter(getter);
        self.refilter();
    }

    /// Goes back to reading cells through [`RowData::cell`].
    pub fn clear_value_getter(&mut self) {
        self.affinity.debug_assert_same_thread();
        self.state.filter.clear_value_getter();
        self.refilter();
    }

    /// The active filter.
    pub fn filter(&self) -> &VisibilityFilter<T> {
        &self.state.filter
    }

    fn refilter(&mut self) {
        treegrid_trace!(filter = ?self.state.filter, "filters changed");
        self.controller.refresh(&mut self.state, RenderReason::FilterChanged);
    }

    // =========================================================================
    // Expand / collapse
    // =========================================================================

    /// Flips the row between collapsed and expanded.
    ///
    /// Leaves return [`Transition::Ignored`]; unknown rows fail with
    /// [`TreeGridError::OutOfRange`].
    pub fn toggle(&mut self, row: usize) -> Result<Transition> {
        self.affinity.debug_assert_same_thread();
        self.controller.toggle(&mut self.state, row)
    }

    /// Forces the row into the requested state.
    pub fn set_expanded(&mut self, row: usize, expanded: bool) -> Result<Transition> {
        self.affinity.debug_assert_same_thread();
        self.controller.set_expanded(&mut self.state, row, expanded)
    }

    /// Routes a click or key press to the controller.
    pub fn handle_input(&mut self, input: TreeGridInput) -> Result<Transition> {
        self.affinity.debug_assert_same_thread();
        self.controller.handle_input(&mut self.state, input)
    }

    /// Expands every parent row. Returns how many changed.
    pub fn expand_all(&mut self) -> Result<usize> {
        self.affinity.debug_assert_same_thread();
        self.controller.set_all(&mut self.state, true)
    }

    /// Collapses every parent row. Returns how many changed.
    pub fn collapse_all(&mut self) -> Result<usize> {
        self.affinity.debug_assert_same_thread();
        self.controller.set_all(&mut self.state, false)
    }

    /// Expands every ancestor of `row`. Returns how many changed.
    pub fn reveal(&mut self, row: usize) -> Result<usize> {
        self.affinity.debug_assert_same_thread();
        self.controller.reveal(&mut self.state, row)
    }

    /// Runs several mutations with a single visibility pass and a single
    /// render request at the end.
    ///
    /// ```
    /// # use horizon_treegrid::{TreeGrid, TreeGridConfig};
    /// # use horizon_treegrid::model::{ColumnFilter, Record, Row};
    /// # let mut grid = TreeGrid::<Record>::new(TreeGridConfig::default());
    /// # grid.load(vec![Row::root(Record::new()), Row::child(0, Record::new())])?;
    /// grid.batch_update(|grid| {
    ///     grid.clear_column_filters();
    ///     grid.expand_all()
    /// })?;
    /// # Ok::<(), horizon_treegrid::TreeGridError>(())
    /// ```
    pub fn batch_update<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.affinity.debug_assert_same_thread();
        self.controller.begin_batch();
        let result = f(self);
        self.controller.end_batch(&mut self.state);
        result
    }
}

impl<T: RowData> HierarchySource for TreeGrid<T> {
    fn node_count(&self) -> usize {
        self.len()
    }

    fn roots(&self) -> Vec<usize> {
        self.state.annotations.roots().to_vec()
    }

    fn children(&self, node: usize) -> Vec<usize> {
        self.state.annotations.children(node).to_vec()
    }

    fn label(&self, node: usize) -> String {
        match self.state.store.get(node) {
            Ok(row) => {
                let label = row.data().label();
                if label.is_empty() { format!("row {node}") } else { label }
            }
            Err(_) => format!("row {node}"),
        }
    }

    fn expanded(&self, node: usize) -> Option<bool> {
        match self.state.expansion_state(node) {
            Ok(ExpansionState::Expanded) => Some(true),
            Ok(ExpansionState::Collapsed) => Some(false),
            _ => None,
        }
    }
}
