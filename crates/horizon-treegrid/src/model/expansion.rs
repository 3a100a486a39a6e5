//! Expand/collapse state machine.
//!
//! Every parent row is either [`ExpansionState::Collapsed`] or
//! [`ExpansionState::Expanded`]; rows without children are
//! [`ExpansionState::Leaf`] and ignore every interaction.
//!
//! The [`ExpandCollapseController`] turns user input into transitions. An
//! effective transition flips the row's flag, has the host recompute the
//! visible rows, requests a render and moves focus back to the row. The
//! controller does not own rows itself: it drives an [`ExpansionHost`],
//! which the [`TreeGrid`](crate::TreeGrid) implements over its store.
//!
//! # Input mapping
//!
//! | Input                                   | Action   |
//! |-----------------------------------------|----------|
//! | Primary click anywhere in the row       | toggle   |
//! | Enter on the focused row                | toggle   |
//! | Left on the first cell of an open row   | collapse |
//! | Right on the last cell of a closed row  | expand   |

use horizon_treegrid_core::Signal;
use horizon_treegrid_core::logging::targets;

use crate::error::Result;

/// Expansion state of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpansionState {
    /// No children; not interactive.
    Leaf,
    /// Children hidden.
    Collapsed,
    /// Children shown, subject to their own filters.
    Expanded,
}

impl ExpansionState {
    /// Derives the state from a row's parent status and flag.
    pub fn from_flag(is_parent: bool, expanded: Option<bool>) -> Self {
        match (is_parent, expanded) {
            (false, _) => ExpansionState::Leaf,
            (true, Some(true)) => ExpansionState::Expanded,
            (true, _) => ExpansionState::Collapsed,
        }
    }

    /// Returns true for [`ExpansionState::Expanded`].
    pub fn is_expanded(self) -> bool {
        self == ExpansionState::Expanded
    }
}

/// Outcome of an expand/collapse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The row went from collapsed to expanded.
    Expanded,
    /// The row went from expanded to collapsed.
    Collapsed,
    /// The row was already in the requested state.
    Unchanged,
    /// The row is a leaf, or the input maps to no action.
    Ignored,
}

impl Transition {
    /// Whether the row's state changed.
    pub fn is_effective(self) -> bool {
        matches!(self, Transition::Expanded | Transition::Collapsed)
    }
}

/// Mouse buttons the grid distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The primary (usually left) button.
    Primary,
    /// The secondary (usually right) button.
    Secondary,
    /// The middle button.
    Middle,
}

/// Keys the grid reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeGridKey {
    /// Enter / Return.
    Enter,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Anything else.
    Other,
}

/// A user interaction aimed at one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeGridInput {
    /// Mouse click anywhere in the row.
    Click {
        /// Store index of the row.
        row: usize,
        /// Button that was pressed.
        button: MouseButton,
    },
    /// Key press while a cell of the row has focus.
    Key {
        /// Store index of the row.
        row: usize,
        /// Key that was pressed.
        key: TreeGridKey,
        /// Focused cell, 0 being the indentation cell.
        cell: usize,
        /// Number of cells in the row.
        cell_count: usize,
    },
}

impl TreeGridInput {
    /// Primary-button click on `row`.
    pub fn click(row: usize) -> Self {
        TreeGridInput::Click {
            row,
            button: MouseButton::Primary,
        }
    }

    /// Key press on cell `cell` of a row with `cell_count` cells.
    pub fn key(row: usize, key: TreeGridKey, cell: usize, cell_count: usize) -> Self {
        TreeGridInput::Key {
            row,
            key,
            cell,
            cell_count,
        }
    }

    /// The row the input targets.
    pub fn row(&self) -> usize {
        match *self {
            TreeGridInput::Click { row, .. } | TreeGridInput::Key { row, .. } => row,
        }
    }
}

/// What an input asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpandAction {
    /// Flip the state.
    Toggle,
    /// Force expanded.
    Expand,
    /// Force collapsed.
    Collapse,
}

impl ExpandAction {
    /// Maps an input to an action, given the target row's current state.
    ///
    /// Returns `None` for inputs that do nothing, including any input on a
    /// leaf.
    pub fn resolve(input: &TreeGridInput, state: ExpansionState) -> Option<Self> {
        if state == ExpansionState::Leaf {
            return None;
        }
        match *input {
            TreeGridInput::Click {
                button: MouseButton::Primary,
                ..
            } => Some(ExpandAction::Toggle),
            TreeGridInput::Click { .. } => None,
            TreeGridInput::Key { key, cell, cell_count, .. } => match key {
                TreeGridKey::Enter => Some(ExpandAction::Toggle),
                TreeGridKey::ArrowLeft if cell == 0 && state.is_expanded() => Some(ExpandAction::Collapse),
                TreeGridKey::ArrowRight if cell + 1 >= cell_count && !state.is_expanded() => {
                    Some(ExpandAction::Expand)
                }
                _ => None,
            },
        }
    }
}

/// Why the view should repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderReason {
    /// The row array was replaced.
    Reset,
    /// Rows were appended.
    RowsInserted,
    /// Filters or the value getter changed.
    FilterChanged,
    /// One or more rows were expanded or collapsed.
    Expansion,
    /// Several changes were applied together.
    Batch,
}

/// Payload of `render_requested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderRequest {
    /// Length of the new visible sequence.
    pub visible_rows: usize,
    /// What changed.
    pub reason: RenderReason,
}

/// Notifications from the grid to the presentation layer.
pub struct TreeGridSignals {
    /// The visible sequence changed and should be repainted.
    pub render_requested: Signal<RenderRequest>,

    /// Focus should move to the given store row.
    pub focus_requested: Signal<usize>,
}

impl Default for TreeGridSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeGridSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeGridSignals").finish_non_exhaustive()
    }
}

impl TreeGridSignals {
    /// Creates a new set of grid signals.
    pub fn new() -> Self {
        Self {
            render_requested: Signal::new(),
            focus_requested: Signal::new(),
        }
    }
}

/// The state an [`ExpandCollapseController`] operates on.
pub trait ExpansionHost {
    /// Current state of `row`; fails with `OutOfRange` for unknown rows.
    fn expansion_state(&self, row: usize) -> Result<ExpansionState>;

    /// Sets the flag of a parent row. Does not recompute visibility.
    fn apply_expanded(&mut self, row: usize, expanded: bool) -> Result<()>;

    /// Recomputes the visible sequence and returns its length.
    fn refresh_visible(&mut self) -> usize;

    /// Length of the current visible sequence.
    fn visible_len(&self) -> usize;

    /// All rows with children.
    fn parent_rows(&self) -> Vec<usize>;

    /// Ancestors of `row`, nearest first.
    fn ancestors_of(&self, row: usize) -> Vec<usize>;
}

#[derive(Debug, Default)]
struct Batch {
    depth: usize,
    dirty: bool,
    focus: Option<usize>,
}

/// Drives expand/collapse transitions and their side effects.
#[derive(Debug)]
pub struct ExpandCollapseController {
    signals: TreeGridSignals,
    render_on_noop: bool,
    restore_focus: bool,
    batch: Batch,
}

impl Default for ExpandCollapseController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpandCollapseController {
    /// Creates a controller that moves focus after transitions and stays
    /// quiet on no-ops.
    pub fn new() -> Self {
        Self {
            signals: TreeGridSignals::new(),
            render_on_noop: false,
            restore_focus: true,
            batch: Batch::default(),
        }
    }

    /// Whether `set_expanded` requests a render when nothing changes.
    pub fn set_render_on_noop(&mut self, enabled: bool) {
        self.render_on_noop = enabled;
    }

    /// Whether transitions emit `focus_requested`.
    pub fn set_restore_focus(&mut self, enabled: bool) {
        self.restore_focus = enabled;
    }

    /// The controller's signals.
    pub fn signals(&self) -> &TreeGridSignals {
        &self.signals
    }

    /// Flips `row` between collapsed and expanded.
    ///
    /// Leaves return [`Transition::Ignored`] without error.
    pub fn toggle<H: ExpansionHost>(&mut self, host: &mut H, row: usize) -> Result<Transition> {
        match host.expansion_state(row)? {
            ExpansionState::Leaf => Ok(Transition::Ignored),
            state => self.transition(host, row, !state.is_expanded()),
        }
    }

    /// Forces `row` into the requested state.
    pub fn set_expanded<H: ExpansionHost>(&mut self, host: &mut H, row: usize, expanded: bool) -> Result<Transition> {
        match host.expansion_state(row)? {
            ExpansionState::Leaf => Ok(Transition::Ignored),
            state if state.is_expanded() == expanded => {
                if self.render_on_noop {
                    self.request_render(host.visible_len(), RenderReason::Expansion);
                }
                Ok(Transition::Unchanged)
            }
            _ => self.transition(host, row, expanded),
        }
    }

    /// Routes a click or key press.
    pub fn handle_input<H: ExpansionHost>(&mut self, host: &mut H, input: TreeGridInput) -> Result<Transition> {
        let row = input.row();
        let state = host.expansion_state(row)?;
        match ExpandAction::resolve(&input, state) {
            None => Ok(Transition::Ignored),
            Some(ExpandAction::Toggle) => self.toggle(host, row),
            Some(ExpandAction::Expand) => self.set_expanded(host, row, true),
            Some(ExpandAction::Collapse) => self.set_expanded(host, row, false),
        }
    }

    /// Sets every parent row to `expanded`. Returns the number of rows that
    /// changed.
    pub fn set_all<H: ExpansionHost>(&mut self, host: &mut H, expanded: bool) -> Result<usize> {
        let mut changed = 0;
        for row in host.parent_rows() {
            if host.expansion_state(row)?.is_expanded() != expanded {
                host.apply_expanded(row, expanded)?;
                changed += 1;
            }
        }
        if changed > 0 {
            self.finish(host, None);
        }
        Ok(changed)
    }

    /// Expands every ancestor of `row` so it is no longer hidden by a
    /// collapsed parent. Returns the number of rows that changed.
    pub fn reveal<H: ExpansionHost>(&mut self, host: &mut H, row: usize) -> Result<usize> {
        host.expansion_state(row)?;
        let mut changed = 0;
        for ancestor in host.ancestors_of(row) {
            if !host.expansion_state(ancestor)?.is_expanded() {
                host.apply_expanded(ancestor, true)?;
                changed += 1;
            }
        }
        if changed > 0 {
            self.finish(host, Some(row));
        }
        Ok(changed)
    }

    /// Starts collecting transitions; effects are deferred to the matching
    /// [`end_batch`](Self::end_batch).
    pub fn begin_batch(&mut self) {
        self.batch.depth += 1;
    }

    /// Ends a batch. The outermost call recomputes visibility and emits one
    /// render request if anything changed.
    pub fn end_batch<H: ExpansionHost>(&mut self, host: &mut H) {
        self.batch.depth = self.batch.depth.saturating_sub(1);
        if self.batch.depth == 0 && std::mem::take(&mut self.batch.dirty) {
            let visible_rows = host.refresh_visible();
            self.request_render(visible_rows, RenderReason::Batch);
            if let Some(row) = self.batch.focus.take() {
                self.request_focus(row);
            }
        }
    }

    /// Whether a batch is open.
    pub fn in_batch(&self) -> bool {
        self.batch.depth > 0
    }

    /// Recomputes visibility and requests a render, or marks the open batch
    /// dirty.
    pub fn refresh<H: ExpansionHost>(&mut self, host: &mut H, reason: RenderReason) {
        if self.in_batch() {
            self.batch.dirty = true;
            return;
        }
        let visible_rows = host.refresh_visible();
        self.request_render(visible_rows, reason);
    }

    /// Emits `render_requested`.
    pub fn request_render(&self, visible_rows: usize, reason: RenderReason) {
        self.signals.render_requested.emit(RenderRequest { visible_rows, reason });
    }

    fn request_focus(&self, row: usize) {
        if self.restore_focus {
            self.signals.focus_requested.emit(row);
        }
    }

    fn transition<H: ExpansionHost>(&mut self, host: &mut H, row: usize, expanded: bool) -> Result<Transition> {
        host.apply_expanded(row, expanded)?;
        tracing::debug!(
            target: targets::EXPANSION,
            row,
            expanded,
            batched = self.in_batch(),
            "row expansion changed"
        );
        self.finish(host, Some(row));
        Ok(if expanded {
            Transition::Expanded
        } else {
            Transition::Collapsed
        })
    }

    fn finish<H: ExpansionHost>(&mut self, host: &mut H, focus: Option<usize>) {
        if self.in_batch() {
            self.batch.dirty = true;
            if focus.is_some() {
                self.batch.focus = focus;
            }
            return;
        }

        self.refresh(host, RenderReason::Expansion);
        if let Some(row) = focus {
            self.request_focus(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeGridError;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Rows 0 and 2 are parents, 1 is a leaf child of 0, 3 a child of 2.
    struct Host {
        flags: Vec<Option<bool>>,
        parents: Vec<Option<usize>>,
        refreshes: usize,
    }

    impl Host {
        fn new() -> Self {
            Self {
                flags: vec![Some(false), None, Some(false), None],
                parents: vec![None, Some(0), Some(0), Some(2)],
                refreshes: 0,
            }
        }
    }

    impl ExpansionHost for Host {
        fn expansion_state(&self, row: usize) -> Result<ExpansionState> {
            let flag = *self
                .flags
                .get(row)
                .ok_or_else(|| TreeGridError::out_of_range(row, self.flags.len()))?;
            Ok(ExpansionState::from_flag(flag.is_some(), flag))
        }

        fn apply_expanded(&mut self, row: usize, expanded: bool) -> Result<()> {
            self.flags[row] = Some(expanded);
            Ok(())
        }

        fn refresh_visible(&mut self) -> usize {
            self.refreshes += 1;
            self.visible_len()
        }

        fn visible_len(&self) -> usize {
            (0..self.flags.len())
                .filter(|&row| {
                    std::iter::successors(self.parents[row], |&p| self.parents[p])
                        .all(|p| self.flags[p] == Some(true))
                })
                .count()
        }

        fn parent_rows(&self) -> Vec<usize> {
            vec![0, 2]
        }

        fn ancestors_of(&self, row: usize) -> Vec<usize> {
            std::iter::successors(self.parents[row], |&p| self.parents[p]).collect()
        }
    }

    fn record(controller: &ExpandCollapseController) -> (Arc<Mutex<Vec<RenderRequest>>>, Arc<Mutex<Vec<usize>>>) {
        let renders = Arc::new(Mutex::new(Vec::new()));
        let focus = Arc::new(Mutex::new(Vec::new()));
        let renders_clone = renders.clone();
        controller
            .signals()
            .render_requested
            .connect(move |&request| renders_clone.lock().push(request));
        let focus_clone = focus.clone();
        controller
            .signals()
            .focus_requested
            .connect(move |&row| focus_clone.lock().push(row));
        (renders, focus)
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();
        let (renders, focus) = record(&controller);

        assert_eq!(controller.toggle(&mut host, 0).unwrap(), Transition::Expanded);
        assert_eq!(controller.toggle(&mut host, 0).unwrap(), Transition::Collapsed);

        let counts: Vec<usize> = renders.lock().iter().map(|r| r.visible_rows).collect();
        assert_eq!(counts, vec![3, 1]);
        assert_eq!(*focus.lock(), vec![0, 0]);
    }

    #[test]
    fn test_toggle_leaf_is_silent() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();
        let (renders, focus) = record(&controller);

        assert_eq!(controller.toggle(&mut host, 1).unwrap(), Transition::Ignored);
        assert!(renders.lock().is_empty());
        assert!(focus.lock().is_empty());
        assert_eq!(host.refreshes, 0);
    }

    #[test]
    fn test_out_of_range() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();
        assert!(matches!(
            controller.toggle(&mut host, 9),
            Err(TreeGridError::OutOfRange { index: 9, len: 4 })
        ));
        assert!(controller.set_expanded(&mut host, 9, true).is_err());
    }

    #[test]
    fn test_set_expanded_noop() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();
        let (renders, _) = record(&controller);

        assert_eq!(controller.set_expanded(&mut host, 0, false).unwrap(), Transition::Unchanged);
        assert!(renders.lock().is_empty());

        controller.set_render_on_noop(true);
        controller.set_expanded(&mut host, 0, false).unwrap();
        assert_eq!(renders.lock().len(), 1);
        assert_eq!(host.refreshes, 0);
    }

    #[test]
    fn test_input_mapping() {
        let collapsed = ExpansionState::Collapsed;
        let expanded = ExpansionState::Expanded;
        let resolve = ExpandAction::resolve;

        assert_eq!(resolve(&TreeGridInput::click(0), collapsed), Some(ExpandAction::Toggle));
        assert_eq!(
            resolve(
                &TreeGridInput::Click {
                    row: 0,
                    button: MouseButton::Secondary
                },
                collapsed
            ),
            None
        );
        assert_eq!(
            resolve(&TreeGridInput::key(0, TreeGridKey::Enter, 2, 4), expanded),
            Some(ExpandAction::Toggle)
        );
        assert_eq!(
            resolve(&TreeGridInput::key(0, TreeGridKey::ArrowLeft, 0, 4), expanded),
            Some(ExpandAction::Collapse)
        );
        assert_eq!(resolve(&TreeGridInput::key(0, TreeGridKey::ArrowLeft, 1, 4), expanded), None);
        assert_eq!(resolve(&TreeGridInput::key(0, TreeGridKey::ArrowLeft, 0, 4), collapsed), None);
        assert_eq!(
            resolve(&TreeGridInput::key(0, TreeGridKey::ArrowRight, 3, 4), collapsed),
            Some(ExpandAction::Expand)
        );
        assert_eq!(resolve(&TreeGridInput::key(0, TreeGridKey::ArrowRight, 3, 4), expanded), None);
        assert_eq!(resolve(&TreeGridInput::key(0, TreeGridKey::ArrowRight, 0, 4), collapsed), None);
        assert_eq!(resolve(&TreeGridInput::key(0, TreeGridKey::Other, 0, 4), collapsed), None);
        assert_eq!(resolve(&TreeGridInput::click(1), ExpansionState::Leaf), None);
    }

    #[test]
    fn test_handle_input() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();

        let right = TreeGridInput::key(0, TreeGridKey::ArrowRight, 3, 4);
        assert_eq!(controller.handle_input(&mut host, right).unwrap(), Transition::Expanded);
        assert_eq!(controller.handle_input(&mut host, right).unwrap(), Transition::Ignored);

        let left = TreeGridInput::key(0, TreeGridKey::ArrowLeft, 0, 4);
        assert_eq!(controller.handle_input(&mut host, left).unwrap(), Transition::Collapsed);
        assert!(controller.handle_input(&mut host, TreeGridInput::click(7)).is_err());
    }

    #[test]
    fn test_set_all_and_reveal() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();
        let (renders, focus) = record(&controller);

        assert_eq!(controller.reveal(&mut host, 3).unwrap(), 2);
        assert_eq!(*focus.lock(), vec![3]);
        assert_eq!(controller.reveal(&mut host, 3).unwrap(), 0);

        assert_eq!(controller.set_all(&mut host, false).unwrap(), 2);
        assert_eq!(controller.set_all(&mut host, false).unwrap(), 0);
        assert_eq!(renders.lock().len(), 2);
        assert_eq!(renders.lock()[1].visible_rows, 1);
    }

    #[test]
    fn test_batch_defers_effects() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();
        let (renders, focus) = record(&controller);

        controller.begin_batch();
        controller.toggle(&mut host, 0).unwrap();
        controller.toggle(&mut host, 2).unwrap();
        assert!(renders.lock().is_empty());
        controller.end_batch(&mut host);

        assert_eq!(host.refreshes, 1);
        assert_eq!(renders.lock().len(), 1);
        assert_eq!(renders.lock()[0].visible_rows, 4);
        assert_eq!(renders.lock()[0].reason, RenderReason::Batch);
        assert_eq!(*focus.lock(), vec![2]);
    }

    #[test]
    fn test_restore_focus_disabled() {
        let mut host = Host::new();
        let mut controller = ExpandCollapseController::new();
        controller.set_restore_focus(false);
        let (renders, focus) = record(&controller);

        controller.toggle(&mut host, 0).unwrap();
        assert_eq!(renders.lock().len(), 1);
        assert!(focus.lock().is_empty());
    }
}
