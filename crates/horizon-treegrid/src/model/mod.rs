//! Row model for Horizon TreeGrid.
//!
//! The model separates what the data source delivers from what the view
//! draws:
//!
//! - `FlatRowStore`: the ordered rows, each with a `RowKind` and a payload
//! - `HierarchyAnnotator`: derives an `Annotations` side table (level,
//!   sibling position, set size, group ids)
//! - `VisibilityFilter`: maps the store to the ordered `VisibleRows`
//! - `ExpandCollapseController`: turns clicks and key presses into
//!   expand/collapse transitions
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ FlatRowStore │────>│ Annotations │────>│ VisibleRows  │────> View
//! │   Row<T>     │     │ (side table)│     │ (filtered)   │
//! └──────────────┘     └─────────────┘     └──────────────┘
//!        ^                                        │
//!        │        ┌──────────────────────────┐    │
//!        └────────│ ExpandCollapseController │<───┘ input
//!                 └──────────────────────────┘
//! ```
//!
//! The [`TreeGrid`](crate::TreeGrid) facade wires these together; the
//! pieces are public so they can be used and tested on their own.

mod annotate;
mod expansion;
mod filter;
mod row;
mod store;
mod value;

pub use annotate::{Annotation, Annotations, DanglingParentPolicy, HierarchyAnnotator};
pub use expansion::{
    ExpandAction, ExpandCollapseController, ExpansionHost, ExpansionState, MouseButton, RenderReason,
    RenderRequest, Transition, TreeGridInput, TreeGridKey, TreeGridSignals,
};
pub use filter::{
    CellMatcher, ChildFilterMode, ColumnFilter, TextFilter, ValueGetter, VisibilityFilter, VisibleRows,
};
pub use row::{Record, Row, RowData, RowKind};
pub use store::{FlatRowStore, StoreSignals};
pub use value::CellValue;
