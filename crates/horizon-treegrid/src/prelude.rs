//! Prelude module for Horizon TreeGrid.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use horizon_treegrid::prelude::*;
//! ```
//!
//! This provides access to:
//! - The grid facade and its configuration (`TreeGrid`, `TreeGridConfig`)
//! - Rows and cell values (`Row`, `Record`, `CellValue`)
//! - Filters (`ColumnFilter`, `TextFilter`)
//! - Input and transitions (`TreeGridInput`, `TreeGridKey`, `Transition`)

// ============================================================================
// Grid
// ============================================================================

pub use crate::{AriaAttributes, Result, TreeGrid, TreeGridConfig, TreeGridError};

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use crate::signal::{ConnectionId, Signal};

// ============================================================================
// Rows and Filters
// ============================================================================

pub use crate::model::{
    CellValue, ChildFilterMode, ColumnFilter, DanglingParentPolicy, Record, Row, RowData, RowKind,
    TextFilter,
};

// ============================================================================
// Expand / Collapse
// ============================================================================

pub use crate::model::{
    ExpansionState, MouseButton, RenderReason, RenderRequest, Transition, TreeGridInput, TreeGridKey,
};
