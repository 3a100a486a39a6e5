//! Core systems for Horizon TreeGrid.
//!
//! This crate provides the plumbing the tree-grid model is built on:
//!
//! - **Signal/Slot System**: Type-safe notifications from models to views
//! - **Thread Affinity**: Checks that confine grid state to the UI thread
//! - **Group Ids**: [`GroupGuid`] and the injectable [`IdGenerator`]
//! - **Logging**: Tracing targets, [`PerfSpan`] and [`HierarchyDebug`]
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_treegrid_core::Signal;
//!
//! // A signal that carries the row the view should focus
//! let focus_requested = Signal::<usize>::new();
//!
//! let conn_id = focus_requested.connect(|row| {
//!     println!("focus row {}", row);
//! });
//!
//! focus_requested.emit(3);
//! focus_requested.disconnect(conn_id);
//! ```
//!
//! # Id Example
//!
//! ```
//! use horizon_treegrid_core::{GroupGuid, IdGenerator, SequentialIdGenerator};
//!
//! let ids = SequentialIdGenerator::starting_at(100);
//! assert_eq!(ids.next_id(), GroupGuid::from_raw(100));
//! ```

#![warn(missing_docs)]

pub mod id;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use id::{GroupGuid, IdGenerator, SequentialIdGenerator};
pub use logging::{HierarchyDebug, HierarchySource, PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::{ThreadAffinity, are_thread_checks_enabled, set_thread_checks_enabled};
