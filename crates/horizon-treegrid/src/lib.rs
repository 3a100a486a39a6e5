//! Horizon TreeGrid - hierarchical data views over flat row arrays.
//!
//! A data source delivers a flat array of rows in which children point back
//! at their parent row. This crate annotates that array with hierarchy
//! attributes, filters it into the ordered sequence a virtualized grid
//! should draw, and runs the expand/collapse state machine behind the grid's
//! disclosure triangles.
//!
//! This is the umbrella crate; it re-exports the core crate's public API.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid::prelude::*;
//!
//! fn job(name: &str, status: &str) -> Record {
//!     let mut record = Record::new();
//!     record.insert("name".into(), name.into());
//!     record.insert("status".into(), status.into());
//!     record
//! }
//!
//! let mut grid = TreeGrid::new(TreeGridConfig::default());
//! grid.load(vec![
//!     Row::root(job("nightly backup", "Failed")),
//!     Row::child(0, job("step 1", "Succeeded")),
//!     Row::root(job("index rebuild", "Succeeded")),
//! ])?;
//!
//! grid.signals().render_requested.connect(|request| {
//!     println!("repaint {} rows", request.visible_rows);
//! });
//!
//! grid.handle_input(TreeGridInput::click(0))?;
//! assert_eq!(grid.visible().as_slice(), &[0, 1, 2]);
//!
//! grid.add_column_filter(ColumnFilter::one_of("status", ["Failed"]));
//! assert_eq!(grid.visible().as_slice(), &[0]);
//! # Ok::<(), TreeGridError>(())
//! ```
//!
//! # Features
//!
//! - `accessibility` (default): `AriaAttributes::to_accesskit_node`.

pub use horizon_treegrid_core::*;

pub mod accessibility;
pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod prelude;

pub use accessibility::AriaAttributes;
pub use config::{ConfigFormat, TreeGridConfig};
pub use error::{Result, TreeGridError};
pub use grid::TreeGrid;
