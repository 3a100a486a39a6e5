//! Logging and debugging facilities for Horizon TreeGrid.
//!
//! This module provides:
//! - Target and span names for the `tracing` instrumentation
//! - Convenience macros with consistent target naming
//! - [`PerfSpan`] for timing annotation and filter passes
//! - [`HierarchyDebug`] for dumping any [`HierarchySource`] as a text tree
//!
//! # Tracing Integration
//!
//! Nothing is printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_treegrid=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use horizon_treegrid_core::logging::{HierarchyDebug, HierarchySource};
//!
//! struct Pair;
//!
//! impl HierarchySource for Pair {
//!     fn node_count(&self) -> usize { 2 }
//!     fn roots(&self) -> Vec<usize> { vec![0] }
//!     fn children(&self, node: usize) -> Vec<usize> {
//!         if node == 0 { vec![1] } else { Vec::new() }
//!     }
//!     fn label(&self, node: usize) -> String { format!("row {node}") }
//! }
//!
//! let text = HierarchyDebug::new().format_all(&Pair);
//! assert!(text.contains("row 1"));
//! ```

use std::fmt::Write as FmtWrite;

/// Span names used throughout Horizon TreeGrid for tracing.
pub mod span_names {
    /// Hierarchy annotation pass.
    pub const ANNOTATE: &str = "horizon_treegrid::annotate";
    /// Visibility filter pass.
    pub const FILTER: &str = "horizon_treegrid::filter";
}

/// Target names for log filtering.
pub mod targets {
    /// Timing spans opened by [`PerfSpan`](super::PerfSpan).
    pub const PERF: &str = "horizon_treegrid::perf";
    /// Signal dispatch target.
    pub const SIGNAL: &str = "horizon_treegrid_core::signal";
    /// Row store target.
    pub const STORE: &str = "horizon_treegrid::store";
    /// Hierarchy annotator target.
    pub const ANNOTATE: &str = "horizon_treegrid::annotate";
    /// Visibility filter target.
    pub const FILTER: &str = "horizon_treegrid::filter";
    /// Expand/collapse controller target.
    pub const EXPANSION: &str = "horizon_treegrid::expansion";
    /// Configuration loading target.
    pub const CONFIG: &str = "horizon_treegrid::config";
}

/// A hierarchy that can be dumped by [`HierarchyDebug`].
///
/// Nodes are addressed by index. Implementations must be acyclic.
pub trait HierarchySource {
    /// Total number of nodes.
    fn node_count(&self) -> usize;

    /// Top-level nodes in display order.
    fn roots(&self) -> Vec<usize>;

    /// Direct children of `node` in display order.
    fn children(&self, node: usize) -> Vec<usize>;

    /// Text shown for `node`.
    fn label(&self, node: usize) -> String;

    /// Expansion flag of `node`, `None` for leaves.
    fn expanded(&self, _node: usize) -> Option<bool> {
        None
    }
}

/// Style options for hierarchy visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

/// Configuration for hierarchy debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node indices.
    pub show_ids: bool,
    /// Whether to show `[+]`/`[-]` expansion markers.
    pub show_expansion: bool,
    /// Skip the children of collapsed nodes, like the grid does.
    pub respect_expansion: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_expansion: true,
            respect_expansion: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options that mirror what a user currently sees.
    pub fn visible_only() -> Self {
        Self {
            respect_expansion: true,
            ..Default::default()
        }
    }

    /// Labels only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_expansion: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing hierarchies.
#[derive(Debug, Clone, Default)]
pub struct HierarchyDebug {
    options: TreeFormatOptions,
}

impl HierarchyDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole hierarchy.
    pub fn format_all<S: HierarchySource + ?Sized>(&self, source: &S) -> String {
        let mut output = String::new();
        writeln!(output, "Hierarchy ({} rows):", source.node_count()).expect("write to String");

        let roots = source.roots();
        if roots.is_empty() {
            writeln!(output, "  (empty)").expect("write to String");
            return output;
        }

        let count = roots.len();
        let mut branches = Vec::new();
        for (i, root) in roots.into_iter().enumerate() {
            self.format_subtree_into(source, root, 0, i + 1 == count, &mut branches, &mut output);
        }
        output
    }

    /// Format the subtree rooted at `node`.
    pub fn format_subtree<S: HierarchySource + ?Sized>(&self, source: &S, node: usize) -> String {
        let mut output = String::new();
        let mut branches = Vec::new();
        self.format_subtree_into(source, node, 0, true, &mut branches, &mut output);
        output
    }

    fn format_subtree_into<S: HierarchySource + ?Sized>(
        &self,
        source: &S,
        node: usize,
        depth: usize,
        is_last: bool,
        branches: &mut Vec<bool>,
        output: &mut String,
    ) {
        if let Some(max) = self.options.max_depth
            && depth > max
        {
            return;
        }

        output.push_str(&self.build_prefix(branches, depth, is_last));

        let expanded = source.expanded(node);
        if self.options.show_expansion {
            output.push_str(match expanded {
                Some(true) => "[-] ",
                Some(false) => "[+] ",
                None => "",
            });
        }
        output.push_str(&source.label(node));
        if self.options.show_ids {
            write!(output, " [#{node}]").expect("write to String");
        }
        output.push('\n');

        if self.options.respect_expansion && expanded == Some(false) {
            return;
        }

        let children = source.children(node);
        let count = children.len();
        if depth > 0 {
            branches.push(!is_last);
        }
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(source, child, depth + 1, i + 1 == count, branches, output);
        }
        if depth > 0 {
            branches.pop();
        }
    }

    /// Build the prefix string for a node.
    ///
    /// `branches[d]` records whether the ancestor at depth `d + 1` still has
    /// siblings below it, which decides between a vertical bar and a blank.
    fn build_prefix(&self, branches: &[bool], depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "", ""),
        };

        let mut prefix = String::new();
        if self.options.style == TreeStyle::Compact {
            for _ in 0..depth * self.options.indent_size {
                prefix.push(' ');
            }
            return prefix;
        }

        for &open in branches {
            prefix.push_str(if open { branch } else { " " });
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

/// `tracing::trace!` with the `horizon_treegrid` target.
#[macro_export]
macro_rules! treegrid_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_treegrid", $($arg)*)
    };
}

/// `tracing::debug!` with the `horizon_treegrid` target.
#[macro_export]
macro_rules! treegrid_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_treegrid", $($arg)*)
    };
}

/// `tracing::warn!` with the `horizon_treegrid` target.
#[macro_export]
macro_rules! treegrid_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_treegrid", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0
    /// ├── 1
    /// │   └── 3
    /// └── 2
    struct Fixture {
        expanded: [Option<bool>; 4],
    }

    impl HierarchySource for Fixture {
        fn node_count(&self) -> usize {
            4
        }

        fn roots(&self) -> Vec<usize> {
            vec![0]
        }

        fn children(&self, node: usize) -> Vec<usize> {
            match node {
                0 => vec![1, 2],
                1 => vec![3],
                _ => Vec::new(),
            }
        }

        fn label(&self, node: usize) -> String {
            ["jobs", "backup", "cleanup", "step 1"][node].to_string()
        }

        fn expanded(&self, node: usize) -> Option<bool> {
            self.expanded[node]
        }
    }

    #[test]
    fn test_format_empty() {
        struct Empty;
        impl HierarchySource for Empty {
            fn node_count(&self) -> usize {
                0
            }
            fn roots(&self) -> Vec<usize> {
                Vec::new()
            }
            fn children(&self, _node: usize) -> Vec<usize> {
                Vec::new()
            }
            fn label(&self, _node: usize) -> String {
                String::new()
            }
        }

        let output = HierarchyDebug::new().format_all(&Empty);
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_format_hierarchy_ascii() {
        let fixture = Fixture {
            expanded: [Some(true), Some(false), None, None],
        };
        let debug = HierarchyDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            show_ids: false,
            ..Default::default()
        });

        let output = debug.format_all(&fixture);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "[-] jobs");
        assert_eq!(lines[2], "+-- [+] backup");
        assert_eq!(lines[3], "|  `-- step 1");
        assert_eq!(lines[4], "`-- cleanup");
    }

    #[test]
    fn test_respect_expansion_skips_collapsed_children() {
        let fixture = Fixture {
            expanded: [Some(true), Some(false), None, None],
        };
        let output = HierarchyDebug::with_options(TreeFormatOptions::visible_only()).format_all(&fixture);

        assert!(output.contains("backup"));
        assert!(!output.contains("step 1"));
    }

    #[test]
    fn test_format_minimal() {
        let fixture = Fixture {
            expanded: [Some(true), Some(true), None, None],
        };
        let output = HierarchyDebug::with_options(TreeFormatOptions::minimal()).format_subtree(&fixture, 1);

        assert!(output.starts_with("backup\n"));
        assert!(!output.contains("[#"));
        assert!(!output.contains("[-]"));
    }

    #[test]
    fn test_max_depth() {
        let fixture = Fixture {
            expanded: [Some(true), Some(true), None, None],
        };
        let output = HierarchyDebug::with_options(TreeFormatOptions {
            max_depth: Some(1),
            ..Default::default()
        })
        .format_all(&fixture);

        assert!(output.contains("cleanup"));
        assert!(!output.contains("step 1"));
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
