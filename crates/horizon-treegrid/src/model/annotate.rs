//! Hierarchy annotation.
//!
//! [`HierarchyAnnotator`] turns the flat row array into an [`Annotations`]
//! side table: depth, sibling position, child counts and group ids. The
//! table is always rebuilt from scratch, so annotating the same rows twice
//! yields identical results and child counts can never be double-counted.
//!
//! # Algorithm
//!
//! 1. Resolve every row's parent. References past the end of the store, or
//!    to the row itself, dangle.
//! 2. Build children lists in array order. Sibling positions and set sizes
//!    fall out of these lists.
//! 3. Walk the forest depth-first from the roots to assign levels, which
//!    tolerates parents that appear after their children.
//! 4. Whatever the walk did not reach sits on or below a parent cycle. The
//!    lowest-index row of the cycle is cut loose and becomes a root.
//! 5. Parents get a group guid, reused from the previous table when the row
//!    was already a parent there.

use std::sync::Arc;

use horizon_treegrid_core::logging::{span_names, targets};
use horizon_treegrid_core::{GroupGuid, IdGenerator, PerfSpan};
use serde::{Deserialize, Serialize};

use super::row::{Row, RowKind};
use crate::error::{Result, TreeGridError};

/// How the annotator treats rows whose parent cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DanglingParentPolicy {
    /// Log a warning and treat the row as top-level.
    #[default]
    DemoteToRoot,
    /// Fail the whole annotation pass.
    Reject,
}

/// Derived hierarchy attributes of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Annotation {
    /// Depth, 1 for top-level rows.
    pub level: usize,
    /// Whether any row resolves its parent to this one.
    pub is_parent: bool,
    /// Number of direct children.
    pub set_size: usize,
    /// 1-based position among siblings, in array order.
    pub pos_in_set: usize,
    /// Id of the sibling group this row heads, for parents.
    pub group_guid: Option<GroupGuid>,
    /// `group_guid` of the parent, for children.
    pub parent_guid: Option<GroupGuid>,
    /// Resolved parent. `None` for roots and demoted rows.
    pub parent: Option<usize>,
}

/// Annotation side table for a whole store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    entries: Vec<Annotation>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
    preorder: Vec<usize>,
    demoted: Vec<usize>,
}

impl Annotations {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotation of the row at `index`.
    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.entries.get(index)
    }

    /// Number of annotated rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no rows are annotated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates annotations in store order.
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.entries.iter()
    }

    /// Top-level rows in store order, demoted rows included.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Direct children of `index` in store order.
    pub fn children(&self, index: usize) -> &[usize] {
        self.children.get(index).map_or(&[], Vec::as_slice)
    }

    /// Resolved parent of `index`.
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.entries.get(index).and_then(|a| a.parent)
    }

    /// Every row, each listed after its parent.
    pub fn preorder(&self) -> &[usize] {
        &self.preorder
    }

    /// Rows whose parent reference was dropped during annotation.
    pub fn demoted(&self) -> &[usize] {
        &self.demoted
    }

    /// Rows that have at least one child.
    pub fn parents(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_parent)
            .map(|(index, _)| index)
    }

    /// Ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent(index), move |&p| self.parent(p))
    }
}

/// Computes [`Annotations`] for a row array.
#[derive(Clone)]
pub struct HierarchyAnnotator {
    ids: Arc<dyn IdGenerator>,
    policy: DanglingParentPolicy,
}

impl std::fmt::Debug for HierarchyAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyAnnotator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl HierarchyAnnotator {
    /// Creates an annotator minting group ids from `ids`.
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            policy: DanglingParentPolicy::default(),
        }
    }

    /// Sets the dangling-parent policy.
    pub fn with_policy(mut self, policy: DanglingParentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The dangling-parent policy.
    pub fn policy(&self) -> DanglingParentPolicy {
        self.policy
    }

    /// Annotates `rows` from scratch.
    ///
    /// `previous` is the table of an earlier pass over a prefix of the same
    /// rows (before an append); group guids of rows that were already
    /// parents are carried over.
    pub fn annotate<T>(&self, rows: &[Row<T>], previous: Option<&Annotations>) -> Result<Annotations> {
        let kinds: Vec<RowKind> = rows.iter().map(Row::kind).collect();
        self.annotate_kinds(&kinds, previous)
    }

    /// Annotates a store described only by its row kinds.
    ///
    /// Lets a caller validate a prospective store (say, current rows plus an
    /// incoming batch) before committing to it.
    pub fn annotate_kinds(&self, kinds: &[RowKind], previous: Option<&Annotations>) -> Result<Annotations> {
        let _perf = PerfSpan::new(span_names::ANNOTATE);
        let len = kinds.len();

        // Pass 1: resolve parents.
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(len);
        let mut demoted = Vec::new();
        for (index, kind) in kinds.iter().enumerate() {
            let resolved = match kind.parent() {
                None => None,
                Some(parent) if parent < len && parent != index => Some(parent),
                Some(parent) => {
                    if self.policy == DanglingParentPolicy::Reject {
                        return Err(TreeGridError::dangling_parent(index, parent));
                    }
                    tracing::warn!(
                        target: targets::ANNOTATE,
                        row = index,
                        parent,
                        "dangling parent reference, demoting row to root"
                    );
                    demoted.push(index);
                    None
                }
            };
            parents.push(resolved);
        }

        // Pass 2: children lists in array order.
        let mut roots = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
        for (index, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(index),
                None => roots.push(index),
            }
        }

        // Levels, cutting cycles until every row is reached.
        let mut levels = vec![0usize; len];
        let mut preorder = Vec::with_capacity(len);
        for &root in &roots {
            walk(root, &children, &mut levels, &mut preorder);
        }

        let mut stamps = vec![0usize; len];
        let mut stamp = 0;
        let mut cursor = 0;
        while preorder.len() < len {
            while cursor < len && levels[cursor] != 0 {
                cursor += 1;
            }
            if cursor == len {
                break;
            }
            stamp += 1;
            let row = lowest_on_cycle(cursor, &parents, &mut stamps, stamp);
            if self.policy == DanglingParentPolicy::Reject {
                return Err(TreeGridError::ParentCycle { row });
            }
            tracing::warn!(
                target: targets::ANNOTATE,
                row,
                "parent cycle, demoting row to root"
            );

            if let Some(parent) = parents[row].take() {
                children[parent].retain(|&c| c != row);
            }
            let at = roots.partition_point(|&r| r < row);
            roots.insert(at, row);
            demoted.push(row);
            walk(row, &children, &mut levels, &mut preorder);
        }
        demoted.sort_unstable();

        // Sibling positions and group ids.
        let mut entries = vec![Annotation::default(); len];
        for (pos, &root) in roots.iter().enumerate() {
            entries[root].pos_in_set = pos + 1;
        }
        for (index, kids) in children.iter().enumerate() {
            for (pos, &child) in kids.iter().enumerate() {
                entries[child].pos_in_set = pos + 1;
            }

            let entry = &mut entries[index];
            entry.level = levels[index];
            entry.parent = parents[index];
            entry.set_size = kids.len();
            entry.is_parent = !kids.is_empty();
            if entry.is_parent {
                let reused = previous
                    .and_then(|prev| prev.get(index))
                    .and_then(|prev| prev.group_guid);
                entry.group_guid = Some(reused.unwrap_or_else(|| self.ids.next_id()));
            }
        }
        for index in 0..len {
            if let Some(parent) = parents[index] {
                entries[index].parent_guid = entries[parent].group_guid;
            }
        }

        tracing::debug!(
            target: targets::ANNOTATE,
            rows = len,
            roots = roots.len(),
            demoted = demoted.len(),
            "annotated hierarchy"
        );

        Ok(Annotations {
            entries,
            roots,
            children,
            preorder,
            demoted,
        })
    }
}

/// Depth-first walk from `root`, assigning levels and recording pre-order.
fn walk(root: usize, children: &[Vec<usize>], levels: &mut [usize], preorder: &mut Vec<usize>) {
    let mut stack = vec![(root, 1)];
    while let Some((node, level)) = stack.pop() {
        levels[node] = level;
        preorder.push(node);
        for &child in children[node].iter().rev() {
            stack.push((child, level + 1));
        }
    }
}

/// Follows parents from an unreached row until the chain loops, then returns
/// the lowest index on that loop.
fn lowest_on_cycle(start: usize, parents: &[Option<usize>], stamps: &mut [usize], stamp: usize) -> usize {
    let mut node = start;
    while stamps[node] != stamp {
        stamps[node] = stamp;
        match parents[node] {
            Some(parent) => node = parent,
            None => return node,
        }
    }

    let entry = node;
    let mut lowest = node;
    while let Some(parent) = parents[node] {
        if parent == entry {
            break;
        }
        lowest = lowest.min(parent);
        node = parent;
    }
    lowest
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_treegrid_core::SequentialIdGenerator;

    fn annotator() -> HierarchyAnnotator {
        HierarchyAnnotator::new(Arc::new(SequentialIdGenerator::new()))
    }

    fn levels(annotations: &Annotations) -> Vec<usize> {
        annotations.iter().map(|a| a.level).collect()
    }

    #[test]
    fn test_basic_hierarchy() {
        // 0
        // ├── 1
        // │   └── 2
        // └── 3
        // 4
        let rows = vec![
            Row::root("a"),
            Row::child(0, "b"),
            Row::child(1, "c"),
            Row::child(0, "d"),
            Row::root("e"),
        ];
        let annotations = annotator().annotate(&rows, None).unwrap();

        assert_eq!(levels(&annotations), vec![1, 2, 3, 2, 1]);
        let root = annotations.get(0).unwrap();
        assert!(root.is_parent);
        assert_eq!(root.set_size, 2);
        assert_eq!(annotations.get(3).unwrap().pos_in_set, 2);
        assert_eq!(annotations.get(4).unwrap().pos_in_set, 2);
        assert_eq!(annotations.roots(), &[0, 4]);
        assert_eq!(annotations.children(0), &[1, 3]);
        assert_eq!(annotations.preorder(), &[0, 1, 2, 3, 4]);
        assert_eq!(annotations.parents().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_guids_link_children_to_parent() {
        let rows = vec![Row::root(()), Row::child(0, ()), Row::child(0, ())];
        let annotations = annotator().annotate(&rows, None).unwrap();

        let guid = annotations.get(0).unwrap().group_guid;
        assert!(guid.is_some());
        assert_eq!(annotations.get(1).unwrap().parent_guid, guid);
        assert_eq!(annotations.get(2).unwrap().group_guid, None);
    }

    #[test]
    fn test_parent_after_child() {
        let rows = vec![Row::child(2, "late child"), Row::child(0, "grandchild"), Row::root("parent")];
        let annotations = annotator().annotate(&rows, None).unwrap();

        assert_eq!(levels(&annotations), vec![2, 3, 1]);
        assert_eq!(annotations.preorder(), &[2, 0, 1]);
        assert!(annotations.demoted().is_empty());
    }

    #[test]
    fn test_dangling_parent_demoted() {
        let rows = vec![Row::root(()), Row::child(42, ()), Row::child(2, ())];
        let annotations = annotator().annotate(&rows, None).unwrap();

        assert_eq!(levels(&annotations), vec![1, 1, 1]);
        assert_eq!(annotations.demoted(), &[1, 2]);
        assert_eq!(annotations.roots(), &[0, 1, 2]);
        assert_eq!(annotations.get(1).unwrap().parent, None);
    }

    #[test]
    fn test_dangling_parent_rejected() {
        let rows = vec![Row::root(()), Row::child(42, ())];
        let err = annotator()
            .with_policy(DanglingParentPolicy::Reject)
            .annotate(&rows, None)
            .unwrap_err();

        assert!(matches!(
            err,
            TreeGridError::DanglingParentReference { row: 1, parent: 42 }
        ));
    }

    #[test]
    fn test_cycle_is_cut_at_lowest_index() {
        // 1 -> 2 -> 3 -> 1, with 4 hanging below 3.
        let rows = vec![
            Row::root(()),
            Row::child(3, ()),
            Row::child(1, ()),
            Row::child(2, ()),
            Row::child(3, ()),
        ];
        let annotations = annotator().annotate(&rows, None).unwrap();

        assert_eq!(annotations.demoted(), &[1]);
        assert_eq!(annotations.roots(), &[0, 1]);
        assert_eq!(levels(&annotations), vec![1, 1, 2, 3, 4]);
        assert_eq!(annotations.get(3).unwrap().set_size, 1);
    }

    #[test]
    fn test_cycle_rejected() {
        let rows = vec![Row::child(1, ()), Row::child(0, ())];
        let err = annotator()
            .with_policy(DanglingParentPolicy::Reject)
            .annotate(&rows, None)
            .unwrap_err();

        assert!(matches!(err, TreeGridError::ParentCycle { row: 0 }));
    }

    #[test]
    fn test_reannotation_reuses_guids() {
        let annotator = annotator();
        let mut rows = vec![Row::root(()), Row::child(0, ())];
        let first = annotator.annotate(&rows, None).unwrap();

        rows.push(Row::child(0, ()));
        rows.push(Row::child(1, ()));
        let second = annotator.annotate(&rows, Some(&first)).unwrap();

        assert_eq!(second.get(0).unwrap().group_guid, first.get(0).unwrap().group_guid);
        assert_eq!(second.get(0).unwrap().set_size, 2);
        assert!(second.get(1).unwrap().group_guid.is_some());
        assert_ne!(second.get(1).unwrap().group_guid, second.get(0).unwrap().group_guid);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let rows = vec![Row::root(()), Row::child(0, ()), Row::child(1, ())];
        let annotations = annotator().annotate(&rows, None).unwrap();

        assert_eq!(annotations.ancestors(2).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(annotations.ancestors(0).count(), 0);
    }

    #[test]
    fn test_empty_store() {
        let annotations = annotator().annotate::<()>(&[], None).unwrap();
        assert!(annotations.is_empty());
        assert!(annotations.preorder().is_empty());
    }
}
