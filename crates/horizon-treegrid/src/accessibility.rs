//! Accessibility attributes of tree-grid rows.
//!
//! Screen readers learn the shape of a tree-grid from four per-row
//! attributes. [`AriaAttributes`] carries them straight from the annotation
//! table, and can render them as `aria-*` pairs or, with the
//! `accessibility` feature, as an AccessKit node.

use crate::model::Annotation;

/// The four hierarchy attributes of a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AriaAttributes {
    /// `aria-level`: depth, 1 for top-level rows.
    pub level: usize,
    /// `aria-posinset`: 1-based position among siblings.
    pub pos_in_set: usize,
    /// `aria-setsize`: the row's set size as annotated.
    pub set_size: usize,
    /// `aria-expanded`: present only on parent rows.
    pub expanded: Option<bool>,
}

impl AriaAttributes {
    /// Builds the attributes of a row from its annotation and flag.
    pub fn new(annotation: &Annotation, expanded: Option<bool>) -> Self {
        Self {
            level: annotation.level,
            pos_in_set: annotation.pos_in_set,
            set_size: annotation.set_size,
            expanded: if annotation.is_parent {
                Some(expanded.unwrap_or(false))
            } else {
                None
            },
        }
    }

    /// Attribute name/value pairs, `aria-expanded` last and only for parents.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("aria-level", self.level.to_string()),
            ("aria-posinset", self.pos_in_set.to_string()),
            ("aria-setsize", self.set_size.to_string()),
        ];
        if let Some(expanded) = self.expanded {
            pairs.push(("aria-expanded", expanded.to_string()));
        }
        pairs
    }

    /// Builds an AccessKit row node carrying the same attributes.
    #[cfg(feature = "accessibility")]
    pub fn to_accesskit_node(&self, label: Option<&str>) -> accesskit::Node {
        let mut node = accesskit::Node::new(accesskit::Role::Row);
        node.set_level(self.level);
        node.set_position_in_set(self.pos_in_set);
        node.set_size_of_set(self.set_size);
        if let Some(expanded) = self.expanded {
            node.set_expanded(expanded);
        }
        if let Some(label) = label {
            node.set_label(label);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(is_parent: bool) -> Annotation {
        Annotation {
            level: 2,
            is_parent,
            set_size: if is_parent { 3 } else { 0 },
            pos_in_set: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_parent_attributes() {
        let aria = AriaAttributes::new(&annotation(true), Some(true));
        assert_eq!(
            aria.to_pairs(),
            vec![
                ("aria-level", "2".to_string()),
                ("aria-posinset", "1".to_string()),
                ("aria-setsize", "3".to_string()),
                ("aria-expanded", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_leaf_has_no_expanded() {
        let aria = AriaAttributes::new(&annotation(false), Some(true));
        assert_eq!(aria.expanded, None);
        assert_eq!(aria.to_pairs().len(), 3);
    }

    #[test]
    fn test_unflagged_parent_reads_collapsed() {
        let aria = AriaAttributes::new(&annotation(true), None);
        assert_eq!(aria.expanded, Some(false));
    }

    #[cfg(feature = "accessibility")]
    #[test]
    fn test_accesskit_node() {
        let aria = AriaAttributes::new(&annotation(true), Some(false));
        let node = aria.to_accesskit_node(Some("nightly backup"));

        assert_eq!(node.role(), accesskit::Role::Row);
        assert_eq!(node.level(), Some(2));
        assert_eq!(node.size_of_set(), Some(3));
        assert_eq!(node.is_expanded(), Some(false));
    }
}
