//! Document snapshot contract.
//!
//! Adapters describe the host page as a flat, document-ordered node list plus a
//! set of optional landmark elements. The core never touches the live tree; it
//! reads the snapshot and answers with effects keyed by [`ElementId`].

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;

/// One element of the host page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: ElementId,
    /// Lower-case tag name.
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub parent: Option<ElementId>,
    /// False when the element produces no layout box (display:none, detached).
    #[serde(default = "yes")]
    pub has_box: bool,
    /// Full text content, descendants included.
    #[serde(default)]
    pub text: String,
}

fn yes() -> bool {
    true
}

impl NodeInfo {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Optional collaborators the state machine and stager look for.
/// Any of them may be absent; callers degrade accordingly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    #[serde(default)]
    pub overlay: Option<ElementId>,
    /// Decorative copy of the title that animates during preopen.
    #[serde(default)]
    pub clone: Option<ElementId>,
    /// Left half of the split center text; preopen watch target without a clone.
    #[serde(default)]
    pub center_text_left: Option<ElementId>,
    #[serde(default)]
    pub center_text: Option<ElementId>,
    #[serde(default)]
    pub emblem: Option<ElementId>,
    /// The two animated halves of the overlay.
    #[serde(default)]
    pub panels: Vec<ElementId>,
    /// Second activation target (e.g. an "enter" prompt) besides the overlay.
    #[serde(default)]
    pub secondary_target: Option<ElementId>,
    #[serde(default)]
    pub content_root: Option<ElementId>,
    /// Persistent fixed control (e.g. a theme toggle) that must never be staged.
    #[serde(default)]
    pub control_widget: Option<ElementId>,
}

/// Flat view of the page, nodes in document order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
    #[serde(default)]
    pub landmarks: Landmarks,
}

impl DocumentSnapshot {
    pub fn node(&self, id: ElementId) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// True when `ancestor` is `id` itself or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut cursor = Some(id);
        // Bounded by node count so a malformed parent cycle cannot hang.
        for _ in 0..=self.nodes.len() {
            match cursor {
                Some(c) if c == ancestor => return true,
                Some(c) => cursor = self.node(c).and_then(|n| n.parent),
                None => return false,
            }
        }
        false
    }

    /// Nodes under the content root (exclusive), or every node without one.
    pub fn content_nodes(&self) -> impl Iterator<Item = &NodeInfo> {
        let root = self.landmarks.content_root;
        self.nodes.iter().filter(move |n| match root {
            Some(r) => n.id != r && self.is_inclusive_ancestor(r, n.id),
            None => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, parent: Option<u32>) -> NodeInfo {
        NodeInfo {
            id: ElementId(id),
            tag: "div".into(),
            classes: vec![],
            parent: parent.map(ElementId),
            has_box: true,
            text: String::new(),
        }
    }

    #[test]
    fn ancestry_walks_parent_chain() {
        let doc = DocumentSnapshot {
            nodes: vec![node(0, None), node(1, Some(0)), node(2, Some(1)), node(3, None)],
            landmarks: Landmarks::default(),
        };
        assert!(doc.is_inclusive_ancestor(ElementId(0), ElementId(2)));
        assert!(doc.is_inclusive_ancestor(ElementId(2), ElementId(2)));
        assert!(!doc.is_inclusive_ancestor(ElementId(3), ElementId(2)));
        assert!(!doc.is_inclusive_ancestor(ElementId(2), ElementId(0)));
    }

    #[test]
    fn parent_cycle_terminates() {
        let doc = DocumentSnapshot {
            nodes: vec![node(0, Some(1)), node(1, Some(0))],
            landmarks: Landmarks::default(),
        };
        assert!(!doc.is_inclusive_ancestor(ElementId(7), ElementId(0)));
    }

    #[test]
    fn content_nodes_respect_root() {
        let doc = DocumentSnapshot {
            nodes: vec![node(0, None), node(1, Some(0)), node(2, None)],
            landmarks: Landmarks {
                content_root: Some(ElementId(0)),
                ..Landmarks::default()
            },
        };
        let ids: Vec<_> = doc.content_nodes().map(|n| n.id).collect();
        assert_eq!(ids, vec![ElementId(1)]);
    }
}
