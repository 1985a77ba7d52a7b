//! Structural paths addressing where an edit applies.
//!
//! A `NodePath` is the ancestor chain of one mirror node, recorded at
//! poll time. Invariants:
//! - Paths are immutable; `append` returns a new path and never mutates
//!   the original.
//! - Container nodes contribute no path node.
//! - A component boundary contributes a synthetic path node positioned
//!   directly before the path node of the component's root element.
//! - Equality is depth-equal, field-wise comparison at every depth.
//!   `format()` is for diagnostics only and never participates in
//!   equality.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Path node type name used for text leaves, which carry no renderer tag.
pub const TEXT_TYPE_NAME: &str = "$text";

/// One ancestor entry in a [`NodePath`].
///
/// `index` is the position among the parent's realized children, or `-1`
/// when the node has no positional index (session root, or the root
/// element of a component subtree).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub type_name: String,
    pub key: Option<String>,
    pub class_name: Option<String>,
    pub index: i32,
}

impl PathNode {
    pub fn text(index: i32) -> Self {
        Self {
            type_name: TEXT_TYPE_NAME.to_string(),
            key: None,
            class_name: None,
            index,
        }
    }

    /// Renders `Type key="k" className="c" $index="i"`, omitting unset
    /// fields. Shared with compact-snapshot formatting.
    pub fn format_tag(&self) -> String {
        format_tag(
            &self.type_name,
            self.key.as_deref(),
            self.class_name.as_deref(),
            self.index,
        )
    }
}

pub(crate) fn format_tag(
    type_name: &str,
    key: Option<&str>,
    class_name: Option<&str>,
    index: i32,
) -> String {
    let mut tag = String::from(type_name);
    if let Some(key) = key {
        let _ = write!(tag, " key=\"{key}\"");
    }
    if let Some(class_name) = class_name {
        let _ = write!(tag, " className=\"{class_name}\"");
    }
    if index > -1 {
        let _ = write!(tag, " $index=\"{index}\"");
    }
    tag
}

/// Immutable ancestor path. Copy-on-append: the shared prefix is cloned,
/// never aliased mutably.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePath {
    nodes: Vec<PathNode>,
}

impl NodePath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Returns a new path with `node` appended. `self` is unchanged.
    #[must_use]
    pub fn append(&self, node: PathNode) -> NodePath {
        let mut nodes = self.nodes.clone();
        nodes.push(node);
        NodePath { nodes }
    }

    /// Human-readable breadcrumb, one `<...>` line per ancestor.
    pub fn format(&self) -> String {
        let mut out = String::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if i != 0 {
                out.push('\n');
            }
            let _ = write!(out, "<{} />", node.format_tag());
        }
        out
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(type_name: &str, index: i32) -> PathNode {
        PathNode {
            type_name: type_name.to_string(),
            key: None,
            class_name: None,
            index,
        }
    }

    #[test]
    fn append_does_not_mutate_original() {
        let base = NodePath::empty().append(node("div", 0));
        let extended = base.append(node("p", 1));
        assert_eq!(base.depth(), 1);
        assert_eq!(extended.depth(), 2);
        assert_eq!(extended.nodes()[0], base.nodes()[0]);
    }

    #[test]
    fn equality_is_fieldwise_at_every_depth() {
        let a = NodePath::empty().append(node("div", 0)).append(node("p", 1));
        let b = NodePath::empty().append(node("div", 0)).append(node("p", 1));
        assert_eq!(a, b);

        let c = NodePath::empty().append(node("div", 0)).append(node("p", 2));
        assert_ne!(a, c);

        let shallow = NodePath::empty().append(node("div", 0));
        assert_ne!(a, shallow);
    }

    #[test]
    fn format_renders_breadcrumb() {
        let path = NodePath::empty()
            .append(PathNode {
                type_name: "Bar".to_string(),
                key: Some("0".to_string()),
                class_name: None,
                index: 0,
            })
            .append(PathNode {
                type_name: "div".to_string(),
                key: None,
                class_name: Some("bar".to_string()),
                index: 0,
            });
        assert_eq!(
            path.format(),
            "<Bar key=\"0\" $index=\"0\" />\n<div className=\"bar\" $index=\"0\" />"
        );
    }

    #[test]
    fn format_omits_negative_index() {
        assert_eq!(node("div", -1).format_tag(), "div");
    }

    #[test]
    fn text_path_node_has_reserved_type() {
        let t = PathNode::text(3);
        assert_eq!(t.type_name, TEXT_TYPE_NAME);
        assert_eq!(t.format_tag(), "$text $index=\"3\"");
    }
}
