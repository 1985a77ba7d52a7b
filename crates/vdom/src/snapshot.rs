//! Compact, reference-free structural snapshots.
//!
//! A `CompactNode` is a frozen copy of a subtree taken at edit-recording
//! time. It holds no node ids and no references into the live mirror
//! tree, so later mutations cannot corrupt an already-recorded edit.
//! Snapshots are the before/after/anchor payloads of structural edits
//! and are safe to serialize as-is.

use crate::path::format_tag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frozen structural copy of one subtree.
///
/// `index` is the position among the parent snapshot's children, or `-1`
/// at the snapshot root (an anchor has no meaningful position of its
/// own; replay resolves placement from emission order).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompactNode {
    Text(String),
    Element {
        type_name: String,
        key: Option<String>,
        class_name: Option<String>,
        index: i32,
        children: Vec<CompactNode>,
    },
}

impl CompactNode {
    pub fn key(&self) -> Option<&str> {
        match self {
            CompactNode::Text(_) => None,
            CompactNode::Element { key, .. } => key.as_deref(),
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            CompactNode::Text(_) => None,
            CompactNode::Element { type_name, .. } => Some(type_name),
        }
    }

    pub fn children(&self) -> &[CompactNode] {
        match self {
            CompactNode::Text(_) => &[],
            CompactNode::Element { children, .. } => children,
        }
    }

    /// Tag line for diagnostics, same shape as path formatting.
    pub fn format_tag(&self) -> String {
        match self {
            CompactNode::Text(value) => format!("{value:?}"),
            CompactNode::Element {
                type_name,
                key,
                class_name,
                index,
                ..
            } => format_tag(type_name, key.as_deref(), class_name.as_deref(), *index),
        }
    }
}

impl fmt::Display for CompactNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(node: &CompactNode, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if depth != 0 {
                writeln!(f)?;
            }
            write!(f, "{:indent$}", "", indent = depth * 2)?;
            match node {
                CompactNode::Text(_) => write!(f, "{}", node.format_tag()),
                CompactNode::Element { children, .. } => {
                    write!(f, "<{} />", node.format_tag())?;
                    for child in children {
                        walk(child, depth + 1, f)?;
                    }
                    Ok(())
                }
            }
        }
        walk(self, 0, f)
    }
}
