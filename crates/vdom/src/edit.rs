//! Edit records: the output protocol of a diff session.
//!
//! One `Edit` describes one recorded change, addressed by a structural
//! path. Invariants:
//! - Edits are emitted in document order (node before descendants,
//!   siblings left to right).
//! - Within one node the kind order is fixed: styles, then props, then
//!   tree-structural edits, then text.
//! - Structural edits carry the *parent* node's path, never the path of
//!   the inserted/moved/removed subtree.
//! - Payloads are compact snapshots or plain values; an edit list is
//!   self-contained and serializable without references into the live
//!   mirror tree.

use crate::path::NodePath;
use crate::snapshot::CompactNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminant of an [`Edit`], useful for filtering and assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    UpdateText,
    AddStyles,
    UpdateStyles,
    RemoveStyles,
    AddProps,
    UpdateProps,
    RemoveProps,
    InsertTree,
    MoveTree,
    RemoveTree,
    ReplaceTree,
}

/// Name/value dictionary payload for style and prop edits.
pub type ValueMap = BTreeMap<String, String>;

/// One recorded change produced by a diff session.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edit {
    /// A text leaf changed value.
    UpdateText {
        path: NodePath,
        old_value: String,
        new_value: String,
    },
    /// Styles that did not exist before; keys coalesced per pass.
    AddStyles { path: NodePath, new_value: ValueMap },
    /// Styles whose value changed; old and new maps share key sets.
    UpdateStyles {
        path: NodePath,
        old_value: ValueMap,
        new_value: ValueMap,
    },
    /// Styles removed; old values retained for replay in reverse.
    RemoveStyles { path: NodePath, old_value: ValueMap },
    /// Props that did not exist before.
    AddProps { path: NodePath, new_value: ValueMap },
    /// Props whose value changed.
    UpdateProps {
        path: NodePath,
        old_value: ValueMap,
        new_value: ValueMap,
    },
    /// Props removed.
    RemoveProps { path: NodePath, old_value: ValueMap },
    /// A subtree inserted under the node at `path`, positioned before
    /// `before` (`None` appends at the end).
    InsertTree {
        path: NodePath,
        new_value: CompactNode,
        before: Option<CompactNode>,
    },
    /// An existing child moved before `before` under the node at `path`.
    MoveTree {
        path: NodePath,
        old_value: CompactNode,
        before: CompactNode,
    },
    /// A subtree removed from under the node at `path`.
    RemoveTree { path: NodePath, old_value: CompactNode },
    /// A subtree replaced in place under the node at `path`.
    ReplaceTree {
        path: NodePath,
        old_value: CompactNode,
        new_value: CompactNode,
    },
}

impl Edit {
    pub fn kind(&self) -> EditKind {
        match self {
            Edit::UpdateText { .. } => EditKind::UpdateText,
            Edit::AddStyles { .. } => EditKind::AddStyles,
            Edit::UpdateStyles { .. } => EditKind::UpdateStyles,
            Edit::RemoveStyles { .. } => EditKind::RemoveStyles,
            Edit::AddProps { .. } => EditKind::AddProps,
            Edit::UpdateProps { .. } => EditKind::UpdateProps,
            Edit::RemoveProps { .. } => EditKind::RemoveProps,
            Edit::InsertTree { .. } => EditKind::InsertTree,
            Edit::MoveTree { .. } => EditKind::MoveTree,
            Edit::RemoveTree { .. } => EditKind::RemoveTree,
            Edit::ReplaceTree { .. } => EditKind::ReplaceTree,
        }
    }

    pub fn path(&self) -> &NodePath {
        match self {
            Edit::UpdateText { path, .. }
            | Edit::AddStyles { path, .. }
            | Edit::UpdateStyles { path, .. }
            | Edit::RemoveStyles { path, .. }
            | Edit::AddProps { path, .. }
            | Edit::UpdateProps { path, .. }
            | Edit::RemoveProps { path, .. }
            | Edit::InsertTree { path, .. }
            | Edit::MoveTree { path, .. }
            | Edit::RemoveTree { path, .. }
            | Edit::ReplaceTree { path, .. } => path,
        }
    }

    /// True for insert/move/remove/replace-tree edits.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind(),
            EditKind::InsertTree | EditKind::MoveTree | EditKind::RemoveTree | EditKind::ReplaceTree
        )
    }
}
