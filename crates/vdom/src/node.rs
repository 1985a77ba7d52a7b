//! Mirror node storage and per-node edit buffering.
//!
//! Every mutation the external renderer performs is coalesced into the
//! target node's buffers instead of touching a display surface. Buffer
//! contract:
//! - "create on first write, coalesce on repeat write": a nullable
//!   merge-dictionary per edit kind; the first mutation allocates it,
//!   repeats merge keys into it.
//! - `build_edits` drains every non-empty buffer exactly once, in the
//!   fixed kind order styles, props, text. Structural buffers drain in
//!   the order insert, remove, move, replace via `build_tree_edits`.
//! - Draining again without intervening mutations yields nothing.

use crate::edit::{Edit, ValueMap};
use crate::path::NodePath;
use crate::pending::PendingInserts;
use crate::snapshot::CompactNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arena index of a mirror node. Ids are per-session; two sessions
/// never share an id space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity the external renderer attaches to a node, used for path
/// construction and snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTag {
    pub type_name: String,
    pub key: Option<String>,
    pub class_name: Option<String>,
}

impl NodeTag {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            key: None,
            class_name: None,
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }
}

/// Old/new halves of an update buffer. Key sets stay aligned because
/// both maps are written together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdatePayload {
    pub old: ValueMap,
    pub new: ValueMap,
}

/// Merge-on-write slot for add/remove buffers. Pure function of the
/// existing buffer and one (key, value) write.
pub(crate) fn merge_write(slot: &mut Option<ValueMap>, name: &str, value: &str) {
    slot.get_or_insert_with(BTreeMap::new)
        .insert(name.to_string(), value.to_string());
}

/// Merge-on-write for update buffers: records both halves of the pair.
pub(crate) fn merge_update(slot: &mut Option<UpdatePayload>, name: &str, old: &str, new: &str) {
    let payload = slot.get_or_insert_with(UpdatePayload::default);
    payload.old.insert(name.to_string(), old.to_string());
    payload.new.insert(name.to_string(), new.to_string());
}

/// Pending non-structural edits of one node.
#[derive(Clone, Debug, Default)]
pub struct EditBuffers {
    pub(crate) add_styles: Option<ValueMap>,
    pub(crate) update_styles: Option<UpdatePayload>,
    pub(crate) remove_styles: Option<ValueMap>,
    pub(crate) add_props: Option<ValueMap>,
    pub(crate) update_props: Option<UpdatePayload>,
    pub(crate) remove_props: Option<ValueMap>,
    /// Self-coalescing text pair: old = value at start of the pass,
    /// new = latest value.
    pub(crate) update_text: Option<(String, String)>,
}

impl EditBuffers {
    pub fn is_empty(&self) -> bool {
        self.add_styles.is_none()
            && self.update_styles.is_none()
            && self.remove_styles.is_none()
            && self.add_props.is_none()
            && self.update_props.is_none()
            && self.remove_props.is_none()
            && self.update_text.is_none()
    }

    /// Drain all buffers into edit records at `path`, fixed kind order.
    pub fn build_edits(&mut self, path: &NodePath) -> Vec<Edit> {
        let mut edits = Vec::new();
        if let Some(new_value) = self.add_styles.take() {
            edits.push(Edit::AddStyles {
                path: path.clone(),
                new_value,
            });
        }
        if let Some(payload) = self.update_styles.take() {
            edits.push(Edit::UpdateStyles {
                path: path.clone(),
                old_value: payload.old,
                new_value: payload.new,
            });
        }
        if let Some(old_value) = self.remove_styles.take() {
            edits.push(Edit::RemoveStyles {
                path: path.clone(),
                old_value,
            });
        }
        if let Some(new_value) = self.add_props.take() {
            edits.push(Edit::AddProps {
                path: path.clone(),
                new_value,
            });
        }
        if let Some(payload) = self.update_props.take() {
            edits.push(Edit::UpdateProps {
                path: path.clone(),
                old_value: payload.old,
                new_value: payload.new,
            });
        }
        if let Some(old_value) = self.remove_props.take() {
            edits.push(Edit::RemoveProps {
                path: path.clone(),
                old_value,
            });
        }
        if let Some((old_value, new_value)) = self.update_text.take() {
            edits.push(Edit::UpdateText {
                path: path.clone(),
                old_value,
                new_value,
            });
        }
        edits
    }
}

/// Pending structural edits of one parent node. Insert payloads are
/// produced by the pending-insert flush; the rest are buffered at
/// mutation time with snapshots taken immediately.
#[derive(Clone, Debug, Default)]
pub struct TreeEditBuffers {
    pub(crate) inserts: Vec<(CompactNode, Option<CompactNode>)>,
    pub(crate) removes: Vec<CompactNode>,
    pub(crate) moves: Vec<(CompactNode, CompactNode)>,
    pub(crate) replaces: Vec<(CompactNode, CompactNode)>,
}

impl TreeEditBuffers {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
            && self.removes.is_empty()
            && self.moves.is_empty()
            && self.replaces.is_empty()
    }

    /// Drain structural buffers into edit records at `path`.
    pub fn build_tree_edits(&mut self, path: &NodePath) -> Vec<Edit> {
        let mut edits = Vec::new();
        for (new_value, before) in self.inserts.drain(..) {
            edits.push(Edit::InsertTree {
                path: path.clone(),
                new_value,
                before,
            });
        }
        for old_value in self.removes.drain(..) {
            edits.push(Edit::RemoveTree {
                path: path.clone(),
                old_value,
            });
        }
        for (old_value, before) in self.moves.drain(..) {
            edits.push(Edit::MoveTree {
                path: path.clone(),
                old_value,
                before,
            });
        }
        for (old_value, new_value) in self.replaces.drain(..) {
            edits.push(Edit::ReplaceTree {
                path: path.clone(),
                old_value,
                new_value,
            });
        }
        edits
    }
}

/// Child bookkeeping shared by element and container nodes.
#[derive(Clone, Debug, Default)]
pub struct ParentState {
    /// Realized children. Post-render this array is the authoritative
    /// baseline and is never mutated by structural edits.
    pub(crate) children: Vec<NodeId>,
    pub(crate) pending_inserts: PendingInserts,
    pub(crate) tree_edits: TreeEditBuffers,
}

/// Variant payload of a mirror node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Leaf text node; holds the baseline string value.
    Text { value: String },
    /// Element-like parent node.
    Element {
        tag_name: String,
        class_name: Option<String>,
        attrs: ValueMap,
        styles: ValueMap,
        parent: ParentState,
    },
    /// Degenerate parent representing the session's attachment root.
    /// Excluded from emitted paths.
    Container { parent: ParentState },
}

/// One shadow node. The renderer mutates nodes only through the
/// `MirrorTree` sink; buffered state is drained by the poll walk.
#[derive(Clone, Debug)]
pub struct MirrorNode {
    /// False while the baseline tree is being built; true after the
    /// session's single Unrendered -> Rendered transition.
    pub(crate) rendered: bool,
    /// Identity attached by the renderer (`None` for text/container).
    pub(crate) tag: Option<NodeTag>,
    /// Synthetic component boundary rooted at this node, if any.
    pub(crate) component: Option<NodeTag>,
    pub(crate) buffers: EditBuffers,
    pub(crate) kind: NodeKind,
}

impl MirrorNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            rendered: false,
            tag: None,
            component: None,
            buffers: EditBuffers::default(),
            kind,
        }
    }

    pub(crate) fn parent_state(&self) -> Option<&ParentState> {
        match &self.kind {
            NodeKind::Element { parent, .. } | NodeKind::Container { parent } => Some(parent),
            NodeKind::Text { .. } => None,
        }
    }

    pub(crate) fn parent_state_mut(&mut self) -> Option<&mut ParentState> {
        match &mut self.kind {
            NodeKind::Element { parent, .. } | NodeKind::Container { parent } => Some(parent),
            NodeKind::Text { .. } => None,
        }
    }

}
