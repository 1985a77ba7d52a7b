//! Mirror tree: arena storage plus the mutation sink and poll walk.
//!
//! The external renderer drives exactly this surface; it never reads or
//! writes node internals. Contract:
//! - Nodes live in a per-session arena; `NodeId` is the arena index.
//! - While a node is unrendered, mutations build the baseline directly
//!   and produce no edits. After the session transition every mutation
//!   coalesces into the node's buffers instead.
//! - Post-render, the realized children arrays are the authoritative
//!   baseline; structural edits are buffered, never applied.
//! - `poll_diffs` drains every buffer exactly once, emitting document
//!   order: node before descendants, siblings left to right.

use crate::edit::Edit;
use crate::error::TreeError;
use crate::node::{
    merge_update, merge_write, MirrorNode, NodeId, NodeKind, NodeTag, ParentState,
    TreeEditBuffers,
};
use crate::path::{NodePath, PathNode};
use crate::pending::InsertAnchor;
use crate::snapshot::CompactNode;

const CLASS_NAME_PROP: &str = "className";

/// Arena-backed shadow tree exposing the mutation sink.
#[derive(Debug, Default)]
pub struct MirrorTree {
    nodes: Vec<MirrorNode>,
}

impl MirrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(MirrorNode::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> &MirrorNode {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MirrorNode {
        &mut self.nodes[id.index()]
    }

    // ---- node construction -------------------------------------------------

    pub fn create_container(&mut self) -> NodeId {
        self.alloc(NodeKind::Container {
            parent: ParentState::default(),
        })
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        let id = self.alloc(NodeKind::Element {
            tag_name: tag_name.to_string(),
            class_name: None,
            attrs: Default::default(),
            styles: Default::default(),
            parent: ParentState::default(),
        });
        log::trace!(target: "vdom.tree", "create element <{tag_name}> as {}", id.0);
        id
    }

    pub fn create_text(&mut self, value: &str) -> NodeId {
        let id = self.alloc(NodeKind::Text {
            value: value.to_string(),
        });
        log::trace!(target: "vdom.tree", "create text {value:?} as {}", id.0);
        id
    }

    /// Attach the renderer-side identity used for paths and snapshots.
    pub fn set_tag(&mut self, id: NodeId, tag: NodeTag) {
        self.node_mut(id).tag = Some(tag);
    }

    /// Mark this node as the root of a component subtree; the component
    /// identity becomes a synthetic ancestor in emitted paths.
    pub fn set_component_tag(&mut self, id: NodeId, tag: NodeTag) {
        self.node_mut(id).component = Some(tag);
    }

    // ---- read accessors ----------------------------------------------------

    pub fn rendered(&self, id: NodeId) -> bool {
        self.node(id).rendered
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .parent_state()
            .map(|p| p.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn style(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { styles, .. } => styles.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn class_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { class_name, .. } => class_name.as_deref(),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Text { .. })
    }

    // ---- rendered transition ----------------------------------------------

    /// Post-order visit setting `rendered` on the whole subtree. The
    /// single Unrendered -> Rendered transition point of a session; the
    /// tree is never left partially rendered.
    pub fn mark_rendered(&mut self, root: NodeId) {
        let children: Vec<NodeId> = self.children(root).to_vec();
        for child in children {
            self.mark_rendered(child);
        }
        self.node_mut(root).rendered = true;
    }

    // ---- text --------------------------------------------------------------

    /// Set a text leaf's value. Pre-render this seeds the baseline;
    /// post-render it coalesces one update-text pair (old = value at
    /// the start of the pass, new = latest value).
    pub fn set_text(&mut self, id: NodeId, value: &str) {
        let node = self.node_mut(id);
        let rendered = node.rendered;
        let NodeKind::Text { value: current } = &mut node.kind else {
            debug_assert!(false, "set_text on non-text node {}", id.0);
            return;
        };
        if !rendered {
            if *current != value {
                *current = value.to_string();
            }
            return;
        }
        let effective = node
            .buffers
            .update_text
            .as_ref()
            .map(|(_, new)| new.as_str())
            .unwrap_or(current.as_str());
        if effective == value {
            return;
        }
        log::trace!(target: "vdom.tree", "set text {}: {effective:?} -> {value:?}", id.0);
        node.buffers.update_text = match node.buffers.update_text.take() {
            None => Some((current.clone(), value.to_string())),
            // Back to the pass-start value: the pair nets out to nothing.
            Some((old, _)) if old == value => None,
            Some((old, _)) => Some((old, value.to_string())),
        };
    }

    // ---- styles ------------------------------------------------------------

    pub fn add_style(&mut self, id: NodeId, name: &str, new_value: &str) {
        let node = self.node_mut(id);
        if node.rendered {
            merge_write(&mut node.buffers.add_styles, name, new_value);
        } else if let NodeKind::Element { styles, .. } = &mut node.kind {
            styles.insert(name.to_string(), new_value.to_string());
        }
    }

    pub fn update_style(&mut self, id: NodeId, name: &str, old_value: &str, new_value: &str) {
        let node = self.node_mut(id);
        if node.rendered {
            merge_update(&mut node.buffers.update_styles, name, old_value, new_value);
        } else if let NodeKind::Element { styles, .. } = &mut node.kind {
            styles.insert(name.to_string(), new_value.to_string());
        }
    }

    pub fn remove_style(&mut self, id: NodeId, name: &str, old_value: &str) {
        let node = self.node_mut(id);
        if node.rendered {
            merge_write(&mut node.buffers.remove_styles, name, old_value);
        } else if let NodeKind::Element { styles, .. } = &mut node.kind {
            styles.remove(name);
        }
    }

    /// Rendered-aware style write: routes to add/update/remove based on
    /// the node's baseline value for `name`.
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) {
        if !self.node(id).rendered {
            self.add_style(id, name, value);
            return;
        }
        match self.style(id, name).map(str::to_string) {
            Some(old) if !value.is_empty() => self.update_style(id, name, &old, value),
            Some(old) => self.remove_style(id, name, &old),
            None => self.add_style(id, name, value),
        }
    }

    pub fn remove_style_property(&mut self, id: NodeId, name: &str) {
        let Some(old) = self.style(id, name).map(str::to_string) else {
            return;
        };
        if self.node(id).rendered {
            self.remove_style(id, name, &old);
        } else if let NodeKind::Element { styles, .. } = &mut self.node_mut(id).kind {
            styles.remove(name);
        }
    }

    // ---- props -------------------------------------------------------------

    pub fn add_prop(&mut self, id: NodeId, name: &str, new_value: &str) {
        let node = self.node_mut(id);
        if node.rendered {
            merge_write(&mut node.buffers.add_props, name, new_value);
        } else if let NodeKind::Element { attrs, .. } = &mut node.kind {
            attrs.insert(name.to_string(), new_value.to_string());
        }
    }

    pub fn update_prop(&mut self, id: NodeId, name: &str, old_value: &str, new_value: &str) {
        let node = self.node_mut(id);
        if node.rendered {
            merge_update(&mut node.buffers.update_props, name, old_value, new_value);
        } else if let NodeKind::Element { attrs, .. } = &mut node.kind {
            attrs.insert(name.to_string(), new_value.to_string());
        }
    }

    pub fn remove_prop(&mut self, id: NodeId, name: &str, old_value: &str) {
        let node = self.node_mut(id);
        if node.rendered {
            merge_write(&mut node.buffers.remove_props, name, old_value);
        } else if let NodeKind::Element { attrs, .. } = &mut node.kind {
            attrs.remove(name);
        }
    }

    /// Rendered-aware attribute write (the prop channel's convenience
    /// entry point). An empty value removes an existing attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if !self.node(id).rendered {
            self.add_prop(id, name, value);
            return;
        }
        match self.attribute(id, name).map(str::to_string) {
            Some(old) if !value.is_empty() => self.update_prop(id, name, &old, value),
            Some(old) => self.remove_prop(id, name, &old),
            None => self.add_prop(id, name, value),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let Some(old) = self.attribute(id, name).map(str::to_string) else {
            return;
        };
        if self.node(id).rendered {
            self.remove_prop(id, name, &old);
        } else if let NodeKind::Element { attrs, .. } = &mut self.node_mut(id).kind {
            attrs.remove(name);
        }
    }

    /// Class changes travel the prop channel under the `className` key.
    pub fn set_class_name(&mut self, id: NodeId, value: Option<&str>) {
        let old = self.class_name(id).map(str::to_string);
        if old.as_deref() == value {
            return;
        }
        if !self.node(id).rendered {
            if let NodeKind::Element { class_name, .. } = &mut self.node_mut(id).kind {
                *class_name = value.map(str::to_string);
            }
            return;
        }
        match (old, value) {
            (None, Some(new)) => self.add_prop(id, CLASS_NAME_PROP, new),
            (Some(old), None) => self.remove_prop(id, CLASS_NAME_PROP, &old),
            (Some(old), Some(new)) => self.update_prop(id, CLASS_NAME_PROP, &old, new),
            (None, None) => {}
        }
    }

    // ---- structure ---------------------------------------------------------

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let rendered = self.node(parent).rendered;
        let Some(state) = self.node_mut(parent).parent_state_mut() else {
            return Err(TreeError::NotAParent { node: parent });
        };
        if rendered {
            log::trace!(target: "vdom.tree", "queue append {} under {}", child.0, parent.0);
            state.pending_inserts.queue_append(child);
        } else {
            state.children.push(child);
        }
        Ok(())
    }

    /// Insert `child` before `before` under `parent`.
    ///
    /// Pre-render this splices the baseline directly. Post-render, an
    /// already-realized `child` records a move; otherwise `child` is
    /// queued against `before`'s realized index, or nested inside the
    /// pending queue that holds `before`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), TreeError> {
        let state = self
            .node(parent)
            .parent_state()
            .ok_or(TreeError::NotAParent { node: parent })?;
        let child_idx = state.children.iter().position(|&c| c == child);
        let before_idx = state.children.iter().position(|&c| c == before);

        if !self.node(parent).rendered {
            let target = before_idx.ok_or(TreeError::ChildNotFound {
                parent,
                child: before,
            })?;
            if let Some(state) = self.node_mut(parent).parent_state_mut() {
                let target = match child_idx {
                    // insert_before moves a child already under this parent
                    Some(existing) => {
                        state.children.remove(existing);
                        if existing < target { target - 1 } else { target }
                    }
                    None => target,
                };
                state.children.insert(target, child);
            }
            return Ok(());
        }

        if child_idx.is_some() {
            debug_assert!(
                before_idx.is_some(),
                "moving realized child {} before pending node {}",
                child.0,
                before.0
            );
            log::trace!(target: "vdom.tree", "move {} before {} under {}", child.0, before.0, parent.0);
            let old = self.compact(child);
            let anchor = self.compact(before);
            if let Some(state) = self.node_mut(parent).parent_state_mut() {
                state.tree_edits.moves.push((old, anchor));
            }
            return Ok(());
        }

        if let Some(index) = before_idx {
            log::trace!(target: "vdom.tree", "queue insert {} at index {index} under {}", child.0, parent.0);
            if let Some(state) = self.node_mut(parent).parent_state_mut() {
                state.pending_inserts.queue_before(index, child);
            }
            return Ok(());
        }
        let nested = self
            .node_mut(parent)
            .parent_state_mut()
            .map(|state| state.pending_inserts.queue_before_pending(before, child))
            .unwrap_or(false);
        if nested {
            log::trace!(target: "vdom.tree", "queue insert {} before pending {} under {}", child.0, before.0, parent.0);
            Ok(())
        } else {
            Err(TreeError::ChildNotFound {
                parent,
                child: before,
            })
        }
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let state = self
            .node(parent)
            .parent_state()
            .ok_or(TreeError::NotAParent { node: parent })?;
        let index = state
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::ChildNotFound { parent, child })?;
        if self.node(parent).rendered {
            log::trace!(target: "vdom.tree", "remove {} from {}", child.0, parent.0);
            let snapshot = self.compact(child);
            if let Some(state) = self.node_mut(parent).parent_state_mut() {
                state.tree_edits.removes.push(snapshot);
            }
        } else if let Some(state) = self.node_mut(parent).parent_state_mut() {
            state.children.remove(index);
        }
        Ok(())
    }

    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), TreeError> {
        let state = self
            .node(parent)
            .parent_state()
            .ok_or(TreeError::NotAParent { node: parent })?;
        let index = state
            .children
            .iter()
            .position(|&c| c == old_child)
            .ok_or(TreeError::ChildNotFound {
                parent,
                child: old_child,
            })?;
        if self.node(parent).rendered {
            log::trace!(target: "vdom.tree", "replace {} with {} under {}", old_child.0, new_child.0, parent.0);
            let old = self.compact(old_child);
            let new = self.compact(new_child);
            if let Some(state) = self.node_mut(parent).parent_state_mut() {
                state.tree_edits.replaces.push((old, new));
            }
        } else if let Some(state) = self.node_mut(parent).parent_state_mut() {
            state.children[index] = new_child;
        }
        Ok(())
    }

    /// Replace the node's content with a single text value: an only
    /// text child is written in place, otherwise all children are
    /// removed and one text node appended when `value` is non-empty.
    pub fn set_text_content(&mut self, id: NodeId, value: &str) -> Result<(), TreeError> {
        let children: Vec<NodeId> = self.children(id).to_vec();
        if let [only] = children[..] {
            if self.is_text(only) {
                self.set_text(only, value);
                return Ok(());
            }
        }
        for child in children {
            self.remove_child(id, child)?;
        }
        if !value.is_empty() {
            let text = self.create_text(value);
            self.append_child(id, text)?;
        }
        Ok(())
    }

    // ---- snapshots ---------------------------------------------------------

    /// Compact snapshot of the subtree at `id`, taken now.
    pub fn compact(&self, id: NodeId) -> CompactNode {
        self.compact_at(id, -1)
    }

    fn compact_at(&self, id: NodeId, index: i32) -> CompactNode {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Text { value } => CompactNode::Text(value.clone()),
            NodeKind::Element {
                tag_name,
                class_name,
                parent,
                ..
            } => {
                let (type_name, key, class_name) = match &node.tag {
                    Some(tag) => (
                        tag.type_name.clone(),
                        tag.key.clone(),
                        tag.class_name.clone(),
                    ),
                    None => (tag_name.clone(), None, class_name.clone()),
                };
                CompactNode::Element {
                    type_name,
                    key,
                    class_name,
                    index,
                    children: parent
                        .children
                        .iter()
                        .enumerate()
                        .map(|(i, &c)| self.compact_at(c, i as i32))
                        .collect(),
                }
            }
            // Containers are never children, so they never become
            // structural payloads.
            NodeKind::Container { parent } => {
                debug_assert!(false, "compact snapshot of container {}", id.0);
                CompactNode::Element {
                    type_name: "$container".to_string(),
                    key: None,
                    class_name: None,
                    index,
                    children: parent
                        .children
                        .iter()
                        .enumerate()
                        .map(|(i, &c)| self.compact_at(c, i as i32))
                        .collect(),
                }
            }
        }
    }

    // ---- poll walk ---------------------------------------------------------

    /// Drain all buffered edits into an ordered list. Document order:
    /// node before descendants, siblings left to right; per node the
    /// kind order is styles, props, tree-structural, text-last among
    /// the non-structural kinds.
    pub fn poll_diffs(&mut self, root: NodeId) -> Vec<Edit> {
        let mut edits = Vec::new();
        self.poll_node(root, &NodePath::empty(), -1, &mut edits);
        log::debug!(target: "vdom.tree", "poll produced {} edit(s)", edits.len());
        edits
    }

    fn poll_node(&mut self, id: NodeId, prev_path: &NodePath, index: i32, out: &mut Vec<Edit>) {
        let path = self.node_path(id, prev_path, index);

        let mut buffers = std::mem::take(&mut self.node_mut(id).buffers);
        if !buffers.is_empty() {
            out.extend(buffers.build_edits(&path));
        }

        if self.node(id).parent_state().is_none() {
            return;
        }
        self.flush_pending_inserts(id);
        let mut tree_edits = TreeEditBuffers::default();
        if let Some(state) = self.node_mut(id).parent_state_mut() {
            tree_edits = std::mem::take(&mut state.tree_edits);
        }
        if !tree_edits.is_empty() {
            out.extend(tree_edits.build_tree_edits(&path));
        }

        let children: Vec<NodeId> = self.children(id).to_vec();
        for (i, child) in children.into_iter().enumerate() {
            self.poll_node(child, &path, i as i32, out);
        }
    }

    /// Convert queued inserts into insert payloads, resolving each
    /// anchor against the realized children *now* so the emitted order
    /// replays without re-resolving stale indices. Runs once per poll,
    /// before structural buffers drain.
    fn flush_pending_inserts(&mut self, id: NodeId) {
        let drained = match self.node_mut(id).parent_state_mut() {
            Some(state) if !state.pending_inserts.is_empty() => state.pending_inserts.drain(),
            _ => return,
        };
        let mut payloads = Vec::new();
        for (anchor, queue) in drained {
            let before = match anchor {
                InsertAnchor::Before(index) => self
                    .children(id)
                    .get(index)
                    .map(|&anchor_child| self.compact(anchor_child)),
                InsertAnchor::Append => None,
            };
            for queued in queue {
                payloads.push((self.compact(queued), before.clone()));
            }
        }
        if let Some(state) = self.node_mut(id).parent_state_mut() {
            state.tree_edits.inserts.extend(payloads);
        }
    }

    fn node_path(&self, id: NodeId, prev: &NodePath, index: i32) -> NodePath {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Container { .. } => prev.clone(),
            NodeKind::Text { .. } => prev.append(PathNode::text(index)),
            NodeKind::Element {
                tag_name,
                class_name,
                ..
            } => {
                let mut path = prev.clone();
                let mut index = index;
                if let Some(component) = &node.component {
                    path = path.append(tag_path_node(component, index));
                    // The element is the root of the component subtree.
                    index = 0;
                }
                let own = match &node.tag {
                    Some(tag) => tag_path_node(tag, index),
                    None => PathNode {
                        type_name: tag_name.clone(),
                        key: None,
                        class_name: class_name.clone(),
                        index,
                    },
                };
                path.append(own)
            }
        }
    }
}

fn tag_path_node(tag: &NodeTag, index: i32) -> PathNode {
    PathNode {
        type_name: tag.type_name.clone(),
        key: tag.key.clone(),
        class_name: tag.class_name.clone(),
        index,
    }
}
