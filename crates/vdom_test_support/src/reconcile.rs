//! Keyed reconciler driving the mutation sink.
//!
//! `ComponentRenderer` retains the mounted baseline (vnode data plus
//! mirror node ids) and reconciles every later render against that
//! baseline, the way the engine's real collaborator would: children are
//! matched by key, new subtrees are mounted unrendered and attached
//! through `append_child`/`insert_before`, out-of-order survivors
//! become moves, and unmatched old children are removed. The retained
//! baseline is never mutated, so repeated compares keep diffing against
//! the original tree.

use crate::vnode::{VBody, VNode};
use std::collections::BTreeMap;
use vdom::{MirrorTree, NodeId, NodeTag, Renderer};

/// Baseline bookkeeping for one mounted element.
struct Mounted {
    id: NodeId,
    type_name: String,
    key: Option<String>,
    class_name: Option<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    body: MountedBody,
}

enum MountedBody {
    Empty,
    Text { node: NodeId, value: String },
    Children(Vec<Mounted>),
}

/// Component-as-function renderer: `props -> VNode`, reconciled against
/// the retained baseline on every render after the first.
pub struct ComponentRenderer<P> {
    name: String,
    render_fn: fn(&P) -> VNode,
    base: Option<VNode>,
    root: Option<Mounted>,
}

impl<P> ComponentRenderer<P> {
    pub fn new(name: &str, render_fn: fn(&P) -> VNode) -> Self {
        Self {
            name: name.to_string(),
            render_fn,
            base: None,
            root: None,
        }
    }
}

impl<P> Renderer for ComponentRenderer<P> {
    type Props = P;
    type BaseNode = VNode;

    fn render(&mut self, tree: &mut MirrorTree, container: NodeId, props: &P) {
        let mut vnode = (self.render_fn)(props);
        if vnode.component.is_none() {
            vnode.component = Some(self.name.clone());
        }
        match &self.root {
            None => {
                let mounted = mount(tree, &vnode);
                tree.append_child(container, mounted.id)
                    .expect("mount root under container");
                self.root = Some(mounted);
                self.base = Some(vnode);
            }
            Some(root) => patch(tree, container, root, &vnode),
        }
    }

    fn base(&self) -> Option<&VNode> {
        self.base.as_ref()
    }
}

/// Build a fresh mirror subtree for `vnode`. The new nodes are
/// unrendered, so every write here realizes baseline state directly.
fn mount(tree: &mut MirrorTree, vnode: &VNode) -> Mounted {
    let id = tree.create_element(&vnode.type_name);
    let mut tag = NodeTag::new(&vnode.type_name);
    if let Some(key) = &vnode.key {
        tag = tag.with_key(key);
    }
    if let Some(class_name) = &vnode.class_name {
        tag = tag.with_class_name(class_name);
    }
    tree.set_tag(id, tag);
    if let Some(component) = &vnode.component {
        let mut tag = NodeTag::new(component);
        if let Some(key) = &vnode.key {
            tag = tag.with_key(key);
        }
        tree.set_component_tag(id, tag);
    }
    tree.set_class_name(id, vnode.class_name.as_deref());
    for (name, value) in &vnode.attrs {
        tree.set_attribute(id, name, value);
    }
    for (name, value) in &vnode.styles {
        tree.set_style_property(id, name, value);
    }
    let body = match &vnode.body {
        VBody::Empty => MountedBody::Empty,
        VBody::Text(value) => {
            let node = tree.create_text(value);
            tree.append_child(id, node).expect("append text leaf");
            MountedBody::Text {
                node,
                value: value.clone(),
            }
        }
        VBody::Children(children) => MountedBody::Children(
            children
                .iter()
                .map(|child| {
                    let mounted = mount(tree, child);
                    tree.append_child(id, mounted.id).expect("append child");
                    mounted
                })
                .collect(),
        ),
    };
    Mounted {
        id,
        type_name: vnode.type_name.clone(),
        key: vnode.key.clone(),
        class_name: vnode.class_name.clone(),
        attrs: vnode.attrs.clone(),
        styles: vnode.styles.clone(),
        body,
    }
}

/// Reconcile the retained baseline `old` against `new`, emitting
/// mutation-sink calls. `old` is read-only; the baseline survives for
/// the next compare.
fn patch(tree: &mut MirrorTree, parent: NodeId, old: &Mounted, new: &VNode) {
    if old.type_name != new.type_name {
        let mounted = mount(tree, new);
        tree.replace_child(parent, mounted.id, old.id)
            .expect("replace mismatched child");
        return;
    }

    if old.class_name != new.class_name {
        tree.set_class_name(old.id, new.class_name.as_deref());
    }
    for (name, value) in &new.attrs {
        if old.attrs.get(name) != Some(value) {
            tree.set_attribute(old.id, name, value);
        }
    }
    for name in old.attrs.keys() {
        if !new.attrs.contains_key(name) {
            tree.remove_attribute(old.id, name);
        }
    }
    for (name, value) in &new.styles {
        if old.styles.get(name) != Some(value) {
            tree.set_style_property(old.id, name, value);
        }
    }
    for name in old.styles.keys() {
        if !new.styles.contains_key(name) {
            tree.remove_style_property(old.id, name);
        }
    }

    match (&old.body, &new.body) {
        (MountedBody::Empty, VBody::Empty) => {}
        (MountedBody::Text { node, value }, VBody::Text(new_value)) => {
            if value != new_value {
                tree.set_text(*node, new_value);
            }
        }
        (MountedBody::Children(olds), VBody::Children(news)) => {
            patch_children(tree, old.id, olds, news);
        }
        (MountedBody::Empty, VBody::Text(value)) => {
            tree.set_text_content(old.id, value).expect("text content");
        }
        (MountedBody::Text { node, .. }, VBody::Empty) => {
            tree.remove_child(old.id, *node).expect("remove text leaf");
        }
        (MountedBody::Text { node, .. }, VBody::Children(news)) => {
            tree.remove_child(old.id, *node).expect("remove text leaf");
            for child in news {
                let mounted = mount(tree, child);
                tree.append_child(old.id, mounted.id).expect("append child");
            }
        }
        (MountedBody::Children(olds), VBody::Text(value)) => {
            for child in olds {
                tree.remove_child(old.id, child.id).expect("remove child");
            }
            let node = tree.create_text(value);
            tree.append_child(old.id, node).expect("append text leaf");
        }
        (MountedBody::Children(olds), VBody::Empty) => {
            for child in olds {
                tree.remove_child(old.id, child.id).expect("remove child");
            }
        }
        (MountedBody::Empty, VBody::Children(news)) => {
            for child in news {
                let mounted = mount(tree, child);
                tree.append_child(old.id, mounted.id).expect("append child");
            }
        }
    }
}

/// Keyed child reconciliation. Survivors are patched in place; fresh
/// children are mounted and attached right-to-left so every insertion
/// anchor is already realized or queued; survivors that fall out of
/// relative order become moves.
fn patch_children(tree: &mut MirrorTree, parent: NodeId, olds: &[Mounted], news: &[VNode]) {
    // Pair each new child with a baseline child: by key when present,
    // positionally for keyless children of the same type.
    let mut used = vec![false; olds.len()];
    let mut pairs: Vec<Option<usize>> = Vec::with_capacity(news.len());
    for (i, new) in news.iter().enumerate() {
        let matched = match &new.key {
            Some(key) => (0..olds.len()).find(|&j| {
                !used[j]
                    && olds[j].key.as_deref() == Some(key.as_str())
                    && olds[j].type_name == new.type_name
            }),
            None => (i < olds.len()
                && !used[i]
                && olds[i].key.is_none()
                && olds[i].type_name == new.type_name)
                .then_some(i),
        };
        if let Some(j) = matched {
            used[j] = true;
        }
        pairs.push(matched);
    }

    // Unmatched baseline children are gone.
    for (j, old) in olds.iter().enumerate() {
        if !used[j] {
            tree.remove_child(parent, old.id).expect("remove child");
        }
    }

    // Patch survivors in document order.
    for (i, new) in news.iter().enumerate() {
        if let Some(j) = pairs[i] {
            patch(tree, parent, &olds[j], new);
        }
    }

    // Mount fresh children up front so they can serve as anchors.
    let ids: Vec<NodeId> = news
        .iter()
        .enumerate()
        .map(|(i, new)| match pairs[i] {
            Some(j) => olds[j].id,
            None => mount(tree, new).id,
        })
        .collect();

    // Attach right-to-left. A survivor whose baseline index exceeds the
    // minimum seen to its right has moved ahead of a sibling.
    let mut min_old = usize::MAX;
    for i in (0..news.len()).rev() {
        let anchor = ids.get(i + 1).copied();
        match pairs[i] {
            None => match anchor {
                Some(anchor) => tree
                    .insert_before(parent, ids[i], anchor)
                    .expect("insert child"),
                None => tree.append_child(parent, ids[i]).expect("append child"),
            },
            Some(j) if j > min_old => {
                let anchor = anchor.expect("moved child cannot be last");
                tree.insert_before(parent, ids[i], anchor)
                    .expect("move child");
            }
            Some(j) => min_old = j,
        }
    }
}
