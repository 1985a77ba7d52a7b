//! Diff session: the public lifecycle over one mirror tree.
//!
//! State machine: Unrendered -> Rendered, one-way. `init` builds the
//! baseline with no edits produced, then flips the whole tree rendered
//! in one post-order visit; every later render pass records edits that
//! `take_diffs` drains. Sessions are single-threaded and own their
//! tree; interleaving two sessions against one container is not
//! supported because the coalescing buffers are not reentrant.

use crate::edit::Edit;
use crate::error::SessionError;
use crate::node::NodeId;
use crate::tree::MirrorTree;

/// The external reconciliation collaborator. Implementations retain
/// their own baseline representation and translate prop changes into
/// mutation-sink calls against the tree.
pub trait Renderer {
    type Props;
    /// Renderer-retained baseline tree, exposed read-only through the
    /// session.
    type BaseNode;

    /// Render `props` into the mirror tree under `container`. The first
    /// call builds the baseline; later calls must reconcile against the
    /// retained baseline and drive the mutation sink.
    fn render(&mut self, tree: &mut MirrorTree, container: NodeId, props: &Self::Props);

    /// The retained baseline, once the first render has happened.
    fn base(&self) -> Option<&Self::BaseNode>;
}

/// One `init` -> `compare`* -> `take_diffs` lifecycle.
pub struct DiffSession<R: Renderer> {
    tree: MirrorTree,
    container: NodeId,
    renderer: R,
    base_props: Option<R::Props>,
    rendered: bool,
}

impl<R: Renderer> DiffSession<R> {
    pub fn new(renderer: R) -> Self {
        let mut tree = MirrorTree::new();
        let container = tree.create_container();
        Self {
            tree,
            container,
            renderer,
            base_props: None,
            rendered: false,
        }
    }

    /// Build the baseline tree. No-op when already rendered. Baseline
    /// mutations happen while every node is unrendered, so they realize
    /// the tree directly and produce no edit records.
    pub fn init(&mut self, props: R::Props) -> &mut Self {
        if self.rendered {
            return self;
        }
        log::debug!(target: "vdom.session", "initial render");
        self.renderer.render(&mut self.tree, self.container, &props);
        self.tree.mark_rendered(self.container);
        self.base_props = Some(props);
        self.rendered = true;
        self
    }

    /// Re-render with new props, buffering edits. Requires `init`.
    pub fn compare(&mut self, props: &R::Props) -> Result<&mut Self, SessionError> {
        if !self.rendered {
            return Err(SessionError::NotRendered);
        }
        log::debug!(target: "vdom.session", "compare render");
        self.renderer.render(&mut self.tree, self.container, props);
        Ok(self)
    }

    /// Drain every buffered edit into document order. Multiple
    /// `compare` calls without an intervening drain accumulate; a
    /// second drain with no new mutations returns an empty list.
    pub fn take_diffs(&mut self) -> Vec<Edit> {
        self.tree.poll_diffs(self.container)
    }

    pub fn base_node(&self) -> Option<&R::BaseNode> {
        self.renderer.base()
    }

    pub fn base_props(&self) -> Option<&R::Props> {
        self.base_props.as_ref()
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Read access to the mirror tree, for assertions and diagnostics.
    pub fn tree(&self) -> &MirrorTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeTag;

    /// Renders one tagged text leaf from a string prop.
    struct LeafRenderer {
        base: Option<String>,
        leaf: Option<NodeId>,
    }

    impl LeafRenderer {
        fn new() -> Self {
            Self {
                base: None,
                leaf: None,
            }
        }
    }

    impl Renderer for LeafRenderer {
        type Props = String;
        type BaseNode = String;

        fn render(&mut self, tree: &mut MirrorTree, container: NodeId, props: &String) {
            match self.leaf {
                None => {
                    let div = tree.create_element("div");
                    tree.set_tag(div, NodeTag::new("div"));
                    let text = tree.create_text(props);
                    tree.append_child(div, text).expect("append text");
                    tree.append_child(container, div).expect("append div");
                    self.leaf = Some(text);
                    self.base = Some(props.clone());
                }
                Some(leaf) => tree.set_text(leaf, props),
            }
        }

        fn base(&self) -> Option<&String> {
            self.base.as_ref()
        }
    }

    #[test]
    fn compare_before_init_is_a_state_error() {
        let mut session = DiffSession::new(LeafRenderer::new());
        assert_eq!(
            session.compare(&"x".to_string()).err(),
            Some(SessionError::NotRendered)
        );
        assert_eq!(
            SessionError::NotRendered.to_string(),
            "nothing to compare; call init first"
        );
    }

    #[test]
    fn init_is_idempotent() {
        let mut session = DiffSession::new(LeafRenderer::new());
        session.init("foo".to_string());
        session.init("ignored".to_string());
        assert_eq!(session.base_props().map(String::as_str), Some("foo"));
        assert!(session.take_diffs().is_empty());
    }

    #[test]
    fn init_produces_no_edits() {
        let mut session = DiffSession::new(LeafRenderer::new());
        session.init("foo".to_string());
        assert!(session.take_diffs().is_empty());
    }

    #[test]
    fn compare_then_take_diffs_reports_the_change() {
        let mut session = DiffSession::new(LeafRenderer::new());
        session.init("foo".to_string());
        let diffs = session
            .compare(&"bar".to_string())
            .expect("compare")
            .take_diffs();
        match &diffs[..] {
            [Edit::UpdateText {
                old_value,
                new_value,
                ..
            }] => {
                assert_eq!(old_value, "foo");
                assert_eq!(new_value, "bar");
            }
            other => panic!("expected one update-text, got {other:?}"),
        }
    }

    #[test]
    fn take_diffs_is_idempotent_without_compare() {
        let mut session = DiffSession::new(LeafRenderer::new());
        session.init("foo".to_string());
        session.compare(&"bar".to_string()).expect("compare");
        assert_eq!(session.take_diffs().len(), 1);
        assert!(session.take_diffs().is_empty());
    }

    #[test]
    fn compares_accumulate_until_drained() {
        let mut session = DiffSession::new(LeafRenderer::new());
        session.init("foo".to_string());
        session.compare(&"bar".to_string()).expect("compare");
        session.compare(&"baz".to_string()).expect("compare");
        let diffs = session.take_diffs();
        match &diffs[..] {
            [Edit::UpdateText {
                old_value,
                new_value,
                ..
            }] => {
                assert_eq!(old_value, "foo");
                assert_eq!(new_value, "baz");
            }
            other => panic!("expected one coalesced update-text, got {other:?}"),
        }
    }

    #[test]
    fn accessors_are_read_only() {
        let mut session = DiffSession::new(LeafRenderer::new());
        assert!(session.base_node().is_none());
        session.init("foo".to_string());
        assert_eq!(session.base_node().map(String::as_str), Some("foo"));
        assert_eq!(session.tree().children(session.container()).len(), 1);
    }
}
