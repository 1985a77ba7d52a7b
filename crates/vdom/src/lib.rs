//! Structural tree-diff and edit-recording engine.
//!
//! Sits behind a component renderer and shadows every mutation the
//! renderer would normally apply to a host tree. Mutations are buffered
//! and coalesced per mirror node; a poll converts them into an ordered
//! list of path-addressed edit records (text, style/prop
//! add-update-remove, subtree insert/move/remove/replace) without ever
//! touching a real display surface.
//!
//! The renderer itself (component lifecycle, prop diffing, keyed list
//! reconciliation) is an external collaborator; it drives the
//! [`MirrorTree`] mutation sink and is plugged into a [`DiffSession`]
//! through the [`Renderer`] trait.

pub mod edit;
pub mod path;
pub mod pending;
pub mod snapshot;

mod error;
mod node;
mod session;
mod tree;

pub use crate::edit::{Edit, EditKind, ValueMap};
pub use crate::error::{SessionError, TreeError};
pub use crate::node::{NodeId, NodeTag};
pub use crate::path::{NodePath, PathNode, TEXT_TYPE_NAME};
pub use crate::pending::{InsertAnchor, PendingInserts};
pub use crate::session::{DiffSession, Renderer};
pub use crate::snapshot::CompactNode;
pub use crate::tree::MirrorTree;
