//! Test-side rendering support for the diff engine.
//!
//! Provides a tiny virtual-node model and a keyed reconciler that
//! together play the "external renderer" role in tests: a component is
//! a function from props to a [`VNode`] tree, and the reconciler
//! translates vnode differences into mutation-sink calls against a
//! `MirrorTree`. Not a real renderer; just enough reconciliation to
//! exercise every sink operation deterministically.

pub mod reconcile;
pub mod vnode;

pub use crate::reconcile::ComponentRenderer;
pub use crate::vnode::{VBody, VNode};
