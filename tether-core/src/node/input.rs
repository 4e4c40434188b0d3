//! Mutable input nodes.
//!
//! An input is the writable leaf of a binding graph. It can be written
//! directly, or bound to an upstream source node, in which case it mirrors
//! that source: rebinding unregisters from the old source, registers with
//! the new one and immediately re-pulls, so the input is never observed
//! with a stale value. A node is bound to at most one source at a time.

use std::ops::Deref;

use crate::error::DepError;

use super::cell::{DepCell, NodeKind, Value};
use super::handle::{DepValue, NodeRef};

/// A writable value node that may mirror an upstream source.
#[derive(Debug, Clone)]
pub struct DepInput<T: Value> {
    node: NodeRef<T>,
}

impl<T: Value> DepInput<T> {
    /// An unbound input holding the type's default value.
    pub fn new() -> Self {
        Self::with_value(T::default())
    }

    /// An unbound input holding `value`.
    pub fn with_value(value: T) -> Self {
        Self {
            node: NodeRef::from_cell(DepCell::new(NodeKind::Input, value, false)),
        }
    }

    /// Bind this input to an upstream source, or unbind it with `None`.
    ///
    /// Unbinding pushes the type's default value; binding immediately
    /// pushes the source's current value. Either push propagates to this
    /// input's own dependents as usual.
    pub fn set_source(&self, source: Option<NodeRef<T>>) -> Result<(), DepError> {
        self.node.set_source_impl(source)
    }
}

impl<T: Value> Default for DepInput<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> Deref for DepInput<T> {
    type Target = NodeRef<T>;

    fn deref(&self) -> &NodeRef<T> {
        &self.node
    }
}

impl<T: Value> DepValue<T> for DepInput<T> {
    fn node(&self) -> NodeRef<T> {
        self.node.clone()
    }
}
