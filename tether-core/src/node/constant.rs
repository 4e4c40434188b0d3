//! Constant nodes.

use std::ops::Deref;

use super::cell::{DepCell, NodeKind, Value};
use super::handle::{DepValue, NodeRef};

/// An immutable value node, fixed at construction.
///
/// Constants never notify and are never subscribed to; a derived node
/// whose every argument is constant is itself constant. Writing through
/// the handle fails with [`crate::DepError::ConstReassigned`].
#[derive(Debug, Clone)]
pub struct DepConst<T: Value> {
    node: NodeRef<T>,
}

impl<T: Value> DepConst<T> {
    pub fn new(value: T) -> Self {
        Self {
            node: NodeRef::from_cell(DepCell::new(NodeKind::Const, value, true)),
        }
    }
}

impl<T: Value> Deref for DepConst<T> {
    type Target = NodeRef<T>;

    fn deref(&self) -> &NodeRef<T> {
        &self.node
    }
}

impl<T: Value> DepValue<T> for DepConst<T> {
    fn node(&self) -> NodeRef<T> {
        self.node.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DepError;

    #[test]
    fn constant_reports_const() {
        let c = DepConst::new(5);
        assert!(c.is_const());
        assert_eq!(c.get(), Ok(5));
    }

    #[test]
    fn constant_rejects_writes() {
        let c = DepConst::new(5);
        assert_eq!(c.set(6), Err(DepError::ConstReassigned));
        assert_eq!(c.get(), Ok(5));
    }
}
