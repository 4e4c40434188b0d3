//! Equality, ordering and membership combinators.

use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Rc;

use crate::error::DepError;
use crate::node::cell::NodeKind;
use crate::node::{DepConst, DepValue, NodeRef, Value};

use super::wire;

/// The six supported ordering relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    NotEqual,
}

impl CompareKind {
    fn accepts(self, ord: Ordering) -> bool {
        match self {
            CompareKind::Equal => ord == Ordering::Equal,
            CompareKind::Less => ord == Ordering::Less,
            CompareKind::LessOrEqual => ord != Ordering::Greater,
            CompareKind::Greater => ord == Ordering::Greater,
            CompareKind::GreaterOrEqual => ord != Ordering::Less,
            CompareKind::NotEqual => ord != Ordering::Equal,
        }
    }
}

/// Structural equality of two arguments. Value equality, never node
/// identity.
#[derive(Debug, Clone)]
pub struct DepEqual {
    node: NodeRef<bool>,
}

impl DepEqual {
    pub fn new<T: Value>(
        left: &dyn DepValue<T>,
        right: &dyn DepValue<T>,
    ) -> Result<Self, DepError> {
        let a = left.node();
        let b = right.node();
        let compute: Rc<dyn Fn() -> Result<bool, DepError>> = {
            let a = a.clone();
            let b = b.clone();
            Rc::new(move || Ok(a.get()? == b.get()?))
        };
        Ok(Self {
            node: wire(NodeKind::Equal, &[&a, &b], compute)?,
        })
    }

    /// Compare against a literal, wrapped in a constant node.
    pub fn with_value<T: Value>(left: &dyn DepValue<T>, literal: T) -> Result<Self, DepError> {
        let c = DepConst::new(literal);
        Self::new(left, &c)
    }
}

/// One of six ordering relations between two arguments, evaluated through
/// a pluggable comparator. The default comparator is the type's natural
/// ordering.
#[derive(Debug, Clone)]
pub struct DepCompare {
    node: NodeRef<bool>,
}

impl DepCompare {
    pub fn new<T: Value + Ord>(
        left: &dyn DepValue<T>,
        right: &dyn DepValue<T>,
        kind: CompareKind,
    ) -> Result<Self, DepError> {
        Self::with_comparator(left, right, kind, T::cmp)
    }

    pub fn with_comparator<T: Value>(
        left: &dyn DepValue<T>,
        right: &dyn DepValue<T>,
        kind: CompareKind,
        cmp: impl Fn(&T, &T) -> Ordering + 'static,
    ) -> Result<Self, DepError> {
        let a = left.node();
        let b = right.node();
        let compute: Rc<dyn Fn() -> Result<bool, DepError>> = {
            let a = a.clone();
            let b = b.clone();
            Rc::new(move || Ok(kind.accepts(cmp(&a.get()?, &b.get()?))))
        };
        Ok(Self {
            node: wire(NodeKind::Compare, &[&a, &b], compute)?,
        })
    }

    /// Compare against a literal, wrapped in a constant node.
    pub fn with_value<T: Value + Ord>(
        left: &dyn DepValue<T>,
        literal: T,
        kind: CompareKind,
    ) -> Result<Self, DepError> {
        let c = DepConst::new(literal);
        Self::new(left, &c, kind)
    }
}

/// Inclusive range test: `min <= probe <= max`, both ends included, via
/// the same comparator contract as [`DepCompare`]. Exclusive ranges are
/// deliberately unsupported; compose two `DepCompare` nodes instead.
#[derive(Debug, Clone)]
pub struct DepInRange {
    node: NodeRef<bool>,
}

impl DepInRange {
    pub fn new<T: Value + Ord>(
        probe: &dyn DepValue<T>,
        min: &dyn DepValue<T>,
        max: &dyn DepValue<T>,
    ) -> Result<Self, DepError> {
        Self::with_comparator(probe, min, max, T::cmp)
    }

    pub fn with_comparator<T: Value>(
        probe: &dyn DepValue<T>,
        min: &dyn DepValue<T>,
        max: &dyn DepValue<T>,
        cmp: impl Fn(&T, &T) -> Ordering + 'static,
    ) -> Result<Self, DepError> {
        let p = probe.node();
        let lo = min.node();
        let hi = max.node();
        let compute: Rc<dyn Fn() -> Result<bool, DepError>> = {
            let p = p.clone();
            let lo = lo.clone();
            let hi = hi.clone();
            Rc::new(move || {
                let v = p.get()?;
                Ok(cmp(&lo.get()?, &v) != Ordering::Greater
                    && cmp(&v, &hi.get()?) != Ordering::Greater)
            })
        };
        Ok(Self {
            node: wire(NodeKind::InRange, &[&p, &lo, &hi], compute)?,
        })
    }

    /// Range test against literal bounds, wrapped in constant nodes.
    pub fn between<T: Value + Ord>(
        probe: &dyn DepValue<T>,
        min: T,
        max: T,
    ) -> Result<Self, DepError> {
        let lo = DepConst::new(min);
        let hi = DepConst::new(max);
        Self::new(probe, &lo, &hi)
    }
}

/// Membership test against a fixed array captured at construction. The
/// array is not reactive: it is copied into the node, and later changes
/// to the caller's collection are never observed.
#[derive(Debug, Clone)]
pub struct DepInArray {
    node: NodeRef<bool>,
}

impl DepInArray {
    pub fn new<T: Value>(probe: &dyn DepValue<T>, items: Vec<T>) -> Result<Self, DepError> {
        let p = probe.node();
        let compute: Rc<dyn Fn() -> Result<bool, DepError>> = {
            let p = p.clone();
            Rc::new(move || Ok(items.contains(&p.get()?)))
        };
        Ok(Self {
            node: wire(NodeKind::InArray, &[&p], compute)?,
        })
    }
}

impl Deref for DepEqual {
    type Target = NodeRef<bool>;

    fn deref(&self) -> &NodeRef<bool> {
        &self.node
    }
}

impl Deref for DepCompare {
    type Target = NodeRef<bool>;

    fn deref(&self) -> &NodeRef<bool> {
        &self.node
    }
}

impl Deref for DepInRange {
    type Target = NodeRef<bool>;

    fn deref(&self) -> &NodeRef<bool> {
        &self.node
    }
}

impl Deref for DepInArray {
    type Target = NodeRef<bool>;

    fn deref(&self) -> &NodeRef<bool> {
        &self.node
    }
}

impl DepValue<bool> for DepEqual {
    fn node(&self) -> NodeRef<bool> {
        self.node.clone()
    }
}

impl DepValue<bool> for DepCompare {
    fn node(&self) -> NodeRef<bool> {
        self.node.clone()
    }
}

impl DepValue<bool> for DepInRange {
    fn node(&self) -> NodeRef<bool> {
        self.node.clone()
    }
}

impl DepValue<bool> for DepInArray {
    fn node(&self) -> NodeRef<bool> {
        self.node.clone()
    }
}
