//! Generic function nodes over 1, 2, 3 or N arguments.
//!
//! These are the open-ended members of the expression family: the caller
//! supplies argument nodes and a pure closure from argument values to the
//! result. The fixed combinators elsewhere in this module tree are built
//! the same way internally, just with a baked-in closure and kind tag.

use std::ops::Deref;
use std::rc::Rc;

use crate::error::DepError;
use crate::node::cell::NodeKind;
use crate::node::{DepValue, NodeRef, Value};

use super::{wire, ArgNode};

/// A derived node computed from one argument.
#[derive(Debug, Clone)]
pub struct DepFunc1<R: Value> {
    node: NodeRef<R>,
}

impl<R: Value> DepFunc1<R> {
    pub fn new<A: Value>(
        arg: &dyn DepValue<A>,
        f: impl Fn(A) -> R + 'static,
    ) -> Result<Self, DepError> {
        let a = arg.node();
        let compute: Rc<dyn Fn() -> Result<R, DepError>> = {
            let a = a.clone();
            Rc::new(move || Ok(f(a.get()?)))
        };
        Ok(Self {
            node: wire(NodeKind::Func, &[&a], compute)?,
        })
    }
}

/// A derived node computed from two arguments.
#[derive(Debug, Clone)]
pub struct DepFunc2<R: Value> {
    node: NodeRef<R>,
}

impl<R: Value> DepFunc2<R> {
    pub fn new<A: Value, B: Value>(
        left: &dyn DepValue<A>,
        right: &dyn DepValue<B>,
        f: impl Fn(A, B) -> R + 'static,
    ) -> Result<Self, DepError> {
        let a = left.node();
        let b = right.node();
        let compute: Rc<dyn Fn() -> Result<R, DepError>> = {
            let a = a.clone();
            let b = b.clone();
            Rc::new(move || Ok(f(a.get()?, b.get()?)))
        };
        Ok(Self {
            node: wire(NodeKind::Func, &[&a, &b], compute)?,
        })
    }
}

/// A derived node computed from three arguments.
#[derive(Debug, Clone)]
pub struct DepFunc3<R: Value> {
    node: NodeRef<R>,
}

impl<R: Value> DepFunc3<R> {
    pub fn new<A: Value, B: Value, C: Value>(
        first: &dyn DepValue<A>,
        second: &dyn DepValue<B>,
        third: &dyn DepValue<C>,
        f: impl Fn(A, B, C) -> R + 'static,
    ) -> Result<Self, DepError> {
        let a = first.node();
        let b = second.node();
        let c = third.node();
        let compute: Rc<dyn Fn() -> Result<R, DepError>> = {
            let a = a.clone();
            let b = b.clone();
            let c = c.clone();
            Rc::new(move || Ok(f(a.get()?, b.get()?, c.get()?)))
        };
        Ok(Self {
            node: wire(NodeKind::Func, &[&a, &b, &c], compute)?,
        })
    }
}

/// A derived node computed from a homogeneous argument list.
#[derive(Debug, Clone)]
pub struct DepFuncN<R: Value> {
    node: NodeRef<R>,
    arity: usize,
}

impl<R: Value> DepFuncN<R> {
    pub fn new<A: Value>(
        args: &[&dyn DepValue<A>],
        f: impl Fn(&[A]) -> R + 'static,
    ) -> Result<Self, DepError> {
        if args.is_empty() {
            return Err(DepError::NoArguments);
        }
        let nodes: Vec<NodeRef<A>> = args.iter().map(|a| a.node()).collect();
        let compute: Rc<dyn Fn() -> Result<R, DepError>> = {
            let nodes = nodes.clone();
            Rc::new(move || {
                let mut vals = Vec::with_capacity(nodes.len());
                for n in &nodes {
                    vals.push(n.get()?);
                }
                Ok(f(&vals))
            })
        };
        let arg_refs: Vec<&dyn ArgNode> = nodes.iter().map(|n| n as &dyn ArgNode).collect();
        let node = wire(NodeKind::Func, &arg_refs, compute)?;
        Ok(Self {
            node,
            arity: nodes.len(),
        })
    }

    /// Number of arguments this node was wired over.
    pub fn arg_count(&self) -> usize {
        self.arity
    }
}

impl<R: Value> Deref for DepFunc1<R> {
    type Target = NodeRef<R>;

    fn deref(&self) -> &NodeRef<R> {
        &self.node
    }
}

impl<R: Value> Deref for DepFunc2<R> {
    type Target = NodeRef<R>;

    fn deref(&self) -> &NodeRef<R> {
        &self.node
    }
}

impl<R: Value> Deref for DepFunc3<R> {
    type Target = NodeRef<R>;

    fn deref(&self) -> &NodeRef<R> {
        &self.node
    }
}

impl<R: Value> Deref for DepFuncN<R> {
    type Target = NodeRef<R>;

    fn deref(&self) -> &NodeRef<R> {
        &self.node
    }
}

impl<R: Value> DepValue<R> for DepFunc1<R> {
    fn node(&self) -> NodeRef<R> {
        self.node.clone()
    }
}

impl<R: Value> DepValue<R> for DepFunc2<R> {
    fn node(&self) -> NodeRef<R> {
        self.node.clone()
    }
}

impl<R: Value> DepValue<R> for DepFunc3<R> {
    fn node(&self) -> NodeRef<R> {
        self.node.clone()
    }
}

impl<R: Value> DepValue<R> for DepFuncN<R> {
    fn node(&self) -> NodeRef<R> {
        self.node.clone()
    }
}
