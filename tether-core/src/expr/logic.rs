//! Boolean combinators and the graph-rewriting helpers.
//!
//! `DepAnd` and `DepOr` are N-ary; their recompute scans the argument
//! list and stops at the first decisive value. `DepNot` negates a single
//! argument and carries a reuse constructor that de-duplicates NOT nodes
//! over the same source.
//!
//! # Growing a combinator
//!
//! An existing AND/OR node's argument list is never mutated. The node
//! subscribed to each of its original arguments at construction; growing
//! the array in place would silently miss updates from the new argument,
//! and replacing arguments would leak stale subscriptions. `attach_input`
//! therefore wraps: it builds a fresh two-argument node over (old source,
//! new source) and rebinds the target input to that.

use std::ops::Deref;
use std::rc::Rc;

use tracing::debug;

use crate::error::DepError;
use crate::node::cell::NodeKind;
use crate::node::{DepInput, DepValue, NodeRef, WeakNode};

use super::{wire, ArgNode};

fn bool_args(args: &[&dyn DepValue<bool>]) -> Result<Vec<NodeRef<bool>>, DepError> {
    if args.is_empty() {
        return Err(DepError::NoArguments);
    }
    Ok(args.iter().map(|a| a.node()).collect())
}

/// True iff every argument is true.
#[derive(Debug, Clone)]
pub struct DepAnd {
    node: NodeRef<bool>,
}

impl DepAnd {
    pub fn new(args: &[&dyn DepValue<bool>]) -> Result<Self, DepError> {
        let nodes = bool_args(args)?;
        let compute: Rc<dyn Fn() -> Result<bool, DepError>> = {
            let nodes = nodes.clone();
            Rc::new(move || {
                for n in &nodes {
                    if !n.get()? {
                        return Ok(false);
                    }
                }
                Ok(true)
            })
        };
        let arg_refs: Vec<&dyn ArgNode> = nodes.iter().map(|n| n as &dyn ArgNode).collect();
        Ok(Self {
            node: wire(NodeKind::And, &arg_refs, compute)?,
        })
    }

    /// Additionally require `source` for `target`.
    ///
    /// An unbound target is bound to `source` directly. A bound target is
    /// rebound to a fresh AND over (old source, `source`); the old source
    /// node itself is left untouched.
    pub fn attach_input(
        target: &DepInput<bool>,
        source: &dyn DepValue<bool>,
    ) -> Result<(), DepError> {
        match target.source() {
            None => target.set_source(Some(source.node())),
            Some(prev) => {
                let wrapped = DepAnd::new(&[&prev, source])?;
                target.set_source(Some(wrapped.node()))
            }
        }
    }
}

/// True iff any argument is true.
#[derive(Debug, Clone)]
pub struct DepOr {
    node: NodeRef<bool>,
}

impl DepOr {
    pub fn new(args: &[&dyn DepValue<bool>]) -> Result<Self, DepError> {
        let nodes = bool_args(args)?;
        let compute: Rc<dyn Fn() -> Result<bool, DepError>> = {
            let nodes = nodes.clone();
            Rc::new(move || {
                for n in &nodes {
                    if n.get()? {
                        return Ok(true);
                    }
                }
                Ok(false)
            })
        };
        let arg_refs: Vec<&dyn ArgNode> = nodes.iter().map(|n| n as &dyn ArgNode).collect();
        Ok(Self {
            node: wire(NodeKind::Or, &arg_refs, compute)?,
        })
    }

    /// Additionally allow `source` for `target`; the OR counterpart of
    /// [`DepAnd::attach_input`].
    pub fn attach_input(
        target: &DepInput<bool>,
        source: &dyn DepValue<bool>,
    ) -> Result<(), DepError> {
        match target.source() {
            None => target.set_source(Some(source.node())),
            Some(prev) => {
                let wrapped = DepOr::new(&[&prev, source])?;
                target.set_source(Some(wrapped.node()))
            }
        }
    }
}

/// Logical negation of a single argument.
#[derive(Debug, Clone)]
pub struct DepNot {
    node: NodeRef<bool>,
}

impl DepNot {
    pub fn new(arg: &dyn DepValue<bool>) -> Result<Self, DepError> {
        let a = arg.node();
        let compute: Rc<dyn Fn() -> Result<bool, DepError>> = {
            let a = a.clone();
            Rc::new(move || Ok(!a.get()?))
        };
        Ok(Self {
            node: wire(NodeKind::Not, &[&a], compute)?,
        })
    }

    /// Get-or-create a NOT over `source`.
    ///
    /// Scans the source's live dependents, earliest-registered first, for
    /// an existing NOT node and hands that back instead of growing the
    /// graph. Best-effort only: reuse candidates are found among direct
    /// dependents of this source, there is no global memo table.
    pub fn of(source: &dyn DepValue<bool>) -> Result<Self, DepError> {
        let src = source.node();
        for (kind, hook) in src.edges() {
            if kind != NodeKind::Not {
                continue;
            }
            if let Some(weak) = hook.handle.downcast_ref::<WeakNode<bool>>() {
                if let Some(node) = weak.upgrade() {
                    debug!(
                        source = src.id().raw(),
                        not = node.id().raw(),
                        "reusing existing NOT node"
                    );
                    return Ok(Self { node });
                }
            }
        }
        Self::new(source)
    }
}

impl Deref for DepAnd {
    type Target = NodeRef<bool>;

    fn deref(&self) -> &NodeRef<bool> {
        &self.node
    }
}

impl Deref for DepOr {
    type Target = NodeRef<bool>;

    fn deref(&self) -> &NodeRef<bool> {
        &self.node
    }
}

impl Deref for DepNot {
    type Target = NodeRef<bool>;

    fn deref(&self) -> &NodeRef<bool> {
        &self.node
    }
}

impl DepValue<bool> for DepAnd {
    fn node(&self) -> NodeRef<bool> {
        self.node.clone()
    }
}

impl DepValue<bool> for DepOr {
    fn node(&self) -> NodeRef<bool> {
        self.node.clone()
    }
}

impl DepValue<bool> for DepNot {
    fn node(&self) -> NodeRef<bool> {
        self.node.clone()
    }
}
