//! Derived (expression) nodes.
//!
//! An expression node computes its value from one or more argument nodes
//! and recomputes whenever any non-constant argument changes. All arities
//! funnel through one internal wiring engine; the concrete combinators
//! (`DepAnd`, `DepCompare`, `DepIf`, ...) are facades over it with a fixed
//! compute closure and a kind tag.
//!
//! Argument lists are fixed at construction and never resized. The only
//! way to "add an input" to an existing boolean combinator is
//! wrap-and-replace via `DepAnd::attach_input` / `DepOr::attach_input`:
//! growing an existing node's argument array in place would miss updates
//! from the unsubscribed new argument, and swapping arguments out would
//! leak stale subscriptions.

mod compare;
mod func;
mod logic;
mod select;

pub use compare::{CompareKind, DepCompare, DepEqual, DepInArray, DepInRange};
pub use func::{DepFunc1, DepFunc2, DepFunc3, DepFuncN};
pub use logic::{DepAnd, DepNot, DepOr};
pub use select::{DepByIndex, DepIf};

use std::rc::Rc;

use crate::error::DepError;
use crate::node::cell::{self, DepCell, NodeKind, OutputEdge, UpstreamHook, Value};
use crate::node::{NodeId, NodeRef};

/// Type-erased view of an argument node, enough to wire a subscription.
pub(crate) trait ArgNode {
    fn id(&self) -> NodeId;
    fn is_const(&self) -> bool;
    fn attach(&self, edge: OutputEdge);
}

impl<T: Value> ArgNode for NodeRef<T> {
    fn id(&self) -> NodeId {
        NodeRef::id(self)
    }

    fn is_const(&self) -> bool {
        NodeRef::is_const(self)
    }

    fn attach(&self, edge: OutputEdge) {
        self.attach_edge(edge);
    }
}

/// Build a derived node over `args` with the given compute closure.
///
/// The initial value is computed before the node exists, so a derived
/// node is never observable in a default state. One upstream hook is
/// built for the node and registered weakly with every non-constant
/// argument; constant arguments are skipped entirely (they can never
/// notify), and a node whose every argument is constant subscribes to
/// nothing and reports itself constant. A node appearing several times
/// in the argument list gets one edge; the compute closure still reads
/// it once per occurrence.
pub(crate) fn wire<R: Value>(
    kind: NodeKind,
    args: &[&dyn ArgNode],
    compute: Rc<dyn Fn() -> Result<R, DepError>>,
) -> Result<NodeRef<R>, DepError> {
    let constant = args.iter().all(|a| a.is_const());
    let initial = compute()?;
    let node = NodeRef::from_cell(DepCell::new(kind, initial, constant));

    let weak = node.downgrade();
    let recompute = Rc::clone(&compute);
    let hook = Rc::new(UpstreamHook {
        notify: Box::new(move || {
            let Some(node) = weak.upgrade() else {
                return Ok(());
            };
            let v = recompute()?;
            cell::push(&node.cell, v)
        }),
        handle: Box::new(node.downgrade()),
    });

    let mut attached: Vec<NodeId> = Vec::with_capacity(args.len());
    for arg in args {
        if arg.is_const() || attached.contains(&arg.id()) {
            continue;
        }
        attached.push(arg.id());
        arg.attach(OutputEdge {
            id: node.id(),
            kind,
            hook: Rc::downgrade(&hook),
        });
    }
    node.cell.borrow_mut().hook = Some(hook);
    Ok(node)
}
