//! Shared per-node state and the push primitive.
//!
//! Every node in the graph, whatever its public face, is backed by a
//! `DepCell<T>` behind `Rc<RefCell<_>>`. The cell holds the cached value,
//! the re-entrancy and delay flags, the list of dependent edges and the
//! list of external change listeners.
//!
//! # How propagation works
//!
//! 1. `push` is the single write primitive. It compares the incoming value
//!    against the cache; an unchanged value is swallowed without any
//!    notification.
//!
//! 2. On a real change the cell fires its external listeners, then walks
//!    its dependent edges, newest attachment first, invoking each
//!    dependent's upstream-changed hook. Each hook recomputes and pushes
//!    into its own node, so the whole downstream graph settles depth-first
//!    before `push` returns.
//!
//! 3. While a cell is mid-propagation (`inside_set`), any re-entrant write
//!    to it is dropped. This is what makes cyclic graphs terminate: the
//!    second arrival at a node in one cascade is truncated, and every node
//!    keeps the value computed on the first pass.
//!
//! # Ownership direction
//!
//! Dependents hold strong handles to their sources (captured inside their
//! hooks); sources hold only `Weak` edges to dependent hooks. Dropping a
//! dependent silently retires its edge, which is pruned lazily at the
//! start of the next walk.

use std::any::Any;
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::DepError;

use super::handle::{NodeRef, OwnerInfo};
use super::id::{ListenerId, NodeId};

/// Bound required of every value carried by a node.
///
/// `PartialEq` drives change detection, `Default` supplies the value of an
/// unbound input, `Debug` feeds the diagnostic rendering. Blanket
/// implemented; never implement it by hand.
pub trait Value: Clone + PartialEq + Default + Debug + 'static {}

impl<T: Clone + PartialEq + Default + Debug + 'static> Value for T {}

/// What kind of node a cell backs. Cosmetic except for the NOT-reuse scan,
/// which keys off `Not`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Const,
    Input,
    Delayed,
    Checked,
    Func,
    And,
    Or,
    Not,
    Equal,
    Compare,
    InRange,
    InArray,
    If,
    ByIndex,
}

impl NodeKind {
    /// Label used when rendering a node that carries no owner metadata.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Const => "CONST",
            NodeKind::Input => "INPUT",
            NodeKind::Delayed => "DELAYED",
            NodeKind::Checked => "CHECKED",
            NodeKind::Func => "FN",
            NodeKind::And => "AND",
            NodeKind::Or => "OR",
            NodeKind::Not => "NOT",
            NodeKind::Equal => "EQUAL",
            NodeKind::Compare => "COMPARE",
            NodeKind::InRange => "IN_RANGE",
            NodeKind::InArray => "IN_ARRAY",
            NodeKind::If => "IF",
            NodeKind::ByIndex => "BY_INDEX",
        }
    }
}

pub(crate) type CellRef<T> = Rc<RefCell<DepCell<T>>>;

/// A dependent's reaction to an upstream change.
///
/// One hook is built per dependent node and registered (weakly) with every
/// non-constant source that node reads. `notify` recomputes the dependent
/// and pushes the result through its own cell; `handle` is a type-erased
/// weak handle to the dependent, used by output-list introspection.
pub(crate) struct UpstreamHook {
    pub(crate) notify: Box<dyn Fn() -> Result<(), DepError>>,
    pub(crate) handle: Box<dyn Any>,
}

/// An edge from a source cell to one dependent's hook.
pub(crate) struct OutputEdge {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) hook: Weak<UpstreamHook>,
}

/// An external change listener. Zero-argument: handlers read the new value
/// back through the node handle.
pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) call: Rc<dyn Fn()>,
}

/// The shared state behind every node handle.
pub(crate) struct DepCell<T: Value> {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) value: T,
    pub(crate) constant: bool,
    pub(crate) inside_set: bool,
    pub(crate) delayed: bool,
    pub(crate) owner: Option<OwnerInfo>,
    /// Dependent edges in attach order; the walk iterates newest first.
    pub(crate) outputs: SmallVec<[OutputEdge; 2]>,
    pub(crate) listeners: SmallVec<[Listener; 2]>,
    /// Bound upstream source. Input-family cells only; always `None`
    /// elsewhere.
    pub(crate) source: Option<NodeRef<T>>,
    /// This node's own upstream-changed hook, kept alive here while it is
    /// registered (weakly) with its source or arguments.
    pub(crate) hook: Option<Rc<UpstreamHook>>,
    /// Validation hook for checked inputs: `(current, proposed)` in, the
    /// value to commit out, `None` to cancel.
    pub(crate) check: Option<Rc<dyn Fn(&T, T) -> Option<T>>>,
    /// Producer for delayed inputs; fills a slot seeded from the cache.
    pub(crate) producer: Option<Rc<dyn Fn(&mut T)>>,
}

impl<T: Value> DepCell<T> {
    pub(crate) fn new(kind: NodeKind, value: T, constant: bool) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            value,
            constant,
            inside_set: false,
            delayed: false,
            owner: None,
            outputs: SmallVec::new(),
            listeners: SmallVec::new(),
            source: None,
            hook: None,
            check: None,
            producer: None,
        }
    }
}

/// Clears `inside_set` when dropped, so an erroring dependent cannot leave
/// the node wedged mid-propagation.
struct SetGuard<T: Value> {
    cell: CellRef<T>,
}

impl<T: Value> Drop for SetGuard<T> {
    fn drop(&mut self) {
        self.cell.borrow_mut().inside_set = false;
    }
}

/// The write primitive behind every concrete node.
///
/// Re-entrant writes are dropped while the cell is mid-propagation, and an
/// unchanged value never notifies. An accepted write supersedes any
/// pending lazy recompute: the pushed value is authoritative, so the
/// delayed flag is cleared even when the value is unchanged. On a real
/// change the cell fires its listeners and walks its dependents; the
/// first dependent error aborts the remaining walk and surfaces from
/// here.
pub(crate) fn push<T: Value>(cell: &CellRef<T>, next: T) -> Result<(), DepError> {
    {
        let mut c = cell.borrow_mut();
        if c.inside_set {
            debug!(node = c.id.raw(), "re-entrant write dropped mid-propagation");
            return Ok(());
        }
        if next == c.value {
            c.delayed = false;
            return Ok(());
        }
        trace!(node = c.id.raw(), kind = c.kind.label(), "value changed");
        c.inside_set = true;
        c.delayed = false;
        c.value = next;
    }
    let _guard = SetGuard { cell: Rc::clone(cell) };
    notify(cell)
}

/// Flag the cell for lazy recompute and run the same listener/dependent
/// walk as `push`, without touching the cached value. Dependents pull the
/// fresh value through `get` when they react.
pub(crate) fn mark_delayed<T: Value>(cell: &CellRef<T>) -> Result<(), DepError> {
    {
        let mut c = cell.borrow_mut();
        if c.inside_set {
            debug!(node = c.id.raw(), "re-entrant delay mark dropped");
            return Ok(());
        }
        c.inside_set = true;
        c.delayed = true;
    }
    let _guard = SetGuard { cell: Rc::clone(cell) };
    notify(cell)
}

/// Fire listeners, then walk dependent edges newest-attachment-first.
///
/// Both lists are snapshotted before any callback runs, so handlers may
/// subscribe, unsubscribe or rebind mid-walk without invalidating it.
fn notify<T: Value>(cell: &CellRef<T>) -> Result<(), DepError> {
    let calls: Vec<Rc<dyn Fn()>> = cell
        .borrow()
        .listeners
        .iter()
        .map(|l| Rc::clone(&l.call))
        .collect();
    for call in calls {
        call();
    }

    let hooks: Vec<Rc<UpstreamHook>> = {
        let mut c = cell.borrow_mut();
        c.outputs.retain(|e| e.hook.strong_count() > 0);
        c.outputs.iter().rev().filter_map(|e| e.hook.upgrade()).collect()
    };
    for hook in hooks {
        (hook.notify)()?;
    }
    Ok(())
}
