//! Node handles.
//!
//! `NodeRef<T>` is the public, cloneable handle over a node's shared cell.
//! Clones share state: reading, writing or subscribing through any clone
//! observes the same node. Edges in the graph (an input's source, an
//! expression's arguments) are plain `NodeRef`s, so any handle-holding
//! node keeps its upstream alive.
//!
//! The whole graph is single-threaded by design: handles are `Rc`-based
//! and deliberately `!Send`. All reads, writes and rebinds must happen on
//! one logical thread.

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::error::DepError;

use super::cell::{self, CellRef, DepCell, NodeKind, OutputEdge, UpstreamHook, Value};
use super::id::{ListenerId, NodeId};

/// Optional per-node diagnostic metadata. Purely cosmetic; never consulted
/// by propagation or equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerInfo {
    pub owner: String,
    pub property: String,
}

/// Anything that can stand in for a value node of type `T` when wiring a
/// graph: handles themselves and every concrete node facade.
pub trait DepValue<T: Value> {
    /// A handle to the underlying node.
    fn node(&self) -> NodeRef<T>;
}

/// A shared handle to a value node.
pub struct NodeRef<T: Value> {
    pub(crate) cell: CellRef<T>,
}

impl<T: Value> NodeRef<T> {
    pub(crate) fn from_cell(cell: DepCell<T>) -> Self {
        Self {
            cell: Rc::new(std::cell::RefCell::new(cell)),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakNode<T> {
        WeakNode {
            cell: Rc::downgrade(&self.cell),
        }
    }

    /// The node's unique ID.
    pub fn id(&self) -> NodeId {
        self.cell.borrow().id
    }

    /// What kind of node this handle points at.
    pub fn kind(&self) -> NodeKind {
        self.cell.borrow().kind
    }

    /// Whether this node's value can never change: true for constants, and
    /// for derived nodes whose every argument is constant.
    pub fn is_const(&self) -> bool {
        self.cell.borrow().constant
    }

    /// Whether two handles point at the same node.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.cell, &b.cell)
    }

    /// Read the current value.
    ///
    /// A node flagged for lazy recompute runs its producer first: the
    /// producer fills a slot seeded from the cached value, and the slot
    /// is committed. The flag is cleared before the producer runs, so a
    /// producer that reads back through its own node observes the cached
    /// value instead of recursing. The pull itself never notifies.
    /// Reading a flagged node with no producer registered fails.
    pub fn get(&self) -> Result<T, DepError> {
        let pending = {
            let c = self.cell.borrow();
            if c.delayed {
                Some(c.producer.clone())
            } else {
                None
            }
        };
        match pending {
            None => Ok(self.cell.borrow().value.clone()),
            Some(None) => Err(DepError::MissingProducer),
            Some(Some(producer)) => {
                trace!(node = self.id().raw(), "delayed value pulled");
                let mut slot = {
                    let mut c = self.cell.borrow_mut();
                    c.delayed = false;
                    c.value.clone()
                };
                producer(&mut slot);
                self.cell.borrow_mut().value = slot.clone();
                Ok(slot)
            }
        }
    }

    /// Write a value and propagate it downstream.
    ///
    /// Constants reject the write. A checked input runs its validation
    /// hook first (unless the write arrives re-entrantly mid-propagation,
    /// in which case it is dropped by the push primitive anyway). An
    /// unchanged value notifies nobody. The first error raised by a
    /// dependent's recompute aborts the remaining fan-out and surfaces
    /// here; this node's own value stays committed.
    pub fn set(&self, value: T) -> Result<(), DepError> {
        let gate = {
            let c = self.cell.borrow();
            if c.constant {
                return Err(DepError::ConstReassigned);
            }
            if c.inside_set {
                None
            } else {
                c.check.clone().map(|check| (check, c.value.clone()))
            }
        };
        let value = match gate {
            Some((check, current)) => match check(&current, value) {
                Some(value) => value,
                None => {
                    trace!(node = self.id().raw(), "write cancelled by validation hook");
                    return Ok(());
                }
            },
            None => value,
        };
        cell::push(&self.cell, value)
    }

    /// Register a change listener. The notification is zero-argument;
    /// handlers read the new value back through the handle.
    pub fn subscribe(&self, f: impl Fn() + 'static) -> ListenerId {
        let id = ListenerId::new();
        self.cell.borrow_mut().listeners.push(cell::Listener {
            id,
            call: Rc::new(f),
        });
        id
    }

    /// Remove a previously registered change listener.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.cell.borrow_mut().listeners.retain(|l| l.id != id);
    }

    /// The upstream source this node is bound to. Always `None` for nodes
    /// outside the mutable-input family.
    pub fn source(&self) -> Option<NodeRef<T>> {
        self.cell.borrow().source.clone()
    }

    /// Number of live dependents attached to this node.
    pub fn output_count(&self) -> usize {
        self.cell
            .borrow()
            .outputs
            .iter()
            .filter(|e| e.hook.strong_count() > 0)
            .count()
    }

    /// Diagnostic owner metadata, if any.
    pub fn owner(&self) -> Option<OwnerInfo> {
        self.cell.borrow().owner.clone()
    }

    /// Attach diagnostic owner metadata. Cosmetic only.
    pub fn set_owner(&self, owner: impl Into<String>, property: impl Into<String>) {
        self.cell.borrow_mut().owner = Some(OwnerInfo {
            owner: owner.into(),
            property: property.into(),
        });
    }

    pub(crate) fn mark_delayed(&self) -> Result<(), DepError> {
        cell::mark_delayed(&self.cell)
    }

    pub(crate) fn attach_edge(&self, edge: OutputEdge) {
        let mut c = self.cell.borrow_mut();
        debug_assert!(
            c.outputs.iter().all(|e| e.id != edge.id),
            "node {:?} attached twice to {:?}",
            edge.id,
            c.id
        );
        c.outputs.push(edge);
    }

    pub(crate) fn remove_edge(&self, id: NodeId) {
        self.cell.borrow_mut().outputs.retain(|e| e.id != id);
    }

    /// Live dependent edges in attach order (oldest first). Used by the
    /// NOT-reuse scan, which wants the earliest-registered candidate.
    pub(crate) fn edges(&self) -> Vec<(NodeKind, Rc<UpstreamHook>)> {
        self.cell
            .borrow()
            .outputs
            .iter()
            .filter_map(|e| e.hook.upgrade().map(|h| (e.kind, h)))
            .collect()
    }

    /// Rebind this node's upstream source.
    ///
    /// No-op when the new source is the old one. Otherwise the node is
    /// unregistered from the old source, registered with the new one
    /// (unless the new source is constant, which can never notify), and
    /// the upstream hook runs once immediately: the source's value, or the
    /// type default when unbinding, is handed straight to the push
    /// primitive, bypassing any validation hook.
    pub(crate) fn set_source_impl(&self, next: Option<NodeRef<T>>) -> Result<(), DepError> {
        let prev = self.cell.borrow().source.clone();
        match (&prev, &next) {
            (None, None) => return Ok(()),
            (Some(a), Some(b)) if Self::ptr_eq(a, b) => return Ok(()),
            _ => {}
        }
        if let Some(prev) = prev {
            prev.remove_edge(self.id());
        }
        {
            let mut c = self.cell.borrow_mut();
            c.source = next.clone();
            c.hook = None;
        }
        match next {
            Some(src) => {
                let weak = self.downgrade();
                let puller = src.clone();
                let hook = Rc::new(UpstreamHook {
                    notify: Box::new(move || {
                        let Some(node) = weak.upgrade() else {
                            return Ok(());
                        };
                        let v = puller.get()?;
                        cell::push(&node.cell, v)
                    }),
                    handle: Box::new(self.downgrade()),
                });
                if !src.is_const() {
                    src.attach_edge(OutputEdge {
                        id: self.id(),
                        kind: self.kind(),
                        hook: Rc::downgrade(&hook),
                    });
                }
                self.cell.borrow_mut().hook = Some(hook);
                trace!(node = self.id().raw(), source = src.id().raw(), "source bound");
                let v = src.get()?;
                cell::push(&self.cell, v)
            }
            None => {
                trace!(node = self.id().raw(), "source cleared");
                cell::push(&self.cell, T::default())
            }
        }
    }
}

impl<T: Value> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Value> DepValue<T> for NodeRef<T> {
    fn node(&self) -> NodeRef<T> {
        self.clone()
    }
}

impl<T: Value> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.cell.borrow();
        f.debug_struct("NodeRef")
            .field("id", &c.id)
            .field("kind", &c.kind)
            .field("value", &c.value)
            .field("constant", &c.constant)
            .finish()
    }
}

impl<T: Value> fmt::Display for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.cell.borrow();
        match &c.owner {
            Some(info) => write!(
                f,
                "{}, Property=\"{}\", Value={:?}",
                info.owner, info.property, c.value
            ),
            None => f.write_str(c.kind.label()),
        }
    }
}

/// Weak counterpart of `NodeRef`, used where a strong handle would keep a
/// node alive from its own hook.
pub(crate) struct WeakNode<T: Value> {
    cell: Weak<std::cell::RefCell<DepCell<T>>>,
}

impl<T: Value> WeakNode<T> {
    pub(crate) fn upgrade(&self) -> Option<NodeRef<T>> {
        self.cell.upgrade().map(|cell| NodeRef { cell })
    }
}

impl<T: Value> Clone for WeakNode<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn input<T: Value>(value: T) -> NodeRef<T> {
        NodeRef::from_cell(DepCell::new(NodeKind::Input, value, false))
    }

    #[test]
    fn get_and_set() {
        let node = input(0);
        assert_eq!(node.get(), Ok(0));

        node.set(42).unwrap();
        assert_eq!(node.get(), Ok(42));
    }

    #[test]
    fn clone_shares_state() {
        let node1 = input(0);
        let node2 = node1.clone();

        node1.set(42).unwrap();
        assert_eq!(node2.get(), Ok(42));

        node2.set(100).unwrap();
        assert_eq!(node1.get(), Ok(100));
        assert!(NodeRef::ptr_eq(&node1, &node2));
    }

    #[test]
    fn unchanged_value_does_not_notify() {
        let node = input(5);
        let fired = Rc::new(Cell::new(0));
        let fired_clone = Rc::clone(&fired);
        node.subscribe(move || {
            fired_clone.set(fired_clone.get() + 1);
        });

        node.set(5).unwrap();
        assert_eq!(fired.get(), 0);

        node.set(6).unwrap();
        assert_eq!(fired.get(), 1);

        node.set(6).unwrap();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let node = input(0);
        let fired = Rc::new(Cell::new(0));
        let fired_clone = Rc::clone(&fired);
        let id = node.subscribe(move || {
            fired_clone.set(fired_clone.get() + 1);
        });

        node.set(1).unwrap();
        assert_eq!(fired.get(), 1);

        node.unsubscribe(id);
        node.set(2).unwrap();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn reentrant_write_is_dropped() {
        let node = input(0);
        let reentry = node.clone();
        node.subscribe(move || {
            // A handler writing back into the node mid-propagation must be
            // a no-op, not a recursion.
            reentry.set(99).unwrap();
        });

        node.set(1).unwrap();
        assert_eq!(node.get(), Ok(1));
    }

    #[test]
    fn display_prefers_owner_metadata() {
        let node = input(7);
        assert_eq!(node.to_string(), "INPUT");

        node.set_owner("LoginDialog", "Enabled");
        assert_eq!(node.to_string(), "LoginDialog, Property=\"Enabled\", Value=7");
        assert_eq!(
            node.owner(),
            Some(OwnerInfo {
                owner: "LoginDialog".into(),
                property: "Enabled".into()
            })
        );
    }

    #[test]
    fn source_is_none_outside_input_family() {
        let node = input(0);
        assert!(node.source().is_none());
    }
}
