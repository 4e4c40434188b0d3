//! Delayed (lazily recomputed) input nodes.
//!
//! A delayed input defers producing its value until somebody reads it.
//! Marking the node delayed notifies dependents exactly like a push, but
//! leaves the cached value alone; the fresh value is pulled through the
//! producer callback at read time. Because a bound input always has an
//! authoritative upstream value, the mark is a no-op while a source is
//! bound.

use std::ops::Deref;
use std::rc::Rc;

use crate::error::DepError;

use super::cell::{DepCell, NodeKind, Value};
use super::handle::{DepValue, NodeRef};

/// A mutable input whose value can be recomputed on demand at read time.
#[derive(Debug, Clone)]
pub struct DepDelayed<T: Value> {
    node: NodeRef<T>,
}

impl<T: Value> DepDelayed<T> {
    /// An unbound delayed input holding `value`, with no producer yet.
    pub fn new(value: T) -> Self {
        Self {
            node: NodeRef::from_cell(DepCell::new(NodeKind::Delayed, value, false)),
        }
    }

    /// An unbound delayed input with its producer registered up front.
    pub fn with_producer(value: T, producer: impl Fn(&mut T) + 'static) -> Self {
        let this = Self::new(value);
        this.set_producer(producer);
        this
    }

    /// Register the producer invoked on a delayed read. The producer
    /// receives a slot seeded from the cached value and fills it; the
    /// slot's content becomes the new cached value.
    pub fn set_producer(&self, producer: impl Fn(&mut T) + 'static) {
        self.node.cell.borrow_mut().producer = Some(Rc::new(producer));
    }

    /// Flag the node for lazy recompute and notify dependents.
    ///
    /// No-op while a source is bound. Dependents reacting to the mark pull
    /// through `get`, which runs the producer at that moment, so the value
    /// they observe is the producer's answer at read time, not at mark
    /// time. Reading while flagged with no producer registered fails with
    /// [`DepError::MissingProducer`].
    pub fn mark_delayed_if_unbound(&self) -> Result<(), DepError> {
        if self.node.source().is_some() {
            return Ok(());
        }
        self.node.mark_delayed()
    }

    /// Bind this input to an upstream source, or unbind it with `None`.
    pub fn set_source(&self, source: Option<NodeRef<T>>) -> Result<(), DepError> {
        self.node.set_source_impl(source)
    }
}

impl<T: Value> Deref for DepDelayed<T> {
    type Target = NodeRef<T>;

    fn deref(&self) -> &NodeRef<T> {
        &self.node
    }
}

impl<T: Value> DepValue<T> for DepDelayed<T> {
    fn node(&self) -> NodeRef<T> {
        self.node.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DepInput;
    use std::cell::Cell;

    #[test]
    fn delayed_read_pulls_producer_at_read_time() {
        let backing = Rc::new(Cell::new(1));
        let source = Rc::clone(&backing);
        let node = DepDelayed::with_producer(0, move |slot| *slot = source.get());

        node.mark_delayed_if_unbound().unwrap();
        // The backing data moves between the mark and the read; the read
        // must observe the later value.
        backing.set(2);
        assert_eq!(node.get(), Ok(2));

        // The pull cleared the flag; further reads hit the cache.
        backing.set(3);
        assert_eq!(node.get(), Ok(2));
    }

    #[test]
    fn delayed_read_without_producer_fails() {
        let node = DepDelayed::<i32>::new(5);
        node.mark_delayed_if_unbound().unwrap();
        assert_eq!(node.get(), Err(DepError::MissingProducer));

        // Registering the producer afterwards repairs the read.
        node.set_producer(|slot| *slot = 8);
        assert_eq!(node.get(), Ok(8));
    }

    #[test]
    fn direct_write_supersedes_a_pending_mark() {
        let node = DepDelayed::with_producer(0, |slot| *slot = 99);
        node.mark_delayed_if_unbound().unwrap();

        // The written value is authoritative; the producer must not run.
        node.set(5).unwrap();
        assert_eq!(node.get(), Ok(5));
    }

    #[test]
    fn unchanged_write_supersedes_a_pending_mark() {
        let node = DepDelayed::with_producer(0, |slot| *slot = 99);
        node.mark_delayed_if_unbound().unwrap();

        node.set(0).unwrap();
        assert_eq!(node.get(), Ok(0));
    }

    #[test]
    fn binding_supersedes_a_pending_mark() {
        let src = DepInput::with_value(7);
        let node = DepDelayed::<i32>::new(0);
        node.mark_delayed_if_unbound().unwrap();

        node.set_source(Some(src.node())).unwrap();
        assert_eq!(node.get(), Ok(7));
    }

    #[test]
    fn producer_reading_its_own_node_terminates() {
        let node = DepDelayed::new(1);
        let own = node.node();
        node.set_producer(move |slot| *slot = own.get().unwrap() + 1);

        // The pull clears the flag before running the producer, so the
        // inner read sees the cached value rather than recursing.
        node.mark_delayed_if_unbound().unwrap();
        assert_eq!(node.get(), Ok(2));
    }

    #[test]
    fn mark_is_a_noop_while_bound() {
        let src = DepInput::with_value(4);
        let node = DepDelayed::with_producer(0, |slot| *slot = 99);
        node.set_source(Some(src.node())).unwrap();

        node.mark_delayed_if_unbound().unwrap();
        assert_eq!(node.get(), Ok(4));
    }

    #[test]
    fn mark_notifies_dependents_without_changing_value() {
        let node = DepDelayed::with_producer(1, |slot| *slot = 7);
        let fired = Rc::new(Cell::new(0));
        let fired_clone = Rc::clone(&fired);
        node.subscribe(move || {
            fired_clone.set(fired_clone.get() + 1);
        });

        node.mark_delayed_if_unbound().unwrap();
        assert_eq!(fired.get(), 1);
        assert_eq!(node.get(), Ok(7));
    }
}
