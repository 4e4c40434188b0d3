//! Checked (validated) input nodes.

use std::ops::Deref;
use std::rc::Rc;

use crate::error::DepError;

use super::cell::{DepCell, NodeKind, Value};
use super::handle::{DepValue, NodeRef};

/// A mutable input that runs a validation hook before committing an
/// externally written value.
///
/// The hook receives the current and the proposed value. Returning
/// `Some(v)` commits `v` (the hook may rewrite the proposal); returning
/// `None` cancels the write silently, with no notification. The hook is
/// consulted only for externally initiated writes: source-driven
/// propagation writes through the raw push primitive, and a re-entrant
/// write arriving mid-propagation skips the hook (the push drops it
/// anyway).
#[derive(Debug, Clone)]
pub struct DepChecked<T: Value> {
    node: NodeRef<T>,
}

impl<T: Value> DepChecked<T> {
    pub fn new(value: T, check: impl Fn(&T, T) -> Option<T> + 'static) -> Self {
        let node = NodeRef::from_cell(DepCell::new(NodeKind::Checked, value, false));
        node.cell.borrow_mut().check = Some(Rc::new(check));
        Self { node }
    }

    /// Bind this input to an upstream source, or unbind it with `None`.
    /// Source-driven values bypass the validation hook.
    pub fn set_source(&self, source: Option<NodeRef<T>>) -> Result<(), DepError> {
        self.node.set_source_impl(source)
    }
}

impl<T: Value> Deref for DepChecked<T> {
    type Target = NodeRef<T>;

    fn deref(&self) -> &NodeRef<T> {
        &self.node
    }
}

impl<T: Value> DepValue<T> for DepChecked<T> {
    fn node(&self) -> NodeRef<T> {
        self.node.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DepInput;
    use std::cell::Cell;

    fn clamped() -> DepChecked<i32> {
        // Reject negatives, clamp everything else to 0..=10.
        DepChecked::new(0, |_current, proposed| {
            if proposed < 0 {
                None
            } else {
                Some(proposed.min(10))
            }
        })
    }

    #[test]
    fn hook_may_rewrite_the_value() {
        let node = clamped();
        node.set(5).unwrap();
        assert_eq!(node.get(), Ok(5));

        node.set(50).unwrap();
        assert_eq!(node.get(), Ok(10));
    }

    #[test]
    fn cancelled_write_is_silent() {
        let node = clamped();
        node.set(5).unwrap();

        let fired = Rc::new(Cell::new(0));
        let fired_clone = Rc::clone(&fired);
        node.subscribe(move || {
            fired_clone.set(fired_clone.get() + 1);
        });

        node.set(-1).unwrap();
        assert_eq!(node.get(), Ok(5));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn source_driven_values_bypass_the_hook() {
        let src = DepInput::with_value(0);
        let node = clamped();
        node.set_source(Some(src.node())).unwrap();

        src.set(500).unwrap();
        assert_eq!(node.get(), Ok(500));
    }
}
