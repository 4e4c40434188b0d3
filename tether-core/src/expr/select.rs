//! Selection combinators: two-way branch and indexed lookup.
//!
//! Both combinators subscribe to every argument, branches included. A
//! change on the untaken branch still triggers a recompute; the result
//! only propagates further if the selected value actually differs.

use std::ops::Deref;
use std::rc::Rc;

use crate::error::DepError;
use crate::node::cell::NodeKind;
use crate::node::{DepConst, DepValue, NodeRef, Value};

use super::{wire, ArgNode};

/// Two-way selection: yields the `then` argument while the condition
/// holds, the `otherwise` argument when it does not.
#[derive(Debug, Clone)]
pub struct DepIf<T: Value> {
    node: NodeRef<T>,
}

impl<T: Value> DepIf<T> {
    pub fn new(
        condition: &dyn DepValue<bool>,
        then: &dyn DepValue<T>,
        otherwise: &dyn DepValue<T>,
    ) -> Result<Self, DepError> {
        let cond = condition.node();
        let yes = then.node();
        let no = otherwise.node();
        let compute: Rc<dyn Fn() -> Result<T, DepError>> = {
            let cond = cond.clone();
            let yes = yes.clone();
            let no = no.clone();
            Rc::new(move || {
                if cond.get()? {
                    yes.get()
                } else {
                    no.get()
                }
            })
        };
        Ok(Self {
            node: wire(NodeKind::If, &[&cond, &yes, &no], compute)?,
        })
    }

    /// Branch between two literals, wrapped in constant nodes.
    pub fn with_values(
        condition: &dyn DepValue<bool>,
        then: T,
        otherwise: T,
    ) -> Result<Self, DepError> {
        let yes = DepConst::new(then);
        let no = DepConst::new(otherwise);
        Self::new(condition, &yes, &no)
    }
}

/// Indexed selection over a fixed list of candidates. A negative or
/// out-of-range index yields the fallback argument.
#[derive(Debug, Clone)]
pub struct DepByIndex<T: Value> {
    node: NodeRef<T>,
}

impl<T: Value> DepByIndex<T> {
    pub fn new(
        index: &dyn DepValue<i32>,
        items: &[&dyn DepValue<T>],
        fallback: &dyn DepValue<T>,
    ) -> Result<Self, DepError> {
        let idx = index.node();
        let candidates: Vec<NodeRef<T>> = items.iter().map(|item| item.node()).collect();
        let fall = fallback.node();

        let mut args: Vec<&dyn ArgNode> = Vec::with_capacity(candidates.len() + 2);
        args.push(&idx);
        for c in &candidates {
            args.push(c);
        }
        args.push(&fall);

        let compute: Rc<dyn Fn() -> Result<T, DepError>> = {
            let idx = idx.clone();
            let candidates = candidates.clone();
            let fall = fall.clone();
            Rc::new(move || {
                let i = idx.get()?;
                match usize::try_from(i).ok().and_then(|i| candidates.get(i)) {
                    Some(hit) => hit.get(),
                    None => fall.get(),
                }
            })
        };
        Ok(Self {
            node: wire(NodeKind::ByIndex, &args, compute)?,
        })
    }

    /// Select between literal candidates and a literal fallback, all
    /// wrapped in constant nodes.
    pub fn from_values(
        index: &dyn DepValue<i32>,
        values: Vec<T>,
        fallback: T,
    ) -> Result<Self, DepError> {
        let consts: Vec<DepConst<T>> = values.into_iter().map(DepConst::new).collect();
        let items: Vec<&dyn DepValue<T>> = consts.iter().map(|c| c as &dyn DepValue<T>).collect();
        let fall = DepConst::new(fallback);
        Self::new(index, &items, &fall)
    }
}

impl<T: Value> Deref for DepIf<T> {
    type Target = NodeRef<T>;

    fn deref(&self) -> &NodeRef<T> {
        &self.node
    }
}

impl<T: Value> Deref for DepByIndex<T> {
    type Target = NodeRef<T>;

    fn deref(&self) -> &NodeRef<T> {
        &self.node
    }
}

impl<T: Value> DepValue<T> for DepIf<T> {
    fn node(&self) -> NodeRef<T> {
        self.node.clone()
    }
}

impl<T: Value> DepValue<T> for DepByIndex<T> {
    fn node(&self) -> NodeRef<T> {
        self.node.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DepInput;

    #[test]
    fn if_follows_the_condition() {
        let cond = DepInput::with_value(true);
        let sel = DepIf::with_values(&cond, 1, 2).unwrap();
        assert_eq!(sel.get(), Ok(1));

        cond.set(false).unwrap();
        assert_eq!(sel.get(), Ok(2));
    }

    #[test]
    fn if_tracks_both_branches() {
        let cond = DepInput::with_value(false);
        let yes = DepInput::with_value(String::from("on"));
        let no = DepInput::with_value(String::from("off"));
        let sel = DepIf::new(&cond, &yes, &no).unwrap();
        assert_eq!(sel.get(), Ok(String::from("off")));

        no.set(String::from("standby")).unwrap();
        assert_eq!(sel.get(), Ok(String::from("standby")));

        cond.set(true).unwrap();
        assert_eq!(sel.get(), Ok(String::from("on")));
    }

    #[test]
    fn by_index_picks_the_candidate() {
        let idx = DepInput::with_value(0);
        let sel = DepByIndex::from_values(&idx, vec![10, 20, 30], -1).unwrap();
        assert_eq!(sel.get(), Ok(10));

        idx.set(1).unwrap();
        assert_eq!(sel.get(), Ok(20));
    }

    #[test]
    fn by_index_out_of_range_falls_back() {
        let idx = DepInput::with_value(5);
        let sel = DepByIndex::from_values(&idx, vec![10, 20, 30], -1).unwrap();
        assert_eq!(sel.get(), Ok(-1));

        idx.set(-3).unwrap();
        assert_eq!(sel.get(), Ok(-1));

        idx.set(2).unwrap();
        assert_eq!(sel.get(), Ok(30));
    }

    #[test]
    fn by_index_index_may_double_as_candidate() {
        let idx = DepInput::with_value(0);
        let other = DepInput::with_value(7);
        let fall = DepInput::with_value(-1);
        let sel = DepByIndex::new(&idx, &[&idx, &other], &fall).unwrap();

        assert_eq!(sel.get(), Ok(0));
        assert_eq!(idx.output_count(), 1);

        idx.set(1).unwrap();
        assert_eq!(sel.get(), Ok(7));

        idx.set(9).unwrap();
        assert_eq!(sel.get(), Ok(-1));
    }

    #[test]
    fn by_index_tracks_reactive_candidates() {
        let idx = DepInput::with_value(1);
        let a = DepInput::with_value(10);
        let b = DepInput::with_value(20);
        let fall = DepInput::with_value(-1);
        let sel = DepByIndex::new(&idx, &[&a, &b], &fall).unwrap();
        assert_eq!(sel.get(), Ok(20));

        b.set(25).unwrap();
        assert_eq!(sel.get(), Ok(25));

        idx.set(7).unwrap();
        fall.set(-2).unwrap();
        assert_eq!(sel.get(), Ok(-2));
    }
}
