//! Value nodes and the mutable-input family.
//!
//! This module implements the leaves and plumbing of the dependency
//! graph: the shared per-node cell, the public `NodeRef` handle, and the
//! concrete writable node kinds.
//!
//! # Concepts
//!
//! ## Value nodes
//!
//! Every node holds a cached value, fires a zero-argument change
//! notification when that value actually changes, and walks its dependent
//! edges synchronously, depth-first, on the writing caller's thread.
//!
//! ## Inputs
//!
//! A `DepInput` is written directly or bound to one upstream source at a
//! time. `DepDelayed` defers recomputing its value to read time via a
//! producer callback; `DepChecked` vets externally written values through
//! a validation hook.
//!
//! ## Constants
//!
//! A `DepConst` never changes and is never subscribed to. Derived nodes
//! fold constness: an expression over only constant arguments is itself
//! constant and skips all subscription bookkeeping.

pub(crate) mod cell;
mod checked;
mod constant;
mod delayed;
mod handle;
mod id;
mod input;

pub use cell::{NodeKind, Value};
pub use checked::DepChecked;
pub use constant::DepConst;
pub use delayed::DepDelayed;
pub use handle::{DepValue, NodeRef, OwnerInfo};
pub use id::{ListenerId, NodeId};
pub use input::DepInput;

pub(crate) use handle::WeakNode;
