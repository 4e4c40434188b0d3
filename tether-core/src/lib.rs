//! Tether Core
//!
//! This crate provides a push-based dependency-value propagation engine.
//! It implements:
//!
//! - Value nodes (constants, inputs, delayed values, checked values)
//! - Expression nodes that recompute from their arguments
//! - Logic, comparison and selection combinators over those nodes
//! - Graph rewriting helpers for growing boolean expressions in place
//!
//! Changes propagate synchronously and depth first: writing a node runs
//! every downstream recompute before the write returns. Propagation is
//! gated on value equality, so a write that does not change a node's
//! value goes nowhere, and a node that recomputes to its previous value
//! stops the wave at that point.
//!
//! The engine is single threaded. Nodes are reference-counted handles
//! around interior-mutable cells and are neither `Send` nor `Sync`;
//! build and drive a graph from one thread.
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `node`: the propagation cell, node handles and the value node family
//! - `expr`: expression wiring and the combinator family built on it
//!
//! # Example
//!
//! ```rust
//! use tether_core::{DepFunc2, DepInput};
//!
//! let width = DepInput::with_value(3);
//! let height = DepInput::with_value(4);
//!
//! let area = DepFunc2::new(&width, &height, |w: i32, h: i32| w * h).unwrap();
//! assert_eq!(area.get(), Ok(12));
//!
//! // Writing an input recomputes everything downstream before returning.
//! width.set(10).unwrap();
//! assert_eq!(area.get(), Ok(40));
//! ```

pub mod error;
pub mod expr;
pub mod node;

pub use error::DepError;
pub use expr::{
    CompareKind, DepAnd, DepByIndex, DepCompare, DepEqual, DepFunc1, DepFunc2, DepFunc3, DepFuncN,
    DepIf, DepInArray, DepInRange, DepNot, DepOr,
};
pub use node::{
    DepChecked, DepConst, DepDelayed, DepInput, DepValue, ListenerId, NodeId, NodeKind, NodeRef,
    OwnerInfo, Value,
};
