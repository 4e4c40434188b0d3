//! Error types for the propagation core.
//!
//! All failures here indicate a mis-wired graph, not a runtime condition an
//! end user can trigger. They surface synchronously from the call that
//! started the offending operation; a recompute failure deep inside a
//! fan-out walk propagates out of the originating `set` and aborts
//! notification of the remaining dependents.

use thiserror::Error;

/// Errors raised by node construction and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DepError {
    /// A value was written to a constant node.
    #[error("constant nodes cannot be reassigned")]
    ConstReassigned,

    /// A delayed input was read while flagged for lazy recompute, but no
    /// producer callback has been registered.
    #[error("delayed value read with no producer registered")]
    MissingProducer,

    /// An N-ary node was constructed over an empty argument list.
    #[error("expression node requires at least one argument")]
    NoArguments,
}
