//! Error type for graph construction and writes.

use crate::graph::SignalId;
use thiserror::Error;

/// Errors raised at graph construction or write time, before any propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    /// A push targeted a derived signal; only sources accept external writes.
    #[error("write to derived signal {0}")]
    WriteToDerived(SignalId),
    /// The signal handle does not belong to this graph.
    #[error("unknown signal {0}")]
    UnknownSignal(SignalId),
    /// The requested dependencies would make the signal depend on itself.
    #[error("dependency cycle through signal {0}")]
    DependencyCycle(SignalId),
    /// The target of a rewire is a source and has no dependencies.
    #[error("signal {0} is a source, not a derived signal")]
    NotDerived(SignalId),
    /// The signal holds a value of a different type than requested.
    #[error("type mismatch on signal {0}")]
    TypeMismatch(SignalId),
}
