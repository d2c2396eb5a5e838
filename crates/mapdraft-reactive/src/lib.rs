//! Push-based reactive dataflow engine.
//!
//! A [`SignalGraph`] owns a DAG of signals: sources that are pushed from the
//! outside and derived signals recomputed from their dependencies. A push
//! propagates synchronously through the graph in dependency order, and every
//! dependent recomputes at most once per push, so a subscriber never observes
//! a half-updated set of dependencies.

pub mod combinators;
pub mod graph;

mod error;

pub use error::SignalError;
pub use graph::{DepView, Signal, SignalGraph, SignalId};
