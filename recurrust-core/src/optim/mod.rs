//! Parameter solvers that consume the gradients accumulated by the tape.

pub mod rmsprop;

pub use rmsprop::{RmsProp, SolverStats};
