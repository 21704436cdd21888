//! Differentiable primitive operations, plus the non-differentiable
//! softmax/argmax/sampling helpers.
//!
//! Every primitive computes its output eagerly from the operand values and,
//! when the graph wants backprop, pushes one [`BackwardStep`] binding its
//! own operands. Gradient accumulation is always `+=`: a matrix can feed
//! several downstream consumers, and their contributions must sum.
//!
//! [`BackwardStep`]: crate::autograd::BackwardStep

pub mod activation;
pub mod arithmetic;
pub mod indexing;
pub mod linalg;
pub mod softmax;

pub use activation::{relu, sigmoid, tanh};
pub use arithmetic::{add, eltmul};
pub use indexing::row_pluck;
pub use linalg::matmul;
pub use softmax::{argmax, sample_index, sample_index_with, softmax};
