//! recurrust-core: a minimal reverse-mode automatic-differentiation engine
//! over dense 2D matrices, with the LSTM forward composition and RMSProp
//! solver used to train character-level sequence models.
//!
//! The pieces, leaves first: [`Matrix`] pairs a value buffer with a
//! gradient accumulator; the primitives in [`ops`] compute outputs eagerly
//! and record [`autograd::BackwardStep`]s on a [`Graph`] tape; replaying the
//! tape in reverse accumulates gradients; [`optim::RmsProp`] consumes them.
//! [`nn::Lstm`] wires the primitives into a per-time-step recurrent forward
//! pass, carrying hidden/cell state explicitly between ticks.

pub mod autograd;
pub mod error;
pub mod matrix;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod utils;

pub use autograd::Graph;
pub use error::RecurrustError;
pub use matrix::Matrix;

// Re-export for callers using the generic numeric helpers.
pub use num_traits;
