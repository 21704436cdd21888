//! Model composition: the LSTM parameter set and its per-time-step forward
//! pass over the tape.

pub mod lstm;

pub use lstm::{Lstm, LstmLayer, LstmOutput, LstmState};
