use thiserror::Error;

/// Crate-wide error type for the recurrust engine.
///
/// Every failure here is a programming-contract violation surfaced to the
/// caller synchronously; the engine performs no I/O, so there is no
/// transient or retryable class.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum RecurrustError {
    #[error("incompatible shapes for {operation}: {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        operation: String,
        shape1: (usize, usize),
        shape2: (usize, usize),
    },

    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("row {row} out of range for matrix with {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("matrix creation error: data length {data_len} does not match {rows}x{cols}")]
    CreationError {
        data_len: usize,
        rows: usize,
        cols: usize,
    },

    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
