// Persistence for Matrix: shape and values only. Gradients are transient
// training state and are never written out; deserialization always hands
// back a freshly zeroed gradient buffer.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RecurrustError;
use crate::matrix::{Matrix, MatrixData};

/// The persisted form of a [`Matrix`]: shape plus the row-major value buffer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatrixRecord {
    pub rows: usize,
    pub cols: usize,
    pub value: Vec<f64>,
}

impl Matrix {
    /// Snapshots this matrix into its persisted form.
    pub fn to_record(&self) -> MatrixRecord {
        let data = self.borrow_data();
        MatrixRecord {
            rows: data.rows,
            cols: data.cols,
            value: data.value.clone(),
        }
    }

    /// Rebuilds a matrix from its persisted form.
    ///
    /// Validates that the value buffer matches the recorded shape and
    /// allocates a zeroed gradient buffer alongside it.
    pub fn from_record(record: MatrixRecord) -> Result<Matrix, RecurrustError> {
        let MatrixRecord { rows, cols, value } = record;
        if value.len() != rows * cols {
            return Err(RecurrustError::CreationError {
                data_len: value.len(),
                rows,
                cols,
            });
        }
        let numel = rows * cols;
        Ok(Matrix::from_data(MatrixData {
            rows,
            cols,
            value,
            grad: vec![0.0; numel],
        }))
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Matrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = MatrixRecord::deserialize(deserializer)?;
        Matrix::from_record(record).map_err(D::Error::custom)
    }
}
