use crate::autograd::{BackwardStep, Graph};
use crate::error::RecurrustError;
use crate::matrix::Matrix;

/// Copies row `row` of `m` out as a `m.cols x 1` column vector.
///
/// This is the embedding lookup: row `ix` of an embedding matrix becomes the
/// input vector for a time-step. Fails with
/// [`RecurrustError::RowOutOfRange`] when `row >= m.rows`.
pub fn row_pluck(g: &mut Graph, m: &Matrix, row: usize) -> Result<Matrix, RecurrustError> {
    let (rows, cols) = m.shape();
    if row >= rows {
        return Err(RecurrustError::RowOutOfRange { row, rows });
    }

    let out = Matrix::zeros(cols, 1);
    {
        let m_data = m.borrow_data();
        let mut out_data = out.borrow_data_mut();
        for j in 0..cols {
            out_data.value[j] = m_data.value[cols * row + j];
        }
    }

    if g.needs_backprop() {
        g.push_step(BackwardStep::RowPluck {
            input: m.clone(),
            row,
            out: out.clone(),
        });
    }
    Ok(out)
}

/// dm[row, j] += dout[j]; every other row of `m` is untouched.
pub(crate) fn row_pluck_backward(input: &Matrix, row: usize, out: &Matrix) {
    let dout = out.grad();
    let mut in_data = input.borrow_data_mut();
    let cols = in_data.cols;
    for j in 0..cols {
        in_data.grad[cols * row + j] += dout[j];
    }
}
