use crate::autograd::{BackwardStep, Graph};
use crate::error::RecurrustError;
use crate::matrix::Matrix;

fn check_same_shape(
    operation: &str,
    a: &Matrix,
    b: &Matrix,
) -> Result<(usize, usize), RecurrustError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape != b_shape {
        return Err(RecurrustError::IncompatibleShapes {
            operation: operation.to_string(),
            shape1: a_shape,
            shape2: b_shape,
        });
    }
    Ok(a_shape)
}

/// Elementwise sum `a + b`. Both operands must share a shape.
pub fn add(g: &mut Graph, a: &Matrix, b: &Matrix) -> Result<Matrix, RecurrustError> {
    let (rows, cols) = check_same_shape("add", a, b)?;

    let out = Matrix::zeros(rows, cols);
    {
        let a_data = a.borrow_data();
        let b_data = b.borrow_data();
        let mut out_data = out.borrow_data_mut();
        for i in 0..out_data.value.len() {
            out_data.value[i] = a_data.value[i] + b_data.value[i];
        }
    }

    if g.needs_backprop() {
        g.push_step(BackwardStep::Add {
            a: a.clone(),
            b: b.clone(),
            out: out.clone(),
        });
    }
    Ok(out)
}

/// da += dout; db += dout.
pub(crate) fn add_backward(a: &Matrix, b: &Matrix, out: &Matrix) {
    let dout = out.grad();
    {
        let mut a_data = a.borrow_data_mut();
        for i in 0..dout.len() {
            a_data.grad[i] += dout[i];
        }
    }
    {
        let mut b_data = b.borrow_data_mut();
        for i in 0..dout.len() {
            b_data.grad[i] += dout[i];
        }
    }
}

/// Elementwise (Hadamard) product `a ∘ b`. Both operands must share a shape.
pub fn eltmul(g: &mut Graph, a: &Matrix, b: &Matrix) -> Result<Matrix, RecurrustError> {
    let (rows, cols) = check_same_shape("eltmul", a, b)?;

    let out = Matrix::zeros(rows, cols);
    {
        let a_data = a.borrow_data();
        let b_data = b.borrow_data();
        let mut out_data = out.borrow_data_mut();
        for i in 0..out_data.value.len() {
            out_data.value[i] = a_data.value[i] * b_data.value[i];
        }
    }

    if g.needs_backprop() {
        g.push_step(BackwardStep::Eltmul {
            a: a.clone(),
            b: b.clone(),
            out: out.clone(),
        });
    }
    Ok(out)
}

/// da += b∘dout; db += a∘dout. Operand values are snapshotted first so the
/// rule stays correct when `a` and `b` are the same matrix.
pub(crate) fn eltmul_backward(a: &Matrix, b: &Matrix, out: &Matrix) {
    let a_value = a.value();
    let b_value = b.value();
    let dout = out.grad();
    {
        let mut a_data = a.borrow_data_mut();
        for i in 0..dout.len() {
            a_data.grad[i] += b_value[i] * dout[i];
        }
    }
    {
        let mut b_data = b.borrow_data_mut();
        for i in 0..dout.len() {
            b_data.grad[i] += a_value[i] * dout[i];
        }
    }
}
