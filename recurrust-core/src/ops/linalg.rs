use crate::autograd::{BackwardStep, Graph};
use crate::error::RecurrustError;
use crate::matrix::Matrix;

/// Matrix product `a · b`.
///
/// `a` is `n x k`, `b` is `k x d`, the output is `n x d`. Fails with
/// [`RecurrustError::IncompatibleShapes`] before any computation when the
/// inner dimensions disagree.
pub fn matmul(g: &mut Graph, a: &Matrix, b: &Matrix) -> Result<Matrix, RecurrustError> {
    let (n, k) = a.shape();
    let (b_rows, d) = b.shape();
    if k != b_rows {
        return Err(RecurrustError::IncompatibleShapes {
            operation: "matmul".to_string(),
            shape1: (n, k),
            shape2: (b_rows, d),
        });
    }

    let out = Matrix::zeros(n, d);
    {
        let a_data = a.borrow_data();
        let b_data = b.borrow_data();
        let mut out_data = out.borrow_data_mut();
        for i in 0..n {
            for j in 0..d {
                let mut sum = 0.0;
                for l in 0..k {
                    sum += a_data.value[i * k + l] * b_data.value[l * d + j];
                }
                out_data.value[i * d + j] = sum;
            }
        }
    }

    if g.needs_backprop() {
        g.push_step(BackwardStep::Matmul {
            a: a.clone(),
            b: b.clone(),
            out: out.clone(),
        });
    }
    Ok(out)
}

/// da[i,l] += b[l,j]·dout[i,j]; db[l,j] += a[i,l]·dout[i,j], summed over the
/// dot-product index.
///
/// Operand values and the output gradient are snapshotted up front so the
/// two accumulation passes stay valid even when `a` and `b` are the same
/// matrix.
pub(crate) fn matmul_backward(a: &Matrix, b: &Matrix, out: &Matrix) {
    let (n, k) = a.shape();
    let d = b.cols();
    let a_value = a.value();
    let b_value = b.value();
    let dout = out.grad();

    {
        let mut a_data = a.borrow_data_mut();
        for i in 0..n {
            for j in 0..d {
                let g = dout[i * d + j];
                for l in 0..k {
                    a_data.grad[i * k + l] += b_value[l * d + j] * g;
                }
            }
        }
    }
    {
        let mut b_data = b.borrow_data_mut();
        for i in 0..n {
            for j in 0..d {
                let g = dout[i * d + j];
                for l in 0..k {
                    b_data.grad[l * d + j] += a_value[i * k + l] * g;
                }
            }
        }
    }
}
