use crate::autograd::{BackwardStep, Graph};
use crate::matrix::Matrix;

/// Elementwise hyperbolic tangent.
pub fn tanh(g: &mut Graph, m: &Matrix) -> Matrix {
    let (rows, cols) = m.shape();
    let out = Matrix::zeros(rows, cols);
    {
        let m_data = m.borrow_data();
        let mut out_data = out.borrow_data_mut();
        for i in 0..m_data.value.len() {
            out_data.value[i] = m_data.value[i].tanh();
        }
    }

    if g.needs_backprop() {
        g.push_step(BackwardStep::Tanh {
            input: m.clone(),
            out: out.clone(),
        });
    }
    out
}

/// dm += (1 − out²)∘dout. The derivative is taken from the forward output,
/// not recomputed from the input.
pub(crate) fn tanh_backward(input: &Matrix, out: &Matrix) {
    let out_data = out.borrow_data();
    let mut in_data = input.borrow_data_mut();
    for i in 0..out_data.value.len() {
        let w = out_data.value[i];
        in_data.grad[i] += (1.0 - w * w) * out_data.grad[i];
    }
}

/// Elementwise logistic sigmoid, `σ(x) = 1 / (1 + e^{-x})`.
pub fn sigmoid(g: &mut Graph, m: &Matrix) -> Matrix {
    let (rows, cols) = m.shape();
    let out = Matrix::zeros(rows, cols);
    {
        let m_data = m.borrow_data();
        let mut out_data = out.borrow_data_mut();
        for i in 0..m_data.value.len() {
            out_data.value[i] = 1.0 / (1.0 + (-m_data.value[i]).exp());
        }
    }

    if g.needs_backprop() {
        g.push_step(BackwardStep::Sigmoid {
            input: m.clone(),
            out: out.clone(),
        });
    }
    out
}

/// dm += out∘(1 − out)∘dout.
pub(crate) fn sigmoid_backward(input: &Matrix, out: &Matrix) {
    let out_data = out.borrow_data();
    let mut in_data = input.borrow_data_mut();
    for i in 0..out_data.value.len() {
        let w = out_data.value[i];
        in_data.grad[i] += w * (1.0 - w) * out_data.grad[i];
    }
}

/// Elementwise rectifier, `max(0, x)`.
pub fn relu(g: &mut Graph, m: &Matrix) -> Matrix {
    let (rows, cols) = m.shape();
    let out = Matrix::zeros(rows, cols);
    {
        let m_data = m.borrow_data();
        let mut out_data = out.borrow_data_mut();
        for i in 0..m_data.value.len() {
            out_data.value[i] = m_data.value[i].max(0.0);
        }
    }

    if g.needs_backprop() {
        g.push_step(BackwardStep::Relu {
            input: m.clone(),
            out: out.clone(),
        });
    }
    out
}

/// dm += dout where the *input* was strictly positive; the subgradient at
/// the kink is zero.
pub(crate) fn relu_backward(input: &Matrix, out: &Matrix) {
    let dout = out.grad();
    let mut in_data = input.borrow_data_mut();
    for i in 0..dout.len() {
        if in_data.value[i] > 0.0 {
            in_data.grad[i] += dout[i];
        }
    }
}
