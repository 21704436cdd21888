//! Finite-difference gradient checking for the primitives and anything
//! composed from them.

use thiserror::Error;

use crate::autograd::Graph;
use crate::error::RecurrustError;
use crate::matrix::Matrix;

/// Failures specific to a gradient check run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("gradient mismatch for input {input_index} at element {element_index}: analytic {analytic}, numeric {numeric}, difference {difference}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytic: f64,
        numeric: f64,
        difference: f64,
    },

    #[error("numeric gradient not finite for input {input_index} at element {element_index}")]
    NumericalGradNotFinite {
        input_index: usize,
        element_index: usize,
    },

    #[error("forward pass failed during gradient check: {0}")]
    ForwardPassError(#[from] RecurrustError),
}

/// Checks analytic gradients against central finite differences.
///
/// `func` must rebuild its output from `inputs` on every invocation; it is
/// called once on a recording graph for the analytic pass and then twice per
/// element on inference graphs for the perturbed passes. The scalar loss is
/// the unweighted sum of the output's elements, i.e. the output gradient is
/// all ones.
///
/// Element `e` of input `i` passes when
/// `|analytic − (loss(x+ε) − loss(x−ε)) / 2ε| <= tolerance`.
pub fn check_gradients<F>(
    func: F,
    inputs: &[Matrix],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&mut Graph, &[Matrix]) -> Result<Matrix, RecurrustError>,
{
    for input in inputs {
        input.zero_grad();
    }

    let mut graph = Graph::new(true);
    let out = func(&mut graph, inputs)?;
    out.set_grad(&vec![1.0; out.numel()])?;
    graph.backward();

    let analytic_grads: Vec<Vec<f64>> = inputs.iter().map(Matrix::grad).collect();

    for (i, input) in inputs.iter().enumerate() {
        for e in 0..input.numel() {
            let original = input.borrow_data().value[e];

            input.borrow_data_mut().value[e] = original + epsilon;
            let loss_plus = eval_loss(&func, inputs)?;

            input.borrow_data_mut().value[e] = original - epsilon;
            let loss_minus = eval_loss(&func, inputs)?;

            input.borrow_data_mut().value[e] = original;

            let numeric = (loss_plus - loss_minus) / (2.0 * epsilon);
            if !numeric.is_finite() {
                return Err(GradCheckError::NumericalGradNotFinite {
                    input_index: i,
                    element_index: e,
                });
            }

            let analytic = analytic_grads[i][e];
            let difference = (analytic - numeric).abs();
            if difference > tolerance {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: e,
                    analytic,
                    numeric,
                    difference,
                });
            }
        }
    }
    Ok(())
}

fn eval_loss<F>(func: &F, inputs: &[Matrix]) -> Result<f64, RecurrustError>
where
    F: Fn(&mut Graph, &[Matrix]) -> Result<Matrix, RecurrustError>,
{
    let mut graph = Graph::new(false);
    let out = func(&mut graph, inputs)?;
    Ok(out.value().iter().sum())
}
