//! The tape: an ordered record of backward steps built during a forward
//! pass and replayed in reverse to accumulate gradients (reverse-mode
//! automatic differentiation).

use log::trace;

use crate::matrix::Matrix;
use crate::ops;

pub mod grad_check;

/// One recorded unit of backward work.
///
/// Each variant binds the exact operand handles that were involved when the
/// primitive ran, so replaying the tape always touches the right buffers
/// even when the same primitive fires many times in one pass. Storing a
/// tagged variant instead of a closure keeps the tape free of ambient
/// captured state and lets a recorded tape be dumped for debugging.
#[derive(Debug, Clone)]
pub enum BackwardStep {
    Matmul { a: Matrix, b: Matrix, out: Matrix },
    Add { a: Matrix, b: Matrix, out: Matrix },
    Eltmul { a: Matrix, b: Matrix, out: Matrix },
    RowPluck { input: Matrix, row: usize, out: Matrix },
    Tanh { input: Matrix, out: Matrix },
    Sigmoid { input: Matrix, out: Matrix },
    Relu { input: Matrix, out: Matrix },
}

impl BackwardStep {
    /// Reads the output's accumulated gradient and accumulates into the
    /// input gradient buffers, per the primitive's rule.
    fn apply(&self) {
        match self {
            BackwardStep::Matmul { a, b, out } => ops::linalg::matmul_backward(a, b, out),
            BackwardStep::Add { a, b, out } => ops::arithmetic::add_backward(a, b, out),
            BackwardStep::Eltmul { a, b, out } => ops::arithmetic::eltmul_backward(a, b, out),
            BackwardStep::RowPluck { input, row, out } => {
                ops::indexing::row_pluck_backward(input, *row, out)
            }
            BackwardStep::Tanh { input, out } => ops::activation::tanh_backward(input, out),
            BackwardStep::Sigmoid { input, out } => ops::activation::sigmoid_backward(input, out),
            BackwardStep::Relu { input, out } => ops::activation::relu_backward(input, out),
        }
    }
}

/// The computation graph: backward steps accumulated in forward-execution
/// order during one forward pass.
///
/// A `Graph` serves exactly one forward+backward cycle. [`Graph::backward`]
/// does not clear the step list, so replaying a stale tape accumulates every
/// gradient a second time; construct a fresh `Graph` per cycle instead.
pub struct Graph {
    steps: Vec<BackwardStep>,
    needs_backprop: bool,
}

impl Graph {
    pub fn new(needs_backprop: bool) -> Graph {
        Graph {
            steps: Vec::new(),
            needs_backprop,
        }
    }

    /// Whether primitives should record backward steps. When false the
    /// primitives skip all gradient bookkeeping (inference-only mode).
    pub fn needs_backprop(&self) -> bool {
        self.needs_backprop
    }

    /// Appends a step unconditionally. The primitives gate on
    /// [`Graph::needs_backprop`] before calling this.
    pub fn push_step(&mut self, step: BackwardStep) {
        self.steps.push(step);
    }

    /// Replays every recorded step in reverse-of-append order.
    ///
    /// Later-registered steps produce the output gradients that
    /// earlier-registered (topologically upstream) steps consume, so the
    /// replay is strictly sequential and strictly reversed. The step list is
    /// left intact; see the type-level contract.
    pub fn backward(&self) {
        trace!("replaying {} backward steps", self.steps.len());
        for step in self.steps.iter().rev() {
            step.apply();
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The recorded steps, oldest first. Diagnostic surface only.
    pub fn steps(&self) -> &[BackwardStep] {
        &self.steps
    }
}

impl Default for Graph {
    fn default() -> Graph {
        Graph::new(true)
    }
}
