use log::debug;

use crate::error::RecurrustError;
use crate::matrix::Matrix;

/// Diagnostics from one solver step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverStats {
    /// Elements whose gradient exceeded the clip bound before clamping.
    pub num_clipped: usize,
    /// Total elements updated.
    pub num_total: usize,
}

impl SolverStats {
    /// Fraction of elements clipped this step.
    pub fn ratio_clipped(&self) -> f64 {
        if self.num_total == 0 {
            0.0
        } else {
            self.num_clipped as f64 / self.num_total as f64
        }
    }
}

/// RMSProp with per-element gradient clipping and L2 regularization.
///
/// Keeps one accumulator matrix per parameter: an exponential moving
/// average of squared gradients that scales each element's effective
/// learning rate. Accumulators are created lazily the first time a
/// parameter position is seen and live as long as the solver; constructing
/// a fresh solver starts a fresh run.
pub struct RmsProp {
    decay_rate: f64,
    smooth_eps: f64,
    step_cache: Vec<Matrix>,
}

impl Default for RmsProp {
    fn default() -> RmsProp {
        RmsProp {
            decay_rate: 0.999,
            smooth_eps: 1e-8,
            step_cache: Vec::new(),
        }
    }
}

impl RmsProp {
    /// A solver with explicit decay and smoothing hyperparameters.
    pub fn new(decay_rate: f64, smooth_eps: f64) -> Result<RmsProp, RecurrustError> {
        if !(0.0..=1.0).contains(&decay_rate) {
            return Err(RecurrustError::ConfigurationError(
                "decay_rate must be in [0.0, 1.0]".to_string(),
            ));
        }
        if smooth_eps <= 0.0 {
            return Err(RecurrustError::ConfigurationError(
                "smooth_eps must be positive".to_string(),
            ));
        }
        Ok(RmsProp {
            decay_rate,
            smooth_eps,
            step_cache: Vec::new(),
        })
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    pub fn smooth_eps(&self) -> f64 {
        self.smooth_eps
    }

    /// Applies one update to every parameter and resets their gradients.
    ///
    /// Per element: the accumulator absorbs the *raw* squared gradient, the
    /// gradient is clamped to `[-clip_val, clip_val]`, and the value moves by
    /// `-step_size·clipped/√(acc + eps) - regc·value`. Gradients are zeroed
    /// as a side effect; callers must not reuse them after a step.
    ///
    /// Parameter identity is positional: pass the same stable parameter
    /// order (e.g. `Lstm::parameters()`) on every step.
    pub fn step(
        &mut self,
        params: &[Matrix],
        step_size: f64,
        regc: f64,
        clip_val: f64,
    ) -> Result<SolverStats, RecurrustError> {
        if clip_val < 0.0 {
            return Err(RecurrustError::ConfigurationError(
                "clip_val must be non-negative".to_string(),
            ));
        }

        let mut num_clipped = 0usize;
        let mut num_total = 0usize;

        for (i, param) in params.iter().enumerate() {
            if i >= self.step_cache.len() {
                let (rows, cols) = param.shape();
                self.step_cache.push(Matrix::zeros(rows, cols));
            }
            let cache = &self.step_cache[i];
            if cache.shape() != param.shape() {
                return Err(RecurrustError::IncompatibleShapes {
                    operation: "rmsprop step cache".to_string(),
                    shape1: cache.shape(),
                    shape2: param.shape(),
                });
            }

            let mut p = param.borrow_data_mut();
            let mut c = cache.borrow_data_mut();
            for j in 0..p.value.len() {
                let mut g = p.grad[j];

                // adaptive learning rate accumulator, fed the raw gradient
                c.value[j] =
                    c.value[j] * self.decay_rate + (1.0 - self.decay_rate) * g * g;

                if g > clip_val {
                    g = clip_val;
                    num_clipped += 1;
                } else if g < -clip_val {
                    g = -clip_val;
                    num_clipped += 1;
                }
                num_total += 1;

                // update and regularize
                p.value[j] +=
                    -step_size * g / (c.value[j] + self.smooth_eps).sqrt() - regc * p.value[j];
                p.grad[j] = 0.0;
            }
        }

        let stats = SolverStats {
            num_clipped,
            num_total,
        };
        debug!(
            "rmsprop step: {} params, {} elements, {:.4} clipped",
            params.len(),
            num_total,
            stats.ratio_clipped()
        );
        Ok(stats)
    }
}
