use crate::autograd::Graph;
use crate::error::RecurrustError;
use crate::matrix::Matrix;
use crate::ops::{add, eltmul, matmul, sigmoid, tanh};

/// Symmetric bound for uniform weight initialization.
const WEIGHT_INIT_BOUND: f64 = 0.08;

/// Gate and cell-write parameters for one LSTM layer.
///
/// Weight matrices are `hidden x input` (`*x`) or `hidden x hidden` (`*h`);
/// biases are `hidden x 1` column vectors.
pub struct LstmLayer {
    pub wix: Matrix,
    pub wih: Matrix,
    pub bi: Matrix,
    pub wfx: Matrix,
    pub wfh: Matrix,
    pub bf: Matrix,
    pub wox: Matrix,
    pub woh: Matrix,
    pub bo: Matrix,
    pub wcx: Matrix,
    pub wch: Matrix,
    pub bc: Matrix,
}

impl LstmLayer {
    fn new(input_size: usize, hidden_size: usize) -> LstmLayer {
        let w = |rows, cols| Matrix::uniform(rows, cols, WEIGHT_INIT_BOUND);
        LstmLayer {
            wix: w(hidden_size, input_size),
            wih: w(hidden_size, hidden_size),
            bi: Matrix::zeros(hidden_size, 1),
            wfx: w(hidden_size, input_size),
            wfh: w(hidden_size, hidden_size),
            bf: Matrix::zeros(hidden_size, 1),
            wox: w(hidden_size, input_size),
            woh: w(hidden_size, hidden_size),
            bo: Matrix::zeros(hidden_size, 1),
            wcx: w(hidden_size, input_size),
            wch: w(hidden_size, hidden_size),
            bc: Matrix::zeros(hidden_size, 1),
        }
    }
}

/// Recurrent state carried between time-steps by the caller: one hidden and
/// one cell column vector per layer. Nothing recurrent lives inside the
/// model or the graph.
pub struct LstmState {
    pub hidden: Vec<Matrix>,
    pub cell: Vec<Matrix>,
}

/// Result of one forward tick: the state to feed into the next tick, plus
/// the unnormalized output logits.
pub struct LstmOutput {
    pub state: LstmState,
    pub output: Matrix,
}

/// A stacked LSTM with a linear decoder on the last layer's hidden state.
///
/// Parameters live in explicit struct fields; the role+depth names
/// (`"Wix0"`, `"bd"`, ...) exist only as debug labels on
/// [`Lstm::named_parameters`], never as a lookup mechanism.
pub struct Lstm {
    layers: Vec<LstmLayer>,
    whd: Matrix,
    bd: Matrix,
    hidden_sizes: Vec<usize>,
}

impl Lstm {
    /// Builds a parameter set for `hidden_sizes.len()` stacked layers.
    ///
    /// Weights are drawn uniformly from `[-0.08, 0.08)`; biases start at
    /// zero. `hidden_sizes` must be non-empty.
    pub fn new(
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
    ) -> Result<Lstm, RecurrustError> {
        if hidden_sizes.is_empty() {
            return Err(RecurrustError::ConfigurationError(
                "an LSTM needs at least one hidden layer".to_string(),
            ));
        }
        let mut layers = Vec::with_capacity(hidden_sizes.len());
        let mut prev_size = input_size;
        for &hidden_size in hidden_sizes {
            layers.push(LstmLayer::new(prev_size, hidden_size));
            prev_size = hidden_size;
        }
        let last_hidden = *hidden_sizes.last().unwrap();
        Ok(Lstm {
            layers,
            whd: Matrix::uniform(output_size, last_hidden, WEIGHT_INIT_BOUND),
            bd: Matrix::zeros(output_size, 1),
            hidden_sizes: hidden_sizes.to_vec(),
        })
    }

    pub fn hidden_sizes(&self) -> &[usize] {
        &self.hidden_sizes
    }

    pub fn layers(&self) -> &[LstmLayer] {
        &self.layers
    }

    /// All trainable matrices in a stable order: the twelve gate matrices of
    /// each layer in depth order, then the decoder weight and bias. The
    /// solver keys its per-parameter state by position in this order.
    pub fn parameters(&self) -> Vec<Matrix> {
        let mut params = Vec::with_capacity(self.layers.len() * 12 + 2);
        for layer in &self.layers {
            params.extend(
                [
                    &layer.wix, &layer.wih, &layer.bi, &layer.wfx, &layer.wfh, &layer.bf,
                    &layer.wox, &layer.woh, &layer.bo, &layer.wcx, &layer.wch, &layer.bc,
                ]
                .map(Matrix::clone),
            );
        }
        params.push(self.whd.clone());
        params.push(self.bd.clone());
        params
    }

    /// [`Lstm::parameters`] with role+depth debug labels (`"Wix0"`,
    /// `"bf1"`, ..., `"Whd"`, `"bd"`).
    pub fn named_parameters(&self) -> Vec<(String, Matrix)> {
        let mut params = Vec::with_capacity(self.layers.len() * 12 + 2);
        for (d, layer) in self.layers.iter().enumerate() {
            for (role, m) in [
                ("Wix", &layer.wix),
                ("Wih", &layer.wih),
                ("bi", &layer.bi),
                ("Wfx", &layer.wfx),
                ("Wfh", &layer.wfh),
                ("bf", &layer.bf),
                ("Wox", &layer.wox),
                ("Woh", &layer.woh),
                ("bo", &layer.bo),
                ("Wcx", &layer.wcx),
                ("Wch", &layer.wch),
                ("bc", &layer.bc),
            ] {
                params.push((format!("{role}{d}"), m.clone()));
            }
        }
        params.push(("Whd".to_string(), self.whd.clone()));
        params.push(("bd".to_string(), self.bd.clone()));
        params
    }

    /// Zero hidden/cell vectors for the first time-step.
    fn zero_state(&self) -> LstmState {
        LstmState {
            hidden: self
                .hidden_sizes
                .iter()
                .map(|&s| Matrix::zeros(s, 1))
                .collect(),
            cell: self
                .hidden_sizes
                .iter()
                .map(|&s| Matrix::zeros(s, 1))
                .collect(),
        }
    }

    /// Runs one time-step.
    ///
    /// `x` is the external input column vector; `prev` is the state returned
    /// by the previous tick, or `None` on the first tick (zero state). Per
    /// layer `d`, with `x_d` the external input at depth 0 and the previous
    /// layer's hidden output above:
    ///
    /// ```text
    /// input_gate  = sigmoid(wix·x_d + wih·h_prev + bi)
    /// forget_gate = sigmoid(wfx·x_d + wfh·h_prev + bf)
    /// output_gate = sigmoid(wox·x_d + woh·h_prev + bo)
    /// cell_write  = tanh(wcx·x_d + wch·h_prev + bc)
    /// cell        = forget_gate ∘ cell_prev + input_gate ∘ cell_write
    /// hidden      = output_gate ∘ tanh(cell)
    /// ```
    ///
    /// After the last layer, `output = whd·hidden_last + bd`: raw logits,
    /// left unnormalized for the caller's loss layer.
    pub fn forward(
        &self,
        g: &mut Graph,
        x: &Matrix,
        prev: Option<&LstmState>,
    ) -> Result<LstmOutput, RecurrustError> {
        let zero;
        let prev = match prev {
            Some(state) => state,
            None => {
                zero = self.zero_state();
                &zero
            }
        };

        let mut hidden: Vec<Matrix> = Vec::with_capacity(self.layers.len());
        let mut cell: Vec<Matrix> = Vec::with_capacity(self.layers.len());

        for (d, layer) in self.layers.iter().enumerate() {
            let input_vector = if d == 0 { x.clone() } else { hidden[d - 1].clone() };
            let hidden_prev = &prev.hidden[d];
            let cell_prev = &prev.cell[d];

            // input gate
            let h0 = matmul(g, &layer.wix, &input_vector)?;
            let h1 = matmul(g, &layer.wih, hidden_prev)?;
            let input_gate = {
                let h01 = add(g, &h0, &h1)?;
                let s = add(g, &h01, &layer.bi)?;
                sigmoid(g, &s)
            };

            // forget gate
            let h2 = matmul(g, &layer.wfx, &input_vector)?;
            let h3 = matmul(g, &layer.wfh, hidden_prev)?;
            let forget_gate = {
                let h23 = add(g, &h2, &h3)?;
                let s = add(g, &h23, &layer.bf)?;
                sigmoid(g, &s)
            };

            // output gate
            let h4 = matmul(g, &layer.wox, &input_vector)?;
            let h5 = matmul(g, &layer.woh, hidden_prev)?;
            let output_gate = {
                let h45 = add(g, &h4, &h5)?;
                let s = add(g, &h45, &layer.bo)?;
                sigmoid(g, &s)
            };

            // cell write
            let h6 = matmul(g, &layer.wcx, &input_vector)?;
            let h7 = matmul(g, &layer.wch, hidden_prev)?;
            let cell_write = {
                let h67 = add(g, &h6, &h7)?;
                let s = add(g, &h67, &layer.bc)?;
                tanh(g, &s)
            };

            // new cell contents: what we keep plus what we write
            let retain = eltmul(g, &forget_gate, cell_prev)?;
            let write = eltmul(g, &input_gate, &cell_write)?;
            let cell_d = add(g, &retain, &write)?;

            // hidden state: gated, saturated cell activations
            let cell_d_tanh = tanh(g, &cell_d);
            let hidden_d = eltmul(g, &output_gate, &cell_d_tanh)?;

            hidden.push(hidden_d);
            cell.push(cell_d);
        }

        let last_hidden = hidden
            .last()
            .expect("Lstm::new guarantees at least one layer");
        let decoded = matmul(g, &self.whd, last_hidden)?;
        let output = add(g, &decoded, &self.bd)?;

        Ok(LstmOutput {
            state: LstmState { hidden, cell },
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::utils::testing::check_matrix_near;

    fn constant_lstm(input_size: usize, hidden_sizes: &[usize], output_size: usize, w: f64) -> Lstm {
        let model = Lstm::new(input_size, hidden_sizes, output_size).unwrap();
        for (name, m) in model.named_parameters() {
            if name.starts_with('W') {
                m.fill(w);
            }
        }
        model
    }

    #[test]
    fn test_new_validates_and_shapes_parameters() {
        assert!(Lstm::new(2, &[], 4).is_err());

        let model = Lstm::new(2, &[3, 5], 4).unwrap();
        assert_eq!(model.hidden_sizes(), &[3, 5]);
        let layers = model.layers();
        assert_eq!(layers[0].wix.shape(), (3, 2));
        assert_eq!(layers[0].wih.shape(), (3, 3));
        assert_eq!(layers[0].bi.shape(), (3, 1));
        // layer 1 reads layer 0's hidden output
        assert_eq!(layers[1].wfx.shape(), (5, 3));
        assert_eq!(layers[1].wfh.shape(), (5, 5));
        assert_eq!(model.parameters().len(), 2 * 12 + 2);
    }

    #[test]
    fn test_named_parameters_follow_role_depth_convention() {
        let model = Lstm::new(2, &[3, 5], 4).unwrap();
        let names: Vec<String> = model.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names[0], "Wix0");
        assert_eq!(names[11], "bc0");
        assert_eq!(names[12], "Wix1");
        assert_eq!(names[names.len() - 2], "Whd");
        assert_eq!(names[names.len() - 1], "bd");
    }

    // With every weight at 0.1, biases zero, input [1, 0] and zero previous
    // state, each hidden unit of the single layer sees the same closed-form
    // pre-activations, so the whole tick is checkable by hand.
    #[test]
    fn test_forward_matches_closed_form() -> Result<(), RecurrustError> {
        let model = constant_lstm(2, &[3], 2, 0.1);
        let mut g = Graph::new(false);
        let x = Matrix::from_vec(vec![1.0, 0.0], 2, 1)?;
        let tick = model.forward(&mut g, &x, None)?;

        // pre-activation of every gate: 0.1·1 + 0.1·0 + 0 = 0.1
        let gate = 1.0 / (1.0 + (-0.1f64).exp());
        let cell = gate * 0.1f64.tanh();
        let hidden = gate * cell.tanh();
        let logit = 3.0 * 0.1 * hidden;

        check_matrix_near(&tick.state.cell[0], 3, 1, &[cell; 3], 1e-12);
        check_matrix_near(&tick.state.hidden[0], 3, 1, &[hidden; 3], 1e-12);
        check_matrix_near(&tick.output, 2, 1, &[logit; 2], 1e-12);
        Ok(())
    }

    // The forward math itself is deterministic: same parameters, same
    // input, same numbers.
    #[test]
    fn test_forward_is_reproducible() -> Result<(), RecurrustError> {
        let model = constant_lstm(2, &[3], 2, 0.1);
        let x = Matrix::from_vec(vec![1.0, 0.0], 2, 1)?;

        let mut g1 = Graph::new(true);
        let first = model.forward(&mut g1, &x, None)?;
        let mut g2 = Graph::new(true);
        let second = model.forward(&mut g2, &x, None)?;
        assert_eq!(first.output.value(), second.output.value());
        assert_eq!(g1.len(), g2.len());
        Ok(())
    }

    #[test]
    fn test_state_threads_across_ticks() -> Result<(), RecurrustError> {
        let model = constant_lstm(2, &[3], 2, 0.1);
        let mut g = Graph::new(true);
        let x = Matrix::from_vec(vec![1.0, 0.0], 2, 1)?;

        let first = model.forward(&mut g, &x, None)?;
        let second = model.forward(&mut g, &x, Some(&first.state))?;

        // with a non-zero carried state the second tick must differ
        assert_ne!(first.output.value(), second.output.value());
        // the recurrent contribution raises every gate pre-activation here
        let h1 = first.state.hidden[0].value();
        let h2 = second.state.hidden[0].value();
        assert!(h2[0] > h1[0]);
        Ok(())
    }

    #[test]
    fn test_stacked_layers_chain_hidden_outputs() -> Result<(), RecurrustError> {
        let model = constant_lstm(2, &[3, 4], 5, 0.1);
        let mut g = Graph::new(true);
        let x = Matrix::from_vec(vec![1.0, 0.0], 2, 1)?;
        let tick = model.forward(&mut g, &x, None)?;
        assert_eq!(tick.state.hidden.len(), 2);
        assert_eq!(tick.state.hidden[0].shape(), (3, 1));
        assert_eq!(tick.state.hidden[1].shape(), (4, 1));
        assert_eq!(tick.state.cell[1].shape(), (4, 1));
        assert_eq!(tick.output.shape(), (5, 1));
        Ok(())
    }

    // Gradients reach every parameter through the whole composition. Two
    // ticks are needed: the recurrent weights only see a non-zero carried
    // state from the second tick on.
    #[test]
    fn test_backward_reaches_all_parameters() -> Result<(), RecurrustError> {
        let model = constant_lstm(2, &[3], 2, 0.1);
        let mut g = Graph::new(true);
        let x = Matrix::from_vec(vec![1.0, 0.5], 2, 1)?;
        let first = model.forward(&mut g, &x, None)?;
        let second = model.forward(&mut g, &x, Some(&first.state))?;
        second.output.set_grad(&[1.0, 0.5])?;
        g.backward();

        for (name, m) in model.named_parameters() {
            let nonzero = m.grad().iter().any(|&v| v != 0.0);
            assert!(nonzero, "no gradient reached {name}");
        }
        Ok(())
    }

    #[test]
    fn test_forward_rejects_wrong_input_size() {
        let model = constant_lstm(2, &[3], 2, 0.1);
        let mut g = Graph::new(true);
        let x = Matrix::zeros(5, 1);
        assert!(matches!(
            model.forward(&mut g, &x, None),
            Err(RecurrustError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_gate_saturation_bounds_hidden() -> Result<(), RecurrustError> {
        // large weights drive sigmoid/tanh toward their asymptotes; hidden
        // values must stay inside (-1, 1)
        let model = constant_lstm(2, &[4], 2, 10.0);
        let mut g = Graph::new(false);
        let x = Matrix::from_vec(vec![1.0, 1.0], 2, 1)?;
        let tick = model.forward(&mut g, &x, None)?;
        for h in tick.state.hidden[0].value() {
            assert!(h.abs() < 1.0);
        }
        assert_abs_diff_eq!(tick.state.hidden[0].value()[0], 1.0f64.tanh(), epsilon = 1e-3);
        Ok(())
    }
}
