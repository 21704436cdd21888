use num_traits::Float;
use rand::Rng;

use crate::matrix::Matrix;

/// Numerically stabilized softmax over the whole (flattened) value buffer.
///
/// Pure: never touches the tape. When the probabilities feed a
/// cross-entropy loss, the caller writes the loss gradient directly into
/// the logits' gradient buffer (`probs` with 1 subtracted at the target
/// index) instead of registering a backward step here.
pub fn softmax(m: &Matrix) -> Matrix {
    let (rows, cols) = m.shape();
    let out = Matrix::zeros(rows, cols);
    {
        let m_data = m.borrow_data();
        let mut out_data = out.borrow_data_mut();

        let maxval = m_data
            .value
            .iter()
            .fold(f64::NEG_INFINITY, |acc, &w| acc.max(w));

        let mut sum = 0.0;
        for i in 0..m_data.value.len() {
            let e = (m_data.value[i] - maxval).exp();
            out_data.value[i] = e;
            sum += e;
        }
        for w in out_data.value.iter_mut() {
            *w /= sum;
        }
    }
    out
}

/// Index of the largest element; the first index wins ties.
///
/// Panics if `w` is empty.
pub fn argmax<T: Float>(w: &[T]) -> usize {
    let mut max_ix = 0;
    let mut max_v = w[0];
    for (i, &v) in w.iter().enumerate().skip(1) {
        if v > max_v {
            max_ix = i;
            max_v = v;
        }
    }
    max_ix
}

/// Draws an index weighted by `probs`, assuming the entries sum to 1.
///
/// If accumulated floating-point error exhausts the buffer without the
/// running sum crossing the drawn threshold, the last index is returned
/// deterministically rather than reading past the buffer.
///
/// Panics if `probs` is empty.
pub fn sample_index_with<R: Rng>(rng: &mut R, probs: &[f64]) -> usize {
    let r: f64 = rng.gen();
    let mut x = 0.0;
    for (i, p) in probs.iter().enumerate() {
        x += p;
        if x > r {
            return i;
        }
    }
    probs.len() - 1
}

/// [`sample_index_with`] using the thread-local RNG.
pub fn sample_index(probs: &[f64]) -> usize {
    let mut rng = rand::thread_rng();
    sample_index_with(&mut rng, probs)
}
