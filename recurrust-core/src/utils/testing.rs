use crate::matrix::Matrix;

/// Checks that `actual` has the expected shape and per-element values within
/// `tolerance`. Panics with the offending index on mismatch.
pub fn check_matrix_near(
    actual: &Matrix,
    expected_rows: usize,
    expected_cols: usize,
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(
        actual.shape(),
        (expected_rows, expected_cols),
        "shape mismatch"
    );

    let actual_data = actual.value();
    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (*a - *e).abs();
        if diff > tolerance {
            panic!(
                "data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}
