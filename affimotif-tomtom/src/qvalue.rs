//! False discovery rate estimation.

/// Compute Benjamini-Hochberg *q-values* for a set of *p-values*.
///
/// The *q-values* are returned in the order of the given *p-values*.
/// They are made monotone by taking, for each *p-value*, the smallest
/// adjusted value of all *p-values* greater or equal to it.
///
/// # Example
/// ```
/// let qvalues = affimotif_tomtom::qvalue::benjamini_hochberg(&[0.25, 0.125, 1.0]);
/// assert_eq!(qvalues, vec![0.375, 0.375, 1.0]);
/// ```
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let n = pvalues.len();
    let mut order = (0..n).collect::<Vec<usize>>();
    order.sort_by(|&i, &j| pvalues[i].total_cmp(&pvalues[j]));

    let mut qvalues = vec![0.0; n];
    let mut min = 1.0f64;
    for (rank, &i) in order.iter().enumerate().rev() {
        let q = pvalues[i] * n as f64 / (rank + 1) as f64;
        min = min.min(q);
        qvalues[i] = min;
    }
    qvalues
}
