//! Rank probabilities for random binary matrices, used by the binary
//! matrix rank test (SP 800-22 section 3.5).
//!
//! Plain closed-form f64 evaluation; nothing here needs exact arithmetic
//! or parallelism. The published table only carries four decimal places,
//! so these derivations exist to provide the full-precision values.

/// P(rank = `rank`) for a random `rows` x `cols` matrix over GF(2).
///
/// p_r = 2^(r(Q+M-r) - MQ) * prod_{i=0}^{r-1}
///       (1 - 2^(i-Q)) (1 - 2^(i-M)) / (1 - 2^(i-r))
pub fn rank_probability(rows: u32, cols: u32, rank: u32) -> f64 {
    debug_assert!(rank <= rows.min(cols));
    let (m, q, r) = (rows as i32, cols as i32, rank as i32);
    let mut p = 2f64.powi(r * (q + m - r) - m * q);
    for i in 0..r {
        let numer = (1.0 - 2f64.powi(i - q)) * (1.0 - 2f64.powi(i - m));
        let denom = 1.0 - 2f64.powi(i - r);
        p *= numer / denom;
    }
    p
}

/// The rank distribution slice the test calibrates against: full rank
/// down to full rank minus two, in ascending rank order.
pub fn rank_distribution(rows: u32, cols: u32) -> Vec<(u32, f64)> {
    let full = rows.min(cols);
    (full.saturating_sub(2)..=full)
        .map(|rank| (rank, rank_probability(rows, cols, rank)))
        .collect()
}
