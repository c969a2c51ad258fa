//! State-visit probabilities for the random excursions test
//! (SP 800-22 page 3-23).
//!
//! Closed forms in the excursion state x and the visit-count class k;
//! negative states mirror positive ones, so only |x| enters the formulas.

/// States run from -STATE_RANGE to STATE_RANGE, excluding 0.
pub const STATE_RANGE: i64 = 4;

/// Visit-count classes k = 0..=5; the last class is open-ended
/// ("5 or more visits").
pub const CLASS_COUNT: usize = 6;

/// pi_k(x): probability that state `state` is visited exactly `class`
/// times during one excursion (with the top class counting "`class` or
/// more").
///
/// `state` must be nonzero; the origin is not an excursion state.
pub fn visit_probability(state: i64, class: u32) -> f64 {
    debug_assert!(state != 0, "the origin is not an excursion state");
    let a = state.unsigned_abs() as f64;
    let hold = 1.0 - 1.0 / (2.0 * a);
    match class as usize {
        0 => hold,
        k if k == CLASS_COUNT - 1 => (1.0 / (2.0 * a)) * hold.powi(CLASS_COUNT as i32 - 2),
        k => (1.0 / (4.0 * a * a)) * hold.powi(k as i32 - 1),
    }
}

/// The state for a given table column. Columns run
/// x = -4, -3, -2, -1, 1, 2, 3, 4.
pub fn table_state(col: usize) -> i64 {
    let offset = col as i64 - STATE_RANGE;
    if offset < 0 {
        offset
    } else {
        offset + 1
    }
}

/// The full pi table: rows are classes k = 0..=5, columns are the states
/// from [`table_state`].
pub fn visit_table() -> [[f64; 2 * STATE_RANGE as usize]; CLASS_COUNT] {
    let mut table = [[0.0; 2 * STATE_RANGE as usize]; CLASS_COUNT];
    for (k, row) in table.iter_mut().enumerate() {
        for (col, slot) in row.iter_mut().enumerate() {
            *slot = visit_probability(table_state(col), k as u32);
        }
    }
    table
}
