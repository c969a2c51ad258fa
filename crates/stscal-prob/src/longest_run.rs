use num::bigint::BigInt;
use num::rational::BigRational;
use num::traits::{One, Zero};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LongestRunError {
    #[error("K={k} requires {expected} class boundaries, got {actual}")]
    ClassCountMismatch {
        k: u64,
        expected: usize,
        actual: usize,
    },
    #[error("Class boundaries must be strictly increasing (violated at index {index})")]
    NonIncreasingBoundaries { index: usize },
    #[error("Class boundaries must be positive run lengths")]
    ZeroBoundary,
    #[error("Block length must be at least 1 bit")]
    ZeroBlockLength,
    #[error("Value {value} lies outside the unit interval")]
    OutsideUnitInterval { value: String },
    #[error("BigInt too large for f64 conversion ({digits} digits)")]
    PrecisionOverflow { digits: usize },
}

/// One (K, M, class-set) shape of the longest-run-of-ones test.
///
/// `boundaries` holds the maximum admissible run length per class,
/// strictly increasing. The last class of the derived table is open-ended
/// ("longest run >= last boundary"), which is why there are `k + 1`
/// boundaries for `k + 1` classes but the final cumulative value is never
/// used directly (see [`probability_masses`]).
#[derive(Debug, Clone)]
pub struct TestConfiguration {
    /// Class-count parameter K from SP 800-22 section 2.4.
    pub k: u64,
    /// Block length M in bits.
    pub block_len: u64,
    /// Maximum run length per class, strictly increasing.
    pub boundaries: Vec<u64>,
}

impl TestConfiguration {
    /// Construct a validated configuration.
    ///
    /// # Returns
    /// The configuration, or the first invariant violation found.
    pub fn new(k: u64, block_len: u64, boundaries: Vec<u64>) -> Result<Self, LongestRunError> {
        let config = Self {
            k,
            block_len,
            boundaries,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration invariants: positive block length, exactly
    /// `k + 1` boundaries, all positive and strictly increasing.
    ///
    /// The differencing pass silently produces garbage masses on a
    /// non-increasing class set, so this must run before any dispatch.
    pub fn validate(&self) -> Result<(), LongestRunError> {
        if self.block_len == 0 {
            return Err(LongestRunError::ZeroBlockLength);
        }
        let expected = usize::try_from(self.k)
            .map_err(|_| LongestRunError::ClassCountMismatch {
                k: self.k,
                expected: usize::MAX,
                actual: self.boundaries.len(),
            })?
            .saturating_add(1);
        if self.boundaries.len() != expected {
            return Err(LongestRunError::ClassCountMismatch {
                k: self.k,
                expected,
                actual: self.boundaries.len(),
            });
        }
        if self.boundaries.iter().any(|&m| m == 0) {
            return Err(LongestRunError::ZeroBoundary);
        }
        for (index, pair) in self.boundaries.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(LongestRunError::NonIncreasingBoundaries { index: index + 1 });
            }
        }
        Ok(())
    }
}

/// The three (K, M, class-set) shapes from SP 800-22 section 2.4.4.
///
/// The M=10000 shape is expected to take a very long time to derive.
pub fn standard_configurations() -> Vec<TestConfiguration> {
    vec![
        TestConfiguration {
            k: 3,
            block_len: 8,
            boundaries: vec![1, 2, 3, 4],
        },
        TestConfiguration {
            k: 5,
            block_len: 128,
            boundaries: vec![4, 5, 6, 7, 8, 9],
        },
        TestConfiguration {
            k: 6,
            block_len: 10_000,
            boundaries: vec![10, 11, 12, 13, 14, 15, 16],
        },
    ]
}

/// Exact binomial coefficient C(n, k) using BigInt.
///
/// Out-of-domain arguments (`k < 0`, `k > n`, `n < 0`) evaluate to zero
/// rather than erroring; the alternating sums downstream rely on this
/// convention.
pub fn binomial(n: i64, k: i64) -> BigInt {
    if n < 0 || k < 0 || k > n {
        return BigInt::zero();
    }
    let (n, k) = (n as u64, k as u64);
    // Use the smaller of k and n-k for efficiency
    let k = std::cmp::min(k, n - k);
    if k == 0 {
        return BigInt::one();
    }
    let mut result = BigInt::one();
    for i in 0..k {
        result *= BigInt::from(n - i);
        result /= BigInt::from(i + 1);
    }
    result
}

/// Number of `block_len`-bit blocks containing exactly `ones` one-bits whose
/// longest run of ones is at most `boundary`.
///
/// Evaluates the exact alternating sum from SP 800-22 section 3.4:
///
/// S(r) = sum_{j=0}^{U} (-1)^j * C(M-r+1, j) * C(M - j*(m+1), M-r)
///
/// with U = min(M-r+1, floor(r / (m+1))). This equals
/// C(M, r) * P(v <= m | r); the C(M, r) weight is deliberately left in
/// place because the marginal summation needs exactly that factor, and a
/// divide-then-multiply round trip would be pointless work.
///
/// All intermediates are signed exact integers. U can be zero, in which
/// case the sum collapses to the single j=0 term C(M, M-r) = C(M, r).
pub fn bounded_run_arrangements(block_len: u64, boundary: u64, ones: u64) -> BigInt {
    debug_assert!(ones <= block_len);
    let span = boundary + 1;
    let upper = std::cmp::min(block_len - ones + 1, ones / span);
    let remaining = (block_len - ones) as i64;
    let gaps = (block_len - ones + 1) as i64;

    let mut sum = BigInt::zero();
    for j in 0..=upper {
        let term = binomial(gaps, j as i64) * binomial(block_len as i64 - (j * span) as i64, remaining);
        if j % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }
    }
    sum
}

/// Exact cumulative probability P(v <= m) that the longest run of ones in a
/// random `block_len`-bit block stays within `boundary`.
///
/// Sums [`bounded_run_arrangements`] over every run count r = 0..=M and
/// divides by 2^M once at the end; the division is the only non-integer
/// step in the whole derivation.
pub fn cumulative_probability(block_len: u64, boundary: u64) -> BigRational {
    let mut admissible = BigInt::zero();
    for ones in 0..=block_len {
        if ones % 512 == 0 {
            tracing::trace!(ones, block_len, boundary, "summing run counts");
        }
        admissible += bounded_run_arrangements(block_len, boundary, ones);
    }
    BigRational::new(admissible, BigInt::one() << block_len as usize)
}

/// Convert ordered cumulative probabilities into disjoint per-class masses.
///
/// pi_0 = C_0, pi_i = C_i - sum(pi_j for j < i) for the middle classes.
/// The final class is open-ended (longest run >= last boundary), so its
/// mass is the complement 1 - sum(others), NOT C_K - sum: the complement
/// absorbs the tail above the last boundary and forces the masses to sum
/// to exactly 1 in the rational representation. A single-element input
/// therefore yields [1].
pub fn probability_masses(cumulative: &[BigRational]) -> Vec<BigRational> {
    if cumulative.is_empty() {
        return Vec::new();
    }
    let mut masses = Vec::with_capacity(cumulative.len());
    let mut allocated = BigRational::zero();
    for c in &cumulative[..cumulative.len() - 1] {
        let mass = c - &allocated;
        allocated += &mass;
        masses.push(mass);
    }
    masses.push(BigRational::one() - allocated);
    masses
}

// Quotient bits kept when converting a unit-interval rational to f64.
// 64 bits leave headroom above the 53-bit f64 mantissa.
const MANTISSA_SHIFT: usize = 64;

/// Convert a rational in [0, 1] to f64.
///
/// Denominators here are powers of two up to 2^10000, far beyond f64
/// range, so the numerator/denominator pair cannot be converted
/// separately. Instead the numerator is shifted up by [`MANTISSA_SHIFT`]
/// bits before the integer division, and the quotient is scaled back down.
pub fn unit_rational_to_f64(value: &BigRational) -> Result<f64, LongestRunError> {
    if value < &BigRational::zero() || value > &BigRational::one() {
        return Err(LongestRunError::OutsideUnitInterval {
            value: value.to_string(),
        });
    }
    if value.is_zero() {
        return Ok(0.0);
    }
    let scaled = (value.numer() << MANTISSA_SHIFT) / value.denom();
    Ok(bigint_to_f64(&scaled)? / 2f64.powi(MANTISSA_SHIFT as i32))
}

/// Convert a BigInt to f64, returning an error if the value is too large.
fn bigint_to_f64(n: &BigInt) -> Result<f64, LongestRunError> {
    use num::ToPrimitive;
    match n.to_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(LongestRunError::PrecisionOverflow {
            digits: n.to_string().len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rational(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn test_binomial_basic() {
        assert_eq!(binomial(0, 0), BigInt::one());
        assert_eq!(binomial(5, 0), BigInt::one());
        assert_eq!(binomial(5, 5), BigInt::one());
        assert_eq!(binomial(5, 2), BigInt::from(10));
        assert_eq!(binomial(10, 3), BigInt::from(120));
    }

    #[test]
    fn test_binomial_out_of_domain_is_zero() {
        assert_eq!(binomial(3, 5), BigInt::zero()); // k > n
        assert_eq!(binomial(5, -1), BigInt::zero()); // k < 0
        assert_eq!(binomial(-2, 1), BigInt::zero()); // n < 0
        assert_eq!(binomial(-2, -3), BigInt::zero());
    }

    #[test]
    fn test_binomial_large() {
        // C(100, 50) is a well-known large number
        let c100_50 = binomial(100, 50);
        let expected: BigInt = "100891344545564193334812497256".parse().unwrap();
        assert_eq!(c100_50, expected);
    }

    #[test]
    fn arrangements_without_adjacent_ones_match_closed_form() {
        // With boundary 1, admissible blocks have no two adjacent ones;
        // placing r isolated ones into M bits gives C(M - r + 1, r).
        for block_len in 1u64..=12 {
            for ones in 0..=block_len {
                let s = bounded_run_arrangements(block_len, 1, ones);
                let expected = binomial((block_len - ones + 1) as i64, ones as i64);
                assert_eq!(
                    s, expected,
                    "S({ones}) mismatch for M={block_len}, boundary=1"
                );
            }
        }
    }

    #[test]
    fn arrangements_collapse_to_single_term_below_span() {
        // For r < boundary + 1, U = 0 and every arrangement is admissible.
        let block_len = 16;
        let boundary = 3;
        for ones in 0..boundary + 1 {
            let s = bounded_run_arrangements(block_len, boundary, ones);
            assert_eq!(s, binomial(block_len as i64, ones as i64));
        }
    }

    #[test]
    fn arrangements_sum_to_all_blocks_for_loose_boundary() {
        // boundary >= M admits every block, so the counts over all run
        // counts must cover all 2^M blocks.
        for block_len in 1u64..=10 {
            let mut total = BigInt::zero();
            for ones in 0..=block_len {
                total += bounded_run_arrangements(block_len, block_len, ones);
            }
            assert_eq!(total, BigInt::one() << block_len as usize);
        }
    }

    #[test]
    fn cumulative_probability_known_m8_values() {
        // Fibonacci-family block counts for M=8: 55, 149, 208 and 236
        // admissible blocks for boundaries 1..=4, out of 2^8 = 256.
        assert_eq!(cumulative_probability(8, 1), rational(55, 256));
        assert_eq!(cumulative_probability(8, 2), rational(149, 256));
        assert_eq!(cumulative_probability(8, 3), rational(208, 256));
        assert_eq!(cumulative_probability(8, 4), rational(236, 256));
    }

    #[test]
    fn cumulative_probability_degenerate_block() {
        // A 1-bit block always has longest run <= 1.
        assert_eq!(cumulative_probability(1, 1), BigRational::one());
    }

    #[test]
    fn cumulative_probability_certain_for_loose_boundary() {
        assert_eq!(cumulative_probability(10, 10), BigRational::one());
        assert_eq!(cumulative_probability(10, 25), BigRational::one());
    }

    #[test]
    fn masses_difference_adjacent_cumulatives() {
        let cumulative = [
            rational(55, 256),
            rational(149, 256),
            rational(208, 256),
            rational(236, 256),
        ];
        let masses = probability_masses(&cumulative);
        assert_eq!(
            masses,
            vec![
                rational(55, 256),
                rational(94, 256),
                rational(59, 256),
                rational(48, 256),
            ]
        );
    }

    #[test]
    fn final_mass_is_complement_not_difference() {
        // The open-ended last class must absorb the tail above the last
        // boundary: 48/256 here, where plain differencing would give 28/256.
        let cumulative = [rational(208, 256), rational(236, 256)];
        let masses = probability_masses(&cumulative);
        assert_eq!(masses[1], rational(48, 256));
        assert_ne!(masses[1], &cumulative[1] - &cumulative[0]);
    }

    #[test]
    fn masses_sum_to_exactly_one() {
        let cumulative = [rational(1, 7), rational(3, 7), rational(6, 7)];
        let masses = probability_masses(&cumulative);
        let total: BigRational = masses.iter().sum();
        assert_eq!(total, BigRational::one());
    }

    #[test]
    fn single_class_gets_the_whole_mass() {
        let masses = probability_masses(&[rational(1, 2)]);
        assert_eq!(masses, vec![BigRational::one()]);
    }

    #[test]
    fn no_classes_no_masses() {
        assert!(probability_masses(&[]).is_empty());
    }

    #[test]
    fn test_configuration_validation() {
        assert!(TestConfiguration::new(3, 8, vec![1, 2, 3, 4]).is_ok());
        // class count mismatch
        assert!(TestConfiguration::new(3, 8, vec![1, 2, 3]).is_err());
        // non-increasing boundaries
        assert!(TestConfiguration::new(2, 8, vec![1, 3, 3]).is_err());
        assert!(TestConfiguration::new(2, 8, vec![3, 2, 4]).is_err());
        // zero boundary
        assert!(TestConfiguration::new(1, 8, vec![0, 1]).is_err());
        // zero block length
        assert!(TestConfiguration::new(0, 0, vec![1]).is_err());
    }

    #[test]
    fn standard_configurations_are_valid() {
        let configs = standard_configurations();
        assert_eq!(configs.len(), 3);
        for config in &configs {
            config.validate().unwrap();
        }
        assert_eq!(configs[0].block_len, 8);
        assert_eq!(configs[1].block_len, 128);
        assert_eq!(configs[2].block_len, 10_000);
    }

    #[test]
    fn unit_rational_to_f64_exact_dyadic() {
        assert_eq!(unit_rational_to_f64(&rational(1, 2)).unwrap(), 0.5);
        assert_eq!(
            unit_rational_to_f64(&rational(55, 256)).unwrap(),
            0.21484375
        );
        assert_eq!(unit_rational_to_f64(&BigRational::one()).unwrap(), 1.0);
        assert_eq!(unit_rational_to_f64(&BigRational::zero()).unwrap(), 0.0);
    }

    #[test]
    fn unit_rational_to_f64_non_dyadic() {
        let third = unit_rational_to_f64(&rational(1, 3)).unwrap();
        assert!((third - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn unit_rational_to_f64_huge_denominator() {
        // 1/2 scaled into a denominator of 2^1000; a naive
        // numerator/denominator split would produce inf/inf.
        let numer = BigInt::one() << 999usize;
        let denom = BigInt::one() << 1000usize;
        let value = BigRational::new(numer, denom);
        assert_eq!(unit_rational_to_f64(&value).unwrap(), 0.5);
    }

    #[test]
    fn unit_rational_to_f64_rejects_outside_unit_interval() {
        assert!(unit_rational_to_f64(&rational(3, 2)).is_err());
        assert!(unit_rational_to_f64(&rational(-1, 2)).is_err());
    }

    // ---------------------------------------------------------------
    // Proptest: property-based / randomized tests
    // ---------------------------------------------------------------

    use proptest::prelude::*;
    use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence, RngAlgorithm};

    fn prob_proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 64,
            source_file: Some(file!()),
            failure_persistence: Some(Box::new(FileFailurePersistence::WithSource(
                "proptest-regressions",
            ))),
            rng_algorithm: RngAlgorithm::ChaCha,
            ..ProptestConfig::default()
        }
    }

    proptest! {
        #![proptest_config(prob_proptest_config())]

        /// Binomial coefficient Pascal's rule: C(n, k) = C(n-1, k-1) + C(n-1, k).
        #[test]
        fn binomial_pascals_rule(n in 1i64..200, k in 1i64..200) {
            prop_assume!(k <= n);
            let lhs = binomial(n, k);
            let rhs = binomial(n - 1, k - 1) + binomial(n - 1, k);
            prop_assert!(
                lhs == rhs,
                "C({n},{k}) = {lhs} should equal C({},{}) + C({},{}) = {rhs}",
                n - 1, k - 1, n - 1, k
            );
        }

        /// Binomial coefficient symmetry: C(n, k) = C(n, n-k).
        #[test]
        fn binomial_symmetry(n in 0i64..200, k in 0i64..200) {
            prop_assume!(k <= n);
            prop_assert!(binomial(n, k) == binomial(n, n - k));
        }

        /// Every kernel output is a non-negative exact integer: S(r) counts
        /// admissible arrangements, so the alternating sum can never go
        /// negative overall.
        #[test]
        fn arrangements_are_non_negative(block_len in 1u64..=24, boundary in 1u64..=24) {
            for ones in 0..=block_len {
                let s = bounded_run_arrangements(block_len, boundary, ones);
                prop_assert!(
                    s >= BigInt::zero(),
                    "S({ones}) = {s} negative for M={block_len}, boundary={boundary}"
                );
            }
        }

        /// Cumulative probabilities are monotonically non-decreasing in the
        /// boundary and stay inside the unit interval; the differencing pass
        /// relies on both.
        #[test]
        fn cumulative_is_monotone_in_boundary(block_len in 1u64..=16) {
            let mut previous = BigRational::zero();
            for boundary in 1..=block_len + 1 {
                let p = cumulative_probability(block_len, boundary);
                prop_assert!(p >= previous, "P(v<={boundary}) dropped for M={block_len}");
                prop_assert!(p <= BigRational::one());
                previous = p;
            }
        }

        /// Masses from any strictly increasing cumulative prefix are in
        /// [0, 1] and sum to exactly 1.
        #[test]
        fn masses_normalise_exactly(block_len in 2u64..=12, class_count in 1usize..=4) {
            let cumulative: Vec<BigRational> = (1..=class_count as u64)
                .map(|boundary| cumulative_probability(block_len, boundary))
                .collect();
            let masses = probability_masses(&cumulative);
            prop_assert_eq!(masses.len(), class_count);
            for mass in &masses {
                prop_assert!(mass >= &BigRational::zero());
                prop_assert!(mass <= &BigRational::one());
            }
            let total: BigRational = masses.iter().sum();
            prop_assert_eq!(total, BigRational::one());
        }
    }
}
