//! Coverage estimation
//!
//! Advisory progress metrics describing which share of the hash domain a
//! table is expected to cover. None of these affect build or search.

/// Estimated share of the hash domain covered by a table, each in `[0, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoverageEstimate {
    /// Expected share of distinct hashes (birthday-problem estimate)
    pub estimated: f64,
    /// Share assuming no two hash evaluations collide
    pub best_case: f64,
    /// Share assuming every row covers a single distinct hash
    pub worst_case: f64,
}

/// Estimate coverage of `row_count` chains of `row_length` hashes each
///
/// With `n = row_count * row_length` hash evaluations over a domain of
/// `d = domain_size` values, the expected number of distinct values is
/// `d * (1 - ((d - 1) / d)^n)`. The power is evaluated as
/// `exp(n * ln(1 - 1/d))` through `ln_1p`/`exp_m1`, which stays accurate
/// when `1/d` is far below `f64` epsilon.
pub fn estimate_coverage(row_count: usize, row_length: u32, domain_size: f64) -> CoverageEstimate {
    if row_count == 0 {
        return CoverageEstimate::default();
    }

    let rows = row_count as f64;
    let n = rows * row_length as f64;
    let d = domain_size;

    let estimated = -(n * (-1.0 / d).ln_1p()).exp_m1();

    CoverageEstimate {
        estimated: clamp_unit(estimated),
        best_case: clamp_unit(n / d),
        worst_case: clamp_unit(rows / d),
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let estimate = estimate_coverage(0, 64, 16_777_216.0);
        assert_eq!(estimate.estimated, 0.0);
        assert_eq!(estimate.best_case, 0.0);
        assert_eq!(estimate.worst_case, 0.0);
    }

    #[test]
    fn test_bounds() {
        for rows in [1usize, 10, 1_000, 1_000_000] {
            for domain in [256.0, 65_536.0, 4_294_967_296.0, 2f64.powi(128)] {
                let e = estimate_coverage(rows, 512, domain);
                for v in [e.estimated, e.best_case, e.worst_case] {
                    assert!((0.0..=1.0).contains(&v), "{:?}", e);
                }
                assert!(e.worst_case <= e.estimated + 1e-12);
                assert!(e.estimated <= e.best_case + 1e-12);
            }
        }
    }

    #[test]
    fn test_matches_birthday_formula() {
        // d = 65536, n = 100 * 200 = 20000
        let e = estimate_coverage(100, 200, 65_536.0);
        let d = 65536f64;
        let n = 20000f64;
        let collisions = n - d + d * ((d - 1.0) / d).powf(n);
        let expected = (n - collisions) / d;
        assert!((e.estimated - expected).abs() < 1e-9);
        assert!((e.best_case - n / d).abs() < 1e-12);
        assert!((e.worst_case - 100.0 / d).abs() < 1e-12);
    }

    #[test]
    fn test_saturates() {
        // 10,000 evaluations over 256 values covers the domain
        let e = estimate_coverage(1000, 10, 256.0);
        assert_eq!(e.best_case, 1.0);
        assert!(e.estimated > 0.999);
        assert_eq!(e.worst_case, 1.0);
    }

    #[test]
    fn test_large_domain_is_linear() {
        // For d = 2^128 collisions are negligible: estimated == best case
        let e = estimate_coverage(1_000_000, 1000, 2f64.powi(128));
        assert!(e.estimated > 0.0);
        assert!((e.estimated - e.best_case).abs() / e.best_case < 1e-6);
    }

    #[test]
    fn test_monotonic_in_rows() {
        let mut previous = CoverageEstimate::default();
        for rows in (0..2000).step_by(100) {
            let e = estimate_coverage(rows, 16, 65_536.0);
            assert!(e.estimated >= previous.estimated);
            assert!(e.best_case >= previous.best_case);
            assert!(e.worst_case >= previous.worst_case);
            previous = e;
        }
    }
}
