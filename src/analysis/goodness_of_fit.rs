/// Chi-square goodness-of-fit of group mean lags against a single constant.
///
/// Every group is expected to equal the same value (normally the dataset's
/// mean lag). The statistic is `Σ (observed − expected)² / expected` with
/// `groups − 1` degrees of freedom, and the p-value is the chi-square
/// survival function at the statistic.
///
/// The observations are mean lags, not counts, so they may be negative or
/// fractional. They are fed to the test unchanged; no check that observed and
/// expected totals agree is made.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use super::groupings::LagGroup;

// ---------------------------------------------------------------------------
// Result and error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoodnessOfFit {
    pub statistic: f64,
    /// `NaN` when there are no degrees of freedom.
    pub p_value: f64,
    pub degrees_of_freedom: usize,
}

#[derive(Debug, PartialEq)]
pub enum FitError {
    /// There were no groups to test.
    NoObservations,
    /// The chi-square distribution could not be built.
    Distribution(String),
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::NoObservations => write!(f, "No groups to test"),
            FitError::Distribution(msg) => write!(f, "Chi-square distribution error: {}", msg),
        }
    }
}

impl std::error::Error for FitError {}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// `len` copies of `expected`.
pub fn expected_sequence(len: usize, expected: f64) -> Vec<f64> {
    vec![expected; len]
}

/// Pearson's statistic over paired observed/expected values.
pub fn chi_square_statistic(observed: &[f64], expected: &[f64]) -> f64 {
    observed
        .iter()
        .zip(expected)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum()
}

/// Tests the groups' mean lags against `expected`.
pub fn chi_square(groups: &[LagGroup], expected: f64) -> Result<GoodnessOfFit, FitError> {
    if groups.is_empty() {
        return Err(FitError::NoObservations);
    }

    let observed: Vec<f64> = groups.iter().map(|g| g.mean_lag_days).collect();
    let expected = expected_sequence(groups.len(), expected);
    let statistic = chi_square_statistic(&observed, &expected);

    let degrees_of_freedom = groups.len() - 1;
    let p_value = if degrees_of_freedom == 0 {
        f64::NAN
    } else {
        let dist = ChiSquared::new(degrees_of_freedom as f64)
            .map_err(|e| FitError::Distribution(e.to_string()))?;
        // The survival function is 1 for any statistic at or below zero.
        if statistic <= 0.0 { 1.0 } else { dist.sf(statistic) }
    };

    Ok(GoodnessOfFit {
        statistic,
        p_value,
        degrees_of_freedom,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(means: &[f64]) -> Vec<LagGroup> {
        means
            .iter()
            .enumerate()
            .map(|(i, m)| LagGroup { label: format!("g{}", i), bookings: 10, mean_lag_days: *m })
            .collect()
    }

    #[test]
    fn test_expected_sequence_matches_group_count() {
        let seq = expected_sequence(7, 23.5);
        assert_eq!(seq.len(), 7);
        assert!(seq.iter().all(|e| *e == 23.5));
        assert!(expected_sequence(0, 1.0).is_empty());
    }

    #[test]
    fn test_statistic_by_hand() {
        // (8-10)²/10 + (10-10)²/10 + (13-10)²/10 = 0.4 + 0 + 0.9
        let fit = chi_square(&groups(&[8.0, 10.0, 13.0]), 10.0).unwrap();
        assert!((fit.statistic - 1.3).abs() < 1e-12);
        assert_eq!(fit.degrees_of_freedom, 2);
        // Two degrees of freedom: sf(x) = exp(-x / 2).
        assert!((fit.p_value - (-0.65f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_fit() {
        let fit = chi_square(&groups(&[5.0, 5.0, 5.0, 5.0]), 5.0).unwrap();
        assert_eq!(fit.statistic, 0.0);
        assert_eq!(fit.p_value, 1.0);
    }

    #[test]
    fn test_negative_expected_value() {
        let fit = chi_square(&groups(&[-1.0, 3.0]), -2.0).unwrap();
        assert!(fit.statistic < 0.0);
        assert_eq!(fit.p_value, 1.0);
    }

    #[test]
    fn test_single_group_has_no_p_value() {
        let fit = chi_square(&groups(&[12.0]), 10.0).unwrap();
        assert!((fit.statistic - 0.4).abs() < 1e-12);
        assert_eq!(fit.degrees_of_freedom, 0);
        assert!(fit.p_value.is_nan());
    }

    #[test]
    fn test_no_groups() {
        assert_eq!(chi_square(&[], 10.0), Err(FitError::NoObservations));
    }
}
