//! Tests for the chi-squared distribution.
//!
//! Chi-squared is the gamma reparameterisation `shape = df/2, scale = 2`;
//! these tests verify the delegation is exact and pin a few reference
//! quantiles the standardised-ratio limits depend on.
//!
//! ## Test Organization
//!
//! 1. **Gamma Equivalence** - Bit-exact delegation
//! 2. **Reference Values** - Known quantiles and CDF values
//! 3. **Closed Forms** - df = 2 is the exponential with scale 2

use approx::assert_relative_eq;

use funnel::distributions::{chi_squared, gamma};

// ============================================================================
// Gamma Equivalence Tests
// ============================================================================

/// The chi-squared functions equal their gamma counterparts exactly: same
/// formula, same bits.
#[test]
fn test_gamma_equivalence_exact() {
    for &df in &[0.5, 1.0, 2.0, 7.0, 40.0, 123.0] {
        for &p in &[0.001, 0.025, 0.5, 0.975, 0.999] {
            let q_chi = chi_squared::quantile(p, df, true, false);
            let q_gamma = gamma::quantile(p, df / 2.0, 2.0, true, false);
            assert!(
                q_chi == q_gamma,
                "quantile mismatch at p={p}, df={df}: {q_chi} vs {q_gamma}"
            );
        }
        for &x in &[0.1, 1.0, 5.0, 30.0] {
            let c_chi = chi_squared::cdf(x, df, true, false);
            let c_gamma = gamma::cdf(x, df / 2.0, 2.0, true, false);
            assert!(c_chi == c_gamma, "cdf mismatch at x={x}, df={df}");

            let d_chi = chi_squared::density(x, df, false);
            let d_gamma = gamma::density(x, df / 2.0, 2.0, false);
            assert!(d_chi == d_gamma, "density mismatch at x={x}, df={df}");
        }
    }
}

// ============================================================================
// Reference Value Tests
// ============================================================================

/// The 95% quantile on one degree of freedom is the square of the normal
/// 97.5% quantile.
#[test]
fn test_reference_quantiles() {
    assert_relative_eq!(
        chi_squared::quantile(0.95, 1.0, true, false),
        1.959963984540054 * 1.959963984540054,
        max_relative = 1e-8
    );
    // df = 2: -2 log(1 - p)
    assert_relative_eq!(
        chi_squared::quantile(0.975, 2.0, true, false),
        -2.0 * 0.025f64.ln(),
        max_relative = 1e-9
    );
}

/// CDF at the reference quantile returns the reference probability.
#[test]
fn test_reference_cdf() {
    assert_relative_eq!(
        chi_squared::cdf(3.841458820694124, 1.0, true, false),
        0.95,
        max_relative = 1e-10
    );
}

// ============================================================================
// Closed Form Tests
// ============================================================================

/// On two degrees of freedom the distribution is exponential with mean 2.
#[test]
fn test_df2_exponential() {
    for &x in &[0.5, 1.0, 4.0, 10.0] {
        assert_relative_eq!(
            chi_squared::cdf(x, 2.0, true, false),
            1.0 - (-x / 2.0).exp(),
            max_relative = 1e-12
        );
    }
    assert_relative_eq!(
        chi_squared::density(2.0, 4.0, false),
        (-1.0f64).exp() / 2.0,
        max_relative = 1e-12
    );
}

/// Boundary contract mirrors the gamma one.
#[test]
fn test_boundaries() {
    assert_eq!(chi_squared::quantile(0.0, 5.0, true, false), 0.0);
    assert_eq!(chi_squared::quantile(1.0, 5.0, true, false), f64::INFINITY);
    assert!(chi_squared::quantile(0.5, -1.0, true, false).is_nan());
    assert_eq!(chi_squared::cdf(0.0, 5.0, true, false), 0.0);
}
