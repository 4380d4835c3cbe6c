//! Log-gamma and related corrections.
//!
//! ## Purpose
//!
//! Every gamma-family kernel needs `log Gamma` over the full positive range
//! and, for small arguments, `log Gamma(1 + a)` without the cancellation
//! that the direct call suffers near zero.
//!
//! ## Design notes
//!
//! * **Two regimes**: a Lanczos approximation (g = 7, 9 terms) below 10,
//!   and the Stirling formula with a Chebyshev-series correction above,
//!   where the correction series converges fastest.
//! * **Reflection**: arguments below 0.5 go through the reflection formula;
//!   non-positive integers are poles and return infinity.
//! * NaN propagates; no argument panics.

use core::f64::consts::PI;

use super::chebyshev::chebyshev_eval;
use super::stirling::LN_SQRT_2PI;

// ============================================================================
// Constants
// ============================================================================

/// Lanczos shift parameter.
const LANCZOS_G: f64 = 7.0;

/// Lanczos coefficients for g = 7, n = 9.
const LANCZOS: [f64; 9] = [
    0.99999999999980993,
    676.5203681218851,
    -1259.1392167224028,
    771.32342877765313,
    -176.61502916214059,
    12.507343278686905,
    -0.13857109526572012,
    9.9843695780195716e-6,
    1.5056327351493116e-7,
];

/// Chebyshev coefficients of the Stirling correction on `x >= 10`,
/// expanded in `2 (10/x)^2 - 1`.
const ALGMCS: [f64; 5] = [
    0.1666389480451863247205729650822,
    -0.1384948176067563840732986059135e-4,
    0.9810825646924729426157171547487e-8,
    -0.1809129475572494194263306266719e-10,
    0.6221098041892605227126015543416e-13,
];

/// Crossover to the Stirling regime.
const STIRLING_CUTOFF: f64 = 10.0;

/// Above this the correction term is below machine precision of the
/// Stirling formula itself; use the leading `1/(12x)` term alone.
const CORRECTION_XBIG: f64 = 94906265.62425156;

/// Euler-Mascheroni constant.
const EULER_GAMMA: f64 = 0.5772156649015328606065120900824024;

/// `zeta(k)` for `k = 2, 3, ..., 26`, used by the `log Gamma(1 + a)` series.
const ZETA: [f64; 25] = [
    1.6449340668482264,
    1.2020569031595943,
    1.0823232337111382,
    1.0369277551433699,
    1.0173430619844491,
    1.0083492773819228,
    1.0040773561979443,
    1.0020083928260822,
    1.0009945751278181,
    1.0004941886041195,
    1.0002460865533080,
    1.0001227133475785,
    1.0000612481350587,
    1.0000305882363070,
    1.0000152822594087,
    1.0000076371976379,
    1.0000038172932650,
    1.0000019082127166,
    1.0000009539620338,
    1.0000004769329868,
    1.0000002384505027,
    1.0000001192199260,
    1.0000000596081891,
    1.0000000298035035,
    1.0000000149015548,
];

// ============================================================================
// Log-Gamma
// ============================================================================

/// `log |Gamma(x)|` over the full double range.
///
/// Non-positive integers are poles and return `+inf`; NaN propagates.
pub fn ln_gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 && x == x.trunc() {
        return f64::INFINITY;
    }
    if x < 0.5 {
        // Reflection: log Gamma(x) = log pi - log |sin(pi x)| - log Gamma(1 - x)
        let sin_pi_x = (PI * x).sin().abs();
        return PI.ln() - sin_pi_x.ln() - ln_gamma(1.0 - x);
    }
    if x == f64::INFINITY {
        return f64::INFINITY;
    }
    if x < STIRLING_CUTOFF {
        lanczos_ln_gamma(x)
    } else {
        (x - 0.5) * x.ln() - x + LN_SQRT_2PI + ln_gamma_correction(x)
    }
}

/// Lanczos evaluation for `0.5 <= x < 10`.
fn lanczos_ln_gamma(x: f64) -> f64 {
    let x = x - 1.0;

    let mut ag = LANCZOS[0];
    for (i, &c) in LANCZOS.iter().enumerate().skip(1) {
        ag += c / (x + i as f64);
    }

    let t = x + LANCZOS_G + 0.5;
    LN_SQRT_2PI + (x + 0.5) * t.ln() - t + ag.ln()
}

/// Stirling correction `log Gamma(x) - [(x - 1/2) log x - x + log sqrt(2 pi)]`
/// for `x >= 10`.
pub fn ln_gamma_correction(x: f64) -> f64 {
    if x < CORRECTION_XBIG {
        let t = STIRLING_CUTOFF / x;
        chebyshev_eval(t * t * 2.0 - 1.0, &ALGMCS) / x
    } else {
        1.0 / (x * 12.0)
    }
}

// ============================================================================
// Log-Gamma near 1
// ============================================================================

/// `log Gamma(1 + a)` accurate for small `|a|`.
///
/// Uses the Euler series `-gamma a + sum((-a)^k zeta(k) / k)` on
/// `|a| < 0.25`, where the direct `ln_gamma(1 + a)` call would cancel.
pub fn ln_gamma1p(a: f64) -> f64 {
    if !(a.abs() < 0.25) {
        // Also the NaN path.
        return ln_gamma(1.0 + a);
    }

    let p = -a;
    let mut pk = p;
    let mut sum = 0.0;
    for (i, &z) in ZETA.iter().enumerate() {
        let k = (i + 2) as f64;
        pk *= p;
        let term = z * pk / k;
        sum += term;
        if term.abs() < f64::EPSILON * sum.abs() {
            break;
        }
    }
    EULER_GAMMA * p + sum
}
