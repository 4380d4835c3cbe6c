//! Cancellation-safe log/exp helpers.
//!
//! ## Purpose
//!
//! Tail probabilities are routinely carried in log scale; converting between
//! a log probability and the log of its complement is where naive formulas
//! lose all their digits. These helpers pick the stable branch.

use core::f64::consts::LN_2;

/// Compute `log(1 - exp(x))` for `x <= 0` without cancellation.
///
/// Branches at `-ln 2`: above it `expm1` keeps precision, below it
/// `exp` underflows gracefully and `ln_1p` takes over.
pub fn log1m_exp(x: f64) -> f64 {
    if x > -LN_2 {
        (-x.exp_m1()).ln()
    } else {
        (-x.exp()).ln_1p()
    }
}

/// Compute `log(1 + x) - x` accurately near zero.
///
/// The direct difference loses all precision for small `|x|`; a continued
/// fraction in `r = x / (2 + x)` is used on the central range.
pub fn log1pmx(x: f64) -> f64 {
    const MIN_LOG1_VALUE: f64 = -0.79149064;

    if x > 1.0 || x < MIN_LOG1_VALUE {
        x.ln_1p() - x
    } else {
        // |x| small: -x^2/2 + x^3/3 - ... rewritten via r = x/(2+x),
        // y = r^2, using log(1+x) = log((1+r)/(1-r)).
        let r = x / (2.0 + x);
        let y = r * r;
        if x.abs() < 1e-2 {
            r * ((((2.0 / 9.0 * y + 2.0 / 7.0) * y + 2.0 / 5.0) * y + 2.0 / 3.0) * y - x)
        } else {
            const TOL: f64 = 1e-16;
            r * (2.0 * y * odd_reciprocal_series(y, TOL) - x)
        }
    }
}

/// Iteration cap for the series; on this branch `|y| < 0.43`, so the terms
/// contract geometrically and the cap is never approached.
const MAX_TERMS: usize = 1000;

/// `sum(y^k / (2k + 3))` for `k = 0, 1, 2, ...`, requires `|y| < 1`.
///
/// This is the tail series of `log((1 + r)/(1 - r))` in `r^2` that
/// `log1pmx` needs past its polynomial range.
fn odd_reciprocal_series(y: f64, eps: f64) -> f64 {
    let mut yk = 1.0;
    let mut sum = 1.0 / 3.0;
    for k in 1..MAX_TERMS {
        yk *= y;
        let term = yk / (2 * k + 3) as f64;
        sum += term;
        if term.abs() < eps * sum.abs() {
            break;
        }
    }
    sum
}
