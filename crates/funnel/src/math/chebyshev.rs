//! Chebyshev series evaluation.
//!
//! ## Purpose
//!
//! Evaluates a Chebyshev series by the Clenshaw recurrence. Used by the
//! log-gamma Stirling correction, whose coefficients are stored as a
//! Chebyshev expansion on the transformed argument.
//!
//! ## Design notes
//!
//! * **Contract**: The series is only meaningful for arguments in the
//!   nominal domain `[-1, 1]` (a small tolerance is allowed). Unlike the
//!   rest of the math layer, an out-of-domain argument here is a caller
//!   programming error, not a data condition, so it panics instead of
//!   returning NaN. Callers must pre-validate.

/// Number of series terms accepted before the call is considered malformed.
const MAX_TERMS: usize = 1000;

/// Evaluate the Chebyshev series `sum(coeffs[k] * T_k(x))` at `x`.
///
/// # Panics
///
/// Panics if `coeffs` is empty or longer than 1000 terms, or if `x` lies
/// outside `[-1.1, 1.1]` (including NaN).
pub fn chebyshev_eval(x: f64, coeffs: &[f64]) -> f64 {
    let n = coeffs.len();
    assert!(
        n >= 1 && n <= MAX_TERMS,
        "chebyshev_eval: series length {n} outside [1, {MAX_TERMS}]"
    );
    assert!(
        (-1.1..=1.1).contains(&x),
        "chebyshev_eval: argument {x} outside [-1.1, 1.1]"
    );

    let twox = x * 2.0;
    let (mut b0, mut b1, mut b2) = (0.0, 0.0, 0.0);
    for i in 1..=n {
        b2 = b1;
        b1 = b0;
        b0 = twox * b1 - b2 + coeffs[n - i];
    }
    (b0 - b2) * 0.5
}
