//! Chi-squared distribution.
//!
//! A chi-squared variable on `df` degrees of freedom is a gamma variable
//! with `shape = df / 2` and `scale = 2`; every function here is exactly
//! that reparameterisation, so the two families agree to the last bit.

use crate::distributions::gamma;

/// Chi-squared density on `df` degrees of freedom.
pub fn density(x: f64, df: f64, give_log: bool) -> f64 {
    gamma::density(x, df / 2.0, 2.0, give_log)
}

/// Chi-squared CDF on `df` degrees of freedom.
pub fn cdf(x: f64, df: f64, lower_tail: bool, log_p: bool) -> f64 {
    gamma::cdf(x, df / 2.0, 2.0, lower_tail, log_p)
}

/// Chi-squared quantile on `df` degrees of freedom.
pub fn quantile(p: f64, df: f64, lower_tail: bool, log_p: bool) -> f64 {
    gamma::quantile(p, df / 2.0, 2.0, lower_tail, log_p)
}
