//! Chart-kind formulas.
//!
//! ## Purpose
//!
//! Each funnel chart kind ties together five pieces of statistical
//! machinery: a target (the pooled centre line), a variance-stabilising
//! transform of the per-unit observations, standard errors on the
//! transformed scale, and the control-limit value at a given quantile,
//! with and without the overdispersion adjustment.
//!
//! ## Key concepts
//!
//! * **Proportion**: `numerator / denominator` with the angular
//!   (`asin sqrt`) transform; limits are folded back through `sin^2` and
//!   clamped to `[0, 1]`.
//! * **StandardisedRatio**: observed over expected events, target 1.
//!   Unadjusted limits come from exact Poisson (chi-squared) quantiles,
//!   not a normal approximation; adjusted limits use the square-root
//!   transform.
//! * **Rate**: event counts over exposure with the log transform; limits
//!   are exponentiated back.
//!
//! ## Invariants
//!
//! * All functions are pure and total over their valid input domain.
//! * Dispatch is exhaustive: adding a variant fails to compile until every
//!   `match` below covers it.
//! * Invalid records (zero denominators and the like) produce NaN, which
//!   propagates; nothing here panics.

use crate::distributions::chi_squared;

// ============================================================================
// Chart Kind
// ============================================================================

/// Funnel chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    /// Proportion of denominator events (e.g. mortality per admission).
    #[default]
    Proportion,

    /// Indirectly standardised ratio of observed to expected events.
    StandardisedRatio,

    /// Rate of events over exposure (e.g. incidents per bed-day).
    Rate,
}

/// Value bundle for a single limit evaluation at one sweep denominator.
///
/// Constructed per sweep point, passed by reference, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitArgs {
    /// Coverage probability the quantile was derived from.
    pub probability: f64,

    /// Normal quantile (z-value) for that probability.
    pub quantile: f64,

    /// Target on the natural scale.
    pub target: f64,

    /// Target on the transformed scale.
    pub target_transformed: f64,

    /// Standard error at this denominator.
    pub standard_error: f64,

    /// Between-unit variance estimate (zero when no adjustment applies).
    pub tau2: f64,

    /// Denominator the limit is evaluated at.
    pub denominator: f64,
}

impl ChartKind {
    // ========================================================================
    // Targets and Transforms
    // ========================================================================

    /// Pooled target, optionally on the variance-stabilised scale.
    pub fn target(&self, numerators: &[f64], denominators: &[f64], transformed: bool) -> f64 {
        match self {
            Self::Proportion => {
                let ratio = sum(numerators) / sum(denominators);
                if transformed {
                    ratio.sqrt().asin()
                } else {
                    ratio
                }
            }
            Self::StandardisedRatio => 1.0,
            Self::Rate => {
                let ratio = sum(numerators) / sum(denominators);
                if transformed {
                    ratio.ln()
                } else {
                    ratio
                }
            }
        }
    }

    /// Per-unit variance-stabilised observations.
    pub fn y(&self, numerators: &[f64], denominators: &[f64]) -> Vec<f64> {
        numerators
            .iter()
            .zip(denominators)
            .map(|(&n, &d)| match self {
                Self::Proportion => (n / d).sqrt().asin(),
                Self::StandardisedRatio => (n / d).sqrt(),
                Self::Rate => ((n + 0.5) / (d + 0.5)).ln(),
            })
            .collect()
    }

    // ========================================================================
    // Standard Errors
    // ========================================================================

    /// Per-unit unadjusted standard errors.
    ///
    /// Empty for standardised ratios: their unadjusted limits come from
    /// exact Poisson quantiles, not a normal standard error.
    pub fn se(&self, numerators: &[f64], denominators: &[f64]) -> Vec<f64> {
        match self {
            Self::Proportion => {
                let target = self.target(numerators, denominators, false);
                denominators
                    .iter()
                    .map(|&d| (target * (1.0 - target) / d).sqrt())
                    .collect()
            }
            Self::StandardisedRatio => Vec::new(),
            Self::Rate => numerators
                .iter()
                .zip(denominators)
                .map(|(&n, &d)| rate_se(n, d))
                .collect(),
        }
    }

    /// Per-unit overdispersion-scale standard errors.
    pub fn se_od(&self, numerators: &[f64], denominators: &[f64]) -> Vec<f64> {
        match self {
            Self::Proportion | Self::StandardisedRatio => denominators
                .iter()
                .map(|&d| 1.0 / (2.0 * d.sqrt()))
                .collect(),
            Self::Rate => numerators
                .iter()
                .zip(denominators)
                .map(|(&n, &d)| rate_se(n, d))
                .collect(),
        }
    }

    /// Standard error at a sweep denominator.
    ///
    /// For rate charts the numerator is unobserved at a sweep point, so the
    /// expected count `target * denominator` stands in for it; at observed
    /// denominators this reproduces the pooled-consistent standard error.
    pub fn se_at(&self, target: f64, denominator: f64, od_scale: bool) -> f64 {
        match self {
            Self::Proportion => {
                if od_scale {
                    1.0 / (2.0 * denominator.sqrt())
                } else {
                    (target * (1.0 - target) / denominator).sqrt()
                }
            }
            Self::StandardisedRatio => 1.0 / (2.0 * denominator.sqrt()),
            Self::Rate => rate_se(target * denominator, denominator),
        }
    }

    // ========================================================================
    // Limit Values
    // ========================================================================

    /// Unadjusted control limit at one sweep point.
    pub fn limit(&self, args: &LimitArgs) -> f64 {
        match self {
            Self::Proportion => {
                let angle = args.target_transformed + args.quantile * args.standard_error;
                let value = angle.sin();
                (value * value).clamp(0.0, 1.0)
            }
            Self::StandardisedRatio => {
                // Exact Poisson limits: the chi-squared quantile relation,
                // with the extra degree-of-freedom pair above the mean
                // reflecting the asymmetry of the exact limits.
                let p = args.probability;
                let offset = if p > 0.5 { 1.0 } else { 0.0 };
                let d = args.denominator;
                chi_squared::quantile(p, 2.0 * (d + offset), true, false) / (2.0 * d)
            }
            Self::Rate => {
                (args.target_transformed + args.quantile * args.standard_error).exp()
            }
        }
    }

    /// Overdispersion-adjusted control limit at one sweep point.
    ///
    /// The general shape is
    /// `inverse_transform(target_transformed + q * sqrt(SE^2 + tau2))`.
    pub fn limit_od(&self, args: &LimitArgs) -> f64 {
        let spread = args.quantile
            * (args.standard_error * args.standard_error + args.tau2).sqrt();
        match self {
            Self::Proportion => {
                let value = (args.target_transformed + spread).sin();
                (value * value).clamp(0.0, 1.0)
            }
            Self::StandardisedRatio => {
                let value = (args.target_transformed + spread).max(0.0);
                value * value
            }
            Self::Rate => (args.target_transformed + spread).exp(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Standard error of a log-transformed count ratio with 0.5 continuity
/// correction.
fn rate_se(numerator: f64, denominator: f64) -> f64 {
    let n5 = numerator + 0.5;
    let d5 = denominator + 0.5;
    (numerator / (n5 * n5) + denominator / (d5 * d5)).sqrt()
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}
