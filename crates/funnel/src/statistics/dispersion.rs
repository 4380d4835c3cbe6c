//! Winsorised dispersion estimation.
//!
//! ## Purpose
//!
//! Indicator data is frequently more variable than its sampling model
//! allows for. This module measures that overdispersion from Winsorised
//! z-scores and, when the evidence supports it, produces the between-unit
//! variance `tau2` that widens the control limits (an additive
//! random-effects adjustment in the style of DerSimonian and Laird).
//!
//! ## Key concepts
//!
//! * **Winsorisation**: z-scores are clipped at their 10th and 90th
//!   empirical percentiles before estimating dispersion, so a handful of
//!   extreme units cannot inflate the estimate by themselves.
//! * **Dispersion ratio**: `phi = mean(z_w^2)`.
//! * **Dispersion test**: the adjustment is only warranted when
//!   `N * phi >= N - 1`; below that, `tau2` is exactly zero.
//!
//! ## Invariants
//!
//! * `tau2 >= 0`, and `tau2 == 0.0` exactly when the dispersion test fails.
//! * Winsorisation never widens the z-score range.
//! * Fewer than two units never produce an adjustment.

use core::cmp::Ordering::Equal;

use super::charts::ChartKind;

// ============================================================================
// Overdispersion Policy
// ============================================================================

/// When to apply the overdispersion adjustment to the limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OdAdjustment {
    /// Never adjust.
    No,

    /// Always adjust.
    Yes,

    /// Adjust only when the dispersion test finds evidence (`tau2 > 0`).
    #[default]
    Auto,
}

// ============================================================================
// Dispersion Estimate
// ============================================================================

/// Result of the dispersion estimation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionEstimate {
    /// Dispersion ratio: mean squared Winsorised z-score.
    pub phi: f64,

    /// Between-unit variance; exactly zero when unsupported by the test.
    pub tau2: f64,
}

/// Lower Winsorisation percentile.
const WINSOR_LOWER: f64 = 0.1;

/// Upper Winsorisation percentile.
const WINSOR_UPPER: f64 = 0.9;

/// Estimate dispersion for the given chart kind and data.
///
/// Returns the estimate together with the un-Winsorised z-scores, which
/// double as the per-unit outlier signal reported to the caller.
pub fn estimate(
    kind: ChartKind,
    numerators: &[f64],
    denominators: &[f64],
) -> (DispersionEstimate, Vec<f64>) {
    let n = numerators.len();
    if n == 0 {
        return (
            DispersionEstimate {
                phi: f64::NAN,
                tau2: 0.0,
            },
            Vec::new(),
        );
    }

    let target_transformed = kind.target(numerators, denominators, true);
    let y = kind.y(numerators, denominators);
    let se = kind.se_od(numerators, denominators);

    let z: Vec<f64> = y
        .iter()
        .zip(&se)
        .map(|(&yi, &sei)| (yi - target_transformed) / sei)
        .collect();

    if n < 2 {
        return (DispersionEstimate { phi: f64::NAN, tau2: 0.0 }, z);
    }

    let z_winsorised = winsorise(&z, WINSOR_LOWER, WINSOR_UPPER);
    let phi = z_winsorised.iter().map(|&v| v * v).sum::<f64>() / n as f64;

    let n_f = n as f64;
    let tau2 = if n_f * phi < n_f - 1.0 {
        // Dispersion test not met: no adjustment warranted.
        0.0
    } else {
        let weights: Vec<f64> = se.iter().map(|&s| 1.0 / (s * s)).collect();
        let sum_w: f64 = weights.iter().sum();
        let sum_w2: f64 = weights.iter().map(|&w| w * w).sum();
        let tau2 = (n_f * phi - (n_f - 1.0)) / (sum_w - sum_w2 / sum_w);
        // Floor at zero by comparison so a NaN estimate propagates
        // instead of being silently replaced.
        if tau2 < 0.0 { 0.0 } else { tau2 }
    };

    (DispersionEstimate { phi, tau2 }, z)
}

// ============================================================================
// Winsorisation
// ============================================================================

/// Clip values at the given empirical percentiles.
pub fn winsorise(values: &[f64], lower_p: f64, upper_p: f64) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Equal));

    let lower = empirical_quantile(&sorted, lower_p);
    let upper = empirical_quantile(&sorted, upper_p);

    // max/min rather than clamp: NaN members must pass through untouched
    // instead of panicking on an unordered bound.
    values
        .iter()
        .map(|&v| if v.is_nan() { v } else { v.max(lower).min(upper) })
        .collect()
}

/// Empirical quantile of pre-sorted data by linear interpolation of order
/// statistics (the convention statistical environments default to).
pub fn empirical_quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    if lo + 1 >= n {
        return sorted[n - 1];
    }
    sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
}
