//! Output types and result structures.
//!
//! ## Purpose
//!
//! This module defines the `FunnelResult` struct which carries everything a
//! caller needs from a limit calculation: the limit table over the
//! denominator sweep, the per-observation z-scores, both targets, and the
//! dispersion estimate.
//!
//! ## Design notes
//!
//! * **Nullable limits**: each limit cell is an `Option`; `None` marks a
//!   denominator where the limit is not meaningfully defined and should
//!   not be drawn.
//! * **Generics**: Results are generic over `Float` types.
//! * **Ergonomics**: Implements `Display` for human-readable output.
//!
//! ## Invariants
//!
//! * The rows are sorted by denominator, ascending.
//! * `z_scores` is parallel to the input observations, not to the rows.
//! * Lower limits never exceed their paired upper limits where both are
//!   present.
//!
//! ## Non-goals
//!
//! * This module does not perform calculations; it only stores results.
//! * This module does not provide serialization logic.

use core::fmt::{Debug, Display, Formatter, Result};

use num_traits::Float;

// ============================================================================
// Display Transform
// ============================================================================

/// Display-scale transform applied to the assembled table.
///
/// This is presentation only: it is applied after the limits are computed
/// and after the monotonicity pass, and out-of-domain values (a log of a
/// zero limit, say) become NaN and propagate as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// No transformation.
    #[default]
    Identity,

    /// Natural logarithm.
    Ln,

    /// Base-10 logarithm.
    Log10,

    /// Square root.
    Sqrt,
}

impl Transform {
    /// Apply the transform to one value.
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Ln => value.ln(),
            Self::Log10 => value.log10(),
            Self::Sqrt => value.sqrt(),
        }
    }
}

// ============================================================================
// Limit Row
// ============================================================================

/// One row of the control-limit table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitRow<T> {
    /// Denominator this row was evaluated at.
    pub denominator: T,

    /// Lower 99.8% limit.
    pub ll99: Option<T>,

    /// Lower 95% limit.
    pub ll95: Option<T>,

    /// Lower 68% limit.
    pub ll68: Option<T>,

    /// Upper 68% limit.
    pub ul68: Option<T>,

    /// Upper 95% limit.
    pub ul95: Option<T>,

    /// Upper 99.8% limit.
    pub ul99: Option<T>,

    /// Target (centre line) value.
    pub target: T,

    /// Secondary reference line, when configured.
    pub alt_target: Option<T>,
}

// ============================================================================
// Result Structure
// ============================================================================

/// Complete output of a funnel limit calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelResult<T> {
    /// Control-limit table over the denominator sweep, ascending.
    pub limits: Vec<LimitRow<T>>,

    /// Per-observation z-scores, parallel to the input arrays.
    pub z_scores: Vec<T>,

    /// Per-observation standard errors on the scale the limits use.
    /// Empty for unadjusted standardised-ratio charts, whose limits are
    /// exact rather than normal-approximate.
    pub standard_errors: Vec<T>,

    /// Pooled target on the natural scale.
    pub target: T,

    /// Pooled target on the variance-stabilised scale.
    pub target_transformed: T,

    /// Secondary reference line, when configured.
    pub alt_target: Option<T>,

    /// Dispersion ratio (mean squared Winsorised z-score).
    pub phi: T,

    /// Between-unit variance estimate; exactly zero when the dispersion
    /// test failed.
    pub tau2: T,

    /// Whether the limits in the table are overdispersion-adjusted.
    pub od_applied: bool,
}

impl<T: Float> FunnelResult<T> {
    // ========================================================================
    // Query Methods
    // ========================================================================

    /// Number of sweep rows in the table.
    pub fn len(&self) -> usize {
        self.limits.len()
    }

    /// Whether the table is empty (empty input data).
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// The row evaluated at an observed denominator, if present.
    pub fn row_at(&self, denominator: T) -> Option<&LimitRow<T>> {
        self.limits.iter().find(|r| r.denominator == denominator)
    }

    /// Units whose absolute z-score reaches the given threshold.
    pub fn outliers(&self, threshold: T) -> Vec<usize> {
        self.z_scores
            .iter()
            .enumerate()
            .filter(|(_, &z)| z.abs() >= threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl<T: Float + Display + Debug> Display for FunnelResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Sweep rows:  {}", self.limits.len())?;
        writeln!(f, "  Target:      {}", self.target)?;
        writeln!(f, "  Phi:         {}", self.phi)?;
        writeln!(f, "  Tau2:        {}", self.tau2)?;
        if self.od_applied {
            writeln!(f, "  Overdispersion: Adjusted")?;
        }
        writeln!(f)?;

        writeln!(f, "Control Limits:")?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Denominator", "LL99", "LL95", "LL68", "UL68", "UL95", "UL99", "Target"
        )?;
        writeln!(f, "{:-<88}", "")?;

        // Data rows (show first 10 and last 10 if more than 20 rows)
        let n = self.limits.len();
        let show_all = n <= 20;
        let rows_to_show: Vec<usize> = if show_all {
            (0..n).collect()
        } else {
            (0..10).chain(n - 10..n).collect()
        };

        let mut prev_idx = 0;
        for (i, &idx) in rows_to_show.iter().enumerate() {
            if i > 0 && idx != prev_idx + 1 {
                writeln!(f, "{:>12}", "...")?;
            }
            prev_idx = idx;

            let row = &self.limits[idx];
            write!(f, "{:>12.2}", row.denominator)?;
            for cell in [row.ll99, row.ll95, row.ll68, row.ul68, row.ul95, row.ul99] {
                match cell {
                    Some(v) => write!(f, " {:>10.5}", v)?,
                    None => write!(f, " {:>10}", "-")?,
                }
            }
            writeln!(f, " {:>10.5}", row.target)?;
        }

        Ok(())
    }
}
