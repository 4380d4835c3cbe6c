//! Error types for funnel operations.
//!
//! ## Purpose
//!
//! This module defines the error conditions reported at the API boundary:
//! structural input problems and invalid builder configuration.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors include the offending values (e.g., actual
//!   lengths on a mismatch).
//! * **Deferred**: Builder misuse is caught and stored during configuration,
//!   surfaced by `build()`.
//! * **Boundary-only**: The numeric kernels never construct these; domain
//!   errors inside the distribution layer are signalled with NaN so that
//!   element-wise pipelines need no per-element error handling.
//!
//! ## Invariants
//!
//! * All variants provide sufficient context for diagnosis.
//! * Error messages are consistent in tone and formatting.
//!
//! ## Non-goals
//!
//! * This module does not perform the validation logic itself.
//! * This module does not provide error recovery strategies.

use core::fmt::{Display, Formatter, Result};
use std::error::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for funnel operations.
#[derive(Debug, Clone, PartialEq)]
pub enum FunnelError {
    /// Numerator and denominator arrays must have the same number of elements.
    MismatchedInputs {
        /// Number of elements in the numerator array.
        numerators_len: usize,
        /// Number of elements in the denominator array.
        denominators_len: usize,
    },

    /// Input data or a configured scalar contains NaN or infinite values.
    InvalidNumericValue(String),

    /// Parameter was set multiple times in the builder.
    DuplicateParameter {
        /// Name of the parameter that was set multiple times.
        parameter: &'static str,
    },
}

// ============================================================================
// Display Implementation
// ============================================================================

impl Display for FunnelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::MismatchedInputs {
                numerators_len,
                denominators_len,
            } => {
                write!(
                    f,
                    "Length mismatch: numerators has {numerators_len} points, denominators has {denominators_len}"
                )
            }
            Self::InvalidNumericValue(s) => write!(f, "Invalid numeric value: {s}"),
            Self::DuplicateParameter { parameter } => {
                write!(
                    f,
                    "Parameter '{parameter}' was set multiple times. Each parameter can only be configured once."
                )
            }
        }
    }
}

impl Error for FunnelError {}
