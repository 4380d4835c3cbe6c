//! Input and parameter validation.
//!
//! ## Purpose
//!
//! This module provides the validation applied at the API boundary:
//! matching input lengths, finite members, and finite configured scalars.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//! * **Generics**: Validation is generic over `Float` types.
//! * **Scope**: Structural problems only. Record-level semantic validity
//!   (positive denominators, proportion numerators within bounds) is the
//!   data source's responsibility; such values flow through the pipeline
//!   as NaN rather than failing it.
//!
//! ## Non-goals
//!
//! * This module does not filter or repair input data.
//! * This module does not perform the limit calculation itself.

use num_traits::Float;

use crate::primitives::errors::FunnelError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for funnel configuration and input data.
///
/// Provides static methods returning `Result<(), FunnelError>`, failing
/// fast on the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Core Input Validation
    // ========================================================================

    /// Validate the input arrays for a limit calculation.
    ///
    /// Empty inputs are valid: they produce an empty limit table.
    pub fn validate_inputs<T: Float>(
        numerators: &[T],
        denominators: &[T],
    ) -> Result<(), FunnelError> {
        // Check 1: Matching lengths
        let n = numerators.len();
        if n != denominators.len() {
            return Err(FunnelError::MismatchedInputs {
                numerators_len: n,
                denominators_len: denominators.len(),
            });
        }

        // Check 2: All values finite (combined loop for cache locality)
        for i in 0..n {
            if !numerators[i].is_finite() {
                return Err(FunnelError::InvalidNumericValue(format!(
                    "numerators[{}]={}",
                    i,
                    numerators[i].to_f64().unwrap_or(f64::NAN)
                )));
            }
            if !denominators[i].is_finite() {
                return Err(FunnelError::InvalidNumericValue(format!(
                    "denominators[{}]={}",
                    i,
                    denominators[i].to_f64().unwrap_or(f64::NAN)
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate a single configured scalar for finiteness.
    pub fn validate_scalar<T: Float>(val: T, name: &str) -> Result<(), FunnelError> {
        if !val.is_finite() {
            return Err(FunnelError::InvalidNumericValue(format!(
                "{}={}",
                name,
                val.to_f64().unwrap_or(f64::NAN)
            )));
        }
        Ok(())
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(
        duplicate_param: Option<&'static str>,
    ) -> Result<(), FunnelError> {
        if let Some(param) = duplicate_param {
            return Err(FunnelError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }
}
