//! IEEE double decomposition and reconstruction.
//!
//! ## Purpose
//!
//! `frexp`/`ldexp` split a double into mantissa and binary exponent and put
//! it back together. The normal kernels use `ldexp` to truncate an argument
//! to sixteenths of a unit: evaluating `exp(-x^2/2)` as the product of a
//! coarse part and a residual part keeps the tail accurate where a single
//! squaring would lose digits (Cody's trick).
//!
//! ## Design notes
//!
//! * Both functions operate on the bit representation directly; subnormals
//!   are rescaled through a 2^64 factor so the mantissa contract
//!   (`0.5 <= |m| < 1`) holds across the full range.
//! * NaN, infinities, and zero pass through unchanged with exponent 0.

/// 2^64 as a double, used to normalise subnormal inputs.
const TWO_POW_64: f64 = 18446744073709551616.0;

/// Decompose `x` into `(m, e)` with `x = m * 2^e` and `0.5 <= |m| < 1`.
///
/// Zero, NaN, and infinities are returned unchanged with `e = 0`.
pub fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }

    let bits = x.to_bits();
    let raw_exp = ((bits >> 52) & 0x7ff) as i32;

    if raw_exp == 0 {
        // Subnormal: renormalise, then correct the exponent.
        let (m, e) = frexp(x * TWO_POW_64);
        return (m, e - 64);
    }

    let e = raw_exp - 1022;
    // Replace the stored exponent with the one for [0.5, 1).
    let m = f64::from_bits((bits & 0x800F_FFFF_FFFF_FFFF) | 0x3FE0_0000_0000_0000);
    (m, e)
}

/// Reconstruct `x * 2^e`, saturating to 0 or infinity past the double range.
pub fn ldexp(x: f64, e: i32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }

    let (m, me) = frexp(x);
    let target = me as i64 + e as i64;

    if target > 1024 {
        return if m < 0.0 {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if target < -1074 {
        return if m < 0.0 { -0.0 } else { 0.0 };
    }

    if target >= -1021 {
        // Normal range: splice the exponent back in.
        let bits = m.to_bits();
        let exp_bits = ((target + 1022) as u64) << 52;
        f64::from_bits((bits & 0x800F_FFFF_FFFF_FFFF) | exp_bits)
    } else {
        // Subnormal result: build at a safe exponent, then scale down.
        let bits = m.to_bits();
        let exp_bits = ((target + 64 + 1022) as u64) << 52;
        f64::from_bits((bits & 0x800F_FFFF_FFFF_FFFF) | exp_bits) / TWO_POW_64
    }
}

/// Truncate `x` toward zero at a resolution of 1/16.
///
/// Splitting an argument into this coarse part plus a residual lets the
/// caller evaluate `exp(-x^2/2)` as two factors whose exponents are exactly
/// representable, avoiding cancellation in the extreme tail.
pub fn trunc_to_sixteenth(x: f64) -> f64 {
    ldexp(ldexp(x, 4).trunc(), -4)
}
