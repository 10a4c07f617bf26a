//! Constant folding across conversions.
//!
//! Integral folding is done in `i128`, which covers every source and
//! destination width, so range checks are exact. Floating-point to
//! integral uses the legacy exclusive bounds `min - 1 < v < max + 1`
//! carried over from the original folding tables; truncation is toward
//! zero. Checked context turns out-of-range into an error, unchecked
//! truncates at the destination width, and decimal-typed sources or
//! destinations are bounds-checked regardless of context.

use crate::const_value::ConstantValue;
use crate::types::{NumericKind, TypeId, TypeInterner};

/// The folded conversion left the destination's range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConstantOverflow;

impl std::fmt::Display for ConstantOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "constant value out of range for the destination type")
    }
}

impl std::error::Error for ConstantOverflow {}

/// Largest magnitude a decimal can hold, `2^96 - 1`.
const DECIMAL_MAX: i128 = 79_228_162_514_264_337_593_543_950_335;

/// Fold `value` through a conversion to `to`. Non-numeric destinations
/// fold only through identity. `checked` reflects the enclosing
/// checked/unchecked region.
pub fn fold_constant_conversion(
    types: &TypeInterner,
    value: &ConstantValue,
    to: TypeId,
    checked: bool,
) -> Result<ConstantValue, ConstantOverflow> {
    if value.type_id() == to {
        return Ok(value.clone());
    }
    let Some(to_kind) = types.numeric_kind(to) else {
        // Identity was handled above; anything else passes through
        // unchanged (reference and boxing conversions keep the value).
        return Ok(value.clone());
    };
    let Some(from_kind) = value.numeric_kind() else {
        return Ok(value.clone());
    };

    // Decimal endpoints ignore the checked/unchecked context.
    let checked = checked || from_kind == NumericKind::Decimal || to_kind == NumericKind::Decimal;

    match (from_kind.is_integral(), to_kind) {
        // Integral -> integral (char counts as integral on both sides).
        (true, _) if to_kind.is_integral() => {
            let v = value.as_i128().ok_or(ConstantOverflow)?;
            let (min, max) = integral_range(to_kind);
            if min <= v && v <= max {
                make_integral(to_kind, v)
            } else if checked {
                Err(ConstantOverflow)
            } else {
                make_integral(to_kind, truncate_to_width(v, to_kind))
            }
        }
        (true, NumericKind::F32) => {
            let v = value.as_i128().ok_or(ConstantOverflow)?;
            Ok(ConstantValue::F32(v as f32))
        }
        (true, NumericKind::F64) => {
            let v = value.as_i128().ok_or(ConstantOverflow)?;
            Ok(ConstantValue::F64(v as f64))
        }
        (true, NumericKind::Decimal) => {
            let v = value.as_i128().ok_or(ConstantOverflow)?;
            Ok(ConstantValue::Decimal {
                mantissa: v,
                scale: 0,
            })
        }

        // Floating and decimal sources.
        (false, _) => fold_from_real(value, from_kind, to_kind, checked),

        _ => Err(ConstantOverflow),
    }
}

fn fold_from_real(
    value: &ConstantValue,
    from_kind: NumericKind,
    to_kind: NumericKind,
    checked: bool,
) -> Result<ConstantValue, ConstantOverflow> {
    match (from_kind, to_kind) {
        (NumericKind::F32, NumericKind::F64) => {
            let v = value.as_f64().ok_or(ConstantOverflow)?;
            Ok(ConstantValue::F64(v))
        }
        (NumericKind::F64, NumericKind::F32) => {
            let v = value.as_f64().ok_or(ConstantOverflow)?;
            // Overflow to infinity is permitted for float narrowing.
            Ok(ConstantValue::F32(v as f32))
        }
        (NumericKind::Decimal, NumericKind::F32) => {
            let v = value.as_f64().ok_or(ConstantOverflow)?;
            Ok(ConstantValue::F32(v as f32))
        }
        (NumericKind::Decimal, NumericKind::F64) => {
            let v = value.as_f64().ok_or(ConstantOverflow)?;
            Ok(ConstantValue::F64(v))
        }
        (NumericKind::Decimal, _) if to_kind.is_integral() => {
            let ConstantValue::Decimal { mantissa, scale } = value else {
                return Err(ConstantOverflow);
            };
            // Truncate toward zero by dropping the fractional digits.
            let divisor = 10i128.checked_pow(*scale as u32).ok_or(ConstantOverflow)?;
            let truncated = mantissa / divisor;
            let (min, max) = integral_range(to_kind);
            if min <= truncated && truncated <= max {
                make_integral(to_kind, truncated)
            } else {
                Err(ConstantOverflow)
            }
        }
        (_, NumericKind::Decimal) => {
            let v = value.as_f64().ok_or(ConstantOverflow)?;
            if !v.is_finite() || v.abs() >= DECIMAL_MAX as f64 {
                return Err(ConstantOverflow);
            }
            // Carry fourteen fractional digits, which is what a binary
            // double can meaningfully contribute.
            let mantissa = (v * 1e14).round() as i128;
            Ok(ConstantValue::Decimal { mantissa, scale: 14 })
        }
        (_, _) if to_kind.is_integral() => {
            let v = value.as_f64().ok_or(ConstantOverflow)?;
            let (min, max) = integral_range(to_kind);
            // Legacy exclusive bounds: the truncated value is in range
            // exactly when min - 1 < v < max + 1.
            let in_range =
                v.is_finite() && v > (min as f64) - 1.0 && v < (max as f64) + 1.0;
            if in_range {
                make_integral(to_kind, v.trunc() as i128)
            } else if checked {
                Err(ConstantOverflow)
            } else {
                let raw = if v.is_finite() { v.trunc() as i128 } else { 0 };
                make_integral(to_kind, truncate_to_width(raw, to_kind))
            }
        }
        _ => Err(ConstantOverflow),
    }
}

/// Inclusive value range of an integral destination.
pub(crate) fn integral_range(kind: NumericKind) -> (i128, i128) {
    match kind {
        NumericKind::I8 => (i8::MIN as i128, i8::MAX as i128),
        NumericKind::I16 => (i16::MIN as i128, i16::MAX as i128),
        NumericKind::I32 => (i32::MIN as i128, i32::MAX as i128),
        NumericKind::I64 => (i64::MIN as i128, i64::MAX as i128),
        NumericKind::U8 => (0, u8::MAX as i128),
        NumericKind::U16 | NumericKind::Char => (0, u16::MAX as i128),
        NumericKind::U32 => (0, u32::MAX as i128),
        NumericKind::U64 => (0, u64::MAX as i128),
        NumericKind::F32 | NumericKind::F64 | NumericKind::Decimal => {
            unreachable!("not an integral kind")
        }
    }
}

fn truncate_to_width(v: i128, kind: NumericKind) -> i128 {
    match kind {
        NumericKind::I8 => v as i8 as i128,
        NumericKind::I16 => v as i16 as i128,
        NumericKind::I32 => v as i32 as i128,
        NumericKind::I64 => v as i64 as i128,
        NumericKind::U8 => v as u8 as i128,
        NumericKind::U16 | NumericKind::Char => v as u16 as i128,
        NumericKind::U32 => v as u32 as i128,
        NumericKind::U64 => v as u64 as i128,
        NumericKind::F32 | NumericKind::F64 | NumericKind::Decimal => {
            unreachable!("not an integral kind")
        }
    }
}

fn make_integral(kind: NumericKind, v: i128) -> Result<ConstantValue, ConstantOverflow> {
    Ok(match kind {
        NumericKind::I8 => ConstantValue::I8(v as i8),
        NumericKind::I16 => ConstantValue::I16(v as i16),
        NumericKind::I32 => ConstantValue::I32(v as i32),
        NumericKind::I64 => ConstantValue::I64(v as i64),
        NumericKind::U8 => ConstantValue::U8(v as u8),
        NumericKind::U16 => ConstantValue::U16(v as u16),
        NumericKind::U32 => ConstantValue::U32(v as u32),
        NumericKind::U64 => ConstantValue::U64(v as u64),
        NumericKind::Char => {
            // UTF-16 surrogate halves have no scalar representation.
            let c = char::from_u32(v as u32).ok_or(ConstantOverflow)?;
            ConstantValue::Char(c)
        }
        NumericKind::F32 | NumericKind::F64 | NumericKind::Decimal => {
            unreachable!("not an integral kind")
        }
    })
}
