//! Compile-time constant values.

use std::fmt;
use std::sync::Arc;

use crate::types::{NumericKind, TypeId};

/// A compile-time constant. Decimal constants are carried as an exact
/// scaled integer pair so decimal folding never loses precision.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Char(char),
    String(Arc<str>),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// `mantissa * 10^(-scale)`.
    Decimal { mantissa: i128, scale: u8 },
}

impl ConstantValue {
    pub fn decimal_from_i128(value: i128) -> ConstantValue {
        ConstantValue::Decimal {
            mantissa: value,
            scale: 0,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_kind().is_some()
    }

    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            ConstantValue::I8(_) => Some(NumericKind::I8),
            ConstantValue::I16(_) => Some(NumericKind::I16),
            ConstantValue::I32(_) => Some(NumericKind::I32),
            ConstantValue::I64(_) => Some(NumericKind::I64),
            ConstantValue::U8(_) => Some(NumericKind::U8),
            ConstantValue::U16(_) => Some(NumericKind::U16),
            ConstantValue::U32(_) => Some(NumericKind::U32),
            ConstantValue::U64(_) => Some(NumericKind::U64),
            ConstantValue::Char(_) => Some(NumericKind::Char),
            ConstantValue::F32(_) => Some(NumericKind::F32),
            ConstantValue::F64(_) => Some(NumericKind::F64),
            ConstantValue::Decimal { .. } => Some(NumericKind::Decimal),
            _ => None,
        }
    }

    /// The natural type of the constant before any conversion.
    pub fn type_id(&self) -> TypeId {
        match self {
            ConstantValue::Null => TypeId::NULL,
            ConstantValue::Bool(_) => TypeId::BOOLEAN,
            ConstantValue::Char(_) => TypeId::CHAR,
            ConstantValue::String(_) => TypeId::STRING,
            ConstantValue::I8(_) => TypeId::I8,
            ConstantValue::I16(_) => TypeId::I16,
            ConstantValue::I32(_) => TypeId::I32,
            ConstantValue::I64(_) => TypeId::I64,
            ConstantValue::U8(_) => TypeId::U8,
            ConstantValue::U16(_) => TypeId::U16,
            ConstantValue::U32(_) => TypeId::U32,
            ConstantValue::U64(_) => TypeId::U64,
            ConstantValue::F32(_) => TypeId::F32,
            ConstantValue::F64(_) => TypeId::F64,
            ConstantValue::Decimal { .. } => TypeId::DECIMAL,
        }
    }

    /// Integral value widened to `i128`, if the constant is integral.
    /// `char` participates as its scalar value.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            ConstantValue::I8(v) => Some(*v as i128),
            ConstantValue::I16(v) => Some(*v as i128),
            ConstantValue::I32(v) => Some(*v as i128),
            ConstantValue::I64(v) => Some(*v as i128),
            ConstantValue::U8(v) => Some(*v as i128),
            ConstantValue::U16(v) => Some(*v as i128),
            ConstantValue::U32(v) => Some(*v as i128),
            ConstantValue::U64(v) => Some(*v as i128),
            ConstantValue::Char(v) => Some(*v as i128),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstantValue::F32(v) => Some(*v as f64),
            ConstantValue::F64(v) => Some(*v),
            ConstantValue::Decimal { mantissa, scale } => {
                Some(*mantissa as f64 / 10f64.powi(*scale as i32))
            }
            other => other.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Bool(v) => write!(f, "{v}"),
            ConstantValue::Char(v) => write!(f, "'{v}'"),
            ConstantValue::String(v) => write!(f, "{v}"),
            ConstantValue::I8(v) => write!(f, "{v}"),
            ConstantValue::I16(v) => write!(f, "{v}"),
            ConstantValue::I32(v) => write!(f, "{v}"),
            ConstantValue::I64(v) => write!(f, "{v}"),
            ConstantValue::U8(v) => write!(f, "{v}"),
            ConstantValue::U16(v) => write!(f, "{v}"),
            ConstantValue::U32(v) => write!(f, "{v}"),
            ConstantValue::U64(v) => write!(f, "{v}"),
            ConstantValue::F32(v) => write!(f, "{v}"),
            ConstantValue::F64(v) => write!(f, "{v}"),
            ConstantValue::Decimal { mantissa, scale } => {
                if *scale == 0 {
                    write!(f, "{mantissa}")
                } else {
                    write!(f, "{}e-{}", mantissa, scale)
                }
            }
        }
    }
}
