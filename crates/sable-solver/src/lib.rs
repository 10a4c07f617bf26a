//! Type relations, conversions, constant folding, and overload resolution.
//!
//! This crate is the type-level half of the resolution engine. It knows
//! nothing about syntax or symbols; the checker adapts symbol knowledge
//! into the data-level inputs defined here (candidate signatures, argument
//! info) and consumes the classification results.

pub mod const_value;
pub mod convert;
pub mod fold;
pub mod overload;
pub mod types;

pub use const_value::ConstantValue;
pub use convert::{Conversion, ConversionKind, UserDefinedConversion};
pub use fold::{ConstantOverflow, fold_constant_conversion};
pub use overload::{
    ArgumentInfo, CandidateFailure, FailureReason, MethodSignature, OverloadCandidate,
    OverloadResult, OverloadSuccess, ParameterSignature, RefKind, resolve_overloads,
    statically_applicable,
};
pub use types::{NumericKind, PrimitiveKind, TypeData, TypeId, TypeInterner};
