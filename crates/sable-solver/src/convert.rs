//! Conversion classification.
//!
//! Classification answers "does a conversion exist, and of what kind";
//! materialization into bound nodes is the checker's job. User-defined
//! conversions compose up to three steps: a standard conversion into the
//! operator's parameter type, the operator itself, and a standard
//! conversion from the operator's return type to the destination.

use crate::const_value::ConstantValue;
use crate::types::{NumericKind, TypeData, TypeId, TypeInterner};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConversionKind {
    Identity,
    ImplicitNumeric,
    ExplicitNumeric,
    /// An in-range integral constant narrowing to a smaller integral type.
    ImplicitConstant,
    ImplicitReference,
    ExplicitReference,
    Boxing,
    Unboxing,
    ImplicitNullable,
    ExplicitNullable,
    NullLiteral,
    ImplicitDynamic,
    ImplicitUserDefined,
    ExplicitUserDefined,
    MethodGroup,
    NoConversion,
}

impl ConversionKind {
    pub fn is_implicit(&self) -> bool {
        !matches!(
            self,
            ConversionKind::ExplicitNumeric
                | ConversionKind::ExplicitReference
                | ConversionKind::Unboxing
                | ConversionKind::ExplicitNullable
                | ConversionKind::ExplicitUserDefined
                | ConversionKind::NoConversion
        )
    }
}

/// A resolved user-defined conversion: standard-in, operator, standard-out.
#[derive(Clone, Debug)]
pub struct UserDefinedConversion {
    /// Opaque member id of the chosen operator (from the symbol layer).
    pub operator_member: u32,
    /// The type that declares the operator.
    pub owner: TypeId,
    pub from_conversion: Box<Conversion>,
    pub to_conversion: Box<Conversion>,
    /// The operator parameter was a nullable wrapper over exactly the
    /// source type; the redundant wrap/unwrap pair was elided.
    pub lifted_elided: bool,
}

#[derive(Clone, Debug)]
pub struct Conversion {
    pub kind: ConversionKind,
    pub user_defined: Option<Box<UserDefinedConversion>>,
}

impl Conversion {
    pub const fn identity() -> Conversion {
        Conversion {
            kind: ConversionKind::Identity,
            user_defined: None,
        }
    }

    pub const fn no_conversion() -> Conversion {
        Conversion {
            kind: ConversionKind::NoConversion,
            user_defined: None,
        }
    }

    pub const fn of_kind(kind: ConversionKind) -> Conversion {
        Conversion {
            kind,
            user_defined: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.kind != ConversionKind::NoConversion
    }

    pub fn is_implicit(&self) -> bool {
        self.kind.is_implicit()
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Classify the conversion from `from` to `to`, considering the source
/// expression's constant value when present.
pub fn classify_conversion(
    types: &TypeInterner,
    from: TypeId,
    to: TypeId,
    constant: Option<&ConstantValue>,
) -> Conversion {
    let standard = classify_standard_conversion(types, from, to, constant);
    if standard.exists() {
        return standard;
    }
    classify_user_defined_conversion(types, from, to, true)
        .or_else(|| classify_user_defined_conversion(types, from, to, false))
        .unwrap_or_else(Conversion::no_conversion)
}

/// Classify without considering user-defined operators. This is also the
/// classification used for the standard halves of a user-defined
/// conversion, which may not themselves be user-defined.
pub fn classify_standard_conversion(
    types: &TypeInterner,
    from: TypeId,
    to: TypeId,
    constant: Option<&ConstantValue>,
) -> Conversion {
    if from.is_error() || to.is_error() {
        // Error types convert to everything to suppress cascades.
        return Conversion::identity();
    }
    if from == to {
        return Conversion::identity();
    }
    if from == TypeId::DYNAMIC || to == TypeId::DYNAMIC {
        return Conversion::of_kind(ConversionKind::ImplicitDynamic);
    }
    if from == TypeId::NULL {
        if types.is_reference_type(to) || types.nullable_underlying(to).is_some() {
            return Conversion::of_kind(ConversionKind::NullLiteral);
        }
        return Conversion::no_conversion();
    }

    // Numeric conversions.
    if let (Some(from_kind), Some(to_kind)) = (types.numeric_kind(from), types.numeric_kind(to)) {
        if is_implicit_numeric(from_kind, to_kind) {
            return Conversion::of_kind(ConversionKind::ImplicitNumeric);
        }
        if let Some(value) = constant
            && constant_fits_implicitly(value, to_kind)
        {
            return Conversion::of_kind(ConversionKind::ImplicitConstant);
        }
        return Conversion::of_kind(ConversionKind::ExplicitNumeric);
    }

    // Nullable conversions.
    if let Some(to_underlying) = types.nullable_underlying(to) {
        let from_effective = types.nullable_underlying(from).unwrap_or(from);
        let inner = classify_standard_conversion(types, from_effective, to_underlying, constant);
        return match inner.kind {
            ConversionKind::NoConversion => Conversion::no_conversion(),
            kind if kind.is_implicit() => Conversion::of_kind(ConversionKind::ImplicitNullable),
            _ => Conversion::of_kind(ConversionKind::ExplicitNullable),
        };
    }
    if let Some(from_underlying) = types.nullable_underlying(from) {
        let inner = classify_standard_conversion(types, from_underlying, to, constant);
        if inner.exists() {
            return Conversion::of_kind(ConversionKind::ExplicitNullable);
        }
        return Conversion::no_conversion();
    }

    // Reference, boxing, and unboxing conversions.
    let from_ref = types.is_reference_type(from);
    let to_ref = types.is_reference_type(to);
    if from_ref && to_ref {
        if is_implicit_reference(types, from, to) {
            return Conversion::of_kind(ConversionKind::ImplicitReference);
        }
        if is_implicit_reference(types, to, from) {
            return Conversion::of_kind(ConversionKind::ExplicitReference);
        }
        return Conversion::no_conversion();
    }
    if types.is_value_type(from) && to == TypeId::OBJECT {
        return Conversion::of_kind(ConversionKind::Boxing);
    }
    if from == TypeId::OBJECT && types.is_value_type(to) {
        return Conversion::of_kind(ConversionKind::Unboxing);
    }

    Conversion::no_conversion()
}

/// Whether `from[] -> to[]` would rely on array covariance. Attribute
/// arguments reject these because metadata has no representation for them.
pub fn is_array_covariant_conversion(types: &TypeInterner, from: TypeId, to: TypeId) -> bool {
    match (types.element_type(from), types.element_type(to)) {
        (Some(from_elem), Some(to_elem)) => {
            from_elem != to_elem
                && types.is_reference_type(from_elem)
                && types.is_reference_type(to_elem)
                && is_implicit_reference(types, from_elem, to_elem)
        }
        _ => false,
    }
}

/// Implicit reference conversions: the base chain, interfaces folded into
/// the chain by the symbol layer, and array covariance.
fn is_implicit_reference(types: &TypeInterner, from: TypeId, to: TypeId) -> bool {
    if to == TypeId::OBJECT {
        return true;
    }
    if types.is_subtype_of(from, to) {
        return true;
    }
    if let (Some(from_elem), Some(to_elem)) = (types.element_type(from), types.element_type(to)) {
        return types.is_reference_type(from_elem)
            && types.is_reference_type(to_elem)
            && is_implicit_reference(types, from_elem, to_elem);
    }
    false
}

// =============================================================================
// User-defined conversions
// =============================================================================

fn classify_user_defined_conversion(
    types: &TypeInterner,
    from: TypeId,
    to: TypeId,
    implicit_only: bool,
) -> Option<Conversion> {
    // Operators are collected from the source type's base chain and from
    // the destination type.
    let mut owners = Vec::new();
    let mut current = Some(from);
    while let Some(ty) = current {
        if matches!(types.get(ty), TypeData::Named(_)) {
            owners.push(ty);
        }
        current = types.base_of(ty);
    }
    if !owners.contains(&to) && matches!(types.get(to), TypeData::Named(_)) {
        owners.push(to);
    }

    for owner in owners {
        for (index, op) in types.conversion_operators(owner).iter().enumerate() {
            if implicit_only && !op.is_implicit {
                continue;
            }
            // Standard conversion into the operator parameter. When the
            // parameter is a nullable wrapper over exactly the source
            // type, skip the wrap/unwrap pair and convert to the
            // underlying type directly.
            let (param_target, lifted_elided) = match types.nullable_underlying(op.parameter) {
                Some(underlying) if underlying == from => (underlying, true),
                _ => (op.parameter, false),
            };
            let from_conversion = classify_standard_conversion(types, from, param_target, None);
            if !from_conversion.exists() || !from_conversion.is_implicit() {
                continue;
            }
            let to_conversion = classify_standard_conversion(types, op.return_type, to, None);
            if !to_conversion.exists() {
                continue;
            }
            if implicit_only && !to_conversion.is_implicit() {
                continue;
            }
            let kind = if op.is_implicit && to_conversion.is_implicit() {
                ConversionKind::ImplicitUserDefined
            } else {
                ConversionKind::ExplicitUserDefined
            };
            tracing::trace!(
                owner = %types.name_of(owner),
                operator = index,
                "selected user-defined conversion"
            );
            return Some(Conversion {
                kind,
                user_defined: Some(Box::new(UserDefinedConversion {
                    operator_member: op.member,
                    owner,
                    from_conversion: Box::new(from_conversion),
                    to_conversion: Box::new(to_conversion),
                    lifted_elided,
                })),
            });
        }
    }
    None
}

// =============================================================================
// Numeric tables
// =============================================================================

/// The implicit numeric widening table.
fn is_implicit_numeric(from: NumericKind, to: NumericKind) -> bool {
    use NumericKind::*;
    match from {
        I8 => matches!(to, I16 | I32 | I64 | F32 | F64 | Decimal),
        U8 => matches!(to, I16 | U16 | I32 | U32 | I64 | U64 | F32 | F64 | Decimal),
        I16 => matches!(to, I32 | I64 | F32 | F64 | Decimal),
        U16 => matches!(to, I32 | U32 | I64 | U64 | F32 | F64 | Decimal),
        I32 => matches!(to, I64 | F32 | F64 | Decimal),
        U32 => matches!(to, I64 | U64 | F32 | F64 | Decimal),
        I64 => matches!(to, F32 | F64 | Decimal),
        U64 => matches!(to, F32 | F64 | Decimal),
        Char => matches!(to, U16 | I32 | U32 | I64 | U64 | F32 | F64 | Decimal),
        F32 => matches!(to, F64),
        F64 | Decimal => false,
    }
}

/// Implicit constant-expression conversion: an integral constant narrows
/// implicitly when its value is representable in the destination type.
fn constant_fits_implicitly(value: &ConstantValue, to: NumericKind) -> bool {
    if !to.is_integral() {
        return false;
    }
    let Some(v) = value.as_i128() else {
        return false;
    };
    let (min, max) = crate::fold::integral_range(to);
    min <= v && v <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamedTypeData;

    #[test]
    fn identity_and_widening() {
        let types = TypeInterner::new();
        assert_eq!(
            classify_conversion(&types, TypeId::I32, TypeId::I32, None).kind,
            ConversionKind::Identity
        );
        assert_eq!(
            classify_conversion(&types, TypeId::I32, TypeId::I64, None).kind,
            ConversionKind::ImplicitNumeric
        );
        assert_eq!(
            classify_conversion(&types, TypeId::I64, TypeId::I32, None).kind,
            ConversionKind::ExplicitNumeric
        );
    }

    #[test]
    fn constant_narrowing_is_implicit_in_range() {
        let types = TypeInterner::new();
        let small = ConstantValue::I32(100);
        assert_eq!(
            classify_conversion(&types, TypeId::I32, TypeId::U8, Some(&small)).kind,
            ConversionKind::ImplicitConstant
        );
        let big = ConstantValue::I32(300);
        assert_eq!(
            classify_conversion(&types, TypeId::I32, TypeId::U8, Some(&big)).kind,
            ConversionKind::ExplicitNumeric
        );
    }

    #[test]
    fn user_defined_conversion_elides_nullable_wrapper() {
        let mut types = TypeInterner::new();
        let nullable_i32 = types.nullable_of(TypeId::I32);
        // struct Meters { public static implicit operator Meters(int? value); }
        // The operator's return type refers to the type being defined, so
        // reserve the id first.
        let owner = TypeId(types.len() as u32);
        let reserved = types.add_named(NamedTypeData {
            name: "Meters".to_string(),
            base: None,
            is_value_type: true,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: vec![crate::types::ConversionOperator {
                member: 7,
                is_implicit: true,
                parameter: nullable_i32,
                return_type: owner,
            }],
        });
        assert_eq!(owner, reserved);

        let conversion = classify_conversion(&types, TypeId::I32, owner, None);
        assert_eq!(conversion.kind, ConversionKind::ImplicitUserDefined);
        let udc = conversion.user_defined.expect("user-defined payload");
        assert!(udc.lifted_elided);
        assert_eq!(udc.from_conversion.kind, ConversionKind::Identity);
    }

    #[test]
    fn array_covariance_detected() {
        let mut types = TypeInterner::new();
        let base = types.add_named(NamedTypeData {
            name: "Base".to_string(),
            base: None,
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        });
        let derived = types.add_named(NamedTypeData {
            name: "Derived".to_string(),
            base: Some(base),
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        });
        let derived_array = types.array_of(derived);
        let base_array = types.array_of(base);
        assert!(is_array_covariant_conversion(&types, derived_array, base_array));
        assert!(!is_array_covariant_conversion(&types, base_array, derived_array));
        assert_eq!(
            classify_conversion(&types, derived_array, base_array, None).kind,
            ConversionKind::ImplicitReference
        );
    }
}
