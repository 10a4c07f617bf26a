//! Type storage and basic relations.
//!
//! Types are interned into a `TypeInterner` owned by the compilation and
//! addressed by `TypeId`. The interner is built once during compilation
//! setup (single writer), then treated as immutable for the remainder of
//! analysis (many readers).

use rustc_hash::FxHashMap;

use crate::overload::MethodSignature;

/// Index of a type in the interner. Well-known types have fixed ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ERROR: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const OBJECT: TypeId = TypeId(2);
    pub const BOOLEAN: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const STRING: TypeId = TypeId(5);
    pub const I8: TypeId = TypeId(6);
    pub const I16: TypeId = TypeId(7);
    pub const I32: TypeId = TypeId(8);
    pub const I64: TypeId = TypeId(9);
    pub const U8: TypeId = TypeId(10);
    pub const U16: TypeId = TypeId(11);
    pub const U32: TypeId = TypeId(12);
    pub const U64: TypeId = TypeId(13);
    pub const F32: TypeId = TypeId(14);
    pub const F64: TypeId = TypeId(15);
    pub const DECIMAL: TypeId = TypeId(16);
    pub const DYNAMIC: TypeId = TypeId(17);
    /// The type of the `null` literal before conversion.
    pub const NULL: TypeId = TypeId(18);

    pub const fn is_error(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    String,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
}

/// The numeric subset of primitives, used by conversion classification
/// and constant folding. `Char` participates as an unsigned 16-bit value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Char,
    F32,
    F64,
    Decimal,
}

impl NumericKind {
    pub fn is_integral(&self) -> bool {
        !matches!(self, NumericKind::F32 | NumericKind::F64 | NumericKind::Decimal)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, NumericKind::F32 | NumericKind::F64)
    }
}

/// A user-defined conversion operator declared on a named type.
#[derive(Clone, Debug)]
pub struct ConversionOperator {
    /// Opaque member id supplied by the symbol layer.
    pub member: u32,
    pub is_implicit: bool,
    pub parameter: TypeId,
    pub return_type: TypeId,
}

#[derive(Clone, Debug)]
pub struct NamedTypeData {
    pub name: String,
    pub base: Option<TypeId>,
    pub is_value_type: bool,
    /// Stack-only (ref struct) types are lifetime-tracked by ref safety.
    pub is_ref_like: bool,
    pub is_interface: bool,
    /// Generic arity; `> 0` with no type arguments means an open generic.
    pub arity: u32,
    pub conversion_operators: Vec<ConversionOperator>,
}

#[derive(Clone, Debug)]
pub enum TypeData {
    Error,
    Void,
    Dynamic,
    /// The transient type of the `null` literal.
    Null,
    Primitive(PrimitiveKind),
    Named(NamedTypeData),
    Array { element: TypeId },
    Nullable { underlying: TypeId },
    Delegate { name: String, signature: MethodSignature },
    FunctionPointer { signature: MethodSignature },
}

/// The type table. Built once, then read-only.
#[derive(Debug)]
pub struct TypeInterner {
    types: Vec<TypeData>,
    arrays: FxHashMap<TypeId, TypeId>,
    nullables: FxHashMap<TypeId, TypeId>,
}

impl TypeInterner {
    pub fn new() -> TypeInterner {
        let mut types = Vec::with_capacity(32);
        types.push(TypeData::Error); // ERROR
        types.push(TypeData::Void); // VOID
        types.push(TypeData::Named(NamedTypeData {
            name: "object".to_string(),
            base: None,
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        })); // OBJECT
        types.push(TypeData::Primitive(PrimitiveKind::Bool));
        types.push(TypeData::Primitive(PrimitiveKind::Char));
        types.push(TypeData::Primitive(PrimitiveKind::String));
        types.push(TypeData::Primitive(PrimitiveKind::I8));
        types.push(TypeData::Primitive(PrimitiveKind::I16));
        types.push(TypeData::Primitive(PrimitiveKind::I32));
        types.push(TypeData::Primitive(PrimitiveKind::I64));
        types.push(TypeData::Primitive(PrimitiveKind::U8));
        types.push(TypeData::Primitive(PrimitiveKind::U16));
        types.push(TypeData::Primitive(PrimitiveKind::U32));
        types.push(TypeData::Primitive(PrimitiveKind::U64));
        types.push(TypeData::Primitive(PrimitiveKind::F32));
        types.push(TypeData::Primitive(PrimitiveKind::F64));
        types.push(TypeData::Primitive(PrimitiveKind::Decimal));
        types.push(TypeData::Dynamic);
        types.push(TypeData::Null);
        TypeInterner {
            types,
            arrays: FxHashMap::default(),
            nullables: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        self.types
            .get(id.0 as usize)
            .unwrap_or(&TypeData::Error)
    }

    pub fn add(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(data);
        id
    }

    pub fn add_named(&mut self, data: NamedTypeData) -> TypeId {
        self.add(TypeData::Named(data))
    }

    /// Intern the array type of `element`, deduplicated.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        if let Some(&existing) = self.arrays.get(&element) {
            return existing;
        }
        let id = self.add(TypeData::Array { element });
        self.arrays.insert(element, id);
        id
    }

    /// Intern `underlying?`, deduplicated.
    pub fn nullable_of(&mut self, underlying: TypeId) -> TypeId {
        if let Some(&existing) = self.nullables.get(&underlying) {
            return existing;
        }
        let id = self.add(TypeData::Nullable { underlying });
        self.nullables.insert(underlying, id);
        id
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The already-interned array type of `element`, if one exists. The
    /// checker runs after interning is frozen and cannot mint new types.
    pub fn existing_array_of(&self, element: TypeId) -> Option<TypeId> {
        self.arrays.get(&element).copied()
    }

    /// The already-interned `underlying?`, if one exists.
    pub fn existing_nullable_of(&self, underlying: TypeId) -> Option<TypeId> {
        self.nullables.get(&underlying).copied()
    }

    pub fn name_of(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::Error => "<error>".to_string(),
            TypeData::Void => "void".to_string(),
            TypeData::Dynamic => "dynamic".to_string(),
            TypeData::Null => "<null>".to_string(),
            TypeData::Primitive(kind) => primitive_name(*kind).to_string(),
            TypeData::Named(data) => data.name.clone(),
            TypeData::Array { element } => format!("{}[]", self.name_of(*element)),
            TypeData::Nullable { underlying } => format!("{}?", self.name_of(*underlying)),
            TypeData::Delegate { name, .. } => name.clone(),
            TypeData::FunctionPointer { .. } => "delegate*".to_string(),
        }
    }

    pub fn numeric_kind(&self, id: TypeId) -> Option<NumericKind> {
        match self.get(id) {
            TypeData::Primitive(kind) => match kind {
                PrimitiveKind::I8 => Some(NumericKind::I8),
                PrimitiveKind::I16 => Some(NumericKind::I16),
                PrimitiveKind::I32 => Some(NumericKind::I32),
                PrimitiveKind::I64 => Some(NumericKind::I64),
                PrimitiveKind::U8 => Some(NumericKind::U8),
                PrimitiveKind::U16 => Some(NumericKind::U16),
                PrimitiveKind::U32 => Some(NumericKind::U32),
                PrimitiveKind::U64 => Some(NumericKind::U64),
                PrimitiveKind::Char => Some(NumericKind::Char),
                PrimitiveKind::F32 => Some(NumericKind::F32),
                PrimitiveKind::F64 => Some(NumericKind::F64),
                PrimitiveKind::Decimal => Some(NumericKind::Decimal),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.numeric_kind(id).is_some()
    }

    pub fn is_reference_type(&self, id: TypeId) -> bool {
        match self.get(id) {
            TypeData::Primitive(PrimitiveKind::String) => true,
            TypeData::Named(data) => !data.is_value_type,
            TypeData::Array { .. } | TypeData::Delegate { .. } | TypeData::Dynamic => true,
            _ => false,
        }
    }

    pub fn is_value_type(&self, id: TypeId) -> bool {
        match self.get(id) {
            TypeData::Primitive(kind) => !matches!(kind, PrimitiveKind::String),
            TypeData::Named(data) => data.is_value_type,
            TypeData::Nullable { .. } => true,
            _ => false,
        }
    }

    /// Whether the type is stack-only and therefore lifetime-tracked.
    pub fn is_ref_like(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Named(data) if data.is_ref_like)
    }

    pub fn is_open_generic(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Named(data) if data.arity > 0)
    }

    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeData::Array { element } => Some(*element),
            _ => None,
        }
    }

    pub fn nullable_underlying(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeData::Nullable { underlying } => Some(*underlying),
            _ => None,
        }
    }

    pub fn base_of(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeData::Named(data) => {
                if id == TypeId::OBJECT {
                    None
                } else {
                    Some(data.base.unwrap_or(TypeId::OBJECT))
                }
            }
            // Primitives, arrays, and delegates sit directly under object
            // for subtyping purposes.
            TypeData::Primitive(_) | TypeData::Array { .. } | TypeData::Delegate { .. } => {
                Some(TypeId::OBJECT)
            }
            _ => None,
        }
    }

    /// Walk the base chain: is `sub` equal to or derived from `base`?
    pub fn is_subtype_of(&self, sub: TypeId, base: TypeId) -> bool {
        if sub == base {
            return true;
        }
        let mut current = sub;
        // Base chains are finite; the bound guards corrupt tables.
        for _ in 0..256 {
            match self.base_of(current) {
                Some(parent) => {
                    if parent == base {
                        return true;
                    }
                    current = parent;
                }
                None => return false,
            }
        }
        false
    }

    pub fn delegate_signature(&self, id: TypeId) -> Option<&MethodSignature> {
        match self.get(id) {
            TypeData::Delegate { signature, .. } => Some(signature),
            _ => None,
        }
    }

    pub fn function_pointer_signature(&self, id: TypeId) -> Option<&MethodSignature> {
        match self.get(id) {
            TypeData::FunctionPointer { signature } => Some(signature),
            _ => None,
        }
    }

    pub fn conversion_operators(&self, id: TypeId) -> &[ConversionOperator] {
        match self.get(id) {
            TypeData::Named(data) => &data.conversion_operators,
            _ => &[],
        }
    }
}

impl Default for TypeInterner {
    fn default() -> TypeInterner {
        TypeInterner::new()
    }
}

fn primitive_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Char => "char",
        PrimitiveKind::String => "string",
        PrimitiveKind::I8 => "sbyte",
        PrimitiveKind::I16 => "short",
        PrimitiveKind::I32 => "int",
        PrimitiveKind::I64 => "long",
        PrimitiveKind::U8 => "byte",
        PrimitiveKind::U16 => "ushort",
        PrimitiveKind::U32 => "uint",
        PrimitiveKind::U64 => "ulong",
        PrimitiveKind::F32 => "float",
        PrimitiveKind::F64 => "double",
        PrimitiveKind::Decimal => "decimal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_ids_are_stable() {
        let types = TypeInterner::new();
        assert!(matches!(
            types.get(TypeId::I32),
            TypeData::Primitive(PrimitiveKind::I32)
        ));
        assert!(matches!(types.get(TypeId::DYNAMIC), TypeData::Dynamic));
        assert_eq!(types.name_of(TypeId::STRING), "string");
    }

    #[test]
    fn array_interning_deduplicates() {
        let mut types = TypeInterner::new();
        let a = types.array_of(TypeId::I32);
        let b = types.array_of(TypeId::I32);
        assert_eq!(a, b);
        assert_eq!(types.element_type(a), Some(TypeId::I32));
    }

    #[test]
    fn subtype_walks_base_chain() {
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
        assert!(types.is_subtype_of(derived, base));
        assert!(types.is_subtype_of(derived, TypeId::OBJECT));
        assert!(!types.is_subtype_of(base, derived));
    }
}
