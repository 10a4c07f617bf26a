//! Syntax kind constants and classification helpers.
//!
//! Kinds are plain `u16` constants rather than an enum so that node kind
//! checks stay cheap comparisons and new kinds never break exhaustive
//! matches in downstream crates.

pub mod syntax_kind {
    // Top-level structure
    pub const COMPILATION_UNIT: u16 = 1;
    pub const NAMESPACE_DECLARATION: u16 = 2;
    pub const FILE_SCOPED_NAMESPACE_DECLARATION: u16 = 3;
    pub const USING_DIRECTIVE: u16 = 4;
    pub const EXTERN_ALIAS_DIRECTIVE: u16 = 5;
    pub const GLOBAL_STATEMENT: u16 = 6;

    // Type declarations
    pub const CLASS_DECLARATION: u16 = 10;
    pub const STRUCT_DECLARATION: u16 = 11;
    pub const INTERFACE_DECLARATION: u16 = 12;
    pub const ENUM_DECLARATION: u16 = 13;
    pub const DELEGATE_DECLARATION: u16 = 14;
    pub const BASE_LIST: u16 = 15;

    // Member declarations
    pub const METHOD_DECLARATION: u16 = 20;
    pub const CONSTRUCTOR_DECLARATION: u16 = 21;
    pub const OPERATOR_DECLARATION: u16 = 22;
    pub const CONVERSION_OPERATOR_DECLARATION: u16 = 23;
    pub const PROPERTY_DECLARATION: u16 = 24;
    pub const INDEXER_DECLARATION: u16 = 25;
    pub const ACCESSOR_DECLARATION: u16 = 26;
    pub const FIELD_DECLARATION: u16 = 27;
    pub const ENUM_MEMBER_DECLARATION: u16 = 28;
    pub const PARAMETER_LIST: u16 = 29;
    pub const PARAMETER: u16 = 30;
    pub const TYPE_PARAMETER_LIST: u16 = 31;
    pub const TYPE_PARAMETER: u16 = 32;

    // Statements
    pub const BLOCK: u16 = 40;
    pub const LOCAL_DECLARATION_STATEMENT: u16 = 41;
    pub const LOCAL_FUNCTION_STATEMENT: u16 = 42;
    pub const EXPRESSION_STATEMENT: u16 = 43;
    pub const RETURN_STATEMENT: u16 = 44;
    pub const CHECKED_STATEMENT: u16 = 45;
    pub const UNCHECKED_STATEMENT: u16 = 46;
    pub const UNSAFE_STATEMENT: u16 = 47;
    pub const FOREACH_STATEMENT: u16 = 48;
    pub const SWITCH_STATEMENT: u16 = 49;
    pub const SWITCH_SECTION: u16 = 50;
    pub const CASE_PATTERN_SWITCH_LABEL: u16 = 51;
    pub const DEFAULT_SWITCH_LABEL: u16 = 52;

    // Names and type syntax
    pub const IDENTIFIER_NAME: u16 = 60;
    pub const QUALIFIED_NAME: u16 = 61;
    pub const PREDEFINED_TYPE: u16 = 62;
    pub const ARRAY_TYPE: u16 = 63;
    pub const NULLABLE_TYPE: u16 = 64;

    // Expressions
    pub const LITERAL_EXPRESSION: u16 = 70;
    pub const INTERPOLATED_STRING_EXPRESSION: u16 = 71;
    pub const INTERPOLATION: u16 = 72;
    pub const INTERPOLATED_STRING_TEXT: u16 = 73;
    pub const BINARY_EXPRESSION: u16 = 74;
    pub const ASSIGNMENT_EXPRESSION: u16 = 75;
    pub const INVOCATION_EXPRESSION: u16 = 76;
    pub const MEMBER_ACCESS_EXPRESSION: u16 = 77;
    pub const OBJECT_CREATION_EXPRESSION: u16 = 78;
    pub const OBJECT_INITIALIZER: u16 = 79;
    pub const TUPLE_EXPRESSION: u16 = 80;
    pub const LAMBDA_EXPRESSION: u16 = 81;
    pub const REF_EXPRESSION: u16 = 82;
    pub const ARGUMENT_LIST: u16 = 83;
    pub const ARGUMENT: u16 = 84;
    pub const IS_PATTERN_EXPRESSION: u16 = 85;
    pub const SWITCH_EXPRESSION: u16 = 86;
    pub const SWITCH_EXPRESSION_ARM: u16 = 87;

    // Attributes
    pub const ATTRIBUTE_LIST: u16 = 90;
    pub const ATTRIBUTE: u16 = 91;
    pub const ATTRIBUTE_ARGUMENT_LIST: u16 = 92;
    pub const ATTRIBUTE_ARGUMENT: u16 = 93;

    // Patterns
    pub const CONSTANT_PATTERN: u16 = 100;
    pub const DECLARATION_PATTERN: u16 = 101;
    pub const TYPE_PATTERN: u16 = 102;
    pub const DISCARD_PATTERN: u16 = 103;
    pub const RECURSIVE_PATTERN: u16 = 104;
    pub const SUBPATTERN: u16 = 105;
    pub const LIST_PATTERN: u16 = 106;
    pub const SLICE_PATTERN: u16 = 107;
    pub const RELATIONAL_PATTERN: u16 = 108;
    pub const AND_PATTERN: u16 = 109;
    pub const OR_PATTERN: u16 = 110;
    pub const NOT_PATTERN: u16 = 111;
    pub const PARENTHESIZED_PATTERN: u16 = 112;

    // Documentation cross-references
    pub const DOC_CREF: u16 = 120;
}

use syntax_kind::*;

/// Whether a kind is one of the member-declaration kinds that introduce a
/// member scope (method-like bodies get their own binder layer).
pub fn is_method_like(kind: u16) -> bool {
    matches!(
        kind,
        METHOD_DECLARATION
            | CONSTRUCTOR_DECLARATION
            | OPERATOR_DECLARATION
            | CONVERSION_OPERATOR_DECLARATION
            | ACCESSOR_DECLARATION
            | LOCAL_FUNCTION_STATEMENT
    )
}

/// Whether a kind declares a named type (introduces type parameters and
/// members into scope).
pub fn is_type_declaration(kind: u16) -> bool {
    matches!(
        kind,
        CLASS_DECLARATION
            | STRUCT_DECLARATION
            | INTERFACE_DECLARATION
            | ENUM_DECLARATION
            | DELEGATE_DECLARATION
    )
}

/// Whether a kind is a namespace-like container carrying import directives.
pub fn is_namespace_declaration(kind: u16) -> bool {
    matches!(
        kind,
        NAMESPACE_DECLARATION | FILE_SCOPED_NAMESPACE_DECLARATION
    )
}

/// Whether a kind is one of the pattern kinds.
pub fn is_pattern(kind: u16) -> bool {
    (CONSTANT_PATTERN..=PARENTHESIZED_PATTERN).contains(&kind)
}
