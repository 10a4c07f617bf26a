//! Diagnostic code constants and message templates.
//!
//! Codes are grouped by subsystem:
//! - 1xxx: attribute binding
//! - 2xxx: conversions and invocation resolution
//! - 3xxx: pattern matching
//! - 4xxx: ref safety
//! - 5xxx: missing well-known members

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    // Attribute binding
    pub const NAMED_ARGUMENT_BEFORE_POSITIONAL: u32 = 1016;
    pub const DUPLICATE_NAMED_ARGUMENT: u32 = 1017;
    pub const BAD_ATTRIBUTE_ARGUMENT: u32 = 1018;
    pub const BAD_NAMED_ARGUMENT_TARGET: u32 = 1019;
    pub const OPEN_GENERIC_IN_ATTRIBUTE: u32 = 1020;
    pub const ARRAY_COVARIANCE_IN_ATTRIBUTE: u32 = 1021;
    pub const NOT_AN_ATTRIBUTE_TYPE: u32 = 1022;

    // Conversions
    pub const NO_IMPLICIT_CONVERSION: u32 = 2029;
    pub const CONSTANT_OVERFLOW: u32 = 2030;
    pub const METHOD_GROUP_CONVERSION_INVALID: u32 = 2031;
    pub const INACCESSIBLE_MEMBER: u32 = 2032;
    pub const STATIC_INSTANCE_MISMATCH: u32 = 2033;
    pub const CONSTRAINTS_NOT_SATISFIED: u32 = 2034;

    // Invocation
    pub const NOT_INVOCABLE: u32 = 2040;
    pub const NO_APPLICABLE_OVERLOAD: u32 = 2041;
    pub const AMBIGUOUS_CALL: u32 = 2042;
    pub const WRONG_ARGUMENT_COUNT: u32 = 2043;
    pub const DYNAMIC_LOCAL_FUNCTION_PARAMS: u32 = 2044;
    pub const DYNAMIC_LOCAL_FUNCTION_INFERENCE: u32 = 2045;
    pub const EXTENSION_RECEIVER_NOT_REFERENCEABLE: u32 = 2046;

    // Interpolated strings
    pub const MIXED_APPEND_RETURNS: u32 = 2050;
    pub const REF_STRUCT_INTERPOLATION_HOLE: u32 = 2051;

    // Patterns
    pub const REDUNDANT_PATTERN: u32 = 3010;
    pub const SWITCH_CASE_SUBSUMED: u32 = 3011;
    pub const PATTERN_TOO_DEEP: u32 = 3012;

    // Ref safety
    pub const ESCAPES_DECLARATION_SCOPE: u32 = 4007;
    pub const REF_ASSIGN_NARROWER_LIFETIME: u32 = 4008;

    // Well-known members
    pub const MISSING_WELL_KNOWN_TYPE: u32 = 5001;
}

use DiagnosticCategory::{Error, Hidden, Warning};
use diagnostic_codes as codes;

pub const DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: codes::NAMED_ARGUMENT_BEFORE_POSITIONAL,
        category: Error,
        message: "Positional argument cannot follow a named argument",
    },
    DiagnosticMessage {
        code: codes::DUPLICATE_NAMED_ARGUMENT,
        category: Error,
        message: "Named argument '{0}' is specified more than once",
    },
    DiagnosticMessage {
        code: codes::BAD_ATTRIBUTE_ARGUMENT,
        category: Error,
        message: "An attribute argument must be a constant expression, a type reference, or an array of those",
    },
    DiagnosticMessage {
        code: codes::BAD_NAMED_ARGUMENT_TARGET,
        category: Error,
        message: "'{0}' is not a valid named attribute argument target; it must be a public read-write instance field or property",
    },
    DiagnosticMessage {
        code: codes::OPEN_GENERIC_IN_ATTRIBUTE,
        category: Error,
        message: "An attribute argument cannot use an open generic type",
    },
    DiagnosticMessage {
        code: codes::ARRAY_COVARIANCE_IN_ATTRIBUTE,
        category: Error,
        message: "An attribute array argument cannot rely on array covariance",
    },
    DiagnosticMessage {
        code: codes::NOT_AN_ATTRIBUTE_TYPE,
        category: Error,
        message: "'{0}' is not an attribute type",
    },
    DiagnosticMessage {
        code: codes::NO_IMPLICIT_CONVERSION,
        category: Error,
        message: "Cannot implicitly convert type '{0}' to '{1}'",
    },
    DiagnosticMessage {
        code: codes::CONSTANT_OVERFLOW,
        category: Error,
        message: "Constant value '{0}' cannot be converted to a '{1}'",
    },
    DiagnosticMessage {
        code: codes::METHOD_GROUP_CONVERSION_INVALID,
        category: Error,
        message: "Cannot convert method group '{0}' to '{1}'",
    },
    DiagnosticMessage {
        code: codes::INACCESSIBLE_MEMBER,
        category: Error,
        message: "'{0}' is inaccessible due to its protection level",
    },
    DiagnosticMessage {
        code: codes::STATIC_INSTANCE_MISMATCH,
        category: Error,
        message: "An object reference is required for the non-static member '{0}'",
    },
    DiagnosticMessage {
        code: codes::CONSTRAINTS_NOT_SATISFIED,
        category: Error,
        message: "The type arguments for '{0}' do not satisfy its constraints",
    },
    DiagnosticMessage {
        code: codes::NOT_INVOCABLE,
        category: Error,
        message: "Expression '{0}' does not denote an invocable member",
    },
    DiagnosticMessage {
        code: codes::NO_APPLICABLE_OVERLOAD,
        category: Error,
        message: "No overload of '{0}' matches this call; candidates: {1}",
    },
    DiagnosticMessage {
        code: codes::AMBIGUOUS_CALL,
        category: Error,
        message: "The call to '{0}' is ambiguous between: {1}",
    },
    DiagnosticMessage {
        code: codes::WRONG_ARGUMENT_COUNT,
        category: Error,
        message: "No overload of '{0}' takes {1} arguments",
    },
    DiagnosticMessage {
        code: codes::DYNAMIC_LOCAL_FUNCTION_PARAMS,
        category: Error,
        message: "Dynamic arguments to local function '{0}' are ambiguous with its params parameter",
    },
    DiagnosticMessage {
        code: codes::DYNAMIC_LOCAL_FUNCTION_INFERENCE,
        category: Error,
        message: "Type inference for local function '{0}' cannot depend on a dynamic argument",
    },
    DiagnosticMessage {
        code: codes::EXTENSION_RECEIVER_NOT_REFERENCEABLE,
        category: Error,
        message: "The receiver of extension method '{0}' must be an assignable variable",
    },
    DiagnosticMessage {
        code: codes::MIXED_APPEND_RETURNS,
        category: Error,
        message: "Interpolation builder '{0}' mixes void-returning and bool-returning append methods",
    },
    DiagnosticMessage {
        code: codes::REF_STRUCT_INTERPOLATION_HOLE,
        category: Error,
        message: "A value of the ref struct type '{0}' can only be interpolated through a builder",
    },
    DiagnosticMessage {
        code: codes::REDUNDANT_PATTERN,
        category: Hidden,
        message: "The pattern is redundant; it has already been handled",
    },
    DiagnosticMessage {
        code: codes::SWITCH_CASE_SUBSUMED,
        category: Error,
        message: "The switch case is unreachable; it has already been handled by a previous case",
    },
    DiagnosticMessage {
        code: codes::PATTERN_TOO_DEEP,
        category: Warning,
        message: "The pattern is too deeply nested to analyze for redundancy",
    },
    DiagnosticMessage {
        code: codes::ESCAPES_DECLARATION_SCOPE,
        category: Error,
        message: "Cannot use '{0}' in this context because it may expose values outside of their declaration scope",
    },
    DiagnosticMessage {
        code: codes::REF_ASSIGN_NARROWER_LIFETIME,
        category: Error,
        message: "Cannot ref-assign '{0}' to '{1}' because '{0}' has a narrower escape scope",
    },
    DiagnosticMessage {
        code: codes::MISSING_WELL_KNOWN_TYPE,
        category: Error,
        message: "The required type '{0}' is not defined or imported",
    },
];
