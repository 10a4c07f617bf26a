//! The bound tree.
//!
//! Bound nodes mirror syntax but carry resolved types, symbols, and
//! constant values. Trees are built bottom-up and immutable once built.
//! `has_errors` propagates monotonically upward: a parent with an
//! erroneous child is itself erroneous, which producers consult before
//! emitting new diagnostics about that child.

use std::sync::Arc;

use sable_binder::SymbolId;
use sable_solver::ConstantValue;
use sable_solver::convert::Conversion;
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;
use sable_syntax::arena::{BinaryOperator, RelationalOperator};

#[derive(Clone, Debug)]
pub struct BoundExpr {
    pub syntax: NodeIndex,
    pub ty: TypeId,
    pub constant: Option<ConstantValue>,
    pub has_errors: bool,
    pub kind: BoundExprKind,
}

#[derive(Clone, Debug)]
pub enum BoundExprKind {
    /// Placeholder for unbindable syntax; always carries the error type.
    Error,
    Literal,
    Local {
        symbol: SymbolId,
    },
    Parameter {
        symbol: SymbolId,
    },
    FieldAccess {
        receiver: Option<Box<BoundExpr>>,
        symbol: SymbolId,
    },
    PropertyAccess {
        receiver: Option<Box<BoundExpr>>,
        symbol: SymbolId,
    },
    /// An unresolved reference to an overloaded member group. Converted
    /// to a call or a delegate by the consuming context.
    MethodGroup {
        receiver: Option<Box<BoundExpr>>,
        name: String,
        members: Vec<SymbolId>,
    },
    Call(BoundCall),
    /// A call deferred entirely to runtime dispatch, carrying the
    /// statically applicable candidate set as a hint.
    DynamicCall {
        receiver: Option<Box<BoundExpr>>,
        name: String,
        arguments: Vec<BoundExpr>,
        applicable_members: Vec<u32>,
    },
    ObjectCreation {
        constructor: Option<SymbolId>,
        arguments: Vec<BoundExpr>,
        expanded: bool,
        arg_to_param: Option<Vec<usize>>,
        /// Member assignments from an object initializer, in source order.
        initializers: Vec<BoundExpr>,
    },
    Conversion(BoundConversion),
    Binary {
        operator: BinaryOperator,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    Assignment {
        target: Box<BoundExpr>,
        value: Box<BoundExpr>,
        is_ref: bool,
    },
    Ref {
        operand: Box<BoundExpr>,
    },
    Tuple {
        elements: Vec<BoundExpr>,
    },
    Lambda {
        body: NodeIndex,
    },
    InterpolatedString(Box<BoundInterpolation>),
    IsPattern {
        operand: Box<BoundExpr>,
        pattern: Box<BoundPattern>,
    },
    SwitchExpression {
        operand: Box<BoundExpr>,
        arms: Vec<BoundSwitchArm>,
    },
}

#[derive(Clone, Debug)]
pub struct BoundCall {
    pub receiver: Option<Box<BoundExpr>>,
    pub method: SymbolId,
    pub arguments: Vec<BoundExpr>,
    /// The method matched in params-expanded form.
    pub expanded: bool,
    /// Argument-to-parameter map; absent when arguments already match
    /// parameter order one to one.
    pub arg_to_param: Option<Vec<usize>>,
}

#[derive(Clone, Debug)]
pub struct BoundConversion {
    pub operand: Box<BoundExpr>,
    pub conversion: Conversion,
}

#[derive(Clone, Debug)]
pub struct BoundSwitchArm {
    pub syntax: NodeIndex,
    pub pattern: BoundPattern,
    pub guard: Option<BoundExpr>,
    pub value: BoundExpr,
}

impl BoundExpr {
    pub fn error(syntax: NodeIndex) -> BoundExpr {
        BoundExpr {
            syntax,
            ty: TypeId::ERROR,
            constant: None,
            has_errors: true,
            kind: BoundExprKind::Error,
        }
    }

    pub fn literal(syntax: NodeIndex, ty: TypeId, value: ConstantValue) -> BoundExpr {
        BoundExpr {
            syntax,
            ty,
            constant: Some(value),
            has_errors: false,
            kind: BoundExprKind::Literal,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.ty == TypeId::DYNAMIC
    }

    /// A string-typed compile-time constant, if this expression is one.
    pub fn string_constant(&self) -> Option<&Arc<str>> {
        match &self.constant {
            Some(ConstantValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

// =============================================================================
// Interpolated strings
// =============================================================================

/// One part of an interpolated string, bound but not yet lowered.
#[derive(Clone, Debug)]
pub enum BoundInterpolationPart {
    Text {
        syntax: NodeIndex,
        text: String,
    },
    Hole {
        syntax: NodeIndex,
        value: BoundExpr,
        alignment: Option<BoundExpr>,
        format: Option<String>,
    },
}

impl BoundInterpolationPart {
    pub fn has_errors(&self) -> bool {
        match self {
            BoundInterpolationPart::Text { .. } => false,
            BoundInterpolationPart::Hole {
                value, alignment, ..
            } => value.has_errors || alignment.as_ref().is_some_and(|a| a.has_errors),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterpolationStrategy {
    Constant,
    Concatenation,
    Builder,
    FormatString,
}

#[derive(Clone, Debug)]
pub enum BoundInterpolation {
    /// The whole literal folded to one string constant.
    Constant { value: Arc<str> },
    /// Flat concatenation call list, in source order.
    Concatenation { operands: Vec<BoundExpr> },
    /// Append-call sequence against the builder type.
    Builder { appends: Vec<BuilderAppend> },
    /// Format template plus positional arguments.
    FormatString {
        template: String,
        arguments: Vec<BoundExpr>,
    },
}

impl BoundInterpolation {
    pub fn strategy(&self) -> InterpolationStrategy {
        match self {
            BoundInterpolation::Constant { .. } => InterpolationStrategy::Constant,
            BoundInterpolation::Concatenation { .. } => InterpolationStrategy::Concatenation,
            BoundInterpolation::Builder { .. } => InterpolationStrategy::Builder,
            BoundInterpolation::FormatString { .. } => InterpolationStrategy::FormatString,
        }
    }
}

#[derive(Clone, Debug)]
pub enum BuilderAppend {
    Literal {
        text: String,
        /// The append member returns bool, requiring a short-circuiting
        /// chain.
        returns_bool: bool,
    },
    Formatted {
        value: BoundExpr,
        alignment: Option<BoundExpr>,
        format: Option<String>,
        returns_bool: bool,
    },
}

impl BuilderAppend {
    pub fn returns_bool(&self) -> bool {
        match self {
            BuilderAppend::Literal { returns_bool, .. }
            | BuilderAppend::Formatted { returns_bool, .. } => *returns_bool,
        }
    }
}

// =============================================================================
// Patterns
// =============================================================================

#[derive(Clone, Debug)]
pub struct BoundPattern {
    pub syntax: NodeIndex,
    /// The static type the pattern is tested against.
    pub input_type: TypeId,
    /// The statically known narrower type assuming the pattern matched.
    /// Always assignable to `input_type`.
    pub narrowed_type: TypeId,
    pub has_errors: bool,
    /// Introduced by normalization rather than written by the user;
    /// redundancies confined to synthesized nodes are not reported.
    pub synthesized: bool,
    pub kind: BoundPatternKind,
}

#[derive(Clone, Debug)]
pub enum BoundPatternKind {
    Constant {
        value: ConstantValue,
    },
    Type {
        ty: TypeId,
    },
    Declaration {
        ty: TypeId,
        variable: Option<SymbolId>,
    },
    Discard,
    Recursive {
        ty: TypeId,
        positional: Vec<BoundPattern>,
        properties: Vec<(String, BoundPattern)>,
        variable: Option<SymbolId>,
    },
    List {
        elements: Vec<BoundPattern>,
        /// Index of the single slice element, if present.
        slice: Option<usize>,
    },
    Relational {
        operator: RelationalOperator,
        value: ConstantValue,
    },
    Binary {
        is_conjunction: bool,
        left: Box<BoundPattern>,
        right: Box<BoundPattern>,
    },
    Negated {
        operand: Box<BoundPattern>,
    },
    Error,
}

impl BoundPattern {
    pub fn error(syntax: NodeIndex, input_type: TypeId) -> BoundPattern {
        BoundPattern {
            syntax,
            input_type,
            narrowed_type: TypeId::ERROR,
            has_errors: true,
            synthesized: false,
            kind: BoundPatternKind::Error,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.kind, BoundPatternKind::Binary { .. })
    }
}

// =============================================================================
// Statements (consumed by ref-safety analysis)
// =============================================================================

#[derive(Clone, Debug)]
pub struct BoundStatement {
    pub syntax: NodeIndex,
    pub kind: BoundStatementKind,
}

#[derive(Clone, Debug)]
pub enum BoundStatementKind {
    Block(Vec<BoundStatement>),
    LocalDecl {
        symbol: SymbolId,
        initializer: Option<BoundExpr>,
        is_ref: bool,
    },
    Expression(BoundExpr),
    Return {
        expression: Option<BoundExpr>,
        is_ref: bool,
    },
    /// A nested lambda or local function; analyzed independently.
    NestedFunction {
        symbol: SymbolId,
        body: Box<BoundStatement>,
    },
    Foreach {
        variable: SymbolId,
        collection: BoundExpr,
        body: Box<BoundStatement>,
    },
    Switch {
        operand: BoundExpr,
        sections: Vec<BoundSwitchSection>,
    },
}

/// One `case ...:` section of a switch statement: its pattern labels
/// with optional guards, then the section body.
#[derive(Clone, Debug)]
pub struct BoundSwitchSection {
    pub syntax: NodeIndex,
    pub cases: Vec<(BoundPattern, Option<BoundExpr>)>,
    pub statements: Vec<BoundStatement>,
}

// =============================================================================
// Attributes
// =============================================================================

/// A fully folded attribute argument, the only shapes with a metadata
/// representation.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedConstant {
    Primitive { ty: TypeId, value: ConstantValue },
    Type { value: TypeId },
    Array { values: Vec<TypedConstant> },
    Error,
}

impl TypedConstant {
    pub fn is_error(&self) -> bool {
        matches!(self, TypedConstant::Error)
    }
}

/// The persistence form of a bound attribute: constructor arguments in
/// declaration order, everything folded to constants.
#[derive(Clone, Debug)]
pub struct AttributeData {
    pub attribute_type: TypeId,
    pub constructor: Option<SymbolId>,
    pub constructor_arguments: Vec<TypedConstant>,
    pub named_arguments: Vec<(String, TypedConstant)>,
    /// The attribute type carries a condition symbol that is undefined
    /// in this compilation.
    pub conditionally_omitted: bool,
    pub has_errors: bool,
}

/// The diagnostic form: full expression detail in original syntactic
/// order.
#[derive(Clone, Debug)]
pub struct BoundAttribute {
    pub syntax: NodeIndex,
    pub attribute_type: TypeId,
    pub constructor: Option<SymbolId>,
    pub arguments: Vec<BoundExpr>,
    /// `(name, resolved member, value)` per named assignment; the member
    /// is absent when targeting failed (an error placeholder).
    pub named_assignments: Vec<(String, Option<SymbolId>, BoundExpr)>,
    pub expanded: bool,
    pub arg_to_param: Option<Vec<usize>>,
    pub has_errors: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_expression_is_marked() {
        let e = BoundExpr::error(NodeIndex(0));
        assert!(e.has_errors);
        assert_eq!(e.ty, TypeId::ERROR);
    }

    #[test]
    fn string_constant_extraction() {
        let e = BoundExpr::literal(
            NodeIndex(0),
            TypeId::STRING,
            ConstantValue::String("hi".into()),
        );
        assert_eq!(e.string_constant().map(|s| &**s), Some("hi"));
        let n = BoundExpr::literal(NodeIndex(1), TypeId::I32, ConstantValue::I32(1));
        assert!(n.string_constant().is_none());
    }
}
