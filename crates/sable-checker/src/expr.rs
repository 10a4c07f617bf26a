//! Expression binding.
//!
//! Turns syntax expressions into bound nodes: name resolution through
//! the binder chain, operator typing with binary numeric promotion,
//! constant folding, and dispatch into invocation, interpolation, and
//! pattern binding. Deep expression trees grow the stack rather than
//! overflow it.

use std::sync::Arc;

use sable_binder::{Binder, BinderKind, SymbolId, SymbolKind};
use sable_common::diagnostics::diagnostic_codes as codes;
use sable_common::limits::{MAX_EXPR_BIND_DEPTH, MIN_REMAINING_STACK_BYTES};
use sable_solver::ConstantValue;
use sable_solver::convert::classify_conversion;
use sable_solver::fold::fold_constant_conversion;
use sable_solver::overload::RefKind;
use sable_solver::types::TypeId;
use sable_syntax::arena::{ArgumentRefKind, BinaryOperator, SyntaxLiteral};
use sable_syntax::kinds::syntax_kind as k;
use sable_syntax::NodeIndex;

use crate::bound::{BoundExpr, BoundExprKind, BoundSwitchArm};
use crate::calls::{self, BoundArgument, ConstructorResolution, node_span};
use crate::context::CheckerContext;
use crate::conversions::coerce;
use crate::interpolation;
use crate::patterns;

const GROWN_STACK_BYTES: usize = 1 << 20;

pub fn bind_expression(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundExpr {
    bind_at_depth(ctx, binder, node, 0)
}

pub(crate) fn bind_at_depth(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    if node.is_none() || depth > MAX_EXPR_BIND_DEPTH {
        return BoundExpr::error(node);
    }
    stacker::maybe_grow(MIN_REMAINING_STACK_BYTES, GROWN_STACK_BYTES, || {
        bind_kind(ctx, binder, node, depth)
    })
}

fn bind_kind(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    match ctx.arena.kind_of(node) {
        k::LITERAL_EXPRESSION => bind_literal(ctx, node),
        k::IDENTIFIER_NAME => bind_identifier(ctx, binder, node),
        k::MEMBER_ACCESS_EXPRESSION => bind_member_access(ctx, binder, node, depth),
        k::BINARY_EXPRESSION => bind_binary(ctx, binder, node, depth),
        k::ASSIGNMENT_EXPRESSION => bind_assignment(ctx, binder, node, depth),
        k::INVOCATION_EXPRESSION => bind_invocation_expr(ctx, binder, node, depth),
        k::OBJECT_CREATION_EXPRESSION => bind_object_creation(ctx, binder, node, depth),
        k::INTERPOLATED_STRING_EXPRESSION => {
            interpolation::bind_interpolated_string(ctx, binder, node)
        }
        k::IS_PATTERN_EXPRESSION => bind_is_pattern(ctx, binder, node, depth),
        k::SWITCH_EXPRESSION => bind_switch_expression(ctx, binder, node, depth),
        k::REF_EXPRESSION => bind_ref(ctx, binder, node, depth),
        k::TUPLE_EXPRESSION => bind_tuple(ctx, binder, node, depth),
        k::LAMBDA_EXPRESSION => bind_lambda(ctx, node),
        _ => BoundExpr::error(node),
    }
}

// =============================================================================
// Literals
// =============================================================================

fn bind_literal(ctx: &mut CheckerContext<'_>, node: NodeIndex) -> BoundExpr {
    let Some(data) = ctx.arena.get_literal(node) else {
        return BoundExpr::error(node);
    };
    let value = match &data.value {
        SyntaxLiteral::Null => ConstantValue::Null,
        SyntaxLiteral::Bool(v) => ConstantValue::Bool(*v),
        SyntaxLiteral::I32(v) => ConstantValue::I32(*v),
        SyntaxLiteral::I64(v) => ConstantValue::I64(*v),
        SyntaxLiteral::U64(v) => ConstantValue::U64(*v),
        SyntaxLiteral::F32(v) => ConstantValue::F32(*v),
        SyntaxLiteral::F64(v) => ConstantValue::F64(*v),
        SyntaxLiteral::Char(v) => ConstantValue::Char(*v),
        SyntaxLiteral::String(v) => ConstantValue::String(Arc::from(v.as_str())),
        SyntaxLiteral::Decimal(v) => {
            // Decimal literals arrive as a lexed double and are folded
            // to the exact representation; out-of-range literals are
            // overflow errors regardless of the checked state.
            let raw = ConstantValue::F64(*v);
            match fold_constant_conversion(ctx.types, &raw, TypeId::DECIMAL, true) {
                Ok(value) => value,
                Err(_) => {
                    let text = raw.to_string();
                    let to = ctx.types.name_of(TypeId::DECIMAL);
                    ctx.report(codes::CONSTANT_OVERFLOW, node_span(ctx, node), &[&text, &to]);
                    return BoundExpr::error(node);
                }
            }
        }
    };
    BoundExpr::literal(node, value.type_id(), value)
}

// =============================================================================
// Names
// =============================================================================

enum Lookup {
    Methods(Vec<SymbolId>),
    Field(SymbolId),
    Property(SymbolId),
    NotFound,
}

fn bind_identifier(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_identifier(node) else {
        return BoundExpr::error(node);
    };
    let name = data.text.as_str();

    for scope in binder.iter() {
        match scope.kind {
            BinderKind::Member { symbol, .. } | BinderKind::EntryPoint { symbol } => {
                // Locals and parameters hang off the member symbol;
                // later declarations shadow earlier ones.
                let found = ctx
                    .symbols
                    .members_of(symbol)
                    .iter()
                    .rev()
                    .copied()
                    .find(|&id| {
                        let s = ctx.symbols.get(id);
                        s.name == name
                            && matches!(s.kind, SymbolKind::Local | SymbolKind::Parameter)
                    });
                if let Some(id) = found {
                    let s = ctx.symbols.get(id);
                    let kind = match s.kind {
                        SymbolKind::Local => BoundExprKind::Local { symbol: id },
                        _ => BoundExprKind::Parameter { symbol: id },
                    };
                    return BoundExpr {
                        syntax: node,
                        ty: s.ty,
                        constant: None,
                        has_errors: false,
                        kind,
                    };
                }
            }
            BinderKind::Container { symbol } => {
                let lookup = match members_named(ctx, symbol, name) {
                    Lookup::NotFound => {
                        let container = ctx.symbols.get(symbol);
                        if container.kind == SymbolKind::NamedType {
                            match ctx.types.base_of(container.ty) {
                                Some(base) => lookup_member(ctx, base, name),
                                None => Lookup::NotFound,
                            }
                        } else {
                            Lookup::NotFound
                        }
                    }
                    hit => hit,
                };
                match lookup {
                    Lookup::Methods(members) => {
                        return method_group(node, None, name.to_string(), members);
                    }
                    Lookup::Field(symbol) => {
                        return member_read(ctx, binder, node, None, symbol, false);
                    }
                    Lookup::Property(symbol) => {
                        return member_read(ctx, binder, node, None, symbol, true);
                    }
                    Lookup::NotFound => {}
                }
            }
            _ => {}
        }
    }
    // Unknown names are the symbol layer's diagnostics, not ours; they
    // surface here only as a silent error node.
    BoundExpr::error(node)
}

fn bind_member_access(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_member_access(node) else {
        return BoundExpr::error(node);
    };
    let name = data.name.clone();
    let receiver_node = data.expression;

    // A value receiver wins over a type of the same name.
    let receiver = bind_at_depth(ctx, binder, receiver_node, depth + 1);
    if receiver.is_dynamic() {
        // Member lookup on dynamic defers entirely to runtime dispatch.
        return BoundExpr {
            syntax: node,
            ty: TypeId::DYNAMIC,
            constant: None,
            has_errors: receiver.has_errors,
            kind: BoundExprKind::MethodGroup {
                receiver: Some(Box::new(receiver)),
                name,
                members: Vec::new(),
            },
        };
    }

    let unresolved = matches!(receiver.kind, BoundExprKind::Error);
    let (receiver, receiver_ty) = if unresolved {
        match resolve_type(ctx, binder, receiver_node) {
            Some(ty) => (None, ty),
            None => return BoundExpr::error(node),
        }
    } else if receiver.has_errors {
        return BoundExpr::error(node);
    } else {
        let ty = receiver.ty;
        (Some(Box::new(receiver)), ty)
    };

    match lookup_member(ctx, receiver_ty, &name) {
        Lookup::Methods(members) => method_group(node, receiver, name, members),
        Lookup::Field(symbol) => member_read(ctx, binder, node, receiver, symbol, false),
        Lookup::Property(symbol) => member_read(ctx, binder, node, receiver, symbol, true),
        Lookup::NotFound => BoundExpr::error(node),
    }
}

fn method_group(
    node: NodeIndex,
    receiver: Option<Box<BoundExpr>>,
    name: String,
    members: Vec<SymbolId>,
) -> BoundExpr {
    // Groups have no type of their own; the consuming context converts
    // or invokes them.
    BoundExpr {
        syntax: node,
        ty: TypeId::ERROR,
        constant: None,
        has_errors: false,
        kind: BoundExprKind::MethodGroup {
            receiver,
            name,
            members,
        },
    }
}

fn member_read(
    ctx: &mut CheckerContext<'_>,
    binder: &Binder,
    node: NodeIndex,
    receiver: Option<Box<BoundExpr>>,
    symbol: SymbolId,
    is_property: bool,
) -> BoundExpr {
    let ty = ctx.symbols.get(symbol).ty;
    let mut has_errors = false;
    if !calls::is_accessible(ctx, symbol, binder) {
        let name = ctx.symbols.name_of(symbol).to_string();
        ctx.report(codes::INACCESSIBLE_MEMBER, node_span(ctx, node), &[&name]);
        has_errors = true;
    }
    let kind = if is_property {
        BoundExprKind::PropertyAccess { receiver, symbol }
    } else {
        BoundExprKind::FieldAccess { receiver, symbol }
    };
    BoundExpr {
        syntax: node,
        ty,
        constant: None,
        has_errors,
        kind,
    }
}

/// Direct members of `container` named `name`, without base-type walk.
fn members_named(ctx: &CheckerContext<'_>, container: SymbolId, name: &str) -> Lookup {
    let mut methods = Vec::new();
    for id in ctx.symbols.find_members(container, name) {
        match ctx.symbols.get(id).kind {
            SymbolKind::Method => methods.push(id),
            SymbolKind::Field => return Lookup::Field(id),
            SymbolKind::Property => return Lookup::Property(id),
            _ => {}
        }
    }
    if methods.is_empty() {
        Lookup::NotFound
    } else {
        Lookup::Methods(methods)
    }
}

/// Member lookup on a type, walking the base chain. Methods from the
/// most derived declaring type shadow base overloads wholesale.
fn lookup_member(ctx: &CheckerContext<'_>, ty: TypeId, name: &str) -> Lookup {
    let mut current = ty;
    for _ in 0..64 {
        if let Some(type_symbol) = ctx.symbols.type_symbol(current) {
            match members_named(ctx, type_symbol, name) {
                Lookup::NotFound => {}
                hit => return hit,
            }
        }
        match ctx.types.base_of(current) {
            Some(base) => current = base,
            None => break,
        }
    }
    Lookup::NotFound
}

// =============================================================================
// Type syntax
// =============================================================================

/// Resolve a type-syntax node to an interned type. Array and nullable
/// forms only resolve when the composed type was interned during setup.
pub(crate) fn resolve_type(
    ctx: &CheckerContext<'_>,
    binder: &Binder,
    node: NodeIndex,
) -> Option<TypeId> {
    match ctx.arena.kind_of(node) {
        k::PREDEFINED_TYPE => {
            let text = &ctx.arena.get_identifier(node)?.text;
            predefined_type_id(text)
        }
        k::IDENTIFIER_NAME => {
            let text = &ctx.arena.get_identifier(node)?.text;
            resolve_named_type(ctx, binder, text)
        }
        k::QUALIFIED_NAME => {
            let name = ctx.arena.name_text(node)?;
            resolve_named_type(ctx, binder, name)
        }
        k::ARRAY_TYPE => {
            let element = resolve_type(ctx, binder, ctx.arena.get_array_type(node)?.element)?;
            ctx.types.existing_array_of(element)
        }
        k::NULLABLE_TYPE => {
            let underlying =
                resolve_type(ctx, binder, ctx.arena.get_nullable_type(node)?.underlying)?;
            ctx.types.existing_nullable_of(underlying)
        }
        _ => None,
    }
}

fn predefined_type_id(keyword: &str) -> Option<TypeId> {
    Some(match keyword {
        "object" => TypeId::OBJECT,
        "void" => TypeId::VOID,
        "bool" => TypeId::BOOLEAN,
        "char" => TypeId::CHAR,
        "string" => TypeId::STRING,
        "sbyte" => TypeId::I8,
        "short" => TypeId::I16,
        "int" => TypeId::I32,
        "long" => TypeId::I64,
        "byte" => TypeId::U8,
        "ushort" => TypeId::U16,
        "uint" => TypeId::U32,
        "ulong" => TypeId::U64,
        "float" => TypeId::F32,
        "double" => TypeId::F64,
        "decimal" => TypeId::DECIMAL,
        "dynamic" => TypeId::DYNAMIC,
        _ => return None,
    })
}

fn resolve_named_type(ctx: &CheckerContext<'_>, binder: &Binder, name: &str) -> Option<TypeId> {
    // Enclosing containers first, then any top-level type of that name.
    for scope in binder.iter() {
        if let BinderKind::Container { symbol } = scope.kind {
            for id in ctx.symbols.find_members(symbol, name) {
                let s = ctx.symbols.get(id);
                if s.kind == SymbolKind::NamedType {
                    return Some(s.ty);
                }
            }
        }
    }
    for index in 0..ctx.symbols.len() {
        let s = ctx.symbols.get(SymbolId(index as u32));
        if s.kind == SymbolKind::NamedType && s.name == name {
            return Some(s.ty);
        }
    }
    None
}

// =============================================================================
// Operators
// =============================================================================

fn bind_binary(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_binary(node) else {
        return BoundExpr::error(node);
    };
    let operator = data.operator;
    let (left_node, right_node) = (data.left, data.right);

    // `$"..." + $"..."` chains lower as one merged sequence.
    if operator == BinaryOperator::Add
        && let Some(leaves) = interpolated_chain(ctx, node)
    {
        return interpolation::bind_chain(ctx, binder, node, &leaves);
    }

    let left = bind_at_depth(ctx, binder, left_node, depth + 1);
    let right = bind_at_depth(ctx, binder, right_node, depth + 1);
    let is_comparison = matches!(
        operator,
        BinaryOperator::Equals
            | BinaryOperator::NotEquals
            | BinaryOperator::LessThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanOrEqual
    );

    if left.is_dynamic() || right.is_dynamic() {
        return binary_node(node, TypeId::DYNAMIC, operator, left, right, None);
    }

    // String concatenation accepts any right-hand operand; non-string
    // operands convert during lowering.
    if operator == BinaryOperator::Add
        && (left.ty == TypeId::STRING || right.ty == TypeId::STRING)
    {
        let constant = match (left.string_constant(), right.string_constant()) {
            (Some(l), Some(r)) => {
                let mut s = String::with_capacity(l.len() + r.len());
                s.push_str(l);
                s.push_str(r);
                Some(ConstantValue::String(Arc::from(s.as_str())))
            }
            _ => None,
        };
        return binary_node(node, TypeId::STRING, operator, left, right, constant);
    }

    let checked = ctx.is_checked(binder.checked_state());
    if let Some(common) = numeric_common_type(ctx, &left, &right) {
        let left = coerce(ctx, left, common, checked);
        let right = coerce(ctx, right, common, checked);
        let result_ty = if is_comparison { TypeId::BOOLEAN } else { common };
        let constant = match (&left.constant, &right.constant) {
            (Some(l), Some(r)) => {
                fold_binary(ctx, operator, l, r, common, node, checked)
            }
            _ => None,
        };
        return binary_node(node, result_ty, operator, left, right, constant);
    }

    if is_comparison && left.ty == right.ty {
        // Identity equality on non-numeric operands (bool, string, char,
        // reference types).
        let constant = match (operator, &left.constant, &right.constant) {
            (BinaryOperator::Equals, Some(l), Some(r)) => Some(ConstantValue::Bool(l == r)),
            (BinaryOperator::NotEquals, Some(l), Some(r)) => Some(ConstantValue::Bool(l != r)),
            _ => None,
        };
        return binary_node(node, TypeId::BOOLEAN, operator, left, right, constant);
    }

    // No common operand type: a single conversion diagnostic against the
    // left operand's type, then degrade.
    let target = left.ty;
    let right = coerce(ctx, right, target, checked);
    let result_ty = if is_comparison { TypeId::BOOLEAN } else { target };
    binary_node(node, result_ty, operator, left, right, None)
}

fn binary_node(
    node: NodeIndex,
    ty: TypeId,
    operator: BinaryOperator,
    left: BoundExpr,
    right: BoundExpr,
    constant: Option<ConstantValue>,
) -> BoundExpr {
    BoundExpr {
        syntax: node,
        ty,
        constant,
        has_errors: left.has_errors || right.has_errors,
        kind: BoundExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

/// Binary numeric promotion: the narrowest of the promoted operand types
/// both operands implicitly convert to.
fn numeric_common_type(
    ctx: &CheckerContext<'_>,
    left: &BoundExpr,
    right: &BoundExpr,
) -> Option<TypeId> {
    if !ctx.types.is_numeric(left.ty) || !ctx.types.is_numeric(right.ty) {
        return None;
    }
    const PROMOTED: [TypeId; 7] = [
        TypeId::I32,
        TypeId::U32,
        TypeId::I64,
        TypeId::U64,
        TypeId::F32,
        TypeId::F64,
        TypeId::DECIMAL,
    ];
    PROMOTED
        .into_iter()
        .find(|&target| implicit_to(ctx, left, target) && implicit_to(ctx, right, target))
}

fn implicit_to(ctx: &CheckerContext<'_>, expr: &BoundExpr, target: TypeId) -> bool {
    if expr.ty == target {
        return true;
    }
    // Promotion works over declared operand types only; a constant that
    // happens to fit a narrower type must not shrink the common type.
    let conversion = classify_conversion(ctx.types, expr.ty, target, None);
    conversion.exists() && conversion.is_implicit()
}

fn fold_binary(
    ctx: &mut CheckerContext<'_>,
    operator: BinaryOperator,
    left: &ConstantValue,
    right: &ConstantValue,
    operand_ty: TypeId,
    node: NodeIndex,
    checked: bool,
) -> Option<ConstantValue> {
    use BinaryOperator::*;

    if matches!(
        operator,
        Equals | NotEquals | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual
    ) {
        let ordering = match (left.as_i128(), right.as_i128()) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => left.as_f64().zip(right.as_f64()).and_then(|(l, r)| l.partial_cmp(&r)),
        }?;
        let result = match operator {
            Equals => ordering.is_eq(),
            NotEquals => ordering.is_ne(),
            LessThan => ordering.is_lt(),
            LessThanOrEqual => ordering.is_le(),
            GreaterThan => ordering.is_gt(),
            GreaterThanOrEqual => ordering.is_ge(),
            _ => unreachable!(),
        };
        return Some(ConstantValue::Bool(result));
    }

    let kind = ctx.types.numeric_kind(operand_ty)?;
    if kind.is_floating() {
        let (l, r) = (left.as_f64()?, right.as_f64()?);
        let value = match operator {
            Add => l + r,
            Subtract => l - r,
            Multiply => l * r,
            Divide => l / r,
            _ => return None,
        };
        return Some(if operand_ty == TypeId::F32 {
            ConstantValue::F32(value as f32)
        } else {
            ConstantValue::F64(value)
        });
    }
    if !kind.is_integral() {
        // Decimal arithmetic is not folded; exactness belongs to the
        // runtime library.
        return None;
    }

    let (l, r) = (left.as_i128()?, right.as_i128()?);
    let value = match operator {
        Add => l.checked_add(r)?,
        Subtract => l.checked_sub(r)?,
        Multiply => l.checked_mul(r)?,
        Divide => {
            if r == 0 {
                return None;
            }
            l / r
        }
        _ => return None,
    };
    match narrow_integral(value, operand_ty, checked) {
        Some(folded) => Some(folded),
        None => {
            let text = value.to_string();
            let to = ctx.types.name_of(operand_ty);
            ctx.report(codes::CONSTANT_OVERFLOW, node_span(ctx, node), &[&text, &to]);
            None
        }
    }
}

/// Narrow a widened integral result back to the operand type: checked
/// contexts reject out-of-range results, unchecked contexts wrap.
fn narrow_integral(value: i128, ty: TypeId, checked: bool) -> Option<ConstantValue> {
    match ty {
        TypeId::I32 => {
            if checked && i32::try_from(value).is_err() {
                None
            } else {
                Some(ConstantValue::I32(value as i32))
            }
        }
        TypeId::U32 => {
            if checked && u32::try_from(value).is_err() {
                None
            } else {
                Some(ConstantValue::U32(value as u32))
            }
        }
        TypeId::I64 => {
            if checked && i64::try_from(value).is_err() {
                None
            } else {
                Some(ConstantValue::I64(value as i64))
            }
        }
        TypeId::U64 => {
            if checked && u64::try_from(value).is_err() {
                None
            } else {
                Some(ConstantValue::U64(value as u64))
            }
        }
        _ => None,
    }
}

fn interpolated_chain(ctx: &CheckerContext<'_>, node: NodeIndex) -> Option<Vec<NodeIndex>> {
    let mut leaves = Vec::new();
    collect_interpolated(ctx, node, &mut leaves)?;
    if leaves.len() >= 2 { Some(leaves) } else { None }
}

fn collect_interpolated(
    ctx: &CheckerContext<'_>,
    node: NodeIndex,
    leaves: &mut Vec<NodeIndex>,
) -> Option<()> {
    match ctx.arena.kind_of(node) {
        k::INTERPOLATED_STRING_EXPRESSION => {
            leaves.push(node);
            Some(())
        }
        k::BINARY_EXPRESSION => {
            let data = ctx.arena.get_binary(node)?;
            if data.operator != BinaryOperator::Add {
                return None;
            }
            let (left, right) = (data.left, data.right);
            collect_interpolated(ctx, left, leaves)?;
            collect_interpolated(ctx, right, leaves)
        }
        _ => None,
    }
}

// =============================================================================
// Assignment, ref, tuples, lambdas
// =============================================================================

fn bind_assignment(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_assignment(node) else {
        return BoundExpr::error(node);
    };
    let is_ref = data.is_ref;
    let (target_node, value_node) = (data.target, data.value);
    let target = bind_at_depth(ctx, binder, target_node, depth + 1);
    let value = bind_at_depth(ctx, binder, value_node, depth + 1);
    // Ref reassignment requires an identity match; ref safety validates
    // the lifetimes separately.
    let value = if is_ref {
        value
    } else {
        let checked = ctx.is_checked(binder.checked_state());
        coerce(ctx, value, target.ty, checked)
    };
    let ty = target.ty;
    BoundExpr {
        syntax: node,
        ty,
        constant: None,
        has_errors: target.has_errors || value.has_errors,
        kind: BoundExprKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
            is_ref,
        },
    }
}

fn bind_ref(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_ref_expr(node) else {
        return BoundExpr::error(node);
    };
    let operand = bind_at_depth(ctx, binder, data.operand, depth + 1);
    BoundExpr {
        syntax: node,
        ty: operand.ty,
        constant: None,
        has_errors: operand.has_errors,
        kind: BoundExprKind::Ref {
            operand: Box::new(operand),
        },
    }
}

fn bind_tuple(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_tuple(node) else {
        return BoundExpr::error(node);
    };
    let element_nodes: Vec<NodeIndex> = data.elements.iter().collect();
    let elements: Vec<BoundExpr> = element_nodes
        .into_iter()
        .map(|e| bind_at_depth(ctx, binder, e, depth + 1))
        .collect();
    let has_errors = elements.iter().any(|e| e.has_errors);
    // Tuple types are not interned; the elements carry their own types
    // and ref safety works element-wise.
    BoundExpr {
        syntax: node,
        ty: TypeId::ERROR,
        constant: None,
        has_errors,
        kind: BoundExprKind::Tuple { elements },
    }
}

fn bind_lambda(ctx: &mut CheckerContext<'_>, node: NodeIndex) -> BoundExpr {
    let Some(data) = ctx.arena.get_lambda(node) else {
        return BoundExpr::error(node);
    };
    // Lambdas stay unconverted until a delegate target supplies the
    // parameter types; until then they carry the error type, which
    // converts to anything without a diagnostic.
    BoundExpr {
        syntax: node,
        ty: TypeId::ERROR,
        constant: None,
        has_errors: false,
        kind: BoundExprKind::Lambda { body: data.body },
    }
}

// =============================================================================
// Invocation and object creation
// =============================================================================

fn bind_invocation_expr(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_invocation(node) else {
        return BoundExpr::error(node);
    };
    let (callee_node, list_node) = (data.expression, data.argument_list);
    let callee = bind_at_depth(ctx, binder, callee_node, depth + 1);
    let args = bind_arguments(ctx, binder, list_node, depth);
    let checked = ctx.is_checked(binder.checked_state());
    calls::bind_invocation(ctx, binder, node, callee, args, checked)
}

fn bind_arguments(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    list: NodeIndex,
    depth: usize,
) -> Vec<BoundArgument> {
    let Some(data) = ctx.arena.get_argument_list(list) else {
        return Vec::new();
    };
    let argument_nodes: Vec<NodeIndex> = data.arguments.iter().collect();
    argument_nodes
        .into_iter()
        .filter_map(|arg_node| {
            let arg = ctx.arena.get_argument(arg_node)?;
            let name = arg.name.clone();
            let ref_kind = argument_ref_kind(arg.ref_kind);
            let expression = arg.expression;
            Some(BoundArgument {
                expr: bind_at_depth(ctx, binder, expression, depth + 1),
                name,
                ref_kind,
            })
        })
        .collect()
}

fn argument_ref_kind(kind: ArgumentRefKind) -> RefKind {
    match kind {
        ArgumentRefKind::None => RefKind::None,
        ArgumentRefKind::Ref => RefKind::Ref,
        ArgumentRefKind::Out => RefKind::Out,
        ArgumentRefKind::In => RefKind::In,
    }
}

fn bind_object_creation(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_object_creation(node) else {
        return BoundExpr::error(node);
    };
    let (ty_node, list_node, initializer_node) = (data.ty, data.argument_list, data.initializer);
    let Some(ty) = resolve_type(ctx, binder, ty_node) else {
        return BoundExpr::error(node);
    };
    let args = bind_arguments(ctx, binder, list_node, depth);
    let checked = ctx.is_checked(binder.checked_state());
    let span = node_span(ctx, node);

    let constructors = ctx
        .symbols
        .type_symbol(ty)
        .map(|s| ctx.symbols.constructors_of(s))
        .unwrap_or_default();

    let (constructor, arguments, expanded, arg_to_param) = if constructors.is_empty() {
        // Types without declared constructors get the implicit
        // parameterless one.
        if args.is_empty() {
            (None, Vec::new(), false, None)
        } else {
            let type_name = ctx.types.name_of(ty);
            let count = args.len().to_string();
            ctx.report(codes::WRONG_ARGUMENT_COUNT, span, &[&type_name, &count]);
            return BoundExpr::error(node);
        }
    } else {
        let type_name = ctx.types.name_of(ty);
        match calls::resolve_constructor(
            ctx,
            binder,
            span,
            &type_name,
            &constructors,
            args,
            checked,
            false,
        ) {
            ConstructorResolution::Success {
                constructor,
                arguments,
                expanded,
                arg_to_param,
            } => (Some(constructor), arguments, expanded, arg_to_param),
            ConstructorResolution::Failure => return BoundExpr::error(node),
        }
    };

    let mut initializers = Vec::new();
    if initializer_node.is_some()
        && let Some(init) = ctx.arena.get_object_initializer(initializer_node)
    {
        let assignment_nodes: Vec<NodeIndex> = init.assignments.iter().collect();
        for assignment in assignment_nodes {
            initializers.push(bind_initializer_assignment(ctx, binder, assignment, ty, depth));
        }
    }

    let has_errors = arguments.iter().any(|a| a.has_errors)
        || initializers.iter().any(|a| a.has_errors);
    BoundExpr {
        syntax: node,
        ty,
        constant: None,
        has_errors,
        kind: BoundExprKind::ObjectCreation {
            constructor,
            arguments,
            expanded,
            arg_to_param,
            initializers,
        },
    }
}

/// `Name = value` inside an object initializer: the target resolves
/// against the created type, not the enclosing scope.
fn bind_initializer_assignment(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    created: TypeId,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_assignment(node) else {
        return BoundExpr::error(node);
    };
    let (target_node, value_node) = (data.target, data.value);
    let value = bind_at_depth(ctx, binder, value_node, depth + 1);

    let member = ctx
        .arena
        .name_text(target_node)
        .map(|name| lookup_member(ctx, created, name))
        .unwrap_or(Lookup::NotFound);
    let target = match member {
        Lookup::Field(symbol) => member_read(ctx, binder, target_node, None, symbol, false),
        Lookup::Property(symbol) => member_read(ctx, binder, target_node, None, symbol, true),
        _ => BoundExpr::error(target_node),
    };

    let checked = ctx.is_checked(binder.checked_state());
    let value = coerce(ctx, value, target.ty, checked);
    let ty = target.ty;
    BoundExpr {
        syntax: node,
        ty,
        constant: None,
        has_errors: target.has_errors || value.has_errors,
        kind: BoundExprKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
            is_ref: false,
        },
    }
}

// =============================================================================
// Patterns
// =============================================================================

fn bind_is_pattern(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_is_pattern(node) else {
        return BoundExpr::error(node);
    };
    let (operand_node, pattern_node) = (data.expression, data.pattern);
    let operand = bind_at_depth(ctx, binder, operand_node, depth + 1);
    let pattern_binder = binder.push(BinderKind::PatternVariables { node });
    let pattern = patterns::bind_pattern(ctx, &pattern_binder, pattern_node, operand.ty);
    patterns::check_is_pattern(ctx, &pattern);
    let has_errors = operand.has_errors || pattern.has_errors;
    BoundExpr {
        syntax: node,
        ty: TypeId::BOOLEAN,
        constant: None,
        has_errors,
        kind: BoundExprKind::IsPattern {
            operand: Box::new(operand),
            pattern: Box::new(pattern),
        },
    }
}

fn bind_switch_expression(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    depth: usize,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_switch_expression(node) else {
        return BoundExpr::error(node);
    };
    let operand_node = data.expression;
    let arm_nodes: Vec<NodeIndex> = data.arms.iter().collect();
    let operand = bind_at_depth(ctx, binder, operand_node, depth + 1);
    let checked = ctx.is_checked(binder.checked_state());

    let mut arms: Vec<BoundSwitchArm> = Vec::with_capacity(arm_nodes.len());
    let mut result_ty: Option<TypeId> = None;
    for arm_node in arm_nodes {
        let Some(arm) = ctx.arena.get_switch_arm(arm_node) else {
            continue;
        };
        let (pattern_node, when_node, value_node) =
            (arm.pattern, arm.when_clause, arm.expression);
        let arm_binder = binder.push(BinderKind::PatternVariables { node: arm_node });
        let pattern = patterns::bind_pattern(ctx, &arm_binder, pattern_node, operand.ty);
        let guard = if when_node.is_some() {
            let bound = bind_at_depth(ctx, &arm_binder, when_node, depth + 1);
            Some(coerce(ctx, bound, TypeId::BOOLEAN, checked))
        } else {
            None
        };
        let value = bind_at_depth(ctx, &arm_binder, value_node, depth + 1);
        // The first arm anchors the result type; later arms convert.
        let value = match result_ty {
            None => {
                result_ty = Some(value.ty);
                value
            }
            Some(ty) => coerce(ctx, value, ty, checked),
        };
        arms.push(BoundSwitchArm {
            syntax: arm_node,
            pattern,
            guard,
            value,
        });
    }

    let cases: Vec<patterns::PatternCase<'_>> = arms
        .iter()
        .map(|arm| patterns::PatternCase {
            pattern: &arm.pattern,
            has_guard: arm.guard.is_some(),
            span: node_span(ctx, arm.syntax),
        })
        .collect();
    patterns::check_cases(ctx, &cases, false);

    let has_errors = operand.has_errors
        || arms.iter().any(|arm| {
            arm.pattern.has_errors
                || arm.value.has_errors
                || arm.guard.as_ref().is_some_and(|g| g.has_errors)
        });
    BoundExpr {
        syntax: node,
        ty: result_ty.unwrap_or(TypeId::ERROR),
        constant: None,
        has_errors,
        kind: BoundExprKind::SwitchExpression {
            operand: Box::new(operand),
            arms,
        },
    }
}
