//! Conversion materialization.
//!
//! Classification lives in the solver; this module turns a classified
//! conversion into a bound node, folds constants through it (reporting
//! overflow), and performs the final validation for method-group
//! conversions.

use sable_common::diagnostics::diagnostic_codes as codes;
use sable_solver::convert::{Conversion, ConversionKind, classify_conversion};
use sable_solver::fold::fold_constant_conversion;
use sable_solver::overload::MethodSignature;
use sable_solver::types::TypeId;

use crate::bound::{BoundConversion, BoundExpr, BoundExprKind};
use crate::calls::is_accessible;
use crate::context::CheckerContext;
use sable_binder::{Binder, SymbolId, symbol_flags};

/// Coerce `expr` to `target` with an implicit conversion, reporting
/// `NO_IMPLICIT_CONVERSION` when none exists. `checked` is the effective
/// overflow-checking state at the expression's position.
pub fn coerce(
    ctx: &mut CheckerContext<'_>,
    expr: BoundExpr,
    target: TypeId,
    checked: bool,
) -> BoundExpr {
    convert(ctx, expr, target, checked, false)
}

/// Coerce with an explicit (cast) conversion permitted.
pub fn coerce_explicit(
    ctx: &mut CheckerContext<'_>,
    expr: BoundExpr,
    target: TypeId,
    checked: bool,
) -> BoundExpr {
    convert(ctx, expr, target, checked, true)
}

fn convert(
    ctx: &mut CheckerContext<'_>,
    expr: BoundExpr,
    target: TypeId,
    checked: bool,
    allow_explicit: bool,
) -> BoundExpr {
    if expr.ty == target {
        return expr;
    }
    if expr.has_errors || target.is_error() {
        // Cascading-error suppression: re-type without a new diagnostic.
        return materialize(expr, target, Conversion::identity(), true);
    }

    let conversion = classify_conversion(ctx.types, expr.ty, target, expr.constant.as_ref());
    let usable = conversion.exists() && (allow_explicit || conversion.is_implicit());
    if !usable {
        let from = ctx.types.name_of(expr.ty);
        let to = ctx.types.name_of(target);
        ctx.report(
            codes::NO_IMPLICIT_CONVERSION,
            span_of(ctx, &expr),
            &[&from, &to],
        );
        return materialize(expr, target, conversion, true);
    }

    fold_through(ctx, expr, target, conversion, checked)
}

/// Fold the operand's constant through the conversion and build the
/// bound node. Overflow in a checked context (or with a decimal
/// endpoint) is reported here.
fn fold_through(
    ctx: &mut CheckerContext<'_>,
    expr: BoundExpr,
    target: TypeId,
    conversion: Conversion,
    checked: bool,
) -> BoundExpr {
    let foldable = matches!(
        conversion.kind,
        ConversionKind::Identity
            | ConversionKind::ImplicitNumeric
            | ConversionKind::ExplicitNumeric
            | ConversionKind::ImplicitConstant
    );
    let mut folded = None;
    let mut has_errors = false;
    if foldable && let Some(constant) = &expr.constant {
        match fold_constant_conversion(ctx.types, constant, target, checked) {
            Ok(value) => folded = Some(value),
            Err(_) => {
                let value = constant.to_string();
                let to = ctx.types.name_of(target);
                ctx.report(codes::CONSTANT_OVERFLOW, span_of(ctx, &expr), &[&value, &to]);
                has_errors = true;
            }
        }
    }

    let mut bound = materialize(expr, target, conversion, has_errors);
    bound.constant = folded;
    bound
}

fn materialize(
    expr: BoundExpr,
    target: TypeId,
    conversion: Conversion,
    has_errors: bool,
) -> BoundExpr {
    BoundExpr {
        syntax: expr.syntax,
        ty: target,
        constant: None,
        has_errors: has_errors || expr.has_errors,
        kind: BoundExprKind::Conversion(BoundConversion {
            operand: Box::new(expr),
            conversion,
        }),
    }
}

// =============================================================================
// Method-group conversions
// =============================================================================

/// Convert a method group to a delegate or function-pointer type,
/// running final validation. Failures report
/// `METHOD_GROUP_CONVERSION_INVALID` (or a more specific code) exactly
/// once.
pub fn convert_method_group(
    ctx: &mut CheckerContext<'_>,
    group: BoundExpr,
    target: TypeId,
    binder: &Binder,
) -> BoundExpr {
    let BoundExprKind::MethodGroup {
        ref receiver,
        ref name,
        ref members,
    } = group.kind
    else {
        return BoundExpr::error(group.syntax);
    };

    let signature = ctx
        .types
        .delegate_signature(target)
        .or_else(|| ctx.types.function_pointer_signature(target));
    let Some(signature) = signature else {
        let target_name = ctx.types.name_of(target);
        ctx.report(
            codes::METHOD_GROUP_CONVERSION_INVALID,
            span_of(ctx, &group),
            &[name, &target_name],
        );
        return BoundExpr::error(group.syntax);
    };

    let chosen = members
        .iter()
        .copied()
        .find(|&member| signatures_compatible(ctx, member, signature));
    let Some(method) = chosen else {
        let target_name = ctx.types.name_of(target);
        let name = name.clone();
        ctx.report(
            codes::METHOD_GROUP_CONVERSION_INVALID,
            span_of(ctx, &group),
            &[&name, &target_name],
        );
        return BoundExpr::error(group.syntax);
    };

    if let Some(code) = final_validation_failure(ctx, method, receiver.is_some(), binder) {
        let method_name = ctx.symbols.name_of(method).to_string();
        ctx.report(code, span_of(ctx, &group), &[&method_name]);
        return BoundExpr::error(group.syntax);
    }

    let syntax = group.syntax;
    BoundExpr {
        syntax,
        ty: target,
        constant: None,
        has_errors: group.has_errors,
        kind: BoundExprKind::Conversion(BoundConversion {
            operand: Box::new(group),
            conversion: Conversion::of_kind(ConversionKind::MethodGroup),
        }),
    }
}

/// Delegate compatibility: parameter-for-parameter identity or implicit
/// reference conversion from delegate parameter to method parameter, and
/// the same from method return to delegate return.
fn signatures_compatible(
    ctx: &CheckerContext<'_>,
    member: SymbolId,
    target: &MethodSignature,
) -> bool {
    let Some(symbol) = ctx.symbols.try_get(member) else {
        return false;
    };
    let Some(method_sig) = &symbol.signature else {
        return false;
    };
    if method_sig.parameters.len() != target.parameters.len() {
        return false;
    }
    let param_ok = target.parameters.iter().zip(&method_sig.parameters).all(
        |(delegate_param, method_param)| {
            delegate_param.ref_kind == method_param.ref_kind
                && reference_compatible(ctx, delegate_param.ty, method_param.ty)
        },
    );
    param_ok && reference_compatible(ctx, method_sig.return_type, target.return_type)
}

fn reference_compatible(ctx: &CheckerContext<'_>, from: TypeId, to: TypeId) -> bool {
    if from == to {
        return true;
    }
    let conversion = classify_conversion(ctx.types, from, to, None);
    matches!(
        conversion.kind,
        ConversionKind::Identity | ConversionKind::ImplicitReference
    )
}

/// Final validation shared in spirit with invocation: accessibility,
/// static-vs-instance origin, and constraint satisfaction.
pub(crate) fn final_validation_failure(
    ctx: &CheckerContext<'_>,
    method: SymbolId,
    has_receiver: bool,
    binder: &Binder,
) -> Option<u32> {
    let symbol = ctx.symbols.try_get(method)?;

    if !is_accessible(ctx, method, binder) {
        return Some(codes::INACCESSIBLE_MEMBER);
    }

    // An instance method referenced by bare name requires a non-static
    // caller to supply the implicit receiver.
    if !symbol.is_static() && !has_receiver {
        let caller_static = binder
            .containing_member_or_lambda()
            .and_then(|member| ctx.symbols.try_get(member))
            .is_none_or(|caller| caller.is_static());
        if caller_static {
            return Some(codes::STATIC_INSTANCE_MISMATCH);
        }
    }

    if symbol.has_flag(symbol_flags::PARTIAL_DEFINITION) && symbol.partial_implementation.is_none()
    {
        // A defining-only partial method has no body to call through a
        // delegate.
        return Some(codes::METHOD_GROUP_CONVERSION_INVALID);
    }

    if ctx.types.is_open_generic(symbol.ty) {
        return Some(codes::CONSTRAINTS_NOT_SATISFIED);
    }
    None
}

pub(crate) fn span_of(ctx: &CheckerContext<'_>, expr: &BoundExpr) -> sable_common::TextSpan {
    ctx.arena
        .get(expr.syntax)
        .map(|n| n.span)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestCompilation;
    use sable_solver::ConstantValue;
    use sable_syntax::NodeIndex;

    #[test]
    fn widening_folds_the_constant() {
        let comp = TestCompilation::new();
        let mut ctx = comp.context();
        let expr = BoundExpr::literal(NodeIndex(0), TypeId::I32, ConstantValue::I32(5));
        let bound = coerce(&mut ctx, expr, TypeId::I64, true);
        assert_eq!(bound.ty, TypeId::I64);
        assert_eq!(bound.constant, Some(ConstantValue::I64(5)));
        assert!(!bound.has_errors);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn impossible_conversion_reports_once_and_yields_error_node() {
        let comp = TestCompilation::new();
        let mut ctx = comp.context();
        let expr = BoundExpr::literal(NodeIndex(0), TypeId::BOOLEAN, ConstantValue::Bool(true));
        let bound = coerce(&mut ctx, expr, TypeId::I32, true);
        assert!(bound.has_errors);
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().code,
            codes::NO_IMPLICIT_CONVERSION
        );
    }

    #[test]
    fn erroneous_operand_suppresses_new_diagnostics() {
        let comp = TestCompilation::new();
        let mut ctx = comp.context();
        let expr = BoundExpr::error(NodeIndex(0));
        let bound = coerce(&mut ctx, expr, TypeId::I32, true);
        assert!(bound.has_errors);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn checked_overflow_is_reported_at_the_conversion() {
        let comp = TestCompilation::new();
        let mut ctx = comp.context();
        let expr = BoundExpr::literal(NodeIndex(0), TypeId::I32, ConstantValue::I32(70000));
        let bound = coerce_explicit(&mut ctx, expr, TypeId::I16, true);
        assert!(bound.has_errors);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().code,
            codes::CONSTANT_OVERFLOW
        );
        // Unchecked context truncates instead.
        let mut ctx = comp.context();
        let expr = BoundExpr::literal(NodeIndex(0), TypeId::I32, ConstantValue::I32(70000));
        let bound = coerce_explicit(&mut ctx, expr, TypeId::I16, false);
        assert!(!bound.has_errors);
        assert_eq!(bound.constant, Some(ConstantValue::I16(4464)));
    }
}
