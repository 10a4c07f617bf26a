//! Invocation binding.
//!
//! Classifies the invoked expression (method group, delegate value,
//! function pointer, dynamic), runs overload resolution over the
//! adapted candidate set, and materializes the bound call with coerced,
//! reordered arguments. Dynamic arguments re-route the call to a
//! runtime-dispatch node carrying the statically applicable candidates,
//! except for local functions, which bind argument by argument.

use std::sync::Arc;

use sable_binder::{Accessibility, Binder, SymbolId, symbol_flags};
use sable_common::TextSpan;
use sable_common::diagnostics::diagnostic_codes as codes;
use sable_solver::overload::{
    ArgumentInfo, FailureReason, MethodSignature, OverloadCandidate, OverloadResult, RefKind,
    resolve_overloads, statically_applicable,
};
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;

use crate::bound::{BoundCall, BoundExpr, BoundExprKind};
use crate::context::CheckerContext;
use crate::conversions::{coerce, final_validation_failure};
use crate::expr;

/// One bound argument with its call-site trappings.
#[derive(Debug)]
pub struct BoundArgument {
    pub expr: BoundExpr,
    pub name: Option<String>,
    pub ref_kind: RefKind,
}

impl BoundArgument {
    pub fn positional(expr: BoundExpr) -> BoundArgument {
        BoundArgument {
            expr,
            name: None,
            ref_kind: RefKind::None,
        }
    }
}

pub fn bind_invocation(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    syntax: NodeIndex,
    callee: BoundExpr,
    args: Vec<BoundArgument>,
    checked: bool,
) -> BoundExpr {
    let span = node_span(ctx, syntax);

    match callee.kind {
        BoundExprKind::MethodGroup { .. } => {
            bind_method_group_call(ctx, binder, syntax, span, callee, args, checked)
        }
        _ if callee.is_dynamic() => {
            // A dynamic value invoked directly: everything defers to the
            // runtime binder.
            let arguments = args.into_iter().map(|a| a.expr).collect();
            BoundExpr {
                syntax,
                ty: TypeId::DYNAMIC,
                constant: None,
                has_errors: callee.has_errors,
                kind: BoundExprKind::DynamicCall {
                    receiver: Some(Box::new(callee)),
                    name: String::new(),
                    arguments,
                    applicable_members: Vec::new(),
                },
            }
        }
        _ => {
            let signature = ctx
                .types
                .delegate_signature(callee.ty)
                .or_else(|| ctx.types.function_pointer_signature(callee.ty))
                .cloned();
            match signature {
                Some(signature) => {
                    bind_signature_call(ctx, binder, syntax, span, callee, signature, args, checked)
                }
                None => {
                    if !callee.has_errors {
                        let name = ctx.types.name_of(callee.ty);
                        ctx.report(codes::NOT_INVOCABLE, span, &[&name]);
                    }
                    BoundExpr::error(syntax)
                }
            }
        }
    }
}

// =============================================================================
// Method groups
// =============================================================================

fn bind_method_group_call(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    syntax: NodeIndex,
    span: TextSpan,
    group: BoundExpr,
    args: Vec<BoundArgument>,
    checked: bool,
) -> BoundExpr {
    let BoundExprKind::MethodGroup {
        receiver,
        name,
        members,
    } = group.kind
    else {
        return BoundExpr::error(syntax);
    };

    // A dynamic receiver defers the whole call to runtime dispatch.
    if receiver.as_deref().is_some_and(BoundExpr::is_dynamic) {
        let arguments = args.into_iter().map(|a| a.expr).collect();
        return BoundExpr {
            syntax,
            ty: TypeId::DYNAMIC,
            constant: None,
            has_errors: group.has_errors,
            kind: BoundExprKind::DynamicCall {
                receiver,
                name,
                arguments,
                applicable_members: Vec::new(),
            },
        };
    }

    let candidates = to_candidates(ctx, &members);
    let infos = argument_infos(&args);
    let any_dynamic = infos.iter().any(ArgumentInfo::is_dynamic);

    match resolve_overloads(ctx.types, &candidates, &infos) {
        OverloadResult::Success(success) => {
            let method = SymbolId(candidates[success.index].member);
            let symbol = ctx.symbols.get(method).clone();

            if any_dynamic {
                if symbol.has_flag(symbol_flags::LOCAL_FUNCTION) {
                    // Local functions cannot be re-dispatched at runtime;
                    // two shapes have no static fallback either.
                    if success.expanded {
                        ctx.report(codes::DYNAMIC_LOCAL_FUNCTION_PARAMS, span, &[&symbol.name]);
                        return BoundExpr::error(syntax);
                    }
                    if ctx.types.is_open_generic(symbol.ty) {
                        ctx.report(
                            codes::DYNAMIC_LOCAL_FUNCTION_INFERENCE,
                            span,
                            &[&symbol.name],
                        );
                        return BoundExpr::error(syntax);
                    }
                    // Otherwise bind argument by argument below.
                } else if !symbol.is_extension() {
                    let applicable = statically_applicable(ctx.types, &candidates, &infos);
                    let arguments = args.into_iter().map(|a| a.expr).collect();
                    return BoundExpr {
                        syntax,
                        ty: TypeId::DYNAMIC,
                        constant: None,
                        has_errors: false,
                        kind: BoundExprKind::DynamicCall {
                            receiver,
                            name,
                            arguments,
                            applicable_members: applicable,
                        },
                    };
                }
            }

            let mut has_errors = false;
            if let Some(code) = final_validation_failure(ctx, method, receiver.is_some(), binder) {
                ctx.report(code, span, &[&symbol.name]);
                has_errors = true;
            }

            if symbol.is_extension()
                && let Some(signature) = &symbol.signature
                && signature
                    .parameters
                    .first()
                    .is_some_and(|p| matches!(p.ref_kind, RefKind::Ref | RefKind::In))
                && !receiver.as_deref().is_none_or(is_referenceable)
            {
                ctx.report(codes::EXTENSION_RECEIVER_NOT_REFERENCEABLE, span, &[&symbol.name]);
                has_errors = true;
            }

            let signature = symbol.signature.clone().unwrap_or_else(|| {
                MethodSignature::new(Vec::new(), TypeId::ERROR)
            });
            let arguments = coerce_arguments(
                ctx,
                &signature,
                args,
                success.arg_to_param.as_deref(),
                success.expanded,
                checked,
            );
            let has_errors = has_errors || arguments.iter().any(|a| a.has_errors);
            BoundExpr {
                syntax,
                ty: signature.return_type,
                constant: None,
                has_errors,
                kind: BoundExprKind::Call(BoundCall {
                    receiver,
                    method,
                    arguments,
                    expanded: success.expanded,
                    arg_to_param: success.arg_to_param,
                }),
            }
        }
        OverloadResult::NoApplicable(failures) => {
            // With erroneous arguments the call site stays quiet; the
            // arguments already carry their own diagnostics.
            if !args.iter().any(|a| a.expr.has_errors) {
                let all_count = failures
                    .iter()
                    .all(|f| f.reason == FailureReason::ArgumentCount);
                if all_count && !failures.is_empty() {
                    let count = args.len().to_string();
                    ctx.report(codes::WRONG_ARGUMENT_COUNT, span, &[&name, &count]);
                } else {
                    let listing = describe_candidates(ctx, &members);
                    ctx.report(codes::NO_APPLICABLE_OVERLOAD, span, &[&name, &listing]);
                }
            }
            rebind_unconverted_lambdas(ctx, binder, &args);
            BoundExpr::error(syntax)
        }
        OverloadResult::Ambiguous(tied) => {
            if any_dynamic {
                // Several candidates remain applicable; let the runtime
                // binder pick among them.
                let applicable = statically_applicable(ctx.types, &candidates, &infos);
                let arguments = args.into_iter().map(|a| a.expr).collect();
                return BoundExpr {
                    syntax,
                    ty: TypeId::DYNAMIC,
                    constant: None,
                    has_errors: false,
                    kind: BoundExprKind::DynamicCall {
                        receiver,
                        name,
                        arguments,
                        applicable_members: applicable,
                    },
                };
            }
            let tied_members: Vec<SymbolId> = tied
                .into_iter()
                .map(|i| SymbolId(candidates[i].member))
                .collect();
            let listing = describe_candidates(ctx, &tied_members);
            ctx.report(codes::AMBIGUOUS_CALL, span, &[&name, &listing]);
            BoundExpr::error(syntax)
        }
    }
}

// =============================================================================
// Delegates and function pointers
// =============================================================================

fn bind_signature_call(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    syntax: NodeIndex,
    span: TextSpan,
    callee: BoundExpr,
    signature: MethodSignature,
    args: Vec<BoundArgument>,
    checked: bool,
) -> BoundExpr {
    let candidate = OverloadCandidate {
        member: 0,
        signature: signature.clone(),
    };
    let infos = argument_infos(&args);
    match resolve_overloads(ctx.types, std::slice::from_ref(&candidate), &infos) {
        OverloadResult::Success(success) => {
            let arguments = coerce_arguments(
                ctx,
                &signature,
                args,
                success.arg_to_param.as_deref(),
                success.expanded,
                checked,
            );
            let has_errors = callee.has_errors || arguments.iter().any(|a| a.has_errors);
            BoundExpr {
                syntax,
                ty: signature.return_type,
                constant: None,
                has_errors,
                kind: BoundExprKind::Call(BoundCall {
                    receiver: Some(Box::new(callee)),
                    method: SymbolId::NONE,
                    arguments,
                    expanded: success.expanded,
                    arg_to_param: success.arg_to_param,
                }),
            }
        }
        _ => {
            if !args.iter().any(|a| a.expr.has_errors) && !callee.has_errors {
                let name = ctx.types.name_of(callee.ty);
                let count = args.len().to_string();
                ctx.report(codes::WRONG_ARGUMENT_COUNT, span, &[&name, &count]);
            }
            rebind_unconverted_lambdas(ctx, binder, &args);
            BoundExpr::error(syntax)
        }
    }
}

// =============================================================================
// Constructors (shared with object creation and attributes)
// =============================================================================

pub(crate) enum ConstructorResolution {
    Success {
        constructor: SymbolId,
        arguments: Vec<BoundExpr>,
        expanded: bool,
        arg_to_param: Option<Vec<usize>>,
    },
    Failure,
}

/// Resolve a constructor call against `constructors`, reporting failures
/// against `type_name`. `allow_protected` admits protected constructors
/// (attribute binding allows base-type constructors normal construction
/// does not).
pub(crate) fn resolve_constructor(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    span: TextSpan,
    type_name: &str,
    constructors: &[SymbolId],
    args: Vec<BoundArgument>,
    checked: bool,
    allow_protected: bool,
) -> ConstructorResolution {
    let candidates = to_candidates(ctx, constructors);
    let infos = argument_infos(&args);
    match resolve_overloads(ctx.types, &candidates, &infos) {
        OverloadResult::Success(success) => {
            let constructor = SymbolId(candidates[success.index].member);
            let symbol = ctx.symbols.get(constructor).clone();
            let accessible = is_accessible(ctx, constructor, binder)
                || (allow_protected && symbol.accessibility == Accessibility::Protected);
            if !accessible {
                ctx.report(codes::INACCESSIBLE_MEMBER, span, &[&symbol.name]);
                return ConstructorResolution::Failure;
            }
            let signature = symbol
                .signature
                .clone()
                .unwrap_or_else(|| MethodSignature::new(Vec::new(), TypeId::ERROR));
            let arguments = coerce_arguments(
                ctx,
                &signature,
                args,
                success.arg_to_param.as_deref(),
                success.expanded,
                checked,
            );
            ConstructorResolution::Success {
                constructor,
                arguments,
                expanded: success.expanded,
                arg_to_param: success.arg_to_param,
            }
        }
        OverloadResult::NoApplicable(failures) => {
            if !args.iter().any(|a| a.expr.has_errors) {
                let all_count = failures
                    .iter()
                    .all(|f| f.reason == FailureReason::ArgumentCount);
                if all_count && !failures.is_empty() {
                    let count = args.len().to_string();
                    ctx.report(codes::WRONG_ARGUMENT_COUNT, span, &[type_name, &count]);
                } else {
                    let listing = describe_candidates(ctx, constructors);
                    ctx.report(codes::NO_APPLICABLE_OVERLOAD, span, &[type_name, &listing]);
                }
            }
            rebind_unconverted_lambdas(ctx, binder, &args);
            ConstructorResolution::Failure
        }
        OverloadResult::Ambiguous(tied) => {
            let tied_members: Vec<SymbolId> = tied
                .into_iter()
                .map(|i| SymbolId(candidates[i].member))
                .collect();
            let listing = describe_candidates(ctx, &tied_members);
            ctx.report(codes::AMBIGUOUS_CALL, span, &[type_name, &listing]);
            ConstructorResolution::Failure
        }
    }
}

// =============================================================================
// Shared plumbing
// =============================================================================

pub(crate) fn to_candidates(
    ctx: &CheckerContext<'_>,
    members: &[SymbolId],
) -> Vec<OverloadCandidate> {
    members
        .iter()
        .filter_map(|&id| {
            let symbol = ctx.symbols.try_get(id)?;
            let signature = symbol.signature.clone()?;
            Some(OverloadCandidate {
                member: id.0,
                signature,
            })
        })
        .collect()
}

pub(crate) fn argument_infos(args: &[BoundArgument]) -> Vec<ArgumentInfo> {
    args.iter()
        .map(|arg| ArgumentInfo {
            ty: arg.expr.ty,
            constant: arg.expr.constant.clone(),
            name: arg.name.clone(),
            ref_kind: arg.ref_kind,
        })
        .collect()
}

/// Coerce every argument to its parameter's type in source order.
/// By-reference arguments keep their identity type; expanded trailing
/// arguments target the params collector's element type.
fn coerce_arguments(
    ctx: &mut CheckerContext<'_>,
    signature: &MethodSignature,
    args: Vec<BoundArgument>,
    arg_to_param: Option<&[usize]>,
    expanded: bool,
    checked: bool,
) -> Vec<BoundExpr> {
    let last = signature.parameters.len().saturating_sub(1);
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            let param_index = arg_to_param.map_or(index, |map| map[index]).min(last);
            let Some(param) = signature.parameters.get(param_index) else {
                return arg.expr;
            };
            if param.ref_kind != RefKind::None {
                return arg.expr;
            }
            let target = if expanded && param_index == last && param.is_params {
                ctx.types.element_type(param.ty).unwrap_or(param.ty)
            } else {
                param.ty
            };
            coerce(ctx, arg.expr, target, checked)
        })
        .collect()
}

/// A lambda argument stays unconverted until a delegate target supplies
/// its parameter types, so its body has not been bound yet. When the call
/// fails there is no target; bind each body anyway so the diagnostics
/// inside it still reach the bag before the call is discarded.
fn rebind_unconverted_lambdas(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    args: &[BoundArgument],
) {
    for arg in args {
        if let BoundExprKind::Lambda { body } = arg.expr.kind {
            expr::bind_expression(ctx, binder, body);
        }
    }
}

fn is_referenceable(expr: &BoundExpr) -> bool {
    matches!(
        expr.kind,
        BoundExprKind::Local { .. }
            | BoundExprKind::Parameter { .. }
            | BoundExprKind::FieldAccess { .. }
            | BoundExprKind::Ref { .. }
    )
}

/// `Name(int, string), Name(long)` listing for overload diagnostics.
pub(crate) fn describe_candidates(ctx: &CheckerContext<'_>, members: &[SymbolId]) -> String {
    let mut out = String::new();
    for &id in members {
        let Some(symbol) = ctx.symbols.try_get(id) else {
            continue;
        };
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(&symbol.name);
        out.push('(');
        if let Some(signature) = &symbol.signature {
            for (i, param) in signature.parameters.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&ctx.types.name_of(param.ty));
            }
        }
        out.push(')');
    }
    out
}

/// Accessibility from the perspective of the binder's containing scope.
/// Internal accessibility always holds inside a single compilation.
pub(crate) fn is_accessible(ctx: &CheckerContext<'_>, member: SymbolId, binder: &Binder) -> bool {
    let Some(symbol) = ctx.symbols.try_get(member) else {
        return true;
    };
    match symbol.accessibility {
        Accessibility::Public | Accessibility::Internal | Accessibility::ProtectedOrInternal => {
            true
        }
        Accessibility::Private => {
            let declaring = symbol.parent;
            let mut current = binder.containing_container();
            while let Some(container) = current {
                if container == declaring {
                    return true;
                }
                current = ctx
                    .symbols
                    .try_get(container)
                    .map(|s| s.parent)
                    .filter(SymbolId::is_some);
            }
            false
        }
        Accessibility::Protected => {
            let Some(declaring) = ctx.symbols.try_get(symbol.parent) else {
                return true;
            };
            binder
                .containing_container()
                .and_then(|c| ctx.symbols.try_get(c))
                .is_some_and(|c| ctx.types.is_subtype_of(c.ty, declaring.ty))
        }
    }
}

pub(crate) fn node_span(ctx: &CheckerContext<'_>, node: NodeIndex) -> TextSpan {
    ctx.arena.get(node).map(|n| n.span).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestCompilation;
    use sable_binder::{BinderFlags, BinderKind, Symbol, SymbolKind};
    use sable_solver::ConstantValue;
    use sable_solver::overload::ParameterSignature;
    use sable_syntax::arena::{BinaryOperator, SyntaxLiteral};

    struct CallFixture {
        comp: TestCompilation,
        class: SymbolId,
        narrow: SymbolId,
        wide: SymbolId,
    }

    /// `static class Host { static void Use(int x); static void Use(long x); }`
    fn fixture() -> CallFixture {
        let mut class = SymbolId::NONE;
        let mut narrow = SymbolId::NONE;
        let mut wide = SymbolId::NONE;
        let comp = TestCompilation::build(|s| {
            class = s.symbols.add(
                Symbol::new("Host", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::OBJECT),
            );
            narrow = s.symbols.add(
                Symbol::new("Use", SymbolKind::Method, class)
                    .with_flags(symbol_flags::STATIC)
                    .with_signature(MethodSignature::new(
                        vec![ParameterSignature::by_value("x", TypeId::I32)],
                        TypeId::VOID,
                    )),
            );
            wide = s.symbols.add(
                Symbol::new("Use", SymbolKind::Method, class)
                    .with_flags(symbol_flags::STATIC)
                    .with_signature(MethodSignature::new(
                        vec![ParameterSignature::by_value("x", TypeId::I64)],
                        TypeId::VOID,
                    )),
            );
        });
        CallFixture {
            comp,
            class,
            narrow,
            wide,
        }
    }

    fn binder_in(class: SymbolId, member: SymbolId) -> Arc<Binder> {
        Binder::buck_stops(BinderFlags::empty())
            .push(BinderKind::Container { symbol: class })
            .push(BinderKind::Member {
                symbol: member,
                body: NodeIndex::NONE,
            })
    }

    fn group(f: &CallFixture) -> BoundExpr {
        BoundExpr {
            syntax: NodeIndex(0),
            ty: TypeId::ERROR,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::MethodGroup {
                receiver: None,
                name: "Use".to_string(),
                members: vec![f.narrow, f.wide],
            },
        }
    }

    #[test]
    fn exact_overload_wins_and_arguments_stay_uncoerced() {
        let f = fixture();
        let mut ctx = f.comp.context();
        let binder = binder_in(f.class, f.narrow);
        let arg = BoundArgument::positional(BoundExpr::literal(
            NodeIndex(0),
            TypeId::I32,
            ConstantValue::I32(1),
        ));
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group(&f), vec![arg], false);
        assert!(ctx.diagnostics.is_empty());
        match bound.kind {
            BoundExprKind::Call(call) => {
                assert_eq!(call.method, f.narrow);
                assert!(!call.expanded);
                assert!(call.arg_to_param.is_none());
                assert!(matches!(call.arguments[0].kind, BoundExprKind::Literal));
            }
            other => panic!("expected call, got {other:?}"),
        }
        assert_eq!(bound.ty, TypeId::VOID);
    }

    #[test]
    fn widening_argument_is_materialized_as_a_conversion() {
        let f = fixture();
        let mut ctx = f.comp.context();
        let binder = binder_in(f.class, f.narrow);
        // An i16 argument fits neither parameter exactly; i32 wins by
        // betterness and the argument gets an implicit numeric conversion.
        let arg = BoundArgument::positional(BoundExpr {
            syntax: NodeIndex(0),
            ty: TypeId::I16,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::Local {
                symbol: SymbolId(99),
            },
        });
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group(&f), vec![arg], false);
        match bound.kind {
            BoundExprKind::Call(call) => {
                assert_eq!(call.method, f.narrow);
                assert!(matches!(
                    call.arguments[0].kind,
                    BoundExprKind::Conversion(_)
                ));
                assert_eq!(call.arguments[0].ty, TypeId::I32);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn no_applicable_overload_reports_one_diagnostic_naming_candidates() {
        let f = fixture();
        let mut ctx = f.comp.context();
        let binder = binder_in(f.class, f.narrow);
        let arg = BoundArgument::positional(BoundExpr::literal(
            NodeIndex(0),
            TypeId::BOOLEAN,
            ConstantValue::Bool(true),
        ));
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group(&f), vec![arg], false);
        assert!(bound.has_errors);
        assert_eq!(ctx.diagnostics.len(), 1);
        let diagnostic = ctx.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.code, codes::NO_APPLICABLE_OVERLOAD);
        assert!(diagnostic.message_text.contains("Use(int)"));
        assert!(diagnostic.message_text.contains("Use(long)"));
    }

    #[test]
    fn wrong_argument_count_gets_the_dedicated_code() {
        let f = fixture();
        let mut ctx = f.comp.context();
        let binder = binder_in(f.class, f.narrow);
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group(&f), Vec::new(), false);
        assert!(bound.has_errors);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().code,
            codes::WRONG_ARGUMENT_COUNT
        );
    }

    #[test]
    fn erroneous_arguments_keep_the_call_site_quiet() {
        let f = fixture();
        let mut ctx = f.comp.context();
        let binder = binder_in(f.class, f.narrow);
        let arg = BoundArgument::positional(BoundExpr::error(NodeIndex(0)));
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group(&f), vec![arg], false);
        assert!(bound.has_errors);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn a_failed_call_still_binds_lambda_argument_bodies() {
        let mut class = SymbolId::NONE;
        let mut method = SymbolId::NONE;
        let mut body = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            class = s.symbols.add(
                Symbol::new("Host", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::OBJECT),
            );
            method = s.symbols.add(
                Symbol::new("Use", SymbolKind::Method, class)
                    .with_flags(symbol_flags::STATIC)
                    .with_signature(MethodSignature::new(
                        vec![ParameterSignature::by_value("x", TypeId::I32)],
                        TypeId::VOID,
                    )),
            );
            let flag = s
                .builder
                .literal(TextSpan::new(0, 4), SyntaxLiteral::Bool(true));
            let one = s.builder.literal(TextSpan::new(7, 1), SyntaxLiteral::I32(1));
            body = s
                .builder
                .binary(TextSpan::new(0, 8), BinaryOperator::Add, flag, one);
            s.members.push(body);
        });
        let mut ctx = comp.context();
        let binder = binder_in(class, method);
        let group = BoundExpr {
            syntax: NodeIndex(0),
            ty: TypeId::ERROR,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::MethodGroup {
                receiver: None,
                name: "Use".to_string(),
                members: vec![method],
            },
        };
        let lambda = BoundArgument::positional(BoundExpr {
            syntax: NodeIndex(0),
            ty: TypeId::ERROR,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::Lambda { body },
        });
        // The erroneous second argument suppresses the call-site
        // diagnostic; the lambda body must still be checked.
        let broken = BoundArgument::positional(BoundExpr::error(NodeIndex(0)));
        let bound =
            bind_invocation(&mut ctx, &binder, NodeIndex(0), group, vec![lambda, broken], false);
        assert!(bound.has_errors);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::NO_IMPLICIT_CONVERSION);
    }

    #[test]
    fn dynamic_argument_reroutes_to_runtime_dispatch() {
        let f = fixture();
        let mut ctx = f.comp.context();
        let binder = binder_in(f.class, f.narrow);
        let arg = BoundArgument::positional(BoundExpr {
            syntax: NodeIndex(0),
            ty: TypeId::DYNAMIC,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::Local {
                symbol: SymbolId(99),
            },
        });
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group(&f), vec![arg], false);
        assert!(ctx.diagnostics.is_empty());
        match &bound.kind {
            BoundExprKind::DynamicCall {
                applicable_members, ..
            } => {
                assert_eq!(*applicable_members, vec![f.narrow.0, f.wide.0]);
            }
            other => panic!("expected dynamic call, got {other:?}"),
        }
        assert!(bound.is_dynamic());
    }

    #[test]
    fn dynamic_params_ambiguity_on_a_local_function_is_a_hard_error() {
        let mut class = SymbolId::NONE;
        let mut local_fn = SymbolId::NONE;
        let comp = TestCompilation::build(|s| {
            class = s.symbols.add(
                Symbol::new("Host", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::OBJECT),
            );
            let object_array = s.types.array_of(TypeId::OBJECT);
            let mut collector = ParameterSignature::by_value("rest", object_array);
            collector.is_params = true;
            local_fn = s.symbols.add(
                Symbol::new("Helper", SymbolKind::Method, class)
                    .with_flags(symbol_flags::STATIC | symbol_flags::LOCAL_FUNCTION)
                    .with_signature(MethodSignature::new(vec![collector], TypeId::VOID)),
            );
        });
        let mut ctx = comp.context();
        let binder = binder_in(class, local_fn);
        let group = BoundExpr {
            syntax: NodeIndex(0),
            ty: TypeId::ERROR,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::MethodGroup {
                receiver: None,
                name: "Helper".to_string(),
                members: vec![local_fn],
            },
        };
        // Two loose dynamic arguments force the expanded form.
        let args = vec![
            BoundArgument::positional(BoundExpr {
                syntax: NodeIndex(0),
                ty: TypeId::DYNAMIC,
                constant: None,
                has_errors: false,
                kind: BoundExprKind::Local { symbol: SymbolId(1) },
            }),
            BoundArgument::positional(BoundExpr {
                syntax: NodeIndex(0),
                ty: TypeId::DYNAMIC,
                constant: None,
                has_errors: false,
                kind: BoundExprKind::Local { symbol: SymbolId(2) },
            }),
        ];
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group, args, false);
        assert!(bound.has_errors);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().code,
            codes::DYNAMIC_LOCAL_FUNCTION_PARAMS
        );
    }

    #[test]
    fn delegate_value_invokes_through_its_signature() {
        let mut delegate_ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            delegate_ty = s.types.add(sable_solver::types::TypeData::Delegate {
                name: "Transformer".to_string(),
                signature: MethodSignature::new(
                    vec![ParameterSignature::by_value("input", TypeId::I32)],
                    TypeId::STRING,
                ),
            });
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let callee = BoundExpr {
            syntax: NodeIndex(0),
            ty: delegate_ty,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::Local {
                symbol: SymbolId(5),
            },
        };
        let arg = BoundArgument::positional(BoundExpr::literal(
            NodeIndex(0),
            TypeId::I32,
            ConstantValue::I32(3),
        ));
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), callee, vec![arg], false);
        assert!(ctx.diagnostics.is_empty());
        assert_eq!(bound.ty, TypeId::STRING);
        match bound.kind {
            BoundExprKind::Call(call) => {
                assert_eq!(call.method, SymbolId::NONE);
                assert!(call.receiver.is_some());
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn non_invocable_expression_is_diagnosed_once() {
        let f = fixture();
        let mut ctx = f.comp.context();
        let binder = binder_in(f.class, f.narrow);
        let callee = BoundExpr::literal(NodeIndex(0), TypeId::I32, ConstantValue::I32(9));
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), callee, Vec::new(), false);
        assert!(bound.has_errors);
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().code,
            codes::NOT_INVOCABLE
        );
    }

    #[test]
    fn private_member_is_inaccessible_from_outside_its_type() {
        let mut class = SymbolId::NONE;
        let mut other = SymbolId::NONE;
        let mut hidden = SymbolId::NONE;
        let comp = TestCompilation::build(|s| {
            class = s.symbols.add(
                Symbol::new("Host", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::OBJECT),
            );
            other = s.symbols.add(
                Symbol::new("Elsewhere", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::OBJECT),
            );
            hidden = s.symbols.add(
                Symbol::new("Hidden", SymbolKind::Method, class)
                    .with_flags(symbol_flags::STATIC)
                    .with_accessibility(Accessibility::Private)
                    .with_signature(MethodSignature::new(Vec::new(), TypeId::VOID)),
            );
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty())
            .push(BinderKind::Container { symbol: other });
        let group = BoundExpr {
            syntax: NodeIndex(0),
            ty: TypeId::ERROR,
            constant: None,
            has_errors: false,
            kind: BoundExprKind::MethodGroup {
                receiver: None,
                name: "Hidden".to_string(),
                members: vec![hidden],
            },
        };
        let bound = bind_invocation(&mut ctx, &binder, NodeIndex(0), group, Vec::new(), false);
        assert!(bound.has_errors);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().code,
            codes::INACCESSIBLE_MEMBER
        );
    }
}
