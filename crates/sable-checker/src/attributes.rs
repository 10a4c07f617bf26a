//! Attribute binding.
//!
//! Every attribute application binds into two shapes at once:
//! `BoundAttribute` keeps full expressions in source order for
//! diagnostics and tooling, while `AttributeData` folds everything down
//! to `TypedConstant`s in constructor declaration order for metadata
//! emission. Constructor resolution runs through the ordinary overload
//! engine, with one relaxation: protected base-type constructors are
//! callable from an attribute application.

use std::sync::Arc;

use indexmap::IndexSet;
use sable_binder::{Binder, BinderFlags, SymbolId, SymbolKind, symbol_flags};
use sable_common::diagnostics::diagnostic_codes as codes;
use sable_solver::convert::ConversionKind;
use sable_solver::overload::RefKind;
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;

use crate::bound::{AttributeData, BoundAttribute, BoundExpr, BoundExprKind, TypedConstant};
use crate::calls::{BoundArgument, ConstructorResolution, node_span, resolve_constructor};
use crate::context::CheckerContext;
use crate::conversions::{coerce, span_of};
use crate::expr;

pub fn bind_attribute(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> (AttributeData, BoundAttribute) {
    let Some(data) = ctx.arena.get_attribute(node) else {
        return error_attribute(node);
    };
    let name = data.name.clone();
    let name_span = data.name_span;
    let argument_list = data.argument_list;

    let mut has_errors = false;
    let attribute_type = resolve_attribute_type(ctx, &name).unwrap_or(TypeId::ERROR);
    if attribute_type.is_error() {
        ctx.report(codes::NOT_AN_ATTRIBUTE_TYPE, name_span, &[&name]);
        has_errors = true;
    } else if let Some(base) = ctx.well_known.attribute_base
        && !ctx.types.is_subtype_of(attribute_type, base)
    {
        ctx.report(codes::NOT_AN_ATTRIBUTE_TYPE, name_span, &[&name]);
        has_errors = true;
    }

    // Expressions inside the argument list bind under the attribute
    // flag; it forbids the constructs that can never be constant there.
    let argument_binder = binder.push_flags(binder.flags | BinderFlags::ATTRIBUTE_ARGUMENT);
    let checked = ctx.is_checked(binder.checked_state());

    let argument_nodes: Vec<NodeIndex> = ctx
        .arena
        .get_attribute_argument_list(argument_list)
        .map(|list| list.arguments.iter().collect())
        .unwrap_or_default();

    let mut constructor_args: Vec<BoundArgument> = Vec::new();
    let mut named_nodes: Vec<(String, NodeIndex, NodeIndex)> = Vec::new();
    let mut seen_named = false;
    let mut seen_names: IndexSet<String> = IndexSet::new();
    for argument_node in argument_nodes {
        let Some(argument) = ctx.arena.get_attribute_argument(argument_node) else {
            continue;
        };
        let name_equals = argument.name_equals.clone();
        let name_colon = argument.name_colon.clone();
        let expression = argument.expression;

        if let Some(target) = name_equals {
            if !seen_names.insert(target.clone()) {
                ctx.report(
                    codes::DUPLICATE_NAMED_ARGUMENT,
                    node_span(ctx, argument_node),
                    &[&target],
                );
                has_errors = true;
            }
            seen_named = true;
            named_nodes.push((target, argument_node, expression));
            continue;
        }
        if let Some(parameter) = &name_colon {
            if !seen_names.insert(parameter.clone()) {
                ctx.report(
                    codes::DUPLICATE_NAMED_ARGUMENT,
                    node_span(ctx, argument_node),
                    &[parameter],
                );
                has_errors = true;
            }
            seen_named = true;
        } else if seen_named {
            ctx.report(
                codes::NAMED_ARGUMENT_BEFORE_POSITIONAL,
                node_span(ctx, argument_node),
                &[],
            );
            has_errors = true;
        }
        let expr = expr::bind_expression(ctx, &argument_binder, expression);
        constructor_args.push(BoundArgument {
            expr,
            name: name_colon,
            ref_kind: RefKind::None,
        });
    }

    let source_arguments: Vec<BoundExpr> =
        constructor_args.iter().map(|a| a.expr.clone()).collect();

    let type_symbol = if attribute_type.is_error() {
        None
    } else {
        ctx.symbols.type_symbol(attribute_type)
    };
    let constructors = type_symbol
        .map(|symbol| ctx.symbols.constructors_of(symbol))
        .unwrap_or_default();

    let mut attr_has_errors = has_errors;
    let span = node_span(ctx, node);
    let (constructor, arguments, expanded, arg_to_param) =
        if !attribute_type.is_error() && !constructors.is_empty() {
            match resolve_constructor(
                ctx,
                binder,
                span,
                &name,
                &constructors,
                constructor_args,
                checked,
                true,
            ) {
                ConstructorResolution::Success {
                    constructor,
                    arguments,
                    expanded,
                    arg_to_param,
                } => (Some(constructor), arguments, expanded, arg_to_param),
                ConstructorResolution::Failure => {
                    attr_has_errors = true;
                    (None, source_arguments, false, None)
                }
            }
        } else {
            // No constructor symbols at all: a bare `[X]` application is
            // fine, an argument list has nothing to resolve against.
            if !source_arguments.is_empty() {
                attr_has_errors = true;
            }
            (None, source_arguments, false, None)
        };

    let constructor_arguments = match constructor {
        Some(constructor) => {
            let parameter_count = ctx
                .symbols
                .get(constructor)
                .signature
                .as_ref()
                .map(|s| s.parameters.len())
                .unwrap_or(arguments.len());
            declaration_order_constants(
                ctx,
                binder,
                &arguments,
                arg_to_param.as_deref(),
                expanded,
                parameter_count,
                &mut attr_has_errors,
            )
        }
        None => arguments
            .iter()
            .map(|argument| to_typed_constant(ctx, binder, argument, &mut attr_has_errors))
            .collect(),
    };

    let mut named_arguments = Vec::new();
    let mut named_assignments = Vec::new();
    for (target, argument_node, expression) in named_nodes {
        let value = expr::bind_expression(ctx, &argument_binder, expression);
        match named_target(ctx, attribute_type, &target) {
            Some((member, member_ty)) => {
                let value = coerce(ctx, value, member_ty, checked);
                let constant = to_typed_constant(ctx, binder, &value, &mut attr_has_errors);
                named_arguments.push((target.clone(), constant));
                named_assignments.push((target, Some(member), value));
            }
            None => {
                if !attribute_type.is_error() {
                    ctx.report(
                        codes::BAD_NAMED_ARGUMENT_TARGET,
                        node_span(ctx, argument_node),
                        &[&target],
                    );
                }
                attr_has_errors = true;
                named_arguments.push((target.clone(), TypedConstant::Error));
                named_assignments.push((target, None, value));
            }
        }
    }

    // Conditional omission is decided last: every diagnostic above still
    // fires even when the application is dropped from metadata.
    let conditionally_omitted = type_symbol
        .map(|symbol| ctx.symbols.get(symbol))
        .and_then(|symbol| symbol.condition.as_deref())
        .is_some_and(|condition| !ctx.well_known.is_condition_defined(condition));

    let data = AttributeData {
        attribute_type,
        constructor,
        constructor_arguments,
        named_arguments,
        conditionally_omitted,
        has_errors: attr_has_errors,
    };
    let bound = BoundAttribute {
        syntax: node,
        attribute_type,
        constructor,
        arguments,
        named_assignments,
        expanded,
        arg_to_param,
        has_errors: attr_has_errors,
    };
    (data, bound)
}

fn error_attribute(node: NodeIndex) -> (AttributeData, BoundAttribute) {
    let data = AttributeData {
        attribute_type: TypeId::ERROR,
        constructor: None,
        constructor_arguments: Vec::new(),
        named_arguments: Vec::new(),
        conditionally_omitted: false,
        has_errors: true,
    };
    let bound = BoundAttribute {
        syntax: node,
        attribute_type: TypeId::ERROR,
        constructor: None,
        arguments: Vec::new(),
        named_assignments: Vec::new(),
        expanded: false,
        arg_to_param: None,
        has_errors: true,
    };
    (data, bound)
}

/// Resolve an attribute name to a named type, trying the conventional
/// `Attribute` suffix when the bare name misses (`[Marker]` finds
/// `MarkerAttribute`).
fn resolve_attribute_type(ctx: &CheckerContext<'_>, name: &str) -> Option<TypeId> {
    if let Some(ty) = named_type_by_name(ctx, name) {
        return Some(ty);
    }
    let suffixed = format!("{name}Attribute");
    named_type_by_name(ctx, &suffixed)
}

fn named_type_by_name(ctx: &CheckerContext<'_>, name: &str) -> Option<TypeId> {
    for index in 0..ctx.symbols.len() {
        let symbol = ctx.symbols.get(SymbolId(index as u32));
        if symbol.kind == SymbolKind::NamedType && symbol.name == name {
            return Some(symbol.ty);
        }
    }
    None
}

/// Find the field or property a `Name = value` assignment targets,
/// walking the attribute type's base chain. Only public instance
/// members qualify.
fn named_target(
    ctx: &CheckerContext<'_>,
    attribute_type: TypeId,
    name: &str,
) -> Option<(SymbolId, TypeId)> {
    let mut current = attribute_type;
    for _ in 0..64 {
        if let Some(type_symbol) = ctx.symbols.type_symbol(current) {
            for id in ctx.symbols.find_members(type_symbol, name) {
                let symbol = ctx.symbols.get(id);
                let is_data_member =
                    matches!(symbol.kind, SymbolKind::Field | SymbolKind::Property);
                if !is_data_member {
                    continue;
                }
                let is_static = symbol.flags & symbol_flags::STATIC != 0;
                if is_static || symbol.accessibility != sable_binder::Accessibility::Public {
                    return None;
                }
                return Some((id, symbol.ty));
            }
        }
        current = ctx.types.base_of(current)?;
    }
    None
}

/// Rebuild the source-order argument list into declaration order,
/// collecting expanded-form trailing arguments into one array constant.
fn declaration_order_constants(
    ctx: &mut CheckerContext<'_>,
    binder: &Binder,
    arguments: &[BoundExpr],
    arg_to_param: Option<&[usize]>,
    expanded: bool,
    parameter_count: usize,
    attr_has_errors: &mut bool,
) -> Vec<TypedConstant> {
    if parameter_count == 0 {
        return Vec::new();
    }
    let mut slots: Vec<Option<TypedConstant>> = vec![None; parameter_count];
    let mut collected: Vec<TypedConstant> = Vec::new();
    for (index, argument) in arguments.iter().enumerate() {
        let constant = to_typed_constant(ctx, binder, argument, attr_has_errors);
        let parameter = arg_to_param
            .map(|map| map.get(index).copied().unwrap_or(index))
            .unwrap_or(index);
        if expanded && parameter + 1 >= parameter_count {
            collected.push(constant);
        } else if let Some(slot) = slots.get_mut(parameter) {
            *slot = Some(constant);
        }
    }
    if expanded {
        slots[parameter_count - 1] = Some(TypedConstant::Array { values: collected });
    }
    // Unfilled slots are defaulted optional parameters; metadata only
    // records what the application wrote.
    slots.into_iter().flatten().collect()
}

/// Fold one bound argument into its metadata shape. `attr_has_errors`
/// dedupes reports across all arguments of a single application.
fn to_typed_constant(
    ctx: &mut CheckerContext<'_>,
    binder: &Binder,
    expr: &BoundExpr,
    attr_has_errors: &mut bool,
) -> TypedConstant {
    if let Some(constant) = &expr.constant {
        return TypedConstant::Primitive {
            ty: expr.ty,
            value: constant.clone(),
        };
    }
    if expr.has_errors {
        // A bare type name binds to a silent error node; read it back as
        // a type-reference argument before giving up on it.
        if let Some(ty) = expr::resolve_type(ctx, binder, expr.syntax) {
            if ctx.types.is_open_generic(ty) {
                if !*attr_has_errors {
                    ctx.report(codes::OPEN_GENERIC_IN_ATTRIBUTE, span_of(ctx, expr), &[]);
                    *attr_has_errors = true;
                }
                return TypedConstant::Error;
            }
            return TypedConstant::Type { value: ty };
        }
        // The expression's own diagnostics already fired.
        *attr_has_errors = true;
        return TypedConstant::Error;
    }
    if let BoundExprKind::Conversion(conversion) = &expr.kind
        && conversion.conversion.kind == ConversionKind::ImplicitReference
        && ctx.types.element_type(expr.ty).is_some()
    {
        // Metadata arrays are exact-type; `string[]` to `object[]` has
        // no representation there.
        if !*attr_has_errors {
            ctx.report(codes::ARRAY_COVARIANCE_IN_ATTRIBUTE, span_of(ctx, expr), &[]);
            *attr_has_errors = true;
        }
        return TypedConstant::Error;
    }
    if !*attr_has_errors {
        ctx.report(codes::BAD_ATTRIBUTE_ARGUMENT, span_of(ctx, expr), &[]);
        *attr_has_errors = true;
    }
    TypedConstant::Error
}

#[cfg(test)]
mod tests {
    use sable_binder::{Accessibility, Binder, BinderFlags, Symbol, SymbolId, SymbolKind};
    use sable_common::TextSpan;
    use sable_solver::ConstantValue;
    use sable_solver::overload::{MethodSignature, ParameterSignature, RefKind};
    use sable_solver::types::NamedTypeData;
    use sable_syntax::NodeList;
    use sable_syntax::arena::SyntaxLiteral;

    use super::*;
    use crate::testing::{TestCompilation, TestSetup};

    fn span() -> TextSpan {
        TextSpan::new(0, 10)
    }

    fn class_type(s: &mut TestSetup, name: &str, base: Option<TypeId>) -> (TypeId, SymbolId) {
        let ty = s.types.add_named(NamedTypeData {
            name: name.to_string(),
            base,
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        });
        let symbol = s
            .symbols
            .add(Symbol::new(name, SymbolKind::NamedType, SymbolId::NONE).with_type(ty));
        (ty, symbol)
    }

    /// `MarkerAttribute : Attribute` with the given constructors.
    fn attribute_fixture(
        s: &mut TestSetup,
        signatures: &[MethodSignature],
    ) -> (TypeId, SymbolId) {
        let (base_ty, _) = class_type(s, "Attribute", Some(TypeId::OBJECT));
        s.well_known.attribute_base = Some(base_ty);
        let (ty, symbol) = class_type(s, "MarkerAttribute", Some(base_ty));
        for signature in signatures {
            s.symbols.add(
                Symbol::new("MarkerAttribute", SymbolKind::Constructor, symbol)
                    .with_signature(signature.clone()),
            );
        }
        (ty, symbol)
    }

    fn attribute_node(s: &mut TestSetup, name: &str, arguments: Vec<NodeIndex>) -> NodeIndex {
        let list = s
            .builder
            .attribute_argument_list(span(), NodeList::new(arguments));
        s.builder.attribute(span(), name, span(), list)
    }

    fn int_constant(constant: &TypedConstant) -> i32 {
        match constant {
            TypedConstant::Primitive {
                value: ConstantValue::I32(v),
                ..
            } => *v,
            other => panic!("expected an int constant, got {other:?}"),
        }
    }

    #[test]
    fn constructor_arguments_are_stored_in_declaration_order() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            attribute_fixture(
                s,
                &[MethodSignature::new(
                    vec![
                        ParameterSignature::by_value("first", TypeId::I32),
                        ParameterSignature::by_value("second", TypeId::I32),
                        ParameterSignature::by_value("third", TypeId::I32),
                    ],
                    TypeId::VOID,
                )],
            );
            let one = s.builder.literal(span(), SyntaxLiteral::I32(1));
            let nine = s.builder.literal(span(), SyntaxLiteral::I32(9));
            let eight = s.builder.literal(span(), SyntaxLiteral::I32(8));
            let args = vec![
                s.builder.attribute_argument(span(), None, None, one),
                s.builder
                    .attribute_argument(span(), None, Some("third".to_string()), nine),
                s.builder
                    .attribute_argument(span(), None, Some("second".to_string()), eight),
            ];
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, bound) = bind_attribute(&mut ctx, &binder, node);
        assert!(ctx.diagnostics.is_empty());
        assert!(!data.has_errors);
        let declared: Vec<i32> = data.constructor_arguments.iter().map(int_constant).collect();
        assert_eq!(declared, vec![1, 8, 9]);
        assert_eq!(bound.arg_to_param, Some(vec![0, 2, 1]));
        let source: Vec<i32> = bound
            .arguments
            .iter()
            .map(|a| match &a.constant {
                Some(ConstantValue::I32(v)) => *v,
                other => panic!("expected an int constant, got {other:?}"),
            })
            .collect();
        assert_eq!(source, vec![1, 9, 8]);
    }

    #[test]
    fn a_positional_argument_after_a_named_assignment_is_reported() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let (_, symbol) = attribute_fixture(
                s,
                &[MethodSignature::new(
                    vec![ParameterSignature::by_value("value", TypeId::I32)],
                    TypeId::VOID,
                )],
            );
            s.symbols.add(
                Symbol::new("Enabled", SymbolKind::Field, symbol).with_type(TypeId::BOOLEAN),
            );
            let truth = s.builder.literal(span(), SyntaxLiteral::Bool(true));
            let two = s.builder.literal(span(), SyntaxLiteral::I32(2));
            let args = vec![
                s.builder
                    .attribute_argument(span(), Some("Enabled".to_string()), None, truth),
                s.builder.attribute_argument(span(), None, None, two),
            ];
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, _) = bind_attribute(&mut ctx, &binder, node);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::NAMED_ARGUMENT_BEFORE_POSITIONAL);
        assert!(data.has_errors);
    }

    #[test]
    fn a_duplicate_named_assignment_is_reported() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let (_, symbol) = attribute_fixture(s, &[]);
            s.symbols.add(
                Symbol::new("Enabled", SymbolKind::Field, symbol).with_type(TypeId::BOOLEAN),
            );
            let truth = s.builder.literal(span(), SyntaxLiteral::Bool(true));
            let lie = s.builder.literal(span(), SyntaxLiteral::Bool(false));
            let args = vec![
                s.builder
                    .attribute_argument(span(), Some("Enabled".to_string()), None, truth),
                s.builder
                    .attribute_argument(span(), Some("Enabled".to_string()), None, lie),
            ];
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, _) = bind_attribute(&mut ctx, &binder, node);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::DUPLICATE_NAMED_ARGUMENT);
        assert_eq!(data.named_arguments.len(), 2);
    }

    #[test]
    fn a_bare_type_name_argument_folds_to_a_type_constant() {
        let mut node = NodeIndex::NONE;
        let mut payload_ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            let (_, symbol) = attribute_fixture(s, &[]);
            s.symbols
                .add(Symbol::new("Target", SymbolKind::Field, symbol).with_type(TypeId::OBJECT));
            payload_ty = class_type(s, "Payload", None).0;
            let reference = s.builder.identifier(span(), "Payload");
            let args = vec![s.builder.attribute_argument(
                span(),
                Some("Target".to_string()),
                None,
                reference,
            )];
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, _) = bind_attribute(&mut ctx, &binder, node);
        assert!(ctx.diagnostics.is_empty());
        assert!(!data.has_errors);
        assert_eq!(data.named_arguments.len(), 1);
        assert_eq!(data.named_arguments[0].0, "Target");
        assert_eq!(
            data.named_arguments[0].1,
            TypedConstant::Type { value: payload_ty }
        );
    }

    #[test]
    fn an_undefined_condition_symbol_omits_the_attribute() {
        fn build(define: bool) -> bool {
            let mut node = NodeIndex::NONE;
            let comp = TestCompilation::build(|s| {
                let (base_ty, _) = class_type(s, "Attribute", Some(TypeId::OBJECT));
                s.well_known.attribute_base = Some(base_ty);
                let ty = s.types.add_named(NamedTypeData {
                    name: "TraceAttribute".to_string(),
                    base: Some(base_ty),
                    is_value_type: false,
                    is_ref_like: false,
                    is_interface: false,
                    arity: 0,
                    conversion_operators: Vec::new(),
                });
                let mut symbol =
                    Symbol::new("TraceAttribute", SymbolKind::NamedType, SymbolId::NONE)
                        .with_type(ty);
                symbol.condition = Some("TRACE".to_string());
                s.symbols.add(symbol);
                if define {
                    s.well_known.define_condition("TRACE");
                }
                node = s
                    .builder
                    .attribute(span(), "Trace", span(), NodeIndex::NONE);
                s.members.push(node);
            });
            let mut ctx = comp.context();
            let binder = Binder::buck_stops(BinderFlags::empty());
            let (data, _) = bind_attribute(&mut ctx, &binder, node);
            assert!(ctx.diagnostics.is_empty());
            data.conditionally_omitted
        }
        assert!(build(false));
        assert!(!build(true));
    }

    #[test]
    fn params_arguments_collect_into_an_array_constant() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let int_array = s.types.array_of(TypeId::I32);
            attribute_fixture(
                s,
                &[MethodSignature::new(
                    vec![
                        ParameterSignature::by_value("name", TypeId::STRING),
                        ParameterSignature {
                            name: "rest".to_string(),
                            ty: int_array,
                            ref_kind: RefKind::None,
                            is_params: true,
                            is_optional: false,
                        },
                    ],
                    TypeId::VOID,
                )],
            );
            let label = s
                .builder
                .literal(span(), SyntaxLiteral::String("x".to_string()));
            let one = s.builder.literal(span(), SyntaxLiteral::I32(1));
            let two = s.builder.literal(span(), SyntaxLiteral::I32(2));
            let args = vec![
                s.builder.attribute_argument(span(), None, None, label),
                s.builder.attribute_argument(span(), None, None, one),
                s.builder.attribute_argument(span(), None, None, two),
            ];
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, bound) = bind_attribute(&mut ctx, &binder, node);
        assert!(ctx.diagnostics.is_empty());
        assert!(bound.expanded);
        assert_eq!(data.constructor_arguments.len(), 2);
        match &data.constructor_arguments[1] {
            TypedConstant::Array { values } => {
                let items: Vec<i32> = values.iter().map(int_constant).collect();
                assert_eq!(items, vec![1, 2]);
            }
            other => panic!("expected an array constant, got {other:?}"),
        }
    }

    #[test]
    fn an_invalid_named_target_reports_and_keeps_a_placeholder() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let (_, symbol) = attribute_fixture(s, &[]);
            s.symbols.add(
                Symbol::new("Count", SymbolKind::Field, symbol)
                    .with_type(TypeId::I32)
                    .with_flags(sable_binder::symbol_flags::STATIC),
            );
            let one = s.builder.literal(span(), SyntaxLiteral::I32(1));
            let args = vec![s.builder.attribute_argument(
                span(),
                Some("Count".to_string()),
                None,
                one,
            )];
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, bound) = bind_attribute(&mut ctx, &binder, node);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::BAD_NAMED_ARGUMENT_TARGET);
        assert!(data.has_errors);
        assert_eq!(data.named_arguments[0], ("Count".to_string(), TypedConstant::Error));
        assert!(bound.named_assignments[0].1.is_none());
    }

    #[test]
    fn a_non_constant_argument_is_reported_once() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            attribute_fixture(
                s,
                &[MethodSignature::new(
                    vec![
                        ParameterSignature::by_value("a", TypeId::I32),
                        ParameterSignature::by_value("b", TypeId::I32),
                    ],
                    TypeId::VOID,
                )],
            );
            let (_, host) = class_type(s, "Host", None);
            s.symbols.add(
                Symbol::new("Num", SymbolKind::Field, host)
                    .with_type(TypeId::I32)
                    .with_flags(sable_binder::symbol_flags::STATIC),
            );
            let mut args = Vec::new();
            for _ in 0..2 {
                let receiver = s.builder.identifier(span(), "Host");
                let access = s.builder.member_access(span(), receiver, "Num", span());
                args.push(s.builder.attribute_argument(span(), None, None, access));
            }
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, _) = bind_attribute(&mut ctx, &binder, node);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::BAD_ATTRIBUTE_ARGUMENT);
        assert_eq!(
            data.constructor_arguments,
            vec![TypedConstant::Error, TypedConstant::Error]
        );
    }

    #[test]
    fn a_type_outside_the_attribute_hierarchy_is_rejected() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            attribute_fixture(s, &[]);
            class_type(s, "Plain", None);
            node = s
                .builder
                .attribute(span(), "Plain", span(), NodeIndex::NONE);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, _) = bind_attribute(&mut ctx, &binder, node);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::NOT_AN_ATTRIBUTE_TYPE);
        assert!(data.has_errors);
    }

    #[test]
    fn a_protected_base_constructor_is_admitted() {
        let mut node = NodeIndex::NONE;
        let mut ctor = SymbolId::NONE;
        let comp = TestCompilation::build(|s| {
            let (base_ty, _) = class_type(s, "Attribute", Some(TypeId::OBJECT));
            s.well_known.attribute_base = Some(base_ty);
            let (_, symbol) = class_type(s, "MarkerAttribute", Some(base_ty));
            ctor = s.symbols.add(
                Symbol::new("MarkerAttribute", SymbolKind::Constructor, symbol)
                    .with_signature(MethodSignature::new(
                        vec![ParameterSignature::by_value("value", TypeId::I32)],
                        TypeId::VOID,
                    ))
                    .with_accessibility(Accessibility::Protected),
            );
            let one = s.builder.literal(span(), SyntaxLiteral::I32(1));
            let args = vec![s.builder.attribute_argument(span(), None, None, one)];
            node = attribute_node(s, "Marker", args);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let (data, _) = bind_attribute(&mut ctx, &binder, node);
        assert!(ctx.diagnostics.is_empty());
        assert_eq!(data.constructor, Some(ctor));
    }
}
