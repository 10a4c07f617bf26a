//! Pattern binding.
//!
//! Syntax patterns become `BoundPattern` trees carrying an input type
//! (what the pattern is tested against) and a narrowed type (what the
//! value is known to be on a match). The narrowed type is always
//! assignable to the input type; combinators thread it left to right so
//! `T and { ... }` tests the property pattern against `T`, not the
//! original input.

use std::sync::Arc;

use sable_binder::{Binder, SymbolId, SymbolKind};
use sable_common::diagnostics::diagnostic_codes as codes;
use sable_common::limits::{MAX_PATTERN_DEPTH, MIN_REMAINING_STACK_BYTES};
use sable_solver::ConstantValue;
use sable_solver::convert::classify_conversion;
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;
use sable_syntax::kinds::syntax_kind as k;

use crate::bound::{BoundPattern, BoundPatternKind};
use crate::calls::node_span;
use crate::context::CheckerContext;
use crate::expr;

const GROWN_STACK_BYTES: usize = 1 << 20;

pub fn bind_pattern(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
) -> BoundPattern {
    bind_at_depth(ctx, binder, node, input, 0)
}

fn bind_at_depth(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
    depth: usize,
) -> BoundPattern {
    if node.is_none() {
        return BoundPattern::error(node, input);
    }
    if depth > MAX_PATTERN_DEPTH {
        ctx.report(codes::PATTERN_TOO_DEEP, node_span(ctx, node), &[]);
        return BoundPattern::error(node, input);
    }
    stacker::maybe_grow(MIN_REMAINING_STACK_BYTES, GROWN_STACK_BYTES, || {
        bind_kind(ctx, binder, node, input, depth)
    })
}

fn bind_kind(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
    depth: usize,
) -> BoundPattern {
    match ctx.arena.kind_of(node) {
        k::CONSTANT_PATTERN => bind_constant(ctx, binder, node, input),
        k::TYPE_PATTERN => bind_type(ctx, binder, node, input),
        k::DECLARATION_PATTERN => bind_declaration(ctx, binder, node, input),
        k::DISCARD_PATTERN => BoundPattern {
            syntax: node,
            input_type: input,
            narrowed_type: input,
            has_errors: false,
            synthesized: false,
            kind: BoundPatternKind::Discard,
        },
        k::RECURSIVE_PATTERN => bind_recursive(ctx, binder, node, input, depth),
        k::LIST_PATTERN => bind_list(ctx, binder, node, input, depth),
        k::RELATIONAL_PATTERN => bind_relational(ctx, binder, node, input),
        k::AND_PATTERN | k::OR_PATTERN => bind_binary(ctx, binder, node, input, depth),
        k::NOT_PATTERN => bind_not(ctx, binder, node, input, depth),
        k::PARENTHESIZED_PATTERN => {
            let Some(data) = ctx.arena.get_unary_pattern(node) else {
                return BoundPattern::error(node, input);
            };
            bind_at_depth(ctx, binder, data.pattern, input, depth + 1)
        }
        _ => BoundPattern::error(node, input),
    }
}

fn bind_constant(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_constant_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let value = expr::bind_expression(ctx, binder, data.expression);
    let mut has_errors = value.has_errors;
    let Some(constant) = value.constant else {
        // Non-constant expressions in a pattern position never bind; the
        // expression's own diagnostics already fired.
        return BoundPattern::error(node, input);
    };
    if !has_errors
        && !classify_conversion(ctx.types, value.ty, input, Some(&constant)).exists()
        && !classify_conversion(ctx.types, input, value.ty, None).exists()
    {
        let from = ctx.types.name_of(value.ty);
        let to = ctx.types.name_of(input);
        ctx.report(codes::NO_IMPLICIT_CONVERSION, node_span(ctx, node), &[&from, &to]);
        has_errors = true;
    }
    BoundPattern {
        syntax: node,
        input_type: input,
        narrowed_type: input,
        has_errors,
        synthesized: false,
        kind: BoundPatternKind::Constant { value: constant },
    }
}

fn bind_type(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_type_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let ty = expr::resolve_type(ctx, binder, data.ty).unwrap_or(TypeId::ERROR);
    BoundPattern {
        syntax: node,
        input_type: input,
        narrowed_type: ty,
        has_errors: ty == TypeId::ERROR,
        synthesized: false,
        kind: BoundPatternKind::Type { ty },
    }
}

fn bind_declaration(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_declaration_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let designation = data.designation.clone();
    let ty = expr::resolve_type(ctx, binder, data.ty).unwrap_or(TypeId::ERROR);
    let variable = designation
        .as_deref()
        .and_then(|name| pattern_variable(ctx, binder, name));
    BoundPattern {
        syntax: node,
        input_type: input,
        narrowed_type: ty,
        has_errors: ty == TypeId::ERROR,
        synthesized: false,
        kind: BoundPatternKind::Declaration { ty, variable },
    }
}

fn bind_recursive(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
    depth: usize,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_recursive_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let ty_node = data.ty;
    let positional_nodes: Option<Vec<NodeIndex>> =
        data.positional.as_ref().map(|list| list.iter().collect());
    let property_nodes: Option<Vec<NodeIndex>> =
        data.properties.as_ref().map(|list| list.iter().collect());
    let designation = data.designation.clone();

    // A recursive pattern without an explicit type tests the input type
    // itself (plus a null check, supplied during normalization).
    let ty = if ty_node.is_some() {
        expr::resolve_type(ctx, binder, ty_node).unwrap_or(TypeId::ERROR)
    } else {
        input
    };
    let mut has_errors = ty == TypeId::ERROR;

    let mut positional = Vec::new();
    for sub_node in positional_nodes.unwrap_or_default() {
        let Some(sub) = ctx.arena.get_subpattern(sub_node) else {
            continue;
        };
        let inner_node = sub.pattern;
        // Deconstruction element types come from a Deconstruct method the
        // symbol layer does not model; elements bind against object.
        let bound = bind_at_depth(ctx, binder, inner_node, TypeId::OBJECT, depth + 1);
        has_errors |= bound.has_errors;
        positional.push(bound);
    }

    let mut properties = Vec::new();
    for sub_node in property_nodes.unwrap_or_default() {
        let Some(sub) = ctx.arena.get_subpattern(sub_node) else {
            continue;
        };
        let inner_node = sub.pattern;
        let Some(name) = sub.name.clone() else {
            continue;
        };
        let member_type = member_type(ctx, ty, &name).unwrap_or(TypeId::ERROR);
        let bound = bind_at_depth(ctx, binder, inner_node, member_type, depth + 1);
        has_errors |= bound.has_errors;
        properties.push((name, bound));
    }

    let variable = designation
        .as_deref()
        .and_then(|name| pattern_variable(ctx, binder, name));
    BoundPattern {
        syntax: node,
        input_type: input,
        narrowed_type: ty,
        has_errors,
        synthesized: false,
        kind: BoundPatternKind::Recursive {
            ty,
            positional,
            properties,
            variable,
        },
    }
}

fn bind_list(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
    depth: usize,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_list_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let element_nodes: Vec<NodeIndex> = data.elements.iter().collect();
    let element_type = ctx.types.element_type(input).unwrap_or(TypeId::ERROR);

    let mut elements = Vec::new();
    let mut slice = None;
    let mut has_errors = false;
    for element_node in element_nodes {
        let bound = if ctx.arena.kind_of(element_node) == k::SLICE_PATTERN {
            slice = Some(elements.len());
            let sub = ctx
                .arena
                .get_slice_pattern(element_node)
                .map(|d| d.pattern)
                .unwrap_or(NodeIndex::NONE);
            if sub.is_some() {
                // The slice subpattern sees the sequence type, not the
                // element type.
                bind_at_depth(ctx, binder, sub, input, depth + 1)
            } else {
                BoundPattern {
                    syntax: element_node,
                    input_type: input,
                    narrowed_type: input,
                    has_errors: false,
                    synthesized: true,
                    kind: BoundPatternKind::Discard,
                }
            }
        } else {
            bind_at_depth(ctx, binder, element_node, element_type, depth + 1)
        };
        has_errors |= bound.has_errors;
        elements.push(bound);
    }
    BoundPattern {
        syntax: node,
        input_type: input,
        narrowed_type: input,
        has_errors,
        synthesized: false,
        kind: BoundPatternKind::List { elements, slice },
    }
}

fn bind_relational(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_relational_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let operator = data.operator;
    let value = expr::bind_expression(ctx, binder, data.expression);
    let mut has_errors = value.has_errors;
    let Some(constant) = value.constant.filter(ConstantValue::is_numeric) else {
        return BoundPattern::error(node, input);
    };
    if !has_errors
        && !ctx.types.is_numeric(input)
        && input != TypeId::OBJECT
        && input != TypeId::DYNAMIC
        && input != TypeId::ERROR
    {
        let from = ctx.types.name_of(value.ty);
        let to = ctx.types.name_of(input);
        ctx.report(codes::NO_IMPLICIT_CONVERSION, node_span(ctx, node), &[&from, &to]);
        has_errors = true;
    }
    BoundPattern {
        syntax: node,
        input_type: input,
        narrowed_type: input,
        has_errors,
        synthesized: false,
        kind: BoundPatternKind::Relational {
            operator,
            value: constant,
        },
    }
}

fn bind_binary(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
    depth: usize,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_binary_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let (left_node, right_node) = (data.left, data.right);
    let is_conjunction = ctx.arena.kind_of(node) == k::AND_PATTERN;

    let left = bind_at_depth(ctx, binder, left_node, input, depth + 1);
    // A conjunction's right side sees the narrowed type; disjunction
    // operands both see the original input.
    let right_input = if is_conjunction { left.narrowed_type } else { input };
    let right = bind_at_depth(ctx, binder, right_node, right_input, depth + 1);

    let narrowed = if is_conjunction {
        right.narrowed_type
    } else if left.narrowed_type == right.narrowed_type {
        left.narrowed_type
    } else {
        input
    };
    BoundPattern {
        syntax: node,
        input_type: input,
        narrowed_type: narrowed,
        has_errors: left.has_errors || right.has_errors,
        synthesized: false,
        kind: BoundPatternKind::Binary {
            is_conjunction,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

fn bind_not(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
    input: TypeId,
    depth: usize,
) -> BoundPattern {
    let Some(data) = ctx.arena.get_unary_pattern(node) else {
        return BoundPattern::error(node, input);
    };
    let operand = bind_at_depth(ctx, binder, data.pattern, input, depth + 1);
    BoundPattern {
        syntax: node,
        input_type: input,
        // Negation learns nothing about the value on a match.
        narrowed_type: input,
        has_errors: operand.has_errors,
        synthesized: false,
        kind: BoundPatternKind::Negated {
            operand: Box::new(operand),
        },
    }
}

/// Pattern variables are declared ahead of binding as locals on the
/// containing member; absence is tolerated.
fn pattern_variable(
    ctx: &CheckerContext<'_>,
    binder: &Arc<Binder>,
    name: &str,
) -> Option<SymbolId> {
    let member = binder.containing_member_or_lambda()?;
    ctx.symbols
        .find_members(member, name)
        .find(|&id| ctx.symbols.get(id).kind == SymbolKind::Local)
}

fn member_type(ctx: &CheckerContext<'_>, container: TypeId, name: &str) -> Option<TypeId> {
    let symbol = ctx.symbols.type_symbol(container)?;
    ctx.symbols.find_members(symbol, name).find_map(|id| {
        let member = ctx.symbols.get(id);
        match member.kind {
            SymbolKind::Field | SymbolKind::Property => Some(member.ty),
            _ => None,
        }
    })
}
