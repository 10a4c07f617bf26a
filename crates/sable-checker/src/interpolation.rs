//! Interpolated-string lowering.
//!
//! The strategy is chosen eagerly from the bound parts, before any call
//! sequence is built. The choice feeds diagnostics: ref struct holes are
//! only legal under the builder strategy, and a builder with inconsistent
//! append return types is rejected here rather than at each call site.
//! `$"..." + $"..."` chains are flattened into one part sequence first so
//! the whole chain lowers as a single unit.

use std::sync::Arc;

use sable_binder::{Binder, SymbolId, WellKnownMember};
use sable_common::diagnostics::diagnostic_codes as codes;
use sable_solver::ConstantValue;
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;
use sable_syntax::kinds::syntax_kind as k;

use crate::bound::{
    BoundExpr, BoundExprKind, BoundInterpolation, BoundInterpolationPart, BuilderAppend,
    InterpolationStrategy,
};
use crate::calls::node_span;
use crate::context::CheckerContext;
use crate::conversions::{coerce, span_of};
use crate::expr;

/// Direct concatenation stops paying off past this many parts unless the
/// runtime has a no-intermediate-array concat primitive.
const MAX_DIRECT_CONCAT_PARTS: usize = 4;

pub fn bind_interpolated_string(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundExpr {
    let Some(data) = ctx.arena.get_interpolated_string(node) else {
        return BoundExpr::error(node);
    };
    let part_nodes: Vec<NodeIndex> = data.parts.iter().collect();
    let parts = bind_parts(ctx, binder, &part_nodes);
    lower(ctx, binder, node, parts)
}

/// Lower a `+`-chained sequence of interpolated-string literals as one
/// merged part list. `leaves` are the chain's literals in source order;
/// `root` is the outermost `+` node the result hangs off.
pub(crate) fn bind_chain(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    root: NodeIndex,
    leaves: &[NodeIndex],
) -> BoundExpr {
    let mut parts = Vec::new();
    for &leaf in leaves {
        let Some(data) = ctx.arena.get_interpolated_string(leaf) else {
            continue;
        };
        let part_nodes: Vec<NodeIndex> = data.parts.iter().collect();
        parts.extend(bind_parts(ctx, binder, &part_nodes));
    }
    lower(ctx, binder, root, parts)
}

fn bind_parts(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    part_nodes: &[NodeIndex],
) -> Vec<BoundInterpolationPart> {
    let mut parts = Vec::with_capacity(part_nodes.len());
    for &part in part_nodes {
        match ctx.arena.kind_of(part) {
            k::INTERPOLATED_STRING_TEXT => {
                if let Some(data) = ctx.arena.get_interpolated_text(part) {
                    parts.push(BoundInterpolationPart::Text {
                        syntax: part,
                        text: data.text.clone(),
                    });
                }
            }
            k::INTERPOLATION => {
                let Some(data) = ctx.arena.get_interpolation(part) else {
                    continue;
                };
                let (value_node, alignment_node) = (data.expression, data.alignment);
                let format = data.format.clone();
                let value = expr::bind_expression(ctx, binder, value_node);
                let alignment = if alignment_node.is_some() {
                    let checked = ctx.is_checked(binder.checked_state());
                    let bound = expr::bind_expression(ctx, binder, alignment_node);
                    Some(coerce(ctx, bound, TypeId::I32, checked))
                } else {
                    None
                };
                parts.push(BoundInterpolationPart::Hole {
                    syntax: part,
                    value,
                    alignment,
                    format,
                });
            }
            _ => {}
        }
    }
    parts
}

fn lower(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    syntax: NodeIndex,
    parts: Vec<BoundInterpolationPart>,
) -> BoundExpr {
    let strategy = choose_strategy(ctx, &parts);
    let mut has_errors = parts.iter().any(BoundInterpolationPart::has_errors);

    if strategy != InterpolationStrategy::Builder {
        check_ref_like_holes(ctx, &parts, &mut has_errors);
    }

    let (kind, constant) = match strategy {
        InterpolationStrategy::Constant => {
            let value = fold_parts(&parts);
            let constant = ConstantValue::String(value.clone());
            (BoundInterpolation::Constant { value }, Some(constant))
        }
        InterpolationStrategy::Concatenation => (lower_concatenation(parts), None),
        InterpolationStrategy::Builder => (
            lower_builder(ctx, syntax, parts, &mut has_errors),
            None,
        ),
        InterpolationStrategy::FormatString => (
            lower_format_string(ctx, binder, syntax, parts, &mut has_errors),
            None,
        ),
    };
    BoundExpr {
        syntax,
        ty: TypeId::STRING,
        constant,
        has_errors,
        kind: BoundExprKind::InterpolatedString(Box::new(kind)),
    }
}

/// The four-way choice, made before anything is lowered.
fn choose_strategy(
    ctx: &CheckerContext<'_>,
    parts: &[BoundInterpolationPart],
) -> InterpolationStrategy {
    let mut all_constant = true;
    let mut all_string = true;
    for part in parts {
        if let BoundInterpolationPart::Hole {
            value,
            alignment,
            format,
            ..
        } = part
        {
            if alignment.is_some() || format.is_some() {
                all_constant = false;
                all_string = false;
            }
            if value.string_constant().is_none() {
                all_constant = false;
            }
            if value.ty != TypeId::STRING {
                all_string = false;
            }
        }
    }
    if all_constant {
        return InterpolationStrategy::Constant;
    }
    let concat_fits =
        parts.len() <= MAX_DIRECT_CONCAT_PARTS || ctx.well_known.has_concat_multi();
    if all_string
        && concat_fits
        && ctx
            .well_known
            .member(WellKnownMember::StringConcat2)
            .is_some()
    {
        return InterpolationStrategy::Concatenation;
    }
    if ctx.well_known.handler_type.is_some() {
        return InterpolationStrategy::Builder;
    }
    InterpolationStrategy::FormatString
}

/// Ref struct values never survive boxing or a params array, so outside
/// the builder strategy a ref-like hole is an error.
fn check_ref_like_holes(
    ctx: &mut CheckerContext<'_>,
    parts: &[BoundInterpolationPart],
    has_errors: &mut bool,
) {
    for part in parts {
        if let BoundInterpolationPart::Hole { value, .. } = part
            && ctx.types.is_ref_like(value.ty)
        {
            let name = ctx.types.name_of(value.ty);
            let span = span_of(ctx, value);
            ctx.report(codes::REF_STRUCT_INTERPOLATION_HOLE, span, &[&name]);
            *has_errors = true;
        }
    }
}

fn fold_parts(parts: &[BoundInterpolationPart]) -> Arc<str> {
    let mut out = String::new();
    for part in parts {
        match part {
            BoundInterpolationPart::Text { text, .. } => out.push_str(text),
            BoundInterpolationPart::Hole { value, .. } => {
                if let Some(s) = value.string_constant() {
                    out.push_str(s);
                }
            }
        }
    }
    Arc::from(out.as_str())
}

fn lower_concatenation(parts: Vec<BoundInterpolationPart>) -> BoundInterpolation {
    let operands = parts
        .into_iter()
        .map(|part| match part {
            BoundInterpolationPart::Text { syntax, text } => BoundExpr::literal(
                syntax,
                TypeId::STRING,
                ConstantValue::String(Arc::from(text.as_str())),
            ),
            BoundInterpolationPart::Hole { value, .. } => value,
        })
        .collect();
    BoundInterpolation::Concatenation { operands }
}

fn lower_builder(
    ctx: &mut CheckerContext<'_>,
    syntax: NodeIndex,
    parts: Vec<BoundInterpolationPart>,
    has_errors: &mut bool,
) -> BoundInterpolation {
    let literal_returns_bool = append_returns_bool(ctx, WellKnownMember::HandlerAppendLiteral);
    let formatted_returns_bool =
        append_returns_bool(ctx, WellKnownMember::HandlerAppendFormatted);

    let uses_literal = parts
        .iter()
        .any(|p| matches!(p, BoundInterpolationPart::Text { .. }));
    let uses_formatted = parts
        .iter()
        .any(|p| matches!(p, BoundInterpolationPart::Hole { .. }));
    if uses_literal && uses_formatted && literal_returns_bool != formatted_returns_bool {
        // One diagnostic for the whole literal, not one per append.
        let name = ctx
            .well_known
            .handler_type
            .map(|ty| ctx.types.name_of(ty))
            .unwrap_or_default();
        ctx.report(codes::MIXED_APPEND_RETURNS, node_span(ctx, syntax), &[&name]);
        *has_errors = true;
    }

    let appends = parts
        .into_iter()
        .map(|part| match part {
            BoundInterpolationPart::Text { text, .. } => BuilderAppend::Literal {
                text,
                returns_bool: literal_returns_bool,
            },
            BoundInterpolationPart::Hole {
                value,
                alignment,
                format,
                ..
            } => BuilderAppend::Formatted {
                value,
                alignment,
                format,
                returns_bool: formatted_returns_bool,
            },
        })
        .collect();
    BoundInterpolation::Builder { appends }
}

fn append_returns_bool(ctx: &CheckerContext<'_>, member: WellKnownMember) -> bool {
    ctx.well_known
        .member(member)
        .and_then(|id| ctx.symbols.try_get(SymbolId(id)))
        .and_then(|symbol| symbol.signature.as_ref())
        .is_some_and(|signature| signature.return_type == TypeId::BOOLEAN)
}

fn lower_format_string(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    syntax: NodeIndex,
    parts: Vec<BoundInterpolationPart>,
    has_errors: &mut bool,
) -> BoundInterpolation {
    if ctx.well_known.member(WellKnownMember::StringFormat).is_none() {
        let span = node_span(ctx, syntax);
        ctx.well_known
            .report_missing(&mut ctx.diagnostics, "string.Format", span);
        *has_errors = true;
    }
    let checked = ctx.is_checked(binder.checked_state());

    let mut template = String::new();
    let mut arguments = Vec::new();
    for part in parts {
        match part {
            BoundInterpolationPart::Text { text, .. } => {
                for ch in text.chars() {
                    match ch {
                        '{' => template.push_str("{{"),
                        '}' => template.push_str("}}"),
                        other => template.push(other),
                    }
                }
            }
            BoundInterpolationPart::Hole {
                value,
                alignment,
                format,
                ..
            } => {
                template.push('{');
                template.push_str(&arguments.len().to_string());
                if let Some(alignment) = &alignment
                    && let Some(width) = alignment.constant.as_ref().and_then(ConstantValue::as_i128)
                {
                    template.push(',');
                    template.push_str(&width.to_string());
                }
                if let Some(format) = &format {
                    template.push(':');
                    template.push_str(format);
                }
                template.push('}');
                // Holes with no statically known type go through object.
                let value = if value.is_dynamic() || value.ty == TypeId::ERROR {
                    coerce(ctx, value, TypeId::OBJECT, checked)
                } else {
                    value
                };
                arguments.push(value);
            }
        }
    }
    BoundInterpolation::FormatString {
        template,
        arguments,
    }
}
