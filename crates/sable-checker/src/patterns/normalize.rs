//! Pattern normalization.
//!
//! Rewrites a bound pattern into a tree whose only combinators are
//! top-level conjunction and disjunction over atomic tests:
//!
//! - negation is pushed inward past combinators De Morgan-style, ending
//!   up directly on atoms;
//! - a composite recursive pattern `T(p1, p2) { P: q }` is expanded into
//!   `T and T(p1, _) and T(_, p2) and T { P: q }`, each sub-pattern in
//!   its own conjunct so disjunctions nested inside one sub-pattern can
//!   be lifted to the top;
//! - patterns with no explicit type test (typeless recursive patterns,
//!   list patterns) gain an equivalent null/length check.
//!
//! Input types are re-threaded during reassembly: a conjunction's right
//! operand sees the left operand's narrowed type, a disjunction's
//! operands share the original input. Conjuncts the normalizer invents
//! carry `synthesized` so redundancies confined to them stay silent.

use sable_solver::ConstantValue;
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;

use crate::bound::{BoundPattern, BoundPatternKind};

pub(crate) fn normalize(pattern: &BoundPattern) -> BoundPattern {
    norm(pattern, false)
}

/// Normalize the logical negation of `pattern`. Redundancy hidden inside
/// a conjunction becomes visible once the same pattern is re-expressed,
/// via negation, as a disjunction.
pub(crate) fn normalize_negated(pattern: &BoundPattern) -> BoundPattern {
    norm(pattern, true)
}

fn norm(pattern: &BoundPattern, negate: bool) -> BoundPattern {
    match &pattern.kind {
        BoundPatternKind::Negated { operand } => norm(operand, !negate),
        BoundPatternKind::Binary {
            is_conjunction,
            left,
            right,
        } => {
            let conjunction = is_conjunction ^ negate;
            let left = norm(left, negate);
            let right = norm(right, negate);
            rebuild_binary(pattern, conjunction, left, right)
        }
        BoundPatternKind::Recursive { .. } if pattern.synthesized => {
            // A projection wrapper from an earlier expansion step: one
            // live sub-pattern, everything else a discard.
            let Some(inner) = live_sub(pattern) else {
                return atomize(pattern, negate);
            };
            let inner = norm(inner, negate);
            lift_disjunctions(pattern, inner)
        }
        BoundPatternKind::Recursive { .. } => {
            let expanded = expand_recursive(pattern);
            norm(&expanded, negate)
        }
        BoundPatternKind::List { .. } if !pattern.synthesized => {
            let expanded = expand_list(pattern);
            norm(&expanded, negate)
        }
        _ => atomize(pattern, negate),
    }
}

fn rebuild_binary(
    template: &BoundPattern,
    is_conjunction: bool,
    left: BoundPattern,
    mut right: BoundPattern,
) -> BoundPattern {
    let narrowed = if is_conjunction {
        right.input_type = left.narrowed_type;
        right.narrowed_type
    } else if left.narrowed_type == right.narrowed_type {
        left.narrowed_type
    } else {
        template.input_type
    };
    BoundPattern {
        syntax: template.syntax,
        input_type: template.input_type,
        narrowed_type: narrowed,
        has_errors: left.has_errors || right.has_errors,
        synthesized: template.synthesized,
        kind: BoundPatternKind::Binary {
            is_conjunction,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

fn atomize(pattern: &BoundPattern, negate: bool) -> BoundPattern {
    let atom = pattern.clone();
    if !negate {
        return atom;
    }
    BoundPattern {
        syntax: pattern.syntax,
        input_type: pattern.input_type,
        narrowed_type: pattern.input_type,
        has_errors: atom.has_errors,
        synthesized: true,
        kind: BoundPatternKind::Negated {
            operand: Box::new(atom),
        },
    }
}

/// `T(p1, p2) { P: q } x` becomes a conjunction headed by the type test
/// (or a null test when no type was written), followed by one projection
/// wrapper per written sub-pattern.
fn expand_recursive(pattern: &BoundPattern) -> BoundPattern {
    let BoundPatternKind::Recursive {
        ty,
        positional,
        properties,
        ..
    } = &pattern.kind
    else {
        return pattern.clone();
    };
    let ty = *ty;
    let mut conjuncts = Vec::new();
    conjuncts.push(head_test(pattern, ty));

    for (index, sub) in positional.iter().enumerate() {
        if matches!(sub.kind, BoundPatternKind::Discard) {
            continue;
        }
        let mut slots: Vec<BoundPattern> = positional
            .iter()
            .map(|slot| synthesized_discard(slot.syntax, slot.input_type))
            .collect();
        slots[index] = sub.clone();
        conjuncts.push(BoundPattern {
            syntax: sub.syntax,
            input_type: ty,
            narrowed_type: ty,
            has_errors: sub.has_errors,
            synthesized: true,
            kind: BoundPatternKind::Recursive {
                ty,
                positional: slots,
                properties: Vec::new(),
                variable: None,
            },
        });
    }

    for (name, sub) in properties {
        if matches!(sub.kind, BoundPatternKind::Discard) {
            continue;
        }
        conjuncts.push(BoundPattern {
            syntax: sub.syntax,
            input_type: ty,
            narrowed_type: ty,
            has_errors: sub.has_errors,
            synthesized: true,
            kind: BoundPatternKind::Recursive {
                ty,
                positional: Vec::new(),
                properties: vec![(name.clone(), sub.clone())],
                variable: None,
            },
        });
    }

    conjoin(pattern, conjuncts)
}

/// List patterns test length (and hence non-nullness) before elements.
fn expand_list(pattern: &BoundPattern) -> BoundPattern {
    let mut atom = pattern.clone();
    atom.synthesized = true;
    let null_test = not_null(pattern.syntax, pattern.input_type);
    conjoin(pattern, vec![null_test, atom])
}

fn head_test(pattern: &BoundPattern, ty: TypeId) -> BoundPattern {
    if ty != pattern.input_type {
        BoundPattern {
            syntax: pattern.syntax,
            input_type: pattern.input_type,
            narrowed_type: ty,
            has_errors: false,
            synthesized: true,
            kind: BoundPatternKind::Type { ty },
        }
    } else {
        not_null(pattern.syntax, pattern.input_type)
    }
}

fn not_null(syntax: NodeIndex, input: TypeId) -> BoundPattern {
    let null = BoundPattern {
        syntax,
        input_type: input,
        narrowed_type: input,
        has_errors: false,
        synthesized: true,
        kind: BoundPatternKind::Constant {
            value: ConstantValue::Null,
        },
    };
    BoundPattern {
        syntax,
        input_type: input,
        narrowed_type: input,
        has_errors: false,
        synthesized: true,
        kind: BoundPatternKind::Negated {
            operand: Box::new(null),
        },
    }
}

fn synthesized_discard(syntax: NodeIndex, input: TypeId) -> BoundPattern {
    BoundPattern {
        syntax,
        input_type: input,
        narrowed_type: input,
        has_errors: false,
        synthesized: true,
        kind: BoundPatternKind::Discard,
    }
}

fn conjoin(template: &BoundPattern, conjuncts: Vec<BoundPattern>) -> BoundPattern {
    let mut iter = conjuncts.into_iter();
    let first = match iter.next() {
        Some(first) => first,
        None => return synthesized_discard(template.syntax, template.input_type),
    };
    iter.fold(first, |acc, next| {
        let narrowed = next.narrowed_type;
        BoundPattern {
            syntax: template.syntax,
            input_type: template.input_type,
            narrowed_type: narrowed,
            has_errors: acc.has_errors || next.has_errors,
            synthesized: true,
            kind: BoundPatternKind::Binary {
                is_conjunction: true,
                left: Box::new(acc),
                right: Box::new(next),
            },
        }
    })
}

/// Pull disjunctions out of a projection wrapper:
/// `T { P: (a or b) }` becomes `T { P: a } or T { P: b }`.
fn lift_disjunctions(wrapper: &BoundPattern, inner: BoundPattern) -> BoundPattern {
    if let BoundPatternKind::Binary {
        is_conjunction: false,
        left,
        right,
    } = inner.kind
    {
        let left = lift_disjunctions(wrapper, *left);
        let right = lift_disjunctions(wrapper, *right);
        return BoundPattern {
            syntax: wrapper.syntax,
            input_type: wrapper.input_type,
            narrowed_type: wrapper.input_type,
            has_errors: left.has_errors || right.has_errors,
            synthesized: true,
            kind: BoundPatternKind::Binary {
                is_conjunction: false,
                left: Box::new(left),
                right: Box::new(right),
            },
        };
    }
    rebuild_wrapper(wrapper, inner)
}

/// The single non-discard slot of a projection wrapper.
fn live_sub(wrapper: &BoundPattern) -> Option<&BoundPattern> {
    let BoundPatternKind::Recursive {
        positional,
        properties,
        ..
    } = &wrapper.kind
    else {
        return None;
    };
    positional
        .iter()
        .find(|slot| !matches!(slot.kind, BoundPatternKind::Discard))
        .or_else(|| properties.first().map(|(_, sub)| sub))
}

fn rebuild_wrapper(wrapper: &BoundPattern, inner: BoundPattern) -> BoundPattern {
    let mut rebuilt = wrapper.clone();
    if let BoundPatternKind::Recursive {
        positional,
        properties,
        ..
    } = &mut rebuilt.kind
    {
        if let Some(slot) = positional
            .iter_mut()
            .find(|slot| !matches!(slot.kind, BoundPatternKind::Discard))
        {
            *slot = inner;
        } else if let Some((_, slot)) = properties.first_mut() {
            *slot = inner;
        }
    }
    rebuilt
}
