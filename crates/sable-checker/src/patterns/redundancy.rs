//! Redundancy detection over normalized patterns.
//!
//! Two passes per pattern: the normalized pattern and its normalized
//! negation. Each disjunction cluster in the tree is analyzed as an
//! ordered case list (first match wins); a disjunct whose label the
//! decision DAG never reaches is redundant. Redundancy confined to
//! synthesized sub-patterns is suppressed, and a finding is escalated
//! from hidden to warning only when a `not` pattern sits to the left of
//! the redundant node in an enclosing binary chain. Switch arms add
//! their preceding arms as higher-priority cases so cross-arm shadowing
//! is caught too.

use rustc_hash::FxHashSet;
use sable_common::diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes as codes};
use sable_common::limits::MAX_PATTERN_DEPTH;
use sable_syntax::NodeIndex;

use crate::bound::{BoundPattern, BoundPatternKind};
use crate::calls::node_span;
use crate::context::CheckerContext;

use super::PatternCase;
use super::dag;
use super::normalize;

/// Redundancy analysis of a standalone `is`-pattern.
pub fn check_is_pattern(ctx: &mut CheckerContext<'_>, pattern: &BoundPattern) {
    if pattern.has_errors {
        return;
    }
    if pattern_depth(pattern) > MAX_PATTERN_DEPTH {
        ctx.report(codes::PATTERN_TOO_DEEP, node_span(ctx, pattern.syntax), &[]);
        return;
    }
    let escalate = escalation_set(pattern);
    let mut reported = FxHashSet::default();

    let normalized = normalize::normalize(pattern);
    // A pattern that cannot match anything is redundant as a whole.
    if let Some(rows) = dag::rows_of(&normalized, 0, false) {
        let outcome = dag::analyze(ctx.types, rows, 1);
        if !outcome.gave_up && !outcome.is_reachable(0) {
            report_redundant(
                ctx,
                pattern.syntax,
                escalate.contains(&pattern.syntax),
                &mut reported,
            );
        }
    }
    walk_clusters(ctx, &[], 0, &normalized, &escalate, &mut reported);

    let negated = normalize::normalize_negated(pattern);
    walk_clusters(ctx, &[], 0, &negated, &escalate, &mut reported);
}

/// Redundancy and subsumption analysis of an ordered case list from a
/// switch statement or expression.
pub fn check_cases(ctx: &mut CheckerContext<'_>, cases: &[PatternCase<'_>], in_switch_statement: bool) {
    if cases.is_empty() {
        return;
    }

    let mut all_rows: Vec<Option<Vec<dag::Row>>> = Vec::with_capacity(cases.len());
    for (index, case) in cases.iter().enumerate() {
        if case.pattern.has_errors {
            all_rows.push(None);
            continue;
        }
        if pattern_depth(case.pattern) > MAX_PATTERN_DEPTH {
            ctx.report(codes::PATTERN_TOO_DEEP, case.span, &[]);
            all_rows.push(None);
            continue;
        }
        let normalized = normalize::normalize(case.pattern);
        all_rows.push(dag::rows_of(&normalized, index, case.has_guard));
    }

    // Cross-case subsumption over the longest analyzable prefix.
    let mut combined = Vec::new();
    let mut clean = 0;
    for rows in &all_rows {
        let Some(rows) = rows else { break };
        combined.extend(rows.iter().cloned());
        clean += 1;
    }
    if clean > 1 {
        let outcome = dag::analyze(ctx.types, combined, clean);
        if !outcome.gave_up {
            for (index, case) in cases.iter().enumerate().take(clean) {
                if !outcome.is_reachable(index) {
                    ctx.report(codes::SWITCH_CASE_SUBSUMED, case.span, &[]);
                }
            }
        }
    }

    // Per-arm disjunct redundancy; in a switch the preceding arms count
    // as higher-priority cases.
    let mut reported = FxHashSet::default();
    for (index, case) in cases.iter().enumerate() {
        if case.pattern.has_errors {
            continue;
        }
        let preceding: Vec<dag::Row> = if in_switch_statement {
            all_rows[..index]
                .iter()
                .flatten()
                .flat_map(|rows| rows.iter().cloned())
                .collect()
        } else {
            Vec::new()
        };
        let escalate = escalation_set(case.pattern);
        let normalized = normalize::normalize(case.pattern);
        walk_clusters(ctx, &preceding, index, &normalized, &escalate, &mut reported);
        let negated = normalize::normalize_negated(case.pattern);
        walk_clusters(ctx, &preceding, index, &negated, &escalate, &mut reported);
    }
}

/// Find every disjunction cluster in a normalized pattern and analyze
/// its alternatives as cases. `base_label` must exceed every label used
/// by `preceding`.
fn walk_clusters(
    ctx: &mut CheckerContext<'_>,
    preceding: &[dag::Row],
    base_label: usize,
    pattern: &BoundPattern,
    escalate: &FxHashSet<NodeIndex>,
    reported: &mut FxHashSet<NodeIndex>,
) {
    match &pattern.kind {
        BoundPatternKind::Binary {
            is_conjunction: false,
            ..
        } => {
            let mut parts = Vec::new();
            disjuncts(pattern, &mut parts);
            analyze_cluster(ctx, preceding, base_label, &parts, escalate, reported);
            for part in parts {
                walk_clusters(ctx, preceding, base_label, part, escalate, reported);
            }
        }
        BoundPatternKind::Binary { left, right, .. } => {
            walk_clusters(ctx, preceding, base_label, left, escalate, reported);
            walk_clusters(ctx, preceding, base_label, right, escalate, reported);
        }
        BoundPatternKind::Negated { operand } => {
            walk_clusters(ctx, preceding, base_label, operand, escalate, reported);
        }
        BoundPatternKind::Recursive {
            positional,
            properties,
            ..
        } => {
            for sub in positional {
                walk_clusters(ctx, preceding, base_label, sub, escalate, reported);
            }
            for (_, sub) in properties {
                walk_clusters(ctx, preceding, base_label, sub, escalate, reported);
            }
        }
        BoundPatternKind::List { elements, .. } => {
            for element in elements {
                walk_clusters(ctx, preceding, base_label, element, escalate, reported);
            }
        }
        _ => {}
    }
}

fn analyze_cluster(
    ctx: &mut CheckerContext<'_>,
    preceding: &[dag::Row],
    base_label: usize,
    parts: &[&BoundPattern],
    escalate: &FxHashSet<NodeIndex>,
    reported: &mut FxHashSet<NodeIndex>,
) {
    let mut rows = preceding.to_vec();
    for (offset, part) in parts.iter().enumerate() {
        let Some(part_rows) = dag::rows_of(part, base_label + offset, false) else {
            return;
        };
        rows.extend(part_rows);
    }
    let outcome = dag::analyze(ctx.types, rows, base_label + parts.len());
    if outcome.gave_up {
        return;
    }
    for (offset, part) in parts.iter().enumerate() {
        if !outcome.is_reachable(base_label + offset) && !part.synthesized {
            report_redundant(ctx, part.syntax, escalate.contains(&part.syntax), reported);
        }
    }
}

fn disjuncts<'a>(pattern: &'a BoundPattern, out: &mut Vec<&'a BoundPattern>) {
    if let BoundPatternKind::Binary {
        is_conjunction: false,
        left,
        right,
    } = &pattern.kind
    {
        disjuncts(left, out);
        disjuncts(right, out);
    } else {
        out.push(pattern);
    }
}

fn report_redundant(
    ctx: &mut CheckerContext<'_>,
    syntax: NodeIndex,
    escalate: bool,
    reported: &mut FxHashSet<NodeIndex>,
) {
    if !reported.insert(syntax) {
        return;
    }
    let span = node_span(ctx, syntax);
    let diagnostic = if escalate {
        Diagnostic::with_category(codes::REDUNDANT_PATTERN, span, &[], DiagnosticCategory::Warning)
    } else {
        Diagnostic::new(codes::REDUNDANT_PATTERN, span, &[])
    };
    ctx.add_diagnostic(diagnostic);
}

/// Syntax nodes with a user-written `not` somewhere to their left in an
/// enclosing binary chain; redundancies at these nodes get escalated.
fn escalation_set(pattern: &BoundPattern) -> FxHashSet<NodeIndex> {
    let mut set = FxHashSet::default();
    mark_escalation(pattern, false, &mut set);
    set
}

fn mark_escalation(pattern: &BoundPattern, not_on_left: bool, set: &mut FxHashSet<NodeIndex>) {
    if not_on_left {
        set.insert(pattern.syntax);
    }
    match &pattern.kind {
        BoundPatternKind::Binary { left, right, .. } => {
            mark_escalation(left, not_on_left, set);
            mark_escalation(right, not_on_left || has_negation(left), set);
        }
        BoundPatternKind::Negated { operand } => mark_escalation(operand, not_on_left, set),
        BoundPatternKind::Recursive {
            positional,
            properties,
            ..
        } => {
            for sub in positional {
                mark_escalation(sub, not_on_left, set);
            }
            for (_, sub) in properties {
                mark_escalation(sub, not_on_left, set);
            }
        }
        BoundPatternKind::List { elements, .. } => {
            for element in elements {
                mark_escalation(element, not_on_left, set);
            }
        }
        _ => {}
    }
}

fn has_negation(pattern: &BoundPattern) -> bool {
    match &pattern.kind {
        BoundPatternKind::Negated { .. } => true,
        BoundPatternKind::Binary { left, right, .. } => has_negation(left) || has_negation(right),
        BoundPatternKind::Recursive {
            positional,
            properties,
            ..
        } => {
            positional.iter().any(has_negation)
                || properties.iter().any(|(_, sub)| has_negation(sub))
        }
        BoundPatternKind::List { elements, .. } => elements.iter().any(has_negation),
        _ => false,
    }
}

fn pattern_depth(pattern: &BoundPattern) -> usize {
    let children = match &pattern.kind {
        BoundPatternKind::Binary { left, right, .. } => {
            pattern_depth(left).max(pattern_depth(right))
        }
        BoundPatternKind::Negated { operand } => pattern_depth(operand),
        BoundPatternKind::Recursive {
            positional,
            properties,
            ..
        } => positional
            .iter()
            .map(pattern_depth)
            .chain(properties.iter().map(|(_, sub)| pattern_depth(sub)))
            .max()
            .unwrap_or(0),
        BoundPatternKind::List { elements, .. } => {
            elements.iter().map(pattern_depth).max().unwrap_or(0)
        }
        _ => 0,
    };
    children.saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{PatternCase, bind_pattern};
    use crate::testing::{TestCompilation, TestSetup};
    use sable_binder::{Binder, BinderFlags, Symbol, SymbolId, SymbolKind};
    use sable_common::TextSpan;
    use sable_solver::types::{NamedTypeData, TypeId};
    use sable_syntax::NodeList;
    use sable_syntax::arena::{RelationalOperator, SyntaxLiteral};

    fn span() -> TextSpan {
        TextSpan::new(0, 10)
    }

    fn int_pattern(s: &mut TestSetup, value: i32) -> NodeIndex {
        let literal = s.builder.literal(span(), SyntaxLiteral::I32(value));
        s.builder.constant_pattern(span(), literal)
    }

    /// `Base or Derived` over a two-level class hierarchy.
    fn base_or_derived(s: &mut TestSetup) -> NodeIndex {
        let base_ty = s.types.add_named(NamedTypeData {
            name: "Base".into(),
            base: Some(TypeId::OBJECT),
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        });
        let derived_ty = s.types.add_named(NamedTypeData {
            name: "Derived".into(),
            base: Some(base_ty),
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        });
        s.symbols.add(
            Symbol::new("Base", SymbolKind::NamedType, SymbolId::NONE).with_type(base_ty),
        );
        s.symbols.add(
            Symbol::new("Derived", SymbolKind::NamedType, SymbolId::NONE).with_type(derived_ty),
        );
        let base_name = s.builder.identifier(span(), "Base");
        let derived_name = s.builder.identifier(span(), "Derived");
        let base_pattern = s.builder.type_pattern(span(), base_name);
        let derived_pattern = s.builder.type_pattern(span(), derived_name);
        s.builder.binary_pattern(span(), false, base_pattern, derived_pattern)
    }

    fn bind_cases(
        ctx: &mut CheckerContext<'static>,
        nodes: &[NodeIndex],
        input: TypeId,
    ) -> Vec<BoundPattern> {
        let binder = Binder::buck_stops(BinderFlags::empty());
        nodes
            .iter()
            .map(|&node| bind_pattern(ctx, &binder, node, input))
            .collect()
    }

    fn to_cases(patterns: &[BoundPattern]) -> Vec<PatternCase<'_>> {
        patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| PatternCase {
                pattern,
                has_guard: false,
                span: TextSpan::new(index as u32 * 10, 10),
            })
            .collect()
    }

    #[test]
    fn a_duplicated_constant_case_is_subsumed() {
        let mut nodes = Vec::new();
        let comp = TestCompilation::build(|s| {
            nodes.push(int_pattern(s, 1));
            nodes.push(int_pattern(s, 1));
            nodes.push(s.builder.discard_pattern(span()));
            s.members.extend(nodes.iter().copied());
        });
        let mut ctx = comp.context();
        let patterns = bind_cases(&mut ctx, &nodes, TypeId::I32);
        let cases = to_cases(&patterns);
        check_cases(&mut ctx, &cases, true);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::SWITCH_CASE_SUBSUMED);
        assert_eq!(reported[0].span, TextSpan::new(10, 10));
    }

    #[test]
    fn an_object_binding_shadows_a_later_int_case() {
        let mut nodes = Vec::new();
        let comp = TestCompilation::build(|s| {
            let object_name = s.builder.predefined_type(span(), "object");
            nodes.push(
                s.builder
                    .declaration_pattern(span(), object_name, Some("o".to_string())),
            );
            let int_name = s.builder.predefined_type(span(), "int");
            nodes.push(s.builder.type_pattern(span(), int_name));
            nodes.push(s.builder.discard_pattern(span()));
            s.members.extend(nodes.iter().copied());
        });
        let mut ctx = comp.context();
        let patterns = bind_cases(&mut ctx, &nodes, TypeId::OBJECT);
        let cases = to_cases(&patterns);
        check_cases(&mut ctx, &cases, true);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::SWITCH_CASE_SUBSUMED);
        assert_eq!(reported[0].span, TextSpan::new(10, 10));
    }

    #[test]
    fn a_guarded_case_does_not_subsume_a_duplicate() {
        let mut nodes = Vec::new();
        let comp = TestCompilation::build(|s| {
            nodes.push(int_pattern(s, 1));
            nodes.push(int_pattern(s, 1));
            s.members.extend(nodes.iter().copied());
        });
        let mut ctx = comp.context();
        let patterns = bind_cases(&mut ctx, &nodes, TypeId::I32);
        let mut cases = to_cases(&patterns);
        cases[0].has_guard = true;
        check_cases(&mut ctx, &cases, true);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn a_self_contradictory_conjunction_is_redundant() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let left = int_pattern(s, 42);
            let right = int_pattern(s, 42);
            let negated = s.builder.not_pattern(span(), right);
            node = s.builder.binary_pattern(span(), true, left, negated);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let pattern = bind_pattern(&mut ctx, &binder, node, TypeId::I32);
        check_is_pattern(&mut ctx, &pattern);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::REDUNDANT_PATTERN);
        assert_eq!(reported[0].category, DiagnosticCategory::Hidden);
    }

    #[test]
    fn a_subtype_disjunct_after_its_base_is_redundant() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            node = base_or_derived(s);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let pattern = bind_pattern(&mut ctx, &binder, node, TypeId::OBJECT);
        check_is_pattern(&mut ctx, &pattern);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::REDUNDANT_PATTERN);
        assert_eq!(reported[0].category, DiagnosticCategory::Hidden);
    }

    #[test]
    fn negation_exposes_shadowing_inside_a_not_pattern() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let or = base_or_derived(s);
            node = s.builder.not_pattern(span(), or);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let pattern = bind_pattern(&mut ctx, &binder, node, TypeId::OBJECT);
        check_is_pattern(&mut ctx, &pattern);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::REDUNDANT_PATTERN);
    }

    #[test]
    fn a_length_range_on_string_is_not_flagged() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let string_symbol = s.symbols.add(
                Symbol::new("String", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::STRING),
            );
            s.symbols.add(
                Symbol::new("Length", SymbolKind::Field, string_symbol).with_type(TypeId::I32),
            );
            let null_literal = s.builder.literal(span(), SyntaxLiteral::Null);
            let null_pattern = s.builder.constant_pattern(span(), null_literal);
            let not_null = s.builder.not_pattern(span(), null_pattern);
            let zero = int_pattern(s, 0);
            let one = int_pattern(s, 1);
            let zero_or_one = s.builder.binary_pattern(span(), false, zero, one);
            let length = s
                .builder
                .subpattern(span(), Some("Length".to_string()), zero_or_one);
            let properties = NodeList::new(vec![length]);
            let recursive = s.builder.recursive_pattern(
                span(),
                NodeIndex::NONE,
                None,
                Some(properties),
                None,
            );
            node = s.builder.binary_pattern(span(), true, not_null, recursive);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let pattern = bind_pattern(&mut ctx, &binder, node, TypeId::STRING);
        check_is_pattern(&mut ctx, &pattern);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn sign_trichotomy_cases_are_all_reachable() {
        let mut nodes = Vec::new();
        let comp = TestCompilation::build(|s| {
            let below = s.builder.literal(span(), SyntaxLiteral::I32(0));
            nodes.push(
                s.builder
                    .relational_pattern(span(), RelationalOperator::LessThan, below),
            );
            nodes.push(int_pattern(s, 0));
            let above = s.builder.literal(span(), SyntaxLiteral::I32(0));
            nodes.push(s.builder.relational_pattern(
                span(),
                RelationalOperator::GreaterThan,
                above,
            ));
            nodes.push(s.builder.discard_pattern(span()));
            s.members.extend(nodes.iter().copied());
        });
        let mut ctx = comp.context();
        let patterns = bind_cases(&mut ctx, &nodes, TypeId::I32);
        let cases = to_cases(&patterns);
        check_cases(&mut ctx, &cases, true);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn redundancy_to_the_right_of_a_negation_is_a_warning() {
        let mut node = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let one = int_pattern(s, 1);
            let not_one = s.builder.not_pattern(span(), one);
            let two_a = int_pattern(s, 2);
            let two_b = int_pattern(s, 2);
            let twos = s.builder.binary_pattern(span(), false, two_a, two_b);
            node = s.builder.binary_pattern(span(), true, not_one, twos);
            s.members.push(node);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let pattern = bind_pattern(&mut ctx, &binder, node, TypeId::I32);
        check_is_pattern(&mut ctx, &pattern);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::REDUNDANT_PATTERN);
        assert_eq!(reported[0].category, DiagnosticCategory::Warning);
    }
}
