//! Decision DAG construction and label reachability.
//!
//! Cases are flattened into rows of primitive tests against projected
//! values. The DAG is explored test by test: the first remaining test of
//! the highest-priority row splits the residual problem into a true and
//! a false branch, with every row simplified under the branch assumption
//! (implied tests removed, contradicted rows dropped). Residual problems
//! are memoized by value, which is what merges common test prefixes
//! across cases. A case label never reached on any path is redundant.

use std::cmp::Ordering;

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashSet;
use sable_common::limits::MIN_REMAINING_STACK_BYTES;
use sable_solver::ConstantValue;
use sable_solver::types::{TypeId, TypeInterner};
use sable_syntax::arena::RelationalOperator;
use tracing::trace;

use crate::bound::{BoundPattern, BoundPatternKind};

/// Alternative-row blowup cap per case; analysis gives up past it rather
/// than risk exponential work on adversarial patterns.
const MAX_ROWS_PER_CASE: usize = 128;

/// Node cap for one DAG exploration.
const MAX_DAG_NODES: usize = 10_000;

const GROWN_STACK_BYTES: usize = 1 << 20;

/// One projection step from the match input to a tested value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum PathStep {
    Property(String),
    Positional(usize),
    Element(usize),
    ElementFromEnd(usize),
    Slice,
}

/// Numbers are compared exactly when integral and through f64 otherwise;
/// float bits make the representation hashable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Number {
    Int(i128),
    Float(u64),
}

impl Number {
    fn of(value: &ConstantValue) -> Option<Number> {
        if let Some(i) = value.as_i128() {
            return Some(Number::Int(i));
        }
        value.as_f64().map(|f| Number::Float(f.to_bits()))
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(bits) => f64::from_bits(bits),
        }
    }

    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TestKind {
    Null,
    NotNull,
    Type(TypeId),
    Constant {
        key: String,
        ty: TypeId,
        number: Option<Number>,
    },
    Relational {
        less: bool,
        strict: bool,
        number: Number,
    },
    Length {
        len: usize,
        or_more: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TestAtom {
    path: Vec<PathStep>,
    negated: bool,
    kind: TestKind,
}

impl TestAtom {
    fn negation(&self) -> TestAtom {
        // `not null` and `not (not null)` stay in positive form so the
        // Null/NotNull implication table applies.
        match (&self.kind, self.negated) {
            (TestKind::Null, false) => TestAtom {
                path: self.path.clone(),
                negated: false,
                kind: TestKind::NotNull,
            },
            (TestKind::NotNull, false) => TestAtom {
                path: self.path.clone(),
                negated: false,
                kind: TestKind::Null,
            },
            _ => TestAtom {
                path: self.path.clone(),
                negated: !self.negated,
                kind: self.kind.clone(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Row {
    pub label: usize,
    pub guarded: bool,
    atoms: Vec<TestAtom>,
}

// =============================================================================
// Row extraction
// =============================================================================

/// Flatten one case's pattern into alternative rows, one per reachable
/// disjunct. `None` means the pattern is outside what the analysis can
/// reason about (errors, blowup) and the whole check should be skipped.
pub(crate) fn rows_of(pattern: &BoundPattern, label: usize, guarded: bool) -> Option<Vec<Row>> {
    let alternatives = alternatives(pattern, &[])?;
    Some(
        alternatives
            .into_iter()
            .map(|atoms| Row {
                label,
                guarded,
                atoms,
            })
            .collect(),
    )
}

type Alternatives = Vec<Vec<TestAtom>>;

fn alternatives(pattern: &BoundPattern, path: &[PathStep]) -> Option<Alternatives> {
    match &pattern.kind {
        BoundPatternKind::Error => None,
        BoundPatternKind::Discard => Some(vec![vec![]]),
        BoundPatternKind::Constant { value } => {
            let kind = if matches!(value, ConstantValue::Null) {
                TestKind::Null
            } else {
                TestKind::Constant {
                    key: format!("{}:{}", value.type_id().0, value),
                    ty: value.type_id(),
                    number: Number::of(value),
                }
            };
            Some(vec![vec![TestAtom {
                path: path.to_vec(),
                negated: false,
                kind,
            }]])
        }
        BoundPatternKind::Type { ty } | BoundPatternKind::Declaration { ty, .. } => {
            let kind = if *ty == pattern.input_type {
                // Testing the static type still rules out null.
                TestKind::NotNull
            } else {
                TestKind::Type(*ty)
            };
            Some(vec![vec![TestAtom {
                path: path.to_vec(),
                negated: false,
                kind,
            }]])
        }
        BoundPatternKind::Relational { operator, value } => {
            let number = Number::of(value)?;
            let (less, strict) = match operator {
                RelationalOperator::LessThan => (true, true),
                RelationalOperator::LessThanOrEqual => (true, false),
                RelationalOperator::GreaterThan => (false, true),
                RelationalOperator::GreaterThanOrEqual => (false, false),
            };
            Some(vec![vec![TestAtom {
                path: path.to_vec(),
                negated: false,
                kind: TestKind::Relational {
                    less,
                    strict,
                    number,
                },
            }]])
        }
        BoundPatternKind::Binary {
            is_conjunction,
            left,
            right,
        } => {
            let left = alternatives(left, path)?;
            let right = alternatives(right, path)?;
            if *is_conjunction {
                cross(left, right)
            } else {
                let mut union = left;
                union.extend(right);
                (union.len() <= MAX_ROWS_PER_CASE).then_some(union)
            }
        }
        BoundPatternKind::Negated { operand } => {
            let inner = alternatives(operand, path)?;
            negate_alternatives(inner)
        }
        BoundPatternKind::Recursive {
            ty,
            positional,
            properties,
            ..
        } => {
            let mut acc: Alternatives = vec![vec![]];
            if *ty != pattern.input_type {
                acc = cross(
                    acc,
                    vec![vec![TestAtom {
                        path: path.to_vec(),
                        negated: false,
                        kind: TestKind::Type(*ty),
                    }]],
                )?;
            }
            for (index, sub) in positional.iter().enumerate() {
                if matches!(sub.kind, BoundPatternKind::Discard) {
                    continue;
                }
                let mut sub_path = path.to_vec();
                sub_path.push(PathStep::Positional(index));
                acc = cross(acc, alternatives(sub, &sub_path)?)?;
            }
            for (name, sub) in properties {
                if matches!(sub.kind, BoundPatternKind::Discard) {
                    continue;
                }
                let mut sub_path = path.to_vec();
                sub_path.push(PathStep::Property(name.clone()));
                acc = cross(acc, alternatives(sub, &sub_path)?)?;
            }
            Some(acc)
        }
        BoundPatternKind::List { elements, slice } => {
            let required = elements.len() - usize::from(slice.is_some());
            let mut acc: Alternatives = vec![vec![
                TestAtom {
                    path: path.to_vec(),
                    negated: false,
                    kind: TestKind::NotNull,
                },
                TestAtom {
                    path: path.to_vec(),
                    negated: false,
                    kind: TestKind::Length {
                        len: required,
                        or_more: slice.is_some(),
                    },
                },
            ]];
            for (index, element) in elements.iter().enumerate() {
                if matches!(element.kind, BoundPatternKind::Discard) {
                    continue;
                }
                let mut sub_path = path.to_vec();
                match slice {
                    Some(slice_index) if index == *slice_index => sub_path.push(PathStep::Slice),
                    Some(slice_index) if index > *slice_index => {
                        sub_path.push(PathStep::ElementFromEnd(elements.len() - 1 - index))
                    }
                    _ => sub_path.push(PathStep::Element(index)),
                }
                acc = cross(acc, alternatives(element, &sub_path)?)?;
            }
            Some(acc)
        }
    }
}

fn cross(left: Alternatives, right: Alternatives) -> Option<Alternatives> {
    let size = left.len().checked_mul(right.len())?;
    if size > MAX_ROWS_PER_CASE {
        return None;
    }
    let mut out = Vec::with_capacity(size);
    for l in &left {
        for r in &right {
            let mut atoms = l.clone();
            atoms.extend(r.iter().cloned());
            out.push(atoms);
        }
    }
    Some(out)
}

/// De Morgan over extracted rows: the negation of a disjunction of
/// conjunctions is the cross product of the per-row atom negations.
fn negate_alternatives(inner: Alternatives) -> Option<Alternatives> {
    let mut acc: Alternatives = vec![vec![]];
    for row in inner {
        if row.is_empty() {
            // Negating an always-true row: nothing matches.
            return Some(Vec::new());
        }
        let choices: Alternatives = row.iter().map(|atom| vec![atom.negation()]).collect();
        let mut next = Vec::new();
        for prefix in &acc {
            for choice in &choices {
                let mut atoms = prefix.clone();
                atoms.extend(choice.iter().cloned());
                next.push(atoms);
            }
        }
        if next.len() > MAX_ROWS_PER_CASE {
            return None;
        }
        acc = next;
    }
    Some(acc)
}

// =============================================================================
// Exploration
// =============================================================================

pub(crate) struct Reachability {
    reachable: FixedBitSet,
    /// The exploration hit a cap and gave up; all labels were marked
    /// reachable to keep the analysis quiet rather than wrong.
    pub gave_up: bool,
}

impl Reachability {
    pub fn is_reachable(&self, label: usize) -> bool {
        self.reachable.contains(label)
    }
}

pub(crate) fn analyze(types: &TypeInterner, rows: Vec<Row>, label_count: usize) -> Reachability {
    let mut explorer = Explorer {
        types,
        visited: FxHashSet::default(),
        reachable: FixedBitSet::with_capacity(label_count),
        nodes: 0,
        gave_up: false,
    };
    explorer.explore(rows);
    trace!(
        nodes = explorer.nodes,
        labels = label_count,
        gave_up = explorer.gave_up,
        "pattern decision dag explored"
    );
    if explorer.gave_up {
        explorer.reachable.insert_range(..);
    }
    Reachability {
        reachable: explorer.reachable,
        gave_up: explorer.gave_up,
    }
}

struct Explorer<'t> {
    types: &'t TypeInterner,
    visited: FxHashSet<Vec<Row>>,
    reachable: FixedBitSet,
    nodes: usize,
    gave_up: bool,
}

impl Explorer<'_> {
    fn explore(&mut self, rows: Vec<Row>) {
        if rows.is_empty() || self.gave_up {
            return;
        }
        let first = &rows[0];
        if first.atoms.is_empty() {
            self.reachable.insert(first.label);
            if first.guarded {
                // The guard may fail at runtime; later rows stay live.
                self.explore(rows[1..].to_vec());
            }
            return;
        }
        if self.visited.contains(&rows) {
            return;
        }
        self.nodes += 1;
        if self.nodes > MAX_DAG_NODES {
            self.gave_up = true;
            return;
        }
        let test = rows[0].atoms[0].clone();
        let negation = test.negation();
        let when_true = self.assume(&rows, &test);
        let when_false = self.assume(&rows, &negation);
        self.visited.insert(rows);
        stacker::maybe_grow(MIN_REMAINING_STACK_BYTES, GROWN_STACK_BYTES, || {
            self.explore(when_true);
            self.explore(when_false);
        });
    }

    /// Simplify every row under an established fact: atoms the fact
    /// implies are discharged, rows the fact contradicts are dropped.
    fn assume(&self, rows: &[Row], fact: &TestAtom) -> Vec<Row> {
        rows.iter()
            .filter_map(|row| {
                if row
                    .atoms
                    .iter()
                    .any(|atom| excludes(self.types, fact, atom))
                {
                    return None;
                }
                let atoms = row
                    .atoms
                    .iter()
                    .filter(|atom| !implies(self.types, fact, atom))
                    .cloned()
                    .collect();
                Some(Row {
                    label: row.label,
                    guarded: row.guarded,
                    atoms,
                })
            })
            .collect()
    }
}

// =============================================================================
// Implication
// =============================================================================

fn implies(types: &TypeInterner, a: &TestAtom, b: &TestAtom) -> bool {
    if a.path != b.path {
        return false;
    }
    match (a.negated, b.negated) {
        (false, false) => kind_implies(types, &a.kind, &b.kind),
        (false, true) => kind_excludes(types, &a.kind, &b.kind),
        (true, false) => false,
        (true, true) => kind_implies(types, &b.kind, &a.kind),
    }
}

fn excludes(types: &TypeInterner, a: &TestAtom, b: &TestAtom) -> bool {
    if a.path != b.path {
        return false;
    }
    match (a.negated, b.negated) {
        (false, false) => kind_excludes(types, &a.kind, &b.kind),
        (false, true) => kind_implies(types, &a.kind, &b.kind),
        (true, false) => kind_implies(types, &b.kind, &a.kind),
        (true, true) => false,
    }
}

fn kind_implies(types: &TypeInterner, a: &TestKind, b: &TestKind) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        // Everything but an explicit null test rules out null.
        (
            TestKind::Type(_)
            | TestKind::Constant { .. }
            | TestKind::Relational { .. }
            | TestKind::Length { .. },
            TestKind::NotNull,
        ) => true,
        (TestKind::Type(t), TestKind::Type(u)) => {
            *u == TypeId::OBJECT || types.is_subtype_of(*t, *u)
        }
        (TestKind::Constant { ty, .. }, TestKind::Type(u)) => {
            *u == TypeId::OBJECT || types.is_subtype_of(*ty, *u)
        }
        (
            TestKind::Constant {
                number: Some(n), ..
            },
            TestKind::Relational {
                less,
                strict,
                number,
            },
        ) => satisfies(*n, *less, *strict, *number),
        (
            TestKind::Relational {
                less: l1,
                strict: s1,
                number: n1,
            },
            TestKind::Relational {
                less: l2,
                strict: s2,
                number: n2,
            },
        ) => {
            if l1 != l2 {
                return false;
            }
            let Some(ordering) = n1.compare(*n2) else {
                return false;
            };
            let tighter = if *l1 { Ordering::Less } else { Ordering::Greater };
            ordering == tighter || (ordering == Ordering::Equal && (*s1 || !*s2))
        }
        (
            TestKind::Length {
                len: l1,
                or_more: m1,
            },
            TestKind::Length {
                len: l2,
                or_more: m2,
            },
        ) => match (m1, m2) {
            (false, true) | (true, true) => l1 >= l2,
            (false, false) => l1 == l2,
            (true, false) => false,
        },
        _ => false,
    }
}

fn kind_excludes(types: &TypeInterner, a: &TestKind, b: &TestKind) -> bool {
    kind_excludes_dir(types, a, b) || kind_excludes_dir(types, b, a)
}

fn kind_excludes_dir(types: &TypeInterner, a: &TestKind, b: &TestKind) -> bool {
    match (a, b) {
        (
            TestKind::Null,
            TestKind::NotNull
            | TestKind::Type(_)
            | TestKind::Constant { .. }
            | TestKind::Relational { .. }
            | TestKind::Length { .. },
        ) => true,
        (TestKind::Constant { key: k1, .. }, TestKind::Constant { key: k2, .. }) => k1 != k2,
        (
            TestKind::Constant {
                number: Some(n), ..
            },
            TestKind::Relational {
                less,
                strict,
                number,
            },
        ) => !satisfies(*n, *less, *strict, *number),
        (
            TestKind::Relational {
                less: true,
                strict: s1,
                number: n1,
            },
            TestKind::Relational {
                less: false,
                strict: s2,
                number: n2,
            },
        ) => match n1.compare(*n2) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => *s1 || *s2,
            _ => false,
        },
        // Distinct value types never hold the same value.
        (TestKind::Type(t), TestKind::Type(u)) => {
            t != u
                && types.is_value_type(*t)
                && types.is_value_type(*u)
                && !types.is_subtype_of(*t, *u)
                && !types.is_subtype_of(*u, *t)
        }
        (TestKind::Constant { ty, .. }, TestKind::Type(u)) => {
            ty != u
                && types.is_value_type(*ty)
                && types.is_value_type(*u)
                && !types.is_subtype_of(*ty, *u)
        }
        (
            TestKind::Length {
                len: l1,
                or_more: m1,
            },
            TestKind::Length {
                len: l2,
                or_more: m2,
            },
        ) => match (m1, m2) {
            (false, false) => l1 != l2,
            (false, true) => l1 < l2,
            _ => false,
        },
        _ => false,
    }
}

fn satisfies(n: Number, less: bool, strict: bool, bound: Number) -> bool {
    let Some(ordering) = n.compare(bound) else {
        return false;
    };
    match (less, strict) {
        (true, true) => ordering == Ordering::Less,
        (true, false) => ordering != Ordering::Greater,
        (false, true) => ordering == Ordering::Greater,
        (false, false) => ordering != Ordering::Less,
    }
}
