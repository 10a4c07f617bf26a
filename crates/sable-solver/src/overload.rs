//! Overload resolution over candidate signatures.
//!
//! The checker adapts method symbols into `OverloadCandidate` values and
//! argument expressions into `ArgumentInfo`; resolution here is purely
//! data-level. Candidates are tried in normal form first and in
//! params-expanded form second, then the applicable set is reduced by
//! betterness to a unique winner or an ambiguity.

use smallvec::SmallVec;

use crate::const_value::ConstantValue;
use crate::convert::{Conversion, classify_conversion};
use crate::types::{TypeId, TypeInterner};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefKind {
    None,
    Ref,
    Out,
    In,
}

#[derive(Clone, Debug)]
pub struct ParameterSignature {
    pub name: String,
    pub ty: TypeId,
    pub ref_kind: RefKind,
    /// Collects trailing arguments into an array in expanded form. Only
    /// meaningful on the last parameter.
    pub is_params: bool,
    pub is_optional: bool,
}

impl ParameterSignature {
    pub fn by_value(name: &str, ty: TypeId) -> ParameterSignature {
        ParameterSignature {
            name: name.to_string(),
            ty,
            ref_kind: RefKind::None,
            is_params: false,
            is_optional: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MethodSignature {
    pub parameters: SmallVec<[ParameterSignature; 4]>,
    pub return_type: TypeId,
    pub is_static: bool,
}

impl MethodSignature {
    pub fn new(parameters: Vec<ParameterSignature>, return_type: TypeId) -> MethodSignature {
        MethodSignature {
            parameters: SmallVec::from_vec(parameters),
            return_type,
            is_static: false,
        }
    }
}

/// One candidate in the member group, carrying the opaque member id the
/// symbol layer uses to identify the method.
#[derive(Clone, Debug)]
pub struct OverloadCandidate {
    pub member: u32,
    pub signature: MethodSignature,
}

#[derive(Clone, Debug)]
pub struct ArgumentInfo {
    pub ty: TypeId,
    pub constant: Option<ConstantValue>,
    pub name: Option<String>,
    pub ref_kind: RefKind,
}

impl ArgumentInfo {
    pub fn positional(ty: TypeId) -> ArgumentInfo {
        ArgumentInfo {
            ty,
            constant: None,
            name: None,
            ref_kind: RefKind::None,
        }
    }

    pub fn named(name: &str, ty: TypeId) -> ArgumentInfo {
        ArgumentInfo {
            ty,
            constant: None,
            name: Some(name.to_string()),
            ref_kind: RefKind::None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.ty == TypeId::DYNAMIC
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    ArgumentCount,
    NoConversion { argument: usize },
    NamedArgumentNotFound { argument: usize },
    DuplicateParameter { argument: usize },
    RefKindMismatch { argument: usize },
}

#[derive(Clone, Debug)]
pub struct CandidateFailure {
    pub candidate: usize,
    pub reason: FailureReason,
}

#[derive(Clone, Debug)]
pub struct OverloadSuccess {
    /// Index into the candidate slice.
    pub index: usize,
    /// The candidate matched in params-expanded form.
    pub expanded: bool,
    /// Argument-to-parameter map; `None` when arguments already line up
    /// with parameters one to one.
    pub arg_to_param: Option<Vec<usize>>,
    /// Parameters filled from their declared defaults, in order.
    pub defaulted: Vec<usize>,
    pub conversions: Vec<Conversion>,
}

#[derive(Clone, Debug)]
pub enum OverloadResult {
    Success(OverloadSuccess),
    /// No candidate was applicable; one failure per candidate, in
    /// candidate order.
    NoApplicable(Vec<CandidateFailure>),
    /// Two or more candidates tie under betterness.
    Ambiguous(Vec<usize>),
}

/// A candidate that survived applicability, pending betterness.
struct Applicable {
    index: usize,
    expanded: bool,
    arg_to_param: Vec<usize>,
    defaulted: Vec<usize>,
    conversions: Vec<Conversion>,
    /// Effective parameter type seen by each argument (element type for
    /// expanded params arguments).
    effective_types: Vec<TypeId>,
}

// =============================================================================
// Resolution
// =============================================================================

pub fn resolve_overloads(
    types: &TypeInterner,
    candidates: &[OverloadCandidate],
    args: &[ArgumentInfo],
) -> OverloadResult {
    let mut applicable: Vec<Applicable> = Vec::new();
    let mut failures: Vec<CandidateFailure> = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        match try_apply(types, candidate, args, index, false) {
            Ok(app) => {
                applicable.push(app);
                continue;
            }
            Err(normal_failure) => {
                // Fall back to expanded form when the last parameter is
                // a params collector.
                let has_params = candidate
                    .signature
                    .parameters
                    .last()
                    .is_some_and(|p| p.is_params);
                if has_params {
                    match try_apply(types, candidate, args, index, true) {
                        Ok(app) => {
                            applicable.push(app);
                            continue;
                        }
                        Err(_) => failures.push(normal_failure),
                    }
                } else {
                    failures.push(normal_failure);
                }
            }
        }
    }

    match applicable.len() {
        0 => OverloadResult::NoApplicable(failures),
        1 => OverloadResult::Success(into_success(applicable.pop().unwrap(), args)),
        _ => reduce_by_betterness(types, applicable, args),
    }
}

/// Candidates that would be applicable if every dynamic-typed argument
/// converted to anything. This is the static-candidate set carried on a
/// dynamic invocation for runtime dispatch.
pub fn statically_applicable(
    types: &TypeInterner,
    candidates: &[OverloadCandidate],
    args: &[ArgumentInfo],
) -> Vec<u32> {
    candidates
        .iter()
        .enumerate()
        .filter(|(index, candidate)| {
            try_apply(types, candidate, args, *index, false).is_ok()
                || (candidate
                    .signature
                    .parameters
                    .last()
                    .is_some_and(|p| p.is_params)
                    && try_apply(types, candidate, args, *index, true).is_ok())
        })
        .map(|(_, candidate)| candidate.member)
        .collect()
}

fn into_success(app: Applicable, args: &[ArgumentInfo]) -> OverloadSuccess {
    let identity_map = app.arg_to_param.len() == args.len()
        && app.arg_to_param.iter().enumerate().all(|(i, &p)| i == p)
        && !app.expanded;
    OverloadSuccess {
        index: app.index,
        expanded: app.expanded,
        arg_to_param: if identity_map { None } else { Some(app.arg_to_param) },
        defaulted: app.defaulted,
        conversions: app.conversions,
    }
}

// =============================================================================
// Applicability
// =============================================================================

fn try_apply(
    types: &TypeInterner,
    candidate: &OverloadCandidate,
    args: &[ArgumentInfo],
    candidate_index: usize,
    expanded: bool,
) -> Result<Applicable, CandidateFailure> {
    let params = &candidate.signature.parameters;
    let fail = |reason| {
        Err(CandidateFailure {
            candidate: candidate_index,
            reason,
        })
    };

    let fixed_count = if expanded {
        params.len().saturating_sub(1)
    } else {
        params.len()
    };
    if expanded && params.is_empty() {
        return fail(FailureReason::ArgumentCount);
    }

    // Map every argument to a parameter slot.
    let mut arg_to_param = Vec::with_capacity(args.len());
    let mut filled = vec![false; params.len()];
    let mut seen_named = false;
    for (arg_index, arg) in args.iter().enumerate() {
        let param_index = match &arg.name {
            Some(name) => {
                seen_named = true;
                match params.iter().position(|p| &p.name == name) {
                    Some(i) => i,
                    None => {
                        return fail(FailureReason::NamedArgumentNotFound {
                            argument: arg_index,
                        });
                    }
                }
            }
            None => {
                if seen_named {
                    // Positional after named is diagnosed during argument
                    // binding; here it just fails the candidate.
                    return fail(FailureReason::ArgumentCount);
                }
                if expanded && arg_index >= fixed_count {
                    params.len() - 1
                } else {
                    arg_index
                }
            }
        };
        if param_index >= params.len() {
            return fail(FailureReason::ArgumentCount);
        }
        let collects = expanded && param_index == params.len() - 1;
        if filled[param_index] && !collects {
            return fail(FailureReason::DuplicateParameter { argument: arg_index });
        }
        filled[param_index] = true;
        arg_to_param.push(param_index);
    }

    // Unfilled parameters must be optional, or the params collector in
    // expanded form (which accepts zero arguments).
    let mut defaulted = Vec::new();
    for (param_index, param) in params.iter().enumerate() {
        if filled[param_index] {
            continue;
        }
        if expanded && param_index == params.len() - 1 {
            continue;
        }
        if param.is_optional {
            defaulted.push(param_index);
        } else {
            return fail(FailureReason::ArgumentCount);
        }
    }

    // Check convertibility argument by argument.
    let mut conversions = Vec::with_capacity(args.len());
    let mut effective_types = Vec::with_capacity(args.len());
    for (arg_index, arg) in args.iter().enumerate() {
        let param = &params[arg_to_param[arg_index]];
        let collects = expanded && arg_to_param[arg_index] == params.len() - 1;
        let target = if collects {
            types
                .element_type(param.ty)
                .ok_or(CandidateFailure {
                    candidate: candidate_index,
                    reason: FailureReason::NoConversion { argument: arg_index },
                })?
        } else {
            param.ty
        };

        if param.ref_kind != RefKind::None || arg.ref_kind != RefKind::None {
            if !ref_kinds_compatible(arg.ref_kind, param.ref_kind) {
                return fail(FailureReason::RefKindMismatch { argument: arg_index });
            }
            // By-reference arguments require an identity match.
            if arg.ty != target && !arg.ty.is_error() && !target.is_error() {
                return fail(FailureReason::NoConversion { argument: arg_index });
            }
            conversions.push(Conversion::identity());
            effective_types.push(target);
            continue;
        }

        let conversion = classify_conversion(types, arg.ty, target, arg.constant.as_ref());
        if arg.is_dynamic() || (conversion.exists() && conversion.is_implicit()) {
            conversions.push(conversion);
            effective_types.push(target);
        } else {
            return fail(FailureReason::NoConversion { argument: arg_index });
        }
    }

    Ok(Applicable {
        index: candidate_index,
        expanded,
        arg_to_param,
        defaulted,
        conversions,
        effective_types,
    })
}

fn ref_kinds_compatible(arg: RefKind, param: RefKind) -> bool {
    match param {
        RefKind::None => arg == RefKind::None,
        RefKind::Ref => arg == RefKind::Ref,
        RefKind::Out => arg == RefKind::Out,
        // `in` parameters accept both explicit `in` and plain arguments.
        RefKind::In => matches!(arg, RefKind::None | RefKind::In),
    }
}

// =============================================================================
// Betterness
// =============================================================================

fn reduce_by_betterness(
    types: &TypeInterner,
    applicable: Vec<Applicable>,
    args: &[ArgumentInfo],
) -> OverloadResult {
    let mut best: Vec<usize> = Vec::new();
    for i in 0..applicable.len() {
        let mut beaten = false;
        for j in 0..applicable.len() {
            if i != j && is_better(types, &applicable[j], &applicable[i], args) {
                beaten = true;
                break;
            }
        }
        if !beaten {
            best.push(i);
        }
    }

    match best.as_slice() {
        [single] => {
            let index = *single;
            let mut applicable = applicable;
            OverloadResult::Success(into_success(applicable.swap_remove(index), args))
        }
        _ => OverloadResult::Ambiguous(
            best.iter().map(|&i| applicable[i].index).collect(),
        ),
    }
}

/// Whether `a` is strictly better than `b` for this argument list.
fn is_better(
    types: &TypeInterner,
    a: &Applicable,
    b: &Applicable,
    args: &[ArgumentInfo],
) -> bool {
    // Normal form beats expanded form.
    if a.expanded != b.expanded {
        return !a.expanded;
    }
    // Then fewer parameters filled from defaults.
    if a.defaulted.len() != b.defaulted.len() {
        return a.defaulted.len() < b.defaulted.len();
    }
    // Then pairwise parameter-type specificity: at least as good for
    // every argument, strictly better for at least one.
    let mut strictly_better = false;
    for (arg_index, arg) in args.iter().enumerate() {
        match compare_parameter_types(
            types,
            arg.ty,
            a.effective_types[arg_index],
            b.effective_types[arg_index],
        ) {
            std::cmp::Ordering::Greater => strictly_better = true,
            std::cmp::Ordering::Less => return false,
            std::cmp::Ordering::Equal => {}
        }
    }
    strictly_better
}

/// `Greater` when `a_ty` is the better target for an argument of
/// `arg_ty`, `Less` when `b_ty` is.
fn compare_parameter_types(
    types: &TypeInterner,
    arg_ty: TypeId,
    a_ty: TypeId,
    b_ty: TypeId,
) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    if a_ty == b_ty {
        return Ordering::Equal;
    }
    if arg_ty == a_ty {
        return Ordering::Greater;
    }
    if arg_ty == b_ty {
        return Ordering::Less;
    }
    let a_to_b = classify_conversion(types, a_ty, b_ty, None);
    let b_to_a = classify_conversion(types, b_ty, a_ty, None);
    let a_narrower = a_to_b.exists() && a_to_b.is_implicit();
    let b_narrower = b_to_a.exists() && b_to_a.is_implicit();
    match (a_narrower, b_narrower) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(member: u32, params: Vec<ParameterSignature>) -> OverloadCandidate {
        OverloadCandidate {
            member,
            signature: MethodSignature::new(params, TypeId::VOID),
        }
    }

    #[test]
    fn exact_match_beats_widening() {
        let types = TypeInterner::new();
        let candidates = vec![
            candidate(1, vec![ParameterSignature::by_value("x", TypeId::I64)]),
            candidate(2, vec![ParameterSignature::by_value("x", TypeId::I32)]),
        ];
        let args = vec![ArgumentInfo::positional(TypeId::I32)];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::Success(success) => {
                assert_eq!(success.index, 1);
                assert!(!success.expanded);
                assert!(success.arg_to_param.is_none());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn params_expansion_is_the_fallback() {
        let mut types = TypeInterner::new();
        let string_array = types.array_of(TypeId::STRING);
        let mut params_param = ParameterSignature::by_value("values", string_array);
        params_param.is_params = true;
        let candidates = vec![candidate(1, vec![params_param])];

        // Three loose strings only match in expanded form.
        let args = vec![
            ArgumentInfo::positional(TypeId::STRING),
            ArgumentInfo::positional(TypeId::STRING),
            ArgumentInfo::positional(TypeId::STRING),
        ];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::Success(success) => assert!(success.expanded),
            other => panic!("expected success, got {other:?}"),
        }

        // A single argument that is already the array type short-circuits
        // to normal form.
        let args = vec![ArgumentInfo::positional(string_array)];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::Success(success) => assert!(!success.expanded),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn named_arguments_reorder() {
        let types = TypeInterner::new();
        let candidates = vec![candidate(
            1,
            vec![
                ParameterSignature::by_value("first", TypeId::I32),
                ParameterSignature::by_value("second", TypeId::STRING),
            ],
        )];
        let args = vec![
            ArgumentInfo::named("second", TypeId::STRING),
            ArgumentInfo::named("first", TypeId::I32),
        ];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::Success(success) => {
                assert_eq!(success.arg_to_param, Some(vec![1, 0]));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn unknown_named_argument_fails_the_candidate() {
        let types = TypeInterner::new();
        let candidates = vec![candidate(
            1,
            vec![ParameterSignature::by_value("value", TypeId::I32)],
        )];
        let args = vec![ArgumentInfo::named("missing", TypeId::I32)];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::NoApplicable(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(
                    failures[0].reason,
                    FailureReason::NamedArgumentNotFound { argument: 0 }
                );
            }
            other => panic!("expected no applicable, got {other:?}"),
        }
    }

    #[test]
    fn optional_parameters_fill_from_defaults() {
        let types = TypeInterner::new();
        let mut optional = ParameterSignature::by_value("count", TypeId::I32);
        optional.is_optional = true;
        let candidates = vec![candidate(
            1,
            vec![ParameterSignature::by_value("name", TypeId::STRING), optional],
        )];
        let args = vec![ArgumentInfo::positional(TypeId::STRING)];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::Success(success) => assert_eq!(success.defaulted, vec![1]),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn fewer_defaulted_parameters_wins_betterness() {
        let types = TypeInterner::new();
        let mut optional = ParameterSignature::by_value("count", TypeId::I32);
        optional.is_optional = true;
        let candidates = vec![
            candidate(1, vec![ParameterSignature::by_value("name", TypeId::STRING)]),
            candidate(
                2,
                vec![ParameterSignature::by_value("name", TypeId::STRING), optional],
            ),
        ];
        let args = vec![ArgumentInfo::positional(TypeId::STRING)];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::Success(success) => {
                assert_eq!(success.index, 0);
                assert!(success.defaulted.is_empty());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn ambiguity_is_reported_with_all_tied_members() {
        let mut types = TypeInterner::new();
        let a = types.add_named(crate::types::NamedTypeData {
            name: "A".to_string(),
            base: None,
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        });
        let b = types.add_named(crate::types::NamedTypeData {
            name: "B".to_string(),
            base: None,
            is_value_type: false,
            is_ref_like: false,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        });
        let candidates = vec![
            candidate(1, vec![ParameterSignature::by_value("x", a)]),
            candidate(2, vec![ParameterSignature::by_value("x", b)]),
        ];
        // null converts to both unrelated reference types.
        let args = vec![ArgumentInfo::positional(TypeId::NULL)];
        match resolve_overloads(&types, &candidates, &args) {
            OverloadResult::Ambiguous(indices) => assert_eq!(indices, vec![0, 1]),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_argument_keeps_statically_applicable_set() {
        let types = TypeInterner::new();
        let candidates = vec![
            candidate(10, vec![ParameterSignature::by_value("x", TypeId::I32)]),
            candidate(11, vec![ParameterSignature::by_value("x", TypeId::STRING)]),
            candidate(
                12,
                vec![
                    ParameterSignature::by_value("x", TypeId::I32),
                    ParameterSignature::by_value("y", TypeId::I32),
                ],
            ),
        ];
        let args = vec![ArgumentInfo::positional(TypeId::DYNAMIC)];
        // Both unary candidates survive; the binary one is out on count.
        assert_eq!(statically_applicable(&types, &candidates, &args), vec![10, 11]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let types = TypeInterner::new();
        let candidates = vec![
            candidate(1, vec![ParameterSignature::by_value("x", TypeId::I64)]),
            candidate(2, vec![ParameterSignature::by_value("x", TypeId::I32)]),
        ];
        let args = vec![ArgumentInfo::positional(TypeId::I32)];
        for _ in 0..8 {
            match resolve_overloads(&types, &candidates, &args) {
                OverloadResult::Success(success) => assert_eq!(success.index, 1),
                other => panic!("expected success, got {other:?}"),
            }
        }
    }
}
