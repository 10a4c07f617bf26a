//! Ref-safety (escape) analysis.
//!
//! A forward walk over a bound member body tracking, for every binding
//! of a stack-only (ref-like) type, the pair of escape scopes: how far
//! a `ref` to it may travel and how far its value may travel. The two
//! are independent; a `ref` alias and the value it names can have
//! different legal horizons.
//!
//! The lattice is a total order. `CallingMethod` is widest, then
//! `ReturnOnly`, then `CurrentMethod`, then one position per nested
//! block. Every assignment, return, and by-reference argument pass
//! checks that the source scope is convertible to (at least as wide as)
//! the destination scope. Violations accumulate in the diagnostic bag;
//! the walk always completes.
//!
//! Nested lambdas and local functions get a fresh analysis instance;
//! their block depths are never conflated with the enclosing method's.

use rustc_hash::FxHashMap;
use sable_binder::{SymbolId, symbol_flags};
use smallvec::SmallVec;
use sable_common::TextSpan;
use sable_common::diagnostics::diagnostic_codes as codes;
use sable_solver::overload::RefKind;
use sable_syntax::NodeIndex;

use crate::bound::{
    BoundCall, BoundExpr, BoundExprKind, BoundInterpolation, BoundPattern, BoundPatternKind,
    BoundStatement, BoundStatementKind, BuilderAppend,
};
use crate::calls::node_span;
use crate::context::CheckerContext;
use crate::conversions::span_of;

/// A position in the escape lattice. Lower is wider: a value whose
/// scope is lower may be stored everywhere a higher-scoped one may.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SafeContext(u32);

impl SafeContext {
    /// Escapes the method entirely; the caller may keep it forever.
    pub const CALLING_METHOD: SafeContext = SafeContext(0);
    /// May leave only through a return statement.
    pub const RETURN_ONLY: SafeContext = SafeContext(1);
    /// Confined to the current method body.
    pub const CURRENT_METHOD: SafeContext = SafeContext(2);

    /// The scope of a block at `depth` nesting levels inside the body.
    pub fn block(depth: u32) -> SafeContext {
        SafeContext(SafeContext::CURRENT_METHOD.0.saturating_add(depth))
    }

    /// Whether a value with this scope may be stored into a location
    /// requiring `dest`.
    pub fn is_convertible_to(self, dest: SafeContext) -> bool {
        self.0 <= dest.0
    }

    /// The narrower of two scopes; an expression combining two operands
    /// escapes no further than either.
    pub fn narrowest(self, other: SafeContext) -> SafeContext {
        SafeContext(self.0.max(other.0))
    }
}

/// Run the analysis over one member body. Parameters are seeded from
/// the member symbol's children; pattern variables and locals join as
/// the walk declares them.
pub fn analyze_member(ctx: &mut CheckerContext<'_>, member: SymbolId, body: &BoundStatement) {
    let mut analysis = RefSafety {
        ctx,
        locals: FxHashMap::default(),
        placeholders: FxHashMap::default(),
        journal: SmallVec::new(),
        depth: 0,
    };
    analysis.seed_parameters(member);
    analysis.visit_statement(body);
}

struct RefSafety<'a, 'ctx> {
    ctx: &'a mut CheckerContext<'ctx>,
    /// `(ref-escape, value-escape)` per in-scope binding.
    locals: FxHashMap<SymbolId, (SafeContext, SafeContext)>,
    /// Escape scopes for synthetic expression stand-ins, keyed by the
    /// syntax node they replace. Populated and depopulated in regions
    /// matching the placeholder's syntactic lifetime.
    placeholders: FxHashMap<NodeIndex, SafeContext>,
    /// Bindings declared since the enclosing block was entered, popped
    /// on exit.
    journal: SmallVec<[SymbolId; 8]>,
    depth: u32,
}

impl RefSafety<'_, '_> {
    fn seed_parameters(&mut self, member: SymbolId) {
        let parameters: Vec<SymbolId> = self.ctx.symbols.members_of(member).to_vec();
        for parameter in parameters {
            let symbol = self.ctx.symbols.get(parameter);
            if symbol.kind != sable_binder::SymbolKind::Parameter {
                continue;
            }
            let by_ref = symbol.flags & symbol_flags::BY_REF != 0;
            let scoped = symbol.flags & symbol_flags::SCOPED != 0;
            let pair = if scoped {
                (SafeContext::CURRENT_METHOD, SafeContext::CURRENT_METHOD)
            } else if by_ref {
                (SafeContext::CALLING_METHOD, SafeContext::CALLING_METHOD)
            } else {
                (SafeContext::CURRENT_METHOD, SafeContext::CALLING_METHOD)
            };
            self.locals.insert(parameter, pair);
        }
    }

    /// Run `f` one block deeper, restoring depth and dropping the
    /// block's bindings on every exit path.
    fn in_block<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.journal.len();
        self.depth += 1;
        let result = f(self);
        while self.journal.len() > mark {
            if let Some(symbol) = self.journal.pop() {
                self.locals.remove(&symbol);
            }
        }
        self.depth -= 1;
        result
    }

    /// Run `f` with a placeholder scope in effect for `node`, restoring
    /// the prior entry afterwards.
    fn with_placeholder<R>(
        &mut self,
        node: NodeIndex,
        scope: SafeContext,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        if node.is_none() {
            return f(self);
        }
        let prior = self.placeholders.insert(node, scope);
        let result = f(self);
        match prior {
            Some(scope) => {
                self.placeholders.insert(node, scope);
            }
            None => {
                self.placeholders.remove(&node);
            }
        }
        result
    }

    fn bind(&mut self, symbol: SymbolId, ref_escape: SafeContext, value_escape: SafeContext) {
        self.locals.insert(symbol, (ref_escape, value_escape));
        self.journal.push(symbol);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn visit_statement(&mut self, statement: &BoundStatement) {
        match &statement.kind {
            BoundStatementKind::Block(statements) => self.in_block(|a| {
                for statement in statements {
                    a.visit_statement(statement);
                }
            }),
            BoundStatementKind::LocalDecl {
                symbol,
                initializer,
                is_ref,
            } => {
                if let Some(initializer) = initializer {
                    self.visit_expression(initializer);
                }
                self.declare_local(*symbol, initializer.as_ref(), *is_ref);
            }
            BoundStatementKind::Expression(expression) => self.visit_expression(expression),
            BoundStatementKind::Return { expression, is_ref } => {
                self.check_return(expression.as_ref(), *is_ref);
            }
            BoundStatementKind::NestedFunction { symbol, body } => {
                // Fresh instance: the nested callable's block depths are
                // its own.
                analyze_member(self.ctx, *symbol, body);
            }
            BoundStatementKind::Foreach {
                variable,
                collection,
                body,
            } => self.visit_foreach(*variable, collection, body),
            BoundStatementKind::Switch { operand, sections } => {
                self.visit_expression(operand);
                let operand_scope = self.value_escape(operand);
                for section in sections {
                    self.in_block(|a| {
                        for (pattern, guard) in &section.cases {
                            a.declare_pattern_variables(pattern, operand_scope);
                            if let Some(guard) = guard {
                                a.visit_expression(guard);
                            }
                        }
                        for statement in &section.statements {
                            a.visit_statement(statement);
                        }
                    });
                }
            }
        }
    }

    fn declare_local(&mut self, symbol: SymbolId, initializer: Option<&BoundExpr>, is_ref: bool) {
        let data = self.ctx.symbols.get(symbol);
        let scoped = data.flags & symbol_flags::SCOPED != 0;
        let ref_like = self.ctx.types.is_ref_like(data.ty);

        if scoped {
            // `scoped` pins both horizons to the method body, whatever
            // the initializer would otherwise permit.
            self.bind(symbol, SafeContext::CURRENT_METHOD, SafeContext::CURRENT_METHOD);
            return;
        }
        let ref_escape = match (is_ref, initializer) {
            (true, Some(initializer)) => self.ref_escape(initializer),
            _ => SafeContext::block(self.depth),
        };
        let value_escape = if !ref_like {
            SafeContext::CALLING_METHOD
        } else {
            match initializer {
                Some(initializer) => self.value_escape(initializer),
                // An uninitialized stack-only local is confined to its
                // declaring block.
                None => SafeContext::block(self.depth),
            }
        };
        self.bind(symbol, ref_escape, value_escape);
    }

    fn check_return(&mut self, expression: Option<&BoundExpr>, is_ref: bool) {
        let Some(expression) = expression else {
            return;
        };
        self.visit_expression(expression);
        let scope = if is_ref {
            self.ref_escape(expression)
        } else {
            self.value_escape(expression)
        };
        if !scope.is_convertible_to(SafeContext::RETURN_ONLY) {
            let name = self.describe(expression);
            self.ctx.report(
                codes::ESCAPES_DECLARATION_SCOPE,
                span_of(self.ctx, expression),
                &[&name],
            );
        }
    }

    fn visit_foreach(&mut self, variable: SymbolId, collection: &BoundExpr, body: &BoundStatement) {
        self.visit_expression(collection);
        // Iterating a stack-only sequence is shaped like a span
        // conversion call; the element alias inherits the collection's
        // horizon, and the mixing check below is the same one invocation
        // arguments get.
        let collection_scope = self.value_escape(collection);
        let span = span_of(self.ctx, collection);
        self.check_by_ref_mixing(span, collection_scope, &[(collection_scope, String::new())]);
        self.in_block(|a| {
            let ref_like = a.ctx.types.is_ref_like(a.ctx.symbols.get(variable).ty);
            let value_escape = if ref_like {
                collection_scope
            } else {
                SafeContext::CALLING_METHOD
            };
            a.bind(variable, SafeContext::block(a.depth), value_escape);
            a.visit_statement(body);
        });
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn visit_expression(&mut self, expr: &BoundExpr) {
        match &expr.kind {
            BoundExprKind::Error
            | BoundExprKind::Literal
            | BoundExprKind::Local { .. }
            | BoundExprKind::Parameter { .. }
            | BoundExprKind::MethodGroup { .. }
            | BoundExprKind::Lambda { .. } => {}
            BoundExprKind::FieldAccess { receiver, .. }
            | BoundExprKind::PropertyAccess { receiver, .. } => {
                if let Some(receiver) = receiver {
                    self.visit_expression(receiver);
                }
            }
            BoundExprKind::Call(call) => self.visit_call(expr, call),
            BoundExprKind::DynamicCall {
                receiver,
                arguments,
                ..
            } => {
                if let Some(receiver) = receiver {
                    self.visit_expression(receiver);
                }
                for argument in arguments {
                    self.visit_expression(argument);
                }
            }
            BoundExprKind::ObjectCreation {
                arguments,
                initializers,
                ..
            } => self.visit_creation(expr, arguments, initializers),
            BoundExprKind::Conversion(conversion) => self.visit_expression(&conversion.operand),
            BoundExprKind::Binary { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            BoundExprKind::Assignment {
                target,
                value,
                is_ref,
            } => {
                self.visit_expression(target);
                self.visit_expression(value);
                if *is_ref {
                    self.check_ref_assignment(target, value);
                } else if matches!(target.kind, BoundExprKind::Tuple { .. }) {
                    self.check_deconstruction(target, value);
                } else {
                    self.check_value_assignment(target, value);
                }
            }
            BoundExprKind::Ref { operand } => self.visit_expression(operand),
            BoundExprKind::Tuple { elements } => {
                for element in elements {
                    self.visit_expression(element);
                }
            }
            BoundExprKind::InterpolatedString(interpolation) => {
                self.visit_interpolation(interpolation);
            }
            BoundExprKind::IsPattern { operand, pattern } => {
                self.visit_expression(operand);
                let scope = self.value_escape(operand);
                self.declare_pattern_variables(pattern, scope);
            }
            BoundExprKind::SwitchExpression { operand, arms } => {
                self.visit_expression(operand);
                let scope = self.value_escape(operand);
                for arm in arms {
                    self.in_block(|a| {
                        a.declare_pattern_variables(&arm.pattern, scope);
                        if let Some(guard) = &arm.guard {
                            a.visit_expression(guard);
                        }
                        a.visit_expression(&arm.value);
                    });
                }
            }
        }
    }

    fn visit_interpolation(&mut self, interpolation: &BoundInterpolation) {
        match interpolation {
            BoundInterpolation::Constant { .. } => {}
            BoundInterpolation::Concatenation { operands } => {
                for operand in operands {
                    self.visit_expression(operand);
                }
            }
            BoundInterpolation::Builder { appends } => {
                for append in appends {
                    if let BuilderAppend::Formatted {
                        value, alignment, ..
                    } = append
                    {
                        self.visit_expression(value);
                        if let Some(alignment) = alignment {
                            self.visit_expression(alignment);
                        }
                    }
                }
            }
            BoundInterpolation::FormatString { arguments, .. } => {
                for argument in arguments {
                    self.visit_expression(argument);
                }
            }
        }
    }

    fn visit_call(&mut self, expr: &BoundExpr, call: &BoundCall) {
        if let Some(receiver) = &call.receiver {
            self.visit_expression(receiver);
        }
        for argument in &call.arguments {
            self.visit_expression(argument);
        }

        let Some(signature) = self.ctx.symbols.get(call.method).signature.clone() else {
            return;
        };
        let sources: Vec<(SafeContext, String)> = call
            .arguments
            .iter()
            .map(|argument| (self.value_escape(argument), self.describe(argument)))
            .collect();
        let span = node_span(self.ctx, expr.syntax);
        for (index, argument) in call.arguments.iter().enumerate() {
            let parameter = call
                .arg_to_param
                .as_ref()
                .map(|map| map.get(index).copied().unwrap_or(index))
                .unwrap_or(index);
            let parameter = parameter.min(signature.parameters.len().saturating_sub(1));
            let Some(parameter) = signature.parameters.get(parameter) else {
                continue;
            };
            let writable = matches!(parameter.ref_kind, RefKind::Ref | RefKind::Out);
            if !writable || !self.ctx.types.is_ref_like(argument.ty) {
                continue;
            }
            // Anything reachable through the other arguments could be
            // stored into this one by the callee.
            let destination = self.value_escape(argument);
            self.check_by_ref_mixing(span, destination, &sources);
        }
    }

    /// Every source must be storable into the by-ref destination. Used
    /// for invocation arguments and for the synthesized span conversion
    /// a `foreach` over a stack-only sequence performs.
    fn check_by_ref_mixing(
        &mut self,
        span: TextSpan,
        destination: SafeContext,
        sources: &[(SafeContext, String)],
    ) {
        for (scope, name) in sources {
            if !scope.is_convertible_to(destination) {
                self.ctx
                    .report(codes::ESCAPES_DECLARATION_SCOPE, span, &[name]);
            }
        }
    }

    fn visit_creation(
        &mut self,
        expr: &BoundExpr,
        arguments: &[BoundExpr],
        initializers: &[BoundExpr],
    ) {
        for argument in arguments {
            self.visit_expression(argument);
        }
        // Second pass: initializer setters can smuggle a narrower value
        // into the receiver, so each assigned value is checked against
        // the receiver's own horizon.
        let receiver_scope = self.value_escape(expr);
        for initializer in initializers {
            let BoundExprKind::Assignment { value, .. } = &initializer.kind else {
                self.visit_expression(initializer);
                continue;
            };
            self.visit_expression(value);
            let scope = self.value_escape(value);
            if !scope.is_convertible_to(receiver_scope) {
                let name = self.describe(value);
                self.ctx.report(
                    codes::ESCAPES_DECLARATION_SCOPE,
                    span_of(self.ctx, value),
                    &[&name],
                );
            }
        }
    }

    // =========================================================================
    // Assignment checks
    // =========================================================================

    fn check_value_assignment(&mut self, target: &BoundExpr, value: &BoundExpr) {
        let destination = self.destination_scope(target);
        let scope = self.value_escape(value);
        if !scope.is_convertible_to(destination) {
            let name = self.describe(value);
            self.ctx.report(
                codes::ESCAPES_DECLARATION_SCOPE,
                span_of(self.ctx, value),
                &[&name],
            );
        }
    }

    fn check_ref_assignment(&mut self, target: &BoundExpr, value: &BoundExpr) {
        let destination = match &target.kind {
            BoundExprKind::Local { symbol } | BoundExprKind::Parameter { symbol } => self
                .locals
                .get(symbol)
                .map(|&(r, _)| r)
                .unwrap_or(SafeContext::CALLING_METHOD),
            _ => SafeContext::CALLING_METHOD,
        };
        let scope = self.ref_escape(value);
        if !scope.is_convertible_to(destination) {
            let source_name = self.describe(value);
            let target_name = self.describe(target);
            self.ctx.report(
                codes::REF_ASSIGN_NARROWER_LIFETIME,
                span_of(self.ctx, value),
                &[&source_name, &target_name],
            );
        }
    }

    /// Pairwise deconstruction check; nested tuple targets recurse with
    /// their own placeholder scope so a nested element reads back the
    /// scope its level established.
    fn check_deconstruction(&mut self, target: &BoundExpr, value: &BoundExpr) {
        let BoundExprKind::Tuple { elements: targets } = &target.kind else {
            return;
        };
        let BoundExprKind::Tuple { elements: values } = &value.kind else {
            let scope = self.value_escape(value);
            self.with_placeholder(target.syntax, scope, |a| {
                for element in targets {
                    a.check_value_assignment(element, value);
                }
            });
            return;
        };
        for (element_target, element_value) in targets.iter().zip(values) {
            if matches!(element_target.kind, BoundExprKind::Tuple { .. }) {
                let scope = self.value_escape(element_value);
                self.with_placeholder(element_target.syntax, scope, |a| {
                    a.check_deconstruction(element_target, element_value);
                });
            } else {
                self.check_value_assignment(element_target, element_value);
            }
        }
    }

    fn destination_scope(&self, target: &BoundExpr) -> SafeContext {
        match &target.kind {
            BoundExprKind::Local { symbol } | BoundExprKind::Parameter { symbol } => self
                .locals
                .get(symbol)
                .map(|&(_, v)| v)
                .unwrap_or(SafeContext::CALLING_METHOD),
            BoundExprKind::FieldAccess {
                receiver: Some(receiver),
                ..
            }
            | BoundExprKind::PropertyAccess {
                receiver: Some(receiver),
                ..
            } => {
                // Storing into a member of an escaping receiver is as
                // demanding as storing into the receiver itself.
                self.value_escape(receiver)
            }
            _ => SafeContext::CALLING_METHOD,
        }
    }

    // =========================================================================
    // Escape computation
    // =========================================================================

    /// How far the value of `expr` may escape.
    fn value_escape(&self, expr: &BoundExpr) -> SafeContext {
        if let Some(&scope) = self.placeholders.get(&expr.syntax) {
            return scope;
        }
        if !self.ctx.types.is_ref_like(expr.ty) {
            return SafeContext::CALLING_METHOD;
        }
        match &expr.kind {
            BoundExprKind::Local { symbol } | BoundExprKind::Parameter { symbol } => self
                .locals
                .get(symbol)
                .map(|&(_, v)| v)
                .unwrap_or(SafeContext::CALLING_METHOD),
            BoundExprKind::FieldAccess {
                receiver: Some(receiver),
                ..
            }
            | BoundExprKind::PropertyAccess {
                receiver: Some(receiver),
                ..
            } => self.value_escape(receiver),
            BoundExprKind::Conversion(conversion) => self.value_escape(&conversion.operand),
            BoundExprKind::Ref { operand } => self.value_escape(operand),
            BoundExprKind::Call(call) => {
                // A call result can carry anything reachable through its
                // inputs; take the narrowest.
                let mut scope = SafeContext::CALLING_METHOD;
                if let Some(receiver) = &call.receiver {
                    scope = scope.narrowest(self.value_escape(receiver));
                }
                for argument in &call.arguments {
                    scope = scope.narrowest(self.value_escape(argument));
                }
                scope
            }
            BoundExprKind::ObjectCreation { arguments, .. } => {
                let mut scope = SafeContext::CALLING_METHOD;
                for argument in arguments {
                    scope = scope.narrowest(self.value_escape(argument));
                }
                scope
            }
            BoundExprKind::Tuple { elements } => {
                let mut scope = SafeContext::CALLING_METHOD;
                for element in elements {
                    scope = scope.narrowest(self.value_escape(element));
                }
                scope
            }
            BoundExprKind::Binary { left, right, .. } => {
                self.value_escape(left).narrowest(self.value_escape(right))
            }
            _ => SafeContext::CALLING_METHOD,
        }
    }

    /// How far a `ref` to `expr` may escape.
    fn ref_escape(&self, expr: &BoundExpr) -> SafeContext {
        match &expr.kind {
            BoundExprKind::Local { symbol } | BoundExprKind::Parameter { symbol } => self
                .locals
                .get(symbol)
                .map(|&(r, _)| r)
                .unwrap_or(SafeContext::block(self.depth)),
            BoundExprKind::FieldAccess {
                receiver: Some(receiver),
                ..
            } => {
                if self.ctx.types.is_value_type(receiver.ty) {
                    self.ref_escape(receiver)
                } else {
                    // A field of a heap object outlives any method frame.
                    SafeContext::CALLING_METHOD
                }
            }
            BoundExprKind::Ref { operand } => self.ref_escape(operand),
            BoundExprKind::Conversion(conversion) => self.ref_escape(&conversion.operand),
            // A ref to a temporary dies with the enclosing block.
            _ => SafeContext::block(self.depth),
        }
    }

    fn declare_pattern_variables(&mut self, pattern: &BoundPattern, scope: SafeContext) {
        match &pattern.kind {
            BoundPatternKind::Declaration {
                variable: Some(variable),
                ..
            } => {
                self.bind(*variable, SafeContext::block(self.depth), scope);
            }
            BoundPatternKind::Recursive {
                positional,
                properties,
                variable,
                ..
            } => {
                if let Some(variable) = variable {
                    self.bind(*variable, SafeContext::block(self.depth), scope);
                }
                for sub in positional {
                    self.declare_pattern_variables(sub, scope);
                }
                for (_, sub) in properties {
                    self.declare_pattern_variables(sub, scope);
                }
            }
            BoundPatternKind::List { elements, .. } => {
                for sub in elements {
                    self.declare_pattern_variables(sub, scope);
                }
            }
            BoundPatternKind::Binary { left, right, .. } => {
                self.declare_pattern_variables(left, scope);
                self.declare_pattern_variables(right, scope);
            }
            BoundPatternKind::Negated { operand } => {
                self.declare_pattern_variables(operand, scope);
            }
            _ => {}
        }
    }

    fn describe(&self, expr: &BoundExpr) -> String {
        match &expr.kind {
            BoundExprKind::Local { symbol } | BoundExprKind::Parameter { symbol } => {
                self.ctx.symbols.name_of(*symbol).to_string()
            }
            BoundExprKind::Ref { operand } => self.describe(operand),
            BoundExprKind::Conversion(conversion) => self.describe(&conversion.operand),
            _ => self.ctx.types.name_of(expr.ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use sable_binder::{Symbol, SymbolId, SymbolKind};
    use sable_solver::overload::{MethodSignature, ParameterSignature, RefKind};
    use sable_solver::types::{NamedTypeData, TypeId};
    use sable_syntax::NodeIndex;

    use super::*;
    use crate::bound::BoundStatementKind;
    use crate::testing::{TestCompilation, TestSetup};

    fn buffer_type(s: &mut TestSetup) -> TypeId {
        s.types.add_named(NamedTypeData {
            name: "Buffer".to_string(),
            base: None,
            is_value_type: true,
            is_ref_like: true,
            is_interface: false,
            arity: 0,
            conversion_operators: Vec::new(),
        })
    }

    fn expr(ty: TypeId, kind: BoundExprKind) -> BoundExpr {
        BoundExpr {
            syntax: NodeIndex::NONE,
            ty,
            constant: None,
            has_errors: false,
            kind,
        }
    }

    fn stmt(kind: BoundStatementKind) -> BoundStatement {
        BoundStatement {
            syntax: NodeIndex::NONE,
            kind,
        }
    }

    fn local(ty: TypeId, symbol: SymbolId) -> BoundExpr {
        expr(ty, BoundExprKind::Local { symbol })
    }

    fn parameter(ty: TypeId, symbol: SymbolId) -> BoundExpr {
        expr(ty, BoundExprKind::Parameter { symbol })
    }

    #[test]
    fn a_block_scoped_buffer_cannot_be_returned() {
        let mut method = SymbolId::NONE;
        let mut buffer = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            buffer = s
                .symbols
                .add(Symbol::new("buffer", SymbolKind::Local, method).with_type(ty));
        });
        let mut ctx = comp.context();
        let body = stmt(BoundStatementKind::Block(vec![
            stmt(BoundStatementKind::LocalDecl {
                symbol: buffer,
                initializer: None,
                is_ref: false,
            }),
            stmt(BoundStatementKind::Return {
                expression: Some(local(ty, buffer)),
                is_ref: false,
            }),
        ]));
        analyze_member(&mut ctx, method, &body);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::ESCAPES_DECLARATION_SCOPE);
    }

    #[test]
    fn a_caller_provided_buffer_may_be_returned() {
        let mut method = SymbolId::NONE;
        let mut source = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            source = s
                .symbols
                .add(Symbol::new("source", SymbolKind::Parameter, method).with_type(ty));
        });
        let mut ctx = comp.context();
        let body = stmt(BoundStatementKind::Block(vec![stmt(
            BoundStatementKind::Return {
                expression: Some(parameter(ty, source)),
                is_ref: false,
            },
        )]));
        analyze_member(&mut ctx, method, &body);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn a_scoped_local_cannot_escape_through_a_ref_parameter() {
        fn run(scoped: bool) -> usize {
            let mut method = SymbolId::NONE;
            let mut target = SymbolId::NONE;
            let mut pinned = SymbolId::NONE;
            let mut ty = TypeId::ERROR;
            let comp = TestCompilation::build(|s| {
                ty = buffer_type(s);
                method = s
                    .symbols
                    .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
                target = s.symbols.add(
                    Symbol::new("target", SymbolKind::Parameter, method)
                        .with_type(ty)
                        .with_flags(symbol_flags::BY_REF),
                );
                let mut symbol = Symbol::new("pinned", SymbolKind::Local, method).with_type(ty);
                if scoped {
                    symbol.flags |= symbol_flags::SCOPED;
                }
                pinned = s.symbols.add(symbol);
            });
            let mut ctx = comp.context();
            let body = stmt(BoundStatementKind::Block(vec![
                stmt(BoundStatementKind::LocalDecl {
                    symbol: pinned,
                    initializer: Some(parameter(ty, target)),
                    is_ref: false,
                }),
                stmt(BoundStatementKind::Expression(expr(
                    ty,
                    BoundExprKind::Assignment {
                        target: Box::new(parameter(ty, target)),
                        value: Box::new(local(ty, pinned)),
                        is_ref: false,
                    },
                ))),
            ]));
            analyze_member(&mut ctx, method, &body);
            ctx.diagnostics.iter().count()
        }
        assert_eq!(run(true), 1);
        assert_eq!(run(false), 0);
    }

    #[test]
    fn ref_reassignment_to_a_narrower_lifetime_is_reported() {
        let mut method = SymbolId::NONE;
        let mut source = SymbolId::NONE;
        let mut alias = SymbolId::NONE;
        let mut narrow = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            source = s.symbols.add(
                Symbol::new("source", SymbolKind::Parameter, method)
                    .with_type(ty)
                    .with_flags(symbol_flags::BY_REF),
            );
            alias = s
                .symbols
                .add(Symbol::new("alias", SymbolKind::Local, method).with_type(ty));
            narrow = s
                .symbols
                .add(Symbol::new("narrow", SymbolKind::Local, method).with_type(ty));
        });
        let mut ctx = comp.context();
        let reference = |target: BoundExpr| {
            expr(
                ty,
                BoundExprKind::Ref {
                    operand: Box::new(target),
                },
            )
        };
        let body = stmt(BoundStatementKind::Block(vec![
            stmt(BoundStatementKind::LocalDecl {
                symbol: narrow,
                initializer: None,
                is_ref: false,
            }),
            stmt(BoundStatementKind::LocalDecl {
                symbol: alias,
                initializer: Some(reference(parameter(ty, source))),
                is_ref: true,
            }),
            stmt(BoundStatementKind::Expression(expr(
                ty,
                BoundExprKind::Assignment {
                    target: Box::new(local(ty, alias)),
                    value: Box::new(reference(local(ty, narrow))),
                    is_ref: true,
                },
            ))),
        ]));
        analyze_member(&mut ctx, method, &body);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::REF_ASSIGN_NARROWER_LIFETIME);
    }

    #[test]
    fn a_nested_function_is_analyzed_independently() {
        let mut method = SymbolId::NONE;
        let mut inner = SymbolId::NONE;
        let mut buffer = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            inner = s
                .symbols
                .add(Symbol::new("Inner", SymbolKind::Method, method));
            buffer = s
                .symbols
                .add(Symbol::new("buffer", SymbolKind::Local, inner).with_type(ty));
        });
        let mut ctx = comp.context();
        let inner_body = stmt(BoundStatementKind::Block(vec![
            stmt(BoundStatementKind::LocalDecl {
                symbol: buffer,
                initializer: None,
                is_ref: false,
            }),
            stmt(BoundStatementKind::Return {
                expression: Some(local(ty, buffer)),
                is_ref: false,
            }),
        ]));
        let body = stmt(BoundStatementKind::Block(vec![stmt(
            BoundStatementKind::NestedFunction {
                symbol: inner,
                body: Box::new(inner_body),
            },
        )]));
        analyze_member(&mut ctx, method, &body);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::ESCAPES_DECLARATION_SCOPE);
    }

    #[test]
    fn object_initializers_are_checked_against_the_receiver() {
        let mut method = SymbolId::NONE;
        let mut narrow = SymbolId::NONE;
        let mut field = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            narrow = s
                .symbols
                .add(Symbol::new("narrow", SymbolKind::Local, method).with_type(ty));
            let holder =
                s.symbols
                    .add(Symbol::new("Holder", SymbolKind::NamedType, SymbolId::NONE));
            field = s
                .symbols
                .add(Symbol::new("Inner", SymbolKind::Field, holder).with_type(ty));
        });
        let mut ctx = comp.context();
        let initializer = expr(
            TypeId::VOID,
            BoundExprKind::Assignment {
                target: Box::new(expr(
                    ty,
                    BoundExprKind::FieldAccess {
                        receiver: None,
                        symbol: field,
                    },
                )),
                value: Box::new(local(ty, narrow)),
                is_ref: false,
            },
        );
        let creation = expr(
            ty,
            BoundExprKind::ObjectCreation {
                constructor: None,
                arguments: Vec::new(),
                expanded: false,
                arg_to_param: None,
                initializers: vec![initializer],
            },
        );
        let body = stmt(BoundStatementKind::Block(vec![
            stmt(BoundStatementKind::LocalDecl {
                symbol: narrow,
                initializer: None,
                is_ref: false,
            }),
            stmt(BoundStatementKind::Expression(creation)),
        ]));
        analyze_member(&mut ctx, method, &body);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::ESCAPES_DECLARATION_SCOPE);
    }

    #[test]
    fn a_foreach_element_inherits_the_collection_scope() {
        let mut method = SymbolId::NONE;
        let mut sequence = SymbolId::NONE;
        let mut element = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            sequence = s
                .symbols
                .add(Symbol::new("sequence", SymbolKind::Local, method).with_type(ty));
            element = s
                .symbols
                .add(Symbol::new("element", SymbolKind::Local, method).with_type(ty));
        });
        let mut ctx = comp.context();
        let body = stmt(BoundStatementKind::Block(vec![
            stmt(BoundStatementKind::LocalDecl {
                symbol: sequence,
                initializer: None,
                is_ref: false,
            }),
            stmt(BoundStatementKind::Foreach {
                variable: element,
                collection: local(ty, sequence),
                body: Box::new(stmt(BoundStatementKind::Return {
                    expression: Some(local(ty, element)),
                    is_ref: false,
                })),
            }),
        ]));
        analyze_member(&mut ctx, method, &body);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::ESCAPES_DECLARATION_SCOPE);
    }

    #[test]
    fn by_ref_arguments_reject_narrower_companions() {
        let mut method = SymbolId::NONE;
        let mut callee = SymbolId::NONE;
        let mut wide = SymbolId::NONE;
        let mut narrow = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            wide = s.symbols.add(
                Symbol::new("wide", SymbolKind::Parameter, method)
                    .with_type(ty)
                    .with_flags(symbol_flags::BY_REF),
            );
            narrow = s
                .symbols
                .add(Symbol::new("narrow", SymbolKind::Local, method).with_type(ty));
            callee = s.symbols.add(
                Symbol::new("Fill", SymbolKind::Method, SymbolId::NONE).with_signature(
                    MethodSignature::new(
                        vec![
                            ParameterSignature {
                                name: "destination".to_string(),
                                ty,
                                ref_kind: RefKind::Ref,
                                is_params: false,
                                is_optional: false,
                            },
                            ParameterSignature::by_value("source", ty),
                        ],
                        TypeId::VOID,
                    ),
                ),
            );
        });
        let mut ctx = comp.context();
        let call = expr(
            TypeId::VOID,
            BoundExprKind::Call(crate::bound::BoundCall {
                receiver: None,
                method: callee,
                arguments: vec![
                    expr(
                        ty,
                        BoundExprKind::Ref {
                            operand: Box::new(parameter(ty, wide)),
                        },
                    ),
                    local(ty, narrow),
                ],
                expanded: false,
                arg_to_param: None,
            }),
        );
        let body = stmt(BoundStatementKind::Block(vec![
            stmt(BoundStatementKind::LocalDecl {
                symbol: narrow,
                initializer: None,
                is_ref: false,
            }),
            stmt(BoundStatementKind::Expression(call)),
        ]));
        analyze_member(&mut ctx, method, &body);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::ESCAPES_DECLARATION_SCOPE);
    }

    #[test]
    fn deconstruction_checks_each_nested_target() {
        let mut method = SymbolId::NONE;
        let mut wide = SymbolId::NONE;
        let mut plain = SymbolId::NONE;
        let mut narrow = SymbolId::NONE;
        let mut ty = TypeId::ERROR;
        let comp = TestCompilation::build(|s| {
            ty = buffer_type(s);
            method = s
                .symbols
                .add(Symbol::new("M", SymbolKind::Method, SymbolId::NONE));
            wide = s.symbols.add(
                Symbol::new("wide", SymbolKind::Parameter, method)
                    .with_type(ty)
                    .with_flags(symbol_flags::BY_REF),
            );
            plain = s
                .symbols
                .add(Symbol::new("plain", SymbolKind::Local, method).with_type(TypeId::I32));
            narrow = s
                .symbols
                .add(Symbol::new("narrow", SymbolKind::Local, method).with_type(ty));
        });
        let mut ctx = comp.context();
        let one = BoundExpr::literal(
            NodeIndex::NONE,
            TypeId::I32,
            sable_solver::ConstantValue::I32(1),
        );
        let target = expr(
            TypeId::OBJECT,
            BoundExprKind::Tuple {
                elements: vec![
                    local(TypeId::I32, plain),
                    expr(
                        TypeId::OBJECT,
                        BoundExprKind::Tuple {
                            elements: vec![parameter(ty, wide)],
                        },
                    ),
                ],
            },
        );
        let value = expr(
            TypeId::OBJECT,
            BoundExprKind::Tuple {
                elements: vec![
                    one,
                    expr(
                        TypeId::OBJECT,
                        BoundExprKind::Tuple {
                            elements: vec![local(ty, narrow)],
                        },
                    ),
                ],
            },
        );
        let body = stmt(BoundStatementKind::Block(vec![
            stmt(BoundStatementKind::LocalDecl {
                symbol: narrow,
                initializer: None,
                is_ref: false,
            }),
            stmt(BoundStatementKind::Expression(expr(
                TypeId::VOID,
                BoundExprKind::Assignment {
                    target: Box::new(target),
                    value: Box::new(value),
                    is_ref: false,
                },
            ))),
        ]));
        analyze_member(&mut ctx, method, &body);
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::ESCAPES_DECLARATION_SCOPE);
    }
}
