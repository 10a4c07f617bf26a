//! Statement binding.
//!
//! Statements bind to a thin `BoundStatement` tree; the expression-level
//! semantics live in `expr`. Checked, unchecked, and unsafe regions are
//! pushed as binder flag layers so every nested expression observes them
//! through `checked_state`. Locals and local functions are declared
//! ahead of binding as members of the enclosing member symbol; binding
//! only looks them up.

use std::sync::Arc;

use sable_binder::{Binder, BinderFlags, BinderKind, SymbolId, SymbolKind, symbol_flags};
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;
use sable_syntax::kinds::syntax_kind as k;

use crate::bound::{BoundExpr, BoundStatement, BoundStatementKind, BoundSwitchSection};
use crate::calls::node_span;
use crate::context::CheckerContext;
use crate::conversions::coerce;
use crate::expr;
use crate::patterns;

pub fn bind_statement(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    match ctx.arena.kind_of(node) {
        k::BLOCK => bind_block(ctx, binder, node),
        k::LOCAL_DECLARATION_STATEMENT => bind_local_decl(ctx, binder, node),
        k::LOCAL_FUNCTION_STATEMENT => bind_local_function(ctx, binder, node),
        k::EXPRESSION_STATEMENT => bind_expression_statement(ctx, binder, node),
        k::RETURN_STATEMENT => bind_return(ctx, binder, node),
        k::CHECKED_STATEMENT | k::UNCHECKED_STATEMENT => bind_checked_region(ctx, binder, node),
        k::UNSAFE_STATEMENT => bind_unsafe_region(ctx, binder, node),
        k::FOREACH_STATEMENT => bind_foreach(ctx, binder, node),
        k::SWITCH_STATEMENT => bind_switch(ctx, binder, node),
        _ => error_statement(node),
    }
}

fn error_statement(node: NodeIndex) -> BoundStatement {
    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::Expression(BoundExpr::error(node)),
    }
}

fn bind_block(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_block(node) else {
        return error_statement(node);
    };
    let statement_nodes: Vec<NodeIndex> = data.statements.iter().collect();
    let inner = binder.push(BinderKind::Block { node });
    let statements = statement_nodes
        .into_iter()
        .map(|statement| bind_statement(ctx, &inner, statement))
        .collect();
    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::Block(statements),
    }
}

fn bind_local_decl(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_local_decl(node) else {
        return error_statement(node);
    };
    let name = data.name.clone();
    let (ty_node, initializer_node, is_ref) = (data.ty, data.initializer, data.is_ref);

    let symbol = local_symbol(ctx, binder, &name).unwrap_or(SymbolId::NONE);
    let mut declared = if symbol != SymbolId::NONE {
        ctx.symbols.get(symbol).ty
    } else {
        TypeId::ERROR
    };
    if declared == TypeId::ERROR && ty_node.is_some() {
        declared = expr::resolve_type(ctx, binder, ty_node).unwrap_or(TypeId::ERROR);
    }

    let initializer = if initializer_node.is_some() {
        let bound = expr::bind_expression(ctx, binder, initializer_node);
        let checked = ctx.is_checked(binder.checked_state());
        // `ref` initializers require an identity match and are validated
        // by the escape analysis, not coerced.
        Some(if declared != TypeId::ERROR && !is_ref {
            coerce(ctx, bound, declared, checked)
        } else {
            bound
        })
    } else {
        None
    };
    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::LocalDecl {
            symbol,
            initializer,
            is_ref,
        },
    }
}

fn bind_local_function(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_local_function(node) else {
        return error_statement(node);
    };
    let name = data.name.clone();
    let body_node = data.body;

    let symbol = local_function_symbol(ctx, binder, &name).unwrap_or(SymbolId::NONE);
    let inner = if symbol != SymbolId::NONE {
        binder.push(BinderKind::Member {
            symbol,
            body: body_node,
        })
    } else {
        Arc::clone(binder)
    };
    let body = bind_statement(ctx, &inner, body_node);
    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::NestedFunction {
            symbol,
            body: Box::new(body),
        },
    }
}

fn bind_expression_statement(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_expression_statement(node) else {
        return error_statement(node);
    };
    let expression = expr::bind_expression(ctx, binder, data.expression);
    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::Expression(expression),
    }
}

fn bind_return(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_return(node) else {
        return error_statement(node);
    };
    let (expression_node, is_ref) = (data.expression, data.is_ref);
    let expression = if expression_node.is_some() {
        let bound = expr::bind_expression(ctx, binder, expression_node);
        let checked = ctx.is_checked(binder.checked_state());
        Some(match return_type(ctx, binder) {
            Some(target) if target != TypeId::VOID && target != TypeId::ERROR && !is_ref => {
                coerce(ctx, bound, target, checked)
            }
            _ => bound,
        })
    } else {
        None
    };
    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::Return { expression, is_ref },
    }
}

/// `checked { }` / `unchecked { }` replace the region bit wholesale; the
/// innermost region wins.
fn bind_checked_region(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_checked_statement(node) else {
        return error_statement(node);
    };
    let (block, is_checked) = (data.block, data.is_checked);
    let mut flags = binder.flags;
    flags.remove(BinderFlags::CHECKED_REGION | BinderFlags::UNCHECKED_REGION);
    flags.insert(if is_checked {
        BinderFlags::CHECKED_REGION
    } else {
        BinderFlags::UNCHECKED_REGION
    });
    let inner = binder.push_flags(flags);
    bind_statement(ctx, &inner, block)
}

fn bind_unsafe_region(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_unsafe_statement(node) else {
        return error_statement(node);
    };
    let block = data.block;
    let inner = binder.push_flags(binder.flags | BinderFlags::UNSAFE_REGION);
    bind_statement(ctx, &inner, block)
}

fn bind_foreach(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_foreach(node) else {
        return error_statement(node);
    };
    let identifier = data.identifier.clone();
    let (collection_node, body_node) = (data.collection, data.body);

    let collection = expr::bind_expression(ctx, binder, collection_node);
    let variable = local_symbol(ctx, binder, &identifier).unwrap_or(SymbolId::NONE);
    let inner = binder.push(BinderKind::Block { node: body_node });
    let body = bind_statement(ctx, &inner, body_node);
    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::Foreach {
            variable,
            collection,
            body: Box::new(body),
        },
    }
}

fn bind_switch(
    ctx: &mut CheckerContext<'_>,
    binder: &Arc<Binder>,
    node: NodeIndex,
) -> BoundStatement {
    let Some(data) = ctx.arena.get_switch_statement(node) else {
        return error_statement(node);
    };
    let operand_node = data.expression;
    let section_nodes: Vec<NodeIndex> = data.sections.iter().collect();

    let operand = expr::bind_expression(ctx, binder, operand_node);
    let checked = ctx.is_checked(binder.checked_state());

    let mut sections = Vec::new();
    for section_node in section_nodes {
        let Some(section) = ctx.arena.get_switch_section(section_node) else {
            continue;
        };
        let label_nodes: Vec<NodeIndex> = section.labels.iter().collect();
        let statement_nodes: Vec<NodeIndex> = section.statements.iter().collect();

        let section_binder = binder.push(BinderKind::PatternVariables { node: section_node });
        let mut cases = Vec::new();
        for label_node in label_nodes {
            // The default label matches everything and runs last no
            // matter where it is written; it takes no part in the
            // subsumption ordering.
            if ctx.arena.kind_of(label_node) != k::CASE_PATTERN_SWITCH_LABEL {
                continue;
            }
            let Some(label) = ctx.arena.get_case_pattern_label(label_node) else {
                continue;
            };
            let (pattern_node, when_node) = (label.pattern, label.when_clause);
            let pattern = patterns::bind_pattern(ctx, &section_binder, pattern_node, operand.ty);
            let guard = if when_node.is_some() {
                let bound = expr::bind_expression(ctx, &section_binder, when_node);
                Some(coerce(ctx, bound, TypeId::BOOLEAN, checked))
            } else {
                None
            };
            cases.push((pattern, guard));
        }
        let statements = statement_nodes
            .into_iter()
            .map(|statement| bind_statement(ctx, &section_binder, statement))
            .collect();
        sections.push(BoundSwitchSection {
            syntax: section_node,
            cases,
            statements,
        });
    }

    let case_list: Vec<patterns::PatternCase<'_>> = sections
        .iter()
        .flat_map(|section| {
            section.cases.iter().map(|(pattern, guard)| patterns::PatternCase {
                pattern,
                has_guard: guard.is_some(),
                span: node_span(ctx, pattern.syntax),
            })
        })
        .collect();
    patterns::check_cases(ctx, &case_list, true);

    BoundStatement {
        syntax: node,
        kind: BoundStatementKind::Switch { operand, sections },
    }
}

fn return_type(ctx: &CheckerContext<'_>, binder: &Arc<Binder>) -> Option<TypeId> {
    let member = binder.containing_member_or_lambda()?;
    ctx.symbols
        .get(member)
        .signature
        .as_ref()
        .map(|signature| signature.return_type)
}

fn local_symbol(ctx: &CheckerContext<'_>, binder: &Arc<Binder>, name: &str) -> Option<SymbolId> {
    let member = binder.containing_member_or_lambda()?;
    ctx.symbols
        .find_members(member, name)
        .find(|&id| ctx.symbols.get(id).kind == SymbolKind::Local)
}

fn local_function_symbol(
    ctx: &CheckerContext<'_>,
    binder: &Arc<Binder>,
    name: &str,
) -> Option<SymbolId> {
    let member = binder.containing_member_or_lambda()?;
    ctx.symbols.find_members(member, name).find(|&id| {
        let symbol = ctx.symbols.get(id);
        symbol.kind == SymbolKind::Method
            && symbol.flags & symbol_flags::LOCAL_FUNCTION != 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::BoundExprKind;
    use crate::testing::TestCompilation;
    use sable_binder::Symbol;
    use sable_common::TextSpan;
    use sable_common::diagnostics::diagnostic_codes as codes;
    use sable_solver::ConstantValue;
    use sable_solver::overload::MethodSignature;
    use sable_syntax::NodeList;
    use sable_syntax::arena::{BinaryOperator, SyntaxLiteral};

    fn span() -> TextSpan {
        TextSpan::new(0, 10)
    }

    #[test]
    fn an_unchecked_block_suppresses_overflow_inside_a_checked_binder() {
        let mut stmt = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let max = s.builder.literal(span(), SyntaxLiteral::I32(i32::MAX));
            let one = s.builder.literal(span(), SyntaxLiteral::I32(1));
            let sum = s.builder.binary(span(), BinaryOperator::Add, max, one);
            let expression = s.builder.expression_statement(span(), sum);
            let statements = NodeList::new(vec![expression]);
            let block = s.builder.block(span(), statements);
            stmt = s.builder.checked_statement(span(), block, false);
            s.members.push(stmt);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::CHECKED_REGION);
        let bound = bind_statement(&mut ctx, &binder, stmt);
        assert!(ctx.diagnostics.is_empty());
        let BoundStatementKind::Block(statements) = bound.kind else {
            panic!("expected a block");
        };
        let BoundStatementKind::Expression(ref sum) = statements[0].kind else {
            panic!("expected an expression statement");
        };
        assert_eq!(sum.constant, Some(ConstantValue::I32(i32::MIN)));
    }

    #[test]
    fn a_return_value_is_coerced_to_the_declared_return_type() {
        let mut stmt = NodeIndex::NONE;
        let mut method = SymbolId::NONE;
        let comp = TestCompilation::build(|s| {
            let class = s.symbols.add(
                Symbol::new("Host", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::OBJECT),
            );
            method = s.symbols.add(
                Symbol::new("Run", SymbolKind::Method, class)
                    .with_signature(MethodSignature::new(Vec::new(), TypeId::I64)),
            );
            let value = s.builder.literal(span(), SyntaxLiteral::I32(7));
            stmt = s.builder.return_statement(span(), value, false);
            s.members.push(stmt);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty()).push(BinderKind::Member {
            symbol: method,
            body: NodeIndex::NONE,
        });
        let bound = bind_statement(&mut ctx, &binder, stmt);
        assert!(ctx.diagnostics.is_empty());
        let BoundStatementKind::Return {
            expression: Some(value),
            ..
        } = bound.kind
        else {
            panic!("expected a return with a value");
        };
        assert_eq!(value.ty, TypeId::I64);
        assert!(matches!(value.kind, BoundExprKind::Conversion(_)));
    }

    #[test]
    fn duplicate_switch_cases_are_reported_through_statement_binding() {
        let mut stmt = NodeIndex::NONE;
        let comp = TestCompilation::build(|s| {
            let operand = s.builder.literal(span(), SyntaxLiteral::I32(3));
            let mut labels = Vec::new();
            for _ in 0..2 {
                let one = s.builder.literal(span(), SyntaxLiteral::I32(1));
                let pattern = s.builder.constant_pattern(span(), one);
                labels.push(
                    s.builder
                        .case_pattern_label(span(), pattern, NodeIndex::NONE),
                );
            }
            let sections: Vec<NodeIndex> = labels
                .into_iter()
                .map(|label| {
                    s.builder.switch_section(
                        span(),
                        NodeList::new(vec![label]),
                        NodeList::empty(),
                    )
                })
                .collect();
            stmt = s
                .builder
                .switch_statement(span(), operand, NodeList::new(sections));
            s.members.push(stmt);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty());
        let bound = bind_statement(&mut ctx, &binder, stmt);
        assert!(matches!(bound.kind, BoundStatementKind::Switch { .. }));
        let reported: Vec<_> = ctx.diagnostics.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].code, codes::SWITCH_CASE_SUBSUMED);
    }

    #[test]
    fn a_local_declaration_coerces_its_initializer() {
        let mut stmt = NodeIndex::NONE;
        let mut method = SymbolId::NONE;
        let comp = TestCompilation::build(|s| {
            let class = s.symbols.add(
                Symbol::new("Host", SymbolKind::NamedType, SymbolId::NONE)
                    .with_type(TypeId::OBJECT),
            );
            method = s
                .symbols
                .add(Symbol::new("Run", SymbolKind::Method, class));
            s.symbols
                .add(Symbol::new("total", SymbolKind::Local, method).with_type(TypeId::F64));
            let ty = s.builder.predefined_type(span(), "double");
            let value = s.builder.literal(span(), SyntaxLiteral::I32(2));
            stmt = s.builder.local_decl(span(), "total", ty, value, false, false);
            s.members.push(stmt);
        });
        let mut ctx = comp.context();
        let binder = Binder::buck_stops(BinderFlags::empty()).push(BinderKind::Member {
            symbol: method,
            body: NodeIndex::NONE,
        });
        let bound = bind_statement(&mut ctx, &binder, stmt);
        assert!(ctx.diagnostics.is_empty());
        let BoundStatementKind::LocalDecl {
            symbol,
            initializer: Some(value),
            ..
        } = bound.kind
        else {
            panic!("expected a local declaration with an initializer");
        };
        assert_ne!(symbol, SymbolId::NONE);
        assert_eq!(value.ty, TypeId::F64);
    }
}
