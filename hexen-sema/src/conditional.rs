//! `if`/`elif`/`else` as both statement and expression. The two
//! positions share the same [`hexen_ast::IfNode`] shape; only the typing
//! discipline around the branches differs.

use crate::analyzer::Analyzer;
use crate::block;
use crate::conversion::{self, AdaptError};
use crate::expr;
use crate::types::Type;
use hexen_ast::{IfNode, NodeId};
use hexen_diagnostics::{Diagnostic, ErrorKind};

fn check_condition(an: &mut Analyzer, condition: &hexen_ast::Expr) {
    let ty = expr::analyze_expr(an, condition);
    if !ty.is_unknown() && !ty.is_bool() {
        an.diagnostics.emit(Diagnostic::error(
            ErrorKind::BooleanConditionRequired,
            format!("condition must be `bool`, found `{}`", ty),
            condition.id,
        ));
    }
}

/// `if` as a statement: branches are ordinary statement blocks, `else` is
/// optional, and no value is produced.
pub fn analyze_conditional_stmt(an: &mut Analyzer, if_node: &IfNode, return_type: &Type) {
    check_condition(an, &if_node.condition);
    block::analyze_statement_block(an, &if_node.then_block, return_type);
    for (cond, branch) in &if_node.elif_branches {
        check_condition(an, cond);
        block::analyze_statement_block(an, branch, return_type);
    }
    if let Some(else_block) = &if_node.else_block {
        block::analyze_statement_block(an, else_block, return_type);
    }
}

/// `if` as an expression: every branch is an expression block, `else` is
/// mandatory (there must always be a value), and every branch's type must
/// join to a single common type.
pub fn analyze_conditional_expr(an: &mut Analyzer, if_node: &IfNode, node: NodeId) -> Type {
    check_condition(an, &if_node.condition);

    let mut branch_types = vec![block::analyze_expr_block(an, &if_node.then_block)];
    for (cond, branch) in &if_node.elif_branches {
        check_condition(an, cond);
        branch_types.push(block::analyze_expr_block(an, branch));
    }

    match &if_node.else_block {
        Some(else_block) => branch_types.push(block::analyze_expr_block(an, else_block)),
        None => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ControlFlowError,
                "conditional expression must have an `else` branch".to_string(),
                node,
            ));
            return Type::Unknown;
        }
    }

    join_branch_types(an, &branch_types, node)
}

/// Finds a single type every branch agrees on, either by exact match or by
/// every other branch implicitly adapting to one "widest" branch — the same
/// adaptation rules that govern assignment, applied pairwise.
fn join_branch_types(an: &mut Analyzer, branch_types: &[Type], node: NodeId) -> Type {
    if branch_types.iter().any(Type::is_unknown) {
        return Type::Unknown;
    }

    let mut joined = branch_types[0].clone();
    for ty in &branch_types[1..] {
        if *ty == joined {
            continue;
        }
        if let Some(merged) = merge_same_comptime_family(ty, &joined) {
            joined = merged;
            continue;
        }
        match conversion::adapt_implicit(ty, &joined) {
            Ok(_) => continue,
            Err(_) => match conversion::adapt_implicit(&joined, ty) {
                Ok(_) => {
                    joined = ty.clone();
                    continue;
                }
                Err(err) => {
                    diagnose_branch_mismatch(an, &joined, ty, err, node);
                    return Type::Unknown;
                }
            },
        }
    }
    joined
}

/// Two comptime scalars of the same family join without adaptation, but the
/// larger-magnitude value must carry forward — whichever branch's literal
/// would overflow a later target type has to still be there to get caught,
/// not quietly dropped in favor of whichever branch happened to come first.
fn merge_same_comptime_family(a: &Type, b: &Type) -> Option<Type> {
    match (a, b) {
        (Type::ComptimeInt(x), Type::ComptimeInt(y)) => {
            Some(Type::ComptimeInt(if x.unsigned_abs() >= y.unsigned_abs() { *x } else { *y }))
        }
        (Type::ComptimeFloat(x), Type::ComptimeFloat(y)) => {
            Some(Type::ComptimeFloat(if x.abs() >= y.abs() { *x } else { *y }))
        }
        _ => None,
    }
}

fn diagnose_branch_mismatch(an: &mut Analyzer, a: &Type, b: &Type, err: AdaptError, node: NodeId) {
    let message = match err {
        AdaptError::RequiresExplicit { .. } => format!(
            "conditional branches have different types `{}` and `{}`; convert one explicitly",
            a, b
        ),
        _ => format!("conditional branches have incompatible types `{}` and `{}`", a, b),
    };
    an.diagnostics
        .emit(Diagnostic::error(ErrorKind::TypeMismatch, message, node));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use hexen_ast::{Block, Expr, ExprKind, NodeIdGen, Stmt, StmtKind};

    fn yield_block(ids: &mut NodeIdGen, value: i64) -> Block {
        Block {
            id: ids.next(),
            stmts: vec![Stmt {
                id: ids.next(),
                kind: StmtKind::YieldArrow(Expr::new(ids.next(), ExprKind::IntLiteral(value))),
            }],
        }
    }

    #[test]
    fn conditional_expression_without_else_is_diagnosed() {
        let mut an = Analyzer::new(AnalyzerConfig::default());
        let mut ids = NodeIdGen::new();
        let if_node = IfNode {
            condition: Box::new(Expr::new(ids.next(), ExprKind::BoolLiteral(true))),
            then_block: yield_block(&mut ids, 1),
            elif_branches: vec![],
            else_block: None,
        };
        let ty = analyze_conditional_expr(&mut an, &if_node, ids.next());
        assert!(ty.is_unknown());
        assert_eq!(an.diagnostics.error_count(), 1);
    }

    #[test]
    fn conditional_expression_joins_matching_branch_types() {
        let mut an = Analyzer::new(AnalyzerConfig::default());
        let mut ids = NodeIdGen::new();
        let if_node = IfNode {
            condition: Box::new(Expr::new(ids.next(), ExprKind::BoolLiteral(true))),
            then_block: yield_block(&mut ids, 1),
            elif_branches: vec![],
            else_block: Some(yield_block(&mut ids, 2)),
        };
        let ty = analyze_conditional_expr(&mut an, &if_node, ids.next());
        assert_eq!(ty, Type::ComptimeInt(1));
    }

    #[test]
    fn later_branch_carries_its_value_forward_through_the_join() {
        // The first branch is small, the second is the one that would
        // overflow an i32 target; `joined` must end up holding the second
        // branch's value so a caller's later overflow check against `i32`
        // actually sees it instead of only ever checking branch one.
        let mut an = Analyzer::new(AnalyzerConfig::default());
        let mut ids = NodeIdGen::new();
        let if_node = IfNode {
            condition: Box::new(Expr::new(ids.next(), ExprKind::BoolLiteral(true))),
            then_block: yield_block(&mut ids, 1),
            elif_branches: vec![],
            else_block: Some(yield_block(&mut ids, 99_999_999_999)),
        };
        let ty = analyze_conditional_expr(&mut an, &if_node, ids.next());
        assert_eq!(ty, Type::ComptimeInt(99_999_999_999));

        let err = conversion::adapt_implicit(&ty, &Type::I32).unwrap_err();
        assert!(matches!(err, AdaptError::Overflow));
    }

    #[test]
    fn non_bool_condition_is_diagnosed() {
        let mut an = Analyzer::new(AnalyzerConfig::default());
        let mut ids = NodeIdGen::new();
        let if_node = IfNode {
            condition: Box::new(Expr::new(ids.next(), ExprKind::IntLiteral(1))),
            then_block: yield_block(&mut ids, 1),
            elif_branches: vec![],
            else_block: Some(yield_block(&mut ids, 2)),
        };
        analyze_conditional_expr(&mut an, &if_node, ids.next());
        assert!(an.diagnostics.error_count() >= 1);
    }
}
