//! Unified block analyzer: a `{ ... }` is the same construct
//! whether it's a function body, a statement, or an expression — only what
//! surrounds it changes what a trailing `-> e` means.

use crate::analyzer::Analyzer;
use crate::conditional;
use crate::decl;
use crate::expr;
use crate::types::Type;
use hexen_ast::{Block, Expr, ExprKind, Stmt, StmtKind};
use hexen_diagnostics::{Diagnostic, ErrorKind};

/// Analyzes a block used as a statement (function body, `if` branch body,
/// bare nested `{ }`): no value escapes it, so a `-> e` terminator is
/// nonsensical here and is diagnosed.
pub fn analyze_statement_block(an: &mut Analyzer, block: &Block, return_type: &Type) {
    an.symbols.enter_scope();
    for stmt in &block.stmts {
        if let StmtKind::YieldArrow(_) = &stmt.kind {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ControlFlowError,
                "`->` only terminates an expression block, not a statement block".to_string(),
                stmt.id,
            ));
            continue;
        }
        analyze_stmt(an, stmt, return_type);
    }
    an.symbols.leave_scope();
}

/// Analyzes a block used as an expression (the initializer of a typed
/// `val`, the trailing arm of a conditional expression): exactly one
/// `-> e` terminates it and supplies the block's value; every path through
/// the block must reach one.
///
/// A block that only ever touches comptime values — no call, no nested
/// conditional, no reference to an already-concrete variable — is
/// compile-time evaluable: its `-> e` type, comptime and all, passes
/// through the block boundary unchanged, the same way a bare literal would.
/// A block with any of those ingredients is runtime evaluable and must
/// settle on a concrete type at the boundary; a yield that's still comptime
/// at that point has nothing to anchor it and is diagnosed.
pub fn analyze_expr_block(an: &mut Analyzer, block: &Block) -> Type {
    an.symbols.enter_scope();
    let mut yielded = None;
    let mut yield_node = block.id;
    for stmt in &block.stmts {
        match &stmt.kind {
            StmtKind::YieldArrow(value) => {
                let ty = expr::analyze_expr(an, value);
                if yielded.is_some() {
                    an.diagnostics.emit(Diagnostic::error(
                        ErrorKind::ControlFlowError,
                        "an expression block can only yield once".to_string(),
                        stmt.id,
                    ));
                } else {
                    yield_node = stmt.id;
                    yielded = Some(ty);
                }
            }
            _ => analyze_stmt_no_return(an, stmt),
        }
    }
    let runtime_evaluable = is_runtime_evaluable(an, block);
    an.symbols.leave_scope();

    match yielded {
        Some(ty) => {
            if runtime_evaluable && ty.is_comptime() {
                an.diagnostics.emit(
                    Diagnostic::error(
                        ErrorKind::MissingExplicitConversion,
                        format!(
                            "this block calls a function, branches, or reads a concrete variable, \
                             so its yielded value must already be concrete, not `{}`",
                            ty
                        ),
                        yield_node,
                    )
                    .with_suggestion("write the conversion explicitly, e.g. `-> value:i32`"),
                );
                Type::Unknown
            } else {
                ty
            }
        }
        None => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ControlFlowError,
                "expression block must end with `-> value`".to_string(),
                block.id,
            ));
            Type::Unknown
        }
    }
}

/// Does this block contain a runtime ingredient — a call, a conditional, or
/// a reference to a variable that's already concrete? Nested expression
/// blocks are classified independently and don't themselves count; a
/// nested statement block or `if` does, since it can run arbitrary
/// runtime control flow.
fn is_runtime_evaluable(an: &Analyzer, block: &Block) -> bool {
    block.stmts.iter().any(|stmt| stmt_has_runtime_ingredient(an, stmt))
}

fn stmt_has_runtime_ingredient(an: &Analyzer, stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::ValDecl { init, .. } => expr_has_runtime_ingredient(an, init),
        StmtKind::MutDecl { init, .. } => expr_has_runtime_ingredient(an, init),
        StmtKind::Assign { target, value } => {
            expr_has_runtime_ingredient(an, target) || expr_has_runtime_ingredient(an, value)
        }
        StmtKind::Return(value) => value.as_ref().is_some_and(|e| expr_has_runtime_ingredient(an, e)),
        StmtKind::ExprStmt(e) => expr_has_runtime_ingredient(an, e),
        StmtKind::YieldArrow(e) => expr_has_runtime_ingredient(an, e),
        StmtKind::If(_) => true,
        StmtKind::BlockStmt(b) => is_runtime_evaluable(an, b),
    }
}

fn expr_has_runtime_ingredient(an: &Analyzer, expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call { .. } => true,
        ExprKind::Conditional(_) => true,
        ExprKind::Ident(name) => an
            .symbols
            .lookup(name)
            .is_some_and(|sym| !sym.declared_type.is_comptime() && !sym.declared_type.is_unknown()),
        ExprKind::Binary { left, right, .. } => {
            expr_has_runtime_ingredient(an, left) || expr_has_runtime_ingredient(an, right)
        }
        ExprKind::Unary { operand, .. } => expr_has_runtime_ingredient(an, operand),
        ExprKind::Conversion { expr, .. } => expr_has_runtime_ingredient(an, expr),
        ExprKind::ArrayLiteral(elems) => elems.iter().any(|e| expr_has_runtime_ingredient(an, e)),
        ExprKind::ArrayAccess { array, index } => {
            expr_has_runtime_ingredient(an, array) || expr_has_runtime_ingredient(an, index)
        }
        ExprKind::ArrayCopy(inner) => expr_has_runtime_ingredient(an, inner),
        ExprKind::PropertyAccess { object, .. } => expr_has_runtime_ingredient(an, object),
        ExprKind::Block(_) => false,
        ExprKind::IntLiteral(_)
        | ExprKind::FloatLiteral(_)
        | ExprKind::StringLiteral(_)
        | ExprKind::BoolLiteral(_)
        | ExprKind::Undef => false,
    }
}

fn analyze_stmt(an: &mut Analyzer, stmt: &Stmt, return_type: &Type) {
    match &stmt.kind {
        StmtKind::ValDecl {
            name,
            declared_type,
            init,
        } => decl::analyze_val_decl(an, name, declared_type, init, stmt.id),
        StmtKind::MutDecl {
            name,
            declared_type,
            init,
        } => decl::analyze_mut_decl(an, name, declared_type, init, stmt.id),
        StmtKind::Assign { target, value } => decl::analyze_assign(an, target, value, stmt.id),
        StmtKind::Return(value) => analyze_return(an, value.as_ref(), return_type, stmt.id),
        StmtKind::ExprStmt(e) => {
            expr::analyze_expr(an, e);
        }
        StmtKind::If(if_node) => conditional::analyze_conditional_stmt(an, if_node, return_type),
        StmtKind::BlockStmt(b) => analyze_statement_block(an, b, return_type),
        StmtKind::YieldArrow(_) => unreachable!("handled by caller"),
    }
}

/// Like [`analyze_stmt`] but for statements inside an expression block that
/// aren't themselves the yield — `return` is still legal (an early exit from
/// the enclosing function), but there is no separate return-type context
/// threaded down into nested statement blocks here since expression blocks
/// don't themselves know the function's return type; callers that need
/// `return` validated against a return type go through `analyze_stmt`
/// instead. In practice expression blocks hold declarations and nested
/// control flow, not `return`; if one appears we validate it loosely against
/// `Type::Unknown` so it never silently passes.
fn analyze_stmt_no_return(an: &mut Analyzer, stmt: &Stmt) {
    analyze_stmt(an, stmt, &Type::Unknown)
}

fn analyze_return(
    an: &mut Analyzer,
    value: Option<&hexen_ast::Expr>,
    return_type: &Type,
    node: hexen_ast::NodeId,
) {
    match (value, return_type) {
        (None, Type::Void) => {}
        (None, _) => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ControlFlowError,
                format!("function must return a value of type `{}`", return_type),
                node,
            ));
        }
        (Some(_), Type::Void) => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ControlFlowError,
                "function returning `void` cannot return a value".to_string(),
                node,
            ));
        }
        (Some(e), _) => {
            let value_ty = expr::analyze_expr(an, e);
            if !value_ty.is_unknown() && !return_type.is_unknown() {
                if let Err(err) = crate::conversion::adapt_implicit(&value_ty, return_type) {
                    crate::function::diagnose_return_mismatch(an, &value_ty, return_type, err, node);
                }
            }
        }
    }
}
