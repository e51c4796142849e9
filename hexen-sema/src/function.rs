//! Function pre-pass collection, body/return analysis, and call-site
//! checking.

use crate::analyzer::Analyzer;
use crate::array::{self, ArrayAdaptation};
use crate::block;
use crate::conversion::{self, AdaptError};
use crate::expr;
use crate::symbols::FunctionSignature;
use crate::types::{self, Type};
use hexen_ast::{Expr, ExprKind, Func, NodeId, Program};
use hexen_diagnostics::{Diagnostic, ErrorKind};

/// Pre-pass: collect every function's signature before analyzing any body,
/// so a call to a function declared later in the file still resolves.
pub fn collect_signatures(an: &mut Analyzer, program: &Program) {
    for func in &program.funcs {
        let params = func
            .params
            .iter()
            .map(|p| {
                let ty = match types::resolve_type_ref(&p.ty, func.id) {
                    Ok(ty) => ty,
                    Err(err) => {
                        log::error!("internal: {}", err);
                        Type::Unknown
                    }
                };
                (p.name.clone(), ty)
            })
            .collect();
        let return_type = match types::resolve_type_ref(&func.return_type, func.id) {
            Ok(ty) => ty,
            Err(err) => {
                log::error!("internal: {}", err);
                Type::Unknown
            }
        };
        an.symbols
            .declare_function(func.name.clone(), FunctionSignature { params, return_type });
    }
}

/// Analyzes one function's parameters and body against its (already
/// collected) return type.
pub fn analyze_function(an: &mut Analyzer, func: &Func) {
    an.symbols.enter_scope();
    for param in &func.params {
        let ty = match types::resolve_type_ref(&param.ty, func.id) {
            Ok(ty) => ty,
            Err(err) => {
                log::error!("internal: {}", err);
                Type::Unknown
            }
        };
        let symbol = crate::symbols::Symbol::new(param.name.clone(), ty, param.is_mut);
        if let Err(crate::symbols::DeclareError::Redeclaration) = an.symbols.declare(symbol) {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::Redeclaration,
                format!("parameter `{}` is declared more than once", param.name),
                func.id,
            ));
        }
    }

    let return_type = match types::resolve_type_ref(&func.return_type, func.id) {
        Ok(ty) => ty,
        Err(err) => {
            log::error!("internal: {}", err);
            Type::Unknown
        }
    };
    block::analyze_statement_block(an, &func.body, &return_type);
    an.symbols.leave_scope();
}

/// `callee(args...)`. Arity, per-argument adaptation (including the `[..]`
/// copy operator for array-typed parameters), and an unknown-function
/// diagnostic all happen here.
pub fn analyze_call(an: &mut Analyzer, callee: &str, args: &[Expr], node: NodeId) -> Type {
    let signature = match an.symbols.lookup_function(callee) {
        Some(sig) => sig.clone(),
        None => {
            let candidates = an.symbols.function_names();
            let suggestions = hexen_diagnostics::fuzzy::find_similar_names(
                callee,
                &candidates,
                an.config.fuzzy_threshold,
                an.config.fuzzy_max_suggestions,
            );
            let mut diagnostic = Diagnostic::error(
                ErrorKind::UndeclaredName,
                format!("call to undeclared function `{}`", callee),
                node,
            );
            if let Some(first) = suggestions.first() {
                diagnostic = diagnostic.with_suggestion(format!("did you mean `{}`?", first));
            }
            an.diagnostics.emit(diagnostic);
            return Type::Unknown;
        }
    };

    if args.len() != signature.params.len() {
        an.diagnostics.emit(Diagnostic::error(
            ErrorKind::TypeMismatch,
            format!(
                "`{}` takes {} argument(s), found {}",
                callee,
                signature.params.len(),
                args.len()
            ),
            node,
        ));
        for arg in args {
            expr::analyze_expr(an, arg);
        }
        return signature.return_type;
    }

    for (arg, (param_name, param_ty)) in args.iter().zip(signature.params.iter()) {
        check_argument(an, arg, param_name, param_ty);
    }

    signature.return_type
}

fn check_argument(an: &mut Analyzer, arg: &Expr, param_name: &str, param_ty: &Type) {
    if let (Type::Array(..), ExprKind::ArrayCopy(inner)) = (param_ty, &arg.kind) {
        let source_ty = expr::analyze_expr(an, inner);
        if source_ty.is_unknown() {
            return;
        }
        match array::classify_array_conversion(&source_ty, param_ty, true) {
            ArrayAdaptation::Copied(_) | ArrayAdaptation::Reshaped(_) => {}
            ArrayAdaptation::ProductMismatch { .. } | ArrayAdaptation::Forbidden => {
                an.diagnostics.emit(Diagnostic::error(
                    ErrorKind::ArrayShapeError,
                    format!(
                        "argument for `{}` does not match parameter type `{}`",
                        param_name, param_ty
                    ),
                    arg.id,
                ));
            }
            ArrayAdaptation::MissingCopyOperator => unreachable!(),
        }
        return;
    }

    let arg_ty = expr::analyze_expr(an, arg);
    if arg_ty.is_unknown() {
        return;
    }

    // A comptime array materializes straight into the parameter type, the
    // same way a bare comptime scalar does — `[..]` is only required when
    // the argument is already a concrete array that needs deep-copying.
    if matches!(param_ty, Type::Array(..)) && !matches!(arg_ty, Type::ComptimeArray(..)) {
        an.diagnostics.emit(
            Diagnostic::error(
                ErrorKind::MissingCopyOperator,
                format!("argument for `{}` must be copied explicitly", param_name),
                arg.id,
            )
            .with_suggestion("wrap the argument in `[..]`"),
        );
        return;
    }

    if let Err(err) = conversion::adapt_implicit(&arg_ty, param_ty) {
        match err {
            AdaptError::RequiresExplicit { suggested_syntax } => {
                an.diagnostics.emit(
                    Diagnostic::error(
                        ErrorKind::MissingExplicitConversion,
                        format!(
                            "argument for `{}` is `{}`, expected `{}`",
                            param_name, arg_ty, param_ty
                        ),
                        arg.id,
                    )
                    .with_suggestion(format!("write the conversion explicitly{}", suggested_syntax)),
                );
            }
            AdaptError::Overflow => {
                an.diagnostics.emit(Diagnostic::error(
                    ErrorKind::OverflowInLiteral,
                    format!("literal does not fit in `{}`", param_ty),
                    arg.id,
                ));
            }
            AdaptError::Forbidden => {
                an.diagnostics.emit(Diagnostic::error(
                    ErrorKind::TypeMismatch,
                    format!(
                        "argument for `{}` is `{}`, expected `{}`",
                        param_name, arg_ty, param_ty
                    ),
                    arg.id,
                ));
            }
        }
    }
}

/// Shared with `block.rs`'s `return` handling, which has no other reason to
/// depend on this module otherwise.
pub(crate) fn diagnose_return_mismatch(
    an: &mut Analyzer,
    value_ty: &Type,
    return_type: &Type,
    err: AdaptError,
    node: NodeId,
) {
    match err {
        AdaptError::RequiresExplicit { suggested_syntax } => {
            an.diagnostics.emit(
                Diagnostic::error(
                    ErrorKind::MissingExplicitConversion,
                    format!("return value `{}` does not convert to `{}`", value_ty, return_type),
                    node,
                )
                .with_suggestion(format!("write the conversion explicitly{}", suggested_syntax)),
            );
        }
        AdaptError::Overflow => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::OverflowInLiteral,
                format!("literal does not fit in `{}`", return_type),
                node,
            ));
        }
        AdaptError::Forbidden => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::TypeMismatch,
                format!("cannot return `{}` from a function declared to return `{}`", value_ty, return_type),
                node,
            ));
        }
    }
}
