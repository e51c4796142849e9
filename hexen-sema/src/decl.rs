//! `val`/`mut` declaration rules.

use crate::analyzer::Analyzer;
use crate::array::{self, ArrayAdaptation};
use crate::conversion::{self, AdaptError};
use crate::expr;
use crate::symbols::{DeclareError, Symbol};
use crate::types::{self, Type};
use hexen_ast::{Expr, ExprKind, NodeId, TypeRef};
use hexen_diagnostics::{Diagnostic, ErrorKind};

/// Types a value being bound into a `val`/`mut`/assignment target, handling
/// the `[..]` copy operator the way every binding position must: an array
/// value is never implicitly shared, so a plain array-typed initializer
/// with no `[..]` is diagnosed even when its shape already matches.
///
/// `target` is `None` for an untyped `val` (the bound type is whatever the
/// value turns out to be).
fn analyze_bound_value(an: &mut Analyzer, value: &Expr, target: Option<&Type>, node: NodeId) -> Type {
    if let ExprKind::ArrayCopy(inner) = &value.kind {
        let source_ty = expr::analyze_expr(an, inner);
        if source_ty.is_unknown() {
            return Type::Unknown;
        }
        return match target {
            None => source_ty,
            Some(target_ty) => adapt_copied_array(an, &source_ty, target_ty, node),
        };
    }

    let value_ty = expr::analyze_expr(an, value);
    if value_ty.is_unknown() {
        return Type::Unknown;
    }

    if matches!(value_ty, Type::Array(..)) {
        match target {
            None => {
                missing_copy_operator(an, node);
                return Type::Unknown;
            }
            Some(target_ty) if matches!(target_ty, Type::Array(..)) => {
                missing_copy_operator(an, node);
                return Type::Unknown;
            }
            _ => {}
        }
    }

    match target {
        None => value_ty,
        Some(target_ty) => match conversion::adapt_implicit(&value_ty, target_ty) {
            Ok(ty) => ty,
            Err(err) => {
                diagnose_assign_mismatch(an, &value_ty, target_ty, err, node);
                Type::Unknown
            }
        },
    }
}

fn adapt_copied_array(an: &mut Analyzer, source_ty: &Type, target_ty: &Type, node: NodeId) -> Type {
    if matches!(source_ty, Type::Array(..)) {
        match array::classify_array_conversion(source_ty, target_ty, true) {
            ArrayAdaptation::Copied(ty) | ArrayAdaptation::Reshaped(ty) => ty,
            ArrayAdaptation::MissingCopyOperator => unreachable!(),
            ArrayAdaptation::ProductMismatch {
                source_count,
                target_count,
            } => {
                an.diagnostics.emit(Diagnostic::error(
                    ErrorKind::ArrayShapeError,
                    format!(
                        "cannot reshape an array of {} elements into {} ({})",
                        source_count, target_count, target_ty
                    ),
                    node,
                ));
                Type::Unknown
            }
            ArrayAdaptation::Forbidden => {
                an.diagnostics.emit(Diagnostic::error(
                    ErrorKind::ForbiddenConversion,
                    format!("cannot convert `{}` to `{}`", source_ty, target_ty),
                    node,
                ));
                Type::Unknown
            }
        }
    } else {
        match conversion::adapt_implicit(source_ty, target_ty) {
            Ok(ty) => ty,
            Err(err) => {
                diagnose_assign_mismatch(an, source_ty, target_ty, err, node);
                Type::Unknown
            }
        }
    }
}

fn missing_copy_operator(an: &mut Analyzer, node: NodeId) {
    an.diagnostics.emit(
        Diagnostic::error(
            ErrorKind::MissingCopyOperator,
            "array values are always copied explicitly".to_string(),
            node,
        )
        .with_suggestion("wrap the source in `[..]`"),
    );
}

/// `val name[: T] = init`. Comptime initializers with no declared type keep
/// their comptime-ness (so later uses still enjoy adaptation flexibility);
/// everything else resolves to a concrete type immediately.
pub fn analyze_val_decl(
    an: &mut Analyzer,
    name: &str,
    declared_type: &Option<TypeRef>,
    init: &Expr,
    node: NodeId,
) {
    if matches!(init.kind, ExprKind::Undef) {
        an.diagnostics.emit(Diagnostic::error(
            ErrorKind::MissingTypeAnnotation,
            "`val` cannot be initialized with `undef` — only `mut` can be".to_string(),
            node,
        ));
        return;
    }

    // A block- or conditional-expression- or call-initialized `val` must
    // carry an explicit annotation; its runtime-evaluated nature means there
    // is no comptime value to flow forward.
    let requires_annotation = matches!(
        init.kind,
        ExprKind::Block(_) | ExprKind::Conditional(_) | ExprKind::Call { .. }
    );
    if requires_annotation && declared_type.is_none() {
        an.diagnostics.emit(Diagnostic::error(
            ErrorKind::MissingTypeAnnotation,
            format!("`val {}` must declare its type explicitly here", name),
            node,
        ));
    }

    let target = declared_type
        .as_ref()
        .map(|type_ref| resolve_or_unknown(type_ref, node));
    let final_ty = match &target {
        Some(t) if t.is_unknown() => {
            expr::analyze_expr(an, init);
            Type::Unknown
        }
        _ => analyze_bound_value(an, init, target.as_ref(), node),
    };

    declare(an, name, final_ty, false, true, node);
}

/// `mut name: T = init`. The type annotation is always mandatory; `undef` is
/// legal here and leaves the symbol uninitialized until its first
/// assignment.
pub fn analyze_mut_decl(
    an: &mut Analyzer,
    name: &str,
    declared_type: &TypeRef,
    init: &Expr,
    node: NodeId,
) {
    let target = resolve_or_unknown(declared_type, node);

    if matches!(init.kind, ExprKind::Undef) {
        declare(an, name, target, true, false, node);
        return;
    }

    if target.is_unknown() {
        expr::analyze_expr(an, init);
        declare(an, name, target, true, true, node);
        return;
    }

    analyze_bound_value(an, init, Some(&target), node);
    declare(an, name, target, true, true, node);
}

/// `target = value`. Only a mutable binding, array element, or (in a future
/// record system) a mutable field may be assigned to.
pub fn analyze_assign(an: &mut Analyzer, target: &Expr, value: &Expr, node: NodeId) {
    match &target.kind {
        ExprKind::Ident(name) => {
            let declared = an.symbols.lookup(name).cloned();
            match declared {
                None => {
                    an.undeclared_name(name, target.id);
                    expr::analyze_expr(an, value);
                }
                Some(symbol) => {
                    if !symbol.is_mutable {
                        an.diagnostics.emit(Diagnostic::error(
                            ErrorKind::ImmutabilityViolation,
                            format!("`{}` is not declared `mut` and cannot be reassigned", name),
                            node,
                        ));
                        expr::analyze_expr(an, value);
                    } else {
                        analyze_bound_value(an, value, Some(&symbol.declared_type), node);
                    }
                    an.symbols.mark_initialized(name);
                }
            }
        }
        ExprKind::ArrayAccess { .. } => {
            // Element assignment is always legal on a declared array; the
            // element-type check happens structurally via `expr::analyze_expr`.
            let target_ty = expr::analyze_expr(an, target);
            if target_ty.is_unknown() {
                expr::analyze_expr(an, value);
            } else {
                analyze_bound_value(an, value, Some(&target_ty), node);
            }
        }
        _ => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ImmutabilityViolation,
                "this expression cannot appear as an assignment target".to_string(),
                node,
            ));
            expr::analyze_expr(an, value);
        }
    }
}

fn diagnose_assign_mismatch(
    an: &mut Analyzer,
    value_ty: &Type,
    target_ty: &Type,
    err: AdaptError,
    node: NodeId,
) {
    match err {
        AdaptError::RequiresExplicit { suggested_syntax } => {
            an.diagnostics.emit(
                Diagnostic::error(
                    ErrorKind::MissingExplicitConversion,
                    format!("`{}` does not implicitly convert to `{}`", value_ty, target_ty),
                    node,
                )
                .with_suggestion(format!("write the conversion explicitly{}", suggested_syntax)),
            );
        }
        AdaptError::Overflow => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::OverflowInLiteral,
                format!("literal does not fit in `{}`", target_ty),
                node,
            ));
        }
        AdaptError::Forbidden => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::TypeMismatch,
                format!("cannot assign `{}` to `{}`", value_ty, target_ty),
                node,
            ));
        }
    }
}

fn resolve_or_unknown(type_ref: &TypeRef, node: NodeId) -> Type {
    match types::resolve_type_ref(type_ref, node) {
        Ok(ty) => ty,
        Err(err) => {
            log::error!("internal: {}", err);
            Type::Unknown
        }
    }
}

fn declare(
    an: &mut Analyzer,
    name: &str,
    ty: Type,
    is_mutable: bool,
    is_initialized: bool,
    node: NodeId,
) {
    let symbol = Symbol {
        name: name.to_string(),
        declared_type: ty,
        is_mutable,
        is_initialized,
    };
    if let Err(DeclareError::Redeclaration) = an.symbols.declare(symbol) {
        an.diagnostics.emit(Diagnostic::error(
            ErrorKind::Redeclaration,
            format!("`{}` is already declared in this scope", name),
            node,
        ));
    }
}
