//! Expression typing: the single dispatch point every other
//! analyzer module funnels expressions through.

use crate::analyzer::Analyzer;
use crate::array::{self, ArrayAdaptation};
use crate::block;
use crate::conditional;
use crate::conversion::{self, AdaptError};
use crate::function;
use crate::operators::{self, BinaryOutcome};
use crate::types::{self, Dim, ElemFamily, Type};
use hexen_ast::{Expr, ExprKind, NodeId};
use hexen_diagnostics::{Diagnostic, ErrorKind};

/// Types `expr`, optionally in the presence of a context type (e.g. a `val`
/// declaration's annotation, or a parameter type at a call site) that
/// comptime literals can adapt toward without their own explicit syntax.
/// Context is currently only consulted by the conversion logic embedded in
/// callers (`decl.rs`, `function.rs`); this function always returns the
/// expression's own, context-independent type.
pub fn analyze_expr(an: &mut Analyzer, expr: &Expr) -> Type {
    match &expr.kind {
        ExprKind::IntLiteral(v) => Type::ComptimeInt(*v as i128),
        ExprKind::FloatLiteral(v) => Type::ComptimeFloat(*v),
        ExprKind::StringLiteral(_) => Type::String,
        ExprKind::BoolLiteral(_) => Type::Bool,
        // `undef` only has meaning as a `mut` initializer; decl.rs matches
        // on it directly rather than routing it through here.
        ExprKind::Undef => Type::Unknown,

        ExprKind::Ident(name) => analyze_ident(an, name, expr.id),

        ExprKind::Binary { op, left, right } => {
            let lhs = analyze_expr(an, left);
            let rhs = analyze_expr(an, right);
            if lhs.is_unknown() || rhs.is_unknown() {
                return Type::Unknown;
            }
            match operators::type_binary(*op, &lhs, &rhs) {
                BinaryOutcome::Ok(ty) => ty,
                BinaryOutcome::DivideByZero => {
                    an.diagnostics.emit(Diagnostic::error(
                        ErrorKind::OverflowInLiteral,
                        "division by zero in constant expression".to_string(),
                        expr.id,
                    ));
                    Type::Unknown
                }
                BinaryOutcome::Incompatible => {
                    an.diagnostics.emit(Diagnostic::error(
                        ErrorKind::TypeMismatch,
                        format!(
                            "cannot apply `{:?}` between `{}` and `{}` without an explicit conversion",
                            op, lhs, rhs
                        ),
                        expr.id,
                    ));
                    Type::Unknown
                }
                BinaryOutcome::WrongOperandKind => {
                    an.diagnostics.emit(Diagnostic::error(
                        ErrorKind::TypeMismatch,
                        format!("`{:?}` is not defined for `{}` and `{}`", op, lhs, rhs),
                        expr.id,
                    ));
                    Type::Unknown
                }
            }
        }

        ExprKind::Unary { op, operand } => {
            let operand_ty = analyze_expr(an, operand);
            if operand_ty.is_unknown() {
                return Type::Unknown;
            }
            match operators::type_unary(*op, &operand_ty) {
                Some(ty) => ty,
                None => {
                    an.diagnostics.emit(Diagnostic::error(
                        ErrorKind::TypeMismatch,
                        format!("`{:?}` is not defined for `{}`", op, operand_ty),
                        expr.id,
                    ));
                    Type::Unknown
                }
            }
        }

        ExprKind::Conversion { expr: inner, target } => {
            analyze_conversion(an, inner, target, expr.id)
        }

        ExprKind::ArrayLiteral(elems) => analyze_array_literal(an, elems, expr.id),

        ExprKind::ArrayAccess { array: arr, index } => analyze_array_access(an, arr, index, expr.id),

        ExprKind::ArrayCopy(inner) => {
            // `[..]` standing alone, outside a conversion or call argument
            // position, carries no meaning of its own.
            let inner_ty = analyze_expr(an, inner);
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ArrayShapeError,
                "`[..]` must appear in an explicit conversion or call argument position".to_string(),
                expr.id,
            ));
            inner_ty
        }

        ExprKind::PropertyAccess { object, property } => {
            analyze_property_access(an, object, property, expr.id)
        }

        ExprKind::Block(b) => block::analyze_expr_block(an, b),

        ExprKind::Conditional(if_node) => conditional::analyze_conditional_expr(an, if_node, expr.id),

        ExprKind::Call { callee, args } => function::analyze_call(an, callee, args, expr.id),
    }
}

fn analyze_ident(an: &mut Analyzer, name: &str, node: NodeId) -> Type {
    match an.symbols.lookup(name) {
        None => {
            an.undeclared_name(name, node);
            Type::Unknown
        }
        Some(symbol) => {
            if !symbol.is_initialized {
                an.diagnostics.emit(Diagnostic::error(
                    ErrorKind::UseOfUninitialized,
                    format!("`{}` is used before being initialized", name),
                    node,
                ));
            }
            symbol.declared_type.clone()
        }
    }
}

fn analyze_conversion(
    an: &mut Analyzer,
    inner: &Expr,
    target_ref: &hexen_ast::TypeRef,
    node: NodeId,
) -> Type {
    let target_ty = resolve_or_unknown(target_ref, node);
    if target_ty.is_unknown() {
        return Type::Unknown;
    }

    if let ExprKind::ArrayCopy(array_expr) = &inner.kind {
        let source_ty = analyze_expr(an, array_expr);
        if source_ty.is_unknown() {
            return Type::Unknown;
        }
        return match array::classify_array_conversion(&source_ty, &target_ty, true) {
            ArrayAdaptation::Copied(ty) | ArrayAdaptation::Reshaped(ty) => ty,
            ArrayAdaptation::MissingCopyOperator => unreachable!(
                "ArrayCopy was present on the source expression by construction"
            ),
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
        };
    }

    let source_ty = analyze_expr(an, inner);
    if source_ty.is_unknown() {
        return Type::Unknown;
    }

    // Concrete-array-to-concrete-array conversions go through the array
    // module; a comptime array materializing into a concrete array stays on
    // the scalar engine's `classify`, which already knows that pattern.
    let both_concrete_arrays =
        matches!(source_ty, Type::Array(..)) && matches!(target_ty, Type::Array(..));
    if both_concrete_arrays {
        return match array::classify_array_conversion(&source_ty, &target_ty, false) {
            ArrayAdaptation::Copied(ty) | ArrayAdaptation::Reshaped(ty) => ty,
            ArrayAdaptation::MissingCopyOperator => {
                an.diagnostics.emit(
                    Diagnostic::error(
                        ErrorKind::MissingCopyOperator,
                        "array values are always copied explicitly".to_string(),
                        node,
                    )
                    .with_suggestion("wrap the source in `[..]`"),
                );
                Type::Unknown
            }
            ArrayAdaptation::ProductMismatch { .. } | ArrayAdaptation::Forbidden => {
                an.diagnostics.emit(Diagnostic::error(
                    ErrorKind::ForbiddenConversion,
                    format!("cannot convert `{}` to `{}`", source_ty, target_ty),
                    node,
                ));
                Type::Unknown
            }
        };
    }

    match conversion::adapt_explicit(&source_ty, &target_ty) {
        Ok(ty) => ty,
        Err(AdaptError::Overflow) => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::OverflowInLiteral,
                format!("literal does not fit in `{}`", target_ty),
                node,
            ));
            Type::Unknown
        }
        Err(_) => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ForbiddenConversion,
                format!("cannot convert `{}` to `{}`", source_ty, target_ty),
                node,
            ));
            Type::Unknown
        }
    }
}

fn resolve_or_unknown(type_ref: &hexen_ast::TypeRef, node: NodeId) -> Type {
    match types::resolve_type_ref(type_ref, node) {
        Ok(ty) => ty,
        Err(err) => {
            log::error!("internal: {}", err);
            Type::Unknown
        }
    }
}

fn analyze_array_literal(an: &mut Analyzer, elems: &[Expr], node: NodeId) -> Type {
    if elems.is_empty() {
        an.diagnostics.emit(Diagnostic::error(
            ErrorKind::ArrayShapeError,
            "array literal cannot be empty".to_string(),
            node,
        ));
        return Type::Unknown;
    }

    let elem_types: Vec<Type> = elems.iter().map(|e| analyze_expr(an, e)).collect();
    if elem_types.iter().any(Type::is_unknown) {
        return Type::Unknown;
    }

    // Nested literal: every element must itself be a same-shaped comptime
    // array (rectangularity).
    if let Type::ComptimeArray(first_family, first_dims) = &elem_types[0] {
        for ty in &elem_types[1..] {
            match ty {
                Type::ComptimeArray(family, dims) if family == first_family && dims == first_dims => {}
                _ => {
                    an.diagnostics.emit(Diagnostic::error(
                        ErrorKind::ArrayShapeError,
                        "array literal rows must all share the same shape and element type"
                            .to_string(),
                        node,
                    ));
                    return Type::Unknown;
                }
            }
        }
        let mut dims = vec![elems.len()];
        dims.extend(first_dims.iter().copied());
        return Type::ComptimeArray(*first_family, dims);
    }

    // Flat literal: elements must share a comptime scalar family.
    let family = match &elem_types[0] {
        Type::ComptimeInt(_) => ElemFamily::Int,
        Type::ComptimeFloat(_) => ElemFamily::Float,
        other => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ArrayShapeError,
                format!("array literal elements must be numeric, found `{}`", other),
                node,
            ));
            return Type::Unknown;
        }
    };
    for ty in &elem_types[1..] {
        let matches_family = match (family, ty) {
            (ElemFamily::Int, Type::ComptimeInt(_)) => true,
            (ElemFamily::Float, Type::ComptimeFloat(_)) => true,
            _ => false,
        };
        if !matches_family {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ArrayShapeError,
                "array literal mixes integer and floating-point elements".to_string(),
                node,
            ));
            return Type::Unknown;
        }
    }
    Type::ComptimeArray(family, vec![elems.len()])
}

fn analyze_array_access(an: &mut Analyzer, array_expr: &Expr, index: &Expr, node: NodeId) -> Type {
    let array_ty = analyze_expr(an, array_expr);
    let index_ty = analyze_expr(an, index);

    if !index_ty.is_unknown() && !index_ty.is_integer() {
        an.diagnostics.emit(Diagnostic::error(
            ErrorKind::TypeMismatch,
            format!("array index must be an integer, found `{}`", index_ty),
            node,
        ));
    }

    if array_ty.is_unknown() {
        return Type::Unknown;
    }

    match array_ty.strip_outer_dim() {
        Some(ty) => ty,
        None => {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::ArrayShapeError,
                format!("`{}` is not an array and cannot be indexed", array_ty),
                node,
            ));
            Type::Unknown
        }
    }
}

/// The outer (first) dimension of an array type, when it's known at
/// analysis time. `None` for an inferred-size parameter dimension.
fn outer_dim_size(ty: &Type) -> Option<usize> {
    match ty {
        Type::Array(_, dims) => match dims.first() {
            Some(Dim::Size(n)) => Some(*n),
            _ => None,
        },
        Type::ComptimeArray(_, dims) => dims.first().copied(),
        _ => None,
    }
}

fn analyze_property_access(an: &mut Analyzer, object: &Expr, property: &str, node: NodeId) -> Type {
    let object_ty = analyze_expr(an, object);
    if object_ty.is_unknown() {
        return Type::Unknown;
    }
    if property == "length" {
        if !object_ty.is_array() {
            an.diagnostics.emit(Diagnostic::error(
                ErrorKind::TypeMismatch,
                format!("`.length` is only valid on array types, found `{}`", object_ty),
                node,
            ));
            return Type::Unknown;
        }
        // `.length` is always `comptime_int`; its value is the outer
        // dimension when that's statically known, and left unfolded (but
        // still `comptime_int`) for an inferred-size parameter dimension.
        return match outer_dim_size(&object_ty) {
            Some(n) => Type::ComptimeInt(n as i128),
            None => Type::ComptimeInt(0),
        };
    }
    an.diagnostics.emit(Diagnostic::error(
        ErrorKind::TypeMismatch,
        format!("`{}` has no property `{}`", object_ty, property),
        node,
    ));
    Type::Unknown
}
