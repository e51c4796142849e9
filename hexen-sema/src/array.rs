//! Concrete-array-to-concrete-array conversions and the `[..]` copy operator
//! (concrete-to-concrete conversion and the `[..]` copy/flatten rules).
//!
//! These need to see the AST shape of the source expression — specifically
//! whether it's wrapped in `ArrayCopy` — so they live apart from the pure
//! `Type, Type -> Adaptation` classifier in [`crate::conversion`].

use crate::types::{same_array_shape, Dim, Type};
use hexen_ast::ExprKind;

/// Outcome of attempting a concrete-array-to-concrete-array conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayAdaptation {
    /// Same element type, same shape, and the source was wrapped in `[..]`.
    Copied(Type),
    /// Same element type, different (but product-compatible) shape, and the
    /// source was wrapped in `[..]` — a flatten/reshape.
    Reshaped(Type),
    /// Source and target shapes/types match, but the `[..]` marker is
    /// missing — every concrete array "copy" is a deep copy and must be
    /// spelled out.
    MissingCopyOperator,
    /// Reshape requested but the flattened element counts don't match.
    ProductMismatch { source_count: usize, target_count: usize },
    /// No rule applies — an ambiguous target shape (more than one wildcard
    /// dimension).
    Forbidden,
}

/// Total element count implied by a fully concrete dimension list.
fn product(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// How many `Dim::Inferred` entries appear in a target shape.
fn wildcard_count(dims: &[Dim]) -> usize {
    dims.iter().filter(|d| matches!(d, Dim::Inferred)).count()
}

/// Resolves a target shape against a known source element count, filling in
/// at most one wildcard dimension. Returns `None` if the shape can't be made
/// to fit (wrong product, or more than one wildcard — an ambiguous flatten
/// target).
fn resolve_wildcard_dims(target_dims: &[Dim], source_element_count: usize) -> Option<Vec<usize>> {
    match wildcard_count(target_dims) {
        0 => {
            let concrete: Vec<usize> = target_dims
                .iter()
                .map(|d| match d {
                    Dim::Size(n) => *n,
                    Dim::Inferred => unreachable!(),
                })
                .collect();
            if product(&concrete) == source_element_count {
                Some(concrete)
            } else {
                None
            }
        }
        1 => {
            let known_product: usize = target_dims
                .iter()
                .filter_map(|d| match d {
                    Dim::Size(n) => Some(*n),
                    Dim::Inferred => None,
                })
                .product();
            if known_product == 0 || source_element_count % known_product != 0 {
                return None;
            }
            let inferred = source_element_count / known_product;
            Some(
                target_dims
                    .iter()
                    .map(|d| match d {
                        Dim::Size(n) => *n,
                        Dim::Inferred => inferred,
                    })
                    .collect(),
            )
        }
        // More than one `_` in a flatten target is ambiguous — rejected
        // outright rather than guessed at.
        _ => None,
    }
}

/// Is `expr` wrapped in an explicit `[..]` copy marker?
pub fn has_copy_operator(expr: &ExprKind) -> bool {
    matches!(expr, ExprKind::ArrayCopy(_))
}

/// Classifies a concrete-array-to-concrete-array conversion attempt.
/// `source_element_count` is the total leaf-element count of the source
/// array's *value* (known at the access/copy site even when the source's
/// static shape uses no wildcards, since concrete array values are always
/// fully-dimensioned).
pub fn classify_array_conversion(
    source: &Type,
    target: &Type,
    source_copied: bool,
) -> ArrayAdaptation {
    let (Type::Array(_, source_dims), Type::Array(_, target_dims)) = (source, target) else {
        return ArrayAdaptation::Forbidden;
    };

    // Same element type, same shape: the `[..]` marker is still mandatory —
    // every concrete array copy is a deep copy and must be spelled out —
    // but no target annotation beyond identity is needed.
    if same_array_shape(source, target) {
        return if source_copied {
            ArrayAdaptation::Copied(target.clone())
        } else {
            ArrayAdaptation::MissingCopyOperator
        };
    }

    // Anything else — a different element type, a different dimension
    // layout at the same rank, or a different rank entirely (flatten or
    // reshape) — is only reachable through an explicit `[..]` copy plus the
    // target annotation; neither alone suffices.
    if !source_copied {
        return ArrayAdaptation::MissingCopyOperator;
    }

    let source_dims_resolved: Vec<usize> = source_dims
        .iter()
        .map(|d| match d {
            Dim::Size(n) => *n,
            Dim::Inferred => 0,
        })
        .collect();
    let source_count = product(&source_dims_resolved);

    match resolve_wildcard_dims(target_dims, source_count) {
        Some(resolved) => {
            let target_count = product(&resolved);
            if target_count != source_count {
                return ArrayAdaptation::ProductMismatch {
                    source_count,
                    target_count,
                };
            }
            if resolved == source_dims_resolved {
                // Same dimension sequence and sizes — only the element type
                // changed (or the annotation re-stated an inferred size);
                // still a straight copy, not a reshape.
                ArrayAdaptation::Copied(target.clone())
            } else {
                ArrayAdaptation::Reshaped(target.clone())
            }
        }
        None => {
            if wildcard_count(target_dims) > 1 {
                ArrayAdaptation::Forbidden
            } else {
                ArrayAdaptation::ProductMismatch {
                    source_count,
                    target_count: product(
                        &target_dims
                            .iter()
                            .map(|d| match d {
                                Dim::Size(n) => *n,
                                Dim::Inferred => 0,
                            })
                            .collect::<Vec<_>>(),
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(elem: Type, dims: Vec<Dim>) -> Type {
        Type::Array(Box::new(elem), dims)
    }

    #[test]
    fn identical_shape_requires_copy_operator() {
        let a = arr(Type::I32, vec![Dim::Size(3)]);
        let b = arr(Type::I32, vec![Dim::Size(3)]);
        assert_eq!(
            classify_array_conversion(&a, &b, false),
            ArrayAdaptation::MissingCopyOperator
        );
        assert!(matches!(
            classify_array_conversion(&a, &b, true),
            ArrayAdaptation::Copied(_)
        ));
    }

    #[test]
    fn flatten_with_single_wildcard_resolves() {
        let source = arr(Type::I32, vec![Dim::Size(3), Dim::Size(4)]);
        let target = arr(Type::I32, vec![Dim::Inferred]);
        match classify_array_conversion(&source, &target, true) {
            ArrayAdaptation::Reshaped(Type::Array(_, dims)) => {
                assert_eq!(dims, vec![Dim::Size(12)]);
            }
            other => panic!("expected Reshaped, got {:?}", other),
        }
    }

    #[test]
    fn flatten_with_multiple_wildcards_is_ambiguous() {
        let source = arr(Type::I32, vec![Dim::Size(2), Dim::Size(6)]);
        let target = arr(Type::I32, vec![Dim::Inferred, Dim::Inferred]);
        assert_eq!(
            classify_array_conversion(&source, &target, true),
            ArrayAdaptation::Forbidden
        );
    }

    #[test]
    fn reshape_with_wrong_product_is_rejected() {
        let source = arr(Type::I32, vec![Dim::Size(3), Dim::Size(4)]);
        let target = arr(Type::I32, vec![Dim::Size(5)]);
        match classify_array_conversion(&source, &target, true) {
            ArrayAdaptation::ProductMismatch {
                source_count,
                target_count,
            } => {
                assert_eq!(source_count, 12);
                assert_eq!(target_count, 5);
            }
            other => panic!("expected ProductMismatch, got {:?}", other),
        }
    }

    #[test]
    fn distinct_element_types_still_require_the_copy_operator() {
        let a = arr(Type::I32, vec![Dim::Size(3)]);
        let b = arr(Type::F64, vec![Dim::Size(3)]);
        assert_eq!(
            classify_array_conversion(&a, &b, false),
            ArrayAdaptation::MissingCopyOperator
        );
    }

    #[test]
    fn distinct_element_types_with_copy_operator_and_annotation_convert() {
        let a = arr(Type::I32, vec![Dim::Size(3)]);
        let b = arr(Type::F64, vec![Dim::Size(3)]);
        assert_eq!(
            classify_array_conversion(&a, &b, true),
            ArrayAdaptation::Copied(b)
        );
    }

    #[test]
    fn distinct_element_type_and_distinct_shape_reshapes() {
        let a = arr(Type::I32, vec![Dim::Size(3), Dim::Size(4)]);
        let b = arr(Type::F64, vec![Dim::Size(12)]);
        assert_eq!(
            classify_array_conversion(&a, &b, true),
            ArrayAdaptation::Reshaped(b)
        );
    }
}
