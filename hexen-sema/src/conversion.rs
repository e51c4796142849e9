//! Scalar and comptime-array conversion rules.
//!
//! Concrete-to-concrete array conversions live in [`crate::array`]
//! instead, since they need to inspect the `[..]` copy marker on the source
//! expression — something a pure `Type, Type -> Adaptation` classifier can't
//! see.

use crate::types::{dims_accept, ElemFamily, Type};

/// The outcome of asking "can a value of type `source` become `target`?"
#[derive(Debug, Clone, PartialEq)]
pub enum Adaptation {
    /// Happens silently, no syntax required. Carries the resulting type
    /// (usually just `target`, but kept distinct for clarity at call sites).
    Implicit(Type),
    /// Legal, but only written as `source_expr: target`. Carries the syntax
    /// to suggest in the diagnostic when a caller omits it.
    RequiresExplicit { suggested_syntax: String },
    /// Never legal, with no amount of explicit syntax fixing it.
    Forbidden,
}

/// `i32`'s representable range, as `i128` so it can be compared against a
/// folded comptime value without itself risking overflow.
const I32_MIN: i128 = i32::MIN as i128;
const I32_MAX: i128 = i32::MAX as i128;
const I64_MIN: i128 = i64::MIN as i128;
const I64_MAX: i128 = i64::MAX as i128;

/// Why an adapt call failed — distinguishes overflow (a specific,
/// user-actionable diagnostic) from every other forbidden/missing-syntax
/// case.
#[derive(Debug, Clone, PartialEq)]
pub enum AdaptError {
    RequiresExplicit { suggested_syntax: String },
    Forbidden,
    Overflow,
}

/// Does a folded comptime integer fit in `target`? Only meaningful for
/// `I32`/`I64`; other targets never call this.
pub fn int_fits(value: i128, target: &Type) -> bool {
    match target {
        Type::I32 => (I32_MIN..=I32_MAX).contains(&value),
        Type::I64 => (I64_MIN..=I64_MAX).contains(&value),
        // Any integer literal is representable (perhaps lossily) as a float;
        // the language does not diagnose that loss for comptime adaptation.
        Type::F32 | Type::F64 => true,
        _ => true,
    }
}

/// The pure decision function of the conversion engine: how does `source`
/// relate to `target`, with no side effects and no diagnostics?
pub fn classify(source: &Type, target: &Type) -> Adaptation {
    use Type::*;

    match (source, target) {
        // Identity: a type always converts to itself.
        (a, b) if a == b => Adaptation::Implicit(target.clone()),

        // A comptime int adapts silently to any concrete numeric type.
        (ComptimeInt(_), I32 | I64 | F32 | F64) => Adaptation::Implicit(target.clone()),
        (ComptimeInt(_), Bool | String) => Adaptation::Forbidden,

        // A comptime float adapts silently to a concrete float type.
        (ComptimeFloat(_), F32 | F64) => Adaptation::Implicit(target.clone()),
        // A comptime float narrowing to an integer type loses its fractional
        // part; the language requires that loss to be spelled out.
        (ComptimeFloat(_), I32 | I64) => Adaptation::RequiresExplicit {
            suggested_syntax: format!(": {}", target),
        },
        (ComptimeFloat(_), Bool | String) => Adaptation::Forbidden,

        // Between two distinct concrete numeric types, always legal,
        // but always requires the explicit `:T` syntax — never silent.
        (a, b) if a.is_concrete_numeric() && b.is_concrete_numeric() => {
            Adaptation::RequiresExplicit {
                suggested_syntax: format!(": {}", b),
            }
        }

        // A comptime array materializes into a concrete array when
        // its element family adapts to the target's element type and its
        // shape fits the target's (possibly wildcarded) dims.
        (ComptimeArray(family, source_dims), Array(target_elem, target_dims)) => {
            let family_adapts = match family {
                ElemFamily::Int => matches!(**target_elem, I32 | I64 | F32 | F64),
                ElemFamily::Float => matches!(**target_elem, F32 | F64),
            };
            if family_adapts && dims_accept(target_dims, source_dims) {
                Adaptation::Implicit(target.clone())
            } else {
                Adaptation::Forbidden
            }
        }

        // Nothing else converts: no bool<->numeric, no string<->anything,
        // no array<->scalar, no implicit narrowing beyond what's listed above.
        _ => Adaptation::Forbidden,
    }
}

/// An implicit-position adaptation (assignment, parameter passing, `val`
/// initializer with a context type): only [`Adaptation::Implicit`] succeeds
/// silently. Returns the resulting type, or `None` if the caller should
/// diagnose (the caller supplies the diagnostic since it knows the node and
/// surrounding message).
pub fn adapt_implicit(source: &Type, target: &Type) -> Result<Type, AdaptError> {
    match classify(source, target) {
        Adaptation::Implicit(ty) => {
            if let Type::ComptimeInt(value) = source {
                if !int_fits(*value, target) {
                    return Err(AdaptError::Overflow);
                }
            }
            Ok(ty)
        }
        Adaptation::RequiresExplicit { suggested_syntax } => {
            Err(AdaptError::RequiresExplicit { suggested_syntax })
        }
        Adaptation::Forbidden => Err(AdaptError::Forbidden),
    }
}

/// An explicit-position adaptation (`e: T`): both [`Adaptation::Implicit`]
/// and [`Adaptation::RequiresExplicit`] are satisfied by the explicit syntax
/// the caller already wrote; only [`Adaptation::Forbidden`] still fails.
/// Overflow is still checked for integer targets.
pub fn adapt_explicit(source: &Type, target: &Type) -> Result<Type, AdaptError> {
    match classify(source, target) {
        Adaptation::Forbidden => Err(AdaptError::Forbidden),
        _ => {
            if let Type::ComptimeInt(value) = source {
                if !int_fits(*value, target) {
                    return Err(AdaptError::Overflow);
                }
            }
            Ok(target.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comptime_int_adapts_implicitly_to_concrete_numerics() {
        assert_eq!(
            classify(&Type::ComptimeInt(42), &Type::I32),
            Adaptation::Implicit(Type::I32)
        );
        assert_eq!(
            classify(&Type::ComptimeInt(42), &Type::F64),
            Adaptation::Implicit(Type::F64)
        );
    }

    #[test]
    fn comptime_int_overflowing_i32_is_rejected_at_adapt_time() {
        let huge = Type::ComptimeInt(i64::MAX as i128);
        assert!(adapt_implicit(&huge, &Type::I32).is_err());
        assert!(adapt_implicit(&huge, &Type::I64).is_ok());
    }

    #[test]
    fn distinct_concrete_numerics_require_explicit_conversion() {
        match classify(&Type::I32, &Type::I64) {
            Adaptation::RequiresExplicit { .. } => {}
            other => panic!("expected RequiresExplicit, got {:?}", other),
        }
        assert!(adapt_implicit(&Type::I32, &Type::I64).is_err());
        assert!(adapt_explicit(&Type::I32, &Type::I64).is_ok());
    }

    #[test]
    fn comptime_float_to_int_requires_explicit() {
        match classify(&Type::ComptimeFloat(3.5), &Type::I32) {
            Adaptation::RequiresExplicit { .. } => {}
            other => panic!("expected RequiresExplicit, got {:?}", other),
        }
    }

    #[test]
    fn bool_and_string_never_adapt_from_numerics() {
        assert_eq!(classify(&Type::ComptimeInt(1), &Type::Bool), Adaptation::Forbidden);
        assert_eq!(classify(&Type::I32, &Type::String), Adaptation::Forbidden);
    }

    #[test]
    fn comptime_array_materializes_into_matching_concrete_array() {
        use crate::types::Dim;
        let source = Type::ComptimeArray(ElemFamily::Int, vec![3]);
        let target = Type::Array(Box::new(Type::I32), vec![Dim::Size(3)]);
        assert!(matches!(classify(&source, &target), Adaptation::Implicit(_)));

        let wrong_shape = Type::Array(Box::new(Type::I32), vec![Dim::Size(4)]);
        assert_eq!(classify(&source, &wrong_shape), Adaptation::Forbidden);
    }

    #[test]
    fn identity_conversion_is_always_implicit() {
        assert_eq!(classify(&Type::I32, &Type::I32), Adaptation::Implicit(Type::I32));
        assert_eq!(classify(&Type::Bool, &Type::Bool), Adaptation::Implicit(Type::Bool));
    }
}
