//! The type universe: concrete scalars, comptime scalars,
//! concrete arrays, comptime arrays, and `Unknown`.

use hexen_ast::{DimRef, NodeId, TypeRef};
use std::fmt;

use crate::errors::InternalError;

/// A single dimension of a concrete array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Size(usize),
    /// `_` — a declaration-site placeholder awaiting literal-driven
    /// inference, or, in a formal parameter, an "accept any size" wildcard.
    Inferred,
}

/// Which family of comptime scalar a comptime array's leaves belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemFamily {
    Int,
    Float,
}

/// Every expression has exactly one `Type`, drawn from this disjoint union.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    /// Only valid as a function return type.
    Void,
    /// Carries the folded value so overflow can be diagnosed at whatever
    /// later materialization site consumes it, even through `42 + 100`.
    ComptimeInt(i128),
    ComptimeFloat(f64),
    /// `elem` is never comptime and `dims` is never empty.
    Array(Box<Type>, Vec<Dim>),
    /// Dimensions here are always concrete — known entirely from the
    /// literal's shape.
    ComptimeArray(ElemFamily, Vec<usize>),
    /// Internal only; suppresses cascades after a diagnosed error.
    Unknown,
}

impl Type {
    pub fn is_comptime(&self) -> bool {
        matches!(
            self,
            Type::ComptimeInt(_) | Type::ComptimeFloat(_) | Type::ComptimeArray(_, _)
        )
    }

    pub fn is_concrete_numeric(&self) -> bool {
        matches!(self, Type::I32 | Type::I64 | Type::F32 | Type::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_concrete_numeric() || matches!(self, Type::ComptimeInt(_) | Type::ComptimeFloat(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::I32 | Type::I64 | Type::ComptimeInt(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::F32 | Type::F64 | Type::ComptimeFloat(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_, _) | Type::ComptimeArray(_, _))
    }

    /// The comptime family of a `ComptimeArray`, if this is one.
    pub fn element_family(&self) -> Option<ElemFamily> {
        match self {
            Type::ComptimeArray(family, _) => Some(*family),
            _ => None,
        }
    }

    /// Outer dimension count ("rank"), for arrays only.
    pub fn rank(&self) -> Option<usize> {
        match self {
            Type::Array(_, dims) => Some(dims.len()),
            Type::ComptimeArray(_, dims) => Some(dims.len()),
            _ => None,
        }
    }

    /// Strip one leading dimension, e.g. for `a[i]` on a multi-dim array.
    /// Returns the element type once the last dimension is stripped.
    pub fn strip_outer_dim(&self) -> Option<Type> {
        match self {
            Type::Array(elem, dims) => {
                if dims.len() <= 1 {
                    Some((**elem).clone())
                } else {
                    Some(Type::Array(elem.clone(), dims[1..].to_vec()))
                }
            }
            Type::ComptimeArray(family, dims) => {
                let scalar = match family {
                    ElemFamily::Int => Type::ComptimeInt(0),
                    ElemFamily::Float => Type::ComptimeFloat(0.0),
                };
                if dims.len() <= 1 {
                    Some(scalar)
                } else {
                    // A partial index doesn't force materialization; the
                    // remaining dimensions stay a comptime array until
                    // something downstream actually consumes it.
                    Some(Type::ComptimeArray(*family, dims[1..].to_vec()))
                }
            }
            _ => None,
        }
    }
}

/// Canonical diagnostic formatting: `[3][4]i32`, `[_]f64`, `i32`, …
pub fn format_type(ty: &Type) -> String {
    match ty {
        Type::I32 => "i32".to_string(),
        Type::I64 => "i64".to_string(),
        Type::F32 => "f32".to_string(),
        Type::F64 => "f64".to_string(),
        Type::Bool => "bool".to_string(),
        Type::String => "string".to_string(),
        Type::Void => "void".to_string(),
        Type::ComptimeInt(_) => "comptime_int".to_string(),
        Type::ComptimeFloat(_) => "comptime_float".to_string(),
        Type::Unknown => "<unknown>".to_string(),
        Type::Array(elem, dims) => {
            let mut s = String::new();
            for dim in dims {
                match dim {
                    Dim::Size(n) => s.push_str(&format!("[{}]", n)),
                    Dim::Inferred => s.push_str("[_]"),
                }
            }
            s.push_str(&format_type(elem));
            s
        }
        Type::ComptimeArray(family, dims) => {
            let mut s = String::new();
            for n in dims {
                s.push_str(&format!("[{}]", n));
            }
            s.push_str(match family {
                ElemFamily::Int => "comptime_int",
                ElemFamily::Float => "comptime_float",
            });
            s
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format_type(self))
    }
}

/// Resolves a surface-syntax [`TypeRef`] into a semantic [`Type`]. `node` is
/// only used to anchor an [`InternalError`] if the name isn't a known
/// primitive — that should never happen for a tree a real parser produced,
/// but a hand-built test tree can hit it.
pub fn resolve_type_ref(type_ref: &TypeRef, node: NodeId) -> Result<Type, InternalError> {
    match type_ref {
        TypeRef::Name(name) => match name.as_str() {
            "i32" => Ok(Type::I32),
            "i64" => Ok(Type::I64),
            "f32" => Ok(Type::F32),
            "f64" => Ok(Type::F64),
            "bool" => Ok(Type::Bool),
            "string" => Ok(Type::String),
            "void" => Ok(Type::Void),
            _ => Err(InternalError::UnresolvedTypeRef(node)),
        },
        TypeRef::Array { elem, dims } => {
            if dims.is_empty() {
                return Err(InternalError::EmptyArrayDims(node));
            }
            let elem_ty = resolve_type_ref(elem, node)?;
            let dims = dims
                .iter()
                .map(|d| match d {
                    DimRef::Size(n) => Dim::Size(*n),
                    DimRef::Inferred => Dim::Inferred,
                })
                .collect();
            Ok(Type::Array(Box::new(elem_ty), dims))
        }
    }
}

/// Does `target`'s dimension list accept `source_dims`, where a `Dim::Size`
/// must match exactly and a `Dim::Inferred` accepts any size at that
/// position? Lengths must match.
pub fn dims_accept(target: &[Dim], source_dims: &[usize]) -> bool {
    if target.len() != source_dims.len() {
        return false;
    }
    target.iter().zip(source_dims.iter()).all(|(t, s)| match t {
        Dim::Size(n) => n == s,
        Dim::Inferred => true,
    })
}

/// Structural equality used for "same shape, same element type" identity
/// checks. Two `Dim::Inferred` entries are never compared here —
/// by the time a concrete array *value* exists its dims are always concrete.
pub fn same_array_shape(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Array(e1, d1), Type::Array(e2, d2)) => e1 == e2 && d1 == d2,
        _ => false,
    }
}
