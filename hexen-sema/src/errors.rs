//! Internal, non-user-facing invariant violations. Never returned for
//! malformed *user* code — those become [`hexen_diagnostics::Diagnostic`]s.
//! This is reserved for AST shapes the analyzer does not expect to see from
//! a well-formed tree (a parser bug, a hand-built test tree that breaks a
//! contract the rest of the crate assumes).

use hexen_ast::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("array type at {0:?} has zero dimensions")]
    EmptyArrayDims(NodeId),

    #[error("conversion target at {0:?} did not resolve to a known type")]
    UnresolvedTypeRef(NodeId),
}
