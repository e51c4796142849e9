//! Abstract syntax tree consumed by the Hexen semantic analyzer.
//!
//! This crate owns only the node shapes — it has no lexer, no parser, no
//! grammar. A `Program` is meant to arrive fully formed from an external
//! collaborator (or, in tests, be built by hand).

use serde::{Deserialize, Serialize};

/// Identifies an AST node for diagnostic reporting. Assigned by whoever
/// builds the tree; the analyzer never allocates or renumbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const UNKNOWN: NodeId = NodeId(u32::MAX);
}

/// Monotonic `NodeId` allocator for test harnesses and anything else that
/// builds trees by hand instead of through a parser.
#[derive(Debug, Default)]
pub struct NodeIdGen(u32);

impl NodeIdGen {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.0);
        self.0 += 1;
        id
    }
}

/// Root of the program: an ordered list of top-level functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub funcs: Vec<Func>,
}

/// A function declaration: name, parameters, declared return type, body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Func {
    pub id: NodeId,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub is_mut: bool,
}

/// A type as written in source: a primitive name, or an array of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeRef {
    Name(String),
    Array {
        elem: Box<TypeRef>,
        dims: Vec<DimRef>,
    },
}

impl TypeRef {
    pub fn name(s: impl Into<String>) -> Self {
        TypeRef::Name(s.into())
    }

    pub fn array(elem: TypeRef, dims: Vec<DimRef>) -> Self {
        TypeRef::Array {
            elem: Box::new(elem),
            dims,
        }
    }
}

/// A single array dimension as written at a declaration/parameter site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimRef {
    Size(usize),
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `val name[: T] = init` or `val name[: T] = undef`
    ValDecl {
        name: String,
        declared_type: Option<TypeRef>,
        init: Expr,
    },
    /// `mut name: T = init` or `mut name: T = undef`
    MutDecl {
        name: String,
        declared_type: TypeRef,
        init: Expr,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    Return(Option<Expr>),
    ExprStmt(Expr),
    If(IfNode),
    /// A `{ ... }` appearing as a statement (no `-> e`).
    BlockStmt(Block),
    /// `-> e`, the terminator of an expression block.
    YieldArrow(Expr),
}

/// Shared shape for `if` used both as a statement and as an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfNode {
    pub condition: Box<Expr>,
    pub then_block: Block,
    pub elif_branches: Vec<(Expr, Block)>,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind) -> Self {
        Self { id, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    BoolLiteral(bool),
    /// `undef` — only legal as the initializer of a `mut` declaration.
    Undef,
    Ident(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `e:T`, or — when `e` is itself an `ArrayCopy` — `a[..]:T`.
    Conversion {
        expr: Box<Expr>,
        target: TypeRef,
    },
    ArrayLiteral(Vec<Expr>),
    /// `a[i]`; nested for multi-dimensional access (`a[i][j]`).
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    /// `a[..]` — explicit copy marker, never standalone.
    ArrayCopy(Box<Expr>),
    /// `a.length`
    PropertyAccess {
        object: Box<Expr>,
        property: String,
    },
    Block(Block),
    Conditional(IfNode),
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// `/` — always float division.
    FloatDiv,
    /// `\` — integer division.
    IntDiv,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_arithmetic(self) -> bool {
        !self.is_comparison() && !self.is_logical()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_type_constructor_roundtrips() {
        let ty = TypeRef::array(
            TypeRef::name("i32"),
            vec![DimRef::Size(3), DimRef::Inferred],
        );
        let json = serde_json::to_string(&ty).unwrap();
        let back: TypeRef = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }

    #[test]
    fn node_id_gen_is_monotonic() {
        let mut gen = NodeIdGen::new();
        let a = gen.next();
        let b = gen.next();
        assert_ne!(a, b);
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
    }

    #[test]
    fn program_round_trips_through_json() {
        let mut ids = NodeIdGen::new();
        let program = Program {
            funcs: vec![Func {
                id: ids.next(),
                name: "main".to_string(),
                params: vec![],
                return_type: TypeRef::name("i32"),
                body: Block {
                    id: ids.next(),
                    stmts: vec![Stmt {
                        id: ids.next(),
                        kind: StmtKind::Return(Some(Expr::new(
                            ids.next(),
                            ExprKind::IntLiteral(0),
                        ))),
                    }],
                },
            }],
        };

        let json = serde_json::to_string(&program).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(program, back);
    }
}
