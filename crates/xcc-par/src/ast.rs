//! Abstract syntax tree.
//!
//! Node kinds are represented as a discriminated union (`enum Item`/`Stmt`/
//! `Expr`) with `Box` for recursive fields, rather than the universal
//! struct-with-three-optional-children-and-a-vector the distilled design
//! describes — spec §9's Design Notes explicitly leave this normalisation
//! to the implementer, and a tagged sum is the idiomatic Rust shape for an
//! AST walked exhaustively by the emitter.

use crate::types::Type;
use xcc_util::{Span, Symbol};

#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub enum Item {
    Function(FunctionItem),
    Process(FunctionItem),
    VarDecl(VarDeclItem),
    /// A top-level declaration headed by a reserved-but-unsupported keyword
    /// (spec §9 Open Question) — recognised, not silently dropped, and
    /// reported as an error by the parser before being folded in here so
    /// the rest of the pipeline can still walk a complete tree.
    Unsupported(UnsupportedItem),
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionItem {
    pub name: Symbol,
    pub return_type: Type,
    pub params: Vec<Param>,
    /// `None` for a prototype (`;` instead of a body).
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarDeclItem {
    pub name: Symbol,
    pub ty: Type,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UnsupportedItem {
    pub keyword: &'static str,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Block),
    VarDecl(VarDeclItem),
    Expr(Expr),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    Return(Option<Expr>, Span),
    Break(Span),
    Continue(Span),
    Xinu(XinuStmt),
    Unsupported(UnsupportedItem),
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub cond: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Xinu process/semaphore primitives, first-class statements per spec §3.
#[derive(Debug, Clone)]
pub enum XinuStmt {
    Create(Vec<Expr>, Span),
    Resume(Expr, Span),
    Suspend(Expr, Span),
    Kill(Expr, Span),
    Sleep(Expr, Span),
    Yield(Span),
    Wait(Expr, Span),
    Signal(Expr, Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LAnd,
    LOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone)]
pub enum SizeofArg {
    Type(Type),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLiteral(i64, Span),
    FloatLiteral(f64, Span),
    StringLiteral(String, Span),
    CharLiteral(char, Span),
    BoolLiteral(bool, Span),
    NullLiteral(Span),
    Identifier(Symbol, Span),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Ternary(TernaryExpr),
    Assign(AssignExpr),
    CompoundAssign(CompoundAssignExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Member(MemberExpr),
    PointerMember(MemberExpr),
    PreInc(Box<Expr>, Span),
    PreDec(Box<Expr>, Span),
    PostInc(Box<Expr>, Span),
    PostDec(Box<Expr>, Span),
    Comma(Vec<Expr>, Span),
    Sizeof(Box<SizeofArg>, Span),
    AddrOf(Box<Expr>, Span),
    Deref(Box<Expr>, Span),
    Cast(Type, Box<Expr>, Span),
    GetPid(Span),
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TernaryExpr {
    pub cond: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CompoundAssignExpr {
    pub op: BinOp,
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Symbol,
    pub callee_span: Span,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub base: Box<Expr>,
    pub field: Symbol,
    pub span: Span,
}

impl Expr {
    /// Spec §4.2: "Lvalue flag is set on identifier, dereference, array
    /// access, and member-access nodes." Computed rather than stored, since
    /// it's fully determined by the node's own kind.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expr::Identifier(..)
                | Expr::Deref(..)
                | Expr::Index(..)
                | Expr::Member(..)
                | Expr::PointerMember(..)
        )
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral(_, s)
            | Expr::FloatLiteral(_, s)
            | Expr::StringLiteral(_, s)
            | Expr::CharLiteral(_, s)
            | Expr::BoolLiteral(_, s)
            | Expr::NullLiteral(s)
            | Expr::Identifier(_, s)
            | Expr::PreInc(_, s)
            | Expr::PreDec(_, s)
            | Expr::PostInc(_, s)
            | Expr::PostDec(_, s)
            | Expr::Comma(_, s)
            | Expr::Sizeof(_, s)
            | Expr::AddrOf(_, s)
            | Expr::Deref(_, s)
            | Expr::Cast(_, _, s)
            | Expr::GetPid(s) => *s,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Ternary(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::CompoundAssign(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Member(e) | Expr::PointerMember(e) => e.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcc_util::SymbolInterner;

    #[test]
    fn identifier_and_derived_nodes_are_lvalues() {
        let mut interner = SymbolInterner::new();
        let span = Span::DUMMY;
        let ident = Expr::Identifier(interner.intern("x"), span);
        assert!(ident.is_lvalue());
        let deref = Expr::Deref(Box::new(ident), span);
        assert!(deref.is_lvalue());
    }

    #[test]
    fn literal_is_not_an_lvalue() {
        assert!(!Expr::IntLiteral(1, Span::DUMMY).is_lvalue());
    }
}
