//! The typed AST (spec §3.3, §6.1).
//!
//! Grounded in `original_source/Ast/Expressions.h`, `Statements.h`,
//! `Classes.h`, `Operations.h`: each original `virtual TypeCheck`/
//! `Evaluate` node becomes one variant here, with its `shared_ptr<TypeInfo>`
//! memoization field becoming a `RefCell<Option<TypeInfo>>` slot filled in
//! the first time `check::` visits the node and read by every later pass
//! that revisits it.
//!
//! This crate does not parse source text into this AST — that remains an
//! external parser's job (see `ruddyc_ast` for the boundary). These types
//! exist so `check::` has something concrete to walk; the `tests/`
//! integration suite builds them by hand.

pub mod expr;
pub mod stmt;

pub use expr::{Expr, ExprKind, ExprNode, Literal};
pub use stmt::{
    Argument, ClassDecl, ClassMember, ConstructorDecl, DestructorDecl, FunctionDecl, Initializer,
    NamespaceDecl, Program, Stmt, TopLevel,
};
