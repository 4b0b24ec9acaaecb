//! Statement and declaration nodes (spec §3.3, §6.1; grounded in
//! `Ast/Statements.h`, `Ast/Classes.h`).

use ruddyc_ast::FileLocation;

use crate::symbols::{BindingId, Visibility};
use crate::types::{Modifiers, TypeInfo};

use super::expr::Expr;

#[derive(Debug)]
pub struct Argument {
    pub name: String,
    pub ty: TypeInfo,
}

/// A `break`/`return`/local-declaration/conditional statement (spec
/// §3.3 `LineStatement`). `binding` fields are filled in by `check::`
/// the first time the node is visited so later passes (and destructor
/// scheduling) can find the binding without re-resolving the name.
#[derive(Debug)]
pub enum Stmt {
    Block(Vec<Stmt>, FileLocation),
    VarDecl {
        name: String,
        declared_type: TypeInfo,
        initializer: Option<Expr>,
        location: FileLocation,
        binding: std::cell::Cell<Option<BindingId>>,
    },
    /// A comma-chain left-hand side declaring more than one name at once
    /// from a single multi-value call's composite result — `let a, b =
    /// Foo()` (spec §4.3: "a comma-chain of either, for multi-return
    /// calls"). `targets` is positionally matched against the
    /// initializer's `Composite` result, one entry per declared name.
    MultiVarDecl {
        targets: Vec<(String, TypeInfo)>,
        initializer: Expr,
        location: FileLocation,
        bindings: std::cell::RefCell<Vec<BindingId>>,
    },
    ExprStmt(Expr),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: FileLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: FileLocation,
    },
    /// `destructor_calls` is filled by `check::` with the value-class
    /// locals that must be destroyed on the way out, innermost-declared
    /// first (spec §4.1 invariant 2).
    Break {
        location: FileLocation,
        destructor_calls: std::cell::RefCell<Vec<BindingId>>,
    },
    Return {
        value: Option<Expr>,
        location: FileLocation,
        destructor_calls: std::cell::RefCell<Vec<BindingId>>,
    },
    /// `unsafe { ... }` — sets the unsafe-context flag on the symbol
    /// table for the block's duration, legalizing `UnsafeArrayType`
    /// declarations, index operations, and references to unsafe-modified
    /// members (spec §4.3 `UnsafeStatements`).
    Unsafe(Vec<Stmt>, FileLocation),
}

impl Stmt {
    pub fn location(&self) -> FileLocation {
        match self {
            Stmt::Block(_, loc)
            | Stmt::VarDecl { location: loc, .. }
            | Stmt::MultiVarDecl { location: loc, .. }
            | Stmt::If { location: loc, .. }
            | Stmt::While { location: loc, .. }
            | Stmt::Break { location: loc, .. }
            | Stmt::Return { location: loc, .. }
            | Stmt::Unsafe(_, loc) => *loc,
            Stmt::ExprStmt(e) => e.location,
        }
    }
}

/// One entry of a constructor's initializer list — `member = expr`
/// (spec §4.4).
#[derive(Debug)]
pub struct Initializer {
    pub member_name: String,
    pub value: Expr,
    pub location: FileLocation,
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub visibility: Visibility,
    pub modifiers: Modifiers,
    pub inputs: Vec<Argument>,
    pub outputs: Vec<Argument>,
    pub body: Vec<Stmt>,
    pub location: FileLocation,
    pub binding: std::cell::Cell<Option<BindingId>>,
}

#[derive(Debug)]
pub struct ConstructorDecl {
    pub visibility: Visibility,
    pub inputs: Vec<Argument>,
    pub initializers: Vec<Initializer>,
    pub body: Vec<Stmt>,
    pub location: FileLocation,
    pub binding: std::cell::Cell<Option<BindingId>>,
}

#[derive(Debug)]
pub struct DestructorDecl {
    pub body: Vec<Stmt>,
    pub location: FileLocation,
    pub binding: std::cell::Cell<Option<BindingId>>,
}

#[derive(Debug)]
pub enum ClassMember {
    Variable {
        name: String,
        visibility: Visibility,
        declared_type: TypeInfo,
        default_value: Option<Expr>,
        modifiers: Modifiers,
        location: FileLocation,
    },
    Function(FunctionDecl),
    Constructor(ConstructorDecl),
    Destructor(DestructorDecl),
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: String,
    pub visibility: Visibility,
    pub members: Vec<ClassMember>,
    pub location: FileLocation,
}

#[derive(Debug)]
pub struct NamespaceDecl {
    pub name: String,
    pub body: Vec<TopLevel>,
    pub location: FileLocation,
}

#[derive(Debug)]
pub enum TopLevel {
    Namespace(NamespaceDecl),
    Class(ClassDecl),
}

/// A whole compilation unit — the root the four-pass driver walks four
/// times over (spec §4.3).
#[derive(Debug)]
pub struct Program {
    pub items: Vec<TopLevel>,
}
