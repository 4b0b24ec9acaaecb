//! Expression nodes (spec §3.3; grounded in `Ast/Expressions.h`,
//! `Ast/Operations.h`).

use std::cell::{Cell, RefCell};

use ruddyc_ast::FileLocation;

use crate::symbols::BindingId;
use crate::types::{IntegerConstantRepr, OperatorId, TypeInfo};

/// A literal as the parser hands it over: not yet assigned a concrete
/// width, since that is only decided once the use site is known (spec
/// §4.5 best-fit typing).
#[derive(Debug, Clone)]
pub enum Literal {
    Integer(IntegerConstantRepr),
    Float { text: String },
    Bool(bool),
    /// Raw text between the quotes, escapes unresolved — `constants::`
    /// parses this into a `u32` code point.
    Char(String),
    String(String),
}

#[derive(Debug)]
pub enum ExprKind {
    /// A (possibly dotted) name reference — `Ast::Reference` (spec §4.1
    /// `Lookup`).
    Reference(String),
    Literal(Literal),
    Binary {
        op: OperatorId,
        lhs: Expr,
        rhs: Expr,
    },
    Unary {
        op: OperatorId,
        operand: Expr,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    /// A comma-joined expression list — the right-hand side of a
    /// multi-value assignment, absorbed as a `Composite` (spec §3.2,
    /// §6.4).
    ExprList(Vec<Expr>),
    Call {
        callee: Expr,
        args: Vec<Expr>,
    },
    /// `new ClassName(args)` — constructor-overload resolution (spec
    /// §4.4).
    New {
        class_name: String,
        args: Vec<Expr>,
    },
    /// `ClassName var_name(args)` — a stack (value-class) construction:
    /// resolves a constructor the same way `New` does, but binds a local
    /// of value type instead of returning a heap handle (spec §4.3).
    StackConstruction {
        class_name: String,
        var_name: String,
        args: Vec<Expr>,
        binding: Cell<Option<BindingId>>,
    },
    /// `base[index]` — only legal inside an `unsafe` context; `base` must
    /// evaluate to `UnsafeArrayType` (spec §4.3 `IndexOperation`).
    Index {
        base: Expr,
        index: Expr,
    },
    DebugPrint(Expr),
}

/// One expression node: the parsed shape (`kind`) plus the location it
/// came from and a memoization slot for its resolved [`TypeInfo`], filled
/// in by `check::` the first time the node is visited (spec §3.3: every
/// expression node remembers its own evaluated type).
#[derive(Debug)]
pub struct ExprNode {
    pub location: FileLocation,
    pub kind: ExprKind,
    pub type_info: RefCell<Option<TypeInfo>>,
}

pub type Expr = Box<ExprNode>;

impl ExprNode {
    pub fn new(location: FileLocation, kind: ExprKind) -> Expr {
        Box::new(ExprNode {
            location,
            kind,
            type_info: RefCell::new(None),
        })
    }

    pub fn cached_type(&self) -> Option<TypeInfo> {
        self.type_info.borrow().clone()
    }

    pub fn set_cached_type(&self, ty: TypeInfo) {
        *self.type_info.borrow_mut() = Some(ty);
    }
}
