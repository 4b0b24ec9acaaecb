//! spec §8.4 scenario 1: a method may reference a class, field or
//! sibling declared later in the same program, since pass 1 declares
//! every namespace and class before pass 4 evaluates any method body.

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{ClassDecl, ClassMember, ConstructorDecl, Expr, ExprKind, FunctionDecl, Program, Stmt, TopLevel};
use ruddyc_sema::check::Checker;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{Modifiers, TypeInfo};

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn lit(kind: ExprKind) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), kind)
}

/// `class A` is declared first and its `make` method constructs a `B`,
/// but `class B` only appears afterward in `program.items`.
#[test]
fn method_body_constructs_a_class_declared_later_in_the_program() {
    let a = TopLevel::Class(ClassDecl {
        name: "A".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![ClassMember::Function(FunctionDecl {
            name: "make".into(),
            visibility: Visibility::Public,
            modifiers: Modifiers::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            body: vec![Stmt::VarDecl {
                name: "tmp".into(),
                declared_type: TypeInfo::Auto,
                initializer: Some(lit(ExprKind::New { class_name: "B".into(), args: Vec::new() })),
                location: loc(),
                binding: Default::default(),
            }],
            location: loc(),
            binding: Default::default(),
        })],
    });

    let b = TopLevel::Class(ClassDecl {
        name: "B".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![ClassMember::Constructor(ConstructorDecl {
            visibility: Visibility::Public,
            inputs: Vec::new(),
            initializers: Vec::new(),
            body: Vec::new(),
            location: loc(),
            binding: Default::default(),
        })],
    });

    let program = Program { items: vec![a, b] };
    let mut checker = Checker::new();
    checker.check_program(&program).expect("forward class reference should type-check");
}
