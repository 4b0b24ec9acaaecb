//! spec §8.4 scenario 6: a private member is reachable through its own
//! class's scope but not through a dotted reference from another class
//! (spec §4.1 `Lookup`'s visibility check).

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{Argument, ClassDecl, ClassMember, Expr, ExprKind, FunctionDecl, Program, Stmt, TopLevel};
use ruddyc_sema::check::Checker;
use ruddyc_sema::error::SemaError;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{Modifiers, TypeInfo};

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn call(callee: &str) -> Expr {
    let callee_ref = ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Reference(callee.into()));
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Call { callee: callee_ref, args: Vec::new() })
}

fn vault_class(secret_visibility: Visibility) -> TopLevel {
    TopLevel::Class(ClassDecl {
        name: "Vault".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![ClassMember::Function(FunctionDecl {
            name: "secret".into(),
            visibility: secret_visibility,
            modifiers: Modifiers::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            body: Vec::new(),
            location: loc(),
            binding: Default::default(),
        })],
    })
}

fn outsider_class() -> TopLevel {
    TopLevel::Class(ClassDecl {
        name: "Outsider".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![ClassMember::Function(FunctionDecl {
            name: "peek".into(),
            visibility: Visibility::Public,
            modifiers: Modifiers::default(),
            inputs: vec![Argument { name: "v".into(), ty: TypeInfo::unresolved_class("Vault", false) }],
            outputs: Vec::new(),
            body: vec![Stmt::ExprStmt(call("v.secret"))],
            location: loc(),
            binding: Default::default(),
        })],
    })
}

#[test]
fn a_private_method_is_not_reachable_through_another_classs_instance() {
    let program = Program { items: vec![vault_class(Visibility::Private), outsider_class()] };

    let mut checker = Checker::new();
    let err = checker.check_program(&program).expect_err("a private method must not be reachable from another class");
    assert!(matches!(err, SemaError::SymbolNotAccessable { .. }), "got {err:?}");
}

#[test]
fn a_public_method_is_reachable_through_another_classs_instance() {
    let program = Program { items: vec![vault_class(Visibility::Public), outsider_class()] };

    let mut checker = Checker::new();
    checker.check_program(&program).expect("a public method should be reachable through another class's instance");
}
