//! spec §4.3/§4.4: a class that declares zero constructors gets one
//! synthesized public `C() {}`, so `new C()` still resolves and a
//! value-type member it leaves uncovered is still caught.

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{ClassDecl, ClassMember, Expr, ExprKind, FunctionDecl, Program, Stmt, TopLevel};
use ruddyc_sema::check::Checker;
use ruddyc_sema::error::SemaError;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{Modifiers, TypeInfo};

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn lit(kind: ExprKind) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), kind)
}

#[test]
fn new_resolves_against_a_synthesized_default_constructor() {
    let plain = TopLevel::Class(ClassDecl {
        name: "Plain".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: Vec::new(),
    });

    let user = TopLevel::Class(ClassDecl {
        name: "User".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![ClassMember::Function(FunctionDecl {
            name: "make".into(),
            visibility: Visibility::Public,
            modifiers: Modifiers::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            body: vec![Stmt::VarDecl {
                name: "p".into(),
                declared_type: TypeInfo::Auto,
                initializer: Some(lit(ExprKind::New { class_name: "Plain".into(), args: Vec::new() })),
                location: loc(),
                binding: Default::default(),
            }],
            location: loc(),
            binding: Default::default(),
        })],
    });

    let program = Program { items: vec![plain, user] };
    let mut checker = Checker::new();
    checker
        .check_program(&program)
        .expect("a zero-constructor class should still satisfy `new ClassName()`");
}

#[test]
fn a_synthesized_default_constructor_still_rejects_an_uncovered_value_type_member() {
    let inner = TopLevel::Class(ClassDecl {
        name: "Inner".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: Vec::new(),
    });

    let outer = TopLevel::Class(ClassDecl {
        name: "Outer".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![ClassMember::Variable {
            name: "inner".into(),
            visibility: Visibility::Public,
            declared_type: TypeInfo::unresolved_class("Inner", true),
            default_value: None,
            modifiers: Modifiers::default(),
            location: loc(),
        }],
    });

    let program = Program { items: vec![inner, outer] };
    let mut checker = Checker::new();
    let err = checker
        .check_program(&program)
        .expect_err("a synthesized ctor with an empty body still leaves a value-type member uninitialized");
    assert!(matches!(err, SemaError::ValueTypeMustBeInitialized { name, .. } if name == "inner"), "got {err:?}");
}
