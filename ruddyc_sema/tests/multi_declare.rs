//! spec §4.3: `let a, b = Foo()` positionally destructures a multi-output
//! call's composite result, one declared name per output.

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{Argument, ClassDecl, ClassMember, Expr, ExprKind, FunctionDecl, Program, Stmt, TopLevel};
use ruddyc_sema::check::Checker;
use ruddyc_sema::error::SemaError;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{IntegerKind, Modifiers, TypeInfo};

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn call(callee: &str, args: Vec<Expr>) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Call { callee: reference(callee), args })
}

fn reference(name: &str) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Reference(name.into()))
}

fn int32_arg(name: &str) -> Argument {
    Argument { name: name.into(), ty: TypeInfo::Integer(IntegerKind::Int32) }
}

fn swap_pair() -> ClassMember {
    ClassMember::Function(FunctionDecl {
        name: "swap_pair".into(),
        visibility: Visibility::Public,
        modifiers: Modifiers::default(),
        inputs: Vec::new(),
        outputs: vec![int32_arg("a"), int32_arg("b")],
        body: vec![Stmt::Return { value: None, location: loc(), destructor_calls: Default::default() }],
        location: loc(),
        binding: Default::default(),
    })
}

#[test]
fn a_two_output_call_destructures_into_two_declared_locals() {
    let run = ClassMember::Function(FunctionDecl {
        name: "run".into(),
        visibility: Visibility::Public,
        modifiers: Modifiers::default(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        body: vec![
            Stmt::MultiVarDecl {
                targets: vec![("x".into(), TypeInfo::Auto), ("y".into(), TypeInfo::Auto)],
                initializer: call("swap_pair", Vec::new()),
                location: loc(),
                bindings: Default::default(),
            },
            Stmt::ExprStmt(ruddyc_sema::ast::ExprNode::new(
                loc(),
                ExprKind::Assign { target: reference("x"), value: reference("y") },
            )),
        ],
        location: loc(),
        binding: Default::default(),
    });

    let program = Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "E".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![swap_pair(), run],
        })],
    };

    let mut checker = Checker::new();
    checker
        .check_program(&program)
        .expect("a two-output call should positionally destructure into two auto-typed locals");
}

#[test]
fn an_arity_mismatch_between_targets_and_the_composite_result_is_rejected() {
    let run = ClassMember::Function(FunctionDecl {
        name: "run".into(),
        visibility: Visibility::Public,
        modifiers: Modifiers::default(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        body: vec![Stmt::MultiVarDecl {
            targets: vec![("x".into(), TypeInfo::Auto)],
            initializer: call("swap_pair", Vec::new()),
            location: loc(),
            bindings: Default::default(),
        }],
        location: loc(),
        binding: Default::default(),
    });

    let program = Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "E".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![swap_pair(), run],
        })],
    };

    let mut checker = Checker::new();
    let err = checker
        .check_program(&program)
        .expect_err("a one-name multi-declare can't absorb a two-output composite");
    assert!(matches!(err, SemaError::TypeMismatch { .. }), "got {err:?}");
}
