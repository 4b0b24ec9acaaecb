//! spec §4.3: `ClassName var_name(args)` resolves a constructor overload
//! exactly like `new`, but binds a value-typed local instead of a heap
//! handle.

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{Argument, ClassDecl, ClassMember, ConstructorDecl, Expr, ExprKind, FunctionDecl, Literal, Program, Stmt, TopLevel};
use ruddyc_sema::check::Checker;
use ruddyc_sema::error::SemaError;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{IntegerConstantRepr, IntegerKind, Modifiers, TypeInfo};

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn lit(kind: ExprKind) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), kind)
}

fn point_class(constructors: Vec<ClassMember>) -> TopLevel {
    TopLevel::Class(ClassDecl {
        name: "Point".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: constructors,
    })
}

fn int_ctor() -> ClassMember {
    ClassMember::Constructor(ConstructorDecl {
        visibility: Visibility::Public,
        inputs: vec![Argument { name: "n".into(), ty: TypeInfo::Integer(IntegerKind::Int32) }],
        initializers: Vec::new(),
        body: Vec::new(),
        location: loc(),
        binding: Default::default(),
    })
}

fn make_fn(body: Vec<Stmt>) -> ClassMember {
    ClassMember::Function(FunctionDecl {
        name: "make".into(),
        visibility: Visibility::Public,
        modifiers: Modifiers::default(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        body,
        location: loc(),
        binding: Default::default(),
    })
}

#[test]
fn a_stack_construction_resolves_against_a_matching_constructor_and_binds_a_value_type_local() {
    let point = point_class(vec![int_ctor()]);
    let user = TopLevel::Class(ClassDecl {
        name: "User".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![make_fn(vec![Stmt::ExprStmt(lit(ExprKind::StackConstruction {
            class_name: "Point".into(),
            var_name: "p".into(),
            args: vec![lit(ExprKind::Literal(Literal::Integer(IntegerConstantRepr::SignedI64(1))))],
            binding: Default::default(),
        }))]),
    });

    let program = Program { items: vec![point, user] };
    let mut checker = Checker::new();
    checker
        .check_program(&program)
        .expect("a stack construction with a matching constructor overload should type-check");
}

#[test]
fn a_stack_construction_with_no_matching_constructor_is_rejected() {
    let point = point_class(vec![int_ctor()]);
    let user = TopLevel::Class(ClassDecl {
        name: "User".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![make_fn(vec![Stmt::ExprStmt(lit(ExprKind::StackConstruction {
            class_name: "Point".into(),
            var_name: "p".into(),
            args: Vec::new(),
            binding: Default::default(),
        }))]),
    });

    let program = Program { items: vec![point, user] };
    let mut checker = Checker::new();
    let err = checker
        .check_program(&program)
        .expect_err("no zero-argument constructor exists on Point, so this overload resolution must fail");
    assert!(matches!(err, SemaError::NoMatchingFunctionSignature { .. }), "got {err:?}");
}
