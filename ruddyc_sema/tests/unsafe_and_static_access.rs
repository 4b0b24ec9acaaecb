//! Unsafe fixed-rank arrays, index operations, and `static`-method member
//! access (spec §3.2 `UnsafeArrayType`, §4.3 `IndexOperation` /
//! `UnsafeStatements`, §4.1 `NonStaticMemberFromStaticContext`).

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{
    Argument, ClassDecl, ClassMember, Expr, ExprKind, FunctionDecl, Literal, Program, Stmt, TopLevel,
};
use ruddyc_sema::check::Checker;
use ruddyc_sema::error::SemaError;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{IntegerConstantRepr, IntegerKind, Modifiers, TypeInfo};

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn reference(name: &str) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Reference(name.into()))
}

fn int_literal(v: i64) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Literal(Literal::Integer(IntegerConstantRepr::SignedI64(v))))
}

fn index(base: &str, i: i64) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Index { base: reference(base), index: int_literal(i) })
}

fn array_ty() -> TypeInfo {
    TypeInfo::UnsafeArray { element: Box::new(TypeInfo::Integer(IntegerKind::Int32)), rank: 1 }
}

fn grid_class(cells_modifiers: Modifiers, touch_body: Vec<Stmt>) -> TopLevel {
    TopLevel::Class(ClassDecl {
        name: "Grid".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![
            ClassMember::Variable {
                name: "cells".into(),
                visibility: Visibility::Public,
                declared_type: array_ty(),
                default_value: None,
                modifiers: cells_modifiers,
                location: loc(),
            },
            ClassMember::Function(FunctionDecl {
                name: "touch".into(),
                visibility: Visibility::Public,
                modifiers: Modifiers::default(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                body: touch_body,
                location: loc(),
                binding: Default::default(),
            }),
        ],
    })
}

#[test]
fn an_unsafe_array_member_without_the_unsafe_modifier_is_rejected() {
    let program = Program { items: vec![grid_class(Modifiers::default(), Vec::new())] };
    let mut checker = Checker::new();
    let err = checker.check_program(&program).expect_err("array-typed member must carry the unsafe modifier");
    assert!(matches!(err, SemaError::CannotReferenceUnsafeMemberFromSafeContext { .. }), "got {err:?}");
}

#[test]
fn reading_an_unsafe_member_outside_an_unsafe_block_is_rejected() {
    let unsafe_mods = Modifiers { is_static: false, is_unsafe: true };
    let body = vec![Stmt::ExprStmt(index("cells", 0))];
    let program = Program { items: vec![grid_class(unsafe_mods, body)] };
    let mut checker = Checker::new();
    let err = checker.check_program(&program).expect_err("unsafe member read outside unsafe context must be rejected");
    assert!(matches!(err, SemaError::CannotReferenceUnsafeMemberFromSafeContext { .. }), "got {err:?}");
}

#[test]
fn indexing_an_unsafe_member_inside_an_unsafe_block_is_accepted() {
    let unsafe_mods = Modifiers { is_static: false, is_unsafe: true };
    let body = vec![Stmt::Unsafe(vec![Stmt::ExprStmt(index("cells", 0))], loc())];
    let program = Program { items: vec![grid_class(unsafe_mods, body)] };
    let mut checker = Checker::new();
    checker.check_program(&program).expect("indexing an unsafe member inside `unsafe { }` should type-check");
}

#[test]
fn declaring_an_unsafe_array_local_outside_unsafe_is_rejected() {
    let body = vec![Stmt::VarDecl {
        name: "buf".into(),
        declared_type: array_ty(),
        initializer: None,
        location: loc(),
        binding: Default::default(),
    }];
    let program = Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "Scratch".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![ClassMember::Function(FunctionDecl {
                name: "run".into(),
                visibility: Visibility::Public,
                modifiers: Modifiers::default(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                body,
                location: loc(),
                binding: Default::default(),
            })],
        })],
    };
    let mut checker = Checker::new();
    let err = checker.check_program(&program).expect_err("unsafe array locals may not be declared outside `unsafe { }`");
    assert!(matches!(err, SemaError::CannotReferenceUnsafeMemberFromSafeContext { .. }), "got {err:?}");
}

fn counter_class(bump_modifiers: Modifiers) -> Program {
    Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "Counter".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![
                ClassMember::Variable {
                    name: "total".into(),
                    visibility: Visibility::Public,
                    declared_type: TypeInfo::Integer(IntegerKind::Int32),
                    default_value: None,
                    modifiers: Modifiers::default(),
                    location: loc(),
                },
                ClassMember::Function(FunctionDecl {
                    name: "bump".into(),
                    visibility: Visibility::Public,
                    modifiers: bump_modifiers,
                    inputs: vec![Argument { name: "n".into(), ty: TypeInfo::Integer(IntegerKind::Int32) }],
                    outputs: Vec::new(),
                    body: vec![Stmt::ExprStmt(ruddyc_sema::ast::ExprNode::new(
                        loc(),
                        ExprKind::Assign { target: reference("total"), value: reference("n") },
                    ))],
                    location: loc(),
                    binding: Default::default(),
                }),
            ],
        })],
    }
}

#[test]
fn indexing_an_unsafe_member_inside_an_unsafe_function_is_accepted() {
    let unsafe_mods = Modifiers { is_static: false, is_unsafe: true };
    let body = vec![Stmt::ExprStmt(index("cells", 0))];
    let grid = TopLevel::Class(ClassDecl {
        name: "Grid".into(),
        visibility: Visibility::Public,
        location: loc(),
        members: vec![
            ClassMember::Variable {
                name: "cells".into(),
                visibility: Visibility::Public,
                declared_type: array_ty(),
                default_value: None,
                modifiers: unsafe_mods,
                location: loc(),
            },
            ClassMember::Function(FunctionDecl {
                name: "touch".into(),
                visibility: Visibility::Public,
                modifiers: unsafe_mods,
                inputs: Vec::new(),
                outputs: Vec::new(),
                body,
                location: loc(),
                binding: Default::default(),
            }),
        ],
    });
    let program = Program { items: vec![grid] };
    let mut checker = Checker::new();
    checker
        .check_program(&program)
        .expect("an `unsafe`-modified function's whole body should run in unsafe context");
}

#[test]
fn a_static_method_cannot_reference_an_instance_member_by_bare_name() {
    let program = counter_class(Modifiers { is_static: true, is_unsafe: false });
    let mut checker = Checker::new();
    let err = checker.check_program(&program).expect_err("a static method has no implicit receiver");
    assert!(matches!(err, SemaError::NonStaticMemberFromStaticContext { .. }), "got {err:?}");
}

#[test]
fn a_non_static_method_may_reference_an_instance_member_by_bare_name() {
    let program = counter_class(Modifiers::default());
    let mut checker = Checker::new();
    checker.check_program(&program).expect("an instance method's implicit `this` covers a bare member reference");
}
