//! spec §8.4 scenario 5: `break` schedules destructor calls for every
//! value-class local declared since the loop was entered, innermost
//! (most recently declared) first (spec §4.1 invariant 2).

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{Argument, ClassDecl, ClassMember, Expr, ExprKind, FunctionDecl, Literal, Program, Stmt, TopLevel};
use ruddyc_sema::check::Checker;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{Modifiers, TypeInfo};

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn reference(name: &str) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Reference(name.into()))
}

fn bool_literal(b: bool) -> Expr {
    ruddyc_sema::ast::ExprNode::new(loc(), ExprKind::Literal(Literal::Bool(b)))
}

fn copy_of(name: &str, seed: &str) -> Stmt {
    Stmt::VarDecl {
        name: name.into(),
        declared_type: TypeInfo::Auto,
        initializer: Some(reference(seed)),
        location: loc(),
        binding: Default::default(),
    }
}

#[test]
fn break_destroys_value_class_locals_in_reverse_declaration_order() {
    let program = Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "Runner".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![ClassMember::Function(FunctionDecl {
                name: "run".into(),
                visibility: Visibility::Public,
                modifiers: Modifiers::default(),
                inputs: vec![Argument { name: "seed".into(), ty: TypeInfo::unresolved_class("Resource", true) }],
                outputs: Vec::new(),
                body: vec![Stmt::While {
                    condition: bool_literal(true),
                    body: Box::new(Stmt::Block(
                        vec![
                            copy_of("r1", "seed"),
                            copy_of("r2", "seed"),
                            Stmt::Break { location: loc(), destructor_calls: Default::default() },
                        ],
                        loc(),
                    )),
                    location: loc(),
                }],
                location: loc(),
                binding: Default::default(),
            })],
        })],
    };

    let mut checker = Checker::new();
    checker.check_program(&program).expect("loop with value-class locals should type-check");

    let TopLevel::Class(class) = &program.items[0] else { unreachable!() };
    let ClassMember::Function(run) = &class.members[0] else { unreachable!() };
    let Stmt::While { body, .. } = &run.body[0] else { unreachable!() };
    let Stmt::Block(stmts, _) = body.as_ref() else { unreachable!() };

    let r1 = match &stmts[0] {
        Stmt::VarDecl { binding, .. } => binding.get().expect("r1 should have a resolved binding"),
        _ => unreachable!(),
    };
    let r2 = match &stmts[1] {
        Stmt::VarDecl { binding, .. } => binding.get().expect("r2 should have a resolved binding"),
        _ => unreachable!(),
    };
    let scheduled = match &stmts[2] {
        Stmt::Break { destructor_calls, .. } => destructor_calls.borrow().clone(),
        _ => unreachable!(),
    };

    assert_eq!(scheduled, vec![r2, r1], "r2 was declared after r1 so it is destroyed first");
}
