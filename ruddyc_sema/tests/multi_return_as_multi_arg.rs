//! spec §8.4 scenario 4: a call whose single argument is itself a
//! multi-output call absorbs that composite directly as the multi-arg
//! input of the outer call (spec §6.4).

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{Argument, ClassDecl, ClassMember, Expr, ExprKind, FunctionDecl, Program, Stmt, TopLevel};
use ruddyc_sema::check::Checker;
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

#[test]
fn a_two_output_call_satisfies_a_two_input_call_as_a_single_argument() {
    let swap_pair = ClassMember::Function(FunctionDecl {
        name: "swap_pair".into(),
        visibility: Visibility::Public,
        modifiers: Modifiers::default(),
        inputs: Vec::new(),
        outputs: vec![int32_arg("a"), int32_arg("b")],
        body: vec![Stmt::Return { value: None, location: loc(), destructor_calls: Default::default() }],
        location: loc(),
        binding: Default::default(),
    });

    let consume = ClassMember::Function(FunctionDecl {
        name: "consume".into(),
        visibility: Visibility::Public,
        modifiers: Modifiers::default(),
        inputs: vec![int32_arg("a"), int32_arg("b")],
        outputs: Vec::new(),
        body: Vec::new(),
        location: loc(),
        binding: Default::default(),
    });

    let run = ClassMember::Function(FunctionDecl {
        name: "run".into(),
        visibility: Visibility::Public,
        modifiers: Modifiers::default(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        body: vec![Stmt::ExprStmt(call("consume", vec![call("swap_pair", Vec::new())]))],
        location: loc(),
        binding: Default::default(),
    });

    let program = Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "E".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![swap_pair, consume, run],
        })],
    };

    let mut checker = Checker::new();
    checker.check_program(&program).expect("a two-output call should satisfy a two-input call in one slot");
}
