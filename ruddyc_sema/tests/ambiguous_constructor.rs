//! spec §8.4 scenario 2: two constructors collide when their input
//! composites are mutually assignable, not merely identical in spelling
//! (spec §4.1 `BindFunction`'s overload-ambiguity rule).

use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{ClassDecl, ClassMember, ConstructorDecl, Program, TopLevel};
use ruddyc_sema::check::Checker;
use ruddyc_sema::error::SemaError;
use ruddyc_sema::symbols::Visibility;

fn loc() -> FileLocation {
    FileLocation::new(1, 1)
}

fn parameterless_ctor() -> ClassMember {
    ClassMember::Constructor(ConstructorDecl {
        visibility: Visibility::Public,
        inputs: Vec::new(),
        initializers: Vec::new(),
        body: Vec::new(),
        location: loc(),
        binding: Default::default(),
    })
}

#[test]
fn two_parameterless_constructors_are_ambiguous() {
    let program = Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "C".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![parameterless_ctor(), parameterless_ctor()],
        })],
    };

    let mut checker = Checker::new();
    let err = checker.check_program(&program).expect_err("duplicate no-arg constructors must be rejected");
    assert!(matches!(err, SemaError::SymbolAlreadyDefinedInThisScope { .. }), "got {err:?}");
}

#[test]
fn a_single_constructor_is_fine() {
    let program = Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "C".into(),
            visibility: Visibility::Public,
            location: loc(),
            members: vec![parameterless_ctor()],
        })],
    };

    let mut checker = Checker::new();
    checker.check_program(&program).expect("a single constructor is never ambiguous with itself");
}
