//! `ruddyc` — a demonstration driver for the semantic middle end.
//!
//! There is no parser in this workspace (see `ruddyc_sema::ast`'s module
//! doc), so this binary runs the four-pass checker over a small built-in
//! program instead of reading source from disk, then prints the checked
//! symbol table as the library-export JSON a real front end would hand
//! to a linker (spec §4.6).
//!
//! Usage: `ruddyc [--lib-name NAME]`

use std::env;

use once_cell::sync::Lazy;
use ruddyc_ast::FileLocation;
use ruddyc_sema::ast::{
    Argument, ClassDecl, ClassMember, FunctionDecl, Program, Stmt, TopLevel,
};
use ruddyc_sema::check::Checker;
use ruddyc_sema::serialize;
use ruddyc_sema::symbols::Visibility;
use ruddyc_sema::types::{IntegerKind, Modifiers, TypeInfo};

/// `public class Point { public int32 x; public int32 y; public Point(); public int32 sum() { return 0; } }`
static DEMO_PROGRAM: Lazy<Program> = Lazy::new(|| {
    let loc = FileLocation::new(1, 1);
    Program {
        items: vec![TopLevel::Class(ClassDecl {
            name: "Point".into(),
            visibility: Visibility::Public,
            location: loc,
            members: vec![
                ClassMember::Variable {
                    name: "x".into(),
                    visibility: Visibility::Public,
                    declared_type: TypeInfo::Integer(IntegerKind::Int32),
                    default_value: None,
                    modifiers: Modifiers::default(),
                    location: loc,
                },
                ClassMember::Variable {
                    name: "y".into(),
                    visibility: Visibility::Public,
                    declared_type: TypeInfo::Integer(IntegerKind::Int32),
                    default_value: None,
                    modifiers: Modifiers::default(),
                    location: loc,
                },
                ClassMember::Function(FunctionDecl {
                    name: "sum".into(),
                    visibility: Visibility::Public,
                    modifiers: Modifiers::default(),
                    inputs: Vec::new(),
                    outputs: vec![Argument { name: "result".into(), ty: TypeInfo::Integer(IntegerKind::Int32) }],
                    body: vec![Stmt::Return {
                        value: None,
                        location: loc,
                        destructor_calls: Default::default(),
                    }],
                    location: loc,
                    binding: Default::default(),
                }),
            ],
        })],
    }
});

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut lib_name = "demo".to_string();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lib-name" => {
                lib_name = args.next().unwrap_or_else(|| {
                    eprintln!("Error: --lib-name requires a value");
                    std::process::exit(1);
                });
            }
            other => {
                eprintln!("Unknown argument: {other}");
                std::process::exit(1);
            }
        }
    }

    let mut checker = Checker::new();
    if let Err(err) = checker.check_program(&DEMO_PROGRAM) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    let symbols = serialize::export(&checker.table, lib_name);
    match serialize::to_json(&symbols) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
