//! ruddyc_sema — the semantic middle end: symbol table, `TypeInfo`
//! lattice, and the four-pass type-check driver that sits between a
//! parser (outside this workspace, see `ruddyc_ast`) and a code
//! generator (also outside this workspace).
//!
//! # Example
//!
//! ```
//! use ruddyc_sema::ast::{ClassDecl, Program, TopLevel};
//! use ruddyc_sema::check::Checker;
//! use ruddyc_sema::symbols::Visibility;
//! use ruddyc_ast::FileLocation;
//!
//! let program = Program {
//!     items: vec![TopLevel::Class(ClassDecl {
//!         name: "Empty".into(),
//!         visibility: Visibility::Public,
//!         members: Vec::new(),
//!         location: FileLocation::new(1, 1),
//!     })],
//! };
//!
//! let mut checker = Checker::new();
//! checker.check_program(&program).unwrap();
//! assert!(checker.table.resolve_class_name("Empty").is_some());
//! ```

pub mod ast;
pub mod check;
pub mod config;
pub mod constants;
pub mod error;
pub mod serialize;
pub mod symbols;
pub mod types;

pub use check::Checker;
pub use config::AnalysisOptions;
pub use error::{SemaError, SemaResult};
