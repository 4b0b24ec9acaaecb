//! Location primitives shared by the parser (external to this workspace)
//! and the semantic analyzer in `ruddyc_sema`.
//!
//! This crate intentionally stays tiny: the lexer and parser that build a
//! full AST from source text are out of scope for the semantic middle end
//! this workspace implements (see `SPEC_FULL.md`). What *is* shared across
//! that boundary is the location type every AST node carries, so it lives
//! in its own crate rather than being duplicated.

pub mod location;

pub use location::{DiagnosticContext, FileLocation, LocationGuard};
