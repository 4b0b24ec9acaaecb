//! Analysis configuration (spec.md §9 ambient addition), modeled on the
//! teacher's `loader::LoaderConfig`: a small, plain struct threaded
//! through the driver rather than scattered function parameters.

use crate::ast::Program;
use crate::check::Checker;
use crate::error::SemaError;

/// Options for running the four-pass driver (spec §4.3) over a whole
/// program. The driver's error model is fail-fast end to end (spec §4.3:
/// errors are unrecoverable, the first one short-circuits analysis), so
/// `max_diagnostics` bounds how many errors [`Checker::check_program_collecting`]
/// will report — currently either 0 or 1, since there is nothing past the
/// first error to collect. The field exists so a caller's configuration
/// doesn't have to change shape if multi-error recovery is added later.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub max_diagnostics: usize,
}

impl AnalysisOptions {
    pub fn new(max_diagnostics: usize) -> Self {
        Self { max_diagnostics }
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { max_diagnostics: usize::MAX }
    }
}

impl Checker {
    /// [`Self::check_program`] as a `Vec`-returning entry point for
    /// callers (the `ruddyc` binary) that want a uniform "list of
    /// diagnostics" shape rather than matching on a `Result`.
    pub fn check_program_collecting(&mut self, program: &Program, options: &AnalysisOptions) -> Vec<SemaError> {
        if options.max_diagnostics == 0 {
            return Vec::new();
        }
        match self.check_program(program) {
            Ok(()) => Vec::new(),
            Err(err) => vec![err],
        }
    }
}
