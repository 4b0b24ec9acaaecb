//! Source locations and the diagnostic location stack.
//!
//! This is the one piece of state shared between the parser (external to
//! this workspace) and the semantic analyzer: every AST node the parser
//! hands over carries a [`FileLocation`], and the analyzer pushes each
//! node's location onto a [`DiagnosticContext`] while visiting it so that
//! any error raised mid-traversal can report the innermost active position.

use serde::{Deserialize, Serialize};

/// A `(line, column)` position in the originating source file.
///
/// The sentinel [`FileLocation::SYNTHESIZED`] marks a node that was
/// generated by the compiler itself (a default constructor, an inserted
/// destructor call) rather than parsed from source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLocation {
    pub line: i32,
    pub column: i32,
}

impl FileLocation {
    pub const SYNTHESIZED: FileLocation = FileLocation { line: -1, column: -1 };

    pub fn new(line: i32, column: i32) -> Self {
        Self { line, column }
    }

    pub fn is_synthesized(&self) -> bool {
        *self == Self::SYNTHESIZED
    }
}

impl Default for FileLocation {
    fn default() -> Self {
        Self::SYNTHESIZED
    }
}

impl std::fmt::Display for FileLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// The stack of locations currently being visited.
///
/// The original implementation keeps an equivalent stack as process-wide
/// thread-local state (`FileLocationContext`). Here it is owned explicitly
/// by whatever is driving the traversal (normally a [`crate::location`]
/// caller in `ruddyc_sema`'s type-check driver), so two independent
/// compilations can run on separate threads without any special handling.
#[derive(Debug, Default)]
pub struct DiagnosticContext {
    stack: Vec<FileLocation>,
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, location: FileLocation) {
        self.stack.push(location);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// The innermost active location, or the synthesized sentinel if
    /// nothing is currently being visited.
    pub fn current(&self) -> FileLocation {
        self.stack.last().copied().unwrap_or(FileLocation::SYNTHESIZED)
    }
}

/// RAII guard that pushes `location` on construction and pops it on drop,
/// mirroring the enter/exit pairing the original performs around every
/// AST node visit.
pub struct LocationGuard<'a> {
    ctx: &'a mut DiagnosticContext,
}

impl<'a> LocationGuard<'a> {
    pub fn enter(ctx: &'a mut DiagnosticContext, location: FileLocation) -> Self {
        ctx.push(location);
        Self { ctx }
    }
}

impl Drop for LocationGuard<'_> {
    fn drop(&mut self) {
        self.ctx.pop();
    }
}
