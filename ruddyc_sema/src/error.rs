//! The semantic-analysis error taxonomy.
//!
//! The original implementation throws a distinct C++ exception type per
//! diagnosable condition (`Ast/Exceptions.h`, `Ast/TypeExceptions.h`).
//! Here every row of that taxonomy becomes one variant of a single
//! `#[derive(thiserror::Error)]` enum, following the flat error-enum shape
//! the teacher uses for its own compiler-style errors (`aot::AotError`).
//!
//! Every variant carries the [`FileLocation`] active when it was raised;
//! the driver formats `<file>(<line>,<col>): <message>` from it. Errors
//! are unrecoverable: the first one short-circuits the whole analysis.

use ruddyc_ast::FileLocation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemaError {
    #[error("{location}: cannot assign value of type '{source}' to target of type '{target}'")]
    TypeMismatch {
        location: FileLocation,
        target: String,
        source: String,
    },

    #[error("{location}: '{name}' is already defined")]
    TypeAlreadyExists { location: FileLocation, name: String },

    #[error("{location}: no matching function signature found for '{name}'")]
    NoMatchingFunctionSignature { location: FileLocation, name: String },

    #[error("{location}: operation '{op}' is not defined for operand type(s) {operands}")]
    OperationNotDefined {
        location: FileLocation,
        op: String,
        operands: String,
    },

    #[error("{location}: '{name}' is already defined in this scope")]
    SymbolAlreadyDefinedInThisScope { location: FileLocation, name: String },

    #[error("{location}: symbol '{name}' is not defined")]
    SymbolNotDefined { location: FileLocation, name: String },

    #[error("{location}: symbol '{name}' is not a {expected}")]
    SymbolWrongType {
        location: FileLocation,
        name: String,
        expected: String,
    },

    #[error("{location}: '{name}' is not accessible from this context")]
    SymbolNotAccessable { location: FileLocation, name: String },

    #[error("{location}: variable '{name}' must be initialized")]
    VariablesMustBeInitialized { location: FileLocation, name: String },

    #[error("{location}: variables cannot be declared outside scopes or functions")]
    VariablesCannotBeDeclaredOutsideScopesOrFunctions { location: FileLocation },

    #[error("{location}: '{name}' is referenced before it is initialized")]
    UninitializedVariableReferenced { location: FileLocation, name: String },

    #[error("{location}: member '{name}' cannot be reinitialized")]
    CannotReinitializeMember { location: FileLocation, name: String },

    #[error("{location}: value-type member '{name}' must be initialized")]
    ValueTypeMustBeInitialized { location: FileLocation, name: String },

    #[error("{location}: 'break' used outside of a loop")]
    BreakInWrongPlace { location: FileLocation },

    #[error("{location}: '{name}' is not a value-class member and cannot appear in an initializer list")]
    ExpectedValueType { location: FileLocation, name: String },

    #[error("{location}: literal overflow: {detail}")]
    Overflow { location: FileLocation, detail: String },

    #[error("{location}: unknown control character in literal: {sequence}")]
    UnknownControlCharacter {
        location: FileLocation,
        sequence: String,
    },

    #[error("{location}: reference to non-static member '{name}' from a static context")]
    NonStaticMemberFromStaticContext { location: FileLocation, name: String },

    #[error("{location}: 'return' must be inside a function")]
    ReturnStatementMustBeDeclaredInFunctionScope { location: FileLocation },

    #[error("{location}: function declaration must be inside a class")]
    FunctionMustBeDeclaredInClassScope { location: FileLocation },

    #[error("{location}: cannot reference unsafe member '{name}' from a safe context")]
    CannotReferenceUnsafeMemberFromSafeContext { location: FileLocation, name: String },

    #[error("malformed library archive: {detail}")]
    MalformedLibrary { location: FileLocation, detail: String },
}

impl SemaError {
    pub fn location(&self) -> FileLocation {
        use SemaError::*;
        match self {
            TypeMismatch { location, .. }
            | TypeAlreadyExists { location, .. }
            | NoMatchingFunctionSignature { location, .. }
            | OperationNotDefined { location, .. }
            | SymbolAlreadyDefinedInThisScope { location, .. }
            | SymbolNotDefined { location, .. }
            | SymbolWrongType { location, .. }
            | SymbolNotAccessable { location, .. }
            | VariablesMustBeInitialized { location, .. }
            | VariablesCannotBeDeclaredOutsideScopesOrFunctions { location }
            | UninitializedVariableReferenced { location, .. }
            | CannotReinitializeMember { location, .. }
            | ValueTypeMustBeInitialized { location, .. }
            | BreakInWrongPlace { location }
            | ExpectedValueType { location, .. }
            | Overflow { location, .. }
            | UnknownControlCharacter { location, .. }
            | NonStaticMemberFromStaticContext { location, .. }
            | ReturnStatementMustBeDeclaredInFunctionScope { location }
            | FunctionMustBeDeclaredInClassScope { location }
            | CannotReferenceUnsafeMemberFromSafeContext { location, .. }
            | MalformedLibrary { location, .. } => *location,
        }
    }
}

pub type SemaResult<T> = Result<T, SemaError>;
