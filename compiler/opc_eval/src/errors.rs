//! Evaluation errors and their centralized constructors.
//!
//! Every failure belongs to one of four categories:
//! - **Syntax**: malformed tokens or grammar; aborts the whole load.
//! - **Reference**: unresolvable names, ambiguous overrides, cycles.
//! - **Type**: calling a non-lambda, indexing a non-scope, bad stdlib arguments.
//! - **Resource**: blob quota, timeout, depth ceiling, unreadable files.
//!
//! Reference and type errors abort only the `get` that raised them; the tree
//! stays queryable. A missing key is never an error: lookups return `Ok(None)`.

use std::path::PathBuf;

use opc_arena::ArenaError;
use opc_ir::{Name, Span};
use opc_lexer::{LexError, LexErrorKind};

use crate::value::Segment;

/// Result of evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Coarse error class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Syntax,
    Reference,
    Type,
    Resource,
}

/// An evaluation failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("syntax error at {span}: {kind}")]
    Syntax { kind: SyntaxErrorKind, span: Span },
    #[error("reference error: {0}")]
    Reference(ReferenceErrorKind),
    #[error("type error: {0}")]
    Type(TypeErrorKind),
    #[error("resource error: {0}")]
    Resource(ResourceErrorKind),
}

impl EvalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EvalError::Syntax { .. } => ErrorCategory::Syntax,
            EvalError::Reference(_) => ErrorCategory::Reference,
            EvalError::Type(_) => ErrorCategory::Type,
            EvalError::Resource(_) => ErrorCategory::Resource,
        }
    }

    /// Source span, for syntax errors.
    pub fn span(&self) -> Option<Span> {
        match self {
            EvalError::Syntax { span, .. } => Some(*span),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("{0}")]
    Lex(LexErrorKind),
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: String },
    #[error("malformed compound key: {0}")]
    MalformedKey(String),
    #[error("weight mixes `?` and `!`")]
    MixedWeight,
    #[error("`{0}` is reserved and cannot be used as a key")]
    ReservedKey(Name),
    #[error("lambda parameter must be a single identifier, found {0}")]
    InvalidLambdaParameter(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceErrorKind {
    #[error("ambiguous override: several `{name}` entries share weight {weight}")]
    AmbiguousOverride { name: Name, weight: i32 },
    #[error("`{key}` refers to itself while being resolved")]
    Cycle { key: String },
    #[error("`{0}` does not name anything")]
    Unresolved(String),
    #[error("argument for `{param}` does not resolve to a value")]
    MissingArgument { param: Name },
    #[error("cannot insert under an empty path")]
    EmptyPath,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeErrorKind {
    #[error("cannot look up `{segment}` in a {found}")]
    NotIndexable { segment: String, found: &'static str },
    #[error("a {found} is not callable")]
    NotCallable { found: &'static str },
    #[error("`{0}` is not a non-negative integer index")]
    NonIntegerIndex(String),
    #[error("cannot add a {adding} entry to a scope holding {holding} entries")]
    MixedEntries {
        adding: &'static str,
        holding: &'static str,
    },
    #[error("insertion paths take names only, found index {0}")]
    IndexInInsertPath(usize),
    #[error("scope belongs to another document and cannot be inserted")]
    ForeignDocument,
    #[error("scope already has a parent and cannot be inserted again")]
    AlreadyParented,
    #[error("scope cannot be inserted into itself or its descendants")]
    SelfInsertion,
    #[error("`{function}` expects {expected}, found {found}")]
    WrongArgument {
        function: &'static str,
        expected: &'static str,
        found: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResourceErrorKind {
    #[error("{0}")]
    Quota(ArenaError),
    #[error("evaluation exceeded {limit_ms}ms")]
    Timeout { limit_ms: u128 },
    #[error("resolution nested deeper than {limit} levels")]
    DepthExceeded { limit: usize },
    #[error("call chain ran longer than {limit} calls")]
    CallLimit { limit: usize },
    #[error("scope is not attached to a document with a blob arena")]
    NoArena,
    #[error("cannot read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl From<ArenaError> for EvalError {
    fn from(e: ArenaError) -> Self {
        EvalError::Resource(ResourceErrorKind::Quota(e))
    }
}

impl From<LexError> for EvalError {
    fn from(e: LexError) -> Self {
        EvalError::Syntax {
            kind: SyntaxErrorKind::Lex(e.kind),
            span: e.span,
        }
    }
}

// Syntax

pub fn unexpected(expected: &'static str, found: impl ToString, span: Span) -> EvalError {
    syntax(
        SyntaxErrorKind::Unexpected {
            expected,
            found: found.to_string(),
        },
        span,
    )
}

pub fn syntax(kind: SyntaxErrorKind, span: Span) -> EvalError {
    EvalError::Syntax { kind, span }
}

// Reference

pub fn ambiguous_override(name: &Name, weight: i32) -> EvalError {
    EvalError::Reference(ReferenceErrorKind::AmbiguousOverride {
        name: name.clone(),
        weight,
    })
}

pub fn cycle(segment: &Segment) -> EvalError {
    EvalError::Reference(ReferenceErrorKind::Cycle {
        key: segment.to_string(),
    })
}

pub fn unresolved(what: impl ToString) -> EvalError {
    EvalError::Reference(ReferenceErrorKind::Unresolved(what.to_string()))
}

pub fn missing_argument(param: &Name) -> EvalError {
    EvalError::Reference(ReferenceErrorKind::MissingArgument {
        param: param.clone(),
    })
}

pub fn empty_path() -> EvalError {
    EvalError::Reference(ReferenceErrorKind::EmptyPath)
}

// Type

pub fn not_indexable(segment: &Segment, found: &'static str) -> EvalError {
    EvalError::Type(TypeErrorKind::NotIndexable {
        segment: segment.to_string(),
        found,
    })
}

pub fn not_callable(found: &'static str) -> EvalError {
    EvalError::Type(TypeErrorKind::NotCallable { found })
}

pub fn non_integer_index(text: impl ToString) -> EvalError {
    EvalError::Type(TypeErrorKind::NonIntegerIndex(text.to_string()))
}

pub fn wrong_argument(
    function: &'static str,
    expected: &'static str,
    found: impl ToString,
) -> EvalError {
    EvalError::Type(TypeErrorKind::WrongArgument {
        function,
        expected,
        found: found.to_string(),
    })
}

pub fn type_error(kind: TypeErrorKind) -> EvalError {
    EvalError::Type(kind)
}

// Resource

pub fn timeout(limit_ms: u128) -> EvalError {
    EvalError::Resource(ResourceErrorKind::Timeout { limit_ms })
}

pub fn depth_exceeded(limit: usize) -> EvalError {
    EvalError::Resource(ResourceErrorKind::DepthExceeded { limit })
}

pub fn call_limit(limit: usize) -> EvalError {
    EvalError::Resource(ResourceErrorKind::CallLimit { limit })
}

pub fn no_arena() -> EvalError {
    EvalError::Resource(ResourceErrorKind::NoArena)
}

pub fn io_error(path: impl Into<PathBuf>, err: &std::io::Error) -> EvalError {
    EvalError::Resource(ResourceErrorKind::Io {
        path: path.into(),
        message: err.to_string(),
    })
}
