//! opc evaluation: the scope tree and everything that reads or builds it.
//!
//! - [`Scope`]: tree nodes with weighted `get`, `insert` and `push`
//! - [`Value`]: what entries hold (scopes, blobs, lambdas, unresolved chains and calls)
//! - [`load_from_string`] / [`load_from_file`]: source text to a document root
//! - [`env`]: the per-thread standard library scope
//! - [`render`]: resolved values to JSON text
//!
//! Nothing is evaluated while building. Chains and calls are resolved on each
//! `get`, and the stored tree is never rewritten.

mod builder;
mod deadline;
pub mod errors;
mod lambda;
mod loader;
mod render;
mod resolve;
mod scope;
mod stdlib;
mod value;

pub use errors::{
    ErrorCategory, EvalError, EvalResult, ReferenceErrorKind, ResourceErrorKind,
    SyntaxErrorKind, TypeErrorKind,
};
pub use lambda::{Lambda, NativeFn};
pub use loader::{load_from_file, load_from_string, LoadOptions, DEFAULT_QUOTA};
pub use opc_arena::{ArenaError, Blob, SharedArena};
pub use render::render;
pub use resolve::{CallContext, MAX_CALLS, MAX_DEPTH};
pub use scope::{EntryRef, Scope};
pub use stdlib::env;
pub use value::{CallSite, Chain, KeyPath, Segment, Value};
