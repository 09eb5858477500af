//! opc IR - shared front-end types
//!
//! This crate holds the data that flows between the lexer and the tree
//! builder:
//! - Spans for source locations
//! - Names for identifiers and keys
//! - Tokens and `TokenList` for lexer output
//!
//! Nothing here knows about scopes, values or the blob arena; those live in
//! `opc_eval` and `opc_arena`.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod name;
mod span;
mod token;

pub use name::{Name, RESERVED_NAMES};
pub use span::{line_col, Span, SpanError};
pub use token::{Token, TokenCategory, TokenKind, TokenList};
