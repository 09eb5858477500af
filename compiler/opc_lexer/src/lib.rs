//! Lexer for opc using logos.
//!
//! Produces the `TokenList` consumed by the tree builder. Whitespace and
//! comments are skipped; every list ends with an `Eof` token.

mod escape;

use logos::Logos;
use opc_ir::{Name, Span, SpanError, Token, TokenKind, TokenList};

use crate::escape::unescape_string;

/// Raw token from logos (before cooking string contents).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    // Emitted only when the closing `*/` is missing
    #[token("/*", block_comment)]
    UnterminatedComment,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=>")]
    FatArrow,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    // String literal (may span lines)
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // Opening quote with no closing quote before end of input
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedString,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// Skip a block comment, or swallow the rest of the input if it never closes.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> logos::Filter<()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::Filter::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            logos::Filter::Emit(())
        }
    }
}

/// What went wrong while lexing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unrecognized input {0:?}")]
    UnrecognizedInput(String),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("invalid escape sequence in string literal")]
    InvalidEscape,
    #[error("{0}")]
    SourceTooLarge(SpanError),
}

/// A lexer error with its location.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

/// Lex source text into a `TokenList`.
///
/// Stops at the first malformed token; lexing errors are fatal to the load.
pub fn lex(source: &str) -> Result<TokenList, LexError> {
    let mut result = TokenList::with_capacity(source.len() / 4);
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::try_from_range(logos.span()).map_err(|e| LexError {
            span: Span::DUMMY,
            kind: LexErrorKind::SourceTooLarge(e),
        })?;
        let slice = logos.slice();
        let kind = match token_result {
            Ok(raw) => convert_token(raw, slice, span)?,
            Err(()) => {
                return Err(LexError {
                    span,
                    kind: LexErrorKind::UnrecognizedInput(slice.to_owned()),
                })
            }
        };
        result.push(Token::new(kind, span));
    }

    let eof_pos = u32::try_from(source.len()).map_err(|_| LexError {
        span: Span::DUMMY,
        kind: LexErrorKind::SourceTooLarge(SpanError::EndTooLarge(source.len())),
    })?;
    result.push(Token::new(TokenKind::Eof, Span::point(eof_pos)));

    Ok(result)
}

/// Convert a raw token to a `TokenKind`, cooking string contents.
fn convert_token(raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
    Ok(match raw {
        RawToken::Number => TokenKind::Number(Name::new(slice)),
        RawToken::String => {
            let content = &slice[1..slice.len() - 1];
            let cooked = unescape_string(content).map_err(|bad| {
                // +1 skips the opening quote
                let at = span.start + u32::try_from(bad.offset + 1).unwrap_or(0);
                LexError {
                    span: Span::new(at, (at + 2).min(span.end)),
                    kind: LexErrorKind::InvalidEscape,
                }
            })?;
            TokenKind::String(Name::from(cooked))
        }
        RawToken::UnterminatedString => {
            return Err(LexError {
                span,
                kind: LexErrorKind::UnterminatedString,
            })
        }
        RawToken::UnterminatedComment => {
            return Err(LexError {
                span,
                kind: LexErrorKind::UnterminatedComment,
            })
        }
        RawToken::Ident => TokenKind::Ident(Name::new(slice)),
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Question => TokenKind::Question,
        RawToken::Bang => TokenKind::Bang,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
