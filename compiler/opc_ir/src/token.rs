//! Tokens produced by the lexer.

use std::fmt;

use crate::{Name, Span};

/// Kind of a token, carrying cooked text for literals and identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Numeric literal, kept as source text (`-12.5e3`).
    Number(Name),
    /// Double-quoted string with escapes already processed.
    String(Name),
    True,
    False,
    Null,
    Ident(Name),

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Dot,
    /// `=>`
    FatArrow,
    /// `?`, lowers a key's weight.
    Question,
    /// `!`, raises a key's weight.
    Bang,
    Eof,
}

/// Coarse token classes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Number,
    Literal,
    Operator,
    Identifier,
    End,
}

impl TokenKind {
    /// Coarse class of this token.
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::Number(_) => TokenCategory::Number,
            TokenKind::String(_) | TokenKind::True | TokenKind::False | TokenKind::Null => {
                TokenCategory::Literal
            }
            TokenKind::Ident(_) => TokenCategory::Identifier,
            TokenKind::Eof => TokenCategory::End,
            _ => TokenCategory::Operator,
        }
    }

    /// Literal text stored for a scalar token, if this is one.
    ///
    /// Keyword literals store their spelling.
    pub fn literal_text(&self) -> Option<&str> {
        match self {
            TokenKind::Number(text) | TokenKind::String(text) => Some(text.as_str()),
            TokenKind::True => Some("true"),
            TokenKind::False => Some("false"),
            TokenKind::Null => Some("null"),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number `{n}`"),
            TokenKind::String(s) => write!(f, "string {:?}", s.as_str()),
            TokenKind::True => f.write_str("`true`"),
            TokenKind::False => f.write_str("`false`"),
            TokenKind::Null => f.write_str("`null`"),
            TokenKind::Ident(n) => write!(f, "identifier `{n}`"),
            TokenKind::LBrace => f.write_str("`{`"),
            TokenKind::RBrace => f.write_str("`}`"),
            TokenKind::LBracket => f.write_str("`[`"),
            TokenKind::RBracket => f.write_str("`]`"),
            TokenKind::LParen => f.write_str("`(`"),
            TokenKind::RParen => f.write_str("`)`"),
            TokenKind::Colon => f.write_str("`:`"),
            TokenKind::Comma => f.write_str("`,`"),
            TokenKind::Dot => f.write_str("`.`"),
            TokenKind::FatArrow => f.write_str("`=>`"),
            TokenKind::Question => f.write_str("`?`"),
            TokenKind::Bang => f.write_str("`!`"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A token with its source location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Ordered token list; always terminated by an `Eof` token when produced by
/// the lexer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    /// Create a new empty token list.
    #[inline]
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    /// Create a new token list with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        TokenList {
            tokens: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests;
