//! Tree builder: tokens to an unevaluated scope tree.
//!
//! Recursive descent over the token list. Literals become blobs in the
//! document arena as they are read; identifier chains, calls and lambdas are
//! stored as-is for the resolver. Keys go through [`Scope::insert`], so
//! compound keys and the named/positional rule are enforced in one place.

use std::rc::Rc;

use opc_arena::SharedArena;
use opc_ir::{Name, Span, Token, TokenKind, TokenList};
use opc_stack::ensure_sufficient_stack;

use crate::deadline::Deadline;
use crate::errors::{self, EvalResult, SyntaxErrorKind};
use crate::lambda::Lambda;
use crate::scope::Scope;
use crate::value::{CallSite, Chain, KeyPath, Segment, Value};

/// Build the tree for a whole document.
///
/// A top-level value that is not a scope or array becomes the single entry
/// of a root array.
pub(crate) fn build(
    tokens: &TokenList,
    arena: &SharedArena,
    deadline: Option<Deadline>,
) -> EvalResult<Scope> {
    let mut builder = TreeBuilder {
        tokens: tokens.as_slice(),
        pos: 0,
        eof: Token::new(TokenKind::Eof, Span::DUMMY),
        arena,
        deadline,
    };
    let value = builder.expression()?;
    let trailing = builder.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(errors::unexpected("end of input", &trailing.kind, trailing.span));
    }
    match value {
        Value::Scope(scope) => Ok(scope),
        other => {
            let root = Scope::new();
            root.push(other)?;
            Ok(root)
        }
    }
}

struct TreeBuilder<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
    arena: &'a SharedArena,
    deadline: Option<Deadline>,
}

impl TreeBuilder<'_> {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> EvalResult<Span> {
        let token = self.bump();
        if &token.kind != kind {
            return Err(errors::unexpected(expected, &token.kind, token.span));
        }
        Ok(token.span)
    }

    fn expression(&mut self) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.expression_inner())
    }

    fn expression_inner(&mut self) -> EvalResult<Value> {
        if let Some(deadline) = &self.deadline {
            deadline.check()?;
        }
        let start = self.peek().span;
        let primary = self.primary()?;

        if self.at(&TokenKind::FatArrow) {
            let param = lambda_parameter(&primary, start)?;
            self.bump();
            let body = self.expression()?;
            return Ok(Value::Lambda(Lambda::deferred(param, body)));
        }

        let mut value = primary;
        while self.eat(&TokenKind::LParen) {
            let arg = self.expression()?;
            let end = self.expect(&TokenKind::RParen, "`)`")?;
            value = Value::Call(Rc::new(CallSite {
                callee: value,
                arg,
                span: start.merge(end),
            }));
        }
        if self.at(&TokenKind::FatArrow) {
            return Err(errors::syntax(
                SyntaxErrorKind::InvalidLambdaParameter("a call expression".to_owned()),
                start.merge(self.peek().span),
            ));
        }
        Ok(value)
    }

    fn primary(&mut self) -> EvalResult<Value> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::LBrace => self.scope().map(Value::Scope),
            TokenKind::LBracket => self.array().map(Value::Scope),
            TokenKind::Ident(_) => self.chain(),
            kind => match kind.literal_text() {
                Some(text) => {
                    self.bump();
                    Ok(Value::Blob(self.arena.alloc_str(text)?))
                }
                None => Err(errors::unexpected("an expression", kind, token.span)),
            },
        }
    }

    fn scope(&mut self) -> EvalResult<Scope> {
        self.bump();
        let scope = Scope::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                return Ok(scope);
            }
            let key = self.key()?;
            let weight = self.weight()?;
            self.expect(&TokenKind::Colon, "`:`")?;
            let value = self.expression()?;
            scope.insert(key, value, weight)?;
            self.eat(&TokenKind::Comma);
        }
    }

    fn array(&mut self) -> EvalResult<Scope> {
        self.bump();
        let scope = Scope::new_array();
        loop {
            if self.eat(&TokenKind::RBracket) {
                return Ok(scope);
            }
            let value = self.expression()?;
            scope.push(value)?;
            self.eat(&TokenKind::Comma);
        }
    }

    /// `a`, `"quoted"`, or a dotted compound of those.
    fn key(&mut self) -> EvalResult<KeyPath> {
        let mut path = KeyPath::new();
        path.push(Segment::Name(self.key_part("a key")?));
        while self.eat(&TokenKind::Dot) {
            if !matches!(self.peek().kind, TokenKind::Ident(_) | TokenKind::String(_)) {
                let token = self.peek();
                return Err(errors::syntax(
                    SyntaxErrorKind::MalformedKey(format!("`{path}.` followed by {}", token.kind)),
                    token.span,
                ));
            }
            path.push(Segment::Name(self.key_part("a key part")?));
        }
        Ok(path)
    }

    fn key_part(&mut self, expected: &'static str) -> EvalResult<Name> {
        let token = self.bump();
        let name = match token.kind {
            TokenKind::Ident(name) | TokenKind::String(name) => name,
            other => return Err(errors::unexpected(expected, other, token.span)),
        };
        if name.is_reserved() {
            return Err(errors::syntax(SyntaxErrorKind::ReservedKey(name), token.span));
        }
        Ok(name)
    }

    /// `?`s lower the weight by one each, `!`s raise it.
    fn weight(&mut self) -> EvalResult<i32> {
        let start = self.peek().span;
        let mut weight: i32 = 0;
        loop {
            match self.peek().kind {
                TokenKind::Question if weight <= 0 => weight = weight.saturating_sub(1),
                TokenKind::Bang if weight >= 0 => weight = weight.saturating_add(1),
                TokenKind::Question | TokenKind::Bang => {
                    return Err(errors::syntax(
                        SyntaxErrorKind::MixedWeight,
                        start.merge(self.peek().span),
                    ));
                }
                _ => return Ok(weight),
            }
            self.bump();
        }
    }

    /// `ident ('.' (ident | index | "quoted"))*`
    ///
    /// The lexer reads `a.1.2` as `a`, `.`, `1.2`; a number segment is split
    /// back into its integer parts.
    fn chain(&mut self) -> EvalResult<Value> {
        let first = self.bump();
        let mut span = first.span;
        let mut segments = match first.kind {
            TokenKind::Ident(name) => vec![Segment::Name(name)],
            other => return Err(errors::unexpected("an identifier", other, first.span)),
        };
        while self.eat(&TokenKind::Dot) {
            let token = self.bump();
            match token.kind {
                TokenKind::Ident(name) | TokenKind::String(name) => {
                    segments.push(Segment::Name(name));
                }
                TokenKind::Number(text) => push_index_segments(&mut segments, &text)?,
                other => {
                    return Err(errors::unexpected(
                        "a name or index after `.`",
                        other,
                        token.span,
                    ))
                }
            }
            span = span.merge(token.span);
        }
        Ok(Value::Chain(Chain::new(segments, span)))
    }
}

fn push_index_segments(segments: &mut Vec<Segment>, text: &str) -> EvalResult<()> {
    for part in text.split('.') {
        let index = part
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| part.parse::<usize>().ok())
            .flatten()
            .ok_or_else(|| errors::non_integer_index(text))?;
        segments.push(Segment::Index(index));
    }
    Ok(())
}

fn lambda_parameter(primary: &Value, span: Span) -> EvalResult<Name> {
    let found = match primary {
        Value::Chain(chain) => match chain.as_parameter() {
            Some(param) => return Ok(param.clone()),
            None => format!("`{chain}`"),
        },
        other => other.kind_name().to_owned(),
    };
    Err(errors::syntax(
        SyntaxErrorKind::InvalidLambdaParameter(found),
        span,
    ))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
