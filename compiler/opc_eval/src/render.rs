//! JSON rendering of resolved values.
//!
//! Maps render their distinct names in order of first declaration, each
//! resolved under the weight rules. Blobs whose text is a JSON number or
//! `true`/`false`/`null` render bare; every other blob is a JSON string.
//! An empty scope renders as `[]` if it was written as an array, else `{}`.
//! Lambdas render as `"<lambda param>"` and a scope already being rendered
//! as `"<recursive>"`.

use std::fmt::Write;

use opc_arena::Blob;

use crate::errors::{self, EvalResult};
use crate::scope::Scope;
use crate::value::Value;

/// Nesting limit for rendering.
const MAX_RENDER_DEPTH: usize = 256;

/// Render `value` as indented JSON.
pub fn render(value: &Value) -> EvalResult<String> {
    let mut renderer = Renderer {
        out: String::new(),
        stack: Vec::new(),
    };
    renderer.value(value)?;
    Ok(renderer.out)
}

struct Renderer {
    out: String,
    /// Scopes currently being rendered.
    stack: Vec<usize>,
}

impl Renderer {
    fn value(&mut self, value: &Value) -> EvalResult<()> {
        match value {
            Value::Scope(scope) => self.scope(scope)?,
            Value::Blob(blob) => self.blob(blob),
            Value::Lambda(lambda) => {
                write_string(&mut self.out, &format!("<lambda {}>", lambda.param()));
            }
            other => write_string(&mut self.out, &format!("<{}>", other.kind_name())),
        }
        Ok(())
    }

    fn scope(&mut self, scope: &Scope) -> EvalResult<()> {
        if self.stack.contains(&scope.id()) {
            write_string(&mut self.out, "<recursive>");
            return Ok(());
        }
        if self.stack.len() >= MAX_RENDER_DEPTH {
            return Err(errors::depth_exceeded(MAX_RENDER_DEPTH));
        }
        self.stack.push(scope.id());
        let result = if scope.is_array() {
            self.array(scope)
        } else {
            self.object(scope)
        };
        self.stack.pop();
        result
    }

    fn object(&mut self, scope: &Scope) -> EvalResult<()> {
        let names = scope.names();
        if names.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }
        self.out.push('{');
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.newline();
            write_string(&mut self.out, &name);
            self.out.push_str(": ");
            let value = scope.get(name)?;
            self.optional(value.as_ref())?;
        }
        self.close('}');
        Ok(())
    }

    fn array(&mut self, scope: &Scope) -> EvalResult<()> {
        if scope.is_empty() {
            self.out.push_str("[]");
            return Ok(());
        }
        self.out.push('[');
        for index in 0..scope.len() {
            if index > 0 {
                self.out.push(',');
            }
            self.newline();
            let value = scope.get(index)?;
            self.optional(value.as_ref())?;
        }
        self.close(']');
        Ok(())
    }

    fn optional(&mut self, value: Option<&Value>) -> EvalResult<()> {
        match value {
            Some(value) => self.value(value),
            None => {
                self.out.push_str("null");
                Ok(())
            }
        }
    }

    fn blob(&mut self, blob: &Blob) {
        match blob.text() {
            Some(text) if is_bare_literal(&text) => self.out.push_str(&text),
            Some(text) => write_string(&mut self.out, &text),
            None => self.out.push_str("null"),
        }
    }

    /// Newline indented one level deeper than the innermost open scope.
    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.stack.len() {
            self.out.push_str("  ");
        }
    }

    /// Newline at the innermost open scope's indentation, then `close`.
    fn close(&mut self, close: char) {
        self.out.push('\n');
        for _ in 1..self.stack.len() {
            self.out.push_str("  ");
        }
        self.out.push(close);
    }
}

fn is_bare_literal(text: &str) -> bool {
    matches!(text, "true" | "false" | "null") || is_json_number(text)
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while bytes.get(*i).is_some_and(u8::is_ascii_digit) {
            *i += 1;
        }
        *i - start
    };

    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    let int_len = digits(&mut i);
    if int_len == 0 || (int_len > 1 && bytes[int_start] == b'0') {
        return false;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == bytes.len()
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
