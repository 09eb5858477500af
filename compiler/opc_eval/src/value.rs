//! Values stored in and produced by the scope tree.
//!
//! A stored value may still be unresolved (`Chain`, `Call`). Resolution only
//! ever hands back `Scope`, `Blob` or `Lambda`.

use std::fmt;
use std::rc::Rc;

use opc_arena::Blob;
use opc_ir::{Name, Span};
use smallvec::SmallVec;

use crate::lambda::Lambda;
use crate::scope::Scope;

/// One step of a lookup path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Name(Name),
    Index(usize),
}

impl Segment {
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Segment::Name(name) => Some(name),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => write!(f, "{name:?}"),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Segment::Name(Name::new(name))
    }
}

impl From<Name> for Segment {
    fn from(name: Name) -> Self {
        Segment::Name(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Key accepted by `get` and `insert`: a name, an index, or a sequence of them.
///
/// `From<&str>` never splits on dots; use [`KeyPath::parse_dotted`] for the
/// `a.b.0` form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyPath(SmallVec<[Segment; 4]>);

impl KeyPath {
    pub fn new() -> Self {
        KeyPath(SmallVec::new())
    }

    /// Split `a.b.0` into segments; all-digit parts become indices.
    ///
    /// An empty string yields an empty path.
    pub fn parse_dotted(text: &str) -> Self {
        if text.is_empty() {
            return KeyPath::new();
        }
        text.split('.')
            .map(|part| match part.parse::<usize>() {
                Ok(index) if part.bytes().all(|b| b.is_ascii_digit()) => Segment::Index(index),
                _ => Segment::Name(Name::new(part)),
            })
            .collect()
    }

    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<Segment> for KeyPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        KeyPath(iter.into_iter().collect())
    }
}

impl From<&str> for KeyPath {
    fn from(name: &str) -> Self {
        KeyPath(smallvec::smallvec![Segment::from(name)])
    }
}

impl From<Name> for KeyPath {
    fn from(name: Name) -> Self {
        KeyPath(smallvec::smallvec![Segment::Name(name)])
    }
}

impl From<usize> for KeyPath {
    fn from(index: usize) -> Self {
        KeyPath(smallvec::smallvec![Segment::Index(index)])
    }
}

impl From<Segment> for KeyPath {
    fn from(segment: Segment) -> Self {
        KeyPath(smallvec::smallvec![segment])
    }
}

impl From<&[Segment]> for KeyPath {
    fn from(segments: &[Segment]) -> Self {
        KeyPath(segments.iter().cloned().collect())
    }
}

impl From<Vec<Segment>> for KeyPath {
    fn from(segments: Vec<Segment>) -> Self {
        KeyPath(SmallVec::from_vec(segments))
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().map(Segment::from).collect()
    }
}

impl<const N: usize> From<[Segment; N]> for KeyPath {
    fn from(segments: [Segment; N]) -> Self {
        segments.into_iter().collect()
    }
}

/// An unresolved identifier chain such as `this.a.0`.
#[derive(Clone)]
pub struct Chain {
    segments: Rc<[Segment]>,
    span: Span,
}

impl Chain {
    pub fn new(segments: Vec<Segment>, span: Span) -> Self {
        Chain {
            segments: segments.into(),
            span,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The lone parameter name if this chain is a single ordinary identifier.
    pub(crate) fn as_parameter(&self) -> Option<&Name> {
        match &*self.segments {
            [Segment::Name(name)] if !name.is_reserved() => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// A `callee(arg)` site awaiting resolution.
pub struct CallSite {
    pub callee: Value,
    pub arg: Value,
    pub span: Span,
}

/// A node value.
#[derive(Clone)]
pub enum Value {
    Scope(Scope),
    Blob(Blob),
    Lambda(Lambda),
    Chain(Chain),
    Call(Rc<CallSite>),
}

impl Value {
    /// Short description used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Scope(scope) if scope.is_array() => "array",
            Value::Scope(_) => "scope",
            Value::Blob(_) => "blob",
            Value::Lambda(_) => "lambda",
            Value::Chain(_) => "identifier chain",
            Value::Call(_) => "call",
        }
    }

    /// Whether resolution has nothing left to do for this value.
    /// Drop this value, moving anything it solely owns that may nest
    /// (scope entries, call operands, lambda bodies) into `pending`.
    pub(crate) fn release_into(self, pending: &mut Vec<Value>) {
        match self {
            Value::Scope(scope) => scope.release_into(pending),
            Value::Lambda(lambda) => lambda.release_into(pending),
            Value::Call(site) => {
                if let Ok(site) = Rc::try_unwrap(site) {
                    pending.push(site.callee);
                    pending.push(site.arg);
                }
            }
            Value::Blob(_) | Value::Chain(_) => {}
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Value::Scope(_) | Value::Blob(_) | Value::Lambda(_))
    }

    pub fn as_scope(&self) -> Option<&Scope> {
        match self {
            Value::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Value::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self {
            Value::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    /// Text of a blob value.
    pub fn text(&self) -> Option<String> {
        self.as_blob().and_then(Blob::text)
    }
}

impl From<Scope> for Value {
    fn from(scope: Scope) -> Self {
        Value::Scope(scope)
    }
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        Value::Blob(blob)
    }
}

impl From<Lambda> for Value {
    fn from(lambda: Lambda) -> Self {
        Value::Lambda(lambda)
    }
}

/// Scopes and lambdas compare by identity, blobs by content.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Scope(a), Value::Scope(b)) => a.ptr_eq(b),
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => a.ptr_eq(b),
            (Value::Chain(a), Value::Chain(b)) => a.segments == b.segments,
            (Value::Call(a), Value::Call(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scope(scope) => write!(f, "{scope:?}"),
            Value::Blob(blob) => match blob.text() {
                Some(text) => write!(f, "Blob({text:?})"),
                None => f.write_str("Blob(<empty>)"),
            },
            Value::Lambda(lambda) => write!(f, "{lambda:?}"),
            Value::Chain(chain) => write!(f, "Chain({chain})"),
            Value::Call(site) => write!(f, "Call({:?}({:?}))", site.callee, site.arg),
        }
    }
}

#[cfg(test)]
mod tests;
