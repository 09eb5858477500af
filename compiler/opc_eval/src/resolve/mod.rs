//! On-demand resolution of stored values.
//!
//! A `Resolver` lives for one top-level `get`. It carries the set of
//! (scope, key) pairs currently being resolved, the nesting depth, and the
//! document deadline. Re-entering an active pair is a cycle; exceeding the
//! depth ceiling or the deadline is a resource error.
//!
//! Deferred lambda calls run in a trampoline: when a lambda body is itself a
//! call, the loop continues with the new callee instead of recursing, so
//! long chains of call-returning-calls use constant native stack. The loop
//! gives up after [`MAX_CALLS`] iterations, so a lambda that calls itself
//! forever is reported even without a timeout.

mod context;
mod guard;

use rustc_hash::FxHashSet;

use opc_stack::ensure_sufficient_stack;

use crate::deadline::Deadline;
use crate::errors::{self, EvalResult};
use crate::lambda::Body;
use crate::scope::Scope;
use crate::stdlib;
use crate::value::{CallSite, Chain, Segment, Value};

pub use context::CallContext;

/// Maximum nesting of in-progress lookups.
pub const MAX_DEPTH: usize = 4096;

/// Maximum number of calls one trampoline runs before giving up.
pub const MAX_CALLS: usize = 100_000;

pub(crate) struct Resolver {
    active: FxHashSet<(usize, Segment)>,
    depth: usize,
    deadline: Option<Deadline>,
}

impl Resolver {
    /// A resolver honoring the timeout of the document `scope` belongs to.
    pub(crate) fn new(scope: &Scope) -> Self {
        let deadline = scope
            .document()
            .and_then(|doc| doc.timeout)
            .map(Deadline::after);
        Resolver {
            active: FxHashSet::default(),
            depth: 0,
            deadline,
        }
    }

    pub(crate) fn deadline(&self) -> Option<Deadline> {
        self.deadline
    }

    fn check_deadline(&self) -> EvalResult<()> {
        match &self.deadline {
            Some(deadline) => deadline.check(),
            None => Ok(()),
        }
    }

    /// Resolve `path` starting at `scope`. The first segment is looked up in
    /// `scope` itself, not lexically.
    pub(crate) fn get(&mut self, scope: &Scope, path: &[Segment]) -> EvalResult<Option<Value>> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(Some(Value::Scope(scope.clone())));
        };
        match self.get_segment(scope, first)? {
            Some(value) => self.descend(value, rest),
            None => Ok(None),
        }
    }

    /// Resolve one segment against one scope.
    pub(crate) fn get_segment(
        &mut self,
        scope: &Scope,
        segment: &Segment,
    ) -> EvalResult<Option<Value>> {
        self.check_deadline()?;
        let stored = match segment {
            Segment::Name(name) => match name.as_str() {
                "this" => return Ok(Some(Value::Scope(scope.clone()))),
                "parent" => return Ok(scope.parent().map(Value::Scope)),
                "global" => return Ok(Some(Value::Scope(scope.root()))),
                "env" => return stdlib::env().map(|env| Some(Value::Scope(env))),
                _ => scope.select(name)?,
            },
            Segment::Index(index) => scope.raw_at(*index),
        };
        let Some(stored) = stored else {
            return Ok(None);
        };
        if stored.is_resolved() {
            return self.resolve_value(scope, stored);
        }

        tracing::trace!(%segment, scope = scope.id(), "resolving");
        let mut guard = self.enter(scope, segment)?;
        ensure_sufficient_stack(|| guard.resolve_value(scope, stored))
    }

    /// Walk the remaining segments of a path from an already resolved value.
    pub(crate) fn descend(&mut self, mut value: Value, rest: &[Segment]) -> EvalResult<Option<Value>> {
        for segment in rest {
            let next = match &value {
                Value::Scope(scope) => self.get_segment(scope, segment)?,
                other => return Err(errors::not_indexable(segment, other.kind_name())),
            };
            match next {
                Some(next) => value = next,
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    /// Turn a stored value into a resolved one, as seen from `scope`.
    pub(crate) fn resolve_value(&mut self, scope: &Scope, value: Value) -> EvalResult<Option<Value>> {
        match value {
            Value::Scope(_) | Value::Blob(_) => Ok(Some(value)),
            Value::Lambda(lambda) => Ok(Some(Value::Lambda(lambda.bind(scope)))),
            Value::Chain(chain) => self.resolve_chain(scope, &chain),
            Value::Call(site) => self.resolve_call(scope, &site),
        }
    }

    /// The head of a chain is found lexically: the nearest scope, starting at
    /// `start`, that has any entry of that name. Reserved heads and indices
    /// apply to `start` directly.
    fn resolve_chain(&mut self, start: &Scope, chain: &Chain) -> EvalResult<Option<Value>> {
        let Some((first, rest)) = chain.segments().split_first() else {
            return Ok(Some(Value::Scope(start.clone())));
        };
        let head = match first {
            Segment::Name(name) if !name.is_reserved() => {
                match start.ancestors().find(|scope| scope.has_name(name)) {
                    Some(owner) => self.get_segment(&owner, first)?,
                    None => None,
                }
            }
            _ => self.get_segment(start, first)?,
        };
        match head {
            Some(value) => self.descend(value, rest),
            None => Ok(None),
        }
    }

    fn resolve_call(&mut self, scope: &Scope, site: &CallSite) -> EvalResult<Option<Value>> {
        let mut this = scope.clone();
        let mut callee = site.callee.clone();
        let mut arg = site.arg.clone();

        for _ in 0..MAX_CALLS {
            self.check_deadline()?;

            let lambda = match self.nested(|r| r.resolve_value(&this, callee.clone()))? {
                Some(Value::Lambda(lambda)) => lambda,
                Some(other) => return Err(errors::not_callable(other.kind_name())),
                None => return Err(errors::unresolved(describe_callee(&callee))),
            };
            let param = lambda.param().clone();
            let Some(arg_value) = self.nested(|r| r.resolve_value(&this, arg))? else {
                return Err(errors::missing_argument(&param));
            };

            match lambda.body() {
                Body::Immediate(native) => {
                    tracing::debug!(%param, "calling host function");
                    let native = native.clone();
                    let mut ctx = CallContext::new(self, this);
                    return native(&mut ctx, arg_value).map(Some);
                }
                Body::Deferred(body) => {
                    tracing::trace!(%param, "entering call frame");
                    let frame = Scope::frame(lambda.captured(), param, arg_value);
                    match body {
                        Value::Call(next) => {
                            callee = next.callee.clone();
                            arg = next.arg.clone();
                            this = frame;
                        }
                        Value::Scope(template) => {
                            return Ok(Some(Value::Scope(template.instantiate(&frame))));
                        }
                        other => return self.resolve_value(&frame, other.clone()),
                    }
                }
            }
        }
        Err(errors::call_limit(MAX_CALLS))
    }
}

fn describe_callee(callee: &Value) -> String {
    match callee {
        Value::Chain(chain) => chain.to_string(),
        other => other.kind_name().to_owned(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
