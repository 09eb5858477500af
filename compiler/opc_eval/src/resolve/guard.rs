//! RAII marker for lookups in progress.
//!
//! [`Resolver::enter`] records a (scope, key) pair as active and returns a
//! guard that derefs to the resolver. Dropping the guard clears the pair and
//! the depth it added, on success, error and unwinding alike.
//!
//! [`Resolver::nested`] accounts depth for recursion that is not tied to a
//! key, such as a call argument that is itself a call.

use std::ops::{Deref, DerefMut};

use opc_stack::ensure_sufficient_stack;

use super::{Resolver, MAX_DEPTH};
use crate::errors::{self, EvalResult};
use crate::scope::Scope;
use crate::value::Segment;

pub(crate) struct ResolvingGuard<'r> {
    resolver: &'r mut Resolver,
    key: (usize, Segment),
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        self.resolver.active.remove(&self.key);
        self.resolver.depth -= 1;
    }
}

impl Deref for ResolvingGuard<'_> {
    type Target = Resolver;

    fn deref(&self) -> &Self::Target {
        self.resolver
    }
}

impl DerefMut for ResolvingGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resolver
    }
}

impl Resolver {
    /// Mark `segment` of `scope` as being resolved.
    ///
    /// Fails with a cycle error if it already is, or with a resource error
    /// past [`MAX_DEPTH`].
    pub(crate) fn enter(
        &mut self,
        scope: &Scope,
        segment: &Segment,
    ) -> EvalResult<ResolvingGuard<'_>> {
        if self.depth >= MAX_DEPTH {
            return Err(errors::depth_exceeded(MAX_DEPTH));
        }
        let key = (scope.id(), segment.clone());
        if !self.active.insert(key.clone()) {
            tracing::debug!(%segment, "cycle detected");
            return Err(errors::cycle(segment));
        }
        self.depth += 1;
        Ok(ResolvingGuard {
            resolver: self,
            key,
        })
    }

    /// Run `f` one level deeper, failing past [`MAX_DEPTH`].
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Resolver) -> EvalResult<T>,
    ) -> EvalResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(errors::depth_exceeded(MAX_DEPTH));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| f(self));
        self.depth -= 1;
        result
    }
}
