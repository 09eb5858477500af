//! Stack growth guard for deep recursion.
//!
//! Nested documents, long identifier chains and lambda bodies that resolve
//! through other lambdas all recurse on the native stack. The tree builder and
//! the resolver wrap their recursive steps in [`ensure_sufficient_stack`] so a
//! deep but finite document grows the stack instead of overflowing it. Genuine
//! runaway recursion is stopped separately by the resolver's depth ceiling.
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: plain call.

/// Remaining stack below which we grow (128KB red zone).
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn resolve(&mut self, scope: &Scope, path: &[Segment]) -> EvalResult<Option<Value>> {
///     ensure_sufficient_stack(|| {
///         // ... may call resolve() again ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
