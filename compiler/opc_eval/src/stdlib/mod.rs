//! The `env` standard library.
//!
//! `env` is one immutable scope per thread, built on first use. Everything in
//! it is an immediate lambda or a constant:
//!
//! - `loadf(path)`: build another document as a scope inside the caller
//! - `rawf(path)`: file bytes as a blob
//! - `include(scope)`: instantiate a scope's entries inside the caller
//! - `math`: numeric constants and functions, see [`math`]

mod math;

use std::fs;
use std::path::PathBuf;

use opc_arena::SharedArena;

use crate::errors::{self, EvalResult};
use crate::lambda::Lambda;
use crate::loader;
use crate::resolve::CallContext;
use crate::scope::Scope;
use crate::value::Value;

/// Arena size for the constants held by `env` itself.
const ENV_QUOTA: usize = 64 * 1024;

thread_local! {
    static ENV: EvalResult<Scope> = build_env();
}

/// The standard library scope for the current thread.
pub fn env() -> EvalResult<Scope> {
    ENV.with(Clone::clone)
}

fn build_env() -> EvalResult<Scope> {
    let arena = SharedArena::new(ENV_QUOTA);
    let env = Scope::with_arena(arena.clone());
    env.insert("loadf", Lambda::immediate("path", loadf), 0)?;
    env.insert("rawf", Lambda::immediate("path", rawf), 0)?;
    env.insert("include", Lambda::immediate("scope", include), 0)?;
    env.insert("math", math::build(&arena)?, 0)?;
    tracing::debug!(used = arena.used(), "built standard library");
    Ok(env)
}

fn loadf(ctx: &mut CallContext<'_>, arg: Value) -> EvalResult<Value> {
    let path = file_argument(ctx, "loadf", &arg)?;
    tracing::debug!(path = %path.display(), "loading document");
    let text = fs::read_to_string(&path).map_err(|e| errors::io_error(&path, &e))?;
    let arena = ctx.arena()?;
    let root = loader::build_document(&text, &arena, ctx.deadline())?;
    root.set_origin(path);
    root.attach_transient(ctx.this());
    Ok(Value::Scope(root))
}

fn rawf(ctx: &mut CallContext<'_>, arg: Value) -> EvalResult<Value> {
    let path = file_argument(ctx, "rawf", &arg)?;
    tracing::debug!(path = %path.display(), "reading raw file");
    let bytes = fs::read(&path).map_err(|e| errors::io_error(&path, &e))?;
    Ok(Value::Blob(ctx.arena()?.alloc(&bytes)?))
}

fn include(ctx: &mut CallContext<'_>, arg: Value) -> EvalResult<Value> {
    match arg {
        Value::Scope(scope) => Ok(Value::Scope(scope.instantiate(ctx.this()))),
        other => Err(errors::wrong_argument(
            "include",
            "a scope",
            other.kind_name(),
        )),
    }
}

fn file_argument(ctx: &CallContext<'_>, function: &'static str, arg: &Value) -> EvalResult<PathBuf> {
    let text = arg
        .text()
        .ok_or_else(|| errors::wrong_argument(function, "a path string", arg.kind_name()))?;
    Ok(ctx.base_dir().join(text))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
