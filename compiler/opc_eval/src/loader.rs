//! Document loading.

use std::fs;
use std::path::Path;
use std::time::Duration;

use opc_arena::SharedArena;

use crate::builder;
use crate::deadline::Deadline;
use crate::errors::{self, EvalResult};
use crate::scope::{Document, Scope};

/// Blob quota used when none is configured (64 MiB).
pub const DEFAULT_QUOTA: usize = 64 * 1024 * 1024;

/// Limits applied to a loaded document.
///
/// The timeout bounds building and, separately, each later `get` on the
/// document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    pub timeout: Option<Duration>,
    pub quota: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            timeout: None,
            quota: DEFAULT_QUOTA,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        LoadOptions::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }
}

/// Build a document from source text.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = text.len()))]
pub fn load_from_string(text: &str, options: &LoadOptions) -> EvalResult<Scope> {
    let arena = SharedArena::new(options.quota);
    let deadline = options.timeout.map(Deadline::after);
    let root = build_document(text, &arena, deadline)?;
    tracing::debug!(
        entries = root.len(),
        used = arena.used(),
        quota = arena.quota(),
        "document built"
    );
    root.attach_document(Document {
        arena,
        timeout: options.timeout,
    });
    Ok(root)
}

/// Read and build a document from a file.
///
/// Relative paths given to `env.loadf` and `env.rawf` inside it resolve
/// against the file's directory.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_from_file(path: impl AsRef<Path>, options: &LoadOptions) -> EvalResult<Scope> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| errors::io_error(path, &e))?;
    let root = load_from_string(&text, options)?;
    root.set_origin(path.to_path_buf());
    Ok(root)
}

/// Lex and build `text` into a detached root whose literals live in `arena`.
pub(crate) fn build_document(
    text: &str,
    arena: &SharedArena,
    deadline: Option<Deadline>,
) -> EvalResult<Scope> {
    let tokens = opc_lexer::lex(text)?;
    tracing::trace!(tokens = tokens.len(), "lexed");
    if let Some(deadline) = &deadline {
        deadline.check()?;
    }
    builder::build(&tokens, arena, deadline)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
