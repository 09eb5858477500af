//! Command handlers for the `opc` CLI.
//!
//! Each handler returns the text to print on success; `main` prints it or
//! reports the error and exits with status 1.

mod check;
mod get;
mod lex;
mod options;

use std::fmt;

use opc_eval::{EvalError, Scope};
use opc_ir::line_col;

pub use check::check_file;
pub use get::get_file;
pub use lex::lex_file;
pub use options::{parse_options, CliOptions};

/// A failed command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{file}{location}: {error}")]
    Eval {
        file: String,
        location: Location,
        error: EvalError,
    },
    #[error("`{path}` not found in {file}")]
    Missing { file: String, path: String },
}

impl CliError {
    /// Attach `file`, and a line/column for syntax errors.
    pub(crate) fn eval(file: &str, source: Option<&str>, error: EvalError) -> Self {
        let location = match (source, error.span()) {
            (Some(source), Some(span)) => {
                let (line, column) = line_col(source, span.start);
                Location(Some((line, column)))
            }
            _ => Location(None),
        };
        CliError::Eval {
            file: file.to_owned(),
            location,
            error,
        }
    }
}

/// Optional `:line:column` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location(Option<(usize, usize)>);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some((line, column)) => write!(f, ":{line}:{column}"),
            None => Ok(()),
        }
    }
}

/// Load `file` as a document, locating syntax errors in its text.
pub(crate) fn load_document(file: &str, options: &CliOptions) -> Result<Scope, CliError> {
    tracing::debug!(file, "loading");
    opc_eval::load_from_file(file, &options.load).map_err(|error| {
        let source = error
            .span()
            .and_then(|_| std::fs::read_to_string(file).ok());
        CliError::eval(file, source.as_deref(), error)
    })
}

/// Read a source file for commands that need its text.
pub(crate) fn read_source(file: &str) -> Result<String, CliError> {
    std::fs::read_to_string(file)
        .map_err(|e| CliError::eval(file, None, opc_eval::errors::io_error(file, &e)))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
