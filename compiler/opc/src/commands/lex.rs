//! The `lex` command: dump the token stream.

use std::fmt::Write;

use opc_eval::EvalError;
use opc_ir::line_col;

use super::{read_source, CliError};

/// Lex `file` and list its tokens with line and column.
pub fn lex_file(file: &str) -> Result<String, CliError> {
    let source = read_source(file)?;
    let tokens = opc_lexer::lex(&source)
        .map_err(|e| CliError::eval(file, Some(&source), EvalError::from(e)))?;

    let mut out = format!("Tokens for '{file}' ({} tokens):", tokens.len());
    for token in &tokens {
        let (line, column) = line_col(&source, token.span.start);
        let _ = write!(out, "\n  {line:>4}:{column:<3} {}", token.kind);
    }
    Ok(out)
}
