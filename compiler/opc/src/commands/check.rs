//! The `check` command: lex and build a document without resolving it.

use super::{load_document, CliError, CliOptions};

/// Build `file` and summarize its top level.
pub fn check_file(file: &str, options: &CliOptions) -> Result<String, CliError> {
    let root = load_document(file, options)?;
    let kind = if root.is_array() { "array" } else { "scope" };
    let used = root.arena().map_or(0, |arena| arena.used());
    Ok(format!(
        "{file}: ok ({} top-level entries in {kind}, {used} blob bytes)",
        root.len()
    ))
}
