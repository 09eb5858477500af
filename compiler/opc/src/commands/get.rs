//! The `get` command: load a document, resolve a path, print JSON.

use opc_eval::{render, KeyPath};

use super::{load_document, CliError, CliOptions};

/// Resolve `options.path` (or the whole document) in `file` and render it.
#[tracing::instrument(level = "debug", skip(options))]
pub fn get_file(file: &str, options: &CliOptions) -> Result<String, CliError> {
    let root = load_document(file, options)?;
    let path = options
        .path
        .as_deref()
        .map(KeyPath::parse_dotted)
        .unwrap_or_default();

    let value = root
        .get(path)
        .map_err(|e| CliError::eval(file, None, e))?
        .ok_or_else(|| CliError::Missing {
            file: file.to_owned(),
            path: options.path.clone().unwrap_or_default(),
        })?;
    render(&value).map_err(|e| CliError::eval(file, None, e))
}
