//! Flag parsing shared by `get` and `check`.

use std::time::Duration;

use opc_eval::LoadOptions;

use super::CliError;

/// Flags and positional arguments after `<file>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Dotted lookup path; `None` selects the whole document.
    pub path: Option<String>,
    pub load: LoadOptions,
    pub trace_tree: bool,
}

/// Parse `[path] [--timeout=<ms>] [--quota=<bytes>] [--trace-tree]`.
pub fn parse_options(args: &[String]) -> Result<CliOptions, CliError> {
    let mut options = CliOptions::default();
    for arg in args {
        if let Some(ms) = arg.strip_prefix("--timeout=") {
            let ms = parse_number("--timeout", ms)?;
            options.load = options.load.with_timeout(Duration::from_millis(ms));
        } else if let Some(bytes) = arg.strip_prefix("--quota=") {
            let bytes = parse_number("--quota", bytes)?;
            let bytes = usize::try_from(bytes)
                .map_err(|_| CliError::Usage(format!("--quota value {bytes} is too large")))?;
            options.load = options.load.with_quota(bytes);
        } else if arg == "--trace-tree" {
            options.trace_tree = true;
        } else if arg.starts_with("--") {
            return Err(CliError::Usage(format!("unknown option `{arg}`")));
        } else if options.path.is_none() {
            options.path = Some(arg.clone());
        } else {
            return Err(CliError::Usage(format!("unexpected argument `{arg}`")));
        }
    }
    Ok(options)
}

fn parse_number(flag: &str, value: &str) -> Result<u64, CliError> {
    value
        .parse()
        .map_err(|_| CliError::Usage(format!("{flag} expects a non-negative integer, got `{value}`")))
}
