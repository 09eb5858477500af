//! opc: a JSON-superset configuration language with lazy references,
//! weighted overrides and lambdas.
//!
//! ```text
//! let root = opc::load_from_string("{port: 80, url: this.port}", &LoadOptions::default())?;
//! assert_eq!(root.get_text("url")?.as_deref(), Some("80"));
//! ```
//!
//! The library surface is re-exported from `opc_eval`; [`commands`] holds
//! the handlers behind the `opc` binary.

use std::sync::Once;

pub mod commands;

pub use opc_eval::{
    env, errors, load_from_file, load_from_string, render, Blob, CallContext, EntryRef,
    ErrorCategory, EvalError, EvalResult, KeyPath, Lambda, LoadOptions, Scope, Segment,
    SharedArena, Value, DEFAULT_QUOTA,
};

static TRACING_INIT: Once = Once::new();

/// Install a global tracing subscriber, once per process.
///
/// With `tree`, spans are printed as an indented call tree (default filter
/// `debug`). Otherwise a flat formatter is installed only when `RUST_LOG` is
/// set. Output goes to stderr so rendered documents stay clean on stdout.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if tree {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
