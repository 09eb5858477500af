//! What a host function sees when it is called.

use std::path::PathBuf;

use opc_arena::SharedArena;

use super::Resolver;
use crate::deadline::Deadline;
use crate::errors::{self, EvalResult};
use crate::scope::Scope;
use crate::value::Value;

/// Calling context handed to immediate lambdas.
pub struct CallContext<'r> {
    resolver: &'r mut Resolver,
    this: Scope,
}

impl<'r> CallContext<'r> {
    pub(crate) fn new(resolver: &'r mut Resolver, this: Scope) -> Self {
        CallContext { resolver, this }
    }

    /// The scope the call was made from.
    pub fn this(&self) -> &Scope {
        &self.this
    }

    /// Arena of the calling document.
    pub fn arena(&self) -> EvalResult<SharedArena> {
        self.this.arena().ok_or_else(errors::no_arena)
    }

    /// Allocate `text` as a blob in the calling document's arena.
    pub fn text_value(&self, text: &str) -> EvalResult<Value> {
        Ok(Value::Blob(self.arena()?.alloc_str(text)?))
    }

    /// Resolve a value as seen from the calling scope.
    pub fn resolve(&mut self, value: Value) -> EvalResult<Option<Value>> {
        let this = &self.this;
        self.resolver.nested(|r| r.resolve_value(this, value))
    }

    /// Directory relative paths are read from: that of the nearest enclosing
    /// document loaded from a file, else the working directory.
    pub fn base_dir(&self) -> PathBuf {
        self.this
            .ancestors()
            .find_map(|scope| scope.origin())
            .and_then(|origin| origin.parent().map(std::path::Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    pub(crate) fn deadline(&self) -> Option<Deadline> {
        self.resolver.deadline()
    }
}
