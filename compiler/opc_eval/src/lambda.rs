//! Lambda values.
//!
//! A lambda is either *deferred* (written in a document as `param => body`;
//! the body is resolved later in a call frame) or *immediate* (a host
//! function that runs as soon as it is called, like everything under `env`).

use std::fmt;
use std::rc::Rc;

use opc_ir::Name;

use crate::errors::EvalResult;
use crate::resolve::CallContext;
use crate::scope::Scope;
use crate::value::Value;

/// Host function behind an immediate lambda.
pub type NativeFn = Rc<dyn Fn(&mut CallContext<'_>, Value) -> EvalResult<Value>>;

pub(crate) enum Body {
    /// Stored unresolved; resolved in a fresh call frame on each call.
    Deferred(Value),
    Immediate(NativeFn),
}

pub(crate) struct LambdaBody {
    param: Name,
    body: Body,
}

/// A callable value.
///
/// Deferred lambdas stored in the tree are unbound. Resolving one out of a
/// scope binds it to that scope, which then becomes the lexical parent of
/// every call frame the lambda creates.
#[derive(Clone)]
pub struct Lambda {
    def: Rc<LambdaBody>,
    captured: Option<Scope>,
}

impl Lambda {
    pub fn deferred(param: Name, body: Value) -> Self {
        Lambda {
            def: Rc::new(LambdaBody {
                param,
                body: Body::Deferred(body),
            }),
            captured: None,
        }
    }

    pub fn immediate(
        param: &str,
        f: impl Fn(&mut CallContext<'_>, Value) -> EvalResult<Value> + 'static,
    ) -> Self {
        Lambda {
            def: Rc::new(LambdaBody {
                param: Name::new(param),
                body: Body::Immediate(Rc::new(f)),
            }),
            captured: None,
        }
    }

    pub fn param(&self) -> &Name {
        &self.def.param
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self.def.body, Body::Immediate(_))
    }

    /// Scope this lambda was resolved from, once bound.
    pub fn captured(&self) -> Option<&Scope> {
        self.captured.as_ref()
    }

    pub(crate) fn body(&self) -> &Body {
        &self.def.body
    }

    /// Bind an unbound deferred lambda to `scope`. Bound and immediate
    /// lambdas are returned unchanged.
    pub(crate) fn bind(self, scope: &Scope) -> Lambda {
        if self.captured.is_some() || self.is_immediate() {
            return self;
        }
        Lambda {
            def: self.def,
            captured: Some(scope.clone()),
        }
    }

    pub(crate) fn release_into(self, pending: &mut Vec<Value>) {
        pending.extend(self.captured.map(Value::Scope));
        if let Ok(def) = Rc::try_unwrap(self.def) {
            if let Body::Deferred(body) = def.body {
                pending.push(body);
            }
        }
    }

    /// Same definition and same binding.
    pub fn ptr_eq(&self, other: &Lambda) -> bool {
        Rc::ptr_eq(&self.def, &other.def)
            && match (&self.captured, &other.captured) {
                (Some(a), Some(b)) => a.ptr_eq(b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_immediate() {
            "immediate"
        } else {
            "deferred"
        };
        write!(f, "Lambda({} => <{kind}>)", self.param())
    }
}
