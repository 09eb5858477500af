//! `env.math`.
//!
//! Operands are blobs whose text parses as a number; results are written
//! back as text into the caller's arena. Two-operand functions are curried:
//! `env.math.pow(2)(10)`.

use opc_arena::SharedArena;

use crate::errors::{self, EvalResult};
use crate::lambda::Lambda;
use crate::scope::Scope;
use crate::value::Value;

const CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];

const UNARY: &[(&str, fn(f64) -> f64)] = &[
    ("abs", f64::abs),
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
    ("exp", f64::exp),
    ("ln", f64::ln),
    ("log2", f64::log2),
    ("log10", f64::log10),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
    ("round", f64::round),
    ("trunc", f64::trunc),
    ("neg", neg),
];

const BINARY: &[(&str, fn(f64, f64) -> f64)] = &[
    ("pow", f64::powf),
    ("min", f64::min),
    ("max", f64::max),
    ("atan2", f64::atan2),
    ("hypot", f64::hypot),
    ("log", log),
    ("add", add),
    ("sub", sub),
    ("mul", mul),
    ("div", div),
    ("rem", rem),
];

fn neg(x: f64) -> f64 {
    -x
}

/// `log(base)(x)`
fn log(base: f64, x: f64) -> f64 {
    x.log(base)
}

fn add(a: f64, b: f64) -> f64 {
    a + b
}

fn sub(a: f64, b: f64) -> f64 {
    a - b
}

fn mul(a: f64, b: f64) -> f64 {
    a * b
}

fn div(a: f64, b: f64) -> f64 {
    a / b
}

fn rem(a: f64, b: f64) -> f64 {
    a % b
}

pub(super) fn build(arena: &SharedArena) -> EvalResult<Scope> {
    let math = Scope::new();
    for &(name, value) in CONSTANTS {
        math.insert(name, arena.alloc_str(&format_number(value))?, 0)?;
    }
    for &(name, op) in UNARY {
        math.insert(name, unary(name, op), 0)?;
    }
    for &(name, op) in BINARY {
        math.insert(name, binary(name, op), 0)?;
    }
    Ok(math)
}

fn unary(name: &'static str, op: fn(f64) -> f64) -> Lambda {
    Lambda::immediate("x", move |ctx, arg| {
        let x = number_argument(name, &arg)?;
        ctx.text_value(&format_number(op(x)))
    })
}

fn binary(name: &'static str, op: fn(f64, f64) -> f64) -> Lambda {
    Lambda::immediate("a", move |_, arg| {
        let a = number_argument(name, &arg)?;
        Ok(Value::Lambda(Lambda::immediate("b", move |ctx, arg| {
            let b = number_argument(name, &arg)?;
            ctx.text_value(&format_number(op(a, b)))
        })))
    })
}

fn number_argument(function: &'static str, arg: &Value) -> EvalResult<f64> {
    let text = arg
        .text()
        .ok_or_else(|| errors::wrong_argument(function, "a number", arg.kind_name()))?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| errors::wrong_argument(function, "a number", format!("{text:?}")))
}

pub(crate) fn format_number(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
