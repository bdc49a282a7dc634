#![allow(dead_code)]
use anyhow::{Context, Result};

use pyrt::{BufferConsole, Runtime, Value};

/// A runtime whose console output is captured and whose input is scripted.
pub fn buffered_runtime(input: &[&str]) -> (Runtime, BufferConsole) {
    let console = BufferConsole::with_input(input.iter().copied());
    let rt = Runtime::with_console(Box::new(console.clone()));
    (rt, console)
}

pub fn ints(rt: &mut Runtime, values: &[i64]) -> Vec<Value> {
    values.iter().map(|&value| rt.new_int(value)).collect()
}

pub fn text(rt: &Runtime, value: Value) -> Result<String> {
    let text = rt
        .str_value(value)
        .with_context(|| format!("expected a str, got {}", rt.type_name(value)))?;
    Ok(text.to_string())
}

/// Drains `iterable` and reads every item back as an int.
pub fn collect_ints(rt: &mut Runtime, iterable: Value) -> Result<Vec<i64>> {
    let items = rt.collect(iterable).context("iterate")?;
    items
        .into_iter()
        .map(|item| {
            rt.int_value(item)
                .with_context(|| format!("expected an int, got {}", rt.type_name(item)))
        })
        .collect()
}

/// A type whose only member is a method returning the fixed text `reply`.
pub fn type_with_reply(
    rt: &mut Runtime,
    name: &str,
    base: Option<Value>,
    method: &str,
    reply: &'static str,
) -> Result<Value> {
    let qualified = format!("{name}.{method}");
    let function = rt.new_function(&qualified, move |rt, _args| Ok(rt.new_str(reply)));
    Ok(rt.define_type(name, base, &[(method, function)])?)
}
