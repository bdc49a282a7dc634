mod common;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result, ensure};

use common::{buffered_runtime, collect_ints, ints, text};
use pyrt::{BuiltinFunction, Runtime};

#[test]
fn every_builtin_is_a_global_function() -> Result<()> {
    let mut rt = Runtime::new();
    for builtin in BuiltinFunction::ALL {
        let function = rt
            .global_get(builtin.name())
            .with_context(|| format!("{} is not bound", builtin.name()))?;
        ensure!(rt.is_callable(function), "{} is not callable", builtin.name());
        ensure!(rt.repr(function)? == format!("<function {}>", builtin.name()));
    }
    Ok(())
}

#[test]
fn print_and_input_use_the_console() -> Result<()> {
    let (mut rt, console) = buffered_runtime(&["Ada"]);
    let prompt = rt.new_str("name? ");
    let answer = rt.call_global("input", &[prompt])?;
    ensure!(text(&rt, answer)? == "Ada");
    ensure!(console.flushes() == 1, "prompt is flushed before reading");

    let greeting = rt.new_str("hello");
    let items = ints(&mut rt, &[1, 2]);
    let pair = rt.new_tuple(items);
    rt.call_global("print", &[greeting, answer, pair])?;
    let none = rt.none();
    rt.call_global("raw_print", &[none])?;
    ensure!(console.output() == "name? hello Ada (1, 2)\nNone", "got {:?}", console.output());

    let error = rt.call_global("input", &[]).expect_err("input exhausted");
    ensure!(rt.is_exception(&error, rt.types().value_error));
    Ok(())
}

#[test]
fn getattr_falls_back_to_the_default() -> Result<()> {
    let mut rt = Runtime::new();
    let shape = rt.define_type("Shape", None, &[])?;
    let square = rt.call(shape, &[])?;
    let (name, four) = (rt.new_str("sides"), rt.new_int(4));

    let error = rt.call_global("getattr", &[square, name]).expect_err("missing");
    ensure!(error.to_string() == "AttributeError: sides");
    let zero = rt.new_int(0);
    ensure!(rt.call_global("getattr", &[square, name, zero])? == zero);

    rt.call_global("setattr", &[square, name, four])?;
    ensure!(rt.call_global("getattr", &[square, name])? == four);
    let truth = rt.call_global("isinstance", &[square, shape])?;
    ensure!(truth == rt.true_value());
    Ok(())
}

#[test]
fn map_is_lazy() -> Result<()> {
    let mut rt = Runtime::new();
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let double = rt.new_function("double", move |rt, args| {
        seen.set(seen.get() + 1);
        let value = rt.int_value(args[0]).unwrap_or_default();
        Ok(rt.new_int(value * 2))
    });
    let items = ints(&mut rt, &[1, 2, 3]);
    let numbers = rt.new_tuple(items);
    let mapped = rt.call_global("map", &[double, numbers])?;
    ensure!(calls.get() == 0, "nothing runs before the first next()");
    ensure!(collect_ints(&mut rt, mapped)? == [2, 4, 6]);
    ensure!(calls.get() == 3);
    Ok(())
}

#[test]
fn iter_with_sentinel_stops_at_the_sentinel() -> Result<()> {
    let mut rt = Runtime::new();
    let counter = Rc::new(Cell::new(0));
    let count = rt.new_function("count", move |rt, _args| {
        counter.set(counter.get() + 1);
        Ok(rt.new_int(counter.get()))
    });
    let sentinel = rt.new_int(4);
    let iterator = rt.call_global("iter", &[count, sentinel])?;
    ensure!(collect_ints(&mut rt, iterator)? == [1, 2, 3]);
    let fallback = rt.new_str("done");
    ensure!(rt.call_global("next", &[iterator, fallback])? == fallback);
    Ok(())
}

#[test]
fn all_any_divmod_pow_and_len() -> Result<()> {
    let mut rt = Runtime::new();
    let items = ints(&mut rt, &[1, 0, 2]);
    let mixed = rt.new_tuple(items);
    ensure!(rt.call_global("all", &[mixed])? == rt.false_value());
    ensure!(rt.call_global("any", &[mixed])? == rt.true_value());
    let empty = rt.new_tuple(vec![]);
    ensure!(rt.call_global("all", &[empty])? == rt.true_value());
    ensure!(rt.call_global("any", &[empty])? == rt.false_value());

    let (seven, minus_two) = (rt.new_int(7), rt.new_int(-2));
    let pair = rt.call_global("divmod", &[seven, minus_two])?;
    ensure!(rt.repr(pair)? == "(-4, -1)");
    let (two, ten) = (rt.new_int(2), rt.new_int(10));
    let power = rt.call_global("pow", &[two, ten])?;
    ensure!(rt.int_value(power) == Some(1024));
    let length = rt.call_global("len", &[mixed])?;
    ensure!(rt.int_value(length) == Some(3));

    let first = rt.call_global("id", &[mixed])?;
    let second = rt.call_global("id", &[mixed])?;
    ensure!(rt.values_equal(first, second)?, "id is stable");
    Ok(())
}

#[test]
fn builtins_check_their_arity() -> Result<()> {
    let mut rt = Runtime::new();
    let error = rt.call_global("len", &[]).expect_err("no arguments");
    ensure!(error.to_string() == "TypeError: `len` expected 1 arguments, got 0");
    Ok(())
}
