mod common;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result, ensure};

use common::{collect_ints, ints, text};
use pyrt::{BinaryOp, ExceptionKind, Resume, Runtime};

#[test]
fn exhausted_generators_never_resume() -> Result<()> {
    let mut rt = Runtime::new();
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    let generator = rt.new_native_generator(move |rt| {
        counter.set(counter.get() + 1);
        Ok(match counter.get() {
            1 => Resume::Yield(rt.new_int(10)),
            _ => Resume::Complete(Some(rt.new_str("done"))),
        })
    });

    let first = rt.next(generator)?;
    ensure!(rt.int_value(first) == Some(10));
    let finished = rt.next(generator).expect_err("exhausted");
    ensure!(rt.is_stop_iteration(&finished));
    let value = rt.get_attribute(finished.exception().context("raised")?, "value")?;
    ensure!(text(&rt, value)? == "done", "final value travels with StopIteration");
    ensure!(runs.get() == 2);

    for _ in 0..3 {
        let again = rt.next(generator).expect_err("still exhausted");
        ensure!(rt.is_stop_iteration(&again));
        ensure!(rt.exception_args(again.exception().context("raised")?).is_empty());
    }
    ensure!(runs.get() == 2, "the computation never re-ran");
    ensure!(rt.iter(generator)? == generator, "generators are their own iterators");
    Ok(())
}

#[test]
fn failing_generator_stops_and_propagates() -> Result<()> {
    let mut rt = Runtime::new();
    let generator = rt.new_native_generator(|rt| Err(rt.value_error("boom")));
    let error = rt.next(generator).expect_err("computation fails");
    ensure!(error.to_string() == "ValueError: boom");
    ensure!(rt.generator_result(generator) == Some(None), "stopped without a value");
    let error = rt.next(generator).expect_err("stopped");
    ensure!(rt.is_stop_iteration(&error));
    Ok(())
}

#[test]
fn mapping_round_trips_in_insertion_order() -> Result<()> {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    let keys = ["zeta", "alpha", "mid"];
    for (position, key) in keys.iter().enumerate() {
        let (key, value) = (rt.new_str(key), rt.new_int(position as i64));
        rt.dict_set(dict, key, value)?;
    }
    for (position, key) in keys.iter().enumerate() {
        let key = rt.new_str(key);
        let found = rt.dict_get(dict, key)?.context("key present")?;
        ensure!(rt.int_value(found) == Some(position as i64));
    }

    let mut order = Vec::new();
    let first = rt.new_int(0);
    for pair in rt.collect(dict)? {
        let key = rt.get_item(pair, first)?;
        order.push(text(&rt, key)?);
    }
    ensure!(order == keys, "got {order:?}");
    ensure!(rt.repr(dict)? == "{'zeta': 0, 'alpha': 1, 'mid': 2}");

    let missing = rt.new_str("missing");
    let error = rt.call_method(dict, "get", &[missing]).expect_err("no default");
    ensure!(rt.is_exception(&error, rt.types().key_error));
    let zero = rt.new_int(0);
    ensure!(rt.call_method(dict, "get", &[missing, zero])? == zero);

    let one = rt.new_int(1);
    let error = rt.dict_set(dict, one, one).expect_err("int key");
    ensure!(error.to_string() == "TypeError: dict keys must be str, not int");
    Ok(())
}

#[test]
fn tuples_compare_by_length_then_elements() -> Result<()> {
    let mut rt = Runtime::new();
    let items = ints(&mut rt, &[1, 2, 3]);
    let a = rt.new_tuple(items);
    let items = ints(&mut rt, &[1, 2, 3]);
    let b = rt.new_tuple(items);
    let items = ints(&mut rt, &[1, 2]);
    let c = rt.new_tuple(items);
    ensure!(rt.values_equal(a, b)?, "(1, 2, 3) == (1, 2, 3)");
    ensure!(!rt.values_equal(c, a)?, "(1, 2) != (1, 2, 3)");
    Ok(())
}

#[test]
fn list_append_append_pop() -> Result<()> {
    let mut rt = Runtime::new();
    let list_type = rt.types().list;
    let tuple_type = rt.types().tuple;
    let list = rt.call(list_type, &[])?;
    for value in ints(&mut rt, &[5, 7]) {
        rt.call_method(list, "append", &[value])?;
    }
    let popped = rt.call_method(list, "pop", &[])?;
    ensure!(rt.int_value(popped) == Some(7));

    let snapshot = rt.call(tuple_type, &[list])?;
    let items = ints(&mut rt, &[5]);
    let expected = rt.new_tuple(items);
    ensure!(rt.values_equal(snapshot, expected)?, "list is now [5]");
    ensure!(rt.repr(list)? == "[5]");
    Ok(())
}

#[test]
fn ranges_step_in_both_directions() -> Result<()> {
    let mut rt = Runtime::new();
    let range_type = rt.types().range;
    let args = ints(&mut rt, &[0, 5, 2]);
    let range = rt.call(range_type, &args)?;
    ensure!(collect_ints(&mut rt, range)? == [0, 2, 4]);
    let args = ints(&mut rt, &[5, 0, -2]);
    let range = rt.call(range_type, &args)?;
    ensure!(collect_ints(&mut rt, range)? == [5, 3, 1]);

    let args = ints(&mut rt, &[0, 5, 0]);
    let error = rt.call(range_type, &args).expect_err("zero step");
    ensure!(rt.is_exception(&error, rt.types().value_error));
    Ok(())
}

#[test]
fn text_converts_only_digit_strings() -> Result<()> {
    let mut rt = Runtime::new();
    let int_type = rt.types().int;
    let digits = rt.new_str("42");
    let parsed = rt.call(int_type, &[digits])?;
    ensure!(rt.int_value(parsed) == Some(42));
    for bad in ["", "4a"] {
        let value = rt.new_str(bad);
        let error = rt.call(int_type, &[value]).expect_err("not all digits");
        ensure!(rt.is_exception(&error, rt.types().value_error), "{bad:?}");
    }
    Ok(())
}

#[test]
fn exceptions_render_and_match_by_type() -> Result<()> {
    let mut rt = Runtime::new();
    let message = rt.new_str("no such key");
    let error = rt.raise(ExceptionKind::KeyError, &[message]);
    ensure!(error.to_string() == "KeyError: no such key");
    ensure!(rt.is_exception(&error, rt.types().key_error));
    ensure!(rt.is_exception(&error, rt.types().exception));
    ensure!(!rt.is_exception(&error, rt.types().index_error));

    let bare = rt.raise(ExceptionKind::StopIteration, &[]);
    ensure!(bare.to_string() == "StopIteration");
    let exception = bare.exception().context("raised")?;
    let value = rt.get_attribute(exception, "value")?;
    ensure!(rt.is_none(value));
    Ok(())
}

#[test]
fn collection_keeps_a_long_loop_at_a_steady_object_count() -> Result<()> {
    let mut rt = Runtime::new();
    let double = rt.new_function("double", |rt, args| {
        let two = rt.new_int(2);
        rt.binary_op(BinaryOp::Mul, args[0], two)
    });
    rt.pin(double);
    rt.collect_garbage(&[])?;
    let baseline = rt.object_count();

    for round in 0..10_000 {
        let (one, two) = (rt.new_int(1), rt.new_int(2));
        let three = rt.binary_op(BinaryOp::Add, one, two)?;
        ensure!(rt.int_value(three) == Some(3));
        let items = ints(&mut rt, &[1, 2, 3]);
        let tuple = rt.new_tuple(items);
        let doubled = rt.call_global("map", &[double, tuple])?;
        ensure!(collect_ints(&mut rt, doubled)? == [2, 4, 6]);
        if round % 100 == 99 {
            rt.collect_garbage(&[])?;
            ensure!(
                rt.object_count() == baseline,
                "round {round}: {} live objects, expected {baseline}",
                rt.object_count()
            );
        }
    }
    ensure!(rt.is_live(double));
    Ok(())
}

#[test]
fn a_suspended_map_keeps_its_source_alive_across_collection() -> Result<()> {
    let mut rt = Runtime::new();
    let repr = rt.global_get("repr")?;
    let items = ints(&mut rt, &[7, 8]);
    let tuple = rt.new_tuple(items);
    let rendered = rt.call_global("map", &[repr, tuple])?;
    let first = rt.next(rendered)?;
    ensure!(text(&rt, first)? == "7");

    rt.collect_garbage(&[rendered])?;
    ensure!(!rt.is_live(first), "yielded values are not kept by the generator");
    let second = rt.next(rendered)?;
    ensure!(text(&rt, second)? == "8");
    Ok(())
}
