mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pyrt::{BinaryOp, Runtime};

fn bench_dispatch(c: &mut Criterion) {
    c.bench_function("attribute_lookup_deep_chain", |b| {
        let mut rt = Runtime::new();
        let leaf = common::deep_hierarchy(&mut rt, 32);
        let instance = rt.call(leaf, &[]).expect("instantiate leaf");
        b.iter(|| {
            let found = rt.get_attribute(black_box(instance), "member0").expect("lookup");
            black_box(found);
        })
    });

    c.bench_function("int_add_forward_hook", |b| {
        let mut rt = Runtime::new();
        let (left, right) = (rt.new_int(20), rt.new_int(22));
        b.iter(|| {
            let sum = rt
                .binary_op(BinaryOp::Add, black_box(left), black_box(right))
                .expect("add");
            black_box(sum);
        })
    });

    c.bench_function("reflected_hook_fallback", |b| {
        let mut rt = Runtime::new();
        let radd = rt.new_function("Right.__radd__", |rt, _args| Ok(rt.new_int(0)));
        let right = rt.define_type("Right", None, &[("__radd__", radd)]).expect("define");
        let instance = rt.call(right, &[]).expect("instantiate");
        let one = rt.new_int(1);
        b.iter(|| {
            let sum = rt
                .binary_op(BinaryOp::Add, black_box(one), black_box(instance))
                .expect("radd");
            black_box(sum);
        })
    });

    c.bench_function("tuple_equality", |b| {
        let mut rt = Runtime::new();
        let left = common::int_tuple(&mut rt, 64);
        let right = common::int_tuple(&mut rt, 64);
        b.iter(|| {
            let equal = rt.values_equal(black_box(left), black_box(right)).expect("eq");
            black_box(equal);
        })
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
