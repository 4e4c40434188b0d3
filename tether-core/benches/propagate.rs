//! Propagation benchmarks: deep recompute chains and wide fan-out.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tether_core::{DepFunc1, DepInput, DepValue};

fn deep_chain(c: &mut Criterion) {
    let src = DepInput::with_value(0i64);
    let mut chain = Vec::with_capacity(64);
    let mut tail: Box<dyn DepValue<i64>> = Box::new(src.clone());
    for _ in 0..64 {
        let next = DepFunc1::new(tail.as_ref(), |v: i64| v + 1).unwrap();
        tail = Box::new(next.clone());
        chain.push(next);
    }

    let mut value = 0i64;
    c.bench_function("deep_chain_64", |b| {
        b.iter(|| {
            value += 1;
            src.set(black_box(value)).unwrap();
        })
    });
}

fn wide_fan_out(c: &mut Criterion) {
    let src = DepInput::with_value(0i64);
    let sinks: Vec<_> = (0..256i64)
        .map(|i| DepFunc1::new(&src, move |v: i64| v + i).unwrap())
        .collect();

    let mut value = 0i64;
    c.bench_function("fan_out_256", |b| {
        b.iter(|| {
            value += 1;
            src.set(black_box(value)).unwrap();
        })
    });
    black_box(&sinks);
}

criterion_group!(benches, deep_chain, wide_fan_out);
criterion_main!(benches);
