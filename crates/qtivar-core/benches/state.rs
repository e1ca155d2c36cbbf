use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qtivar_core::state::{deserialize_state, serialize_state, StateMap, StateValue};

fn sample_state(width: usize) -> StateValue {
    let order: Vec<StateValue> = (0..width as i32).map(StateValue::from).collect();
    let labels: Vec<StateValue> = (0..width)
        .map(|i| StateValue::from(format!("label <{i}> & \"quoted\"")))
        .collect();
    StateMap::new()
        .with("order", order)
        .with("labels", labels)
        .with("drag", StateMap::new().with("x", 12.5).with("y", -3))
        .with("open", true)
        .into()
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_state");

    let small = sample_state(4);
    let large = sample_state(500);

    group.bench_function("small", |b| {
        b.iter(|| serialize_state(black_box(&small)))
    });

    group.bench_function("large", |b| {
        b.iter(|| serialize_state(black_box(&large)))
    });

    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_state");

    let small = serialize_state(&sample_state(4)).unwrap_or_default();
    let large = serialize_state(&sample_state(500)).unwrap_or_default();
    let lenient = "{ order [ 2 , 0 , 1 ] , open : true , label \"a &amp; b\" }";

    group.bench_function("small", |b| {
        b.iter(|| deserialize_state(black_box(&small)))
    });

    group.bench_function("large", |b| {
        b.iter(|| deserialize_state(black_box(&large)))
    });

    group.bench_function("lenient_separators", |b| {
        b.iter(|| deserialize_state(black_box(lenient)))
    });

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_deserialize);
criterion_main!(benches);
