use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qtivar_core::codec::{decode_response, encode_response, ResponseElement};
use qtivar_core::config::EngineConfig;
use qtivar_core::model::{BaseType, Cardinality, DirectedPair, Point, Scalar, Value};
use qtivar_core::registry::TypeRegistry;
use qtivar_core::variable::{Variable, VariableSpec};

fn variable(id: &str, cardinality: Cardinality, base_type: BaseType, value: Value) -> Variable {
    let registry = TypeRegistry::new();
    let spec = VariableSpec::response(
        id.parse().expect("valid identifier"),
        cardinality,
        base_type,
    );
    let mut var = Variable::create(spec, &registry).expect("valid declaration");
    var.set_value(Some(value), &registry)
        .expect("compatible value");
    var
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_response");
    let config = EngineConfig::default();

    let gaps = variable(
        "item1.GAPS",
        Cardinality::Multiple,
        BaseType::DirectedPair,
        Value::list((1..=40).step_by(2).map(|n| {
            Scalar::DirectedPair(DirectedPair::new(format!("Gap{n}"), "CHOICE"))
        })),
    );
    let points = variable(
        "item1.PTS",
        Cardinality::Ordered,
        BaseType::Point,
        Value::List(
            (0..200)
                .map(|i| (i % 3 != 0).then(|| Scalar::Point(Point::new(i, -i))))
                .collect(),
        ),
    );
    let text = variable(
        "item1.TEXT",
        Cardinality::Single,
        BaseType::String,
        Scalar::String("<p>An essay &amp; more</p>".repeat(100)).into(),
    );

    group.bench_function("gap_slots", |b| {
        b.iter(|| encode_response(black_box(&gaps), &config))
    });

    group.bench_function("ordered_points", |b| {
        b.iter(|| encode_response(black_box(&points), &config))
    });

    group.bench_function("escaped_string", |b| {
        b.iter(|| encode_response(black_box(&text), &config))
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_response");
    let config = EngineConfig::default();

    let slots: Vec<String> = (1..=40)
        .map(|n| {
            if n % 2 == 0 {
                format!("Gap{n}:")
            } else {
                format!("Gap{n}:CHOICE")
            }
        })
        .collect();
    let gaps = ResponseElement {
        base_type: BaseType::DirectedPair,
        cardinality: Cardinality::Multiple,
        item_identifier: "item1".into(),
        response_identifier: "GAPS".into(),
        values: vec![slots.join(",")],
        state: Some("{open:[1,3,5],scroll:120}".into()),
    };
    let xml = gaps.to_xml();

    group.bench_function("gap_slots", |b| {
        b.iter(|| decode_response(black_box(&gaps), &config))
    });

    group.bench_function("from_xml", |b| {
        b.iter(|| {
            ResponseElement::from_xml(black_box(&xml))
                .and_then(|element| decode_response(&element, &config))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
