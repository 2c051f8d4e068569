use cloudwatch_emf_logger::{Builder, Environment, Unit};
use criterion::{criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

fn criterion_benchmark(c: &mut Criterion) {
    let mut logger = Builder::new()
        .with_writer(std::io::sink())
        .with_environment(Environment::default())
        .build();

    logger
        .namespace("MyApplication")
        .dimension("Function", "My_Function_Name")
        .metric_float("four", 1.0)
        .metric_float("score", 1.0);
    logger
        .new_context()
        .dimension("Method", "Another")
        .metric_as("andseven", 1, Unit::Count);

    c.bench_function("log", |b| {
        b.iter(|| logger.property("RequestId", "ABC123").log())
    });

    let durations = HashMap::from([("read", 1.5), ("write", 2.5), ("parse", 0.5)]);
    c.bench_function("build_and_log", |b| {
        b.iter(|| {
            let mut logger = Builder::new()
                .with_writer(std::io::sink())
                .with_environment(Environment::default())
                .build();
            logger
                .dimension("Method", "Default")
                .metrics_float_as(durations.iter().map(|(name, value)| (*name, *value)), Unit::Milliseconds)
                .log();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
