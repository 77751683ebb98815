//! Benchmarks for block classification and value decoding
//!
//! Measures the per-iteration cost the dispatch loop pays between polls:
//! - Classifying sim object data against the definition registry
//! - Decoding each declared data type from a data region
//! - Previewing blocks without a decoder
//!
//! Platform: Cross-platform (synthetic blocks, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use simwire::protocol::{BlockBuilder, Classifier, decode_value};
use simwire::{DataType, Definition, DefinitionRegistry, MessageKind};
use std::hint::black_box;

fn registry() -> DefinitionRegistry {
    let registry = DefinitionRegistry::new();
    for (id, data_type) in DataType::ALL.iter().enumerate() {
        registry.register(
            id as u32,
            Definition {
                data_type: *data_type,
                variable_name: format!("VAR {}", id),
                units: String::new(),
            },
        );
    }
    registry
}

fn bench_classify_sim_object_data(c: &mut Criterion) {
    let registry = registry();
    let classifier = Classifier::default();

    let mut group = c.benchmark_group("classify_sim_object_data");
    for data_type in [DataType::Float32, DataType::Float64, DataType::StringV, DataType::InitPosition] {
        let block = BlockBuilder::sim_object_data(1, data_type.tag()).data(&[0x41; 64]).build();
        group.throughput(Throughput::Bytes(block.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(data_type), &block, |b, block| {
            b.iter(|| black_box(classifier.classify(black_box(block), &registry)))
        });
    }
    group.finish();
}

fn bench_decode_value(c: &mut Criterion) {
    let region = [0x42u8; 128];

    let mut group = c.benchmark_group("decode_value");
    for data_type in DataType::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(data_type), &data_type, |b, &data_type| {
            b.iter(|| black_box(decode_value(black_box(&region), data_type)))
        });
    }
    group.finish();
}

fn bench_unhandled_preview(c: &mut Criterion) {
    let registry = DefinitionRegistry::new();
    let classifier = Classifier::default();
    let block = BlockBuilder::new(MessageKind::JetwayData.id()).data(&[0u8; 4096]).build();

    let mut group = c.benchmark_group("unhandled_preview");
    group.throughput(Throughput::Bytes(block.len() as u64));
    group.bench_function("jetway_4k", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&block), &registry)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_classify_sim_object_data,
    bench_decode_value,
    bench_unhandled_preview
);
criterion_main!(benches);
