//! Benchmarks for the frame decoding hot path

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use vent_processor::app::services::frame_parser::{classify, parse_frame, split_frame};
use vent_processor::DeviceType;

const CPAP_FRAME: &str =
    "*,S,141125,1447,G,12.2,1.0,H,10.6,10.6,20.0,1.0,I,5.0,1.0,1.0,1.0,0.0,1.0,1.0,#";

const BIPAP_FRAME: &str = "*,S,141125,1447,A,12.2,1.0,B,29.6,10.8,10.6,40.0,10.0,10.0,13.0,1.0,C,16.0,10.0,10.0,10.0,10.0,10.0,0.0,200.0,1.0,D,11.0,10.0,10.0,10.0,10.0,10.0,10.0,200.0,1.0,E,20.0,10.0,5.0,10.0,20.0,20.0,1.0,200.0,1.0,170.0,500.0,F,5.0,1.0,1.0,1.0,0.0,1.0,1.0,#";

/// Keyword-less frame that forces the classifier's marker-count fallback
const UNLABELED_FRAME: &str = "S,1,K,1,L,1,M,1,N,1,O,1,P,1";

fn bench_decode(c: &mut Criterion) {
    c.bench_function("split_bipap_frame", |b| {
        b.iter(|| split_frame(black_box(BIPAP_FRAME)))
    });

    c.bench_function("parse_cpap_frame", |b| {
        b.iter(|| parse_frame(black_box(CPAP_FRAME), DeviceType::Cpap))
    });

    c.bench_function("parse_bipap_frame", |b| {
        b.iter(|| parse_frame(black_box(BIPAP_FRAME), DeviceType::Bipap))
    });

    c.bench_function("classify_keyword", |b| {
        b.iter(|| classify(black_box(CPAP_FRAME)))
    });

    c.bench_function("classify_marker_count_fallback", |b| {
        b.iter(|| classify(black_box(UNLABELED_FRAME)))
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
