use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use secded::{DataWidth, HammingCodec};

fn bench_hamming(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming");

    for width in DataWidth::ALL {
        let codec = HammingCodec::with_width(width);
        let data = 0xA5A5_A5A5 & codec.data_mask();
        let encoded = codec.encode(data).unwrap();
        let damaged = codec.inject_error(encoded, 2).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", width), &data, |b, &data| {
            b.iter(|| codec.encode(black_box(data)))
        });
        group.bench_with_input(
            BenchmarkId::new("decode_clean", width),
            &encoded,
            |b, &encoded| b.iter(|| codec.detect_and_correct(black_box(encoded))),
        );
        group.bench_with_input(
            BenchmarkId::new("decode_single_fault", width),
            &damaged,
            |b, &damaged| b.iter(|| codec.detect_and_correct(black_box(damaged))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_hamming);
criterion_main!(benches);
