//! Stream write-path benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use textstream_core::{Endl, FormatArg, LinkedStream, StringStream, printf};

fn bench_integer_writes(c: &mut Criterion) {
    let counts: &[usize] = &[16, 256, 4096];
    let mut group = c.benchmark_group("write_integers");

    for &count in counts {
        group.throughput(Throughput::Elements(count as u64));

        for base in [10u8, 16] {
            group.bench_with_input(BenchmarkId::new(format!("base{base}"), count), &count, |b, &n| {
                b.iter(|| {
                    let mut os = StringStream::new();
                    os.set_base(base).unwrap();
                    for i in 0..n as u64 {
                        os.write_value(&i).unwrap().write_value(&' ').unwrap();
                    }
                    black_box(os.committed().len());
                });
            });
        }
    }
    group.finish();
}

fn bench_float_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_floats");
    for precision in [2u16, 6, 17] {
        group.bench_with_input(BenchmarkId::new("precision", precision), &precision, |b, &p| {
            b.iter(|| {
                let mut os = StringStream::new();
                os.set_precision(p);
                for i in 0..256 {
                    os.write_value(&(f64::from(i) * 1.618_033_988_75)).unwrap();
                }
                black_box(os.committed().len());
            });
        });
    }
    group.finish();
}

fn bench_linked_lines(c: &mut Criterion) {
    let sizes: &[usize] = &[64, 1024, 16384];
    let mut group = c.benchmark_group("linked_lines");

    for &size in sizes {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("text_endl", size), &size, |b, &sz| {
            let mut mem = vec![0u8; sz];
            b.iter(|| {
                let mut os = LinkedStream::linked(&mut mem);
                while os.remaining() >= 8 {
                    os.write_value("line").unwrap().write_value(&Endl).unwrap();
                }
                black_box(os.pos());
            });
        });
    }
    group.finish();
}

fn bench_format_retry(c: &mut Criterion) {
    let mut group = c.benchmark_group("vformat");
    let cases: &[(&str, f64)] = &[("fits", 1.5), ("retry", 1e200)];
    for &(name, value) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut os = StringStream::new();
                os.format("%.2f", &[FormatArg::Float(value)]).unwrap();
                black_box(os.pos());
            });
        });
    }
    group.bench_function("estimate_len", |b| {
        let args = [FormatArg::from("key"), FormatArg::from(42), FormatArg::from(3.5)];
        b.iter(|| black_box(printf::estimate_len(black_box(b"%s=%08d (%.3f)"), &args)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_integer_writes,
    bench_float_writes,
    bench_linked_lines,
    bench_format_retry
);
criterion_main!(benches);
