use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pitwall::live::{LiveSampleBuffer, LiveSeries};
use pitwall::telemetry::TelemetrySample;
use std::time::Duration;

fn create_sample(point_no: usize) -> TelemetrySample {
    TelemetrySample {
        speed: Some(120.0 + (point_no % 80) as f32),
        throttle: Some(((point_no * 7) % 100) as f32),
        brake: if point_no % 10 < 3 { Some(60.0) } else { None },
        gear: Some(3 + (point_no % 4) as i32),
        rpm: Some(5000.0 + (point_no % 2500) as f32),
    }
}

fn bench_buffer_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_buffer");

    for capacity in [100, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("append_full_buffer", capacity),
            &capacity,
            |b, &capacity| {
                let mut buffer = LiveSampleBuffer::with_capacity(capacity);
                for i in 0..capacity {
                    buffer.append(create_sample(i));
                }
                let mut point_no = capacity;
                b.iter(|| {
                    point_no += 1;
                    black_box(buffer.append(create_sample(point_no)).len());
                });
            },
        );
    }

    group.finish();
}

fn bench_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_series");

    let mut buffer = LiveSampleBuffer::new();
    for i in 0..250 {
        buffer.append(create_sample(i));
    }

    group.bench_function("series_from_snapshot", |b| {
        b.iter(|| black_box(LiveSeries::from_snapshot(buffer.snapshot())));
    });

    let json = serde_json::to_string(&create_sample(7)).unwrap();
    group.bench_function("deserialize_sample", |b| {
        b.iter(|| black_box(serde_json::from_str::<TelemetrySample>(&json).unwrap()));
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(100);
    targets = bench_buffer_append, bench_series
}
criterion_main!(benches);
