use criterion::*;
use std::time::Duration;
use storage_trace::*;

fn session(io_tracing: bool, dir: &std::path::Path) -> TraceSession {
    let mut session = TraceSession::new(TraceConfig {
        io_tracing,
        bucket_tracing: false,
        output_dir: dir.to_path_buf(),
        capacity: 64 << 20,
    });
    session.start().unwrap();
    session
}

fn criterion_benchmark(c: &mut Criterion) {
    let dir = std::env::temp_dir();
    let mut group = c.benchmark_group("trace");
    let group = group.measurement_time(Duration::from_millis(1000)).warm_up_time(Duration::from_millis(1000));

    let mut off = session(false, &dir);
    group.bench_function("disabled", |b| {
        b.iter(|| black_box(iotrace_event!(off, EventKind::ReadIoStart, black_box(16384), black_box(7))))
    });

    let mut on = session(true, &dir);
    group.bench_function("enabled", |b| {
        b.iter(|| black_box(iotrace_event!(on, EventKind::ReadIoStart, black_box(16384), black_box(7))))
    });

    group.bench_function("wallclock", |b| b.iter(|| black_box(WallClock.now_nanos())));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
