use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use planbench::{
    Sample, SqliteBackend, TrialExecutor,
    counters::parse_duration,
    test_utils::raw_profile,
};

const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

fn seeded_backend(rows: usize) -> SqliteBackend {
    let backend = SqliteBackend::in_memory().expect("sqlite");
    backend
        .run_setup(&[
            "CREATE TABLE items(id INTEGER PRIMARY KEY, k INTEGER, label TEXT)".to_string(),
            format!(
                "WITH RECURSIVE seq(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM seq WHERE x < {rows})
                 INSERT INTO items(k, label) SELECT x % 100, 'item-' || x FROM seq"
            ),
        ])
        .expect("setup");
    backend
}

fn bench_sqlite_trial(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqlite_trial");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for rows in [1_000usize, 10_000] {
        let backend = seeded_backend(rows);
        let executor = TrialExecutor::new(&backend);
        for optimizer in ["1", "latest"] {
            let id = format!("{optimizer}_{rows}");
            group.bench_function(BenchmarkId::from_parameter(id), |b| {
                b.iter(|| {
                    executor
                        .execute(optimizer, "SELECT label FROM items WHERE k = 42")
                        .expect("trial")
                });
            });
        }
    }
    group.finish();
}

fn bench_counter_parser(c: &mut Criterion) {
    let profile = raw_profile(&[
        ("rows_scanned", "128934"),
        ("rows_returned", "250"),
        ("query_plan_creation_time", "1.27 msecs"),
        ("cpu_time", "41.9 msecs"),
        ("elapsed_time", "55.03 msecs"),
        ("optimizer_version", "2"),
    ]);
    c.bench_function("parse_profile", |b| {
        b.iter(|| Sample::from_profile("latest", &profile))
    });
    c.bench_function("parse_duration", |b| b.iter(|| parse_duration("1234.567 msecs")));
}

criterion_group!(
    name = trial_benches;
    config = Criterion::default();
    targets = bench_sqlite_trial, bench_counter_parser
);
criterion_main!(trial_benches);
