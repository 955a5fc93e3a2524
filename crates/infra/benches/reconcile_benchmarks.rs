use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use ssobridge_auth::SsoAssertion;
use ssobridge_infra::{InMemorySessionManager, InMemoryUserStore, SerializedReconciler, SsoConfig};

type Pipeline =
    SerializedReconciler<Arc<InMemoryUserStore>, Arc<InMemorySessionManager<Arc<InMemoryUserStore>>>>;

fn setup() -> Pipeline {
    let store = Arc::new(InMemoryUserStore::new());
    let sessions = Arc::new(InMemorySessionManager::new(store.clone(), &SsoConfig::default()));
    SerializedReconciler::new(store, sessions)
}

fn assertion(i: usize) -> SsoAssertion {
    SsoAssertion::new(
        format!("usr-{i}"),
        format!("user{i}@example.com"),
        "Ann",
        "Lee",
        "Member",
    )
    .expect("valid assertion")
}

fn bench_first_login(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_login");
    group.throughput(Throughput::Elements(1));

    group.bench_function("create_account", |b| {
        let pipeline = setup();
        let mut i = 0usize;
        b.iter(|| {
            i += 1;
            black_box(pipeline.reconcile(&assertion(i)).expect("reconcile"));
        });
    });

    group.finish();
}

fn bench_returning_login(c: &mut Criterion) {
    let mut group = c.benchmark_group("returning_login");

    for population in [10usize, 1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(population),
            population,
            |b, &population| {
                let pipeline = setup();
                for i in 0..population {
                    pipeline.reconcile(&assertion(i)).expect("seed");
                }
                let returning = assertion(population / 2);
                b.iter(|| black_box(pipeline.reconcile(&returning).expect("reconcile")));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_first_login, bench_returning_login);
criterion_main!(benches);
