//! Performance benchmarks for a3s-attack-store
//!
//! Run with: cargo bench

use a3s_attack_store::repository::memory::MemoryRepository;
use a3s_attack_store::{Attack, AttackStore, DetectionPoint, SearchCriteria, User};
use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

fn sample_attack(i: i64) -> Attack {
    Attack::new(
        DetectionPoint::new("Input Validation", format!("IE{}", i % 7)),
        User::new(format!("user{}", i % 50)),
        format!("sys{}", i % 5),
    )
    .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(i))
}

fn bench_add_attack(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("MemoryRepository add_attack", |b| {
        b.to_async(&rt).iter(|| async {
            let store = AttackStore::new(MemoryRepository::new());
            store.add_attack(sample_attack(1)).await.unwrap()
        });
    });
}

fn bench_find_attacks(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("find_attacks");
    for count in [100i64, 1_000, 10_000] {
        let store = rt.block_on(async {
            let store = AttackStore::new(MemoryRepository::new());
            for i in 0..count {
                store.add_attack(sample_attack(i)).await.unwrap();
            }
            store
        });

        let full_scan = SearchCriteria::new();
        let filtered = SearchCriteria::new()
            .for_user(User::new("user7"))
            .with_detection_system_ids(["sys2", "sys3"])
            .with_earliest(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        group.bench_function(format!("{} attacks, empty criteria", count), |b| {
            b.to_async(&rt)
                .iter(|| async { store.find_attacks(Some(&full_scan)).await.unwrap() });
        });

        group.bench_function(format!("{} attacks, all predicates", count), |b| {
            b.to_async(&rt)
                .iter(|| async { store.find_attacks(Some(&filtered)).await.unwrap() });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add_attack, bench_find_attacks);
criterion_main!(benches);
