//! Record traversal benchmarks
//!
//! Compares a flat record, a record with nested records in a sequence, and
//! the required-first policy skipping format rules on empty fields.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tagvalid::{Record, Validation};

#[derive(Record)]
struct Address {
    #[valid("Required")]
    #[label("城市")]
    city: String,

    #[valid("ZipCode")]
    #[label("邮编")]
    zip: String,
}

#[derive(Record)]
struct User {
    #[valid("Required;MinSize(2)")]
    #[label("名字")]
    name: String,

    #[valid("Email")]
    #[label("邮箱")]
    email: String,

    #[valid("Range(18, 120)")]
    #[label("年龄")]
    age: i32,

    #[valid("MaxSize(200)")]
    #[label("地址")]
    addresses: Vec<Address>,
}

fn user(addresses: usize, email: &str) -> User {
    User {
        name: "alice".into(),
        email: email.into(),
        age: 30,
        addresses: (0..addresses)
            .map(|i| Address {
                city: format!("city-{i}"),
                zip: "100080".into(),
            })
            .collect(),
    }
}

fn bench_valid(c: &mut Criterion) {
    let mut group = c.benchmark_group("valid");

    for size in [0usize, 10, 100] {
        let record = user(size, "alice@example.com");
        group.bench_with_input(BenchmarkId::new("nested", size), &record, |b, record| {
            b.iter(|| {
                let mut v = Validation::new();
                v.valid(black_box(record)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_required_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("required_first");
    let record = user(0, "");

    group.bench_function("off", |b| {
        b.iter(|| {
            let mut v = Validation::new();
            v.valid(black_box(&record)).unwrap()
        })
    });

    group.bench_function("on", |b| {
        b.iter(|| {
            let mut v = Validation::new().required_first(true);
            v.valid(black_box(&record)).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_valid, bench_required_first);
criterion_main!(benches);
