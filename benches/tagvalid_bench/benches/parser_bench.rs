//! Rule tag parsing benchmarks
//!
//! Parsing runs once per field per traversal, so its cost is paid on every
//! validated record.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagvalid::{parse_tag, Registry};

fn bench_parse_tag(c: &mut Criterion) {
    let registry = Registry::new();
    let mut group = c.benchmark_group("parse_tag");

    group.bench_function("single_rule", |b| {
        b.iter(|| parse_tag(black_box("Required"), "Name", "名字", &registry).unwrap())
    });

    group.bench_function("rule_chain", |b| {
        b.iter(|| {
            parse_tag(
                black_box("Required;Range(18, 120);MaxSize(3)"),
                "Age",
                "年龄",
                &registry,
            )
            .unwrap()
        })
    });

    // Compiles the pattern on every call
    group.bench_function("match_clause", |b| {
        b.iter(|| {
            parse_tag(
                black_box("Required;Match(/^[a-z0-9_]{3,16}$/);MinSize(3)"),
                "User",
                "用户名",
                &registry,
            )
            .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse_tag);
criterion_main!(benches);
