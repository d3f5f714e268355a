//! End-to-end benchmarks: tokenizing and the clause rewrite.

use codemask_core::FrontEndConfig;
use codemask_sql::{anonymize_with, Lexer};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const SAMPLE_QUERY: &str = "
-- Churn candidates: active accounts with no recent orders.
WITH last_orders AS (
    SELECT o.account_id, MAX(o.created_at) AS last_order_at
    FROM shop.orders o
    WHERE o.status <> 'cancelled'
    GROUP BY o.account_id
)
SELECT a.id, a.email, lo.last_order_at
FROM accounts a
LEFT JOIN last_orders lo ON lo.account_id = a.id
WHERE a.plan IN ('pro', 'team')
  AND (lo.last_order_at IS NULL OR lo.last_order_at < '2024-01-01')
  AND a.email NOT LIKE '%@example.org'
ORDER BY a.created_at DESC
LIMIT 500;
";

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(SAMPLE_QUERY.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| Lexer::new(black_box(SAMPLE_QUERY)).tokenize());
    });

    group.finish();
}

fn bench_anonymize(c: &mut Criterion) {
    let config = FrontEndConfig::sql();
    let mut group = c.benchmark_group("anonymize");
    group.throughput(Throughput::Bytes(SAMPLE_QUERY.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| anonymize_with(black_box(SAMPLE_QUERY), &config));
    });

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_anonymize);
criterion_main!(benches);
