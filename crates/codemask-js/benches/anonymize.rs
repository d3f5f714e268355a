//! End-to-end benchmarks: parse, rename and print.

use codemask_core::FrontEndConfig;
use codemask_js::{anonymize_with, Parser};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const SAMPLE_SOURCE: &str = r#"
import React, { useState } from 'react';

function useOrders(customerId) {
    const [orders, setOrders] = useState([]);
    const [error, setError] = useState(null);

    async function load() {
        try {
            const response = await fetch(`/customers/${customerId}/orders`);
            setOrders(await response.json());
        } catch (err) {
            setError(err.message ?? 'Unknown failure');
        }
    }

    return { orders, error, load };
}

export default function OrderList({ customerId }) {
    const { orders, error, load } = useOrders(customerId);
    if (error) {
        return <p className="error">Could not load orders: {error}</p>;
    }
    return (
        <ul>
            {orders.map((order) => (
                <li key={order.id}>{order.total.toFixed(2)}</li>
            ))}
            <button onClick={load}>Refresh</button>
        </ul>
    );
}
"#;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| Parser::new(black_box(SAMPLE_SOURCE)).parse());
    });

    group.finish();
}

fn bench_anonymize(c: &mut Criterion) {
    let config = FrontEndConfig::javascript();
    let mut group = c.benchmark_group("anonymize");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| anonymize_with(black_box(SAMPLE_SOURCE), &config));
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_anonymize);
criterion_main!(benches);
