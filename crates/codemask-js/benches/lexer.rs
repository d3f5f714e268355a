//! Lexer benchmarks.

use codemask_js::{Lexer, TokenKind};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const SAMPLE_SOURCE: &str = r#"
// Checkout flow for the storefront
import { formatPrice } from './money';

export function cartTotal(items, discount = 0) {
    let total = 0;
    for (const item of items) {
        total += item.price * item.quantity;
    }
    return total - total * discount;
}

class Checkout {
    status = 'idle';

    constructor(customer) {
        this.customer = customer;
    }

    async submit(items) {
        this.status = 'pending';
        const response = await fetch('/api/orders', { method: 'POST' });
        return response.ok ? formatPrice(cartTotal(items)) : null;
    }
}

const pattern = /^[A-Z]{2}\d{4}$/i;
const label = `Order for ${customer.name}: ${items.length} items`;
const view = <Summary total={cartTotal(items)}>Thank you</Summary>;
"#;

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(SAMPLE_SOURCE));
            loop {
                let token = lexer.next_token();
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
