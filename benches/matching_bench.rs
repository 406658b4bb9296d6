//! Matching engine throughput benchmarks: inserting resting limit orders
//! and walking them with an aggressive market order, across book depths.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use energx_trading_core::{
    Collaborators, Commodity, CoreEngine, OrderKind, PlaceOrderRequest, Side, TimeInForce, TradingConfig,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::hint::black_box;
use uuid::Uuid;

fn populate_book(depth: usize) -> std::sync::Arc<CoreEngine> {
    let config = TradingConfig {
        min_order_size: Decimal::ONE,
        ..TradingConfig::default()
    };
    let engine = CoreEngine::new(config, Collaborators::default());
    for i in 0..depth {
        engine
            .place_order(PlaceOrderRequest {
                user_id: Uuid::new_v4(),
                commodity: Commodity::CrudeOil,
                side: Side::Sell,
                kind: OrderKind::Limit,
                quantity: dec!(100),
                limit_price: Some(Decimal::from(80) + Decimal::from(i as i64) / Decimal::from(100)),
                stop_price: None,
                time_in_force: TimeInForce::Gtc,
            })
            .unwrap();
    }
    engine
}

fn bench_resting_limit_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_insert");
    for &depth in &[100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("insert_resting_limits", depth), &depth, |b, &depth| {
            b.iter(|| {
                black_box(populate_book(depth));
            });
        });
    }
    group.finish();
}

fn bench_market_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching_engine_sweep");
    for &depth in &[100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("market_order_walks_book", depth), &depth, |b, &depth| {
            b.iter_with_setup(
                || populate_book(depth),
                |engine| {
                    let result = engine.place_order(PlaceOrderRequest {
                        user_id: Uuid::new_v4(),
                        commodity: Commodity::CrudeOil,
                        side: Side::Buy,
                        kind: OrderKind::Market,
                        quantity: Decimal::from(depth as i64) * dec!(100),
                        limit_price: None,
                        stop_price: None,
                        time_in_force: TimeInForce::Ioc,
                    });
                    black_box(result.unwrap());
                },
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resting_limit_insertion, bench_market_sweep);
criterion_main!(benches);
