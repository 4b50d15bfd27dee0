//! Curve pricing benchmarks
//!
//! Compares the two decimal backends on the hot paths: one fractional
//! power, a full trade quote, and the fee evaluation (four quotes).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use yieldspace_amm::{
    BaseUnits, BigDecimal, FeeMode, Mantissa, PreciseMantissa, PrincipalFlow, ReferenceMantissa,
    Reserves, TradeKind, YieldMath,
};

fn pool() -> Reserves {
    Reserves::new(
        BaseUnits::from_whole(1_450_000),
        BaseUnits::from_whole(1_023_400),
    )
}

fn bench_pow<M: Mantissa>(c: &mut Criterion) {
    let base = BigDecimal::<M>::from_base_units(&BaseUnits::from_whole(1_450_000)).unwrap();
    let exponent: BigDecimal<M> = "0.7625".parse().unwrap();

    c.bench_function(&format!("pow/{}", M::NAME), |b| {
        b.iter(|| black_box(base).pow(black_box(exponent)).unwrap())
    });
}

fn bench_quotes<M: Mantissa>(c: &mut Criterion) {
    let reserves = pool();
    let amount = BaseUnits::from_whole(10_223);
    let mut group = c.benchmark_group(format!("quote/{}", M::NAME));

    for kind in TradeKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter(|| {
                YieldMath::<M>::quote(
                    black_box(kind),
                    black_box(&reserves),
                    black_box(amount),
                    black_box(31_536_000),
                    FeeMode::Applied,
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_fee<M: Mantissa>(c: &mut Criterion) {
    let reserves = pool();
    let amount = BaseUnits::from_whole(1_000);

    c.bench_function(&format!("fee/{}", M::NAME), |b| {
        b.iter(|| {
            YieldMath::<M>::get_fee(
                black_box(&reserves),
                PrincipalFlow::Sell,
                black_box(amount),
                black_box(20_000_000),
            )
            .unwrap()
        })
    });
}

fn precise_benches(c: &mut Criterion) {
    bench_pow::<PreciseMantissa>(c);
    bench_quotes::<PreciseMantissa>(c);
    bench_fee::<PreciseMantissa>(c);
}

fn reference_benches(c: &mut Criterion) {
    bench_pow::<ReferenceMantissa>(c);
    bench_quotes::<ReferenceMantissa>(c);
    bench_fee::<ReferenceMantissa>(c);
}

criterion_group!(benches, precise_benches, reference_benches);
criterion_main!(benches);
