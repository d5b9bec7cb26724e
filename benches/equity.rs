use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use oddsrs::deck::parse_cards;
use oddsrs::equity::Estimator;
use oddsrs::hand::Showdown;
use oddsrs::rng_from_seed;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn from_elem(c: &mut Criterion) {
    let hole = parse_cards("hA dA").unwrap();
    let mut group = c.benchmark_group("equity");
    let mut rng = SmallRng::from_rng(&mut rng_from_seed(Some("test")));
    for board in ["", "h7 d8 c9", "h7 d8 c9 s2", "h7 d8 c9 s2 cK"] {
        let est = Estimator::new(&hole, &parse_cards(board).unwrap())
            .unwrap()
            .opponents(3)
            .simulations(100)
            .showdown(Showdown::Kickers);
        let known = 2 + board.split_whitespace().count();
        group.bench_with_input(BenchmarkId::from_parameter(known), &est, |b, est| {
            b.iter(|| est.run(&mut rng).unwrap());
        });
    }
    group.finish();

    let est = Estimator::new(&hole, &[]).unwrap().opponents(3).simulations(10000);
    c.bench_function("equity_parallel", |b| b.iter(|| est.run_parallel("seed1234", 4).unwrap()));
}

criterion_group!(benches, from_elem);
criterion_main!(benches);
