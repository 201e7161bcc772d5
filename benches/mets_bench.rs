//! Criterion benchmarks for u-mets.
//!
//! Uses random instances to measure the cost of delta evaluation and of
//! full tabu phases.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_mets::atsp::{AtspModel, AtspMove};
use u_mets::ils::{IlsConfig, IteratedSearch};
use u_mets::model::{Cost, Model};
use u_mets::neighborhood::SwapNeighborhood;
use u_mets::observer::NoopObserver;
use u_mets::qap::{QapModel, QapMove};
use u_mets::random::create_rng;
use u_mets::recorder::BestOf;
use u_mets::tabu::{TabuConfig, TabuMemory, TabuSearch};
use u_mets::vcp::{self, VcpModel};

// ===========================================================================
// Instances
// ===========================================================================

fn random_matrix(n: usize, seed: u64) -> Vec<Vec<Cost>> {
    let mut rng = create_rng(seed);
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 0 } else { rng.random_range(1..100) })
                .collect()
        })
        .collect()
}

fn random_qap(n: usize) -> QapModel {
    QapModel::new(random_matrix(n, 1), random_matrix(n, 2)).unwrap()
}

fn random_graph(n: usize, density: f64) -> VcpModel {
    let mut rng = create_rng(3);
    let mut edges = Vec::new();
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.random_bool(density) {
                edges.push((a, b));
            }
        }
    }
    VcpModel::new(n, &edges, 8).unwrap()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_qap_swap_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("qap_swap_delta");

    for &n in &[12, 50, 150] {
        let model = random_qap(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &model, |b, m| {
            b.iter(|| {
                let mut total = 0;
                for j in 1..n {
                    total += m.evaluate(black_box(&QapMove::swap(0, j)));
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

fn bench_atsp_inversion_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("atsp_inversion_delta");

    for &n in &[20, 100, 400] {
        let model = AtspModel::new(random_matrix(n, 4)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &model, |b, m| {
            b.iter(|| {
                let mut total = 0;
                for j in 1..(n - 1) {
                    total += m.evaluate(black_box(&AtspMove::invert(0, j)));
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

fn bench_tabu_phase_qap(c: &mut Criterion) {
    let mut group = c.benchmark_group("tabu_phase_qap");
    group.sample_size(10);

    for &n in &[12, 30] {
        let model = random_qap(n);
        let config = TabuConfig::default()
            .with_tenure(n / 2)
            .with_max_no_improve(100)
            .with_max_iterations(500);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(model, config),
            |b, (m, c)| {
                b.iter(|| {
                    let mut model = m.clone();
                    let mut best = BestOf::new(&model);
                    let mut neighborhood = SwapNeighborhood::full();
                    let mut memory = TabuMemory::new(c.tenure);
                    let mut rng = create_rng(42);
                    let result = TabuSearch::new(c, &mut neighborhood, &mut memory, &mut NoopObserver)
                        .search(&mut model, &mut best, &mut rng);
                    black_box((result, best.cost()))
                })
            },
        );
    }
    group.finish();
}

fn bench_ils_qap(c: &mut Criterion) {
    let mut group = c.benchmark_group("ils_qap");
    group.sample_size(10);

    for &n in &[12, 20] {
        let model = random_qap(n);
        let config = IlsConfig::qap(n)
            .with_major_no_improve(5)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(model, config),
            |b, (m, c)| {
                b.iter(|| {
                    let result = IteratedSearch::run(
                        m.clone(),
                        &mut SwapNeighborhood::full(),
                        black_box(c),
                        &mut NoopObserver,
                    );
                    black_box(result.map(|r| r.best_cost))
                })
            },
        );
    }
    group.finish();
}

fn bench_vcp_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("vcp_solve");
    group.sample_size(10);

    for &n in &[30, 60] {
        let model = random_graph(n, 0.2);
        let config = IlsConfig::vcp(n).with_major_no_improve(2).with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(model, config),
            |b, (m, c)| {
                b.iter(|| {
                    let result = vcp::solve(m.clone(), black_box(c), &mut NoopObserver);
                    black_box(result.map(|r| r.best_cost))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_qap_swap_delta,
    bench_atsp_inversion_delta,
    bench_tabu_phase_qap,
    bench_ils_qap,
    bench_vcp_solve
);
criterion_main!(benches);
