//! Criterion benchmarks for the planning pipeline.
//!
//! Uses the serial production line model so timings reflect the search,
//! composition and optimization overhead rather than problem construction.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_desplan::line::ProductionLine;
use u_desplan::phase::PhaseTemplate;
use u_desplan::planner::{Algorithm, Planner, PlannerConfig};
use u_desplan::problem::SchedulingProblem;
use u_desplan::repair::FeasibilityRepair;
use u_desplan::search::{EngineConfig, FrontierEngine};
use u_desplan::vns::{VnsConfig, VnsOptimizer};

fn line() -> ProductionLine {
    ProductionLine::new(&[3.0, 2.0, 4.0]).expect("valid line")
}

fn bench_frontier_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("frontier_engine");
    group.sample_size(10);

    let problem = line();
    for &batches in &[1, 3, 5] {
        for (name, threshold) in [("sequential", usize::MAX), ("parallel", 0)] {
            let config = EngineConfig::default().with_parallel_threshold(threshold);
            group.bench_with_input(
                BenchmarkId::new(name, batches),
                &(batches, config),
                |b, (n, c)| {
                    b.iter(|| {
                        let result = FrontierEngine::expand(black_box(&problem), *n, black_box(c));
                        black_box(result)
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_vns(c: &mut Criterion) {
    let mut group = c.benchmark_group("vns");
    group.sample_size(10);

    let problem = line();
    let base = FrontierEngine::expand(&problem, 1, &EngineConfig::default()).expect("reachable");
    let template = PhaseTemplate::split(&base.controllable_sequence());
    let oracle = problem.oracle();
    let repair = FeasibilityRepair::new(problem.supervisor());
    let config = VnsConfig::standard().with_seed(42);

    for &batches in &[5, 15, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(batches), &batches, |b, &n| {
            b.iter(|| {
                let config = black_box(&config);
                black_box(VnsOptimizer::optimize(&template, n, &oracle, &repair, config))
            })
        });
    }
    group.finish();
}

fn bench_composed_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("composed_planner");
    group.sample_size(10);

    let problem = line();
    let config = PlannerConfig::default().with_vns(VnsConfig::fast().with_seed(42));
    for &batches in &[10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(batches), &batches, |b, &n| {
            b.iter(|| {
                let result = Planner::plan(black_box(&problem), Algorithm::Composed, n, &config);
                black_box(result)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frontier_engine, bench_vns, bench_composed_planner);
criterion_main!(benches);
