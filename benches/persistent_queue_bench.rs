//! Benchmark for PersistentQueue vs standard VecDeque.
//!
//! Compares the performance of rtq's PersistentQueue against Rust's standard
//! VecDeque for common operations, and probes the cost of single operations
//! around a rebuild trigger to back up the worst-case O(1) claim.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rtq::persistent::PersistentQueue;
use std::collections::VecDeque;
use std::hint::black_box;

// =============================================================================
// enqueue Benchmark (bulk construction)
// =============================================================================

fn benchmark_enqueue(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("enqueue");

    for size in [100, 1000, 10000] {
        // PersistentQueue enqueue (worst-case O(1))
        group.bench_with_input(
            BenchmarkId::new("PersistentQueue", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut queue = PersistentQueue::new();
                    for index in 0..size {
                        queue = queue.enqueue(black_box(index));
                    }
                    black_box(queue)
                });
            },
        );

        // VecDeque push_back (amortized O(1))
        group.bench_with_input(
            BenchmarkId::new("VecDeque", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut deque = VecDeque::new();
                    for index in 0..size {
                        deque.push_back(black_box(index));
                    }
                    black_box(deque)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// consume (dequeue repeatedly) Benchmark
// =============================================================================

fn benchmark_consume(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("consume");

    for size in [100, 1000] {
        // Prepare data
        let persistent_queue: PersistentQueue<i32> = (0..size).collect();
        let standard_deque: VecDeque<i32> = (0..size).collect();

        // PersistentQueue consume via dequeue
        group.bench_with_input(
            BenchmarkId::new("PersistentQueue", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut sum = 0;
                    let mut current = persistent_queue.clone();
                    while let Some((element, rest)) = current.try_dequeue() {
                        sum += element;
                        current = rest;
                    }
                    black_box(sum)
                });
            },
        );

        // VecDeque consume via pop_front (clone first for fair comparison)
        group.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut sum = 0;
                let mut deque = standard_deque.clone();
                while let Some(value) = deque.pop_front() {
                    sum += value;
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// steady-state churn Benchmark (enqueue + dequeue pairs)
// =============================================================================

fn benchmark_churn(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("churn");

    for size in [100, 1000] {
        // Prepare data
        let persistent_queue: PersistentQueue<i32> = (0..size).collect();
        let standard_deque: VecDeque<i32> = (0..size).collect();

        // PersistentQueue: one dequeue and one enqueue per round, holding
        // the length constant so rebuilds keep firing.
        group.bench_with_input(
            BenchmarkId::new("PersistentQueue", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut current = persistent_queue.clone();
                    for round in 0..64 {
                        let (element, rest) = current.try_dequeue().unwrap();
                        current = rest.enqueue(black_box(element + round));
                    }
                    black_box(current)
                });
            },
        );

        // VecDeque: same churn on a mutable ring buffer
        group.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut deque = standard_deque.clone();
                for round in 0..64 {
                    let element = deque.pop_front().unwrap();
                    deque.push_back(black_box(element + round));
                }
                black_box(deque)
            });
        });
    }

    group.finish();
}

// =============================================================================
// single-operation latency Benchmark
// =============================================================================

/// Largest queue size a run of plain enqueues leaves in the settled state;
/// the next enqueue is the one that starts a rebuild.
const TRIGGER_EDGE: i32 = 126;

fn benchmark_single_operation_latency(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("single_operation_latency");

    // A settled queue far away from a trigger
    let settled: PersistentQueue<i32> = (0..TRIGGER_EDGE - 30).collect();
    // A settled queue one enqueue away from starting a rebuild
    let at_edge: PersistentQueue<i32> = (0..TRIGGER_EDGE).collect();

    group.bench_function("enqueue_settled", |bencher| {
        bencher.iter(|| black_box(settled.enqueue(black_box(-1))));
    });

    // The interesting one: this single call freezes the stacks and runs
    // the first rotation pass. Its cost should sit in the same band as
    // the settled case, not scale with the queue length.
    group.bench_function("enqueue_starting_rebuild", |bencher| {
        bencher.iter(|| black_box(at_edge.enqueue(black_box(-1))));
    });

    group.bench_function("dequeue_settled", |bencher| {
        bencher.iter(|| black_box(settled.dequeue().unwrap()));
    });

    group.bench_function("peek", |bencher| {
        bencher.iter(|| black_box(settled.try_peek()));
    });

    group.finish();
}

// =============================================================================
// iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in [100, 1000, 10000] {
        // Prepare data
        let persistent_queue: PersistentQueue<i32> = (0..size).collect();
        let standard_deque: VecDeque<i32> = (0..size).collect();

        // PersistentQueue iteration (dequeue-driven)
        group.bench_with_input(
            BenchmarkId::new("PersistentQueue", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let sum: i32 = persistent_queue.iter().sum();
                    black_box(sum)
                });
            },
        );

        // VecDeque iteration
        group.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |bencher, _| {
            bencher.iter(|| {
                let sum: i32 = standard_deque.iter().sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// version branching Benchmark
// =============================================================================

fn benchmark_version_branching(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("version_branching");

    for size in [100, 1000] {
        // Prepare a shared base
        let persistent_queue: PersistentQueue<i32> = (0..size).collect();
        let standard_deque: VecDeque<i32> = (0..size).collect();

        // PersistentQueue: each derived version is an O(1) enqueue
        group.bench_with_input(
            BenchmarkId::new("PersistentQueue", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let versions: Vec<_> =
                        (0..32).map(|value| persistent_queue.enqueue(value)).collect();
                    black_box(versions)
                });
            },
        );

        // VecDeque: each derived version costs a full O(n) clone
        group.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |bencher, _| {
            bencher.iter(|| {
                let versions: Vec<_> = (0..32)
                    .map(|value| {
                        let mut copy = standard_deque.clone();
                        copy.push_back(value);
                        copy
                    })
                    .collect();
                black_box(versions)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_enqueue,
    benchmark_consume,
    benchmark_churn,
    benchmark_single_operation_latency,
    benchmark_iteration,
    benchmark_version_branching
);

criterion_main!(benches);
