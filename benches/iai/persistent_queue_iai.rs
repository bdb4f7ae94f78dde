//! IAI-Callgrind benchmark for PersistentQueue single operations.
//!
//! Measures instruction counts for individual queue operations in the
//! settled state, at the rebuild trigger, and in the middle of a rebuild.
//! Stable instruction counts across these positions are the point of the
//! incremental rotation design.

use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use rtq::persistent::PersistentQueue;
use std::hint::black_box;

// Setup functions placing the queue in distinct rotation positions. Plain
// runs of enqueues settle at 126 elements; the 127th starts a rebuild and
// the next few operations carry it.
fn setup_settled_96() -> PersistentQueue<i32> {
    (0..96).collect()
}

fn setup_at_trigger_edge_126() -> PersistentQueue<i32> {
    (0..126).collect()
}

fn setup_mid_rebuild_127() -> PersistentQueue<i32> {
    (0..127).collect()
}

fn setup_queue_1024() -> PersistentQueue<i32> {
    (0..1024).collect()
}

// enqueue benchmarks
#[library_benchmark]
#[bench::with_setup(setup_settled_96())]
fn enqueue_settled(queue: PersistentQueue<i32>) -> PersistentQueue<i32> {
    black_box(queue.enqueue(black_box(-1)))
}

#[library_benchmark]
#[bench::with_setup(setup_at_trigger_edge_126())]
fn enqueue_starting_rebuild(queue: PersistentQueue<i32>) -> PersistentQueue<i32> {
    black_box(queue.enqueue(black_box(-1)))
}

#[library_benchmark]
#[bench::with_setup(setup_mid_rebuild_127())]
fn enqueue_mid_rebuild(queue: PersistentQueue<i32>) -> PersistentQueue<i32> {
    black_box(queue.enqueue(black_box(-1)))
}

// dequeue benchmarks
#[library_benchmark]
#[bench::with_setup(setup_settled_96())]
fn dequeue_settled(queue: PersistentQueue<i32>) -> (i32, PersistentQueue<i32>) {
    black_box(queue.dequeue().unwrap())
}

#[library_benchmark]
#[bench::with_setup(setup_mid_rebuild_127())]
fn dequeue_mid_rebuild(queue: PersistentQueue<i32>) -> (i32, PersistentQueue<i32>) {
    black_box(queue.dequeue().unwrap())
}

// peek benchmarks
#[library_benchmark]
#[bench::with_setup(setup_settled_96())]
fn peek_settled(queue: PersistentQueue<i32>) -> i32 {
    *black_box(queue.peek().unwrap())
}

#[library_benchmark]
#[bench::with_setup(setup_mid_rebuild_127())]
fn peek_mid_rebuild(queue: PersistentQueue<i32>) -> i32 {
    *black_box(queue.peek().unwrap())
}

// bulk benchmarks
#[library_benchmark]
fn from_iter_1024() -> PersistentQueue<i32> {
    black_box((0..black_box(1024)).collect())
}

#[library_benchmark]
#[bench::with_setup(setup_queue_1024())]
fn drain_1024(queue: PersistentQueue<i32>) -> i32 {
    let mut sum = 0;
    let mut current = queue;
    while let Some((element, rest)) = current.try_dequeue() {
        sum += element;
        current = rest;
    }
    black_box(sum)
}

library_benchmark_group!(
    name = persistent_queue_group;
    benchmarks =
        enqueue_settled, enqueue_starting_rebuild, enqueue_mid_rebuild,
        dequeue_settled, dequeue_mid_rebuild,
        peek_settled, peek_mid_rebuild,
        from_iter_1024, drain_1024
);

main!(library_benchmark_groups = persistent_queue_group);
