use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

#[test]
fn limit_reserves_one_unit_but_never_drops_to_zero() {
    assert_eq!(concurrency_limit(8), 7);
    assert_eq!(concurrency_limit(2), 1);
    assert_eq!(concurrency_limit(1), 1);
    assert_eq!(concurrency_limit(0), 1);
    assert!(host_concurrency_limit() >= 1);
}

#[test]
fn zero_workers_is_rejected() {
    assert!(WorkerPool::new(0).is_err());
}

#[test]
fn results_follow_input_order_not_completion_order() {
    let pool = WorkerPool::new(4).unwrap();
    let tasks: Vec<u64> = (0..12).collect();
    let out = pool
        .map_ordered(tasks, |idx, v| {
            // Earlier tasks finish last.
            std::thread::sleep(Duration::from_millis(2 * (12 - v)));
            (idx, v * 10)
        })
        .unwrap();
    let expected: Vec<(usize, u64)> = (0..12).map(|i| (i as usize, i * 10)).collect();
    assert_eq!(out, expected);
}

#[test]
fn in_flight_tasks_never_exceed_worker_count() {
    let pool = WorkerPool::new(2).unwrap();
    let active = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    pool.map_ordered((0..8).collect::<Vec<_>>(), |_, _: i32| {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
        active.fetch_sub(1, Ordering::SeqCst);
    })
    .unwrap();
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(pool.workers(), 2);
}

#[test]
fn empty_task_list_yields_empty_results() {
    let pool = WorkerPool::new(1).unwrap();
    let out: Vec<u8> = pool.map_ordered(Vec::<u8>::new(), |_, v| v).unwrap();
    assert!(out.is_empty());
}

#[test]
fn nested_rayon_work_does_not_admit_extra_tasks() {
    use rayon::prelude::*;

    let pool = WorkerPool::new(4).unwrap();
    let active = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    pool.map_ordered((0..40).collect::<Vec<_>>(), |_, _: i32| {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        for _ in 0..4 {
            (0..64u32)
                .into_par_iter()
                .for_each(|_| std::thread::sleep(Duration::from_millis(1)));
        }
        active.fetch_sub(1, Ordering::SeqCst);
    })
    .unwrap();
    assert!(peak.load(Ordering::SeqCst) <= 4, "peak {}", peak.load(Ordering::SeqCst));
}
