use std::sync::{Mutex, mpsc};

use crate::foundation::error::{ReelError, ReelResult};

/// Worker count for a host with `available` parallel units, reserving one for the orchestrator.
///
/// Never returns 0.
pub fn concurrency_limit(available: usize) -> usize {
    available.saturating_sub(1).max(1)
}

/// [`concurrency_limit`] for the current host.
pub fn host_concurrency_limit() -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    concurrency_limit(available)
}

/// Bounded pool of isolated workers.
///
/// Each worker is a dedicated OS thread that pulls `(index, task)` pairs from a shared task channel
/// and reports on a result channel tagged with the task's input index; the collector places results
/// back in input order regardless of completion order. A worker runs one task at a time, even
/// when that task blocks on a rayon parallel iterator.
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Build a pool with exactly `workers` threads.
    pub fn new(workers: usize) -> ReelResult<Self> {
        if workers == 0 {
            return Err(ReelError::validation("worker pool size must be >= 1"));
        }
        Ok(Self { workers })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `f` over every task and return the results in task order.
    ///
    /// Blocks until every task has completed. At most [`WorkerPool::workers`] calls to `f` are in
    /// flight at any time. A panic inside `f` propagates once all sibling tasks have finished;
    /// callers that need containment catch it inside `f`.
    pub fn map_ordered<T, R, F>(&self, tasks: Vec<T>, f: F) -> ReelResult<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(usize, T) -> R + Sync,
    {
        let len = tasks.len();
        let (task_tx, task_rx) = mpsc::channel::<(usize, T)>();
        for pair in tasks.into_iter().enumerate() {
            // The receiver is alive until the end of this call.
            let _ = task_tx.send(pair);
        }
        drop(task_tx);
        let task_rx = Mutex::new(task_rx);
        let (tx, rx) = mpsc::channel::<(usize, R)>();

        let spawned = std::thread::scope(|scope| -> ReelResult<()> {
            for i in 0..self.workers.min(len) {
                let tx = tx.clone();
                let task_rx = &task_rx;
                let f = &f;
                std::thread::Builder::new()
                    .name(format!("cardreel-worker-{i}"))
                    .spawn_scoped(scope, move || {
                        while let Some((idx, task)) = next_task(task_rx) {
                            let out = f(idx, task);
                            let _ = tx.send((idx, out));
                        }
                    })
                    .map_err(|e| ReelError::worker(format!("failed to start worker {i}: {e}")))?;
            }
            Ok(())
        });
        drop(tx);
        spawned?;

        let mut slots: Vec<Option<R>> = (0..len).map(|_| None).collect();
        for (idx, out) in rx {
            slots[idx] = Some(out);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| {
                    ReelError::worker(format!("task {idx} finished without reporting a result"))
                })
            })
            .collect()
    }
}

fn next_task<T>(rx: &Mutex<mpsc::Receiver<(usize, T)>>) -> Option<(usize, T)> {
    // A poisoned lock means a sibling panicked while holding it; the receiver is still usable.
    let guard = match rx.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.recv().ok()
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/pool.rs"]
mod tests;
