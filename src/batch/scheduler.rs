use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;

use crate::batch::dedup::{ArtifactProbe, DedupChecker, FsProbe};
use crate::batch::gate::{ConfirmationGate, PendingSummary};
use crate::batch::item::{ItemStatus, JobOutcome, JobResult, WorkItem};
use crate::batch::pool::{WorkerPool, host_concurrency_limit};
use crate::foundation::error::{ReelError, ReelResult};

/// Per-item production step (the external pipeline), invoked once per dispatched item.
pub trait Produce<S>: Sync {
    /// Produce the artifact for `item` and return its path.
    fn produce(&self, item: &WorkItem<S>) -> ReelResult<PathBuf>;
}

impl<S, F> Produce<S> for F
where
    F: Fn(&WorkItem<S>) -> ReelResult<PathBuf> + Sync,
{
    fn produce(&self, item: &WorkItem<S>) -> ReelResult<PathBuf> {
        self(item)
    }
}

/// Work items for one invocation plus the concurrency limit they run under.
#[derive(Clone, Debug)]
pub struct BatchRun<S> {
    items: Vec<WorkItem<S>>,
    concurrency_limit: usize,
}

impl<S> BatchRun<S> {
    /// Batch over `items` using the host-derived concurrency limit.
    pub fn new(items: Vec<WorkItem<S>>) -> Self {
        Self {
            items,
            concurrency_limit: host_concurrency_limit(),
        }
    }

    /// Override the concurrency limit (clamped to at least 1).
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    /// Items in input order.
    pub fn items(&self) -> &[WorkItem<S>] {
        &self.items
    }

    /// Maximum number of concurrently running workers.
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }
}

/// Result of [`BatchScheduler::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every item resolved; results are in input order.
    Completed(Vec<JobResult>),
    /// The confirmation gate declined; nothing was dispatched.
    Cancelled {
        /// Items that would have been produced.
        pending: Vec<String>,
        /// Items already present at a candidate location.
        already_present: usize,
    },
}

impl BatchOutcome {
    /// `true` when the gate declined the run.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Results of a completed run; `None` when cancelled.
    pub fn results(&self) -> Option<&[JobResult]> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Runs a [`BatchRun`]: dedup, confirm, fan out, merge.
#[derive(Clone, Debug, Default)]
pub struct BatchScheduler<P = FsProbe> {
    dedup: DedupChecker<P>,
}

impl BatchScheduler<FsProbe> {
    /// Scheduler whose dedup step checks the local filesystem.
    pub fn new() -> Self {
        Self {
            dedup: DedupChecker::new(),
        }
    }
}

impl<P: ArtifactProbe> BatchScheduler<P> {
    /// Scheduler whose dedup step uses `probe`.
    pub fn with_probe(probe: P) -> Self {
        Self {
            dedup: DedupChecker::with_probe(probe),
        }
    }

    /// Execute `run`.
    ///
    /// Items with an existing artifact resolve as skipped without reaching `produce`. When nothing
    /// is pending the gate is not consulted. A declined gate dispatches nothing. A failing (or
    /// panicking) `produce` call fails only its own item. Only structural problems (the worker pool
    /// cannot start, the gate cannot be read) return `Err`.
    pub fn run<S, G, F>(
        &self,
        mut run: BatchRun<S>,
        gate: &mut G,
        produce: &F,
    ) -> ReelResult<BatchOutcome>
    where
        S: Send,
        G: ConfirmationGate + ?Sized,
        F: Produce<S> + ?Sized,
    {
        self.execute(&mut run, gate, produce)
    }

    /// Like [`BatchScheduler::run`], but leaves the resolved items on `run`.
    ///
    /// Afterwards every item's [`WorkItem::status`] matches its result. Items of a cancelled run
    /// that were not already present stay [`ItemStatus::Pending`].
    pub fn execute<S, G, F>(
        &self,
        run: &mut BatchRun<S>,
        gate: &mut G,
        produce: &F,
    ) -> ReelResult<BatchOutcome>
    where
        S: Send,
        G: ConfirmationGate + ?Sized,
        F: Produce<S> + ?Sized,
    {
        let items = std::mem::take(&mut run.items);
        let total = items.len();

        let mut resolved: Vec<Option<WorkItem<S>>> = (0..total).map(|_| None).collect();
        let mut slots: Vec<Option<JobResult>> = (0..total).map(|_| None).collect();
        let mut pending = Vec::<(usize, WorkItem<S>)>::new();
        for (idx, mut item) in items.into_iter().enumerate() {
            match self.dedup.first_hit(item.candidates()) {
                Some(existing) => {
                    tracing::debug!(identity = item.identity(), path = %existing.display(), "artifact already present");
                    item.set_status(ItemStatus::Skipped);
                    slots[idx] = Some(JobResult::new(
                        item.identity(),
                        JobOutcome::Skipped(existing),
                    ));
                    resolved[idx] = Some(item);
                }
                None => pending.push((idx, item)),
            }
        }
        let already_present = total - pending.len();
        tracing::info!(
            total,
            pending = pending.len(),
            already_present,
            "partitioned batch"
        );

        if !pending.is_empty() {
            let summary = PendingSummary::new(
                pending
                    .iter()
                    .map(|(_, item)| item.identity().to_string())
                    .collect(),
                already_present,
            );
            let confirmed = gate.confirm(&summary);
            if !matches!(confirmed, Ok(true)) {
                for (idx, item) in pending {
                    resolved[idx] = Some(item);
                }
                run.items = resolved.into_iter().flatten().collect();
                confirmed?;
                tracing::info!(pending = summary.pending(), "batch cancelled at confirmation");
                return Ok(BatchOutcome::Cancelled {
                    pending: summary.identities().to_vec(),
                    already_present,
                });
            }

            let workers = run.concurrency_limit.min(pending.len()).max(1);
            let pool = WorkerPool::new(workers)?;
            tracing::info!(workers, items = pending.len(), "dispatching");

            let produced = pool.map_ordered(pending, |_, (idx, item)| {
                let (item, result) = run_worker(produce, item);
                (idx, item, result)
            })?;
            for (idx, item, result) in produced {
                slots[idx] = Some(result);
                resolved[idx] = Some(item);
            }
        }

        run.items = resolved.into_iter().flatten().collect();
        let results = slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| {
                    ReelError::worker(format!("item {idx} did not produce a result"))
                })
            })
            .collect::<ReelResult<Vec<_>>>()?;
        Ok(BatchOutcome::Completed(results))
    }
}

fn run_worker<S, F>(produce: &F, mut item: WorkItem<S>) -> (WorkItem<S>, JobResult)
where
    F: Produce<S> + ?Sized,
{
    let attempt = catch_unwind(AssertUnwindSafe(|| produce.produce(&item)));
    let outcome = match attempt {
        Ok(Ok(path)) => {
            item.set_status(ItemStatus::Succeeded);
            tracing::info!(identity = item.identity(), path = %path.display(), "produced");
            JobOutcome::Produced(path)
        }
        Ok(Err(e)) => {
            item.set_status(ItemStatus::Failed);
            tracing::warn!(identity = item.identity(), error = %e, "item failed");
            JobOutcome::Failed(e.to_string())
        }
        Err(panic) => {
            item.set_status(ItemStatus::Failed);
            let cause = panic_message(panic.as_ref());
            tracing::warn!(identity = item.identity(), cause = %cause, "item worker panicked");
            JobOutcome::Failed(format!("worker panicked: {cause}"))
        }
    };
    let result = JobResult::new(item.identity(), outcome);
    (item, result)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/scheduler.rs"]
mod tests;
