//! Batch orchestration: dedup filtering, confirmation, bounded fan-out, ordered aggregation.
//!
//! Data flow for one [`BatchRun`](scheduler::BatchRun):
//!
//! 1. [`DedupChecker`](dedup::DedupChecker) partitions items into already-present and pending.
//! 2. A [`ConfirmationGate`](gate::ConfirmationGate) approves or cancels the pending set.
//! 3. [`WorkerPool`](pool::WorkerPool) runs the per-item [`Produce`](scheduler::Produce) step.
//! 4. Results are merged back into input order and reduced by [`summarize`](summary::summarize).

pub(crate) mod dedup;
pub(crate) mod gate;
pub(crate) mod item;
pub(crate) mod pool;
pub(crate) mod scheduler;
pub(crate) mod summary;
