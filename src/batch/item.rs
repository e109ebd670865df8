use std::path::{Path, PathBuf};

/// Lifecycle of a [`WorkItem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Not yet resolved.
    Pending,
    /// An artifact already existed at a candidate location; nothing was produced.
    Skipped,
    /// The production pipeline returned an artifact.
    Succeeded,
    /// The production pipeline failed.
    Failed,
}

/// One unit of batch work.
///
/// `source` is whatever the production step needs to build the artifact (a card record, a video
/// path). Candidate locations are checked in order by the dedup step. A work item is owned by the
/// scheduler until dispatch and by exactly one worker afterwards.
#[derive(Clone, Debug)]
pub struct WorkItem<S> {
    identity: String,
    source: S,
    candidates: Vec<PathBuf>,
    status: ItemStatus,
}

impl<S> WorkItem<S> {
    /// Create a pending item.
    pub fn new(identity: impl Into<String>, source: S, candidates: Vec<PathBuf>) -> Self {
        Self {
            identity: identity.into(),
            source,
            candidates,
            status: ItemStatus::Pending,
        }
    }

    /// Stable identity (unique within a batch).
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Production input.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Candidate output locations, in check order. The first is the primary output location.
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Primary output location, if any candidate was given.
    pub fn primary_output(&self) -> Option<&Path> {
        self.candidates.first().map(PathBuf::as_path)
    }

    /// Current status.
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }
}

/// Tagged outcome of one item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum JobOutcome {
    /// Produced a new artifact at the given path.
    Produced(PathBuf),
    /// Found an existing artifact at the given path.
    Skipped(PathBuf),
    /// Production failed with the captured cause.
    Failed(String),
}

/// Outcome record for one [`WorkItem`]; produced exactly once per item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct JobResult {
    identity: String,
    outcome: JobOutcome,
}

impl JobResult {
    pub(crate) fn new(identity: impl Into<String>, outcome: JobOutcome) -> Self {
        Self {
            identity: identity.into(),
            outcome,
        }
    }

    /// Identity of the item this result belongs to.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Tagged outcome.
    pub fn outcome(&self) -> &JobOutcome {
        &self.outcome
    }

    /// `true` unless the item failed.
    pub fn success(&self) -> bool {
        !matches!(self.outcome, JobOutcome::Failed(_))
    }

    /// Terminal status implied by the outcome.
    pub fn status(&self) -> ItemStatus {
        match self.outcome {
            JobOutcome::Produced(_) => ItemStatus::Succeeded,
            JobOutcome::Skipped(_) => ItemStatus::Skipped,
            JobOutcome::Failed(_) => ItemStatus::Failed,
        }
    }

    /// Artifact path for produced or skipped items.
    pub fn artifact(&self) -> Option<&Path> {
        match &self.outcome {
            JobOutcome::Produced(p) | JobOutcome::Skipped(p) => Some(p),
            JobOutcome::Failed(_) => None,
        }
    }

    /// Failure cause for failed items.
    pub fn cause(&self) -> Option<&str> {
        match &self.outcome {
            JobOutcome::Failed(c) => Some(c),
            _ => None,
        }
    }
}
