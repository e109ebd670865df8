use std::path::{Path, PathBuf};

use crate::batch::item::WorkItem;

/// Existence check for a candidate output location.
pub trait ArtifactProbe: Sync {
    /// Return `true` when an artifact exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem (regular files only).
#[derive(Clone, Copy, Debug, Default)]
pub struct FsProbe;

impl ArtifactProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<F> ArtifactProbe for F
where
    F: Fn(&Path) -> bool + Sync,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Detects artifacts that already exist at any of an item's candidate locations.
///
/// The check is best-effort and not atomic: two runs racing on the same locations can both see
/// "absent" and both produce the artifact. Nothing here claims or locks a location.
#[derive(Clone, Debug, Default)]
pub struct DedupChecker<P = FsProbe> {
    probe: P,
}

impl DedupChecker<FsProbe> {
    /// Filesystem-backed checker.
    pub fn new() -> Self {
        Self { probe: FsProbe }
    }
}

impl<P: ArtifactProbe> DedupChecker<P> {
    /// Checker backed by a custom probe.
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// First candidate that already holds an artifact, checked in order.
    pub fn first_hit(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates.iter().find(|p| self.probe.exists(p)).cloned()
    }

    /// Return `true` when `item` already has an artifact at any candidate location.
    pub fn exists<S>(&self, item: &WorkItem<S>) -> bool {
        self.first_hit(item.candidates()).is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/dedup.rs"]
mod tests;
