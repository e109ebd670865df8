//! Filename sanitizing and artifact naming.
//!
//! Every artifact belonging to one work item (narration audio, full video, short) derives its file
//! stem from the same [`sanitize_filename`] call so the item resolves to one identifier everywhere.

use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};

const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Narration audio extension.
pub const AUDIO_EXT: &str = "mp3";
/// Video artifact extension (full videos and shorts).
pub const VIDEO_EXT: &str = "mp4";

/// Replace path-hostile characters with spaces and trim surrounding whitespace.
///
/// Total and idempotent: `sanitize_filename(&sanitize_filename(x)) == sanitize_filename(x)`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_CHARS.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitized file stem shared by all artifacts of one item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactStem(String);

impl ArtifactStem {
    /// Sanitize `name`; fails when nothing usable is left.
    pub fn new(name: &str) -> ReelResult<Self> {
        let stem = sanitize_filename(name);
        if stem.is_empty() {
            return Err(ReelError::validation(format!(
                "name '{name}' has no filesystem-safe characters"
            )));
        }
        Ok(Self(stem))
    }

    /// The sanitized stem.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<stem>.mp3`
    pub fn audio_file(&self) -> String {
        format!("{}.{AUDIO_EXT}", self.0)
    }

    /// `<stem>.mp4`
    pub fn video_file(&self) -> String {
        format!("{}.{VIDEO_EXT}", self.0)
    }

    /// `<stem><suffix>.mp4`
    pub fn short_file(&self, suffix: &str) -> String {
        format!("{}{suffix}.{VIDEO_EXT}", self.0)
    }

    /// Join `file_name` under each root, preserving root order.
    pub fn under_roots(roots: &[PathBuf], file_name: &str) -> Vec<PathBuf> {
        roots.iter().map(|r| r.join(file_name)).collect()
    }
}

impl std::fmt::Display for ArtifactStem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// File stem of `path` when it carries the given extension (case-insensitive).
pub fn stem_with_ext<'a>(path: &'a Path, ext: &str) -> Option<&'a str> {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if !matches {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/naming.rs"]
mod tests;
