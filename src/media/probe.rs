use std::path::{Path, PathBuf};

use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};

/// What `ffprobe` reports about a media file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Container duration in seconds; `0.0` when unknown.
    pub duration_secs: f64,
    /// Size of the first video stream, if any.
    pub video: Option<FrameSize>,
    /// `true` when at least one audio stream exists.
    pub has_audio: bool,
}

impl MediaInfo {
    /// Duration, or an error when the container does not report a positive one.
    pub fn require_duration(&self) -> ReelResult<f64> {
        if self.duration_secs.is_finite() && self.duration_secs > 0.0 {
            Ok(self.duration_secs)
        } else {
            Err(ReelError::media(format!(
                "'{}' has no usable duration",
                self.source_path.display()
            )))
        }
    }

    /// Video size, or an error for audio-only files.
    pub fn require_video(&self) -> ReelResult<FrameSize> {
        self.video.ok_or_else(|| {
            ReelError::media(format!(
                "no video stream found in '{}'",
                self.source_path.display()
            ))
        })
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Run `ffprobe` on `source_path`.
pub fn probe_media(source_path: &Path) -> ReelResult<MediaInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ReelError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(source_path, &out.stdout)
}

/// Interpret `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(source_path: &Path, json: &[u8]) -> ReelResult<MediaInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ReelError::media(format!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| match (s.width, s.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(FrameSize::new(w, h)),
            _ => None,
        });
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        source_path: source_path.to_path_buf(),
        duration_secs,
        video,
        has_audio,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
