use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::batch::item::WorkItem;
use crate::batch::scheduler::Produce;
use crate::config::{ShortsConfig, StudioConfig};
use crate::encode::ffmpeg::{ensure_parent_dir, promote_staging, staging_path};
use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::naming::{ArtifactStem, VIDEO_EXT, stem_with_ext};
use crate::media::probe::probe_media;

/// Centered 9:16 crop window in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropPlan {
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
}

impl CropPlan {
    /// Full-height window of width `floor(h * 9 / 16)`, horizontally centered.
    ///
    /// Sources already narrower than 9:16 keep their full width and crop height instead.
    pub fn for_source(source: FrameSize) -> ReelResult<Self> {
        let FrameSize { width, height } = source;
        if width == 0 || height == 0 {
            return Err(ReelError::validation("source video size must be non-empty"));
        }
        if !is_landscape_16_9(source) {
            tracing::warn!(width, height, "source is not 16:9; cropping may look unexpected");
        }

        let crop_w = (u64::from(height) * 9 / 16) as u32;
        if crop_w <= width {
            let crop_w = crop_w.max(1);
            return Ok(Self {
                width: crop_w,
                height,
                x: (width - crop_w) / 2,
                y: 0,
            });
        }
        let crop_h = ((u64::from(width) * 16 / 9).min(u64::from(height)) as u32).max(1);
        Ok(Self {
            width,
            height: crop_h,
            x: 0,
            y: (height - crop_h) / 2,
        })
    }

    /// `crop=W:H:X:Y,scale=OW:OH`
    pub fn filter(&self, out: FrameSize) -> String {
        format!(
            "crop={}:{}:{}:{},scale={}:{}",
            self.width, self.height, self.x, self.y, out.width, out.height
        )
    }
}

/// `true` for exactly 16:9 frames.
pub fn is_landscape_16_9(size: FrameSize) -> bool {
    u64::from(size.width) * 9 == u64::from(size.height) * 16
}

/// `ffmpeg` argument vector for one crop.
pub fn short_args(input: &Path, output: &Path, plan: &CropPlan, cfg: &ShortsConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-loglevel".into(), "error".into(), "-i".into()];
    args.push(input.as_os_str().to_owned());
    for a in [
        "-vf",
        &plan.filter(cfg.size),
        "-preset",
        &cfg.preset,
        "-c:v",
        &cfg.video_codec,
        "-b:v",
        &cfg.bitrate,
        "-f",
        "mp4",
    ] {
        args.push(a.into());
    }
    args.push(output.as_os_str().to_owned());
    args
}

/// Per-item pipeline turning a full video into its vertical short.
#[derive(Clone, Debug)]
pub struct ShortsCropper<'a> {
    cfg: &'a ShortsConfig,
}

impl<'a> ShortsCropper<'a> {
    /// Cropper using `cfg`.
    pub fn new(cfg: &'a ShortsConfig) -> Self {
        Self { cfg }
    }
}

impl Produce<PathBuf> for ShortsCropper<'_> {
    #[tracing::instrument(skip_all, fields(identity = item.identity()))]
    fn produce(&self, item: &WorkItem<PathBuf>) -> ReelResult<PathBuf> {
        let input = item.source();
        let output = item
            .primary_output()
            .ok_or_else(|| ReelError::validation("short work item has no output location"))?
            .to_path_buf();

        let source = probe_media(input)?.require_video()?;
        let plan = CropPlan::for_source(source)?;
        tracing::debug!(?plan, "cropping");

        ensure_parent_dir(&output)?;
        let staging = staging_path(&output);
        let out = Command::new("ffmpeg")
            .args(short_args(input, &staging, &plan, self.cfg))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ReelError::media(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;
        if !out.status.success() {
            let _ = std::fs::remove_file(&staging);
            return Err(ReelError::media(format!(
                "ffmpeg exited with status {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        promote_staging(&staging, &output)?;
        tracing::info!(out = %output.display(), "short written");
        Ok(output)
    }
}

/// One work item per `*.mp4` in the videos directory, sorted by file name.
///
/// Candidates are `<root>/<stem><suffix>.mp4` for every configured shorts root, in order; the first
/// root receives new output.
pub fn shorts_work_items(cfg: &StudioConfig) -> ReelResult<Vec<WorkItem<PathBuf>>> {
    let videos_dir = cfg.paths.videos_dir();
    let mut sources = Vec::new();
    for entry in std::fs::read_dir(&videos_dir)
        .with_context(|| format!("read videos directory '{}'", videos_dir.display()))?
    {
        let path = entry
            .with_context(|| format!("read entry in '{}'", videos_dir.display()))?
            .path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if path.is_file() && !hidden && stem_with_ext(&path, VIDEO_EXT).is_some() {
            sources.push(path);
        }
    }
    sources.sort();

    let roots = cfg.paths.shorts_dirs();
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(sources.len());
    for path in sources {
        let Some(raw) = stem_with_ext(&path, VIDEO_EXT) else {
            continue;
        };
        let stem = match ArtifactStem::new(raw) {
            Ok(stem) => stem,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping video");
                continue;
            }
        };
        if !seen.insert(stem.clone()) {
            tracing::warn!(identity = %stem, "duplicate identity; skipping");
            continue;
        }
        let candidates = ArtifactStem::under_roots(&roots, &stem.short_file(&cfg.shorts.suffix));
        items.push(WorkItem::new(stem.as_str(), path, candidates));
    }
    Ok(items)
}

#[cfg(test)]
#[path = "../../tests/unit/media/shorts.rs"]
mod tests;
