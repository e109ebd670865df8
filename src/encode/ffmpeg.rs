use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// One mixed audio input.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioLayer {
    /// Audio file.
    pub path: PathBuf,
    /// Linear gain.
    pub volume: f64,
    /// Loop the input until the narration ends.
    pub looped: bool,
}

impl AudioLayer {
    /// Non-looping layer.
    pub fn once(path: impl Into<PathBuf>, volume: f64) -> Self {
        Self {
            path: path.into(),
            volume,
            looped: false,
        }
    }

    /// Layer that repeats for the full clip.
    pub fn looped(path: impl Into<PathBuf>, volume: f64) -> Self {
        Self {
            path: path.into(),
            volume,
            looped: true,
        }
    }
}

/// Options for [`FfmpegSink`] card video output.
///
/// The piped card layer is overlaid on `background`, which loops for the clip duration. The
/// narration drives the audio length; optional layers are mixed under it.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Final MP4 path. Encoding goes to a staging file that is renamed here on success.
    pub out_path: PathBuf,
    /// Background video.
    pub background: PathBuf,
    /// Narration track.
    pub narration: AudioLayer,
    /// Background music.
    pub music: Option<AudioLayer>,
    /// Reveal sound effect.
    pub sfx: Option<AudioLayer>,
    /// `ffmpeg` video encoder.
    pub video_codec: String,
    /// AAC bitrate.
    pub audio_bitrate: String,
}

impl FfmpegSinkOpts {
    /// Options writing to `out_path` over `background` with `narration` at unit gain.
    pub fn new(
        out_path: impl Into<PathBuf>,
        background: impl Into<PathBuf>,
        narration: impl Into<PathBuf>,
    ) -> Self {
        Self {
            out_path: out_path.into(),
            background: background.into(),
            narration: AudioLayer::once(narration, 1.0),
            music: None,
            sfx: None,
            video_codec: "libx264".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }

    fn audio_layers(&self) -> Vec<&AudioLayer> {
        std::iter::once(&self.narration)
            .chain(self.music.as_ref())
            .chain(self.sfx.as_ref())
            .collect()
    }
}

/// Sink that spawns the system `ffmpeg`, streams RGBA card frames to stdin and composites them.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    staging: PathBuf,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        let staging = staging_path(&opts.out_path);
        Self {
            opts,
            staging,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if cfg.canvas.width == 0 || cfg.canvas.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.canvas.is_even() {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if !cfg.duration_secs.is_finite() || cfg.duration_secs <= 0.0 {
            return Err(ReelError::validation("clip duration must be positive"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !is_tool_on_path("ffmpeg") {
            return Err(ReelError::media(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(composite_args(&cfg, &self.opts, &self.staging))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::media(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::media("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::media("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg started");
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &image::RgbaImage) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::media("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::media(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width() != cfg.canvas.width || frame.height() != cfg.canvas.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.canvas.width,
                cfg.canvas.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::media("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(frame.as_raw()).map_err(|e| {
            ReelError::media(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::media("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReelError::media(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::media("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::media(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let _ = std::fs::remove_file(&self.staging);
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::media(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        promote_staging(&self.staging, &self.opts.out_path)?;
        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Abandoned mid-stream: stop the encoder and discard the partial file.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            let _ = std::fs::remove_file(&self.staging);
        }
    }
}

/// `ffmpeg` argument vector for compositing piped card frames over the background.
///
/// Input 0 is the raw RGBA pipe, input 1 the looping background, input 2 the narration; music and
/// sfx follow when present.
pub fn composite_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |a: &str| args.push(OsString::from(a));
    push("-y");
    push("-loglevel");
    push("error");
    push("-f");
    push("rawvideo");
    push("-pix_fmt");
    push("rgba");
    push("-s");
    push(&format!("{}x{}", cfg.canvas.width, cfg.canvas.height));
    push("-r");
    push(&fps_arg(cfg.fps));
    push("-i");
    push("pipe:0");
    push("-stream_loop");
    push("-1");
    push("-i");
    args.push(opts.background.clone().into_os_string());

    let layers = opts.audio_layers();
    for layer in &layers {
        if layer.looped {
            args.push("-stream_loop".into());
            args.push("-1".into());
        }
        args.push("-i".into());
        args.push(layer.path.clone().into_os_string());
    }

    args.push("-filter_complex".into());
    args.push(filter_graph(cfg, &layers).into());
    for a in [
        "-map",
        "[v]",
        "-map",
        "[a]",
        "-t",
        &format!("{:.3}", cfg.duration_secs),
        "-c:v",
        &opts.video_codec,
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-b:a",
        &opts.audio_bitrate,
        "-movflags",
        "+faststart",
        "-f",
        "mp4",
    ] {
        args.push(a.into());
    }
    args.push(out.as_os_str().to_owned());
    args
}

fn filter_graph(cfg: &SinkConfig, layers: &[&AudioLayer]) -> String {
    let (w, h) = (cfg.canvas.width, cfg.canvas.height);
    let mut graph = format!(
        "[1:v]scale={w}:{h},setsar=1,fps={}[bg];[bg][0:v]overlay=0:0:format=auto:shortest=1[v]",
        fps_arg(cfg.fps)
    );
    for (i, layer) in layers.iter().enumerate() {
        graph.push_str(&format!(";[{}:a]volume={}[a{i}]", i + 2, layer.volume));
    }
    graph.push(';');
    for i in 0..layers.len() {
        graph.push_str(&format!("[a{i}]"));
    }
    graph.push_str(&format!(
        "amix=inputs={}:duration=first:normalize=0[a]",
        layers.len()
    ));
    graph
}

fn fps_arg(fps: Fps) -> String {
    format!("{}/{}", fps.num, fps.den)
}

/// Hidden sibling path that in-progress output is written to.
///
/// `videos/A.mp4` stages as `videos/.A.partial.mp4`: the extension is kept for tools that pick the
/// container from it, and the leading dot keeps it out of directory scans and candidate lookups.
pub fn staging_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match out.extension() {
        Some(ext) => format!(".{stem}.partial.{}", ext.to_string_lossy()),
        None => format!(".{stem}.partial"),
    };
    out.with_file_name(name)
}

/// Move a finished staging file onto its final path.
pub fn promote_staging(staging: &Path, out: &Path) -> ReelResult<()> {
    use anyhow::Context as _;
    std::fs::rename(staging, out).with_context(|| {
        format!(
            "failed to move '{}' to '{}'",
            staging.display(),
            out.display()
        )
    })?;
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `tool -version` runs successfully from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
