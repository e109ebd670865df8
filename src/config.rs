//! Immutable studio configuration.
//!
//! Loaded once (optionally from JSON), validated, then passed by reference into the scheduler and
//! the production pipelines. Every field has a default so partial config files are accepted.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::animation::timeline::AnimationSpec;
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Filesystem layout.
    pub paths: PathsConfig,
    /// Speech synthesis voice.
    pub voice: VoiceProfile,
    /// Narration script generation.
    pub narration: NarrationConfig,
    /// Card reveal animation.
    pub animation: AnimationSpec,
    /// Card video rendering and encoding.
    pub render: RenderConfig,
    /// Vertical short cropping.
    pub shorts: ShortsConfig,
    /// External collaborator commands.
    pub collaborators: CollaboratorsConfig,
    /// Worker count override; `None` derives it from available parallelism.
    pub concurrency: Option<usize>,
}

/// Directory and asset layout. Relative paths resolve against `root`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for every relative path below.
    pub root: PathBuf,
    /// Narration audio directory.
    pub audio_dir: PathBuf,
    /// Full video output directory; also the shorts batch source directory.
    pub videos_dir: PathBuf,
    /// Candidate roots for short-form variants, checked in order; output goes to the first.
    pub shorts_dirs: Vec<PathBuf>,
    /// Local card image directory (`<sanitized name>.{png,jpg,jpeg}`).
    pub card_images_dir: PathBuf,
    /// Background video looped under every card.
    pub background_video: PathBuf,
    /// Directory of background music tracks.
    pub music_dir: PathBuf,
    /// Reveal sound effect.
    pub sfx: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            audio_dir: PathBuf::from("audio"),
            videos_dir: PathBuf::from("videos"),
            shorts_dirs: vec![PathBuf::from("shorts")],
            card_images_dir: PathBuf::from("cards"),
            background_video: PathBuf::from("assets/background.mp4"),
            music_dir: PathBuf::from("assets/music"),
            sfx: PathBuf::from("assets/sfx/sfx.mp3"),
        }
    }
}

impl PathsConfig {
    /// Resolve `p` against `root` unless it is already absolute.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Resolved narration audio directory.
    pub fn audio_dir(&self) -> PathBuf {
        self.resolve(&self.audio_dir)
    }

    /// Resolved video directory.
    pub fn videos_dir(&self) -> PathBuf {
        self.resolve(&self.videos_dir)
    }

    /// Resolved shorts candidate roots, in configured order.
    pub fn shorts_dirs(&self) -> Vec<PathBuf> {
        self.shorts_dirs.iter().map(|p| self.resolve(p)).collect()
    }

    /// Resolved card image directory.
    pub fn card_images_dir(&self) -> PathBuf {
        self.resolve(&self.card_images_dir)
    }

    /// Resolved background video path.
    pub fn background_video(&self) -> PathBuf {
        self.resolve(&self.background_video)
    }

    /// Resolved music directory.
    pub fn music_dir(&self) -> PathBuf {
        self.resolve(&self.music_dir)
    }

    /// Resolved sfx path.
    pub fn sfx(&self) -> PathBuf {
        self.resolve(&self.sfx)
    }
}

/// Voice and model identifiers for speech synthesis.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VoiceProfile {
    /// Provider voice identifier.
    pub voice_id: String,
    /// Provider model identifier.
    pub model_id: String,
    /// Provider output format.
    pub output_format: String,
    /// Voice stability in `[0, 1]`.
    pub stability: f64,
    /// Similarity boost in `[0, 1]`.
    pub similarity_boost: f64,
    /// Speaking rate multiplier.
    pub speed: f64,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: "ijEuPMqoI2gEEA41kGv3".to_string(),
            model_id: "eleven_flash_v2_5".to_string(),
            output_format: "mp3_44100_128".to_string(),
            stability: 0.70,
            similarity_boost: 0.99,
            speed: 0.95,
        }
    }
}

/// Narration script settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Language model identifier passed to the script writer.
    pub script_model: String,
    /// Ask for a closing subscribe remark at the end of the script.
    pub closing_remark: bool,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            script_model: "gpt-4o-mini".to_string(),
            closing_remark: false,
        }
    }
}

/// Card video composition and encoding settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output canvas.
    pub canvas: FrameSize,
    /// Output frame rate.
    pub fps: Fps,
    /// Frames rendered per parallel chunk.
    pub chunk_size: usize,
    /// Narration gain.
    pub narration_volume: f64,
    /// Background music gain.
    pub music_volume: f64,
    /// Fixed track stem in the music directory; `None` picks one per item.
    pub music_track: Option<String>,
    /// Sound effect gain.
    pub sfx_volume: f64,
    /// `ffmpeg` video encoder.
    pub video_codec: String,
    /// `ffmpeg` audio bitrate.
    pub audio_bitrate: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: FrameSize::new(1920, 1080),
            fps: Fps::default(),
            chunk_size: 64,
            narration_volume: 1.0,
            music_volume: 0.1,
            music_track: None,
            sfx_volume: 0.7,
            video_codec: "libx264".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

/// Vertical short settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShortsConfig {
    /// Output size after cropping.
    pub size: FrameSize,
    /// `ffmpeg` video encoder.
    pub video_codec: String,
    /// `ffmpeg` encoder preset.
    pub preset: String,
    /// Target video bitrate.
    pub bitrate: String,
    /// Suffix appended to the file stem.
    pub suffix: String,
}

impl Default for ShortsConfig {
    fn default() -> Self {
        Self {
            size: FrameSize::new(1080, 1920),
            video_codec: "libx264".to_string(),
            preset: "fast".to_string(),
            bitrate: "5M".to_string(),
            suffix: "_short".to_string(),
        }
    }
}

/// External commands standing in for the language model and speech services.
///
/// Each command is an argv vector; the prompt or script is written to its stdin.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CollaboratorsConfig {
    /// Prints a narration script to stdout.
    pub script_command: Option<Vec<String>>,
    /// Writes speech audio to the path given as its final argument.
    pub speech_command: Option<Vec<String>>,
}

impl StudioConfig {
    /// Load a config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate static invariants.
    pub fn validate(&self) -> ReelResult<()> {
        self.animation.validate()?;
        if self.paths.shorts_dirs.is_empty() {
            return Err(ReelError::validation(
                "paths.shorts_dirs must name at least one directory",
            ));
        }
        if self.render.canvas.width == 0 || self.render.canvas.height == 0 {
            return Err(ReelError::validation("render.canvas must be non-empty"));
        }
        if !self.render.canvas.is_even() {
            return Err(ReelError::validation(
                "render.canvas width/height must be even (required for yuv420p output)",
            ));
        }
        Fps::new(self.render.fps.num, self.render.fps.den)?;
        for (name, v) in [
            ("render.narration_volume", self.render.narration_volume),
            ("render.music_volume", self.render.music_volume),
            ("render.sfx_volume", self.render.sfx_volume),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ReelError::validation(format!("{name} must be finite and >= 0")));
            }
        }
        if self.shorts.size.width == 0 || self.shorts.size.height == 0 {
            return Err(ReelError::validation("shorts.size must be non-empty"));
        }
        if self.concurrency == Some(0) {
            return Err(ReelError::validation("concurrency must be >= 1 when set"));
        }
        for (name, cmd) in [
            ("collaborators.script_command", &self.collaborators.script_command),
            ("collaborators.speech_command", &self.collaborators.speech_command),
        ] {
            if cmd.as_ref().is_some_and(|argv| argv.is_empty()) {
                return Err(ReelError::validation(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// Return a copy rooted at `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.paths.root = root.into();
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
