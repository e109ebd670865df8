//! cardreel batch-produces narrated card reveal videos and their vertical shorts.
//!
//! The crate has two engines:
//!
//! - a batch engine that skips items whose artifacts already exist, asks once for confirmation,
//!   fans the rest out over a bounded worker pool and reports results in input order
//!   ([`BatchScheduler`], [`summarize`]);
//! - a deterministic flip-then-zoom animator sampled per output frame ([`AnimationTimeline`]).
//!
//! Production pipelines ([`CardVideoPipeline`], [`ShortsCropper`]) plug into the batch engine via
//! [`Produce`]. Language model, speech and media codecs stay external: they are reached through
//! traits, configured commands and the system `ffmpeg`/`ffprobe`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod batch;
pub mod catalog;
pub mod config;
pub mod encode;
pub mod media;
pub mod render;
pub mod studio;

pub use crate::foundation::core::{Affine, Fps, FrameIndex, FrameSize, Point, Vec2};
pub use crate::foundation::error::{ReelError, ReelResult};
pub use crate::foundation::naming::{
    AUDIO_EXT, ArtifactStem, VIDEO_EXT, sanitize_filename, stem_with_ext,
};

pub use crate::animation::timeline::{
    AnimationSpec, AnimationTimeline, FlipAxis, FrameTransform, Phase,
};
pub use crate::batch::dedup::{ArtifactProbe, DedupChecker, FsProbe};
pub use crate::batch::gate::{
    AutoConfirm, ConfirmationGate, PendingSummary, PromptGate, is_affirmative,
};
pub use crate::batch::item::{ItemStatus, JobOutcome, JobResult, WorkItem};
pub use crate::batch::pool::{WorkerPool, concurrency_limit, host_concurrency_limit};
pub use crate::batch::scheduler::{BatchOutcome, BatchRun, BatchScheduler, Produce};
pub use crate::batch::summary::{BatchSummary, summarize};

pub use crate::catalog::{CardRecord, CatalogQuery, JsonCatalog, SourceProvider};
pub use crate::config::StudioConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::media::shorts::{CropPlan, ShortsCropper, shorts_work_items};
pub use crate::render::frames::{RenderStats, render_at, render_to_sink};
pub use crate::render::layer::CardLayer;
pub use crate::studio::card_video::{
    CardVideoPipeline, LocalImageDir, card_audio_items, card_work_items,
};
pub use crate::studio::narration::Narrator;
