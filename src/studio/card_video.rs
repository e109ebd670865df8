use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::animation::timeline::AnimationTimeline;
use crate::batch::item::WorkItem;
use crate::batch::scheduler::Produce;
use crate::catalog::CardRecord;
use crate::config::StudioConfig;
use crate::encode::ffmpeg::{AudioLayer, FfmpegSink, FfmpegSinkOpts};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::stable_pick;
use crate::foundation::naming::{AUDIO_EXT, ArtifactStem, stem_with_ext};
use crate::media::probe::probe_media;
use crate::render::frames::render_to_sink;
use crate::render::layer::CardLayer;
use crate::studio::narration::Narrator;

const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Locates the artwork for a card.
pub trait ImageSource: Send + Sync {
    /// Path of a decodable image for `card`.
    fn card_image(&self, card: &CardRecord, stem: &ArtifactStem) -> ReelResult<PathBuf>;
}

/// Artwork stored as `<dir>/<stem>.{png,jpg,jpeg,webp}`.
#[derive(Clone, Debug)]
pub struct LocalImageDir {
    dir: PathBuf,
}

impl LocalImageDir {
    /// Look up images in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ImageSource for LocalImageDir {
    fn card_image(&self, card: &CardRecord, stem: &ArtifactStem) -> ReelResult<PathBuf> {
        for ext in IMAGE_EXTS {
            let path = self.dir.join(format!("{stem}.{ext}"));
            if path.is_file() {
                return Ok(path);
            }
        }
        let hint = card
            .image_url()
            .map(|u| format!(" (artwork: {u})"))
            .unwrap_or_default();
        Err(ReelError::not_found(format!(
            "no image for '{}' in '{}'{hint}",
            card.name,
            self.dir.display()
        )))
    }
}

/// One work item per card, identity = card name, candidate = `videos_dir/<stem>.mp4`.
///
/// Cards whose names sanitize to nothing, or to a stem already taken earlier in the list, are
/// dropped with a warning.
pub fn card_work_items(cards: Vec<CardRecord>, cfg: &StudioConfig) -> Vec<WorkItem<CardRecord>> {
    let videos_dir = cfg.paths.videos_dir();
    card_items(cards, |stem| vec![videos_dir.join(stem.video_file())])
}

/// Narration-only work items: candidate = `audio_dir/<stem>.mp3`, produced by [`Narrator`].
pub fn card_audio_items(cards: Vec<CardRecord>, cfg: &StudioConfig) -> Vec<WorkItem<CardRecord>> {
    let audio_dir = cfg.paths.audio_dir();
    card_items(cards, |stem| vec![audio_dir.join(stem.audio_file())])
}

fn card_items(
    cards: Vec<CardRecord>,
    candidates: impl Fn(&ArtifactStem) -> Vec<PathBuf>,
) -> Vec<WorkItem<CardRecord>> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(cards.len());
    for card in cards {
        let stem = match ArtifactStem::new(&card.name) {
            Ok(stem) => stem,
            Err(e) => {
                tracing::warn!(error = %e, "skipping card");
                continue;
            }
        };
        if !seen.insert(stem.clone()) {
            tracing::warn!(identity = %stem, name = %card.name, "duplicate identity; skipping");
            continue;
        }
        let candidates = candidates(&stem);
        items.push(WorkItem::new(card.name.clone(), card, candidates));
    }
    items
}

/// Background track for `identity`: the configured one, else a stable pick from `dir`.
///
/// `Ok(None)` when the directory has no audio files (or does not exist).
pub fn pick_music(dir: &Path, fixed: Option<&str>, identity: &str) -> ReelResult<Option<PathBuf>> {
    if let Some(track) = fixed {
        let path = dir.join(format!("{track}.{AUDIO_EXT}"));
        return Ok(path.is_file().then_some(path));
    }
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut tracks = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("read music directory '{}'", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("read entry in '{}'", dir.display()))?
            .path();
        if path.is_file() && stem_with_ext(&path, AUDIO_EXT).is_some() {
            tracks.push(path);
        }
    }
    tracks.sort();
    Ok(stable_pick(identity, tracks.len()).map(|i| tracks.swap_remove(i)))
}

/// Card video production: narration, flip/zoom card layer, composite over the background.
pub struct CardVideoPipeline<'a> {
    cfg: &'a StudioConfig,
    narrator: Narrator,
    images: Box<dyn ImageSource>,
}

impl<'a> CardVideoPipeline<'a> {
    /// Pipeline using the collaborators and image directory from `cfg`.
    pub fn from_config(cfg: &'a StudioConfig) -> ReelResult<Self> {
        Ok(Self {
            cfg,
            narrator: Narrator::from_config(cfg)?,
            images: Box::new(LocalImageDir::new(cfg.paths.card_images_dir())),
        })
    }

    /// Replace the narrator.
    pub fn with_narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = narrator;
        self
    }

    /// Replace the image source.
    pub fn with_images(mut self, images: impl ImageSource + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    /// Optional audio layers that exist on disk.
    fn extra_audio(&self, identity: &str) -> ReelResult<(Option<AudioLayer>, Option<AudioLayer>)> {
        let render = &self.cfg.render;
        let music_dir = self.cfg.paths.music_dir();
        let music = match pick_music(&music_dir, render.music_track.as_deref(), identity)? {
            Some(path) => {
                tracing::debug!(music = %path.display(), "background music");
                Some(AudioLayer::looped(path, render.music_volume))
            }
            None => {
                tracing::warn!(dir = %music_dir.display(), "no background music found; continuing without");
                None
            }
        };

        let sfx_path = self.cfg.paths.sfx();
        let sfx = if sfx_path.is_file() {
            Some(AudioLayer::once(sfx_path, render.sfx_volume))
        } else {
            tracing::warn!(sfx = %sfx_path.display(), "sound effect missing; continuing without");
            None
        };
        Ok((music, sfx))
    }
}

impl Produce<CardRecord> for CardVideoPipeline<'_> {
    #[tracing::instrument(skip_all, fields(identity = item.identity()))]
    fn produce(&self, item: &WorkItem<CardRecord>) -> ReelResult<PathBuf> {
        let card = item.source();
        let stem = ArtifactStem::new(&card.name)?;
        let out = item
            .primary_output()
            .ok_or_else(|| ReelError::validation("card work item has no output location"))?
            .to_path_buf();

        let narration = self.narrator.ensure_audio(card, &stem)?;
        let duration = probe_media(&narration)?.require_duration()?;
        let timeline = AnimationTimeline::new(duration, self.cfg.animation.clone())?;

        let image = self.images.card_image(card, &stem)?;
        let layer = CardLayer::open(&image, self.cfg.render.canvas)?;

        let background = self.cfg.paths.background_video();
        if !background.is_file() {
            return Err(ReelError::not_found(format!(
                "background video '{}' does not exist",
                background.display()
            )));
        }
        let (music, sfx) = self.extra_audio(item.identity())?;

        let render = &self.cfg.render;
        let mut opts = FfmpegSinkOpts::new(&out, background, narration);
        opts.narration.volume = render.narration_volume;
        opts.music = music;
        opts.sfx = sfx;
        opts.video_codec = render.video_codec.clone();
        opts.audio_bitrate = render.audio_bitrate.clone();

        tracing::info!(duration, "rendering card video");
        let mut sink = FfmpegSink::new(opts);
        let stats = render_to_sink(&layer, &timeline, render.fps, render.chunk_size, &mut sink)?;
        tracing::info!(
            out = %out.display(),
            frames = stats.frames_total,
            elided = stats.frames_elided,
            "card video written"
        );
        Ok(out)
    }
}

impl std::fmt::Debug for CardVideoPipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardVideoPipeline")
            .field("narrator", &self.narrator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/card_video.rs"]
mod tests;
