use rayon::prelude::*;

use crate::animation::timeline::{AnimationTimeline, FrameTransform};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameSize};
use crate::foundation::error::ReelResult;
use crate::render::layer::CardLayer;

/// Frame counters for one render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames actually rasterized.
    pub frames_rendered: u64,
    /// Frames reused from an identical predecessor.
    pub frames_elided: u64,
}

/// Number of frames covering the timeline at `fps`.
pub fn frame_count(timeline: &AnimationTimeline, fps: Fps) -> u64 {
    fps.frames_covering(timeline.duration_secs())
}

/// Render the frame at timeline time `t` seconds.
pub fn render_at(layer: &CardLayer, timeline: &AnimationTimeline, t: f64) -> image::RgbaImage {
    layer.render(&timeline.sample(t))
}

/// Render every frame of `timeline` into `sink`, `chunk_size` frames at a time.
///
/// Frames inside a chunk rasterize in parallel; the sink always receives them in index order.
/// Consecutive frames with the same pixel size and rotation are rendered once.
pub fn render_to_sink(
    layer: &CardLayer,
    timeline: &AnimationTimeline,
    fps: Fps,
    chunk_size: usize,
    sink: &mut dyn FrameSink,
) -> ReelResult<RenderStats> {
    let total = frame_count(timeline, fps);
    sink.begin(SinkConfig {
        canvas: layer.canvas(),
        fps,
        duration_secs: timeline.duration_secs(),
    })?;

    let chunk = chunk_size.max(1) as u64;
    let mut stats = RenderStats::default();
    let mut start = 0u64;
    while start < total {
        let end = (start + chunk).min(total);
        let transforms: Vec<FrameTransform> = (start..end)
            .map(|f| timeline.sample(fps.frame_time_secs(FrameIndex(f))))
            .collect();

        let (unique, frame_to_unique) = elide_repeats(layer.card_size(), &transforms);
        let rendered: Vec<image::RgbaImage> = unique
            .par_iter()
            .map(|&i| layer.render(&transforms[i]))
            .collect();

        for (offset, u) in frame_to_unique.into_iter().enumerate() {
            sink.push_frame(FrameIndex(start + offset as u64), &rendered[u])?;
        }

        stats.frames_total += end - start;
        stats.frames_rendered += unique.len() as u64;
        start = end;
    }
    stats.frames_elided = stats.frames_total - stats.frames_rendered;

    sink.end()?;
    Ok(stats)
}

/// Indices of frames that need rasterizing, and for each frame the slot of its raster.
fn elide_repeats(card: FrameSize, transforms: &[FrameTransform]) -> (Vec<usize>, Vec<usize>) {
    let mut unique = Vec::new();
    let mut frame_to_unique = Vec::with_capacity(transforms.len());
    let mut prev: Option<(FrameSize, Option<u64>)> = None;
    for (i, xf) in transforms.iter().enumerate() {
        let key = (xf.output_size(card), xf.rotation_deg.map(f64::to_bits));
        if prev != Some(key) {
            unique.push(i);
            prev = Some(key);
        }
        frame_to_unique.push(unique.len() - 1);
    }
    (unique, frame_to_unique)
}

#[cfg(test)]
#[path = "../../tests/unit/render/frames.rs"]
mod tests;
