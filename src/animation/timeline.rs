//! Two-phase reveal timeline.
//!
//! A timeline of duration `T` is split at `T_flip = T * flip_ratio`:
//!
//! - **Flip** (`0 <= t <= T_flip`): the rotation angle interpolates from `rotation_start_deg` to
//!   `rotation_end_deg`. Axes `x`/`y` foreshorten height/width by `|cos(angle)|`; axis `z` rotates
//!   in-plane about the frame center instead. Magnification stays at `start_scale`.
//! - **Zoom** (`T_flip < t <= T`): magnification interpolates from `start_scale` to `end_scale`
//!   with no rotation or foreshortening.
//!
//! Sampling is a pure function of `t`, so frames may be evaluated in any order and from any thread.

use crate::foundation::core::{Affine, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::lerp;

/// Axis the card flips about during the flip phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FlipAxis {
    /// Horizontal axis: height is foreshortened.
    #[default]
    X,
    /// Vertical axis: width is foreshortened.
    Y,
    /// Screen normal: in-plane rotation, no foreshortening.
    Z,
}

impl FlipAxis {
    /// Parse an axis name; anything other than `x`, `y` or `z` falls back to [`FlipAxis::Y`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "x" => Self::X,
            "z" => Self::Z,
            _ => Self::Y,
        }
    }
}

impl From<String> for FlipAxis {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

/// Reveal parameters independent of the clip duration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationSpec {
    /// Angle at `t = 0`, in degrees.
    pub rotation_start_deg: f64,
    /// Angle at `t = T_flip`, in degrees.
    pub rotation_end_deg: f64,
    /// Flip axis.
    pub flip_axis: FlipAxis,
    /// Fraction of the total duration spent flipping, in `[0, 1]`.
    pub flip_ratio: f64,
    /// Magnification during the flip and at the start of the zoom.
    pub start_scale: f64,
    /// Magnification at `t = T`.
    pub end_scale: f64,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            rotation_start_deg: 90.0,
            rotation_end_deg: 0.0,
            flip_axis: FlipAxis::X,
            flip_ratio: 0.03,
            start_scale: 0.4,
            end_scale: 0.7,
        }
    }
}

impl AnimationSpec {
    /// Validate static invariants.
    pub fn validate(&self) -> ReelResult<()> {
        if !self.rotation_start_deg.is_finite() || !self.rotation_end_deg.is_finite() {
            return Err(ReelError::validation("rotation angles must be finite"));
        }
        if !(0.0..=1.0).contains(&self.flip_ratio) {
            return Err(ReelError::validation("flip_ratio must be within [0, 1]"));
        }
        for (name, v) in [
            ("start_scale", self.start_scale),
            ("end_scale", self.end_scale),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ReelError::validation(format!("{name} must be finite and > 0")));
            }
        }
        Ok(())
    }
}

/// Timeline state for one sampled instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Flipping into place at fixed magnification.
    Flip,
    /// Final orientation, magnification advancing.
    Zoom,
}

/// Immutable flip/zoom timeline for one rendered item.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationTimeline {
    duration_secs: f64,
    flip_secs: f64,
    spec: AnimationSpec,
}

impl AnimationTimeline {
    /// Build a timeline spanning `duration_secs`.
    pub fn new(duration_secs: f64, spec: AnimationSpec) -> ReelResult<Self> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(ReelError::validation(
                "animation duration must be finite and >= 0",
            ));
        }
        spec.validate()?;
        Ok(Self {
            duration_secs,
            flip_secs: duration_secs * spec.flip_ratio,
            spec,
        })
    }

    /// Total duration `T` in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Flip-phase duration `T_flip` in seconds.
    pub fn flip_secs(&self) -> f64 {
        self.flip_secs
    }

    /// Parameters this timeline was built from.
    pub fn spec(&self) -> &AnimationSpec {
        &self.spec
    }

    fn clamp_time(&self, t: f64) -> f64 {
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, self.duration_secs)
        }
    }

    /// Phase active at `t` (clamped into `[0, T]`). A zero-length flip is already complete.
    pub fn phase_at(&self, t: f64) -> Phase {
        let t = self.clamp_time(t);
        if self.flip_secs > 0.0 && t <= self.flip_secs {
            Phase::Flip
        } else {
            Phase::Zoom
        }
    }

    /// Zoom-phase progress `(t - T_flip) / (T - T_flip)`, or `1.0` when the zoom span is empty.
    pub fn zoom_progress(&self, t: f64) -> f64 {
        let span = self.duration_secs - self.flip_secs;
        if span > 0.0 {
            ((t - self.flip_secs) / span).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Zoom-phase magnification at `t`.
    pub fn zoom_magnification(&self, t: f64) -> f64 {
        lerp(
            self.spec.start_scale,
            self.spec.end_scale,
            self.zoom_progress(t),
        )
    }

    /// Sample the transform for elapsed time `t` (clamped into `[0, T]`).
    pub fn sample(&self, t: f64) -> FrameTransform {
        let t = self.clamp_time(t);
        match self.phase_at(t) {
            Phase::Flip => {
                let progress = t / self.flip_secs;
                let angle_deg = lerp(
                    self.spec.rotation_start_deg,
                    self.spec.rotation_end_deg,
                    progress,
                );
                let foreshorten = angle_deg.to_radians().cos().abs();
                let (foreshorten_x, foreshorten_y, rotation_deg) = match self.spec.flip_axis {
                    FlipAxis::X => (1.0, foreshorten, None),
                    FlipAxis::Y => (foreshorten, 1.0, None),
                    FlipAxis::Z => (1.0, 1.0, Some(angle_deg)),
                };
                FrameTransform {
                    phase: Phase::Flip,
                    progress,
                    magnification: self.spec.start_scale,
                    foreshorten_x,
                    foreshorten_y,
                    rotation_deg,
                }
            }
            Phase::Zoom => FrameTransform {
                phase: Phase::Zoom,
                progress: self.zoom_progress(t),
                magnification: self.zoom_magnification(t),
                foreshorten_x: 1.0,
                foreshorten_y: 1.0,
                rotation_deg: None,
            },
        }
    }
}

/// Geometric transform for one output frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransform {
    /// Phase the sample fell in.
    pub phase: Phase,
    /// Normalized progress within `phase`, in `[0, 1]`.
    pub progress: f64,
    /// Overall magnification applied to both axes.
    pub magnification: f64,
    /// Width multiplier from a `y`-axis flip.
    pub foreshorten_x: f64,
    /// Height multiplier from an `x`-axis flip.
    pub foreshorten_y: f64,
    /// In-plane rotation in degrees (counter-clockwise on screen), `z`-axis flips only.
    pub rotation_deg: Option<f64>,
}

impl FrameTransform {
    /// Effective per-axis scale factors.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.foreshorten_x * self.magnification,
            self.foreshorten_y * self.magnification,
        )
    }

    /// Output size for a base frame, floored to at least one pixel per axis.
    pub fn output_size(&self, base: FrameSize) -> FrameSize {
        let (sx, sy) = self.scale();
        base.scaled(sx, sy)
    }

    /// Rotation about the center of a frame of `size`, mapping source pixels to output pixels.
    ///
    /// Identity when no rotation applies.
    pub fn rotation_about_center(&self, size: FrameSize) -> Affine {
        match self.rotation_deg {
            // y points down in pixel space, so a counter-clockwise turn is a negative angle.
            Some(deg) => Affine::rotate_about(-deg.to_radians(), size.center()),
            None => Affine::IDENTITY,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
