use std::path::Path;

use anyhow::Context as _;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::animation::timeline::FrameTransform;
use crate::foundation::core::{Affine, FrameSize, Point};
use crate::foundation::error::{ReelError, ReelResult};

/// A card image placed at the center of a transparent canvas.
#[derive(Clone, Debug)]
pub struct CardLayer {
    card: RgbaImage,
    canvas: FrameSize,
}

impl CardLayer {
    /// Layer for `card` on a `canvas`-sized frame.
    pub fn new(card: RgbaImage, canvas: FrameSize) -> ReelResult<Self> {
        if card.width() == 0 || card.height() == 0 {
            return Err(ReelError::validation("card image must be non-empty"));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ReelError::validation("canvas must be non-empty"));
        }
        Ok(Self { card, canvas })
    }

    /// Decode a card image file.
    pub fn open(path: &Path, canvas: FrameSize) -> ReelResult<Self> {
        let card = image::open(path)
            .with_context(|| format!("decode card image '{}'", path.display()))?
            .to_rgba8();
        Self::new(card, canvas)
    }

    /// Unscaled card size.
    pub fn card_size(&self) -> FrameSize {
        FrameSize::new(self.card.width(), self.card.height())
    }

    /// Output canvas size.
    pub fn canvas(&self) -> FrameSize {
        self.canvas
    }

    /// Rasterize one frame: scale the card, rotate it in place for the Z axis, then center it.
    ///
    /// Pixels outside the card stay fully transparent. A card larger than the canvas is clipped
    /// symmetrically.
    pub fn render(&self, xf: &FrameTransform) -> RgbaImage {
        let size = xf.output_size(self.card_size());
        let mut card = imageops::resize(&self.card, size.width, size.height, FilterType::Triangle);
        if xf.rotation_deg.is_some() {
            card = rotate_in_place(&card, xf.rotation_about_center(size));
        }

        let mut frame = RgbaImage::new(self.canvas.width, self.canvas.height);
        let x = (i64::from(self.canvas.width) - i64::from(size.width)) / 2;
        let y = (i64::from(self.canvas.height) - i64::from(size.height)) / 2;
        imageops::replace(&mut frame, &card, x, y);
        frame
    }
}

/// Resample `src` through `forward` into an image of the same size.
fn rotate_in_place(src: &RgbaImage, forward: Affine) -> RgbaImage {
    let inverse = forward.inverse();
    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        sample_bilinear(src, p.x - 0.5, p.y - 0.5)
    })
}

/// Bilinear sample in premultiplied space; outside the image is transparent.
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (premul_at(src, x0, y0), (1.0 - fx) * (1.0 - fy)),
        (premul_at(src, x0 + 1, y0), fx * (1.0 - fy)),
        (premul_at(src, x0, y0 + 1), (1.0 - fx) * fy),
        (premul_at(src, x0 + 1, y0 + 1), fx * fy),
    ];
    let mut acc = [0.0f32; 4];
    for (px, w) in taps {
        for (a, c) in acc.iter_mut().zip(px) {
            *a += c * w;
        }
    }

    let alpha = acc[3];
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremul = |c: f32| (c / alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremul(acc[0]),
        unpremul(acc[1]),
        unpremul(acc[2]),
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}

fn premul_at(src: &RgbaImage, x: i64, y: i64) -> [f32; 4] {
    if x < 0 || y < 0 || x >= i64::from(src.width()) || y >= i64::from(src.height()) {
        return [0.0; 4];
    }
    let Rgba([r, g, b, a]) = *src.get_pixel(x as u32, y as u32);
    let a = f32::from(a);
    let k = a / 255.0;
    [f32::from(r) * k, f32::from(g) * k, f32::from(b) * k, a]
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
