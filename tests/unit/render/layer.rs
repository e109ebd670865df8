use super::*;
use crate::animation::timeline::Phase;

fn solid(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([200, 30, 30, 255]))
}

fn zoom(magnification: f64) -> FrameTransform {
    FrameTransform {
        phase: Phase::Zoom,
        progress: 1.0,
        magnification,
        foreshorten_x: 1.0,
        foreshorten_y: 1.0,
        rotation_deg: None,
    }
}

#[test]
fn scaled_card_is_centered_on_transparent_canvas() {
    let layer = CardLayer::new(solid(100, 200), FrameSize::new(400, 400)).unwrap();
    let frame = layer.render(&zoom(0.5));

    assert_eq!(frame.dimensions(), (400, 400));
    assert_eq!(frame.get_pixel(0, 0)[3], 0);
    assert_eq!(frame.get_pixel(200, 200)[3], 255);
    assert_eq!(frame.get_pixel(175, 150)[3], 255);
    assert_eq!(frame.get_pixel(224, 249)[3], 255);
    assert_eq!(frame.get_pixel(174, 200)[3], 0);
    assert_eq!(frame.get_pixel(225, 200)[3], 0);
    assert_eq!(frame.get_pixel(200, 250)[3], 0);
}

#[test]
fn oversized_card_is_clipped_symmetrically() {
    let layer = CardLayer::new(solid(200, 200), FrameSize::new(300, 300)).unwrap();
    let frame = layer.render(&zoom(2.0));
    assert!(frame.pixels().all(|p| p[3] == 255));
}

#[test]
fn edge_on_flip_leaves_a_single_row() {
    let layer = CardLayer::new(solid(100, 100), FrameSize::new(200, 200)).unwrap();
    let xf = FrameTransform {
        foreshorten_y: 90f64.to_radians().cos().abs(),
        ..zoom(1.0)
    };
    let frame = layer.render(&xf);
    let opaque_rows: Vec<u32> = (0..200)
        .filter(|&y| frame.get_pixel(100, y)[3] > 0)
        .collect();
    assert_eq!(opaque_rows, vec![99]);
}

#[test]
fn z_rotation_turns_card_in_place() {
    let layer = CardLayer::new(solid(100, 20), FrameSize::new(200, 200)).unwrap();
    let xf = FrameTransform {
        phase: Phase::Flip,
        progress: 0.0,
        rotation_deg: Some(90.0),
        ..zoom(1.0)
    };
    let frame = layer.render(&xf);

    assert_eq!(frame.get_pixel(100, 100)[3], 255);
    assert_eq!(frame.get_pixel(95, 100)[3], 255);
    assert_eq!(frame.get_pixel(55, 100)[3], 0);
    assert_eq!(frame.get_pixel(145, 100)[3], 0);
}

#[test]
fn zero_rotation_matches_plain_scale() {
    let mut card = solid(40, 40);
    card.put_pixel(3, 5, Rgba([0, 255, 0, 255]));
    let layer = CardLayer::new(card, FrameSize::new(80, 80)).unwrap();
    let plain = layer.render(&zoom(1.0));
    let rotated = layer.render(&FrameTransform {
        rotation_deg: Some(0.0),
        ..zoom(1.0)
    });
    assert_eq!(plain, rotated);
}

#[test]
fn empty_inputs_are_rejected() {
    assert!(CardLayer::new(RgbaImage::new(0, 10), FrameSize::new(10, 10)).is_err());
    assert!(CardLayer::new(solid(10, 10), FrameSize::new(0, 10)).is_err());
}

#[test]
fn open_reports_missing_file() {
    let err = CardLayer::open(Path::new("target/render_unit/missing.png"), FrameSize::new(8, 8))
        .unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}
