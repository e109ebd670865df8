use super::*;
use crate::animation::timeline::AnimationSpec;
use crate::encode::sink::InMemorySink;

fn layer() -> CardLayer {
    let card = image::RgbaImage::from_pixel(60, 90, image::Rgba([10, 20, 200, 255]));
    CardLayer::new(card, FrameSize::new(128, 128)).unwrap()
}

fn fps10() -> Fps {
    Fps::new(10, 1).unwrap()
}

#[test]
fn frames_arrive_in_order_and_cover_duration() {
    let timeline = AnimationTimeline::new(1.05, AnimationSpec::default()).unwrap();
    let mut sink = InMemorySink::new();
    let stats = render_to_sink(&layer(), &timeline, fps10(), 4, &mut sink).unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 11);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!(frame.dimensions(), (128, 128));
    }
    assert_eq!(stats.frames_total, 11);
    assert_eq!(stats.frames_rendered + stats.frames_elided, 11);
    let cfg = sink.config().unwrap();
    assert_eq!(cfg.canvas, FrameSize::new(128, 128));
    assert_eq!(cfg.duration_secs, 1.05);
}

#[test]
fn chunk_size_does_not_change_output() {
    let timeline = AnimationTimeline::new(2.0, AnimationSpec::default()).unwrap();
    let mut small = InMemorySink::new();
    let mut single = InMemorySink::new();
    let mut large = InMemorySink::new();
    render_to_sink(&layer(), &timeline, fps10(), 3, &mut small).unwrap();
    render_to_sink(&layer(), &timeline, fps10(), 0, &mut single).unwrap();
    render_to_sink(&layer(), &timeline, fps10(), 64, &mut large).unwrap();

    assert_eq!(small.frames().len(), 20);
    for other in [&single, &large] {
        assert_eq!(small.frames().len(), other.frames().len());
        for (a, b) in small.frames().iter().zip(other.frames()) {
            assert_eq!(a.0, b.0);
            assert_eq!(a.1, b.1);
        }
    }
}

#[test]
fn static_frames_are_rendered_once_per_chunk() {
    let spec = AnimationSpec {
        flip_ratio: 0.0,
        start_scale: 0.5,
        end_scale: 0.5,
        ..AnimationSpec::default()
    };
    let timeline = AnimationTimeline::new(1.0, spec).unwrap();
    let mut sink = InMemorySink::new();
    let stats = render_to_sink(&layer(), &timeline, fps10(), 4, &mut sink).unwrap();

    assert_eq!(stats.frames_total, 10);
    assert_eq!(stats.frames_rendered, 3);
    assert_eq!(stats.frames_elided, 7);
    let first = &sink.frames()[0].1;
    assert!(sink.frames().iter().all(|(_, f)| f == first));
}

#[test]
fn zero_duration_still_emits_one_frame() {
    let timeline = AnimationTimeline::new(0.0, AnimationSpec::default()).unwrap();
    assert_eq!(frame_count(&timeline, fps10()), 1);
    let frame = render_at(&layer(), &timeline, 0.0);
    assert_eq!(frame.dimensions(), (128, 128));
}

#[test]
fn first_frame_is_edge_on_and_last_is_fully_zoomed() {
    let timeline = AnimationTimeline::new(1.0, AnimationSpec::default()).unwrap();
    let first = render_at(&layer(), &timeline, 0.0);
    let last = render_at(&layer(), &timeline, 1.0);

    let opaque = |img: &image::RgbaImage| img.pixels().filter(|p| p[3] > 0).count();
    let area = |t: f64| {
        let s = timeline.sample(t).output_size(FrameSize::new(60, 90));
        (s.width * s.height) as usize
    };
    assert_eq!(timeline.sample(0.0).output_size(FrameSize::new(60, 90)).height, 1);
    assert_eq!(opaque(&first), area(0.0));
    assert_eq!(opaque(&last), area(1.0));
    assert!(opaque(&last) > 40 * 60);
}
