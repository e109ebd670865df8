use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        canvas: FrameSize::new(4, 2),
        fps: Fps::new(30, 1).unwrap(),
        duration_secs: 1.0,
    }
}

#[test]
fn in_memory_sink_records_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let frame = image::RgbaImage::new(4, 2);
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(2), &frame).unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(&cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 2]);
}

#[test]
fn in_memory_sink_rejects_repeated_index() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let frame = image::RgbaImage::new(4, 2);
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame).is_err());
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[test]
fn begin_resets_previous_capture() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &image::RgbaImage::new(4, 2))
        .unwrap();
    sink.end().unwrap();

    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}
