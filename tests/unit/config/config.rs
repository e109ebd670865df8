use super::*;

#[test]
fn defaults_validate_and_match_documented_values() {
    let cfg = StudioConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.voice.voice_id, "ijEuPMqoI2gEEA41kGv3");
    assert_eq!(cfg.voice.model_id, "eleven_flash_v2_5");
    assert_eq!(cfg.animation.flip_ratio, 0.03);
    assert_eq!(cfg.render.canvas, FrameSize::new(1920, 1080));
    assert_eq!(cfg.shorts.suffix, "_short");
    assert_eq!(cfg.concurrency, None);
}

#[test]
fn partial_json_keeps_defaults_for_missing_fields() {
    let cfg: StudioConfig = serde_json::from_str(
        r#"{
            "paths": { "root": "/data", "shorts_dirs": ["shorts", "/mnt/archive/shorts"] },
            "animation": { "flip_axis": "z", "end_scale": 0.9 },
            "concurrency": 3
        }"#,
    )
    .unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.animation.flip_axis, crate::animation::timeline::FlipAxis::Z);
    assert_eq!(cfg.animation.start_scale, 0.4);
    assert_eq!(cfg.animation.end_scale, 0.9);
    assert_eq!(cfg.paths.audio_dir(), PathBuf::from("/data/audio"));
    assert_eq!(
        cfg.paths.shorts_dirs(),
        vec![
            PathBuf::from("/data/shorts"),
            PathBuf::from("/mnt/archive/shorts")
        ]
    );
    assert_eq!(cfg.concurrency, Some(3));
}

#[test]
fn invalid_values_are_rejected() {
    let mut cfg = StudioConfig::default();
    cfg.paths.shorts_dirs.clear();
    assert!(cfg.validate().is_err());

    let mut cfg = StudioConfig::default();
    cfg.render.canvas = FrameSize::new(1921, 1080);
    assert!(cfg.validate().is_err());

    let mut cfg = StudioConfig::default();
    cfg.concurrency = Some(0);
    assert!(cfg.validate().is_err());

    let mut cfg = StudioConfig::default();
    cfg.collaborators.speech_command = Some(vec![]);
    assert!(cfg.validate().is_err());

    let mut cfg = StudioConfig::default();
    cfg.render.music_volume = -0.5;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_path_reports_missing_file() {
    let err = StudioConfig::from_path(Path::new("target/definitely/missing.json")).unwrap_err();
    assert!(err.to_string().contains("read config"));
}

#[test]
fn with_root_rebases_relative_paths() {
    let cfg = StudioConfig::default().with_root("/srv/reel");
    assert_eq!(cfg.paths.videos_dir(), PathBuf::from("/srv/reel/videos"));
    assert_eq!(
        cfg.paths.background_video(),
        PathBuf::from("/srv/reel/assets/background.mp4")
    );
}
