use super::*;

fn card(name: &str) -> CardRecord {
    CardRecord {
        name: name.to_string(),
        desc: "effect".to_string(),
        card_type: "Spell Card".to_string(),
        readable_type: "Quick-Play Spell".to_string(),
        card_images: vec![crate::catalog::CardImage {
            image_url: format!("https://images.example/{name}.jpg"),
        }],
    }
}

fn fresh_dir(path: &str) -> PathBuf {
    let dir = PathBuf::from(path);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn work_items_use_sanitized_video_paths_and_drop_collisions() {
    let cfg = StudioConfig::default().with_root("/srv/reels");
    let items = card_work_items(
        vec![
            card("Monster Reborn"),
            card("D/D/D Wave King"),
            card("???"),
            card("D D D Wave King"),
            card("Pot of Greed"),
        ],
        &cfg,
    );

    let ids: Vec<&str> = items.iter().map(|i| i.identity()).collect();
    assert_eq!(ids, vec!["Monster Reborn", "D/D/D Wave King", "Pot of Greed"]);
    assert_eq!(
        items[1].candidates(),
        &[PathBuf::from("/srv/reels/videos/D D D Wave King.mp4")]
    );
    assert_eq!(items[2].source().name, "Pot of Greed");
}

#[test]
fn local_images_are_found_by_stem_in_extension_order() {
    let dir = fresh_dir("target/card_video_unit_images");
    std::fs::write(dir.join("Kuriboh.jpg"), b"j").unwrap();
    std::fs::write(dir.join("Kuriboh.png"), b"p").unwrap();
    let source = LocalImageDir::new(&dir);

    let stem = ArtifactStem::new("Kuriboh").unwrap();
    assert_eq!(
        source.card_image(&card("Kuriboh"), &stem).unwrap(),
        dir.join("Kuriboh.png")
    );

    let missing = ArtifactStem::new("Exodia").unwrap();
    let err = source.card_image(&card("Exodia"), &missing).unwrap_err();
    assert!(matches!(err, ReelError::NotFound(_)));
    assert!(err.to_string().contains("https://images.example/Exodia.jpg"));
}

#[test]
fn music_pick_is_stable_per_identity() {
    let dir = fresh_dir("target/card_video_unit_music");
    for n in 1..=5 {
        std::fs::write(dir.join(format!("{n}.mp3")), b"m").unwrap();
    }
    std::fs::write(dir.join("cover.png"), b"x").unwrap();

    let a = pick_music(&dir, None, "Dark Magician").unwrap().unwrap();
    let b = pick_music(&dir, None, "Dark Magician").unwrap().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.extension().and_then(|e| e.to_str()), Some("mp3"));

    let picks: HashSet<PathBuf> = ["a", "b", "c", "d", "e", "f", "g", "h"]
        .iter()
        .filter_map(|id| pick_music(&dir, None, id).unwrap())
        .collect();
    assert!(picks.len() > 1);
}

#[test]
fn fixed_track_and_empty_dirs() {
    let dir = fresh_dir("target/card_video_unit_music_fixed");
    std::fs::write(dir.join("3.mp3"), b"m").unwrap();

    assert_eq!(
        pick_music(&dir, Some("3"), "x").unwrap(),
        Some(dir.join("3.mp3"))
    );
    assert_eq!(pick_music(&dir, Some("9"), "x").unwrap(), None);
    assert_eq!(
        pick_music(Path::new("target/card_video_unit_no_such_dir"), None, "x").unwrap(),
        None
    );

    let empty = fresh_dir("target/card_video_unit_music_empty");
    assert_eq!(pick_music(&empty, None, "x").unwrap(), None);
}

#[test]
fn produce_fails_cleanly_without_narration() {
    let root = fresh_dir("target/card_video_unit_produce");
    let cfg = StudioConfig::default().with_root(&root);
    let pipeline = CardVideoPipeline::from_config(&cfg).unwrap();
    let items = card_work_items(vec![card("Mirror Force")], &cfg);

    let err = pipeline.produce(&items[0]).unwrap_err();
    assert!(matches!(err, ReelError::NotFound(_)));
    assert!(!root.join("videos/Mirror Force.mp4").exists());
}

#[test]
fn audio_items_target_the_narration_directory() {
    let cfg = StudioConfig::default().with_root("/srv/reels");
    let items = card_audio_items(vec![card("Pot of Greed"), card("Pot of Greed")], &cfg);

    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].candidates(),
        &[PathBuf::from("/srv/reels/audio/Pot of Greed.mp3")]
    );
}
