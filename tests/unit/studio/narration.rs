use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn card() -> CardRecord {
    CardRecord {
        name: "Dark Magician".to_string(),
        desc: "The ultimate wizard in terms of attack and defense.".to_string(),
        card_type: "Normal Monster".to_string(),
        readable_type: "Normal Monster".to_string(),
        card_images: vec![],
    }
}

fn fresh_cfg(dir: &str) -> StudioConfig {
    let _ = std::fs::remove_dir_all(dir);
    StudioConfig::default().with_root(dir)
}

#[test]
fn prompt_carries_card_details() {
    let prompt = narration_prompt(&card(), &NarrationConfig::default());
    assert!(prompt.contains("Name = Dark Magician"));
    assert!(prompt.contains("Card Type = Normal Monster"));
    assert!(prompt.contains("Effect = The ultimate wizard"));
    assert!(prompt.contains("[Name] is a [Card Type] that {summarize the [Effect]}"));
    assert!(!prompt.contains("subscribe"));

    let closing = NarrationConfig {
        closing_remark: true,
        ..NarrationConfig::default()
    };
    assert!(narration_prompt(&card(), &closing).contains("subscribe"));
}

#[test]
fn existing_audio_is_reused_without_collaborators() {
    let cfg = fresh_cfg("target/narration_unit_reuse");
    let calls = Arc::new(AtomicUsize::new(0));
    let (c1, c2) = (calls.clone(), calls.clone());
    let narrator = Narrator::from_config(&cfg).unwrap().with_collaborators(
        move |_: &str, _: &str| -> ReelResult<String> {
            c1.fetch_add(1, Ordering::SeqCst);
            Ok("script".to_string())
        },
        move |_: &str, _: &VoiceProfile, _: &Path| -> ReelResult<()> {
            c2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    );
    let stem = ArtifactStem::new("Dark Magician").unwrap();
    let audio = narrator.audio_path(&stem);
    std::fs::create_dir_all(audio.parent().unwrap()).unwrap();
    std::fs::write(&audio, b"mp3").unwrap();

    assert_eq!(narrator.ensure_audio(&card(), &stem).unwrap(), audio);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_audio_is_scripted_then_spoken_via_staging() {
    let cfg = fresh_cfg("target/narration_unit_generate");
    let seen = Arc::new(Mutex::new(Vec::<(String, String, PathBuf)>::new()));
    let seen_w = seen.clone();
    let seen_s = seen.clone();
    let narrator = Narrator::from_config(&cfg).unwrap().with_collaborators(
        move |model: &str, prompt: &str| -> ReelResult<String> {
            seen_w
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string(), PathBuf::new()));
            Ok("Dark Magician is a Normal Monster.".to_string())
        },
        move |script: &str, voice: &VoiceProfile, out: &Path| -> ReelResult<()> {
            seen_s
                .lock()
                .unwrap()
                .push((voice.voice_id.clone(), script.to_string(), out.to_path_buf()));
            std::fs::write(out, b"audio").unwrap();
            Ok(())
        },
    );
    let stem = ArtifactStem::new("Dark Magician").unwrap();

    let audio = narrator.ensure_audio(&card(), &stem).unwrap();
    assert_eq!(audio, cfg.paths.audio_dir().join("Dark Magician.mp3"));
    assert_eq!(std::fs::read(&audio).unwrap(), b"audio");
    assert!(!staging_path(&audio).exists());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, "gpt-4o-mini");
    assert!(seen[0].1.contains("Dark Magician"));
    assert_eq!(seen[1].0, "ijEuPMqoI2gEEA41kGv3");
    assert_eq!(seen[1].1, "Dark Magician is a Normal Monster.");
    assert_eq!(seen[1].2, staging_path(&audio));
    assert_eq!(seen[1].2.extension().and_then(|e| e.to_str()), Some("mp3"));
}

#[test]
fn failed_synthesis_leaves_no_audio_behind() {
    let cfg = fresh_cfg("target/narration_unit_fail");
    let narrator = Narrator::from_config(&cfg).unwrap().with_collaborators(
        |_: &str, _: &str| -> ReelResult<String> { Ok("s".to_string()) },
        |_: &str, _: &VoiceProfile, out: &Path| -> ReelResult<()> {
            std::fs::write(out, b"half").unwrap();
            Err(ReelError::worker("quota exceeded"))
        },
    );
    let stem = ArtifactStem::new("Blue-Eyes").unwrap();

    let err = narrator.ensure_audio(&card(), &stem).unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
    let audio = narrator.audio_path(&stem);
    assert!(!audio.exists());
    assert!(!staging_path(&audio).exists());
}

#[test]
fn missing_audio_without_collaborators_is_not_found() {
    let cfg = fresh_cfg("target/narration_unit_unconfigured");
    let narrator = Narrator::from_config(&cfg).unwrap();
    let stem = ArtifactStem::new("Kuriboh").unwrap();
    let err = narrator.ensure_audio(&card(), &stem).unwrap_err();
    assert!(matches!(err, ReelError::NotFound(_)));
    assert!(err.to_string().contains("Kuriboh.mp3"));
}

#[test]
fn empty_commands_are_rejected() {
    assert!(CommandScriptWriter::new(vec![]).is_err());
    assert!(CommandSpeechSynth::new(vec![]).is_err());
}

#[cfg(unix)]
#[test]
fn command_script_writer_pipes_prompt_through_stdin() {
    let writer = CommandScriptWriter::new(vec![
        "sh".to_string(),
        "-c".to_string(),
        "printf '%s: ' \"$CARDREEL_SCRIPT_MODEL\"; tr a-z A-Z".to_string(),
    ])
    .unwrap();
    let script = writer.write_script("gpt-4o-mini", "hello card\n").unwrap();
    assert_eq!(script, "gpt-4o-mini: HELLO CARD");
}

#[cfg(unix)]
#[test]
fn command_script_writer_reports_failures() {
    let failing = CommandScriptWriter::new(vec![
        "sh".to_string(),
        "-c".to_string(),
        "echo boom >&2; exit 3".to_string(),
    ])
    .unwrap();
    let err = failing.write_script("m", "p").unwrap_err();
    assert!(matches!(err, ReelError::Worker(_)));
    assert!(err.to_string().contains("boom"));

    let silent = CommandScriptWriter::new(vec!["true".to_string()]).unwrap();
    assert!(silent.write_script("m", "p").is_err());
}

#[cfg(unix)]
#[test]
fn command_speech_synth_writes_to_final_argument() {
    let dir = PathBuf::from("target/narration_unit_command_speech");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("a.mp3");

    let synth = CommandSpeechSynth::new(vec![
        "sh".to_string(),
        "-c".to_string(),
        "{ printf '%s|' \"$CARDREEL_VOICE_ID\"; cat; } > \"$0\"".to_string(),
    ])
    .unwrap();
    synth
        .synthesize("spoken words", &VoiceProfile::default(), &out)
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "ijEuPMqoI2gEEA41kGv3|spoken words"
    );

    let lazy = CommandSpeechSynth::new(vec!["true".to_string()]).unwrap();
    assert!(lazy
        .synthesize("x", &VoiceProfile::default(), &dir.join("never.mp3"))
        .is_err());
}

#[test]
fn narrator_produces_audio_for_a_work_item() {
    let cfg = fresh_cfg("target/narration_unit_produce");
    let narrator = Narrator::from_config(&cfg).unwrap().with_collaborators(
        |_: &str, _: &str| -> ReelResult<String> { Ok("spoken".to_string()) },
        |script: &str, _: &VoiceProfile, out: &Path| -> ReelResult<()> {
            std::fs::write(out, script).unwrap();
            Ok(())
        },
    );
    let expected = cfg.paths.audio_dir().join("Dark Magician.mp3");
    let item = WorkItem::new("Dark Magician", card(), vec![expected.clone()]);

    assert_eq!(narrator.produce(&item).unwrap(), expected);
    assert_eq!(std::fs::read_to_string(&expected).unwrap(), "spoken");
}
