use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::batch::item::WorkItem;
use crate::batch::scheduler::Produce;
use crate::catalog::CardRecord;
use crate::config::{CollaboratorsConfig, NarrationConfig, StudioConfig, VoiceProfile};
use crate::encode::ffmpeg::{ensure_parent_dir, promote_staging, staging_path};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::naming::ArtifactStem;

/// Request text sent to the script writer for `card`.
pub fn narration_prompt(card: &CardRecord, cfg: &NarrationConfig) -> String {
    let closing = if cfg.closing_remark {
        " At the end, add a closing remark like 'subscribe for more videos like this'."
    } else {
        ""
    };
    format!(
        "Write an engaging YouTube short script about this Yu-Gi-Oh! card that explains what it \
         does. Follow this formula exactly and add nothing beyond it, using at least three \
         sentences: [Name] is a [Card Type] that {{summarize the [Effect]}}.{closing} Stay \
         semi-neutral but engaging, and avoid being corny. Keep the vocabulary basic: prefer \
         words like 'strong' over words like 'formidable'. Rules: write every number in its \
         spelled-out form, for example {{four}} instead of {{4}}. Replace {{ATK}} with \
         {{attack}} and {{DEF}} with {{defense}}. Do not add commentary outside the structure. \
         Card details: Name = {} Card Type = {} Effect = {}",
        card.name,
        card.display_type(),
        card.desc
    )
}

/// Turns a prompt into a narration script (language model collaborator).
pub trait ScriptWriter: Send + Sync {
    /// Script text for `prompt` using `model`.
    fn write_script(&self, model: &str, prompt: &str) -> ReelResult<String>;
}

impl<F> ScriptWriter for F
where
    F: Fn(&str, &str) -> ReelResult<String> + Send + Sync,
{
    fn write_script(&self, model: &str, prompt: &str) -> ReelResult<String> {
        self(model, prompt)
    }
}

/// Renders a script to an audio file (speech collaborator).
pub trait SpeechSynth: Send + Sync {
    /// Write speech for `script` to `out`.
    fn synthesize(&self, script: &str, voice: &VoiceProfile, out: &Path) -> ReelResult<()>;
}

impl<F> SpeechSynth for F
where
    F: Fn(&str, &VoiceProfile, &Path) -> ReelResult<()> + Send + Sync,
{
    fn synthesize(&self, script: &str, voice: &VoiceProfile, out: &Path) -> ReelResult<()> {
        self(script, voice, out)
    }
}

/// Script writer backed by an external command.
///
/// The prompt is written to stdin, the script is read from stdout. The model id is exported as
/// `CARDREEL_SCRIPT_MODEL`.
#[derive(Clone, Debug)]
pub struct CommandScriptWriter {
    argv: Vec<String>,
}

impl CommandScriptWriter {
    /// Wrap `argv` (program followed by its arguments).
    pub fn new(argv: Vec<String>) -> ReelResult<Self> {
        if argv.is_empty() {
            return Err(ReelError::validation("script command must not be empty"));
        }
        Ok(Self { argv })
    }
}

impl ScriptWriter for CommandScriptWriter {
    fn write_script(&self, model: &str, prompt: &str) -> ReelResult<String> {
        let mut cmd = command_for(&self.argv);
        cmd.env("CARDREEL_SCRIPT_MODEL", model);
        let out = run_with_stdin(cmd, &self.argv[0], prompt)?;
        let script = String::from_utf8_lossy(&out.stdout).trim().to_string();
        if script.is_empty() {
            return Err(ReelError::worker(format!(
                "script command '{}' printed no script",
                self.argv[0]
            )));
        }
        Ok(script)
    }
}

/// Speech synthesizer backed by an external command.
///
/// The script is written to stdin and the output path is appended as the final argument. Voice
/// settings are exported as `CARDREEL_VOICE_ID`, `CARDREEL_MODEL_ID`, `CARDREEL_OUTPUT_FORMAT`,
/// `CARDREEL_STABILITY`, `CARDREEL_SIMILARITY_BOOST` and `CARDREEL_SPEED`.
#[derive(Clone, Debug)]
pub struct CommandSpeechSynth {
    argv: Vec<String>,
}

impl CommandSpeechSynth {
    /// Wrap `argv` (program followed by its arguments).
    pub fn new(argv: Vec<String>) -> ReelResult<Self> {
        if argv.is_empty() {
            return Err(ReelError::validation("speech command must not be empty"));
        }
        Ok(Self { argv })
    }
}

impl SpeechSynth for CommandSpeechSynth {
    fn synthesize(&self, script: &str, voice: &VoiceProfile, out: &Path) -> ReelResult<()> {
        let mut cmd = command_for(&self.argv);
        cmd.arg(out)
            .env("CARDREEL_VOICE_ID", &voice.voice_id)
            .env("CARDREEL_MODEL_ID", &voice.model_id)
            .env("CARDREEL_OUTPUT_FORMAT", &voice.output_format)
            .env("CARDREEL_STABILITY", voice.stability.to_string())
            .env("CARDREEL_SIMILARITY_BOOST", voice.similarity_boost.to_string())
            .env("CARDREEL_SPEED", voice.speed.to_string());
        run_with_stdin(cmd, &self.argv[0], script)?;
        if !out.is_file() {
            return Err(ReelError::worker(format!(
                "speech command '{}' did not write '{}'",
                self.argv[0],
                out.display()
            )));
        }
        Ok(())
    }
}

fn command_for(argv: &[String]) -> Command {
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd
}

fn run_with_stdin(mut cmd: Command, program: &str, input: &str) -> ReelResult<Output> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ReelError::worker(format!("failed to spawn '{program}': {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| ReelError::worker(format!("failed to open '{program}' stdin")))?;
    let input = input.to_owned();
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

    let out = child
        .wait_with_output()
        .map_err(|e| ReelError::worker(format!("failed to wait for '{program}': {e}")))?;
    let written = writer
        .join()
        .map_err(|_| ReelError::worker(format!("'{program}' stdin writer panicked")))?;

    // A failed exit explains a broken stdin pipe better than the pipe error does.
    if !out.status.success() {
        return Err(ReelError::worker(format!(
            "'{program}' exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    written
        .map_err(|e| ReelError::worker(format!("failed to write to '{program}' stdin: {e}")))?;
    Ok(out)
}

/// Narration audio for card items: reuse what exists, otherwise write a script and speak it.
pub struct Narrator {
    audio_dir: PathBuf,
    narration: NarrationConfig,
    voice: VoiceProfile,
    writer: Option<Box<dyn ScriptWriter>>,
    synth: Option<Box<dyn SpeechSynth>>,
}

impl Narrator {
    /// Narrator with the command collaborators named in `cfg`, if any.
    pub fn from_config(cfg: &StudioConfig) -> ReelResult<Self> {
        let CollaboratorsConfig {
            script_command,
            speech_command,
        } = &cfg.collaborators;
        let writer = script_command
            .clone()
            .map(CommandScriptWriter::new)
            .transpose()?
            .map(|w| Box::new(w) as Box<dyn ScriptWriter>);
        let synth = speech_command
            .clone()
            .map(CommandSpeechSynth::new)
            .transpose()?
            .map(|s| Box::new(s) as Box<dyn SpeechSynth>);
        Ok(Self {
            audio_dir: cfg.paths.audio_dir(),
            narration: cfg.narration.clone(),
            voice: cfg.voice.clone(),
            writer,
            synth,
        })
    }

    /// Replace both collaborators.
    pub fn with_collaborators(
        mut self,
        writer: impl ScriptWriter + 'static,
        synth: impl SpeechSynth + 'static,
    ) -> Self {
        self.writer = Some(Box::new(writer));
        self.synth = Some(Box::new(synth));
        self
    }

    /// `audio_dir/<stem>.mp3`
    pub fn audio_path(&self, stem: &ArtifactStem) -> PathBuf {
        self.audio_dir.join(stem.audio_file())
    }

    /// Path of narration audio for `card`, producing it first when absent.
    pub fn ensure_audio(&self, card: &CardRecord, stem: &ArtifactStem) -> ReelResult<PathBuf> {
        let out = self.audio_path(stem);
        if out.is_file() {
            tracing::info!(audio = %out.display(), "reusing narration audio");
            return Ok(out);
        }

        let (Some(writer), Some(synth)) = (self.writer.as_deref(), self.synth.as_deref()) else {
            return Err(ReelError::not_found(format!(
                "narration '{}' is missing and no script/speech commands are configured",
                out.display()
            )));
        };

        let prompt = narration_prompt(card, &self.narration);
        let script = writer.write_script(&self.narration.script_model, &prompt)?;
        tracing::debug!(chars = script.len(), "narration script written");

        ensure_parent_dir(&out)?;
        let staging = staging_path(&out);
        if let Err(e) = synth.synthesize(&script, &self.voice, &staging) {
            let _ = std::fs::remove_file(&staging);
            return Err(e);
        }
        promote_staging(&staging, &out)?;
        tracing::info!(audio = %out.display(), "narration audio written");
        Ok(out)
    }
}

impl Produce<CardRecord> for Narrator {
    #[tracing::instrument(skip_all, fields(identity = item.identity()))]
    fn produce(&self, item: &WorkItem<CardRecord>) -> ReelResult<PathBuf> {
        let card = item.source();
        self.ensure_audio(card, &ArtifactStem::new(&card.name)?)
    }
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("audio_dir", &self.audio_dir)
            .field("has_writer", &self.writer.is_some())
            .field("has_synth", &self.synth.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/narration.rs"]
mod tests;
