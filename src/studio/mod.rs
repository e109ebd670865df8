//! Per-item production pipelines for card videos.
//!
//! The language model and speech service are external collaborators reached through
//! [`narration::ScriptWriter`] and [`narration::SpeechSynth`]; everything else runs locally.

/// Card video pipeline: narration, card layer animation, compositing.
pub mod card_video;
/// Narration prompt, script and speech collaborators.
pub mod narration;
