use std::io::{BufRead, Write};

use anyhow::Context as _;

use crate::foundation::error::ReelResult;

/// What a confirmation gate is asked to approve: the items that will actually do work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSummary {
    identities: Vec<String>,
    already_present: usize,
}

impl PendingSummary {
    /// Summary of `identities` pending work, with `already_present` items filtered out by dedup.
    pub fn new(identities: Vec<String>, already_present: usize) -> Self {
        Self {
            identities,
            already_present,
        }
    }

    /// Pending item identities in input order.
    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    /// Number of pending items.
    pub fn pending(&self) -> usize {
        self.identities.len()
    }

    /// Number of items skipped because an artifact already exists.
    pub fn already_present(&self) -> usize {
        self.already_present
    }
}

impl std::fmt::Display for PendingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} item(s) to produce, {} already present:",
            self.pending(),
            self.already_present
        )?;
        for id in &self.identities {
            writeln!(f, "  - {id}")?;
        }
        Ok(())
    }
}

/// Single approve/reject checkpoint before any work is dispatched.
pub trait ConfirmationGate {
    /// Return `true` only on an explicit affirmative decision.
    fn confirm(&mut self, summary: &PendingSummary) -> ReelResult<bool>;
}

impl<F> ConfirmationGate for F
where
    F: FnMut(&PendingSummary) -> bool,
{
    fn confirm(&mut self, summary: &PendingSummary) -> ReelResult<bool> {
        Ok(self(summary))
    }
}

/// Gate that approves without asking (`--yes`).
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoConfirm;

impl ConfirmationGate for AutoConfirm {
    fn confirm(&mut self, _summary: &PendingSummary) -> ReelResult<bool> {
        Ok(true)
    }
}

/// Textual yes/no prompt over any reader/writer pair.
#[derive(Debug)]
pub struct PromptGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptGate<R, W> {
    /// Prompt on `output`, read the answer from `input`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptGate<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stderr, read from stdin.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for PromptGate<R, W> {
    fn confirm(&mut self, summary: &PendingSummary) -> ReelResult<bool> {
        write!(self.output, "{summary}Proceed? (y/n) ").context("write confirmation prompt")?;
        self.output.flush().context("flush confirmation prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("read confirmation answer")?;
        // EOF counts as a refusal.
        Ok(read > 0 && is_affirmative(&line))
    }
}

/// `y` or `yes`, case-insensitive, surrounding whitespace ignored. Anything else is a refusal.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
#[path = "../../tests/unit/batch/gate.rs"]
mod tests;
