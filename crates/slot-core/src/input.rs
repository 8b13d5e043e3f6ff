//! Numeric entry and the retry-until-valid prompt loop
//!
//! The presentation layer supplies a [`Prompter`]: a blocking request that
//! returns whatever text the player entered, or `None` once the player quits.

use crate::error::SlotError;

/// Synchronous text-entry seam to the presentation layer
pub trait Prompter {
    /// Ask for one line of input. `None` cancels the prompt.
    fn request(&mut self, prompt: &str) -> Option<String>;

    /// Called after an entry was rejected, before the prompt is re-issued
    fn rejected(&mut self, _error: &SlotError) {}
}

/// Parse a non-negative whole number made only of ASCII digits
///
/// Surrounding whitespace is ignored. Signs, decimal points, empty input and
/// values that overflow `u64` are rejected.
pub fn parse_whole_number(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Re-issue `prompt` until `accept` succeeds or the prompter cancels
pub fn prompt_until_valid<P, T, F>(prompter: &mut P, prompt: &str, mut accept: F) -> Option<T>
where
    P: Prompter + ?Sized,
    F: FnMut(&str) -> Result<T, SlotError>,
{
    loop {
        let raw = prompter.request(prompt)?;
        match accept(&raw) {
            Ok(value) => return Some(value),
            Err(err) => {
                log::debug!("Rejected entry {raw:?}: {err}");
                prompter.rejected(&err);
            }
        }
    }
}

/// Prompter fed from a fixed list of answers, then cancelled
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    /// Prompts received, in order
    pub prompts: Vec<String>,
    /// Rejections received, in order
    pub rejections: Vec<SlotError>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            rejections: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn request(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front()
    }

    fn rejected(&mut self, error: &SlotError) {
        self.rejections.push(error.clone());
    }
}
