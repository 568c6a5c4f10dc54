use anyhow::{Context, Result};
use regex::Regex;

pub struct TextNormalizer {
    space_before_punctuation: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        // Covers the straight apostrophe and the curly U+2019 variant found
        // in typeset book text.
        let space_before_punctuation = Regex::new(r"\s+([.,:;!?'’])")
            .context("failed to compile punctuation spacing regex")?;

        Ok(Self {
            space_before_punctuation,
        })
    }

    /// Collapses whitespace runs to single spaces, trims both ends, then
    /// removes any space left hanging before closing punctuation. Total over
    /// any input; normalizing already-normalized text is a no-op.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<&str>>().join(" ");
        self.space_before_punctuation
            .replace_all(&collapsed, "$1")
            .into_owned()
    }
}
