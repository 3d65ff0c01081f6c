//! Configuration for playback pacing and the session.

use vn_core::PROTAGONIST_SPEAKER;

/// Timing knobs for incremental reveal.
///
/// The reveal delay scales linearly with text length between a floor and a
/// ceiling, so short lines still land with some weight and long ones do
/// not stall the reader.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Minimum reveal delay in milliseconds.
    pub reveal_floor_ms: u64,
    /// Maximum reveal delay in milliseconds.
    pub reveal_ceiling_ms: u64,
    /// Reveal delay contributed per character of text, in milliseconds.
    pub per_char_ms: u64,
    /// Fixed gap between two parts of the same paragraph, in milliseconds.
    pub part_gap_ms: u64,
    /// Fixed pause between a picked choice and the successor paragraph,
    /// in milliseconds.
    pub choice_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            reveal_floor_ms: 800,
            reveal_ceiling_ms: 1500,
            per_char_ms: 30,
            part_gap_ms: 500,
            choice_delay_ms: 800,
        }
    }
}

impl PacingConfig {
    /// Zero out every delay. Useful for tests and non-interactive
    /// frontends that want the full transcript immediately.
    pub fn instant() -> Self {
        Self {
            reveal_floor_ms: 0,
            reveal_ceiling_ms: 0,
            per_char_ms: 0,
            part_gap_ms: 0,
            choice_delay_ms: 0,
        }
    }

    /// Set the reveal floor and ceiling.
    pub fn with_reveal_bounds(mut self, floor_ms: u64, ceiling_ms: u64) -> Self {
        self.reveal_floor_ms = floor_ms;
        self.reveal_ceiling_ms = ceiling_ms;
        self
    }

    /// Set the per-character reveal scaling.
    pub fn with_per_char(mut self, per_char_ms: u64) -> Self {
        self.per_char_ms = per_char_ms;
        self
    }

    /// Compute the reveal delay for a part of `text_len` characters:
    /// linear scaling clamped to the configured floor and ceiling.
    pub fn reveal_delay_ms(&self, text_len: usize) -> u64 {
        (text_len as u64 * self.per_char_ms)
            .max(self.reveal_floor_ms)
            .min(self.reveal_ceiling_ms)
    }
}

/// Configuration for a reading session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Reveal pacing.
    pub pacing: PacingConfig,
    /// Display name used when the reader's own choices are echoed into
    /// the transcript, and the speaker marker the validator exempts.
    pub protagonist: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            protagonist: PROTAGONIST_SPEAKER.to_string(),
        }
    }
}

impl SessionConfig {
    /// Set the pacing configuration.
    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set the protagonist display name.
    pub fn with_protagonist(mut self, name: impl Into<String>) -> Self {
        self.protagonist = name.into();
        self
    }
}
