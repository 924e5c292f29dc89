use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;
use crate::api::types::Orientation;
use crate::core::path::PLAY_EXTENT;

/// Upper bound on `total_rounds`.
pub const MAX_ROUNDS: u32 = 1000;

/// How the generator picks each round's orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "orientation")]
pub enum OrientationBias {
    /// Horizontal, vertical, horizontal, ...
    #[default]
    Alternate,
    Random,
    Fixed(Orientation),
}

/// Configuration for one tracing session. Every field has a default, so a
/// partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Session type reported to the logger.
    pub kind: String,
    pub total_rounds: u32,
    /// Minimum progress (0..=100) for a release to count.
    pub success_threshold: f32,
    /// Max distance from the path, in normalized units.
    pub tolerance_radius: f32,
    /// Diameter of the handle's circular hit area, in normalized units.
    pub handle_size: f32,
    /// Keep-out border on every side of the play area.
    pub safe_margin: f32,
    pub min_path_length: f32,
    pub orientation_bias: OrientationBias,
    /// Allow paths that run right-to-left or bottom-to-top.
    pub allow_reversed: bool,
    /// Seconds between a success and the next round.
    pub success_delay: f32,
    /// Seconds between a failed release and the replay.
    pub fail_delay: f32,
    /// Seconds before an off-path alert clears on its own.
    pub alert_timeout: f32,
    pub per_round_xp: u32,
    pub skill_tags: Vec<String>,
    /// `None` replays a failed round until it succeeds.
    pub max_attempts_per_round: Option<u32>,
    pub seed: u64,
    pub speech: SpeechConfig,
}

/// Words the dispatcher speaks and shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeechConfig {
    pub rate: f32,
    pub prompt: String,
    pub affirmations: Vec<String>,
    pub retry: String,
    pub off_path_alert: String,
    /// `{correct}` and `{total}` are substituted.
    pub summary: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: 0.9,
            prompt: "Drag the dot along the line to the end.".to_string(),
            affirmations: vec![
                "Great job!".to_string(),
                "Well done!".to_string(),
                "Nice and steady!".to_string(),
                "You did it!".to_string(),
            ],
            retry: "Let's try that one again.".to_string(),
            off_path_alert: "Stay on the path!".to_string(),
            summary: "You traced {correct} out of {total} paths!".to_string(),
        }
    }
}

impl SpeechConfig {
    /// Pick an affirmation by index, wrapping around. Empty list yields "".
    pub fn affirmation(&self, index: usize) -> &str {
        if self.affirmations.is_empty() {
            return "";
        }
        &self.affirmations[index % self.affirmations.len()]
    }

    pub fn summary_for(&self, correct: u32, total: u32) -> String {
        self.summary
            .replace("{correct}", &correct.to_string())
            .replace("{total}", &total.to_string())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: "line-trace".to_string(),
            total_rounds: 8,
            success_threshold: 80.0,
            tolerance_radius: 8.0,
            handle_size: 12.0,
            safe_margin: 15.0,
            min_path_length: 40.0,
            orientation_bias: OrientationBias::Alternate,
            allow_reversed: false,
            success_delay: 1.5,
            fail_delay: 1.2,
            alert_timeout: 2.0,
            per_round_xp: 15,
            skill_tags: vec!["visual-motor".to_string(), "tracing".to_string()],
            max_attempts_per_round: None,
            seed: 42,
            speech: SpeechConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.total_rounds > MAX_ROUNDS {
            return Err(ConfigError::TooManyRounds(self.total_rounds));
        }
        if !(self.tolerance_radius.is_finite() && self.tolerance_radius > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance_radius));
        }
        if !(self.handle_size.is_finite() && self.handle_size > 0.0) {
            return Err(ConfigError::InvalidHandleSize(self.handle_size));
        }
        if !(0.0..=100.0).contains(&self.success_threshold) {
            return Err(ConfigError::InvalidThreshold(self.success_threshold));
        }
        let extent = PLAY_EXTENT - 2.0 * self.safe_margin;
        if !(self.safe_margin >= 0.0 && self.min_path_length > 0.0 && self.min_path_length <= extent) {
            return Err(ConfigError::InvalidBounds {
                margin: self.safe_margin,
                min_length: self.min_path_length,
            });
        }
        for (name, value) in [
            ("successDelay", self.success_delay),
            ("failDelay", self.fail_delay),
            ("alertTimeout", self.alert_timeout),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidDelay { name, value });
            }
        }
        Ok(())
    }
}
