use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::config::{EngineConfig, OrientationBias, SpeechConfig};
use crate::api::error::ConfigError;
use crate::api::types::Orientation;

/// The presentation skins built on the engine. Each is only a config preset;
/// the tracing rules are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    LineTrace,
    RollingBall,
    LaserBeam,
    DotToDot,
    TrainTrack,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::LineTrace,
        Variant::RollingBall,
        Variant::LaserBeam,
        Variant::DotToDot,
        Variant::TrainTrack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::LineTrace => "line-trace",
            Variant::RollingBall => "rolling-ball",
            Variant::LaserBeam => "laser-beam",
            Variant::DotToDot => "dot-to-dot",
            Variant::TrainTrack => "train-track",
        }
    }

    /// What the prompt calls the handle.
    fn handle_noun(self) -> &'static str {
        match self {
            Variant::LineTrace => "dot",
            Variant::RollingBall => "ball",
            Variant::LaserBeam => "laser",
            Variant::DotToDot => "start dot",
            Variant::TrainTrack => "train",
        }
    }

    fn goal_noun(self) -> &'static str {
        match self {
            Variant::LineTrace => "end of the line",
            Variant::RollingBall => "hole",
            Variant::LaserBeam => "target",
            Variant::DotToDot => "stop dot",
            Variant::TrainTrack => "station",
        }
    }

    /// Engine configuration for this skin.
    pub fn config(self) -> EngineConfig {
        let base = EngineConfig::default();
        let (per_round_xp, tolerance_radius, handle_size, bias, tags): (u32, f32, f32, OrientationBias, &[&str]) =
            match self {
                Variant::LineTrace => (15, 8.0, 12.0, OrientationBias::Alternate, &["visual-motor", "tracing"]),
                Variant::RollingBall => (16, 9.0, 14.0, OrientationBias::Random, &["visual-motor", "motor-planning"]),
                Variant::LaserBeam => (18, 6.0, 10.0, OrientationBias::Alternate, &["visual-motor", "precision"]),
                Variant::DotToDot => (15, 8.0, 12.0, OrientationBias::Random, &["visual-motor", "start-stop"]),
                Variant::TrainTrack => (
                    17,
                    7.0,
                    14.0,
                    OrientationBias::Fixed(Orientation::Horizontal),
                    &["visual-motor", "sequencing"],
                ),
            };

        EngineConfig {
            kind: self.name().to_string(),
            per_round_xp,
            tolerance_radius,
            handle_size,
            orientation_bias: bias,
            allow_reversed: matches!(self, Variant::RollingBall | Variant::LaserBeam),
            skill_tags: tags.iter().map(|t| t.to_string()).collect(),
            speech: SpeechConfig {
                prompt: format!("Drag the {} to the {}.", self.handle_noun(), self.goal_noun()),
                ..SpeechConfig::default()
            },
            ..base
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ConfigError::UnknownVariant(s.to_string()))
    }
}
