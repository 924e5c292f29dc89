use glam::Vec2;

use crate::api::config::{EngineConfig, OrientationBias};
use crate::api::error::ConfigError;
use crate::api::types::Orientation;
use crate::core::path::{Path, PLAY_EXTENT};
use crate::core::rng::Rng;

/// Safe on-screen region for generated paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathBounds {
    margin: f32,
    min_length: f32,
}

impl PathBounds {
    pub fn new(margin: f32, min_length: f32) -> Result<Self, ConfigError> {
        let extent = PLAY_EXTENT - 2.0 * margin;
        if !(margin.is_finite() && margin >= 0.0 && min_length > 0.0 && min_length <= extent) {
            return Err(ConfigError::InvalidBounds { margin, min_length });
        }
        Ok(Self { margin, min_length })
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn min_length(&self) -> f32 {
        self.min_length
    }

    /// Longest path that fits inside the margins.
    pub fn max_length(&self) -> f32 {
        PLAY_EXTENT - 2.0 * self.margin
    }
}

/// Produces a fresh randomized axis-aligned path for every attempt.
#[derive(Debug, Clone)]
pub struct PathGenerator {
    rng: Rng,
    bounds: PathBounds,
    bias: OrientationBias,
    tolerance_radius: f32,
    allow_reversed: bool,
    next_alternate: Orientation,
}

impl PathGenerator {
    pub fn new(
        bounds: PathBounds,
        bias: OrientationBias,
        tolerance_radius: f32,
        seed: u64,
    ) -> Self {
        Self {
            rng: Rng::new(seed),
            bounds,
            bias,
            tolerance_radius,
            allow_reversed: false,
            next_alternate: Orientation::Horizontal,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let bounds = PathBounds::new(config.safe_margin, config.min_path_length)?;
        Ok(Self::new(bounds, config.orientation_bias, config.tolerance_radius, config.seed)
            .with_reversed(config.allow_reversed))
    }

    pub fn with_reversed(mut self, allow: bool) -> Self {
        self.allow_reversed = allow;
        self
    }

    pub fn bounds(&self) -> PathBounds {
        self.bounds
    }

    /// Orientation for the next round. Advances the alternation.
    pub fn next_orientation(&mut self) -> Orientation {
        match self.bias {
            OrientationBias::Fixed(o) => o,
            OrientationBias::Random => {
                if self.rng.next_bool() {
                    Orientation::Horizontal
                } else {
                    Orientation::Vertical
                }
            }
            OrientationBias::Alternate => {
                let o = self.next_alternate;
                self.next_alternate = o.flipped();
                o
            }
        }
    }

    /// Generate the next round's path. Always succeeds; bounds were checked on construction.
    pub fn generate(&mut self) -> Path {
        let orientation = self.next_orientation();
        self.generate_oriented(orientation)
    }

    /// Fresh random path along `orientation`, leaving the alternation untouched.
    /// Used when a round is replayed.
    pub fn generate_oriented(&mut self, orientation: Orientation) -> Path {
        let lo = self.bounds.margin;
        let hi = PLAY_EXTENT - self.bounds.margin;

        let fixed = self.rng.range_f32(lo, hi);
        let length = self.rng.range_f32(self.bounds.min_length, self.bounds.max_length());
        let mut from = self.rng.range_f32(lo, hi - length);
        let mut to = from + length;
        if self.allow_reversed && self.rng.next_bool() {
            std::mem::swap(&mut from, &mut to);
        }

        let (start, end) = match orientation {
            Orientation::Horizontal => (Vec2::new(from, fixed), Vec2::new(to, fixed)),
            Orientation::Vertical => (Vec2::new(fixed, from), Vec2::new(fixed, to)),
        };
        Path::new(start, end, orientation, self.tolerance_radius)
    }
}
