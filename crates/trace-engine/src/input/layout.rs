use glam::Vec2;

use crate::core::path::PLAY_EXTENT;

/// Measured size of the play area in host pixels.
/// Maps pixel samples into the engine's normalized 0–100 space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A layout that has not been measured yet (every sample is dropped).
    pub fn unmeasured() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Normalize a pixel sample. Samples outside the area are clamped to its
    /// edge; `None` for an unmeasured layout or a non-finite sample.
    pub fn normalize(&self, x: f32, y: f32) -> Option<Vec2> {
        if !self.is_measured() {
            return None;
        }
        let p = Vec2::new(x / self.width, y / self.height) * PLAY_EXTENT;
        if !p.is_finite() {
            return None;
        }
        Some(p.clamp(Vec2::ZERO, Vec2::splat(PLAY_EXTENT)))
    }

    /// Inverse of [`normalize`](Self::normalize), for hosts placing sprites.
    pub fn to_pixels(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.width, p.y * self.height) / PLAY_EXTENT
    }
}

impl Default for PlayArea {
    fn default() -> Self {
        Self::unmeasured()
    }
}
