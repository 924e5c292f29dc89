use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Orientation;

/// Side length of the normalized play area. All engine geometry lives in [0, 100]².
pub const PLAY_EXTENT: f32 = 100.0;

/// The invisible straight segment a round's drag must follow.
/// Immutable once built; a new one is generated for every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    start: Vec2,
    end: Vec2,
    orientation: Orientation,
    tolerance_radius: f32,
}

/// Where a sample lands when projected onto a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Position along the segment, clamped to [0, 1].
    pub scalar: f32,
    /// The clamped projected point, always on the segment.
    pub point: Vec2,
    /// Distance from the sample to `point`.
    pub deviation: f32,
}

impl Path {
    pub fn new(start: Vec2, end: Vec2, orientation: Orientation, tolerance_radius: f32) -> Self {
        Self {
            start,
            end,
            orientation,
            tolerance_radius,
        }
    }

    pub fn horizontal(y: f32, from_x: f32, to_x: f32, tolerance_radius: f32) -> Self {
        Self::new(
            Vec2::new(from_x, y),
            Vec2::new(to_x, y),
            Orientation::Horizontal,
            tolerance_radius,
        )
    }

    pub fn vertical(x: f32, from_y: f32, to_y: f32, tolerance_radius: f32) -> Self {
        Self::new(
            Vec2::new(x, from_y),
            Vec2::new(x, to_y),
            Orientation::Vertical,
            tolerance_radius,
        )
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn tolerance_radius(&self) -> f32 {
        self.tolerance_radius
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Point at fraction `t` of the way from start to end (clamped).
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }

    /// Project `p` onto the line through start/end, clamped to the segment.
    /// A zero-length path projects everything onto `start`.
    pub fn project(&self, p: Vec2) -> Projection {
        let d = self.end - self.start;
        let len_sq = d.length_squared();
        let scalar = if len_sq <= f32::EPSILON {
            0.0
        } else {
            ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0)
        };
        let point = self.start + d * scalar;
        Projection {
            scalar,
            point,
            deviation: p.distance(point),
        }
    }

    /// Whether `p` is within the tolerance radius of the segment.
    pub fn within_tolerance(&self, p: Vec2) -> bool {
        self.project(p).deviation <= self.tolerance_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario_path() -> Path {
        Path::horizontal(50.0, 15.0, 85.0, 8.0)
    }

    #[test]
    fn projects_onto_segment() {
        let path = scenario_path();
        let proj = path.project(Vec2::new(50.0, 53.0));
        assert_relative_eq!(proj.point.x, 50.0);
        assert_relative_eq!(proj.point.y, 50.0);
        assert_relative_eq!(proj.deviation, 3.0);
        assert_relative_eq!(proj.scalar, 0.5);
    }

    #[test]
    fn clamps_beyond_the_ends() {
        let path = scenario_path();
        let before = path.project(Vec2::new(0.0, 50.0));
        assert_eq!(before.scalar, 0.0);
        assert_eq!(before.point, path.start());
        assert_relative_eq!(before.deviation, 15.0);

        let after = path.project(Vec2::new(99.0, 50.0));
        assert_eq!(after.scalar, 1.0);
        assert_eq!(after.point, path.end());
    }

    #[test]
    fn diagonal_drift_counts_full_distance() {
        let path = scenario_path();
        // Per-axis clamping would report zero deviation here.
        let proj = path.project(Vec2::new(50.0, 75.0));
        assert_relative_eq!(proj.deviation, 25.0);
        assert!(!path.within_tolerance(Vec2::new(50.0, 75.0)));
    }

    #[test]
    fn reversed_vertical_path() {
        let path = Path::vertical(30.0, 80.0, 20.0, 5.0);
        let proj = path.project(Vec2::new(31.0, 65.0));
        assert_relative_eq!(proj.scalar, 0.25);
        assert_relative_eq!(proj.point.y, 65.0);
    }

    #[test]
    fn degenerate_path_projects_to_start() {
        let path = Path::horizontal(10.0, 10.0, 10.0, 4.0);
        let proj = path.project(Vec2::new(13.0, 14.0));
        assert_eq!(proj.scalar, 0.0);
        assert_eq!(proj.point, Vec2::new(10.0, 10.0));
        assert_relative_eq!(proj.deviation, 5.0);
    }

    #[test]
    fn projection_always_on_segment() {
        let path = Path::new(Vec2::new(20.0, 30.0), Vec2::new(70.0, 30.0), Orientation::Horizontal, 6.0);
        for ix in 0..=20 {
            for iy in 0..=20 {
                let p = Vec2::new(ix as f32 * 5.0, iy as f32 * 5.0);
                let proj = path.project(p);
                assert!((0.0..=1.0).contains(&proj.scalar));
                assert!(proj.point.x >= 20.0 && proj.point.x <= 70.0);
                assert_relative_eq!(proj.point.y, 30.0);
            }
        }
    }
}
