use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::EngineConfig;
use crate::api::types::{DragPhase, RoundOutcome, RoundResult};
use crate::core::path::Path;

/// Mutable state of the handle for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragState {
    pub handle_position: Vec2,
    pub phase: DragPhase,
    /// Percentage of the path covered, 0–100.
    pub progress: f32,
}

/// Tuning that stays fixed for a whole session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSettings {
    /// Diameter of the circular hit area around the handle.
    pub handle_size: f32,
    /// Minimum progress for a release to succeed.
    pub success_threshold: f32,
}

impl DragSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            handle_size: config.handle_size,
            success_threshold: config.success_threshold,
        }
    }
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            handle_size: 12.0,
            success_threshold: 80.0,
        }
    }
}

/// Result of feeding one gesture sample to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragResult {
    /// Touch landed on the handle; dragging has begun.
    Started,
    /// Touch missed the handle's hit area.
    NotStarted,
    /// Handle followed the sample. `returned` is set when this sample brought
    /// the drag back within tolerance.
    Moved { progress: f32, deviation: f32, returned: bool },
    /// Sample strayed beyond tolerance; handle stayed put. `entered` is set on
    /// the first such sample of an excursion.
    OffPath { deviation: f32, entered: bool },
    /// Drag ended and was judged.
    Released(RoundOutcome),
    /// Nothing to do in the current phase, or the sample was unusable.
    Ignored,
}

/// Validates a drag against a single straight path.
///
/// Built fresh for every attempt, so it carries nothing between rounds. The
/// handle only ever sits on the segment: each accepted sample is projected onto
/// the path and clamped to its span.
#[derive(Debug, Clone)]
pub struct DragController {
    round_index: u32,
    path: Path,
    settings: DragSettings,
    state: DragState,
    last_deviation: f32,
}

impl DragController {
    /// Arm a controller with the handle resting on `path.start`.
    pub fn new(round_index: u32, path: Path, settings: DragSettings) -> Self {
        Self {
            round_index,
            path,
            settings,
            state: DragState {
                handle_position: path.start(),
                phase: DragPhase::Armed,
                progress: 0.0,
            },
            last_deviation: 0.0,
        }
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn phase(&self) -> DragPhase {
        self.state.phase
    }

    pub fn progress(&self) -> f32 {
        self.state.progress
    }

    /// Deviation of the most recent move sample.
    pub fn last_deviation(&self) -> f32 {
        self.last_deviation
    }

    /// Whether `point` is within `handle_size / 2` of the handle.
    pub fn hit_test(&self, point: Vec2) -> bool {
        point.distance(self.state.handle_position) <= self.settings.handle_size * 0.5
    }

    /// Handle pointer down. Only a touch on the handle of an armed controller starts a drag.
    pub fn on_gesture_start(&mut self, point: Vec2) -> DragResult {
        if !point.is_finite() {
            return DragResult::Ignored;
        }
        match self.state.phase {
            DragPhase::Armed => {
                if self.hit_test(point) {
                    self.state.phase = DragPhase::Dragging;
                    self.last_deviation = self.path.project(point).deviation;
                    DragResult::Started
                } else {
                    DragResult::NotStarted
                }
            }
            _ => DragResult::Ignored,
        }
    }

    /// Handle pointer move while dragging.
    pub fn on_gesture_move(&mut self, point: Vec2) -> DragResult {
        if !point.is_finite() {
            return DragResult::Ignored;
        }
        let was_off = match self.state.phase {
            DragPhase::Dragging => false,
            DragPhase::OffPath => true,
            _ => return DragResult::Ignored,
        };

        let proj = self.path.project(point);
        self.last_deviation = proj.deviation;

        if proj.deviation > self.path.tolerance_radius() {
            self.state.phase = DragPhase::OffPath;
            return DragResult::OffPath {
                deviation: proj.deviation,
                entered: !was_off,
            };
        }

        self.state.phase = DragPhase::Dragging;
        self.state.handle_position = proj.point;
        self.state.progress = (proj.scalar * 100.0).clamp(0.0, 100.0);
        DragResult::Moved {
            progress: self.state.progress,
            deviation: proj.deviation,
            returned: was_off,
        }
    }

    /// Handle pointer up. Judges the attempt if a drag was in progress.
    pub fn on_gesture_end(&mut self) -> DragResult {
        match self.state.phase {
            DragPhase::Dragging | DragPhase::OffPath => {
                self.state.phase = DragPhase::Released;
                DragResult::Released(self.judge())
            }
            _ => DragResult::Ignored,
        }
    }

    fn judge(&self) -> RoundOutcome {
        let reached_end =
            self.state.handle_position.distance(self.path.end()) <= self.path.tolerance_radius();
        let result = if self.state.progress >= self.settings.success_threshold && reached_end {
            RoundResult::Success
        } else {
            RoundResult::Fail
        };
        RoundOutcome {
            index: self.round_index,
            result,
            final_progress: self.state.progress,
        }
    }

    /// Put the handle back on the start and re-arm.
    pub fn reset(&mut self) {
        self.state = DragState {
            handle_position: self.path.start(),
            phase: DragPhase::Armed,
            progress: 0.0,
        };
        self.last_deviation = 0.0;
    }
}
