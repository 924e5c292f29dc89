//! Flat frame record read by the presentation layer each frame.
//! Must stay in sync with the host's `protocol.ts`.
//!
//! Layout (all values f32, 4 bytes each, in declaration order):
//! ```text
//! [version, lifecycle_phase, drag_phase, orientation]
//! [round_index, total_rounds, correct_count, attempt]
//! [path_start_x, path_start_y, path_end_x, path_end_y]
//! [tolerance_radius, handle_x, handle_y, progress]
//! [deviation, alert_visible, session_finished, accuracy]
//! [xp_awarded, saved, reserved, reserved]
//! ```
//!
//! Coordinates are in the normalized 0–100 play space. Booleans are 0.0 / 1.0.
//! Phase codes follow the declaration order of `RoundPhase` and `DragPhase`.

use bytemuck::{Pod, Zeroable};

/// Protocol version written into every frame.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Orientation codes.
pub const ORIENTATION_NONE: f32 = -1.0;
pub const ORIENTATION_HORIZONTAL: f32 = 0.0;
pub const ORIENTATION_VERTICAL: f32 = 1.0;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct FrameState {
    pub version: f32,
    pub lifecycle_phase: f32,
    pub drag_phase: f32,
    pub orientation: f32,
    pub round_index: f32,
    pub total_rounds: f32,
    pub correct_count: f32,
    pub attempt: f32,
    pub path_start_x: f32,
    pub path_start_y: f32,
    pub path_end_x: f32,
    pub path_end_y: f32,
    pub tolerance_radius: f32,
    pub handle_x: f32,
    pub handle_y: f32,
    pub progress: f32,
    pub deviation: f32,
    pub alert_visible: f32,
    pub session_finished: f32,
    pub accuracy: f32,
    pub xp_awarded: f32,
    pub saved: f32,
    pub reserved: [f32; 2],
}

impl FrameState {
    /// Number of floats in one frame record (wire format).
    pub const FLOATS: usize = std::mem::size_of::<FrameState>() / 4;

    /// View the frame as a flat float slice for zero-copy reads.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }
}

pub(crate) fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}
