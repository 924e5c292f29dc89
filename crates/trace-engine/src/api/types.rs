use serde::{Deserialize, Serialize};

/// Axis a path runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Phase of the handle within one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragPhase {
    #[default]
    Idle,
    /// Handle placed at the path start, waiting for a touch on it.
    Armed,
    Dragging,
    /// Last sample strayed beyond the tolerance radius; handle is frozen.
    OffPath,
    Released,
}

impl DragPhase {
    /// Stable numeric code for the wire protocol.
    pub fn code(self) -> f32 {
        self as u8 as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    Success,
    Fail,
}

/// Result of one released drag. Appended to the session log, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    /// 0-based index of the round the attempt belonged to.
    pub index: u32,
    pub result: RoundResult,
    pub final_progress: f32,
}

impl RoundOutcome {
    pub fn is_success(&self) -> bool {
        self.result == RoundResult::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Playing,
    Finished,
}

/// Session-wide counters. Only the round lifecycle mutates these.
///
/// `round_index` counts resolved rounds, so the round being played is the
/// 0-based `round_index` and `correct_count <= round_index <= total_rounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    round_index: u32,
    total_rounds: u32,
    correct_count: u32,
    phase: SessionPhase,
}

impl SessionState {
    pub fn new(total_rounds: u32) -> Self {
        Self {
            round_index: 0,
            total_rounds,
            correct_count: 0,
            phase: SessionPhase::Playing,
        }
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn rounds_remaining(&self) -> bool {
        self.round_index < self.total_rounds
    }

    /// Resolve the current round. Saturates at `total_rounds`.
    pub(crate) fn resolve_round(&mut self, correct: bool) {
        if self.round_index >= self.total_rounds {
            return;
        }
        self.round_index += 1;
        if correct {
            self.correct_count += 1;
        }
    }

    pub(crate) fn finish(&mut self) {
        self.phase = SessionPhase::Finished;
    }
}

/// Derived once when a session finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub correct: u32,
    pub total: u32,
    /// Percentage, rounded to the nearest integer.
    pub accuracy: u32,
    pub xp_awarded: u32,
}

/// Haptic pulse flavours a host is expected to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticKind {
    Warning,
    Success,
    Light,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_round_counts_correct_only_on_success() {
        let mut s = SessionState::new(3);
        s.resolve_round(true);
        s.resolve_round(false);
        assert_eq!(s.round_index(), 2);
        assert_eq!(s.correct_count(), 1);
        assert!(s.rounds_remaining());
    }

    #[test]
    fn resolve_round_saturates_at_total() {
        let mut s = SessionState::new(1);
        s.resolve_round(true);
        s.resolve_round(true);
        assert_eq!(s.round_index(), 1);
        assert_eq!(s.correct_count(), 1);
        assert!(!s.rounds_remaining());
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let o = RoundOutcome { index: 2, result: RoundResult::Fail, final_progress: 35.0 };
        let json = serde_json::to_string(&o).unwrap();
        assert_eq!(json, r#"{"index":2,"result":"fail","finalProgress":35.0}"#);
    }
}
