use glam::Vec2;
use serde::Serialize;

use crate::api::config::EngineConfig;
use crate::api::error::ConfigError;
use crate::api::types::{DragPhase, Orientation, RoundOutcome, SessionState};
use crate::core::path::Path;
use crate::core::timer::{TimerId, Timers};
use crate::systems::drag::{DragController, DragResult, DragSettings};
use crate::systems::generator::PathGenerator;

/// Round lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    Idle,
    Armed,
    Dragging,
    OffPath,
    Success,
    Fail,
    Advancing,
    Complete,
}

impl RoundPhase {
    /// Stable numeric code for the wire protocol.
    pub fn code(self) -> f32 {
        self as u8 as f32
    }

    pub fn accepts_gestures(self) -> bool {
        matches!(self, RoundPhase::Armed | RoundPhase::Dragging | RoundPhase::OffPath)
    }
}

/// What a scheduled timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Move on to the next round, or finish.
    Advance,
    /// Replay the current round on a fresh path.
    Replay,
}

/// Transitions reported to the feedback dispatcher and the scorer.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    RoundStarted { index: u32, attempt: u32, path: Path },
    DragStarted { index: u32 },
    OffPathEntered { index: u32, deviation: f32 },
    OffPathCleared { index: u32 },
    RoundSucceeded { outcome: RoundOutcome, handle: Vec2 },
    /// `will_retry` is false when the attempt cap resolved the round as incorrect.
    RoundFailed { outcome: RoundOutcome, will_retry: bool },
    SessionComplete { session: SessionState },
}

/// Counters kept alongside the outcome log for the session record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStats {
    pub attempts: u32,
    pub failures: u32,
    pub off_path_excursions: u32,
}

/// Drives a session through its rounds. Sole owner and mutator of [`SessionState`].
///
/// ```text
/// Idle → Armed → Dragging ⇄ OffPath → {Success, Fail} → Advancing → Armed | Complete
///                                        Fail ──(replay)──────────→ Armed
/// ```
///
/// At most one transition timer is pending; scheduling another cancels it.
pub struct RoundLifecycle {
    session: SessionState,
    phase: RoundPhase,
    generator: PathGenerator,
    settings: DragSettings,
    drag: Option<DragController>,
    timers: Timers<Transition>,
    pending: Option<TimerId>,
    outcomes: Vec<RoundOutcome>,
    stats: AttemptStats,
    attempt: u32,
    max_attempts: Option<u32>,
    success_delay: f32,
    fail_delay: f32,
}

impl RoundLifecycle {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            session: SessionState::new(config.total_rounds),
            phase: RoundPhase::Idle,
            generator: PathGenerator::from_config(config)?,
            settings: DragSettings::from_config(config),
            drag: None,
            timers: Timers::new(),
            pending: None,
            outcomes: Vec::new(),
            stats: AttemptStats::default(),
            attempt: 0,
            max_attempts: config.max_attempts_per_round.filter(|&n| n > 0),
            success_delay: config.success_delay,
            fail_delay: config.fail_delay,
        })
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn drag(&self) -> Option<&DragController> {
        self.drag.as_ref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.drag.as_ref().map(|d| d.path())
    }

    /// Every released attempt, in order.
    pub fn outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    pub fn stats(&self) -> AttemptStats {
        self.stats
    }

    /// 0-based attempt number within the current round.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some_and(|id| self.timers.is_pending(id))
    }

    /// Leave `Idle` by arming the first round. No-op in any other phase.
    pub fn start(&mut self) -> Vec<LifecycleEvent> {
        if self.phase != RoundPhase::Idle {
            return Vec::new();
        }
        log::info!("session start: {} rounds", self.session.total_rounds());
        vec![self.arm_round(None)]
    }

    /// Full session reset ("play again"). Cancels any pending transition.
    pub fn reset(&mut self) -> Vec<LifecycleEvent> {
        self.cancel_pending();
        self.session = SessionState::new(self.session.total_rounds());
        self.outcomes.clear();
        self.stats = AttemptStats::default();
        self.attempt = 0;
        self.drag = None;
        self.phase = RoundPhase::Idle;
        self.start()
    }

    /// Cancel every pending timer. Used on teardown.
    pub fn cancel_pending(&mut self) {
        self.timers.cancel_all();
        self.pending = None;
    }

    pub fn on_gesture_start(&mut self, point: Vec2) -> Vec<LifecycleEvent> {
        if !self.phase.accepts_gestures() {
            return Vec::new();
        }
        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        match drag.on_gesture_start(point) {
            DragResult::Started => {
                self.phase = RoundPhase::Dragging;
                log::debug!("round {}: drag started", drag.round_index());
                vec![LifecycleEvent::DragStarted { index: drag.round_index() }]
            }
            _ => Vec::new(),
        }
    }

    pub fn on_gesture_move(&mut self, point: Vec2) -> Vec<LifecycleEvent> {
        if !self.phase.accepts_gestures() {
            return Vec::new();
        }
        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        let index = drag.round_index();
        match drag.on_gesture_move(point) {
            DragResult::OffPath { deviation, entered } => {
                self.phase = RoundPhase::OffPath;
                if entered {
                    self.stats.off_path_excursions += 1;
                    log::debug!("round {index}: off path (deviation {deviation:.1})");
                    vec![LifecycleEvent::OffPathEntered { index, deviation }]
                } else {
                    Vec::new()
                }
            }
            DragResult::Moved { returned, .. } => {
                self.phase = RoundPhase::Dragging;
                if returned {
                    vec![LifecycleEvent::OffPathCleared { index }]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn on_gesture_end(&mut self) -> Vec<LifecycleEvent> {
        if !self.phase.accepts_gestures() {
            return Vec::new();
        }
        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        let was_off = drag.phase() == DragPhase::OffPath;
        let handle = drag.state().handle_position;
        let DragResult::Released(outcome) = drag.on_gesture_end() else {
            return Vec::new();
        };

        self.outcomes.push(outcome);
        self.stats.attempts += 1;

        let mut events = Vec::with_capacity(2);
        if was_off {
            events.push(LifecycleEvent::OffPathCleared { index: outcome.index });
        }

        if outcome.is_success() {
            self.session.resolve_round(true);
            self.phase = RoundPhase::Success;
            self.schedule(self.success_delay, Transition::Advance);
            log::debug!("round {}: success at {:.0}%", outcome.index, outcome.final_progress);
            events.push(LifecycleEvent::RoundSucceeded { outcome, handle });
        } else {
            self.stats.failures += 1;
            self.phase = RoundPhase::Fail;
            let exhausted = self.max_attempts.is_some_and(|max| self.attempt + 1 >= max);
            if exhausted {
                self.session.resolve_round(false);
                self.schedule(self.fail_delay, Transition::Advance);
            } else {
                self.schedule(self.fail_delay, Transition::Replay);
            }
            log::debug!(
                "round {}: fail at {:.0}% (attempt {}, retry: {})",
                outcome.index,
                outcome.final_progress,
                self.attempt + 1,
                !exhausted
            );
            events.push(LifecycleEvent::RoundFailed {
                outcome,
                will_retry: !exhausted,
            });
        }
        events
    }

    /// Advance scheduled transitions by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        for (id, transition) in self.timers.tick(dt) {
            if self.pending == Some(id) {
                self.pending = None;
            }
            match transition {
                Transition::Replay => {
                    self.attempt += 1;
                    let orientation = self.drag.as_ref().map(|d| d.path().orientation());
                    events.push(self.arm_round(orientation));
                }
                Transition::Advance => {
                    self.phase = RoundPhase::Advancing;
                    if self.session.rounds_remaining() {
                        self.attempt = 0;
                        events.push(self.arm_round(None));
                    } else {
                        self.phase = RoundPhase::Complete;
                        self.session.finish();
                        self.drag = None;
                        log::info!(
                            "session complete: {}/{} correct",
                            self.session.correct_count(),
                            self.session.total_rounds()
                        );
                        events.push(LifecycleEvent::SessionComplete { session: self.session });
                    }
                }
            }
        }
        events
    }

    fn schedule(&mut self, delay: f32, transition: Transition) {
        if let Some(prev) = self.pending.take() {
            self.timers.cancel(prev);
        }
        self.pending = Some(self.timers.schedule(delay, transition));
    }

    /// Generate a path for the current round index and place the handle on its start.
    /// A replay passes the round's orientation so alternation advances per round.
    fn arm_round(&mut self, replay: Option<Orientation>) -> LifecycleEvent {
        let index = self.session.round_index();
        let path = match replay {
            Some(orientation) => self.generator.generate_oriented(orientation),
            None => self.generator.generate(),
        };
        self.drag = Some(DragController::new(index, path, self.settings));
        self.phase = RoundPhase::Armed;
        log::debug!("round {index}: armed (attempt {}) {:?}", self.attempt, path.orientation());
        LifecycleEvent::RoundStarted {
            index,
            attempt: self.attempt,
            path,
        }
    }
}
