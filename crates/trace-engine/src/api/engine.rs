use serde::Serialize;

use crate::api::config::EngineConfig;
use crate::api::error::ConfigError;
use crate::api::types::{Orientation, ResultSummary, SessionState};
use crate::api::variants::Variant;
use crate::bridge::protocol::{
    flag, FrameState, ORIENTATION_HORIZONTAL, ORIENTATION_NONE, ORIENTATION_VERTICAL,
    PROTOCOL_VERSION,
};
use crate::core::path::Path;
use crate::input::layout::PlayArea;
use crate::input::queue::{InputEvent, InputQueue};
use crate::systems::drag::DragState;
use crate::systems::feedback::{FeedbackDispatcher, FeedbackSink};
use crate::systems::lifecycle::{LifecycleEvent, RoundLifecycle, RoundPhase};
use crate::systems::scorer::{SessionLogger, SessionScorer};

/// Serializable view of everything a presentation layer needs to draw a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub phase: RoundPhase,
    pub session: SessionState,
    pub attempt: u32,
    pub path: Option<Path>,
    pub drag: Option<DragState>,
    pub deviation: f32,
    pub alert_visible: bool,
    pub summary: Option<ResultSummary>,
    pub saved_at: Option<String>,
}

/// The engine a presentation shell talks to.
///
/// Wires the pieces together: pixel gestures are normalized and fed to the
/// round lifecycle; every transition it reports goes to the feedback
/// dispatcher, and session completion goes to the scorer. Time only moves
/// through [`tick`](Self::tick).
pub struct TraceEngine {
    config: EngineConfig,
    layout: PlayArea,
    input: InputQueue,
    lifecycle: RoundLifecycle,
    dispatcher: FeedbackDispatcher,
    scorer: SessionScorer,
    logger: Box<dyn SessionLogger>,
    active_pointer: Option<u32>,
    mounted: bool,
    on_back: Option<Box<dyn FnMut()>>,
}

impl TraceEngine {
    pub fn new(
        config: EngineConfig,
        feedback: Box<dyn FeedbackSink>,
        logger: Box<dyn SessionLogger>,
    ) -> Result<Self, ConfigError> {
        let lifecycle = RoundLifecycle::new(&config)?;
        let dispatcher = FeedbackDispatcher::new(feedback, &config);
        let scorer = SessionScorer::new(&config);
        Ok(Self {
            config,
            layout: PlayArea::unmeasured(),
            input: InputQueue::new(),
            lifecycle,
            dispatcher,
            scorer,
            logger,
            active_pointer: None,
            mounted: true,
            on_back: None,
        })
    }

    /// Build an engine from a variant preset with the given RNG seed.
    pub fn for_variant(
        variant: Variant,
        seed: u64,
        feedback: Box<dyn FeedbackSink>,
        logger: Box<dyn SessionLogger>,
    ) -> Result<Self, ConfigError> {
        let config = EngineConfig {
            seed,
            ..variant.config()
        };
        Self::new(config, feedback, logger)
    }

    /// Register the host's back navigation callback.
    pub fn set_back_handler(&mut self, handler: impl FnMut() + 'static) {
        self.on_back = Some(Box::new(handler));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> PlayArea {
        self.layout
    }

    pub fn lifecycle(&self) -> &RoundLifecycle {
        &self.lifecycle
    }

    pub fn session(&self) -> &SessionState {
        self.lifecycle.session()
    }

    pub fn summary(&self) -> Option<ResultSummary> {
        self.scorer.summary()
    }

    pub fn saved_at(&self) -> Option<&str> {
        self.scorer.saved_at()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Update the measured play-area size in host pixels.
    pub fn set_layout(&mut self, width: f32, height: f32) {
        self.layout = PlayArea::new(width, height);
        if !self.layout.is_measured() {
            log::warn!("play area {width}x{height} is not measurable; gestures dropped until relayout");
        }
    }

    /// Arm the first round.
    pub fn start(&mut self) {
        if !self.mounted {
            return;
        }
        let events = self.lifecycle.start();
        self.route(events);
    }

    /// Queue a gesture sample; processed on the next [`tick`](Self::tick).
    pub fn push_input(&mut self, event: InputEvent) {
        if self.mounted {
            self.input.push(event);
        }
    }

    /// Process a gesture sample immediately.
    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.mounted {
            return;
        }
        let events = match event {
            InputEvent::PointerDown { pointer, x, y } => {
                if self.active_pointer.is_some() {
                    log::debug!("pointer {pointer} ignored: another drag is live");
                    return;
                }
                let Some(p) = self.layout.normalize(x, y) else {
                    return;
                };
                let events = self.lifecycle.on_gesture_start(p);
                if events
                    .iter()
                    .any(|e| matches!(e, LifecycleEvent::DragStarted { .. }))
                {
                    self.active_pointer = Some(pointer);
                }
                events
            }
            InputEvent::PointerMove { pointer, x, y } => {
                if self.active_pointer != Some(pointer) {
                    return;
                }
                let Some(p) = self.layout.normalize(x, y) else {
                    return;
                };
                self.lifecycle.on_gesture_move(p)
            }
            InputEvent::PointerUp { pointer, .. } => {
                if self.active_pointer != Some(pointer) {
                    return;
                }
                self.active_pointer = None;
                self.lifecycle.on_gesture_end()
            }
        };
        self.route(events);
    }

    /// Advance timers by `dt` seconds, then apply queued input. Timers that
    /// input schedules here start counting on the next tick.
    pub fn tick(&mut self, dt: f32) {
        if !self.mounted {
            return;
        }
        let events = self.lifecycle.tick(dt);
        self.route(events);
        self.dispatcher.tick(dt);
        for event in self.input.drain() {
            self.handle_input(event);
        }
    }

    /// Start a fresh session ("play again").
    pub fn reset(&mut self) {
        if !self.mounted {
            return;
        }
        self.input.clear();
        self.active_pointer = None;
        self.scorer.reset();
        self.dispatcher.reset();
        let events = self.lifecycle.reset();
        self.route(events);
    }

    /// Tear down: cancel every timer and silence all feedback. Idempotent.
    pub fn dispose(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.input.clear();
        self.active_pointer = None;
        self.lifecycle.cancel_pending();
        self.dispatcher.dispose();
        log::info!("engine disposed");
    }

    /// Leave the screen: dispose, then hand control back to the host.
    pub fn back(&mut self) {
        self.dispose();
        if let Some(handler) = self.on_back.as_mut() {
            handler();
        }
    }

    /// Timestamp reported by the host after an asynchronous save.
    pub fn record_saved_at(&mut self, at: impl Into<String>) {
        self.scorer.record_saved_at(at);
    }

    fn route(&mut self, events: Vec<LifecycleEvent>) {
        for event in events {
            self.dispatcher.dispatch(&event);
            if let LifecycleEvent::SessionComplete { session } = event {
                self.scorer.complete(
                    &session,
                    self.lifecycle.outcomes(),
                    self.lifecycle.stats(),
                    self.logger.as_mut(),
                );
            }
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let drag = self.lifecycle.drag();
        EngineSnapshot {
            phase: self.lifecycle.phase(),
            session: *self.lifecycle.session(),
            attempt: self.lifecycle.attempt(),
            path: drag.map(|d| *d.path()),
            drag: drag.map(|d| *d.state()),
            deviation: drag.map_or(0.0, |d| d.last_deviation()),
            alert_visible: self.dispatcher.alert_visible(),
            summary: self.scorer.summary(),
            saved_at: self.scorer.saved_at().map(str::to_string),
        }
    }

    /// Pack the current state into the flat wire record.
    pub fn frame(&self) -> FrameState {
        let session = self.lifecycle.session();
        let summary = self.scorer.summary();
        let mut frame = FrameState {
            version: PROTOCOL_VERSION,
            lifecycle_phase: self.lifecycle.phase().code(),
            drag_phase: -1.0,
            orientation: ORIENTATION_NONE,
            round_index: session.round_index() as f32,
            total_rounds: session.total_rounds() as f32,
            correct_count: session.correct_count() as f32,
            attempt: self.lifecycle.attempt() as f32,
            alert_visible: flag(self.dispatcher.alert_visible()),
            session_finished: flag(session.is_finished()),
            accuracy: summary.map_or(0.0, |s| s.accuracy as f32),
            xp_awarded: summary.map_or(0.0, |s| s.xp_awarded as f32),
            saved: flag(self.scorer.saved_at().is_some()),
            ..FrameState::default()
        };
        if let Some(drag) = self.lifecycle.drag() {
            let path = drag.path();
            let state = drag.state();
            frame.drag_phase = state.phase.code();
            frame.orientation = match path.orientation() {
                Orientation::Horizontal => ORIENTATION_HORIZONTAL,
                Orientation::Vertical => ORIENTATION_VERTICAL,
            };
            frame.path_start_x = path.start().x;
            frame.path_start_y = path.start().y;
            frame.path_end_x = path.end().x;
            frame.path_end_y = path.end().y;
            frame.tolerance_radius = path.tolerance_radius();
            frame.handle_x = state.handle_position.x;
            frame.handle_y = state.handle_position.y;
            frame.progress = state.progress;
            frame.deviation = drag.last_deviation();
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::OrientationBias;
    use crate::api::types::{DragPhase, SessionPhase};
    use crate::bridge::commands::{BufferedFeedback, FeedbackCommand};
    use crate::systems::feedback::tests::Recorder;
    use crate::systems::feedback::NullFeedback;
    use crate::systems::scorer::tests::FakeLogger;
    use crate::systems::scorer::NullLogger;
    use glam::Vec2;
    use std::cell::Cell;
    use std::rc::Rc;

    const SIDE: f32 = 400.0;

    fn config(rounds: u32) -> EngineConfig {
        EngineConfig {
            total_rounds: rounds,
            orientation_bias: OrientationBias::Fixed(Orientation::Horizontal),
            ..EngineConfig::default()
        }
    }

    fn engine_with(rounds: u32, logger: FakeLogger) -> TraceEngine {
        let mut engine =
            TraceEngine::new(config(rounds), Box::new(NullFeedback), Box::new(logger)).unwrap();
        engine.set_layout(SIDE, SIDE);
        engine.start();
        engine
    }

    fn px(p: Vec2) -> (f32, f32) {
        (p.x * SIDE / 100.0, p.y * SIDE / 100.0)
    }

    fn current_path(engine: &TraceEngine) -> Path {
        engine.snapshot().path.expect("round armed")
    }

    /// Drag from the path start to fraction `t` of the way along, then release.
    fn drag_to(engine: &mut TraceEngine, t: f32) {
        let path = current_path(engine);
        let (x, y) = px(path.start());
        engine.handle_input(InputEvent::PointerDown { pointer: 1, x, y });
        for i in 1..=10 {
            let (x, y) = px(path.point_at(t * i as f32 / 10.0));
            engine.handle_input(InputEvent::PointerMove { pointer: 1, x, y });
        }
        let (x, y) = px(path.point_at(t));
        engine.handle_input(InputEvent::PointerUp { pointer: 1, x, y });
    }

    #[test]
    fn scenario_a_success_counts() {
        let mut engine = engine_with(3, FakeLogger::rejecting());
        drag_to(&mut engine, 69.0 / 70.0);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Success);
        assert_eq!(engine.session().correct_count(), 1);
    }

    #[test]
    fn scenario_b_off_path_freezes_handle() {
        let mut engine = engine_with(3, FakeLogger::rejecting());
        let path = current_path(&engine);
        let (x, y) = px(path.start());
        engine.handle_input(InputEvent::PointerDown { pointer: 0, x, y });
        let before = engine.snapshot().drag.unwrap();

        let (x, y) = px(path.point_at(0.5) + Vec2::new(0.0, 25.0));
        engine.handle_input(InputEvent::PointerMove { pointer: 0, x, y });

        let snap = engine.snapshot();
        let drag = snap.drag.unwrap();
        assert_eq!(drag.phase, DragPhase::OffPath);
        assert_eq!(drag.handle_position, before.handle_position);
        assert_eq!(drag.progress, before.progress);
        assert!(snap.alert_visible);
        assert_eq!(snap.phase, RoundPhase::OffPath);
    }

    #[test]
    fn scenario_c_early_release_replays_round() {
        let mut engine = engine_with(3, FakeLogger::rejecting());
        let first = current_path(&engine);
        drag_to(&mut engine, 0.35);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Fail);
        assert_eq!(engine.session().round_index(), 0);

        engine.tick(1.3);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, RoundPhase::Armed);
        assert_eq!(snap.attempt, 1);
        assert_eq!(snap.session.round_index(), 0);
        let path = snap.path.unwrap();
        assert_ne!(path, first);
        assert_eq!(snap.drag.unwrap().handle_position, path.start());
    }

    #[test]
    fn scenario_d_session_completion() {
        let logger = FakeLogger::answering(r#"{"last":{"at":"2026-10-18T09:30:00Z"}}"#);
        let records = logger.records.clone();
        let mut engine = engine_with(8, logger);

        for round in 0..8 {
            if round == 2 || round == 5 {
                drag_to(&mut engine, 0.3);
                engine.tick(1.3);
            }
            drag_to(&mut engine, 1.0);
            engine.tick(1.6);
        }

        assert_eq!(engine.session().phase(), SessionPhase::Finished);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Complete);
        let summary = engine.summary().unwrap();
        assert_eq!(summary.correct, 8);
        assert_eq!(summary.total, 8);
        assert_eq!(summary.accuracy, 100);
        assert_eq!(summary.xp_awarded, 8 * 15);
        assert_eq!(engine.saved_at(), Some("2026-10-18T09:30:00Z"));

        let records = records.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].meta["attempts"], 10);
        assert_eq!(records[0].meta["failedAttempts"], 2);

        // Idle ticks after completion never log again.
        engine.tick(10.0);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn touch_off_handle_never_starts_a_drag() {
        let mut engine = engine_with(2, FakeLogger::rejecting());
        let path = current_path(&engine);
        let (x, y) = px(path.point_at(0.5));
        engine.handle_input(InputEvent::PointerDown { pointer: 0, x, y });
        let (x, y) = px(path.end());
        engine.handle_input(InputEvent::PointerMove { pointer: 0, x, y });
        engine.handle_input(InputEvent::PointerUp { pointer: 0, x, y });
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Armed);
        assert!(engine.lifecycle().outcomes().is_empty());
    }

    #[test]
    fn second_pointer_is_ignored() {
        let mut engine = engine_with(2, FakeLogger::rejecting());
        let path = current_path(&engine);
        let (x, y) = px(path.start());
        engine.handle_input(InputEvent::PointerDown { pointer: 0, x, y });
        let (x, y) = px(path.point_at(0.4));
        engine.handle_input(InputEvent::PointerMove { pointer: 0, x, y });
        let progress = engine.snapshot().drag.unwrap().progress;

        let (x2, y2) = px(path.end());
        engine.handle_input(InputEvent::PointerDown { pointer: 7, x: x2, y: y2 });
        engine.handle_input(InputEvent::PointerMove { pointer: 7, x: x2, y: y2 });
        engine.handle_input(InputEvent::PointerUp { pointer: 7, x: x2, y: y2 });

        let snap = engine.snapshot();
        assert_eq!(snap.phase, RoundPhase::Dragging);
        assert_eq!(snap.drag.unwrap().progress, progress);
    }

    #[test]
    fn unmeasured_layout_drops_gestures() {
        let mut engine =
            TraceEngine::new(config(2), Box::new(NullFeedback), Box::new(NullLogger)).unwrap();
        engine.start();
        engine.handle_input(InputEvent::PointerDown { pointer: 0, x: 10.0, y: 10.0 });
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Armed);
    }

    #[test]
    fn queued_input_applies_on_tick() {
        let mut engine = engine_with(2, FakeLogger::rejecting());
        let path = current_path(&engine);
        let (x, y) = px(path.start());
        engine.push_input(InputEvent::PointerDown { pointer: 0, x, y });
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Armed);
        engine.tick(0.016);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Dragging);
    }

    #[test]
    fn long_frame_keeps_success_display_delay() {
        let mut engine = engine_with(3, FakeLogger::rejecting());
        let path = current_path(&engine);
        let (sx, sy) = px(path.start());
        let (ex, ey) = px(path.end());
        engine.push_input(InputEvent::PointerDown { pointer: 0, x: sx, y: sy });
        engine.push_input(InputEvent::PointerMove { pointer: 0, x: ex, y: ey });
        engine.push_input(InputEvent::PointerUp { pointer: 0, x: ex, y: ey });

        engine.tick(2.0);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Success);
        assert_eq!(engine.session().round_index(), 1);
        assert!(engine.lifecycle().has_pending_transition());

        engine.tick(1.0);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Success);
        engine.tick(0.6);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Armed);
    }

    #[test]
    fn long_frame_keeps_fail_display_delay() {
        let mut engine = engine_with(3, FakeLogger::rejecting());
        let path = current_path(&engine);
        let (sx, sy) = px(path.start());
        let (mx, my) = px(path.point_at(0.3));
        engine.push_input(InputEvent::PointerDown { pointer: 0, x: sx, y: sy });
        engine.push_input(InputEvent::PointerMove { pointer: 0, x: mx, y: my });
        engine.push_input(InputEvent::PointerUp { pointer: 0, x: mx, y: my });

        engine.tick(5.0);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Fail);
        assert_eq!(engine.lifecycle().attempt(), 0);
        engine.tick(1.3);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Armed);
        assert_eq!(engine.lifecycle().attempt(), 1);
    }

    #[test]
    fn dispose_cancels_pending_advance_and_silences_feedback() {
        let rec = Recorder::default();
        let mut engine =
            TraceEngine::new(config(2), Box::new(rec.clone()), Box::new(NullLogger)).unwrap();
        engine.set_layout(SIDE, SIDE);
        engine.start();
        drag_to(&mut engine, 1.0);
        assert!(engine.lifecycle().has_pending_transition());

        engine.dispose();
        rec.take();
        engine.tick(5.0);
        engine.handle_input(InputEvent::PointerDown { pointer: 0, x: 0.0, y: 0.0 });
        engine.reset();

        assert!(rec.take().is_empty());
        assert_eq!(engine.session().round_index(), 1);
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Success);
        assert!(!engine.lifecycle().has_pending_transition());
    }

    #[test]
    fn back_disposes_then_calls_host() {
        let called = Rc::new(Cell::new(false));
        let mut engine = engine_with(2, FakeLogger::rejecting());
        let seen = called.clone();
        engine.set_back_handler(move || seen.set(true));
        engine.back();
        assert!(called.get());
        assert!(!engine.is_mounted());
    }

    #[test]
    fn reset_after_completion_plays_again() {
        let logger = FakeLogger::answering("{}");
        let records = logger.records.clone();
        let mut engine = engine_with(1, logger);
        drag_to(&mut engine, 1.0);
        engine.tick(2.0);
        assert!(engine.summary().is_some());

        engine.reset();
        assert!(engine.summary().is_none());
        assert_eq!(engine.lifecycle().phase(), RoundPhase::Armed);
        drag_to(&mut engine, 1.0);
        engine.tick(2.0);
        assert_eq!(records.borrow().len(), 2);
    }

    #[test]
    fn buffered_feedback_receives_session_cues() {
        let host = BufferedFeedback::with_capacity(64);
        let mut engine = TraceEngine::for_variant(
            Variant::LaserBeam,
            9,
            Box::new(host.clone()),
            Box::new(NullLogger),
        )
        .unwrap();
        engine.set_layout(SIDE, SIDE);
        engine.start();
        let cmds = host.drain();
        assert!(matches!(cmds.as_slice(), [FeedbackCommand::Speak { .. }]));

        drag_to(&mut engine, 1.0);
        let cmds = host.drain();
        assert!(cmds.iter().any(|c| matches!(c, FeedbackCommand::PlaySound { name, .. } if name == "success")));
        assert!(cmds.iter().any(|c| matches!(c, FeedbackCommand::Sparkle { .. })));
    }

    #[test]
    fn frame_mirrors_snapshot() {
        let mut engine = engine_with(3, FakeLogger::rejecting());
        let path = current_path(&engine);
        let (x, y) = px(path.start());
        engine.handle_input(InputEvent::PointerDown { pointer: 0, x, y });
        let (x, y) = px(path.point_at(0.5));
        engine.handle_input(InputEvent::PointerMove { pointer: 0, x, y });

        let frame = engine.frame();
        assert_eq!(frame.version, PROTOCOL_VERSION);
        assert_eq!(frame.lifecycle_phase, RoundPhase::Dragging.code());
        assert_eq!(frame.drag_phase, DragPhase::Dragging.code());
        assert_eq!(frame.orientation, ORIENTATION_HORIZONTAL);
        assert_eq!(frame.total_rounds, 3.0);
        assert_eq!(frame.path_start_x, path.start().x);
        assert!((frame.progress - 50.0).abs() < 0.01);
    }

    #[test]
    fn snapshot_serializes() {
        let engine = engine_with(3, FakeLogger::rejecting());
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["phase"], "armed");
        assert_eq!(json["session"]["totalRounds"], 3);
        assert_eq!(json["drag"]["phase"], "armed");
    }
}
