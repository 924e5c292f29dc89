use std::collections::HashSet;

use glam::Vec2;

use crate::api::config::{EngineConfig, SpeechConfig};
use crate::api::error::FeedbackError;
use crate::api::types::HapticKind;
use crate::core::timer::{TimerId, Timers};
use crate::systems::lifecycle::LifecycleEvent;

pub const SOUND_SUCCESS: &str = "success";
pub const SOUND_RETRY: &str = "retry";

/// Effect collaborators supplied by the host. Every call is fire-and-forget:
/// errors are reported back only so the dispatcher can log and drop them.
/// Unimplemented channels default to no-ops.
pub trait FeedbackSink {
    fn speak(&mut self, _text: &str, _rate: f32) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn haptic(&mut self, _kind: HapticKind) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn play_sound(&mut self, _name: &str, _volume: f32, _rate: f32) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn sparkle(&mut self, _at: Vec2) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn show_alert(&mut self, _text: &str) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn clear_alert(&mut self) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {}

/// Utterances that must not repeat within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Cue {
    Prompt,
    Affirmation,
    Retry,
    Summary,
}

/// Maps lifecycle transitions to effect calls.
///
/// Speech is deduplicated per `(cue, round index)`: a replayed round does not
/// repeat its prompt. The off-path alert clears when the drag returns within
/// tolerance or after `alert_timeout` seconds.
pub struct FeedbackDispatcher {
    sink: Box<dyn FeedbackSink>,
    speech: SpeechConfig,
    alert_timeout: f32,
    mounted: bool,
    spoken: HashSet<(Cue, u32)>,
    alert_timers: Timers<()>,
    alert: Option<TimerId>,
}

impl FeedbackDispatcher {
    pub fn new(sink: Box<dyn FeedbackSink>, config: &EngineConfig) -> Self {
        Self {
            sink,
            speech: config.speech.clone(),
            alert_timeout: config.alert_timeout,
            mounted: true,
            spoken: HashSet::new(),
            alert_timers: Timers::new(),
            alert: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn alert_visible(&self) -> bool {
        self.alert.is_some()
    }

    /// React to a lifecycle transition.
    pub fn dispatch(&mut self, event: &LifecycleEvent) {
        if !self.mounted {
            return;
        }
        match event {
            LifecycleEvent::RoundStarted { index, .. } => {
                self.dismiss_alert();
                let prompt = self.speech.prompt.clone();
                self.say_once(Cue::Prompt, *index, &prompt);
            }
            LifecycleEvent::DragStarted { .. } => {}
            LifecycleEvent::OffPathEntered { .. } => {
                log_failure(self.sink.haptic(HapticKind::Warning));
                let text = self.speech.off_path_alert.clone();
                log_failure(self.sink.show_alert(&text));
                if let Some(prev) = self.alert.take() {
                    self.alert_timers.cancel(prev);
                }
                self.alert = Some(self.alert_timers.schedule(self.alert_timeout, ()));
            }
            LifecycleEvent::OffPathCleared { .. } => self.dismiss_alert(),
            LifecycleEvent::RoundSucceeded { outcome, handle } => {
                log_failure(self.sink.play_sound(SOUND_SUCCESS, 0.8, 1.0));
                log_failure(self.sink.haptic(HapticKind::Success));
                log_failure(self.sink.sparkle(*handle));
                let text = self.speech.affirmation(outcome.index as usize).to_string();
                self.say_once(Cue::Affirmation, outcome.index, &text);
            }
            LifecycleEvent::RoundFailed { outcome, .. } => {
                log_failure(self.sink.play_sound(SOUND_RETRY, 0.6, 1.0));
                log_failure(self.sink.haptic(HapticKind::Light));
                let text = self.speech.retry.clone();
                self.say_once(Cue::Retry, outcome.index, &text);
            }
            LifecycleEvent::SessionComplete { session } => {
                self.dismiss_alert();
                let text = self
                    .speech
                    .summary_for(session.correct_count(), session.total_rounds());
                self.say_once(Cue::Summary, session.total_rounds(), &text);
            }
        }
    }

    /// Advance the alert timeout.
    pub fn tick(&mut self, dt: f32) {
        let fired = self.alert_timers.tick(dt);
        if !self.mounted {
            return;
        }
        for (id, ()) in fired {
            if self.alert == Some(id) {
                self.alert = None;
                log_failure(self.sink.clear_alert());
            }
        }
    }

    /// Forget spoken cues for a new session.
    pub fn reset(&mut self) {
        self.dismiss_alert();
        self.spoken.clear();
    }

    /// Stop all effects. Nothing fires after this.
    pub fn dispose(&mut self) {
        self.alert_timers.cancel_all();
        self.alert = None;
        self.mounted = false;
    }

    fn dismiss_alert(&mut self) {
        if let Some(id) = self.alert.take() {
            self.alert_timers.cancel(id);
            log_failure(self.sink.clear_alert());
        }
    }

    fn say_once(&mut self, cue: Cue, round: u32, text: &str) {
        if text.is_empty() || !self.spoken.insert((cue, round)) {
            return;
        }
        log_failure(self.sink.speak(text, self.speech.rate));
    }
}

fn log_failure(result: Result<(), FeedbackError>) {
    if let Err(err) = result {
        log::debug!("{err} (ignored)");
    }
}
