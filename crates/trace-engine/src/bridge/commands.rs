use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;
use serde::Serialize;

use crate::api::error::FeedbackError;
use crate::api::types::HapticKind;
use crate::systems::feedback::FeedbackSink;

/// A feedback call recorded for a host that plays effects itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedbackCommand {
    Speak { text: String, rate: f32 },
    Haptic { kind: HapticKind },
    PlaySound { name: String, volume: f32, rate: f32 },
    Sparkle { x: f32, y: f32 },
    ShowAlert { text: String },
    ClearAlert,
}

/// Shared queue of recorded commands. Clones share the same queue, so one
/// clone can be handed to the engine while the host keeps another to drain.
#[derive(Debug, Clone, Default)]
pub struct BufferedFeedback {
    commands: Rc<RefCell<VecDeque<FeedbackCommand>>>,
    capacity: usize,
}

impl BufferedFeedback {
    /// Keep at most `capacity` undrained commands; the oldest are dropped beyond that.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Rc::new(RefCell::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn drain(&self) -> Vec<FeedbackCommand> {
        self.commands.borrow_mut().drain(..).collect()
    }

    /// Drain as a JSON array.
    pub fn drain_json(&self) -> String {
        serde_json::to_string(&self.drain()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    fn push(&self, command: FeedbackCommand) -> Result<(), FeedbackError> {
        let mut commands = self
            .commands
            .try_borrow_mut()
            .map_err(|_| FeedbackError::new("buffer", "queue busy"))?;
        if self.capacity > 0 && commands.len() >= self.capacity {
            commands.pop_front();
            log::warn!("feedback buffer full; dropping oldest command");
        }
        commands.push_back(command);
        Ok(())
    }
}

impl FeedbackSink for BufferedFeedback {
    fn speak(&mut self, text: &str, rate: f32) -> Result<(), FeedbackError> {
        self.push(FeedbackCommand::Speak { text: text.to_string(), rate })
    }

    fn haptic(&mut self, kind: HapticKind) -> Result<(), FeedbackError> {
        self.push(FeedbackCommand::Haptic { kind })
    }

    fn play_sound(&mut self, name: &str, volume: f32, rate: f32) -> Result<(), FeedbackError> {
        self.push(FeedbackCommand::PlaySound {
            name: name.to_string(),
            volume,
            rate,
        })
    }

    fn sparkle(&mut self, at: Vec2) -> Result<(), FeedbackError> {
        self.push(FeedbackCommand::Sparkle { x: at.x, y: at.y })
    }

    fn show_alert(&mut self, text: &str) -> Result<(), FeedbackError> {
        self.push(FeedbackCommand::ShowAlert { text: text.to_string() })
    }

    fn clear_alert(&mut self) -> Result<(), FeedbackError> {
        self.push(FeedbackCommand::ClearAlert)
    }
}
