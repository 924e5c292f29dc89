/// Pointer events in the play area's pixel space, as the host measures it.
/// `pointer` distinguishes simultaneous touches; only one is ever live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began.
    PointerDown { pointer: u32, x: f32, y: f32 },
    /// A touch/cursor moved.
    PointerMove { pointer: u32, x: f32, y: f32 },
    /// A touch/click ended or was cancelled.
    PointerUp { pointer: u32, x: f32, y: f32 },
}

impl InputEvent {
    pub fn pointer(&self) -> u32 {
        match *self {
            InputEvent::PointerDown { pointer, .. }
            | InputEvent::PointerMove { pointer, .. }
            | InputEvent::PointerUp { pointer, .. } => pointer,
        }
    }
}

/// A queue of input events.
/// The host pushes events as they arrive; the engine drains them on tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { pointer: 0, x: 10.0, y: 20.0 });
        q.push(InputEvent::PointerMove { pointer: 0, x: 12.0, y: 20.0 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn pointer_id_accessor() {
        let ev = InputEvent::PointerUp { pointer: 3, x: 0.0, y: 0.0 };
        assert_eq!(ev.pointer(), 3);
    }
}
