// core/timer.rs
//
// Scheduled transitions with cancellation handles.
// Same shape as the tween system: handles keyed by id, advanced by tick(dt),
// fired payloads drained by the caller.
//
// Usage:
//   let mut timers = Timers::new();
//   let id = timers.schedule(1.5, Transition::Advance);
//   for fired in timers.tick(dt) { ... }
//   timers.cancel(id);

/// Handle to a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u32);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    remaining: f32,
    payload: T,
}

/// A set of one-shot timers carrying a payload that is handed back when they fire.
#[derive(Debug, Clone)]
pub struct Timers<T> {
    pending: Vec<Pending<T>>,
    next_id: u32,
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule `payload` to fire after `delay` seconds. Negative or NaN delays fire on the next tick.
    pub fn schedule(&mut self, delay: f32, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let remaining = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self.pending.push(Pending { id, remaining, payload });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance all timers by `dt` seconds. Returns fired payloads in scheduling order.
    pub fn tick(&mut self, dt: f32) -> Vec<(TimerId, T)> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for p in &mut self.pending {
            p.remaining -= dt;
        }
        let (fired, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| p.remaining <= 0.0);
        self.pending = waiting;
        fired.into_iter().map(|p| (p.id, p.payload)).collect()
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}
