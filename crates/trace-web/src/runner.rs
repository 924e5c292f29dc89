use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::JsValue;

use trace_engine::{
    BufferedFeedback, ConfigError, EngineConfig, FrameState, InputEvent, LogReceipt,
    PersistError, SessionLogger, SessionRecord, TraceEngine, Variant,
};

/// Undrained feedback commands kept before the oldest are dropped.
const FEEDBACK_CAPACITY: usize = 256;

/// Forwards each session record, as JSON, to a host callback.
///
/// The callback may return a receipt JSON string synchronously. Any other
/// return value counts as accepted; an async host reports the timestamp later
/// through `engine_record_saved_at`.
#[derive(Clone, Default)]
pub struct JsSessionLogger {
    callback: Rc<RefCell<Option<Function>>>,
}

impl JsSessionLogger {
    pub fn set_callback(&self, callback: Option<Function>) {
        *self.callback.borrow_mut() = callback;
    }

    pub fn is_connected(&self) -> bool {
        self.callback.borrow().is_some()
    }
}

impl SessionLogger for JsSessionLogger {
    fn log_session(&mut self, record: &SessionRecord) -> Result<LogReceipt, PersistError> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Err(PersistError::Unavailable);
        };
        let json = serde_json::to_string(record)
            .map_err(|err| PersistError::Rejected(err.to_string()))?;
        let reply = callback
            .call1(&JsValue::NULL, &JsValue::from_str(&json))
            .map_err(|err| PersistError::Rejected(format!("{err:?}")))?;
        match reply.as_string() {
            Some(text) => LogReceipt::from_json(&text),
            None => Ok(LogReceipt::default()),
        }
    }
}

/// Owns the engine plus the host-side halves of its collaborators.
///
/// A single `thread_local!` runner backs the `#[wasm_bindgen]` exports,
/// because wasm-bindgen cannot hand out references into Rust state.
pub struct EngineRunner {
    engine: TraceEngine,
    feedback: BufferedFeedback,
    logger: JsSessionLogger,
    frame: FrameState,
}

impl EngineRunner {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let feedback = BufferedFeedback::with_capacity(FEEDBACK_CAPACITY);
        let logger = JsSessionLogger::default();
        let engine = TraceEngine::new(
            config,
            Box::new(feedback.clone()),
            Box::new(logger.clone()),
        )?;
        Ok(Self {
            engine,
            feedback,
            logger,
            frame: FrameState::default(),
        })
    }

    pub fn for_variant(name: &str, seed: u64) -> Result<Self, ConfigError> {
        let variant: Variant = name.parse()?;
        Self::new(EngineConfig {
            seed,
            ..variant.config()
        })
    }

    pub fn engine(&self) -> &TraceEngine {
        &self.engine
    }

    /// Arm the first round and publish the initial frame.
    pub fn init(&mut self) {
        self.engine.start();
        self.refresh();
    }

    pub fn set_layout(&mut self, width: f32, height: f32) {
        self.engine.set_layout(width, height);
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.engine.push_input(event);
    }

    /// Apply queued input, advance timers, and repack the frame record.
    pub fn tick(&mut self, dt: f32) {
        self.engine.tick(dt);
        self.refresh();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.refresh();
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
        self.feedback.drain();
        self.refresh();
    }

    pub fn back(&mut self) {
        self.engine.back();
        self.feedback.drain();
        self.refresh();
    }

    pub fn set_back_handler(&mut self, callback: Function) {
        self.engine.set_back_handler(move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                log::warn!("back handler threw");
                web_sys::console::error_1(&err);
            }
        });
    }

    pub fn set_session_logger(&mut self, callback: Option<Function>) {
        self.logger.set_callback(callback);
    }

    pub fn record_saved_at(&mut self, at: &str) {
        self.engine.record_saved_at(at);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.frame = self.engine.frame();
    }

    // ---- Accessors for host reads ----

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame.as_floats().as_ptr()
    }

    pub fn frame_len(&self) -> u32 {
        FrameState::FLOATS as u32
    }

    pub fn take_feedback_json(&self) -> String {
        self.feedback.drain_json()
    }

    pub fn snapshot_json(&self) -> String {
        match serde_json::to_string(&self.engine.snapshot()) {
            Ok(json) => json,
            Err(err) => {
                log::error!("snapshot serialization failed: {err}");
                "null".to_string()
            }
        }
    }
}
