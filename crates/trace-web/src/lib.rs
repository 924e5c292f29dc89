pub mod runner;

pub use runner::{EngineRunner, JsSessionLogger};

use std::cell::RefCell;

use js_sys::Function;
use trace_engine::{EngineConfig, InputEvent};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<EngineRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. Calls before `engine_init`, or re-entrant
/// calls from inside a host callback, are logged and skipped.
fn with_runner<R>(f: impl FnOnce(&mut EngineRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let Ok(mut borrow) = cell.try_borrow_mut() else {
            log::warn!("engine busy; re-entrant call from a host callback ignored");
            return None;
        };
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("engine not initialized. Call engine_init() first.");
                None
            }
        }
    })
}

fn install(runner: Result<EngineRunner, trace_engine::ConfigError>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let mut runner = runner.map_err(|err| JsValue::from_str(&err.to_string()))?;
    runner.init();
    let kind = runner.engine().config().kind.clone();

    RUNNER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(mut previous) = slot.replace(runner) {
                previous.dispose();
            }
            Ok(())
        }
        Err(_) => Err(JsValue::from_str("engine_init called from inside a host callback")),
    })?;
    log::info!("{kind}: initialized");
    Ok(())
}

/// Start a session from a named preset (`line-trace`, `rolling-ball`, ...).
#[wasm_bindgen]
pub fn engine_init(variant: &str, seed: u32) -> Result<(), JsValue> {
    install(EngineRunner::for_variant(variant, u64::from(seed)))
}

/// Start a session from a full JSON configuration.
#[wasm_bindgen]
pub fn engine_init_with_config(json: &str) -> Result<(), JsValue> {
    install(EngineConfig::from_json(json).and_then(EngineRunner::new))
}

#[wasm_bindgen]
pub fn engine_set_layout(width: f32, height: f32) {
    with_runner(|r| r.set_layout(width, height));
}

#[wasm_bindgen]
pub fn engine_pointer_down(pointer: u32, x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerDown { pointer, x, y }));
}

#[wasm_bindgen]
pub fn engine_pointer_move(pointer: u32, x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { pointer, x, y }));
}

#[wasm_bindgen]
pub fn engine_pointer_up(pointer: u32, x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerUp { pointer, x, y }));
}

#[wasm_bindgen]
pub fn engine_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

#[wasm_bindgen]
pub fn engine_reset() {
    with_runner(|r| r.reset());
}

#[wasm_bindgen]
pub fn engine_dispose() {
    with_runner(|r| r.dispose());
}

#[wasm_bindgen]
pub fn engine_back() {
    with_runner(|r| r.back());
}

#[wasm_bindgen]
pub fn engine_set_back_handler(callback: Function) {
    with_runner(|r| r.set_back_handler(callback));
}

/// Register the session-log callback. It receives the record as a JSON string.
#[wasm_bindgen]
pub fn engine_set_session_logger(callback: Option<Function>) {
    with_runner(|r| r.set_session_logger(callback));
}

#[wasm_bindgen]
pub fn engine_record_saved_at(at: &str) {
    with_runner(|r| r.record_saved_at(at));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_frame_ptr() -> *const f32 {
    with_runner(|r| r.frame_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_frame_len() -> u32 {
    with_runner(|r| r.frame_len()).unwrap_or(0)
}

/// Feedback commands issued since the last call, as a JSON array.
#[wasm_bindgen]
pub fn engine_take_feedback_json() -> String {
    with_runner(|r| r.take_feedback_json()).unwrap_or_else(|| "[]".to_string())
}

#[wasm_bindgen]
pub fn engine_snapshot_json() -> String {
    with_runner(|r| r.snapshot_json()).unwrap_or_else(|| "null".to_string())
}
