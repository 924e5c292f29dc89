pub mod api;
pub mod core;
pub mod systems;
pub mod bridge;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::config::{EngineConfig, OrientationBias, SpeechConfig};
pub use api::engine::{EngineSnapshot, TraceEngine};
pub use api::error::{ConfigError, FeedbackError, PersistError};
pub use api::types::{
    DragPhase, HapticKind, Orientation, ResultSummary, RoundOutcome, RoundResult, SessionPhase,
    SessionState,
};
pub use api::variants::Variant;
pub use crate::core::path::{Path, Projection, PLAY_EXTENT};
pub use crate::core::rng::Rng;
pub use crate::core::timer::{TimerId, Timers};
pub use input::layout::PlayArea;
pub use input::queue::{InputEvent, InputQueue};
pub use systems::drag::{DragController, DragResult, DragSettings, DragState};
pub use systems::feedback::{FeedbackDispatcher, FeedbackSink, NullFeedback};
pub use systems::generator::{PathBounds, PathGenerator};
pub use systems::lifecycle::{AttemptStats, LifecycleEvent, RoundLifecycle, RoundPhase};
pub use systems::scorer::{LogReceipt, NullLogger, SessionLogger, SessionRecord, SessionScorer};
pub use bridge::commands::{BufferedFeedback, FeedbackCommand};
pub use bridge::protocol::FrameState;
