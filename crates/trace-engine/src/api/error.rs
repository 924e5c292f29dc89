use thiserror::Error;

/// Rejected engine configuration. The only errors surfaced to the caller;
/// everything at runtime is clamped, ignored or swallowed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("session must have at least one round")]
    NoRounds,
    #[error("session of {0} rounds exceeds the limit of {max}", max = crate::api::config::MAX_ROUNDS)]
    TooManyRounds(u32),
    #[error("tolerance radius must be positive and finite, got {0}")]
    InvalidTolerance(f32),
    #[error("handle size must be positive and finite, got {0}")]
    InvalidHandleSize(f32),
    #[error("success threshold must lie in 0..=100, got {0}")]
    InvalidThreshold(f32),
    #[error("safe margin {margin} leaves no room for a path of length {min_length}")]
    InvalidBounds { margin: f32, min_length: f32 },
    #[error("delay `{name}` must be non-negative and finite, got {value}")]
    InvalidDelay { name: &'static str, value: f32 },
    #[error("unknown variant `{0}`")]
    UnknownVariant(String),
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a feedback collaborator (speech, haptics, sound, visuals).
#[derive(Debug, Error)]
#[error("{channel} feedback failed: {message}")]
pub struct FeedbackError {
    pub channel: &'static str,
    pub message: String,
}

impl FeedbackError {
    pub fn new(channel: &'static str, message: impl Into<String>) -> Self {
        Self {
            channel,
            message: message.into(),
        }
    }
}

/// Failure reported by the session persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("session log rejected: {0}")]
    Rejected(String),
    #[error("no session logger configured")]
    Unavailable,
    #[error("malformed log receipt: {0}")]
    MalformedReceipt(#[from] serde_json::Error),
}
