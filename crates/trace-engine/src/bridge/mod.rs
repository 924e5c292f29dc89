// bridge/mod.rs
//
// Host-facing plumbing: the flat per-frame record and the buffered feedback
// command stream. No browser types here; the web crate owns those.

pub mod commands;
pub mod protocol;

pub use commands::{BufferedFeedback, FeedbackCommand};
pub use protocol::{FrameState, PROTOCOL_VERSION};
