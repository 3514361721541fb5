pub mod error;
pub mod rotation;
pub mod sink;
pub mod target;
pub mod types;

pub use error::{Result, TranscriptError};
pub use rotation::{RotatingTarget, DEFAULT_MAX_BYTES};
pub use sink::{transcript_name, JsonLinesSink, NoopSink, TranscriptSink};
pub use target::{AppendTarget, FileTarget, MemoryTarget};
pub use types::TranscriptRecord;
