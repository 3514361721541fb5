use async_trait::async_trait;

use crate::error::Result;
use crate::target::AppendTarget;
use crate::types::TranscriptRecord;

/// Destination for transcript records
///
/// Callers treat failures as non-fatal: a lost transcript line must never
/// fail the chat turn that produced it.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Append one record to the transcript of `record.session_id()`
    ///
    /// # Arguments
    /// * `record` - Message or truncation entry to persist
    async fn write(&self, record: TranscriptRecord) -> Result<()>;
}

/// Discards everything; used when transcripts are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl TranscriptSink for NoopSink {
    async fn write(&self, _record: TranscriptRecord) -> Result<()> {
        Ok(())
    }
}

/// One JSON object per line, one file per session
pub struct JsonLinesSink<T> {
    target: T,
}

impl<T: AppendTarget> JsonLinesSink<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}

#[async_trait]
impl<T: AppendTarget> TranscriptSink for JsonLinesSink<T> {
    async fn write(&self, record: TranscriptRecord) -> Result<()> {
        let session_id = record.session_id();
        if session_id.trim().is_empty() {
            tracing::warn!("Dropping transcript record without a session id");
            return Ok(());
        }

        let name = transcript_name(session_id);
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.target.append(&name, &line).await
    }
}

/// `session_<id>.log`, with anything outside `[A-Za-z0-9_-]` replaced
pub fn transcript_name(session_id: &str) -> String {
    let safe: String = session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("session_{safe}.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_name_is_path_safe() {
        assert_eq!(transcript_name("sess_abc123"), "session_sess_abc123.log");
        assert_eq!(transcript_name("../../etc/passwd"), "session_______etc_passwd.log");
    }
}
