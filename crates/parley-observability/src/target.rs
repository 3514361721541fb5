use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

const ROTATED_SUFFIX: &str = ".old";

/// Named append-only byte sinks
#[async_trait]
pub trait AppendTarget: Send + Sync {
    async fn append(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Current size in bytes; 0 when `name` does not exist
    async fn size(&self, name: &str) -> Result<u64>;

    /// Move `name` aside to `name.old`, replacing any previous one
    async fn rotate(&self, name: &str) -> Result<()>;
}

/// Files in one directory
#[derive(Debug, Clone)]
pub struct FileTarget {
    dir: PathBuf,
}

impl FileTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Delete transcript files not modified within `max_age`
    pub async fn remove_older_than(&self, max_age: Duration) -> Result<usize> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let is_transcript = name.starts_with("session_")
                && (name.ends_with(".log") || name.ends_with(".log.old"));
            if !is_transcript {
                continue;
            }

            let modified = entry.metadata().await?.modified()?;
            if modified < cutoff {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, dir = %self.dir.display(), "Removed expired transcripts");
        }
        Ok(removed)
    }
}

#[async_trait]
impl AppendTarget for FileTarget {
    async fn append(&self, name: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(name))
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn size(&self, name: &str) -> Result<u64> {
        match tokio::fs::metadata(self.path(name)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    async fn rotate(&self, name: &str) -> Result<()> {
        let rotated = self.path(&format!("{name}{ROTATED_SUFFIX}"));
        match tokio::fs::remove_file(&rotated).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::rename(self.path(name), rotated).await?;
        Ok(())
    }
}

/// In-process buffers
#[derive(Debug, Default)]
pub struct MemoryTarget {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, name: &str) -> Option<String> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn names(&self) -> Vec<String> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = files.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl AppendTarget for MemoryTarget {
    async fn append(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.entry(name.to_string()).or_default().extend_from_slice(bytes);
        Ok(())
    }

    async fn size(&self, name: &str) -> Result<u64> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(files.get(name).map_or(0, |b| b.len() as u64))
    }

    async fn rotate(&self, name: &str) -> Result<()> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = files.remove(name) {
            files.insert(format!("{name}{ROTATED_SUFFIX}"), current);
        }
        Ok(())
    }
}
