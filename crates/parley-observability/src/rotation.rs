use async_trait::async_trait;

use crate::error::Result;
use crate::target::AppendTarget;

/// Size at which a transcript is moved aside (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Rotates a file before appending once it has reached `max_bytes`
///
/// Only one previous generation is kept.
#[derive(Debug)]
pub struct RotatingTarget<T> {
    inner: T,
    max_bytes: u64,
}

impl<T: AppendTarget> RotatingTarget<T> {
    pub fn new(inner: T, max_bytes: u64) -> Self {
        Self { inner, max_bytes }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: AppendTarget> AppendTarget for RotatingTarget<T> {
    async fn append(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let size = self.inner.size(name).await?;
        if size >= self.max_bytes {
            tracing::info!(name = %name, size, "Rotating transcript");
            self.inner.rotate(name).await?;
        }
        self.inner.append(name, bytes).await
    }

    async fn size(&self, name: &str) -> Result<u64> {
        self.inner.size(name).await
    }

    async fn rotate(&self, name: &str) -> Result<()> {
        self.inner.rotate(name).await
    }
}
