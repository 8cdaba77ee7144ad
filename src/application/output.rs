use crate::error::{EngineError, Result};
use std::path::Path;

/// Writes the merged artifact and removes it again if it is too large.
#[derive(Debug, Clone, Copy)]
pub struct OutputSizeGuard {
    limit: u64,
}

impl OutputSizeGuard {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    /// Writes `bytes` to `path` and returns the size on disk. A file larger
    /// than the limit is deleted before the error is returned; exactly the
    /// limit is accepted.
    pub async fn write(&self, path: &Path, bytes: &[u8]) -> Result<u64> {
        tokio::fs::write(path, bytes).await?;
        let size = tokio::fs::metadata(path).await?.len();
        if size > self.limit {
            tokio::fs::remove_file(path).await?;
            tracing::warn!(
                path = %path.display(),
                size,
                limit = self.limit,
                "merged document removed, size limit exceeded"
            );
            return Err(EngineError::SizeLimitExceeded {
                size,
                limit: self.limit,
            });
        }
        Ok(size)
    }
}
