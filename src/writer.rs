use std::fs;
use std::io;
use std::path::Path;

use tempfile::TempDir;

use crate::error::{ResubError, Result};

/// Process-scoped scratch directory for write-back. New content is written to
/// a staging file first, then copied over the original path, so the original
/// is only touched once the full encoded content exists on disk. Staging
/// files accumulate for the lifetime of the area and are removed on close.
pub struct StagingArea {
    dir: TempDir,
    seq: u64,
}

impl StagingArea {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().map_err(ResubError::Staging)?;
        Ok(StagingArea { dir, seq: 0 })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Persists `bytes` over `target` via a staging file. Staging names carry
    /// a sequence number so equal base names from different directories never
    /// collide within one run.
    pub fn write_back(&mut self, target: &Path, bytes: &[u8]) -> Result<()> {
        self.seq += 1;
        let base = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "staged".to_string());
        let staged = self.dir.path().join(format!("{:05}-{base}", self.seq));

        fs::write(&staged, bytes).map_err(|err| ResubError::file_write(&staged, err))?;
        fs::copy(&staged, target).map_err(|err| ResubError::file_write(target, err))?;
        Ok(())
    }

    /// Removes the staging directory. Cleanup failure is for the caller to
    /// log; it is never fatal.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
