//! On-disk snapshots of remote themes, keyed by theme id.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::copier::ensure_dir;
use crate::error::SyncError;
use crate::retry::RetryPolicy;
use crate::theme::ThemeId;
use crate::themekit::ThemeCli;

/// Downloads each theme at most once per cache directory.
///
/// An existing snapshot directory is reused as-is, without any freshness
/// check. A download that exhausts its retries leaves the directory in
/// whatever state the last attempt produced.
#[derive(Debug, Clone)]
pub struct ThemeCache {
    root: PathBuf,
    retry: RetryPolicy,
}

impl ThemeCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot directory for `id`, whether or not it exists yet
    pub fn path_for(&self, id: ThemeId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Return the snapshot for `id`, downloading it on first use
    pub fn acquire<C: ThemeCli>(&self, cli: &C, id: ThemeId) -> Result<PathBuf, SyncError> {
        let dir = self.path_for(id);
        if dir.exists() {
            debug!(theme_id = %id, dir = %dir.display(), "reusing cached theme snapshot");
            return Ok(dir);
        }

        ensure_dir(&dir)?;
        info!(theme_id = %id, dir = %dir.display(), "downloading theme");

        match self.retry.run(|_| cli.download_theme(id, &dir)) {
            Ok((_, attempts)) => {
                info!(theme_id = %id, attempts, "theme downloaded");
                Ok(dir)
            }
            Err(exhausted) => Err(SyncError::DownloadExhausted {
                theme_id: id,
                attempts: exhausted.attempts,
                source: Box::new(exhausted.last_error),
            }),
        }
    }
}
