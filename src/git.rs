use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::SyncError;

/// Resolves full commit SHAs to their abbreviated form
pub trait CommitResolver {
    fn short_hash(&self, sha: &str) -> Result<String, SyncError>;
}

/// [`CommitResolver`] backed by `git rev-parse --short`
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("git"),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitResolver for GitCli {
    fn short_hash(&self, sha: &str) -> Result<String, SyncError> {
        debug!(sha, "resolving short commit hash");
        let output = Command::new(&self.binary)
            .args(["rev-parse", "--short", sha])
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    SyncError::BinaryNotFound(self.binary.clone())
                } else {
                    SyncError::Io(e)
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(code, %stderr, "git rev-parse failed");
            return Err(SyncError::CommandFailed {
                command: format!("git rev-parse --short {}", sha),
                code,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
