use std::path::PathBuf;
use thiserror::Error;

use crate::theme::{Namespace, ThemeId};

/// Sync and deployment error types
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Local theme directory not found: {path}")]
    MissingLocalDirectory { path: PathBuf },

    #[error("Conflicts in {namespace}/ with strategy 'raise': {}", .files.join(", "))]
    ConflictRaised {
        namespace: Namespace,
        files: Vec<String>,
    },

    #[error("Unknown conflict strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown merge depth: {0} (expected 'shallow' or 'deep')")]
    UnknownMergeDepth(String),

    #[error("Download of theme {theme_id} failed after {attempts} attempt(s)")]
    DownloadExhausted {
        theme_id: ThemeId,
        attempts: u32,
        #[source]
        source: Box<SyncError>,
    },

    #[error("`{command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Binary not found: {0}")]
    BinaryNotFound(PathBuf),

    #[error("Unrecognised theme listing output: {output}")]
    MalformedListing { output: String },

    #[error("No live theme found")]
    NoLiveTheme,

    #[error("Theme not found after creation: {name}")]
    ThemeNotFound { name: String },

    #[error("Namespace directory not found: {path}")]
    MissingNamespace { path: PathBuf },

    #[error("Invalid JSON document: {path}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid workflow event: {path}")]
    InvalidEvent {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to copy {src} to {dst}")]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory: {path}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No space left on device for {path}")]
    DiskFull { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Process exit status for a run that failed with this error
    pub fn exit_code(&self) -> u8 {
        match self {
            SyncError::ConflictRaised { .. } => 3,
            _ => 2,
        }
    }
}
