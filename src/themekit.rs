//! Boundary to the external theme CLI.
//!
//! Every remote operation goes through [`ThemeCli`], so the registry, cache,
//! provisioner and deployer can be exercised without a store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::SyncError;
use crate::theme::ThemeId;

/// Operations the sync core needs from the remote theme host
pub trait ThemeCli {
    /// Raw `get --list` output, one theme per line
    fn list_themes(&self) -> Result<String, SyncError>;

    /// Download the theme's files into `dir`
    fn download_theme(&self, id: ThemeId, dir: &Path) -> Result<(), SyncError>;

    /// Create an empty theme named `name`
    fn create_theme(&self, name: &str) -> Result<(), SyncError>;

    /// Upload the contents of `dir` into theme `id`
    fn deploy_theme(&self, id: ThemeId, dir: &Path) -> Result<(), SyncError>;
}

/// [`ThemeCli`] backed by the `theme` binary
#[derive(Clone)]
pub struct ThemeKit {
    binary: PathBuf,
    store: String,
    password: String,
}

impl ThemeKit {
    pub fn new(binary: impl Into<PathBuf>, store: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            store: store.into(),
            password: password.into(),
        }
    }

    /// Run the binary with `args` plus credentials, returning stdout
    fn run(&self, args: &[String]) -> Result<String, SyncError> {
        let command_line = format!("{} {}", self.binary.display(), args.join(" "));
        debug!(cmd = %command_line, store = %self.store, "running theme command");

        let output = Command::new(&self.binary)
            .args(args)
            .arg(format!("--password={}", self.password))
            .arg(format!("--store={}", self.store))
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
            warn!(code, %stderr, cmd = %command_line, "theme command failed");
            return Err(SyncError::CommandFailed {
                command: command_line,
                code,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl std::fmt::Debug for ThemeKit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeKit")
            .field("binary", &self.binary)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ThemeCli for ThemeKit {
    fn list_themes(&self) -> Result<String, SyncError> {
        self.run(&["get".into(), "--list".into()])
    }

    fn download_theme(&self, id: ThemeId, dir: &Path) -> Result<(), SyncError> {
        self.run(&[
            "download".into(),
            format!("--themeid={}", id),
            format!("--dir={}", dir.display()),
        ])
        .map(|_| ())
    }

    fn create_theme(&self, name: &str) -> Result<(), SyncError> {
        self.run(&["new".into(), format!("--name={}", name)]).map(|_| ())
    }

    fn deploy_theme(&self, id: ThemeId, dir: &Path) -> Result<(), SyncError> {
        self.run(&[
            "deploy".into(),
            format!("--themeid={}", id),
            format!("--dir={}", dir.display()),
        ])
        .map(|_| ())
    }
}
