use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::SyncError;

/// ENOSPC on Unix
const ENOSPC: i32 = 28;

fn create_dir_error(path: &Path, e: io::Error) -> SyncError {
    if e.raw_os_error() == Some(ENOSPC) {
        return SyncError::DiskFull {
            path: path.to_path_buf(),
        };
    }
    SyncError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    }
}

/// Create `path` and any missing parents
pub fn ensure_dir(path: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(path).map_err(|e| create_dir_error(path, e))
}

/// Copy a single file from src to dst, replacing dst if it exists
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, SyncError> {
    // Create parent directory if needed
    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            ensure_dir(parent)?;
        }
    }

    fs::copy(src, dst).map_err(|e| {
        if e.raw_os_error() == Some(ENOSPC) {
            return SyncError::DiskFull {
                path: dst.to_path_buf(),
            };
        }
        SyncError::CopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source: e,
        }
    })
}

/// Copy directory recursively, overwriting files that already exist in dst.
///
/// Files present only in dst are left in place. Returns (files_copied, bytes_copied).
pub fn copy_directory(src: &Path, dst: &Path) -> Result<(u64, u64), SyncError> {
    let mut files_copied = 0u64;
    let mut bytes_copied = 0u64;

    if !src.is_dir() {
        return Err(SyncError::MissingNamespace {
            path: src.to_path_buf(),
        });
    }
    ensure_dir(dst)?;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            match e.into_io_error() {
                Some(source) => SyncError::CopyFailed {
                    src: path,
                    dst: dst.to_path_buf(),
                    source,
                },
                None => SyncError::Io(io::Error::other("filesystem loop while copying")),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let src_path = entry.path();
        let relative = src_path.strip_prefix(src).unwrap_or(src_path);
        let dst_path = dst.join(relative);

        let bytes = copy_file(src_path, &dst_path)?;
        files_copied += 1;
        bytes_copied += bytes;
    }

    Ok((files_copied, bytes_copied))
}
