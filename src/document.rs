//! Structured documents: the JSON files under `config/` and `locales/`.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use walkdir::WalkDir;

use crate::copier::ensure_dir;
use crate::error::SyncError;

/// How far a merge composes objects before the overlay replaces a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeDepth {
    /// Only top-level keys are combined; nested values come wholesale from the overlay
    #[default]
    Shallow,
    /// Objects merge recursively and arrays concatenate
    Deep,
}

impl MergeDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeDepth::Shallow => "shallow",
            MergeDepth::Deep => "deep",
        }
    }
}

impl fmt::Display for MergeDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeDepth {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "shallow" => Ok(MergeDepth::Shallow),
            "deep" => Ok(MergeDepth::Deep),
            other => Err(SyncError::UnknownMergeDepth(other.to_string())),
        }
    }
}

/// Read and parse a JSON document
pub fn read_document(path: &Path) -> Result<Value, SyncError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| SyncError::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize with 2-space indentation and a trailing newline, replacing any existing file
pub fn write_document(path: &Path, value: &Value) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut content = serde_json::to_string_pretty(value).map_err(|source| SyncError::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })?;
    content.push('\n');

    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// File names directly inside `dir`, sorted for deterministic processing
pub fn list_documents(dir: &Path) -> Result<Vec<String>, SyncError> {
    if !dir.is_dir() {
        return Err(SyncError::MissingNamespace {
            path: dir.to_path_buf(),
        });
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .map(SyncError::Io)
                .unwrap_or_else(|| SyncError::MissingNamespace {
                    path: dir.to_path_buf(),
                })
        })?;
        if entry.file_type().is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    Ok(names)
}

/// Merge `overlay` onto `base`; the overlay wins wherever both define a key.
///
/// Non-object documents cannot be composed, so the overlay replaces the base,
/// except that a deep merge of two arrays concatenates them.
pub fn merge_documents(base: &Value, overlay: &Value, depth: MergeDepth) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                let combined = match (depth, merged.get(key)) {
                    (MergeDepth::Deep, Some(existing)) => deep_merge_value(existing, value),
                    _ => value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Object(merged)
        }
        (Value::Array(_), Value::Array(_)) if depth == MergeDepth::Deep => deep_merge_value(base, overlay),
        _ => overlay.clone(),
    }
}

fn deep_merge_value(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(_), Value::Object(_)) => merge_documents(base, overlay, MergeDepth::Deep),
        (Value::Array(left), Value::Array(right)) => {
            Value::Array(left.iter().chain(right.iter()).cloned().collect())
        }
        _ => overlay.clone(),
    }
}
