//! Structural diffing of live and branch documents.
//!
//! [`compute_delta`] walks two JSON trees by key and index and records every
//! leaf that differs. [`detect`] applies it to each file of a namespace, with
//! the live side deciding which files are compared.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{list_documents, read_document};
use crate::error::SyncError;
use crate::theme::Namespace;

/// One step into a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A single structural difference, from the live side to the branch side
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Present only on the branch side
    Added { path: Vec<PathSegment>, value: Value },
    /// Present only on the live side
    Removed { path: Vec<PathSegment>, value: Value },
    /// Present on both sides with different values
    Modified {
        path: Vec<PathSegment>,
        from: Value,
        to: Value,
    },
}

impl Change {
    pub fn path(&self) -> &[PathSegment] {
        match self {
            Change::Added { path, .. } | Change::Removed { path, .. } | Change::Modified { path, .. } => path,
        }
    }
}

fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }

    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(i) => {
                out.push_str(&format!("[{}]", i));
            }
        }
    }
    out
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Added { path, value } => write!(f, "+ {}: {}", format_path(path), value),
            Change::Removed { path, value } => write!(f, "- {}: {}", format_path(path), value),
            Change::Modified { path, from, to } => {
                write!(f, "~ {}: {} => {}", format_path(path), from, to)
            }
        }
    }
}

/// Every structural difference between two documents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delta {
    pub changes: Vec<Change>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in &self.changes {
            writeln!(f, "  {}", change)?;
        }
        Ok(())
    }
}

/// Compute the delta that turns `live` into `branch`
pub fn compute_delta(live: &Value, branch: &Value) -> Delta {
    let mut changes = Vec::new();
    let mut path = Vec::new();
    diff_values(live, branch, &mut path, &mut changes);
    Delta { changes }
}

fn diff_values(left: &Value, right: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Change>) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            for (key, lv) in l {
                path.push(PathSegment::Key(key.clone()));
                match r.get(key) {
                    Some(rv) => diff_values(lv, rv, path, out),
                    None => out.push(Change::Removed {
                        path: path.clone(),
                        value: lv.clone(),
                    }),
                }
                path.pop();
            }
            for (key, rv) in r {
                if !l.contains_key(key) {
                    path.push(PathSegment::Key(key.clone()));
                    out.push(Change::Added {
                        path: path.clone(),
                        value: rv.clone(),
                    });
                    path.pop();
                }
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            for i in 0..l.len().max(r.len()) {
                path.push(PathSegment::Index(i));
                match (l.get(i), r.get(i)) {
                    (Some(lv), Some(rv)) => diff_values(lv, rv, path, out),
                    (Some(lv), None) => out.push(Change::Removed {
                        path: path.clone(),
                        value: lv.clone(),
                    }),
                    (None, Some(rv)) => out.push(Change::Added {
                        path: path.clone(),
                        value: rv.clone(),
                    }),
                    (None, None) => {}
                }
                path.pop();
            }
        }
        _ => {
            if left != right {
                out.push(Change::Modified {
                    path: path.clone(),
                    from: left.clone(),
                    to: right.clone(),
                });
            }
        }
    }
}

/// A file whose live and branch versions differ
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub delta: Delta,
    pub live: Value,
    pub branch: Value,
}

/// Divergences of one namespace, keyed by file name
pub type Divergences = BTreeMap<String, Divergence>;

/// Compare every file in `live_dir/namespace` with its branch counterpart.
///
/// Files that exist only on the branch side are not considered. Files that
/// exist only on the live side are skipped, since every resolution path
/// carries the live copy forward for them. Each divergence is logged before
/// returning. Neither directory is modified.
pub fn detect(live_dir: &Path, branch_dir: &Path, namespace: Namespace) -> Result<Divergences, SyncError> {
    let live_ns = live_dir.join(namespace.as_str());
    let branch_ns = branch_dir.join(namespace.as_str());
    let mut divergences = Divergences::new();

    for file_name in list_documents(&live_ns)? {
        let branch_path = branch_ns.join(&file_name);
        if !branch_path.is_file() {
            debug!(%namespace, file = %file_name, "no branch copy, keeping live");
            continue;
        }

        let live = read_document(&live_ns.join(&file_name))?;
        let branch = read_document(&branch_path)?;
        let delta = compute_delta(&live, &branch);

        if !delta.is_empty() {
            divergences.insert(file_name, Divergence { delta, live, branch });
        }
    }

    for (file_name, divergence) in &divergences {
        warn!(
            "Conflicts found in {}/{} ({} change(s)):\n{}",
            namespace,
            file_name,
            divergence.delta.len(),
            divergence.delta
        );
    }
    debug!(%namespace, conflicts = divergences.len(), "divergence detection complete");

    Ok(divergences)
}
