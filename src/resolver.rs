//! Conflict resolution strategies.
//!
//! [`resolve`] turns the divergences of one namespace into files under the
//! deployment directory. Whole-directory strategies copy the chosen side's
//! tree; merge strategies rewrite only the diverging files.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::copier::{copy_directory, copy_file, ensure_dir};
use crate::divergence::Divergences;
use crate::document::{list_documents, merge_documents, write_document, MergeDepth};
use crate::error::SyncError;
use crate::theme::Namespace;

/// How to reconcile a namespace when live and branch disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictStrategy {
    /// Abort the run
    #[default]
    Raise,
    /// Copy the live namespace over the deployment directory
    TakeLive,
    /// Copy the branch namespace over the deployment directory
    TakeBranch,
    /// Live is the base, branch values overlay it
    MergeIntoLive,
    /// Branch is the base, live values overlay it
    MergeIntoBranch,
}

impl ConflictStrategy {
    pub const ALL: [ConflictStrategy; 5] = [
        ConflictStrategy::Raise,
        ConflictStrategy::TakeLive,
        ConflictStrategy::TakeBranch,
        ConflictStrategy::MergeIntoLive,
        ConflictStrategy::MergeIntoBranch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::Raise => "raise",
            ConflictStrategy::TakeLive => "take-live",
            ConflictStrategy::TakeBranch => "take-branch",
            ConflictStrategy::MergeIntoLive => "merge-into-live",
            ConflictStrategy::MergeIntoBranch => "merge-into-branch",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = SyncError;

    /// Accepts both `take-live` and the older `take-live-version` spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_suffix("-version").unwrap_or(trimmed);
        match name {
            "raise" => Ok(ConflictStrategy::Raise),
            "take-live" => Ok(ConflictStrategy::TakeLive),
            "take-branch" => Ok(ConflictStrategy::TakeBranch),
            "merge-into-live" => Ok(ConflictStrategy::MergeIntoLive),
            "merge-into-branch" => Ok(ConflictStrategy::MergeIntoBranch),
            _ => Err(SyncError::UnknownStrategy(trimmed.to_string())),
        }
    }
}

/// Write the reconciled `namespace` into `target_dir`.
///
/// With no divergences the live tree is copied as-is, whatever the strategy.
/// `Raise` fails before touching `target_dir`.
pub fn resolve(
    live_dir: &Path,
    branch_dir: &Path,
    target_dir: &Path,
    namespace: Namespace,
    divergences: &Divergences,
    strategy: ConflictStrategy,
    depth: MergeDepth,
) -> Result<(), SyncError> {
    let live_ns = live_dir.join(namespace.as_str());
    let branch_ns = branch_dir.join(namespace.as_str());
    let target_ns = target_dir.join(namespace.as_str());

    if divergences.is_empty() {
        let (files, _) = copy_directory(&live_ns, &target_ns)?;
        info!(%namespace, files, "no conflicts, copied live namespace");
        return Ok(());
    }

    info!(%namespace, %strategy, conflicts = divergences.len(), "resolving conflicts");

    match strategy {
        ConflictStrategy::Raise => Err(SyncError::ConflictRaised {
            namespace,
            files: divergences.keys().cloned().collect(),
        }),
        ConflictStrategy::TakeLive => {
            copy_directory(&live_ns, &target_ns)?;
            Ok(())
        }
        ConflictStrategy::TakeBranch => {
            copy_directory(&branch_ns, &target_ns)?;
            Ok(())
        }
        ConflictStrategy::MergeIntoLive | ConflictStrategy::MergeIntoBranch => {
            ensure_dir(&target_ns)?;
            for file_name in list_documents(&live_ns)? {
                let target_path = target_ns.join(&file_name);
                match divergences.get(&file_name) {
                    Some(divergence) => {
                        let merged = if strategy == ConflictStrategy::MergeIntoLive {
                            merge_documents(&divergence.live, &divergence.branch, depth)
                        } else {
                            merge_documents(&divergence.branch, &divergence.live, depth)
                        };
                        write_document(&target_path, &merged)?;
                        info!(%namespace, file = %file_name, %depth, "wrote merged document");
                    }
                    None => {
                        copy_file(&live_ns.join(&file_name), &target_path)?;
                    }
                }
            }
            Ok(())
        }
    }
}
