//! CI workflow event payload and the branch theme it maps to.
//!
//! Pull requests get a `🚧 <head>` preview theme. Merges into a pinned base
//! branch and direct pushes to a pinned branch get a dated `📌` theme tied to
//! the commit. Everything else is a no-op.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::git::CommitResolver;

/// Remote theme names are capped at this many characters
pub const MAX_THEME_NAME_CHARS: usize = 50;

/// The subset of a GitHub workflow event that selects a theme
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowEvent {
    pub action: Option<String>,
    pub pull_request: Option<PullRequest>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub head_commit: Option<HeadCommit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub merged: bool,
    pub merge_commit_sha: Option<String>,
    pub base: BranchRef,
    pub head: Option<BranchRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadCommit {
    pub id: String,
}

impl WorkflowEvent {
    pub fn from_path(path: &Path) -> Result<Self, SyncError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| SyncError::InvalidEvent {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Run-level inputs that select a theme alongside the event
#[derive(Debug, Clone, Default)]
pub struct TriggerContext {
    /// Branches whose merges and pushes get a pinned theme
    pub pinned_branches: Vec<String>,
    /// Head branch of the pull request, when the runner provides it
    pub head_ref: Option<String>,
}

impl TriggerContext {
    pub fn is_pinned(&self, branch: &str) -> bool {
        self.pinned_branches.iter().any(|b| b == branch)
    }
}

fn truncate_name(name: String) -> String {
    if name.chars().count() <= MAX_THEME_NAME_CHARS {
        name
    } else {
        name.chars().take(MAX_THEME_NAME_CHARS).collect()
    }
}

/// Theme name for a pull request preview
pub fn preview_theme_name(head_ref: &str) -> String {
    truncate_name(format!("🚧 {}", head_ref))
}

/// Theme name for a commit on a pinned branch
pub fn pinned_theme_name(branch: &str, short_sha: &str, date: NaiveDate) -> String {
    truncate_name(format!("📌 {}:{} ({})", branch, short_sha, date.format("%Y-%m-%d")))
}

/// Decide which theme, if any, this event deploys to
pub fn plan_theme_name<G: CommitResolver>(
    event: &WorkflowEvent,
    ctx: &TriggerContext,
    git: &G,
    today: NaiveDate,
) -> Result<Option<String>, SyncError> {
    if let Some(pr) = &event.pull_request {
        if event.action.as_deref() == Some("closed") {
            if !pr.merged {
                info!("pull request closed without merge, nothing to deploy");
                return Ok(None);
            }
            if !ctx.is_pinned(&pr.base.name) {
                info!(base = %pr.base.name, "pull request merged into unpinned branch, nothing to deploy");
                return Ok(None);
            }
            let Some(sha) = pr.merge_commit_sha.as_deref() else {
                warn!(base = %pr.base.name, "merged pull request has no merge commit sha");
                return Ok(None);
            };
            let short = git.short_hash(sha)?;
            return Ok(Some(pinned_theme_name(&pr.base.name, &short, today)));
        }

        // opened, reopened, synchronize
        let head = ctx
            .head_ref
            .as_deref()
            .filter(|h| !h.is_empty())
            .or(pr.head.as_ref().map(|h| h.name.as_str()))
            .unwrap_or_default();
        return Ok(Some(preview_theme_name(head)));
    }

    let Some(branch) = event
        .git_ref
        .as_deref()
        .and_then(|r| r.strip_prefix("refs/heads/"))
    else {
        info!(git_ref = ?event.git_ref, "event is not a branch push, nothing to deploy");
        return Ok(None);
    };

    if !ctx.is_pinned(branch) {
        info!(branch, "push to unpinned branch, nothing to deploy");
        return Ok(None);
    }

    let Some(commit) = &event.head_commit else {
        warn!(branch, "push event has no head commit");
        return Ok(None);
    };
    let short = git.short_hash(&commit.id)?;
    Ok(Some(pinned_theme_name(branch, &short, today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct FakeGit {
        asked: RefCell<Vec<String>>,
    }

    impl FakeGit {
        fn new() -> Self {
            Self {
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommitResolver for FakeGit {
        fn short_hash(&self, sha: &str) -> Result<String, SyncError> {
            self.asked.borrow_mut().push(sha.to_string());
            Ok(sha.chars().take(7).collect())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn ctx(pinned: &[&str], head_ref: Option<&str>) -> TriggerContext {
        TriggerContext {
            pinned_branches: pinned.iter().map(|s| s.to_string()).collect(),
            head_ref: head_ref.map(str::to_string),
        }
    }

    fn parse(json: &str) -> WorkflowEvent {
        serde_json::from_str(json).unwrap()
    }

    // ==================== naming tests ====================

    #[test]
    fn test_preview_theme_name() {
        assert_eq!(preview_theme_name("feature/header"), "🚧 feature/header");
    }

    #[test]
    fn test_pinned_theme_name() {
        assert_eq!(
            pinned_theme_name("main", "abc1234", today()),
            "📌 main:abc1234 (2024-05-01)"
        );
    }

    #[test]
    fn test_names_truncated_to_fifty_chars() {
        let long = "x".repeat(80);
        let name = preview_theme_name(&long);
        assert_eq!(name.chars().count(), MAX_THEME_NAME_CHARS);
        assert!(name.starts_with("🚧 xxx"));
    }

    // ==================== pull request events ====================

    #[test]
    fn test_open_pull_request_uses_head_ref() {
        let event = parse(r#"{"action":"opened","pull_request":{"base":{"ref":"main"},"head":{"ref":"from-payload"}}}"#);
        let git = FakeGit::new();

        let name = plan_theme_name(&event, &ctx(&[], Some("feature/x")), &git, today()).unwrap();

        assert_eq!(name.as_deref(), Some("🚧 feature/x"));
        assert!(git.asked.borrow().is_empty());
    }

    #[test]
    fn test_open_pull_request_falls_back_to_payload_head() {
        let event = parse(r#"{"action":"synchronize","pull_request":{"base":{"ref":"main"},"head":{"ref":"from-payload"}}}"#);

        let name = plan_theme_name(&event, &ctx(&[], None), &FakeGit::new(), today()).unwrap();

        assert_eq!(name.as_deref(), Some("🚧 from-payload"));
    }

    #[test]
    fn test_closed_unmerged_pull_request_is_noop() {
        let event = parse(r#"{"action":"closed","pull_request":{"merged":false,"base":{"ref":"main"}}}"#);

        let name = plan_theme_name(&event, &ctx(&["main"], None), &FakeGit::new(), today()).unwrap();

        assert!(name.is_none());
    }

    #[test]
    fn test_merged_into_pinned_base() {
        let event = parse(
            r#"{"action":"closed","pull_request":{"merged":true,"merge_commit_sha":"deadbeefcafe","base":{"ref":"main"}}}"#,
        );
        let git = FakeGit::new();

        let name = plan_theme_name(&event, &ctx(&["main", "staging"], None), &git, today()).unwrap();

        assert_eq!(name.as_deref(), Some("📌 main:deadbee (2024-05-01)"));
        assert_eq!(git.asked.borrow().as_slice(), ["deadbeefcafe".to_string()]);
    }

    #[test]
    fn test_merged_into_unpinned_base_is_noop() {
        let event = parse(
            r#"{"action":"closed","pull_request":{"merged":true,"merge_commit_sha":"deadbeef","base":{"ref":"develop"}}}"#,
        );

        let name = plan_theme_name(&event, &ctx(&["main"], None), &FakeGit::new(), today()).unwrap();

        assert!(name.is_none());
    }

    // ==================== push events ====================

    #[test]
    fn test_push_to_pinned_branch() {
        let event = parse(r#"{"ref":"refs/heads/main","head_commit":{"id":"0123456789abcdef"}}"#);

        let name = plan_theme_name(&event, &ctx(&["main"], None), &FakeGit::new(), today()).unwrap();

        assert_eq!(name.as_deref(), Some("📌 main:0123456 (2024-05-01)"));
    }

    #[test]
    fn test_push_to_unpinned_branch_is_noop() {
        let event = parse(r#"{"ref":"refs/heads/feature","head_commit":{"id":"0123456789"}}"#);
        let git = FakeGit::new();

        let name = plan_theme_name(&event, &ctx(&["main"], None), &git, today()).unwrap();

        assert!(name.is_none());
        assert!(git.asked.borrow().is_empty());
    }

    #[test]
    fn test_tag_push_is_noop() {
        let event = parse(r#"{"ref":"refs/tags/v1.0","head_commit":{"id":"0123456789"}}"#);
        let name = plan_theme_name(&event, &ctx(&["v1.0"], None), &FakeGit::new(), today()).unwrap();
        assert!(name.is_none());
    }

    // ==================== loading ====================

    #[test]
    fn test_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("event.json");
        std::fs::write(&path, r#"{"ref":"refs/heads/main","head_commit":{"id":"abc"},"extra":1}"#).unwrap();

        let event = WorkflowEvent::from_path(&path).unwrap();

        assert_eq!(event.git_ref.as_deref(), Some("refs/heads/main"));
        assert_eq!(event.head_commit.unwrap().id, "abc");
    }

    #[test]
    fn test_from_path_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("event.json");
        std::fs::write(&path, "null-ish").unwrap();

        assert!(matches!(
            WorkflowEvent::from_path(&path),
            Err(SyncError::InvalidEvent { .. })
        ));
    }
}
