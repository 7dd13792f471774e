//! CLI configuration and runtime settings for branch theme deployment.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::document::MergeDepth;
use crate::event::TriggerContext;
use crate::resolver::ConflictStrategy;
use crate::theme::Namespace;

/// Deploy a built theme to a per-branch preview theme
#[derive(Parser, Debug)]
#[command(name = "themegit")]
#[command(version)]
#[command(about = "Deploy a built theme to a per-branch preview theme, reconciling config and locales with live")]
pub struct Cli {
    /// Directory containing the built theme
    pub built_theme_dir: PathBuf,

    /// Store domain (e.g. shop.myshopify.com)
    #[arg(long, env = "THEMEGIT_STORE")]
    pub store: String,

    /// Theme API password
    #[arg(long, env = "THEMEGIT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Strategy for config/ conflicts
    #[arg(long, default_value = "raise")]
    pub config_strategy: String,

    /// Strategy for locales/ conflicts
    #[arg(long, default_value = "raise")]
    pub locale_strategy: String,

    /// Merge depth for merge-into-* strategies (shallow or deep)
    #[arg(long, default_value = "shallow")]
    pub merge_depth: String,

    /// Branches that get a pinned theme on push or merge (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub pinned_branches: Vec<String>,

    /// Path to the workflow event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    /// Pull request head branch
    #[arg(long, env = "GITHUB_HEAD_REF")]
    pub head_ref: Option<String>,

    /// Directory for cached theme snapshots
    #[arg(long, default_value = "themegit_theme_cache")]
    pub cache_dir: PathBuf,

    /// Theme CLI binary
    #[arg(long, default_value = "theme")]
    pub theme_bin: PathBuf,

    /// File that receives step outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// A credential that never shows up in debug output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Runtime configuration parsed from CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// Local directory pushed to the branch theme
    pub built_theme_dir: PathBuf,
    /// Store domain
    pub store: String,
    /// Theme API password
    pub password: Secret,
    /// Strategy for the config namespace
    pub config_strategy: ConflictStrategy,
    /// Strategy for the locales namespace
    pub locale_strategy: ConflictStrategy,
    /// Merge depth for merge strategies
    pub merge_depth: MergeDepth,
    /// Event-derived theme selection inputs
    pub trigger: TriggerContext,
    /// Workflow event payload path
    pub event_path: PathBuf,
    /// Snapshot cache root
    pub cache_dir: PathBuf,
    /// Theme CLI binary
    pub theme_bin: PathBuf,
    /// Step output file, when running under a runner that provides one
    pub github_output: Option<PathBuf>,
    /// Enable verbose output
    pub verbose: bool,
}

impl Config {
    /// Create Config from CLI arguments
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let config_strategy = cli.config_strategy.parse::<ConflictStrategy>()?;
        let locale_strategy = cli.locale_strategy.parse::<ConflictStrategy>()?;
        let merge_depth = cli.merge_depth.parse::<MergeDepth>()?;

        let pinned_branches = cli
            .pinned_branches
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        if cli.store.trim().is_empty() {
            anyhow::bail!("store domain must not be empty");
        }

        Ok(Config {
            built_theme_dir: cli.built_theme_dir,
            store: cli.store.trim().to_string(),
            password: Secret::new(cli.password),
            config_strategy,
            locale_strategy,
            merge_depth,
            trigger: TriggerContext {
                pinned_branches,
                head_ref: cli.head_ref.filter(|h| !h.is_empty()),
            },
            event_path: cli.event_path,
            cache_dir: cli.cache_dir,
            theme_bin: cli.theme_bin,
            github_output: cli.github_output,
            verbose: cli.verbose,
        })
    }

    /// Strategy chosen for `namespace`
    pub fn strategy_for(&self, namespace: Namespace) -> ConflictStrategy {
        match namespace {
            Namespace::Config => self.config_strategy,
            Namespace::Locales => self.locale_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;

    fn make_cli(config_strategy: &str, locale_strategy: &str, pinned: Vec<&str>) -> Cli {
        Cli {
            built_theme_dir: PathBuf::from("dist"),
            store: "shop.myshopify.com".to_string(),
            password: "hunter2".to_string(),
            config_strategy: config_strategy.to_string(),
            locale_strategy: locale_strategy.to_string(),
            merge_depth: "shallow".to_string(),
            pinned_branches: pinned.into_iter().map(String::from).collect(),
            event_path: PathBuf::from("/tmp/event.json"),
            head_ref: None,
            cache_dir: PathBuf::from("themegit_theme_cache"),
            theme_bin: PathBuf::from("theme"),
            github_output: None,
            verbose: false,
        }
    }

    // ==================== Cli parsing tests ====================

    #[test]
    fn test_cli_parse_args() {
        let cli = Cli::try_parse_from([
            "themegit",
            "dist",
            "--store",
            "shop.myshopify.com",
            "--password",
            "pw",
            "--config-strategy",
            "merge-into-live",
            "--pinned-branches",
            "main, staging",
            "--event-path",
            "/tmp/event.json",
        ])
        .unwrap();

        assert_eq!(cli.built_theme_dir, PathBuf::from("dist"));
        assert_eq!(cli.config_strategy, "merge-into-live");
        assert_eq!(cli.locale_strategy, "raise");
        assert_eq!(cli.pinned_branches, vec!["main".to_string(), " staging".to_string()]);
        assert_eq!(cli.cache_dir, PathBuf::from("themegit_theme_cache"));
    }

    // ==================== Config::from_cli tests ====================

    #[test]
    fn test_config_from_cli_basic() {
        let config = Config::from_cli(make_cli("take-live", "take-branch", vec!["main"])).unwrap();

        assert_eq!(config.config_strategy, ConflictStrategy::TakeLive);
        assert_eq!(config.locale_strategy, ConflictStrategy::TakeBranch);
        assert_eq!(config.merge_depth, MergeDepth::Shallow);
        assert_eq!(config.trigger.pinned_branches, vec!["main".to_string()]);
        assert_eq!(config.password.expose(), "hunter2");
    }

    #[test]
    fn test_config_from_cli_legacy_strategy_names() {
        let config = Config::from_cli(make_cli(
            "merge-into-live-version",
            "merge-into-branch-version",
            vec![],
        ))
        .unwrap();

        assert_eq!(config.strategy_for(Namespace::Config), ConflictStrategy::MergeIntoLive);
        assert_eq!(config.strategy_for(Namespace::Locales), ConflictStrategy::MergeIntoBranch);
    }

    #[test]
    fn test_config_from_cli_unknown_strategy() {
        let err = Config::from_cli(make_cli("overwrite", "raise", vec![])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_config_from_cli_unknown_merge_depth() {
        let mut cli = make_cli("raise", "raise", vec![]);
        cli.merge_depth = "recursive".to_string();
        let err = Config::from_cli(cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::UnknownMergeDepth(_))
        ));
    }

    #[test]
    fn test_config_from_cli_pinned_trimmed_and_filtered() {
        let config = Config::from_cli(make_cli("raise", "raise", vec![" main ", "", "release"])).unwrap();
        assert_eq!(
            config.trigger.pinned_branches,
            vec!["main".to_string(), "release".to_string()]
        );
    }

    #[test]
    fn test_config_from_cli_empty_head_ref_dropped() {
        let mut cli = make_cli("raise", "raise", vec![]);
        cli.head_ref = Some(String::new());
        let config = Config::from_cli(cli).unwrap();
        assert!(config.trigger.head_ref.is_none());
    }

    #[test]
    fn test_config_from_cli_empty_store() {
        let mut cli = make_cli("raise", "raise", vec![]);
        cli.store = "  ".to_string();
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn test_config_debug_hides_password() {
        let config = Config::from_cli(make_cli("raise", "raise", vec![])).unwrap();
        let debug = format!("{:?}", config);

        assert!(debug.contains("Config"));
        assert!(debug.contains("shop.myshopify.com"));
        assert!(!debug.contains("hunter2"));
    }
}
