//! Branch theme deployment orchestration.
//!
//! Runs one deployment as a fixed sequence of stages:
//! - sync the live theme snapshot
//! - provision (or reuse) the branch theme and sync its snapshot
//! - detect divergence in `config/` then `locales/`
//! - resolve both namespaces into the local theme directory
//! - deploy the local directory to the branch theme
//!
//! Any failure aborts the run before the final deploy.

use std::fmt;
use std::path::Path;

use tracing::info;

use crate::cache::ThemeCache;
use crate::config::Config;
use crate::divergence::{detect, Divergences};
use crate::document::MergeDepth;
use crate::error::SyncError;
use crate::provisioner::ensure_theme;
use crate::registry::ThemeRegistry;
use crate::resolver::{resolve, ConflictStrategy};
use crate::theme::{preview_url, Namespace, ThemeRef};
use crate::themekit::ThemeCli;

/// Progress of a deployment run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    LiveSynced,
    BranchProvisioned,
    DivergenceComputed(Namespace),
    Resolved(Namespace),
    Deployed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => f.write_str("idle"),
            Stage::LiveSynced => f.write_str("live theme synced"),
            Stage::BranchProvisioned => f.write_str("branch theme provisioned"),
            Stage::DivergenceComputed(ns) => write!(f, "{} divergence computed", ns),
            Stage::Resolved(ns) => write!(f, "{} resolved", ns),
            Stage::Deployed => f.write_str("deployed"),
            Stage::Done => f.write_str("done"),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Theme that received the deployment
    pub theme: ThemeRef,
    /// Storefront preview link for `theme`
    pub preview_url: String,
    /// Diverging file count per namespace
    pub conflicts: Vec<(Namespace, usize)>,
}

/// Deploys a local theme directory to a named branch theme
pub struct Deployer<'a, C: ThemeCli> {
    cli: &'a C,
    cache: ThemeCache,
    store: String,
    config_strategy: ConflictStrategy,
    locale_strategy: ConflictStrategy,
    merge_depth: MergeDepth,
}

impl<'a, C: ThemeCli> Deployer<'a, C> {
    pub fn new(cli: &'a C, cache: ThemeCache, store: impl Into<String>) -> Self {
        Self {
            cli,
            cache,
            store: store.into(),
            config_strategy: ConflictStrategy::default(),
            locale_strategy: ConflictStrategy::default(),
            merge_depth: MergeDepth::default(),
        }
    }

    pub fn from_config(cli: &'a C, config: &Config) -> Self {
        Self::new(cli, ThemeCache::new(&config.cache_dir), config.store.clone())
            .with_strategy(Namespace::Config, config.config_strategy)
            .with_strategy(Namespace::Locales, config.locale_strategy)
            .with_merge_depth(config.merge_depth)
    }

    pub fn with_strategy(mut self, namespace: Namespace, strategy: ConflictStrategy) -> Self {
        match namespace {
            Namespace::Config => self.config_strategy = strategy,
            Namespace::Locales => self.locale_strategy = strategy,
        }
        self
    }

    pub fn with_merge_depth(mut self, depth: MergeDepth) -> Self {
        self.merge_depth = depth;
        self
    }

    fn strategy_for(&self, namespace: Namespace) -> ConflictStrategy {
        match namespace {
            Namespace::Config => self.config_strategy,
            Namespace::Locales => self.locale_strategy,
        }
    }

    /// Run a full deployment of `local_dir` to the theme named `theme_name`
    pub fn deploy(&self, local_dir: &Path, theme_name: &str) -> Result<DeployOutcome, SyncError> {
        self.deploy_with_progress(local_dir, theme_name, |_| {})
    }

    /// Same as [`Deployer::deploy`], reporting each stage as it is reached
    pub fn deploy_with_progress<F>(
        &self,
        local_dir: &Path,
        theme_name: &str,
        mut on_stage: F,
    ) -> Result<DeployOutcome, SyncError>
    where
        F: FnMut(Stage),
    {
        on_stage(Stage::Idle);
        if !local_dir.is_dir() {
            return Err(SyncError::MissingLocalDirectory {
                path: local_dir.to_path_buf(),
            });
        }

        let live = ThemeRegistry::new(self.cli).require_live()?;
        let live_dir = self.cache.acquire(self.cli, live.id)?;
        info!(theme_id = %live.id, name = %live.name, "live theme synced");
        on_stage(Stage::LiveSynced);

        let branch = ensure_theme(self.cli, &self.cache, theme_name)?;
        let branch_dir = self.cache.acquire(self.cli, branch.id)?;
        info!(theme_id = %branch.id, name = %branch.name, "branch theme synced");
        on_stage(Stage::BranchProvisioned);

        let mut detected: Vec<(Namespace, Divergences)> = Vec::with_capacity(Namespace::ALL.len());
        for namespace in Namespace::ALL {
            let divergences = detect(&live_dir, &branch_dir, namespace)?;
            detected.push((namespace, divergences));
            on_stage(Stage::DivergenceComputed(namespace));
        }

        for (namespace, divergences) in &detected {
            resolve(
                &live_dir,
                &branch_dir,
                local_dir,
                *namespace,
                divergences,
                self.strategy_for(*namespace),
                self.merge_depth,
            )?;
            on_stage(Stage::Resolved(*namespace));
        }

        self.cli.deploy_theme(branch.id, local_dir)?;
        info!(theme_id = %branch.id, dir = %local_dir.display(), "deployed local theme");
        on_stage(Stage::Deployed);

        let outcome = DeployOutcome {
            preview_url: preview_url(&self.store, branch.id),
            conflicts: detected.iter().map(|(ns, d)| (*ns, d.len())).collect(),
            theme: branch,
        };
        on_stage(Stage::Done);
        Ok(outcome)
    }
}
