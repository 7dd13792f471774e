//! # themegit
//!
//! Deploys a locally built storefront theme to a per-branch preview theme.
//!
//! Before each deploy, the structured files under `config/` and `locales/`
//! are compared between the live theme and the branch theme's last deploy,
//! and reconciled with a chosen [`resolver::ConflictStrategy`] so that
//! settings edited in the store admin are not silently overwritten.
//!
//! ## Usage
//!
//! ```ignore
//! use themegit::deployer::Deployer;
//! use themegit::themekit::ThemeKit;
//!
//! let kit = ThemeKit::new("theme", "shop.myshopify.com", password);
//! let outcome = Deployer::from_config(&kit, &config).deploy(&built_dir, "🚧 feature")?;
//! println!("{}", outcome.preview_url);
//! ```

/// Theme snapshot cache
pub mod cache;

/// CLI configuration and argument parsing
pub mod config;

/// Directory copying with overwrite semantics
pub mod copier;

/// Deployment orchestration
pub mod deployer;

/// Structural diff and divergence detection
pub mod divergence;

/// JSON document IO and merging
pub mod document;

/// Error types for sync operations
pub mod error;

/// Workflow event parsing and theme naming
pub mod event;

/// Commit hash resolution
pub mod git;

/// Branch theme provisioning
pub mod provisioner;

/// Theme lookups
pub mod registry;

/// Conflict strategies and resolution
pub mod resolver;

/// Retry with backoff
pub mod retry;

/// Theme, namespace, and listing types
pub mod theme;

/// External theme CLI boundary
pub mod themekit;

#[cfg(test)]
pub(crate) mod testing;
