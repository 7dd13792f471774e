//! Creates branch preview themes on demand.

use tracing::info;

use crate::cache::ThemeCache;
use crate::error::SyncError;
use crate::registry::ThemeRegistry;
use crate::theme::ThemeRef;
use crate::themekit::ThemeCli;

/// Return the theme named `name`, creating it as a copy of live if missing.
///
/// A newly created theme is filled with the live theme's files, so a first
/// run on a branch sees no divergence.
pub fn ensure_theme<C: ThemeCli>(cli: &C, cache: &ThemeCache, name: &str) -> Result<ThemeRef, SyncError> {
    let registry = ThemeRegistry::new(cli);
    if let Some(existing) = registry.find_by_name(name)? {
        info!(theme_id = %existing.id, name, "using existing branch theme");
        return Ok(existing);
    }

    info!(name, "creating branch theme");
    cli.create_theme(name)?;

    // Creation does not report the new id
    let created = registry
        .find_by_name(name)?
        .ok_or_else(|| SyncError::ThemeNotFound { name: name.to_string() })?;

    let live = registry.require_live()?;
    let live_dir = cache.acquire(cli, live.id)?;
    cli.deploy_theme(created.id, &live_dir)?;
    info!(theme_id = %created.id, live_id = %live.id, "seeded branch theme from live");

    Ok(created)
}
