//! Theme lookups against the remote store.

use tracing::{debug, warn};

use crate::error::SyncError;
use crate::theme::{parse_theme_listing, ThemeRef};
use crate::themekit::ThemeCli;

/// Typed view over the theme CLI's listing
pub struct ThemeRegistry<'a, C: ThemeCli> {
    cli: &'a C,
}

impl<'a, C: ThemeCli> ThemeRegistry<'a, C> {
    pub fn new(cli: &'a C) -> Self {
        Self { cli }
    }

    /// Every theme on the store, in listing order
    pub fn list(&self) -> Result<Vec<ThemeRef>, SyncError> {
        let output = self.cli.list_themes()?;
        let themes = parse_theme_listing(&output)?;
        debug!(count = themes.len(), "listed themes");
        Ok(themes)
    }

    /// The theme currently served to visitors
    pub fn find_live(&self) -> Result<Option<ThemeRef>, SyncError> {
        let themes = self.list()?;
        let mut live = themes.into_iter().filter(|t| t.is_live);
        let first = live.next();
        if let Some(extra) = live.next() {
            warn!(id = %extra.id, name = %extra.name, "more than one theme tagged live, using the first");
        }
        Ok(first)
    }

    /// First theme whose name is exactly `name`
    pub fn find_by_name(&self, name: &str) -> Result<Option<ThemeRef>, SyncError> {
        Ok(self.list()?.into_iter().find(|t| t.name == name))
    }

    /// Like [`ThemeRegistry::find_live`], failing when the store has no live theme
    pub fn require_live(&self) -> Result<ThemeRef, SyncError> {
        self.find_live()?.ok_or(SyncError::NoLiveTheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeThemeCli;
    use crate::theme::ThemeId;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> FakeThemeCli {
        FakeThemeCli::new()
            .with_theme(1, "Debut", true, temp.path())
            .with_theme(2, "🚧 feature/a", false, temp.path())
            .with_theme(3, "🚧 feature/a", false, temp.path())
    }

    #[test]
    fn test_find_live() {
        let temp = TempDir::new().unwrap();
        let cli = store(&temp);
        let live = ThemeRegistry::new(&cli).find_live().unwrap().unwrap();
        assert_eq!(live.id, ThemeId::new(1));
        assert_eq!(cli.calls_matching("list"), 1);
    }

    #[test]
    fn test_find_live_none() {
        let temp = TempDir::new().unwrap();
        let cli = FakeThemeCli::new().with_theme(9, "Draft", false, temp.path());
        let registry = ThemeRegistry::new(&cli);
        assert!(registry.find_live().unwrap().is_none());
        assert!(matches!(registry.require_live(), Err(SyncError::NoLiveTheme)));
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let temp = TempDir::new().unwrap();
        let cli = store(&temp);
        let theme = ThemeRegistry::new(&cli).find_by_name("🚧 feature/a").unwrap().unwrap();
        assert_eq!(theme.id, ThemeId::new(2));
    }

    #[test]
    fn test_find_by_name_exact_only() {
        let temp = TempDir::new().unwrap();
        let cli = store(&temp);
        let registry = ThemeRegistry::new(&cli);
        assert!(registry.find_by_name("feature/a").unwrap().is_none());
        assert!(registry.find_by_name("Debu").unwrap().is_none());
    }

    #[test]
    fn test_malformed_listing_is_not_not_found() {
        let cli = FakeThemeCli::new();
        cli.set_listing("error: unexpected response from server");
        let result = ThemeRegistry::new(&cli).find_by_name("Debut");
        assert!(matches!(result, Err(SyncError::MalformedListing { .. })));
    }
}
