//! Theme identifiers, theme references, and the reconciled namespaces.
//!
//! Also owns the parser for the theme CLI's `get --list` output, so callers
//! only ever see typed [`ThemeRef`] values.

use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::SyncError;

/// Remote theme identifier as reported by the theme CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeId(u64);

impl ThemeId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A theme on the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRef {
    pub id: ThemeId,
    pub name: String,
    /// Whether this theme is currently served to visitors
    pub is_live: bool,
}

/// Structured-file directories reconciled between live and branch themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Config,
    Locales,
}

impl Namespace {
    /// Both namespaces, in the order they are reconciled
    pub const ALL: [Namespace; 2] = [Namespace::Config, Namespace::Locales];

    /// Directory name inside a theme snapshot
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Config => "config",
            Namespace::Locales => "locales",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Literal pattern, cannot fail to compile
#[allow(clippy::expect_used)]
fn listing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[(\d+)\](\[live\])?\s(.+)").expect("valid theme listing pattern"))
}

/// Parse a single listing line like `[123456][live] Debut`
pub fn parse_listing_line(line: &str) -> Option<ThemeRef> {
    let caps = listing_pattern().captures(line)?;
    let id = caps.get(1)?.as_str().parse::<u64>().ok()?;
    let name = caps.get(3)?.as_str().trim_end().to_string();

    Some(ThemeRef {
        id: ThemeId::new(id),
        name,
        is_live: caps.get(2).is_some(),
    })
}

/// Parse the full `get --list` output into theme references.
///
/// Lines that do not look like themes (headers, blank lines) are skipped.
/// Output that has content but yields no themes at all is reported as
/// [`SyncError::MalformedListing`] rather than an empty store, since every
/// store has at least its live theme.
pub fn parse_theme_listing(output: &str) -> Result<Vec<ThemeRef>, SyncError> {
    let themes: Vec<ThemeRef> = output.lines().filter_map(parse_listing_line).collect();

    if themes.is_empty() && !output.trim().is_empty() {
        return Err(SyncError::MalformedListing {
            output: output.trim().to_string(),
        });
    }

    Ok(themes)
}

/// Storefront URL that previews `theme_id`
pub fn preview_url(store: &str, theme_id: ThemeId) -> String {
    format!("https://{}/?preview_theme_id={}", store, theme_id)
}
