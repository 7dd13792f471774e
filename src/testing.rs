//! In-memory [`ThemeCli`] used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::copier::copy_directory;
use crate::error::SyncError;
use crate::theme::{ThemeId, ThemeRef};
use crate::themekit::ThemeCli;

/// Fake store: themes live in a list, their files in fixture directories
pub struct FakeThemeCli {
    themes: RefCell<Vec<ThemeRef>>,
    contents: RefCell<HashMap<ThemeId, PathBuf>>,
    next_id: Cell<u64>,
    failing_downloads: Cell<u32>,
    listing_override: RefCell<Option<String>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeThemeCli {
    pub fn new() -> Self {
        Self {
            themes: RefCell::new(Vec::new()),
            contents: RefCell::new(HashMap::new()),
            next_id: Cell::new(5000),
            failing_downloads: Cell::new(0),
            listing_override: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Register a theme whose files are the tree at `dir`
    pub fn with_theme(self, id: u64, name: &str, is_live: bool, dir: &Path) -> Self {
        self.themes.borrow_mut().push(ThemeRef {
            id: ThemeId::new(id),
            name: name.to_string(),
            is_live,
        });
        self.contents.borrow_mut().insert(ThemeId::new(id), dir.to_path_buf());
        self
    }

    /// Make the next `count` downloads fail
    pub fn fail_downloads(&self, count: u32) {
        self.failing_downloads.set(count);
    }

    /// Return `output` from `list_themes` instead of the registered themes
    pub fn set_listing(&self, output: &str) {
        *self.listing_override.borrow_mut() = Some(output.to_string());
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Where the content of theme `id` currently lives
    pub fn content_of(&self, id: ThemeId) -> Option<PathBuf> {
        self.contents.borrow().get(&id).cloned()
    }
}

impl ThemeCli for FakeThemeCli {
    fn list_themes(&self) -> Result<String, SyncError> {
        self.calls.borrow_mut().push("list".to_string());
        if let Some(output) = self.listing_override.borrow().as_ref() {
            return Ok(output.clone());
        }

        let mut out = String::from("[shop.myshopify.com] Available theme versions:\n");
        for theme in self.themes.borrow().iter() {
            let live = if theme.is_live { "[live]" } else { "" };
            out.push_str(&format!("  [{}]{} {}\n", theme.id, live, theme.name));
        }
        Ok(out)
    }

    fn download_theme(&self, id: ThemeId, dir: &Path) -> Result<(), SyncError> {
        self.calls.borrow_mut().push(format!("download {}", id));

        let remaining = self.failing_downloads.get();
        if remaining > 0 {
            self.failing_downloads.set(remaining - 1);
            return Err(SyncError::CommandFailed {
                command: format!("theme download --themeid={}", id),
                code: 1,
                stderr: "connection reset".to_string(),
            });
        }

        match self.contents.borrow().get(&id) {
            Some(src) => {
                copy_directory(src, dir)?;
            }
            None => {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    fn create_theme(&self, name: &str) -> Result<(), SyncError> {
        self.calls.borrow_mut().push(format!("create {}", name));
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.themes.borrow_mut().push(ThemeRef {
            id: ThemeId::new(id),
            name: name.to_string(),
            is_live: false,
        });
        Ok(())
    }

    fn deploy_theme(&self, id: ThemeId, dir: &Path) -> Result<(), SyncError> {
        self.calls.borrow_mut().push(format!("deploy {} {}", id, dir.display()));
        self.contents.borrow_mut().insert(id, dir.to_path_buf());
        Ok(())
    }
}
