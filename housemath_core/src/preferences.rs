//! # User Preferences
//!
//! The only persisted preference is the theme. Stores are pluggable so the
//! shell can run against a real file, an in-memory value (tests,
//! `--no-persist`), or anything else that implements [`PreferenceStore`].
//!
//! ```text
//! <config_dir>/housemath/preferences.json
//! {"theme":"dark"}
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::file_io;
use crate::theme::Theme;

/// File name inside the application's config directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Everything the application remembers between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, deserialize_with = "lenient_theme")]
    pub theme: Theme,
}

/// Unknown theme strings load as the default instead of failing.
fn lenient_theme<'de, D>(deserializer: D) -> Result<Theme, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| Theme::from_stored(&s)).unwrap_or_default())
}

/// Somewhere preferences can be loaded from and saved to.
pub trait PreferenceStore {
    fn load(&self) -> CalcResult<Preferences>;
    fn save(&mut self, prefs: &Preferences) -> CalcResult<()>;
}

/// JSON file store. A missing file loads as defaults.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FilePreferenceStore { path: path.into() }
    }

    /// `<config_dir>/housemath/preferences.json`, when a config dir exists.
    pub fn default_path(config_dir: Option<&Path>) -> Option<PathBuf> {
        config_dir.map(|dir| dir.join("housemath").join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> CalcResult<Preferences> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no preferences file; using defaults");
            return Ok(Preferences::default());
        }
        file_io::load_json(&self.path)
    }

    fn save(&mut self, prefs: &Preferences) -> CalcResult<()> {
        file_io::save_json(prefs, &self.path)
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    prefs: Preferences,
    saves: usize,
    fail_saves: bool,
}

impl MemoryPreferenceStore {
    pub fn new(prefs: Preferences) -> Self {
        MemoryPreferenceStore {
            prefs,
            ..Self::default()
        }
    }

    /// A store whose saves always fail, for exercising the error path.
    pub fn failing() -> Self {
        MemoryPreferenceStore {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> CalcResult<Preferences> {
        Ok(self.prefs)
    }

    fn save(&mut self, prefs: &Preferences) -> CalcResult<()> {
        if self.fail_saves {
            return Err(CalcError::file_error("save", "<memory>", "storage unavailable"));
        }
        self.prefs = *prefs;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
        assert_eq!(store.load().unwrap().theme, Theme::Light);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("housemath").join(PREFERENCES_FILE);
        let mut store = FilePreferenceStore::new(&path);
        store.save(&Preferences { theme: Theme::Dark }).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\": \"dark\""));
        assert_eq!(FilePreferenceStore::new(&path).load().unwrap().theme, Theme::Dark);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_light() {
        let prefs: Preferences = serde_json::from_str(r#"{"theme":"sepia"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Light);
        let prefs: Preferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn test_default_path() {
        let path = FilePreferenceStore::default_path(Some(Path::new("/home/u/.config"))).unwrap();
        assert_eq!(path, Path::new("/home/u/.config/housemath/preferences.json"));
        assert!(FilePreferenceStore::default_path(None).is_none());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryPreferenceStore::default();
        store.save(&Preferences { theme: Theme::Dark }).unwrap();
        assert_eq!(store.load().unwrap().theme, Theme::Dark);
        assert_eq!(store.save_count(), 1);

        let mut failing = MemoryPreferenceStore::failing();
        assert!(failing.save(&Preferences::default()).is_err());
    }
}
