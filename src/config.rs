//! User preferences
//!
//! Stored as RON in the platform config directory:
//! `<config_dir>/scale-objects/preferences.ron`. A missing file means
//! defaults; a malformed or out-of-range file is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::document::Grid;

/// Validation limits for loaded values
pub mod limits {
    /// Largest accepted handle radius (world units or pixels)
    pub const MAX_HANDLE_RADIUS: f32 = 1024.0;
    /// Largest accepted grid size
    pub const MAX_GRID_SIZE: f32 = crate::document::grid::MAX_GRID_SIZE;
}

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid preference: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Pick tolerance for corner and edge handles
    pub handle_radius: f32,
    pub grid_size: f32,
    pub snap_to_grid: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            handle_radius: 0.25,
            grid_size: 1.0,
            snap_to_grid: true,
        }
    }
}

impl Preferences {
    /// Default preferences file location, None if the platform has no config dir
    pub fn default_path() -> Option<PathBuf> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            dirs::config_dir().map(|dir| dir.join("scale-objects").join("preferences.ron"))
        }
        #[cfg(target_arch = "wasm32")]
        {
            None
        }
    }

    pub fn validate(&self) -> Result<(), PrefsError> {
        if !self.handle_radius.is_finite()
            || self.handle_radius <= 0.0
            || self.handle_radius > limits::MAX_HANDLE_RADIUS
        {
            return Err(PrefsError::Validation(format!(
                "handle_radius must be in (0, {}], got {}",
                limits::MAX_HANDLE_RADIUS, self.handle_radius
            )));
        }
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 || self.grid_size > limits::MAX_GRID_SIZE {
            return Err(PrefsError::Validation(format!(
                "grid_size must be in (0, {}], got {}",
                limits::MAX_GRID_SIZE, self.grid_size
            )));
        }
        Ok(())
    }

    /// The editing grid these preferences describe
    pub fn grid(&self) -> Grid {
        let mut grid = Grid::new(self.grid_size);
        grid.set_snap(self.snap_to_grid);
        grid
    }

    pub fn from_ron(s: &str) -> Result<Self, PrefsError> {
        let prefs: Preferences = ron::from_str(s)?;
        prefs.validate()?;
        Ok(prefs)
    }

    pub fn to_ron(&self) -> Result<String, PrefsError> {
        let config = ron::ser::PrettyConfig::new().indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PrefsError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_ron(&contents)
    }

    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, PrefsError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no preferences at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write to `path`, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PrefsError> {
        self.validate()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.ron");

        let prefs = Preferences { handle_radius: 6.0, grid_size: 8.0, snap_to_grid: false };
        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path).unwrap(), prefs);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::load_or_default(dir.path().join("absent.ron")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let prefs = Preferences::from_ron("(grid_size: 16.0)").unwrap();
        assert_eq!(prefs.grid_size, 16.0);
        assert_eq!(prefs.handle_radius, Preferences::default().handle_radius);
        assert!(prefs.snap_to_grid);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Preferences::from_ron("(handle_radius: -1.0)"),
            Err(PrefsError::Validation(_))
        ));
        assert!(matches!(
            Preferences::from_ron("(grid_size: 0.0)"),
            Err(PrefsError::Validation(_))
        ));
        assert!(matches!(Preferences::from_ron("(grid_size: "), Err(PrefsError::Parse(_))));
    }

    #[test]
    fn test_grid_from_preferences() {
        let prefs = Preferences { grid_size: 4.0, snap_to_grid: false, ..Default::default() };
        let grid = prefs.grid();
        assert_eq!(grid.size(), 4.0);
        assert!(!grid.snap_enabled());
    }
}
