//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::drag::DEFAULT_DRAG_THRESHOLD;
use crate::model::WeekStart;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub week_start: WeekStart,
    /// Pointer travel before a press on a task becomes a drag.
    pub drag_threshold_px: f32,
    /// Height of one week row in the calendar.
    pub row_height: f32,
    /// Narrowest day column before the grid scrolls horizontally.
    pub min_column_width: f32,
    /// Lanes drawn per week before the rest collapse into "+N more".
    pub max_visible_lanes: usize,
    pub recent_file: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Monday,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD,
            row_height: 112.0,
            min_column_width: 90.0,
            max_visible_lanes: 4,
            recent_file: None,
        }
    }
}

impl AppSettings {
    /// `settings.json` under the platform config dir, or the working
    /// directory when none can be resolved.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "RustCalendarApp")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }

    /// Read settings, falling back to defaults for a missing or unreadable
    /// file. Out-of-range values are pulled back to sane ones.
    pub fn load(path: &Path) -> Self {
        let settings = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        settings.sanitized()
    }

    pub fn save(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "could not encode settings");
                return;
            }
        };
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = std::fs::write(path, json) {
            tracing::warn!(path = %path.display(), error = %e, "could not save settings");
        }
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            self.drag_threshold_px = defaults.drag_threshold_px;
        }
        if !self.row_height.is_finite() || self.row_height < 40.0 {
            self.row_height = defaults.row_height;
        }
        if !self.min_column_width.is_finite() || self.min_column_width < 20.0 {
            self.min_column_width = defaults.min_column_width;
        }
        self.max_visible_lanes = self.max_visible_lanes.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppSettings::load(&dir.path().join("none.json")), AppSettings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "weekStart": "Sunday", "rowHeight": 5.0 }"#).unwrap();
        let settings = AppSettings::load(&path);
        assert_eq!(settings.week_start, WeekStart::Sunday);
        assert_eq!(settings.row_height, AppSettings::default().row_height);
        assert_eq!(settings.drag_threshold_px, 3.0);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            max_visible_lanes: 6,
            ..Default::default()
        };
        settings.save(&path);
        assert_eq!(AppSettings::load(&path), settings);
    }
}
