//! TOML configuration. Every field is optional and falls back to the
//! defaults below.

use crate::application::CellSize;
use crate::domain::{AppResult, FitOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapSettings,
    pub list: ListSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub padding: f64,
    pub offset: [f64; 2],
    pub max_zoom: f64,
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        let fit = FitOptions::default();
        let cell = CellSize::default();
        Self {
            padding: fit.padding,
            offset: fit.offset,
            max_zoom: fit.max_zoom,
            cell_width_px: cell.width,
            cell_height_px: cell.height,
        }
    }
}

impl MapSettings {
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            padding: self.padding,
            offset: self.offset,
            max_zoom: self.max_zoom,
        }
    }

    pub fn cell_size(&self) -> CellSize {
        CellSize {
            width: self.cell_width_px.max(1.0),
            height: self.cell_height_px.max(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSettings {
    /// Lines per result row.
    pub row_height: u16,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self { row_height: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Event poll timeout; also paces the scroll animation.
    pub tick_rate_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { tick_rate_ms: 50 }
    }
}

impl Config {
    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> AppResult<Config> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                Self::parse(&content)
            }
            None => Ok(Config::default()),
        }
    }

    pub fn parse(content: &str) -> AppResult<Config> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AppError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.map.fit_options(), FitOptions::default());
        assert_eq!(config.map.padding, 20.0);
        assert_eq!(config.map.offset, [0.0, -100.0]);
        assert_eq!(config.list.row_height, 3);
        assert_eq!(config.ui.tick_rate_ms, 50);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[map]\npadding = 8.0\n\n[list]\nrow_height = 4").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.map.padding, 8.0);
        assert_eq!(config.map.offset, [0.0, -100.0]);
        assert_eq!(config.list.row_height, 4);
        assert_eq!(config.ui, UiSettings::default());
    }

    #[test]
    fn test_invalid_file() {
        let result = Config::parse("[map]\npadding = \"wide\"");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
