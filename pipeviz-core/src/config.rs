use crate::error::ConfigError;
use graph::{Canvas, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Render configuration, loadable from TOML. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    /// Horizontal inset of the source/sink anchors
    pub anchor_margin: f64,
    pub stroke_scale: f64,
    pub charge: f64,
    pub link_distance: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let canvas = Canvas::default();
        let options = RenderOptions::default();
        Self {
            width: canvas.width,
            height: canvas.height,
            anchor_margin: canvas.margin,
            stroke_scale: options.stroke_scale,
            charge: options.charge,
            link_distance: options.link_distance,
        }
    }
}

impl RenderConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `path` if given, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
            margin: self.anchor_margin,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            stroke_scale: self.stroke_scale,
            charge: self.charge,
            link_distance: self.link_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.anchor_margin, 20.0);
        assert_eq!(config.stroke_scale, 4.0);
        assert_eq!(config.charge, -3000.0);
        assert_eq!(config.link_distance, 150.0);
    }

    #[test]
    fn test_partial_override() {
        let config = RenderConfig::from_toml("width = 1280.0\nstroke-scale = 2.5\n").unwrap();

        assert_eq!(config.width, 1280.0);
        assert_eq!(config.stroke_scale, 2.5);
        assert_eq!(config.height, RenderConfig::default().height);
        assert_eq!(config.canvas().width, 1280.0);
        assert_eq!(config.render_options().stroke_scale, 2.5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "height = 400.0").unwrap();
        writeln!(file, "anchor-margin = 40.0").unwrap();

        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!(config.canvas().height, 400.0);
        assert_eq!(config.canvas().margin, 40.0);
    }

    #[test]
    fn test_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "width = \"wide\"").unwrap();

        let err = RenderConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = RenderConfig::load(Path::new("/nonexistent/pipeviz.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
