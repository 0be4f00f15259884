//! Run configuration.
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no
//! file at all) gives the stock doodle.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Layout, PatternCatalog, SvgLayout};
use crate::error::{DoodleError, Result};
use crate::fill::FillParams;
use crate::raster::Pen;

/// Everything a run needs besides the host surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoodleConfig {
    /// Ink speed in pixels per second.
    pub ink_speed: f64,

    /// Pen width in pixels.
    pub stroke_width: f32,

    /// Radius of the pen tip marker in pixels.
    pub marker_radius: f32,

    pub fill: FillParams,

    /// Overrides the display's reported refresh rate.
    pub refresh_rate: Option<u32>,

    /// Canvas for headless rendering.
    pub canvas: Canvas,

    pub layout: LayoutSource,

    /// How long `on_close` waits for the frame loop to stop.
    pub join_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// Where region boundaries come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutSource {
    #[default]
    Simple,
    Single,
    Svg { path: PathBuf },
}

impl Default for DoodleConfig {
    fn default() -> Self {
        Self {
            ink_speed: 1200.0,
            stroke_width: 2.0,
            marker_radius: 5.0,
            fill: FillParams::default(),
            refresh_rate: None,
            canvas: Canvas::default(),
            layout: LayoutSource::default(),
            join_timeout_ms: 100,
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
        }
    }
}

impl LayoutSource {
    /// Build the catalog this source describes. SVG files are read here.
    pub fn to_catalog(&self) -> Result<Arc<dyn PatternCatalog>> {
        Ok(match self {
            LayoutSource::Simple => Arc::new(Layout::Simple),
            LayoutSource::Single => Arc::new(Layout::Single),
            LayoutSource::Svg { path } => Arc::new(SvgLayout::load(path)?),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            LayoutSource::Simple => Layout::Simple.name().to_string(),
            LayoutSource::Single => Layout::Single.name().to_string(),
            LayoutSource::Svg { path } => format!("svg:{}", path.display()),
        }
    }
}

impl From<Layout> for LayoutSource {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Simple => LayoutSource::Simple,
            Layout::Single => LayoutSource::Single,
        }
    }
}

impl DoodleConfig {
    /// Load and validate a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: DoodleConfig = serde_yaml::from_str(content)
            .map_err(|e| DoodleError::Config(format!("failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| DoodleError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ink_speed.is_finite() && self.ink_speed > 0.0) {
            return Err(DoodleError::Config(format!(
                "ink_speed must be positive, got {}",
                self.ink_speed
            )));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(DoodleError::Config(format!(
                "stroke_width must be positive, got {}",
                self.stroke_width
            )));
        }
        if !(self.marker_radius.is_finite() && self.marker_radius >= 0.0) {
            return Err(DoodleError::Config(format!(
                "marker_radius must not be negative, got {}",
                self.marker_radius
            )));
        }
        if !(self.fill.cutoff.is_finite() && self.fill.cutoff > 0.0) {
            return Err(DoodleError::Config(format!(
                "fill.cutoff must be positive, got {}",
                self.fill.cutoff
            )));
        }
        if !self.fill.angle_offset.is_finite() {
            return Err(DoodleError::Config("fill.angle_offset must be finite".to_string()));
        }
        if self.refresh_rate == Some(0) {
            return Err(DoodleError::Config("refresh_rate must be at least 1".to_string()));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(DoodleError::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        Ok(())
    }

    pub fn pen(&self) -> Pen {
        Pen {
            width: self.stroke_width,
            marker_radius: self.marker_radius,
        }
    }
}

/// A commented example config, for `--example-config`.
pub const EXAMPLE_CONFIG: &str = r##"# Example inkloom config
# Every field is optional.

ink_speed: 1200        # pixels per second
stroke_width: 2.0
marker_radius: 5.0

fill:
  cutoff: 15.0         # stop once recent segments average below this length
  angle_offset: 0.04398229715025710   # probe rotation in radians (0.014 * pi)

# refresh_rate: 120    # override the display refresh rate

canvas:                # used by `render` and `export`
  width: 960
  height: 540

layout:
  kind: simple         # simple | single | svg
  # kind: svg
  # path: regions.svg

join_timeout_ms: 100
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = DoodleConfig::from_yaml("{}").unwrap();
        assert_eq!(config, DoodleConfig::default());
        assert_eq!(config.ink_speed, 1200.0);
        assert_eq!(config.fill.cutoff, 15.0);
    }

    #[test]
    fn example_config_parses() {
        let config = DoodleConfig::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.layout, LayoutSource::Simple);
        assert_eq!(config.canvas, Canvas { width: 960, height: 540 });
        assert!((config.fill.angle_offset - crate::fill::ANGLE_OFFSET).abs() < 1e-12);
    }

    #[test]
    fn partial_fill_section_keeps_other_default() {
        let config = DoodleConfig::from_yaml("fill:\n  cutoff: 40\n").unwrap();
        assert_eq!(config.fill.cutoff, 40.0);
        assert_eq!(config.fill.angle_offset, crate::fill::ANGLE_OFFSET);
    }

    #[test]
    fn svg_layout_source() {
        let config = DoodleConfig::from_yaml("layout:\n  kind: svg\n  path: shapes.svg\n").unwrap();
        assert_eq!(config.layout, LayoutSource::Svg { path: PathBuf::from("shapes.svg") });
        assert_eq!(config.layout.describe(), "svg:shapes.svg");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(DoodleConfig::from_yaml("ink_speed: 0").is_err());
        assert!(DoodleConfig::from_yaml("ink_speed: -3").is_err());
        assert!(DoodleConfig::from_yaml("refresh_rate: 0").is_err());
        assert!(DoodleConfig::from_yaml("fill:\n  cutoff: 0\n").is_err());
        assert!(matches!(
            DoodleConfig::from_yaml("canvas:\n  width: 0\n  height: 10\n"),
            Err(DoodleError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            DoodleConfig::from_yaml("ink_speed: [1, 2"),
            Err(DoodleError::Config(_))
        ));
    }

    #[test]
    fn yaml_round_trip_keeps_layout() {
        let mut config = DoodleConfig::default();
        config.layout = LayoutSource::Single;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(DoodleConfig::from_yaml(&yaml).unwrap(), config);
    }
}
