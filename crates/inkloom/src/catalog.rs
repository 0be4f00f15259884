//! Region layouts: which polygons get filled for a given canvas size.
//!
//! A layout is pure data. The built-in ones are scaled from fractions of
//! the canvas; `SvgLayout` takes its polygons from an SVG document.

use crate::error::Result;
use crate::geometry::Vec2;
use crate::svg::extract_regions_from_svg;

/// Maps a canvas size to the boundary rings to fill.
pub trait PatternCatalog: Send + Sync {
    /// Boundary rings in draw order. Each should have at least 3 vertices;
    /// ones that don't are skipped by the compositor.
    fn regions(&self, width: f64, height: f64) -> Vec<Vec<Vec2>>;
}

/// Built-in layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Four interlocking quadrilaterals.
    Simple,
    /// The whole canvas as one rectangle.
    Single,
}

impl Layout {
    pub fn all() -> &'static [Layout] {
        &[Layout::Simple, Layout::Single]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Layout::Simple => "simple",
            Layout::Single => "single",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Layout::Simple => "Four interlocking quadrilaterals",
            Layout::Single => "One rectangle covering the canvas",
        }
    }

    pub fn from_name(name: &str) -> Option<Layout> {
        match name.to_lowercase().as_str() {
            "simple" | "quads" => Some(Layout::Simple),
            "single" | "full" | "rect" => Some(Layout::Single),
            _ => None,
        }
    }
}

impl PatternCatalog for Layout {
    fn regions(&self, w: f64, h: f64) -> Vec<Vec<Vec2>> {
        match self {
            Layout::Simple => {
                // Shared corners, so the regions tile the canvas.
                let top_split = Vec2::new(w * 0.23, 0.0);
                let hub = Vec2::new(w * 0.76, h * 0.4);
                let left_split = Vec2::new(0.0, h * 0.66);
                let bottom_split = Vec2::new(w * 0.58, h);
                let right_split = Vec2::new(w, h * 0.21);

                vec![
                    vec![Vec2::ZERO, top_split, hub, left_split],
                    vec![hub, bottom_split, Vec2::new(0.0, h), left_split],
                    vec![hub, top_split, Vec2::new(w, 0.0), right_split],
                    vec![bottom_split, hub, right_split, Vec2::new(w, h)],
                ]
            }
            Layout::Single => vec![vec![
                Vec2::ZERO,
                Vec2::new(w, 0.0),
                Vec2::new(w, h),
                Vec2::new(0.0, h),
            ]],
        }
    }
}

/// Regions taken from an SVG document, stretched onto the canvas.
#[derive(Debug, Clone)]
pub struct SvgLayout {
    rings: Vec<Vec<Vec2>>,
    bounds: (f64, f64, f64, f64),
}

impl SvgLayout {
    pub fn from_svg(svg_content: &str) -> Result<Self> {
        let rings = extract_regions_from_svg(svg_content)?;

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in rings.iter().flatten() {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Ok(Self {
            rings,
            bounds: (min_x, min_y, max_x, max_y),
        })
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_svg(&content)
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

impl PatternCatalog for SvgLayout {
    fn regions(&self, width: f64, height: f64) -> Vec<Vec<Vec2>> {
        let (min_x, min_y, max_x, max_y) = self.bounds;
        // A flat drawing still maps somewhere sensible.
        let span_x = (max_x - min_x).max(f64::EPSILON);
        let span_y = (max_y - min_y).max(f64::EPSILON);

        self.rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|p| {
                        Vec2::new(
                            (p.x - min_x) / span_x * width,
                            (p.y - min_y) / span_y * height,
                        )
                    })
                    .collect()
            })
            .collect()
    }
}
