//! Raster layers backed by `tiny_skia::Pixmap`.
//!
//! Both the active frame and the stroke cache are `Layer`s. They share one
//! pen: black, round-capped, fixed width, with a filled circle as the tip
//! marker.

use std::path::Path;

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::error::{DoodleError, Result};
use crate::geometry::Vec2;
use crate::player::StrokeTarget;

/// Pen settings shared by every layer in a compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub width: f32,
    pub marker_radius: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            width: 2.0,
            marker_radius: 5.0,
        }
    }
}

/// One RGBA8 raster surface.
#[derive(Clone)]
pub struct Layer {
    pixmap: Pixmap,
    pen: Pen,
}

impl Layer {
    /// Allocate a white layer. Zero-sized canvases are rejected.
    pub fn new(width: u32, height: u32, pen: Pen) -> Result<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(DoodleError::InvalidCanvas { width, height })?;
        pixmap.fill(Color::WHITE);
        Ok(Self { pixmap, pen })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.pixmap.width() as usize * 4
    }

    /// Raw premultiplied RGBA8 pixels, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::WHITE);
    }

    /// Copy `other` over this layer, pixel for pixel.
    pub fn composite(&mut self, other: &Layer) {
        self.pixmap.draw_pixmap(
            0,
            0,
            other.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// RGBA of a single pixel, if it's on the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap
            .pixel(x, y)
            .map(|p| [p.red(), p.green(), p.blue(), p.alpha()])
    }

    /// Count pixels that aren't pure white.
    pub fn inked_pixels(&self) -> usize {
        self.pixmap
            .data()
            .chunks_exact(4)
            .filter(|px| px[0] < 255 || px[1] < 255 || px[2] < 255)
            .count()
    }

    /// Convert to an `image` buffer. Layers are opaque, so premultiplied and
    /// straight alpha agree.
    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width(), self.height(), self.pixmap.data().to_vec())
            .ok_or_else(|| DoodleError::Image("pixel buffer size mismatch".to_string()))
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_image()?
            .save(path.as_ref())
            .map_err(|e| DoodleError::Image(e.to_string()))
    }

    fn ink() -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        paint
    }
}

impl StrokeTarget for Layer {
    fn stroke_segment(&mut self, from: Vec2, to: Vec2) {
        // A round cap would turn a zero-length line into a dot.
        if from == to {
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);

        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = Stroke {
            width: self.pen.width,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &Self::ink(), &stroke, Transform::identity(), None);
    }

    fn fill_marker(&mut self, center: Vec2) {
        let Some(path) =
            PathBuilder::from_circle(center.x as f32, center.y as f32, self.pen.marker_radius)
        else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &Self::ink(),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("pen", &self.pen)
            .finish()
    }
}
