//! Frame composition.
//!
//! ## Rust Lesson #5: Split Borrows
//!
//! `step` hands `&mut self.active` to every player while iterating
//! `&mut self.sections`. That is two mutable borrows of `self` at once,
//! and the compiler accepts it because they are borrows of *different
//! fields*. Going through a `&mut self` method for either one would not
//! compile.
//!
//! ```rust,ignore
//! for section in &mut self.sections {
//!     section.player.advance(dt, &mut self.active); // disjoint fields: OK
//! }
//! ```
//!
//! Each frame the active layer is wiped, the cache is copied onto it, and
//! every player draws only the stroke it is currently working on. Strokes
//! that finished this frame are then drawn once into the cache, so a
//! section costs the same to draw on frame 10 as on frame 10,000.

use std::sync::Arc;

use log::{debug, warn};

use crate::catalog::PatternCatalog;
use crate::config::DoodleConfig;
use crate::error::{DoodleError, Result};
use crate::fill::{FillParams, RegionFiller};
use crate::geometry::{Boundary, Segment};
use crate::player::{PlaybackState, StrokePlayer};
use crate::present::Frame;
use crate::raster::{Layer, Pen};

/// What the compositor needs from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorSettings {
    /// Ink speed shared by every section, in pixels per second.
    pub speed: f64,
    pub fill: FillParams,
    pub pen: Pen,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        CompositorSettings::from(&DoodleConfig::default())
    }
}

impl From<&DoodleConfig> for CompositorSettings {
    fn from(config: &DoodleConfig) -> Self {
        Self {
            speed: config.ink_speed,
            fill: config.fill,
            pen: config.pen(),
        }
    }
}

/// One filled region and its player.
#[derive(Debug)]
struct Section {
    boundary_len: usize,
    player: StrokePlayer,
}

/// Per-section progress, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSummary {
    pub boundary_len: usize,
    pub segment_count: usize,
    pub current_index: usize,
    pub state: PlaybackState,
}

/// What happened in one `step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Zero-based frame number since the last (re)initialization.
    pub frame_index: u64,
    /// Sections still revealing strokes.
    pub active_sections: usize,
    /// Sections with every stroke revealed.
    pub finished_sections: usize,
    /// Segments merged into the cache during this frame.
    pub cached_segments: usize,
}

/// Owns both raster layers and every section's playback state.
pub struct FrameCompositor {
    active: Layer,
    cache: Layer,
    sections: Vec<Section>,
    catalog: Arc<dyn PatternCatalog>,
    settings: CompositorSettings,
    frame_index: u64,
    cached_total: usize,
}

impl FrameCompositor {
    /// Build layers and generate every section for a `width` x `height`
    /// canvas.
    pub fn new(
        width: u32,
        height: u32,
        catalog: Arc<dyn PatternCatalog>,
        settings: CompositorSettings,
    ) -> Result<Self> {
        let active = Layer::new(width, height, settings.pen)?;
        let cache = Layer::new(width, height, settings.pen)?;
        let sections = build_sections(catalog.as_ref(), width, height, &settings)?;

        Ok(Self {
            active,
            cache,
            sections,
            catalog,
            settings,
            frame_index: 0,
            cached_total: 0,
        })
    }

    /// Throw everything away and start over at a new size.
    ///
    /// The new state is built before the old one is dropped, so on error
    /// the compositor is left exactly as it was.
    pub fn reinitialize(&mut self, width: u32, height: u32) -> Result<()> {
        let active = Layer::new(width, height, self.settings.pen)?;
        let cache = Layer::new(width, height, self.settings.pen)?;
        let sections = build_sections(self.catalog.as_ref(), width, height, &self.settings)?;

        self.active = active;
        self.cache = cache;
        self.sections = sections;
        self.frame_index = 0;
        self.cached_total = 0;

        debug!(
            "reinitialized at {}x{} with {} sections",
            width,
            height,
            self.sections.len()
        );
        Ok(())
    }

    /// Produce one frame, advancing every player by `dt` seconds.
    pub fn step(&mut self, dt: f64) -> FrameStats {
        self.active.clear();
        self.active.composite(&self.cache);

        for section in &mut self.sections {
            section.player.advance(dt, &mut self.active);
        }

        let mut cached_segments = 0;
        for section in &mut self.sections {
            cached_segments += section.player.drain_finished(&mut self.cache);
        }
        self.cached_total += cached_segments;

        let finished_sections = self.sections.iter().filter(|s| s.player.is_done()).count();
        let stats = FrameStats {
            frame_index: self.frame_index,
            active_sections: self.sections.len() - finished_sections,
            finished_sections,
            cached_segments,
        };
        self.frame_index += 1;
        stats
    }

    /// Step with a fixed `dt` until `seconds` of simulated time have passed
    /// or everything is drawn. Returns the number of frames produced.
    pub fn run_for(&mut self, seconds: f64, dt: f64) -> u64 {
        if !dt.is_finite() || dt <= 0.0 || seconds.is_nan() || seconds <= 0.0 {
            return 0;
        }

        let frames = (seconds / dt).ceil() as u64;
        let mut produced = 0;
        while produced < frames && !self.is_complete() {
            self.step(dt);
            produced += 1;
        }
        produced
    }

    /// Every stroke revealed and merged into the cache.
    pub fn is_complete(&self) -> bool {
        self.sections
            .iter()
            .all(|s| s.player.is_done() && s.player.pending_finished() == 0)
    }

    /// Copy of the active layer.
    pub fn snapshot(&self) -> Frame {
        Frame::from_layer(&self.active)
    }

    pub fn sections(&self) -> Vec<SectionSummary> {
        self.sections
            .iter()
            .map(|s| SectionSummary {
                boundary_len: s.boundary_len,
                segment_count: s.player.segment_count(),
                current_index: s.player.current_index(),
                state: s.player.state(),
            })
            .collect()
    }

    /// Each section's full segment list, boundary ring first.
    pub fn section_segments(&self) -> Vec<Vec<Segment>> {
        self.sections
            .iter()
            .map(|s| s.player.segments().to_vec())
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.active.width()
    }

    pub fn height(&self) -> u32 {
        self.active.height()
    }

    pub fn active(&self) -> &Layer {
        &self.active
    }

    pub fn cache(&self) -> &Layer {
        &self.cache
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Segments merged into the cache since the last (re)initialization.
    pub fn cached_segments(&self) -> usize {
        self.cached_total
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("sections", &self.sections.len())
            .field("frame_index", &self.frame_index)
            .finish()
    }
}

fn build_sections(
    catalog: &dyn PatternCatalog,
    width: u32,
    height: u32,
    settings: &CompositorSettings,
) -> Result<Vec<Section>> {
    let mut sections = Vec::new();

    for (index, ring) in catalog
        .regions(width as f64, height as f64)
        .into_iter()
        .enumerate()
    {
        let boundary = match Boundary::new(ring) {
            Ok(boundary) => boundary,
            Err(e) => {
                warn!("skipping region {}: {}", index, e);
                continue;
            }
        };

        let filler = RegionFiller::with_params(&boundary, settings.fill);
        let boundary_len = filler.boundary_len();
        let segments = filler.fill();
        debug!(
            "region {}: {} boundary + {} fill segments",
            index,
            boundary_len,
            segments.len() - boundary_len
        );

        sections.push(Section {
            boundary_len,
            player: StrokePlayer::new(settings.speed, segments),
        });
    }

    if sections.is_empty() {
        return Err(DoodleError::NoRegions);
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Layout;
    use crate::geometry::Vec2;

    struct FixedRegions(Vec<Vec<Vec2>>);

    impl PatternCatalog for FixedRegions {
        fn regions(&self, _width: f64, _height: f64) -> Vec<Vec<Vec2>> {
            self.0.clone()
        }
    }

    fn fast() -> CompositorSettings {
        CompositorSettings {
            speed: 1.0e6,
            ..CompositorSettings::default()
        }
    }

    #[test]
    fn single_layout_has_one_section() {
        let compositor =
            FrameCompositor::new(200, 100, Arc::new(Layout::Single), CompositorSettings::default())
                .unwrap();

        let sections = compositor.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].boundary_len, 4);
        assert!(sections[0].segment_count > 4);
        assert_eq!(sections[0].state, PlaybackState::Idle);
        assert_eq!(compositor.width(), 200);
        assert_eq!(compositor.height(), 100);
    }

    #[test]
    fn invalid_regions_are_skipped() {
        let catalog = FixedRegions(vec![
            vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            vec![Vec2::ZERO, Vec2::new(50.0, 0.0), Vec2::new(50.0, 50.0)],
            vec![Vec2::ZERO, Vec2::ZERO, Vec2::new(5.0, 5.0)],
        ]);

        let compositor =
            FrameCompositor::new(64, 64, Arc::new(catalog), CompositorSettings::default()).unwrap();
        assert_eq!(compositor.sections().len(), 1);
        assert_eq!(compositor.sections()[0].boundary_len, 3);
    }

    #[test]
    fn no_valid_regions_is_an_error() {
        let catalog = FixedRegions(vec![vec![Vec2::ZERO]]);
        let result = FrameCompositor::new(64, 64, Arc::new(catalog), CompositorSettings::default());
        assert!(matches!(result, Err(DoodleError::NoRegions)));
    }

    #[test]
    fn zero_canvas_is_an_error() {
        let result =
            FrameCompositor::new(0, 64, Arc::new(Layout::Single), CompositorSettings::default());
        assert!(matches!(result, Err(DoodleError::InvalidCanvas { .. })));
    }

    #[test]
    fn step_draws_in_progress_strokes_on_active_only() {
        let settings = CompositorSettings {
            speed: 100.0,
            ..CompositorSettings::default()
        };
        let mut compositor =
            FrameCompositor::new(120, 120, Arc::new(Layout::Single), settings).unwrap();

        let first = compositor.step(0.1);
        assert_eq!(first.frame_index, 0);
        assert_eq!(first.cached_segments, 0);

        let second = compositor.step(0.1);
        assert_eq!(second.frame_index, 1);
        assert_eq!(second.active_sections, 1);

        // Ten units along the top edge: on screen but not yet cached.
        assert!(compositor.active().inked_pixels() > 0);
        assert_eq!(compositor.cache().inked_pixels(), 0);
    }

    #[test]
    fn finished_strokes_move_to_the_cache() {
        let mut compositor =
            FrameCompositor::new(120, 80, Arc::new(Layout::Simple), fast()).unwrap();

        let stats = compositor.step(1.0 / 60.0);
        // Every section finishes its first edge in one frame at this speed.
        assert_eq!(stats.cached_segments, 4);
        assert_eq!(compositor.cached_segments(), 4);
        assert!(compositor.cache().inked_pixels() > 0);

        for summary in compositor.sections() {
            assert_eq!(summary.current_index, 1);
        }
    }

    #[test]
    fn run_for_completes_and_active_matches_cache() {
        let mut compositor =
            FrameCompositor::new(100, 100, Arc::new(Layout::Single), fast()).unwrap();
        let drawable: usize = compositor
            .section_segments()
            .iter()
            .map(|s| s.iter().filter(|seg| seg.length() > 0.0).count())
            .sum();

        let frames = compositor.run_for(600.0, 1.0 / 60.0);
        assert!(compositor.is_complete(), "not complete after {} frames", frames);
        assert_eq!(compositor.cached_segments(), drawable);

        let stats = compositor.step(1.0 / 60.0);
        assert_eq!(stats.active_sections, 0);
        assert_eq!(stats.finished_sections, 1);
        assert_eq!(compositor.active().data(), compositor.cache().data());
    }

    #[test]
    fn zero_length_chords_complete_without_caching() {
        // The simple layout at this size produces degenerate chords.
        let mut compositor =
            FrameCompositor::new(320, 180, Arc::new(Layout::Simple), fast()).unwrap();
        let segments = compositor.section_segments();
        let degenerate: usize = segments
            .iter()
            .map(|s| s.iter().filter(|seg| seg.length() <= 0.0).count())
            .sum();
        let total: usize = segments.iter().map(Vec::len).sum();
        assert!(degenerate > 0, "expected at least one zero-length chord");

        compositor.run_for(f64::INFINITY, 1.0 / 60.0);

        assert!(compositor.is_complete());
        assert!(compositor
            .sections()
            .iter()
            .all(|s| s.state == PlaybackState::Done));
        assert_eq!(compositor.cached_segments(), total - degenerate);
    }

    #[test]
    fn run_for_ignores_bad_timestep() {
        let mut compositor =
            FrameCompositor::new(50, 50, Arc::new(Layout::Single), fast()).unwrap();
        assert_eq!(compositor.run_for(1.0, 0.0), 0);
        assert_eq!(compositor.run_for(-1.0, 0.1), 0);
        assert_eq!(compositor.frame_index(), 0);
    }

    #[test]
    fn reinitialize_resets_everything() {
        let mut compositor =
            FrameCompositor::new(120, 80, Arc::new(Layout::Simple), fast()).unwrap();
        compositor.run_for(0.5, 1.0 / 60.0);
        assert!(compositor.cache().inked_pixels() > 0);

        compositor.reinitialize(60, 40).unwrap();
        assert_eq!((compositor.width(), compositor.height()), (60, 40));
        assert_eq!(compositor.frame_index(), 0);
        assert_eq!(compositor.cached_segments(), 0);
        assert_eq!(compositor.cache().inked_pixels(), 0);
        for summary in compositor.sections() {
            assert_eq!(summary.state, PlaybackState::Idle);
        }
    }

    #[test]
    fn failed_reinitialize_keeps_old_state() {
        let mut compositor =
            FrameCompositor::new(120, 80, Arc::new(Layout::Single), fast()).unwrap();
        compositor.step(0.1);

        assert!(compositor.reinitialize(0, 0).is_err());
        assert_eq!(compositor.width(), 120);
        assert_eq!(compositor.frame_index(), 1);
    }

    #[test]
    fn snapshot_copies_active_layer() {
        let mut compositor =
            FrameCompositor::new(40, 30, Arc::new(Layout::Single), fast()).unwrap();
        compositor.step(0.1);

        let frame = compositor.snapshot();
        assert_eq!((frame.width, frame.height, frame.stride), (40, 30, 160));
        assert_eq!(frame.pixels, compositor.active().data());
    }

    #[test]
    fn section_segments_start_with_the_boundary() {
        let compositor =
            FrameCompositor::new(100, 50, Arc::new(Layout::Single), fast()).unwrap();
        let segments = compositor.section_segments();
        assert_eq!(segments[0][0], Segment::new(Vec2::ZERO, Vec2::new(100.0, 0.0)));
        assert_eq!(segments[0][3].end, Vec2::ZERO);
    }
}
