//! # inkloom
//!
//! Procedural doodle fills and their animated, stroke-by-stroke reveal.
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Leaf-first: `geometry` -> `fill` -> `player` -> `raster` ->
//! `compositor` -> `animator`.

pub mod animator;
pub mod catalog;
pub mod compositor;
pub mod config;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod player;
pub mod present;
pub mod raster;
pub mod svg;
pub mod timing;

// Re-export common types at crate root for convenience.
pub use animator::{Animator, AnimatorOptions};
pub use catalog::{Layout, PatternCatalog, SvgLayout};
pub use compositor::{CompositorSettings, FrameCompositor, FrameStats, SectionSummary};
pub use config::{Canvas, DoodleConfig, LayoutSource, EXAMPLE_CONFIG};
pub use error::{DoodleError, Result};
pub use fill::{generate_doodle_fill, FillParams, RegionFiller};
pub use geometry::{Boundary, Segment, Vec2};
pub use player::{PlaybackState, StrokePlayer, StrokeTarget};
pub use present::{ChannelSink, Frame, NullSink, PresentationSink};
pub use raster::{Layer, Pen};
pub use svg::{extract_regions_from_svg, segments_to_svg};
pub use timing::{FixedRefreshRate, FramePacer, RefreshRateProvider, DEFAULT_REFRESH_RATE};
