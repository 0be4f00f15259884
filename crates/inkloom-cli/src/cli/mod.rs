//! CLI command implementations.
//!
//! This module contains the implementations for the various CLI subcommands:
//! - `play` - Animate the doodle in the terminal
//! - `render` - Simulate the animation headless and save a PNG
//! - `export` - Write the generated segments as SVG or JSON
//! - `stats` - Per-section segment counts
//! - `layouts` - List the built-in layouts

pub mod common;
pub mod export;
pub mod layouts;
pub mod play;
pub mod render;
pub mod stats;

pub use export::cmd_export;
pub use layouts::cmd_layouts;
pub use play::cmd_play;
pub use render::cmd_render;
pub use stats::cmd_stats;
