//! Error type for inkloom.
//!
//! ## Rust Lesson #20: Error Handling
//!
//! Rust uses `Result<T, E>` instead of exceptions. `thiserror` writes the
//! `Display` and `std::error::Error` impls for us from the `#[error]`
//! attributes, so each variant reads like its own message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoodleError {
    #[error("boundary needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("boundary edge {index} has zero length")]
    DegenerateEdge { index: usize },

    #[error("boundary vertex {index} is not finite")]
    NonFiniteVertex { index: usize },

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("SVG parse error: {0}")]
    Svg(String),

    #[error("layout produced no usable regions")]
    NoRegions,

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(String),

    #[error("frame state lock was poisoned")]
    LockPoisoned,

    #[error("frame loop did not stop within {waited_ms}ms")]
    JoinTimeout { waited_ms: u64 },

    #[error("frame loop thread panicked")]
    WorkerPanicked,

    #[error("animator has been closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, DoodleError>;
