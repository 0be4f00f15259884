//! Animated playback of one section's segments.
//!
//! A player reveals its segments one at a time, in list order, with the
//! tip moving at a constant ink speed. Finished segments are parked in a
//! queue until the compositor drains them into its cache layer; after
//! that the player never draws them again.

use std::collections::VecDeque;

use crate::geometry::{Segment, Vec2};

/// Anything a stroke can be drawn onto.
///
/// Implemented by raster layers; tests use a recorder.
pub trait StrokeTarget {
    /// Draw a straight line from `from` to `to` with the current pen.
    fn stroke_segment(&mut self, from: Vec2, to: Vec2);

    /// Draw the pen tip marker centred on `center`.
    fn fill_marker(&mut self, center: Vec2);
}

/// Coarse state of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing drawn yet.
    Idle,
    /// Somewhere inside the segment list.
    Drawing,
    /// Every segment has been revealed.
    Done,
}

/// Plays back a finished segment list.
#[derive(Debug, Clone)]
pub struct StrokePlayer {
    segments: Box<[Segment]>,
    speed: f64,
    current_index: usize,
    draw_distance: f64,
    finished: VecDeque<Segment>,
}

impl StrokePlayer {
    /// `speed` is in length units per second.
    pub fn new(speed: f64, segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into_boxed_slice(),
            speed,
            current_index: 0,
            draw_distance: 0.0,
            finished: VecDeque::new(),
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Distance already inked along the current segment.
    pub fn draw_distance(&self) -> f64 {
        self.draw_distance
    }

    /// Segments finished but not yet drained.
    pub fn pending_finished(&self) -> usize {
        self.finished.len()
    }

    pub fn state(&self) -> PlaybackState {
        if self.current_index == self.segments.len() {
            PlaybackState::Done
        } else if self.current_index == 0 && self.draw_distance == 0.0 {
            PlaybackState::Idle
        } else {
            PlaybackState::Drawing
        }
    }

    pub fn is_done(&self) -> bool {
        self.state() == PlaybackState::Done
    }

    /// Back to the first segment with nothing drawn.
    ///
    /// Anything still waiting in the finish queue is dropped along with the
    /// cache layer it was headed for.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.draw_distance = 0.0;
        self.finished.clear();
    }

    /// Draw the in-progress stroke onto `target`, then move the tip along
    /// by `speed * elapsed`.
    ///
    /// Zero-length segments are skipped without drawing and never reach
    /// the finish queue. A segment completes at most once per call; any
    /// leftover distance is discarded rather than carried to the next one.
    pub fn advance(&mut self, elapsed: f64, target: &mut impl StrokeTarget) {
        let Some(&segment) = self.segments.get(self.current_index) else {
            return;
        };

        let length = segment.length();
        if length <= 0.0 {
            self.draw_distance = 0.0;
            self.current_index += 1;
            return;
        }

        let percent = (self.draw_distance / length).min(1.0);
        let tip = segment.point_at(percent);

        target.stroke_segment(segment.start, tip);
        target.fill_marker(tip);

        self.draw_distance += self.speed * elapsed;

        if self.draw_distance >= length {
            self.draw_distance = 0.0;
            self.current_index += 1;
            self.finished.push_back(segment);
        }
    }

    /// Draw every finished segment onto `target` (the cache layer) and empty
    /// the queue. Returns how many were drawn.
    pub fn drain_finished(&mut self, target: &mut impl StrokeTarget) -> usize {
        let count = self.finished.len();
        while let Some(segment) = self.finished.pop_front() {
            target.stroke_segment(segment.start, segment.end);
        }
        count
    }
}
