//! Doodle fill - chords spiralling inward from a polygon boundary.
//!
//! The filler walks the segment list in order. For each segment it casts a
//! probe ray from the last anchor point, rotated slightly off that
//! segment's direction, and keeps the first crossing with any later
//! segment as a new chord. New chords are appended to the same list, so
//! the walk eventually reaches them too and the pattern winds inward.
//!
//! The walk stops once the local average segment length drops below the
//! cutoff, or when it runs off the end of the list.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Boundary, Segment, Vec2};

/// Default minimum local average segment length before filling stops.
pub const FILL_CUTOFF: f64 = 15.0;

/// Default rotation of each probe ray away from its segment, in radians.
pub const ANGLE_OFFSET: f64 = PI * 0.014;

/// How many segments (current included) feed the stopping average.
const LOCAL_WINDOW: usize = 3;

/// Tunables for the fill walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillParams {
    /// Stop once the local average segment length is at or below this.
    pub cutoff: f64,
    /// Probe rotation in radians.
    pub angle_offset: f64,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            cutoff: FILL_CUTOFF,
            angle_offset: ANGLE_OFFSET,
        }
    }
}

/// Generates the segment list for one section.
///
/// Starts out holding exactly the boundary ring; `fill` appends chords and
/// hands the whole list over.
#[derive(Debug, Clone)]
pub struct RegionFiller {
    segments: Vec<Segment>,
    boundary_len: usize,
    params: FillParams,
}

impl RegionFiller {
    pub fn new(boundary: &Boundary) -> Self {
        Self::with_params(boundary, FillParams::default())
    }

    pub fn with_params(boundary: &Boundary, params: FillParams) -> Self {
        let segments = boundary.edges();
        Self {
            boundary_len: segments.len(),
            segments,
            params,
        }
    }

    /// Validate `vertices` and build a filler for them.
    pub fn from_vertices(vertices: Vec<Vec2>) -> Result<Self> {
        Ok(Self::new(&Boundary::new(vertices)?))
    }

    /// Number of boundary segments at the head of the list.
    pub fn boundary_len(&self) -> usize {
        self.boundary_len
    }

    /// Segments generated so far (the boundary ring before `fill`).
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Run the fill walk and return every segment in draw order: the
    /// boundary ring first, then chords in the order they were found.
    pub fn fill(mut self) -> Vec<Segment> {
        let mut index = 0;
        let mut local_average = f64::INFINITY;
        let mut anchor = self.segments[0].start;

        while local_average > self.params.cutoff && index < self.segments.len() {
            let current = self.segments[index];

            let heading = current.angle() + self.params.angle_offset;
            let ray_end = Vec2::from_angle(heading) * (current.length() * 2.0) + current.start;
            let probe = Segment::new(anchor, ray_end);

            // The list grows below us; only scan what existed at the start of
            // this step. The first hit (lowest index) wins.
            let scan_end = self.segments.len();
            let hit = (index + 1..scan_end)
                .find_map(|j| Segment::intersection(&probe, &self.segments[j]));

            // No hit: the anchor carries over and nothing is appended.
            if let Some(point) = hit {
                self.segments.push(Segment::new(anchor, point));
                anchor = point;
            }

            local_average = local_average_length(&self.segments, index);
            index += 1;
        }

        debug!(
            "filled section: {} boundary + {} chords, stopped at index {} (avg {:.2})",
            self.boundary_len,
            self.segments.len() - self.boundary_len,
            index,
            local_average
        );

        self.segments
    }
}

/// Average length over the walk's recent history ending at `index`.
///
/// Sums the current segment and the ones before it inside the window, and
/// divides by `min(LOCAL_WINDOW, index) + 1`. Near the start of the walk the
/// divisor counts one more sample than was summed; the pattern's density is
/// tuned around that.
fn local_average_length(segments: &[Segment], index: usize) -> f64 {
    let samples = LOCAL_WINDOW.min(index);

    let mut total = segments[index].length();
    for i in 1..samples {
        total += segments[index - i].length();
    }

    total / (samples + 1) as f64
}

/// Fill a polygon given as raw vertices.
pub fn generate_doodle_fill(vertices: &[Vec2], params: FillParams) -> Result<Vec<Segment>> {
    let boundary = Boundary::new(vertices.to_vec())?;
    Ok(RegionFiller::with_params(&boundary, params).fill())
}
