//! # Reference path
//!
//! The reference path is the centre line of the road, given as a closed loop of waypoints in
//! driving order. It provides the mapping between the map (Cartesian) frame and the Frenet frame,
//! in which a position is given as the arc length `s` along the path and the lateral offset `d`
//! from it. Positive `d` is to the right of the driving direction.
//!
//! The path is treated as a ring: the successor of the last waypoint is the first one, and `s`
//! values are taken modulo the track length `max_s`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_tracks;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::path::Path;

// Internal
use util::maths::{get_ang_dist, rem_euclid, wrap_signed};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Point used to decide the sign of `d` in `to_frenet`.
///
/// A position which is no further from this point than its projection on the path gets a
/// negative `d`. The point lies inside the default highway loop.
pub const D_SIGN_REF_POINT_M: [f64; 2] = [1000.0, 2000.0];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single point on the reference path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position in the map frame
    pub position_m: Vector2<f64>,

    /// Arc length along the path at this point
    pub s_m: f64,

    /// Unit vector normal to the path, pointing in the direction of positive `d`
    pub normal: Vector2<f64>,
}

/// A position in the Frenet frame of the reference path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frenet {
    /// Arc length along the path
    pub s_m: f64,

    /// Lateral offset from the path, positive to the right of the driving direction
    pub d_m: f64,
}

/// The closed reference path.
///
/// Only built through [`ReferencePath::new`], so it always has at least 2 waypoints.
#[derive(Debug, Clone)]
pub struct ReferencePath {
    waypoints: Vec<Waypoint>,

    /// Sum of the straight line segment lengths before each waypoint.
    seg_start_s_m: Vec<f64>,

    /// Length of the track, `s` wraps back to zero here.
    max_s_m: f64,
}

/// A row of the map file, `x y s dx dy`.
#[derive(Debug, Deserialize)]
struct MapRow {
    x: f64,
    y: f64,
    s: f64,
    dx: f64,
    dy: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building a reference path.
#[derive(Debug, thiserror::Error)]
pub enum RefPathError {
    #[error("A reference path needs at least 2 waypoints, found {0}")]
    TooFewWaypoints(usize),

    #[error("Waypoint {0} does not have a greater s than the one before it")]
    NonIncreasingS(usize),

    #[error("Waypoint {0} is at the same position as its successor")]
    DegenerateSegment(usize),

    #[error("The track length ({0}) must be greater than the s of the last waypoint ({1})")]
    InvalidMaxS(f64, f64),

    #[error("Could not read the map file: {0}")]
    MapFileError(csv::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Frenet {
    pub fn new(s_m: f64, d_m: f64) -> Self {
        Self { s_m, d_m }
    }
}

impl ReferencePath {
    /// Build a new reference path from waypoints ordered in the driving direction.
    pub fn new(waypoints: Vec<Waypoint>, max_s_m: f64) -> Result<Self, RefPathError> {
        let n = waypoints.len();
        if n < 2 {
            return Err(RefPathError::TooFewWaypoints(n));
        }

        for i in 1..n {
            if !(waypoints[i].s_m > waypoints[i - 1].s_m) {
                return Err(RefPathError::NonIncreasingS(i));
            }
        }

        let last_s_m = waypoints[n - 1].s_m;
        if !(max_s_m > last_s_m) {
            return Err(RefPathError::InvalidMaxS(max_s_m, last_s_m));
        }

        // Accumulate the segment lengths, including the closing segment so that degenerate
        // loops are caught here rather than producing NaNs later.
        let mut seg_start_s_m = Vec::with_capacity(n);
        let mut total_m = 0.0;
        for i in 0..n {
            seg_start_s_m.push(total_m);

            let length_m = (waypoints[(i + 1) % n].position_m - waypoints[i].position_m).norm();
            if length_m <= std::f64::EPSILON {
                return Err(RefPathError::DegenerateSegment(i));
            }
            total_m += length_m;
        }

        debug!(
            "Reference path built from {} waypoints, track length {:.3} m (geometric {:.3} m)",
            n, max_s_m, total_m
        );

        Ok(Self {
            waypoints,
            seg_start_s_m,
            max_s_m,
        })
    }

    /// Load the reference path from a map file.
    ///
    /// The file holds one waypoint per line as space separated `x y s dx dy` values, in driving
    /// order.
    pub fn from_map_file<P: AsRef<Path>>(path: P, max_s_m: f64) -> Result<Self, RefPathError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(RefPathError::MapFileError)?;

        let mut waypoints = Vec::new();
        for row in reader.deserialize() {
            let row: MapRow = row.map_err(RefPathError::MapFileError)?;

            waypoints.push(Waypoint {
                position_m: Vector2::new(row.x, row.y),
                s_m: row.s,
                normal: Vector2::new(row.dx, row.dy),
            });
        }

        Self::new(waypoints, max_s_m)
    }

    /// Number of waypoints in the path, never less than 2.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Length of the track.
    pub fn max_s_m(&self) -> f64 {
        self.max_s_m
    }

    /// Index of the waypoint closest to the given position.
    ///
    /// Ties go to the lowest index.
    pub fn closest_waypoint(&self, position_m: &Vector2<f64>) -> usize {
        let mut closest = 0;
        let mut closest_dist_sq = std::f64::INFINITY;

        for (i, wp) in self.waypoints.iter().enumerate() {
            let dist_sq = (wp.position_m - position_m).norm_squared();
            if dist_sq < closest_dist_sq {
                closest_dist_sq = dist_sq;
                closest = i;
            }
        }

        closest
    }

    /// Index of the next waypoint ahead of a vehicle at the given position and heading.
    ///
    /// This is the closest waypoint, unless that waypoint is more than 45 degrees off the
    /// vehicle's heading, in which case it is considered behind and its successor is returned.
    pub fn next_waypoint(&self, position_m: &Vector2<f64>, heading_rad: f64) -> usize {
        let closest = self.closest_waypoint(position_m);

        let to_wp = self.waypoints[closest].position_m - position_m;
        let bearing_rad = to_wp.y.atan2(to_wp.x);

        if get_ang_dist(heading_rad, bearing_rad) > FRAC_PI_4 {
            self.next_index(closest)
        } else {
            closest
        }
    }

    /// Convert a map frame position into the Frenet frame.
    ///
    /// The position is projected onto the segment which ends at `next_waypoint`. The returned
    /// `s` is in `[0, max_s)`.
    pub fn to_frenet(&self, position_m: &Vector2<f64>, heading_rad: f64) -> Frenet {
        let next = self.next_waypoint(position_m, heading_rad);
        let prev = self.prev_index(next);

        let start_m = self.waypoints[prev].position_m;
        let seg_m = self.waypoints[next].position_m - start_m;
        let rel_m = position_m - start_m;

        // Projection of the position onto the segment
        let proj_norm = rel_m.dot(&seg_m) / seg_m.norm_squared();
        let proj_m = seg_m * proj_norm;

        let mut d_m = (rel_m - proj_m).norm();

        // Sign of d from the distance to the fixed reference point
        let ref_m = Vector2::new(D_SIGN_REF_POINT_M[0], D_SIGN_REF_POINT_M[1]) - start_m;
        if (ref_m - rel_m).norm() <= (ref_m - proj_m).norm() {
            d_m = -d_m;
        }

        let s_m = self.seg_start_s_m[prev] + proj_norm * seg_m.norm();

        Frenet {
            s_m: rem_euclid(s_m, self.max_s_m),
            d_m,
        }
    }

    /// Convert a Frenet position into the map frame.
    ///
    /// `s` may be outside `[0, max_s)`, it is wrapped onto the loop first.
    pub fn to_cartesian(&self, frenet: &Frenet) -> Vector2<f64> {
        let n = self.waypoints.len();
        let s_m = rem_euclid(frenet.s_m, self.max_s_m);

        // Last waypoint with an s not greater than the target. If the target comes before the
        // first waypoint it is on the closing segment.
        let idx = self.waypoints.partition_point(|wp| wp.s_m <= s_m);
        let (prev, seg_s_m) = if idx == 0 {
            (n - 1, s_m + self.max_s_m - self.waypoints[n - 1].s_m)
        } else {
            (idx - 1, s_m - self.waypoints[idx - 1].s_m)
        };
        let next = self.next_index(prev);

        let start_m = self.waypoints[prev].position_m;
        let seg_m = self.waypoints[next].position_m - start_m;
        let heading_rad = seg_m.y.atan2(seg_m.x);
        let perp_heading_rad = heading_rad - FRAC_PI_2;

        start_m
            + Vector2::new(heading_rad.cos(), heading_rad.sin()) * seg_s_m
            + Vector2::new(perp_heading_rad.cos(), perp_heading_rad.sin()) * frenet.d_m
    }

    /// Signed arc length from `from_s_m` to `to_s_m`, taking the shorter way round the loop.
    ///
    /// Positive if `to_s_m` is ahead of `from_s_m`.
    pub fn s_gap(&self, from_s_m: f64, to_s_m: f64) -> f64 {
        wrap_signed(to_s_m - from_s_m, self.max_s_m)
    }

    fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }

    fn prev_index(&self, index: usize) -> usize {
        (index + self.waypoints.len() - 1) % self.waypoints.len()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
