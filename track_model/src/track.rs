//! # Track model
//!
//! The track model owns the boundary samples produced by the segment
//! generator, derives the centreline and its arc-length parametrization, and
//! answers "track info at distance d" queries.
//!
//! The whole data set is computed once at construction and is immutable
//! afterwards. Queries are pure reads over the precomputed arrays, so a model
//! may be shared between threads without synchronisation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::defs::TrackDef;
use crate::segment::{self, BoundarySamples, SegmentError};
use crate::spatial::{LinearScan, NearestIndex};
use util::maths::rem_euclid;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Bias added to each centreline step distance when accumulating arc length.
///
/// The entry sample of an arc coincides with the end of the previous segment,
/// so the raw step distance can be zero there. The bias keeps the arc length
/// table strictly increasing, which the nearest-distance lookup requires.
pub const ARC_LENGTH_BIAS_M: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Track data at a queried arc-length position.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackInfo {
    /// Centreline position
    pub centre_m: Vector2<f64>,

    /// Centreline tangent direction (angle to the +X axis)
    pub heading_rad: f64,

    /// Half the track width.
    ///
    /// This is the lateral off-track threshold used by deviation queries, not
    /// a curvature radius.
    pub half_width_m: f64,
}

/// An immutable, arc-length parametrized racetrack.
///
/// Built once from a segment instruction sequence (or pre-generated boundary
/// samples); there is no mutation API.
#[derive(Debug)]
pub struct TrackModel {
    /// Left track boundary points
    left_m: Vec<Vector2<f64>>,

    /// Right track boundary points
    right_m: Vec<Vector2<f64>>,

    /// Centreline points, the midpoints of the boundary pairs
    centre_m: Vec<Vector2<f64>>,

    /// Centreline heading at each sample
    heading_rad: Vec<f64>,

    /// Strictly increasing arc length at each sample, starting at zero
    arc_length_m: Vec<f64>,

    /// Total track length
    total_length_m: f64,

    /// Full track width
    width_m: f64,

    /// Nearest point index over the centreline samples
    pub(crate) index: Box<dyn NearestIndex>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Potential errors raised while building a track model.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// Boundary generation failed because an instruction was malformed.
    #[error("Failed to generate the track boundaries: {0}")]
    GenerationFailed(SegmentError),

    /// The boundary sample sequences are not index-aligned.
    #[error("Boundary sample sequences have mismatched lengths ({0}/{1}/{2})")]
    MismatchedSamples(usize, usize, usize),

    /// The instruction sequence produced too few samples to form a curve.
    #[error("Degenerate track: {0} sample(s) cannot form a curve")]
    NotEnoughSamples(usize),

    /// The generated track has no length to parametrize.
    #[error("Degenerate track: total length {0} m is not positive")]
    ZeroLength(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TrackModel {
    /// Build a track model from a track definition.
    pub fn from_def(def: &TrackDef) -> Result<Self, TrackError> {
        let samples = segment::generate(
            &def.segments,
            Vector2::new(def.start_pos_m[0], def.start_pos_m[1]),
            def.start_heading_rad,
            def.width_m,
        )
        .map_err(TrackError::GenerationFailed)?;

        Self::build(samples, def.width_m)
    }

    /// Build a track model from pre-generated boundary samples.
    ///
    /// Degenerate sample sets (mismatched lengths, fewer than two samples,
    /// zero total length) are rejected here rather than being left to fail in
    /// the query functions.
    pub fn build(samples: BoundarySamples, width_m: f64) -> Result<Self, TrackError> {
        let BoundarySamples {
            left_m,
            right_m,
            heading_rad,
        } = samples;

        if left_m.len() != right_m.len() || left_m.len() != heading_rad.len() {
            return Err(TrackError::MismatchedSamples(
                left_m.len(),
                right_m.len(),
                heading_rad.len(),
            ));
        }
        if left_m.len() < 2 {
            return Err(TrackError::NotEnoughSamples(left_m.len()));
        }

        // The centreline is the midpoint curve of the two boundaries
        let centre_m: Vec<Vector2<f64>> = left_m
            .iter()
            .zip(right_m.iter())
            .map(|(left, right)| (left + right) / 2.0)
            .collect();

        // Cumulative arc length over the centre polyline, each step biased to
        // keep the table strictly increasing through coincident samples
        let mut arc_length_m = Vec::with_capacity(centre_m.len());
        arc_length_m.push(0.0);
        for i in 1..centre_m.len() {
            let step_m = (centre_m[i] - centre_m[i - 1]).norm() + ARC_LENGTH_BIAS_M;
            arc_length_m.push(arc_length_m[i - 1] + step_m);
        }

        // The unwrap is safe, the length was checked above
        let total_length_m = *arc_length_m.last().unwrap();
        if total_length_m <= 0.0 {
            return Err(TrackError::ZeroLength(total_length_m));
        }

        let index: Box<dyn NearestIndex> = Box::new(LinearScan::new(centre_m.clone()));

        debug!(
            "Track model built: {} samples, {:.2} m total length",
            centre_m.len(),
            total_length_m
        );

        Ok(Self {
            left_m,
            right_m,
            centre_m,
            heading_rad,
            arc_length_m,
            total_length_m,
            width_m,
            index,
        })
    }

    /// Replace the nearest point index used by position queries.
    ///
    /// This is a performance substitution only: any index must return the
    /// exact nearest centreline sample and break distance ties by the lowest
    /// sample index, so query results are unchanged.
    pub fn with_index(mut self, index: Box<dyn NearestIndex>) -> Self {
        self.index = index;
        self
    }

    /// Get the track data at the given distance along the track.
    ///
    /// The distance is wrapped into `[0, total_length_m)`, treating the track
    /// as periodic whether or not the geometry closes. The returned info is
    /// that of the generated sample whose arc length is nearest to the
    /// wrapped distance - deliberately snapped rather than interpolated, so
    /// the result always corresponds to real generated geometry (see
    /// [`TrackModel::get_track_info_interpolated`] for the continuous
    /// variant).
    pub fn get_track_info(&self, dist_m: f64) -> TrackInfo {
        let wrapped_m = rem_euclid(dist_m, self.total_length_m);
        let index = self.nearest_arc_length_index(wrapped_m);

        TrackInfo {
            centre_m: self.centre_m[index],
            heading_rad: self.heading_rad[index],
            half_width_m: self.width_m / 2.0,
        }
    }

    /// Continuous variant of [`TrackModel::get_track_info`].
    ///
    /// Linearly interpolates centre position and heading between the two
    /// samples bracketing the wrapped distance. The snapping behaviour of the
    /// default query is unchanged by this being available.
    pub fn get_track_info_interpolated(&self, dist_m: f64) -> TrackInfo {
        let wrapped_m = rem_euclid(dist_m, self.total_length_m);

        // First sample with arc length >= wrapped, its predecessor brackets
        let upper = self
            .arc_length_m
            .partition_point(|&length_m| length_m < wrapped_m)
            .min(self.arc_length_m.len() - 1);

        if upper == 0 {
            return TrackInfo {
                centre_m: self.centre_m[0],
                heading_rad: self.heading_rad[0],
                half_width_m: self.width_m / 2.0,
            };
        }

        let lower = upper - 1;

        // Strict monotonicity of the table makes the divisor positive
        let frac = (wrapped_m - self.arc_length_m[lower])
            / (self.arc_length_m[upper] - self.arc_length_m[lower]);

        TrackInfo {
            centre_m: self.centre_m[lower] + frac * (self.centre_m[upper] - self.centre_m[lower]),
            heading_rad: self.heading_rad[lower]
                + frac * (self.heading_rad[upper] - self.heading_rad[lower]),
            half_width_m: self.width_m / 2.0,
        }
    }

    /// Total length of the track centreline.
    pub fn total_length_m(&self) -> f64 {
        self.total_length_m
    }

    /// Number of samples in the track.
    pub fn num_samples(&self) -> usize {
        self.centre_m.len()
    }

    /// Full track width.
    pub fn width_m(&self) -> f64 {
        self.width_m
    }

    /// Left boundary polyline, for display purposes.
    pub fn left_boundary(&self) -> &[Vector2<f64>] {
        &self.left_m
    }

    /// Right boundary polyline, for display purposes.
    pub fn right_boundary(&self) -> &[Vector2<f64>] {
        &self.right_m
    }

    /// Centreline polyline.
    pub fn centre_line(&self) -> &[Vector2<f64>] {
        &self.centre_m
    }

    /// Centreline heading at each sample.
    pub fn headings(&self) -> &[f64] {
        &self.heading_rad
    }

    /// Arc length at each sample.
    pub fn arc_lengths(&self) -> &[f64] {
        &self.arc_length_m
    }

    /// Index of the sample whose arc length is nearest to `wrapped_m`.
    ///
    /// Binary search over the strictly increasing arc length table. On an
    /// exact midpoint tie the lower index wins.
    fn nearest_arc_length_index(&self, wrapped_m: f64) -> usize {
        let upper = self
            .arc_length_m
            .partition_point(|&length_m| length_m < wrapped_m);

        if upper == 0 {
            return 0;
        }
        if upper >= self.arc_length_m.len() {
            return self.arc_length_m.len() - 1;
        }

        let lower = upper - 1;
        if wrapped_m - self.arc_length_m[lower] <= self.arc_length_m[upper] - wrapped_m {
            lower
        } else {
            upper
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
