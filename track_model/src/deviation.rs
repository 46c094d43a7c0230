//! # Deviation engine
//!
//! This module localises a vehicle against the track and computes the
//! deviation errors a guidance controller works on.
//!
//! [`TrackModel::get_track_distance`] answers "how far along the track is
//! this position" by finding the closest centreline sample.
//! [`TrackModel::get_vehicle_deviation`] expresses the offset between the
//! vehicle and a target track point in the track-tangent frame at that point,
//! split into a longitudinal (lag) and a lateral (contour) component.
//!
//! Sign conventions, which downstream controllers depend on:
//!
//! - `lag_m` is positive while the vehicle has not yet reached the target
//!   point along the track direction.
//! - `contour_m` is positive when the vehicle is to the right of the
//!   centreline, looking along increasing arc length.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

// Internal
use crate::track::TrackModel;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Deviation of a vehicle from a target track point, in the track-tangent
/// frame at that point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Deviation {
    /// Longitudinal (along-track) error. Positive while the vehicle has not
    /// yet reached the target point.
    pub lag_m: f64,

    /// Lateral (cross-track) error. Positive when the vehicle is to the right
    /// of the centreline, looking along increasing arc length.
    pub contour_m: f64,

    /// Excess lateral distance beyond the track half width. Zero while the
    /// vehicle is inside the track.
    pub offroad_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TrackModel {
    /// Get the distance travelled along the track at the centreline point
    /// closest to `pos_m`.
    ///
    /// The search runs over every centreline sample through the model's
    /// nearest point index, so accuracy is that of the discretization
    /// resolution. Exact distance ties resolve to the earliest sample.
    pub fn get_track_distance(&self, pos_m: Vector2<f64>) -> f64 {
        let index = self.index.nearest(pos_m);
        self.arc_lengths()[index]
    }

    /// Get the deviation of a vehicle at `vehicle_pos_m` from the track point
    /// at `target_dist_m` along the track.
    ///
    /// The inertial-frame offset from the vehicle to the target centre point
    /// is rotated into the track-tangent frame at the target, giving the lag
    /// and contour errors directly. Non-finite vehicle positions are not
    /// sanitized and propagate into the result.
    pub fn get_vehicle_deviation(
        &self,
        vehicle_pos_m: Vector2<f64>,
        target_dist_m: f64,
    ) -> Deviation {
        let info = self.get_track_info(target_dist_m);

        // Offset from the vehicle to the target point, in the inertial frame
        let error_m = info.centre_m - vehicle_pos_m;

        // Rotating by the inverse of the heading expresses the offset in the
        // track-tangent frame: x along the track, y across it
        let error_track_m = Rotation2::new(info.heading_rad).inverse() * error_m;

        let contour_m = error_track_m[1];

        Deviation {
            lag_m: error_track_m[0],
            contour_m,
            offroad_m: (contour_m.abs() - info.half_width_m).max(0.0),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
