//! # Segment generator
//!
//! This module turns an ordered list of straight/arc segment instructions into
//! dense sample sequences of the left track boundary, the right track boundary
//! and the centreline heading.
//!
//! Generation threads a running pose (reference position and heading) through
//! the instruction sequence. Each segment is built in the frame defined by the
//! pose the previous segment ended with, so position and heading continuity
//! between segments holds by construction and is not re-checked.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Separation of boundary samples along a straight segment.
pub const STRAIGHT_STEP_M: f64 = 0.5;

/// Angular separation of boundary samples along an arc segment.
pub const ARC_STEP_DEG: f64 = 2.0;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single track building instruction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SegmentSpec {
    /// A straight section of the given length.
    Straight {
        /// Length of the section, must be positive and finite.
        length_m: f64,
    },

    /// A circular arc turning through the given angle.
    ///
    /// The radius is that of the centreline, and must be greater than the
    /// track half width so the inner boundary keeps a positive radius. The
    /// angle follows the right hand rule about Z+, so positive angles turn
    /// left and negative angles turn right.
    Arc {
        /// Centreline radius of the arc, must exceed the track half width.
        radius_m: f64,

        /// Total turn angle in degrees, must be nonzero and finite.
        angle_deg: f64,
    },
}

/// Potential errors raised while generating boundary samples.
///
/// All of these are fatal - no partial sample set is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("Track width must be positive and finite, got {0}")]
    InvalidWidth(f64),

    #[error("Segment {0}: straight length must be positive and finite, got {1}")]
    InvalidLength(usize, f64),

    #[error(
        "Segment {0}: arc radius must be finite and greater than the track half width \
         ({1} m), got {2}"
    )]
    InvalidRadius(usize, f64, f64),

    #[error("Segment {0}: arc angle must be nonzero and finite, got {1} deg")]
    InvalidAngle(usize, f64),
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Boundary samples generated from a segment instruction sequence.
///
/// The three sequences are parallel and index-aligned: `left_m[i]` and
/// `right_m[i]` are the track edge points at sample `i`, and `heading_rad[i]`
/// is the centreline tangent direction there (angle to the +X axis).
#[derive(Debug, Clone, Serialize)]
pub struct BoundarySamples {
    /// Left track boundary points
    pub left_m: Vec<Vector2<f64>>,

    /// Right track boundary points
    pub right_m: Vec<Vector2<f64>>,

    /// Centreline heading at each sample
    pub heading_rad: Vec<f64>,
}

/// The running pose of the generator, threaded through the sequence.
struct GenPose {
    pos_m: Vector2<f64>,
    heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl BoundarySamples {
    fn empty() -> Self {
        Self {
            left_m: Vec::new(),
            right_m: Vec::new(),
            heading_rad: Vec::new(),
        }
    }

    /// Get the number of samples in the set.
    pub fn len(&self) -> usize {
        self.left_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left_m.is_empty()
    }
}

impl GenPose {
    /// Unit vector pointing along the current heading.
    fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }

    /// Unit vector normal to the current heading, pointing to the left.
    fn left_normal(&self) -> Vector2<f64> {
        Vector2::new(-self.heading_rad.sin(), self.heading_rad.cos())
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Generate boundary samples for the given segment instruction sequence.
///
/// The first segment starts at `start_pos_m` with heading `start_heading_rad`,
/// and each following segment starts at the pose the previous one ended with.
/// `width_m` is the full track width, constant along the whole track.
///
/// Segments with invalid parameters abort generation with a [`SegmentError`].
pub fn generate(
    segments: &[SegmentSpec],
    start_pos_m: Vector2<f64>,
    start_heading_rad: f64,
    width_m: f64,
) -> Result<BoundarySamples, SegmentError> {
    if !width_m.is_finite() || width_m <= 0.0 {
        return Err(SegmentError::InvalidWidth(width_m));
    }

    let half_width_m = width_m / 2.0;

    let mut pose = GenPose {
        pos_m: start_pos_m,
        heading_rad: start_heading_rad,
    };
    let mut samples = BoundarySamples::empty();

    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            SegmentSpec::Straight { length_m } => {
                if !length_m.is_finite() || length_m <= 0.0 {
                    return Err(SegmentError::InvalidLength(i, length_m));
                }

                gen_straight(&mut samples, &mut pose, length_m, half_width_m);
            }
            SegmentSpec::Arc {
                radius_m,
                angle_deg,
            } => {
                if !radius_m.is_finite() || radius_m <= half_width_m {
                    return Err(SegmentError::InvalidRadius(i, half_width_m, radius_m));
                }
                if !angle_deg.is_finite() || angle_deg == 0.0 {
                    return Err(SegmentError::InvalidAngle(i, angle_deg));
                }

                gen_arc(&mut samples, &mut pose, radius_m, angle_deg, half_width_m);
            }
        }
    }

    Ok(samples)
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Generate the samples for a straight segment and advance the pose.
fn gen_straight(
    samples: &mut BoundarySamples,
    pose: &mut GenPose,
    length_m: f64,
    half_width_m: f64,
) {
    let forward = pose.forward();
    let left_normal = pose.left_normal();

    // Samples sit at multiples of the step size, truncated to the largest
    // offset inside the segment. The length need not be an exact multiple of
    // the step.
    let num_samples = (length_m / STRAIGHT_STEP_M).floor() as usize;

    for k in 1..=num_samples {
        let t_m = k as f64 * STRAIGHT_STEP_M;

        samples
            .left_m
            .push(pose.pos_m + half_width_m * left_normal + t_m * forward);
        samples
            .right_m
            .push(pose.pos_m - half_width_m * left_normal + t_m * forward);
        samples.heading_rad.push(pose.heading_rad);
    }

    // The pose advances by the full segment length, not just to the last
    // sample, so the next segment starts where this one really ends.
    pose.pos_m += length_m * forward;
}

/// Generate the samples for an arc segment and advance the pose.
fn gen_arc(
    samples: &mut BoundarySamples,
    pose: &mut GenPose,
    radius_m: f64,
    angle_deg: f64,
    half_width_m: f64,
) {
    let turn_sign = angle_deg.signum();

    // The curvature centre sits at the centreline radius along the left
    // normal for a left turn, or along the right normal for a right turn.
    let centre_m = pose.pos_m + turn_sign * radius_m * pose.left_normal();

    // Unit vector from the curvature centre back to the segment entry point.
    // Rotating it by the swept angle traces the arc.
    let entry_dir = (pose.pos_m - centre_m) / radius_m;

    // The two boundaries are concentric arcs about the curvature centre, the
    // inner one on the side the track turns towards.
    let left_radius_m = radius_m - turn_sign * half_width_m;
    let right_radius_m = radius_m + turn_sign * half_width_m;

    let num_steps = (angle_deg.abs() / ARC_STEP_DEG).floor() as usize;

    for j in 0..=num_steps {
        let theta_rad = turn_sign * (j as f64 * ARC_STEP_DEG).to_radians();
        let dir = Rotation2::new(theta_rad) * entry_dir;

        samples.left_m.push(centre_m + left_radius_m * dir);
        samples.right_m.push(centre_m + right_radius_m * dir);
        samples.heading_rad.push(pose.heading_rad + theta_rad);
    }

    // The heading advances by the full instruction angle. The position is
    // re-synchronised onto the midpoint of the final sample pair, so rounding
    // in the arc construction cannot compound across segments.
    pose.heading_rad += angle_deg.to_radians();

    let last = samples.left_m.len() - 1;
    pose.pos_m = (samples.left_m[last] + samples.right_m[last]) / 2.0;
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const POS_TOL_M: f64 = 1e-9;

    fn assert_vec2_eq(a: Vector2<f64>, b: Vector2<f64>, tol: f64) {
        assert!(
            (a - b).norm() < tol,
            "expected {:?} to be within {} of {:?}",
            a,
            tol,
            b
        );
    }

    #[test]
    fn test_straight_samples() {
        let samples = generate(
            &[SegmentSpec::Straight { length_m: 10.0 }],
            Vector2::new(0.0, 0.0),
            0.0,
            4.0,
        )
        .unwrap();

        // 10 m at 0.5 m separation, first sample one step in
        assert_eq!(samples.len(), 20);
        assert_vec2_eq(samples.left_m[0], Vector2::new(0.5, 2.0), POS_TOL_M);
        assert_vec2_eq(samples.right_m[0], Vector2::new(0.5, -2.0), POS_TOL_M);
        assert_vec2_eq(samples.left_m[19], Vector2::new(10.0, 2.0), POS_TOL_M);

        // Heading is constant along a straight
        assert!(samples.heading_rad.iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_straight_truncation() {
        // 1.2 m is not a multiple of the step, so the last sample sits at
        // 1.0 m but the next segment still starts at 1.2 m
        let samples = generate(
            &[
                SegmentSpec::Straight { length_m: 1.2 },
                SegmentSpec::Straight { length_m: 0.5 },
            ],
            Vector2::new(0.0, 0.0),
            0.0,
            2.0,
        )
        .unwrap();

        assert_eq!(samples.len(), 3);
        assert_vec2_eq(samples.left_m[1], Vector2::new(1.0, 1.0), POS_TOL_M);
        assert_vec2_eq(samples.left_m[2], Vector2::new(1.7, 1.0), POS_TOL_M);
    }

    #[test]
    fn test_arc_left_turn() {
        let samples = generate(
            &[SegmentSpec::Arc {
                radius_m: 10.0,
                angle_deg: 90.0,
            }],
            Vector2::new(0.0, 0.0),
            0.0,
            2.0,
        )
        .unwrap();

        // 90 deg at 2 deg separation, including the entry sample
        assert_eq!(samples.len(), 46);

        // Entry pair matches the straight segment edge offsets, and the left
        // boundary is the inner arc on a left turn
        assert_vec2_eq(samples.left_m[0], Vector2::new(0.0, 1.0), POS_TOL_M);
        assert_vec2_eq(samples.right_m[0], Vector2::new(0.0, -1.0), POS_TOL_M);

        // Exit pair after a quarter turn about (0, 10)
        assert_vec2_eq(samples.left_m[45], Vector2::new(9.0, 10.0), 1e-12);
        assert_vec2_eq(samples.right_m[45], Vector2::new(11.0, 10.0), 1e-12);

        assert_eq!(samples.heading_rad[0], 0.0);
        assert!((samples.heading_rad[45] - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_arc_right_turn_mirrored() {
        let samples = generate(
            &[SegmentSpec::Arc {
                radius_m: 10.0,
                angle_deg: -90.0,
            }],
            Vector2::new(0.0, 0.0),
            0.0,
            2.0,
        )
        .unwrap();

        // On a right turn the left boundary is the outer arc
        assert_vec2_eq(samples.left_m[0], Vector2::new(0.0, 1.0), POS_TOL_M);
        assert_vec2_eq(samples.right_m[0], Vector2::new(0.0, -1.0), POS_TOL_M);
        assert_vec2_eq(samples.left_m[45], Vector2::new(9.0, -10.0), 1e-12);
        assert_vec2_eq(samples.right_m[45], Vector2::new(11.0, -10.0), 1e-12);
        assert!((samples.heading_rad[45] + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_arc_truncation() {
        // 3 deg arc truncates to samples at 0 and 2 deg, but the heading
        // still advances by the full angle for the following segment
        let samples = generate(
            &[
                SegmentSpec::Arc {
                    radius_m: 10.0,
                    angle_deg: 3.0,
                },
                SegmentSpec::Straight { length_m: 0.5 },
            ],
            Vector2::new(0.0, 0.0),
            0.0,
            2.0,
        )
        .unwrap();

        assert_eq!(samples.len(), 3);
        assert!((samples.heading_rad[1] - 2f64.to_radians()).abs() < 1e-12);
        assert!((samples.heading_rad[2] - 3f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_heading_continuity() {
        // A closed loop with straights and both turn directions. The heading
        // between any two consecutive samples never jumps by more than one
        // arc step, in particular not at segment boundaries.
        let samples = generate(
            &[
                SegmentSpec::Straight { length_m: 20.0 },
                SegmentSpec::Arc {
                    radius_m: 8.0,
                    angle_deg: 90.0,
                },
                SegmentSpec::Straight { length_m: 5.3 },
                SegmentSpec::Arc {
                    radius_m: 6.0,
                    angle_deg: -45.0,
                },
                SegmentSpec::Arc {
                    radius_m: 6.0,
                    angle_deg: 45.0,
                },
            ],
            Vector2::new(1.0, -2.0),
            0.3,
            3.0,
        )
        .unwrap();

        let max_step_rad = ARC_STEP_DEG.to_radians() + 1e-9;
        for pair in samples.heading_rad.windows(2) {
            assert!(
                (pair[1] - pair[0]).abs() <= max_step_rad,
                "heading jump {} rad exceeds one arc step",
                (pair[1] - pair[0]).abs()
            );
        }
    }

    #[test]
    fn test_invalid_segments_rejected() {
        let start = Vector2::new(0.0, 0.0);

        assert!(matches!(
            generate(&[SegmentSpec::Straight { length_m: 0.0 }], start, 0.0, 2.0),
            Err(SegmentError::InvalidLength(0, _))
        ));
        assert!(matches!(
            generate(
                &[SegmentSpec::Straight { length_m: f64::NAN }],
                start,
                0.0,
                2.0
            ),
            Err(SegmentError::InvalidLength(0, _))
        ));
        assert!(matches!(
            generate(
                &[
                    SegmentSpec::Straight { length_m: 1.0 },
                    SegmentSpec::Arc {
                        radius_m: 0.0,
                        angle_deg: 90.0
                    }
                ],
                start,
                0.0,
                2.0
            ),
            Err(SegmentError::InvalidRadius(1, _, _))
        ));
        // A radius inside the half width would collapse the inner boundary
        assert!(matches!(
            generate(
                &[SegmentSpec::Arc {
                    radius_m: 1.5,
                    angle_deg: 90.0
                }],
                start,
                0.0,
                4.0
            ),
            Err(SegmentError::InvalidRadius(0, _, _))
        ));
        assert!(matches!(
            generate(
                &[SegmentSpec::Arc {
                    radius_m: 10.0,
                    angle_deg: 0.0
                }],
                start,
                0.0,
                2.0
            ),
            Err(SegmentError::InvalidAngle(0, _))
        ));
        assert!(matches!(
            generate(&[SegmentSpec::Straight { length_m: 1.0 }], start, 0.0, -2.0),
            Err(SegmentError::InvalidWidth(_))
        ));
    }

    #[test]
    fn test_closed_loop_returns_to_start() {
        // Two straights joined by two half turns form a closed oval
        let samples = generate(
            &[
                SegmentSpec::Straight { length_m: 60.0 },
                SegmentSpec::Arc {
                    radius_m: 20.0,
                    angle_deg: 180.0,
                },
                SegmentSpec::Straight { length_m: 60.0 },
                SegmentSpec::Arc {
                    radius_m: 20.0,
                    angle_deg: 180.0,
                },
            ],
            Vector2::new(0.0, 0.0),
            0.0,
            6.0,
        )
        .unwrap();

        let last = samples.len() - 1;
        let end_centre = (samples.left_m[last] + samples.right_m[last]) / 2.0;
        assert_vec2_eq(end_centre, Vector2::new(0.0, 0.0), 1e-9);
        assert!((samples.heading_rad[last] - 2.0 * PI).abs() < 1e-9);
    }
}
