//! # Track definitions
//!
//! A [`TrackDef`] is the serde description of a track: the global parameters
//! and the ordered segment instruction list. Definitions are static data kept
//! in TOML files under the `params` directory and loaded through
//! [`util::params`]; the bundled ones double as test fixtures.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::segment::SegmentSpec;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A complete track definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDef {
    /// Human readable name of the track
    pub name: String,

    /// Full track width, constant along the whole track
    pub width_m: f64,

    /// Start position of the centreline
    pub start_pos_m: [f64; 2],

    /// Start heading (angle to the +X axis)
    #[serde(default)]
    pub start_heading_rad: f64,

    /// Ordered segment instructions
    pub segments: Vec<SegmentSpec>,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
