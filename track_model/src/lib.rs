//! # Track model library
//!
//! This library builds a racetrack geometry from a compact sequence of
//! straight and arc segment instructions, and exposes it as an arc-length
//! parametrized curve for use by a vehicle guidance algorithm. Consumers
//! query the track for centreline position and heading at a given travelled
//! distance, for the distance travelled at a given position, and for the
//! deviation of a vehicle from a target track point in the track-tangent
//! frame.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Track definitions - serde descriptions of tracks, loadable from TOML files
pub mod defs;

/// Deviation engine - localises a vehicle against the track and computes guidance errors
pub mod deviation;

/// Segment generator - turns segment instructions into boundary sample polylines
pub mod segment;

/// Spatial index - nearest point queries over the centreline samples
pub mod spatial;

/// Track model - the arc-length parametrized track built from boundary samples
pub mod track;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use defs::TrackDef;
pub use deviation::Deviation;
pub use segment::{BoundarySamples, SegmentSpec};
pub use track::{TrackInfo, TrackModel};
