//! Utility library for the racetrack software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod logger;
pub mod maths;
pub mod params;
