//! # Track dump
//!
//! Builds a track model from a definition file and writes the boundary and
//! centreline polylines, together with the arc-length table, to a JSON file.
//! The plotting side consumes this output purely for display; nothing here
//! feeds back into the track semantics.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::env;

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info};
use nalgebra::Vector2;
use serde::Serialize;

use track_model::{TrackDef, TrackModel};
use util::logger::{logger_init, LevelFilter};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Output file written into the working directory.
const OUTPUT_FILE_NAME: &str = "track_dump.json";

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Everything the plotting side needs to draw the track.
#[derive(Serialize)]
struct TrackDump<'a> {
    name: &'a str,
    width_m: f64,
    total_length_m: f64,
    left_m: &'a [Vector2<f64>],
    right_m: &'a [Vector2<f64>],
    centre_m: &'a [Vector2<f64>],
    heading_rad: &'a [f64],
    arc_length_m: &'a [f64],
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    logger_init(LevelFilter::Debug, None).wrap_err("Failed to initialise logging")?;

    info!("Track Dump\n");

    // ---- LOAD TRACK DEFINITION ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected the name of a track definition file (relative to the params dir) \
             as only argument"
        ));
    }

    let def: TrackDef =
        util::params::load(&args[1]).wrap_err("Could not load the track definition")?;

    info!(
        "Loaded track \"{}\": {} segments, {:.1} m wide",
        def.name,
        def.segments.len(),
        def.width_m
    );

    // ---- BUILD MODEL ----

    let track = TrackModel::from_def(&def).wrap_err("Failed to build the track model")?;

    info!(
        "Track model built: {} samples, {:.2} m total length",
        track.num_samples(),
        track.total_length_m()
    );

    // Log a spot check at quarter distance so gross geometry errors show up
    // in the console without opening the plot
    let info = track.get_track_info(track.total_length_m() / 4.0);
    info!(
        "Quarter distance: centre ({:.2}, {:.2}) m, heading {:.3} rad",
        info.centre_m[0], info.centre_m[1], info.heading_rad
    );

    // ---- WRITE DUMP ----

    let dump = TrackDump {
        name: &def.name,
        width_m: track.width_m(),
        total_length_m: track.total_length_m(),
        left_m: track.left_boundary(),
        right_m: track.right_boundary(),
        centre_m: track.centre_line(),
        heading_rad: track.headings(),
        arc_length_m: track.arc_lengths(),
    };

    let json = serde_json::to_string_pretty(&dump).wrap_err("Could not serialise the dump")?;
    std::fs::write(OUTPUT_FILE_NAME, json)
        .wrap_err_with(|| format!("Could not write {}", OUTPUT_FILE_NAME))?;

    info!("Polylines written to {}", OUTPUT_FILE_NAME);

    Ok(())
}
