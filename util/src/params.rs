//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the root of the software repository.
const SW_ROOT_ENV_VAR: &str = "RACETRACK_SW_ROOT";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (RACETRACK_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "racetrack_sw/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    // Get the params dir
    let mut path = get_sw_root()?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(&path)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P>(path: &Path) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    // Load the file into a string
    let params_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e)),
    };

    // Parse the string into the parameter struct
    match toml::from_str(params_str.as_str()) {
        Ok(p) => Ok(p),
        Err(e) => Err(LoadError::DeserialiseError(e)),
    }
}

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, LoadError> {
    match std::env::var_os(SW_ROOT_ENV_VAR) {
        Some(root) => Ok(PathBuf::from(root)),
        None => Err(LoadError::SwRootNotSet),
    }
}
