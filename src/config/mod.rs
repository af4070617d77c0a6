mod elapsed;
mod schema;

pub use elapsed::parse_elapsed;
pub use schema::{BoatConfig, Config, EntryConfig, FleetConfig, RaceConfig, SeriesConfig, SkipperConfig};

use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Load a regatta dataset from a YAML file
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: &Path) -> Result<Config, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config(&content).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse a dataset from YAML text.
pub fn parse_config(content: &str) -> Result<Config, String> {
    serde_saphyr::from_str(content).map_err(|e| e.to_string())
}
