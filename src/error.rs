use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a regatta dataset. All of them are fatal.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("config file not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: invalid YAML in {}: {}", path.display(), message)]
    Parse { path: PathBuf, message: String },

    #[error("invalid dataset ({} error(s))", .0.len())]
    Invalid(Vec<String>),
}

impl LoadError {
    /// Individual validation messages, if this is a validation failure.
    pub fn messages(&self) -> &[String] {
        match self {
            LoadError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}
