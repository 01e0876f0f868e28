use std::fmt;
use std::path::PathBuf;

/// Result type for sonar-runner-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while resolving a session configuration
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// A configuration file could not be read or parsed
    File { path: PathBuf, reason: String },

    /// The configuration cannot be used for an analysis
    Configuration(String),
}

impl Error {
    /// The single line shown to the user for this failure
    pub fn reason(&self) -> String {
        match self {
            Error::Configuration(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::File { path, reason } => {
                write!(f, "Unable to load '{}': {}", path.display(), reason)
            }
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::File { .. } | Error::Configuration(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<sonar_runner_types::Error> for Error {
    fn from(err: sonar_runner_types::Error) -> Self {
        Error::Configuration(err.to_string())
    }
}
