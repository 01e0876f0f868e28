use std::fmt;

/// Result type for sonar-runner-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while launching a session
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// The engine process could not be started
    Spawn { command: String, source: std::io::Error },

    /// HTTP client could not be built
    Http(reqwest::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Spawn { command, source } => {
                write!(f, "Unable to start analysis engine '{}': {}", command, source)
            }
            Error::Http(err) => write!(f, "HTTP client error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Spawn { source, .. } => Some(source),
            Error::Http(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}
