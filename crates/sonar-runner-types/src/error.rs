use std::fmt;

/// Result type for sonar-runner-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// Server URL could not be used as a base URL
    InvalidServerUrl(String),

    /// Log level name not recognized
    InvalidLogLevel(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidServerUrl(url) => write!(f, "Invalid server URL: '{}'", url),
            Error::InvalidLogLevel(level) => write!(f, "Unknown log level: '{}'", level),
        }
    }
}

impl std::error::Error for Error {}
