use crate::ServerUrl;
use std::fmt;

/// Terminal classification of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,

    /// The engine reported a failure; the message is its own diagnostic
    AnalysisFailure(String),

    /// The analysis server could not be reached
    ConnectivityFailure(ServerUrl),

    /// The project or runner configuration is unusable
    ConfigurationFailure(String),
}

impl RunOutcome {
    /// Process exit status for this outcome. Only zero vs. non-zero is stable.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Success => 0,
            RunOutcome::AnalysisFailure(_) => 1,
            RunOutcome::ConfigurationFailure(_) => 2,
            RunOutcome::ConnectivityFailure(_) => 3,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    /// The single diagnostic line reported for a failure.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            RunOutcome::Success => None,
            RunOutcome::AnalysisFailure(message) => Some(message.clone()),
            RunOutcome::ConnectivityFailure(url) => {
                Some(format!("Sonar server '{}' can not be reached", url))
            }
            RunOutcome::ConfigurationFailure(reason) => Some(reason.clone()),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diagnostic() {
            None => write!(f, "success"),
            Some(message) => write!(f, "{}", message),
        }
    }
}
