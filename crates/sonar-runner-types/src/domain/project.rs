use std::fmt;
use std::path::{Path, PathBuf};

/// How the project key of a session was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectIdentity {
    /// `sonar.projectKey` supplied as a single key
    Explicit(String),

    /// Composite key built from a namespace and a simple name
    Derived { namespace: String, name: String },
}

impl ProjectIdentity {
    /// The key reported to the server
    pub fn key(&self) -> String {
        match self {
            ProjectIdentity::Explicit(key) => key.clone(),
            ProjectIdentity::Derived { namespace, name } => format!("{}:{}", namespace, name),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, ProjectIdentity::Explicit(_))
    }
}

impl fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Where the session keeps its intermediate and output artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectory {
    path: PathBuf,
    origin: WorkingDirectoryOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkingDirectoryOrigin {
    /// Built-in hidden directory under the project base directory
    Default,
    /// Configured through `sonar.working.directory`
    Override,
}

impl WorkingDirectory {
    /// Name of the default working directory under the project base directory
    pub const DEFAULT_NAME: &'static str = ".sonar";

    pub fn default_for(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(Self::DEFAULT_NAME),
            origin: WorkingDirectoryOrigin::Default,
        }
    }

    /// Absolute overrides are kept verbatim, relative ones resolve against `base_dir`.
    pub fn overridden(base_dir: &Path, configured: &Path) -> Self {
        let path = if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            base_dir.join(configured)
        };
        Self {
            path,
            origin: WorkingDirectoryOrigin::Override,
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn is_override(&self) -> bool {
        self.origin == WorkingDirectoryOrigin::Override
    }
}

impl fmt::Display for WorkingDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
