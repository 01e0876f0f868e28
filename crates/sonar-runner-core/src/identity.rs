use crate::{Error, Result};
use sonar_runner_types::{ProjectIdentity, RunConfiguration, keys};

/// Project reported when no key can be resolved
pub const UNKNOWN_PROJECT: &str = "Unknown";

/// Resolve the project key.
///
/// `sonar.projectKey` is used verbatim when set. Otherwise the key is derived
/// from `sonar.groupId` and `sonar.artifactId`. Without either, resolution
/// fails with the list of missing mandatory properties.
pub fn resolve_identity(config: &RunConfiguration) -> Result<ProjectIdentity> {
    if let Some(key) = config.non_blank(keys::PROJECT_KEY) {
        return Ok(ProjectIdentity::Explicit(key.to_string()));
    }

    match (
        config.non_blank(keys::GROUP_ID),
        config.non_blank(keys::ARTIFACT_ID),
    ) {
        (Some(namespace), Some(name)) => Ok(ProjectIdentity::Derived {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }),
        _ => Err(missing_mandatory(UNKNOWN_PROJECT, &[keys::PROJECT_KEY])),
    }
}

pub fn missing_mandatory(project: &str, missing: &[&str]) -> Error {
    Error::Configuration(format!(
        "You must define the following mandatory properties for '{}': {}",
        project,
        missing.join(", ")
    ))
}
