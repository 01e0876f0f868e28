use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known property names read by the runner itself.
pub mod keys {
    pub const HOST_URL: &str = "sonar.host.url";
    pub const PROJECT_KEY: &str = "sonar.projectKey";
    pub const PROJECT_NAME: &str = "sonar.projectName";
    pub const GROUP_ID: &str = "sonar.groupId";
    pub const ARTIFACT_ID: &str = "sonar.artifactId";
    pub const PROJECT_BASE_DIR: &str = "sonar.projectBaseDir";
    pub const WORKING_DIRECTORY: &str = "sonar.working.directory";
    pub const SOURCE_ENCODING: &str = "sonar.sourceEncoding";
    pub const SOURCES: &str = "sonar.sources";
    pub const TESTS: &str = "sonar.tests";
    pub const BINARIES: &str = "sonar.binaries";
    pub const LIBRARIES: &str = "sonar.libraries";
    pub const VERBOSE: &str = "sonar.verbose";
    pub const LOG_LEVEL: &str = "sonar.log.level";
    pub const ENGINE: &str = "sonar.runner.engine";
    pub const PROJECT_SETTINGS: &str = "project.settings";
    pub const RUNNER_SETTINGS: &str = "runner.settings";
}

/// Ordered property mapping handed to the analysis engine.
///
/// Keys are kept sorted so that rendering the configuration is deterministic.
/// Layers are applied with [`RunConfiguration::layer`]: every key of the upper
/// layer replaces the same key of the lower one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunConfiguration(BTreeMap<String, String>);

impl RunConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value of `key` when present and not blank.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Shadow this configuration with every entry of `upper`.
    pub fn layer(&mut self, upper: &RunConfiguration) {
        for (key, value) in &upper.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Split a comma-separated property into trimmed, non-empty entries.
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_true(&self, key: &str) -> bool {
        self.non_blank(key)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RunConfiguration
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for RunConfiguration {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_replaces_same_keys_only() {
        let mut base: RunConfiguration =
            [("sonar.host.url", "http://localhost:9000"), ("a", "1")]
                .into_iter()
                .collect();
        let upper: RunConfiguration = [("sonar.host.url", "http://sonar:9000"), ("b", "2")]
            .into_iter()
            .collect();

        base.layer(&upper);

        assert_eq!(base.get("sonar.host.url"), Some("http://sonar:9000"));
        assert_eq!(base.get("a"), Some("1"));
        assert_eq!(base.get("b"), Some("2"));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_list_skips_blank_entries() {
        let config: RunConfiguration = [("sonar.sources", " src , ,gen/java,")]
            .into_iter()
            .collect();
        assert_eq!(config.list("sonar.sources"), vec!["src", "gen/java"]);
        assert!(config.list("sonar.tests").is_empty());
    }

    #[test]
    fn test_non_blank_and_is_true() {
        let config: RunConfiguration = [("sonar.sourceEncoding", "  "), ("sonar.verbose", "TRUE")]
            .into_iter()
            .collect();
        assert_eq!(config.non_blank("sonar.sourceEncoding"), None);
        assert!(config.is_true("sonar.verbose"));
        assert!(!config.is_true("missing"));
    }

    #[test]
    fn test_keys_are_sorted() {
        let config: RunConfiguration = [("z", "1"), ("a", "2"), ("m", "3")].into_iter().collect();
        let keys: Vec<_> = config.keys().collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }
}
