use crate::{Error, Result};
use serde::Deserialize;
use sonar_runner_types::RunConfiguration;
use std::collections::BTreeMap;
use std::path::Path;

/// Machine-wide runner settings, shared by every project analysed on this host.
///
/// ```toml
/// [properties]
/// "sonar.host.url" = "https://sonar.example.com"
/// "sonar.runner.engine" = "/opt/analyzer/bin/analyze"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl RunnerConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|err| Error::File {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    pub fn to_configuration(&self) -> RunConfiguration {
        RunConfiguration::from(self.properties.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = RunnerConfig::load_from(&temp_dir.path().join("missing.toml"))?;
        assert!(config.properties.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_properties_table() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[properties]\n\"sonar.host.url\" = \"http://sonar:9000\"\n")?;

        let loaded = RunnerConfig::load_from(&path)?;
        assert_eq!(loaded.properties.len(), 1);
        assert_eq!(
            loaded.to_configuration().get("sonar.host.url"),
            Some("http://sonar:9000")
        );
        Ok(())
    }

    #[test]
    fn test_malformed_file_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[properties\n").unwrap();

        let err = RunnerConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
