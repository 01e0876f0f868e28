use crate::deprecation::translate_deprecated;
use crate::identity::{missing_mandatory, resolve_identity};
use crate::paths::{PROJECT_SETTINGS_FILE, resolve_against, resolve_runner_settings};
use crate::runner_config::RunnerConfig;
use crate::validation::validate_project_layout;
use crate::{Error, Result, properties};
use sonar_runner_types::{
    LogLevel, Logs, ProjectIdentity, RunConfiguration, ServerUrl, WorkingDirectory, keys,
};
use std::path::{Path, PathBuf};

/// Server used when no configuration layer names one
pub const DEFAULT_HOST_URL: &str = "http://localhost:9000";

/// Raw inputs of one invocation.
#[derive(Debug, Clone)]
pub struct ResolverInput {
    /// Directory the runner was started from
    pub current_dir: PathBuf,

    /// Explicit properties (`-D key=value` and CLI shorthands)
    pub overrides: RunConfiguration,
}

impl ResolverInput {
    pub fn new(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: current_dir.into(),
            overrides: RunConfiguration::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key, value);
        self
    }
}

/// Everything the launcher needs, fixed once resolution succeeds.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    configuration: RunConfiguration,
    base_dir: PathBuf,
    working_directory: WorkingDirectory,
    identity: ProjectIdentity,
    server_url: ServerUrl,
    engine: String,
    project_file: Option<PathBuf>,
    runner_file: Option<PathBuf>,
}

impl ResolvedSession {
    pub fn configuration(&self) -> &RunConfiguration {
        &self.configuration
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn working_directory(&self) -> &WorkingDirectory {
        &self.working_directory
    }

    pub fn identity(&self) -> &ProjectIdentity {
        &self.identity
    }

    pub fn project_key(&self) -> String {
        self.identity.key()
    }

    pub fn server_url(&self) -> &ServerUrl {
        &self.server_url
    }

    /// Command line of the analysis engine
    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn project_file(&self) -> Option<&Path> {
        self.project_file.as_deref()
    }

    pub fn runner_file(&self) -> Option<&Path> {
        self.runner_file.as_deref()
    }
}

/// Merges defaults, runner settings, the project file and explicit overrides.
#[derive(Debug, Clone)]
pub struct ConfigurationResolver {
    defaults: RunConfiguration,
}

impl Default for ConfigurationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationResolver {
    pub fn new() -> Self {
        let mut defaults = RunConfiguration::new();
        defaults.insert(keys::HOST_URL, DEFAULT_HOST_URL);
        Self { defaults }
    }

    pub fn resolve(&self, input: &ResolverInput, logs: &mut Logs) -> Result<ResolvedSession> {
        let (runner_file, runner) = load_runner_settings(input)?;

        // Runner settings and overrides decide where the project lives.
        let mut outer = runner.to_configuration();
        outer.layer(&input.overrides);

        let base_dir = resolve_base_dir(&input.current_dir, &outer)?;
        let project_file = locate_project_file(&base_dir, &outer)?;

        let mut configuration = self.defaults.clone();
        configuration.layer(&runner.to_configuration());
        if let Some(path) = &project_file {
            configuration.layer(&properties::load(path)?);
        }
        configuration.layer(&input.overrides);

        apply_log_level(&configuration, logs);
        logs.info(format!(
            "Runner configuration file: {}",
            display_or_none(runner_file.as_deref())
        ));
        logs.info(format!(
            "Project configuration file: {}",
            display_or_none(project_file.as_deref())
        ));

        translate_deprecated(&mut configuration, logs);

        let identity = resolve_identity(&configuration)?;
        let project_key = identity.key();
        configuration.insert(keys::PROJECT_KEY, project_key.clone());
        if configuration.non_blank(keys::PROJECT_NAME).is_none() {
            configuration.insert(keys::PROJECT_NAME, project_key.clone());
        }

        let working_directory = resolve_working_directory(&base_dir, &configuration)?;
        validate_project_layout(&configuration, &base_dir, &project_key)?;
        let engine = configuration
            .non_blank(keys::ENGINE)
            .map(str::to_string)
            .ok_or_else(|| missing_mandatory(&project_key, &[keys::ENGINE]))?;

        let raw_url = configuration.get(keys::HOST_URL).unwrap_or(DEFAULT_HOST_URL);
        let server_url = ServerUrl::parse(raw_url)?;

        configuration.insert(keys::HOST_URL, server_url.as_str());
        configuration.insert(keys::PROJECT_BASE_DIR, base_dir.to_string_lossy());
        configuration.insert(
            keys::WORKING_DIRECTORY,
            working_directory.as_path().to_string_lossy(),
        );

        logs.debug(format!("Project key: {}", project_key));
        logs.debug(format!("Base directory: {}", base_dir.display()));
        if working_directory.is_override() {
            logs.debug(format!("Working directory (overridden): {}", working_directory));
        } else {
            logs.debug(format!("Working directory: {}", working_directory));
        }
        logs.debug(format!("Server: {}", server_url));

        Ok(ResolvedSession {
            configuration,
            base_dir,
            working_directory,
            identity,
            server_url,
            engine,
            project_file,
            runner_file,
        })
    }
}

fn load_runner_settings(input: &ResolverInput) -> Result<(Option<PathBuf>, RunnerConfig)> {
    let explicit = input.overrides.non_blank(keys::RUNNER_SETTINGS);
    let (path, is_explicit) = resolve_runner_settings(explicit, &input.current_dir)?;

    if !path.is_file() {
        if is_explicit {
            return Err(Error::Configuration(format!(
                "Runner configuration file does not exist: {}",
                path.display()
            )));
        }
        return Ok((None, RunnerConfig::default()));
    }

    let config = RunnerConfig::load_from(&path)?;
    Ok((Some(path), config))
}

fn resolve_base_dir(current_dir: &Path, outer: &RunConfiguration) -> Result<PathBuf> {
    let Some(configured) = outer.non_blank(keys::PROJECT_BASE_DIR) else {
        return Ok(current_dir.to_path_buf());
    };

    let base_dir = resolve_against(current_dir, configured);
    if !base_dir.is_dir() {
        return Err(Error::Configuration(format!(
            "Project home must be an existing directory: {}",
            base_dir.display()
        )));
    }
    Ok(base_dir)
}

fn locate_project_file(base_dir: &Path, outer: &RunConfiguration) -> Result<Option<PathBuf>> {
    if let Some(configured) = outer.non_blank(keys::PROJECT_SETTINGS) {
        let path = resolve_against(base_dir, configured);
        if !path.is_file() {
            return Err(Error::Configuration(format!(
                "Project configuration file does not exist: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    let default = base_dir.join(PROJECT_SETTINGS_FILE);
    Ok(default.is_file().then_some(default))
}

fn resolve_working_directory(
    base_dir: &Path,
    configuration: &RunConfiguration,
) -> Result<WorkingDirectory> {
    match configuration.get(keys::WORKING_DIRECTORY) {
        None => Ok(WorkingDirectory::default_for(base_dir)),
        Some(raw) if raw.trim().is_empty() => Err(Error::Configuration(format!(
            "Invalid working directory: '{}'",
            raw
        ))),
        Some(raw) => Ok(WorkingDirectory::overridden(
            base_dir,
            &resolve_against(base_dir, raw),
        )),
    }
}

fn apply_log_level(configuration: &RunConfiguration, logs: &mut Logs) {
    if configuration.is_true(keys::VERBOSE) {
        logs.set_level(LogLevel::Debug);
        return;
    }

    if let Some(raw) = configuration.non_blank(keys::LOG_LEVEL) {
        match raw.parse::<LogLevel>() {
            Ok(level) => logs.set_level(level),
            Err(err) => logs.warn(err.to_string()),
        }
    }
}

fn display_or_none(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "NONE".to_string())
}
