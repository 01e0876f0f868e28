//! TestWorld pattern for declarative integration test setup.
//!
//! Every world owns a temp directory holding a project tree, an empty runner
//! settings file (so the host's configuration never leaks into a test) and
//! any fake engine scripts the test writes.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use sonar_runner_testing::TestWorld;
///
/// let world = TestWorld::new()
///     .with_descriptor("sonar.projectKey=demo\nsonar.sources=src\n")
///     .with_folder("src");
///
/// let result = world.run(&["-D", "sonar.host.url=http://foo"]).unwrap();
/// assert!(!result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    cwd: PathBuf,
    runner_settings: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated environment whose current directory is `<temp>/project`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cwd = temp_dir.path().join("project");
        let runner_settings = temp_dir.path().join("runner.toml");

        std::fs::create_dir_all(&cwd).expect("Failed to create project dir");
        std::fs::write(&runner_settings, "").expect("Failed to create runner settings");

        Self {
            temp_dir,
            cwd,
            runner_settings,
            env_vars: HashMap::new(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn runner_settings(&self) -> &Path {
        &self.runner_settings
    }

    /// Change the current directory (relative to the temp root), creating it if needed.
    pub fn enter_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        let new_cwd = self.temp_dir.path().join(path);
        std::fs::create_dir_all(&new_cwd).expect("Failed to create directory");
        self.cwd = new_cwd;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write `sonar-project.properties` in the current directory.
    pub fn with_descriptor(self, content: &str) -> Self {
        self.write_file("sonar-project.properties", content);
        self
    }

    /// Create a folder relative to the current directory.
    pub fn with_folder(self, relative: &str) -> Self {
        std::fs::create_dir_all(self.cwd.join(relative)).expect("Failed to create folder");
        self
    }

    /// Replace the runner settings file content.
    pub fn with_runner_settings(self, content: &str) -> Self {
        std::fs::write(&self.runner_settings, content).expect("Failed to write runner settings");
        self
    }

    /// Write a file relative to the current directory.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.cwd.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write an executable `sh` script under `<temp>/bin` and return its path.
    ///
    /// `body` is appended after the shebang line.
    #[cfg(unix)]
    pub fn write_engine(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let bin = self.temp_dir.path().join("bin");
        std::fs::create_dir_all(&bin).expect("Failed to create bin dir");
        let path = bin.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write engine");
        let mut permissions = std::fs::metadata(&path)
            .expect("Failed to stat engine")
            .permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).expect("Failed to chmod engine");
        path
    }

    /// Configure a CLI command with this environment's directory, settings and env vars.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("-D").arg(format!(
            "runner.settings={}",
            self.runner_settings.display()
        ));
        cmd.current_dir(&self.cwd);
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run the `sonar-runner` binary with `args` in this environment.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("sonar-runner")
            .map_err(|e| anyhow::anyhow!("Failed to find sonar-runner binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Non-empty stdout lines.
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().filter(|line| !line.is_empty()).collect()
    }

    /// Stdout followed by stderr, as one log.
    pub fn logs(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}
