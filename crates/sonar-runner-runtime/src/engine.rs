//! The analysis engine as an external child process.
//!
//! The engine is a shell command line. It reads the resolved configuration
//! from the properties file named by `SONAR_RUNNER_PROPERTIES` and reports
//! through its exit status and output. Both output streams are read on
//! dedicated threads and forwarded line by line to the caller's log stream.

use crate::{Error, Result};
use sonar_runner_types::{Logs, ServerUrl};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{Sender, channel};
use std::thread::JoinHandle;

pub const ENV_PROPERTIES: &str = "SONAR_RUNNER_PROPERTIES";
pub const ENV_HOST_URL: &str = "SONAR_HOST_URL";
pub const ENV_PROJECT_KEY: &str = "SONAR_PROJECT_KEY";
pub const ENV_WORKING_DIRECTORY: &str = "SONAR_WORKING_DIRECTORY";

/// Everything an engine invocation needs.
#[derive(Debug, Clone, Copy)]
pub struct EngineRequest<'a> {
    pub command: &'a str,
    pub base_dir: &'a Path,
    pub properties_file: &'a Path,
    pub server_url: &'a ServerUrl,
    pub project_key: &'a str,
    pub working_directory: &'a Path,
}

/// How the engine finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineExit {
    Success,
    Failed {
        /// Exit status as reported by the platform
        status: String,
        /// Last non-empty line the engine wrote to stderr
        last_error: Option<String>,
    },
}

pub trait AnalysisEngine {
    /// Run the engine to completion, forwarding its output to `logs`.
    fn run(&self, request: &EngineRequest<'_>, logs: &mut Logs) -> Result<EngineExit>;
}

/// Runs the engine command through the platform shell.
#[derive(Debug, Clone, Default)]
pub struct ProcessEngine;

impl ProcessEngine {
    pub fn new() -> Self {
        Self
    }

    fn command(request: &EngineRequest<'_>) -> Command {
        let mut cmd = shell_command(request.command);
        cmd.current_dir(request.base_dir)
            .env(ENV_PROPERTIES, request.properties_file)
            .env(ENV_HOST_URL, request.server_url.as_str())
            .env(ENV_PROJECT_KEY, request.project_key)
            .env(ENV_WORKING_DIRECTORY, request.working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

enum Output {
    Stdout(String),
    Stderr(String),
}

impl AnalysisEngine for ProcessEngine {
    fn run(&self, request: &EngineRequest<'_>, logs: &mut Logs) -> Result<EngineExit> {
        logs.debug(format!("Starting analysis engine: {}", request.command));

        let mut child = Self::command(request).spawn().map_err(|source| Error::Spawn {
            command: request.command.to_string(),
            source,
        })?;

        let (tx, rx) = channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader("engine-stdout", stdout, tx.clone(), Output::Stdout)?);
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader("engine-stderr", stderr, tx.clone(), Output::Stderr)?);
        }
        drop(tx);

        let mut last_error = None;
        for output in rx {
            match output {
                Output::Stdout(line) => logs.passthrough(&line),
                Output::Stderr(line) => {
                    if !line.trim().is_empty() {
                        last_error = Some(line.clone());
                    }
                    logs.passthrough(&line);
                }
            }
        }

        for reader in readers {
            join_reader(reader, logs);
        }

        let status = child.wait()?;
        logs.debug(format!("Analysis engine finished: {}", status));

        if status.success() {
            Ok(EngineExit::Success)
        } else {
            Ok(EngineExit::Failed {
                status: status.to_string(),
                last_error,
            })
        }
    }
}

fn spawn_reader<R>(
    name: &str,
    stream: R,
    tx: Sender<Output>,
    wrap: fn(String) -> Output,
) -> Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let handle = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let reader = BufReader::new(stream);
            for line in reader.split(b'\n') {
                let Ok(bytes) = line else { break };
                let text = String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\r')
                    .to_string();
                if tx.send(wrap(text)).is_err() {
                    break;
                }
            }
        })?;
    Ok(handle)
}

/// Wait for a reader thread; a panicked reader means engine output was lost.
fn join_reader(handle: JoinHandle<()>, logs: &mut Logs) {
    let name = handle.thread().name().unwrap_or("engine-reader").to_string();
    if handle.join().is_err() {
        logs.warn(format!(
            "Engine output reader '{}' stopped unexpectedly, output may be incomplete",
            name
        ));
    }
}

#[cfg(test)]
mod reader_tests {
    use super::*;
    use sonar_runner_types::CapturedLines;

    #[test]
    fn test_panicked_reader_is_reported() {
        let captured = CapturedLines::new();
        let handle = std::thread::Builder::new()
            .name("engine-stderr".to_string())
            .spawn(|| panic!("reader failed"))
            .unwrap();

        join_reader(handle, &mut captured.logs());

        assert_eq!(
            captured.lines(),
            vec!["WARN: Engine output reader 'engine-stderr' stopped unexpectedly, output may be incomplete"]
        );
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use sonar_runner_types::CapturedLines;
    use tempfile::TempDir;

    fn request<'a>(command: &'a str, dir: &'a TempDir, url: &'a ServerUrl) -> EngineRequest<'a> {
        EngineRequest {
            command,
            base_dir: dir.path(),
            properties_file: Path::new("/tmp/analysis.properties"),
            server_url: url,
            project_key: "java:sample",
            working_directory: dir.path(),
        }
    }

    #[test]
    fn test_success_forwards_output_verbatim() {
        let dir = TempDir::new().unwrap();
        let url = ServerUrl::parse("http://localhost:9000").unwrap();
        let captured = CapturedLines::new();
        let mut logs = captured.logs();

        let exit = ProcessEngine::new()
            .run(
                &request("echo 'engine says hi'; echo \"$SONAR_PROJECT_KEY\"", &dir, &url),
                &mut logs,
            )
            .unwrap();

        assert_eq!(exit, EngineExit::Success);
        assert!(captured.lines().contains(&"engine says hi".to_string()));
        assert!(captured.lines().contains(&"java:sample".to_string()));
    }

    #[test]
    fn test_environment_and_current_dir() {
        let dir = TempDir::new().unwrap();
        let url = ServerUrl::parse("http://foo/").unwrap();
        let captured = CapturedLines::new();
        let mut logs = captured.logs();

        ProcessEngine::new()
            .run(
                &request(
                    "echo \"url=$SONAR_HOST_URL props=$SONAR_RUNNER_PROPERTIES\"; pwd > cwd.txt",
                    &dir,
                    &url,
                ),
                &mut logs,
            )
            .unwrap();

        assert!(captured.contains("url=http://foo props=/tmp/analysis.properties"));
        let cwd = std::fs::read_to_string(dir.path().join("cwd.txt")).unwrap();
        assert_eq!(
            std::fs::canonicalize(cwd.trim()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn test_failure_keeps_last_stderr_line() {
        let dir = TempDir::new().unwrap();
        let url = ServerUrl::parse("http://localhost:9000").unwrap();
        let mut logs = CapturedLines::new().logs();

        let exit = ProcessEngine::new()
            .run(
                &request(
                    "echo 'first problem' >&2; echo 'Unable to parse Hello.java' >&2; echo '' >&2; exit 4",
                    &dir,
                    &url,
                ),
                &mut logs,
            )
            .unwrap();

        match exit {
            EngineExit::Failed { last_error, .. } => {
                assert_eq!(last_error.as_deref(), Some("Unable to parse Hello.java"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_silent_failure_has_no_message() {
        let dir = TempDir::new().unwrap();
        let url = ServerUrl::parse("http://localhost:9000").unwrap();
        let mut logs = CapturedLines::new().logs();

        let exit = ProcessEngine::new()
            .run(&request("exit 3", &dir, &url), &mut logs)
            .unwrap();

        assert!(matches!(exit, EngineExit::Failed { last_error: None, .. }));
    }
}
