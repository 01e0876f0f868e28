use crate::engine::{AnalysisEngine, EngineExit, EngineRequest, ProcessEngine};
use crate::platform::PlatformInfo;
use crate::server::{HttpProbe, ServerProbe};
use crate::Result;
use sonar_runner_core::{ResolvedSession, properties};
use sonar_runner_types::{Logs, RunOutcome};

/// Name of the file the resolved configuration is handed over in
pub const PROPERTIES_FILE: &str = "analysis.properties";

/// Runs one analysis against a resolved session and classifies the result.
pub struct SessionLauncher<P = HttpProbe, E = ProcessEngine> {
    probe: P,
    engine: E,
    platform: PlatformInfo,
}

impl SessionLauncher {
    /// Launcher with the HTTP probe, the process engine and the detected platform.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            HttpProbe::new()?,
            ProcessEngine::new(),
            PlatformInfo::detect(),
        ))
    }
}

impl<P: ServerProbe, E: AnalysisEngine> SessionLauncher<P, E> {
    pub fn new(probe: P, engine: E, platform: PlatformInfo) -> Self {
        Self {
            probe,
            engine,
            platform,
        }
    }

    /// Run the analysis. Failures are returned, never logged here.
    pub fn launch(&self, session: &ResolvedSession, logs: &mut Logs) -> RunOutcome {
        let configuration = session.configuration();
        let server_url = session.server_url();

        self.platform.log_notice(configuration, logs);

        if !self.probe.is_reachable(server_url) {
            return RunOutcome::ConnectivityFailure(server_url.clone());
        }
        logs.debug(format!("Server {} is reachable", server_url));

        let working_directory = session.working_directory().as_path();
        if let Err(err) = std::fs::create_dir_all(working_directory) {
            return RunOutcome::ConfigurationFailure(format!(
                "Unable to create working directory '{}': {}",
                working_directory.display(),
                err
            ));
        }

        let properties_file = working_directory.join(PROPERTIES_FILE);
        if let Err(err) = properties::write(&properties_file, configuration) {
            return RunOutcome::ConfigurationFailure(err.reason());
        }
        logs.debug(format!(
            "Analysis properties written to {}",
            properties_file.display()
        ));

        let project_key = session.project_key();
        let request = EngineRequest {
            command: session.engine(),
            base_dir: session.base_dir(),
            properties_file: &properties_file,
            server_url,
            project_key: &project_key,
            working_directory,
        };

        match self.engine.run(&request, logs) {
            Ok(EngineExit::Success) => RunOutcome::Success,
            Ok(EngineExit::Failed { status, last_error }) => {
                // The engine may have failed because the server went away mid-run.
                if !self.probe.is_reachable(server_url) {
                    return RunOutcome::ConnectivityFailure(server_url.clone());
                }
                RunOutcome::AnalysisFailure(
                    last_error.unwrap_or_else(|| format!("Analysis engine exited with {}", status)),
                )
            }
            Err(err) => RunOutcome::AnalysisFailure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_runner_core::{ConfigurationResolver, ResolverInput};
    use sonar_runner_types::{CapturedLines, ServerUrl};
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Answers from a script of reachability results; the last one repeats.
    struct ScriptedProbe {
        answers: RefCell<Vec<bool>>,
        calls: Cell<usize>,
    }

    impl ScriptedProbe {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: RefCell::new(answers.to_vec()),
                calls: Cell::new(0),
            }
        }
    }

    impl ServerProbe for ScriptedProbe {
        fn is_reachable(&self, _url: &ServerUrl) -> bool {
            self.calls.set(self.calls.get() + 1);
            let mut answers = self.answers.borrow_mut();
            if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers.first().copied().unwrap_or(true)
            }
        }
    }

    struct RecordingEngine {
        exit: EngineExit,
        seen: RefCell<Vec<(String, PathBuf)>>,
    }

    impl RecordingEngine {
        fn exiting(exit: EngineExit) -> Self {
            Self {
                exit,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl AnalysisEngine for RecordingEngine {
        fn run(&self, request: &EngineRequest<'_>, logs: &mut Logs) -> Result<EngineExit> {
            logs.passthrough("engine output");
            self.seen.borrow_mut().push((
                request.command.to_string(),
                request.properties_file.to_path_buf(),
            ));
            Ok(self.exit.clone())
        }
    }

    fn session(dir: &TempDir, extra: &[(&str, &str)]) -> ResolvedSession {
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let runner = dir.path().join("runner.toml");
        std::fs::write(&runner, "").unwrap();
        let mut input = ResolverInput::new(dir.path())
            .with_property("runner.settings", runner.to_string_lossy())
            .with_property("sonar.projectKey", "demo")
            .with_property("sonar.sources", "src")
            .with_property("sonar.host.url", "http://foo/");
        for (key, value) in extra {
            input = input.with_property(*key, *value);
        }
        ConfigurationResolver::new()
            .resolve(&input, &mut CapturedLines::new().logs())
            .unwrap()
    }

    fn launcher(
        probe: ScriptedProbe,
        engine: RecordingEngine,
    ) -> SessionLauncher<ScriptedProbe, RecordingEngine> {
        SessionLauncher::new(probe, engine, PlatformInfo::new("en_US", "UTF-8"))
    }

    #[test]
    fn test_unreachable_server_stops_before_working_directory() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, &[("sonar.runner.engine", "analyze")]);
        let launcher = launcher(
            ScriptedProbe::new(&[false]),
            RecordingEngine::exiting(EngineExit::Success),
        );
        let captured = CapturedLines::new();

        let outcome = launcher.launch(&session, &mut captured.logs());

        assert_eq!(
            outcome.diagnostic().as_deref(),
            Some("Sonar server 'http://foo' can not be reached")
        );
        assert!(!dir.path().join(".sonar").exists());
        assert!(launcher.engine.seen.borrow().is_empty());
        assert!(captured.contains("(analysis is platform dependent)"));
    }

    #[test]
    fn test_success_hands_properties_to_engine() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, &[("sonar.runner.engine", "analyze --fast")]);
        let launcher = launcher(
            ScriptedProbe::new(&[true]),
            RecordingEngine::exiting(EngineExit::Success),
        );

        let outcome = launcher.launch(&session, &mut CapturedLines::new().logs());

        assert_eq!(outcome, RunOutcome::Success);
        let expected_file = dir.path().join(".sonar").join(PROPERTIES_FILE);
        assert_eq!(
            launcher.engine.seen.borrow().as_slice(),
            &[("analyze --fast".to_string(), expected_file.clone())]
        );
        let handed = properties::load(&expected_file).unwrap();
        assert_eq!(handed, *session.configuration());
    }

    #[test]
    fn test_override_working_directory_is_created_instead_of_default() {
        let dir = TempDir::new().unwrap();
        let session = session(
            &dir,
            &[
                ("sonar.runner.engine", "analyze"),
                ("sonar.working.directory", ".overridden-relative-sonar"),
            ],
        );
        let launcher = launcher(
            ScriptedProbe::new(&[true]),
            RecordingEngine::exiting(EngineExit::Success),
        );

        launcher.launch(&session, &mut CapturedLines::new().logs());

        assert!(dir.path().join(".overridden-relative-sonar").is_dir());
        assert!(!dir.path().join(".sonar").exists());
    }

    #[test]
    fn test_engine_failure_reports_engine_message() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, &[("sonar.runner.engine", "analyze")]);
        let launcher = launcher(
            ScriptedProbe::new(&[true]),
            RecordingEngine::exiting(EngineExit::Failed {
                status: "exit status: 1".into(),
                last_error: Some("Unable to parse Hello.java".into()),
            }),
        );

        let outcome = launcher.launch(&session, &mut CapturedLines::new().logs());

        assert_eq!(
            outcome,
            RunOutcome::AnalysisFailure("Unable to parse Hello.java".into())
        );
        assert_eq!(launcher.probe.calls.get(), 2);
    }

    #[test]
    fn test_engine_failure_without_message_names_status() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, &[("sonar.runner.engine", "analyze")]);
        let launcher = launcher(
            ScriptedProbe::new(&[true]),
            RecordingEngine::exiting(EngineExit::Failed {
                status: "exit status: 7".into(),
                last_error: None,
            }),
        );

        let outcome = launcher.launch(&session, &mut CapturedLines::new().logs());

        assert_eq!(
            outcome,
            RunOutcome::AnalysisFailure("Analysis engine exited with exit status: 7".into())
        );
    }

    #[test]
    fn test_server_lost_during_analysis_is_connectivity_failure() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, &[("sonar.runner.engine", "analyze")]);
        let launcher = launcher(
            ScriptedProbe::new(&[true, false]),
            RecordingEngine::exiting(EngineExit::Failed {
                status: "exit status: 1".into(),
                last_error: Some("Connection refused".into()),
            }),
        );

        let outcome = launcher.launch(&session, &mut CapturedLines::new().logs());

        assert!(matches!(outcome, RunOutcome::ConnectivityFailure(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_rendered_properties_file() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, &[("sonar.runner.engine", "analyze")]);
        let launcher = launcher(
            ScriptedProbe::new(&[true]),
            RecordingEngine::exiting(EngineExit::Success),
        );

        launcher.launch(&session, &mut CapturedLines::new().logs());

        let rendered = std::fs::read_to_string(dir.path().join(".sonar").join(PROPERTIES_FILE))
            .unwrap()
            .replace(&dir.path().to_string_lossy().to_string(), "<base>");
        insta::assert_snapshot!(rendered, @r"
        # Generated by sonar-runner, do not edit
        runner.settings=<base>/runner.toml
        sonar.host.url=http://foo
        sonar.projectBaseDir=<base>
        sonar.projectKey=demo
        sonar.projectName=demo
        sonar.runner.engine=analyze
        sonar.sources=src
        sonar.working.directory=<base>/.sonar
        ");
    }
}
