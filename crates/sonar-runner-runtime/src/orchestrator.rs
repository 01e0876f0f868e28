use crate::engine::{AnalysisEngine, ProcessEngine};
use crate::launcher::SessionLauncher;
use crate::server::{HttpProbe, ServerProbe};
use crate::stats::Stats;
use crate::Result;
use sonar_runner_core::{ConfigurationResolver, ResolverInput};
use sonar_runner_types::{Logs, RunOutcome};

/// Drives one session: resolve, measure, launch, report.
pub struct Orchestrator<P = HttpProbe, E = ProcessEngine> {
    resolver: ConfigurationResolver,
    launcher: SessionLauncher<P, E>,
}

impl Orchestrator {
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            ConfigurationResolver::new(),
            SessionLauncher::with_defaults()?,
        ))
    }
}

impl<P: ServerProbe, E: AnalysisEngine> Orchestrator<P, E> {
    pub fn new(resolver: ConfigurationResolver, launcher: SessionLauncher<P, E>) -> Self {
        Self { resolver, launcher }
    }

    /// Run a session and return its outcome.
    ///
    /// A configuration that cannot be resolved is reported without statistics.
    /// Once the launch has started, the failure diagnostic (if any) is logged
    /// once at error level and the two statistics lines always follow it.
    pub fn run(&self, input: &ResolverInput, logs: &mut Logs) -> RunOutcome {
        let session = match self.resolver.resolve(input, logs) {
            Ok(session) => session,
            Err(err) => {
                let outcome = RunOutcome::ConfigurationFailure(err.reason());
                report_failure(&outcome, logs);
                return outcome;
            }
        };

        let stats = Stats::start();
        let outcome = self.launcher.launch(&session, logs);
        report_failure(&outcome, logs);
        stats.stop(logs);

        outcome
    }
}

fn report_failure(outcome: &RunOutcome, logs: &mut Logs) {
    if let Some(diagnostic) = outcome.diagnostic() {
        logs.error(diagnostic);
    }
}
