use crate::args::Cli;
use crate::console::ConsoleSink;
use anyhow::{Context, Result};
use sonar_runner_core::ResolverInput;
use sonar_runner_runtime::Orchestrator;
use sonar_runner_types::{LogLevel, Logs, keys};
use std::path::PathBuf;

/// Run one analysis session and return the process exit status.
pub fn run(cli: Cli) -> Result<i32> {
    let current_dir = std::env::current_dir().context("Unable to read the current directory")?;
    let input = build_input(&cli, current_dir);

    let mut logs = Logs::new(ConsoleSink::detect()).with_level(initial_level(&cli));

    // The engine shares our process group and receives the interrupt itself;
    // staying alive lets the run finish reporting once it exits.
    ctrlc::set_handler(|| {}).context("Unable to install the interrupt handler")?;

    logs.info(format!("sonar-runner {}", env!("CARGO_PKG_VERSION")));
    logs.info(format!(
        "{} {} ({} cpus)",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::thread::available_parallelism().map_or(1, |n| n.get())
    ));
    if cli.debug {
        logs.info("Debug mode is on");
    }

    let orchestrator = Orchestrator::with_defaults()?;
    let outcome = orchestrator.run(&input, &mut logs);

    Ok(outcome.exit_code())
}

/// Turn the command line into resolver input. Shorthand flags win over `-D`.
pub fn build_input(cli: &Cli, current_dir: PathBuf) -> ResolverInput {
    let mut input = ResolverInput::new(current_dir);

    for (key, value) in &cli.define {
        input.overrides.insert(key.as_str(), value.as_str());
    }
    if let Some(level) = cli.log_level {
        input.overrides.insert(keys::LOG_LEVEL, level.to_string());
    }
    if cli.debug {
        input.overrides.insert(keys::VERBOSE, "true");
    }
    if let Some(engine) = &cli.engine {
        input.overrides.insert(keys::ENGINE, engine.as_str());
    }
    if let Some(dir) = &cli.project_dir {
        input
            .overrides
            .insert(keys::PROJECT_BASE_DIR, dir.to_string_lossy());
    }

    input
}

fn initial_level(cli: &Cli) -> LogLevel {
    if cli.debug {
        LogLevel::Debug
    } else {
        cli.log_level.map(LogLevel::from).unwrap_or(LogLevel::Info)
    }
}
