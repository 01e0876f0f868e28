use clap::{ArgAction, Parser, ValueEnum};
use sonar_runner_types::LogLevel;
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sonar-runner")]
#[command(about = "Analyze the project in the current directory and report to the analysis server", long_about = None)]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    /// Define a property, e.g. -D sonar.host.url=http://localhost:9000
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub define: Vec<(String, String)>,

    /// Produce execution debug output
    #[arg(short = 'X', long)]
    pub debug: bool,

    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Analysis engine command line (sets sonar.runner.engine)
    #[arg(long, value_name = "COMMAND")]
    pub engine: Option<String>,

    /// Project base directory (sets sonar.projectBaseDir)
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
}

impl fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", LogLevel::from(*self))
    }
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
        }
    }
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got '{}'", raw));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing property name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
