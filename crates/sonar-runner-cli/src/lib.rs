mod args;
mod commands;
pub mod console;

pub use args::{Cli, LogLevelArg};
pub use commands::{build_input, run};
