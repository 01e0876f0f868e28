pub mod domain;
pub mod error;
pub mod logs;

pub use domain::*;
pub use error::{Error, Result};
pub use logs::{CapturedLines, LogLevel, LogSink, Logs};
