pub mod engine;
pub mod error;
pub mod launcher;
pub mod orchestrator;
pub mod platform;
pub mod server;
pub mod stats;

pub use engine::{AnalysisEngine, EngineExit, EngineRequest, ProcessEngine};
pub use error::{Error, Result};
pub use launcher::SessionLauncher;
pub use orchestrator::Orchestrator;
pub use platform::PlatformInfo;
pub use server::{HttpProbe, ServerProbe};
pub use stats::{MemorySample, Stats, StatsHandle, format_time};
