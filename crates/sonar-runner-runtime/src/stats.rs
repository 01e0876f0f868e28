//! Run statistics: wall-clock time and peak memory of a session.

use sonar_runner_types::Logs;
use std::fmt;
use std::time::{Duration, Instant};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Render a duration in milliseconds as `H:MM:SS.mmms`, `M:SS.mmms` or `S.mmms`.
///
/// The hour and minute groups appear only when non-zero.
pub fn format_time(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}s", hours, minutes, seconds, millis)
    } else if minutes > 0 {
        format!("{}:{:02}.{:03}s", minutes, seconds, millis)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}

/// Peak resident memory of the runner and of its finished children, in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySample {
    Measured { runner_mb: u64, engine_mb: u64 },
    Unavailable,
}

impl MemorySample {
    #[cfg(unix)]
    pub fn current() -> Self {
        match (peak_rss_bytes(libc::RUSAGE_SELF), peak_rss_bytes(libc::RUSAGE_CHILDREN)) {
            (Some(runner), Some(engine)) => MemorySample::Measured {
                runner_mb: to_megabytes(runner),
                engine_mb: to_megabytes(engine),
            },
            _ => MemorySample::Unavailable,
        }
    }

    #[cfg(not(unix))]
    pub fn current() -> Self {
        MemorySample::Unavailable
    }
}

impl fmt::Display for MemorySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemorySample::Measured {
                runner_mb,
                engine_mb,
            } => write!(f, "{}M runner, {}M engine", runner_mb, engine_mb),
            MemorySample::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[cfg(unix)]
fn peak_rss_bytes(who: libc::c_int) -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage only writes into the provided struct.
    let result = unsafe { libc::getrusage(who, usage.as_mut_ptr()) };
    if result != 0 {
        return None;
    }
    let usage = unsafe { usage.assume_init() };
    let max_rss = u64::try_from(usage.ru_maxrss).ok()?;

    // macOS reports bytes, the other unixes kilobytes.
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

#[cfg(unix)]
fn to_megabytes(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

/// Entry point of the stats collector.
pub struct Stats;

impl Stats {
    pub fn start() -> StatsHandle {
        StatsHandle {
            started: Instant::now(),
        }
    }
}

/// A running measurement. Consumed by [`StatsHandle::stop`], so a session reports once.
#[derive(Debug)]
pub struct StatsHandle {
    started: Instant,
}

impl StatsHandle {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn stop(self, logs: &mut Logs) {
        let elapsed = self.elapsed();
        report(elapsed, MemorySample::current(), logs);
    }
}

fn report(elapsed: Duration, memory: MemorySample, logs: &mut Logs) {
    let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    logs.always(format!("Total time: {}", format_time(ms)));
    logs.always(format!("Final Memory: {}", memory));
}
