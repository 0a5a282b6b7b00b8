//! Tracing setup for embedders of crewdeck.
//!
//! The library only emits `tracing` events. Call [`init_logging`] once at
//! startup to get them on stderr.

use std::fmt;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt as layer_fmt, prelude::*, EnvFilter};

/// Target of the timer loops, which log on every start and stop.
const TIMERS_TARGET: &str = "crewdeck::timers";

/// How much crewdeck logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only, such as failed writes.
    Quiet,
    /// Lifecycle and recovered corruption.
    #[default]
    Normal,
    /// Every state mutation; timer loops stay at info.
    Verbose,
    /// Everything, timer loops included.
    Trace,
}

impl Verbosity {
    /// Level for the crate as a whole.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Level for the timer loops.
    #[must_use]
    pub fn timers_level(self) -> Level {
        match self {
            Self::Verbose => Level::INFO,
            other => other.level(),
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directives(self) -> String {
        let level = self.level();
        let timers = self.timers_level();
        if level == timers {
            format!("crewdeck={level}")
        } else {
            format!("crewdeck={level},{TIMERS_TARGET}={timers}")
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quiet => "quiet",
            Self::Normal => "normal",
            Self::Verbose => "verbose",
            Self::Trace => "trace",
        })
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown verbosity: {other}")),
        }
    }
}

/// Install a stderr subscriber filtered by `verbosity`.
///
/// `RUST_LOG` takes precedence when set. A second call is a no-op.
///
/// # Examples
///
/// ```no_run
/// use crewdeck::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        layer_fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // Already installed is fine.
    let _ = subscriber.try_init();
}

/// Subscriber for unit tests: warnings and up, captured per test.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
