//! Command-line interface definition using clap.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use dotoi_runtime::{SchedulerConfig, SHUTDOWN_TIMEOUT_SECS_ENV, TICK_SECS_ENV};

/// dotoi - headless task engine
#[derive(Parser, Debug)]
#[command(name = "dotoi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Seconds between maintenance checks
    #[arg(long, env = TICK_SECS_ENV)]
    pub tick_secs: Option<u64>,

    /// Seconds shutdown waits for a running check
    #[arg(long, env = SHUTDOWN_TIMEOUT_SECS_ENV)]
    pub shutdown_timeout_secs: Option<u64>,

    /// Seed a few sample tasks at startup
    #[arg(long)]
    pub demo: bool,

    /// How reported events are written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output format for reported events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per event
    Text,
    /// One JSON object per event
    Json,
}

impl Cli {
    /// Get the log filter directive for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "dotoi=info,dotoi_runtime=info,dotoi_events=warn,dotoi_repository=warn",
            1 => "dotoi=debug,dotoi_runtime=debug,dotoi_events=info,dotoi_repository=info",
            2 => "dotoi=trace,dotoi_runtime=trace,dotoi_events=debug,dotoi_repository=debug",
            _ => "trace",
        }
    }

    /// Scheduler configuration with the flags applied over the defaults.
    ///
    /// clap has already folded the environment variables into the flags.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        let mut config = SchedulerConfig::default();
        if let Some(secs) = self.tick_secs {
            config = config.with_period(Duration::from_secs(secs));
        }
        if let Some(secs) = self.shutdown_timeout_secs {
            config = config.with_shutdown_timeout(Duration::from_secs(secs));
        }
        config
    }
}
