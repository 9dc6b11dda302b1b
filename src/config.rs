//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{services::NotifierKind, state::Timing};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-timers")]
#[command(about = "A multi-timer pomodoro server with background notifications")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "25250")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Countdown tick interval in milliseconds
    #[arg(long, default_value = "250", value_parser = clap::value_parser!(u64).range(10..=1000))]
    pub tick_ms: u64,

    /// Background notification period in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(100..))]
    pub publish_ms: u64,

    /// Where background notifications are published
    #[arg(short, long, value_enum, default_value_t = NotifierKind::Log)]
    pub notifier: NotifierKind,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Tick and publication periods
    pub fn timing(&self) -> Timing {
        Timing {
            tick: Duration::from_millis(self.tick_ms),
            publish: Duration::from_millis(self.publish_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["pomodoro-timers"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:25250");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.notifier, NotifierKind::Log);
        assert_eq!(config.timing().tick, Duration::from_millis(250));
        assert_eq!(config.timing().publish, Duration::from_secs(1));
    }

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "pomodoro-timers", "-p", "8080", "--tick-ms", "100", "--notifier", "desktop", "-v",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.timing().tick, Duration::from_millis(100));
        assert_eq!(config.notifier, NotifierKind::Desktop);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_tick_outside_range() {
        assert!(Config::try_parse_from(["pomodoro-timers", "--tick-ms", "5000"]).is_err());
    }
}
