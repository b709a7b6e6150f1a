use std::{fmt, str::FromStr};

use clap::ArgMatches;
use stderrlog::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    // Verbosity as understood by stderrlog (0 = errors only)
    pub fn get_level(&self) -> usize {
        match self {
            Self::None | Self::Error => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        }
    }
}

const LOG_LEVEL_STR: [&str; 6] = ["none", "error", "warn", "info", "debug", "trace"];

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Unknown log level '{}' (expected one of {})",
                s,
                LOG_LEVEL_STR.join(", ")
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", LOG_LEVEL_STR[*self as usize])
    }
}

/// Set up stderr logging from the common logging options (see `cli::add_log_args`)
pub fn init_log(m: &ArgMatches) -> LogLevel {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel::Info);

    let quiet = verbose.is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<Timestamp>("timestamp")
        .copied()
        .unwrap_or(Timestamp::Off);

    // A logger may already be installed (e.g. when called twice from tests); that is not fatal
    if let Err(e) = stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.get_level())
        .timestamp(ts)
        .init()
    {
        eprintln!("Could not initialize logging: {}", e)
    }
    verbose
}

/// Split a comma separated option value into trimmed, non-empty items
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parse() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(" warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Trace.get_level(), 4);
    }

    #[test]
    fn split_list_skips_empty() {
        assert_eq!(
            split_list(" missense_variant,,stop_gained ,"),
            vec!["missense_variant", "stop_gained"]
        );
        assert!(split_list(" , ").is_empty());
    }
}
