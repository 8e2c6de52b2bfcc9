use std::path::PathBuf;

use crate::error::Result;
use crate::map_output_tracker::MapOutputTracker;
use crate::shuffle::ShuffleManager;
use clap::{value_t, App, Arg, ArgMatches};
use log::LevelFilter;
use once_cell::sync::OnceCell;

static CONF: OnceCell<Configuration> = OnceCell::new();

/// Shuffle state owned by a single context.
#[derive(Debug, Default)]
pub(crate) struct Env {
    pub map_output_tracker: MapOutputTracker,
    pub shuffle_manager: ShuffleManager,
}

impl Env {
    pub fn new() -> Self {
        Env {
            map_output_tracker: MapOutputTracker::new(),
            shuffle_manager: ShuffleManager::new(),
        }
    }
}

mod config_vars {
    pub(super) const LOG_LEVEL: &str = "BACKRANK_LOG_LEVEL";
    pub(super) const LOG_DIR: &str = "BACKRANK_LOG_DIR";
    pub(super) const NUM_THREADS: &str = "BACKRANK_NUM_THREADS";
    pub(super) const DEFAULT_PARTITIONS: &str = "BACKRANK_DEFAULT_PARTITIONS";
    pub(super) const ITERATIONS: &str = "BACKRANK_ITERATIONS";
}

use config_vars::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    fn parse(level: Option<&str>) -> LogLevel {
        match level.map(str::to_ascii_lowercase).as_deref() {
            Some("error") => LogLevel::Error,
            Some("warn") => LogLevel::Warn,
            Some("debug") => LogLevel::Debug,
            Some("trace") => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Process wide settings, read from `BACKRANK_`-prefixed environment variables.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub log_level: LogLevel,
    /// When set, a copy of the log is written to `<log_dir>/backrank-<job id>.log`.
    pub log_dir: Option<PathBuf>,
    pub num_threads: usize,
    pub default_partitions: usize,
    pub iterations: usize,
}

fn default_parallelism() -> usize {
    num_cpus::get()
}

const DEFAULT_ITERATIONS: usize = 10;

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            log_level: LogLevel::default(),
            log_dir: None,
            num_threads: default_parallelism(),
            default_partitions: default_parallelism(),
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Configuration {
    /// Loads the configuration from the environment the first time it is called.
    pub fn get() -> Result<&'static Configuration> {
        CONF.get_or_try_init(Configuration::from_env)
    }

    pub fn from_env() -> Result<Configuration> {
        // only the environment is consulted, command line arguments belong to
        // whatever binary embeds the engine
        let arguments = App::new("backrank-env")
            .arg(Arg::with_name(LOG_LEVEL).long("log_level").env(LOG_LEVEL).takes_value(true))
            .arg(Arg::with_name(LOG_DIR).long("log_dir").env(LOG_DIR).takes_value(true))
            .arg(
                Arg::with_name(NUM_THREADS)
                    .long("num_threads")
                    .env(NUM_THREADS)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name(DEFAULT_PARTITIONS)
                    .long("default_partitions")
                    .env(DEFAULT_PARTITIONS)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name(ITERATIONS)
                    .long("iterations")
                    .env(ITERATIONS)
                    .takes_value(true),
            )
            .get_matches_from_safe(vec!["backrank-env"])?;
        Configuration::from_matches(&arguments)
    }

    fn from_matches(arguments: &ArgMatches) -> Result<Configuration> {
        let defaults = Configuration::default();
        let number = |name: &str, default: usize| -> Result<usize> {
            if arguments.is_present(name) {
                Ok(value_t!(arguments, name, usize)?)
            } else {
                Ok(default)
            }
        };
        Ok(Configuration {
            log_level: LogLevel::parse(arguments.value_of(LOG_LEVEL)),
            log_dir: arguments.value_of(LOG_DIR).map(PathBuf::from),
            // a zero sized pool or partition count would stall every job
            num_threads: number(NUM_THREADS, defaults.num_threads)?.max(1),
            default_partitions: number(DEFAULT_PARTITIONS, defaults.default_partitions)?.max(1),
            iterations: number(ITERATIONS, defaults.iterations)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_from(args: &[&str]) -> ArgMatches<'static> {
        App::new("test")
            .arg(Arg::with_name(LOG_LEVEL).long("log_level").takes_value(true))
            .arg(Arg::with_name(LOG_DIR).long("log_dir").takes_value(true))
            .arg(Arg::with_name(NUM_THREADS).long("num_threads").takes_value(true))
            .arg(
                Arg::with_name(DEFAULT_PARTITIONS)
                    .long("default_partitions")
                    .takes_value(true),
            )
            .arg(Arg::with_name(ITERATIONS).long("iterations").takes_value(true))
            .get_matches_from(args.iter().copied())
    }

    #[test]
    fn defaults_are_usable() {
        let config = Configuration::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.num_threads >= 1);
        assert!(config.default_partitions >= 1);
        assert_eq!(config.iterations, 10);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn values_override_defaults() -> Result<()> {
        let config = Configuration::from_matches(&matches_from(&[
            "test",
            "--log_level",
            "DEBUG",
            "--num_threads",
            "0",
            "--iterations",
            "3",
            "--log_dir",
            "/tmp/backrank",
        ]))?;
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.num_threads, 1);
        assert_eq!(config.iterations, 3);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/backrank")));
        assert!(config.default_partitions >= 1);
        Ok(())
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let matches = matches_from(&["test", "--iterations", "many"]);
        assert!(Configuration::from_matches(&matches).is_err());
    }

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(LogLevel::parse(Some("warn")), LogLevel::Warn);
        assert_eq!(LogLevel::parse(Some("verbose")), LogLevel::Info);
        assert_eq!(LogLevel::parse(None), LogLevel::Info);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::Warn);
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::Trace);
    }
}
