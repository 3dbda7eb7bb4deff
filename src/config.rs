use crate::cli::{Args, LogFormat, OutputFormat};
use crate::controls::ControlSelector;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Directory scanned when no inputs are given.
pub const DEFAULT_INPUT_DIR: &str = "replays";

const DEFAULT_LOG_FILTER: &str = "holdtime=info";
const VERBOSE_LOG_FILTER: &str = "holdtime=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid --{flag} value '{value}': {reason}")]
    Selector {
        flag: &'static str,
        value: String,
        reason: String,
    },
    #[error("--max-hold must be at least 1ms and at most {} ms", u32::MAX)]
    MaxHold,
    #[error("--jobs must be at least 1")]
    Jobs,
}

/// Immutable runtime configuration resolved from the command line.
#[derive(Clone, Debug)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    max_hold: Duration,
    pub selectors: Vec<ControlSelector>,
    pub format: OutputFormat,
    pub jobs: usize,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub verbose: bool,
    default_inputs: bool,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inputs: Vec<PathBuf>,
        output_dir: PathBuf,
        max_hold: Duration,
        selectors: Vec<ControlSelector>,
        format: OutputFormat,
        jobs: usize,
        log_filter: String,
        log_format: LogFormat,
        verbose: bool,
    ) -> Result<Self, ConfigError> {
        if max_hold < Duration::from_millis(1) || max_hold.as_millis() > u128::from(u32::MAX) {
            return Err(ConfigError::MaxHold);
        }
        if jobs == 0 {
            return Err(ConfigError::Jobs);
        }
        let default_inputs = inputs.is_empty();
        let inputs = if default_inputs {
            vec![PathBuf::from(DEFAULT_INPUT_DIR)]
        } else {
            inputs
        };
        Ok(Self {
            inputs,
            output_dir,
            max_hold,
            selectors,
            format,
            jobs,
            log_filter,
            log_format,
            verbose,
            default_inputs,
        })
    }

    pub fn max_hold(&self) -> Duration {
        self.max_hold
    }

    /// Maximum kept hold duration in whole milliseconds.
    pub fn max_hold_ms(&self) -> u32 {
        u32::try_from(self.max_hold.as_millis()).unwrap_or(u32::MAX)
    }

    /// True when no inputs were given and the default directory is used.
    pub fn uses_default_inputs(&self) -> bool {
        self.default_inputs
    }
}

fn selector(flag: &'static str, label: &str, value: &str) -> Result<ControlSelector, ConfigError> {
    ControlSelector::parse_inputs(label, value).map_err(|reason| ConfigError::Selector {
        flag,
        value: value.to_string(),
        reason,
    })
}

impl TryFrom<&Args> for Config {
    type Error = ConfigError;

    fn try_from(a: &Args) -> Result<Self, Self::Error> {
        let selectors = vec![
            selector("key1", "Key 1", &a.key1)?,
            selector("key2", "Key 2", &a.key2)?,
        ];
        let jobs = match a.jobs {
            Some(n) => n,
            None => std::thread::available_parallelism().map_or(1, |n| n.get()),
        };
        let log_filter = a
            .log_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok().filter(|f| !f.is_empty()))
            .unwrap_or_else(|| {
                if a.verbose { VERBOSE_LOG_FILTER } else { DEFAULT_LOG_FILTER }.to_string()
            });
        Config::new(
            a.inputs.clone(),
            a.output_dir.clone(),
            a.max_hold,
            selectors,
            a.format,
            jobs,
            log_filter,
            a.log_format,
            a.verbose,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Input;
    use clap::Parser;

    fn config(argv: &[&str]) -> Result<Config, ConfigError> {
        let args = Args::try_parse_from(argv).unwrap();
        Config::try_from(&args)
    }

    #[test]
    fn defaults_to_replays_dir() {
        let cfg = config(&["holdtime", "--log-filter", "warn"]).unwrap();
        assert!(cfg.uses_default_inputs());
        assert_eq!(cfg.inputs, vec![PathBuf::from(DEFAULT_INPUT_DIR)]);
        assert_eq!(cfg.max_hold_ms(), 100);
        assert_eq!(cfg.selectors, vec![ControlSelector::key1(), ControlSelector::key2()]);
        assert_eq!(cfg.log_filter, "warn");
        assert!(cfg.jobs >= 1);
    }

    #[test]
    fn custom_bindings() {
        let cfg = config(&["holdtime", "x.osr", "--key1", "k1", "--key2", "smoke,m2", "-j", "3"]).unwrap();
        assert!(!cfg.uses_default_inputs());
        assert_eq!(cfg.selectors[0].inputs, vec![Input::K1]);
        assert_eq!(cfg.selectors[1].inputs, vec![Input::M2, Input::Smoke]);
        assert_eq!(cfg.jobs, 3);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&["holdtime", "--key1", "K9"]),
            Err(ConfigError::Selector { flag: "key1", .. })
        ));
        assert!(matches!(config(&["holdtime", "--max-hold", "0s"]), Err(ConfigError::MaxHold)));
        assert!(matches!(config(&["holdtime", "-j", "0"]), Err(ConfigError::Jobs)));
    }
}
