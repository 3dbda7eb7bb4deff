use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Analyze osu! replays and chart how long each key press was held.
/// Reads `.osr` files and writes one chart (or JSON report) per replay.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Replay files or directories to analyze. Directories are scanned for `.osr` files.
    /// Defaults to the `replays` directory, which is created if missing.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving charts, reports and per-replay error files.
    #[arg(short, long, default_value = "output", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Longest hold kept in the histograms (e.g. "100ms"). Longer holds are dropped as outliers.
    #[arg(long, default_value = "100ms", value_parser = humantime::parse_duration)]
    pub max_hold: Duration,

    /// Physical inputs acting as the first key, comma separated (K1, K2, M1, M2, SMOKE).
    #[arg(long, default_value = "K1,M1", value_name = "INPUTS")]
    pub key1: String,

    /// Physical inputs acting as the second key, comma separated.
    #[arg(long, default_value = "K2,M2", value_name = "INPUTS")]
    pub key2: String,

    /// Output written per replay.
    #[arg(long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// Number of replays analyzed in parallel (default: available CPUs).
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Log filter directive (overrides RUST_LOG), e.g. "holdtime=debug".
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Format of log lines written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Enable debug logging and log targets.
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// SVG bar chart.
    Svg,
    /// Pretty-printed JSON report.
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Parses command line arguments using clap.
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["holdtime"]).unwrap();
        assert!(args.inputs.is_empty());
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert_eq!(args.max_hold, Duration::from_millis(100));
        assert_eq!(args.key1, "K1,M1");
        assert_eq!(args.format, OutputFormat::Svg);
        assert_eq!(args.jobs, None);
    }

    #[test]
    fn parses_humantime_threshold() {
        let args = Args::try_parse_from(["holdtime", "--max-hold", "1s 500ms", "a.osr"]).unwrap();
        assert_eq!(args.max_hold, Duration::from_millis(1500));
        assert_eq!(args.inputs, vec![PathBuf::from("a.osr")]);
        assert!(Args::try_parse_from(["holdtime", "--max-hold", "soon"]).is_err());
    }
}
