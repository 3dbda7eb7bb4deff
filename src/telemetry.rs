//! Tracing initialization logic.

use crate::cli::LogFormat;
use crate::{config::Config, util};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the tracing subscriber: a fmt layer on stderr (text or JSON)
/// filtered by the configured directive.
pub fn init_tracing(cfg: &Config) {
    let fmt_layer = match cfg.log_format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(cfg.verbose)
            .with_level(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .boxed(),
    };

    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log filter '{}': {e}", cfg.log_filter);
        EnvFilter::new("holdtime=info") // Default filter on parse error
    });

    tracing_subscriber::registry().with(fmt_layer).with(filter).init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        // Use option_env! for build metadata to avoid build errors outside git repo
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        build_ts = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        "holdtime starting"
    );

    info!(
        inputs = ?cfg.inputs,
        output_dir = %cfg.output_dir.display(),
        max_hold = %util::format_duration(cfg.max_hold()),
        controls = ?cfg.selectors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        format = ?cfg.format,
        jobs = cfg.jobs,
        verbose = cfg.verbose,
        log_filter = %cfg.log_filter,
        "Configuration loaded"
    );
}
