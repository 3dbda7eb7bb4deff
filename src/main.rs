// Application entry point.
// Parses the command line, sets up logging and the output directory, then
// hands the replay files to the batch driver and maps the tally to an exit code.

use anyhow::{Context, Result};
use holdtime::batch::{self, BatchSummary};
use holdtime::cli::{self, OutputFormat};
use holdtime::config::Config;
use holdtime::render::{JsonRenderer, Renderer, SvgRenderer};
use holdtime::telemetry;
use std::fs;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Exit code when at least one replay failed to process.
const EXIT_INPUT_FAILED: u8 = 1;
/// Exit code for invalid arguments or setup failures.
const EXIT_SETUP_FAILED: u8 = 2;

fn run(cfg: &Config) -> Result<BatchSummary> {
    if cfg.uses_default_inputs() && !cfg.inputs[0].exists() {
        fs::create_dir_all(&cfg.inputs[0])
            .with_context(|| format!("failed to create {}", cfg.inputs[0].display()))?;
        info!(
            dir = %cfg.inputs[0].display(),
            "A replays folder was created. Put your replays in there and run the program again."
        );
        return Ok(BatchSummary::default());
    }

    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("failed to create output directory {}", cfg.output_dir.display()))?;

    let inputs = batch::collect_inputs(&cfg.inputs).context("failed to enumerate replay files")?;
    if inputs.is_empty() {
        warn!(inputs = ?cfg.inputs, "No replay files found");
        return Ok(BatchSummary::default());
    }
    info!(count = inputs.len(), jobs = cfg.jobs, "Processing replays");

    let renderer: Box<dyn Renderer> = match cfg.format {
        OutputFormat::Svg => Box::new(SvgRenderer::default()),
        OutputFormat::Json => Box::new(JsonRenderer),
    };
    let summary = batch::run_batch(&inputs, cfg, renderer.as_ref());

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Done."
    );
    Ok(summary)
}

fn main() -> ExitCode {
    let args = cli::parse_args();
    let cfg = match Config::try_from(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    telemetry::init_tracing(&cfg);

    match run(&cfg) {
        Ok(summary) if summary.failed > 0 => ExitCode::from(EXIT_INPUT_FAILED),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Setup failed");
            ExitCode::from(EXIT_SETUP_FAILED)
        }
    }
}
