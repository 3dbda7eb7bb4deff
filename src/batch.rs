// Batch driver: enumerates replay files and runs the per-input pipeline on a
// small worker pool. Each input is independent; a failure is reported for that
// input only and never stops the others.

use crate::analysis::{self, Analysis};
use crate::config::Config;
use crate::render::{ChartMeta, RenderError, Renderer};
use crate::replay::{DecodeError, GameMode, Replay};
use crate::util::{error_chain, format_progress};
use crossbeam_channel::{bounded, unbounded};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Extension of replay files picked up from directories.
pub const REPLAY_EXTENSION: &str = "osr";

/// Failure analyzing a single input.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{}: malformed replay", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("{}: failed to write output", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
}

/// Outcome of one input.
#[derive(Debug)]
pub enum Outcome {
    Processed { output: PathBuf },
    /// Nothing within the hold-time window; no output written.
    Skipped,
    Failed(AnalysisError),
}

#[derive(Debug)]
pub struct InputResult {
    pub path: PathBuf,
    /// Output name assigned by [`output_stems`].
    pub stem: String,
    pub outcome: Outcome,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Processed { .. } => self.processed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

fn is_replay(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(REPLAY_EXTENSION))
}

/// Expands the configured inputs: files are kept as given, directories
/// contribute their `.osr` files sorted by name. A file reached twice (same
/// canonical path) is kept only at its first position.
pub fn collect_inputs(paths: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |files: &mut Vec<PathBuf>, path: PathBuf| {
        // Missing files have no canonical form; they fail later with a decode error.
        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            files.push(path);
        } else {
            debug!(file = %path.display(), "Ignoring duplicate input");
        }
    };
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()?
                .into_iter()
                .filter(|p| p.is_file() && is_replay(p))
                .collect();
            found.sort();
            debug!(dir = %path.display(), count = found.len(), "Scanned input directory");
            for file in found {
                push(&mut files, file);
            }
        } else {
            push(&mut files, path.clone());
        }
    }
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "replay".to_string())
}

/// Output name (without extension) for each input, in input order. Inputs
/// sharing a file stem get `_2`, `_3`, ... suffixes so no two inputs write
/// the same output or error file.
pub fn output_stems(inputs: &[PathBuf]) -> Vec<String> {
    let mut used = HashSet::new();
    inputs
        .iter()
        .map(|path| {
            let base = file_stem(path);
            let mut stem = base.clone();
            let mut n = 1;
            while !used.insert(stem.clone()) {
                n += 1;
                stem = format!("{base}_{n}");
            }
            stem
        })
        .collect()
}

/// Runs decoding, analysis and rendering for one replay file; output is named after `stem`.
/// Returns `Ok(None)` when the replay has no significant hold times.
pub fn process_file(
    path: &Path,
    stem: &str,
    cfg: &Config,
    renderer: &dyn Renderer,
) -> Result<Option<PathBuf>, AnalysisError> {
    let replay = Replay::from_path(path).map_err(|source| AnalysisError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if replay.mode != GameMode::Standard {
        warn!(file = %path.display(), mode = ?replay.mode, "Replay is not an osu!standard play; key bits may mean something else");
    }
    debug!(file = %path.display(), frames = replay.frames.len(), player = %replay.player_name, "Replay decoded");

    match analysis::analyze(&replay.frames, &cfg.selectors, cfg.max_hold_ms()) {
        Analysis::NoSignificantData => Ok(None),
        Analysis::Reportable(report) => {
            let meta = ChartMeta::from_replay(&replay, path, stem);
            renderer
                .render(&meta, &report, &cfg.output_dir)
                .map(Some)
                .map_err(|source| AnalysisError::Render {
                    path: path.to_path_buf(),
                    source,
                })
        }
    }
}

fn error_file_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("error_{stem}.txt"))
}

fn report_result(result: &InputResult, current: usize, total: usize, output_dir: &Path) {
    let name = result.path.display();
    let progress = format_progress(current, total);
    match &result.outcome {
        Outcome::Processed { output } => {
            info!(file = %name, output = %output.display(), %progress, "Processed");
        }
        Outcome::Skipped => {
            warn!(file = %name, %progress, "Skipped (no significant hold times found)");
        }
        Outcome::Failed(err) => {
            let chain = error_chain(err);
            error!(file = %name, error = %chain, %progress, "Failed");
            let error_path = error_file_path(output_dir, &result.stem);
            if let Err(e) = fs::write(&error_path, format!("{chain}\n")) {
                error!(path = %error_path.display(), error = %e, "Could not write error file");
            }
        }
    }
}

/// Processes all `inputs` with `cfg.jobs` workers and returns the tally.
/// Results are logged as they complete.
pub fn run_batch(inputs: &[PathBuf], cfg: &Config, renderer: &dyn Renderer) -> BatchSummary {
    let total = inputs.len();
    let workers = cfg.jobs.clamp(1, total.max(1));
    let stems = output_stems(inputs);
    let (job_tx, job_rx) = bounded::<(&Path, &str)>(workers * 2);
    let (result_tx, result_rx) = unbounded::<InputResult>();
    let mut summary = BatchSummary::default();

    thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (path, stem) in job_rx.iter() {
                    debug!(worker, file = %path.display(), "Worker picked up input");
                    let outcome = match process_file(path, stem, cfg, renderer) {
                        Ok(Some(output)) => Outcome::Processed { output },
                        Ok(None) => Outcome::Skipped,
                        Err(err) => Outcome::Failed(err),
                    };
                    let result = InputResult {
                        path: path.to_path_buf(),
                        stem: stem.to_string(),
                        outcome,
                    };
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);
        drop(result_tx);

        let stems = &stems;
        scope.spawn(move || {
            for (path, stem) in inputs.iter().zip(stems) {
                if job_tx.send((path.as_path(), stem.as_str())).is_err() {
                    break;
                }
            }
        });

        for (index, result) in result_rx.iter().enumerate() {
            summary.record(&result.outcome);
            report_result(&result, index + 1, total, &cfg.output_dir);
        }
    });

    summary
}
