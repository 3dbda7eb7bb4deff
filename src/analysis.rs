// Reduction of a replay's input stream into per-control hold-time histograms.
//
// Pipeline per control: project raw frames onto the control, run the hold
// detector, fold samples into a histogram, then filter and summarize it.

mod detector;
mod histogram;
#[cfg(test)]
mod tests;

pub use detector::{hold_samples, HoldDetector, HoldSamples, HoldState};
pub use histogram::Histogram;

use crate::controls::ControlSelector;
use crate::replay::RawFrame;
use serde::Serialize;
use tracing::debug;

/// Default upper bound (inclusive) for hold durations that are kept, in ms.
pub const DEFAULT_MAX_HOLD_MS: u32 = 100;

/// A completed press, in milliseconds.
pub type HoldSample = u32;

/// A raw frame projected onto one logical control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFrame {
    pub offset: i64,
    pub pressed: bool,
}

/// Projects `frames` onto `selector`, preserving length and order.
pub fn project(frames: &[RawFrame], selector: &ControlSelector) -> Vec<KeyFrame> {
    frames
        .iter()
        .map(|frame| KeyFrame {
            offset: frame.offset,
            pressed: selector.is_active(&frame.inputs),
        })
        .collect()
}

/// Result for one logical control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlReport {
    pub label: String,
    /// Histogram restricted to the configured maximum duration.
    pub histogram: Histogram,
    /// Squared-count weighted mean of `histogram`, `None` when it is empty.
    pub statistic: Option<f64>,
    /// Samples in `histogram`.
    pub samples: u64,
    /// Samples dropped for exceeding the maximum duration.
    pub discarded: u64,
}

impl ControlReport {
    /// Builds the report for one control from its full, unfiltered histogram.
    pub fn from_histogram(label: impl Into<String>, full: &Histogram, max_duration: u32) -> Self {
        let histogram = full.filter(max_duration);
        let samples = histogram.total_samples();
        ControlReport {
            label: label.into(),
            statistic: histogram.weighted_mean(),
            discarded: full.total_samples() - samples,
            samples,
            histogram,
        }
    }
}

/// Per-control results of one input, in selector order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Inclusive upper bound on kept hold durations, in ms.
    pub threshold_ms: u32,
    pub controls: Vec<ControlReport>,
}

impl Report {
    /// Smallest duration present in any control.
    pub fn min_duration(&self) -> Option<u32> {
        self.controls.iter().filter_map(|c| c.histogram.min_duration()).min()
    }

    /// Largest duration present in any control.
    pub fn max_duration(&self) -> Option<u32> {
        self.controls.iter().filter_map(|c| c.histogram.max_duration()).max()
    }

    /// Highest bucket count in any control.
    pub fn max_count(&self) -> Option<u32> {
        self.controls.iter().filter_map(|c| c.histogram.max_count()).max()
    }
}

/// Outcome of analyzing one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Reportable(Report),
    /// Every control's filtered histogram is empty.
    NoSignificantData,
}

/// Runs the full pipeline once per selector over the same frames.
pub fn analyze(frames: &[RawFrame], selectors: &[ControlSelector], max_duration: u32) -> Analysis {
    let controls: Vec<ControlReport> = selectors
        .iter()
        .map(|selector| analyze_control(frames, selector, max_duration))
        .collect();

    if controls.iter().all(|c| c.histogram.is_empty()) {
        debug!(frames = frames.len(), max_duration, "No hold times within range");
        return Analysis::NoSignificantData;
    }
    Analysis::Reportable(Report {
        threshold_ms: max_duration,
        controls,
    })
}

/// Pipeline for a single control.
pub fn analyze_control(frames: &[RawFrame], selector: &ControlSelector, max_duration: u32) -> ControlReport {
    let mut detector = HoldDetector::new();
    let full: Histogram = project(frames, selector)
        .into_iter()
        .filter_map(|frame| detector.step(frame))
        .collect();
    if let Some(start) = detector.finish() {
        debug!(control = %selector, start, "Dropped press still held at end of replay");
    }
    let report = ControlReport::from_histogram(selector.label.clone(), &full, max_duration);
    debug!(
        control = %selector,
        samples = report.samples,
        discarded = report.discarded,
        statistic = ?report.statistic,
        "Control analyzed"
    );
    report
}
