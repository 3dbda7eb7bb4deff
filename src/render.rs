// Output side of the pipeline: turns a report into a chart or a JSON document.

use crate::analysis::{ControlReport, Report};
use crate::replay::Replay;
use crate::util::format_statistic;
use plotters::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bar colors per control, cycled when more controls are configured.
const PALETTE: [RGBColor; 2] = [RGBColor(121, 159, 203), RGBColor(249, 102, 94)];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to draw chart: {0}")]
    Draw(String),
    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),
    #[error("report has no data to draw")]
    Empty,
}

/// Metadata used to title and name the output of one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMeta {
    /// Output file name without extension.
    pub stem: String,
    pub source: PathBuf,
    pub player: String,
    pub online_id: i64,
    /// `dd/mm/yyyy HH:MM`, UTC.
    pub played_at: Option<String>,
    pub mods: Vec<&'static str>,
    pub length_ms: i64,
}

impl ChartMeta {
    pub fn from_replay(replay: &Replay, source: &Path, stem: &str) -> Self {
        ChartMeta {
            stem: stem.to_string(),
            source: source.to_path_buf(),
            player: replay.player_name.clone(),
            online_id: replay.online_id,
            played_at: replay.timestamp.map(|ts| ts.format("%d/%m/%Y %H:%M").to_string()),
            mods: replay.mods.names(),
            length_ms: replay.length_ms(),
        }
    }

    /// `(<id|Offline>) <player> at <date> +<mods> (<length>ms)`
    pub fn title(&self) -> String {
        let id = if self.online_id == 0 {
            "Offline".to_string()
        } else {
            self.online_id.to_string()
        };
        format!(
            "({id}) {} at {} +{} ({}ms)",
            self.player,
            self.played_at.as_deref().unwrap_or("unknown date"),
            self.mods.join(", "),
            self.length_ms
        )
    }
}

/// Legend text for one control, e.g. `Key 1 (120 presses, 23.5 eavg.)`.
pub fn legend_label(control: &ControlReport) -> String {
    format!(
        "{} ({} presses, {} eavg.)",
        control.label,
        control.samples,
        format_statistic(control.statistic)
    )
}

/// Consumer of finished reports.
pub trait Renderer: Send + Sync {
    /// Writes the output for one input into `out_dir` and returns its path.
    fn render(&self, meta: &ChartMeta, report: &Report, out_dir: &Path) -> Result<PathBuf, RenderError>;
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Overlaid bar chart per control with a marker at each weighted mean.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer {
            width: 2000,
            height: 1200,
        }
    }
}

impl SvgRenderer {
    fn draw(&self, meta: &ChartMeta, report: &Report, path: &Path) -> Result<(), RenderError> {
        let (Some(min), Some(max), Some(max_count)) =
            (report.min_duration(), report.max_duration(), report.max_count())
        else {
            return Err(RenderError::Empty);
        };
        let x_range = (f64::from(min) - 1.0)..(f64::from(max) + 1.0);
        let y_max = (f64::from(max_count) * 1.05).floor() + 1.0;

        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(meta.title(), ("sans-serif", 32))
            .margin(24)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range, 0f64..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Milliseconds")
            .y_desc("Amount of Occurrences")
            .x_label_formatter(&|v| format!("{v:.0}"))
            .y_label_formatter(&|v| format!("{v:.0}"))
            .label_style(("sans-serif", 20))
            .draw()
            .map_err(draw_err)?;

        for (control, color) in report.controls.iter().zip(PALETTE.iter().cycle()) {
            let fill = color.mix(0.4).filled();
            chart
                .draw_series(control.histogram.iter().map(|(duration, count)| {
                    let d = f64::from(duration);
                    Rectangle::new([(d - 0.4, 0.0), (d + 0.4, f64::from(count))], fill)
                }))
                .map_err(draw_err)?
                .label(legend_label(control))
                .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 20, y + 8)], fill));

            if let Some(mean) = control.statistic {
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        vec![(mean, 0.0), (mean, y_max)],
                        color.stroke_width(2),
                    )))
                    .map_err(draw_err)?;
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 22))
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, meta: &ChartMeta, report: &Report, out_dir: &Path) -> Result<PathBuf, RenderError> {
        let path = out_dir.join(format!("{}.svg", meta.stem));
        self.draw(meta, report, &path)?;
        Ok(path)
    }
}

/// Writes `{ meta, title, report }` as pretty JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, meta: &ChartMeta, report: &Report, out_dir: &Path) -> Result<PathBuf, RenderError> {
        #[derive(Serialize)]
        struct Output<'a> {
            title: String,
            meta: &'a ChartMeta,
            legend: Vec<String>,
            report: &'a Report,
        }

        let path = out_dir.join(format!("{}.json", meta.stem));
        let io_err = |source| RenderError::Io {
            path: path.clone(),
            source,
        };
        let output = Output {
            title: meta.title(),
            meta,
            legend: report.controls.iter().map(legend_label).collect(),
            report,
        };

        let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut writer, &output)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Histogram;

    fn meta() -> ChartMeta {
        ChartMeta {
            stem: "play".to_string(),
            source: PathBuf::from("replays/play.osr"),
            player: "peppy".to_string(),
            online_id: 0,
            played_at: Some("01/03/2024 12:30".to_string()),
            mods: vec!["Hidden", "DoubleTime"],
            length_ms: 93_000,
        }
    }

    fn report() -> Report {
        let full: Histogram = [30, 30, 42, 250].into_iter().collect();
        Report {
            threshold_ms: 100,
            controls: vec![
                ControlReport::from_histogram("Key 1", &full, 100),
                ControlReport::from_histogram("Key 2", &Histogram::new(), 100),
            ],
        }
    }

    #[test]
    fn title_format() {
        assert_eq!(meta().title(), "(Offline) peppy at 01/03/2024 12:30 +Hidden, DoubleTime (93000ms)");
        let online = ChartMeta {
            online_id: 4_242,
            played_at: None,
            mods: vec![],
            ..meta()
        };
        assert_eq!(online.title(), "(4242) peppy at unknown date + (93000ms)");
    }

    #[test]
    fn legend_format() {
        let r = report();
        // (30·4 + 42·1) / (4 + 1)
        assert_eq!(legend_label(&r.controls[0]), "Key 1 (3 presses, 32.4 eavg.)");
        assert_eq!(legend_label(&r.controls[1]), "Key 2 (0 presses, n/a eavg.)");
    }

    #[test]
    fn json_renderer_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = JsonRenderer.render(&meta(), &report(), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("play.json"));

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["meta"]["player"], "peppy");
        assert_eq!(value["report"]["controls"][0]["histogram"]["30"], 2);
        assert_eq!(value["report"]["controls"][0]["discarded"], 1);
        assert!(value["report"]["controls"][1]["statistic"].is_null());
    }

    #[test]
    fn svg_renderer_writes_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = SvgRenderer::default().render(&meta(), &report(), dir.path()).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Milliseconds"));
        assert!(svg.contains("Key 2 (0 presses, n/a eavg.)"));
    }

    #[test]
    fn svg_renderer_rejects_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let empty = Report {
            threshold_ms: 100,
            controls: vec![ControlReport::from_histogram("Key 1", &Histogram::new(), 100)],
        };
        assert!(matches!(
            SvgRenderer::default().render(&meta(), &empty, dir.path()),
            Err(RenderError::Empty)
        ));
    }
}
