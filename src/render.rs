//! Rendering of [`Chart`] descriptions.

use crate::chart::{Chart, Panel, Series, SeriesKind};
use crate::error::{AnalysisError, Result};
use std::io::Write;

/// Consumes chart descriptions.
pub trait ChartRenderer {
    fn render(&mut self, chart: &Chart) -> Result<()>;
}

/// Bar series up to this many points are printed value by value.
const MAX_LISTED_BARS: usize = 40;

/// Compact human-readable summary of each chart.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_panel(&mut self, panel: &Panel) -> std::io::Result<()> {
        writeln!(self.out, "[{}]", panel.title)?;
        if !panel.x_label.is_empty() || !panel.y_label.is_empty() {
            writeln!(self.out, "  axes: x={}, y={}", panel.x_label, panel.y_label)?;
        }
        for series in &panel.series {
            self.render_series(series)?;
        }
        for band in &panel.bands {
            let widths: Vec<f64> = band
                .upper
                .iter()
                .zip(&band.lower)
                .map(|(u, l)| u - l)
                .collect();
            let mean_width = if widths.is_empty() {
                f64::NAN
            } else {
                widths.iter().sum::<f64>() / widths.len() as f64
            };
            writeln!(
                self.out,
                "  band {}: {} points, mean width {:.4}",
                band.name,
                band.x.len(),
                mean_width
            )?;
        }
        for line in &panel.reference_lines {
            writeln!(self.out, "  ref {} = {:.4}", line.label, line.y)?;
        }
        for note in &panel.notes {
            writeln!(self.out, "  {}", note)?;
        }
        Ok(())
    }

    fn render_series(&mut self, series: &Series) -> std::io::Result<()> {
        if series.is_empty() {
            return writeln!(self.out, "  {}: empty", series.name);
        }

        if series.kind == SeriesKind::Bar && series.len() <= MAX_LISTED_BARS {
            let values: Vec<String> = series
                .x
                .iter()
                .zip(&series.y)
                .map(|(x, y)| format!("{}:{:.3}", x, y))
                .collect();
            return writeln!(self.out, "  {}: {}", series.name, values.join(" "));
        }

        let (min, max) = series
            .y
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let first = &series.x[0];
        let last = &series.x[series.len() - 1];
        writeln!(
            self.out,
            "  {}: {} points, x {}..{}, y min {:.4} max {:.4} last {:.4}",
            series.name,
            series.len(),
            first,
            last,
            min,
            max,
            series.y[series.len() - 1]
        )
    }
}

impl<W: Write> ChartRenderer for TextRenderer<W> {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        writeln!(self.out, "== {} ==", chart.title)?;
        for panel in &chart.panels {
            self.render_panel(panel)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON document per chart, newline separated.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartRenderer for JsonRenderer<W> {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        serde_json::to_writer(&mut self.out, chart)
            .map_err(|e| AnalysisError::Io(format!("failed to encode chart: {e}")))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Renderer that keeps every chart, for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectingRenderer {
    pub charts: Vec<Chart>,
}

impl ChartRenderer for CollectingRenderer {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        self.charts.push(chart.clone());
        Ok(())
    }
}
