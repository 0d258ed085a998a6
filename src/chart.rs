//! Chart descriptions produced by the analyzer.
//!
//! Analysis code never draws anything. Each plotting operation returns a
//! [`Chart`] value which a [`crate::render::ChartRenderer`] turns into
//! output.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Position on the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    Date(NaiveDate),
    Lag(usize),
}

impl fmt::Display for XValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XValue::Date(date) => write!(f, "{}", date),
            XValue::Lag(lag) => write!(f, "{}", lag),
        }
    }
}

impl From<NaiveDate> for XValue {
    fn from(date: NaiveDate) -> Self {
        XValue::Date(date)
    }
}

impl From<usize> for XValue {
    fn from(lag: usize) -> Self {
        XValue::Lag(lag)
    }
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Line,
    Bar,
}

/// A named sequence of `(x, y)` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub x: Vec<XValue>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Shaded region between two curves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub name: String,
    pub x: Vec<XValue>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Horizontal reference line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HLine {
    pub label: String,
    pub y: f64,
}

/// One set of axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub bands: Vec<Band>,
    pub reference_lines: Vec<HLine>,
    /// Free-form annotations such as test statistics.
    pub notes: Vec<String>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
            bands: Vec::new(),
            reference_lines: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn line<X: Into<XValue> + Copy>(self, name: impl Into<String>, x: &[X], y: &[f64]) -> Self {
        self.push_series(name.into(), SeriesKind::Line, x, y)
    }

    pub fn bars<X: Into<XValue> + Copy>(self, name: impl Into<String>, x: &[X], y: &[f64]) -> Self {
        self.push_series(name.into(), SeriesKind::Bar, x, y)
    }

    /// Add a band; `x`, `lower` and `upper` are truncated to the shortest.
    pub fn band<X: Into<XValue> + Copy>(
        mut self,
        name: impl Into<String>,
        x: &[X],
        lower: &[f64],
        upper: &[f64],
    ) -> Self {
        let n = x.len().min(lower.len()).min(upper.len());
        self.bands.push(Band {
            name: name.into(),
            x: x[..n].iter().map(|&v| v.into()).collect(),
            lower: lower[..n].to_vec(),
            upper: upper[..n].to_vec(),
        });
        self
    }

    pub fn hline(mut self, label: impl Into<String>, y: f64) -> Self {
        self.reference_lines.push(HLine {
            label: label.into(),
            y,
        });
        self
    }

    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.notes.push(text.into());
        self
    }

    pub fn find_series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    fn push_series<X: Into<XValue> + Copy>(
        mut self,
        name: String,
        kind: SeriesKind,
        x: &[X],
        y: &[f64],
    ) -> Self {
        let n = x.len().min(y.len());
        self.series.push(Series {
            name,
            kind,
            x: x[..n].iter().map(|&v| v.into()).collect(),
            y: y[..n].to_vec(),
        });
        self
    }
}

/// A titled figure made of one or more panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Chart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            panels: Vec::new(),
        }
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_builder_truncates_mismatched_lengths() {
        let panel = Panel::new("p").line("s", &[0usize, 1, 2], &[1.0, 2.0]);
        assert_eq!(panel.series[0].len(), 2);
        assert_eq!(panel.series[0].x, vec![XValue::Lag(0), XValue::Lag(1)]);
    }

    #[test]
    fn chart_finds_panels_and_series() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let chart = Chart::new("c")
            .with_panel(Panel::new("a").bars("acf", &[0usize, 1], &[1.0, 0.3]))
            .with_panel(Panel::new("b").line("price", &[date], &[10.0]).hline("zero", 0.0));

        assert!(chart.panel("a").and_then(|p| p.find_series("acf")).is_some());
        assert_eq!(chart.panel("b").unwrap().reference_lines[0].y, 0.0);
        assert!(chart.panel("missing").is_none());
    }

    #[test]
    fn x_values_serialize_untagged() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        let json = serde_json::to_string(&vec![XValue::Date(date), XValue::Lag(3)]).unwrap();
        assert_eq!(json, r#"["2021-03-04",3]"#);
    }
}
