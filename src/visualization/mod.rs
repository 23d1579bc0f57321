//! Chart rendering for estimator output.
//!
//! A [`Chart`] is a small declarative description (histograms, line series,
//! reference rules, optional log-scaled x axis) rendered to a standalone SVG
//! document. Estimators only hand over their finished sample sequences.
//!
//! # Example
//!
//! ```rust
//! use expvar::visualization::{Chart, Color};
//!
//! let chart = Chart::new("Samples")
//!     .x_label("Value")
//!     .y_label("Density")
//!     .histogram("draws", vec![0.1, 0.4, 0.5, 1.2], 4, Color::BLUE);
//! let svg = chart.render_svg();
//! assert!(svg.starts_with("<svg"));
//! ```

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SimError, SimResult};

pub mod charts;

pub use charts::{antithetic_chart, conditional_chart, control_chart, stratified_chart};

// ============================================================================
// Chart model
// ============================================================================

/// RGB colour with opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
}

impl Color {
    /// Matplotlib-style default blue.
    pub const BLUE: Self = Self::rgb(31, 119, 180);
    /// Reference red.
    pub const RED: Self = Self::rgb(214, 39, 40);

    /// Opaque colour.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    /// Same colour with a different opacity.
    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Line stroke style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stroke {
    /// Continuous line.
    Solid,
    /// Dashed line.
    Dashed,
}

/// One drawable element of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Series {
    /// Density-normalized histogram of raw values.
    Histogram {
        /// Legend label.
        label: String,
        /// Raw observations.
        values: Vec<f64>,
        /// Number of equal-width bins over the data range.
        bins: usize,
        /// Fill colour.
        color: Color,
    },
    /// Polyline through `(x, y)` points.
    Line {
        /// Legend label.
        label: String,
        /// Points in data coordinates.
        points: Vec<(f64, f64)>,
        /// Stroke colour.
        color: Color,
        /// Stroke style.
        stroke: Stroke,
        /// Draw a circle at each point.
        markers: bool,
    },
    /// Horizontal reference line at `y`.
    HorizontalRule {
        /// Legend label.
        label: String,
        /// Data y-coordinate.
        y: f64,
        /// Stroke colour.
        color: Color,
    },
    /// Vertical reference line at `x`.
    VerticalRule {
        /// Legend label.
        label: String,
        /// Data x-coordinate.
        x: f64,
        /// Stroke colour.
        color: Color,
    },
}

impl Series {
    fn label(&self) -> &str {
        match self {
            Self::Histogram { label, .. }
            | Self::Line { label, .. }
            | Self::HorizontalRule { label, .. }
            | Self::VerticalRule { label, .. } => label.as_str(),
        }
    }

    fn color(&self) -> Color {
        match self {
            Self::Histogram { color, .. }
            | Self::Line { color, .. }
            | Self::HorizontalRule { color, .. }
            | Self::VerticalRule { color, .. } => *color,
        }
    }
}

/// A single-panel chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Title drawn above the plot area.
    pub title: String,
    /// X axis label.
    pub x_label: String,
    /// Y axis label.
    pub y_label: String,
    /// Logarithmic x axis.
    pub log_x: bool,
    /// Draw grid lines at the ticks.
    pub grid: bool,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Elements in drawing order.
    pub series: Vec<Series>,
}

impl Chart {
    /// Empty 800x500 chart.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            log_x: false,
            grid: false,
            width: 800,
            height: 500,
            series: Vec::new(),
        }
    }

    /// Set the x axis label.
    #[must_use]
    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    /// Set the y axis label.
    #[must_use]
    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Use a base-10 logarithmic x axis.
    #[must_use]
    pub const fn log_x(mut self) -> Self {
        self.log_x = true;
        self
    }

    /// Draw grid lines.
    #[must_use]
    pub const fn grid(mut self) -> Self {
        self.grid = true;
        self
    }

    /// Set canvas size.
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Add a density histogram.
    #[must_use]
    pub fn histogram(
        mut self,
        label: impl Into<String>,
        values: Vec<f64>,
        bins: usize,
        color: Color,
    ) -> Self {
        self.series.push(Series::Histogram {
            label: label.into(),
            values,
            bins,
            color,
        });
        self
    }

    /// Add a line series.
    #[must_use]
    pub fn line(
        mut self,
        label: impl Into<String>,
        points: Vec<(f64, f64)>,
        color: Color,
        stroke: Stroke,
        markers: bool,
    ) -> Self {
        self.series.push(Series::Line {
            label: label.into(),
            points,
            color,
            stroke,
            markers,
        });
        self
    }

    /// Add a dashed horizontal reference line.
    #[must_use]
    pub fn hrule(mut self, label: impl Into<String>, y: f64, color: Color) -> Self {
        self.series.push(Series::HorizontalRule {
            label: label.into(),
            y,
            color,
        });
        self
    }

    /// Add a dashed vertical reference line.
    #[must_use]
    pub fn vrule(mut self, label: impl Into<String>, x: f64, color: Color) -> Self {
        self.series.push(Series::VerticalRule {
            label: label.into(),
            x,
            color,
        });
        self
    }

    /// Render to an SVG document.
    #[must_use]
    pub fn render_svg(&self) -> String {
        SvgRenderer::new(self).render()
    }

    /// Render and write to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> SimResult<()> {
        let svg = self.render_svg();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(svg.as_bytes())?;
        writer.flush()?;
        info!(path = %path.display(), title = %self.title, "chart written");
        Ok(())
    }
}

// ============================================================================
// Histogram binning
// ============================================================================

/// One histogram bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    /// Left edge.
    pub lower: f64,
    /// Right edge.
    pub upper: f64,
    /// Number of values in the bin.
    pub count: usize,
    /// `count / (n · width)`, so bar areas sum to 1.
    pub density: f64,
}

/// Bin finite `values` into `bins` equal-width bins spanning their range.
///
/// The last bin is closed on the right. Returns no bins for empty input.
#[must_use]
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }
    let bins = bins.max(1);
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let n = finite.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count,
            density: count as f64 / (n * width),
        })
        .collect()
}

/// `n` evenly spaced points from `start` to `end` inclusive.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

// ============================================================================
// SVG rendering
// ============================================================================

const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 56.0;
const TICKS: usize = 5;

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    const fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, v: f64) {
        if v.is_finite() {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    fn finish(self, pad: f64) -> Self {
        if !self.min.is_finite() {
            return Self { min: 0.0, max: 1.0 };
        }
        if self.max <= self.min {
            return Self {
                min: self.min - 0.5,
                max: self.max + 0.5,
            };
        }
        let span = self.max - self.min;
        Self {
            min: self.min - span * pad,
            max: self.max + span * pad,
        }
    }

    fn span(&self) -> f64 {
        self.max - self.min
    }
}

struct SvgRenderer<'a> {
    chart: &'a Chart,
    bins: Vec<Vec<Bin>>,
    x: Range,
    y: Range,
    plot_w: f64,
    plot_h: f64,
}

impl<'a> SvgRenderer<'a> {
    fn new(chart: &'a Chart) -> Self {
        let bins: Vec<Vec<Bin>> = chart
            .series
            .iter()
            .map(|s| match s {
                Series::Histogram { values, bins, .. } => histogram(values, *bins),
                _ => Vec::new(),
            })
            .collect();

        let fx = |v: f64| if chart.log_x { log10_or_nan(v) } else { v };
        let mut x = Range::empty();
        let mut y = Range::empty();
        let mut has_histogram = false;

        for (series, series_bins) in chart.series.iter().zip(&bins) {
            match series {
                Series::Histogram { .. } => {
                    has_histogram |= !series_bins.is_empty();
                    for b in series_bins {
                        x.include(fx(b.lower));
                        x.include(fx(b.upper));
                        y.include(b.density);
                    }
                }
                Series::Line { points, .. } => {
                    for &(px, py) in points {
                        x.include(fx(px));
                        y.include(py);
                    }
                }
                Series::HorizontalRule { y: ry, .. } => y.include(*ry),
                Series::VerticalRule { x: rx, .. } => x.include(fx(*rx)),
            }
        }
        if has_histogram {
            y.include(0.0);
        }

        let x = x.finish(0.04);
        let mut y = y.finish(0.06);
        if has_histogram {
            y.min = 0.0;
        }

        Self {
            chart,
            bins,
            x,
            y,
            plot_w: (f64::from(chart.width) - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            plot_h: (f64::from(chart.height) - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        }
    }

    fn px(&self, data_x: f64) -> f64 {
        let v = if self.chart.log_x {
            log10_or_nan(data_x)
        } else {
            data_x
        };
        MARGIN_LEFT + (v - self.x.min) / self.x.span() * self.plot_w
    }

    fn py(&self, data_y: f64) -> f64 {
        MARGIN_TOP + self.plot_h - (data_y - self.y.min) / self.y.span() * self.plot_h
    }

    fn render(&self) -> String {
        let (w, h) = (self.chart.width, self.chart.height);
        let mut svg = String::with_capacity(16 * 1024);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#
        );
        let _ = writeln!(svg, r#"<rect width="{w}" height="{h}" fill="white"/>"#);

        self.render_axes(&mut svg);
        let _ = writeln!(
            svg,
            r#"<clipPath id="plot"><rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{:.2}" height="{:.2}"/></clipPath>"#,
            self.plot_w, self.plot_h
        );
        let _ = writeln!(svg, r#"<g clip-path="url(#plot)">"#);
        for (series, bins) in self.chart.series.iter().zip(&self.bins) {
            self.render_series(&mut svg, series, bins);
        }
        let _ = writeln!(svg, "</g>");
        self.render_legend(&mut svg);
        svg.push_str("</svg>\n");
        svg
    }

    fn render_axes(&self, svg: &mut String) {
        let left = MARGIN_LEFT;
        let bottom = MARGIN_TOP + self.plot_h;
        let right = MARGIN_LEFT + self.plot_w;

        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="26" text-anchor="middle" font-size="16">{}</text>"#,
            f64::from(self.chart.width) / 2.0,
            escape(&self.chart.title)
        );

        for (value, label) in self.x_ticks() {
            let x = self.px(value);
            if self.chart.grid {
                let _ = writeln!(
                    svg,
                    r##"<line x1="{x:.2}" y1="{MARGIN_TOP}" x2="{x:.2}" y2="{bottom:.2}" stroke="#dddddd"/>"##
                );
            }
            let _ = writeln!(
                svg,
                r#"<line x1="{x:.2}" y1="{bottom:.2}" x2="{x:.2}" y2="{:.2}" stroke="black"/>"#,
                bottom + 5.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{x:.2}" y="{:.2}" text-anchor="middle" font-size="11">{label}</text>"#,
                bottom + 18.0
            );
        }

        for value in linspace(self.y.min, self.y.max, TICKS) {
            let y = self.py(value);
            if self.chart.grid {
                let _ = writeln!(
                    svg,
                    r##"<line x1="{left}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="#dddddd"/>"##
                );
            }
            let _ = writeln!(
                svg,
                r#"<line x1="{:.2}" y1="{y:.2}" x2="{left}" y2="{y:.2}" stroke="black"/>"#,
                left - 5.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="end" font-size="11">{}</text>"#,
                left - 8.0,
                y + 4.0,
                format_tick(value)
            );
        }

        let _ = writeln!(
            svg,
            r#"<rect x="{left}" y="{MARGIN_TOP}" width="{:.2}" height="{:.2}" fill="none" stroke="black"/>"#,
            self.plot_w, self.plot_h
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="13">{}</text>"#,
            left + self.plot_w / 2.0,
            f64::from(self.chart.height) - 14.0,
            escape(&self.chart.x_label)
        );
        let cy = MARGIN_TOP + self.plot_h / 2.0;
        let _ = writeln!(
            svg,
            r#"<text x="18" y="{cy:.2}" text-anchor="middle" font-size="13" transform="rotate(-90 18 {cy:.2})">{}</text>"#,
            escape(&self.chart.y_label)
        );
    }

    fn x_ticks(&self) -> Vec<(f64, String)> {
        if self.chart.log_x {
            let lo = self.x.min.ceil() as i32;
            let hi = self.x.max.floor() as i32;
            (lo..=hi)
                .map(|e| (10f64.powi(e), format!("10^{e}")))
                .collect()
        } else {
            linspace(self.x.min, self.x.max, TICKS)
                .into_iter()
                .map(|v| (v, format_tick(v)))
                .collect()
        }
    }

    fn render_series(&self, svg: &mut String, series: &Series, bins: &[Bin]) {
        match series {
            Series::Histogram { color, .. } => {
                for bin in bins {
                    let x0 = self.px(bin.lower);
                    let x1 = self.px(bin.upper);
                    let y0 = self.py(bin.density);
                    let base = self.py(0.0);
                    let _ = writeln!(
                        svg,
                        r#"<rect class="bar" x="{x0:.2}" y="{y0:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{:.2}" stroke="white" stroke-width="0.5"/>"#,
                        (x1 - x0).max(0.5),
                        (base - y0).max(0.0),
                        color.hex(),
                        color.alpha
                    );
                }
            }
            Series::Line {
                points,
                color,
                stroke,
                markers,
                ..
            } => {
                let path: Vec<String> = points
                    .iter()
                    .map(|&(x, y)| format!("{:.2},{:.2}", self.px(x), self.py(y)))
                    .collect();
                let _ = writeln!(
                    svg,
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-opacity="{:.2}" stroke-width="2"{}/>"#,
                    path.join(" "),
                    color.hex(),
                    color.alpha,
                    dash_attr(*stroke)
                );
                if *markers {
                    for &(x, y) in points {
                        let _ = writeln!(
                            svg,
                            r#"<circle cx="{:.2}" cy="{:.2}" r="4" fill="{}"/>"#,
                            self.px(x),
                            self.py(y),
                            color.hex()
                        );
                    }
                }
            }
            Series::HorizontalRule { y, color, .. } => {
                let y = self.py(*y);
                let _ = writeln!(
                    svg,
                    r#"<line x1="{MARGIN_LEFT}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{}" stroke-width="2"{}/>"#,
                    MARGIN_LEFT + self.plot_w,
                    color.hex(),
                    dash_attr(Stroke::Dashed)
                );
            }
            Series::VerticalRule { x, color, .. } => {
                let x = self.px(*x);
                let _ = writeln!(
                    svg,
                    r#"<line x1="{x:.2}" y1="{MARGIN_TOP}" x2="{x:.2}" y2="{:.2}" stroke="{}" stroke-width="2"{}/>"#,
                    MARGIN_TOP + self.plot_h,
                    color.hex(),
                    dash_attr(Stroke::Dashed)
                );
            }
        }
    }

    fn render_legend(&self, svg: &mut String) {
        let entries: Vec<&Series> = self
            .chart
            .series
            .iter()
            .filter(|s| !s.label().is_empty())
            .collect();
        if entries.is_empty() {
            return;
        }

        let x = MARGIN_LEFT + self.plot_w - 250.0;
        let mut y = MARGIN_TOP + 12.0;
        let _ = writeln!(
            svg,
            r##"<rect x="{:.2}" y="{MARGIN_TOP}" width="246" height="{:.2}" fill="white" fill-opacity="0.85" stroke="#cccccc"/>"##,
            x - 4.0,
            entries.len() as f64 * 18.0 + 8.0
        );
        for series in entries {
            let color = series.color();
            let _ = writeln!(
                svg,
                r#"<rect class="legend" x="{x:.2}" y="{:.2}" width="14" height="10" fill="{}" fill-opacity="{:.2}"/>"#,
                y - 1.0,
                color.hex(),
                color.alpha
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-size="12">{}</text>"#,
                x + 20.0,
                y + 9.0,
                escape(series.label())
            );
            y += 18.0;
        }
    }
}

fn log10_or_nan(v: f64) -> f64 {
    if v > 0.0 {
        v.log10()
    } else {
        f64::NAN
    }
}

fn dash_attr(stroke: Stroke) -> &'static str {
    match stroke {
        Stroke::Solid => "",
        Stroke::Dashed => r#" stroke-dasharray="8 5""#,
    }
}

fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e5).contains(&a) {
        format!("{v:.1e}")
    } else if a >= 100.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// JSON export
// ============================================================================

/// Write `value` as pretty-printed JSON to `path`.
///
/// # Errors
///
/// Returns [`SimError::Io`] or [`SimError::Serialization`] on failure.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> SimResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| SimError::serialization(format!("JSON serialization failed: {e}")))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_and_density() {
        let values: Vec<f64> = (0..1000).map(|i| f64::from(i) / 1000.0).collect();
        let bins = histogram(&values, 10);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 1000);
        let area: f64 = bins.iter().map(|b| b.density * (b.upper - b.lower)).sum();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_max_lands_in_last_bin() {
        let bins = histogram(&[0.0, 1.0, 2.0], 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 2);
    }

    #[test]
    fn test_histogram_degenerate_inputs() {
        assert!(histogram(&[], 10).is_empty());
        assert!(histogram(&[f64::NAN, f64::INFINITY], 10).is_empty());

        let same = histogram(&[3.0, 3.0, 3.0], 4);
        assert_eq!(same.len(), 4);
        assert_eq!(same.iter().map(|b| b.count).sum::<usize>(), 3);

        let zero_bins = histogram(&[1.0, 2.0], 0);
        assert_eq!(zero_bins.len(), 1);
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        let pts = linspace(0.0, 1.0, 5);
        assert_eq!(pts.len(), 5);
        assert!((pts[4] - 1.0).abs() < 1e-12);
        assert!((pts[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_render_histogram_chart() {
        let chart = Chart::new("Histogram <test>")
            .x_label("Value")
            .y_label("Density")
            .histogram("draws", vec![0.1, 0.2, 0.3, 0.9], 3, Color::BLUE.with_alpha(0.5))
            .vrule("XY=3", 0.5, Color::RED);
        let svg = chart.render_svg();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Histogram &lt;test&gt;"));
        assert_eq!(svg.matches(r#"class="bar""#).count(), 3);
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("XY=3"));
        assert!(svg.contains(r#"fill-opacity="0.50""#));
    }

    #[test]
    fn test_render_log_axis_ticks() {
        let points = vec![(100.0, 1.01), (1_000.0, 1.02), (10_000.0, 0.999), (100_000.0, 0.9993)];
        let chart = Chart::new("Convergence")
            .log_x()
            .grid()
            .line("estimate", points, Color::BLUE, Stroke::Solid, true)
            .hrule("theoretical", 1.0, Color::RED);
        let svg = chart.render_svg();

        for label in ["10^2", "10^3", "10^4", "10^5"] {
            assert!(svg.contains(label), "missing tick {label}");
        }
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_render_empty_chart() {
        let svg = Chart::new("Empty").render_svg();
        assert!(svg.contains("Empty"));
        assert!(!svg.contains(r#"class="legend""#));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0.00");
        assert_eq!(format_tick(1.5), "1.50");
        assert_eq!(format_tick(250.0), "250");
        assert!(format_tick(1e-6).contains('e'));
    }

    #[test]
    fn test_save_and_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let svg_path = dir.path().join("chart.svg");
        Chart::new("Saved")
            .histogram("x", vec![1.0, 2.0], 2, Color::BLUE)
            .save(&svg_path)
            .unwrap();
        let content = std::fs::read_to_string(&svg_path).unwrap();
        assert!(content.contains("Saved"));

        let json_path = dir.path().join("report.json");
        write_json(&Bin { lower: 0.0, upper: 1.0, count: 2, density: 2.0 }, &json_path).unwrap();
        let back: Bin = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(back.count, 2);
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.svg");
        let err = Chart::new("x").save(&path).unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
