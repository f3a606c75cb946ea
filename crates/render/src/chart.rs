//! Line charts of a metric over time.

use crate::asset::{encode_png, RenderedAsset};
use crate::font::{load_chart_font, FONT_FAMILY};
use chrono::NaiveDate;
use deckgen_core::{Error, MetricSeries, Result};
use image::{Rgba, RgbaImage};
use plotters::prelude::*;
use std::path::Path;

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);

/// Renders one series as a PNG line chart with a transparent background.
/// Identical input always produces identical bytes.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    text: bool,
}

impl ChartRenderer {
    /// Create a renderer of `size` pixels. Text is drawn only when a chart
    /// font can be loaded from `font_path` or the system.
    pub fn new(size: (u32, u32), font_path: Option<&Path>) -> Self {
        Self {
            width: size.0,
            height: size.1,
            text: load_chart_font(font_path),
        }
    }

    /// Renderer that never draws text.
    pub fn without_text(size: (u32, u32)) -> Self {
        Self {
            width: size.0,
            height: size.1,
            text: false,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render the chart into a temporary file in `dir`.
    pub fn render(&self, title: &str, series: &MetricSeries, dir: &Path) -> Result<RenderedAsset> {
        let png = self.render_png(title, series)?;
        RenderedAsset::write(dir, "chart-", &png)
    }

    /// Render the chart as PNG bytes.
    pub fn render_png(&self, title: &str, series: &MetricSeries) -> Result<Vec<u8>> {
        if series.is_empty() {
            return Err(Error::Render(format!(
                "No data points to chart for '{}'",
                series.name
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::Render("Chart size must be non-zero".to_string()));
        }

        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        self.draw(&mut buffer, title, series)
            .map_err(|e| Error::Render(format!("Failed to draw chart '{}': {}", title, e)))?;

        log::debug!(
            "Rendered chart '{}' with {} points",
            title,
            series.points.len()
        );
        encode_png(&transparent_background(&buffer, self.width, self.height))
    }

    fn draw(
        &self,
        buffer: &mut [u8],
        title: &str,
        series: &MetricSeries,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(buffer, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_range, y_range) = ranges(series);
        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if self.text {
            builder
                .caption(title, TextStyle::from((FONT_FAMILY, 24).into_font()))
                .x_label_area_size(40)
                .y_label_area_size(70);
        }
        let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

        if self.text {
            chart
                .configure_mesh()
                .x_labels(6)
                .y_labels(8)
                .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
                .y_label_formatter(&|v: &f64| compact_number(*v))
                .label_style(TextStyle::from((FONT_FAMILY, 14).into_font()))
                .light_line_style(&GRID_COLOR)
                .draw()?;
        }

        chart.draw_series(LineSeries::new(
            series.points.iter().map(|p| (p.period, p.value)),
            LINE_COLOR.stroke_width(2),
        ))?;

        root.present()?;
        Ok(())
    }
}

/// Axis ranges with a little headroom. A single point still gets a non-empty range.
fn ranges(series: &MetricSeries) -> (std::ops::Range<NaiveDate>, std::ops::Range<f64>) {
    let first = series.points[0].period;
    let last = series.points[series.points.len() - 1].period;
    let last = if last > first {
        last
    } else {
        first.succ_opt().unwrap_or(first)
    };

    let (min, max) = series
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        });
    let pad = if max > min {
        (max - min) * 0.05
    } else if max != 0.0 {
        max.abs() * 0.1
    } else {
        1.0
    };

    (first..last, (min - pad)..(max + pad))
}

/// Turn the white canvas transparent.
fn transparent_background(rgb: &[u8], width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    for (pixel, chunk) in image.pixels_mut().zip(rgb.chunks_exact(3)) {
        let alpha = if chunk == [255, 255, 255] { 0 } else { 255 };
        *pixel = Rgba([chunk[0], chunk[1], chunk[2], alpha]);
    }
    image
}

/// Compact axis label: `1.5K`, `2.3M`, `394.3B`, `1.2T`.
pub fn compact_number(value: f64) -> String {
    const SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let (scaled, suffix) = SUFFIXES
        .iter()
        .find(|(unit, _)| value.abs() >= *unit)
        .map(|(unit, suffix)| (value / unit, *suffix))
        .unwrap_or((value, ""));

    let mut text = format!("{:.1}", scaled);
    if text.ends_with(".0") {
        text.truncate(text.len() - 2);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    format!("{}{}", text, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_core::DataPoint;

    fn series(values: &[f64]) -> MetricSeries {
        let points = values.iter().enumerate().map(|(i, v)| {
            DataPoint::new(
                NaiveDate::from_ymd_opt(2020 + i as i32, 9, 30).unwrap(),
                *v,
            )
        });
        MetricSeries::new("Total Revenue", points)
    }

    fn decode(png: &[u8]) -> RgbaImage {
        image::load_from_memory(png).unwrap().to_rgba8()
    }

    #[test]
    fn test_compact_number() {
        assert_eq!(compact_number(0.0), "0");
        assert_eq!(compact_number(150.0), "150");
        assert_eq!(compact_number(1_500.0), "1.5K");
        assert_eq!(compact_number(2_000_000.0), "2M");
        assert_eq!(compact_number(394_328_000_000.0), "394.3B");
        assert_eq!(compact_number(-1_200_000_000_000.0), "-1.2T");
        assert_eq!(compact_number(-0.01), "0");
    }

    #[test]
    fn test_render_size_and_transparency() {
        let renderer = ChartRenderer::without_text((320, 200));
        let png = renderer
            .render_png("Apple Inc. Total Revenue USD", &series(&[274.5e9, 365.8e9, 394.3e9, 383.3e9]))
            .unwrap();
        let image = decode(&png);

        assert_eq!(image.dimensions(), (320, 200));
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert!(image.pixels().any(|p| p[3] == 255));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = ChartRenderer::new((300, 200), None);
        let data = series(&[1.0, 3.0, 2.0]);
        assert_eq!(
            renderer.render_png("EBITDA", &data).unwrap(),
            renderer.render_png("EBITDA", &data).unwrap()
        );
    }

    #[test]
    fn test_single_point_and_flat_series() {
        let renderer = ChartRenderer::without_text((200, 150));
        assert!(renderer.render_png("one", &series(&[42.0])).is_ok());
        assert!(renderer.render_png("flat", &series(&[0.0, 0.0])).is_ok());
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let renderer = ChartRenderer::without_text((200, 150));
        let empty = MetricSeries::new("Stock Price", Vec::new());
        assert!(matches!(
            renderer.render_png("Stock Price", &empty),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::without_text((120, 80));
        let asset = renderer.render("x", &series(&[1.0, 2.0]), dir.path()).unwrap();
        let image = image::open(asset.path()).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (120, 80));
    }
}
