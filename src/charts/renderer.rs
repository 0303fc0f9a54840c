//! Static Chart Renderer
//! Renders chart projections to PNG images for export.
//!
//! Drawing goes through plotters' bitmap backend into an RGB buffer, which is
//! then PNG-encoded in memory with the `image` crate.

use crate::charts::projector::{ChartKind, ChartProjection, HistogramBin, PieSlice};
use crate::charts::{category_label, PALETTE_RGB};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

const FONT: &str = "sans-serif";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Invalid image size {0}x{1}")]
    InvalidSize(u32, u32),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn palette(index: usize) -> RGBColor {
    let (r, g, b) = PALETTE_RGB[index % PALETTE_RGB.len()];
    RGBColor(r, g, b)
}

/// Value axis range that always includes zero, padded at the top.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.1).max(1.0);
    (if min < 0.0 { min - pad } else { 0.0 }, max + pad)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a projection as a PNG image.
    pub fn render_png(
        projection: &ChartProjection,
        kind: ChartKind,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize(width, height));
        }

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            Self::draw(&root, projection, kind, title)?;
            root.present().map_err(draw_err)?;
        }

        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or(RenderError::InvalidSize(width, height))?;
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    fn draw(
        root: &Area,
        projection: &ChartProjection,
        kind: ChartKind,
        title: &str,
    ) -> Result<(), RenderError> {
        if projection.is_empty() {
            return Self::draw_empty(root, title);
        }

        match projection {
            ChartProjection::Series { columns, points } => {
                let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
                let series: Vec<(String, Vec<f64>)> = columns
                    .iter()
                    .map(|col| {
                        let values = points
                            .iter()
                            .map(|p| p.value(col).unwrap_or(0.0))
                            .collect();
                        (col.clone(), values)
                    })
                    .collect();

                match kind {
                    ChartKind::Bar => Self::draw_horizontal_bars(root, title, &labels, &series),
                    ChartKind::Line => Self::draw_lines(root, title, &labels, &series, false),
                    ChartKind::Area => Self::draw_lines(root, title, &labels, &series, true),
                    _ => Self::draw_columns(root, title, &labels, &series),
                }
            }
            ChartProjection::Pie { slices, .. } => Self::draw_pie(root, title, slices),
            ChartProjection::Histogram { column, bins } => {
                Self::draw_histogram(root, title, column, bins)
            }
            ChartProjection::Frequency { column, bins } => {
                Self::draw_frequency_polygon(root, title, column, bins)
            }
            ChartProjection::Ogive { column, points } => {
                let labels: Vec<String> = points.iter().map(|p| p.range_label.clone()).collect();
                let values = points
                    .iter()
                    .map(|p| p.cumulative_frequency as f64)
                    .collect();
                let series = vec![(format!("Cumulative {}", column), values)];
                Self::draw_lines(root, title, &labels, &series, false)
            }
        }
    }

    fn draw_empty(root: &Area, title: &str) -> Result<(), RenderError> {
        let (w, h) = root.dim_in_pixel();
        let area = root
            .titled(title, (FONT, 26).into_font())
            .map_err(draw_err)?;
        area.draw(&Text::new(
            "No rows to chart",
            (w as i32 / 2 - 80, h as i32 / 2 - 40),
            (FONT, 20).into_font().color(&BLACK),
        ))
        .map_err(draw_err)?;
        Ok(())
    }

    /// Vertical bars, grouped per row.
    fn draw_columns(
        root: &Area,
        title: &str,
        labels: &[String],
        series: &[(String, Vec<f64>)],
    ) -> Result<(), RenderError> {
        let n = labels.len();
        let (y_min, y_max) = value_range(series.iter().flat_map(|(_, v)| v.iter().copied()));
        let bar_width = 0.8 / series.len().max(1) as f64;

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 26).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n.max(2))
            .x_label_formatter(&|x| category_label(labels, *x))
            .draw()
            .map_err(draw_err)?;

        for (s, (name, values)) in series.iter().enumerate() {
            let color = palette(s);
            let offset = -0.4 + bar_width * s as f64;
            chart
                .draw_series(values.iter().enumerate().map(|(i, &v)| {
                    let x0 = i as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, v)], color.filled())
                }))
                .map_err(draw_err)?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        Self::draw_legend(&mut chart)
    }

    /// Horizontal bars, grouped per row, categories on the Y axis.
    fn draw_horizontal_bars(
        root: &Area,
        title: &str,
        labels: &[String],
        series: &[(String, Vec<f64>)],
    ) -> Result<(), RenderError> {
        let n = labels.len();
        let (x_min, x_max) = value_range(series.iter().flat_map(|(_, v)| v.iter().copied()));
        let bar_height = 0.8 / series.len().max(1) as f64;

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 26).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_min..x_max, -0.5f64..(n as f64 - 0.5))
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n.max(2))
            .y_label_formatter(&|y| category_label(labels, *y))
            .draw()
            .map_err(draw_err)?;

        for (s, (name, values)) in series.iter().enumerate() {
            let color = palette(s);
            let offset = -0.4 + bar_height * s as f64;
            chart
                .draw_series(values.iter().enumerate().map(|(i, &v)| {
                    let y0 = i as f64 + offset;
                    Rectangle::new([(0.0, y0), (v, y0 + bar_height)], color.filled())
                }))
                .map_err(draw_err)?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        Self::draw_legend(&mut chart)
    }

    fn draw_lines(
        root: &Area,
        title: &str,
        labels: &[String],
        series: &[(String, Vec<f64>)],
        filled: bool,
    ) -> Result<(), RenderError> {
        let n = labels.len();
        let (y_min, y_max) = value_range(series.iter().flat_map(|(_, v)| v.iter().copied()));
        let x_max = (n as f64 - 1.0).max(1.0);

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 26).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.25f64..(x_max + 0.25), y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(n.max(2))
            .x_label_formatter(&|x| category_label(labels, *x))
            .draw()
            .map_err(draw_err)?;

        for (s, (name, values)) in series.iter().enumerate() {
            let color = palette(s);
            let points: Vec<(f64, f64)> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .collect();

            if filled {
                chart
                    .draw_series(
                        AreaSeries::new(points.iter().copied(), 0.0, color.mix(0.2))
                            .border_style(color.stroke_width(2)),
                    )
                    .map_err(draw_err)?
                    .label(name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            } else {
                chart
                    .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                    .map_err(draw_err)?
                    .label(name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
                .map_err(draw_err)?;
        }

        Self::draw_legend(&mut chart)
    }

    fn bin_range(bins: &[HistogramBin]) -> (f64, f64) {
        let low = bins.first().map(|b| b.range_low).unwrap_or(0.0);
        let high = bins.last().map(|b| b.range_high).unwrap_or(1.0);
        (low, high)
    }

    fn draw_histogram(
        root: &Area,
        title: &str,
        column: &str,
        bins: &[HistogramBin],
    ) -> Result<(), RenderError> {
        let (low, high) = Self::bin_range(bins);
        let (_, y_max) = value_range(bins.iter().map(|b| b.frequency as f64));
        let color = palette(0);

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 26).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(low..high, 0.0..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(column)
            .y_desc("Frequency")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(bins.iter().map(|bin| {
                Rectangle::new(
                    [(bin.range_low, 0.0), (bin.range_high, bin.frequency as f64)],
                    color.mix(0.7).filled(),
                )
            }))
            .map_err(draw_err)?;
        chart
            .draw_series(bins.iter().map(|bin| {
                Rectangle::new(
                    [(bin.range_low, 0.0), (bin.range_high, bin.frequency as f64)],
                    BLACK.stroke_width(1),
                )
            }))
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_frequency_polygon(
        root: &Area,
        title: &str,
        column: &str,
        bins: &[HistogramBin],
    ) -> Result<(), RenderError> {
        let (low, high) = Self::bin_range(bins);
        let (_, y_max) = value_range(bins.iter().map(|b| b.frequency as f64));
        let color = palette(1);
        let points: Vec<(f64, f64)> = bins
            .iter()
            .map(|b| (b.midpoint(), b.frequency as f64))
            .collect();

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 26).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(low..high, 0.0..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(column)
            .y_desc("Frequency")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(draw_err)?;
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_pie(root: &Area, title: &str, slices: &[PieSlice]) -> Result<(), RenderError> {
        let sizes: Vec<f64> = slices.iter().map(|s| s.value.max(0.0)).collect();
        if sizes.iter().sum::<f64>() <= 0.0 {
            return Self::draw_empty(root, title);
        }

        let area = root
            .titled(title, (FONT, 26).into_font())
            .map_err(draw_err)?;
        let (w, h) = area.dim_in_pixel();

        let colors: Vec<RGBColor> = slices.iter().map(|s| palette(s.color_index)).collect();
        let labels: Vec<String> = slices.iter().map(|s| s.label.clone()).collect();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = (w.min(h) as f64 / 2.0 - 60.0).max(20.0);

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.label_style((FONT, 16).into_font().color(&BLACK));
        pie.percentages((FONT, 14).into_font().color(&WHITE));
        area.draw(&pie).map_err(draw_err)?;
        Ok(())
    }

    fn draw_legend<'a, 'b, X, Y>(
        chart: &mut ChartContext<'a, BitMapBackend<'b>, Cartesian2d<X, Y>>,
    ) -> Result<(), RenderError>
    where
        'b: 'a,
        X: Ranged,
        Y: Ranged,
    {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }
}
