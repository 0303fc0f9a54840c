//! Chart Plotter Module
//! Interactive visualizations of chart projections using egui_plot.

use crate::charts::projector::{ChartKind, ChartProjection, HistogramBin, PieSlice};
use crate::charts::{category_label, PALETTE_RGB};
use crate::stats::ReportStatistics;
use crate::stats::query::format_number;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use std::f32::consts::TAU;

/// Widest arc drawn as one convex polygon.
const MAX_SECTOR_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

/// Creates chart widgets using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Palette color for a series or slice index.
    pub fn palette_color(index: usize) -> Color32 {
        let (r, g, b) = PALETTE_RGB[index % PALETTE_RGB.len()];
        Color32::from_rgb(r, g, b)
    }

    /// Draw a projection as the requested chart kind.
    pub fn draw_chart(
        ui: &mut egui::Ui,
        id: &str,
        kind: ChartKind,
        projection: &ChartProjection,
        height: f32,
    ) {
        if projection.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No rows to chart").size(16.0).color(Color32::GRAY));
            });
            return;
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
                    ChartKind::Bar => Self::draw_bars(ui, id, &labels, &series, true, height),
                    ChartKind::Line => Self::draw_lines(ui, id, &labels, &series, false, height),
                    ChartKind::Area => Self::draw_lines(ui, id, &labels, &series, true, height),
                    _ => Self::draw_bars(ui, id, &labels, &series, false, height),
                }
            }
            ChartProjection::Pie { slices, .. } => Self::draw_pie(ui, slices, height),
            ChartProjection::Histogram { column, bins } => {
                Self::draw_histogram(ui, id, column, bins, height)
            }
            ChartProjection::Frequency { column, bins } => {
                Self::draw_frequency_polygon(ui, id, column, bins, height)
            }
            ChartProjection::Ogive { column, points } => {
                let labels: Vec<String> = points.iter().map(|p| p.range_label.clone()).collect();
                let values = points
                    .iter()
                    .map(|p| p.cumulative_frequency as f64)
                    .collect();
                let series = vec![(format!("Cumulative {}", column), values)];
                Self::draw_lines(ui, id, &labels, &series, false, height);
            }
        }
    }

    /// Grouped bars, one group per row. Horizontal bars put labels on Y.
    fn draw_bars(
        ui: &mut egui::Ui,
        id: &str,
        labels: &[String],
        series: &[(String, Vec<f64>)],
        horizontal: bool,
        height: f32,
    ) {
        let group_width = 0.8;
        let bar_width = group_width / series.len().max(1) as f64;
        let axis_labels = labels.to_vec();

        let mut plot = Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false);
        let formatter = move |mark: egui_plot::GridMark, _range: &std::ops::RangeInclusive<f64>| {
            category_label(&axis_labels, mark.value)
        };
        plot = if horizontal {
            plot.y_axis_formatter(formatter)
        } else {
            plot.x_axis_formatter(formatter)
        };

        plot.show(ui, |plot_ui| {
            for (s, (name, values)) in series.iter().enumerate() {
                let color = Self::palette_color(s);
                let offset = -group_width / 2.0 + bar_width * (s as f64 + 0.5);
                let bars: Vec<Bar> = values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        Bar::new(i as f64 + offset, v)
                            .width(bar_width)
                            .fill(color)
                            .name(&labels[i])
                    })
                    .collect();

                let mut chart = BarChart::new(bars).color(color).name(name);
                if horizontal {
                    chart = chart.horizontal();
                }
                plot_ui.bar_chart(chart);
            }
        });
    }

    /// One line per series; `filled` shades the area down to zero.
    fn draw_lines(
        ui: &mut egui::Ui,
        id: &str,
        labels: &[String],
        series: &[(String, Vec<f64>)],
        filled: bool,
        height: f32,
    ) {
        let axis_labels = labels.to_vec();

        Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| category_label(&axis_labels, mark.value))
            .show(ui, |plot_ui| {
                for (s, (name, values)) in series.iter().enumerate() {
                    let color = Self::palette_color(s);
                    let points: Vec<[f64; 2]> = values
                        .iter()
                        .enumerate()
                        .map(|(i, &v)| [i as f64, v])
                        .collect();

                    let mut line = Line::new(PlotPoints::from(points.clone()))
                        .color(color)
                        .width(2.0)
                        .name(name);
                    if filled {
                        line = line.fill(0.0);
                    }
                    plot_ui.line(line);
                    plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0).color(color));
                }
            });
    }

    fn draw_histogram(
        ui: &mut egui::Ui,
        id: &str,
        column: &str,
        bins: &[HistogramBin],
        height: f32,
    ) {
        let color = Self::palette_color(0);
        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                Bar::new(bin.midpoint(), bin.frequency as f64)
                    .width(bin.range_high - bin.range_low)
                    .fill(color.gamma_multiply(0.7))
                    .stroke(egui::Stroke::new(1.0, color))
                    .name(bin.label())
            })
            .collect();

        Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label(column.to_string())
            .y_axis_label("Frequency")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(color).name(column));
            });
    }

    fn draw_frequency_polygon(
        ui: &mut egui::Ui,
        id: &str,
        column: &str,
        bins: &[HistogramBin],
        height: f32,
    ) {
        let color = Self::palette_color(1);
        let points: Vec<[f64; 2]> = bins
            .iter()
            .map(|bin| [bin.midpoint(), bin.frequency as f64])
            .collect();

        Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label(column.to_string())
            .y_axis_label("Frequency")
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .color(color)
                        .width(2.0)
                        .name(column),
                );
                plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0).color(color));
            });
    }

    /// Pie drawn with the painter; egui_plot has no pie primitive.
    fn draw_pie(ui: &mut egui::Ui, slices: &[PieSlice], height: f32) {
        let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();

        ui.horizontal(|ui| {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(height, height), egui::Sense::hover());
            let painter = ui.painter_at(rect);
            let center = rect.center();
            let radius = rect.width().min(rect.height()) / 2.0 - 8.0;

            if total <= 0.0 {
                painter.circle_stroke(center, radius, egui::Stroke::new(1.0, Color32::GRAY));
            } else {
                let mut start = -TAU / 4.0;
                for slice in slices {
                    let sweep = (slice.value.max(0.0) / total) as f32 * TAU;
                    let color = Self::palette_color(slice.color_index);
                    Self::fill_sector(&painter, center, radius, start, sweep, color);
                    start += sweep;
                }
            }

            ui.vertical(|ui| {
                for slice in slices {
                    ui.horizontal(|ui| {
                        let (swatch, _) =
                            ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                        ui.painter().rect_filled(
                            swatch,
                            3.0,
                            Self::palette_color(slice.color_index),
                        );
                        let share = if total > 0.0 {
                            slice.value.max(0.0) / total * 100.0
                        } else {
                            0.0
                        };
                        ui.label(
                            RichText::new(format!(
                                "{}  {} ({:.1}%)",
                                slice.label,
                                format_number(slice.value),
                                share
                            ))
                            .size(12.0),
                        );
                    });
                }
            });
        });
    }

    /// Fill an arc as a fan of convex polygons.
    fn fill_sector(
        painter: &egui::Painter,
        center: egui::Pos2,
        radius: f32,
        start: f32,
        sweep: f32,
        color: Color32,
    ) {
        let pieces = (sweep / MAX_SECTOR_ANGLE).ceil().max(1.0) as usize;
        let step = sweep / pieces as f32;

        for p in 0..pieces {
            let a0 = start + step * p as f32;
            let mut points = vec![center];
            for k in 0..=8 {
                let a = a0 + step * k as f32 / 8.0;
                points.push(center + radius * egui::vec2(a.cos(), a.sin()));
            }
            painter.add(egui::Shape::convex_polygon(points, color, egui::Stroke::NONE));
        }
    }

    /// Draw the report statistics table.
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &[ReportStatistics]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id("report_stats_table"))
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Column", "N", "Sum", "Average", "Median", "Min", "Max", "Std"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for s in stats {
                            ui.label(RichText::new(&s.column).size(11.0));
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                            for value in [s.sum, s.average, s.median, s.min, s.max, s.std_dev] {
                                ui.label(RichText::new(format!("{:.2}", value)).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_color_wraps() {
        assert_eq!(
            ChartPlotter::palette_color(0),
            ChartPlotter::palette_color(PALETTE_RGB.len())
        );
    }
}
