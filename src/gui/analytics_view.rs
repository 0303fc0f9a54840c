//! Teller Three
//! Read-only analytics over a stored table: charts, keyword queries and
//! the statistics report.

use crate::charts::{classify_columns, project, ChartKind, ChartPlotter, ProjectionError};
use crate::data::{Table, TableId, TableStore};
use crate::gui::{ACCENT, MUTED, PRIMARY, SUCCESS};
use crate::stats::query::format_number;
use crate::stats::{describe_query, generate_query_result, StatsCalculator};
use egui::{ComboBox, RichText, ScrollArea, TextEdit};
use std::path::PathBuf;

const CHART_HEIGHT: f32 = 380.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AnalyticsTab {
    #[default]
    Charts,
    Query,
    Report,
}

impl AnalyticsTab {
    const ALL: [AnalyticsTab; 3] = [AnalyticsTab::Charts, AnalyticsTab::Query, AnalyticsTab::Report];

    fn label(self) -> &'static str {
        match self {
            AnalyticsTab::Charts => "📊 Visualizations",
            AnalyticsTab::Query => "🔍 AI Query",
            AnalyticsTab::Report => "📄 Reports",
        }
    }
}

/// Actions the analytics view hands back to the application
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsAction {
    None,
    ExportReport(TableId),
    OpenFolder(PathBuf),
}

#[derive(Default)]
pub struct AnalyticsView {
    pub selected: Option<TableId>,
    tab: AnalyticsTab,
    kind: ChartKind,
    chosen_column: Option<String>,

    query: String,
    /// Generated query text and its answer or error.
    query_output: Option<(String, Result<String, String>)>,

    pub exporting: bool,
    export_status: Option<(String, bool)>,
    last_export_dir: Option<PathBuf>,
}

impl AnalyticsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus a table, e.g. from "View in Teller 3".
    pub fn select(&mut self, id: TableId) {
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.chosen_column = None;
            self.query_output = None;
        }
    }

    pub fn set_export_status(&mut self, status: impl Into<String>, is_error: bool) {
        self.export_status = Some((status.into(), is_error));
    }

    pub fn set_export_dir(&mut self, dir: PathBuf) {
        self.last_export_dir = Some(dir);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, store: &impl TableStore) -> AnalyticsAction {
        let ids = store.list();
        if self.selected.map_or(true, |id| !ids.contains(&id)) {
            self.selected = ids.first().copied();
            self.chosen_column = None;
        }

        let mut action = AnalyticsAction::None;

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new("Teller Three · Analytics Engine").size(16.0).strong());
                ui.label(
                    RichText::new("Read-only data visualization & AI reports")
                        .size(11.0)
                        .color(MUTED),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                for tab in AnalyticsTab::ALL.iter().rev() {
                    ui.selectable_value(&mut self.tab, *tab, tab.label());
                }
            });
        });
        ui.add_space(4.0);

        let selected_name = self
            .selected
            .and_then(|id| store.get(id).ok())
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "No database".to_string());
        ui.horizontal(|ui| {
            ui.label("Database:");
            ComboBox::from_id_salt("analytics_table")
                .width(220.0)
                .selected_text(selected_name)
                .show_ui(ui, |ui| {
                    for id in &ids {
                        if let Ok(table) = store.get(*id) {
                            if ui.selectable_label(self.selected == Some(*id), &table.name).clicked() {
                                self.select(*id);
                            }
                        }
                    }
                });
        });
        ui.separator();

        let Some((id, table)) = self.selected.and_then(|id| store.get(id).ok().map(|t| (id, t)))
        else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Create a database in Teller Two first").color(MUTED));
            });
            return action;
        };

        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| match self.tab {
            AnalyticsTab::Charts => self.show_charts(ui, table),
            AnalyticsTab::Query => self.show_query(ui, table),
            AnalyticsTab::Report => {
                if let Some(a) = self.show_report(ui, id, table) {
                    action = a;
                }
            }
        });

        action
    }

    fn show_charts(&mut self, ui: &mut egui::Ui, table: &Table) {
        let classification = classify_columns(table);

        ui.horizontal(|ui| {
            ui.label("Chart:");
            ComboBox::from_id_salt("chart_kind")
                .width(160.0)
                .selected_text(self.kind.label())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut self.kind, kind, kind.label());
                    }
                });

            if self.kind.uses_chosen_column() && classification.has_numeric() {
                let current = classification
                    .resolve_numeric(self.chosen_column.as_deref())
                    .map(str::to_string)
                    .unwrap_or_default();
                ui.label("Column:");
                ComboBox::from_id_salt("chart_column")
                    .width(160.0)
                    .selected_text(&current)
                    .show_ui(ui, |ui| {
                        for column in &classification.numeric {
                            if ui.selectable_label(*column == current, column).clicked() {
                                self.chosen_column = Some(column.clone());
                            }
                        }
                    });
            }
        });
        ui.add_space(8.0);

        let title = format!("{} · {}", table.name, self.kind.label());
        ui.label(RichText::new(title).size(13.0).strong().color(PRIMARY));
        match project(table, self.kind, self.chosen_column.as_deref()) {
            Ok(projection) => {
                ChartPlotter::draw_chart(ui, "analytics_chart", self.kind, &projection, CHART_HEIGHT)
            }
            Err(e) => empty_state(ui, e),
        }
    }

    fn show_query(&mut self, ui: &mut egui::Ui, table: &Table) {
        ui.label(
            RichText::new("Type a natural language query and the AI will generate results.")
                .size(12.0)
                .color(MUTED),
        );
        ui.add_space(6.0);

        let mut run = false;
        ui.horizontal(|ui| {
            let response = ui.add(
                TextEdit::singleline(&mut self.query)
                    .hint_text("e.g. total revenue")
                    .desired_width(ui.available_width() - 80.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                run = true;
            }
            if ui.button("Run").clicked() {
                run = true;
            }
        });

        if run && !self.query.trim().is_empty() {
            let classification = classify_columns(table);
            let sql = describe_query(table, &classification, &self.query);
            let result = generate_query_result(table, &classification, &self.query)
                .map_err(|e| e.to_string());
            self.query_output = Some((sql, result));
        }

        if let Some((sql, result)) = &self.query_output {
            ui.add_space(10.0);
            card(ui, |ui| {
                ui.label(RichText::new("Generated Query:").size(11.0).color(MUTED));
                ui.label(RichText::new(sql).monospace().color(PRIMARY));
                ui.add_space(6.0);
                match result {
                    Ok(answer) => ui.label(RichText::new(answer).size(16.0).strong()),
                    Err(e) => ui.label(RichText::new(e).color(ACCENT)),
                };
            });
        }
    }

    fn show_report(&mut self, ui: &mut egui::Ui, id: TableId, table: &Table) -> Option<AnalyticsAction> {
        let mut action = None;
        let classification = classify_columns(table);

        ui.label(
            RichText::new("Generate comprehensive reports with AI analysis.")
                .size(12.0)
                .color(MUTED),
        );
        ui.add_space(6.0);

        card(ui, |ui| {
            ui.label(RichText::new("📊 Executive Summary").strong());
            ui.label(format!(
                "{} holds {} records across {} fields ({} numeric).",
                table.name,
                table.row_count(),
                table.column_count(),
                classification.numeric.len()
            ));
        });
        ui.add_space(8.0);

        match StatsCalculator::compute_report_statistics(table, &classification) {
            Ok(stats) => {
                card(ui, |ui| {
                    ui.label(RichText::new(format!("📈 Key Metrics · {}", stats.column)).strong());
                    egui::Grid::new("key_metrics").spacing([24.0, 4.0]).show(ui, |ui| {
                        for (label, value) in [
                            ("Total", format_number(stats.sum)),
                            ("Average", format_number(stats.average)),
                            ("Count", stats.count.to_string()),
                            ("Median", format_number(stats.median)),
                            ("Min", format_number(stats.min)),
                            ("Max", format_number(stats.max)),
                        ] {
                            ui.label(RichText::new(label).color(MUTED));
                            ui.label(RichText::new(value).strong());
                            ui.end_row();
                        }
                    });
                });
                ui.add_space(8.0);
                let all = StatsCalculator::compute_all_column_statistics(table, &classification);
                ChartPlotter::draw_stats_table(ui, &all);
            }
            Err(e) => empty_state(ui, e),
        }

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!self.exporting, |ui| {
                if ui.button("🖨 Export Report").clicked() {
                    action = Some(AnalyticsAction::ExportReport(id));
                }
            });
            if self.exporting {
                ui.spinner();
            }
            if let Some(dir) = &self.last_export_dir {
                if ui.button("📂 Open Folder").clicked() {
                    action = Some(AnalyticsAction::OpenFolder(dir.clone()));
                }
            }
        });
        if let Some((status, is_error)) = &self.export_status {
            let color = if *is_error { ACCENT } else { SUCCESS };
            ui.label(RichText::new(status).size(11.0).color(color));
        }

        action
    }
}

fn card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) {
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            add_contents(ui);
        });
}

fn empty_state(ui: &mut egui::Ui, error: ProjectionError) {
    let message = match error {
        ProjectionError::NoNumericColumn => {
            "This database has no numeric field to chart. Add a number field in Teller Two."
        }
        ProjectionError::EmptyDataset => "No records yet. Add rows in Teller Two.",
    };
    ui.add_space(20.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(message).size(14.0).color(MUTED));
    });
}
