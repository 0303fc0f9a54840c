//! Teller Two
//! Database strip plus the grid editor for the selected table.

use crate::data::{ColumnType, Table, TableId, TableMutation, TableStore, TableVisibility};
use crate::gui::{ACCENT, MUTED, PRIMARY, SUCCESS};
use egui::{ComboBox, Key, RichText, ScrollArea, TextEdit};

const CELL_WIDTH: f32 = 120.0;

/// Actions the editor hands back to the application
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    None,
    ViewInAnalytics(TableId),
    ImportCsv,
    ExportCsv(TableId),
}

pub struct TableEditor {
    pub selected: Option<TableId>,

    show_create: bool,
    new_name: String,
    new_visibility: TableVisibility,

    /// Column index being renamed and the edit buffer.
    editing_field: Option<(usize, String)>,
    focus_rename: bool,

    status: String,
    status_is_error: bool,
}

impl Default for TableEditor {
    fn default() -> Self {
        Self {
            selected: None,
            show_create: false,
            new_name: String::new(),
            new_visibility: TableVisibility::Personal,
            editing_field: None,
            focus_rename: false,
            status: "Ready".to_string(),
            status_is_error: false,
        }
    }
}

impl TableEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>, is_error: bool) {
        self.status = status.into();
        self.status_is_error = is_error;
    }

    /// Keep the selection pointing at a stored table.
    fn sync_selection(&mut self, store: &impl TableStore) {
        let ids = store.list();
        if self.selected.map_or(true, |id| !ids.contains(&id)) {
            self.selected = ids.first().copied();
            self.editing_field = None;
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, store: &mut impl TableStore) -> EditorAction {
        self.sync_selection(&*store);
        let mut action = EditorAction::None;

        egui::SidePanel::left("database_strip")
            .resizable(false)
            .exact_width(220.0)
            .show_inside(ui, |ui| {
                if let Some(a) = self.show_strip(ui, store) {
                    action = a;
                }
            });

        egui::TopBottomPanel::bottom("editor_status")
            .show_inside(ui, |ui| self.show_status_bar(ui, &*store));

        egui::CentralPanel::default().show_inside(ui, |ui| {
            let mut mutations = Vec::new();
            match self.selected.and_then(|id| store.get(id).ok().map(|t| (id, t))) {
                Some((id, table)) => {
                    if let Some(a) = self.show_table(ui, id, table, &mut mutations) {
                        action = a;
                    }
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("Select or create a database").color(MUTED));
                    });
                }
            }
            self.apply_mutations(store, mutations);
        });

        if self.show_create {
            self.show_create_modal(ui.ctx(), store);
        }

        action
    }

    fn apply_mutations(&mut self, store: &mut impl TableStore, mutations: Vec<TableMutation>) {
        let Some(id) = self.selected else {
            return;
        };
        for mutation in mutations {
            if let Err(e) = store.apply(id, mutation) {
                self.set_status(format!("Error: {}", e), true);
            }
        }
    }

    fn show_strip(&mut self, ui: &mut egui::Ui, store: &mut impl TableStore) -> Option<EditorAction> {
        let mut action = None;
        let mut to_delete = None;

        ui.add_space(8.0);
        ui.label(RichText::new("Databases").size(14.0).strong());
        ui.add_space(6.0);

        ScrollArea::vertical()
            .max_height(ui.available_height() - 80.0)
            .show(ui, |ui| {
                for id in store.list() {
                    let Ok(table) = store.get(id) else {
                        continue;
                    };
                    let selected = self.selected == Some(id);
                    ui.horizontal(|ui| {
                        let icon = match table.visibility {
                            TableVisibility::Personal => "🔒",
                            TableVisibility::Public => "🌐",
                        };
                        let label = RichText::new(format!("{} {}", icon, table.name)).size(12.0);
                        if ui.selectable_label(selected, label).clicked() && !selected {
                            self.selected = Some(id);
                            self.editing_field = None;
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("🗑").on_hover_text("Delete database").clicked() {
                                to_delete = Some(id);
                            }
                        });
                    });
                    ui.label(
                        RichText::new(format!(
                            "🕒 {}",
                            table.created_at.format("%Y-%m-%d %H:%M")
                        ))
                        .size(10.0)
                        .color(MUTED),
                    );
                    ui.add_space(4.0);
                }
            });

        if let Some(id) = to_delete {
            match store.delete(id) {
                Ok(table) => self.set_status(format!("Deleted {}", table.name), false),
                Err(e) => self.set_status(format!("Error: {}", e), true),
            }
            self.sync_selection(&*store);
        }

        ui.separator();
        ui.vertical_centered(|ui| {
            if ui.button("+ New Database").clicked() {
                self.show_create = true;
            }
            if ui.button("📂 Import CSV").clicked() {
                action = Some(EditorAction::ImportCsv);
            }
        });

        action
    }

    fn show_table(
        &mut self,
        ui: &mut egui::Ui,
        id: TableId,
        table: &Table,
        mutations: &mut Vec<TableMutation>,
    ) -> Option<EditorAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label(RichText::new(&table.name).size(16.0).strong());
            ui.label(
                RichText::new(table.visibility.to_string())
                    .size(10.0)
                    .color(PRIMARY),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("+ Row").clicked() {
                    mutations.push(TableMutation::AddRow);
                }
                if ui.button("+ Field").clicked() {
                    mutations.push(TableMutation::AddColumn);
                }
                if ui.button("💾 Export CSV").clicked() {
                    action = Some(EditorAction::ExportCsv(id));
                }
                if ui.button("👁 View in Teller 3").clicked() {
                    action = Some(EditorAction::ViewInAnalytics(id));
                }
            });
        });
        ui.separator();

        ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            egui::Grid::new(("table_grid", id.0))
                .striped(true)
                .spacing([6.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("#").color(MUTED));
                    for (i, column) in table.columns().iter().enumerate() {
                        ui.vertical(|ui| {
                            self.show_header(ui, i, table, mutations);
                            let mut column_type = column.column_type;
                            ComboBox::from_id_salt(("field_type", id.0, i))
                                .width(CELL_WIDTH - 10.0)
                                .selected_text(column_type.as_str())
                                .show_ui(ui, |ui| {
                                    for ty in ColumnType::ALL {
                                        ui.selectable_value(&mut column_type, ty, ty.as_str());
                                    }
                                });
                            if column_type != column.column_type {
                                mutations.push(TableMutation::SetColumnType {
                                    index: i,
                                    column_type,
                                });
                            }
                        });
                    }
                    ui.end_row();

                    for r in 0..table.row_count() {
                        ui.horizontal(|ui| {
                            if ui.small_button("✕").on_hover_text("Delete row").clicked() {
                                mutations.push(TableMutation::DeleteRow(r));
                            }
                            ui.label(RichText::new((r + 1).to_string()).color(MUTED));
                        });
                        for column in table.columns() {
                            let mut value = table.cell(r, &column.name).unwrap_or_default().to_string();
                            if ui
                                .add(TextEdit::singleline(&mut value).desired_width(CELL_WIDTH))
                                .changed()
                            {
                                mutations.push(TableMutation::UpdateCell {
                                    row: r,
                                    column: column.name.clone(),
                                    value,
                                });
                            }
                        }
                        ui.end_row();
                    }
                });

            if table.row_count() == 0 {
                ui.add_space(12.0);
                ui.label(
                    RichText::new("No records yet. Click \"+ Row\" to add data.").color(MUTED),
                );
            }
        });

        action
    }

    fn show_header(
        &mut self,
        ui: &mut egui::Ui,
        index: usize,
        table: &Table,
        mutations: &mut Vec<TableMutation>,
    ) {
        let Some(column) = table.columns().get(index) else {
            return;
        };

        ui.horizontal(|ui| {
            let editing = matches!(&self.editing_field, Some((i, _)) if *i == index);
            if editing {
                let mut commit = false;
                let mut cancel = false;
                if let Some((_, buffer)) = self.editing_field.as_mut() {
                    let response =
                        ui.add(TextEdit::singleline(buffer).desired_width(CELL_WIDTH - 30.0));
                    if self.focus_rename {
                        response.request_focus();
                        self.focus_rename = false;
                    }
                    cancel = ui.input(|i| i.key_pressed(Key::Escape));
                    commit = !cancel && response.lost_focus();
                }
                if cancel {
                    self.editing_field = None;
                } else if commit {
                    if let Some((index, name)) = self.editing_field.take() {
                        mutations.push(TableMutation::RenameColumn { index, name });
                    }
                }
            } else {
                let response = ui
                    .add(
                        egui::Label::new(RichText::new(&column.name).strong())
                            .sense(egui::Sense::click()),
                    )
                    .on_hover_text("Double-click to rename");
                if response.double_clicked() {
                    self.editing_field = Some((index, column.name.clone()));
                    self.focus_rename = true;
                }
            }

            if table.column_count() > 1
                && ui.small_button("✕").on_hover_text("Delete field").clicked()
            {
                mutations.push(TableMutation::DeleteColumn(index));
                self.editing_field = None;
            }
        });
    }

    fn show_status_bar(&self, ui: &mut egui::Ui, store: &impl TableStore) {
        ui.horizontal(|ui| {
            if let Some(table) = self.selected.and_then(|id| store.get(id).ok()) {
                ui.label(
                    RichText::new(format!(
                        "{} records · {} fields",
                        table.row_count(),
                        table.column_count()
                    ))
                    .size(11.0)
                    .color(MUTED),
                );
                ui.separator();
            }
            let color = if self.status_is_error { ACCENT } else { SUCCESS };
            ui.label(RichText::new(&self.status).size(11.0).color(color));
        });
    }

    fn show_create_modal(&mut self, ctx: &egui::Context, store: &mut impl TableStore) {
        let mut open = true;
        let mut create = false;
        let mut cancel = false;

        egui::Window::new("Create New Database")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Database Name");
                let name = ui.add(
                    TextEdit::singleline(&mut self.new_name).hint_text("e.g. Sales Records"),
                );
                if name.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                    create = true;
                }
                ui.add_space(8.0);

                ui.label("Type");
                ui.horizontal(|ui| {
                    ui.selectable_value(
                        &mut self.new_visibility,
                        TableVisibility::Personal,
                        "🔒 Personal",
                    );
                    ui.selectable_value(
                        &mut self.new_visibility,
                        TableVisibility::Public,
                        "🌐 Public",
                    );
                });
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                    ui.add_enabled_ui(!self.new_name.trim().is_empty(), |ui| {
                        if ui.button("Create").clicked() {
                            create = true;
                        }
                    });
                });
            });

        if create {
            match store.create(&self.new_name, self.new_visibility) {
                Ok(id) => {
                    self.selected = Some(id);
                    self.set_status(format!("Created {}", self.new_name.trim()), false);
                    self.new_name.clear();
                    self.show_create = false;
                }
                Err(e) => self.set_status(format!("Error: {}", e), true),
            }
        }
        if cancel || !open {
            self.show_create = false;
        }
    }
}
