//! VARIES Vault Accessor Main Application
//! Splash, then authentication, then the teller shell.

use crate::charts::export::file_stem;
use crate::charts::{export_report, ExportSummary};
use crate::config::AppConfig;
use crate::data::{export_csv, import_csv, InMemoryTableStore, Table, TableId, TableStore};
use crate::gui::{
    AnalyticsAction, AnalyticsView, AuthAction, AuthPanel, EditorAction, TableEditor, MUTED,
    PRIMARY,
};
use crate::vault::VaultStorage;
use egui::{Color32, RichText, SidePanel};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

const SPLASH_DURATION: Duration = Duration::from_millis(3000);
const SPLASH_FADE_START: Duration = Duration::from_millis(2500);
const EXPORT_SIZE: (u32, u32) = (1200, 800);

/// CSV loading result from background thread
enum LoadResult {
    Complete(Table),
    Error(String),
}

/// Report export result from background thread
enum ExportResult {
    Complete { dir: PathBuf, summary: ExportSummary },
    Error(String),
}

enum Screen {
    Splash(Instant),
    Auth,
    Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Teller {
    One,
    Two,
    Three,
}

impl Teller {
    const ALL: [Teller; 3] = [Teller::One, Teller::Two, Teller::Three];

    fn label(self) -> &'static str {
        match self {
            Teller::One => "🛡 Teller One",
            Teller::Two => "🗄 Teller Two",
            Teller::Three => "📊 Teller Three",
        }
    }

    fn subtitle(self) -> &'static str {
        match self {
            Teller::One => "Authentication",
            Teller::Two => "Database Engine",
            Teller::Three => "Analytics",
        }
    }
}

/// Main application window.
pub struct VaultApp {
    config: AppConfig,
    vault: VaultStorage,
    store: InMemoryTableStore,

    screen: Screen,
    teller: Teller,
    username: String,
    sidebar_collapsed: bool,

    auth: AuthPanel,
    editor: TableEditor,
    analytics: AnalyticsView,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    // Async report export
    export_rx: Option<Receiver<ExportResult>>,
}

impl VaultApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let store = if config.seed_demo_table {
            InMemoryTableStore::with_demo_table()
        } else {
            InMemoryTableStore::new()
        };

        Self {
            vault: VaultStorage::new(&config.storage_dir),
            config,
            store,
            screen: Screen::Splash(Instant::now()),
            teller: Teller::Two,
            username: String::new(),
            sidebar_collapsed: false,
            auth: AuthPanel::new(),
            editor: TableEditor::new(),
            analytics: AnalyticsView::new(),
            load_rx: None,
            export_rx: None,
        }
    }

    fn handle_login(&mut self, username: String) {
        info!(%username, "session started");
        self.username = username;
        self.teller = Teller::Two;
        self.screen = Screen::Shell;
    }

    fn handle_logout(&mut self) {
        info!(username = %self.username, "session ended");
        self.username.clear();
        self.auth.reset();
        self.screen = Screen::Auth;
    }

    /// Pick a CSV and load it on a background thread.
    fn handle_import_csv(&mut self) {
        if self.load_rx.is_some() {
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        self.editor.set_status("Loading CSV file...", false);
        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match import_csv(&path) {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(LoadResult::Complete(table)) => {
                let status = format!(
                    "Imported {}: {} rows, {} fields",
                    table.name,
                    table.row_count(),
                    table.column_count()
                );
                let id = self.store.insert(table);
                self.editor.selected = Some(id);
                self.editor.set_status(status, false);
            }
            Ok(LoadResult::Error(e)) => {
                error!(error = %e, "CSV import failed");
                self.editor.set_status(format!("Error: {}", e), true);
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.editor.set_status("Error: CSV loader stopped unexpectedly", true);
            }
        }
    }

    fn handle_export_csv(&mut self, id: TableId) {
        let Ok(table) = self.store.get(id) else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(format!("{}.csv", file_stem(&table.name)))
            .save_file()
        else {
            return;
        };

        match export_csv(table, &path) {
            Ok(()) => self
                .editor
                .set_status(format!("Exported {}", path.display()), false),
            Err(e) => self.editor.set_status(format!("Error: {}", e), true),
        }
    }

    /// Render every chart plus the text report on a background thread.
    fn handle_export_report(&mut self, id: TableId) {
        if self.export_rx.is_some() {
            return;
        }
        let Ok(table) = self.store.get(id) else {
            return;
        };
        let table = table.clone();
        let dir = self.config.export_dir.join(file_stem(&table.name));

        let (tx, rx) = channel();
        self.export_rx = Some(rx);
        self.analytics.exporting = true;
        self.analytics.set_export_status("Rendering charts...", false);

        thread::spawn(move || {
            let result = match export_report(&table, &dir, EXPORT_SIZE) {
                Ok(summary) => ExportResult::Complete { dir, summary },
                Err(e) => ExportResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    fn check_export_results(&mut self) {
        let Some(rx) = self.export_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(ExportResult::Complete { dir, summary }) => {
                let mut status = format!("Exported {} files to {}", summary.files.len(), dir.display());
                if !summary.skipped.is_empty() {
                    let skipped: Vec<&str> = summary.skipped.iter().map(|k| k.label()).collect();
                    status.push_str(&format!(" (skipped: {})", skipped.join(", ")));
                }
                self.analytics.exporting = false;
                self.analytics.set_export_status(status, false);
                self.analytics.set_export_dir(dir);
            }
            Ok(ExportResult::Error(e)) => {
                error!(error = %e, "report export failed");
                self.analytics.exporting = false;
                self.analytics.set_export_status(format!("Error: {}", e), true);
            }
            Err(TryRecvError::Empty) => self.export_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.analytics.exporting = false;
                self.analytics
                    .set_export_status("Error: export stopped unexpectedly", true);
            }
        }
    }

    fn handle_open_folder(&mut self, dir: PathBuf) {
        if let Err(e) = open::that(&dir) {
            self.analytics
                .set_export_status(format!("Could not open {}: {}", dir.display(), e), true);
        }
    }

    fn show_splash(ctx: &egui::Context, started: Instant) -> bool {
        let elapsed = started.elapsed();
        let alpha = if elapsed > SPLASH_FADE_START {
            let fade = (elapsed - SPLASH_FADE_START).as_secs_f32()
                / (SPLASH_DURATION - SPLASH_FADE_START).as_secs_f32();
            (1.0 - fade).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let mut skip = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 2.0 - 60.0);
                ui.label(
                    RichText::new("VARIES")
                        .size(56.0)
                        .strong()
                        .color(PRIMARY.gamma_multiply(alpha)),
                );
                ui.label(
                    RichText::new("VAULT ACCESSOR")
                        .size(14.0)
                        .color(MUTED.gamma_multiply(alpha)),
                );
            });
            skip = ui.input(|i| i.pointer.any_click());
        });

        ctx.request_repaint_after(Duration::from_millis(16));
        skip || elapsed >= SPLASH_DURATION
    }

    fn show_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if !self.sidebar_collapsed {
                ui.vertical(|ui| {
                    ui.label(RichText::new("VARIES").size(16.0).strong().color(PRIMARY));
                    ui.label(RichText::new("VAULT ACCESSOR").size(9.0).color(MUTED));
                });
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let arrow = if self.sidebar_collapsed { "▶" } else { "◀" };
                if ui.small_button(arrow).clicked() {
                    self.sidebar_collapsed = !self.sidebar_collapsed;
                }
            });
        });
        ui.separator();

        for teller in Teller::ALL {
            let text = if self.sidebar_collapsed {
                RichText::new(teller.label().chars().take(1).collect::<String>())
            } else {
                RichText::new(format!("{}\n{}", teller.label(), teller.subtitle()))
            };
            if ui.selectable_label(self.teller == teller, text).clicked() {
                self.teller = teller;
            }
            ui.add_space(2.0);
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            ui.add_space(8.0);
            if ui.button("⎋ Logout").clicked() {
                self.handle_logout();
            }
            if !self.sidebar_collapsed {
                ui.label(
                    RichText::new(format!("Logged in as {}", self.username))
                        .size(10.0)
                        .color(MUTED),
                );
            }
        });
    }

    fn show_shell(&mut self, ctx: &egui::Context) {
        let width = if self.sidebar_collapsed { 56.0 } else { 200.0 };
        SidePanel::left("teller_nav")
            .resizable(false)
            .exact_width(width)
            .show(ctx, |ui| self.show_sidebar(ui));

        if !matches!(self.screen, Screen::Shell) {
            return;
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.teller {
            Teller::One => {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new("You are already authenticated.")
                            .size(13.0)
                            .color(Color32::GRAY),
                    );
                });
            }
            Teller::Two => match self.editor.show(ui, &mut self.store) {
                EditorAction::None => {}
                EditorAction::ViewInAnalytics(id) => {
                    self.analytics.select(id);
                    self.teller = Teller::Three;
                }
                EditorAction::ImportCsv => self.handle_import_csv(),
                EditorAction::ExportCsv(id) => self.handle_export_csv(id),
            },
            Teller::Three => match self.analytics.show(ui, &self.store) {
                AnalyticsAction::None => {}
                AnalyticsAction::ExportReport(id) => self.handle_export_report(id),
                AnalyticsAction::OpenFolder(dir) => self.handle_open_folder(dir),
            },
        });
    }
}

impl eframe::App for VaultApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_export_results();

        if self.load_rx.is_some() || self.export_rx.is_some() {
            ctx.request_repaint();
        }

        match self.screen {
            Screen::Splash(started) => {
                if Self::show_splash(ctx, started) {
                    self.screen = Screen::Auth;
                }
            }
            Screen::Auth => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        if let AuthAction::Authenticated(username) = self.auth.show(ui, &self.vault) {
                            self.handle_login(username);
                        }
                    });
                });
            }
            Screen::Shell => self.show_shell(ctx),
        }
    }
}
