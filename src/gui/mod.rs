//! GUI module - splash, authentication and the teller shell

mod analytics_view;
mod app;
mod auth_panel;
mod table_editor;

use egui::Color32;

pub use analytics_view::{AnalyticsAction, AnalyticsView};
pub use app::VaultApp;
pub use auth_panel::{AuthAction, AuthPanel};
pub use table_editor::{EditorAction, TableEditor};

/// Vault gold.
pub const PRIMARY: Color32 = Color32::from_rgb(230, 180, 52);
/// Alert crimson.
pub const ACCENT: Color32 = Color32::from_rgb(219, 36, 36);
pub const MUTED: Color32 = Color32::from_rgb(123, 139, 158);
pub const SUCCESS: Color32 = Color32::from_rgb(40, 167, 69);
