//! VARIES Vault Accessor - desktop entry point.

use anyhow::anyhow;
use eframe::egui;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use varies_vault::config::AppConfig;
use varies_vault::gui::VaultApp;

fn main() -> anyhow::Result<()> {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(e) = config_error {
        warn!(error = %e, "using default configuration");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 640.0])
            .with_title("VARIES Vault Accessor"),
        ..Default::default()
    };

    eframe::run_native(
        "VARIES Vault Accessor",
        options,
        Box::new(|cc| Ok(Box::new(VaultApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("failed to start the application: {e}"))
}
