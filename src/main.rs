mod analysis;
mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use anyhow::{Context, Result, anyhow};
use app::CrashViewerApp;
use config::ViewerConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = ViewerConfig::default();

    // Any load or analysis failure ends the run before a window opens.
    let table = data::loader::load_file(&config.data_path)?;
    let state = AppState::new(config.clone(), table)
        .with_context(|| format!("analysing {}", config.data_path.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.inner_size)
            .with_min_inner_size(config.min_inner_size),
        ..Default::default()
    };

    eframe::run_native(
        &config.window_title,
        options,
        Box::new(|_cc| Ok(Box::new(CrashViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("running viewer: {e}"))
}
