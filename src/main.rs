mod app;
mod color;
mod config;
mod data;
mod present;
mod reactive;
mod state;
mod ui;

use anyhow::Context;
use app::DashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;

    // A dataset that cannot be loaded leaves nothing to show.
    let table = data::loader::load_file(&config.data_path)
        .with_context(|| format!("loading dataset {}", config.data_path.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(config, table)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
