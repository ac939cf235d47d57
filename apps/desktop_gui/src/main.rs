mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::anyhow;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::config::{load_settings, LaunchArgs};
use crate::controller::events::UiEvent;
use crate::ui::GpaFormApp;

const WINDOW_TITLE: &str = "GPA Calculator";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = LaunchArgs::parse();
    let settings = load_settings(&args)?;
    tracing::info!(
        api_base_url = %settings.api_base_url,
        timeout_secs = settings.request_timeout.as_secs(),
        "starting gpa desktop"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1040.0, 760.0])
            .with_min_inner_size([820.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(GpaFormApp::new(cmd_tx, ui_rx, &settings)))),
    )
    .map_err(|err| anyhow!("desktop window failed: {err}"))
}
