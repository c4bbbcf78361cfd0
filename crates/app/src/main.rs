//! SnapFrame - fixed-size screen capture from a hotkey or preset

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![cfg_attr(not(windows), allow(dead_code))]

mod forms;
mod hotkey;
mod icon;
mod settings;
mod shared;
mod state;
mod worker;

#[cfg(windows)]
mod dialogs;
#[cfg(windows)]
mod host;
#[cfg(windows)]
mod instance;
#[cfg(windows)]
mod notice;
#[cfg(windows)]
mod theme;
#[cfg(windows)]
mod tray;
#[cfg(windows)]
mod ui;

use env_logger::{Builder, Env};

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    run()
}

#[cfg(not(windows))]
fn run() -> anyhow::Result<()> {
    anyhow::bail!("SnapFrame requires Windows")
}

#[cfg(windows)]
fn run() -> anyhow::Result<()> {
    use crate::settings::SettingsStore;
    use crate::shared::UiState;
    use crate::ui::SnapFrameApp;
    use eframe::egui;

    instance::set_dpi_awareness();

    let Some(_instance) = instance::SingleInstance::acquire()? else {
        log::info!("Another instance is running");
        notice::info("SnapFrame is already running.");
        return Ok(());
    };

    let store = SettingsStore::default_location();
    let (settings, load_error) = store.load_or_default();
    if let Some(e) = load_error {
        log::warn!("Failed to load settings from {}: {}", store.path().display(), e);
        notice::warning(&format!("Failed to load settings: {}\nUsing defaults.", e));
    }
    log::info!("Settings file: {}", store.path().display());

    let icon = egui::IconData {
        rgba: icon::icon_rgba(64),
        width: 64,
        height: 64,
    };
    let viewport = SnapFrameApp::viewport(&settings, icon);
    let centered = settings.window_position().is_none();

    let ui_state = UiState::new(settings, store).shared();
    let (host, host_thread) = host::spawn(ui_state.clone())?;

    let native_options = eframe::NativeOptions {
        viewport,
        centered,
        ..Default::default()
    };

    let app_host = host.clone();
    let result = eframe::run_native(
        "SnapFrame",
        native_options,
        Box::new(move |cc| Ok(Box::new(SnapFrameApp::new(cc, ui_state, app_host)))),
    );

    host.send(host::HostCommand::Shutdown);
    if host_thread.join().is_err() {
        log::error!("Host thread panicked");
    }

    result.map_err(|e| anyhow::anyhow!("Window error: {}", e))
}
