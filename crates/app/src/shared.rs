//! State shared between the main window and the host thread

use crate::settings::{AppSettings, SettingsStore};
use crate::state::StateMachine;
use parking_lot::Mutex;
use std::sync::Arc;

/// Callback type for cross-thread notifications
pub type ActionCallback = Arc<dyn Fn() + Send + Sync>;

pub struct UiState {
    pub settings: AppSettings,
    pub store: SettingsStore,
    pub machine: StateMachine,
    /// Main window handle stored as isize for thread safety
    pub main_hwnd: isize,
    /// Set by the tray menu, consumed by the main window
    pub open_settings: bool,
    /// Close the main window for real instead of hiding it
    pub exit_requested: bool,
    pub repaint: Option<ActionCallback>,
}

pub type SharedUi = Arc<Mutex<UiState>>;

impl UiState {
    pub fn new(settings: AppSettings, store: SettingsStore) -> Self {
        Self {
            settings,
            store,
            machine: StateMachine::new(),
            main_hwnd: 0,
            open_settings: false,
            exit_requested: false,
            repaint: None,
        }
    }

    pub fn shared(self) -> SharedUi {
        Arc::new(Mutex::new(self))
    }

    /// Persist the current settings; failures end up in the status line
    pub fn save_settings(&mut self) -> bool {
        match self.store.save(&self.settings) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to save settings: {}", e);
                self.machine.set_status(format!("Failed to save settings: {}", e));
                false
            }
        }
    }

    pub fn request_repaint(&self) {
        if let Some(ref repaint) = self.repaint {
            repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn save_settings_writes_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let mut settings = AppSettings::default();
        settings.output_folder = dir.path().join("out");
        settings.stay_on_top = true;

        let mut ui = UiState::new(settings, store.clone());
        assert!(ui.save_settings());
        assert!(store.load().unwrap().stay_on_top);
    }

    #[test]
    fn save_failure_sets_status() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let store = SettingsStore::new(blocker.join("settings.json"));
        let mut settings = AppSettings::default();
        settings.output_folder = dir.path().join("out");

        let mut ui = UiState::new(settings, store);
        assert!(!ui.save_settings());
        assert!(ui.machine.status_text().starts_with("Failed to save settings"));
    }

    #[test]
    fn repaint_callback_runs() {
        let hit = Arc::new(AtomicBool::new(false));
        let flag = hit.clone();
        let mut ui = UiState::new(AppSettings::default(), SettingsStore::new("unused.json"));
        ui.request_repaint();
        ui.repaint = Some(Arc::new(move || flag.store(true, Ordering::SeqCst)));
        ui.request_repaint();
        assert!(hit.load(Ordering::SeqCst));
    }
}
