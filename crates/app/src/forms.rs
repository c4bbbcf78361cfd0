//! Editable copies of settings used by the dialogs

use crate::hotkey::{Hotkey, HotkeyKey, Modifiers};
use crate::settings::{AppSettings, AppTheme, CustomSize, HotkeyMode};
use capture::{CaptureSize, SnapMode};
use std::fs;
use std::path::PathBuf;

pub const INVALID_FOLDER: &str = "Invalid output folder path.";

/// Settings dialog fields
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDraft {
    pub modifiers: Modifiers,
    pub key: HotkeyKey,
    pub hotkey_mode: HotkeyMode,
    pub fixed_width: u32,
    pub fixed_height: u32,
    pub output_folder: String,
    pub snap_mode: SnapMode,
    pub minimize_to_tray: bool,
    pub continuous_capture: bool,
    pub show_notifications: bool,
    pub theme: AppTheme,
}

impl SettingsDraft {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            modifiers: settings.hotkey.modifiers,
            key: settings.hotkey.key,
            hotkey_mode: settings.hotkey_mode,
            fixed_width: settings.fixed_capture_width,
            fixed_height: settings.fixed_capture_height,
            output_folder: settings.output_folder.display().to_string(),
            snap_mode: settings.snap_mode,
            minimize_to_tray: settings.minimize_to_tray,
            continuous_capture: settings.continuous_capture,
            show_notifications: settings.show_notifications,
            theme: settings.theme,
        }
    }

    /// Fixed size inputs are only editable in fixed mode
    pub fn fixed_size_enabled(&self) -> bool {
        self.hotkey_mode == HotkeyMode::Fixed
    }

    pub fn hotkey(&self) -> Hotkey {
        Hotkey::new(self.modifiers, self.key)
    }

    /// Validate, create the output folder and write the draft into `settings`
    pub fn apply(&self, settings: &mut AppSettings) -> Result<(), String> {
        let folder = self.output_folder.trim();
        if folder.is_empty() {
            return Err(INVALID_FOLDER.to_string());
        }
        let folder = PathBuf::from(folder);
        if let Err(e) = fs::create_dir_all(&folder) {
            log::warn!("Cannot create output folder {}: {}", folder.display(), e);
            return Err(INVALID_FOLDER.to_string());
        }

        let fixed = CaptureSize::new(self.fixed_width, self.fixed_height).clamped();

        settings.hotkey = self.hotkey();
        settings.hotkey_mode = self.hotkey_mode;
        settings.fixed_capture_width = fixed.width;
        settings.fixed_capture_height = fixed.height;
        settings.output_folder = folder;
        settings.snap_mode = self.snap_mode;
        settings.minimize_to_tray = self.minimize_to_tray;
        settings.continuous_capture = self.continuous_capture;
        settings.show_notifications = self.show_notifications;
        settings.theme = self.theme;
        Ok(())
    }
}

/// Add custom size dialog fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSizeDraft {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Default for CustomSizeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: 1024,
            height: 1024,
        }
    }
}

impl CustomSizeDraft {
    pub fn build(&self) -> Result<CustomSize, String> {
        CustomSize::new(&self.name, self.width, self.height).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_round_trips_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = AppSettings::default();
        settings.output_folder = dir.path().to_path_buf();

        let draft = SettingsDraft::from_settings(&settings);
        let mut applied = settings.clone();
        draft.apply(&mut applied).unwrap();
        assert_eq!(applied, settings);
    }

    #[test]
    fn apply_creates_folder_and_updates_fields() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new").join("shots");
        let mut settings = AppSettings::default();

        let mut draft = SettingsDraft::from_settings(&settings);
        draft.output_folder = format!("  {}  ", target.display());
        draft.modifiers = Modifiers::ALT_SHIFT;
        draft.key = HotkeyKey::Q;
        draft.hotkey_mode = HotkeyMode::Fixed;
        draft.fixed_width = 50;
        draft.fixed_height = 2000;
        draft.theme = AppTheme::Dark;
        draft.snap_mode = SnapMode::Span;

        draft.apply(&mut settings).unwrap();

        assert!(target.is_dir());
        assert_eq!(settings.output_folder, target);
        assert_eq!(settings.hotkey.to_string(), "Alt+Shift+Q");
        assert_eq!((settings.fixed_capture_width, settings.fixed_capture_height), (100, 2000));
        assert_eq!(settings.theme, AppTheme::Dark);
        assert_eq!(settings.snap_mode, SnapMode::Span);
    }

    #[test]
    fn apply_rejects_bad_folder_without_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        let mut settings = AppSettings::default();
        let before = settings.clone();
        let mut draft = SettingsDraft::from_settings(&settings);
        draft.output_folder = file.join("sub").display().to_string();
        draft.show_notifications = false;

        assert_eq!(draft.apply(&mut settings), Err(INVALID_FOLDER.to_string()));
        assert_eq!(settings, before);

        draft.output_folder = "   ".into();
        assert_eq!(draft.apply(&mut settings), Err(INVALID_FOLDER.to_string()));
    }

    #[test]
    fn fixed_size_enabled_only_in_fixed_mode() {
        let mut draft = SettingsDraft::from_settings(&AppSettings::default());
        assert!(!draft.fixed_size_enabled());
        draft.hotkey_mode = HotkeyMode::Fixed;
        assert!(draft.fixed_size_enabled());
    }

    #[test]
    fn custom_size_draft() {
        let mut draft = CustomSizeDraft::default();
        assert_eq!((draft.width, draft.height), (1024, 1024));
        assert_eq!(
            draft.build().unwrap_err(),
            "Please enter a name for the custom size."
        );

        draft.name = "Poster".into();
        draft.height = 1500;
        let size = draft.build().unwrap();
        assert_eq!(size.size(), CaptureSize::new(1024, 1500));
    }
}
