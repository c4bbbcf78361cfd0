//! Persistent user preferences

use crate::hotkey::Hotkey;
use capture::{CaptureSize, SnapMode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use thiserror::Error;

pub const APP_NAME: &str = "SnapFrame";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Settings file is not valid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidCustomSize(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Which size the global hotkey captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HotkeyMode {
    /// Size of the last preset button used
    #[default]
    LastPreset,
    /// Always the configured fixed size
    Fixed,
}

impl HotkeyMode {
    pub fn label(self) -> &'static str {
        match self {
            HotkeyMode::LastPreset => "Use last selected preset",
            HotkeyMode::Fixed => "Always use fixed size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppTheme {
    #[default]
    Light,
    Dark,
}

/// User-defined capture size shown under the presets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSize {
    pub width: u32,
    pub height: u32,
    pub name: String,
}

impl CustomSize {
    pub fn new(name: &str, width: u32, height: u32) -> SettingsResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SettingsError::InvalidCustomSize(
                "Please enter a name for the custom size.".into(),
            ));
        }
        if !CaptureSize::new(width, height).is_valid() {
            return Err(SettingsError::InvalidCustomSize(format!(
                "Width and height must be between {} and {}.",
                CaptureSize::MIN_SIDE,
                CaptureSize::MAX_SIDE
            )));
        }
        Ok(Self {
            width,
            height,
            name: name.to_string(),
        })
    }

    pub fn size(&self) -> CaptureSize {
        CaptureSize::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(deserialize_with = "or_default")]
    pub hotkey: Hotkey,
    #[serde(deserialize_with = "or_default")]
    pub hotkey_mode: HotkeyMode,
    pub capture_width: u32,
    pub capture_height: u32,
    pub fixed_capture_width: u32,
    pub fixed_capture_height: u32,
    pub output_folder: PathBuf,
    pub custom_sizes: Vec<CustomSize>,
    pub window_width: i32,
    pub window_height: i32,
    /// `-1` centers the window
    pub window_x: i32,
    pub window_y: i32,
    pub stay_on_top: bool,
    #[serde(deserialize_with = "or_default")]
    pub snap_mode: SnapMode,
    pub minimize_to_tray: bool,
    pub continuous_capture: bool,
    pub show_notifications: bool,
    #[serde(deserialize_with = "or_default")]
    pub theme: AppTheme,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            hotkey: Hotkey::default(),
            hotkey_mode: HotkeyMode::default(),
            capture_width: 1024,
            capture_height: 1024,
            fixed_capture_width: 1024,
            fixed_capture_height: 1024,
            output_folder: default_output_folder(),
            custom_sizes: Vec::new(),
            window_width: 600,
            window_height: 520,
            window_x: -1,
            window_y: -1,
            stay_on_top: false,
            snap_mode: SnapMode::default(),
            minimize_to_tray: false,
            continuous_capture: false,
            show_notifications: true,
            theme: AppTheme::default(),
        }
    }
}

impl AppSettings {
    /// Size the global hotkey should capture
    pub fn capture_size_for_hotkey(&self) -> CaptureSize {
        let size = match self.hotkey_mode {
            HotkeyMode::Fixed => CaptureSize::new(self.fixed_capture_width, self.fixed_capture_height),
            HotkeyMode::LastPreset => CaptureSize::new(self.capture_width, self.capture_height),
        };
        size.clamped()
    }

    pub fn last_preset(&self) -> CaptureSize {
        CaptureSize::new(self.capture_width, self.capture_height)
    }

    pub fn remember_preset(&mut self, size: CaptureSize) {
        self.capture_width = size.width;
        self.capture_height = size.height;
    }

    pub fn add_custom_size(&mut self, size: CustomSize) {
        self.custom_sizes.push(size);
    }

    pub fn remove_custom_size(&mut self, index: usize) -> Option<CustomSize> {
        if index < self.custom_sizes.len() {
            Some(self.custom_sizes.remove(index))
        } else {
            None
        }
    }

    /// Saved window position, `None` when the window should be centered
    pub fn window_position(&self) -> Option<(i32, i32)> {
        if self.window_x < 0 || self.window_y < 0 {
            None
        } else {
            Some((self.window_x, self.window_y))
        }
    }
}

/// A value this version does not understand falls back to its default
/// instead of rejecting the whole file
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        log::warn!("Ignoring invalid setting: {}", e);
        T::default()
    }))
}

fn default_output_folder() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// JSON settings file
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/SnapFrame/settings.json`
    pub fn default_location() -> Self {
        let dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(APP_NAME).join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields the defaults
    pub fn load(&self) -> SettingsResult<AppSettings> {
        if !self.path.exists() {
            return Ok(AppSettings::default());
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load settings, falling back to the defaults and returning the error
    pub fn load_or_default(&self) -> (AppSettings, Option<SettingsError>) {
        match self.load() {
            Ok(settings) => (settings, None),
            Err(e) => (AppSettings::default(), Some(e)),
        }
    }

    pub fn save(&self, settings: &AppSettings) -> SettingsResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::create_dir_all(&settings.output_folder)?;

        let json = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Shorten `path` for display: `C:\...\Last` when possible, else `prefix...`
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if path.is_empty() || len <= max_len {
        return path.to_string();
    }

    let cut = || {
        let prefix: String = path.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", prefix)
    };

    let parts: Vec<&str> = path.split(['\\', '/']).collect();
    if parts.len() <= 2 {
        return cut();
    }

    let drive = format!("{}{}", parts[0], MAIN_SEPARATOR);
    let last = parts[parts.len() - 1];
    if drive.chars().count() + 4 + last.chars().count() >= max_len {
        return cut();
    }

    format!("{}...{}{}", drive, MAIN_SEPARATOR, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::{HotkeyKey, Modifiers};

    #[test]
    fn defaults() {
        let s = AppSettings::default();
        assert_eq!(s.hotkey.to_string(), "Ctrl+Shift+C");
        assert_eq!(s.last_preset(), CaptureSize::new(1024, 1024));
        assert_eq!((s.window_width, s.window_height), (600, 520));
        assert_eq!(s.window_position(), None);
        assert!(s.show_notifications);
        assert!(!s.stay_on_top && !s.minimize_to_tray && !s.continuous_capture);
        assert_eq!(s.snap_mode, SnapMode::Snap);
        assert_eq!(s.theme, AppTheme::Light);
        assert!(s.output_folder.ends_with(APP_NAME));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().unwrap(), AppSettings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("cfg").join("settings.json"));

        let mut settings = AppSettings::default();
        settings.output_folder = dir.path().join("shots");
        settings.hotkey = Hotkey::new(Modifiers::ALT, HotkeyKey::F3);
        settings.snap_mode = SnapMode::Off;
        settings.theme = AppTheme::Dark;
        settings.add_custom_size(CustomSize::new("Banner", 1500, 500).unwrap());
        store.save(&settings).unwrap();

        assert!(settings.output_folder.is_dir());
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "capture_width": 1216, "capture_height": 832, "stay_on_top": true }"#)
            .unwrap();

        let settings = SettingsStore::new(&path).load().unwrap();
        assert_eq!(settings.last_preset(), CaptureSize::new(1216, 832));
        assert!(settings.stay_on_top);
        assert_eq!(settings.hotkey, Hotkey::default());
        assert!(settings.show_notifications);
    }

    #[test]
    fn unknown_values_keep_the_rest_of_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "hotkey": "Ctrl+F12",
                "hotkey_mode": "Sometimes",
                "capture_width": 1216,
                "capture_height": 832,
                "snap_mode": "Magnetic",
                "theme": 3,
                "custom_sizes": [{ "name": "Banner", "width": 1500, "height": 500 }]
            }"#,
        )
        .unwrap();

        let (settings, err) = SettingsStore::new(&path).load_or_default();
        assert!(err.is_none());
        assert_eq!(settings.hotkey, Hotkey::default());
        assert_eq!(settings.hotkey_mode, HotkeyMode::LastPreset);
        assert_eq!(settings.snap_mode, SnapMode::Snap);
        assert_eq!(settings.theme, AppTheme::Light);
        assert_eq!(settings.last_preset(), CaptureSize::new(1216, 832));
        assert_eq!(settings.custom_sizes.len(), 1);
        assert_eq!(settings.custom_sizes[0].name, "Banner");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(&path);
        assert!(matches!(store.load(), Err(SettingsError::Json(_))));

        let (settings, err) = store.load_or_default();
        assert_eq!(settings, AppSettings::default());
        assert!(err.is_some());
    }

    #[test]
    fn hotkey_size_follows_mode() {
        let mut s = AppSettings::default();
        s.remember_preset(CaptureSize::new(832, 1216));
        s.fixed_capture_width = 500;
        s.fixed_capture_height = 400;
        assert_eq!(s.capture_size_for_hotkey(), CaptureSize::new(832, 1216));

        s.hotkey_mode = HotkeyMode::Fixed;
        assert_eq!(s.capture_size_for_hotkey(), CaptureSize::new(500, 400));

        s.fixed_capture_width = 9000;
        assert_eq!(s.capture_size_for_hotkey().width, CaptureSize::MAX_SIDE);
    }

    #[test]
    fn custom_size_validation() {
        let size = CustomSize::new("  Thumb  ", 100, 4000).unwrap();
        assert_eq!(size.name, "Thumb");

        let err = CustomSize::new("   ", 500, 500).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a name for the custom size.");
        assert!(CustomSize::new("Tiny", 99, 500).is_err());
        assert!(CustomSize::new("Huge", 500, 4001).is_err());
    }

    #[test]
    fn remove_custom_size_by_index() {
        let mut s = AppSettings::default();
        s.add_custom_size(CustomSize::new("A", 200, 200).unwrap());
        s.add_custom_size(CustomSize::new("B", 300, 300).unwrap());

        assert_eq!(s.remove_custom_size(5), None);
        assert_eq!(s.remove_custom_size(0).map(|c| c.name), Some("A".to_string()));
        assert_eq!(s.custom_sizes.len(), 1);
        assert_eq!(s.custom_sizes[0].name, "B");
    }

    #[test]
    fn truncate_short_path_unchanged() {
        assert_eq!(truncate_path("C:\\Shots", 50), "C:\\Shots");
        assert_eq!(truncate_path("", 5), "");
    }

    #[test]
    fn truncate_keeps_drive_and_last_folder() {
        let path = "C:\\Users\\someone\\Pictures\\Screenshots\\Archive\\2024\\SnapFrame";
        let expected = format!("C:{0}...{0}SnapFrame", MAIN_SEPARATOR);
        assert_eq!(truncate_path(path, 30), expected);
    }

    #[test]
    fn truncate_falls_back_to_prefix() {
        assert_eq!(truncate_path("abcdefghijklmnop", 10), "abcdefg...");
        let path = "C:\\a\\AVeryLongFinalFolderNameThatDoesNotFit";
        let out = truncate_path(path, 20);
        assert_eq!(out.chars().count(), 20);
        assert!(out.ends_with("..."));
    }
}
