//! Light and dark appearance

use crate::settings::AppTheme;
use egui::{Color32, Visuals};
use windows::Win32::Foundation::{BOOL, HWND};
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWA_USE_IMMERSIVE_DARK_MODE};

const DARK_BG: Color32 = Color32::from_rgb(32, 32, 32);
const DARK_CONTROL: Color32 = Color32::from_rgb(45, 45, 45);
const DARK_BUTTON: Color32 = Color32::from_rgb(60, 60, 60);
const DARK_BUTTON_HOVER: Color32 = Color32::from_rgb(80, 80, 80);

/// Fill used by the size buttons
pub fn preset_fill(theme: AppTheme) -> Color32 {
    match theme {
        AppTheme::Light => Color32::from_rgb(225, 225, 225),
        AppTheme::Dark => DARK_BUTTON,
    }
}

pub fn accent(theme: AppTheme) -> Color32 {
    match theme {
        AppTheme::Light => Color32::from_rgb(0, 150, 0),
        AppTheme::Dark => Color32::from_rgb(0, 255, 0),
    }
}

fn dark_visuals() -> Visuals {
    let mut visuals = Visuals::dark();
    visuals.panel_fill = DARK_BG;
    visuals.window_fill = DARK_CONTROL;
    visuals.extreme_bg_color = DARK_CONTROL;
    visuals.widgets.inactive.weak_bg_fill = DARK_BUTTON;
    visuals.widgets.inactive.bg_fill = DARK_BUTTON;
    visuals.widgets.hovered.weak_bg_fill = DARK_BUTTON_HOVER;
    visuals.widgets.hovered.bg_fill = DARK_BUTTON_HOVER;
    visuals.override_text_color = Some(Color32::WHITE);
    visuals
}

fn light_visuals() -> Visuals {
    let mut visuals = Visuals::light();
    visuals.panel_fill = Color32::from_rgb(240, 240, 240);
    visuals
}

/// Set egui visuals and the native title bar color
pub fn apply(ctx: &egui::Context, theme: AppTheme, hwnd_raw: isize) {
    ctx.set_visuals(match theme {
        AppTheme::Light => light_visuals(),
        AppTheme::Dark => dark_visuals(),
    });

    if hwnd_raw != 0 {
        set_dark_title_bar(HWND(hwnd_raw as *mut std::ffi::c_void), theme == AppTheme::Dark);
    }
}

fn set_dark_title_bar(hwnd: HWND, dark: bool) {
    let value = BOOL::from(dark);
    unsafe {
        if let Err(e) = DwmSetWindowAttribute(
            hwnd,
            DWMWA_USE_IMMERSIVE_DARK_MODE,
            &value as *const BOOL as *const _,
            std::mem::size_of::<BOOL>() as u32,
        ) {
            log::debug!("Dark title bar not supported: {}", e);
        }
    }
}
