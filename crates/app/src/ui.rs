//! Main window using egui

use crate::dialogs::{confirm_dialog, custom_size_dialog, settings_dialog, DialogResponse};
use crate::forms::{CustomSizeDraft, SettingsDraft};
use crate::host::{HostCommand, HostHandle};
use crate::notice;
use crate::settings::{truncate_path, AppSettings, AppTheme};
use crate::shared::SharedUi;
use crate::state::StateMachine;
use crate::theme;
use capture::CaptureSize;
use eframe::egui::{self, RichText};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_HIDE};

/// Built-in sizes shown first
pub const PRESETS: [(u32, u32, &str); 5] = [
    (1024, 1024, "Square"),
    (1216, 832, "Wide"),
    (832, 1216, "Tall"),
    (1344, 768, "Ultrawide"),
    (768, 1344, "Ultra Tall"),
];

const COLUMNS: usize = 3;
const BUTTON_HEIGHT: f32 = 64.0;
const PATH_DISPLAY_LEN: usize = 50;
/// Window geometry is written once it stops changing for this long
const GEOMETRY_SAVE_DELAY: Duration = Duration::from_millis(800);

enum Dialog {
    None,
    Settings {
        draft: SettingsDraft,
        error: Option<String>,
    },
    CustomSize {
        draft: CustomSizeDraft,
        error: Option<String>,
    },
    ConfirmDelete {
        index: usize,
        name: String,
    },
}

/// Button clicked in the size grid
enum SizeAction {
    Capture(CaptureSize),
    AddCustom,
    Delete(usize),
}

/// Status line contents copied out of the state machine
struct StatusLine {
    text: String,
    saved_count: usize,
    last_saved: Option<PathBuf>,
}

impl StatusLine {
    fn from_machine(machine: &StateMachine) -> Self {
        Self {
            text: machine.status_text().to_string(),
            saved_count: machine.saved_count(),
            last_saved: machine.last_saved().map(Path::to_path_buf),
        }
    }
}

/// Main application using egui
pub struct SnapFrameApp {
    state: SharedUi,
    host: HostHandle,
    dialog: Dialog,
    applied_theme: Option<(AppTheme, isize)>,
    applied_on_top: Option<bool>,
    geometry_dirty: Option<Instant>,
}

impl SnapFrameApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: SharedUi, host: HostHandle) -> Self {
        let ctx = cc.egui_ctx.clone();
        state.lock().repaint = Some(Arc::new(move || ctx.request_repaint()));

        Self {
            state,
            host,
            dialog: Dialog::None,
            applied_theme: None,
            applied_on_top: None,
            geometry_dirty: None,
        }
    }

    /// Viewport options restored from settings
    pub fn viewport(settings: &AppSettings, icon: egui::IconData) -> egui::ViewportBuilder {
        let mut viewport = egui::ViewportBuilder::default()
            .with_title("SnapFrame")
            .with_inner_size([settings.window_width as f32, settings.window_height as f32])
            .with_min_inner_size([600.0, 520.0])
            .with_icon(Arc::new(icon))
            .with_resizable(true);
        if let Some((x, y)) = settings.window_position() {
            viewport = viewport.with_position([x as f32, y as f32]);
        }
        if settings.stay_on_top {
            viewport = viewport.with_always_on_top();
        }
        viewport
    }

    fn capture_hwnd(&self, frame: &eframe::Frame) {
        use raw_window_handle::{HasWindowHandle, RawWindowHandle};
        let mut state = self.state.lock();
        if state.main_hwnd == 0 {
            if let Ok(handle) = frame.window_handle() {
                if let RawWindowHandle::Win32(win32) = handle.as_raw() {
                    state.main_hwnd = win32.hwnd.get();
                }
            }
        }
    }

    fn sync_window_state(&mut self, ctx: &egui::Context) {
        let (theme_key, on_top) = {
            let state = self.state.lock();
            ((state.settings.theme, state.main_hwnd), state.settings.stay_on_top)
        };

        if self.applied_theme != Some(theme_key) {
            theme::apply(ctx, theme_key.0, theme_key.1);
            self.applied_theme = Some(theme_key);
        }

        if self.applied_on_top != Some(on_top) {
            let level = if on_top {
                egui::WindowLevel::AlwaysOnTop
            } else {
                egui::WindowLevel::Normal
            };
            ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(level));
            self.applied_on_top = Some(on_top);
        }
    }

    fn track_geometry(&mut self, ctx: &egui::Context) {
        let (outer, inner, minimized) = ctx.input(|i| {
            let vp = i.viewport();
            (vp.outer_rect, vp.inner_rect, vp.minimized.unwrap_or(false))
        });
        let (Some(outer), Some(inner)) = (outer, inner) else {
            return;
        };
        if minimized {
            return;
        }

        let geometry = (
            inner.width().round() as i32,
            inner.height().round() as i32,
            outer.min.x.round() as i32,
            outer.min.y.round() as i32,
        );

        let mut state = self.state.lock();
        let s = &mut state.settings;
        if (s.window_width, s.window_height, s.window_x, s.window_y) != geometry {
            // Off-screen positions fall back to centering
            (s.window_width, s.window_height) = (geometry.0, geometry.1);
            (s.window_x, s.window_y) = (geometry.2.max(-1), geometry.3.max(-1));
            self.geometry_dirty = Some(Instant::now());
        }

        if let Some(since) = self.geometry_dirty {
            if since.elapsed() >= GEOMETRY_SAVE_DELAY {
                state.save_settings();
                self.geometry_dirty = None;
            } else {
                ctx.request_repaint_after(GEOMETRY_SAVE_DELAY);
            }
        }
    }

    fn handle_close(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }

        let mut state = self.state.lock();
        if !state.exit_requested && state.settings.minimize_to_tray {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            let hwnd = state.main_hwnd;
            drop(state);
            if hwnd != 0 {
                unsafe {
                    let _ = ShowWindow(HWND(hwnd as *mut std::ffi::c_void), SW_HIDE);
                }
            }
            log::debug!("Main window hidden to tray");
            return;
        }

        state.save_settings();
        log::info!("Exiting");
    }

    fn open_settings(&mut self) {
        let draft = SettingsDraft::from_settings(&self.state.lock().settings);
        self.dialog = Dialog::Settings { draft, error: None };
    }

    fn start_capture(&self, size: CaptureSize) {
        {
            let mut state = self.state.lock();
            state.settings.remember_preset(size);
            state.save_settings();
        }
        self.host.send(HostCommand::StartCapture(size));
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let mut close = false;

        match &mut self.dialog {
            Dialog::None => {}
            Dialog::Settings { draft, error } => match settings_dialog(ctx, draft, error) {
                DialogResponse::Accepted => {
                    let mut state = self.state.lock();
                    let mut settings = state.settings.clone();
                    match draft.apply(&mut settings) {
                        Ok(()) => {
                            state.settings = settings;
                            state.save_settings();
                            drop(state);
                            self.host.send(HostCommand::ReloadHotkey);
                            close = true;
                        }
                        Err(message) => *error = Some(message),
                    }
                }
                DialogResponse::Cancelled => close = true,
                DialogResponse::Pending => {}
            },
            Dialog::CustomSize { draft, error } => match custom_size_dialog(ctx, draft, error) {
                DialogResponse::Accepted => match draft.build() {
                    Ok(size) => {
                        let mut state = self.state.lock();
                        log::info!("Added custom size {} {}x{}", size.name, size.width, size.height);
                        state.settings.add_custom_size(size);
                        state.save_settings();
                        close = true;
                    }
                    Err(message) => *error = Some(message),
                },
                DialogResponse::Cancelled => close = true,
                DialogResponse::Pending => {}
            },
            Dialog::ConfirmDelete { index, name } => {
                match confirm_dialog(ctx, "Delete Preset", &format!("Delete '{}'?", name)) {
                    DialogResponse::Accepted => {
                        let mut state = self.state.lock();
                        if state.settings.remove_custom_size(*index).is_some() {
                            state.save_settings();
                        }
                        close = true;
                    }
                    DialogResponse::Cancelled => close = true,
                    DialogResponse::Pending => {}
                }
            }
        }

        if close {
            self.dialog = Dialog::None;
        }
    }

    fn size_grid(ui: &mut egui::Ui, theme: AppTheme, settings: &AppSettings) -> Option<SizeAction> {
        let mut action = None;
        let fill = theme::preset_fill(theme);
        let accent = theme::accent(theme);
        let last = settings.last_preset();

        let size_button = |ui: &mut egui::Ui, label: String, selected: bool| {
            let width = ui.available_width();
            let text = RichText::new(label).size(15.0);
            let mut button = egui::Button::new(text).fill(fill).rounding(6.0);
            if selected {
                button = button.stroke(egui::Stroke::new(2.0, accent));
            }
            ui.add_sized([width, BUTTON_HEIGHT], button).clicked()
        };

        // Presets plus the add button share the first grid
        let preset_count = PRESETS.len() + 1;
        for row in 0..preset_count.div_ceil(COLUMNS) {
            ui.columns(COLUMNS, |cols| {
                for (col, ui) in cols.iter_mut().enumerate() {
                    let i = row * COLUMNS + col;
                    if let Some(&(w, h, name)) = PRESETS.get(i) {
                        let size = CaptureSize::new(w, h);
                        if size_button(ui, format!("{}×{}\n{}", w, h, name), size == last) {
                            action = Some(SizeAction::Capture(size));
                        }
                    } else if i == PRESETS.len() && size_button(ui, "+\nAdd Custom".into(), false) {
                        action = Some(SizeAction::AddCustom);
                    }
                }
            });
            ui.add_space(6.0);
        }

        if settings.custom_sizes.is_empty() {
            return action;
        }

        ui.add_space(6.0);
        ui.label(RichText::new("Custom sizes").strong());
        ui.add_space(4.0);

        let customs = &settings.custom_sizes;
        for row in 0..customs.len().div_ceil(COLUMNS) {
            ui.columns(COLUMNS, |cols| {
                for (col, ui) in cols.iter_mut().enumerate() {
                    let i = row * COLUMNS + col;
                    let Some(custom) = customs.get(i) else {
                        continue;
                    };
                    ui.horizontal(|ui| {
                        let delete = ui.small_button("×").on_hover_text("Delete");
                        if delete.clicked() {
                            action = Some(SizeAction::Delete(i));
                        }
                        let label = format!("{}×{}\n{}", custom.width, custom.height, custom.name);
                        if size_button(ui, label, custom.size() == last) {
                            action = Some(SizeAction::Capture(custom.size()));
                        }
                    });
                }
            });
            ui.add_space(6.0);
        }

        action
    }

    fn bottom_panel(&mut self, ui: &mut egui::Ui, settings: &AppSettings, status: &StatusLine) {
        let folder = settings.output_folder.clone();
        let folder_text = folder.display().to_string();

        ui.horizontal(|ui| {
            ui.label(format!("Output: {}", truncate_path(&folder_text, PATH_DISPLAY_LEN)))
                .on_hover_text(folder_text.as_str());

            if ui.button("Open Folder").clicked() {
                if folder.is_dir() {
                    if let Err(e) = notice::open_folder(&folder) {
                        notice::error(&format!("Failed to open folder: {}", e));
                    }
                } else {
                    notice::warning("Output folder does not exist.");
                }
            }

            if ui.button("Change Folder").clicked() {
                if let Some(picked) = rfd::FileDialog::new()
                    .set_title("Select output folder")
                    .set_directory(&folder)
                    .pick_folder()
                {
                    let mut state = self.state.lock();
                    state.settings.output_folder = picked;
                    state.save_settings();
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label(format!("Global Hotkey: {}", settings.hotkey));
            if ui.button("Change Hotkey").clicked() {
                self.open_settings();
            }
        });

        let mut on_top = settings.stay_on_top;
        if ui.checkbox(&mut on_top, "Stay on Top").changed() {
            let mut state = self.state.lock();
            state.settings.stay_on_top = on_top;
            state.save_settings();
        }

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new(&status.text).weak());
            if status.saved_count > 0 {
                let counter = ui.label(RichText::new(format!("({} saved)", status.saved_count)).weak());
                if let Some(path) = &status.last_saved {
                    counter.on_hover_text(path.display().to_string());
                }
            }
        });
    }
}

impl eframe::App for SnapFrameApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.capture_hwnd(frame);
        self.sync_window_state(ctx);
        self.track_geometry(ctx);

        if std::mem::take(&mut self.state.lock().open_settings) {
            self.open_settings();
        }

        // Clone necessary data to avoid holding lock during UI rendering
        let (settings, status) = {
            let state = self.state.lock();
            (state.settings.clone(), StatusLine::from_machine(&state.machine))
        };
        let modal_open = !matches!(self.dialog, Dialog::None);

        egui::TopBottomPanel::bottom("bottom")
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.add_enabled_ui(!modal_open, |ui| self.bottom_panel(ui, &settings, &status));
                ui.add_space(8.0);
            });

        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("Choose a capture size:");
            ui.add_space(12.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_enabled_ui(!modal_open, |ui| {
                    action = Self::size_grid(ui, settings.theme, &settings);
                });
            });
        });

        match action {
            Some(SizeAction::Capture(size)) => self.start_capture(size),
            Some(SizeAction::AddCustom) => {
                self.dialog = Dialog::CustomSize {
                    draft: CustomSizeDraft::default(),
                    error: None,
                };
            }
            Some(SizeAction::Delete(index)) => {
                if let Some(custom) = settings.custom_sizes.get(index) {
                    self.dialog = Dialog::ConfirmDelete {
                        index,
                        name: custom.name.clone(),
                    };
                }
            }
            None => {}
        }

        self.show_dialog(ctx);
        self.handle_close(ctx);
    }
}
