//! Modal dialogs drawn inside the main window

use crate::forms::{CustomSizeDraft, SettingsDraft};
use crate::hotkey::{HotkeyKey, Modifiers};
use crate::settings::{AppTheme, HotkeyMode};
use capture::{CaptureSize, SnapMode};
use egui::{Align2, Color32, RichText};

/// What the user did with a dialog this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResponse {
    Pending,
    Accepted,
    Cancelled,
}

fn modal(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
}

fn error_label(ui: &mut egui::Ui, error: &Option<String>) {
    if let Some(message) = error {
        ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
    }
}

fn ok_cancel(ui: &mut egui::Ui, ok: &str, cancel: &str) -> DialogResponse {
    let mut response = DialogResponse::Pending;
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if ui.add_sized([80.0, 26.0], egui::Button::new(cancel)).clicked() {
            response = DialogResponse::Cancelled;
        }
        if ui.add_sized([80.0, 26.0], egui::Button::new(ok)).clicked() {
            response = DialogResponse::Accepted;
        }
    });
    response
}

fn size_input(ui: &mut egui::Ui, value: &mut u32) {
    ui.add(
        egui::DragValue::new(value)
            .range(CaptureSize::MIN_SIDE..=CaptureSize::MAX_SIDE)
            .speed(4.0),
    );
    *value = (*value).clamp(CaptureSize::MIN_SIDE, CaptureSize::MAX_SIDE);
}

fn escape_pressed(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.key_pressed(egui::Key::Escape))
}

/// Settings dialog
pub fn settings_dialog(
    ctx: &egui::Context,
    draft: &mut SettingsDraft,
    error: &Option<String>,
) -> DialogResponse {
    let mut response = DialogResponse::Pending;

    modal("SnapFrame Settings").show(ctx, |ui| {
        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([12.0, 10.0])
            .show(ui, |ui| {
                ui.label("Hotkey:");
                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_source("hotkey_modifiers")
                        .selected_text(draft.modifiers.to_string())
                        .show_ui(ui, |ui| {
                            for choice in Modifiers::CHOICES {
                                ui.selectable_value(&mut draft.modifiers, choice, choice.to_string());
                            }
                        });
                    ui.label("+");
                    egui::ComboBox::from_id_source("hotkey_key")
                        .width(60.0)
                        .selected_text(draft.key.name())
                        .show_ui(ui, |ui| {
                            for key in HotkeyKey::ALL {
                                ui.selectable_value(&mut draft.key, key, key.name());
                            }
                        });
                });
                ui.end_row();

                ui.label("Hotkey Size:");
                egui::ComboBox::from_id_source("hotkey_mode")
                    .selected_text(draft.hotkey_mode.label())
                    .show_ui(ui, |ui| {
                        for mode in [HotkeyMode::LastPreset, HotkeyMode::Fixed] {
                            ui.selectable_value(&mut draft.hotkey_mode, mode, mode.label());
                        }
                    });
                ui.end_row();

                ui.label("Fixed Size:");
                let enabled = draft.fixed_size_enabled();
                ui.add_enabled_ui(enabled, |ui| {
                    ui.horizontal(|ui| {
                        size_input(ui, &mut draft.fixed_width);
                        ui.label("×");
                        size_input(ui, &mut draft.fixed_height);
                        ui.label("pixels");
                    });
                });
                ui.end_row();

                ui.label("Output Folder:");
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut draft.output_folder).desired_width(260.0));
                    if ui.button("...").clicked() {
                        if let Some(folder) = rfd::FileDialog::new()
                            .set_title("Select output folder")
                            .set_directory(&draft.output_folder)
                            .pick_folder()
                        {
                            draft.output_folder = folder.display().to_string();
                        }
                    }
                });
                ui.end_row();

                ui.label("Snap Mode:");
                egui::ComboBox::from_id_source("snap_mode")
                    .selected_text(draft.snap_mode.label())
                    .show_ui(ui, |ui| {
                        for mode in SnapMode::ALL {
                            ui.selectable_value(&mut draft.snap_mode, mode, mode.label());
                        }
                    });
                ui.end_row();

                ui.label("");
                ui.vertical(|ui| {
                    ui.checkbox(&mut draft.minimize_to_tray, "Minimize to system tray on close");
                    ui.checkbox(&mut draft.continuous_capture, "Continuous capture mode");
                    ui.checkbox(&mut draft.show_notifications, "Show notifications");
                });
                ui.end_row();

                ui.label("Theme:");
                egui::ComboBox::from_id_source("theme")
                    .selected_text(format!("{:?}", draft.theme))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut draft.theme, AppTheme::Light, "Light");
                        ui.selectable_value(&mut draft.theme, AppTheme::Dark, "Dark");
                    });
                ui.end_row();
            });

        ui.add_space(6.0);
        error_label(ui, error);
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                    .small()
                    .weak(),
            );
            response = ok_cancel(ui, "OK", "Cancel");
        });
    });

    if response == DialogResponse::Pending && escape_pressed(ctx) {
        response = DialogResponse::Cancelled;
    }
    response
}

/// Add custom size dialog
pub fn custom_size_dialog(
    ctx: &egui::Context,
    draft: &mut CustomSizeDraft,
    error: &Option<String>,
) -> DialogResponse {
    let mut response = DialogResponse::Pending;

    modal("Add Custom Size").show(ctx, |ui| {
        egui::Grid::new("custom_size_grid")
            .num_columns(2)
            .spacing([12.0, 10.0])
            .show(ui, |ui| {
                ui.label("Name:");
                let name = ui.add(egui::TextEdit::singleline(&mut draft.name).desired_width(180.0));
                if name.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    response = DialogResponse::Accepted;
                }
                ui.end_row();

                ui.label("Width:");
                size_input(ui, &mut draft.width);
                ui.end_row();

                ui.label("Height:");
                size_input(ui, &mut draft.height);
                ui.end_row();
            });

        ui.add_space(6.0);
        error_label(ui, error);
        let buttons = ok_cancel(ui, "OK", "Cancel");
        if buttons != DialogResponse::Pending {
            response = buttons;
        }
    });

    if response == DialogResponse::Pending && escape_pressed(ctx) {
        response = DialogResponse::Cancelled;
    }
    response
}

/// Yes/No confirmation
pub fn confirm_dialog(ctx: &egui::Context, title: &str, message: &str) -> DialogResponse {
    let mut response = DialogResponse::Pending;

    modal(title).show(ctx, |ui| {
        ui.add_space(4.0);
        ui.label(message);
        ui.add_space(10.0);
        response = ok_cancel(ui, "Yes", "No");
    });

    if response == DialogResponse::Pending && escape_pressed(ctx) {
        response = DialogResponse::Cancelled;
    }
    response
}
