//! Message boxes and shell helpers

use crate::settings::APP_NAME;
use std::path::Path;
use std::process::Command;
use windows::core::HSTRING;
use windows::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, MB_ICONERROR, MB_ICONINFORMATION, MB_ICONWARNING, MB_OK, MB_SETFOREGROUND,
    MB_TOPMOST, MESSAGEBOX_STYLE,
};

fn show(text: &str, icon: MESSAGEBOX_STYLE) {
    unsafe {
        MessageBoxW(
            None,
            &HSTRING::from(text),
            &HSTRING::from(APP_NAME),
            MB_OK | icon | MB_TOPMOST | MB_SETFOREGROUND,
        );
    }
}

pub fn info(text: &str) {
    show(text, MB_ICONINFORMATION);
}

pub fn warning(text: &str) {
    show(text, MB_ICONWARNING);
}

pub fn error(text: &str) {
    show(text, MB_ICONERROR);
}

/// Open `folder` in Explorer
pub fn open_folder(folder: &Path) -> std::io::Result<()> {
    Command::new("explorer.exe").arg(folder).spawn()?;
    Ok(())
}
