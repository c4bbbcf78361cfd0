//! Process-wide setup: single instance guard and DPI awareness

use windows::core::w;
use windows::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE};
use windows::Win32::System::Threading::CreateMutexW;
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

/// Named mutex held for the lifetime of the process
pub struct SingleInstance {
    handle: HANDLE,
}

impl SingleInstance {
    /// `Ok(None)` when another instance already owns the mutex
    pub fn acquire() -> windows::core::Result<Option<Self>> {
        unsafe {
            let handle = CreateMutexW(None, true, w!("SnapFrame_SingleInstance"))?;
            if GetLastError() == ERROR_ALREADY_EXISTS {
                let _ = CloseHandle(handle);
                return Ok(None);
            }
            Ok(Some(Self { handle }))
        }
    }
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

pub fn set_dpi_awareness() {
    unsafe {
        if let Err(e) = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) {
            log::warn!("Failed to set per-monitor DPI awareness: {}", e);
        }
    }
}
