//! System tray implementation

use crate::icon::icon_bgra;
use crate::settings::APP_NAME;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, POINT, TRUE};
use windows::Win32::Graphics::Gdi::{CreateBitmap, DeleteObject};
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_INFO, NIF_MESSAGE, NIF_TIP, NIIF_INFO, NIM_ADD, NIM_DELETE,
    NIM_MODIFY, NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreateIconIndirect, CreatePopupMenu, DestroyIcon, DestroyMenu, GetCursorPos,
    SetForegroundWindow, TrackPopupMenu, HICON, ICONINFO, MF_SEPARATOR, MF_STRING,
    TPM_BOTTOMALIGN, TPM_LEFTALIGN, TPM_RETURNCMD, TPM_RIGHTBUTTON, WM_USER,
};

/// Tray icon message
pub const WM_TRAYICON: u32 = WM_USER + 1;
/// Sent in the tray message's lparam when the balloon is clicked
pub const NIN_BALLOONUSERCLICK: u32 = WM_USER + 5;

/// Tray menu commands
pub const ID_TRAY_OPEN: u32 = 1001;
pub const ID_TRAY_SETTINGS: u32 = 1002;
pub const ID_TRAY_EXIT: u32 = 1003;

const ICON_SIZE: u32 = 32;
const BALLOON_TIMEOUT_MS: u32 = 2000;

fn copy_wide(dst: &mut [u16], text: &str) {
    let wide: Vec<u16> = text.encode_utf16().collect();
    let len = wide.len().min(dst.len() - 1);
    dst.fill(0);
    dst[..len].copy_from_slice(&wide[..len]);
}

/// Build the bracket icon as an HICON
fn create_icon() -> windows::core::Result<HICON> {
    let pixels = icon_bgra(ICON_SIZE);
    // 1bpp AND mask, rows padded to 16 bits, all zero = fully opaque
    let mask_bits = vec![0u8; (ICON_SIZE.div_ceil(16) * 2 * ICON_SIZE) as usize];

    unsafe {
        let color = CreateBitmap(
            ICON_SIZE as i32,
            ICON_SIZE as i32,
            1,
            32,
            Some(pixels.as_ptr() as *const _),
        );
        let mask = CreateBitmap(
            ICON_SIZE as i32,
            ICON_SIZE as i32,
            1,
            1,
            Some(mask_bits.as_ptr() as *const _),
        );

        let info = ICONINFO {
            fIcon: TRUE,
            xHotspot: 0,
            yHotspot: 0,
            hbmMask: mask,
            hbmColor: color,
        };
        let icon = CreateIconIndirect(&info);

        let _ = DeleteObject(color);
        let _ = DeleteObject(mask);
        icon
    }
}

/// System tray manager
pub struct SystemTray {
    nid: NOTIFYICONDATAW,
    visible: bool,
}

impl SystemTray {
    /// Create a new system tray
    pub fn new(hwnd: HWND) -> Self {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: hwnd,
            uID: 1,
            uFlags: NIF_ICON | NIF_MESSAGE | NIF_TIP,
            uCallbackMessage: WM_TRAYICON,
            ..Default::default()
        };
        copy_wide(&mut nid.szTip, APP_NAME);

        Self {
            nid,
            visible: false,
        }
    }

    /// Show the tray icon
    pub fn show(&mut self) -> windows::core::Result<()> {
        if self.visible {
            return Ok(());
        }

        if self.nid.hIcon.is_invalid() {
            self.nid.hIcon = create_icon()?;
        }

        unsafe {
            Shell_NotifyIconW(NIM_ADD, &self.nid).ok()?;
        }
        self.visible = true;
        Ok(())
    }

    /// Hide the tray icon
    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }

        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &self.nid);
        }
        self.visible = false;
    }

    /// Add the icon again after Explorer restarted
    pub fn restore(&mut self) -> windows::core::Result<()> {
        self.visible = false;
        self.show()
    }

    /// Show a balloon notification
    pub fn notify(&mut self, title: &str, text: &str) {
        if !self.visible {
            return;
        }

        self.nid.uFlags = NIF_INFO;
        self.nid.dwInfoFlags = NIIF_INFO;
        self.nid.Anonymous.uTimeout = BALLOON_TIMEOUT_MS;
        copy_wide(&mut self.nid.szInfoTitle, title);
        copy_wide(&mut self.nid.szInfo, text);

        unsafe {
            let _ = Shell_NotifyIconW(NIM_MODIFY, &self.nid);
        }

        self.nid.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
    }
}

impl Drop for SystemTray {
    fn drop(&mut self) {
        self.hide();
        if !self.nid.hIcon.is_invalid() {
            unsafe {
                let _ = DestroyIcon(self.nid.hIcon);
            }
        }
    }
}

/// Show the tray context menu and return the chosen command.
///
/// Runs a modal menu loop, so callers must not hold borrows that the
/// window procedure of `hwnd` needs.
pub fn show_context_menu(hwnd: HWND) -> windows::core::Result<Option<u32>> {
    unsafe {
        let menu = CreatePopupMenu()?;

        AppendMenuW(menu, MF_STRING, ID_TRAY_OPEN as usize, w!("Open"))?;
        AppendMenuW(menu, MF_STRING, ID_TRAY_SETTINGS as usize, w!("Settings"))?;
        AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null())?;
        AppendMenuW(menu, MF_STRING, ID_TRAY_EXIT as usize, w!("Exit"))?;

        let mut pt = POINT::default();
        let _ = GetCursorPos(&mut pt);

        // Required so the menu closes when focus moves elsewhere
        let _ = SetForegroundWindow(hwnd);
        let cmd = TrackPopupMenu(
            menu,
            TPM_LEFTALIGN | TPM_BOTTOMALIGN | TPM_RIGHTBUTTON | TPM_RETURNCMD,
            pt.x,
            pt.y,
            0,
            hwnd,
            None,
        );

        let _ = DestroyMenu(menu);

        let cmd = cmd.0 as u32;
        Ok(if cmd == 0 { None } else { Some(cmd) })
    }
}
