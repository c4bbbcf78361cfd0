//! Monitor layout and cursor queries

use crate::{Point, Rect};
use windows::Win32::Foundation::{BOOL, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, MONITORINFOF_PRIMARY, SM_CXVIRTUALSCREEN,
    SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};

/// A display attached to the desktop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub bounds: Rect,
    pub work_area: Rect,
    pub primary: bool,
}

fn rect_from_win(r: &RECT) -> Rect {
    Rect::from_edges(r.left, r.top, r.right, r.bottom)
}

/// Bounding rectangle of all monitors
pub fn virtual_screen() -> Rect {
    unsafe {
        Rect::new(
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN).max(0) as u32,
            GetSystemMetrics(SM_CYVIRTUALSCREEN).max(0) as u32,
        )
    }
}

/// Enumerate attached monitors
pub fn monitors() -> Vec<Monitor> {
    let mut monitors: Vec<Monitor> = Vec::new();

    unsafe {
        let _ = EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_callback),
            LPARAM(&mut monitors as *mut Vec<Monitor> as isize),
        );
    }

    if monitors.is_empty() {
        log::warn!("Monitor enumeration returned nothing, using virtual screen");
        let vs = virtual_screen();
        monitors.push(Monitor { bounds: vs, work_area: vs, primary: true });
    }

    monitors
}

unsafe extern "system" fn enum_monitor_callback(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = &mut *(lparam.0 as *mut Vec<Monitor>);

    let mut mi = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    if GetMonitorInfoW(hmonitor, &mut mi).as_bool() {
        monitors.push(Monitor {
            bounds: rect_from_win(&mi.rcMonitor),
            work_area: rect_from_win(&mi.rcWork),
            primary: mi.dwFlags & MONITORINFOF_PRIMARY != 0,
        });
    }

    BOOL(1) // Continue enumeration
}

/// Current cursor position in virtual-desktop coordinates
pub fn cursor_position() -> Point {
    let mut pt = POINT::default();
    unsafe {
        let _ = GetCursorPos(&mut pt);
    }
    Point::new(pt.x, pt.y)
}
