//! Capture frame window (topmost, click-through).

use crate::decor::{frame_segments, SegmentKind};
use crate::{OverlayError, OverlayResult};
use capture::Rect;
use std::sync::Once;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, PAINTSTRUCT, UpdateWindow,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, RegisterClassExW,
    SetLayeredWindowAttributes, SetWindowPos, ShowWindow, HTTRANSPARENT, HWND_TOPMOST,
    LWA_COLORKEY, SWP_NOACTIVATE, SWP_SHOWWINDOW, SW_HIDE, WM_ERASEBKGND, WM_NCHITTEST,
    WM_PAINT, WNDCLASSEXW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST,
    WS_EX_TRANSPARENT, WS_POPUP,
};

const FRAME_CLASS: PCWSTR = w!("SnapFrameCaptureFrame");

/// Keyed out by the layered window, so the interior shows the desktop
const KEY_COLOR: COLORREF = COLORREF(0x00FF00FF);
const BORDER_COLOR: COLORREF = COLORREF(0x0000FF00); // Lime
const CORNER_COLOR: COLORREF = COLORREF(0x00FFFFFF); // White

static REGISTER: Once = Once::new();

fn register_class() -> OverlayResult<()> {
    let mut result: Result<(), OverlayError> = Ok(());
    REGISTER.call_once(|| unsafe {
        let hmodule = match GetModuleHandleW(None) {
            Ok(h) => h,
            Err(e) => {
                result = Err(e.into());
                return;
            }
        };
        let hinstance = HINSTANCE(hmodule.0);
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(frame_wnd_proc),
            hInstance: hinstance,
            lpszClassName: FRAME_CLASS,
            ..Default::default()
        };

        let _ = RegisterClassExW(&wc);
    });

    result
}

/// Lime rectangle with white corner markers drawn around the capture area
pub struct FrameWindow {
    hwnd: HWND,
    rect: Option<Rect>,
}

impl FrameWindow {
    /// Create the (hidden) frame window
    pub fn create() -> OverlayResult<Self> {
        register_class()?;

        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);

            let hwnd = CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_TRANSPARENT | WS_EX_NOACTIVATE | WS_EX_LAYERED,
                FRAME_CLASS,
                w!("SnapFrame Capture Frame"),
                WS_POPUP,
                0,
                0,
                0,
                0,
                None,
                None,
                hinstance,
                None,
            )?;

            SetLayeredWindowAttributes(hwnd, KEY_COLOR, 0, LWA_COLORKEY)?;

            Ok(Self { hwnd, rect: None })
        }
    }

    /// Move the frame over `rect` and make sure it is visible
    pub fn move_to(&mut self, rect: Rect) {
        let resized = self.rect.map_or(true, |r| r.width != rect.width || r.height != rect.height);
        self.rect = Some(rect);

        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
                SWP_NOACTIVATE | SWP_SHOWWINDOW,
            );
            if resized {
                let _ = UpdateWindow(self.hwnd);
            }
        }
    }

    pub fn hide(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_HIDE);
        }
    }
}

impl Drop for FrameWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

unsafe fn paint_frame(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);
    if hdc.is_invalid() {
        let _ = EndPaint(hwnd, &ps);
        return;
    }

    let mut client = RECT::default();
    let _ = GetClientRect(hwnd, &mut client);

    let key_brush = CreateSolidBrush(KEY_COLOR);
    let border_brush = CreateSolidBrush(BORDER_COLOR);
    let corner_brush = CreateSolidBrush(CORNER_COLOR);

    FillRect(hdc, &client, key_brush);

    for segment in frame_segments(client.right - client.left, client.bottom - client.top) {
        let r = RECT {
            left: segment.x,
            top: segment.y,
            right: segment.x + segment.width,
            bottom: segment.y + segment.height,
        };
        let brush = match segment.kind {
            SegmentKind::Border => border_brush,
            SegmentKind::Corner => corner_brush,
        };
        FillRect(hdc, &r, brush);
    }

    let _ = DeleteObject(key_brush);
    let _ = DeleteObject(border_brush);
    let _ = DeleteObject(corner_brush);

    let _ = EndPaint(hwnd, &ps);
}

unsafe extern "system" fn frame_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCHITTEST => LRESULT(HTTRANSPARENT as isize),
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            paint_frame(hwnd);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
