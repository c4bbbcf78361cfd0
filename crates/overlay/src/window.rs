//! Overlay window implementation

use crate::{
    frame::FrameWindow, OverlayConfig, OverlayError, OverlayResult, SelectionOutcome,
};
use capture::{cursor_position, monitors, placement, virtual_screen, Point, Rect};
use std::cell::RefCell;
use std::sync::Once;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Dwm::DwmFlush;
use windows::Win32::Graphics::Gdi::{GetStockObject, HBRUSH, BLACK_BRUSH};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{SetFocus, VK_ESCAPE};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, LoadCursorW,
    PostQuitMessage, RegisterClassExW, SetForegroundWindow, SetLayeredWindowAttributes,
    SetWindowPos, ShowWindow, TranslateMessage, HTCLIENT, HWND_TOPMOST, IDC_CROSS, LWA_ALPHA,
    MSG, SWP_NOACTIVATE, SW_HIDE, SW_SHOW, WM_CLOSE, WM_DISPLAYCHANGE, WM_KEYDOWN,
    WM_LBUTTONDOWN, WM_MOUSEMOVE, WM_NCHITTEST, WM_RBUTTONDOWN, WNDCLASSEXW, WS_EX_LAYERED,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

thread_local! {
    static OVERLAY_STATE: RefCell<Option<OverlayState>> = RefCell::new(None);
}

/// Alpha of the input window: invisible, but still hit-tested
const INPUT_ALPHA: u8 = 1;

static REGISTER: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Capture(Rect),
    Cancel,
}

struct OverlayState {
    config: OverlayConfig,
    frame: FrameWindow,
    monitors: Vec<Rect>,
    virtual_screen: Rect,
    last_cursor: Option<Point>,
    pending: Option<Action>,
}

impl OverlayState {
    fn rect_at(&self, cursor: Point) -> Rect {
        placement(
            cursor,
            self.config.size,
            &self.monitors,
            self.virtual_screen,
            self.config.snap_mode,
        )
    }

    /// Move the frame if the cursor moved since the last update
    fn refresh(&mut self) {
        let cursor = cursor_position();
        if self.last_cursor == Some(cursor) {
            return;
        }
        self.last_cursor = Some(cursor);
        let rect = self.rect_at(cursor);
        self.frame.move_to(rect);
    }

    fn reload_screens(&mut self) {
        self.monitors = monitors().iter().map(|m| m.bounds).collect();
        self.virtual_screen = virtual_screen();
        self.last_cursor = None;
        log::info!(
            "Display layout changed: {} monitor(s), virtual screen {:?}",
            self.monitors.len(),
            self.virtual_screen
        );
    }
}

fn with_state<R>(f: impl FnOnce(&mut OverlayState) -> R) -> Option<R> {
    OVERLAY_STATE.with(|s| match s.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => None,
    })
}

/// Overlay window for fixed-size capture
pub struct OverlayWindow;

impl OverlayWindow {
    const CLASS_NAME: PCWSTR = w!("SnapFrameOverlay");

    fn register_class() -> OverlayResult<HINSTANCE> {
        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);
            let cursor = LoadCursorW(None, IDC_CROSS)?;

            REGISTER.call_once(|| {
                let wc = WNDCLASSEXW {
                    cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                    lpfnWndProc: Some(Self::wnd_proc),
                    hInstance: hinstance,
                    hCursor: cursor,
                    hbrBackground: HBRUSH(GetStockObject(BLACK_BRUSH).0),
                    lpszClassName: Self::CLASS_NAME,
                    ..Default::default()
                };
                RegisterClassExW(&wc);
            });

            Ok(hinstance)
        }
    }

    /// Show the overlay and block until the user captures or cancels.
    ///
    /// `on_capture` runs for every confirmed rectangle while the overlay is
    /// hidden; returning `false` ends a continuous session.
    pub fn run<F>(config: OverlayConfig, mut on_capture: F) -> OverlayResult<SelectionOutcome>
    where
        F: FnMut(Rect) -> bool,
    {
        let already_active = OVERLAY_STATE.with(|s| {
            s.try_borrow().map(|state| state.is_some()).unwrap_or(true)
        });
        if already_active {
            return Err(OverlayError::AlreadyActive);
        }

        let hinstance = Self::register_class()?;

        let state = OverlayState {
            config,
            frame: FrameWindow::create()?,
            monitors: monitors().iter().map(|m| m.bounds).collect(),
            virtual_screen: virtual_screen(),
            last_cursor: None,
            pending: None,
        };
        let vs = state.virtual_screen;

        OVERLAY_STATE.with(|s| {
            *s.borrow_mut() = Some(state);
        });

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_LAYERED,
                Self::CLASS_NAME,
                w!("SnapFrame Selection"),
                WS_POPUP,
                vs.x,
                vs.y,
                vs.width as i32,
                vs.height as i32,
                None,
                None,
                hinstance,
                None,
            )
        };
        let hwnd = match hwnd {
            Ok(hwnd) => hwnd,
            Err(e) => {
                OVERLAY_STATE.with(|s| *s.borrow_mut() = None);
                return Err(e.into());
            }
        };

        log::debug!(
            "Overlay open: {} snap={:?} continuous={}",
            config.size,
            config.snap_mode,
            config.continuous
        );

        let result = unsafe { Self::message_loop(hwnd, config, &mut on_capture) };

        // Cleanup
        unsafe {
            let _ = DestroyWindow(hwnd);
        }
        OVERLAY_STATE.with(|s| {
            *s.borrow_mut() = None;
        });

        result
    }

    unsafe fn message_loop<F>(
        hwnd: HWND,
        config: OverlayConfig,
        on_capture: &mut F,
    ) -> OverlayResult<SelectionOutcome>
    where
        F: FnMut(Rect) -> bool,
    {
        SetLayeredWindowAttributes(hwnd, COLORREF(0), INPUT_ALPHA, LWA_ALPHA)?;
        Self::present(hwnd);

        let mut captures = Vec::new();
        let mut msg = MSG::default();
        loop {
            let ret = GetMessageW(&mut msg, None, 0, 0);
            if !ret.as_bool() {
                // Hand WM_QUIT back to the owning loop
                PostQuitMessage(msg.wParam.0 as i32);
                break;
            }
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);

            match with_state(|state| state.pending.take()).flatten() {
                Some(Action::Capture(rect)) => {
                    // Hide overlay and flush DWM so it never appears in the capture
                    Self::conceal(hwnd);
                    let _ = DwmFlush();

                    captures.push(rect);
                    let keep_going = on_capture(rect);
                    if config.continuous && keep_going {
                        Self::present(hwnd);
                    } else {
                        break;
                    }
                }
                Some(Action::Cancel) => break,
                None => {}
            }
        }

        Ok(SelectionOutcome::from_captures(captures))
    }

    unsafe fn present(hwnd: HWND) {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
        let _ = SetFocus(hwnd);
        with_state(|state| {
            state.last_cursor = None;
            state.refresh();
        });
    }

    unsafe fn conceal(hwnd: HWND) {
        with_state(|state| state.frame.hide());
        let _ = ShowWindow(hwnd, SW_HIDE);
    }

    unsafe fn on_display_change(hwnd: HWND) {
        let vs = with_state(|state| {
            state.reload_screens();
            state.virtual_screen
        });
        if let Some(vs) = vs {
            let _ = SetWindowPos(
                hwnd,
                HWND_TOPMOST,
                vs.x,
                vs.y,
                vs.width as i32,
                vs.height as i32,
                SWP_NOACTIVATE,
            );
        }
        with_state(|state| state.refresh());
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_NCHITTEST => LRESULT(HTCLIENT as isize),

            WM_MOUSEMOVE => {
                with_state(|state| state.refresh());
                LRESULT(0)
            }

            WM_LBUTTONDOWN => {
                with_state(|state| {
                    if state.pending.is_none() {
                        let rect = state.rect_at(cursor_position());
                        state.pending = Some(Action::Capture(rect));
                    }
                });
                LRESULT(0)
            }

            WM_RBUTTONDOWN => {
                with_state(|state| state.pending = Some(Action::Cancel));
                LRESULT(0)
            }

            WM_KEYDOWN => {
                if wparam.0 as u16 == VK_ESCAPE.0 {
                    with_state(|state| state.pending = Some(Action::Cancel));
                }
                LRESULT(0)
            }

            WM_DISPLAYCHANGE => {
                Self::on_display_change(hwnd);
                LRESULT(0)
            }

            WM_CLOSE => {
                with_state(|state| state.pending = Some(Action::Cancel));
                LRESULT(0)
            }

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}
