//! Host thread: tray icon, global hotkey and capture dispatch

use crate::hotkey::{GlobalHotkey, HOTKEY_ID};
use crate::notice;
use crate::settings::{HotkeyMode, APP_NAME};
use crate::shared::SharedUi;
use crate::tray::{
    show_context_menu, SystemTray, ID_TRAY_EXIT, ID_TRAY_OPEN, ID_TRAY_SETTINGS,
    NIN_BALLOONUSERCLICK, WM_TRAYICON,
};
use crate::worker::{SaveResult, SaveWorker};
use capture::{grab_region, monitors, CaptureResult, CaptureSize, FrameData, Rect, SnapMode};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use once_cell::sync::OnceCell;
use overlay::{OverlayConfig, OverlayWindow};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread::{self, JoinHandle};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, IsIconic,
    IsWindowVisible, PostMessageW, PostQuitMessage, RegisterClassExW, RegisterWindowMessageW,
    SetForegroundWindow, ShowWindow, TranslateMessage, MSG, SW_MINIMIZE, SW_RESTORE, SW_SHOW,
    WINDOW_EX_STYLE, WM_APP, WM_CLOSE, WM_DESTROY, WM_HOTKEY, WM_LBUTTONUP, WM_RBUTTONUP,
    WNDCLASSEXW, WS_OVERLAPPED,
};

/// Custom messages
pub const WM_APP_COMMAND: u32 = WM_APP + 1;
pub const WM_APP_SAVED: u32 = WM_APP + 2;

/// Requests sent from the main window
pub enum HostCommand {
    /// Capture a preset size picked in the main window
    StartCapture(CaptureSize),
    /// Settings changed, register the hotkey again
    ReloadHotkey,
    Shutdown,
}

/// Sender side used by the UI thread
#[derive(Clone)]
pub struct HostHandle {
    cmd_tx: Sender<HostCommand>,
    hwnd: isize,
}

impl HostHandle {
    pub fn send(&self, cmd: HostCommand) {
        if self.cmd_tx.send(cmd).is_ok() {
            post(self.hwnd, WM_APP_COMMAND);
        }
    }
}

struct HostContext {
    ui: SharedUi,
    cmd_rx: Receiver<HostCommand>,
    result_rx: Receiver<SaveResult>,
    worker: Rc<SaveWorker>,
    tray: SystemTray,
    hotkey: Option<GlobalHotkey>,
}

thread_local! {
    static HOST: RefCell<Option<HostContext>> = RefCell::new(None);
}

/// Broadcast by Explorer when the taskbar is recreated
static TASKBAR_CREATED: OnceCell<u32> = OnceCell::new();

fn hwnd_to_isize(hwnd: HWND) -> isize {
    hwnd.0 as isize
}

fn isize_to_hwnd(val: isize) -> HWND {
    HWND(val as *mut std::ffi::c_void)
}

fn post(hwnd_raw: isize, msg: u32) {
    unsafe {
        let _ = PostMessageW(isize_to_hwnd(hwnd_raw), msg, WPARAM(0), LPARAM(0));
    }
}

/// Borrow the host context without holding it across modal loops
fn with_host<R>(f: impl FnOnce(&mut HostContext) -> R) -> Option<R> {
    HOST.with(|h| match h.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => None,
    })
}

/// Start the host thread and wait until its window exists
pub fn spawn(ui: SharedUi) -> anyhow::Result<(HostHandle, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = unbounded();
    let (ready_tx, ready_rx) = bounded(1);

    let handle = thread::Builder::new().name("host".into()).spawn(move || {
        match create_window() {
            Ok(hwnd) => {
                let _ = ready_tx.send(Ok(hwnd_to_isize(hwnd)));
                run(hwnd, ui, cmd_rx);
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
            }
        }
    })?;

    let hwnd = ready_rx.recv()??;
    Ok((HostHandle { cmd_tx, hwnd }, handle))
}

fn create_window() -> windows::core::Result<HWND> {
    const CLASS_NAME: PCWSTR = w!("SnapFrameHost");

    unsafe {
        let hmodule = GetModuleHandleW(None)?;
        let hinstance = HINSTANCE(hmodule.0);

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance,
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        RegisterClassExW(&wc);

        let _ = TASKBAR_CREATED.set(RegisterWindowMessageW(w!("TaskbarCreated")));

        // Never shown; owns the tray icon and receives WM_HOTKEY
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            w!("SnapFrame Host"),
            WS_OVERLAPPED,
            0,
            0,
            0,
            0,
            None,
            None,
            hinstance,
            None,
        )
    }
}

fn run(hwnd: HWND, ui: SharedUi, cmd_rx: Receiver<HostCommand>) {
    let (result_tx, result_rx) = unbounded();
    let hwnd_raw = hwnd_to_isize(hwnd);
    let worker = match SaveWorker::spawn(result_tx, move || post(hwnd_raw, WM_APP_SAVED)) {
        Ok(worker) => worker,
        Err(e) => {
            log::error!("Failed to start save worker: {}", e);
            notice::error(&format!("Failed to start: {}", e));
            return;
        }
    };

    let mut tray = SystemTray::new(hwnd);
    if let Err(e) = tray.show() {
        log::warn!("Failed to add tray icon: {}", e);
    }

    HOST.with(|h| {
        *h.borrow_mut() = Some(HostContext {
            ui,
            cmd_rx,
            result_rx,
            worker: Rc::new(worker),
            tray,
            hotkey: None,
        });
    });

    register_hotkey(hwnd);

    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).into() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    // Unregisters the hotkey, removes the tray icon and joins the worker
    HOST.with(|h| {
        *h.borrow_mut() = None;
    });
    log::debug!("Host thread stopped");
}

fn register_hotkey(hwnd: HWND) {
    let hotkey = with_host(|host| {
        // Release the old registration first, the id is reused
        host.hotkey = None;
        host.ui.lock().settings.hotkey
    });
    let Some(hotkey) = hotkey else {
        return;
    };

    match GlobalHotkey::register(hwnd, HOTKEY_ID, hotkey) {
        Ok(registered) => {
            with_host(|host| host.hotkey = Some(registered));
        }
        Err(e) => {
            log::warn!("Failed to register hotkey {}: {}", hotkey, e);
            notice::warning(&format!("Failed to register hotkey {}: {}", hotkey, e.message()));
        }
    }
}

fn drain_commands(hwnd: HWND) {
    let Some(cmd_rx) = with_host(|host| host.cmd_rx.clone()) else {
        return;
    };

    while let Ok(cmd) = cmd_rx.try_recv() {
        match cmd {
            HostCommand::StartCapture(size) => start_capture(size, true),
            HostCommand::ReloadHotkey => register_hotkey(hwnd),
            HostCommand::Shutdown => {
                unsafe {
                    let _ = DestroyWindow(hwnd);
                }
                break;
            }
        }
    }
}

fn drain_results() {
    let Some((ui, result_rx)) = with_host(|host| (host.ui.clone(), host.result_rx.clone())) else {
        return;
    };

    while let Ok(result) = result_rx.try_recv() {
        match result {
            SaveResult::Saved(path) => {
                let notify = {
                    let mut state = ui.lock();
                    state.machine.record_saved(&path);
                    state.request_repaint();
                    state.settings.show_notifications
                };
                if notify {
                    with_host(|host| host.tray.notify(APP_NAME, "Screenshot saved!"));
                }
            }
            SaveResult::Failed(message) => {
                {
                    let mut state = ui.lock();
                    state.machine.record_failed(&message);
                    state.request_repaint();
                }
                notice::error(&format!("Failed to save screenshot: {}", message));
            }
        }
    }
}

fn on_hotkey() {
    let Some(ui) = with_host(|host| host.ui.clone()) else {
        return;
    };

    let size = {
        let mut state = ui.lock();
        if !state.machine.state().can_capture() {
            return;
        }
        let size = state.settings.capture_size_for_hotkey();
        if state.settings.hotkey_mode == HotkeyMode::Fixed {
            state.settings.remember_preset(size);
        }
        size
    };

    start_capture(size, false);
}

/// Grab `rect`, blacking out whatever lies outside the displays
fn grab_frame(rect: Rect, snap_mode: SnapMode) -> CaptureResult<FrameData> {
    let mut frame = grab_region(rect)?;
    if snap_mode == SnapMode::Off {
        let covered: Vec<Rect> = monitors().iter().map(|m| m.bounds).collect();
        frame.fill_outside(&covered);
    }
    Ok(frame)
}

fn start_capture(size: CaptureSize, from_main_window: bool) {
    let Some((ui, worker)) = with_host(|host| (host.ui.clone(), host.worker.clone())) else {
        return;
    };

    let (config, folder, stay_on_top, main_hwnd) = {
        let mut state = ui.lock();
        if !state.machine.start_selecting() {
            return;
        }
        state.request_repaint();
        let settings = &state.settings;
        let config = OverlayConfig {
            size: size.clamped(),
            snap_mode: settings.snap_mode,
            continuous: settings.continuous_capture,
        };
        (config, settings.output_folder.clone(), settings.stay_on_top, state.main_hwnd)
    };

    let minimized = from_main_window && !stay_on_top && minimize_main_window(main_hwnd);

    let mut failure: Option<String> = None;
    let outcome = OverlayWindow::run(config, |rect| match grab_frame(rect, config.snap_mode) {
        Ok(frame) => {
            log::debug!("Captured {:?}", rect);
            if worker.submit(frame, folder.clone()) {
                true
            } else {
                failure = Some("save worker stopped".to_string());
                false
            }
        }
        Err(e) => {
            log::error!("Failed to capture {:?}: {}", rect, e);
            failure = Some(e.to_string());
            false
        }
    });

    let captured = match &outcome {
        Ok(outcome) => outcome.capture_count(),
        Err(e) => {
            log::error!("Overlay failed: {}", e);
            failure.get_or_insert_with(|| e.to_string());
            0
        }
    };

    {
        let mut state = ui.lock();
        state.machine.finish_selecting(captured);
        if let Some(ref message) = failure {
            state.machine.record_failed(message);
        }
        state.request_repaint();
    }

    if minimized {
        show_main_window_raw(main_hwnd);
    }

    if let Some(message) = failure {
        notice::error(&format!("Failed to capture screenshot: {}", message));
    }
}

fn minimize_main_window(hwnd_raw: isize) -> bool {
    if hwnd_raw == 0 {
        return false;
    }
    let hwnd = isize_to_hwnd(hwnd_raw);
    unsafe {
        if !IsWindowVisible(hwnd).as_bool() || IsIconic(hwnd).as_bool() {
            return false;
        }
        let _ = ShowWindow(hwnd, SW_MINIMIZE);
    }
    true
}

fn show_main_window_raw(hwnd_raw: isize) {
    if hwnd_raw == 0 {
        return;
    }
    let hwnd = isize_to_hwnd(hwnd_raw);
    unsafe {
        if IsIconic(hwnd).as_bool() {
            let _ = ShowWindow(hwnd, SW_RESTORE);
        } else {
            let _ = ShowWindow(hwnd, SW_SHOW);
        }
        let _ = SetForegroundWindow(hwnd);
    }
}

fn show_main_window(ui: &SharedUi) {
    let hwnd_raw = ui.lock().main_hwnd;
    show_main_window_raw(hwnd_raw);
    ui.lock().request_repaint();
}

/// Close the main window for real; it must be visible to process WM_CLOSE
fn request_exit(ui: &SharedUi) {
    let hwnd_raw = {
        let mut state = ui.lock();
        state.exit_requested = true;
        state.main_hwnd
    };
    if hwnd_raw == 0 {
        return;
    }
    show_main_window_raw(hwnd_raw);
    post(hwnd_raw, WM_CLOSE);
}

fn on_tray_event(hwnd: HWND, event: u32) {
    let Some(ui) = with_host(|host| host.ui.clone()) else {
        return;
    };

    match event {
        WM_LBUTTONUP => show_main_window(&ui),
        WM_RBUTTONUP => match show_context_menu(hwnd) {
            Ok(Some(ID_TRAY_OPEN)) => show_main_window(&ui),
            Ok(Some(ID_TRAY_SETTINGS)) => {
                ui.lock().open_settings = true;
                show_main_window(&ui);
            }
            Ok(Some(ID_TRAY_EXIT)) => request_exit(&ui),
            Ok(_) => {}
            Err(e) => log::warn!("Tray menu failed: {}", e),
        },
        NIN_BALLOONUSERCLICK => {
            let folder = ui.lock().settings.output_folder.clone();
            if folder.is_dir() {
                if let Err(e) = notice::open_folder(&folder) {
                    log::warn!("Failed to open {}: {}", folder.display(), e);
                }
            }
        }
        _ => {}
    }
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_APP_COMMAND => {
            drain_commands(hwnd);
            LRESULT(0)
        }

        WM_APP_SAVED => {
            drain_results();
            LRESULT(0)
        }

        WM_HOTKEY => {
            if wparam.0 as i32 == HOTKEY_ID {
                on_hotkey();
            }
            LRESULT(0)
        }

        WM_TRAYICON => {
            on_tray_event(hwnd, (lparam.0 & 0xFFFF) as u32);
            LRESULT(0)
        }

        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ if TASKBAR_CREATED.get() == Some(&msg) => {
            with_host(|host| {
                if let Err(e) = host.tray.restore() {
                    log::warn!("Failed to restore tray icon: {}", e);
                }
            });
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
