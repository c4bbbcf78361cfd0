//! Raw screen copy using GDI

use crate::{CaptureError, CaptureResult, FrameData, Point, Rect};
use std::thread;
use std::time::Duration;
use windows::Win32::Graphics::Dwm::DwmFlush;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject,
    GetDC, GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER,
    BI_RGB, DIB_RGB_COLORS, SRCCOPY,
};
use windows::Win32::UI::WindowsAndMessaging::ShowCursor;

/// Delay after the DWM flush so the hidden overlay leaves the composed desktop
const SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Hides the cursor until dropped
struct CursorHidden;

impl CursorHidden {
    fn new() -> Self {
        unsafe {
            ShowCursor(false);
        }
        CursorHidden
    }
}

impl Drop for CursorHidden {
    fn drop(&mut self) {
        unsafe {
            ShowCursor(true);
        }
    }
}

/// Copy the pixels of `rect` straight from the screen
pub fn grab_region(rect: Rect) -> CaptureResult<FrameData> {
    if rect.is_empty() {
        return Err(CaptureError::EmptyRegion);
    }

    let _cursor = CursorHidden::new();

    unsafe {
        let _ = DwmFlush();
    }
    thread::sleep(SETTLE_DELAY);

    let width = rect.width as i32;
    let height = rect.height as i32;

    unsafe {
        let screen_dc = GetDC(None);
        if screen_dc.is_invalid() {
            return Err(CaptureError::Gdi("Failed to get screen DC".into()));
        }

        let mem_dc = CreateCompatibleDC(screen_dc);
        let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
        if mem_dc.is_invalid() || bitmap.is_invalid() {
            if !bitmap.is_invalid() {
                let _ = DeleteObject(bitmap);
            }
            if !mem_dc.is_invalid() {
                let _ = DeleteDC(mem_dc);
            }
            ReleaseDC(None, screen_dc);
            return Err(CaptureError::Gdi(format!(
                "Failed to allocate {}x{} bitmap",
                width, height
            )));
        }
        let old_bitmap = SelectObject(mem_dc, bitmap);

        // Direct pixel copy, no scaling or filtering
        let blit = BitBlt(
            mem_dc,
            0,
            0,
            width,
            height,
            screen_dc,
            rect.x,
            rect.y,
            SRCCOPY,
        );

        let mut bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // Top-down DIB
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                biSizeImage: 0,
                biXPelsPerMeter: 0,
                biYPelsPerMeter: 0,
                biClrUsed: 0,
                biClrImportant: 0,
            },
            bmiColors: [Default::default()],
        };

        let mut data = vec![0u8; rect.width as usize * rect.height as usize * 4];

        // The bitmap must not be selected into a DC while GetDIBits reads it
        SelectObject(mem_dc, old_bitmap);
        let lines = if blit.is_ok() {
            GetDIBits(
                mem_dc,
                bitmap,
                0,
                rect.height,
                Some(data.as_mut_ptr() as *mut _),
                &mut bmi,
                DIB_RGB_COLORS,
            )
        } else {
            0
        };

        // Cleanup
        let _ = DeleteObject(bitmap);
        let _ = DeleteDC(mem_dc);
        ReleaseDC(None, screen_dc);

        blit?;
        if lines != height {
            return Err(CaptureError::Gdi(format!(
                "GetDIBits copied {} of {} lines",
                lines, height
            )));
        }

        log::debug!("Grabbed {}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y);

        Ok(FrameData::new(data, rect.width, rect.height, Point::new(rect.x, rect.y)))
    }
}
