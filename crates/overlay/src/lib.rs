//! Overlay module for SnapFrame
//!
//! Shows a fixed-size capture rectangle that follows the cursor and reports
//! where the user clicked.

pub mod decor;

#[cfg(windows)]
pub mod frame;
#[cfg(windows)]
pub mod window;

#[cfg(windows)]
pub use window::OverlayWindow;

use capture::{CaptureSize, Rect, SnapMode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("An overlay is already open on this thread")]
    AlreadyActive,
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// Overlay session parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub size: CaptureSize,
    pub snap_mode: SnapMode,
    /// Keep the overlay open after each capture until cancelled
    pub continuous: bool,
}

/// Selection outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Every rectangle the user confirmed, in order
    Captured(Vec<Rect>),
    /// User cancelled before capturing anything
    Cancelled,
}

impl SelectionOutcome {
    pub fn from_captures(captures: Vec<Rect>) -> Self {
        if captures.is_empty() {
            SelectionOutcome::Cancelled
        } else {
            SelectionOutcome::Captured(captures)
        }
    }

    pub fn capture_count(&self) -> usize {
        match self {
            SelectionOutcome::Captured(rects) => rects.len(),
            SelectionOutcome::Cancelled => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_capture_list_is_cancelled() {
        assert_eq!(SelectionOutcome::from_captures(Vec::new()), SelectionOutcome::Cancelled);
        assert_eq!(SelectionOutcome::Cancelled.capture_count(), 0);
    }

    #[test]
    fn captures_are_kept_in_order() {
        let rects = vec![Rect::new(0, 0, 100, 100), Rect::new(50, 50, 100, 100)];
        let outcome = SelectionOutcome::from_captures(rects.clone());
        assert_eq!(outcome, SelectionOutcome::Captured(rects));
        assert_eq!(outcome.capture_count(), 2);
    }
}
