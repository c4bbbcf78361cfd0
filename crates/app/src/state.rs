//! State machine for SnapFrame

use std::path::{Path, PathBuf};

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Ready to capture
    Idle,
    /// Overlay is open
    Selecting,
}

impl CaptureState {
    pub fn display_text(&self) -> &'static str {
        match self {
            CaptureState::Idle => "Ready",
            CaptureState::Selecting => "Move the frame and click to capture (Esc or right-click cancels)",
        }
    }

    pub fn can_capture(&self) -> bool {
        matches!(self, CaptureState::Idle)
    }
}

/// State machine transitions plus the results shown in the status line
pub struct StateMachine {
    state: CaptureState,
    saved_count: usize,
    last_saved: Option<PathBuf>,
    status_text: String,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            saved_count: 0,
            last_saved: None,
            status_text: CaptureState::Idle.display_text().to_string(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Transition to selecting state
    pub fn start_selecting(&mut self) -> bool {
        if self.state.can_capture() {
            self.state = CaptureState::Selecting;
            self.status_text = CaptureState::Selecting.display_text().to_string();
            true
        } else {
            false
        }
    }

    /// Overlay closed, return to idle
    pub fn finish_selecting(&mut self, captured: usize) {
        if self.state != CaptureState::Selecting {
            return;
        }
        self.state = CaptureState::Idle;
        if captured == 0 {
            self.status_text = "Capture cancelled".to_string();
        } else if self.status_text == CaptureState::Selecting.display_text() {
            // Save results arrive later and replace this
            self.status_text = "Saving...".to_string();
        }
    }

    /// A screenshot was written to disk
    pub fn record_saved(&mut self, path: &Path) {
        self.saved_count += 1;
        self.status_text = format!("Saved: {}", display_name(path));
        self.last_saved = Some(path.to_path_buf());
    }

    pub fn record_failed(&mut self, message: &str) {
        self.status_text = format!("Capture failed: {}", message);
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_text = text.into();
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn saved_count(&self) -> usize {
        self.saved_count
    }

    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_is_exclusive() {
        let mut sm = StateMachine::new();
        assert!(sm.start_selecting());
        assert_eq!(sm.state(), CaptureState::Selecting);
        assert!(!sm.start_selecting());

        sm.finish_selecting(1);
        assert_eq!(sm.state(), CaptureState::Idle);
        assert!(sm.start_selecting());
    }

    #[test]
    fn cancel_updates_status() {
        let mut sm = StateMachine::new();
        sm.start_selecting();
        sm.finish_selecting(0);
        assert_eq!(sm.status_text(), "Capture cancelled");
    }

    #[test]
    fn capture_shows_saving_until_result() {
        let mut sm = StateMachine::new();
        sm.start_selecting();
        sm.finish_selecting(2);
        assert_eq!(sm.status_text(), "Saving...");

        sm.start_selecting();
        sm.record_saved(Path::new("a.png"));
        sm.finish_selecting(1);
        assert_eq!(sm.status_text(), "Saved: a.png");
    }

    #[test]
    fn finish_without_start_is_ignored() {
        let mut sm = StateMachine::new();
        sm.finish_selecting(0);
        assert_eq!(sm.status_text(), "Ready");
    }

    #[test]
    fn saves_are_counted() {
        let mut sm = StateMachine::new();
        sm.record_saved(Path::new("shots/snapframe_20240101_120000_000.png"));
        sm.record_saved(Path::new("shots/snapframe_20240101_120001_000.png"));
        assert_eq!(sm.saved_count(), 2);
        assert_eq!(sm.status_text(), "Saved: snapframe_20240101_120001_000.png");
        assert_eq!(
            sm.last_saved(),
            Some(Path::new("shots/snapframe_20240101_120001_000.png"))
        );

        sm.record_failed("disk full");
        assert_eq!(sm.status_text(), "Capture failed: disk full");
        assert_eq!(sm.saved_count(), 2);
    }
}
