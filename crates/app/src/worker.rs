//! Background PNG writer

use capture::FrameData;
use crossbeam_channel::{unbounded, Receiver, Sender};
use export::{ImageNamer, PngExporter};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Save worker commands
pub enum SaveCommand {
    Save { frame: FrameData, folder: PathBuf },
    Shutdown,
}

/// Save worker result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveResult {
    Saved(PathBuf),
    Failed(String),
}

/// Encodes and writes captured frames off the message thread
pub struct SaveWorker {
    cmd_tx: Sender<SaveCommand>,
    handle: Option<JoinHandle<()>>,
}

impl SaveWorker {
    /// Start the worker; `notify` runs after each result is sent
    pub fn spawn<F>(result_tx: Sender<SaveResult>, notify: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = unbounded();
        let handle = thread::Builder::new()
            .name("save-worker".into())
            .spawn(move || save_worker(cmd_rx, result_tx, notify))?;

        Ok(Self {
            cmd_tx,
            handle: Some(handle),
        })
    }

    /// Queue a frame; returns false if the worker has stopped
    pub fn submit(&self, frame: FrameData, folder: PathBuf) -> bool {
        self.cmd_tx.send(SaveCommand::Save { frame, folder }).is_ok()
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(SaveCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn save_worker<F: Fn()>(cmd_rx: Receiver<SaveCommand>, result_tx: Sender<SaveResult>, notify: F) {
    let namer = ImageNamer::default();

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            SaveCommand::Save { frame, folder } => {
                let result = match save_frame(&frame, &folder, &namer) {
                    Ok(path) => SaveResult::Saved(path),
                    Err(e) => {
                        log::error!("Failed to save capture to {}: {}", folder.display(), e);
                        SaveResult::Failed(e)
                    }
                };
                if result_tx.send(result).is_err() {
                    break;
                }
                notify();
            }
            SaveCommand::Shutdown => break,
        }
    }
}

fn save_frame(frame: &FrameData, folder: &Path, namer: &ImageNamer) -> Result<PathBuf, String> {
    let image = frame.to_rgba_image().map_err(|e| e.to_string())?;
    PngExporter::save(&image, folder, namer).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::Point;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn saves_frame_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let (result_tx, result_rx) = unbounded();
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();

        let worker = SaveWorker::spawn(result_tx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        // 2x1 BGRA: blue, red
        let frame = FrameData::new(vec![255, 0, 0, 0, 0, 0, 255, 0], 2, 1, Point::new(0, 0));
        assert!(worker.submit(frame, dir.path().to_path_buf()));

        let result = result_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        let path = match result {
            SaveResult::Saved(path) => path,
            SaveResult::Failed(e) => panic!("save failed: {}", e),
        };
        drop(worker);

        assert_eq!(notified.load(Ordering::SeqCst), 1);
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn bad_frame_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (result_tx, result_rx) = unbounded();
        let worker = SaveWorker::spawn(result_tx, || {}).unwrap();

        let frame = FrameData::new(vec![0; 3], 2, 2, Point::new(0, 0));
        worker.submit(frame, dir.path().to_path_buf());

        let result = result_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(result, SaveResult::Failed(_)));
    }
}
