//! Timestamped file names

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Builds `<prefix>_<yyyyMMdd_HHmmss_fff>.png` names
#[derive(Debug, Clone)]
pub struct ImageNamer {
    prefix: String,
}

impl ImageNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// File name for a capture taken at `time`
    pub fn file_name(&self, time: DateTime<Local>) -> String {
        format!("{}_{}.png", self.prefix, time.format("%Y%m%d_%H%M%S_%3f"))
    }

    /// Path inside `folder` that does not exist yet
    pub fn unique_path(&self, folder: &Path, time: DateTime<Local>) -> PathBuf {
        let name = self.file_name(time);
        let candidate = folder.join(&name);
        if !candidate.exists() {
            return candidate;
        }

        let stem = name.trim_end_matches(".png");
        (1u32..)
            .map(|n| folder.join(format!("{}_{}.png", stem, n)))
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl Default for ImageNamer {
    fn default() -> Self {
        Self::new("snapframe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap() + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn file_name_has_millisecond_timestamp() {
        let namer = ImageNamer::default();
        assert_eq!(namer.file_name(sample_time()), "snapframe_20240309_070502_042.png");
    }

    #[test]
    fn unique_path_adds_suffix_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let namer = ImageNamer::new("shot");
        let time = sample_time();

        let first = namer.unique_path(dir.path(), time);
        assert_eq!(first.file_name().unwrap(), "shot_20240309_070502_042.png");
        std::fs::write(&first, b"x").unwrap();

        let second = namer.unique_path(dir.path(), time);
        assert_eq!(second.file_name().unwrap(), "shot_20240309_070502_042_1.png");
        std::fs::write(&second, b"x").unwrap();

        let third = namer.unique_path(dir.path(), time);
        assert_eq!(third.file_name().unwrap(), "shot_20240309_070502_042_2.png");
    }
}
