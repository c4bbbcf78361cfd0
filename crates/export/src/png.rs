//! PNG export

use crate::{ExportError, ExportResult, ImageNamer};
use chrono::Local;
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// PNG screenshot exporter
pub struct PngExporter;

impl PngExporter {
    /// Save `image` as a new timestamped PNG inside `output_dir`
    pub fn save(
        image: &RgbaImage,
        output_dir: &Path,
        namer: &ImageNamer,
    ) -> ExportResult<PathBuf> {
        if output_dir.as_os_str().is_empty() {
            return Err(ExportError::InvalidFolder(output_dir.to_path_buf()));
        }
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(ExportError::InvalidFolder(output_dir.to_path_buf()));
        }

        // Create output directory
        fs::create_dir_all(output_dir)?;

        let path = namer.unique_path(output_dir, Local::now());
        image.save_with_format(&path, ImageFormat::Png)?;

        log::info!("Saved {}x{} screenshot to {}", image.width(), image.height(), path.display());
        Ok(path)
    }
}
