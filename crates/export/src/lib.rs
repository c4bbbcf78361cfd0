//! Export module for SnapFrame
//!
//! Writes captured images to the output folder.

mod naming;
mod png;

pub use naming::ImageNamer;
pub use png::PngExporter;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid output folder: {0}")]
    InvalidFolder(PathBuf),
}

pub type ExportResult<T> = Result<T, ExportError>;
