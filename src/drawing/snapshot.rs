use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::drawing::Canvas;
use crate::error::Result;

/// File name for a snapshot taken at `at`
pub fn snapshot_file_name(at: DateTime<Local>) -> String {
    format!("drawing_{}.jpg", at.format("%Y%m%d_%H%M%S"))
}

/// Save the canvas as a timestamped JPEG in `dir`, creating the directory if needed
pub fn save_snapshot(dir: &Path, canvas: &Canvas) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(snapshot_file_name(Local::now()));
    std::fs::write(&path, canvas.to_jpeg()?)?;

    tracing::info!("Saved canvas snapshot to {}", path.display());
    Ok(path)
}
