//! Files the tool leaves behind: error dumps and kept exchanges under the log
//! directory, plus the scratch file holding the most recent exchange.

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::AppError;

const SCRATCH_FILE: &str = "gemini_last";

pub fn exchange_text(prompt: &str, answer: &str) -> String {
    format!("Prompt: {}\n\n{}", prompt, answer)
}

pub fn error_dump_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("ERROR_{}", Uuid::new_v4()))
}

pub fn keep_log_path(log_dir: &Path, now: DateTime<Local>) -> PathBuf {
    log_dir.join(format!(
        "LOG_{}_{}",
        now.format("%Y.%m.%d_%H.%M.%S"),
        Uuid::new_v4()
    ))
}

pub fn scratch_path(scratch_dir: &Path) -> PathBuf {
    scratch_dir.join(SCRATCH_FILE)
}

/// Writes `content` to `path`, creating the parent directory if needed.
pub fn write_log_file(path: &Path, content: &str) -> Result<(), AppError> {
    let to_error = |source| AppError::FilesystemWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, content).map_err(to_error)?;
    tracing::debug!(path = %path.display(), "wrote log file");
    Ok(())
}

/// Overwrites the scratch file. The directory is never created.
pub fn write_scratch(scratch_dir: &Path, content: &str) -> io::Result<PathBuf> {
    let path = scratch_path(scratch_dir);
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), "wrote scratch file");
    Ok(path)
}
