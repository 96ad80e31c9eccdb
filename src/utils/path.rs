//! Path utilities for video inputs and draft names

use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;
use walkdir::WalkDir;

/// Video container extensions accepted as input
pub const SUPPORTED_EXTENSIONS: [&str; 8] = ["mp4", "mov", "avi", "mkv", "m4v", "wmv", "flv", "webm"];

/// Get the lowercase file extension of a path
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

pub fn is_supported_video(path: &Path) -> bool {
    extension(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// File stem, or "video" when the path has none
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string())
}

/// `<stem>_<suffix>`, e.g. `clip_edited`
pub fn default_output_name(input: &Path, suffix: &str) -> String {
    format!("{}_{}", stem(input), suffix)
}

/// `<stem>_<YYYYmmdd_HHMMSS>` using the local clock
pub fn generate_unique_name(input: &Path) -> String {
    default_output_name(input, &Local::now().format("%Y%m%d_%H%M%S").to_string())
}

/// Supported videos in `dir`, sorted by path
pub fn scan_videos(dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        ));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut videos = Vec::new();
    for entry in WalkDir::new(dir).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && is_supported_video(entry.path()) {
            videos.push(entry.into_path());
        }
    }

    videos.sort();
    Ok(videos)
}

/// Create a directory and its parents if missing
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
