//! On-demand screenshot capture from a live session.
//!
//! Capture is strictly best-effort: any failure (session disposed, encoding
//! error, disk error) is logged once and reported to the caller as `None`.

use crate::session::Session;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Fixed directory name screenshots live under, relative to the workdir.
pub const RELATIVE_DIR: &str = "screenshots";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%.3f";

pub struct ScreenshotCapture {
    workdir: PathBuf,
}

impl ScreenshotCapture {
    pub fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
        }
    }

    /// Snapshot the session's current display to a timestamped file.
    ///
    /// Returns the path relative to the workdir
    /// (`screenshots/<label>_<timestamp>.png`), or `None` on any failure.
    /// Never raises to the caller.
    pub fn capture(&self, session: &Arc<Mutex<Session>>, label: &str) -> Option<String> {
        let bytes = {
            // A worker panic while holding the session lock poisons it;
            // recover the guard so a dead test cannot take capture down.
            let mut session = session.lock().unwrap_or_else(|p| p.into_inner());
            match session.screenshot() {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("screenshot '{}' failed: {}", label, e);
                    return None;
                }
            }
        };

        let file_name = format!(
            "{}_{}.png",
            sanitize(label),
            Local::now().format(TIMESTAMP_FORMAT)
        );
        let dir = self.workdir.join(RELATIVE_DIR);
        if let Err(e) = std::fs::create_dir_all(&dir) {
            log::warn!(
                "screenshot '{}' failed: cannot create {}: {}",
                label,
                dir.display(),
                e
            );
            return None;
        }
        let path = dir.join(&file_name);
        if let Err(e) = std::fs::write(&path, bytes) {
            log::warn!(
                "screenshot '{}' failed: cannot write {}: {}",
                label,
                path.display(),
                e
            );
            return None;
        }

        Some(format!("{}/{}", RELATIVE_DIR, file_name))
    }
}

/// Collapse a label into something safe for a file name.
pub fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
