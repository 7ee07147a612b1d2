use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{info, warn};

use crate::error::{EtlError, Result};

/// Finds the most recently modified file in `dir` matching a glob pattern
/// such as `*.csv`. Errors when nothing matches.
pub fn latest_file(dir: &Path, pattern: &str) -> Result<PathBuf> {
    let full_pattern = dir.join(pattern).to_string_lossy().into_owned();

    let mut newest: Option<(PathBuf, SystemTime)> = None;
    for entry in glob::glob(&full_pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!(%err, "skipping unreadable path");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let modified = std::fs::metadata(&path)?.modified()?;
        let is_newer = newest
            .as_ref()
            .map(|(_, stamp)| modified > *stamp)
            .unwrap_or(true);
        if is_newer {
            newest = Some((path, modified));
        }
    }

    let (path, _) = newest.ok_or(EtlError::NoFilesMatched(full_pattern))?;
    info!(path = %path.display(), "latest file selected");
    Ok(path)
}
