use crate::error::{ReleaseError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Expand asset glob patterns into the regular files to upload.
///
/// Matches that are not regular files are skipped. A file matched by more
/// than one pattern is returned once, at its first position.
pub fn resolve_assets(patterns: &[String]) -> Result<Vec<PathBuf>> {
    debug!(?patterns, "release asset: patterns");

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let mut matched = Vec::new();

        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) => matched.push(path),
                Err(e) => warn!("release asset: cannot read match for {}: {}", pattern, e),
            }
        }

        debug!(pattern = %pattern, found = ?matched, "release asset: using pattern");

        for path in matched {
            if !path.is_file() {
                debug!("release asset: found file: {} is not a file, skip", path.display());
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Upload name of an asset file: its base name
pub fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| ReleaseError::asset(format!("cannot derive asset name from {}", path.display())))
}
