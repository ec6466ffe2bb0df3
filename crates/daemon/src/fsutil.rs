// SPDX-License-Identifier: MIT

//! Best-effort filesystem helpers. Every failure is a warning; callers
//! never abort remaining work because one deletion failed.

use std::path::Path;
use tracing::warn;

/// Remove a file or directory tree if it exists. Returns false when
/// something could not be removed.
pub fn remove_path(path: &Path) -> bool {
    if !path.exists() {
        return true;
    }
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unable to delete");
            false
        }
    }
}

/// Remove every entry inside a directory, keeping the directory itself.
/// Returns the number of entries that could not be removed.
pub fn remove_dir_contents(dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "unable to list directory");
            return 1;
        }
    };
    let mut failures = 0;
    for entry in entries {
        match entry {
            Ok(entry) => {
                if !remove_path(&entry.path()) {
                    failures += 1;
                }
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "unable to read directory entry");
                failures += 1;
            }
        }
    }
    failures
}

#[cfg(test)]
#[path = "fsutil_tests.rs"]
mod tests;
