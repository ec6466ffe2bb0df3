// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the daemon crate.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Resolve the node persona: WARDEN_PERSONA > hostname.
pub fn persona() -> String {
    if let Ok(p) = std::env::var("WARDEN_PERSONA") {
        if !p.is_empty() {
            return p;
        }
    }
    nix::unistd::gethostname()
        .unwrap_or_else(|_| OsString::from("unknown-node"))
        .to_string_lossy()
        .into_owned()
}

/// Resolve state directory: WARDEN_STATE_DIR > /var/lib/warden.
pub fn state_dir() -> PathBuf {
    std::env::var("WARDEN_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/var/lib/warden"))
}

/// FIFO the agent writes actions into (the application's input).
pub fn app_input_fifo() -> PathBuf {
    std::env::var("WARDEN_APP_INPUT_FIFO")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/warden-app-input"))
}

/// FIFO the application writes status and relay messages into.
pub fn app_output_fifo() -> PathBuf {
    std::env::var("WARDEN_APP_OUTPUT_FIFO")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/warden-app-output"))
}

/// Base URL of the deployment controller, if configured.
pub fn controller_url() -> Option<String> {
    std::env::var("WARDEN_CONTROLLER_URL").ok().filter(|s| !s.is_empty())
}

/// Base URL of the deployment file server, if configured.
/// Falls back to the controller URL when unset.
pub fn file_server_url() -> Option<String> {
    std::env::var("WARDEN_FILE_SERVER_URL")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(controller_url)
}

/// Command line used to launch the supervised application.
pub fn app_command() -> Vec<String> {
    std::env::var("WARDEN_APP_CMD")
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_else(|_| vec!["/usr/local/lib/warden/app/bin/racer".to_string()])
}

/// Backoff applied by the bridge reader after a read or parse error.
pub fn reader_backoff() -> Duration {
    std::env::var("WARDEN_READER_BACKOFF_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(1))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
