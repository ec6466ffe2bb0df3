// SPDX-License-Identifier: MIT

//! Adapter traits for the daemon's external collaborators.
//!
//! The agent consumes the controller SDK, file retrieval, archive
//! extraction, package installation, persisted daemon state, and process
//! supervision through these narrow seams. Production implementations live
//! in the submodules; call-recording fakes for tests live in `fake`.

pub mod fetch;
pub mod install;
pub mod process;
pub mod store;
pub mod uplink;

pub use fetch::{Fetcher, HttpFetcher};
pub use install::{InstallOutcome, Installer, ScriptInstaller};
pub use process::{AppLauncher, AppProcess, ProcessLauncher};
pub use store::{JsonStateStore, StateStore};
pub use uplink::{HttpUplink, Uplink, UplinkError};

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Archive extraction collaborator. The agent never inspects archive
/// contents itself.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    async fn extract(&self, archive: &Path, dest: &Path) -> io::Result<()>;
}

/// Extracts tarballs by shelling out to `tar`.
pub struct TarExtractor;

#[async_trait]
impl ArchiveExtractor for TarExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(dest).await?;
        let status = tokio::process::Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("-C")
            .arg(dest)
            .status()
            .await?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("tar exited with {status}")))
        }
    }
}

// Test support - call-recording fakes
#[cfg(test)]
pub(crate) mod fake;
