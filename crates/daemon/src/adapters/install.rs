// SPDX-License-Identifier: MIT

//! Platform install collaborator: runs the install procedure shipped inside
//! an extracted bootstrap bundle.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tracing::info;

/// Name of the install script expected at the extracted bundle root.
pub const INSTALL_SCRIPT: &str = "install.sh";

/// Outcome of an install attempt. A non-success outcome is fatal to the
/// bootstrap that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Success,
    Failed { code: Option<i32> },
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Success)
    }
}

/// Install procedure collaborator.
#[async_trait]
pub trait Installer: Send + Sync {
    /// Run the install procedure with the extracted bundle contents.
    async fn install(&self, extracted_dir: &Path) -> io::Result<InstallOutcome>;
}

/// Runs `bash install.sh` inside the extracted bundle directory.
pub struct ScriptInstaller;

#[async_trait]
impl Installer for ScriptInstaller {
    async fn install(&self, extracted_dir: &Path) -> io::Result<InstallOutcome> {
        info!(dir = %extracted_dir.display(), "running install script");
        let status = tokio::process::Command::new("bash")
            .arg(INSTALL_SCRIPT)
            .current_dir(extracted_dir)
            .status()
            .await?;
        if status.success() {
            Ok(InstallOutcome::Success)
        } else {
            Ok(InstallOutcome::Failed { code: status.code() })
        }
    }
}
