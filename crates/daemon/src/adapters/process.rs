// SPDX-License-Identifier: MIT

//! Process supervision seam for the supervised application.

use std::io;
use std::process::{Child, Command, Stdio};
use tracing::info;

/// Handle to a launched application process. Both methods run on the
/// synchronous dispatch path only, so no locking is required beyond the
/// daemon context's own mutex.
pub trait AppProcess: Send {
    fn is_alive(&mut self) -> bool;
    fn kill(&mut self) -> io::Result<()>;
    fn id(&self) -> u32;
}

/// Spawns the supervised application.
pub trait AppLauncher: Send + Sync {
    fn spawn(&self) -> io::Result<Box<dyn AppProcess>>;
}

struct ChildProcess(Child);

impl AppProcess for ChildProcess {
    fn is_alive(&mut self) -> bool {
        // try_wait errors are treated as "not alive": the handle is dead
        // either way.
        matches!(self.0.try_wait(), Ok(None))
    }

    fn kill(&mut self) -> io::Result<()> {
        self.0.kill()?;
        // Reap so the pid does not linger as a zombie.
        let _ = self.0.wait();
        Ok(())
    }

    fn id(&self) -> u32 {
        self.0.id()
    }
}

/// Launches the application from a configured command line.
pub struct ProcessLauncher {
    command: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl AppLauncher for ProcessLauncher {
    fn spawn(&self) -> io::Result<Box<dyn AppProcess>> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(io::Error::other("empty application command"));
        };
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;
        info!(pid = child.id(), program, "launched supervised application");
        Ok(Box::new(ChildProcess(child)))
    }
}
