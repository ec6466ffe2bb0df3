// SPDX-License-Identifier: MIT

//! Named-pipe endpoint for the application bridge.
//!
//! Pipes are opened per operation: opening the read side blocks until the
//! application connects as a writer, and vice versa, which is exactly the
//! rendezvous the bridge wants. One line is read per open, matching the
//! application's write-open-close pattern.

use async_trait::async_trait;
use nix::sys::stat::Mode;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::AppEndpoint;

/// Endpoint backed by two FIFOs: `input` is written by the agent and read
/// by the application, `output` the reverse.
pub struct FifoEndpoint {
    input: PathBuf,
    output: PathBuf,
}

impl FifoEndpoint {
    /// Create both FIFOs if missing and return the endpoint.
    pub fn create(input: PathBuf, output: PathBuf) -> io::Result<Self> {
        mkfifo_if_missing(&input)?;
        mkfifo_if_missing(&output)?;
        Ok(Self { input, output })
    }
}

fn mkfifo_if_missing(path: &Path) -> io::Result<()> {
    match nix::unistd::mkfifo(path, Mode::from_bits_truncate(0o644)) {
        Ok(()) => Ok(()),
        Err(nix::errno::Errno::EEXIST) => Ok(()),
        Err(e) => Err(io::Error::from(e)),
    }
}

#[async_trait]
impl AppEndpoint for FifoEndpoint {
    async fn read_line(&self) -> io::Result<Option<String>> {
        let file = tokio::fs::File::open(&self.output).await?;
        let mut reader = BufReader::new(file);
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches('\n').to_string()))
    }

    async fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new().write(true).open(&self.input).await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}
