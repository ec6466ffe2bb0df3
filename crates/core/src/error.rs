// SPDX-License-Identifier: MIT

//! Protocol-level errors shared by envelope and relay parsing.

use thiserror::Error;

/// Errors from parsing wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A well-formed JSON object that matches none of the known shapes.
    #[error("unrecognized message: {0}")]
    InvalidMessage(String),
}
