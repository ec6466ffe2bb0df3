// SPDX-License-Identifier: MIT

//! Action envelope: the `{type, payload}` command unit delivered by the
//! deployment controller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// One command from the controller. `kind` selects a handler; the payload
/// is opaque to the router and interpreted per handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    #[serde(rename = "type")]
    pub kind: String,

    /// Absent payloads deserialize as an empty object.
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl ActionEnvelope {
    pub fn new(kind: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self { kind: kind.into(), payload }
    }

    /// Parse a single newline-framed JSON line.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Serialize to a single JSON line (without trailing newline).
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
