// SPDX-License-Identifier: MIT

//! Classification of lines read from the supervised application.
//!
//! The application writes newline-delimited JSON objects to its side of the
//! bridge. Two shapes are meaningful; everything else is invalid and gets
//! dropped by the reader loop.

use serde_json::Value;

use crate::error::ProtocolError;

/// Relay action type signalling that a bootstrap has finished and the
/// remembered target must be cleared.
pub const BS_COMPLETE: &str = "BS_COMPLETE";

/// One message from the application.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    /// Application status to report upstream with a time-to-live.
    Status { status: Value, ttl: i64 },

    /// Bootstrap material to relay to the current bootstrap target.
    BootstrapInfo { message: String, action_type: String },
}

impl AppMessage {
    /// Classify a single line by key presence, mirroring the shapes the
    /// application emits: `{"status": {...}, "ttl": n}` or
    /// `{"message": "...", "actionType": "..."}`.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(line.trim())?;
        let Some(obj) = value.as_object() else {
            return Err(ProtocolError::InvalidMessage(line.trim().to_string()));
        };

        if let (Some(status), Some(ttl)) = (obj.get("status"), obj.get("ttl").and_then(Value::as_i64)) {
            return Ok(AppMessage::Status { status: status.clone(), ttl });
        }

        if let (Some(message), Some(action_type)) = (
            obj.get("message").and_then(Value::as_str),
            obj.get("actionType").and_then(Value::as_str),
        ) {
            return Ok(AppMessage::BootstrapInfo {
                message: message.to_string(),
                action_type: action_type.to_string(),
            });
        }

        Err(ProtocolError::InvalidMessage(line.trim().to_string()))
    }

    /// Whether this is the completion signal for an in-flight bootstrap.
    pub fn is_bootstrap_complete(&self) -> bool {
        matches!(self, AppMessage::BootstrapInfo { action_type, .. } if action_type == BS_COMPLETE)
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
