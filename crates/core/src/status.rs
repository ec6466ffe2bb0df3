// SPDX-License-Identifier: MIT

//! Node status snapshot published to the controller each tick.

use serde::{Deserialize, Serialize};

/// Immutable set of node health facts, produced fresh per publish tick and
/// transmitted with a TTL. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub timestamp: String,
    pub persona: String,
    pub installed: bool,
    pub configs_present: bool,
    pub configs_extracted: bool,
    pub user_responses_exists: bool,
    pub jaeger_config_exists: bool,
    pub deployment: String,
    pub dns_successful: bool,
    pub node_platform: String,
    pub node_architecture: String,
}

impl StatusSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
