// SPDX-License-Identifier: MIT

//! Local filesystem probes feeding the status snapshot. Fresh facts every
//! tick; nothing is cached.

use chrono::{Local, TimeZone};

use crate::state::DaemonContext;
use warden_core::{Clock, StatusSnapshot};

/// Gather a snapshot of node health facts. The DNS hint is resolved by the
/// caller so this stays synchronous.
pub fn gather(ctx: &DaemonContext, clock: &dyn Clock, dns_successful: bool) -> StatusSnapshot {
    let paths = &ctx.paths;
    StatusSnapshot {
        timestamp: timestamp(clock),
        persona: ctx.persona.clone(),
        installed: paths.app_binary.exists(),
        configs_present: paths.configs_tar.is_file(),
        configs_extracted: paths.data_configs_dir.exists(),
        user_responses_exists: paths.user_responses_file.is_file(),
        jaeger_config_exists: paths.jaeger_config_file.is_file(),
        deployment: ctx.store.deployment_name(),
        dns_successful,
        node_platform: "linux".to_string(),
        node_architecture: std::env::consts::ARCH.to_string(),
    }
}

fn timestamp(clock: &dyn Clock) -> String {
    let ms = clock.epoch_ms();
    match Local.timestamp_millis_opt(ms as i64).single() {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        None => ms.to_string(),
    }
}

#[cfg(test)]
#[path = "probes_tests.rs"]
mod tests;
