// SPDX-License-Identifier: MIT

//! Periodic node status publication.
//!
//! One schedule at most: reconfiguring cancels the previous task before
//! spawning the next, so ticks from different configurations never overlap.
//! A tick with no registered listener is a silent no-op, and tick errors
//! never stop the schedule.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::probes;
use crate::state::DaemonContext;
use warden_core::Clock;

const DEFAULT_PERIOD_SECS: u64 = 3;
const DEFAULT_TTL_FACTOR: u64 = 3;

struct Schedule {
    period_secs: u64,
    ttl_factor: u64,
    cancel: Option<CancellationToken>,
}

pub struct StatusPublisher {
    ctx: Arc<DaemonContext>,
    clock: Arc<dyn Clock>,
    schedule: Mutex<Schedule>,
}

impl StatusPublisher {
    pub fn new(ctx: Arc<DaemonContext>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ctx,
            clock,
            schedule: Mutex::new(Schedule {
                period_secs: DEFAULT_PERIOD_SECS,
                ttl_factor: DEFAULT_TTL_FACTOR,
                cancel: None,
            }),
        }
    }

    /// (Re)start fixed-rate publication. `None` keeps the current value for
    /// either parameter. Any prior schedule is cancelled first.
    pub fn start(self: &Arc<Self>, period_secs: Option<u64>, ttl_factor: Option<u64>) {
        let (period, token) = {
            let mut schedule = self.schedule.lock();
            if let Some(period_secs) = period_secs {
                schedule.period_secs = period_secs.max(1);
            }
            if let Some(ttl_factor) = ttl_factor {
                schedule.ttl_factor = ttl_factor;
            }
            if let Some(token) = schedule.cancel.take() {
                token.cancel();
            }
            let token = CancellationToken::new();
            schedule.cancel = Some(token.clone());
            (Duration::from_secs(schedule.period_secs), token)
        };

        let publisher = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => publisher.publish().await,
                }
            }
        });
    }

    /// Cancel the current schedule, if any.
    pub fn stop(&self) {
        if let Some(token) = self.schedule.lock().cancel.take() {
            token.cancel();
        }
    }

    /// Publish one status report. Skipped silently when no controller is
    /// listening; failures are logged per tick.
    pub async fn publish(&self) {
        if !self.ctx.uplink.is_listener_registered() {
            return;
        }
        let (period_secs, ttl_factor) = {
            let schedule = self.schedule.lock();
            (schedule.period_secs, schedule.ttl_factor)
        };

        let dns_successful = self.ctx.uplink.is_dns_successful().await;
        let snapshot = probes::gather(&self.ctx, self.clock.as_ref(), dns_successful);
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "unable to serialize node status");
                return;
            }
        };
        let ttl = period_secs * ttl_factor;
        if let Err(e) = self.ctx.uplink.update_node_status(json, ttl).await {
            error!(error = %e, "error updating node status");
        }
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
