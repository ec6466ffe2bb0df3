// SPDX-License-Identifier: MIT

//! warden-daemon: per-node orchestration agent.
//!
//! Receives action envelopes from the deployment controller, routes them to
//! handlers or forwards them to the supervised application over a duplex
//! FIFO bridge, coordinates peer-assisted bootstrap installs, and publishes
//! periodic node status with a TTL.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod actions;
pub mod adapters;
pub mod bootstrap;
pub mod bridge;
pub mod env;
pub mod fsutil;
pub mod lifecycle;
pub mod listener;
pub mod probes;
pub mod publisher;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
