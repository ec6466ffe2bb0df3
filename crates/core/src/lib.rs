// SPDX-License-Identifier: MIT

//! warden-core: wire-level data model for the warden node agent.
//!
//! Everything the daemon exchanges with the controller or the supervised
//! application is defined here: action envelopes, application relay
//! messages, and node status snapshots.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod envelope;
pub mod error;
pub mod relay;
pub mod status;

pub use clock::{Clock, FakeClock, SystemClock};
pub use envelope::ActionEnvelope;
pub use error::ProtocolError;
pub use relay::{AppMessage, BS_COMPLETE};
pub use status::StatusSnapshot;
