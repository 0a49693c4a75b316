// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! # Reactive L2 learning switch
//!
//! Switches send up the frames no rule matched. For each one, the source address is learned
//! against the ingress port, and the destination is looked up: unknown destinations are
//! flooded, known ones get the frame sent straight to their port plus a flow rule so the
//! switch handles the rest of the conversation itself. Rules expire after a while of
//! inactivity; when they do, the switch reports it, the source is forgotten and the rule for
//! the opposite direction is deleted.
//!
//! [`LearningSwitch`] ties this together. The pieces are usable on their own:
//! [`engine::PacketInHandler`], [`lifecycle::FlowRemovedHandler`] and the command builders
//! in [`builder`].

pub mod builder;
pub mod config;
pub mod engine;
pub mod events;
pub mod lifecycle;
pub mod switch;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use tracectl::trace_target;

pub use builder::flow_mod::LEARNING_SWITCH_COOKIE;
pub use builder::packet_out::PacketOutError;
pub use config::LearningConfig;
pub use engine::Decision;
pub use events::{EventSink, LearningEvent, TracingSink};
pub use lifecycle::Removal;
pub use switch::{Handled, LearningSwitch};

trace_target!("learning", tracectl::LevelFilter::INFO, &["learning"]);
