// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(
    unsafe_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::module_name_repetitions)]

//! Layer 2 building blocks for the learning switch.
//!
//! This crate knows about ethernet addresses, VLAN tags and how to pull the fields a
//! switch can match on out of a raw frame. It knows nothing about OpenFlow; that lives in
//! the `ofproto` crate.

pub mod eth;
pub mod frame;
pub mod vlan;

use tracectl::trace_target;

pub use eth::mac::Mac;
pub use frame::{FrameError, FrameFields};
pub use vlan::VlanTag;

trace_target!("net", tracectl::LevelFilter::WARN, &["frame"]);

#[cfg(test)]
mod test {
    use tracectl::targets::TRACE_TARGETS;

    #[test]
    fn log_target_registered() {
        let target = TRACE_TARGETS
            .iter()
            .find(|t| t.name() == "net")
            .unwrap();
        assert_eq!(target.target(), "learnswitch_net");
        assert_eq!(target.tags(), &["frame"]);
    }
}
