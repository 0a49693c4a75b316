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

//! # OpenFlow 1.0 vocabulary
//!
//! The subset of the OpenFlow 1.0 protocol a reactive learning switch speaks: the
//! [`Match`] structure and its [`Wildcards`], output [`Action`]s, rule modification
//! ([`FlowMod`]), direct emission ([`PacketOut`]) and the two asynchronous messages a switch
//! sends up ([`PacketIn`] and [`FlowRemoved`]).
//!
//! Message bodies can be encoded to, and the asynchronous ones decoded from, their wire
//! representation. The common `ofp_header` (version, type, length, xid) is left to the
//! transport, which is also what a [`SwitchHandle`] abstracts.

pub mod action;
pub mod flow_match;
pub mod flow_mod;
pub mod handle;
pub mod message;
pub mod packet_out;
pub mod port;
pub mod switch;
pub mod wildcards;
mod wire;

pub use action::Action;
pub use flow_match::Match;
pub use flow_mod::{BufferId, Cookie, FlowMod, FlowModCommand, FlowModFlags};
pub use handle::{SwitchHandle, TransportError};
pub use message::{
    ControllerMessage, FlowRemoved, FlowRemovedReason, MessageType, PacketIn, PacketInReason,
    SwitchError, SwitchMessage,
};
pub use packet_out::PacketOut;
pub use port::PortNo;
pub use switch::SwitchId;
pub use wildcards::Wildcards;
pub use wire::WireError;
