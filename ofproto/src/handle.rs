// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The controller's view of a connected switch.

use crate::message::ControllerMessage;
use crate::switch::SwitchId;
use crate::wildcards::Wildcards;

/// Errors handing a message to a switch connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("switch {0} is not connected")]
    Disconnected(SwitchId),
    #[error("send queue of switch {0} is full")]
    QueueFull(SwitchId),
    #[error("write to switch {switch} failed: {reason}")]
    Write { switch: SwitchId, reason: String },
}

/// A connected switch, as far as a controller application is concerned.
///
/// Implementations own the connection and its framing; applications only hand over
/// message bodies and read the capabilities the switch advertised at handshake time.
pub trait SwitchHandle: Send + Sync {
    /// Datapath id.
    fn id(&self) -> SwitchId;

    /// Queue `message` for the switch. Delivery is not confirmed.
    fn send(&self, message: ControllerMessage) -> Result<(), TransportError>;

    /// Whether the switch keeps packet-in frames in its own buffers, so a packet-out can
    /// refer to them instead of carrying the frame.
    fn buffers_packets(&self) -> bool;

    /// Wildcards the switch can apply without leaving its fast path.
    fn fast_wildcards(&self) -> Wildcards;
}
