// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Emission of packet-in frames.

use bytes::Bytes;
use ofproto::{Action, BufferId, PacketIn, PacketOut, PortNo};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PacketOutError {
    #[error("Refusing to send a frame back out of its ingress port {0}")]
    Loop(PortNo),
}

/// What the packet-out refers to: the switch's buffered copy when there is one it can use,
/// the frame itself otherwise.
fn payload(packet_in: &PacketIn, switch_buffers: bool) -> (Option<BufferId>, Bytes) {
    match packet_in.buffer_id {
        Some(id) if switch_buffers => (Some(id), Bytes::new()),
        _ => (None, packet_in.data.clone()),
    }
}

/// Send a packet-in frame out of every port but the one it came in on.
#[must_use]
pub fn flood(packet_in: &PacketIn, switch_buffers: bool) -> PacketOut {
    let (buffer_id, data) = payload(packet_in, switch_buffers);
    PacketOut {
        buffer_id,
        in_port: packet_in.in_port,
        actions: vec![Action::output(PortNo::FLOOD)],
        data,
    }
}

/// Send a packet-in frame out of `out_port`.
pub fn direct(
    packet_in: &PacketIn,
    out_port: PortNo,
    switch_buffers: bool,
) -> Result<PacketOut, PacketOutError> {
    if out_port == packet_in.in_port {
        return Err(PacketOutError::Loop(out_port));
    }
    let (buffer_id, data) = payload(packet_in, switch_buffers);
    Ok(PacketOut {
        buffer_id,
        in_port: packet_in.in_port,
        actions: vec![Action::output(out_port)],
        data,
    })
}
