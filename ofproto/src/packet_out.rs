// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Direct packet emission (`ofp_packet_out`).

use bytes::{BufMut, Bytes, BytesMut};

use crate::action::{self, Action};
use crate::flow_mod::BufferId;
use crate::port::PortNo;

/// Instructs a switch to emit a packet.
///
/// The packet is either one the switch buffered (`buffer_id`), in which case `data` is empty,
/// or carried in full in `data`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PacketOut {
    pub buffer_id: Option<BufferId>,
    /// Port the packet originally arrived on; [`PortNo::FLOOD`] and [`PortNo::ALL`] skip it.
    pub in_port: PortNo,
    pub actions: Vec<Action>,
    pub data: Bytes,
}

impl PacketOut {
    /// Encoded size of the body before the action list.
    pub const FIXED_LEN: usize = 8;

    /// Encoded size of the body.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::FIXED_LEN + usize::from(action::list_len(&self.actions)) + self.data.len()
    }

    /// Append the body's wire form to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        buf.put_u32(BufferId::to_wire(self.buffer_id));
        buf.put_u16(self.in_port.0);
        buf.put_u16(action::list_len(&self.actions));
        for action in &self.actions {
            action.encode(buf);
        }
        buf.put_slice(&self.data);
    }

    /// The body's wire form.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}
