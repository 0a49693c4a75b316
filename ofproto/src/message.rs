// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Messages exchanged with a switch.

use bytes::{Buf, Bytes};

use crate::flow_match::Match;
use crate::flow_mod::{BufferId, Cookie, FlowMod};
use crate::packet_out::PacketOut;
use crate::port::PortNo;
use crate::wire::{WireError, ensure};

/// OpenFlow 1.0 message type codes (`ofp_type`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Hello = 0,
    Error = 1,
    EchoRequest = 2,
    EchoReply = 3,
    Vendor = 4,
    FeaturesRequest = 5,
    FeaturesReply = 6,
    GetConfigRequest = 7,
    GetConfigReply = 8,
    SetConfig = 9,
    PacketIn = 10,
    FlowRemoved = 11,
    PortStatus = 12,
    PacketOut = 13,
    FlowMod = 14,
}

/// Why a switch sent a packet up.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketInReason {
    /// No rule matched.
    NoMatch = 0,
    /// A rule explicitly sent it to the controller.
    Action = 1,
}

impl TryFrom<u8> for PacketInReason {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PacketInReason::NoMatch),
            1 => Ok(PacketInReason::Action),
            _ => Err(WireError::UnknownValue {
                what: "packet_in reason",
                value: u16::from(value),
            }),
        }
    }
}

/// A frame the switch could not handle on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    /// Where the switch keeps the full packet, if it buffered it.
    pub buffer_id: Option<BufferId>,
    /// Length of the original frame; `data` may be a truncated prefix of it.
    pub total_len: u16,
    pub in_port: PortNo,
    pub reason: PacketInReason,
    pub data: Bytes,
}

impl PacketIn {
    const FIXED_LEN: usize = 10;

    /// Parse a body.
    pub fn decode(body: &[u8]) -> Result<Self, WireError> {
        let mut buf = body;
        ensure(buf.remaining(), "ofp_packet_in", Self::FIXED_LEN)?;
        let buffer_id = BufferId::from_wire(buf.get_u32());
        let total_len = buf.get_u16();
        let in_port = PortNo(buf.get_u16());
        let reason = PacketInReason::try_from(buf.get_u8())?;
        buf.advance(1);
        Ok(PacketIn {
            buffer_id,
            total_len,
            in_port,
            reason,
            data: Bytes::copy_from_slice(buf),
        })
    }
}

/// Why a rule left the flow table.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowRemovedReason {
    IdleTimeout = 0,
    HardTimeout = 1,
    Delete = 2,
}

impl TryFrom<u8> for FlowRemovedReason {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlowRemovedReason::IdleTimeout),
            1 => Ok(FlowRemovedReason::HardTimeout),
            2 => Ok(FlowRemovedReason::Delete),
            _ => Err(WireError::UnknownValue {
                what: "flow_removed reason",
                value: u16::from(value),
            }),
        }
    }
}

/// Notification that a rule installed with [`FlowModFlags::SEND_FLOW_REM`] is gone.
///
/// [`FlowModFlags::SEND_FLOW_REM`]: crate::FlowModFlags::SEND_FLOW_REM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRemoved {
    /// The match the rule was installed with, so `flow_match.in_port` is the ingress port
    /// the rule served.
    pub flow_match: Match,
    pub cookie: Cookie,
    pub priority: u16,
    pub reason: FlowRemovedReason,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: u16,
    pub packet_count: u64,
    pub byte_count: u64,
}

impl FlowRemoved {
    /// Encoded size of the body.
    pub const LEN: usize = Match::LEN + 40;

    /// Parse a body.
    pub fn decode(body: &[u8]) -> Result<Self, WireError> {
        let mut buf = body;
        ensure(buf.remaining(), "ofp_flow_removed", Self::LEN)?;
        let flow_match = Match::decode(&mut buf)?;
        let cookie = Cookie(buf.get_u64());
        let priority = buf.get_u16();
        let reason = FlowRemovedReason::try_from(buf.get_u8())?;
        buf.advance(1);
        let duration_sec = buf.get_u32();
        let duration_nsec = buf.get_u32();
        let idle_timeout = buf.get_u16();
        buf.advance(2);
        let packet_count = buf.get_u64();
        let byte_count = buf.get_u64();
        Ok(FlowRemoved {
            flow_match,
            cookie,
            priority,
            reason,
            duration_sec,
            duration_nsec,
            idle_timeout,
            packet_count,
            byte_count,
        })
    }
}

/// An error a switch reported (`ofp_error_msg`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchError {
    pub kind: u16,
    pub code: u16,
    /// Start of the offending request.
    pub data: Bytes,
}

impl SwitchError {
    /// Parse a body.
    pub fn decode(body: &[u8]) -> Result<Self, WireError> {
        let mut buf = body;
        ensure(buf.remaining(), "ofp_error_msg", 4)?;
        let kind = buf.get_u16();
        let code = buf.get_u16();
        Ok(SwitchError {
            kind,
            code,
            data: Bytes::copy_from_slice(buf),
        })
    }
}

/// Asynchronous messages a switch sends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchMessage {
    PacketIn(PacketIn),
    FlowRemoved(FlowRemoved),
    Error(SwitchError),
    /// Anything else, by `ofp_type` code. The learning switch does not act on these.
    Other(u8),
}

impl SwitchMessage {
    /// Decode a message body given the type code from its header.
    pub fn decode(msg_type: u8, body: &[u8]) -> Result<Self, WireError> {
        Ok(match msg_type {
            t if t == MessageType::PacketIn as u8 => {
                SwitchMessage::PacketIn(PacketIn::decode(body)?)
            }
            t if t == MessageType::FlowRemoved as u8 => {
                SwitchMessage::FlowRemoved(FlowRemoved::decode(body)?)
            }
            t if t == MessageType::Error as u8 => SwitchMessage::Error(SwitchError::decode(body)?),
            other => SwitchMessage::Other(other),
        })
    }
}

/// Commands the controller sends down.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControllerMessage {
    FlowMod(FlowMod),
    PacketOut(PacketOut),
}

impl ControllerMessage {
    /// Type code for the message header.
    #[must_use]
    pub fn msg_type(&self) -> MessageType {
        match self {
            ControllerMessage::FlowMod(_) => MessageType::FlowMod,
            ControllerMessage::PacketOut(_) => MessageType::PacketOut,
        }
    }

    /// The body's wire form.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        match self {
            ControllerMessage::FlowMod(fm) => fm.encode(),
            ControllerMessage::PacketOut(po) => po.encode(),
        }
    }
}

impl From<FlowMod> for ControllerMessage {
    fn from(fm: FlowMod) -> Self {
        ControllerMessage::FlowMod(fm)
    }
}

impl From<PacketOut> for ControllerMessage {
    fn from(po: PacketOut) -> Self {
        ControllerMessage::PacketOut(po)
    }
}

#[cfg(test)]
mod test {
    use bytes::BufMut;
    use net::Mac;
    use pretty_assertions::assert_eq;

    use super::{FlowRemoved, FlowRemovedReason, PacketIn, PacketInReason, SwitchMessage};
    use crate::flow_match::Match;
    use crate::flow_mod::{BufferId, Cookie};
    use crate::port::PortNo;
    use crate::wire::WireError;

    #[test]
    fn packet_in_body() {
        let body = [
            0x00, 0x00, 0x01, 0x00, // buffer
            0x00, 0x40, // total len
            0x00, 0x02, // in port
            0x00, 0x00, // reason, pad
            0xaa, 0xbb,
        ];
        let msg = SwitchMessage::decode(10, &body).unwrap();
        let SwitchMessage::PacketIn(pi) = msg else {
            panic!("expected packet-in, got {msg:?}");
        };
        assert_eq!(pi.buffer_id, Some(BufferId(0x100)));
        assert_eq!(pi.total_len, 64);
        assert_eq!(pi.in_port, PortNo(2));
        assert_eq!(pi.reason, PacketInReason::NoMatch);
        assert_eq!(&pi.data[..], &[0xaa, 0xbb]);
    }

    #[test]
    fn unbuffered_packet_in() {
        let mut body = vec![0xff, 0xff, 0xff, 0xff, 0, 0, 0, 1, 1, 0];
        body.extend_from_slice(&[0; 14]);
        let pi = PacketIn::decode(&body).unwrap();
        assert_eq!(pi.buffer_id, None);
        assert_eq!(pi.reason, PacketInReason::Action);
        assert_eq!(pi.data.len(), 14);
    }

    #[test]
    fn flow_removed_body() {
        let mut m = Match::any();
        m.in_port = PortNo(2);
        m.dl_src = Mac([0x02, 0, 0, 0, 0, 0xbb]);

        let mut body = Vec::new();
        m.encode(&mut body);
        body.put_u64(1 << 52);
        body.put_u16(100);
        body.put_u8(0); // reason: idle timeout
        body.put_u8(0);
        body.put_u32(12);
        body.put_u32(500);
        body.put_u16(5);
        body.put_u16(0);
        body.put_u64(10);
        body.put_u64(1000);
        assert_eq!(body.len(), FlowRemoved::LEN);

        let SwitchMessage::FlowRemoved(fr) = SwitchMessage::decode(11, &body).unwrap() else {
            panic!("expected flow-removed");
        };
        assert_eq!(fr.flow_match, m);
        assert_eq!(fr.cookie, Cookie(1 << 52));
        assert_eq!(fr.reason, FlowRemovedReason::IdleTimeout);
        assert_eq!(fr.duration_sec, 12);
        assert_eq!(fr.idle_timeout, 5);
        assert_eq!((fr.packet_count, fr.byte_count), (10, 1000));

        assert!(matches!(
            FlowRemoved::decode(&body[..79]),
            Err(WireError::Truncated { .. })
        ));
    }

    #[test]
    fn other_types_pass_through() {
        assert_eq!(SwitchMessage::decode(12, &[]).unwrap(), SwitchMessage::Other(12));
        let SwitchMessage::Error(err) = SwitchMessage::decode(1, &[0, 3, 0, 1, 9]).unwrap() else {
            panic!("expected error");
        };
        assert_eq!((err.kind, err.code, &err.data[..]), (3, 1, &[9u8][..]));
    }
}
