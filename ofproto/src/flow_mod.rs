// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow table modification (`ofp_flow_mod`).

use std::fmt::Display;

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::action::{self, Action};
use crate::flow_match::Match;
use crate::port::PortNo;
use crate::wire::{WireError, ensure};

/// Opaque tag attached to a rule by the application that installed it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cookie(pub u64);

impl Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Reference to a packet held in a switch's buffer.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

impl BufferId {
    /// Wire value meaning "no buffered packet".
    pub const NO_BUFFER: u32 = 0xffff_ffff;

    /// Interpret a wire value, mapping [`BufferId::NO_BUFFER`] to `None`.
    #[must_use]
    pub fn from_wire(raw: u32) -> Option<Self> {
        (raw != Self::NO_BUFFER).then_some(BufferId(raw))
    }

    pub(crate) fn to_wire(id: Option<BufferId>) -> u32 {
        id.map_or(Self::NO_BUFFER, |b| b.0)
    }
}

/// What a [`FlowMod`] does to the flow table.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowModCommand {
    /// New rule.
    Add = 0,
    /// Change the actions of every matching rule.
    Modify = 1,
    /// Change the actions of the rule with this exact match and priority.
    ModifyStrict = 2,
    /// Remove every rule the match covers.
    Delete = 3,
    /// Remove the rule with this exact match and priority.
    DeleteStrict = 4,
}

impl TryFrom<u16> for FlowModCommand {
    type Error = WireError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => FlowModCommand::Add,
            1 => FlowModCommand::Modify,
            2 => FlowModCommand::ModifyStrict,
            3 => FlowModCommand::Delete,
            4 => FlowModCommand::DeleteStrict,
            _ => {
                return Err(WireError::UnknownValue {
                    what: "flow_mod command",
                    value,
                });
            }
        })
    }
}

bitflags! {
    /// `ofp_flow_mod_flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlowModFlags: u16 {
        /// Have the switch send a flow-removed message when the rule goes away.
        const SEND_FLOW_REM = 1 << 0;
        /// Refuse the add if it overlaps an existing rule of the same priority.
        const CHECK_OVERLAP = 1 << 1;
        /// Emergency flow cache.
        const EMERG = 1 << 2;
    }
}

/// A rule modification command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowMod {
    pub flow_match: Match,
    pub cookie: Cookie,
    pub command: FlowModCommand,
    /// Seconds of inactivity before the rule expires, 0 for never.
    pub idle_timeout: u16,
    /// Seconds before the rule expires regardless of activity, 0 for never.
    pub hard_timeout: u16,
    pub priority: u16,
    /// Buffered packet to run through the rule once installed.
    pub buffer_id: Option<BufferId>,
    /// For deletes, only rules with an output to this port are removed.
    /// [`PortNo::NONE`] disables the filter.
    pub out_port: PortNo,
    pub flags: FlowModFlags,
    pub actions: Vec<Action>,
}

impl FlowMod {
    /// Encoded size of the body before the action list.
    pub const FIXED_LEN: usize = Match::LEN + 24;

    /// Encoded size of the body.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::FIXED_LEN + usize::from(action::list_len(&self.actions))
    }

    /// Append the body's wire form to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        self.flow_match.encode(buf);
        buf.put_u64(self.cookie.0);
        buf.put_u16(self.command as u16);
        buf.put_u16(self.idle_timeout);
        buf.put_u16(self.hard_timeout);
        buf.put_u16(self.priority);
        buf.put_u32(BufferId::to_wire(self.buffer_id));
        buf.put_u16(self.out_port.0);
        buf.put_u16(self.flags.bits());
        for action in &self.actions {
            action.encode(buf);
        }
    }

    /// The body's wire form.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Parse a body.
    pub fn decode(body: &[u8]) -> Result<Self, WireError> {
        let mut buf = body;
        ensure(buf.remaining(), "ofp_flow_mod", Self::FIXED_LEN)?;
        let flow_match = Match::decode(&mut buf)?;
        let cookie = Cookie(buf.get_u64());
        let command = FlowModCommand::try_from(buf.get_u16())?;
        let idle_timeout = buf.get_u16();
        let hard_timeout = buf.get_u16();
        let priority = buf.get_u16();
        let buffer_id = BufferId::from_wire(buf.get_u32());
        let out_port = PortNo(buf.get_u16());
        let flags = FlowModFlags::from_bits_retain(buf.get_u16());
        let actions = Action::decode_list(buf)?;
        Ok(FlowMod {
            flow_match,
            cookie,
            command,
            idle_timeout,
            hard_timeout,
            priority,
            buffer_id,
            out_port,
            flags,
            actions,
        })
    }
}

#[cfg(test)]
mod test {
    use net::Mac;
    use pretty_assertions::assert_eq;

    use super::{BufferId, Cookie, FlowMod, FlowModCommand, FlowModFlags};
    use crate::action::Action;
    use crate::flow_match::Match;
    use crate::port::PortNo;
    use crate::wire::WireError;

    fn add_rule() -> FlowMod {
        let mut m = Match::any();
        m.dl_dst = Mac([0x02, 0, 0, 0, 0, 0xaa]);
        FlowMod {
            flow_match: m,
            cookie: Cookie(0x0010_0000_0000_0000),
            command: FlowModCommand::Add,
            idle_timeout: 5,
            hard_timeout: 0,
            priority: 100,
            buffer_id: None,
            out_port: PortNo::NONE,
            flags: FlowModFlags::SEND_FLOW_REM,
            actions: vec![Action::output(PortNo(1))],
        }
    }

    #[test]
    fn body_layout() {
        let fm = add_rule();
        let bytes = fm.encode();
        assert_eq!(bytes.len(), 72);
        assert_eq!(bytes.len(), fm.encoded_len());
        // cookie, command, idle, hard, priority
        assert_eq!(&bytes[40..48], &[0x00, 0x10, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[48..56], &[0, 0, 0, 5, 0, 0, 0, 100]);
        // no buffer, out_port none, send_flow_rem
        assert_eq!(&bytes[56..64], &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0, 1]);
        assert_eq!(FlowMod::decode(&bytes).unwrap(), fm);
    }

    #[test]
    fn unknown_command() {
        let mut bytes = add_rule().encode().to_vec();
        bytes[49] = 9;
        assert_eq!(
            FlowMod::decode(&bytes),
            Err(WireError::UnknownValue {
                what: "flow_mod command",
                value: 9
            })
        );
    }

    #[test]
    fn buffer_id_sentinel() {
        assert_eq!(BufferId::from_wire(BufferId::NO_BUFFER), None);
        assert_eq!(BufferId::from_wire(7), Some(BufferId(7)));
        assert_eq!(Cookie(1 << 52).to_string(), "0x0010000000000000");
    }
}
