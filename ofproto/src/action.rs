// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Actions.
//!
//! The learning switch only ever forwards, so output is the only action type modelled.

use bytes::{Buf, BufMut};

use crate::port::PortNo;
use crate::wire::{WireError, ensure};

const OFPAT_OUTPUT: u16 = 0;

/// An OpenFlow 1.0 action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Send the packet out of `port`. `max_len` only matters when `port` is the controller.
    Output { port: PortNo, max_len: u16 },
}

impl Action {
    /// Encoded size of an output action.
    pub const OUTPUT_LEN: u16 = 8;

    /// Output to `port`.
    #[must_use]
    pub fn output(port: PortNo) -> Self {
        Action::Output { port, max_len: 0 }
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u16 {
        match self {
            Action::Output { .. } => Self::OUTPUT_LEN,
        }
    }

    /// Append the wire form to `buf`.
    pub fn encode(&self, buf: &mut impl BufMut) {
        match self {
            Action::Output { port, max_len } => {
                buf.put_u16(OFPAT_OUTPUT);
                buf.put_u16(Self::OUTPUT_LEN);
                buf.put_u16(port.0);
                buf.put_u16(*max_len);
            }
        }
    }

    /// Read one action from the front of `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        ensure(buf.remaining(), "action header", 4)?;
        let kind = buf.get_u16();
        let len = buf.get_u16();
        if kind != OFPAT_OUTPUT {
            return Err(WireError::UnsupportedAction(kind));
        }
        if len != Self::OUTPUT_LEN {
            return Err(WireError::BadActionLength(len));
        }
        ensure(buf.remaining(), "output action", 4)?;
        let port = PortNo(buf.get_u16());
        let max_len = buf.get_u16();
        Ok(Action::Output { port, max_len })
    }

    /// Decode a whole action list occupying `buf`.
    pub fn decode_list(mut buf: &[u8]) -> Result<Vec<Action>, WireError> {
        let mut actions = Vec::new();
        while buf.has_remaining() {
            actions.push(Action::decode(&mut buf)?);
        }
        Ok(actions)
    }
}

/// Total encoded size of an action list.
pub(crate) fn list_len(actions: &[Action]) -> u16 {
    actions.iter().map(Action::encoded_len).sum()
}
