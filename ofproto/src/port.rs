// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Switch port numbers.

use std::fmt::Display;

/// An OpenFlow 1.0 port number.
///
/// Physical ports are numbered `1..=PortNo::MAX`; the values above are pseudo-ports with a
/// protocol-defined meaning.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PortNo(pub u16);

impl PortNo {
    /// Highest physical port number.
    pub const MAX: PortNo = PortNo(0xff00);
    /// Send the packet back out of its input port.
    pub const IN_PORT: PortNo = PortNo(0xfff8);
    /// Run the packet through the flow table (packet-out only).
    pub const TABLE: PortNo = PortNo(0xfff9);
    /// Hand the packet to the switch's non-OpenFlow pipeline.
    pub const NORMAL: PortNo = PortNo(0xfffa);
    /// All physical ports except the input port and those with flooding disabled.
    pub const FLOOD: PortNo = PortNo(0xfffb);
    /// All physical ports except the input port.
    pub const ALL: PortNo = PortNo(0xfffc);
    /// Send to the controller.
    pub const CONTROLLER: PortNo = PortNo(0xfffd);
    /// The switch's local networking stack.
    pub const LOCAL: PortNo = PortNo(0xfffe);
    /// Not associated with any port.
    pub const NONE: PortNo = PortNo(0xffff);

    /// True for numbers naming an actual port on the switch.
    #[must_use]
    pub fn is_physical(self) -> bool {
        self.0 != 0 && self <= Self::MAX
    }
}

impl From<u16> for PortNo {
    fn from(value: u16) -> Self {
        PortNo(value)
    }
}

impl From<PortNo> for u16 {
    fn from(value: PortNo) -> Self {
        value.0
    }
}

impl Display for PortNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            PortNo::IN_PORT => write!(f, "in_port"),
            PortNo::TABLE => write!(f, "table"),
            PortNo::NORMAL => write!(f, "normal"),
            PortNo::FLOOD => write!(f, "flood"),
            PortNo::ALL => write!(f, "all"),
            PortNo::CONTROLLER => write!(f, "controller"),
            PortNo::LOCAL => write!(f, "local"),
            PortNo::NONE => write!(f, "none"),
            PortNo(n) => write!(f, "{n}"),
        }
    }
}
