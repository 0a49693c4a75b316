// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Match wildcards (`ofp_flow_wildcards`).

use bitflags::bitflags;

bitflags! {
    /// Fields of a [`Match`](crate::Match) the switch should ignore.
    ///
    /// The IPv4 source and destination are not single bits: each is a six-bit count of
    /// low-order address bits to ignore, where 32 or more means the whole address.
    /// Switches also advertise the set of wildcards they can handle in hardware (their
    /// "fast wildcards"); a rule which leaves those fields wildcarded and matches the rest
    /// exactly stays on the fast path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Wildcards: u32 {
        const IN_PORT = 1 << 0;
        const DL_VLAN = 1 << 1;
        const DL_SRC = 1 << 2;
        const DL_DST = 1 << 3;
        const DL_TYPE = 1 << 4;
        const NW_PROTO = 1 << 5;
        const TP_SRC = 1 << 6;
        const TP_DST = 1 << 7;
        const NW_SRC_MASK = 0x3f << 8;
        const NW_SRC_ALL = 32 << 8;
        const NW_DST_MASK = 0x3f << 14;
        const NW_DST_ALL = 32 << 14;
        const DL_VLAN_PCP = 1 << 20;
        const NW_TOS = 1 << 21;
    }
}

impl Wildcards {
    const NW_SRC_SHIFT: u32 = 8;
    const NW_DST_SHIFT: u32 = 14;

    /// Every field wildcarded, the way OpenFlow 1.0 spells "match anything".
    pub const ANY: Wildcards = Wildcards::from_bits_retain((1 << 22) - 1);

    /// Fields the learning switch always matches exactly when it installs a rule.
    pub const LEARNED_EXACT: Wildcards = Wildcards::IN_PORT
        .union(Wildcards::DL_VLAN)
        .union(Wildcards::DL_SRC)
        .union(Wildcards::DL_DST)
        .union(Wildcards::NW_SRC_MASK)
        .union(Wildcards::NW_DST_MASK);

    /// Number of low-order IPv4 source bits ignored, saturated at 32.
    #[must_use]
    pub fn nw_src_ignored_bits(self) -> u32 {
        ((self.bits() >> Self::NW_SRC_SHIFT) & 0x3f).min(32)
    }

    /// Number of low-order IPv4 destination bits ignored, saturated at 32.
    #[must_use]
    pub fn nw_dst_ignored_bits(self) -> u32 {
        ((self.bits() >> Self::NW_DST_SHIFT) & 0x3f).min(32)
    }

    /// The wildcards for the opposite direction: every source/destination pair (ethernet
    /// addresses, IPv4 prefix lengths, transport ports) exchanged.
    #[must_use]
    pub fn reversed(self) -> Self {
        let src = (self.bits() & Self::NW_SRC_MASK.bits()) >> Self::NW_SRC_SHIFT;
        let dst = (self.bits() & Self::NW_DST_MASK.bits()) >> Self::NW_DST_SHIFT;
        let rest = self.bits() & !(Self::NW_SRC_MASK.bits() | Self::NW_DST_MASK.bits());
        let mut out = Wildcards::from_bits_retain(
            rest | (dst << Self::NW_SRC_SHIFT) | (src << Self::NW_DST_SHIFT),
        );
        out.set(Wildcards::DL_SRC, self.contains(Wildcards::DL_DST));
        out.set(Wildcards::DL_DST, self.contains(Wildcards::DL_SRC));
        out.set(Wildcards::TP_SRC, self.contains(Wildcards::TP_DST));
        out.set(Wildcards::TP_DST, self.contains(Wildcards::TP_SRC));
        out
    }
}

impl Default for Wildcards {
    fn default() -> Self {
        Wildcards::ANY
    }
}
