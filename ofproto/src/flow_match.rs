// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The OpenFlow 1.0 match structure (`ofp_match`).

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut};
use net::{FrameFields, Mac, VlanTag};

use crate::port::PortNo;
use crate::wildcards::Wildcards;
use crate::wire::{WireError, ensure};

/// Fields a flow rule matches against.
///
/// A field only takes part in matching if its [`Wildcards`] bit is clear. `dl_vlan` holds the
/// raw wire value; [`Match::UNTAGGED`] there means "frame without a VLAN tag".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub wildcards: Wildcards,
    pub in_port: PortNo,
    pub dl_src: Mac,
    pub dl_dst: Mac,
    pub dl_vlan: u16,
    pub dl_vlan_pcp: u8,
    pub dl_type: u16,
    pub nw_tos: u8,
    pub nw_proto: u8,
    pub nw_src: Ipv4Addr,
    pub nw_dst: Ipv4Addr,
    pub tp_src: u16,
    pub tp_dst: u16,
}

impl Match {
    /// Encoded size of an `ofp_match`.
    pub const LEN: usize = 40;
    /// `dl_vlan` value of an untagged frame (`OFP_VLAN_NONE`).
    pub const UNTAGGED: u16 = 0xffff;

    /// A match which matches everything.
    #[must_use]
    pub fn any() -> Self {
        Match {
            wildcards: Wildcards::ANY,
            in_port: PortNo(0),
            dl_src: Mac::ZERO,
            dl_dst: Mac::ZERO,
            dl_vlan: 0,
            dl_vlan_pcp: 0,
            dl_type: 0,
            nw_tos: 0,
            nw_proto: 0,
            nw_src: Ipv4Addr::UNSPECIFIED,
            nw_dst: Ipv4Addr::UNSPECIFIED,
            tp_src: 0,
            tp_dst: 0,
        }
    }

    /// The exact match for a frame received on `in_port`; no field is wildcarded.
    #[must_use]
    pub fn from_frame(fields: &FrameFields, in_port: PortNo) -> Self {
        Match {
            wildcards: Wildcards::empty(),
            in_port,
            dl_src: fields.src,
            dl_dst: fields.dst,
            dl_vlan: fields.vid.unwrap_or(Self::UNTAGGED),
            dl_vlan_pcp: fields.vlan_pcp,
            dl_type: fields.eth_type,
            nw_tos: fields.nw_tos,
            nw_proto: fields.nw_proto,
            nw_src: fields.nw_src,
            nw_dst: fields.nw_dst,
            tp_src: fields.tp_src,
            tp_dst: fields.tp_dst,
        }
    }

    /// The VLAN the way the learning table keys it.
    #[must_use]
    pub fn vlan(&self) -> VlanTag {
        VlanTag::new(self.dl_vlan)
    }

    /// Replace the wildcards and zero every field they cover.
    ///
    /// Zeroing makes two matches which differ only in ignored fields compare (and encode)
    /// identically.
    #[must_use]
    pub fn with_wildcards(mut self, wildcards: Wildcards) -> Self {
        self.wildcards = wildcards;
        if wildcards.contains(Wildcards::IN_PORT) {
            self.in_port = PortNo(0);
        }
        if wildcards.contains(Wildcards::DL_SRC) {
            self.dl_src = Mac::ZERO;
        }
        if wildcards.contains(Wildcards::DL_DST) {
            self.dl_dst = Mac::ZERO;
        }
        if wildcards.contains(Wildcards::DL_VLAN) {
            self.dl_vlan = 0;
        }
        if wildcards.contains(Wildcards::DL_VLAN_PCP) {
            self.dl_vlan_pcp = 0;
        }
        if wildcards.contains(Wildcards::DL_TYPE) {
            self.dl_type = 0;
        }
        if wildcards.contains(Wildcards::NW_TOS) {
            self.nw_tos = 0;
        }
        if wildcards.contains(Wildcards::NW_PROTO) {
            self.nw_proto = 0;
        }
        if wildcards.contains(Wildcards::TP_SRC) {
            self.tp_src = 0;
        }
        if wildcards.contains(Wildcards::TP_DST) {
            self.tp_dst = 0;
        }
        self.nw_src = mask_low_bits(self.nw_src, wildcards.nw_src_ignored_bits());
        self.nw_dst = mask_low_bits(self.nw_dst, wildcards.nw_dst_ignored_bits());
        self
    }

    /// The match for traffic flowing the other way: source and destination swapped at
    /// layers 2, 3 and 4, wildcards included. Everything else, including the input port, is
    /// kept.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let wildcards = self.wildcards.reversed();
        Match {
            dl_src: self.dl_dst,
            dl_dst: self.dl_src,
            nw_src: self.nw_dst,
            nw_dst: self.nw_src,
            tp_src: self.tp_dst,
            tp_dst: self.tp_src,
            ..*self
        }
        .with_wildcards(wildcards)
    }

    /// Append the wire form to `buf`.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.wildcards.bits());
        buf.put_u16(self.in_port.0);
        buf.put_slice(&self.dl_src.0);
        buf.put_slice(&self.dl_dst.0);
        buf.put_u16(self.dl_vlan);
        buf.put_u8(self.dl_vlan_pcp);
        buf.put_u8(0);
        buf.put_u16(self.dl_type);
        buf.put_u8(self.nw_tos);
        buf.put_u8(self.nw_proto);
        buf.put_bytes(0, 2);
        buf.put_u32(self.nw_src.into());
        buf.put_u32(self.nw_dst.into());
        buf.put_u16(self.tp_src);
        buf.put_u16(self.tp_dst);
    }

    /// Read a match from the front of `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        ensure(buf.remaining(), "ofp_match", Self::LEN)?;
        let wildcards = Wildcards::from_bits_retain(buf.get_u32());
        let in_port = PortNo(buf.get_u16());
        let mut dl_src = Mac::ZERO;
        buf.copy_to_slice(&mut dl_src.0);
        let mut dl_dst = Mac::ZERO;
        buf.copy_to_slice(&mut dl_dst.0);
        let dl_vlan = buf.get_u16();
        let dl_vlan_pcp = buf.get_u8();
        buf.advance(1);
        let dl_type = buf.get_u16();
        let nw_tos = buf.get_u8();
        let nw_proto = buf.get_u8();
        buf.advance(2);
        let nw_src = Ipv4Addr::from(buf.get_u32());
        let nw_dst = Ipv4Addr::from(buf.get_u32());
        let tp_src = buf.get_u16();
        let tp_dst = buf.get_u16();
        Ok(Match {
            wildcards,
            in_port,
            dl_src,
            dl_dst,
            dl_vlan,
            dl_vlan_pcp,
            dl_type,
            nw_tos,
            nw_proto,
            nw_src,
            nw_dst,
            tp_src,
            tp_dst,
        })
    }
}

impl Default for Match {
    fn default() -> Self {
        Match::any()
    }
}

fn mask_low_bits(addr: Ipv4Addr, ignored: u32) -> Ipv4Addr {
    let mask = u32::MAX.checked_shl(ignored).unwrap_or(0);
    Ipv4Addr::from(u32::from(addr) & mask)
}

#[cfg(test)]
mod test {
    use std::net::Ipv4Addr;

    use net::{FrameFields, Mac, VlanTag};
    use pretty_assertions::assert_eq;

    use super::Match;
    use crate::port::PortNo;
    use crate::wildcards::Wildcards;
    use crate::wire::WireError;

    fn sample() -> Match {
        let fields = FrameFields {
            src: Mac([0x02, 0, 0, 0, 0, 0xaa]),
            dst: Mac([0x02, 0, 0, 0, 0, 0xbb]),
            vid: None,
            vlan_pcp: 0,
            eth_type: 0x0800,
            nw_tos: 0x10,
            nw_proto: 6,
            nw_src: Ipv4Addr::new(10, 0, 0, 1),
            nw_dst: Ipv4Addr::new(10, 0, 0, 2),
            tp_src: 40000,
            tp_dst: 22,
        };
        Match::from_frame(&fields, PortNo(3))
    }

    #[test]
    fn frame_match_is_exact() {
        let m = sample();
        assert!(m.wildcards.is_empty());
        assert_eq!(m.in_port, PortNo(3));
        assert_eq!(m.dl_vlan, Match::UNTAGGED);
        assert_eq!(m.vlan(), VlanTag::UNTAGGED);
    }

    #[test]
    fn wildcarded_fields_are_zeroed() {
        let m = sample().with_wildcards(Wildcards::ANY - Wildcards::LEARNED_EXACT);
        assert_eq!(m.in_port, PortNo(3));
        assert_eq!(m.dl_src, Mac([0x02, 0, 0, 0, 0, 0xaa]));
        assert_eq!(m.nw_dst, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!((m.tp_src, m.tp_dst, m.nw_proto, m.dl_type, m.nw_tos), (0, 0, 0, 0, 0));

        let mut other = sample();
        other.tp_src = 1;
        other.nw_tos = 0;
        assert_eq!(
            other.with_wildcards(Wildcards::ANY - Wildcards::LEARNED_EXACT),
            m
        );
    }

    #[test]
    fn partial_address_wildcards() {
        let w = Wildcards::from_bits_retain(8 << 8);
        let m = sample().with_wildcards(w);
        assert_eq!(m.nw_src, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(m.nw_dst, Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn reverse_direction() {
        let m = sample();
        let r = m.reversed();
        assert_eq!(r.dl_src, m.dl_dst);
        assert_eq!(r.dl_dst, m.dl_src);
        assert_eq!(r.nw_src, m.nw_dst);
        assert_eq!(r.nw_dst, m.nw_src);
        assert_eq!((r.tp_src, r.tp_dst), (22, 40000));
        assert_eq!(r.in_port, m.in_port);
        assert_eq!(r.reversed(), m);
    }

    #[test]
    fn reverse_direction_moves_wildcards() {
        // only the destination port is matched going forward
        let fast = Wildcards::ANY - Wildcards::TP_DST;
        let m = sample().with_wildcards(fast - Wildcards::LEARNED_EXACT);
        assert_eq!((m.tp_src, m.tp_dst), (0, 22));

        let r = m.reversed();
        assert!(!r.wildcards.contains(Wildcards::TP_SRC));
        assert!(r.wildcards.contains(Wildcards::TP_DST));
        assert_eq!((r.tp_src, r.tp_dst), (22, 0));
        assert_eq!(r.reversed(), m);

        let mut buf = Vec::new();
        r.encode(&mut buf);
        assert_eq!(&buf[36..40], &[0, 22, 0, 0]);
    }

    #[test]
    fn wire_layout() {
        let m = sample();
        let mut buf = Vec::new();
        m.encode(&mut buf);
        assert_eq!(buf.len(), Match::LEN);
        assert_eq!(&buf[0..4], &[0, 0, 0, 0]);
        assert_eq!(&buf[4..6], &[0, 3]);
        assert_eq!(&buf[18..20], &[0xff, 0xff]);
        assert_eq!(&buf[22..24], &[0x08, 0x00]);
        assert_eq!(&buf[28..32], &[10, 0, 0, 1]);
        assert_eq!(&buf[36..38], &40000u16.to_be_bytes());
        assert_eq!(Match::decode(&mut buf.as_slice()).unwrap(), m);
    }

    #[test]
    fn short_buffer() {
        let buf = [0u8; 39];
        assert_eq!(
            Match::decode(&mut buf.as_slice()),
            Err(WireError::Truncated {
                what: "ofp_match",
                expected: 40,
                actual: 39
            })
        );
    }
}
