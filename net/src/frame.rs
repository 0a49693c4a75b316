// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Extraction of matchable header fields from a raw ethernet frame.
//!
//! A switch hands the controller the first bytes of a frame it could not match. The learning
//! switch only needs the handful of fields an OpenFlow 1.0 match can express, so instead of
//! building a full packet representation this module walks the headers once and flattens
//! them into [`FrameFields`]. Anything past the ethernet header is best effort: a truncated or
//! unknown upper layer simply leaves the corresponding fields zeroed.

use std::net::Ipv4Addr;

use etherparse::{Ethernet2Header, IpNumber, Ipv4Header, SingleVlanHeader, TcpHeader, UdpHeader};
use tracing::trace;

use crate::eth::mac::Mac;
use crate::eth::{ETH_TYPE_ARP, ETH_TYPE_IPV4, ETH_TYPE_VLAN};
use crate::vlan::VlanTag;

/// Errors decoding a frame.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Not even an ethernet header is present.
    #[error("frame of {0} bytes is too short for an ethernet header")]
    Truncated(usize),
}

/// Header fields of a frame, flattened the way an OpenFlow 1.0 match sees them.
///
/// For ARP frames `nw_proto` carries the low byte of the opcode and `nw_src`/`nw_dst` the
/// sender and target protocol addresses. For ICMP `tp_src`/`tp_dst` carry type and code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameFields {
    /// Source address.
    pub src: Mac,
    /// Destination address.
    pub dst: Mac,
    /// VID of the 802.1Q tag, `None` if the frame is untagged.
    pub vid: Option<u16>,
    /// Priority code point of the 802.1Q tag.
    pub vlan_pcp: u8,
    /// Ethertype after any VLAN tag.
    pub eth_type: u16,
    /// IPv4 DSCP in the upper six bits.
    pub nw_tos: u8,
    /// IP protocol, or ARP opcode.
    pub nw_proto: u8,
    /// IPv4 source, or ARP sender address.
    pub nw_src: Ipv4Addr,
    /// IPv4 destination, or ARP target address.
    pub nw_dst: Ipv4Addr,
    /// Transport source port, or ICMP type.
    pub tp_src: u16,
    /// Transport destination port, or ICMP code.
    pub tp_dst: u16,
}

impl FrameFields {
    /// Decode the fields of `frame`.
    ///
    /// # Errors
    ///
    /// Fails only if `frame` is shorter than an ethernet header.
    pub fn parse(frame: &[u8]) -> Result<Self, FrameError> {
        let (eth, mut rest) =
            Ethernet2Header::from_slice(frame).map_err(|_| FrameError::Truncated(frame.len()))?;

        let mut fields = FrameFields {
            src: Mac(eth.source),
            dst: Mac(eth.destination),
            vid: None,
            vlan_pcp: 0,
            eth_type: eth.ether_type.0,
            nw_tos: 0,
            nw_proto: 0,
            nw_src: Ipv4Addr::UNSPECIFIED,
            nw_dst: Ipv4Addr::UNSPECIFIED,
            tp_src: 0,
            tp_dst: 0,
        };

        if fields.eth_type == ETH_TYPE_VLAN {
            let Ok((tag, after)) = SingleVlanHeader::from_slice(rest) else {
                trace!("truncated 802.1Q tag from {}", fields.src);
                return Ok(fields);
            };
            fields.vid = Some(tag.vlan_id.value());
            fields.vlan_pcp = tag.pcp.value();
            fields.eth_type = tag.ether_type.0;
            rest = after;
        }

        match fields.eth_type {
            ETH_TYPE_IPV4 => fields.parse_ipv4(rest),
            ETH_TYPE_ARP => fields.parse_arp(rest),
            _ => {}
        }
        Ok(fields)
    }

    /// The learning-table view of the VLAN.
    #[must_use]
    pub fn vlan(&self) -> VlanTag {
        self.vid.map_or(VlanTag::UNTAGGED, VlanTag::new)
    }

    fn parse_ipv4(&mut self, l3: &[u8]) {
        let Ok((ip, l4)) = Ipv4Header::from_slice(l3) else {
            trace!("undecodable ipv4 header from {}", self.src);
            return;
        };
        self.nw_tos = ip.dscp.value() << 2;
        self.nw_proto = ip.protocol.0;
        self.nw_src = Ipv4Addr::from(ip.source);
        self.nw_dst = Ipv4Addr::from(ip.destination);

        // only the first fragment carries transport ports
        if ip.fragment_offset.value() != 0 {
            return;
        }
        match ip.protocol {
            IpNumber::TCP => {
                if let Ok((tcp, _)) = TcpHeader::from_slice(l4) {
                    self.tp_src = tcp.source_port;
                    self.tp_dst = tcp.destination_port;
                }
            }
            IpNumber::UDP => {
                if let Ok((udp, _)) = UdpHeader::from_slice(l4) {
                    self.tp_src = udp.source_port;
                    self.tp_dst = udp.destination_port;
                }
            }
            IpNumber::ICMP => {
                if let [icmp_type, icmp_code, ..] = l4 {
                    self.tp_src = u16::from(*icmp_type);
                    self.tp_dst = u16::from(*icmp_code);
                }
            }
            _ => {}
        }
    }

    fn parse_arp(&mut self, arp: &[u8]) {
        // ethernet/ipv4 ARP only: htype 1, ptype 0x0800, hlen 6, plen 4
        const ARP_LEN: usize = 28;
        if arp.len() < ARP_LEN || arp[0..6] != [0x00, 0x01, 0x08, 0x00, 0x06, 0x04] {
            return;
        }
        self.nw_proto = arp[7];
        self.nw_src = Ipv4Addr::new(arp[14], arp[15], arp[16], arp[17]);
        self.nw_dst = Ipv4Addr::new(arp[24], arp[25], arp[26], arp[27]);
    }
}
