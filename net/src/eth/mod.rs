// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ethernet addressing.

pub mod mac;

/// Ethertype of an 802.1Q tag.
pub const ETH_TYPE_VLAN: u16 = 0x8100;
/// Ethertype of IPv4.
pub const ETH_TYPE_IPV4: u16 = 0x0800;
/// Ethertype of ARP.
pub const ETH_TYPE_ARP: u16 = 0x0806;
