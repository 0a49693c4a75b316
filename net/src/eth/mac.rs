// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Mac address type and logic.

use arrayvec::ArrayVec;
use std::fmt::Display;
use std::str::FromStr;

/// A [MAC Address].
///
/// Stored as the six octets in wire order. The learning table and the OpenFlow match treat
/// it as a 48-bit integer, see [`Mac::as_u64`].
///
/// [MAC Address]: https://en.wikipedia.org/wiki/MAC_address
#[repr(transparent)]
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Mac(pub [u8; 6]);

/// Errors which can occur while converting a string to a [`Mac`]
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MacParseError {
    /// Not six colon separated pairs of hex digits
    #[error("invalid string representation of mac address: {0}")]
    Invalid(String),
}

impl Mac {
    /// The broadcast `Mac`
    pub const BROADCAST: Mac = Mac([u8::MAX; 6]);
    /// The zero `Mac`.
    pub const ZERO: Mac = Mac([0; 6]);

    /// First five octets of the addresses reserved by 802.1D for bridge protocols
    /// (STP, LACP, 802.1X, LLDP, ...). Frames sent to these must never be relayed by a bridge.
    const BRIDGE_RESERVED_PREFIX: [u8; 5] = [0x01, 0x80, 0xc2, 0x00, 0x00];

    /// Build a [`Mac`] from the low 48 bits of `value`.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        let b = value.to_be_bytes();
        Mac([b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    /// The [`Mac`] as a 48-bit integer, most significant octet first.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        let o = &self.0;
        u64::from_be_bytes([0, 0, o[0], o[1], o[2], o[3], o[4], o[5]])
    }

    /// Returns true iff every bit of the [`Mac`] is set.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Mac::BROADCAST
    }

    /// Returns true iff the group bit (least significant bit of the first octet) is set.
    ///
    /// Broadcast is a special case of multicast.
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// Returns true iff the [`Mac`] is not multicast.
    #[must_use]
    pub fn is_unicast(&self) -> bool {
        !self.is_multicast()
    }

    /// Returns true iff the [`Mac`] is all zeros.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Mac::ZERO
    }

    /// Returns true iff the [`Mac`] falls in `01:80:c2:00:00:00/40`, the range a bridge
    /// consumes locally and never forwards.
    #[must_use]
    pub fn is_bridge_reserved(&self) -> bool {
        self.0[..5] == Self::BRIDGE_RESERVED_PREFIX
    }
}

impl From<[u8; 6]> for Mac {
    fn from(value: [u8; 6]) -> Self {
        Mac(value)
    }
}

impl From<Mac> for [u8; 6] {
    fn from(value: Mac) -> Self {
        value.0
    }
}

impl AsRef<[u8; 6]> for Mac {
    fn as_ref(&self) -> &[u8; 6] {
        &self.0
    }
}

impl FromStr for Mac {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MacParseError::Invalid(s.to_string());
        let mut octets = ArrayVec::<u8, 6>::new();
        for part in s.split(':') {
            if part.len() != 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            octets.try_push(octet).map_err(|_| invalid())?;
        }
        let octets = octets.into_inner().map_err(|_| invalid())?;
        Ok(Mac(octets))
    }
}

impl TryFrom<&str> for Mac {
    type Error = MacParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Mac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}
