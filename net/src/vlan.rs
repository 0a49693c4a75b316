// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VLAN tags as seen by the learning table.

use std::fmt::Display;

/// A normalized 12-bit VLAN tag.
///
/// The learning switch does not care whether a frame carried a tag with VID 0, no tag at all,
/// or the all-ones "no VLAN" sentinel some switches report: all of them mean the untagged
/// segment and are represented as [`VlanTag::UNTAGGED`] (value 0). Constructing a tag through
/// [`VlanTag::new`] is the only way in, so two tags that compare equal always denote the
/// same segment.
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
#[serde(from = "u16", into = "u16")]
pub struct VlanTag(u16);

impl VlanTag {
    /// The untagged segment.
    pub const UNTAGGED: VlanTag = VlanTag(0);
    /// Reserved all-ones VID, used on the wire to say "no VLAN".
    pub const SENTINEL: u16 = 0x0fff;
    const VID_MASK: u16 = 0x0fff;

    /// Normalize a raw VLAN field.
    ///
    /// Only the low 12 bits are kept (so a 16-bit `0xffff` "none" marker behaves like the
    /// 12-bit sentinel) and the sentinel collapses to [`VlanTag::UNTAGGED`].
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        let vid = raw & Self::VID_MASK;
        if vid == Self::SENTINEL {
            Self::UNTAGGED
        } else {
            VlanTag(vid)
        }
    }

    /// The VID.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// True for the untagged segment.
    #[must_use]
    pub const fn is_untagged(self) -> bool {
        self.0 == 0
    }
}

impl From<u16> for VlanTag {
    fn from(raw: u16) -> Self {
        VlanTag::new(raw)
    }
}

impl From<VlanTag> for u16 {
    fn from(vlan: VlanTag) -> u16 {
        vlan.as_u16()
    }
}

impl Display for VlanTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
