// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Switch identity.

use std::fmt::Display;

/// The datapath id of a switch.
///
/// Only ever used as a key: the controller does not own the switch, it just tells them apart.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SwitchId(pub u64);

impl From<u64> for SwitchId {
    fn from(dpid: u64) -> Self {
        SwitchId(dpid)
    }
}

/// Displayed the way switches usually print their dpid, as eight colon separated octets.
impl Display for SwitchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.0.to_be_bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

#[cfg(test)]
mod test {
    use super::SwitchId;

    #[test]
    fn dpid_display() {
        assert_eq!(SwitchId(1).to_string(), "00:00:00:00:00:00:00:01");
        assert_eq!(
            SwitchId(0x0a0b_0c0d_0e0f_1011).to_string(),
            "0a:0b:0c:0d:0e:0f:10:11"
        );
    }
}
