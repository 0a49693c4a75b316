// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Commands sent down to switches.

pub mod flow_mod;
pub mod packet_out;
