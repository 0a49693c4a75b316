// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow rules installed and removed by the learning switch.

use ofproto::{Action, Cookie, FlowMod, FlowModCommand, FlowModFlags, Match, PortNo, Wildcards};

use crate::config::RuleTiming;

const APP_ID: u64 = 1;
const APP_ID_SHIFT: u32 = 52;

/// Cookie on every rule the learning switch installs: the application id in the top 12
/// bits, the rest zero.
pub const LEARNING_SWITCH_COOKIE: Cookie = Cookie(APP_ID << APP_ID_SHIFT);

/// Fields a forward or reverse rule matches on, given what the switch can wildcard cheaply.
///
/// Everything the switch can wildcard in its fast path is wildcarded, except the input port,
/// VLAN, MAC and IPv4 addresses. Wildcarded fields are zeroed.
#[must_use]
pub fn narrow(flow_match: Match, fast_wildcards: Wildcards) -> Match {
    flow_match.with_wildcards(fast_wildcards - Wildcards::LEARNED_EXACT)
}

/// A rule sending traffic matching `flow_match` out of `out_port`, reported to the
/// controller when it expires.
#[must_use]
pub fn add_rule(flow_match: Match, out_port: PortNo, timing: RuleTiming) -> FlowMod {
    FlowMod {
        flow_match,
        cookie: LEARNING_SWITCH_COOKIE,
        command: FlowModCommand::Add,
        idle_timeout: timing.idle_timeout,
        hard_timeout: timing.hard_timeout,
        priority: timing.priority,
        buffer_id: None,
        out_port: PortNo::NONE,
        flags: FlowModFlags::SEND_FLOW_REM,
        actions: vec![Action::output(out_port)],
    }
}

/// Removal of the rules covered by `flow_match` which output to `out_port`.
#[must_use]
pub fn delete_rule(flow_match: Match, out_port: PortNo, priority: u16) -> FlowMod {
    FlowMod {
        flow_match,
        cookie: LEARNING_SWITCH_COOKIE,
        command: FlowModCommand::Delete,
        idle_timeout: 0,
        hard_timeout: 0,
        priority,
        buffer_id: None,
        out_port,
        flags: FlowModFlags::empty(),
        actions: Vec::new(),
    }
}
