// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow-removed handling.
//!
//! When one of our rules expires, what was learned about its source may be stale, and the
//! rule for the other direction (if one was installed) should not outlive it.

use std::sync::Arc;

use mactable::MacTable;
use ofproto::{FlowRemoved, PortNo, SwitchHandle, Wildcards};
use tracing::{debug, trace};

use crate::builder::flow_mod::{self, LEARNING_SWITCH_COOKIE};
use crate::config::LearningConfig;
use crate::engine::send_reporting;
use crate::events::{EventSink, LearningEvent};

/// What a flow-removed message resulted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Not one of our rules.
    Ignored,
    Handled {
        /// Port the source had been learned on, if it was still in the table.
        forgotten: Option<PortNo>,
        /// Whether the delete for the reverse direction was handed to the switch.
        delete_sent: bool,
    },
}

pub struct FlowRemovedHandler {
    table: Arc<MacTable>,
    config: LearningConfig,
    sink: Arc<dyn EventSink>,
}

impl FlowRemovedHandler {
    #[must_use]
    pub fn new(table: Arc<MacTable>, config: LearningConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            table,
            config,
            sink,
        }
    }

    /// Handle one flow-removed message from `switch`.
    pub fn handle(&self, switch: &dyn SwitchHandle, removed: &FlowRemoved) -> Removal {
        let id = switch.id();
        if removed.cookie != LEARNING_SWITCH_COOKIE {
            trace!("{id}: ignoring removal of foreign rule {}", removed.cookie);
            self.sink.record(LearningEvent::ForeignRemoval {
                switch: id,
                cookie: removed.cookie,
            });
            return Removal::Ignored;
        }

        let installed = &removed.flow_match;
        debug!(
            "{id}: rule {installed:?} removed ({:?} after {}s)",
            removed.reason, removed.duration_sec
        );

        let vlan = installed.vlan();
        let forgotten = self.table.forget(id, installed.dl_src, vlan);
        self.sink.record(LearningEvent::Forgotten {
            switch: id,
            mac: installed.dl_src,
            vlan,
            port: forgotten,
        });

        // The reverse rule, if any, sends traffic back out of the port the removed rule
        // matched as its input.
        // The input port is left to the switch when it can wildcard it: the delete is
        // filtered on its output port instead.
        let reverse = installed.reversed();
        let in_port = switch.fast_wildcards() & Wildcards::IN_PORT;
        let reverse = reverse.with_wildcards(reverse.wildcards | in_port);
        let out_port = installed.in_port;
        let delete = flow_mod::delete_rule(reverse, out_port, self.config.priority);
        let delete_sent = send_reporting(switch, delete.into(), self.sink.as_ref());
        if delete_sent {
            self.sink.record(LearningEvent::RuleDeleted {
                switch: id,
                flow_match: reverse,
                out_port,
            });
        }

        Removal::Handled {
            forgotten,
            delete_sent,
        }
    }
}
