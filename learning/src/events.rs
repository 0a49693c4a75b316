// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Observability hook.
//!
//! The handlers report every decision they take as a [`LearningEvent`] to an [`EventSink`].
//! Counting, exporting or asserting on those is left to the sink.

use net::{Mac, VlanTag};
use ofproto::{Cookie, Match, PortNo, SwitchId, TransportError};
use tracing::{debug, trace};

/// A decision point reached while handling a switch message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearningEvent {
    /// A packet-in frame could not be decoded.
    MalformedFrame { switch: SwitchId, reason: String },
    /// A frame for a bridge-protocol address was left alone.
    ReservedDestination { switch: SwitchId, dst: Mac },
    Learned {
        switch: SwitchId,
        mac: Mac,
        vlan: VlanTag,
        port: PortNo,
    },
    /// The destination is unknown; the frame was flooded.
    Flooded {
        switch: SwitchId,
        in_port: PortNo,
        dst: Mac,
    },
    /// The destination lives behind the ingress port; the frame was dropped.
    SamePortDrop {
        switch: SwitchId,
        port: PortNo,
        dst: Mac,
    },
    /// The frame was sent straight to the learned port.
    Forwarded {
        switch: SwitchId,
        in_port: PortNo,
        out_port: PortNo,
    },
    RuleInstalled {
        switch: SwitchId,
        flow_match: Match,
        out_port: PortNo,
        reverse: bool,
    },
    /// A rule this application does not own went away.
    ForeignRemoval { switch: SwitchId, cookie: Cookie },
    /// One of our rules went away and its source was forgotten.
    Forgotten {
        switch: SwitchId,
        mac: Mac,
        vlan: VlanTag,
        port: Option<PortNo>,
    },
    RuleDeleted {
        switch: SwitchId,
        flow_match: Match,
        out_port: PortNo,
    },
    SendFailed {
        switch: SwitchId,
        error: TransportError,
    },
    SwitchError { switch: SwitchId, kind: u16, code: u16 },
    UnexpectedMessage { switch: SwitchId, msg_type: u8 },
}

impl LearningEvent {
    /// Short stable name of the event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LearningEvent::MalformedFrame { .. } => "malformed-frame",
            LearningEvent::ReservedDestination { .. } => "reserved-destination",
            LearningEvent::Learned { .. } => "learned",
            LearningEvent::Flooded { .. } => "flooded",
            LearningEvent::SamePortDrop { .. } => "same-port-drop",
            LearningEvent::Forwarded { .. } => "forwarded",
            LearningEvent::RuleInstalled { .. } => "rule-installed",
            LearningEvent::ForeignRemoval { .. } => "foreign-removal",
            LearningEvent::Forgotten { .. } => "forgotten",
            LearningEvent::RuleDeleted { .. } => "rule-deleted",
            LearningEvent::SendFailed { .. } => "send-failed",
            LearningEvent::SwitchError { .. } => "switch-error",
            LearningEvent::UnexpectedMessage { .. } => "unexpected-message",
        }
    }

    /// The switch the event happened on.
    #[must_use]
    pub fn switch(&self) -> SwitchId {
        match self {
            LearningEvent::MalformedFrame { switch, .. }
            | LearningEvent::ReservedDestination { switch, .. }
            | LearningEvent::Learned { switch, .. }
            | LearningEvent::Flooded { switch, .. }
            | LearningEvent::SamePortDrop { switch, .. }
            | LearningEvent::Forwarded { switch, .. }
            | LearningEvent::RuleInstalled { switch, .. }
            | LearningEvent::ForeignRemoval { switch, .. }
            | LearningEvent::Forgotten { switch, .. }
            | LearningEvent::RuleDeleted { switch, .. }
            | LearningEvent::SendFailed { switch, .. }
            | LearningEvent::SwitchError { switch, .. }
            | LearningEvent::UnexpectedMessage { switch, .. } => *switch,
        }
    }
}

/// Receiver of [`LearningEvent`]s. Called synchronously from the handlers.
pub trait EventSink: Send + Sync {
    fn record(&self, event: LearningEvent);
}

/// Sink that turns events into trace records.
///
/// The handlers already log failures at the appropriate level; this sink only adds the
/// per-decision detail, at debug level for table and rule changes and trace for the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: LearningEvent) {
        let name = event.name();
        let switch = event.switch();
        match &event {
            LearningEvent::Learned { .. }
            | LearningEvent::RuleInstalled { .. }
            | LearningEvent::Forgotten { .. }
            | LearningEvent::RuleDeleted { .. } => {
                debug!(event = name, %switch, "{event:?}");
            }
            _ => trace!(event = name, %switch, "{event:?}"),
        }
    }
}
