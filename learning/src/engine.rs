// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet-in handling: learn the source, then flood, drop or forward.

use std::sync::Arc;

use mactable::MacTable;
use net::FrameFields;
use ofproto::{ControllerMessage, Match, PacketIn, PortNo, SwitchHandle};
use tracing::{debug, error, trace, warn};

use crate::builder::{flow_mod, packet_out};
use crate::config::LearningConfig;
use crate::events::{EventSink, LearningEvent};

/// What a packet-in resulted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The frame could not be decoded; nothing was done.
    Malformed,
    /// Bridge-protocol destination; nothing was done.
    Reserved,
    /// Unknown destination; the frame was flooded.
    Flooded,
    /// The destination was learned on the ingress port; the frame was dropped.
    Dropped,
    /// The frame was sent to `out_port` and rules were installed.
    Forwarded { out_port: PortNo, reverse: bool },
}

pub struct PacketInHandler {
    table: Arc<MacTable>,
    config: LearningConfig,
    sink: Arc<dyn EventSink>,
}

impl PacketInHandler {
    #[must_use]
    pub fn new(table: Arc<MacTable>, config: LearningConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            table,
            config,
            sink,
        }
    }

    #[must_use]
    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Handle one packet-in from `switch`.
    ///
    /// The table is updated before anything is sent, and send failures are reported but do
    /// not undo it or stop the remaining commands.
    pub fn handle(&self, switch: &dyn SwitchHandle, packet_in: &PacketIn) -> Decision {
        let id = switch.id();
        let in_port = packet_in.in_port;

        let fields = match FrameFields::parse(&packet_in.data) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("{id}: dropping packet-in from port {in_port}: {e}");
                self.sink.record(LearningEvent::MalformedFrame {
                    switch: id,
                    reason: e.to_string(),
                });
                return Decision::Malformed;
            }
        };

        if fields.dst.is_bridge_reserved() {
            trace!("{id}: ignoring frame to reserved address {}", fields.dst);
            self.sink.record(LearningEvent::ReservedDestination {
                switch: id,
                dst: fields.dst,
            });
            return Decision::Reserved;
        }

        let vlan = fields.vlan();
        if !fields.src.is_multicast() {
            self.table.learn(id, fields.src, vlan, in_port);
            self.sink.record(LearningEvent::Learned {
                switch: id,
                mac: fields.src,
                vlan,
                port: in_port,
            });
        }

        match self.table.lookup(id, fields.dst, vlan) {
            None => {
                trace!("{id}: {} vlan {vlan} unknown, flooding", fields.dst);
                let po = packet_out::flood(packet_in, switch.buffers_packets());
                self.send(switch, po.into());
                self.sink.record(LearningEvent::Flooded {
                    switch: id,
                    in_port,
                    dst: fields.dst,
                });
                Decision::Flooded
            }
            Some(out_port) if out_port == in_port => {
                trace!(
                    "{id}: {} vlan {vlan} is behind ingress port {in_port}, dropping",
                    fields.dst
                );
                self.sink.record(LearningEvent::SamePortDrop {
                    switch: id,
                    port: in_port,
                    dst: fields.dst,
                });
                Decision::Dropped
            }
            Some(out_port) => self.forward(switch, packet_in, &fields, out_port),
        }
    }

    fn forward(
        &self,
        switch: &dyn SwitchHandle,
        packet_in: &PacketIn,
        fields: &FrameFields,
        out_port: PortNo,
    ) -> Decision {
        let id = switch.id();
        let in_port = packet_in.in_port;
        let fast = switch.fast_wildcards();

        match packet_out::direct(packet_in, out_port, switch.buffers_packets()) {
            Ok(po) => {
                self.send(switch, po.into());
                self.sink.record(LearningEvent::Forwarded {
                    switch: id,
                    in_port,
                    out_port,
                });
            }
            Err(e) => error!("{id}: {e}"),
        }

        let forward = flow_mod::narrow(Match::from_frame(fields, in_port), fast);
        debug!("{id}: installing rule {forward:?} -> port {out_port}");
        let rule = flow_mod::add_rule(forward, out_port, self.config.forward_timing());
        if self.send(switch, rule.into()) {
            self.sink.record(LearningEvent::RuleInstalled {
                switch: id,
                flow_match: forward,
                out_port,
                reverse: false,
            });
        }

        if self.config.reverse_flow {
            let reverse = Match {
                in_port: out_port,
                ..forward.reversed()
            };
            debug!("{id}: installing reverse rule {reverse:?} -> port {in_port}");
            let rule = flow_mod::add_rule(reverse, in_port, self.config.reverse_timing());
            if self.send(switch, rule.into()) {
                self.sink.record(LearningEvent::RuleInstalled {
                    switch: id,
                    flow_match: reverse,
                    out_port: in_port,
                    reverse: true,
                });
            }
        }

        Decision::Forwarded {
            out_port,
            reverse: self.config.reverse_flow,
        }
    }

    fn send(&self, switch: &dyn SwitchHandle, message: ControllerMessage) -> bool {
        send_reporting(switch, message, self.sink.as_ref())
    }
}

/// Hand `message` to `switch`, logging and reporting a failure. Returns whether it was sent.
pub(crate) fn send_reporting(
    switch: &dyn SwitchHandle,
    message: ControllerMessage,
    sink: &dyn EventSink,
) -> bool {
    let msg_type = message.msg_type();
    match switch.send(message) {
        Ok(()) => true,
        Err(error) => {
            error!("Failed to send {msg_type:?} to {}: {error}", switch.id());
            sink.record(LearningEvent::SendFailed {
                switch: switch.id(),
                error,
            });
            false
        }
    }
}
