// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The learning switch application.

use std::collections::BTreeMap;
use std::sync::Arc;

use mactable::{LearnedEntry, MacTable};
use ofproto::{SwitchHandle, SwitchId, SwitchMessage, WireError};
use tracing::{error, info, warn};

use crate::config::LearningConfig;
use crate::engine::{Decision, PacketInHandler};
use crate::events::{EventSink, LearningEvent, TracingSink};
use crate::lifecycle::{FlowRemovedHandler, Removal};

/// What handling a switch message amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    PacketIn(Decision),
    FlowRemoved(Removal),
    /// An error report or a message the application does not act on.
    Ignored,
}

/// Reactive L2 learning switch: owns the learning table and dispatches switch messages to the
/// packet-in and flow-removed handlers.
///
/// Every method takes `&self`; messages from different switches may be handled concurrently.
pub struct LearningSwitch {
    table: Arc<MacTable>,
    packet_in: PacketInHandler,
    flow_removed: FlowRemovedHandler,
    sink: Arc<dyn EventSink>,
}

impl LearningSwitch {
    /// A learning switch with its own table, reporting events as traces.
    #[must_use]
    pub fn new(config: LearningConfig) -> Self {
        Self::with_parts(Arc::new(MacTable::default()), config, Arc::new(TracingSink))
    }

    #[must_use]
    pub fn with_parts(
        table: Arc<MacTable>,
        config: LearningConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        info!("Starting learning switch: {config:?}");
        Self {
            packet_in: PacketInHandler::new(table.clone(), config, sink.clone()),
            flow_removed: FlowRemovedHandler::new(table.clone(), config, sink.clone()),
            table,
            sink,
        }
    }

    #[must_use]
    pub fn config(&self) -> &LearningConfig {
        self.packet_in.config()
    }

    #[must_use]
    pub fn table(&self) -> &Arc<MacTable> {
        &self.table
    }

    /// Handle a message received from `switch`.
    pub fn handle(&self, switch: &dyn SwitchHandle, message: &SwitchMessage) -> Handled {
        let id = switch.id();
        match message {
            SwitchMessage::PacketIn(packet_in) => {
                Handled::PacketIn(self.packet_in.handle(switch, packet_in))
            }
            SwitchMessage::FlowRemoved(removed) => {
                Handled::FlowRemoved(self.flow_removed.handle(switch, removed))
            }
            SwitchMessage::Error(err) => {
                error!(
                    "{id}: switch reported error type {} code {} ({} bytes of request)",
                    err.kind,
                    err.code,
                    err.data.len()
                );
                self.sink.record(LearningEvent::SwitchError {
                    switch: id,
                    kind: err.kind,
                    code: err.code,
                });
                Handled::Ignored
            }
            SwitchMessage::Other(msg_type) => {
                warn!("{id}: unexpected message of type {msg_type}");
                self.sink.record(LearningEvent::UnexpectedMessage {
                    switch: id,
                    msg_type: *msg_type,
                });
                Handled::Ignored
            }
        }
    }

    /// Decode and handle a message body of type `msg_type` received from `switch`.
    pub fn handle_raw(
        &self,
        switch: &dyn SwitchHandle,
        msg_type: u8,
        body: &[u8],
    ) -> Result<Handled, WireError> {
        let message = SwitchMessage::decode(msg_type, body)?;
        Ok(self.handle(switch, &message))
    }

    /// What was learned, on one switch or on all of them.
    #[must_use]
    pub fn learned(&self, switch: Option<SwitchId>) -> BTreeMap<SwitchId, Vec<LearnedEntry>> {
        match switch {
            None => self.table.snapshot(),
            Some(id) => {
                let entries = self.table.entries(id);
                if entries.is_empty() {
                    BTreeMap::new()
                } else {
                    BTreeMap::from([(id, entries)])
                }
            }
        }
    }

    /// Forget what was learned, on one switch or on all of them. Installed rules stay until
    /// they expire.
    pub fn clear(&self, switch: Option<SwitchId>) {
        match switch {
            None => self.table.clear_all(),
            Some(id) => self.table.clear_switch(id),
        }
    }
}
