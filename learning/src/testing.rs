// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Test doubles for the learning switch.

use std::sync::atomic::{AtomicBool, Ordering};

use ofproto::{
    ControllerMessage, FlowMod, PacketOut, SwitchHandle, SwitchId, TransportError, Wildcards,
};
use parking_lot::Mutex;

use crate::events::{EventSink, LearningEvent};

/// A switch which records what it is sent.
///
/// By default it buffers packets and can wildcard every field in its fast path.
pub struct RecordingSwitch {
    id: SwitchId,
    buffers: bool,
    fast_wildcards: Wildcards,
    failing: AtomicBool,
    sent: Mutex<Vec<ControllerMessage>>,
}

impl RecordingSwitch {
    #[must_use]
    pub fn new(id: SwitchId) -> Self {
        Self {
            id,
            buffers: true,
            fast_wildcards: Wildcards::ANY,
            failing: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn without_buffers(mut self) -> Self {
        self.buffers = false;
        self
    }

    #[must_use]
    pub fn with_fast_wildcards(mut self, fast_wildcards: Wildcards) -> Self {
        self.fast_wildcards = fast_wildcards;
        self
    }

    /// Make every send fail as if the switch had disconnected.
    #[must_use]
    pub fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Everything sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<ControllerMessage> {
        self.sent.lock().clone()
    }

    #[must_use]
    pub fn flow_mods(&self) -> Vec<FlowMod> {
        self.sent
            .lock()
            .iter()
            .filter_map(|m| match m {
                ControllerMessage::FlowMod(fm) => Some(fm.clone()),
                ControllerMessage::PacketOut(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn packet_outs(&self) -> Vec<PacketOut> {
        self.sent
            .lock()
            .iter()
            .filter_map(|m| match m {
                ControllerMessage::PacketOut(po) => Some(po.clone()),
                ControllerMessage::FlowMod(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl SwitchHandle for RecordingSwitch {
    fn id(&self) -> SwitchId {
        self.id
    }

    fn send(&self, message: ControllerMessage) -> Result<(), TransportError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(TransportError::Disconnected(self.id));
        }
        // wire encoding must not panic for anything the application builds
        let _ = message.encode();
        self.sent.lock().push(message);
        Ok(())
    }

    fn buffers_packets(&self) -> bool {
        self.buffers
    }

    fn fast_wildcards(&self) -> Wildcards {
        self.fast_wildcards
    }
}

/// An [`EventSink`] which keeps every event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LearningEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn events(&self) -> Vec<LearningEvent> {
        self.events.lock().clone()
    }

    /// Names of the recorded events, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(LearningEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: LearningEvent) {
        self.events.lock().push(event);
    }
}
