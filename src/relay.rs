//! Off-mesh relay gateway.
//!
//! REQ and CANCEL frames (and PONG sightings) are forwarded to an HTTP
//! endpoint so responders outside the mesh see them. Several beacons hear
//! every frame, so the mesh coordinates who forwards: the first beacon to
//! post successfully broadcasts a mesh ACK, and everyone (including the
//! poster) remembers the event key so later deliveries stay local.
//!
//! Best-effort only: a failed post leaves no dedup entry, so the next
//! delivery of the same frame (or another beacon) gets a fresh try.

use core::fmt::Write as _;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ChannelPort, EventSink, RelayPort};
use crate::dedup::{AckDedupCache, AckKey};
use crate::protocol::{Frame, FrameKind, RequestId};

pub struct RelayGateway {
    cache: AckDedupCache,
}

impl RelayGateway {
    pub const fn new() -> Self {
        Self {
            cache: AckDedupCache::new(),
        }
    }

    /// Forward a lifecycle frame upstream. On success the event is
    /// remembered and an ACK is broadcast on the mesh; on failure nothing
    /// is remembered. Returns whether the post went through.
    pub fn relay(
        &mut self,
        kind: FrameKind,
        request_id: &RequestId,
        text: &str,
        node_name: &str,
        channel: &mut impl ChannelPort,
        relay: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let key = event_key(kind, request_id);
        if self.cache.contains(&key) {
            return false;
        }
        if !relay.is_enabled() {
            return false;
        }
        if !relay.post(text, node_name) {
            warn!("relay post failed for {key}");
            sink.emit(&AppEvent::RelayFailed { kind });
            return false;
        }
        self.cache.remember(&key);
        let ack = Frame::Ack {
            kind,
            id: request_id.clone(),
        };
        channel.send(&ack.encode());
        info!("relay forwarded {key}");
        sink.emit(&AppEvent::RelayForwarded { kind });
        true
    }

    /// Forward a PONG upstream at most once per `(ping_id, beacon)`.
    /// Remembered *before* the post and never mesh-ACKed: pongs are
    /// telemetry, not requests, and a retry storm over the uplink is
    /// worse than one lost sample.
    pub fn relay_pong(
        &mut self,
        ping_id: &str,
        beacon: u8,
        text: &str,
        node_name: &str,
        relay: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        let mut key = AckKey::new();
        if write!(key, "PONG|{ping_id}|{beacon}").is_err() {
            return;
        }
        if self.cache.contains(&key) || !relay.is_enabled() {
            return;
        }
        self.cache.remember(&key);
        if relay.post(text, node_name) {
            info!("relay forwarded {key}");
            sink.emit(&AppEvent::RelayForwarded {
                kind: FrameKind::Pong,
            });
        } else {
            warn!("relay post failed for {key}");
            sink.emit(&AppEvent::RelayFailed {
                kind: FrameKind::Pong,
            });
        }
    }

    /// Record an ACK observed on the mesh: some other beacon already
    /// forwarded this event.
    pub fn observe_ack(&mut self, kind: FrameKind, request_id: &RequestId) {
        self.cache.remember(&event_key(kind, request_id));
    }
}

impl Default for RelayGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn event_key(kind: FrameKind, request_id: &RequestId) -> AckKey {
    let mut key = AckKey::new();
    // "CANCEL|" plus a max-length id is 39 bytes, inside the key bound.
    let _ = write!(key, "{}|{request_id}", kind.as_str());
    key
}
