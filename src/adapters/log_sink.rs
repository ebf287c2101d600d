//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured coordination events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future telemetry uplink would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::HelpRequested { id } => {
                info!("HELP | requested here, id={}", id);
            }
            AppEvent::HelpAdopted { id, beacon } => {
                info!("HELP | adopted from mesh, id={} beacon={}", id, beacon);
            }
            AppEvent::HelpCancelled { id } => {
                info!("HELP | cancelled, id={}", id);
            }
            AppEvent::HelpClaimed { id, beacon } => {
                info!("HELP | claimed by responder, id={} beacon={}", id, beacon);
            }
            AppEvent::HelpResolved { id } => {
                info!("HELP | resolved, id={}", id);
            }
            AppEvent::ResponderDetails { id, beacon } => {
                info!("HELP | responder en route, id={} beacon={}", id, beacon);
            }
            AppEvent::AnnouncementStarted => {
                info!("ANNOUNCE | session started");
            }
            AppEvent::AnnouncementAcknowledged => {
                info!("ANNOUNCE | acknowledged at beacon");
            }
            AppEvent::AnnouncementStopped => {
                info!("ANNOUNCE | session stopped");
            }
            AppEvent::MailQueued { depth } => {
                info!("MAIL | queued, depth={}", depth);
            }
            AppEvent::MailDropped => {
                warn!("MAIL | queue full, oldest item dropped");
            }
            AppEvent::MailOpened => {
                info!("MAIL | mailbox opened");
            }
            AppEvent::MailAdvanced => {
                info!("MAIL | advanced to next item");
            }
            AppEvent::MailDrained => {
                info!("MAIL | queue drained, session closed");
            }
            AppEvent::DirectAudio => {
                info!("AUDIO | direct play accepted");
            }
            AppEvent::PongSent { beacon } => {
                info!("PING | pong sent, beacon={}", beacon);
            }
            AppEvent::RelayForwarded { kind } => {
                info!("RELAY | forwarded {}", kind.as_str());
            }
            AppEvent::RelayFailed { kind } => {
                warn!("RELAY | post failed for {}", kind.as_str());
            }
        }
    }
}
