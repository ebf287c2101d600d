//! Structured events emitted by the coordination core.
//!
//! The core never logs directly; it emits these through an [`EventSink`]
//! so tests can assert on behavior and the firmware can route them to the
//! logger (or later, telemetry).
//!
//! [`EventSink`]: crate::app::ports::EventSink

use crate::protocol::{FrameKind, RequestId};

/// Things the coordination core wants the outside world to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // --- Help requests ---
    HelpRequested { id: RequestId },
    HelpAdopted { id: RequestId, beacon: u8 },
    HelpCancelled { id: RequestId },
    HelpClaimed { id: RequestId, beacon: u8 },
    HelpResolved { id: RequestId },
    ResponderDetails { id: RequestId, beacon: u8 },

    // --- Audio sessions ---
    AnnouncementStarted,
    AnnouncementAcknowledged,
    AnnouncementStopped,
    MailQueued { depth: usize },
    MailDropped,
    MailOpened,
    MailAdvanced,
    MailDrained,
    DirectAudio,

    // --- Mesh / relay ---
    PongSent { beacon: u8 },
    RelayForwarded { kind: FrameKind },
    RelayFailed { kind: FrameKind },
}
