//! Timed audio session machines.
//!
//! Both sequencers share the same skeleton: a phase enum advanced once per
//! tick, timers held as (start, delay) pairs compared with `wrapping_sub`,
//! and exactly one playback call per eligible window. The playback device
//! is shared with help cues, so every phase first checks `is_playing()`
//! and waits rather than preempting.

pub mod announcement;
pub mod mailbox;

pub use announcement::AnnouncementSequencer;
pub use mailbox::MailboxSequencer;

use crate::app::ports::Rgb;

/// Session-alert blink color.
pub(crate) const ALERT_BLINK: Rgb = (255, 255, 255);

/// Wraparound-safe "has `delay` elapsed since `start`".
pub(crate) fn elapsed(now_ms: u32, start_ms: u32, delay_ms: u32) -> bool {
    now_ms.wrapping_sub(start_ms) >= delay_ms
}
