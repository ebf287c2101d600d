//! Port traits between the coordination core and the hardware adapters.
//!
//! The core is pure state-machine logic; everything with a side effect
//! (radio, speaker, ring, HTTP) sits behind one of these traits. Adapters
//! implement them against ESP-IDF; tests implement them with recording
//! mocks. All methods are infallible-or-bool: on a lossy mesh the caller
//! can rarely do more with a failure than shrug and retry next tick, so
//! the richer error types stay inside the subsystems that can act on them.

use crate::app::events::AppEvent;

/// Ring/indicator color.
pub type Rgb = (u8, u8, u8);

/// Broadcast side of the mesh channel.
pub trait ChannelPort {
    /// Queue `text` for flood broadcast. `false` means the radio refused
    /// the frame (busy, not joined); the frame is not retried here.
    fn send(&mut self, text: &str) -> bool;
}

/// The single audio output device (stream decoder + file player).
pub trait PlaybackPort {
    fn play_stream(&mut self, url: &str) -> bool;
    fn play_file(&mut self, path: &str) -> bool;
    fn is_playing(&self) -> bool;
    fn stop(&mut self);
}

/// Fallback cue device for when the main playback path fails.
pub trait ChimePort {
    fn play_message_chime(&mut self);
}

/// 12-pixel ring indication, expressed as intents rather than pixels.
pub trait IndicatorPort {
    /// Enable or disable session-alert blinking in `color`.
    fn set_blinking(&mut self, on: bool, color: Rgb, interval_ms: u16);
    /// Color shown when no overlay animation is active.
    fn set_idle_color(&mut self, color: Rgb);
    /// One-shot flash acknowledging a discrete event.
    fn pulse(&mut self, color: Rgb);
    /// Rotating "searching" marker while a help request is unclaimed.
    fn set_orbit(&mut self, on: bool, interval_ms: u16);
}

/// Off-mesh HTTP relay uplink.
pub trait RelayPort {
    /// Whether this beacon has a configured, associated uplink.
    fn is_enabled(&self) -> bool;
    /// Post `text` upstream attributed to `sender`. Bounded by the
    /// adapter's HTTP timeout; `false` on any failure.
    fn post(&mut self, text: &str, sender: &str) -> bool;
}

/// Receives structured events from the core.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
