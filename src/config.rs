//! Beacon configuration parameters.
//!
//! All tunable parameters for a lighthouse beacon. Values are compiled-in
//! defaults; deployments override `beacon_number` (and optionally the Wi-Fi
//! credentials / relay endpoint) per device at provisioning time.

use serde::{Deserialize, Serialize};

/// Core beacon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// This beacon's number on the mesh (1-30).
    pub beacon_number: u8,

    // --- Help requests ---
    /// Minimum gap between locally-sent help frames (ms).
    pub button_cooldown_ms: u32,
    /// Orbit indicator step interval while a request is searching (ms).
    pub help_orbit_interval_ms: u16,

    // --- Announcement ---
    /// Alert-cue repeat interval while unacknowledged (ms).
    pub announce_alert_interval_ms: u32,
    /// Replay delay for an acknowledged announcement body (ms).
    pub announce_replay_delay_ms: u32,

    // --- Mailbox ---
    /// Alert-cue repeat interval for an unopened mailbox (ms).
    pub mail_alert_interval_ms: u32,
    /// Window after the end tone before auto-advancing to the next item (ms).
    pub mail_advance_delay_ms: u32,

    // --- Shared playback timing ---
    /// Pause between a message ending and the end-of-message tone (ms).
    pub eom_delay_ms: u32,
    /// Blink interval for session alert indication (ms).
    pub alert_blink_interval_ms: u16,

    // --- Visuals ---
    /// Ring color when nothing is happening (R, G, B).
    pub idle_rgb: (u8, u8, u8),

    // --- Off-mesh relay ---
    /// Relay endpoint URL; `None` disables forwarding on this beacon.
    pub relay_url: Option<heapless::String<128>>,
    /// HTTP timeout for a single relay post (ms).
    pub relay_timeout_ms: u32,

    // --- Wi-Fi (relay uplink) ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            beacon_number: 1,

            button_cooldown_ms: 2_000,
            help_orbit_interval_ms: 120,

            announce_alert_interval_ms: 5_000,
            announce_replay_delay_ms: 3_000,

            mail_alert_interval_ms: 10_000,
            mail_advance_delay_ms: 3_000,

            eom_delay_ms: 500,
            alert_blink_interval_ms: 500,

            idle_rgb: (15, 15, 15),

            relay_url: None,
            relay_timeout_ms: 4_000,

            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
        }
    }
}

impl BeaconConfig {
    /// Node name announced on the mesh and to the relay, e.g. `Lighthouse-7`.
    pub fn node_name(&self) -> heapless::String<32> {
        let mut name = heapless::String::new();
        // 32 bytes always fits "Lighthouse-" plus a u8.
        let _ = core::fmt::write(&mut name, format_args!("Lighthouse-{}", self.beacon_number));
        name
    }
}

// --- Sound effect paths (LittleFS) ---

pub const SFX_BUTTON_PATH: &str = "/sfx/button.wav";
pub const SFX_CLAIM_PATH: &str = "/sfx/claim.wav";
pub const SFX_RESOLVE_PATH: &str = "/sfx/resolve.wav";
pub const SFX_DEQUEUE_PATH: &str = "/sfx/dequeue.wav";
pub const SFX_HELP_REQUESTED_PATH: &str = "/sfx/you_have_requested_help.wav";
pub const SFX_ON_THEIR_WAY_PATH: &str = "/sfx/mentour_on_their_way.wav";
pub const MAIL_ALERT_PATH: &str = "/sfx/mail_alert.wav";
pub const EOM_PATH: &str = "/sfx/eom.wav";

/// Mailbox queue depth. Oldest entries are evicted once full.
pub const MAILBOX_QUEUE_SIZE: usize = 8;
