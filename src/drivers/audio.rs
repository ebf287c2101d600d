//! Audio playback driver over the I2S pipeline component.
//!
//! The decode pipeline (HTTP/MP3 stream reader, file reader, decoder,
//! I2S writer) is an ESP-IDF C component; this driver owns the Rust side
//! of it and implements [`PlaybackPort`]. The component accepts both
//! `http(s)://` stream URLs and SPIFFS file paths through the same entry
//! point.
//!
//! On the host the driver simulates playback: a source "plays" for a
//! fixed wall-clock window so sequencer timing paths stay exercisable in
//! the simulation binary.

use log::debug;

use crate::app::ports::PlaybackPort;

#[cfg(not(target_os = "espidf"))]
const SIM_PLAY_MS: u64 = 1500;

pub struct AudioStreamerDriver {
    #[cfg(not(target_os = "espidf"))]
    sim_started: Option<std::time::Instant>,
}

impl AudioStreamerDriver {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim_started: None,
        }
    }

    /// Playback output level 0.0..=1.0, for the ring's audio wedge.
    #[cfg(target_os = "espidf")]
    pub fn level(&self) -> f32 {
        crate::drivers::hw_init::audio_level()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn level(&self) -> f32 {
        if self.is_playing() { 0.5 } else { 0.0 }
    }

    #[cfg(target_os = "espidf")]
    fn start(&mut self, source: &str) -> bool {
        let Ok(c_source) = std::ffi::CString::new(source) else {
            log::warn!("audio: source contains NUL, refusing: {}", source);
            return false;
        };
        let ok = crate::drivers::hw_init::audio_play(&c_source);
        if !ok {
            log::warn!("audio: pipeline refused source: {}", source);
        }
        ok
    }

    #[cfg(not(target_os = "espidf"))]
    fn start(&mut self, source: &str) -> bool {
        debug!("audio(sim): playing {}", source);
        self.sim_started = Some(std::time::Instant::now());
        true
    }
}

impl Default for AudioStreamerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackPort for AudioStreamerDriver {
    fn play_stream(&mut self, url: &str) -> bool {
        debug!("audio: stream {}", url);
        self.start(url)
    }

    fn play_file(&mut self, path: &str) -> bool {
        self.start(path)
    }

    #[cfg(target_os = "espidf")]
    fn is_playing(&self) -> bool {
        crate::drivers::hw_init::audio_is_playing()
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_playing(&self) -> bool {
        self.sim_started
            .is_some_and(|t| t.elapsed().as_millis() < SIM_PLAY_MS as u128)
    }

    #[cfg(target_os = "espidf")]
    fn stop(&mut self) {
        crate::drivers::hw_init::audio_stop();
    }

    #[cfg(not(target_os = "espidf"))]
    fn stop(&mut self) {
        self.sim_started = None;
    }
}
