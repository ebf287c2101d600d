//! LED ring adapter.
//!
//! Implements [`IndicatorPort`] on top of the pure
//! [`LightRingEngine`] pattern engine. The port methods record
//! indication intents against the last rendered tick time; `render()`
//! computes the frame and pushes it to the WS2812 bus (a no-op on the
//! host).

use crate::app::ports::{IndicatorPort, Rgb};
use crate::drivers::hw_init;
use crate::drivers::light_ring::LightRingEngine;

pub struct RingAdapter {
    engine: LightRingEngine,
    now_ms: u32,
}

impl RingAdapter {
    pub fn new(idle_color: Rgb) -> Self {
        Self {
            engine: LightRingEngine::new(idle_color),
            now_ms: 0,
        }
    }

    /// Boot animation until [`Self::finish_startup`].
    pub fn start_spin(&mut self, color: Rgb, interval_ms: u16) {
        self.engine.start_spin(color, interval_ms, self.now_ms);
    }

    pub fn finish_startup(&mut self) {
        self.engine.finish_startup();
    }

    /// Playback level for the audio wedge, 0.0..=1.0.
    pub fn set_audio_level(&mut self, level: f32) {
        self.engine.set_audio_level(level);
    }

    /// Compute and write the frame for `now_ms`.
    /// Call once per control tick.
    pub fn render(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
        let frame = self.engine.tick(now_ms);
        hw_init::ring_write(&frame);
    }
}

impl IndicatorPort for RingAdapter {
    fn set_blinking(&mut self, on: bool, color: Rgb, interval_ms: u16) {
        self.engine.set_blinking(on, color, interval_ms, self.now_ms);
    }

    fn set_idle_color(&mut self, color: Rgb) {
        self.engine.set_idle_color(color);
    }

    fn pulse(&mut self, color: Rgb) {
        self.engine.pulse(color, self.now_ms);
    }

    fn set_orbit(&mut self, on: bool, interval_ms: u16) {
        self.engine.set_orbit(on, interval_ms, self.now_ms);
    }
}
