//! 12-pixel ring pattern engine.
//!
//! Pure visual-timing logic: setters record indication intents and
//! `tick(now_ms)` computes the per-pixel RGB frame. Writing the frame to
//! the WS2812 bus happens in the ring adapter, which keeps this testable
//! on the host.
//!
//! Layering per frame, top first:
//!
//! 1. one-shot pulse (event flash, fades out)
//! 2. session blink (alert indication)
//! 3. startup spin (boot animation)
//! 4. orbit marker over the idle color (help request searching)
//! 5. audio level wedge over the idle color
//! 6. idle solid color

use crate::app::ports::Rgb;
use crate::pins::RING_PIXELS;

const PULSE_DURATION_MS: u32 = 600;

pub type Frame = [Rgb; RING_PIXELS];

pub struct LightRingEngine {
    idle_color: Rgb,
    pulse: Option<Pulse>,
    blink: Option<Blink>,
    spin: Option<Spin>,
    orbit: Option<Orbit>,
    audio_level: f32,
}

struct Pulse {
    color: Rgb,
    start_ms: u32,
}

struct Blink {
    color: Rgb,
    interval_ms: u32,
    last_toggle_ms: u32,
    on: bool,
}

struct Spin {
    color: Rgb,
    interval_ms: u32,
    last_step_ms: u32,
    index: usize,
}

struct Orbit {
    interval_ms: u32,
    last_step_ms: u32,
    index: usize,
}

impl LightRingEngine {
    pub fn new(idle_color: Rgb) -> Self {
        Self {
            idle_color,
            pulse: None,
            blink: None,
            spin: None,
            orbit: None,
            audio_level: 0.0,
        }
    }

    pub fn set_idle_color(&mut self, color: Rgb) {
        self.idle_color = color;
    }

    /// One-shot flash; fades back out over [`PULSE_DURATION_MS`].
    pub fn pulse(&mut self, color: Rgb, now_ms: u32) {
        self.pulse = Some(Pulse {
            color,
            start_ms: now_ms,
        });
    }

    pub fn set_blinking(&mut self, on: bool, color: Rgb, interval_ms: u16, now_ms: u32) {
        self.blink = on.then_some(Blink {
            color,
            interval_ms: u32::from(interval_ms.max(1)),
            last_toggle_ms: now_ms,
            on: true,
        });
    }

    pub fn set_orbit(&mut self, on: bool, interval_ms: u16, now_ms: u32) {
        self.orbit = on.then_some(Orbit {
            interval_ms: u32::from(interval_ms.max(1)),
            last_step_ms: now_ms,
            index: 0,
        });
    }

    /// Boot animation; runs until [`Self::finish_startup`].
    pub fn start_spin(&mut self, color: Rgb, interval_ms: u16, now_ms: u32) {
        self.spin = Some(Spin {
            color,
            interval_ms: u32::from(interval_ms.max(1)),
            last_step_ms: now_ms,
            index: 0,
        });
    }

    pub fn finish_startup(&mut self) {
        self.spin = None;
    }

    /// Playback level 0.0..=1.0, shown as a lit wedge while non-zero.
    pub fn set_audio_level(&mut self, level: f32) {
        self.audio_level = level.clamp(0.0, 1.0);
    }

    /// Compute the frame for `now_ms`.
    pub fn tick(&mut self, now_ms: u32) -> Frame {
        if let Some(p) = &self.pulse {
            let elapsed = now_ms.wrapping_sub(p.start_ms);
            if elapsed < PULSE_DURATION_MS {
                let fade = 1.0 - elapsed as f32 / PULSE_DURATION_MS as f32;
                return [scale(p.color, fade); RING_PIXELS];
            }
            self.pulse = None;
        }

        if let Some(b) = &mut self.blink {
            if now_ms.wrapping_sub(b.last_toggle_ms) >= b.interval_ms {
                b.on = !b.on;
                b.last_toggle_ms = now_ms;
            }
            return if b.on {
                [b.color; RING_PIXELS]
            } else {
                [(0, 0, 0); RING_PIXELS]
            };
        }

        if let Some(s) = &mut self.spin {
            if now_ms.wrapping_sub(s.last_step_ms) >= s.interval_ms {
                s.index = (s.index + 1) % RING_PIXELS;
                s.last_step_ms = now_ms;
            }
            let mut frame = [(0, 0, 0); RING_PIXELS];
            frame[s.index] = s.color;
            frame[(s.index + RING_PIXELS - 1) % RING_PIXELS] = scale(s.color, 0.3);
            return frame;
        }

        let mut frame = [self.idle_color; RING_PIXELS];

        if let Some(o) = &mut self.orbit {
            if now_ms.wrapping_sub(o.last_step_ms) >= o.interval_ms {
                o.index = (o.index + 1) % RING_PIXELS;
                o.last_step_ms = now_ms;
            }
            frame = [scale(self.idle_color, 0.15); RING_PIXELS];
            frame[o.index] = (255, 255, 255);
            frame[(o.index + RING_PIXELS - 1) % RING_PIXELS] = scale((255, 255, 255), 0.3);
            return frame;
        }

        if self.audio_level > 0.0 {
            let lit = (self.audio_level * RING_PIXELS as f32).ceil() as usize;
            for (i, px) in frame.iter_mut().enumerate() {
                *px = if i < lit {
                    self.idle_color
                } else {
                    scale(self.idle_color, 0.1)
                };
            }
        }

        frame
    }
}

fn scale(color: Rgb, factor: f32) -> Rgb {
    let f = factor.clamp(0.0, 1.0);
    (
        (color.0 as f32 * f) as u8,
        (color.1 as f32 * f) as u8,
        (color.2 as f32 * f) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_is_a_solid_frame() {
        let mut e = LightRingEngine::new((15, 15, 15));
        assert_eq!(e.tick(0), [(15, 15, 15); RING_PIXELS]);
    }

    #[test]
    fn blink_toggles_on_interval() {
        let mut e = LightRingEngine::new((15, 15, 15));
        e.set_blinking(true, (255, 255, 255), 500, 0);
        assert_eq!(e.tick(100), [(255, 255, 255); RING_PIXELS]);
        assert_eq!(e.tick(600), [(0, 0, 0); RING_PIXELS]);
        assert_eq!(e.tick(1_200), [(255, 255, 255); RING_PIXELS]);
    }

    #[test]
    fn pulse_overrides_then_expires() {
        let mut e = LightRingEngine::new((15, 15, 15));
        e.pulse((0, 200, 0), 1_000);
        let bright = e.tick(1_000);
        assert_eq!(bright[0], (0, 200, 0));
        let faded = e.tick(1_300);
        assert!(faded[0].1 < 200);
        assert_eq!(e.tick(1_700), [(15, 15, 15); RING_PIXELS]);
    }

    #[test]
    fn orbit_moves_the_marker() {
        let mut e = LightRingEngine::new((15, 15, 15));
        e.set_orbit(true, 120, 0);
        let f0 = e.tick(50);
        assert_eq!(f0[0], (255, 255, 255));
        let f1 = e.tick(200);
        assert_eq!(f1[1], (255, 255, 255));
        assert_ne!(f1[0], (255, 255, 255));
    }

    #[test]
    fn orbit_clears_back_to_idle() {
        let mut e = LightRingEngine::new((15, 15, 15));
        e.set_orbit(true, 120, 0);
        e.tick(50);
        e.set_orbit(false, 0, 100);
        assert_eq!(e.tick(150), [(15, 15, 15); RING_PIXELS]);
    }

    #[test]
    fn audio_level_lights_a_wedge() {
        let mut e = LightRingEngine::new((100, 100, 100));
        e.set_audio_level(0.5);
        let f = e.tick(0);
        assert_eq!(f[5], (100, 100, 100));
        assert_ne!(f[6], (100, 100, 100));
    }
}
