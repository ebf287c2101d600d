//! Piezo chime driver (LEDC tone generator).
//!
//! Fallback cue for when the audio pipeline is busy or a cue file fails
//! to play: a short two-note chirp on the piezo. The port method only
//! arms the chirp; `tick()` runs the note sequence from the main loop so
//! nothing blocks.

use log::debug;

use crate::app::ports::ChimePort;
use crate::drivers::hw_init;

// Two-note chirp timeline, ms from chirp start.
const NOTE1_HZ: u32 = 880;
const NOTE2_HZ: u32 = 1320;
const NOTE1_END_MS: u32 = 120;
const GAP_END_MS: u32 = 180;
const CHIRP_END_MS: u32 = 300;

// 10-bit LEDC resolution; 50% duty is the loudest square wave.
const TONE_DUTY: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChirpState {
    Silent,
    Armed,
    Sounding { start_ms: u32 },
}

pub struct ChimeDriver {
    state: ChirpState,
}

impl ChimeDriver {
    pub fn new() -> Self {
        Self {
            state: ChirpState::Silent,
        }
    }

    /// Call from the main loop at each control tick.
    pub fn tick(&mut self, now_ms: u32) {
        match self.state {
            ChirpState::Silent => {}
            ChirpState::Armed => {
                hw_init::ledc_set_freq(NOTE1_HZ);
                hw_init::ledc_set(TONE_DUTY);
                self.state = ChirpState::Sounding { start_ms: now_ms };
            }
            ChirpState::Sounding { start_ms } => {
                let at = now_ms.wrapping_sub(start_ms);
                if at >= CHIRP_END_MS {
                    hw_init::ledc_set(0);
                    self.state = ChirpState::Silent;
                } else if at >= GAP_END_MS {
                    hw_init::ledc_set_freq(NOTE2_HZ);
                    hw_init::ledc_set(TONE_DUTY);
                } else if at >= NOTE1_END_MS {
                    hw_init::ledc_set(0);
                }
            }
        }
    }
}

impl Default for ChimeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChimePort for ChimeDriver {
    fn play_message_chime(&mut self) {
        debug!("chime: chirp armed");
        // Re-arming mid-chirp restarts the sequence on the next tick.
        self.state = ChirpState::Armed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chirp_runs_to_completion() {
        let mut chime = ChimeDriver::new();
        chime.play_message_chime();
        assert_eq!(chime.state, ChirpState::Armed);
        chime.tick(1_000);
        assert_eq!(chime.state, ChirpState::Sounding { start_ms: 1_000 });
        chime.tick(1_150); // gap
        chime.tick(1_200); // second note
        chime.tick(1_350); // done
        assert_eq!(chime.state, ChirpState::Silent);
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let mut chime = ChimeDriver::new();
        chime.tick(5_000);
        assert_eq!(chime.state, ChirpState::Silent);
    }
}
