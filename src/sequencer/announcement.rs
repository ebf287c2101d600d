//! One-shot acknowledged announcement session.
//!
//! Cycle: a new announcement blinks the ring and repeats a short alert cue
//! until someone presses the button. The press acknowledges the session,
//! stops the blinking, and plays the announcement body as soon as the
//! device is free. After each *acknowledged* full cycle (body + end tone)
//! the session becomes stoppable and the body replays on a short interval
//! until a further press ends it.
//!
//! Every completed playback is followed by the end-of-message tone after a
//! short pause, including the alert cue repeats.

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, IndicatorPort, PlaybackPort};
use crate::config::{BeaconConfig, EOM_PATH, MAIL_ALERT_PATH};
use crate::protocol::Url;
use crate::sequencer::{elapsed, ALERT_BLINK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No audio in flight; next play fires once `wait_delay_ms` elapses.
    Waiting,
    /// Alert cue or body started on the device.
    Playing,
    /// Playback finished; end tone due after the pause.
    EomPending,
    /// End tone started on the device.
    EomPlaying,
}

pub struct AnnouncementSequencer {
    active: bool,
    phase: Phase,
    url: Url,
    acknowledged: bool,
    can_stop: bool,
    wait_start_ms: u32,
    wait_delay_ms: u32,
}

impl AnnouncementSequencer {
    pub const fn new() -> Self {
        Self {
            active: false,
            phase: Phase::Waiting,
            url: Url::new(),
            acknowledged: false,
            can_stop: false,
            wait_start_ms: 0,
            wait_delay_ms: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start (or restart) a session for `url`. Replaces any session in
    /// progress; an ANNOUNCE re-delivery simply restarts the alert cycle.
    pub fn begin(
        &mut self,
        url: &Url,
        now_ms: u32,
        cfg: &BeaconConfig,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        if url.is_empty() {
            return;
        }
        self.active = true;
        self.phase = Phase::Waiting;
        self.url = url.clone();
        self.acknowledged = false;
        self.can_stop = false;
        self.wait_start_ms = now_ms;
        self.wait_delay_ms = 0;
        indicator.set_blinking(true, ALERT_BLINK, cfg.alert_blink_interval_ms);
        sink.emit(&AppEvent::AnnouncementStarted);
    }

    /// Button press routed to this session. Returns `false` when no
    /// session is active (the press belongs to someone else).
    pub fn handle_button(
        &mut self,
        now_ms: u32,
        cfg: &BeaconConfig,
        playback: &mut impl PlaybackPort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.active {
            return false;
        }
        if !self.acknowledged {
            self.acknowledged = true;
            self.can_stop = false;
            // If the alert cue is mid-play, skip its end tone and go
            // straight to the body once the device frees up. An end-tone
            // cycle already in flight is left to finish.
            if matches!(self.phase, Phase::Waiting | Phase::Playing) {
                self.phase = Phase::Waiting;
                self.wait_start_ms = now_ms;
                self.wait_delay_ms = 0;
            }
            indicator.set_blinking(false, ALERT_BLINK, cfg.alert_blink_interval_ms);
            sink.emit(&AppEvent::AnnouncementAcknowledged);
            return true;
        }
        if self.can_stop {
            self.stop(cfg, playback, indicator);
            sink.emit(&AppEvent::AnnouncementStopped);
        }
        // Mid-replay presses are consumed without effect.
        true
    }

    /// End the session and silence the device. Idle ring visuals are the
    /// coordinator's job (it knows the help-request color).
    pub fn stop(
        &mut self,
        cfg: &BeaconConfig,
        playback: &mut impl PlaybackPort,
        indicator: &mut impl IndicatorPort,
    ) {
        self.active = false;
        self.acknowledged = false;
        self.can_stop = false;
        self.phase = Phase::Waiting;
        self.url.clear();
        playback.stop();
        indicator.set_blinking(false, ALERT_BLINK, cfg.alert_blink_interval_ms);
    }

    /// Advance the session one tick.
    pub fn tick(
        &mut self,
        now_ms: u32,
        cfg: &BeaconConfig,
        playback: &mut impl PlaybackPort,
    ) {
        if !self.active {
            return;
        }
        let playing = playback.is_playing();

        match self.phase {
            Phase::Playing => {
                if !playing {
                    self.phase = Phase::EomPending;
                    self.wait_start_ms = now_ms;
                    self.wait_delay_ms = cfg.eom_delay_ms;
                    if self.acknowledged {
                        self.can_stop = false;
                    }
                }
            }
            Phase::EomPending => {
                if !playing && elapsed(now_ms, self.wait_start_ms, self.wait_delay_ms) {
                    // Device-busy or a failed open just retries next tick.
                    if playback.play_file(EOM_PATH) {
                        self.phase = Phase::EomPlaying;
                    }
                }
            }
            Phase::EomPlaying => {
                if !playing {
                    self.phase = Phase::Waiting;
                    self.wait_start_ms = now_ms;
                    if self.acknowledged {
                        self.can_stop = true;
                        self.wait_delay_ms = cfg.announce_replay_delay_ms;
                    } else {
                        self.wait_delay_ms = cfg.announce_alert_interval_ms;
                    }
                }
            }
            Phase::Waiting => {
                if playing || !elapsed(now_ms, self.wait_start_ms, self.wait_delay_ms) {
                    return;
                }
                let started = if self.acknowledged {
                    playback.play_stream(&self.url)
                } else {
                    playback.play_file(MAIL_ALERT_PATH)
                };
                if started {
                    self.phase = Phase::Playing;
                }
            }
        }
    }
}

impl Default for AnnouncementSequencer {
    fn default() -> Self {
        Self::new()
    }
}
