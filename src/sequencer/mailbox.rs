//! Queued-audio mailbox session.
//!
//! MAIL frames enqueue playback URLs into a bounded queue. An unopened
//! mailbox blinks the ring and repeats the alert cue on a long interval;
//! the button opens it and messages drain one per press (or automatically
//! a few seconds after each end tone). Draining pops the newest item
//! first, which after an overflow is the right one to hear.
//!
//! Alert cues are deliberately tone-free; only real messages get the
//! end-of-message tone. While an announcement session is running the
//! mailbox stays dormant: it keeps its queue and accepts new items, but
//! issues no playback or ring calls until the announcement ends.

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, IndicatorPort, PlaybackPort};
use crate::config::{BeaconConfig, EOM_PATH, MAILBOX_QUEUE_SIZE, MAIL_ALERT_PATH};
use crate::protocol::Url;
use crate::sequencer::{elapsed, ALERT_BLINK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Waiting,
    Playing,
    EomPending,
    EomPlaying,
}

pub struct MailboxSequencer {
    active: bool,
    open: bool,
    phase: Phase,
    queue: heapless::Vec<Url, MAILBOX_QUEUE_SIZE>,
    current: Url,
    can_advance: bool,
    /// Whether the ring blink is currently asserted for this session.
    alert_visual: bool,
    wait_start_ms: u32,
    wait_delay_ms: u32,
}

impl MailboxSequencer {
    pub const fn new() -> Self {
        Self {
            active: false,
            open: false,
            phase: Phase::Waiting,
            queue: heapless::Vec::new(),
            current: Url::new(),
            can_advance: false,
            alert_visual: false,
            wait_start_ms: 0,
            wait_delay_ms: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.queue.len()
    }

    /// Queue a message and make sure a session exists. Sessions start
    /// dormant (no ring calls); the first tick without an announcement in
    /// the way arms the alert blink.
    pub fn enqueue(&mut self, url: &Url, now_ms: u32, sink: &mut impl EventSink) {
        if url.is_empty() {
            return;
        }
        if self.queue.is_full() {
            self.queue.remove(0);
            sink.emit(&AppEvent::MailDropped);
        }
        // Capacity was just ensured.
        let _ = self.queue.push(url.clone());
        sink.emit(&AppEvent::MailQueued {
            depth: self.queue.len(),
        });

        if !self.active {
            self.active = true;
            self.open = false;
            self.phase = Phase::Waiting;
            self.can_advance = false;
            self.alert_visual = false;
            self.current.clear();
            self.wait_start_ms = now_ms;
            self.wait_delay_ms = 0;
        }
    }

    /// Button press routed to this session. Returns `false` when no
    /// session is active.
    pub fn handle_button(
        &mut self,
        now_ms: u32,
        cfg: &BeaconConfig,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.active {
            return false;
        }
        if !self.open {
            self.open = true;
            self.can_advance = false;
            self.phase = Phase::Waiting;
            self.wait_start_ms = now_ms;
            self.wait_delay_ms = 0;
            self.alert_visual = false;
            indicator.set_blinking(false, ALERT_BLINK, cfg.alert_blink_interval_ms);
            sink.emit(&AppEvent::MailOpened);
            return true;
        }
        if self.can_advance {
            // Skip the auto-advance wait; the next tick dequeues.
            self.can_advance = false;
            self.phase = Phase::Waiting;
            self.wait_start_ms = now_ms;
            self.wait_delay_ms = 0;
            self.current.clear();
        }
        // Presses mid-message are consumed without effect.
        true
    }

    /// Advance the session one tick. Fully gated while an announcement
    /// session owns the device and the ring.
    pub fn tick(
        &mut self,
        now_ms: u32,
        cfg: &BeaconConfig,
        announcement_active: bool,
        playback: &mut impl PlaybackPort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        if !self.active {
            return;
        }
        if announcement_active {
            self.alert_visual = false;
            return;
        }
        if !self.open && !self.alert_visual {
            self.alert_visual = true;
            indicator.set_blinking(true, ALERT_BLINK, cfg.alert_blink_interval_ms);
        }

        let playing = playback.is_playing();

        match self.phase {
            Phase::Playing => {
                if !playing {
                    if self.open {
                        self.phase = Phase::EomPending;
                        self.wait_start_ms = now_ms;
                        self.wait_delay_ms = cfg.eom_delay_ms;
                        self.can_advance = false;
                    } else {
                        // Alert cues repeat without an end tone.
                        self.phase = Phase::Waiting;
                        self.wait_start_ms = now_ms;
                        self.wait_delay_ms = cfg.mail_alert_interval_ms;
                    }
                }
            }
            Phase::EomPending => {
                if !playing && elapsed(now_ms, self.wait_start_ms, self.wait_delay_ms) {
                    if playback.play_file(EOM_PATH) {
                        self.phase = Phase::EomPlaying;
                    }
                }
            }
            Phase::EomPlaying => {
                if !playing {
                    // Message fully delivered; auto-advance after the
                    // window unless the button gets there first.
                    self.phase = Phase::Waiting;
                    self.can_advance = true;
                    self.current.clear();
                    self.wait_start_ms = now_ms;
                    self.wait_delay_ms = cfg.mail_advance_delay_ms;
                }
            }
            Phase::Waiting => {
                if playing || !elapsed(now_ms, self.wait_start_ms, self.wait_delay_ms) {
                    return;
                }
                if self.open {
                    if self.current.is_empty() {
                        match self.queue.pop() {
                            Some(next) => {
                                self.current = next;
                                self.can_advance = false;
                                sink.emit(&AppEvent::MailAdvanced);
                            }
                            None => {
                                self.stop(cfg, playback, indicator);
                                sink.emit(&AppEvent::MailDrained);
                                return;
                            }
                        }
                    }
                    if playback.play_stream(&self.current) {
                        self.phase = Phase::Playing;
                    }
                } else if playback.play_file(MAIL_ALERT_PATH) {
                    self.phase = Phase::Playing;
                }
            }
        }
    }

    /// End the session, dropping any queued items and silencing the
    /// device. Idle ring visuals are the coordinator's job.
    pub fn stop(
        &mut self,
        cfg: &BeaconConfig,
        playback: &mut impl PlaybackPort,
        indicator: &mut impl IndicatorPort,
    ) {
        self.active = false;
        self.open = false;
        self.can_advance = false;
        self.alert_visual = false;
        self.phase = Phase::Waiting;
        self.queue.clear();
        self.current.clear();
        playback.stop();
        indicator.set_blinking(false, ALERT_BLINK, cfg.alert_blink_interval_ms);
    }
}

impl Default for MailboxSequencer {
    fn default() -> Self {
        Self::new()
    }
}
