//! Help-request state machine.
//!
//! Each beacon tracks at most one outstanding help request, which is either
//! its own (raised with the button) or adopted from another beacon's REQ
//! frame so the whole mesh shows the same searching state. The machine is
//! Idle -> Pending -> Claimed, with CANCEL/RESOLVE returning to Idle.
//!
//! Frames arrive several times over the flooded channel; every observation
//! handler is a guarded transition, so re-delivery is a no-op.

use core::fmt::Write as _;

use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{ChannelPort, ChimePort, EventSink, IndicatorPort, PlaybackPort, Rgb};
use crate::config::{
    BeaconConfig, SFX_BUTTON_PATH, SFX_CLAIM_PATH, SFX_DEQUEUE_PATH, SFX_HELP_REQUESTED_PATH,
    SFX_ON_THEIR_WAY_PATH, SFX_RESOLVE_PATH,
};
use crate::error::HelpError;
use crate::protocol::{ColorTag, Frame, RequestId};

/// Pulse colors for observed request-lifecycle events.
const CANCEL_PULSE: Rgb = (255, 64, 64);
const CLAIM_PULSE: Rgb = (0, 200, 0);
const RESOLVE_PULSE: Rgb = (0, 120, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelpState {
    Idle,
    Pending,
    Claimed,
}

/// State machine for the beacon's single outstanding help request.
pub struct HelpRequestCoordinator {
    state: HelpState,
    active_id: RequestId,
    active_color: Option<ColorTag>,
    /// Whether the active request was raised on this beacon.
    own: bool,
    last_send_ms: Option<u32>,
    seq: u16,
    /// Local voice cues queued by a successful request, drained as the
    /// playback device frees up.
    cues: heapless::Deque<&'static str, 4>,
}

impl HelpRequestCoordinator {
    pub const fn new() -> Self {
        Self {
            state: HelpState::Idle,
            active_id: RequestId::new(),
            active_color: None,
            own: false,
            last_send_ms: None,
            seq: 0,
            cues: heapless::Deque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == HelpState::Idle
    }

    pub fn has_own_active(&self) -> bool {
        self.state != HelpState::Idle && self.own
    }

    pub fn active_id(&self) -> Option<&str> {
        (self.state != HelpState::Idle).then_some(self.active_id.as_str())
    }

    /// Color tag of the active request, if any.
    pub fn active_color(&self) -> Option<ColorTag> {
        (self.state != HelpState::Idle)
            .then_some(self.active_color)
            .flatten()
    }

    // -----------------------------------------------------------------
    // Local button operations
    // -----------------------------------------------------------------

    /// Raise a new help request and broadcast it. Returns the minted id
    /// so the caller can forward the request off-mesh as well.
    pub fn request_help(
        &mut self,
        now_ms: u32,
        color: ColorTag,
        cfg: &BeaconConfig,
        channel: &mut impl ChannelPort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<RequestId, HelpError> {
        if self.state != HelpState::Idle {
            return Err(HelpError::NotIdle);
        }
        self.check_cooldown(now_ms, cfg)?;

        let seq = self.seq.wrapping_add(1);
        let mut id = RequestId::new();
        // 32 bytes always fits "LHnn-<u32>-<u16>".
        let _ = write!(id, "LH{:02}-{}-{}", cfg.beacon_number, now_ms / 1000, seq);

        let frame = Frame::Req {
            id: id.clone(),
            beacon: cfg.beacon_number,
            timestamp: now_ms / 1000,
            color: Some(color),
        };
        if !channel.send(&frame.encode()) {
            return Err(HelpError::SendFailed);
        }

        self.seq = seq;
        self.last_send_ms = Some(now_ms);
        self.state = HelpState::Pending;
        self.own = true;
        self.active_id = id.clone();
        self.active_color = Some(color);

        indicator.set_idle_color(color.rgb());
        indicator.set_orbit(true, cfg.help_orbit_interval_ms);

        // Click + confirmation voice, played back-to-back once the device
        // is free.
        let _ = self.cues.push_back(SFX_BUTTON_PATH);
        let _ = self.cues.push_back(SFX_HELP_REQUESTED_PATH);

        sink.emit(&AppEvent::HelpRequested { id: id.clone() });
        Ok(id)
    }

    /// Cancel the active request (own or adopted) and broadcast the
    /// CANCEL. Not cooldown-gated; the send still starts a fresh
    /// cooldown window for the next request.
    pub fn cancel_help(
        &mut self,
        now_ms: u32,
        cfg: &BeaconConfig,
        channel: &mut impl ChannelPort,
        playback: &mut impl PlaybackPort,
        chime: &mut impl ChimePort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<RequestId, HelpError> {
        if self.state == HelpState::Idle {
            return Err(HelpError::NoActiveRequest);
        }

        let frame = Frame::Cancel {
            id: self.active_id.clone(),
            beacon: cfg.beacon_number,
            timestamp: now_ms / 1000,
        };
        if !channel.send(&frame.encode()) {
            return Err(HelpError::SendFailed);
        }

        self.last_send_ms = Some(now_ms);
        let id = core::mem::take(&mut self.active_id);
        self.clear(cfg, indicator);
        indicator.pulse(CANCEL_PULSE);
        effect(playback, chime, SFX_DEQUEUE_PATH);
        sink.emit(&AppEvent::HelpCancelled { id: id.clone() });
        Ok(id)
    }

    // -----------------------------------------------------------------
    // Observed frames
    // -----------------------------------------------------------------

    /// Another beacon (or a re-delivery) raised a request.
    pub fn on_req(
        &mut self,
        id: &RequestId,
        beacon: u8,
        color: Option<ColorTag>,
        cfg: &BeaconConfig,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        match self.state {
            HelpState::Idle => {
                self.state = HelpState::Pending;
                self.own = false;
                self.active_id = id.clone();
                self.active_color = color;
                if let Some(c) = color {
                    indicator.set_idle_color(c.rgb());
                }
                indicator.set_orbit(true, cfg.help_orbit_interval_ms);
                sink.emit(&AppEvent::HelpAdopted {
                    id: id.clone(),
                    beacon,
                });
            }
            // Re-delivery of the request we already track, or a second
            // request while one is active. Either way, nothing to do.
            _ => debug!("REQ {id} ignored, request active"),
        }
    }

    pub fn on_cancel(
        &mut self,
        id: &RequestId,
        cfg: &BeaconConfig,
        playback: &mut impl PlaybackPort,
        chime: &mut impl ChimePort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        if !self.matches(id) {
            return;
        }
        let id = core::mem::take(&mut self.active_id);
        self.clear(cfg, indicator);
        indicator.pulse(CANCEL_PULSE);
        effect(playback, chime, SFX_DEQUEUE_PATH);
        sink.emit(&AppEvent::HelpCancelled { id });
    }

    pub fn on_claim(
        &mut self,
        id: &RequestId,
        beacon: u8,
        playback: &mut impl PlaybackPort,
        chime: &mut impl ChimePort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        if !self.matches(id) || self.state != HelpState::Pending {
            return;
        }
        self.state = HelpState::Claimed;
        indicator.set_orbit(false, 0);
        indicator.pulse(CLAIM_PULSE);
        effect(playback, chime, SFX_CLAIM_PATH);
        sink.emit(&AppEvent::HelpClaimed {
            id: id.clone(),
            beacon,
        });
    }

    pub fn on_resolve(
        &mut self,
        id: &RequestId,
        cfg: &BeaconConfig,
        playback: &mut impl PlaybackPort,
        chime: &mut impl ChimePort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        if !self.matches(id) {
            return;
        }
        let id = core::mem::take(&mut self.active_id);
        self.clear(cfg, indicator);
        indicator.pulse(RESOLVE_PULSE);
        effect(playback, chime, SFX_RESOLVE_PATH);
        sink.emit(&AppEvent::HelpResolved { id });
    }

    /// A responder sent progress details for the active request.
    pub fn on_details(
        &mut self,
        id: &RequestId,
        beacon: u8,
        playback: &mut impl PlaybackPort,
        sink: &mut impl EventSink,
    ) {
        if !self.matches(id) {
            return;
        }
        if !playback.is_playing() {
            let _ = playback.play_file(SFX_ON_THEIR_WAY_PATH);
        }
        sink.emit(&AppEvent::ResponderDetails {
            id: id.clone(),
            beacon,
        });
    }

    // -----------------------------------------------------------------
    // Tick work
    // -----------------------------------------------------------------

    /// Play the next queued local cue if the device is free.
    pub fn drain_cues(&mut self, playback: &mut impl PlaybackPort) {
        if playback.is_playing() {
            return;
        }
        if let Some(path) = self.cues.pop_front() {
            let _ = playback.play_file(path);
        }
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn matches(&self, id: &RequestId) -> bool {
        self.state != HelpState::Idle && self.active_id == *id
    }

    fn check_cooldown(&self, now_ms: u32, cfg: &BeaconConfig) -> Result<(), HelpError> {
        match self.last_send_ms {
            Some(last) if now_ms.wrapping_sub(last) < cfg.button_cooldown_ms => {
                Err(HelpError::Cooldown)
            }
            _ => Ok(()),
        }
    }

    fn clear(&mut self, cfg: &BeaconConfig, indicator: &mut impl IndicatorPort) {
        self.state = HelpState::Idle;
        self.own = false;
        self.active_id.clear();
        self.active_color = None;
        indicator.set_orbit(false, 0);
        indicator.set_idle_color(cfg.idle_rgb);
    }
}

impl Default for HelpRequestCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Play a one-shot effect if the device is free, falling back to the chime.
fn effect(playback: &mut impl PlaybackPort, chime: &mut impl ChimePort, path: &str) {
    if playback.is_playing() {
        return;
    }
    if !playback.play_file(path) {
        chime.play_message_chime();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::mock::{MockChannel, MockChime, MockIndicator, MockPlayback, MockSink};

    fn rid(s: &str) -> RequestId {
        RequestId::try_from(s).unwrap()
    }

    struct Rig {
        cfg: BeaconConfig,
        help: HelpRequestCoordinator,
        channel: MockChannel,
        playback: MockPlayback,
        chime: MockChime,
        indicator: MockIndicator,
        sink: MockSink,
    }

    impl Rig {
        fn new() -> Self {
            let mut cfg = BeaconConfig::default();
            cfg.beacon_number = 3;
            Self {
                cfg,
                help: HelpRequestCoordinator::new(),
                channel: MockChannel::default(),
                playback: MockPlayback::default(),
                chime: MockChime::default(),
                indicator: MockIndicator::default(),
                sink: MockSink::default(),
            }
        }

        fn request(&mut self, now: u32) -> Result<RequestId, HelpError> {
            self.help.request_help(
                now,
                ColorTag::Green,
                &self.cfg,
                &mut self.channel,
                &mut self.indicator,
                &mut self.sink,
            )
        }

        fn cancel(&mut self, now: u32) -> Result<RequestId, HelpError> {
            self.help.cancel_help(
                now,
                &self.cfg,
                &mut self.channel,
                &mut self.playback,
                &mut self.chime,
                &mut self.indicator,
                &mut self.sink,
            )
        }
    }

    #[test]
    fn request_broadcasts_req_frame_and_starts_orbit() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();

        assert_eq!(r.channel.sent.len(), 1);
        assert!(r.channel.sent[0].starts_with("HELP|REQ|LH03-5-1|3|5|GREEN"));
        assert_eq!(r.indicator.orbit, Some((true, 120)));
        assert_eq!(r.indicator.idle_color, Some(ColorTag::Green.rgb()));
        assert!(r.help.has_own_active());
    }

    #[test]
    fn second_request_while_active_is_rejected() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        assert_eq!(r.request(60_000), Err(HelpError::NotIdle));
        assert_eq!(r.channel.sent.len(), 1);
    }

    #[test]
    fn cooldown_blocks_rapid_requests() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        r.cancel(5_500).unwrap();
        assert_eq!(r.request(5_600), Err(HelpError::Cooldown));
        r.request(7_600).unwrap();
        assert_eq!(r.channel.sent.len(), 3);
    }

    #[test]
    fn cooldown_survives_timer_wraparound() {
        let mut r = Rig::new();
        r.request(u32::MAX - 500).unwrap();
        r.cancel(u32::MAX - 400).unwrap();
        // 1901 ms later in wrapped time, still inside the 2000 ms window.
        assert_eq!(r.request(1_500), Err(HelpError::Cooldown));
        assert!(r.request(1_600).is_ok());
    }

    #[test]
    fn cancel_is_not_cooldown_gated() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        assert!(r.cancel(5_500).is_ok());
        assert_eq!(r.channel.sent.len(), 2);
    }

    #[test]
    fn send_failure_leaves_state_idle() {
        let mut r = Rig::new();
        r.channel.reject = true;
        assert_eq!(r.request(5_000), Err(HelpError::SendFailed));
        assert!(r.help.is_idle());
    }

    #[test]
    fn cancel_without_request_is_rejected() {
        let mut r = Rig::new();
        assert_eq!(r.cancel(5_000), Err(HelpError::NoActiveRequest));
    }

    #[test]
    fn adopts_remote_request_when_idle() {
        let mut r = Rig::new();
        r.help.on_req(
            &rid("LH07-9-1"),
            7,
            Some(ColorTag::Blue),
            &r.cfg.clone(),
            &mut r.indicator,
            &mut r.sink,
        );
        assert_eq!(r.help.active_id(), Some("LH07-9-1"));
        assert!(!r.help.has_own_active());
        assert_eq!(r.indicator.orbit, Some((true, 120)));
    }

    #[test]
    fn adopted_request_can_be_cancelled_locally() {
        let mut r = Rig::new();
        let cfg = r.cfg.clone();
        r.help.on_req(
            &rid("LH03-9-1"),
            3,
            Some(ColorTag::Blue),
            &cfg,
            &mut r.indicator,
            &mut r.sink,
        );
        let id = r.cancel(9_500).unwrap();
        assert_eq!(id.as_str(), "LH03-9-1");
        assert!(r.help.is_idle());
        assert!(r.channel.sent[0].starts_with("HELP|CANCEL|LH03-9-1|3|9"));
    }

    #[test]
    fn redelivered_req_is_a_noop() {
        let mut r = Rig::new();
        let cfg = r.cfg.clone();
        let id = rid("LH07-9-1");
        r.help
            .on_req(&id, 7, None, &cfg, &mut r.indicator, &mut r.sink);
        let events_before = r.sink.events.len();
        r.help
            .on_req(&id, 7, None, &cfg, &mut r.indicator, &mut r.sink);
        assert_eq!(r.sink.events.len(), events_before);
    }

    #[test]
    fn claim_moves_to_claimed_and_stops_orbit() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        let id = rid(r.help.active_id().unwrap());
        r.help.on_claim(
            &id,
            9,
            &mut r.playback,
            &mut r.chime,
            &mut r.indicator,
            &mut r.sink,
        );
        assert_eq!(r.indicator.orbit, Some((false, 0)));
        assert_eq!(r.indicator.pulses, vec![CLAIM_PULSE]);
        assert_eq!(r.playback.files, vec![SFX_CLAIM_PATH.to_string()]);
        // Second delivery changes nothing.
        r.help.on_claim(
            &id,
            9,
            &mut r.playback,
            &mut r.chime,
            &mut r.indicator,
            &mut r.sink,
        );
        assert_eq!(r.indicator.pulses.len(), 1);
    }

    #[test]
    fn claim_for_unknown_id_is_ignored() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        r.help.on_claim(
            &rid("LH09-1-1"),
            9,
            &mut r.playback,
            &mut r.chime,
            &mut r.indicator,
            &mut r.sink,
        );
        assert!(r.indicator.pulses.is_empty());
    }

    #[test]
    fn resolve_returns_to_idle_and_restores_visuals() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        let cfg = r.cfg.clone();
        let id = rid(r.help.active_id().unwrap());
        r.help.on_resolve(
            &id,
            &cfg,
            &mut r.playback,
            &mut r.chime,
            &mut r.indicator,
            &mut r.sink,
        );
        assert!(r.help.is_idle());
        assert_eq!(r.indicator.idle_color, Some(cfg.idle_rgb));
        assert_eq!(r.indicator.pulses, vec![RESOLVE_PULSE]);
    }

    #[test]
    fn effect_falls_back_to_chime_when_playback_fails() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        let cfg = r.cfg.clone();
        let id = rid(r.help.active_id().unwrap());
        r.playback.reject = true;
        r.help.on_resolve(
            &id,
            &cfg,
            &mut r.playback,
            &mut r.chime,
            &mut r.indicator,
            &mut r.sink,
        );
        assert_eq!(r.chime.chimes, 1);
    }

    #[test]
    fn details_plays_on_their_way_once_free() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        let id = rid(r.help.active_id().unwrap());
        r.playback.playing = true;
        r.help
            .on_details(&id, 9, &mut r.playback, &mut r.sink);
        assert!(r.playback.files.is_empty());
        r.playback.playing = false;
        r.help
            .on_details(&id, 9, &mut r.playback, &mut r.sink);
        assert_eq!(r.playback.files, vec![SFX_ON_THEIR_WAY_PATH.to_string()]);
    }

    #[test]
    fn local_cues_drain_one_per_free_tick() {
        let mut r = Rig::new();
        r.request(5_000).unwrap();
        r.help.drain_cues(&mut r.playback);
        assert_eq!(r.playback.files, vec![SFX_BUTTON_PATH.to_string()]);
        // Device busy with the click; nothing new.
        r.help.drain_cues(&mut r.playback);
        assert_eq!(r.playback.files.len(), 1);
        r.playback.playing = false;
        r.help.drain_cues(&mut r.playback);
        assert_eq!(r.playback.files[1], SFX_HELP_REQUESTED_PATH.to_string());
    }
}
