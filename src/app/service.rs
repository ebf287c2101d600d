//! Top-level coordinator.
//!
//! Owns every state machine and routes the three external stimuli into
//! them: the periodic tick, decoded channel frames, and button gestures.
//! All methods take the ports they touch; the coordinator itself holds no
//! hardware handles, which keeps the whole thing testable on the host.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{
    ChannelPort, ChimePort, EventSink, IndicatorPort, PlaybackPort, RelayPort,
};
use crate::config::BeaconConfig;
use crate::error::HelpError;
use crate::help::HelpRequestCoordinator;
use crate::protocol::{ColorTag, Frame, FrameKind};
use crate::relay::RelayGateway;
use crate::sequencer::{AnnouncementSequencer, MailboxSequencer};

pub struct Coordinator {
    cfg: BeaconConfig,
    node_name: heapless::String<32>,
    help: HelpRequestCoordinator,
    announcement: AnnouncementSequencer,
    mailbox: MailboxSequencer,
    relay: RelayGateway,
}

impl Coordinator {
    pub fn new(cfg: BeaconConfig) -> Self {
        let node_name = cfg.node_name();
        Self {
            cfg,
            node_name,
            help: HelpRequestCoordinator::new(),
            announcement: AnnouncementSequencer::new(),
            mailbox: MailboxSequencer::new(),
            relay: RelayGateway::new(),
        }
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.cfg
    }

    /// Advance all machines one tick. Announcement goes first; the
    /// mailbox is fully gated while it runs.
    pub fn tick(
        &mut self,
        now_ms: u32,
        playback: &mut impl PlaybackPort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        self.announcement.tick(now_ms, &self.cfg, playback);

        let was_active = self.mailbox.is_active();
        self.mailbox.tick(
            now_ms,
            &self.cfg,
            self.announcement.is_active(),
            playback,
            indicator,
            sink,
        );
        if was_active && !self.mailbox.is_active() {
            self.restore_idle_visuals(indicator);
        }

        // Local voice cues ride the gaps between session audio.
        if !self.announcement.is_active() {
            self.help.drain_cues(playback);
        }
    }

    /// Decode and dispatch one channel payload. Anything malformed is
    /// consumed without effect.
    #[allow(clippy::too_many_arguments)]
    pub fn on_channel_text(
        &mut self,
        text: &str,
        now_ms: u32,
        channel: &mut impl ChannelPort,
        playback: &mut impl PlaybackPort,
        chime: &mut impl ChimePort,
        indicator: &mut impl IndicatorPort,
        relay: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        let Some(frame) = Frame::decode(text) else {
            debug!("ignoring channel text: {text}");
            return;
        };
        // Relay and PONG replies carry the canonical form, not whatever
        // prefix the sender wrapped around it.
        let canonical = frame.encode();

        match &frame {
            Frame::Req {
                id,
                beacon,
                color,
                ..
            } => {
                self.relay.relay(
                    FrameKind::Req,
                    id,
                    &canonical,
                    &self.node_name,
                    channel,
                    relay,
                    sink,
                );
                if *beacon == self.cfg.beacon_number {
                    self.help
                        .on_req(id, *beacon, *color, &self.cfg, indicator, sink);
                }
            }
            Frame::Cancel { id, beacon, .. } => {
                self.relay.relay(
                    FrameKind::Cancel,
                    id,
                    &canonical,
                    &self.node_name,
                    channel,
                    relay,
                    sink,
                );
                if *beacon == self.cfg.beacon_number {
                    self.help
                        .on_cancel(id, &self.cfg, playback, chime, indicator, sink);
                }
            }
            Frame::Claim { id, beacon } => {
                if *beacon == self.cfg.beacon_number {
                    self.help
                        .on_claim(id, *beacon, playback, chime, indicator, sink);
                }
            }
            Frame::Resolve { id, beacon } => {
                if *beacon == self.cfg.beacon_number {
                    self.help
                        .on_resolve(id, &self.cfg, playback, chime, indicator, sink);
                }
            }
            Frame::Ack { kind, id } => self.relay.observe_ack(*kind, id),
            Frame::Ping { ping_id } => {
                let pong = Frame::Pong {
                    ping_id: ping_id.clone(),
                    beacon: self.cfg.beacon_number,
                    timestamp: now_ms / 1000,
                };
                let pong_text = pong.encode();
                channel.send(&pong_text);
                sink.emit(&AppEvent::PongSent {
                    beacon: self.cfg.beacon_number,
                });
                self.relay.relay_pong(
                    ping_id,
                    self.cfg.beacon_number,
                    &pong_text,
                    &self.node_name,
                    relay,
                    sink,
                );
            }
            Frame::Pong {
                ping_id, beacon, ..
            } => {
                self.relay.relay_pong(
                    ping_id,
                    *beacon,
                    &canonical,
                    &self.node_name,
                    relay,
                    sink,
                );
            }
            Frame::Details { id, beacon, reason } => {
                if *beacon == self.cfg.beacon_number {
                    if let Some(r) = reason {
                        info!("help details for {id}: {r}");
                    }
                    self.help.on_details(id, *beacon, playback, sink);
                }
            }
            Frame::Audio { target, url } => {
                if target.matches(self.cfg.beacon_number) && !playback.is_playing() {
                    let _ = playback.play_stream(url);
                    sink.emit(&AppEvent::DirectAudio);
                }
            }
            Frame::Announce { target, url } => {
                if target.matches(self.cfg.beacon_number) {
                    self.announcement
                        .begin(url, now_ms, &self.cfg, indicator, sink);
                }
            }
            Frame::Mail { target, url } => {
                if target.matches(self.cfg.beacon_number) {
                    self.mailbox.enqueue(url, now_ms, sink);
                }
            }
        }
    }

    /// Short press. Mailbox first, then announcement, then a fresh help
    /// request with a pseudo-random color.
    #[allow(clippy::too_many_arguments)]
    pub fn on_button_press(
        &mut self,
        now_ms: u32,
        channel: &mut impl ChannelPort,
        playback: &mut impl PlaybackPort,
        indicator: &mut impl IndicatorPort,
        relay: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        if self
            .mailbox
            .handle_button(now_ms, &self.cfg, indicator, sink)
        {
            return;
        }
        if self
            .announcement
            .handle_button(now_ms, &self.cfg, playback, indicator, sink)
        {
            if !self.announcement.is_active() {
                self.restore_idle_visuals(indicator);
            }
            return;
        }
        // The tick counter's low bits are as good a die as any out here.
        let color = ColorTag::ALL[now_ms as usize % ColorTag::ALL.len()];
        match self
            .help
            .request_help(now_ms, color, &self.cfg, channel, indicator, sink)
        {
            Ok(id) => {
                // A beacon never hears its own flood, so its own request
                // goes straight to the relay too; ACK dedup still picks
                // one winner among the beacons that heard it.
                let canonical = Frame::Req {
                    id: id.clone(),
                    beacon: self.cfg.beacon_number,
                    timestamp: now_ms / 1000,
                    color: Some(color),
                }
                .encode();
                self.relay.relay(
                    FrameKind::Req,
                    &id,
                    &canonical,
                    &self.node_name,
                    channel,
                    relay,
                    sink,
                );
            }
            Err(e @ (HelpError::NotIdle | HelpError::Cooldown)) => {
                debug!("help request skipped: {e}");
            }
            Err(e) => info!("help request failed: {e}"),
        }
    }

    /// Long press: cancel the active request, but never while an audio
    /// session might want the button.
    #[allow(clippy::too_many_arguments)]
    pub fn on_button_long_press(
        &mut self,
        now_ms: u32,
        channel: &mut impl ChannelPort,
        playback: &mut impl PlaybackPort,
        chime: &mut impl ChimePort,
        indicator: &mut impl IndicatorPort,
        relay: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        if self.announcement.is_active() || self.mailbox.is_active() {
            return;
        }
        match self.help.cancel_help(
            now_ms, &self.cfg, channel, playback, chime, indicator, sink,
        ) {
            Ok(id) => {
                let canonical = Frame::Cancel {
                    id: id.clone(),
                    beacon: self.cfg.beacon_number,
                    timestamp: now_ms / 1000,
                }
                .encode();
                self.relay.relay(
                    FrameKind::Cancel,
                    &id,
                    &canonical,
                    &self.node_name,
                    channel,
                    relay,
                    sink,
                );
            }
            Err(e) => debug!("cancel skipped: {e}"),
        }
    }

    /// Re-assert idle ring state after a session releases it, keeping the
    /// help color if a request is still in flight.
    fn restore_idle_visuals(&self, indicator: &mut impl IndicatorPort) {
        match self.help.active_color() {
            Some(c) => indicator.set_idle_color(c.rgb()),
            None => {
                indicator.set_idle_color(self.cfg.idle_rgb);
                if self.help.is_idle() {
                    indicator.set_orbit(false, 0);
                }
            }
        }
    }
}
