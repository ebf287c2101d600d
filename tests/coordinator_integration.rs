//! Integration tests: Coordinator -> sequencers -> ports, end to end.
//!
//! Drives the coordinator through whole scenarios (button presses, mesh
//! frames, ticks) and asserts on what reached the mock hardware, the way
//! the main loop would drive the real adapters.

use lighthouse::app::events::AppEvent;
use lighthouse::app::ports::{
    ChannelPort, ChimePort, EventSink, IndicatorPort, PlaybackPort, RelayPort, Rgb,
};
use lighthouse::app::service::Coordinator;
use lighthouse::config::{BeaconConfig, EOM_PATH, MAIL_ALERT_PATH, SFX_BUTTON_PATH};

// ── Mock implementations ──────────────────────────────────────

#[derive(Default)]
struct MockChannel {
    sent: Vec<String>,
}

impl ChannelPort for MockChannel {
    fn send(&mut self, text: &str) -> bool {
        self.sent.push(text.to_string());
        true
    }
}

#[derive(Default)]
struct MockPlayback {
    playing: bool,
    streams: Vec<String>,
    files: Vec<String>,
    stops: usize,
}

impl PlaybackPort for MockPlayback {
    fn play_stream(&mut self, url: &str) -> bool {
        self.streams.push(url.to_string());
        self.playing = true;
        true
    }

    fn play_file(&mut self, path: &str) -> bool {
        self.files.push(path.to_string());
        self.playing = true;
        true
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.playing = false;
    }
}

#[derive(Default)]
struct MockChime {
    chimes: usize,
}

impl ChimePort for MockChime {
    fn play_message_chime(&mut self) {
        self.chimes += 1;
    }
}

#[derive(Default)]
struct MockIndicator {
    blinking: Option<(bool, Rgb, u16)>,
    idle_color: Option<Rgb>,
    pulses: Vec<Rgb>,
    orbit: Option<(bool, u16)>,
}

impl IndicatorPort for MockIndicator {
    fn set_blinking(&mut self, on: bool, color: Rgb, interval_ms: u16) {
        self.blinking = Some((on, color, interval_ms));
    }

    fn set_idle_color(&mut self, color: Rgb) {
        self.idle_color = Some(color);
    }

    fn pulse(&mut self, color: Rgb) {
        self.pulses.push(color);
    }

    fn set_orbit(&mut self, on: bool, interval_ms: u16) {
        self.orbit = Some((on, interval_ms));
    }
}

#[derive(Default)]
struct MockRelay {
    enabled: bool,
    posts: Vec<(String, String)>,
}

impl RelayPort for MockRelay {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn post(&mut self, text: &str, sender: &str) -> bool {
        self.posts.push((text.to_string(), sender.to_string()));
        true
    }
}

#[derive(Default)]
struct MockSink {
    events: Vec<AppEvent>,
}

impl EventSink for MockSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Scenario harness ──────────────────────────────────────────

struct Beacon {
    co: Coordinator,
    channel: MockChannel,
    playback: MockPlayback,
    chime: MockChime,
    indicator: MockIndicator,
    relay: MockRelay,
    sink: MockSink,
}

impl Beacon {
    fn new(number: u8) -> Self {
        let mut cfg = BeaconConfig::default();
        cfg.beacon_number = number;
        Self {
            co: Coordinator::new(cfg),
            channel: MockChannel::default(),
            playback: MockPlayback::default(),
            chime: MockChime::default(),
            indicator: MockIndicator::default(),
            relay: MockRelay::default(),
            sink: MockSink::default(),
        }
    }

    fn recv(&mut self, text: &str, now: u32) {
        self.co.on_channel_text(
            text,
            now,
            &mut self.channel,
            &mut self.playback,
            &mut self.chime,
            &mut self.indicator,
            &mut self.relay,
            &mut self.sink,
        );
    }

    fn tick(&mut self, now: u32) {
        self.co
            .tick(now, &mut self.playback, &mut self.indicator, &mut self.sink);
    }

    fn press(&mut self, now: u32) {
        self.co.on_button_press(
            now,
            &mut self.channel,
            &mut self.playback,
            &mut self.indicator,
            &mut self.relay,
            &mut self.sink,
        );
    }

    fn long_press(&mut self, now: u32) {
        self.co.on_button_long_press(
            now,
            &mut self.channel,
            &mut self.playback,
            &mut self.chime,
            &mut self.indicator,
            &mut self.relay,
            &mut self.sink,
        );
    }

    fn finish_playback(&mut self) {
        self.playback.playing = false;
    }

    fn saw(&self, event: &AppEvent) -> bool {
        self.sink.events.contains(event)
    }
}

fn id(s: &str) -> lighthouse::protocol::RequestId {
    lighthouse::protocol::RequestId::try_from(s).unwrap()
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn own_request_lifecycle_claim_then_resolve() {
    let mut b = Beacon::new(4);

    b.press(10_000);
    assert_eq!(b.channel.sent.len(), 1);
    assert!(b.channel.sent[0].starts_with("HELP|REQ|LH04-10-1|4|10|"));
    assert_eq!(b.indicator.orbit, Some((true, 120)));

    // Local cues drain one per free tick.
    b.tick(10_020);
    assert_eq!(b.playback.files, vec![SFX_BUTTON_PATH.to_string()]);
    b.finish_playback();
    b.tick(10_040);
    assert_eq!(b.playback.files.len(), 2);
    b.finish_playback();

    // A responder claims, reports progress, and resolves.
    b.recv("HELP|CLAIM|LH04-10-1|4", 20_000);
    assert_eq!(b.indicator.orbit, Some((false, 0)));
    assert_eq!(b.indicator.pulses, vec![(0, 200, 0)]);
    b.finish_playback();

    b.recv("HELP|DETAILS|LH04-10-1|4|eta 5 min", 25_000);
    assert!(b.saw(&AppEvent::ResponderDetails {
        id: id("LH04-10-1"),
        beacon: 4
    }));
    b.finish_playback();

    b.recv("HELP|RESOLVE|LH04-10-1|4", 30_000);
    assert!(b.saw(&AppEvent::HelpResolved {
        id: id("LH04-10-1")
    }));
    // Ring back to the configured idle color.
    assert_eq!(b.indicator.idle_color, Some((15, 15, 15)));
}

#[test]
fn adopted_request_is_cancelled_from_the_mesh() {
    let mut b = Beacon::new(4);

    b.recv("HELP|REQ|LH04-9-1|4|9|VIOLET", 9_000);
    assert!(b.saw(&AppEvent::HelpAdopted {
        id: id("LH04-9-1"),
        beacon: 4
    }));
    assert_eq!(b.indicator.idle_color, Some((160, 0, 255)));
    assert_eq!(b.indicator.orbit, Some((true, 120)));

    b.recv("HELP|CANCEL|LH04-9-1|4|12", 12_000);
    assert!(b.saw(&AppEvent::HelpCancelled {
        id: id("LH04-9-1")
    }));
    assert_eq!(b.indicator.orbit, Some((false, 0)));
    assert_eq!(b.indicator.idle_color, Some((15, 15, 15)));
}

#[test]
fn announcement_session_end_to_end() {
    let mut b = Beacon::new(4);

    b.recv("HELP|ANNOUNCE|ALL|http://host/evening.mp3", 1_000);
    assert_eq!(b.indicator.blinking, Some((true, (255, 255, 255), 500)));

    b.tick(1_020);
    assert_eq!(b.playback.files, vec![MAIL_ALERT_PATH.to_string()]);

    b.press(1_100); // acknowledge
    assert_eq!(b.indicator.blinking, Some((false, (255, 255, 255), 500)));
    b.finish_playback();

    b.tick(1_200); // body
    assert_eq!(b.playback.streams, vec!["http://host/evening.mp3".to_string()]);
    b.finish_playback();

    b.tick(2_000); // end tone due at +500
    b.tick(2_500);
    assert_eq!(b.playback.files[1], EOM_PATH.to_string());
    b.finish_playback();

    b.tick(3_000); // cycle complete: stoppable
    b.press(3_100);
    assert!(b.saw(&AppEvent::AnnouncementStopped));
    assert_eq!(b.playback.stops, 1);
    // Idle visuals come back through the coordinator.
    assert_eq!(b.indicator.idle_color, Some((15, 15, 15)));
}

#[test]
fn mailbox_drains_newest_first_then_closes() {
    let mut b = Beacon::new(4);

    b.recv("HELP|MAIL|4|http://host/m1.mp3", 0);
    b.recv("HELP|MAIL|ALL|http://host/m2.mp3", 10);
    b.tick(20);
    assert_eq!(b.indicator.blinking, Some((true, (255, 255, 255), 500)));
    assert_eq!(b.playback.files, vec![MAIL_ALERT_PATH.to_string()]);

    b.press(100); // open
    assert!(b.saw(&AppEvent::MailOpened));
    b.finish_playback();

    b.tick(200); // newest first
    assert_eq!(b.playback.streams, vec!["http://host/m2.mp3".to_string()]);
    b.finish_playback();

    b.tick(1_000); // tone due at +500
    b.tick(1_500);
    assert_eq!(b.playback.files[1], EOM_PATH.to_string());
    b.finish_playback();

    b.tick(2_000); // advance window armed
    b.press(2_100); // skip the wait
    b.tick(2_200);
    assert_eq!(b.playback.streams[1], "http://host/m1.mp3".to_string());
    b.finish_playback();

    b.tick(3_000);
    b.tick(3_500); // second end tone
    b.finish_playback();
    b.tick(4_000); // advance window
    b.tick(7_100); // queue empty: session closes
    assert!(b.saw(&AppEvent::MailDrained));
    assert_eq!(b.indicator.idle_color, Some((15, 15, 15)));
}

#[test]
fn relay_forwards_each_event_once_with_mesh_ack() {
    let mut b = Beacon::new(4);
    b.relay.enabled = true;

    b.recv("HELP|REQ|LH07-9-1|7|9", 9_000);
    b.recv("HELP|REQ|LH07-9-1|7|9", 9_400); // flood duplicate
    assert_eq!(b.posts(), vec!["HELP|REQ|LH07-9-1|7|9".to_string()]);
    assert_eq!(b.channel.sent, vec!["HELP|ACK|REQ|LH07-9-1".to_string()]);
    assert!(b.saw(&AppEvent::RelayForwarded {
        kind: lighthouse::protocol::FrameKind::Req
    }));
}

#[test]
fn lone_beacon_forwards_its_own_request() {
    let mut b = Beacon::new(4);
    b.relay.enabled = true;

    // No other beacon will echo this REQ back, so the requester itself
    // must get it off-mesh. 10_000 % 6 picks BLUE.
    b.press(10_000);
    assert_eq!(b.posts(), vec!["HELP|REQ|LH04-10-1|4|10|BLUE".to_string()]);
    assert!(b.channel.sent[1].starts_with("HELP|ACK|REQ|LH04-10-1"));

    b.long_press(13_000);
    assert!(b.posts()[1].starts_with("HELP|CANCEL|LH04-10-1|4|13"));
    assert!(b.channel.sent[3].starts_with("HELP|ACK|CANCEL|LH04-10-1"));
}

#[test]
fn foreign_ack_suppresses_this_relayer() {
    let mut b = Beacon::new(4);
    b.relay.enabled = true;

    b.recv("HELP|ACK|CANCEL|LH07-9-1", 8_000);
    b.recv("HELP|CANCEL|LH07-9-1|7|9", 9_000);
    assert!(b.relay.posts.is_empty());
    assert!(b.channel.sent.is_empty());
}

#[test]
fn cooldown_limits_button_traffic() {
    let mut b = Beacon::new(4);

    b.press(10_000); // REQ
    b.long_press(13_000); // CANCEL
    assert_eq!(b.channel.sent.len(), 2);
    assert!(b.channel.sent[1].starts_with("HELP|CANCEL|LH04-10-1|4|13"));

    b.press(13_500); // inside cooldown: dropped
    assert_eq!(b.channel.sent.len(), 2);

    b.press(16_000); // fresh request, new sequence number
    assert_eq!(b.channel.sent.len(), 3);
    assert!(b.channel.sent[2].starts_with("HELP|REQ|LH04-16-2|4|16|"));
}

#[test]
fn ping_pong_works_while_sessions_run() {
    let mut b = Beacon::new(4);

    b.recv("HELP|ANNOUNCE|ALL|http://host/a.mp3", 1_000);
    b.recv("HELP|PING|probe-1", 9_000);
    assert!(b
        .channel
        .sent
        .contains(&"HELP|PONG|probe-1|4|9".to_string()));
    assert!(b.saw(&AppEvent::PongSent { beacon: 4 }));
}

impl Beacon {
    fn posts(&self) -> Vec<String> {
        self.relay.posts.iter().map(|(t, _)| t.clone()).collect()
    }
}
