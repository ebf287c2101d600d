//! Recording mock ports shared by the unit tests.

use crate::app::events::AppEvent;
use crate::app::ports::{
    ChannelPort, ChimePort, EventSink, IndicatorPort, PlaybackPort, Rgb, RelayPort,
};

#[derive(Default)]
pub struct MockChannel {
    pub sent: Vec<String>,
    pub reject: bool,
}

impl ChannelPort for MockChannel {
    fn send(&mut self, text: &str) -> bool {
        if self.reject {
            return false;
        }
        self.sent.push(text.to_string());
        true
    }
}

#[derive(Default)]
pub struct MockPlayback {
    pub playing: bool,
    pub reject: bool,
    pub streams: Vec<String>,
    pub files: Vec<String>,
    pub stops: usize,
}

impl PlaybackPort for MockPlayback {
    fn play_stream(&mut self, url: &str) -> bool {
        if self.reject {
            return false;
        }
        self.streams.push(url.to_string());
        self.playing = true;
        true
    }

    fn play_file(&mut self, path: &str) -> bool {
        if self.reject {
            return false;
        }
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
pub struct MockChime {
    pub chimes: usize,
}

impl ChimePort for MockChime {
    fn play_message_chime(&mut self) {
        self.chimes += 1;
    }
}

#[derive(Default)]
pub struct MockIndicator {
    pub blinking: Option<(bool, Rgb, u16)>,
    pub idle_color: Option<Rgb>,
    pub pulses: Vec<Rgb>,
    pub orbit: Option<(bool, u16)>,
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
pub struct MockRelay {
    pub enabled: bool,
    pub reject: bool,
    pub posts: Vec<(String, String)>,
}

impl RelayPort for MockRelay {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn post(&mut self, text: &str, sender: &str) -> bool {
        if self.reject {
            return false;
        }
        self.posts.push((text.to_string(), sender.to_string()));
        true
    }
}

#[derive(Default)]
pub struct MockSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for MockSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
