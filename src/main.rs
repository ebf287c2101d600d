//! Lighthouse Beacon Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MeshChannelAdapter  HttpRelayAdapter  RingAdapter             │
//! │  (ChannelPort)       (RelayPort)       (IndicatorPort)         │
//! │  LogEventSink        WifiAdapter       Esp32TimeAdapter        │
//! │  (EventSink)         (Connectivity)                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Coordinator (pure logic)                  │    │
//! │  │  Help requests · Announcement · Mailbox · Relay dedup  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Drivers: button (ISR gestures) · audio pipeline · chime       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use lighthouse::adapters::log_sink::LogEventSink;
use lighthouse::adapters::mesh::MeshChannelAdapter;
use lighthouse::adapters::relay_http::HttpRelayAdapter;
use lighthouse::adapters::ring::RingAdapter;
use lighthouse::adapters::time::Esp32TimeAdapter;
use lighthouse::adapters::wifi::{ConnectivityPort, WifiAdapter};
use lighthouse::app::service::Coordinator;
use lighthouse::config::BeaconConfig;
use lighthouse::drivers::audio::AudioStreamerDriver;
use lighthouse::drivers::button::{ButtonDriver, ButtonEvent};
use lighthouse::drivers::chime::ChimeDriver;
use lighthouse::drivers::hw_init;
use lighthouse::events::{self, push_event, Event};
use lighthouse::pins;

/// Main loop cadence. Every session timer in the core is a multiple of
/// this, so nothing finer is needed.
const CONTROL_TICK_MS: u64 = 20;

/// Boot spin color and step interval.
const STARTUP_SPIN: (u8, u8, u8) = (0, 120, 255);
const STARTUP_SPIN_STEP_MS: u16 = 60;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Lighthouse beacon v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical. Halting here lets the
        // watchdog reset the board after its timeout.
        error!("peripheral init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {} — continuing without button", e);
    }

    // ── 3. Configuration ──────────────────────────────────────
    let config = BeaconConfig::default();
    let node_name = config.node_name();
    info!(
        "beacon {} ('{}'), relay {}",
        config.beacon_number,
        node_name,
        if config.relay_url.is_some() { "enabled" } else { "off" },
    );

    // ── 4. Adapters and drivers ───────────────────────────────
    let time = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let mut mesh = MeshChannelAdapter::new();
    let mut relay = HttpRelayAdapter::new(config.relay_url.clone(), config.relay_timeout_ms);
    let mut ring = RingAdapter::new(config.idle_rgb);
    let mut audio = AudioStreamerDriver::new();
    let mut chime = ChimeDriver::new();
    let mut button = ButtonDriver::new(pins::BUTTON_GPIO);

    #[cfg(target_os = "espidf")]
    let mut wifi = {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::hal::peripherals::Peripherals;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;
        use esp_idf_svc::wifi::EspWifi;

        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        WifiAdapter::new(EspWifi::new(peripherals.modem, sysloop, Some(nvs))?)
    };
    #[cfg(not(target_os = "espidf"))]
    let mut wifi = WifiAdapter::new();

    // WiFi is only the relay/stream uplink; the mesh works without it.
    if config.wifi_ssid.is_empty() {
        info!("no WiFi credentials; relay and stream playback disabled");
    } else {
        match wifi.set_credentials(config.wifi_ssid.as_str(), config.wifi_password.as_str()) {
            Ok(()) => {
                if let Err(e) = wifi.connect() {
                    warn!("WiFi connect failed ({}), will retry with backoff", e);
                }
            }
            Err(e) => warn!("WiFi credentials rejected: {}", e),
        }
    }

    // ── 5. Radio bring-up, spinner while it joins ─────────────
    ring.start_spin(STARTUP_SPIN, STARTUP_SPIN_STEP_MS);
    ring.render(time.uptime_ms());
    mesh.init(node_name.as_str())?;
    ring.finish_startup();

    // ── 6. Coordinator ────────────────────────────────────────
    let mut co = Coordinator::new(config);

    info!("beacon ready, entering event loop");

    // ── 7. Event loop ─────────────────────────────────────────
    loop {
        std::thread::sleep(std::time::Duration::from_millis(CONTROL_TICK_MS));
        push_event(Event::ControlTick);

        // Inbound radio traffic rings the FrameReceived doorbell.
        mesh.poll();

        let now_ms = time.uptime_ms();

        // Button gesture detection runs outside drain_events since it
        // reads its own ISR atomic.
        if let Some(gesture) = button.tick(now_ms) {
            match gesture {
                ButtonEvent::ShortPress => {
                    push_event(Event::ButtonShortPress);
                }
                ButtonEvent::LongPress => {
                    push_event(Event::ButtonLongPress);
                }
            }
        }

        events::drain_events(|event| match event {
            Event::ControlTick => {
                co.tick(now_ms, &mut audio, &mut ring, &mut sink);
            }
            Event::FrameReceived => {
                while let Some(text) = mesh.take_inbound() {
                    co.on_channel_text(
                        text.as_str(),
                        now_ms,
                        &mut mesh,
                        &mut audio,
                        &mut chime,
                        &mut ring,
                        &mut relay,
                        &mut sink,
                    );
                }
            }
            Event::ButtonShortPress => {
                co.on_button_press(
                    now_ms, &mut mesh, &mut audio, &mut ring, &mut relay, &mut sink,
                );
            }
            Event::ButtonLongPress => {
                co.on_button_long_press(
                    now_ms, &mut mesh, &mut audio, &mut chime, &mut ring, &mut relay,
                    &mut sink,
                );
            }
        });

        // Housekeeping outside the event dispatch.
        chime.tick(now_ms);
        ring.set_audio_level(audio.level());
        ring.render(now_ms);
        wifi.poll();
    }
}
