//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements       | Connects to              |
//! |--------------|------------------|--------------------------|
//! | `mesh`       | ChannelPort      | LoRa mesh radio component|
//! | `relay_http` | RelayPort        | Off-mesh HTTP endpoint   |
//! | `ring`       | IndicatorPort    | WS2812 12-pixel ring     |
//! | `log_sink`   | EventSink        | Serial log output        |
//! | `time`       | —                | ESP32 system timer       |
//! | `wifi`       | ConnectivityPort | ESP-IDF WiFi STA         |
//!
//! The audio path ([`PlaybackPort`]/[`ChimePort`]) is implemented by the
//! drivers directly since it has no protocol layer of its own.
//!
//! [`PlaybackPort`]: crate::app::ports::PlaybackPort
//! [`ChimePort`]: crate::app::ports::ChimePort

pub mod log_sink;
pub mod mesh;
pub mod relay_http;
pub mod ring;
pub mod time;
pub mod wifi;
