//! Hardware drivers.
//!
//! Everything that talks to a peripheral directly: GPIO button, WS2812
//! ring pattern engine, I2S audio pipeline, LEDC piezo chime, and the
//! one-shot init glue. Drivers are cfg-gated: real ESP-IDF calls on
//! `target_os = "espidf"`, simulation stubs on the host.

pub mod audio;
pub mod button;
pub mod chime;
pub mod hw_init;
pub mod light_ring;
