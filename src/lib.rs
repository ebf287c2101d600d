//! Lighthouse beacon firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod dedup;
pub mod error;
pub mod events;
pub mod help;
pub mod pins;
pub mod protocol;
pub mod relay;
pub mod sequencer;

// Re-export the ESP-IDF-facing modules so the crate compiles everywhere;
// the hardware implementations are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
