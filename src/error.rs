//! Unified error types for the lighthouse firmware.
//!
//! Follows embedded practice: a single `Error` enum that every subsystem can
//! convert into, keeping the top-level loop's error handling uniform. All
//! variants are `Copy` so they pass through the coordinator without
//! allocation. Malformed channel frames are deliberately *not* errors (see
//! `protocol`): a flooded channel guarantees neither well-formedness nor
//! single delivery, so bad frames are consumed silently.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A help-request operation was rejected by a state or cooldown guard.
    Help(HelpError),
    /// Peripheral or radio initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Help(e) => write!(f, "help: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Help-request errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpError {
    /// A request is already pending or claimed.
    NotIdle,
    /// No request to cancel.
    NoActiveRequest,
    /// The send cooldown has not elapsed.
    Cooldown,
    /// The broadcast channel rejected the frame.
    SendFailed,
}

impl fmt::Display for HelpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIdle => write!(f, "request already active"),
            Self::NoActiveRequest => write!(f, "no active request"),
            Self::Cooldown => write!(f, "send cooldown active"),
            Self::SendFailed => write!(f, "channel send failed"),
        }
    }
}

impl From<HelpError> for Error {
    fn from(e: HelpError) -> Self {
        Self::Help(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
