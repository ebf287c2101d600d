//! Recently-handled-event cache.
//!
//! The mesh floods every frame along multiple paths, so each beacon sees
//! the same event several times. This cache remembers the last 64 event
//! keys (`"REQ|LH03-17-1"`, `"PONG|p9|4"`, ...) so repeated deliveries can
//! be recognised and skipped where the protocol demands at-most-once
//! behavior (relay posts, ACK broadcasts).
//!
//! Fixed storage, no allocation: a ring of bounded strings with a head
//! cursor. Lookup is a linear scan, which at N=64 is cheaper than any
//! hashing scheme on this class of chip. Once the ring wraps, the oldest
//! key is forgotten and a very late duplicate may slip through; the relay
//! endpoint tolerates that.

/// Dedup key, `<KIND>|<id>` or `PONG|<ping_id>|<beacon>`.
pub type AckKey = heapless::String<40>;

const CACHE_SLOTS: usize = 64;

/// Ring buffer of recently handled event keys.
pub struct AckDedupCache {
    slots: [AckKey; CACHE_SLOTS],
    head: usize,
}

impl AckDedupCache {
    pub const fn new() -> Self {
        Self {
            slots: [const { AckKey::new() }; CACHE_SLOTS],
            head: 0,
        }
    }

    /// Whether `key` was remembered within the last 64 insertions.
    /// Empty keys never match.
    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.slots.iter().any(|s| s.as_str() == key)
    }

    /// Remember `key`, overwriting the oldest slot. Over-length keys are
    /// stored truncated-to-reject: they are dropped entirely, since a
    /// clipped key would never match its future duplicates anyway.
    pub fn remember(&mut self, key: &str) {
        if key.is_empty() {
            return;
        }
        let Ok(key) = AckKey::try_from(key) else {
            return;
        };
        self.slots[self.head] = key;
        self.head = (self.head + 1) % CACHE_SLOTS;
    }
}

impl Default for AckDedupCache {
    fn default() -> Self {
        Self::new()
    }
}
