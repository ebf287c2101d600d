//! Pipe-delimited HELP frame codec for the lighthouse broadcast channel.
//!
//! Frames are short ASCII records flooded across the mesh:
//!
//! ```text
//! HELP|REQ|<id>|<beacon>|<timestamp>[|<color>]
//! HELP|CANCEL|<id>|<beacon>|<timestamp>
//! HELP|CLAIM|<id>|<beacon>
//! HELP|RESOLVE|<id>|<beacon>
//! HELP|ACK|<kind>|<id>
//! HELP|PING|<ping_id>
//! HELP|PONG|<ping_id>|<beacon>|<timestamp>
//! HELP|DETAILS|<id>|<beacon>[|<reason>]
//! HELP|AUDIO|<target>|<url>
//! HELP|ANNOUNCE|<target>|<url>
//! HELP|MAIL|<target>|<url>
//! ```
//!
//! Decoding is tolerant by design: the `HELP|` marker may appear after a
//! sender prefix, optional trailing fields may be absent, and anything
//! malformed (missing required field, unknown type, over-length field,
//! non-numeric number) decodes to `None`. The channel floods every frame
//! along multiple paths, so "ignore quietly" beats "surface an error".
//!
//! Fields are bounded `heapless` strings validated at this boundary;
//! over-length input is rejected rather than truncated, since a truncated
//! id would corrupt dedup keys downstream.

use core::fmt::Write as _;

/// Opaque help-request identifier, e.g. `LH07-1723041-3`.
pub type RequestId = heapless::String<32>;
/// Ping correlation token.
pub type PingId = heapless::String<32>;
/// Stream URL or local file path for playback.
pub type Url = heapless::String<192>;
/// Free-text reason carried by DETAILS.
pub type Reason = heapless::String<64>;

/// Maximum encoded frame length.
pub const FRAME_MAX: usize = 256;

// ---------------------------------------------------------------------------
// Field enums
// ---------------------------------------------------------------------------

/// Frame type tag. Also used as the event discriminator inside ACK frames
/// and in dedup keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Req,
    Cancel,
    Claim,
    Resolve,
    Ack,
    Ping,
    Pong,
    Details,
    Audio,
    Announce,
    Mail,
}

impl FrameKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Req => "REQ",
            Self::Cancel => "CANCEL",
            Self::Claim => "CLAIM",
            Self::Resolve => "RESOLVE",
            Self::Ack => "ACK",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Details => "DETAILS",
            Self::Audio => "AUDIO",
            Self::Announce => "ANNOUNCE",
            Self::Mail => "MAIL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "REQ" => Self::Req,
            "CANCEL" => Self::Cancel,
            "CLAIM" => Self::Claim,
            "RESOLVE" => Self::Resolve,
            "ACK" => Self::Ack,
            "PING" => Self::Ping,
            "PONG" => Self::Pong,
            "DETAILS" => Self::Details,
            "AUDIO" => Self::Audio,
            "ANNOUNCE" => Self::Announce,
            "MAIL" => Self::Mail,
            _ => return None,
        })
    }
}

/// Color tag attached to a help request, shown on the requesting ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
}

impl ColorTag {
    pub const ALL: [ColorTag; 6] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Violet,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Orange => "ORANGE",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
            Self::Violet => "VIOLET",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "RED" => Self::Red,
            "ORANGE" => Self::Orange,
            "YELLOW" => Self::Yellow,
            "GREEN" => Self::Green,
            "BLUE" => Self::Blue,
            "VIOLET" => Self::Violet,
            _ => return None,
        })
    }

    /// Ring color for this tag.
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (255, 0, 0),
            Self::Orange => (255, 128, 0),
            Self::Yellow => (255, 255, 0),
            Self::Green => (0, 200, 0),
            Self::Blue => (0, 120, 255),
            Self::Violet => (160, 0, 255),
        }
    }
}

/// Addressing for audio frames: every beacon, or one specific number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Beacon(u8),
}

impl Target {
    pub fn parse(s: &str) -> Option<Self> {
        if s == "ALL" {
            return Some(Self::All);
        }
        s.parse::<u8>().ok().map(Self::Beacon)
    }

    /// Whether a frame with this target is addressed to `beacon_number`.
    pub fn matches(self, beacon_number: u8) -> bool {
        match self {
            Self::All => true,
            Self::Beacon(n) => n == beacon_number,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A decoded channel frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Req {
        id: RequestId,
        beacon: u8,
        timestamp: u32,
        color: Option<ColorTag>,
    },
    Cancel {
        id: RequestId,
        beacon: u8,
        timestamp: u32,
    },
    Claim {
        id: RequestId,
        beacon: u8,
    },
    Resolve {
        id: RequestId,
        beacon: u8,
    },
    Ack {
        kind: FrameKind,
        id: RequestId,
    },
    Ping {
        ping_id: PingId,
    },
    Pong {
        ping_id: PingId,
        beacon: u8,
        timestamp: u32,
    },
    Details {
        id: RequestId,
        beacon: u8,
        reason: Option<Reason>,
    },
    Audio {
        target: Target,
        url: Url,
    },
    Announce {
        target: Target,
        url: Url,
    },
    Mail {
        target: Target,
        url: Url,
    },
}

impl Frame {
    /// Frame type tag.
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Req { .. } => FrameKind::Req,
            Self::Cancel { .. } => FrameKind::Cancel,
            Self::Claim { .. } => FrameKind::Claim,
            Self::Resolve { .. } => FrameKind::Resolve,
            Self::Ack { .. } => FrameKind::Ack,
            Self::Ping { .. } => FrameKind::Ping,
            Self::Pong { .. } => FrameKind::Pong,
            Self::Details { .. } => FrameKind::Details,
            Self::Audio { .. } => FrameKind::Audio,
            Self::Announce { .. } => FrameKind::Announce,
            Self::Mail { .. } => FrameKind::Mail,
        }
    }

    /// Decode a channel payload. Returns `None` for anything that is not a
    /// complete, well-formed HELP frame; the caller treats that as
    /// handled-but-inert.
    pub fn decode(text: &str) -> Option<Frame> {
        // Senders may prefix the payload; scan for the marker.
        let start = text.find("HELP|")?;
        let mut fields = text[start..].split('|');

        debug_assert_eq!(fields.next(), Some("HELP"));
        let kind = FrameKind::parse(fields.next()?)?;

        match kind {
            FrameKind::Req => {
                let id = bounded(fields.next()?)?;
                let beacon = fields.next()?.parse().ok()?;
                let timestamp = fields.next()?.parse().ok()?;
                let color = match fields.next() {
                    Some(s) if !s.is_empty() => Some(ColorTag::parse(s)?),
                    _ => None,
                };
                Some(Frame::Req {
                    id,
                    beacon,
                    timestamp,
                    color,
                })
            }
            FrameKind::Cancel => Some(Frame::Cancel {
                id: bounded(fields.next()?)?,
                beacon: fields.next()?.parse().ok()?,
                timestamp: fields.next()?.parse().ok()?,
            }),
            FrameKind::Claim => Some(Frame::Claim {
                id: bounded(fields.next()?)?,
                beacon: fields.next()?.parse().ok()?,
            }),
            FrameKind::Resolve => Some(Frame::Resolve {
                id: bounded(fields.next()?)?,
                beacon: fields.next()?.parse().ok()?,
            }),
            FrameKind::Ack => Some(Frame::Ack {
                kind: FrameKind::parse(fields.next()?)?,
                id: bounded(fields.next()?)?,
            }),
            FrameKind::Ping => Some(Frame::Ping {
                ping_id: bounded(fields.next()?)?,
            }),
            FrameKind::Pong => Some(Frame::Pong {
                ping_id: bounded(fields.next()?)?,
                beacon: fields.next()?.parse().ok()?,
                timestamp: fields.next()?.parse().ok()?,
            }),
            FrameKind::Details => {
                let id = bounded(fields.next()?)?;
                let beacon = fields.next()?.parse().ok()?;
                let reason = match fields.next() {
                    Some(s) if !s.is_empty() => Some(bounded(s)?),
                    _ => None,
                };
                Some(Frame::Details { id, beacon, reason })
            }
            FrameKind::Audio | FrameKind::Announce | FrameKind::Mail => {
                let target = Target::parse(fields.next()?)?;
                let url: Url = bounded(fields.next()?)?;
                if url.is_empty() {
                    return None;
                }
                Some(match kind {
                    FrameKind::Audio => Frame::Audio { target, url },
                    FrameKind::Announce => Frame::Announce { target, url },
                    _ => Frame::Mail { target, url },
                })
            }
        }
    }

    /// Encode this frame as channel text. Fields are bounded at
    /// construction, so the output always fits [`FRAME_MAX`].
    pub fn encode(&self) -> heapless::String<FRAME_MAX> {
        let mut out = heapless::String::new();
        let r = match self {
            Self::Req {
                id,
                beacon,
                timestamp,
                color,
            } => match color {
                Some(c) => write!(
                    out,
                    "HELP|REQ|{id}|{beacon}|{timestamp}|{}",
                    c.as_str()
                ),
                None => write!(out, "HELP|REQ|{id}|{beacon}|{timestamp}"),
            },
            Self::Cancel {
                id,
                beacon,
                timestamp,
            } => write!(out, "HELP|CANCEL|{id}|{beacon}|{timestamp}"),
            Self::Claim { id, beacon } => write!(out, "HELP|CLAIM|{id}|{beacon}"),
            Self::Resolve { id, beacon } => write!(out, "HELP|RESOLVE|{id}|{beacon}"),
            Self::Ack { kind, id } => write!(out, "HELP|ACK|{}|{id}", kind.as_str()),
            Self::Ping { ping_id } => write!(out, "HELP|PING|{ping_id}"),
            Self::Pong {
                ping_id,
                beacon,
                timestamp,
            } => write!(out, "HELP|PONG|{ping_id}|{beacon}|{timestamp}"),
            Self::Details { id, beacon, reason } => match reason {
                Some(r) => write!(out, "HELP|DETAILS|{id}|{beacon}|{r}"),
                None => write!(out, "HELP|DETAILS|{id}|{beacon}"),
            },
            Self::Audio { target, url } => write_audio(&mut out, "AUDIO", *target, url),
            Self::Announce { target, url } => write_audio(&mut out, "ANNOUNCE", *target, url),
            Self::Mail { target, url } => write_audio(&mut out, "MAIL", *target, url),
        };
        debug_assert!(r.is_ok(), "encoded frame exceeds FRAME_MAX");
        out
    }
}

fn write_audio(
    out: &mut heapless::String<FRAME_MAX>,
    tag: &str,
    target: Target,
    url: &Url,
) -> core::fmt::Result {
    match target {
        Target::All => write!(out, "HELP|{tag}|ALL|{url}"),
        Target::Beacon(n) => write!(out, "HELP|{tag}|{n}|{url}"),
    }
}

/// Copy a field into a bounded string, rejecting over-length input.
fn bounded<const N: usize>(s: &str) -> Option<heapless::String<N>> {
    heapless::String::try_from(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RequestId {
        RequestId::try_from(s).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::try_from(s).unwrap()
    }

    #[test]
    fn decodes_req_with_color() {
        let f = Frame::decode("HELP|REQ|LH01-100-1|1|100|GREEN").unwrap();
        assert_eq!(
            f,
            Frame::Req {
                id: id("LH01-100-1"),
                beacon: 1,
                timestamp: 100,
                color: Some(ColorTag::Green),
            }
        );
    }

    #[test]
    fn decodes_req_without_color() {
        let f = Frame::decode("HELP|REQ|LH01-100-1|1|100").unwrap();
        assert!(matches!(f, Frame::Req { color: None, .. }));
    }

    #[test]
    fn decodes_with_sender_prefix() {
        let f = Frame::decode("Lighthouse-3: HELP|PING|p7").unwrap();
        assert_eq!(
            f,
            Frame::Ping {
                ping_id: id("p7").into()
            }
        );
    }

    #[test]
    fn missing_required_field_is_inert() {
        assert_eq!(Frame::decode("HELP|REQ|LH01-100-1|1"), None);
        assert_eq!(Frame::decode("HELP|CLAIM|LH01-100-1"), None);
        assert_eq!(Frame::decode("HELP|PONG|p1|4"), None);
        assert_eq!(Frame::decode("HELP|MAIL|ALL"), None);
    }

    #[test]
    fn unknown_type_is_inert() {
        assert_eq!(Frame::decode("HELP|BOGUS|x|1"), None);
    }

    #[test]
    fn not_a_help_frame_is_inert() {
        assert_eq!(Frame::decode("hello world"), None);
        assert_eq!(Frame::decode(""), None);
    }

    #[test]
    fn non_numeric_beacon_is_inert() {
        assert_eq!(Frame::decode("HELP|CLAIM|LH01-100-1|seven"), None);
    }

    #[test]
    fn overlength_id_is_rejected_not_truncated() {
        let long = "X".repeat(64);
        let mut text = String::from("HELP|CLAIM|");
        text.push_str(&long);
        text.push_str("|1");
        assert_eq!(Frame::decode(&text), None);
    }

    #[test]
    fn unknown_color_is_inert() {
        assert_eq!(Frame::decode("HELP|REQ|LH01-100-1|1|100|MAUVE"), None);
    }

    #[test]
    fn target_matching() {
        assert!(Target::All.matches(12));
        assert!(Target::Beacon(12).matches(12));
        assert!(!Target::Beacon(12).matches(13));
    }

    #[test]
    fn round_trip_all_variants() {
        let frames = [
            Frame::Req {
                id: id("LH02-42-7"),
                beacon: 2,
                timestamp: 42,
                color: Some(ColorTag::Violet),
            },
            Frame::Req {
                id: id("LH02-42-8"),
                beacon: 2,
                timestamp: 42,
                color: None,
            },
            Frame::Cancel {
                id: id("LH02-42-7"),
                beacon: 2,
                timestamp: 50,
            },
            Frame::Claim {
                id: id("LH02-42-7"),
                beacon: 2,
            },
            Frame::Resolve {
                id: id("LH02-42-7"),
                beacon: 2,
            },
            Frame::Ack {
                kind: FrameKind::Req,
                id: id("LH02-42-7"),
            },
            Frame::Ping {
                ping_id: id("ping-1"),
            },
            Frame::Pong {
                ping_id: id("ping-1"),
                beacon: 9,
                timestamp: 77,
            },
            Frame::Details {
                id: id("LH02-42-7"),
                beacon: 2,
                reason: Some(heapless::String::try_from("on the way").unwrap()),
            },
            Frame::Details {
                id: id("LH02-42-7"),
                beacon: 2,
                reason: None,
            },
            Frame::Audio {
                target: Target::All,
                url: url("http://radio.local/live"),
            },
            Frame::Announce {
                target: Target::Beacon(4),
                url: url("http://host/announce.mp3"),
            },
            Frame::Mail {
                target: Target::Beacon(30),
                url: url("/sfx/msg.wav"),
            },
        ];
        for f in frames {
            let text = f.encode();
            assert_eq!(Frame::decode(&text), Some(f), "round trip of {text}");
        }
    }
}
