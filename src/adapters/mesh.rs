//! Mesh radio channel adapter.
//!
//! Implements [`ChannelPort`] against the LoRa mesh component (radio
//! driver plus flood router, an ESP-IDF C component). Inbound channel
//! text is polled off the component into a small mailbox here; each
//! arrival rings the [`Event::FrameReceived`] doorbell and the main loop
//! drains the mailbox through the coordinator.
//!
//! On the host the adapter is a loopback: sends are recorded, inbound
//! text is injected by the simulation or tests.

use heapless::{Deque, String as HString};
use log::{debug, warn};

use crate::app::ports::ChannelPort;
use crate::error::{Error, Result};
use crate::events::{push_event, Event};
use crate::protocol::FRAME_MAX;

/// Inbound frames held between polls. The mesh floods slowly; two or
/// three frames per tick is already a burst.
const INBOUND_DEPTH: usize = 4;

#[cfg(target_os = "espidf")]
unsafe extern "C" {
    fn lh_mesh_init(node_name: *const core::ffi::c_char) -> bool;
    fn lh_mesh_send(text: *const core::ffi::c_char) -> bool;
    /// Copies the next received channel payload into `buf`.
    /// Returns the payload length, or 0 when nothing is pending.
    fn lh_mesh_poll_rx(buf: *mut u8, cap: u32) -> i32;
}

pub struct MeshChannelAdapter {
    inbound: Deque<HString<FRAME_MAX>, INBOUND_DEPTH>,
    #[cfg(not(target_os = "espidf"))]
    sim_sent: Vec<String>,
}

impl MeshChannelAdapter {
    pub fn new() -> Self {
        Self {
            inbound: Deque::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_sent: Vec::new(),
        }
    }

    /// Bring up the radio and join the shared channel.
    #[cfg(target_os = "espidf")]
    pub fn init(&mut self, node_name: &str) -> Result<()> {
        let c_name = std::ffi::CString::new(node_name)
            .map_err(|_| Error::Init("node name contains NUL"))?;
        if unsafe { lh_mesh_init(c_name.as_ptr()) } {
            Ok(())
        } else {
            Err(Error::Init("mesh radio bring-up failed"))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn init(&mut self, node_name: &str) -> Result<()> {
        debug!("mesh(sim): init as '{}'", node_name);
        Ok(())
    }

    /// Drain the radio's receive queue into the mailbox.
    /// Call once per control tick, before event dispatch.
    #[cfg(target_os = "espidf")]
    pub fn poll(&mut self) {
        let mut buf = [0u8; FRAME_MAX];
        loop {
            let len = unsafe { lh_mesh_poll_rx(buf.as_mut_ptr(), FRAME_MAX as u32) };
            if len <= 0 {
                return;
            }
            let Ok(text) = core::str::from_utf8(&buf[..len as usize]) else {
                warn!("mesh: dropping non-UTF8 payload ({} bytes)", len);
                continue;
            };
            self.enqueue_inbound(text);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn poll(&mut self) {}

    /// Queue inbound channel text and ring the doorbell.
    /// On the host this doubles as the simulation's injection point.
    pub fn enqueue_inbound(&mut self, text: &str) {
        let Ok(frame) = HString::try_from(text) else {
            warn!("mesh: dropping oversize payload ({} bytes)", text.len());
            return;
        };
        if self.inbound.is_full() {
            warn!("mesh: inbound mailbox full, dropping oldest");
            self.inbound.pop_front();
        }
        // push_back cannot fail after the fullness check above.
        let _ = self.inbound.push_back(frame);
        if !push_event(Event::FrameReceived) {
            warn!("mesh: event queue full, frame waits for next drain");
        }
    }

    /// Next pending inbound payload, oldest first.
    pub fn take_inbound(&mut self) -> Option<HString<FRAME_MAX>> {
        self.inbound.pop_front()
    }

    /// Frames sent on the simulated channel, in order.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_sent(&self) -> &[String] {
        &self.sim_sent
    }
}

impl Default for MeshChannelAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelPort for MeshChannelAdapter {
    #[cfg(target_os = "espidf")]
    fn send(&mut self, text: &str) -> bool {
        let Ok(c_text) = std::ffi::CString::new(text) else {
            return false;
        };
        let ok = unsafe { lh_mesh_send(c_text.as_ptr()) };
        if !ok {
            warn!("mesh: radio refused frame ({} bytes)", text.len());
        }
        ok
    }

    #[cfg(not(target_os = "espidf"))]
    fn send(&mut self, text: &str) -> bool {
        debug!("mesh(sim): send {}", text);
        self.sim_sent.push(text.to_owned());
        true
    }
}
