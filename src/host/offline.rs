// src/host/offline.rs
// Stand-ins for the simulator, used by the binary and by tests when no
// Webots instance is attached.

use super::{HostError, MessageSink, MessageSource, PositionSource, StepClock};
use log::{debug, info};
use std::collections::VecDeque;

/// A node that never moves
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
    position: [f64; 3],
}

impl FixedPosition {
    /// Pins the node at `position`
    pub fn new(position: [f64; 3]) -> Self {
        FixedPosition { position }
    }
}

impl PositionSource for FixedPosition {
    fn position(&self) -> [f64; 3] {
        self.position
    }
}

/// Sink that writes every payload to the log instead of a radio
#[derive(Debug, Default)]
pub struct LogSink {
    sent: usize,
}

impl LogSink {
    /// Creates a sink with nothing sent yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads sent so far
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl MessageSink for LogSink {
    fn send(&mut self, payload: &[u8]) -> Result<(), HostError> {
        self.sent += 1;
        let text = String::from_utf8_lossy(payload);
        info!("frame #{}: {}", self.sent, text.trim_end_matches('\0'));
        Ok(())
    }
}

/// Receiver with an always-empty queue
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReceiver;

impl MessageSource for SilentReceiver {
    fn queue_length(&self) -> usize {
        0
    }

    fn data(&self) -> Option<Vec<u8>> {
        None
    }

    fn next_packet(&mut self) {}
}

/// In-memory packet queue usable as both ends of a channel.
///
/// Packets sent are delivered in order. A non-zero `capacity` bounds the
/// queue; sending to a full queue fails.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    packets: VecDeque<Vec<u8>>,
    capacity: Option<usize>,
}

impl MemoryChannel {
    /// Unbounded channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel holding at most `capacity` packets
    pub fn bounded(capacity: usize) -> Self {
        MemoryChannel {
            packets: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Packets still queued, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &[u8]> {
        self.packets.iter().map(Vec::as_slice)
    }
}

impl MessageSink for MemoryChannel {
    fn send(&mut self, payload: &[u8]) -> Result<(), HostError> {
        if let Some(capacity) = self.capacity {
            if self.packets.len() >= capacity {
                return Err(HostError::SendFailed(format!(
                    "queue full ({} packets)",
                    capacity
                )));
            }
        }
        self.packets.push_back(payload.to_vec());
        Ok(())
    }
}

impl MessageSource for MemoryChannel {
    fn queue_length(&self) -> usize {
        self.packets.len()
    }

    fn data(&self) -> Option<Vec<u8>> {
        self.packets.front().cloned()
    }

    fn next_packet(&mut self) {
        self.packets.pop_front();
    }
}

/// Clock that runs for a fixed number of ticks, then reports the
/// simulation as stopped.
#[derive(Debug, Clone, Copy)]
pub struct TickBudget {
    remaining: u64,
    elapsed_ms: u64,
}

impl TickBudget {
    /// Allows `ticks` steps before stopping
    pub fn new(ticks: u64) -> Self {
        TickBudget {
            remaining: ticks,
            elapsed_ms: 0,
        }
    }

    /// Simulated time consumed so far
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

impl StepClock for TickBudget {
    fn step(&mut self, time_step_ms: u32) -> i32 {
        if self.remaining == 0 {
            debug!("tick budget exhausted after {} ms", self.elapsed_ms);
            return -1;
        }
        self.remaining -= 1;
        self.elapsed_ms += u64::from(time_step_ms);
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_channel_rejects_when_full() {
        let mut channel = MemoryChannel::bounded(1);
        channel.send(b"a").unwrap();
        assert!(matches!(channel.send(b"b"), Err(HostError::SendFailed(_))));
        assert_eq!(channel.queue_length(), 1);
    }

    #[test]
    fn channel_delivers_in_order() {
        let mut channel = MemoryChannel::new();
        channel.send(b"first").unwrap();
        channel.send(b"second").unwrap();
        assert_eq!(channel.data().as_deref(), Some(&b"first"[..]));
        channel.next_packet();
        assert_eq!(channel.data().as_deref(), Some(&b"second"[..]));
        channel.next_packet();
        assert_eq!(channel.queue_length(), 0);
        assert!(channel.data().is_none());
    }

    #[test]
    fn tick_budget_stops_after_allowance() {
        let mut clock = TickBudget::new(2);
        assert_eq!(clock.step(64), 0);
        assert_eq!(clock.step(64), 0);
        assert_eq!(clock.step(64), -1);
        assert_eq!(clock.elapsed_ms(), 128);
    }
}
