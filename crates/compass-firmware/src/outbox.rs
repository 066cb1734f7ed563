//! Bounded staging buffer between the handler and the TCP socket
//!
//! The handler runs synchronously, so it cannot await the socket. It copies
//! the response into this buffer instead, the same way a TCP stack copies
//! into its send window, and the server loop flushes it afterwards.

use core::convert::Infallible;

use compass_core::connection::Transmit;
use compass_core::render::RESPONSE_CAPACITY;

pub struct Outbox {
    bytes: heapless::Vec<u8, RESPONSE_CAPACITY>,
}

impl Outbox {
    pub const fn new() -> Self {
        Self {
            bytes: heapless::Vec::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Transmit for Outbox {
    type Error = Infallible;

    /// Queue as much as fits. A short count signals backpressure.
    fn transmit(&mut self, bytes: &[u8]) -> Result<usize, Infallible> {
        let room = self.bytes.capacity() - self.bytes.len();
        let take = bytes.len().min(room);
        // Cannot fail: `take` never exceeds the remaining room.
        let _ = self.bytes.extend_from_slice(&bytes[..take]);
        Ok(take)
    }
}
