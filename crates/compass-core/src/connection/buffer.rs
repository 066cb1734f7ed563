//! Request-scoped receive buffer with acquisition accounting

use alloc::vec::Vec;
use core::cell::Cell;

use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Could not allocate a {requested} byte request buffer")]
pub struct AllocError {
    pub requested: usize,
}

/// Source of request buffers.
pub trait RequestAllocator {
    /// Return an empty buffer able to hold `capacity` bytes without growing.
    fn allocate(&mut self, capacity: usize) -> Result<Vec<u8>, AllocError>;
}

/// Allocates from the global heap, reporting exhaustion instead of aborting.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl RequestAllocator for HeapAllocator {
    fn allocate(&mut self, capacity: usize) -> Result<Vec<u8>, AllocError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError {
                requested: capacity,
            })?;
        Ok(bytes)
    }
}

/// Counts buffer acquisitions and releases.
///
/// The two counters must be equal whenever no cycle is in progress.
#[derive(Debug, Default)]
pub struct BufferLedger {
    acquired: Cell<u32>,
    released: Cell<u32>,
}

impl BufferLedger {
    pub const fn new() -> Self {
        Self {
            acquired: Cell::new(0),
            released: Cell::new(0),
        }
    }

    pub fn acquired(&self) -> u32 {
        self.acquired.get()
    }

    pub fn released(&self) -> u32 {
        self.released.get()
    }

    /// Buffers currently alive
    pub fn outstanding(&self) -> u32 {
        self.acquired().wrapping_sub(self.released())
    }
}

/// Receive buffer owned by one request cycle. Dropping it releases it.
pub struct RequestBuffer<'l> {
    bytes: Vec<u8>,
    limit: usize,
    ledger: &'l BufferLedger,
}

impl<'l> RequestBuffer<'l> {
    pub fn acquire<M: RequestAllocator + ?Sized>(
        allocator: &mut M,
        ledger: &'l BufferLedger,
        capacity: usize,
    ) -> Result<Self, AllocError> {
        let bytes = allocator.allocate(capacity)?;
        ledger.acquired.set(ledger.acquired.get().wrapping_add(1));
        Ok(Self {
            bytes,
            limit: capacity,
            ledger,
        })
    }

    /// Append segments in order until the requested capacity is full.
    ///
    /// Returns the number of bytes that did not fit.
    pub fn fill_from(&mut self, segments: &[&[u8]]) -> usize {
        let mut dropped = 0;
        for segment in segments {
            let room = self.limit - self.bytes.len();
            let take = segment.len().min(room);
            self.bytes.extend_from_slice(&segment[..take]);
            dropped += segment.len() - take;
        }
        dropped
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The received bytes as text, cut at the first invalid UTF-8 sequence.
    pub fn as_text(&self) -> &str {
        match core::str::from_utf8(&self.bytes) {
            Ok(text) => text,
            Err(e) => core::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Drop for RequestBuffer<'_> {
    fn drop(&mut self) {
        self.ledger
            .released
            .set(self.ledger.released.get().wrapping_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_drop_balance() {
        let ledger = BufferLedger::new();
        {
            let _buffer = RequestBuffer::acquire(&mut HeapAllocator, &ledger, 16).unwrap();
            assert_eq!(ledger.acquired(), 1);
            assert_eq!(ledger.outstanding(), 1);
        }
        assert_eq!(ledger.released(), 1);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_failed_allocation_is_not_counted() {
        struct Exhausted;
        impl RequestAllocator for Exhausted {
            fn allocate(&mut self, capacity: usize) -> Result<Vec<u8>, AllocError> {
                Err(AllocError {
                    requested: capacity,
                })
            }
        }

        let ledger = BufferLedger::new();
        let result = RequestBuffer::acquire(&mut Exhausted, &ledger, 64);
        assert_eq!(result.err(), Some(AllocError { requested: 64 }));
        assert_eq!(ledger.acquired(), 0);
        assert_eq!(ledger.released(), 0);
    }

    #[test]
    fn test_fill_reassembles_segments() {
        let ledger = BufferLedger::new();
        let mut buffer = RequestBuffer::acquire(&mut HeapAllocator, &ledger, 32).unwrap();
        let dropped = buffer.fill_from(&[b"GET / ", b"HTTP/1.1\r\n", b"\r\n"]);
        assert_eq!(dropped, 0);
        assert_eq!(buffer.as_text(), "GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_fill_truncates_at_capacity() {
        let ledger = BufferLedger::new();
        let mut buffer = RequestBuffer::acquire(&mut HeapAllocator, &ledger, 4).unwrap();
        let dropped = buffer.fill_from(&[b"abc", b"def", b"gh"]);
        assert_eq!(buffer.as_bytes(), b"abcd");
        assert_eq!(dropped, 4);
    }

    #[test]
    fn test_text_stops_at_invalid_utf8() {
        let ledger = BufferLedger::new();
        let mut buffer = RequestBuffer::acquire(&mut HeapAllocator, &ledger, 8).unwrap();
        buffer.fill_from(&[b"GET\xff/"]);
        assert_eq!(buffer.as_text(), "GET");
    }
}
