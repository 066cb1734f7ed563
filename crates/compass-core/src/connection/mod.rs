//! Single-connection request cycle
//!
//! [`ConnectionHandler`] is driven by two events from the network stack:
//! a connection was accepted, and data (or a close) arrived on it. Every data
//! event runs one complete cycle (sample, classify, render, transmit)
//! synchronously and returns. Nothing in the cycle waits, so the caller's poll
//! loop regains control as soon as the response is queued.
//!
//! The handler owns exactly one live connection. Request content is never
//! parsed; any bytes at all count as "a request arrived".

mod buffer;

pub use buffer::{AllocError, BufferLedger, HeapAllocator, RequestAllocator, RequestBuffer};

use log::{debug, warn};

use crate::config::PageConfig;
use crate::direction::{Direction, classify};
use crate::render::{INTERNAL_SERVER_ERROR, SERVICE_UNAVAILABLE, render};
use crate::sensors::{AnalogInput, JoystickSampler};

/// Bytes of a request kept for logging. Anything beyond is dropped.
pub const MAX_REQUEST_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No client; waiting for the stack to accept one
    Listening,
    /// A client is connected and armed for its next data event
    Accepted,
    /// Bytes arrived and the cycle is running
    DataPending,
    /// The response is being handed to the transport
    Responding,
    /// The peer closed the connection
    Closed,
}

/// Identifies one accepted connection for the lifetime of that connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(u32);

impl ConnectionHandle {
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Outbound half of a connection.
///
/// Implementations queue as much of `bytes` as they can and report how much
/// was taken. The handler never retries a short write.
pub trait Transmit {
    type Error: core::fmt::Debug;

    fn transmit(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The request buffer could not be allocated
    OutOfMemory,
    /// The page did not fit its response buffer
    RenderOverflow,
}

/// Result of handling one data event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The page was queued in full
    Responded { sent: usize, direction: Direction },
    /// The transport accepted only part of the page
    PartialSend { sent: usize, total: usize },
    /// The transport refused the page
    SendFailed,
    /// The cycle was abandoned and an error response sent instead
    Rejected(RejectReason),
    /// The peer closed the connection
    Closed,
    /// The event named a connection that is not the live one
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    pub accepted: u32,
    pub abandoned: u32,
    pub cycles: u32,
    pub closed: u32,
    pub rejected: u32,
    pub partial_sends: u32,
    pub send_failures: u32,
    pub ignored: u32,
    pub bytes_received: u32,
    pub bytes_truncated: u32,
}

#[derive(Debug, Clone, Copy)]
struct ActiveConnection {
    handle: ConnectionHandle,
    state: ConnectionState,
}

enum SendResult {
    Complete(usize),
    Partial(usize),
    Failed,
}

fn send<T: Transmit>(tx: &mut T, bytes: &[u8]) -> SendResult {
    match tx.transmit(bytes) {
        Ok(sent) if sent >= bytes.len() => SendResult::Complete(sent),
        Ok(sent) => SendResult::Partial(sent),
        Err(e) => {
            warn!("Transmit failed: {:?}", e);
            SendResult::Failed
        }
    }
}

/// First line of a request, without the line terminator.
pub fn request_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Event-driven request handler for one connection at a time.
pub struct ConnectionHandler<A, M = HeapAllocator> {
    sampler: JoystickSampler<A>,
    allocator: M,
    page: PageConfig,
    ledger: BufferLedger,
    active: Option<ActiveConnection>,
    next_id: u32,
    stats: HandlerStats,
}

impl<A: AnalogInput> ConnectionHandler<A> {
    pub fn new(adc: A, page: PageConfig) -> Self {
        Self::with_allocator(adc, HeapAllocator, page)
    }
}

impl<A: AnalogInput, M: RequestAllocator> ConnectionHandler<A, M> {
    pub fn with_allocator(adc: A, allocator: M, page: PageConfig) -> Self {
        Self {
            sampler: JoystickSampler::new(adc),
            allocator,
            page,
            ledger: BufferLedger::new(),
            active: None,
            next_id: 0,
            stats: HandlerStats::default(),
        }
    }

    /// State of the most recent connection, or `Listening` before the first.
    pub fn state(&self) -> ConnectionState {
        self.active
            .map_or(ConnectionState::Listening, |active| active.state)
    }

    /// Handle of the connection currently armed for data, if any
    pub fn active_handle(&self) -> Option<ConnectionHandle> {
        self.active
            .filter(|active| active.state != ConnectionState::Closed)
            .map(|active| active.handle)
    }

    pub fn stats(&self) -> HandlerStats {
        self.stats
    }

    pub fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }

    pub fn sampler_mut(&mut self) -> &mut JoystickSampler<A> {
        &mut self.sampler
    }

    /// Register a newly accepted connection as the live one.
    ///
    /// A connection that is still open is abandoned; later events carrying
    /// its handle are ignored.
    pub fn on_accept(&mut self) -> ConnectionHandle {
        if let Some(previous) = self.active_handle() {
            warn!(
                "Connection {} abandoned for a new client",
                previous.id()
            );
            self.stats.abandoned += 1;
        }

        self.next_id = self.next_id.wrapping_add(1);
        let handle = ConnectionHandle(self.next_id);
        self.active = Some(ActiveConnection {
            handle,
            state: ConnectionState::Accepted,
        });
        self.stats.accepted += 1;
        debug!("Connection {} accepted", handle.id());
        handle
    }

    /// Handle inbound data for `handle`.
    ///
    /// `None`, or segments that are all empty, means the peer closed the
    /// connection. Otherwise one full cycle runs and its response is passed
    /// to `tx`. The request buffer is released before this returns, on every
    /// path.
    pub fn on_data<T: Transmit>(
        &mut self,
        handle: ConnectionHandle,
        data: Option<&[&[u8]]>,
        tx: &mut T,
    ) -> CycleOutcome {
        let Some(active) = self
            .active
            .as_mut()
            .filter(|active| active.handle == handle && active.state != ConnectionState::Closed)
        else {
            debug!("Data for inactive connection {} ignored", handle.id());
            self.stats.ignored += 1;
            return CycleOutcome::Ignored;
        };

        let segments = match data {
            Some(segments) if segments.iter().any(|segment| !segment.is_empty()) => segments,
            _ => {
                debug!("Connection {} closed by peer", handle.id());
                active.state = ConnectionState::Closed;
                self.stats.closed += 1;
                return CycleOutcome::Closed;
            }
        };

        active.state = ConnectionState::DataPending;
        let received: usize = segments.iter().map(|segment| segment.len()).sum();
        self.stats.bytes_received = self.stats.bytes_received.saturating_add(received as u32);

        let mut request = match RequestBuffer::acquire(
            &mut self.allocator,
            &self.ledger,
            received.min(MAX_REQUEST_BYTES),
        ) {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!("Request rejected: {}", e);
                let _ = send(tx, SERVICE_UNAVAILABLE);
                active.state = ConnectionState::Accepted;
                self.stats.rejected += 1;
                return CycleOutcome::Rejected(RejectReason::OutOfMemory);
            }
        };

        let truncated = request.fill_from(segments);
        if truncated > 0 {
            debug!("Request truncated, {} bytes dropped", truncated);
            self.stats.bytes_truncated = self.stats.bytes_truncated.saturating_add(truncated as u32);
        }
        debug!("Request: {}", request_line(request.as_text()));

        let sample = self.sampler.sample();
        let direction = classify(sample.pct_x, sample.pct_y);

        active.state = ConnectionState::Responding;
        let outcome = match render(&sample, &direction, &self.page) {
            Ok(document) => match send(tx, document.as_bytes()) {
                SendResult::Complete(sent) => CycleOutcome::Responded {
                    sent,
                    direction: direction.direction,
                },
                SendResult::Partial(sent) => {
                    warn!("Partial send: {} of {} bytes", sent, document.len());
                    self.stats.partial_sends += 1;
                    CycleOutcome::PartialSend {
                        sent,
                        total: document.len(),
                    }
                }
                SendResult::Failed => {
                    self.stats.send_failures += 1;
                    CycleOutcome::SendFailed
                }
            },
            Err(e) => {
                warn!("Render failed: {}", e);
                let _ = send(tx, INTERNAL_SERVER_ERROR);
                self.stats.rejected += 1;
                CycleOutcome::Rejected(RejectReason::RenderOverflow)
            }
        };

        drop(request);
        active.state = ConnectionState::Accepted;
        self.stats.cycles += 1;
        debug!(
            "Cycle {}: x={}% y={}% -> {} ({:?})",
            self.stats.cycles,
            sample.pct_x,
            sample.pct_y,
            direction.name(),
            outcome
        );
        outcome
    }
}
