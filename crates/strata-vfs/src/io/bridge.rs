//! Bounded blocking byte channel between a background producer and a
//! synchronous consumer.
//!
//! ```text
//!   producer thread                          caller thread
//!   BridgeWriter::write ──► RingBuffer<u8> ──► BridgeReader::read
//!        waits on not_full    (one Mutex)       waits on not_empty
//! ```
//!
//! States:
//! - **Open**: the producer may write; an empty read blocks.
//! - **ProducerDone**: no more bytes will arrive. Buffered bytes still drain,
//!   then reads return end-of-stream, or the producer's fault as
//!   [`VfsError::ProducerFault`].
//! - **Closed**: the reader gave up. Reads return end-of-stream and blocked
//!   or future writes fail with `BrokenPipe`.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Arc, Weak};

use super::ring::RingBuffer;
use crate::error::VfsError;

/// Observable lifecycle of a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Producer still running.
    Open,
    /// Producer finished or faulted.
    ProducerDone,
    /// Consumer closed the stream.
    Closed,
}

struct Inner {
    ring: RingBuffer<u8>,
    producer_done: bool,
    closed: bool,
    fault: Option<Arc<VfsError>>,
}

impl Inner {
    fn state(&self) -> BridgeState {
        if self.closed {
            BridgeState::Closed
        } else if self.producer_done {
            BridgeState::ProducerDone
        } else {
            BridgeState::Open
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl Shared {
    /// Mark the producer side finished. The first fault recorded wins.
    ///
    /// Returns false if the producer was already done.
    fn finish(&self, fault: Option<VfsError>) -> bool {
        let mut inner = self.inner.lock();
        if inner.producer_done {
            return false;
        }
        inner.producer_done = true;
        if inner.fault.is_none() {
            inner.fault = fault.map(Arc::new);
        }
        drop(inner);
        self.not_empty.notify_all();
        self.not_full.notify_all();
        true
    }

    fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        inner.ring.clear();
        let abandoned = !inner.producer_done;
        drop(inner);
        if abandoned {
            tracing::debug!("bridge closed by consumer before producer finished");
        }
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}

/// Create a bridge whose buffer holds `capacity` bytes (at least one).
pub fn channel(capacity: usize) -> (BridgeWriter, BridgeReader) {
    let shared = Arc::new(Shared {
        inner: Mutex::new(Inner {
            ring: RingBuffer::new(capacity.max(1)),
            producer_done: false,
            closed: false,
            fault: None,
        }),
        not_empty: Condvar::new(),
        not_full: Condvar::new(),
    });
    let writer = BridgeWriter {
        shared: Arc::clone(&shared),
        completed: false,
    };
    let reader = BridgeReader { shared };
    (writer, reader)
}

/// Producer side. Writes block while the buffer is full.
///
/// Call [`finish`](Self::finish) on success or [`fail`](Self::fail) on error.
/// Dropping the writer without either is reported to the reader as a fault.
pub struct BridgeWriter {
    shared: Arc<Shared>,
    completed: bool,
}

impl BridgeWriter {
    /// Signal that every byte has been written.
    pub fn finish(mut self) {
        self.completed = true;
        self.shared.finish(None);
    }

    /// Signal that production failed. The reader sees `cause` wrapped in
    /// [`VfsError::ProducerFault`] once buffered bytes are drained.
    pub fn fail(mut self, cause: VfsError) {
        self.completed = true;
        self.shared.finish(Some(cause));
    }

    /// A weak handle for aborting this bridge from elsewhere.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.shared.inner.lock().state()
    }
}

impl Write for BridgeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut inner = self.shared.inner.lock();
        loop {
            if inner.closed {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "stream closed by reader",
                ));
            }
            if inner.producer_done {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "stream already finished or aborted",
                ));
            }
            let written = inner.ring.put_slice(buf);
            if written > 0 {
                drop(inner);
                self.shared.not_empty.notify_one();
                return Ok(written);
            }
            self.shared.not_full.wait(&mut inner);
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BridgeWriter {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let cause = VfsError::other("producer ended without completing");
        if self.shared.finish(Some(cause)) {
            tracing::warn!("bridge producer dropped without finishing");
        }
    }
}

impl fmt::Debug for BridgeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeWriter")
            .field("state", &self.state())
            .finish()
    }
}

/// Consumer side. Reads block while the buffer is empty and the producer
/// is still running.
pub struct BridgeReader {
    shared: Arc<Shared>,
}

impl BridgeReader {
    /// Stop consuming. Later reads return end-of-stream and the producer's
    /// writes fail, unblocking it if it is waiting for room.
    pub fn close(&mut self) {
        self.shared.close();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.shared.inner.lock().state()
    }

    /// Bytes buffered and ready to read.
    pub fn buffered(&self) -> usize {
        self.shared.inner.lock().ring.len()
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.shared.inner.lock().ring.capacity()
    }

    /// A weak handle for aborting this bridge from elsewhere.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Read for BridgeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut inner = self.shared.inner.lock();
        loop {
            if inner.closed {
                return Ok(0);
            }
            if !inner.ring.is_empty() {
                let read = inner.ring.get_into(buf);
                drop(inner);
                self.shared.not_full.notify_one();
                return Ok(read);
            }
            if inner.producer_done {
                return match &inner.fault {
                    Some(cause) => Err(VfsError::ProducerFault(Arc::clone(cause)).into()),
                    None => Ok(0),
                };
            }
            self.shared.not_empty.wait(&mut inner);
        }
    }
}

impl Drop for BridgeReader {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl fmt::Debug for BridgeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("BridgeReader")
            .field("state", &inner.state())
            .field("buffered", &inner.ring.len())
            .finish()
    }
}

/// Weak reference to a bridge, used by providers to tear down outstanding
/// streams.
#[derive(Clone)]
pub struct BridgeHandle {
    shared: Weak<Shared>,
}

impl BridgeHandle {
    /// Fault the producer side with `cause`.
    ///
    /// Returns true if the bridge was still open. A finished or dropped
    /// bridge is left as it is.
    pub fn abort(&self, cause: VfsError) -> bool {
        match self.shared.upgrade() {
            Some(shared) => shared.finish(Some(cause)),
            None => false,
        }
    }

    /// True while either side exists and the producer is still running.
    pub fn is_open(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.inner.lock().state() == BridgeState::Open)
    }
}

impl fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("open", &self.is_open())
            .finish()
    }
}
