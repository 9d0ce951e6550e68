//! Fixed-capacity circular FIFO.
//!
//! # Invariants
//! - `len <= capacity` and `head < capacity` (`head == 0` when capacity is 0).
//! - The live items are the logical range `[head, head + len)`, wrapping at
//!   `capacity`, in the order they were put.
//!
//! # Layout
//! Items live in a flat `Vec<T>`. The live window is contiguous in logical
//! order but may wrap, so bulk transfers copy at most two slices each way.
//! Slots outside the window hold stale values and are never read.
//!
//! # Threading
//! Not synchronized. [`crate::io::bridge`] wraps it in a lock for the
//! producer/consumer case.

use crate::error::{RingError, RingResult};

/// Circular buffer with a configurable overflow policy.
///
/// With overflow disallowed, `put` on a full buffer fails and bulk puts store
/// only what fits. With overflow allowed, new items overwrite the oldest.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    head: usize,
    len: usize,
    allow_overflow: bool,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create an empty buffer that rejects writes when full.
    pub fn new(capacity: usize) -> Self {
        Self::with_overflow(capacity, false)
    }

    /// Create an empty buffer with an explicit overflow policy.
    pub fn with_overflow(capacity: usize, allow_overflow: bool) -> Self {
        Self {
            slots: vec![T::default(); capacity],
            head: 0,
            len: 0,
            allow_overflow,
        }
    }

    /// Maximum number of items.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when `len == capacity`.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Free slots before the buffer is full.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Whether writes to a full buffer overwrite the oldest items.
    pub fn allow_overflow(&self) -> bool {
        self.allow_overflow
    }

    /// Change the overflow policy.
    pub fn set_allow_overflow(&mut self, allow: bool) {
        self.allow_overflow = allow;
    }

    #[inline]
    fn wrap(&self, index: usize) -> usize {
        let capacity = self.capacity();
        if index >= capacity { index - capacity } else { index }
    }

    #[inline]
    fn tail(&self) -> usize {
        self.wrap(self.head + self.len)
    }

    /// The live items as up to two slices in logical order.
    ///
    /// The second slice is empty unless the window wraps.
    pub fn segments(&self) -> (&[T], &[T]) {
        if self.len == 0 {
            return (&[], &[]);
        }
        let first = self.len.min(self.capacity() - self.head);
        (
            &self.slots[self.head..self.head + first],
            &self.slots[..self.len - first],
        )
    }

    /// Copy `items` in after the tail. Caller guarantees they fit.
    fn write_window(&mut self, items: &[T]) {
        if items.is_empty() {
            return;
        }
        let tail = self.tail();
        let first = items.len().min(self.capacity() - tail);
        self.slots[tail..tail + first].copy_from_slice(&items[..first]);
        self.slots[..items.len() - first].copy_from_slice(&items[first..]);
        self.len += items.len();
    }

    /// Copy the oldest `dst.len()` live items into `dst`. Caller guarantees
    /// `dst.len() <= len`.
    fn read_window(&self, dst: &mut [T]) {
        let (a, b) = self.segments();
        let n = dst.len();
        let first = n.min(a.len());
        dst[..first].copy_from_slice(&a[..first]);
        dst[first..].copy_from_slice(&b[..n - first]);
    }

    fn consume(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.head = self.wrap(self.head + count);
        self.len -= count;
    }

    /// Append one item at the tail.
    ///
    /// Fails with [`RingError::BufferFull`] when full and overflow is
    /// disallowed. With overflow allowed the oldest item is dropped.
    pub fn put(&mut self, item: T) -> RingResult<()> {
        if self.is_full() {
            if !self.allow_overflow {
                return Err(RingError::BufferFull);
            }
            if self.capacity() == 0 {
                // Nothing can be retained; the item is discarded.
                return Ok(());
            }
            self.consume(1);
        }
        let tail = self.tail();
        self.slots[tail] = item;
        self.len += 1;
        Ok(())
    }

    /// Append items from `src`, returning how many were accepted.
    ///
    /// With overflow disallowed this stores `min(src.len(), remaining())`
    /// items from the front of `src`; the caller re-submits the rest. With
    /// overflow allowed every item is accepted and only the newest
    /// `capacity` survive.
    pub fn put_slice(&mut self, src: &[T]) -> usize {
        let capacity = self.capacity();
        if !self.allow_overflow {
            let count = src.len().min(self.remaining());
            self.write_window(&src[..count]);
            return count;
        }
        if capacity == 0 {
            return src.len();
        }
        if src.len() >= capacity {
            self.slots.copy_from_slice(&src[src.len() - capacity..]);
            self.head = 0;
            self.len = capacity;
            return src.len();
        }
        let evict = (self.len + src.len()).saturating_sub(capacity);
        self.consume(evict);
        self.write_window(src);
        src.len()
    }

    /// Remove and return the oldest item.
    pub fn get(&mut self) -> RingResult<T> {
        if self.len == 0 {
            return Err(RingError::BufferEmpty);
        }
        let item = self.slots[self.head];
        self.consume(1);
        Ok(item)
    }

    /// Move up to `dst.len()` of the oldest items into `dst`.
    ///
    /// Returns the number of items moved, `min(dst.len(), len())`.
    pub fn get_into(&mut self, dst: &mut [T]) -> usize {
        let count = dst.len().min(self.len);
        self.read_window(&mut dst[..count]);
        self.consume(count);
        count
    }

    /// Remove up to `count` of the oldest items as a vector.
    pub fn get_many(&mut self, count: usize) -> Vec<T> {
        let mut out = vec![T::default(); count.min(self.len)];
        self.get_into(&mut out);
        out
    }

    /// Discard up to `count` of the oldest items, returning how many went.
    pub fn skip(&mut self, count: usize) -> usize {
        let count = count.min(self.len);
        self.consume(count);
        count
    }

    /// Drop every item. Storage is kept.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Change the capacity, relinearizing items so the oldest sits at 0.
    ///
    /// Fails with [`RingError::CapacityTooSmall`] if the stored items would
    /// not fit.
    pub fn resize(&mut self, capacity: usize) -> RingResult<()> {
        if capacity == self.capacity() {
            return Ok(());
        }
        if capacity < self.len {
            return Err(RingError::CapacityTooSmall {
                requested: capacity,
                size: self.len,
            });
        }

        let mut slots = vec![T::default(); capacity];
        self.read_window(&mut slots[..self.len]);
        self.slots = slots;
        self.head = 0;
        Ok(())
    }

    /// Iterate the live items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (a, b) = self.segments();
        a.iter().chain(b)
    }

    /// True if any live item equals `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|live| live == item)
    }

    /// Copy the oldest `dst.len()` items into `dst` without consuming them.
    pub fn copy_to(&self, dst: &mut [T]) -> RingResult<()> {
        if dst.len() > self.len {
            return Err(RingError::NotEnoughItems {
                requested: dst.len(),
                size: self.len,
            });
        }
        self.read_window(dst);
        Ok(())
    }

    /// Snapshot of the live items, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        let (a, b) = self.segments();
        let mut out = Vec::with_capacity(self.len);
        out.extend_from_slice(a);
        out.extend_from_slice(b);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut ring = RingBuffer::new(4);
        for i in 1..=4 {
            ring.put(i).unwrap();
        }
        assert!(ring.is_full());
        let out: Vec<_> = (0..4).map(|_| ring.get().unwrap()).collect();
        assert_eq!(out, [1, 2, 3, 4]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_fifo_across_wraparound() {
        let mut ring = RingBuffer::new(3);
        let mut produced = Vec::new();
        let mut consumed = Vec::new();
        let mut next = 0;

        // Rounds of uneven put/get sizes walk head and tail around the
        // slots several times.
        for round in 0..20 {
            let puts = 1 + round % 3;
            for _ in 0..puts.min(ring.remaining()) {
                ring.put(next).unwrap();
                produced.push(next);
                next += 1;
            }
            let gets = 1 + (round + 1) % 3;
            for _ in 0..gets.min(ring.len()) {
                consumed.push(ring.get().unwrap());
            }
        }
        while let Ok(item) = ring.get() {
            consumed.push(item);
        }

        assert!(next > 3 * 3);
        assert_eq!(consumed, produced);
    }

    #[test]
    fn test_overflow_disallowed() {
        let mut ring = RingBuffer::new(4);
        for i in 1..=4 {
            ring.put(i).unwrap();
        }
        assert_eq!(ring.put(5), Err(RingError::BufferFull));
        assert_eq!(ring.to_vec(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_overflow_allowed_discards_oldest() {
        let mut ring = RingBuffer::with_overflow(4, true);
        for i in 1..=5 {
            ring.put(i).unwrap();
        }
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.to_vec(), [2, 3, 4, 5]);

        for i in 6..=11 {
            ring.put(i).unwrap();
        }
        assert_eq!(ring.len(), ring.capacity());
        assert_eq!(ring.to_vec(), [8, 9, 10, 11]);
        assert_eq!(ring.get(), Ok(8));
    }

    #[test]
    fn test_get_empty() {
        let mut ring: RingBuffer<u8> = RingBuffer::new(2);
        assert_eq!(ring.get(), Err(RingError::BufferEmpty));
    }

    #[test]
    fn test_zero_capacity() {
        let mut ring = RingBuffer::new(0);
        assert_eq!(ring.put(1), Err(RingError::BufferFull));

        let mut ring = RingBuffer::with_overflow(0, true);
        ring.put(1).unwrap();
        assert!(ring.is_empty());
        assert_eq!(ring.put_slice(&[1, 2]), 2);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_put_slice_partial() {
        let mut ring = RingBuffer::new(4);
        ring.put(0u8).unwrap();
        let written = ring.put_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(written, 3);
        assert_eq!(ring.to_vec(), [0, 1, 2, 3]);
        assert_eq!(ring.put_slice(&[9]), 0);
    }

    #[test]
    fn test_put_slice_overflow_keeps_newest() {
        let mut ring = RingBuffer::with_overflow(3, true);
        assert_eq!(ring.put_slice(&[1, 2, 3, 4, 5, 6, 7]), 7);
        assert_eq!(ring.to_vec(), [5, 6, 7]);
    }

    #[test]
    fn test_get_into() {
        let mut ring = RingBuffer::new(4);
        ring.put_slice(&[1u8, 2, 3]);
        let mut dst = [0u8; 8];
        assert_eq!(ring.get_into(&mut dst), 3);
        assert_eq!(&dst[..3], &[1, 2, 3]);
        assert_eq!(ring.get_into(&mut dst), 0);
    }

    #[test]
    fn test_bulk_wraparound() {
        let mut ring = RingBuffer::new(5);
        let mut dst = [0u8; 3];
        ring.put_slice(&[1, 2, 3, 4]);
        assert_eq!(ring.get_into(&mut dst), 3);
        assert_eq!(ring.put_slice(&[5, 6, 7, 8]), 4);
        assert_eq!(ring.to_vec(), [4, 5, 6, 7, 8]);
        assert_eq!(ring.get_many(10), vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_resize_relinearizes() {
        let mut ring = RingBuffer::new(4);
        ring.put_slice(&[1, 2, 3, 4]);
        ring.get().unwrap();
        ring.get().unwrap();
        ring.put_slice(&[5, 6]);

        ring.resize(6).unwrap();
        assert_eq!(ring.capacity(), 6);
        assert_eq!(ring.to_vec(), [3, 4, 5, 6]);
        ring.put_slice(&[7, 8]);
        assert_eq!(ring.get_many(6), vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_resize_too_small() {
        let mut ring = RingBuffer::new(4);
        ring.put_slice(&[1, 2, 3]);
        assert_eq!(
            ring.resize(2),
            Err(RingError::CapacityTooSmall {
                requested: 2,
                size: 3
            })
        );
        ring.resize(3).unwrap();
        assert!(ring.is_full());
        assert_eq!(ring.put(4), Err(RingError::BufferFull));
        assert_eq!(ring.to_vec(), [1, 2, 3]);
    }

    #[test]
    fn test_contains() {
        let mut ring = RingBuffer::with_overflow(3, true);
        ring.put_slice(&["a", "b", "c", "d"]);
        assert!(!ring.contains(&"a"));
        assert!(ring.contains(&"d"));
        ring.get().unwrap();
        assert!(!ring.contains(&"b"));
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut ring = RingBuffer::new(4);
        ring.put_slice(&[1, 2, 3]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
        ring.put_slice(&[7, 8, 9, 10]);
        assert_eq!(ring.to_vec(), [7, 8, 9, 10]);
    }

    #[test]
    fn test_skip_and_copy_to() {
        let mut ring = RingBuffer::new(4);
        ring.put_slice(&[1, 2, 3, 4]);
        assert_eq!(ring.skip(2), 2);

        let mut dst = [0; 2];
        ring.copy_to(&mut dst).unwrap();
        assert_eq!(dst, [3, 4]);
        assert_eq!(ring.len(), 2);

        let mut too_big = [0; 3];
        assert!(matches!(
            ring.copy_to(&mut too_big),
            Err(RingError::NotEnoughItems { .. })
        ));
        assert_eq!(ring.skip(10), 2);
    }

    #[test]
    fn test_toggle_overflow() {
        let mut ring = RingBuffer::new(2);
        ring.put_slice(&[1, 2]);
        assert!(ring.put(3).is_err());
        ring.set_allow_overflow(true);
        ring.put(3).unwrap();
        assert_eq!(ring.to_vec(), [2, 3]);
    }

    #[test]
    fn test_segments_split_at_wrap() {
        let mut ring = RingBuffer::new(5);
        ring.put_slice(&[1u8, 2, 3, 4]);
        assert_eq!(ring.skip(3), 3);
        assert_eq!(ring.put_slice(&[5, 6, 7]), 3);

        let (a, b) = ring.segments();
        assert_eq!(a, &[4, 5]);
        assert_eq!(b, &[6, 7]);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), [4, 5, 6, 7]);

        let mut dst = [0u8; 3];
        ring.copy_to(&mut dst).unwrap();
        assert_eq!(dst, [4, 5, 6]);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_overflow_slice_wraps_and_evicts() {
        let mut ring = RingBuffer::with_overflow(4, true);
        ring.put_slice(&[1u8, 2, 3]);
        ring.get().unwrap();
        assert_eq!(ring.put_slice(&[4, 5, 6]), 3);
        assert_eq!(ring.to_vec(), [3, 4, 5, 6]);
        assert_eq!(ring.put_slice(&[7]), 1);
        assert_eq!(ring.to_vec(), [4, 5, 6, 7]);
    }

    #[test]
    fn test_bulk_bytes_round_trip_many_laps() {
        let mut ring = RingBuffer::new(7);
        let data: Vec<u8> = (0..=255).collect();
        let mut out = Vec::new();
        let mut pending = &data[..];
        let mut chunk = [0u8; 5];

        while !pending.is_empty() || !ring.is_empty() {
            let written = ring.put_slice(&pending[..pending.len().min(6)]);
            pending = &pending[written..];
            let read = ring.get_into(&mut chunk);
            out.extend_from_slice(&chunk[..read]);
        }
        assert_eq!(out, data);
    }
}
