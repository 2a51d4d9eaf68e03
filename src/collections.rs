//
// Copyright (c) 2023 ZettaScale Technology
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ZettaScale Zenoh Team, <zenoh@zettascale.tech>
//
use std::collections::VecDeque;

/// A bounded FIFO buffer that can overwrite its oldest element when full.
pub struct RingBuffer<T> {
    capacity: usize,
    len: usize,
    buffer: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> RingBuffer<T> {
        RingBuffer {
            capacity,
            len: 0,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    #[inline]
    fn push_inner(&mut self, elem: T) {
        self.buffer.push_back(elem);
        self.len += 1;
    }

    /// Appends `elem`, handing it back if the buffer is full.
    #[inline]
    pub fn push(&mut self, elem: T) -> Option<T> {
        if self.len < self.capacity {
            self.push_inner(elem);
            return None;
        }
        Some(elem)
    }

    /// Appends `elem`, evicting and returning the oldest element if the
    /// buffer is full.
    #[inline]
    pub fn push_force(&mut self, elem: T) -> Option<T> {
        self.push(elem).and_then(|elem| {
            let ret = self.buffer.pop_front();
            self.len -= 1;
            self.push_inner(elem);
            ret
        })
    }

    #[inline]
    pub fn pull(&mut self) -> Option<T> {
        let x = self.buffer.pop_front();
        if x.is_some() {
            self.len -= 1;
        }
        x
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::RingBuffer;

    #[test]
    fn ring_buffer_push_pull() {
        let mut ring = RingBuffer::new(3);
        assert!(ring.is_empty());
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert!(ring.is_full());
        assert_eq!(ring.push(4), Some(4));
        assert_eq!(ring.pull(), Some(1));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.push(4), None);
        assert_eq!(ring.pull(), Some(2));
        assert_eq!(ring.pull(), Some(3));
        assert_eq!(ring.pull(), Some(4));
        assert_eq!(ring.pull(), None);
    }

    #[test]
    fn ring_buffer_push_force() {
        let mut ring = RingBuffer::new(2);
        assert_eq!(ring.push_force(1), None);
        assert_eq!(ring.push_force(2), None);
        assert_eq!(ring.push_force(3), Some(1));
        assert_eq!(ring.push_force(4), Some(2));
        assert!(ring.is_full());
        assert_eq!(ring.pull(), Some(3));
        assert_eq!(ring.pull(), Some(4));
        assert!(ring.is_empty());
    }
}
