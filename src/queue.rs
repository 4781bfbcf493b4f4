// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A first-in, first-out queue of work shared between render threads.
//!
//! The queue is filled once, before any thread starts, and then only
//! ever drained.  Taking an item holds the lock just long enough to
//! pop it; the work done on the item happens after the lock is
//! released, so threads almost never wait on each other.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// A mutex-protected FIFO.
#[derive(Debug)]
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> WorkQueue<T> {
    /// An empty queue.
    pub fn new() -> Self {
        WorkQueue {
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Adds `item` to the back of the queue.  Requires exclusive
    /// access, so it can only happen while the queue is being set up.
    pub fn push(&mut self, item: T) {
        self.items
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(item);
    }

    /// Removes and returns the item at the front of the queue, or
    /// `None` if the queue has been drained.  Never blocks beyond
    /// waiting for the lock.
    pub fn pop(&self) -> Option<T> {
        // A panic elsewhere cannot leave the deque half-modified, so a
        // poisoned lock is still safe to use.
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// The number of items still waiting.
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True once every item has been taken.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        WorkQueue::new()
    }
}

impl<T> std::iter::FromIterator<T> for WorkQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = WorkQueue::new();
        for item in iter {
            queue.push(item);
        }
        queue
    }
}
