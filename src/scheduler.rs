//! Cooperative timer queue.
//!
//! Nothing here sleeps: callers schedule a task for a future time and later ask
//! which tasks are due. Tasks with the same deadline come out in the order they
//! were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Entry<T> {
    at: u64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queues `task` to fire at `at` (milliseconds on the caller's clock)
    pub fn schedule(&mut self, at: u64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { at, seq, task }));
    }

    /// Removes and returns the earliest task due at `now`, with its deadline
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, T)> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.at <= now => {
                let Reverse(entry) = self.queue.pop()?;
                Some((entry.at, entry.task))
            }
            _ => None,
        }
    }

    /// Deadline of the next task, if any
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(entry)| entry.at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
