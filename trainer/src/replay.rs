//! In-memory FIFO replay buffer for self-play samples.
//!
//! Holds at most `capacity` entries; pushing into a full buffer evicts the
//! oldest entry first. Training reads the buffer as shuffled batches.

use anyhow::{ensure, Result};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ReplayBuffer<T> {
    entries: VecDeque<T>,
    capacity: usize,
    /// Entries pushed over the buffer's lifetime, evicted ones included
    total_pushed: u64,
}

impl<T: Clone> ReplayBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        ensure!(capacity > 0, "replay capacity must be greater than 0");
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_pushed: 0,
        })
    }

    pub fn push(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.total_pushed += 1;
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = T>) {
        for entry in entries {
            self.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Oldest to newest.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Shuffled copy of the buffer cut into full batches of `batch_size`.
    /// The remainder that does not fill a batch is dropped.
    pub fn shuffled_batches(&self, batch_size: usize, rng: &mut ChaCha20Rng) -> Vec<Vec<T>> {
        if batch_size == 0 || self.entries.len() < batch_size {
            return Vec::new();
        }
        let mut view: Vec<T> = self.entries.iter().cloned().collect();
        view.shuffle(rng);
        view.chunks_exact(batch_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_evicts_oldest_first() {
        let mut buffer = ReplayBuffer::new(4).unwrap();
        buffer.extend(1..=6);

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(buffer.total_pushed(), 6);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ReplayBuffer::<u32>::new(0).is_err());
    }

    #[test]
    fn test_shuffled_batches_cover_full_batches_only() {
        let mut buffer = ReplayBuffer::new(16).unwrap();
        buffer.extend(0..10u32);
        let mut rng = ChaCha20Rng::seed_from_u64(4);

        let batches = buffer.shuffled_batches(4, &mut rng);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 4));

        let mut seen: Vec<u32> = batches.concat();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|v| *v < 10));
    }

    #[test]
    fn test_no_batches_below_batch_size() {
        let mut buffer = ReplayBuffer::new(8).unwrap();
        buffer.extend([1, 2, 3]);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(buffer.shuffled_batches(4, &mut rng).is_empty());
        assert!(buffer.shuffled_batches(0, &mut rng).is_empty());
    }
}
