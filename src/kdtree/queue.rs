use crate::error::{AnnError, Result};
use crate::r#type::AnnNum;

/// A fixed-capacity binary min-heap of `(key, item)` pairs.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T, N: AnnNum> {
    capacity: usize,
    heap: Vec<(N, T)>,
}

impl<T, N: AnnNum> PriorityQueue<T, N> {
    /// Create an empty queue holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: Vec::with_capacity(capacity),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if the queue holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The smallest key, if any.
    pub fn min_key(&self) -> Option<N> {
        self.heap.first().map(|e| e.0)
    }

    /// Add an entry.
    ///
    /// Fails with [`AnnError::QueueOverflow`] if the queue is full.
    pub fn insert(&mut self, key: N, item: T) -> Result<()> {
        if self.heap.len() >= self.capacity {
            return Err(AnnError::QueueOverflow(self.capacity));
        }
        self.heap.push((key, item));

        let mut i = self.heap.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[parent].0 > key {
                self.heap.swap(parent, i);
                i = parent;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Remove and return the entry with the smallest key.
    pub fn extract_min(&mut self) -> Option<(N, T)> {
        let last = self.heap.pop()?;
        if self.heap.is_empty() {
            return Some(last);
        }
        let min = std::mem::replace(&mut self.heap[0], last);

        let len = self.heap.len();
        let mut i = 0;
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            // ties go to the left child
            let child = if right < len && self.heap[right].0 < self.heap[left].0 {
                right
            } else {
                left
            };
            if self.heap[child].0 < self.heap[i].0 {
                self.heap.swap(child, i);
                i = child;
            } else {
                break;
            }
        }
        Some(min)
    }
}
