use crate::r#type::AnnNum;

/// A bounded set holding the `k` smallest `(key, info)` pairs inserted so far, in ascending key
/// order.
///
/// Equal keys keep their insertion order. Once full, every insert either drops the new pair or
/// displaces the current largest; both count as dropped.
#[derive(Debug, Clone)]
pub struct MinKSet<N: AnnNum> {
    capacity: usize,
    entries: Vec<(N, u32)>,
    dropped: usize,
}

impl<N: AnnNum> MinKSet<N> {
    /// Create an empty set keeping at most `capacity` pairs.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity + 1),
            dropped: 0,
        }
    }

    /// Maximum number of pairs kept.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pairs currently kept.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no pair is kept.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once `capacity` pairs are kept.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.entries.len() == self.capacity
    }

    /// Number of pairs discarded because the set was full.
    pub fn num_dropped(&self) -> usize {
        self.dropped
    }

    /// The smallest key, or infinity when empty.
    pub fn min_key(&self) -> N {
        self.entries.first().map_or(N::infinity(), |e| e.0)
    }

    /// The largest kept key once the set is full, infinity before that.
    ///
    /// A candidate must beat this key to enter the set.
    #[inline]
    pub fn max_key(&self) -> N {
        if self.is_full() {
            self.entries[self.capacity - 1].0
        } else {
            N::infinity()
        }
    }

    /// The `i`-th smallest key.
    pub fn key(&self, i: usize) -> Option<N> {
        self.entries.get(i).map(|e| e.0)
    }

    /// The info stored with the `i`-th smallest key.
    pub fn info(&self, i: usize) -> Option<u32> {
        self.entries.get(i).map(|e| e.1)
    }

    /// Insert a pair, keeping the set sorted and bounded.
    pub fn insert(&mut self, key: N, info: u32) {
        let mut pos = self.entries.len();
        while pos > 0 && self.entries[pos - 1].0 > key {
            pos -= 1;
        }
        self.entries.insert(pos, (key, info));
        if self.entries.len() > self.capacity {
            self.entries.pop();
            self.dropped += 1;
        }
    }

    /// Iterate over the kept pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (N, u32)> + '_ {
        self.entries.iter().copied()
    }

    /// Consume the set, returning the kept pairs in ascending key order.
    pub fn into_vec(self) -> Vec<(N, u32)> {
        self.entries
    }
}
