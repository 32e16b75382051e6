//! Decoded-block cache for raster readers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use dashmap::DashMap;
use crossbeam::queue::SegQueue;

struct CachedBlock {
    data: Arc<Vec<u8>>,
    /// Generation of the most recent touch
    stamp: u64,
}

/// Lock-free LRU cache of decoded strips or tiles, keyed by block index
///
/// Owned by a single raster handle; the stats scan and the resample pass
/// both walk the raster top to bottom, so a row of blocks is typically
/// reused for every row it covers.
///
/// Every touch pushes `(block, stamp)` onto the recency queue. Queue entries
/// whose stamp no longer matches the block's are stale and skipped on
/// eviction; the queue is compacted once it holds twice the capacity.
pub struct BlockCache {
    blocks: DashMap<usize, CachedBlock>,
    recency: SegQueue<(usize, u64)>,
    clock: AtomicU64,
    capacity: usize,
}

impl BlockCache {
    /// Creates a cache holding at most `capacity` blocks (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: DashMap::new(),
            recency: SegQueue::new(),
            clock: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, block: usize) -> Option<Arc<Vec<u8>>> {
        let stamp = self.tick();
        let data = {
            let mut entry = self.blocks.get_mut(&block)?;
            entry.stamp = stamp;
            Arc::clone(&entry.data)
        };
        self.recency.push((block, stamp));
        self.compact();
        Some(data)
    }

    /// Inserts a decoded block, evicting the least recently touched ones
    pub fn insert(&self, block: usize, data: Vec<u8>) -> Arc<Vec<u8>> {
        while self.blocks.len() >= self.capacity && !self.blocks.contains_key(&block) {
            match self.recency.pop() {
                Some((old, stamp)) => {
                    self.blocks.remove_if(&old, |_, cached| cached.stamp == stamp);
                }
                None => break,
            }
        }

        let data = Arc::new(data);
        let stamp = self.tick();
        self.blocks.insert(
            block,
            CachedBlock {
                data: Arc::clone(&data),
                stamp,
            },
        );
        self.recency.push((block, stamp));
        self.compact();
        data
    }

    pub fn clear(&self) {
        self.blocks.clear();
        while self.recency.pop().is_some() {}
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Drops stale queue entries, keeping live ones in recency order
    fn compact(&self) {
        if self.recency.len() <= self.capacity * 2 {
            return;
        }

        let mut live = Vec::with_capacity(self.blocks.len());
        while let Some((block, stamp)) = self.recency.pop() {
            let current = self.blocks.get(&block).is_some_and(|cached| cached.stamp == stamp);
            if current {
                live.push((block, stamp));
            }
        }
        for entry in live {
            self.recency.push(entry);
        }
    }
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new(256)
    }
}
