//! Scratch buffer pool
//!
//! Matching allocates many short-lived sequences: concatenation frontiers,
//! per-alternative results and error lists. The pool keeps cleared buffers
//! in a few capacity buckets so the recursive hot path can reuse them.
//!
//! Buffers are handed out as [`Pooled`] guards. The guard goes back to the
//! pool when dropped, so every exit path (including `?` on an error) returns
//! it. Contents that must outlive the guard are moved out with
//! [`Pooled::take`].

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use crate::node::Nodes;

/// Upper capacity bound of each bucket; the last bucket is unbounded
const BUCKET_SIZES: [usize; 3] = [4, 16, 64];

/// Default number of idle buffers kept per bucket
pub const DEFAULT_IDLE_LIMIT: usize = 64;

/// Default capacity above which a released buffer is dropped
pub const DEFAULT_MAX_CAPACITY: usize = 4096;

/// A buffer that can be cleared and reused
pub trait Recycle: Default + Send {
    /// Create an empty buffer with room for `capacity` items
    fn with_capacity(capacity: usize) -> Self;

    /// Allocated capacity
    fn capacity(&self) -> usize;

    /// Remove every item, keeping the allocation
    fn clear(&mut self);
}

impl<T: Send> Recycle for Vec<T> {
    fn with_capacity(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }
}

impl Recycle for Nodes<'_> {
    fn with_capacity(capacity: usize) -> Self {
        Nodes::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        Nodes::capacity(self)
    }

    fn clear(&mut self) {
        Nodes::clear(self)
    }
}

#[inline]
fn bucket_for(capacity: usize) -> usize {
    BUCKET_SIZES
        .iter()
        .position(|&size| capacity <= size)
        .unwrap_or(BUCKET_SIZES.len())
}

/// Thread-safe pool of reusable buffers
pub struct Pool<V: Recycle> {
    buckets: [Mutex<Vec<V>>; 4],
    idle_limit: usize,
    max_capacity: usize,
}

impl<V: Recycle> Pool<V> {
    /// Create a pool with default limits
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_LIMIT, DEFAULT_MAX_CAPACITY)
    }

    /// Create a pool keeping at most `idle_limit` buffers per bucket and
    /// dropping buffers that grew beyond `max_capacity`
    pub fn with_limits(idle_limit: usize, max_capacity: usize) -> Self {
        Self {
            buckets: Default::default(),
            idle_limit,
            max_capacity,
        }
    }

    /// Get a cleared buffer sized for about `hint` items
    pub fn acquire(&self, hint: usize) -> Pooled<'_, V> {
        let bucket = bucket_for(hint);
        let reused = self.buckets[bucket]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        let value = match reused {
            Some(mut v) => {
                v.clear();
                v
            }
            None => V::with_capacity(BUCKET_SIZES.get(bucket).copied().unwrap_or(hint)),
        };

        Pooled { pool: self, value }
    }

    /// Number of idle buffers across all buckets
    pub fn idle(&self) -> usize {
        self.buckets
            .iter()
            .map(|b| b.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Drop every idle buffer
    pub fn clear(&self) {
        for bucket in &self.buckets {
            bucket.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    fn release(&self, mut value: V) {
        let capacity = value.capacity();
        if capacity == 0 {
            return;
        }
        if capacity > self.max_capacity {
            log_trace!("pool: dropping oversized buffer (capacity {})", capacity);
            return;
        }

        value.clear();
        let mut bucket = self.buckets[bucket_for(capacity)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if bucket.len() < self.idle_limit {
            bucket.push(value);
        } else {
            log_trace!("pool: bucket full, dropping buffer (capacity {})", capacity);
        }
    }
}

impl<V: Recycle> Default for Pool<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Recycle> std::fmt::Debug for Pool<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("idle_limit", &self.idle_limit)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

/// Scoped loan of a pooled buffer
///
/// Returns the buffer to its pool on drop.
pub struct Pooled<'p, V: Recycle> {
    pool: &'p Pool<V>,
    value: V,
}

impl<V: Recycle> Pooled<'_, V> {
    /// Move the contents out, leaving nothing to return to the pool
    pub fn take(mut self) -> V {
        std::mem::take(&mut self.value)
    }
}

impl<V: Recycle> Deref for Pooled<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

impl<V: Recycle> DerefMut for Pooled<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self.value
    }
}

impl<V: Recycle> Drop for Pooled<'_, V> {
    fn drop(&mut self) {
        let value = std::mem::take(&mut self.value);
        self.pool.release(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_for() {
        assert_eq!(bucket_for(0), 0);
        assert_eq!(bucket_for(4), 0);
        assert_eq!(bucket_for(5), 1);
        assert_eq!(bucket_for(64), 2);
        assert_eq!(bucket_for(65), 3);
    }

    #[test]
    fn test_buffer_returns_on_drop() {
        let pool: Pool<Vec<u32>> = Pool::new();
        {
            let mut v = pool.acquire(3);
            v.extend([1, 2, 3]);
        }
        assert_eq!(pool.idle(), 1);

        let v = pool.acquire(3);
        assert!(v.is_empty());
        assert!(v.capacity() >= 3);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_buffer_returns_on_early_exit() {
        fn step(pool: &Pool<Vec<u32>>, fail: bool) -> Result<(), ()> {
            let mut v = pool.acquire(8);
            v.push(1);
            if fail {
                return Err(());
            }
            v.push(2);
            Ok(())
        }

        let pool = Pool::new();
        assert!(step(&pool, true).is_err());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_take_escapes_the_pool() {
        let pool: Pool<Vec<u32>> = Pool::new();
        let mut v = pool.acquire(4);
        v.push(7);
        let owned = v.take();
        assert_eq!(owned, vec![7]);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_oversized_buffer_is_dropped() {
        let pool: Pool<Vec<u8>> = Pool::with_limits(8, 16);
        {
            let mut v = pool.acquire(4);
            v.extend(std::iter::repeat(0).take(100));
        }
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_idle_limit_per_bucket() {
        let pool: Pool<Vec<u8>> = Pool::with_limits(1, 1024);
        let a = pool.acquire(2);
        let b = pool.acquire(2);
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);

        pool.clear();
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_nodes_are_recyclable() {
        let pool: Pool<Nodes<'static>> = Pool::new();
        {
            let mut ns = pool.acquire(16);
            ns.push(std::sync::Arc::new(crate::node::Node::leaf("a", 0, b"a")));
        }
        let ns = pool.acquire(16);
        assert!(ns.is_empty());
    }
}
