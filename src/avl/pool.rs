//! Free list of path engines shared by every tree in a lineage.
//!
//! Mutating calls take a [`Path`] from the pool, use it, and hand it back
//! cleared, so the root-to-leaf buffers are allocated once per lineage
//! instead of once per call. The pool itself holds no tree data.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use super::path::Path;

/// Idle engines kept for reuse. Releases beyond this are dropped.
const RETAINED_PATHS: usize = 16;

/// Thread-safe free list of [`Path`] engines.
pub(crate) struct PathPool<T> {
    free: Mutex<Vec<Path<T>>>,
}

impl<T> PathPool<T> {
    pub(crate) const fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Hands out a cleared engine stamped with `generation`. It returns to
    /// the pool when the guard is dropped.
    pub(crate) fn acquire(pool: &Arc<Self>, generation: u64) -> PooledPath<T> {
        let recycled = pool.free.lock().pop();
        let mut path = recycled.unwrap_or_else(|| {
            tracing::trace!(generation, "allocating path engine");
            Path::new()
        });
        path.stamp(generation);
        PooledPath {
            pool: Arc::clone(pool),
            path,
        }
    }

    fn release(&self, mut path: Path<T>) {
        path.clear();
        let mut free = self.free.lock();
        if free.len() < RETAINED_PATHS {
            free.push(path);
        } else {
            tracing::trace!(idle = free.len(), "dropping surplus path engine");
        }
    }

    /// Number of engines waiting for reuse.
    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

/// A [`Path`] on loan from a [`PathPool`].
pub(crate) struct PooledPath<T> {
    pool: Arc<PathPool<T>>,
    path: Path<T>,
}

impl<T> Deref for PooledPath<T> {
    type Target = Path<T>;

    fn deref(&self) -> &Self::Target {
        &self.path
    }
}

impl<T> DerefMut for PooledPath<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.path
    }
}

impl<T> Drop for PooledPath<T> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.path));
    }
}

// =============================================================================
// Tests
// =============================================================================
